// these tests use #[serial] because each one opens a fresh in-memory
// database and several exercise global event dispatch.
#![allow(clippy::indexing_slicing)]

//! End-to-end tests for `SQLite` stores.
//!
//! These tests use an in-memory `SQLite` database.
//! Run with: `cargo test --features sqlx_sqlite --test e2e_sqlite`

#![cfg(feature = "sqlx_sqlite")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use portico::crypto::{hash_token, Argon2Hasher};
use portico::invitations::CreateInvitation;
use portico::sqlite::{create_repositories, migrations};
use portico::{
    AuthError, AuthorizationResolver, IdentityProvider, InvitationRepository,
    IssueInvitationAction, LocalIdentityProvider, NewUser, PorticoConfig, ProfileAttributes,
    RedeemInvitationAction, RoleLabel, RoleRepository, SecretString, TokenRepository,
    UserRepository, VolunteerTrack,
};
use serial_test::serial;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn setup_db() -> SqlitePool {
    // a single connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory SQLite database");

    migrations::run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_owned(),
        first_name: "Sam".to_owned(),
        last_name: "Lee".to_owned(),
        hashed_password: "hash".to_owned(),
    }
}

fn invitation(email: &str, code: &str, created_by: i64, age: Duration) -> CreateInvitation {
    let created_at = Utc::now() - age;
    CreateInvitation {
        email: email.to_owned(),
        role: RoleLabel::Volunteer(VolunteerTrack::Ela),
        code_hash: hash_token(code),
        created_by,
        created_at,
        expires_at: created_at + Duration::days(7),
    }
}

#[tokio::test]
#[serial]
async fn test_migrations_are_idempotent() {
    let pool = setup_db().await;
    migrations::run(&pool).await.expect("second run");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _portico_migrations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(applied, 4);
}

#[tokio::test]
#[serial]
async fn test_user_repository() {
    let (users, _, _, _) = create_repositories(setup_db().await);

    let user = users.create_user(new_user("tutor@example.org")).await.unwrap();
    assert!(user.id > 0);
    assert_eq!(user.full_name(), "Sam Lee");

    let found = users
        .find_user_by_email("tutor@example.org")
        .await
        .unwrap()
        .expect("user not found");
    assert_eq!(found.id, user.id);
    assert!(users.find_user_by_id(user.id).await.unwrap().is_some());
    assert!(users.find_user_by_id(9999).await.unwrap().is_none());

    let duplicate = users.create_user(new_user("tutor@example.org")).await;
    assert_eq!(duplicate.unwrap_err(), AuthError::UserAlreadyExists);

    users.create_user(new_user("second@example.org")).await.unwrap();
    assert_eq!(users.list_users().await.unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_token_repository() {
    let pool = setup_db().await;
    let (users, tokens, _, _) = create_repositories(pool.clone());
    let user = users.create_user(new_user("tutor@example.org")).await.unwrap();

    let token = tokens
        .create_token(user.id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    let found = tokens
        .find_token(token.token.expose_secret())
        .await
        .unwrap()
        .expect("token not found");
    assert_eq!(found.user_id, user.id);

    // only the hash is stored
    let stored: String = sqlx::query_scalar("SELECT token_hash FROM session_tokens")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, hash_token(token.token.expose_secret()));

    tokens.revoke_token(token.token.expose_secret()).await.unwrap();
    assert!(tokens
        .find_token(token.token.expose_secret())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[serial]
async fn test_role_repository_replace_and_add() {
    let (_, _, roles, _) = create_repositories(setup_db().await);

    roles.add_role(7, RoleLabel::Admin).await.unwrap();
    roles.add_role(7, RoleLabel::Admin).await.unwrap();
    roles
        .add_role(7, RoleLabel::Volunteer(VolunteerTrack::Math))
        .await
        .unwrap();
    assert_eq!(roles.list_roles(7).await.unwrap().len(), 2);

    roles
        .replace_roles(7, &[RoleLabel::Volunteer(VolunteerTrack::Adlo)])
        .await
        .unwrap();
    assert_eq!(
        roles.list_roles(7).await.unwrap(),
        vec![RoleLabel::Volunteer(VolunteerTrack::Adlo)]
    );

    roles.replace_roles(7, &[RoleLabel::User]).await.unwrap();
    let assignments = roles.list_assignments(7).await.unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].role, RoleLabel::User);
    assert_eq!(assignments[0].user_id, 7);
}

#[tokio::test]
#[serial]
async fn test_role_repository_skips_unknown_labels() {
    let pool = setup_db().await;
    let (_, _, roles, _) = create_repositories(pool.clone());

    sqlx::query("INSERT INTO user_roles (user_id, role, created_at) VALUES (?, ?, ?)")
        .bind(3_i64)
        .bind("superuser")
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();
    roles.add_role(3, RoleLabel::Admin).await.unwrap();

    assert_eq!(roles.list_roles(3).await.unwrap(), vec![RoleLabel::Admin]);
}

#[tokio::test]
#[serial]
async fn test_invitation_redeem_is_single_use() {
    let (_, _, roles, invitations) = create_repositories(setup_db().await);

    let created = invitations
        .create(invitation("new@example.org", "code-a", 1, Duration::zero()))
        .await
        .unwrap();
    assert!(!created.is_redeemed());

    let found = invitations
        .find_by_code_hash(&hash_token("code-a"))
        .await
        .unwrap()
        .expect("invitation not found");
    assert_eq!(found.id, created.id);
    assert_eq!(found.role, RoleLabel::Volunteer(VolunteerTrack::Ela));

    let redeemed = invitations
        .redeem(&hash_token("code-a"), 42, Utc::now())
        .await
        .unwrap();
    assert_eq!(redeemed.redeemed_by, Some(42));
    assert!(redeemed.redeemed_at.is_some());
    assert_eq!(
        roles.list_roles(42).await.unwrap(),
        vec![RoleLabel::Volunteer(VolunteerTrack::Ela)]
    );

    let again = invitations
        .redeem(&hash_token("code-a"), 43, Utc::now())
        .await;
    assert_eq!(again.unwrap_err(), AuthError::InvitationAlreadyUsed);
    assert!(roles.list_roles(43).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_invitation_redeem_rejects_expired_and_unknown() {
    let (_, _, roles, invitations) = create_repositories(setup_db().await);

    invitations
        .create(invitation("late@example.org", "code-old", 1, Duration::days(8)))
        .await
        .unwrap();

    let expired = invitations
        .redeem(&hash_token("code-old"), 42, Utc::now())
        .await;
    assert_eq!(expired.unwrap_err(), AuthError::InvitationExpired);
    assert!(roles.list_roles(42).await.unwrap().is_empty());

    let unknown = invitations
        .redeem(&hash_token("code-missing"), 42, Utc::now())
        .await;
    assert_eq!(unknown.unwrap_err(), AuthError::InvalidInvitation);
}

#[tokio::test]
#[serial]
async fn test_invitation_list_and_prune() {
    let (_, _, _, invitations) = create_repositories(setup_db().await);

    invitations
        .create(invitation("old@example.org", "code-old", 1, Duration::days(9)))
        .await
        .unwrap();
    invitations
        .create(invitation("used@example.org", "code-used", 1, Duration::days(1)))
        .await
        .unwrap();
    invitations
        .create(invitation("live@example.org", "code-live", 1, Duration::zero()))
        .await
        .unwrap();
    invitations
        .redeem(&hash_token("code-used"), 5, Utc::now())
        .await
        .unwrap();

    let listed = invitations.list().await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].email, "live@example.org");

    assert_eq!(invitations.delete_expired(Utc::now()).await.unwrap(), 1);
    let left: Vec<String> = invitations
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.email)
        .collect();
    assert_eq!(left, vec!["live@example.org", "used@example.org"]);
}

#[tokio::test]
#[serial]
async fn test_issue_and_redeem_through_sqlite() {
    let (users, tokens, roles, invitations) = create_repositories(setup_db().await);
    let config = PorticoConfig::new("https://tutoring.example.org");

    let admin = users.create_user(new_user("admin@example.org")).await.unwrap();
    roles.add_role(admin.id, RoleLabel::Admin).await.unwrap();

    let issue = IssueInvitationAction::new(roles.clone(), invitations.clone(), config.clone());
    let issued = issue
        .execute(
            admin.id,
            "tutor@example.org",
            RoleLabel::Volunteer(VolunteerTrack::Math),
        )
        .await
        .unwrap();

    let provider = LocalIdentityProvider::with_hasher(
        users.clone(),
        tokens.clone(),
        Argon2Hasher::insecure_fast(),
        &config,
    );
    let redeem = RedeemInvitationAction::new(invitations.clone(), provider);
    let password = SecretString::new("tutor-password");
    let redemption = redeem
        .execute(
            &issued.code,
            &password,
            &ProfileAttributes::new("Ada", "Byron"),
        )
        .await
        .unwrap();

    assert!(redemption.account_created);
    assert_eq!(redemption.account.email, "tutor@example.org");

    let resolver = AuthorizationResolver::new(roles.clone(), config.role_lookup_timeout);
    let context = resolver.resolve(Some(redemption.account.clone())).await;
    assert!(context.is_volunteer());
    assert_eq!(context.volunteer_track(), Some(VolunteerTrack::Math));
    assert!(!context.is_admin());

    // redemption does not leave a session behind
    let provider = LocalIdentityProvider::with_hasher(
        users.clone(),
        tokens.clone(),
        Argon2Hasher::insecure_fast(),
        &config,
    );
    assert!(provider.current_session().is_none());
    let session = provider
        .sign_in("tutor@example.org", &password)
        .await
        .unwrap();
    assert_eq!(session.account.id, redemption.account.id);

    let reused = redeem
        .execute(
            &issued.code,
            &password,
            &ProfileAttributes::new("Ada", "Byron"),
        )
        .await;
    assert_eq!(reused.unwrap_err(), AuthError::InvitationAlreadyUsed);
}
