//! Security-focused test suite.
//!
//! Run with: `cargo test --features mocks --test security`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use portico::crypto::{hash_token, Argon2Hasher, PasswordHasher};
use portico::{
    AuthError, IssueInvitationAction, MockInvitationRepository, MockRoleRepository,
    PorticoConfig, PreviewInvitationAction, RoleLabel, SecretString,
};

// =============================================================================
// Invitation Codes
// =============================================================================

async fn issue(email: &str) -> (MockInvitationRepository, SecretString) {
    let roles = MockRoleRepository::new();
    roles.grant(1, RoleLabel::Admin);
    let invitations = MockInvitationRepository::new(roles.clone());
    let issued = IssueInvitationAction::new(roles, invitations.clone(), PorticoConfig::default())
        .execute(1, email, RoleLabel::Admin)
        .await
        .unwrap();
    (invitations, issued.code)
}

#[tokio::test]
async fn invitation_code_is_stored_only_as_hash() {
    let (invitations, code) = issue("new@example.org").await;

    let stored = invitations.invitations.lock().unwrap()[0].clone();
    assert_ne!(stored.code_hash, code.expose_secret());
    assert_eq!(stored.code_hash, hash_token(code.expose_secret()));

    let json = serde_json::to_string(&stored).unwrap();
    assert!(!json.contains(&stored.code_hash));
    assert!(!json.contains(code.expose_secret()));
}

#[tokio::test]
async fn same_inputs_never_produce_the_same_code() {
    let (_, first) = issue("same@example.org").await;
    let (_, second) = issue("same@example.org").await;

    assert_ne!(first.expose_secret(), second.expose_secret());
}

#[tokio::test]
async fn lookup_by_near_miss_code_fails() {
    let (invitations, code) = issue("new@example.org").await;
    let mut near = code.expose_secret().to_owned();
    let last = if near.ends_with('a') { 'b' } else { 'a' };
    near.pop();
    near.push(last);

    let result = PreviewInvitationAction::new(invitations)
        .execute(&SecretString::new(near))
        .await;
    assert_eq!(result.unwrap_err(), AuthError::InvalidInvitation);
}

#[tokio::test]
async fn issued_code_is_redacted_in_debug_output() {
    let (_, code) = issue("new@example.org").await;

    assert!(!format!("{code:?}").contains(code.expose_secret()));
}

// =============================================================================
// Passwords
// =============================================================================

#[test]
fn argon2_salts_every_hash() {
    let hasher = Argon2Hasher::insecure_fast();

    let hash1 = hasher.hash("tutor-password").unwrap();
    let hash2 = hasher.hash("tutor-password").unwrap();

    assert_ne!(hash1, hash2);
    assert!(hasher.verify("tutor-password", &hash1).unwrap());
    assert!(hasher.verify("tutor-password", &hash2).unwrap());
}

// =============================================================================
// Error Messages
// =============================================================================

#[test]
fn store_failures_do_not_leak_backend_text() {
    let response = portico::api::ErrorResponse::from(AuthError::DatabaseError(
        "connection refused at 10.0.0.5".to_owned(),
    ));

    assert!(!response.error.contains("10.0.0.5"));
}
