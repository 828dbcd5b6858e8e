#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::AuthError;

use super::user::{AuthUser, NewUser, UserRepository};

#[derive(Clone)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<AuthUser>>>,
    next_id: Arc<AtomicI64>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<AuthUser, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::UserAlreadyExists);
        }

        let now = Utc::now();
        let created = AuthUser {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            hashed_password: user.hashed_password,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        drop(users);

        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<AuthUser>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_ids_and_rejects_duplicates() {
        let repo = MockUserRepository::new();
        let a = repo.create_user(NewUser::mock("a@example.org")).await.unwrap();
        let b = repo.create_user(NewUser::mock("b@example.org")).await.unwrap();
        assert_ne!(a.id, b.id);

        let dup = repo.create_user(NewUser::mock("a@example.org")).await;
        assert!(matches!(dup, Err(AuthError::UserAlreadyExists)));
        assert_eq!(repo.list_users().await.unwrap().len(), 2);
    }
}
