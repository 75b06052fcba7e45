use std::sync::Arc;

use crate::credentials::{hash_password, verify_password};
use crate::error::AppError;
use crate::model::user::{NewUser, RegisterRequest, User};
use crate::store::{StoreError, UserStore};

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    /// Register a new account and return it.
    ///
    /// The lookup gives the common case a cheap answer; the unique index on
    /// email settles concurrent registrations, which both surface as
    /// [`AppError::DuplicateAccount`].
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::DuplicateAccount);
        }

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;
        let new_user = NewUser {
            name: request.name,
            email: request.email,
            password_hash,
            role: request.role,
        };

        match self.users.insert_user(new_user).await {
            Ok(user) => {
                tracing::info!(account_id = %user.id, role = %user.role, "✅ Account registered");
                Ok(user)
            }
            Err(StoreError::Duplicate) => Err(AppError::DuplicateAccount),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::AccountNotFound)?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(account_id = %user.id, "Login successful");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::Role;
    use crate::store::memory::MemoryStore;

    fn service() -> (AccountService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (AccountService::new(store.clone(), 4), store)
    }

    fn request(email: &str, role: Role) -> RegisterRequest {
        RegisterRequest {
            name: "Asha".to_string(),
            email: email.to_string(),
            password: "pa55word".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn fresh_email_registers_and_can_log_in() {
        let (accounts, _) = service();

        let registered = accounts.register(request("f@x.com", Role::Farmer)).await.unwrap();
        assert_ne!(registered.password_hash, "pa55word");

        let user = accounts.login("f@x.com", "pa55word").await.unwrap();
        assert_eq!(user.id, registered.id);
        assert_eq!(user.role, Role::Farmer);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (accounts, _) = service();
        accounts.register(request("f@x.com", Role::Farmer)).await.unwrap();

        let second = accounts.register(request("f@x.com", Role::Company)).await;
        assert!(matches!(second, Err(AppError::DuplicateAccount)));
    }

    #[tokio::test]
    async fn concurrent_registrations_yield_one_account() {
        let (accounts, store) = service();

        let (a, b) = tokio::join!(
            accounts.register(request("race@x.com", Role::Farmer)),
            accounts.register(request("race@x.com", Role::Farmer)),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(store.find_by_role(Role::Farmer).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (accounts, _) = service();
        accounts.register(request("c@x.com", Role::Company)).await.unwrap();

        let result = accounts.login("c@x.com", "nope").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn unknown_email_is_account_not_found() {
        let (accounts, _) = service();

        let result = accounts.login("ghost@x.com", "pa55word").await;
        assert!(matches!(result, Err(AppError::AccountNotFound)));
    }

    #[tokio::test]
    async fn store_outage_is_a_persistence_error() {
        let (accounts, store) = service();
        store.set_offline(true);

        let result = accounts.register(request("f@x.com", Role::Farmer)).await;
        assert!(matches!(result, Err(AppError::Persistence(_))));
    }
}
