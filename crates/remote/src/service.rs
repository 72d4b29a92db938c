use async_trait::async_trait;
use thiserror::Error;

use trackline_core::{AuthUser, Customer, CustomerId, CustomerPatch, NewCustomer, Session, UserId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("remote service rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("no customer row with id {0}")]
    NotFound(CustomerId),
    #[error("authentication failure: {0}")]
    Auth(String),
    #[error("decode failure: {0}")]
    Decode(String),
}

/// Row-level operations on the `customers` table.
///
/// `list` and `search` return rows ordered by `created_at` descending (newest
/// first). `insert` leaves `id`, `created_at` and `updated_at` to the remote
/// side; `update` surfaces a missing row as [`ServiceError::NotFound`] rather
/// than silently succeeding.
#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn list(&self) -> Result<Vec<Customer>, ServiceError>;

    async fn insert(&self, new: NewCustomer, created_by: UserId)
        -> Result<Customer, ServiceError>;

    async fn update(&self, id: CustomerId, patch: CustomerPatch)
        -> Result<Customer, ServiceError>;

    async fn delete(&self, id: CustomerId) -> Result<(), ServiceError>;

    /// Case-insensitive substring match of `term` against `customer_name`,
    /// `unique_id` OR `tracking_number`.
    async fn search(&self, term: &str) -> Result<Vec<Customer>, ServiceError>;
}

/// Session-based authentication against the hosted service. Kept separate from
/// [`CustomerService`] so the store can be exercised with a data-only stub.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Session, ServiceError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ServiceError>;

    async fn sign_out(&self) -> Result<(), ServiceError>;

    async fn current_user(&self) -> Option<AuthUser>;
}
