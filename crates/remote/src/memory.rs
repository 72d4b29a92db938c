use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use trackline_core::{
    AuthUser, Customer, CustomerId, CustomerPatch, NewCustomer, Session, UserId,
};

use crate::service::{AuthService, CustomerService, ServiceError};

/// In-memory stand-in for the hosted service.
///
/// Timestamps come from a monotonic tick rather than the wall clock, so row
/// ordering is deterministic even when rows are created back to back. One
/// failure can be staged with [`fail_next_with`](Self::fail_next_with) and is
/// consumed by the next customer operation, which lets callers exercise their
/// failure paths.
#[derive(Default)]
pub struct InMemoryDataService {
    rows: RwLock<Vec<Customer>>,
    accounts: RwLock<HashMap<String, (String, AuthUser)>>,
    session: RwLock<Option<Session>>,
    tick: AtomicI64,
    fail_next: Mutex<Option<ServiceError>>,
}

impl InMemoryDataService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `error` to be returned by the next customer operation.
    pub async fn fail_next_with(&self, error: ServiceError) {
        *self.fail_next.lock().await = Some(error);
    }

    async fn take_staged_failure(&self) -> Result<(), ServiceError> {
        match self.fail_next.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let tick = self.tick.fetch_add(1, Ordering::SeqCst);
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
        base + chrono::Duration::seconds(tick)
    }

    fn newest_first(mut rows: Vec<Customer>) -> Vec<Customer> {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl CustomerService for InMemoryDataService {
    async fn list(&self) -> Result<Vec<Customer>, ServiceError> {
        self.take_staged_failure().await?;
        Ok(Self::newest_first(self.rows.read().await.clone()))
    }

    async fn insert(
        &self,
        new: NewCustomer,
        created_by: UserId,
    ) -> Result<Customer, ServiceError> {
        self.take_staged_failure().await?;

        let now = self.next_timestamp();
        let row = Customer {
            id: CustomerId(Uuid::new_v4()),
            customer_name: new.customer_name,
            unique_id: new.unique_id,
            tracking_number: new.tracking_number,
            status: new.status,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            created_by,
        };

        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer, ServiceError> {
        self.take_staged_failure().await?;

        let updated_at = self.next_timestamp();
        let mut rows = self.rows.write().await;
        let row = rows.iter_mut().find(|row| row.id == id).ok_or(ServiceError::NotFound(id))?;

        if let Some(customer_name) = patch.customer_name {
            row.customer_name = customer_name;
        }
        if let Some(unique_id) = patch.unique_id {
            row.unique_id = unique_id;
        }
        if let Some(tracking_number) = patch.tracking_number {
            row.tracking_number = tracking_number;
        }
        if let Some(status) = patch.status {
            row.status = status;
        }
        if let Some(notes) = patch.notes {
            row.notes = Some(notes);
        }
        row.updated_at = updated_at;

        Ok(row.clone())
    }

    async fn delete(&self, id: CustomerId) -> Result<(), ServiceError> {
        self.take_staged_failure().await?;
        self.rows.write().await.retain(|row| row.id != id);
        Ok(())
    }

    async fn search(&self, term: &str) -> Result<Vec<Customer>, ServiceError> {
        self.take_staged_failure().await?;

        let matches = self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| row.matches_term(term))
            .cloned()
            .collect();

        Ok(Self::newest_first(matches))
    }
}

#[async_trait]
impl AuthService for InMemoryDataService {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Session, ServiceError> {
        let _ = full_name;
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(ServiceError::Auth(format!("account `{email}` already exists")));
        }

        let user = AuthUser { id: UserId(Uuid::new_v4()), email: email.to_string() };
        accounts.insert(email.to_string(), (password.to_string(), user.clone()));

        let session = Session { user, access_token: format!("stub-token-{email}").into() };
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        let accounts = self.accounts.read().await;
        let Some((stored_password, user)) = accounts.get(email) else {
            return Err(ServiceError::Auth("invalid login credentials".to_string()));
        };
        if stored_password != password {
            return Err(ServiceError::Auth("invalid login credentials".to_string()));
        }

        let session =
            Session { user: user.clone(), access_token: format!("stub-token-{email}").into() };
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        *self.session.write().await = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.session.read().await.as_ref().map(|session| session.user.clone())
    }
}
