//! REST implementation of the service traits, speaking the hosted service's
//! two HTTP dialects: a PostgREST-style row API under `/rest/v1` and a
//! GoTrue-style auth API under `/auth/v1`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use trackline_core::config::RemoteConfig;
use trackline_core::{AuthUser, Customer, CustomerId, CustomerPatch, NewCustomer, Session, UserId};

use crate::service::{AuthService, CustomerService, ServiceError};

const CUSTOMERS_PATH: &str = "rest/v1/customers";

pub struct RestDataService {
    http: Client,
    base_url: String,
    anon_key: SecretString,
    session: RwLock<Option<Session>>,
}

impl RestDataService {
    pub fn new(config: &RemoteConfig) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
        })
    }

    /// Liveness probe against the auth sub-service; used by `doctor`.
    pub async fn health(&self) -> Result<(), ServiceError> {
        let response = self
            .http
            .get(self.endpoint("auth/v1/health"))
            .header("apikey", self.anon_key.expose_secret())
            .send()
            .await
            .map_err(transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(remote_error(response).await)
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Attaches the service key plus the session token when signed in; the
    /// anonymous key doubles as the bearer otherwise.
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let session = self.session.read().await;
        let bearer = session
            .as_ref()
            .map(|session| session.access_token.expose_secret().to_string())
            .unwrap_or_else(|| self.anon_key.expose_secret().to_string());

        request.header("apikey", self.anon_key.expose_secret()).bearer_auth(bearer)
    }

    async fn rows_from(&self, response: Response) -> Result<Vec<Customer>, ServiceError> {
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        response.json::<Vec<Customer>>().await.map_err(|error| {
            ServiceError::Decode(format!("could not decode customer rows: {error}"))
        })
    }
}

#[derive(Serialize)]
struct InsertRow<'a> {
    #[serde(flatten)]
    new: &'a NewCustomer,
    created_by: UserId,
}

#[derive(Deserialize)]
struct AuthPayload {
    access_token: Option<String>,
    user: Option<WireUser>,
}

#[derive(Deserialize)]
struct WireUser {
    id: Uuid,
    email: Option<String>,
}

#[async_trait]
impl CustomerService for RestDataService {
    async fn list(&self) -> Result<Vec<Customer>, ServiceError> {
        let request = self
            .http
            .get(self.endpoint(CUSTOMERS_PATH))
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        let response = self.authorize(request).await.send().await.map_err(transport)?;
        self.rows_from(response).await
    }

    async fn insert(
        &self,
        new: NewCustomer,
        created_by: UserId,
    ) -> Result<Customer, ServiceError> {
        let request = self
            .http
            .post(self.endpoint(CUSTOMERS_PATH))
            .header("Prefer", "return=representation")
            .json(&InsertRow { new: &new, created_by });

        let response = self.authorize(request).await.send().await.map_err(transport)?;
        let mut rows = self.rows_from(response).await?;

        rows.pop().ok_or_else(|| {
            ServiceError::Decode("insert succeeded but returned no representation".to_string())
        })
    }

    async fn update(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer, ServiceError> {
        let request = self
            .http
            .patch(self.endpoint(CUSTOMERS_PATH))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch);

        let response = self.authorize(request).await.send().await.map_err(transport)?;
        let mut rows = self.rows_from(response).await?;

        rows.pop().ok_or(ServiceError::NotFound(id))
    }

    async fn delete(&self, id: CustomerId) -> Result<(), ServiceError> {
        let request = self
            .http
            .delete(self.endpoint(CUSTOMERS_PATH))
            .query(&[("id", format!("eq.{id}"))]);

        let response = self.authorize(request).await.send().await.map_err(transport)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(remote_error(response).await)
        }
    }

    async fn search(&self, term: &str) -> Result<Vec<Customer>, ServiceError> {
        let request = self.http.get(self.endpoint(CUSTOMERS_PATH)).query(&[
            ("select", "*"),
            ("or", or_filter(term).as_str()),
            ("order", "created_at.desc"),
        ]);

        let response = self.authorize(request).await.send().await.map_err(transport)?;
        self.rows_from(response).await
    }
}

#[async_trait]
impl AuthService for RestDataService {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Session, ServiceError> {
        let response = self
            .http
            .post(self.endpoint("auth/v1/signup"))
            .header("apikey", self.anon_key.expose_secret())
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await
            .map_err(transport)?;

        let session = session_from(response).await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        let response = self
            .http
            .post(self.endpoint("auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", self.anon_key.expose_secret())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport)?;

        let session = session_from(response).await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };

        let response = self
            .http
            .post(self.endpoint("auth/v1/logout"))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(session.access_token.expose_secret())
            .send()
            .await
            .map_err(transport)?;

        // The local session is already gone; a remote refusal is still an error.
        if response.status().is_success() {
            Ok(())
        } else {
            Err(auth_error(response).await)
        }
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.session.read().await.as_ref().map(|session| session.user.clone())
    }
}

fn transport(error: reqwest::Error) -> ServiceError {
    ServiceError::Transport(error.to_string())
}

async fn remote_error(response: Response) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ServiceError::Remote { status: status.as_u16(), message: error_message(&body) }
}

async fn auth_error(response: Response) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ServiceError::Auth(format!("{} ({status})", error_message(&body)))
}

async fn session_from(response: Response) -> Result<Session, ServiceError> {
    if !response.status().is_success() {
        let status = response.status();
        // Credential problems come back as 400/401/422 from the auth API.
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            return Err(auth_error(response).await);
        }
        return Err(remote_error(response).await);
    }

    let payload = response
        .json::<AuthPayload>()
        .await
        .map_err(|error| ServiceError::Decode(format!("could not decode auth payload: {error}")))?;

    let (Some(access_token), Some(user)) = (payload.access_token, payload.user) else {
        // Sign-up with email confirmation enabled returns a user without a
        // token; there is no usable session until the address is confirmed.
        return Err(ServiceError::Auth(
            "no session was issued; the account may require email confirmation".to_string(),
        ));
    };

    Ok(Session {
        user: AuthUser { id: UserId(user.id), email: user.email.unwrap_or_default() },
        access_token: access_token.into(),
    })
}

/// Extracts a human-readable message from an error body, which may use any of
/// the service's error envelopes, or be plain text.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error_description", "msg", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() { "no error detail provided".to_string() } else { trimmed.to_string() }
}

/// Builds the disjunctive ilike filter over the three searchable columns:
/// `(customer_name.ilike.*term*,unique_id.ilike.*term*,tracking_number.ilike.*term*)`.
fn or_filter(term: &str) -> String {
    let pattern = ilike_pattern(term);
    format!(
        "(customer_name.ilike.{pattern},unique_id.ilike.{pattern},tracking_number.ilike.{pattern})"
    )
}

/// Wraps `term` in wildcards and double quotes. Quoting keeps reserved filter
/// characters (commas, parentheses, dots) inert; quotes and backslashes inside
/// the term are escaped.
fn ilike_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"*{escaped}*\"")
}
