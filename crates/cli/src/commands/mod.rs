pub mod auth;
pub mod config;
pub mod customers;
pub mod doctor;
pub mod seed;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use trackline_core::config::{AppConfig, LoadOptions};
use trackline_core::Session;
use trackline_remote::{AuthService, RestDataService};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::outcome(command, None, message, None, 0)
    }

    pub fn success_with_data(command: &str, message: impl Into<String>, data: Value) -> Self {
        Self::outcome(command, None, message, Some(data), 0)
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::outcome(command, Some(error_class), message, None, exit_code)
    }

    fn outcome(
        command: &str,
        error_class: Option<&str>,
        message: impl Into<String>,
        data: Option<Value>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: if error_class.is_none() { "ok" } else { "error" }.to_string(),
            error_class: error_class.map(str::to_string),
            message: message.into(),
            data,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", format!("configuration issue: {error}"), 2)
    })
}

pub(crate) fn runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

pub(crate) fn connect(command: &str, config: &AppConfig) -> Result<Arc<RestDataService>, CommandResult> {
    RestDataService::new(&config.remote).map(Arc::new).map_err(|error| {
        CommandResult::failure(command, "remote_client", error.to_string(), 4)
    })
}

/// Signs in with the configured operator credentials. Commands that write
/// customer rows need the resulting session's user id for `created_by`.
pub(crate) async fn sign_in_operator(
    command: &str,
    config: &AppConfig,
    service: &RestDataService,
) -> Result<Session, CommandResult> {
    let (Some(email), Some(password)) = (&config.auth.email, &config.auth.password) else {
        return Err(CommandResult::failure(
            command,
            "auth_credentials",
            "auth.email and auth.password must be configured (or set TRACKLINE_AUTH_EMAIL / TRACKLINE_AUTH_PASSWORD)",
            2,
        ));
    };

    use secrecy::ExposeSecret;
    service.sign_in(email, password.expose_secret()).await.map_err(|error| {
        CommandResult::failure(command, "auth", error.to_string(), 4)
    })
}
