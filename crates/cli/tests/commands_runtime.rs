use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;

use trackline_cli::commands::customers::{self, AddArgs, EditArgs};
use trackline_cli::commands::{auth, config as config_cmd, doctor};

const REMOTE_ENV: [(&str, &str); 2] = [
    ("TRACKLINE_REMOTE_BASE_URL", "https://demo.example.dev"),
    ("TRACKLINE_REMOTE_ANON_KEY", "publishable-test-key-123456"),
];

#[test]
fn search_rejects_empty_term_before_any_remote_work() {
    with_env(&[], || {
        // No remote config is present, so reaching the network (or even config
        // loading) would fail; the blank-term guard must fire first.
        let result = customers::search("   ".to_string());
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "search");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "validation");
    });
}

#[test]
fn list_fails_config_validation_without_remote_settings() {
    with_env(&[], || {
        let result = customers::list(None);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "list");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn list_rejects_unknown_status_filter() {
    with_env(&REMOTE_ENV, || {
        let result = customers::list(Some("archived".to_string()));
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "validation");
        assert!(payload["message"].as_str().expect("message").contains("archived"));
    });
}

#[test]
fn add_rejects_blank_required_fields() {
    with_env(&REMOTE_ENV, || {
        let result = customers::add(AddArgs {
            name: "  ".to_string(),
            unique_id: "U1".to_string(),
            tracking: "T1".to_string(),
            status: None,
            notes: None,
        });
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "add");
        assert_eq!(payload["error_class"], "validation");
        assert!(payload["message"].as_str().expect("message").contains("customer_name"));
    });
}

#[test]
fn edit_requires_at_least_one_field() {
    with_env(&REMOTE_ENV, || {
        let result = customers::edit(EditArgs {
            id: "7a4b84bc-94c4-4dd7-a166-4a3bd3c0e765".to_string(),
            name: None,
            unique_id: None,
            tracking: None,
            status: None,
            notes: None,
        });
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "validation");
        assert_eq!(payload["message"], "no fields to update");
    });
}

#[test]
fn edit_rejects_malformed_customer_id() {
    with_env(&REMOTE_ENV, || {
        let result = customers::edit(EditArgs {
            id: "not-a-uuid".to_string(),
            name: Some("Acme Co".to_string()),
            unique_id: None,
            tracking: None,
            status: None,
            notes: None,
        });
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "validation");
    });
}

#[test]
fn remove_rejects_malformed_customer_id() {
    with_env(&REMOTE_ENV, || {
        let result = customers::remove("12345".to_string());
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "remove");
        assert_eq!(payload["error_class"], "validation");
    });
}

#[test]
fn login_requires_operator_credentials() {
    with_env(&REMOTE_ENV, || {
        let result = auth::login();
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "login");
        assert_eq!(payload["error_class"], "auth_credentials");
    });
}

#[test]
fn config_command_redacts_the_service_key() {
    with_env(&REMOTE_ENV, || {
        let output = config_cmd::run();
        assert!(output.contains("remote.base_url = https://demo.example.dev"));
        assert!(output.contains("env (TRACKLINE_REMOTE_BASE_URL)"));
        assert!(!output.contains("publishable-test-key-123456"));
        assert!(output.contains("auth.password = <unset>"));
    });
}

#[test]
fn doctor_reports_config_failure_without_remote_settings() {
    with_env(&[], || {
        let output = doctor::run(true);
        let payload: Value = serde_json::from_str(&output).expect("doctor json");

        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|error| {
        panic!("command output was not valid JSON ({error}): {output}");
    })
}

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn with_env(vars: &[(&str, &str)], test: impl FnOnce()) {
    let _guard = env_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    const MANAGED: [&str; 7] = [
        "TRACKLINE_REMOTE_BASE_URL",
        "TRACKLINE_REMOTE_ANON_KEY",
        "TRACKLINE_REMOTE_TIMEOUT_SECS",
        "TRACKLINE_AUTH_EMAIL",
        "TRACKLINE_AUTH_PASSWORD",
        "TRACKLINE_LOGGING_LEVEL",
        "TRACKLINE_LOGGING_FORMAT",
    ];

    let previous: Vec<(String, Option<String>)> = MANAGED
        .iter()
        .map(|key| ((*key).to_string(), env::var(key).ok()))
        .collect();

    for key in MANAGED {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test();

    for (key, value) in previous {
        match value {
            Some(value) => env::set_var(&key, value),
            None => env::remove_var(&key),
        }
    }
}
