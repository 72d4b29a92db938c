use serde::Serialize;

use trackline_core::config::{AppConfig, LoadOptions};
use trackline_remote::RestDataService;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_credentials(&config));
            checks.push(check_remote_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "operator_credentials",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "remote_reachability",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let required_pass = checks
        .iter()
        .all(|check| matches!(check.status, CheckStatus::Pass | CheckStatus::Skipped))
        && checks.first().map(|check| check.status == CheckStatus::Pass).unwrap_or(false);
    let overall_status = if required_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if required_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_credentials(config: &AppConfig) -> DoctorCheck {
    if config.has_credentials() {
        DoctorCheck {
            name: "operator_credentials",
            status: CheckStatus::Pass,
            details: "auth.email and auth.password are configured".to_string(),
        }
    } else {
        // Read-only use works anonymously, so absent credentials are not a failure.
        DoctorCheck {
            name: "operator_credentials",
            status: CheckStatus::Skipped,
            details: "no operator credentials configured; mutating commands will be refused"
                .to_string(),
        }
    }
}

fn check_remote_reachability(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "remote_reachability",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let service = RestDataService::new(&config.remote)
            .map_err(|error| format!("failed to build remote client: {error}"))?;
        service
            .health()
            .await
            .map_err(|error| format!("health probe failed: {error}"))
    });

    match result {
        Ok(()) => DoctorCheck {
            name: "remote_reachability",
            status: CheckStatus::Pass,
            details: format!("reached `{}`", config.remote.base_url),
        },
        Err(error) => {
            DoctorCheck { name: "remote_reachability", status: CheckStatus::Fail, details: error }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
