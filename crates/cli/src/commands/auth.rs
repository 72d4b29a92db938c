use serde_json::json;

use trackline_remote::AuthService;

use crate::commands::{connect, load_config, runtime, sign_in_operator, CommandResult};

pub fn login() -> CommandResult {
    const COMMAND: &str = "login";

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let service = match connect(COMMAND, &config) {
            Ok(service) => service,
            Err(result) => return result,
        };

        match sign_in_operator(COMMAND, &config, &service).await {
            Ok(session) => CommandResult::success_with_data(
                COMMAND,
                "credentials accepted",
                json!({ "user_id": session.user.id, "email": session.user.email }),
            ),
            Err(result) => result,
        }
    })
}

/// Signs in and immediately revokes the session, verifying the full
/// sign-in/sign-out round trip against the auth sub-service.
pub fn logout() -> CommandResult {
    const COMMAND: &str = "logout";

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let service = match connect(COMMAND, &config) {
            Ok(service) => service,
            Err(result) => return result,
        };
        if let Err(result) = sign_in_operator(COMMAND, &config, &service).await {
            return result;
        }

        match service.sign_out().await {
            Ok(()) => CommandResult::success(COMMAND, "session revoked"),
            Err(error) => CommandResult::failure(COMMAND, "auth", error.to_string(), 4),
        }
    })
}

pub fn whoami() -> CommandResult {
    const COMMAND: &str = "whoami";

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let service = match connect(COMMAND, &config) {
            Ok(service) => service,
            Err(result) => return result,
        };
        if let Err(result) = sign_in_operator(COMMAND, &config, &service).await {
            return result;
        }

        match service.current_user().await {
            Some(user) => CommandResult::success_with_data(
                COMMAND,
                "authenticated",
                json!({ "user_id": user.id, "email": user.email }),
            ),
            None => CommandResult::failure(COMMAND, "auth", "no active session", 4),
        }
    })
}
