use serde_json::json;

use trackline_remote::fixtures;
use trackline_store::CustomerStore;

use crate::commands::{connect, load_config, runtime, sign_in_operator, CommandResult};

/// Inserts the deterministic sample customers through the store, so seeded
/// rows follow the same path as operator-created ones.
pub fn run() -> CommandResult {
    const COMMAND: &str = "seed";

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
        let session = match sign_in_operator(COMMAND, &config, &service).await {
            Ok(session) => session,
            Err(result) => return result,
        };

        let store = CustomerStore::new(service);
        let mut created = Vec::new();
        for row in fixtures::sample_customers() {
            match store.create(row, session.user.id).await {
                Ok(customer) => created.push(customer.id),
                Err(error) => {
                    return CommandResult::failure(
                        COMMAND,
                        "remote",
                        format!("seed aborted after {} row(s): {error}", created.len()),
                        4,
                    );
                }
            }
        }

        CommandResult::success_with_data(
            COMMAND,
            format!("seeded {} customer(s)", created.len()),
            json!({ "ids": created }),
        )
    })
}
