use serde_json::json;
use uuid::Uuid;

use trackline_core::{CustomerId, CustomerPatch, CustomerStatus, NewCustomer};
use trackline_store::{CustomerStore, StoreError};

use crate::commands::{connect, load_config, runtime, sign_in_operator, CommandResult};

pub struct AddArgs {
    pub name: String,
    pub unique_id: String,
    pub tracking: String,
    pub status: Option<String>,
    pub notes: Option<String>,
}

pub struct EditArgs {
    pub id: String,
    pub name: Option<String>,
    pub unique_id: Option<String>,
    pub tracking: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

pub fn list(status: Option<String>) -> CommandResult {
    const COMMAND: &str = "list";

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let status_filter = match status.as_deref().map(str::parse::<CustomerStatus>) {
        Some(Ok(status)) => Some(status),
        Some(Err(error)) => return CommandResult::failure(COMMAND, "validation", error.to_string(), 2),
        None => None,
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

        if config.has_credentials() {
            if let Err(result) = sign_in_operator(COMMAND, &config, &service).await {
                return result;
            }
        }

        let store = CustomerStore::new(service);
        if let Err(error) = store.load().await {
            return CommandResult::failure(COMMAND, "remote", error.to_string(), 4);
        }

        let mut items = store.snapshot().items;
        if let Some(wanted) = status_filter {
            items.retain(|row| row.status == wanted);
        }

        let count = items.len();
        CommandResult::success_with_data(
            COMMAND,
            format!("{count} customer(s)"),
            json!(items),
        )
    })
}

pub fn add(args: AddArgs) -> CommandResult {
    const COMMAND: &str = "add";

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let status = match args.status.as_deref().map(str::parse::<CustomerStatus>) {
        Some(Ok(status)) => status,
        Some(Err(error)) => return CommandResult::failure(COMMAND, "validation", error.to_string(), 2),
        None => CustomerStatus::default(),
    };

    let new = NewCustomer {
        customer_name: args.name,
        unique_id: args.unique_id,
        tracking_number: args.tracking,
        status,
        notes: args.notes.filter(|notes| !notes.trim().is_empty()),
    };
    if let Err(error) = new.validate() {
        return CommandResult::failure(COMMAND, "validation", error.to_string(), 2);
    }

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
        match store.create(new, session.user.id).await {
            Ok(row) => CommandResult::success_with_data(
                COMMAND,
                format!("created customer {}", row.id),
                json!(row),
            ),
            Err(error) => CommandResult::failure(COMMAND, "remote", error.to_string(), 4),
        }
    })
}

pub fn edit(args: EditArgs) -> CommandResult {
    const COMMAND: &str = "edit";

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let id = match args.id.parse::<Uuid>() {
        Ok(id) => CustomerId(id),
        Err(_) => {
            return CommandResult::failure(
                COMMAND,
                "validation",
                format!("`{}` is not a valid customer id", args.id),
                2,
            );
        }
    };

    let status = match args.status.as_deref().map(str::parse::<CustomerStatus>) {
        Some(Ok(status)) => Some(status),
        Some(Err(error)) => return CommandResult::failure(COMMAND, "validation", error.to_string(), 2),
        None => None,
    };

    let patch = CustomerPatch {
        customer_name: args.name,
        unique_id: args.unique_id,
        tracking_number: args.tracking,
        status,
        notes: args.notes,
    };
    if patch.is_empty() {
        return CommandResult::failure(COMMAND, "validation", "no fields to update", 2);
    }

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

        let store = CustomerStore::new(service);
        match store.update(id, patch).await {
            Ok(row) => CommandResult::success_with_data(
                COMMAND,
                format!("updated customer {}", row.id),
                json!(row),
            ),
            Err(StoreError::Service(error @ trackline_remote::ServiceError::NotFound(_))) => {
                CommandResult::failure(COMMAND, "not_found", error.to_string(), 5)
            }
            Err(error) => CommandResult::failure(COMMAND, "remote", error.to_string(), 4),
        }
    })
}

pub fn remove(id: String) -> CommandResult {
    const COMMAND: &str = "remove";

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let id = match id.parse::<Uuid>() {
        Ok(id) => CustomerId(id),
        Err(_) => {
            return CommandResult::failure(
                COMMAND,
                "validation",
                format!("`{id}` is not a valid customer id"),
                2,
            );
        }
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

        let store = CustomerStore::new(service);
        match store.remove(id).await {
            Ok(()) => CommandResult::success(COMMAND, format!("deleted customer {id}")),
            Err(error) => CommandResult::failure(COMMAND, "remote", error.to_string(), 4),
        }
    })
}

pub fn search(term: String) -> CommandResult {
    const COMMAND: &str = "search";

    // The original search form disables submission for blank input; the same
    // contract applies here, before any remote work.
    let term = term.trim().to_string();
    if term.is_empty() {
        return CommandResult::failure(COMMAND, "validation", "search term must not be empty", 2);
    }

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

        if config.has_credentials() {
            if let Err(result) = sign_in_operator(COMMAND, &config, &service).await {
                return result;
            }
        }

        let store = CustomerStore::new(service);
        match store.search(&term).await {
            Ok(rows) => CommandResult::success_with_data(
                COMMAND,
                format!("{} match(es) for `{term}`", rows.len()),
                json!(rows),
            ),
            Err(error) => CommandResult::failure(COMMAND, "remote", error.to_string(), 4),
        }
    })
}
