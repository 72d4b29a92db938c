//! Deterministic sample rows for `trackline seed` and tests.

use trackline_core::{CustomerStatus, NewCustomer};

pub fn sample_customers() -> Vec<NewCustomer> {
    vec![
        NewCustomer {
            customer_name: "Acme Co".to_string(),
            unique_id: "ACME-001".to_string(),
            tracking_number: "TRK-1001".to_string(),
            status: CustomerStatus::Active,
            notes: Some("priority account".to_string()),
        },
        NewCustomer {
            customer_name: "Globex Corporation".to_string(),
            unique_id: "GLBX-002".to_string(),
            tracking_number: "TRK-1002".to_string(),
            status: CustomerStatus::Pending,
            notes: None,
        },
        NewCustomer {
            customer_name: "Initech".to_string(),
            unique_id: "INIT-003".to_string(),
            tracking_number: "TRK-1003".to_string(),
            status: CustomerStatus::Completed,
            notes: Some("migration finished 2024-02".to_string()),
        },
        NewCustomer {
            customer_name: "Umbrella Holdings".to_string(),
            unique_id: "UMBR-004".to_string(),
            tracking_number: "TRK-1004".to_string(),
            status: CustomerStatus::Cancelled,
            notes: None,
        },
    ]
}
