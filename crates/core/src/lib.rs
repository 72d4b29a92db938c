//! Domain types, configuration, and error taxonomy shared across Trackline.

pub mod config;
pub mod domain;
pub mod errors;

pub use domain::customer::{Customer, CustomerId, CustomerPatch, CustomerStatus, NewCustomer};
pub use domain::user::{AuthUser, Session, UserId, UserProfile, UserRole};
pub use errors::DomainError;
