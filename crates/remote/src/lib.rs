//! Typed client for the Remote Data Service.
//!
//! The hosted service exposes row-level CRUD plus filtered queries over the
//! `customers` table and session-based authentication. This crate defines the
//! two seams the rest of the workspace programs against:
//!
//! - [`CustomerService`] — list/insert/update/delete/search over customer rows
//! - [`AuthService`] — sign-up, sign-in, sign-out, current session
//!
//! `RestDataService` implements both against the live HTTP service;
//! `InMemoryDataService` is a deterministic stand-in for tests.

pub mod fixtures;
pub mod memory;
pub mod rest;
pub mod service;

pub use memory::InMemoryDataService;
pub use rest::RestDataService;
pub use service::{AuthService, CustomerService, ServiceError};
