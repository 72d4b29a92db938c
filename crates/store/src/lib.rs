//! The customer store: an explicit, independently testable cache of the
//! customer collection with subscribe/notify semantics, decoupled from any
//! rendering mechanism. Presentation layers render from
//! [`StoreSnapshot`]s and call the store's operations; the store mediates all
//! remote reads and writes.

pub mod customers;

pub use customers::{CustomerStore, StoreError, StoreSnapshot};
