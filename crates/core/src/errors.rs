use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("required field `{0}` is empty")]
    MissingField(&'static str),
    #[error("unknown customer status `{0}` (expected active|pending|completed|cancelled)")]
    UnknownStatus(String),
    #[error("unknown user role `{0}` (expected admin|manager|member)")]
    UnknownRole(String),
}
