use thiserror::Error;

/// Errors produced when parsing a policy from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyParseError {
    #[error("unknown merge policy '{0}' (expected mandatory, required, or ignored)")]
    Unknown(String),
}
