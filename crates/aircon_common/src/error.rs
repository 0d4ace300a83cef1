//! Error types for directive handling.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// No JSON object could be located in, or parsed from, the generator text.
    #[error("No usable JSON directive in response: {0}")]
    Unparseable(String),
}
