//! Aircon Relay - generator plumbing around the directive core.
//!
//! Builds the prompt, calls the remote text generator, and resolves every
//! request to a [`aircon_common::ControlDirective`], falling back to the keyword
//! classifier when the generator fails or replies with nothing usable.

pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod prompt;
pub mod request;
pub mod resolver;

pub use config::{GeneratorConfig, LoggingConfig, RelayConfig};
pub use error::RelayError;
pub use generator::{GeminiGenerator, TextGenerator};
pub use request::RelayRequest;
pub use resolver::{resolve_remote_outcome, FallbackCause, Relay, Resolution, Stage};
