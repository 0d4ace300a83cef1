//! Request resolution: generator first, keyword classifier as fallback.
//!
//! ## Flow
//!
//! ```text
//! Remote ──text──> normalize ──ok──────────> Normalized
//!    │                 └──Unparseable──────> Fallback
//!    └──generator error────────────────────> Fallback
//! ```
//!
//! Every request ends with a directive; generator problems are recorded in
//! [`Resolution::fallback_cause`] rather than returned as errors.

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::generator::{GeminiGenerator, TextGenerator};
use crate::logging::preview;
use crate::prompt::build_prompt;
use crate::request::RelayRequest;
use aircon_common::{classify, normalize, ControlDirective, DeviceState, DirectiveError};
use serde::Serialize;
use tracing::{info, warn};

/// Where a resolution got its directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Generator call made
    Remote,
    /// Generator text normalized into a directive
    Normalized,
    /// Keyword classifier produced the directive
    Fallback,
}

/// Why the classifier had to step in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCause {
    RemoteFailed(String),
    Unparseable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub directive: ControlDirective,
    /// Final stage
    pub stage: Stage,
    /// Stages passed through, in order
    pub trail: Vec<Stage>,
    pub fallback_cause: Option<FallbackCause>,
}

impl Resolution {
    fn normalized(directive: ControlDirective) -> Self {
        Self {
            directive,
            stage: Stage::Normalized,
            trail: vec![Stage::Remote, Stage::Normalized],
            fallback_cause: None,
        }
    }

    fn fallback(directive: ControlDirective, cause: FallbackCause) -> Self {
        Self {
            directive,
            stage: Stage::Fallback,
            trail: vec![Stage::Remote, Stage::Fallback],
            fallback_cause: Some(cause),
        }
    }

    pub fn used_fallback(&self) -> bool {
        self.stage == Stage::Fallback
    }
}

/// Turn a finished generator call into a resolution
pub fn resolve_remote_outcome(
    outcome: Result<String, RelayError>,
    utterance: &str,
    state: &DeviceState,
) -> Resolution {
    let text = match outcome {
        Ok(text) => text,
        Err(e) => {
            warn!("Generator failed ({}), using keyword fallback", e);
            return Resolution::fallback(
                classify(utterance, state),
                FallbackCause::RemoteFailed(e.to_string()),
            );
        }
    };

    match normalize(&text) {
        Ok(directive) => {
            info!("Action: {}", directive.action);
            Resolution::normalized(directive)
        }
        Err(DirectiveError::Unparseable(detail)) => {
            warn!(
                "Unusable generator reply ({}): {}",
                detail,
                preview(&text, 150)
            );
            Resolution::fallback(
                classify(utterance, state),
                FallbackCause::Unparseable(detail),
            )
        }
    }
}

/// Relay bound to a configuration and a generator
pub struct Relay<G: TextGenerator> {
    config: RelayConfig,
    generator: G,
}

impl Relay<GeminiGenerator> {
    /// Relay talking to Gemini as configured
    pub fn gemini(config: RelayConfig) -> Result<Self, RelayError> {
        let generator = GeminiGenerator::new(&config.generator)?;
        Ok(Self::new(config, generator))
    }
}

impl<G: TextGenerator> Relay<G> {
    pub fn new(config: RelayConfig, generator: G) -> Self {
        Self { config, generator }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Resolve one request to a directive; never fails
    pub async fn resolve(&self, request: &RelayRequest) -> Resolution {
        info!(
            "Query via {}: {}",
            self.generator.name(),
            preview(&request.query, 100)
        );

        let prompt = build_prompt(
            &self.config.generator.system_prompt,
            &request.query,
            request.device_state.as_ref(),
        );
        let outcome = self.generator.generate(&prompt).await;

        resolve_remote_outcome(outcome, &request.query, &request.state_or_default())
    }
}
