//! Aircon Common - control directive model and the two pure producers of it.
//!
//! The normalizer turns free-text generator output into a range-checked
//! [`ControlDirective`]; the classifier builds one from a user utterance and the
//! current [`DeviceState`] when the generator output is unusable.

pub mod classifier;
pub mod directive;
pub mod error;
pub mod normalizer;
pub mod rules;

pub use classifier::{classify, detect_intent, normalize_utterance};
pub use directive::*;
pub use error::DirectiveError;
pub use normalizer::{extract_json_object, normalize};
pub use rules::{Intent, Matcher, Rule, RULES};
