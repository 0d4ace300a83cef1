//! Keyword classifier used when the generator gives nothing usable.
//!
//! Deterministic and side-effect free: the same utterance and device state
//! always give the same directive.

use crate::directive::{ControlDirective, DeviceState};
use crate::rules::{Intent, RULES};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Lower-case, NFC-compose and collapse whitespace
pub fn normalize_utterance(utterance: &str) -> String {
    let composed: String = utterance.nfc().collect();
    composed
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First matching rule's intent, or [`Intent::Unrecognized`]
pub fn detect_intent(utterance: &str) -> Intent {
    let q = normalize_utterance(utterance);
    for rule in RULES {
        if let Some(intent) = rule.detect(&q) {
            debug!("classifier: rule '{}' matched -> {:?}", rule.name, intent);
            return intent;
        }
    }
    debug!("classifier: no rule matched");
    Intent::Unrecognized
}

/// Directive for an utterance given the current device state
pub fn classify(utterance: &str, state: &DeviceState) -> ControlDirective {
    detect_intent(utterance).apply(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{Action, FanSpeed, Mode};

    #[test]
    fn test_normalize_utterance() {
        assert_eq!(normalize_utterance("  Bật   ĐIỀU HÒA \n"), "bật điều hòa");
        // Decomposed input composes to the same string
        let decomposed: String = "tắt điều hòa".nfd().collect();
        assert_eq!(normalize_utterance(&decomposed), "tắt điều hòa");
    }

    #[test]
    fn test_priority_power_on_over_temperature() {
        assert_eq!(detect_intent("bật điều hòa 24 độ"), Intent::PowerOn);
    }

    #[test]
    fn test_priority_cooler_over_hot() {
        assert_eq!(detect_intent("nóng quá, cho mát hơn"), Intent::Cooler);
    }

    #[test]
    fn test_english_phrases() {
        assert_eq!(detect_intent("Please TURN ON the AC"), Intent::PowerOn);
        assert_eq!(detect_intent("make it colder"), Intent::Cooler);
        assert_eq!(detect_intent("fan only please"), Intent::FanOnly);
        assert_eq!(detect_intent("it's getting hotter"), Intent::Hot);
    }

    #[test]
    fn test_english_keywords_inside_words_ignored() {
        assert_eq!(detect_intent("take a photo"), Intent::Unrecognized);
        assert_eq!(
            detect_intent("laundry done, 24 degrees"),
            Intent::SetTemperature(24)
        );

        let state = DeviceState::new(28.0, true, 24.0);
        let d = classify("set 24 degrees for the photoshoot", &state);
        assert_eq!(d.action, Action::Adjust);
        assert_eq!(d.temperature, 24);
    }

    #[test]
    fn test_unrecognized_when_off_turns_on() {
        let state = DeviceState::new(27.0, false, 23.0);
        let d = classify("xin chào", &state);
        assert_eq!(d.action, Action::TurnOn);
        assert_eq!(d.temperature, 25);
        assert_eq!(d.fan_speed, FanSpeed::Medium);
        assert_eq!(d.mode, Mode::Cool);
    }

    #[test]
    fn test_unrecognized_when_on_maintains() {
        let state = DeviceState::new(27.0, true, 23.0).with_mode(Mode::Heat);
        let d = classify("hôm nay thế nào", &state);
        assert_eq!(d.action, Action::Maintain);
        assert_eq!(d.temperature, 23);
        assert_eq!(d.mode, Mode::Heat);
    }
}
