//! Behavioural tests for the normalizer and fallback classifier.
//!
//! Covers the contract the relay depends on: range-valid output from any
//! generator text that contains an object, and deterministic fallback
//! directives for the voice commands the front end sends.

use aircon_common::{
    classify, normalize, Action, ControlDirective, DeviceState, DirectiveError, FanSpeed, Mode,
    MAX_TEMPERATURE, MIN_TEMPERATURE,
};

fn assert_range_valid(d: &ControlDirective) {
    assert!(
        (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&d.temperature),
        "temperature {} out of range",
        d.temperature
    );
}

// ============================================================================
// Normalizer
// ============================================================================

#[test]
fn valid_directive_round_trips_through_normalize() {
    for (action, fan, mode) in [
        ("turn_on", "QUIET", "COOL"),
        ("turn_off", "AUTO", "HEAT"),
        ("adjust", "HIGH", "FAN"),
        ("maintain", "low", "auto"),
    ] {
        let raw = format!(
            r#"{{"action":"{}","temperature":21,"fan_speed":"{}","mode":"{}","reason":"ok"}}"#,
            action, fan, mode
        );
        let d = normalize(&raw).unwrap();
        assert_eq!(d.action.as_str(), action);
        assert_eq!(d.temperature, 21);
        assert_eq!(d.fan_speed.as_str(), fan.to_uppercase());
        assert_eq!(d.mode.as_str(), mode.to_uppercase());
        assert_eq!(d.reason, "ok");
    }
}

#[test]
fn out_of_range_temperatures_clamp_to_nearest_bound() {
    for (input, expected) in [(5, 16), (15, 16), (16, 16), (30, 30), (31, 30), (45, 30)] {
        let d = normalize(&format!(r#"{{"temperature":{}}}"#, input)).unwrap();
        assert_eq!(d.temperature, expected, "input {}", input);
    }
}

#[test]
fn missing_or_unbalanced_braces_are_unparseable() {
    for raw in [
        "",
        "Tôi không hiểu yêu cầu",
        "{\"action\":\"turn_on\"",
        "\"action\":\"turn_on\"}",
        "}{",
    ] {
        assert!(
            matches!(normalize(raw), Err(DirectiveError::Unparseable(_))),
            "expected Unparseable for {:?}",
            raw
        );
    }
}

#[test]
fn prose_around_object_is_ignored() {
    let raw = "Phân tích: phòng nóng.\n```json\n{\"action\":\"adjust\",\"temperature\":23,\"fan_speed\":\"HIGH\",\"mode\":\"COOL\",\"reason\":\"Phòng nóng\"}\n```\nXong.";
    let d = normalize(raw).unwrap();
    assert_eq!(d.action, Action::Adjust);
    assert_eq!(d.temperature, 23);
    assert_eq!(d.fan_speed, FanSpeed::High);
    assert_eq!(d.reason, "Phòng nóng");
}

// ============================================================================
// Classifier
// ============================================================================

#[test]
fn power_on_in_hot_room_uses_low_target_and_high_fan() {
    let state = DeviceState::new(32.0, false, 25.0);
    let d = classify("bật điều hòa", &state);
    assert_eq!(d.action, Action::TurnOn);
    assert_eq!(d.temperature, 22);
    assert_eq!(d.fan_speed, FanSpeed::High);
    assert_eq!(d.mode, Mode::Cool);
}

#[test]
fn power_off_carries_current_temperature() {
    let state = DeviceState::new(25.0, true, 23.0);
    let d = classify("tắt điều hòa", &state);
    assert_eq!(d.action, Action::TurnOff);
    assert_eq!(d.temperature, 23);
}

#[test]
fn explicit_temperature_adjusts_running_unit() {
    let state = DeviceState::new(27.0, true, 26.0);
    let d = classify("24 độ", &state);
    assert_eq!(d.action, Action::Adjust);
    assert_eq!(d.temperature, 24);
    assert!(d.reason.contains("26°C"));
    assert!(d.reason.contains("24°C"));
}

#[test]
fn explicit_temperature_turns_on_idle_unit() {
    let state = DeviceState::new(27.0, false, 26.0);
    let d = classify("để 19 độ nhé", &state);
    assert_eq!(d.action, Action::TurnOn);
    assert_eq!(d.temperature, 19);
}

#[test]
fn unrecognized_command_is_deterministic() {
    let state = DeviceState::new(28.0, false, 24.0);
    let first = classify("xin chào", &state);
    let second = classify("xin chào", &state);
    assert_eq!(first, second);
    assert_eq!(first.action, Action::TurnOn);
    assert_eq!(first.temperature, 25);
}

#[test]
fn cooler_and_warmer_embed_step_values() {
    let on = DeviceState::new(27.0, true, 25.0);

    let cooler = classify("cho mát hơn", &on);
    assert_eq!(cooler.action, Action::Adjust);
    assert_eq!(cooler.temperature, 23);
    assert!(cooler.reason.contains("25°C") && cooler.reason.contains("23°C"));
    assert!(cooler.reason.contains("2°C"));

    let warmer = classify("ấm hơn một chút", &on);
    assert_eq!(warmer.action, Action::Adjust);
    assert_eq!(warmer.temperature, 27);
}

#[test]
fn cooler_when_off_turns_on_with_high_fan() {
    let off = DeviceState::new(30.0, false, 25.0);
    let d = classify("lạnh hơn đi", &off);
    assert_eq!(d.action, Action::TurnOn);
    assert_eq!(d.temperature, 22);
    assert_eq!(d.fan_speed, FanSpeed::High);
}

#[test]
fn warmer_when_off_maintains() {
    let off = DeviceState::new(22.0, false, 25.0);
    let d = classify("lạnh quá", &off);
    assert_eq!(d.action, Action::Maintain);
}

#[test]
fn dry_and_fan_modes() {
    let on = DeviceState::new(27.0, true, 24.0);
    let off = DeviceState::new(27.0, false, 24.0);

    let d = classify("độ ẩm cao quá", &on);
    assert_eq!((d.action, d.mode), (Action::Adjust, Mode::Dry));
    assert_eq!(d.temperature, 24);

    let d = classify("bật hút ẩm", &off);
    assert_eq!((d.action, d.mode), (Action::TurnOn, Mode::Dry));

    let d = classify("chuyển sang chế độ quạt", &on);
    assert_eq!((d.action, d.mode, d.fan_speed), (Action::Adjust, Mode::Fan, FanSpeed::High));

    let d = classify("chỉ quạt thôi", &off);
    assert_eq!((d.action, d.mode), (Action::TurnOn, Mode::Fan));
}

#[test]
fn every_branch_is_range_valid() {
    let utterances = [
        "bật điều hòa",
        "tắt điều hòa",
        "lạnh hơn",
        "ấm hơn",
        "nóng quá",
        "hút ẩm",
        "chế độ quạt",
        "16 độ",
        "30 độ",
        "xin chào",
    ];
    for ac_on in [true, false] {
        for set in [10.0, 16.0, 23.4, 30.0, 40.0] {
            let state = DeviceState::new(35.0, ac_on, set);
            for u in utterances {
                assert_range_valid(&classify(u, &state));
            }
        }
    }
}
