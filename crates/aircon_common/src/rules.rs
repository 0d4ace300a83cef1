//! Fallback rule table.
//!
//! Rules are evaluated in slice order and the first match wins. Each rule only
//! *detects* an [`Intent`]; turning the intent into a directive for a given
//! [`DeviceState`] is [`Intent::apply`]. Phrases are lower-case NFC so they can
//! be compared against the output of `classifier::normalize_utterance`.

use crate::directive::{
    Action, ControlDirective, DeviceState, FanSpeed, Mode, DEFAULT_TEMPERATURE, MAX_TEMPERATURE,
    MIN_TEMPERATURE,
};
use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// Tuning
// ============================================================================

/// Step for "cooler" / "warmer" requests (°C)
pub const ADJUST_STEP: i32 = 2;

/// Step for "too hot" complaints (°C)
pub const HOT_STEP: i32 = 3;

/// Start temperature when the unit is off and the user wants it cooler
pub const COOL_START_TEMPERATURE: i32 = 22;

/// Start temperature when the unit is off and the user complains of heat
pub const HOT_START_TEMPERATURE: i32 = 20;

/// Power-on comfort target and fan speed by room temperature
pub fn comfort_for_room(room_temperature: f64) -> (i32, FanSpeed) {
    if room_temperature >= 32.0 {
        (22, FanSpeed::High)
    } else if room_temperature >= 29.0 {
        (24, FanSpeed::Medium)
    } else if room_temperature >= 26.0 {
        (25, FanSpeed::Medium)
    } else {
        (26, FanSpeed::Low)
    }
}

// ============================================================================
// Phrase sets
// ============================================================================

pub const POWER_ON_PHRASES: &[&str] = &[
    "bật điều hòa",
    "bật điều hoà",
    "bật máy lạnh",
    "mở điều hòa",
    "mở điều hoà",
    "mở máy lạnh",
    "khởi động điều hòa",
    "turn on",
    "switch on",
    "power on",
];

pub const POWER_OFF_PHRASES: &[&str] = &[
    "tắt điều hòa",
    "tắt điều hoà",
    "tắt máy lạnh",
    "tắt máy",
    "tắt đi",
    "turn off",
    "switch off",
    "power off",
];

pub const COOLER_PHRASES: &[&str] = &[
    "lạnh hơn",
    "mát hơn",
    "giảm nhiệt",
    "hạ nhiệt",
    "bớt nóng",
    "cooler",
    "colder",
];

pub const WARMER_PHRASES: &[&str] = &[
    "ấm hơn",
    "tăng nhiệt",
    "bớt lạnh",
    "lạnh quá",
    "warmer",
];

pub const HOT_PHRASES: &[&str] = &["nóng", "oi bức", "too hot", "hotter", "hot"];

pub const DRY_PHRASES: &[&str] = &[
    "hút ẩm",
    "độ ẩm",
    "ẩm ướt",
    "ẩm thấp",
    "chế độ khô",
    "humid",
    "dry",
];

pub const FAN_PHRASES: &[&str] = &[
    "chế độ quạt",
    "chỉ quạt",
    "chạy quạt",
    "quạt gió",
    "fan only",
    "fan mode",
];

// ============================================================================
// Temperature pattern
// ============================================================================

/// Integer followed by a degree unit ("24 độ", "24°c", "24.5 degrees")
static DEGREE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+)(?:[.,][0-9]+)?\s*(?:°\s*c?|độ|degrees?)").expect("valid degree regex")
});

/// Any integer token
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid number regex"));

/// Requested set temperature, if the utterance names one in range.
///
/// Numbers carrying a degree unit are tried first, then bare integers; the
/// first one in range wins. So "năm 2025 để 24 độ" and "tăng 2 độ, để 24" both
/// read 24.
pub fn find_temperature(utterance: &str) -> Option<i32> {
    let in_range = |token: &str| {
        token
            .parse::<i64>()
            .ok()
            .filter(|v| (MIN_TEMPERATURE as i64..=MAX_TEMPERATURE as i64).contains(v))
            .map(|v| v as i32)
    };

    DEGREE_RE
        .captures_iter(utterance)
        .filter_map(|c| c.get(1))
        .find_map(|m| in_range(m.as_str()))
        .or_else(|| NUMBER_RE.find_iter(utterance).find_map(|m| in_range(m.as_str())))
}

/// Whether `phrase` occurs in `utterance` as whole words
///
/// "hot" must not fire on "photo", nor "dry" on "laundry".
pub fn contains_phrase(utterance: &str, phrase: &str) -> bool {
    let is_word = |c: Option<char>| c.map_or(false, char::is_alphanumeric);
    utterance.match_indices(phrase).any(|(start, _)| {
        let before = utterance[..start].chars().next_back();
        let after = utterance[start + phrase.len()..].chars().next();
        !is_word(before) && !is_word(after)
    })
}

// ============================================================================
// Intents
// ============================================================================

/// What the user asked for, independent of device state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    PowerOn,
    PowerOff,
    Cooler,
    Warmer,
    Hot,
    Dry,
    FanOnly,
    SetTemperature(i32),
    /// No rule matched
    Unrecognized,
}

impl Intent {
    /// Directive for this intent given the current device state
    pub fn apply(&self, state: &DeviceState) -> ControlDirective {
        let current = state.set_temperature();
        let room = state.room_temperature;

        match *self {
            Intent::PowerOn => {
                let (target, fan) = comfort_for_room(room);
                ControlDirective::new(
                    Action::TurnOn,
                    target as i64,
                    fan,
                    Mode::Cool,
                    format!(
                        "Bật điều hòa: phòng {:.1}°C, đặt {}°C, quạt {}",
                        room, target, fan
                    ),
                )
            }

            Intent::PowerOff => ControlDirective::new(
                Action::TurnOff,
                current as i64,
                state.fan_speed(),
                state.mode(),
                format!("Tắt điều hòa, giữ thiết lập {}°C", current),
            ),

            Intent::Cooler if state.ac_on => {
                let target = (current - ADJUST_STEP).max(MIN_TEMPERATURE);
                ControlDirective::new(
                    Action::Adjust,
                    target as i64,
                    state.fan_speed(),
                    state.mode(),
                    format!(
                        "Giảm nhiệt độ từ {}°C xuống {}°C (-{}°C)",
                        current, target, ADJUST_STEP
                    ),
                )
            }
            Intent::Cooler => ControlDirective::new(
                Action::TurnOn,
                COOL_START_TEMPERATURE as i64,
                FanSpeed::MAX,
                Mode::Cool,
                format!(
                    "Điều hòa đang tắt, bật ở {}°C với quạt mạnh cho mát hơn",
                    COOL_START_TEMPERATURE
                ),
            ),

            Intent::Warmer if state.ac_on => {
                let target = (current + ADJUST_STEP).min(MAX_TEMPERATURE);
                ControlDirective::new(
                    Action::Adjust,
                    target as i64,
                    state.fan_speed(),
                    state.mode(),
                    format!(
                        "Tăng nhiệt độ từ {}°C lên {}°C (+{}°C)",
                        current, target, ADJUST_STEP
                    ),
                )
            }
            Intent::Warmer => ControlDirective::new(
                Action::Maintain,
                current as i64,
                state.fan_speed(),
                state.mode(),
                format!("Điều hòa đang tắt, phòng {:.1}°C, giữ nguyên", room),
            ),

            Intent::Hot if state.ac_on => {
                let target = (current - HOT_STEP).max(MIN_TEMPERATURE);
                ControlDirective::new(
                    Action::Adjust,
                    target as i64,
                    FanSpeed::MAX,
                    Mode::Cool,
                    format!(
                        "Phòng {:.1}°C đang nóng: giảm từ {}°C xuống {}°C (-{}°C), quạt tối đa",
                        room, current, target, HOT_STEP
                    ),
                )
            }
            Intent::Hot => ControlDirective::new(
                Action::TurnOn,
                HOT_START_TEMPERATURE as i64,
                FanSpeed::MAX,
                Mode::Cool,
                format!(
                    "Phòng {:.1}°C đang nóng: bật điều hòa ở {}°C, quạt tối đa",
                    room, HOT_START_TEMPERATURE
                ),
            ),

            Intent::Dry if state.ac_on => ControlDirective::new(
                Action::Adjust,
                current as i64,
                FanSpeed::Low,
                Mode::Dry,
                format!("Chuyển sang chế độ hút ẩm ở {}°C", current),
            ),
            Intent::Dry => ControlDirective::new(
                Action::TurnOn,
                DEFAULT_TEMPERATURE as i64,
                FanSpeed::Low,
                Mode::Dry,
                format!("Bật điều hòa ở chế độ hút ẩm, {}°C", DEFAULT_TEMPERATURE),
            ),

            Intent::FanOnly if state.ac_on => ControlDirective::new(
                Action::Adjust,
                current as i64,
                FanSpeed::MAX,
                Mode::Fan,
                "Chuyển sang chế độ quạt, quạt tối đa",
            ),
            Intent::FanOnly => ControlDirective::new(
                Action::TurnOn,
                DEFAULT_TEMPERATURE as i64,
                FanSpeed::MAX,
                Mode::Fan,
                "Bật điều hòa ở chế độ quạt, quạt tối đa",
            ),

            Intent::SetTemperature(target) if state.ac_on => ControlDirective::new(
                Action::Adjust,
                target as i64,
                state.fan_speed(),
                state.mode(),
                format!("Đặt nhiệt độ từ {}°C thành {}°C", current, target),
            ),
            Intent::SetTemperature(target) => ControlDirective::new(
                Action::TurnOn,
                target as i64,
                FanSpeed::Medium,
                Mode::Cool,
                format!("Bật điều hòa ở {}°C", target),
            ),

            Intent::Unrecognized if state.ac_on => ControlDirective::new(
                Action::Maintain,
                current as i64,
                state.fan_speed(),
                state.mode(),
                format!("Không nhận ra lệnh, giữ nguyên {}°C", current),
            ),
            Intent::Unrecognized => ControlDirective::new(
                Action::TurnOn,
                DEFAULT_TEMPERATURE as i64,
                FanSpeed::Medium,
                Mode::Cool,
                format!("Không nhận ra lệnh, bật điều hòa ở {}°C", DEFAULT_TEMPERATURE),
            ),
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

/// How a rule recognizes its intent
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Any phrase found in the utterance as whole words
    Phrases {
        phrases: &'static [&'static str],
        intent: Intent,
    },
    /// A set temperature named in the utterance
    Temperature,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matcher: Matcher,
}

impl Rule {
    /// Intent this rule sees in an already-normalized utterance
    pub fn detect(&self, utterance: &str) -> Option<Intent> {
        match self.matcher {
            Matcher::Phrases { phrases, intent } => phrases
                .iter()
                .any(|p| contains_phrase(utterance, p))
                .then_some(intent),
            Matcher::Temperature => find_temperature(utterance).map(Intent::SetTemperature),
        }
    }
}

const fn phrases(name: &'static str, phrases: &'static [&'static str], intent: Intent) -> Rule {
    Rule {
        name,
        matcher: Matcher::Phrases { phrases, intent },
    }
}

/// Priority order: first match wins
pub static RULES: &[Rule] = &[
    phrases("power_on", POWER_ON_PHRASES, Intent::PowerOn),
    phrases("power_off", POWER_OFF_PHRASES, Intent::PowerOff),
    phrases("cooler", COOLER_PHRASES, Intent::Cooler),
    phrases("warmer", WARMER_PHRASES, Intent::Warmer),
    phrases("hot", HOT_PHRASES, Intent::Hot),
    phrases("dry", DRY_PHRASES, Intent::Dry),
    phrases("fan_only", FAN_PHRASES, Intent::FanOnly),
    Rule {
        name: "temperature",
        matcher: Matcher::Temperature,
    },
];
