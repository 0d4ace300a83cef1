//! Control directive and device state types.
//!
//! A [`ControlDirective`] is always range-valid once constructed: the
//! temperature sits in [`MIN_TEMPERATURE`, `MAX_TEMPERATURE`] and every enum
//! field holds one of its members. Enums deserialize case-insensitively so the
//! embedded controller may send `"cool"` or `"COOL"`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Lowest set temperature the unit accepts (°C)
pub const MIN_TEMPERATURE: i32 = 16;

/// Highest set temperature the unit accepts (°C)
pub const MAX_TEMPERATURE: i32 = 30;

/// Temperature used when none can be determined (°C)
pub const DEFAULT_TEMPERATURE: i32 = 25;

/// Reason used when the generator gives none
pub const DEFAULT_REASON: &str = "Đã nhận yêu cầu, giữ nguyên thiết lập hiện tại";

/// Clamp any integer into the accepted set-temperature range
pub fn clamp_temperature(value: i64) -> i32 {
    value.clamp(MIN_TEMPERATURE as i64, MAX_TEMPERATURE as i64) as i32
}

// ============================================================================
// Action
// ============================================================================

/// What the controller should do with the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Action {
    TurnOn,
    TurnOff,
    Adjust,
    #[default]
    Maintain,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::TurnOn => "turn_on",
            Action::TurnOff => "turn_off",
            Action::Adjust => "adjust",
            Action::Maintain => "maintain",
        }
    }

    /// Parse a wire name, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "turn_on" => Some(Action::TurnOn),
            "turn_off" => Some(Action::TurnOff),
            "adjust" => Some(Action::Adjust),
            "maintain" => Some(Action::Maintain),
            _ => None,
        }
    }
}

impl TryFrom<String> for Action {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Action::parse(&value).ok_or_else(|| format!("unknown action '{}'", value))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Fan speed
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum FanSpeed {
    Quiet,
    Low,
    #[default]
    Medium,
    High,
    Auto,
}

impl FanSpeed {
    /// Strongest fixed speed; AUTO is not considered a maximum
    pub const MAX: FanSpeed = FanSpeed::High;

    pub fn as_str(&self) -> &'static str {
        match self {
            FanSpeed::Quiet => "QUIET",
            FanSpeed::Low => "LOW",
            FanSpeed::Medium => "MEDIUM",
            FanSpeed::High => "HIGH",
            FanSpeed::Auto => "AUTO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QUIET" => Some(FanSpeed::Quiet),
            "LOW" => Some(FanSpeed::Low),
            "MEDIUM" => Some(FanSpeed::Medium),
            "HIGH" => Some(FanSpeed::High),
            "AUTO" => Some(FanSpeed::Auto),
            _ => None,
        }
    }
}

impl TryFrom<String> for FanSpeed {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FanSpeed::parse(&value).ok_or_else(|| format!("unknown fan speed '{}'", value))
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Mode
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Mode {
    #[default]
    Cool,
    Dry,
    Fan,
    Heat,
    Auto,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Cool => "COOL",
            Mode::Dry => "DRY",
            Mode::Fan => "FAN",
            Mode::Heat => "HEAT",
            Mode::Auto => "AUTO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "COOL" => Some(Mode::Cool),
            "DRY" => Some(Mode::Dry),
            "FAN" => Some(Mode::Fan),
            "HEAT" => Some(Mode::Heat),
            "AUTO" => Some(Mode::Auto),
            _ => None,
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Mode::parse(&value).ok_or_else(|| format!("unknown mode '{}'", value))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Control directive
// ============================================================================

/// Normalized control decision returned to the device.
///
/// Serializes to the flat JSON object the controller firmware reads:
/// `{"action":"adjust","temperature":24,"fan_speed":"MEDIUM","mode":"COOL","reason":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlDirective {
    pub action: Action,
    pub temperature: i32,
    pub fan_speed: FanSpeed,
    pub mode: Mode,
    pub reason: String,

    /// Spoken version of `reason`, attached by the speech-synthesis service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl ControlDirective {
    /// Build a directive, clamping the temperature into range
    pub fn new(
        action: Action,
        temperature: i64,
        fan_speed: FanSpeed,
        mode: Mode,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            action,
            temperature: clamp_temperature(temperature),
            fan_speed,
            mode,
            reason: reason.into(),
            audio_url: None,
        }
    }

    /// Copy of this directive carrying a synthesized-audio URL
    pub fn with_audio_url(self, url: impl Into<String>) -> Self {
        Self {
            audio_url: Some(url.into()),
            ..self
        }
    }
}

impl Default for ControlDirective {
    fn default() -> Self {
        Self::new(
            Action::default(),
            DEFAULT_TEMPERATURE as i64,
            FanSpeed::default(),
            Mode::default(),
            DEFAULT_REASON,
        )
    }
}

// ============================================================================
// Device state
// ============================================================================

/// Snapshot of room and unit conditions supplied by the caller per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub room_temperature: f64,
    pub ac_on: bool,
    pub ac_set_temperature: f64,

    /// Current operating mode, when the controller reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac_mode: Option<Mode>,

    /// Current fan speed, when the controller reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac_fan_speed: Option<FanSpeed>,
}

impl DeviceState {
    pub fn new(room_temperature: f64, ac_on: bool, ac_set_temperature: f64) -> Self {
        Self {
            room_temperature,
            ac_on,
            ac_set_temperature,
            ac_mode: None,
            ac_fan_speed: None,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.ac_mode = Some(mode);
        self
    }

    pub fn with_fan_speed(mut self, fan_speed: FanSpeed) -> Self {
        self.ac_fan_speed = Some(fan_speed);
        self
    }

    /// Set temperature as a whole degree inside the accepted range
    pub fn set_temperature(&self) -> i32 {
        if self.ac_set_temperature.is_finite() {
            clamp_temperature(self.ac_set_temperature.round() as i64)
        } else {
            DEFAULT_TEMPERATURE
        }
    }

    pub fn mode(&self) -> Mode {
        self.ac_mode.unwrap_or_default()
    }

    pub fn fan_speed(&self) -> FanSpeed {
        self.ac_fan_speed.unwrap_or_default()
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(25.0, false, DEFAULT_TEMPERATURE as f64)
    }
}
