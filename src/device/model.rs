//! Device records and the sparse patches applied to them
//!
//! A device is a single open record. What `value` and `status` mean depends on
//! the device type:
//! - LIGHT: `value` is brightness, 0-100 %
//! - THERMOSTAT: `value` is the target temperature in °C
//! - FAN: `value` is the speed level
//! - LOCK, SPEAKER, CAMERA: no numeric channel, `status` carries the state
//!   ("Unlocked", "Playing", ...)

use crate::core::types::DeviceId;
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::RangeInclusive;

/// Brightness range for lights (percent)
pub const LIGHT_RANGE: RangeInclusive<f64> = 0.0..=100.0;
/// Target temperature range for thermostats (°C)
pub const THERMOSTAT_RANGE: RangeInclusive<f64> = 10.0..=32.0;
/// Speed levels for fans
pub const FAN_RANGE: RangeInclusive<f64> = 0.0..=5.0;

/// Kinds of controllable devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Light,
    Thermostat,
    Lock,
    Speaker,
    Camera,
    Fan,
}

impl DeviceType {
    /// Valid range of the numeric channel, or `None` if the type has none
    pub fn value_range(self) -> Option<RangeInclusive<f64>> {
        match self {
            DeviceType::Light => Some(LIGHT_RANGE),
            DeviceType::Thermostat => Some(THERMOSTAT_RANGE),
            DeviceType::Fan => Some(FAN_RANGE),
            DeviceType::Lock | DeviceType::Speaker | DeviceType::Camera => None,
        }
    }

    /// Starting point for a step when the device has no value yet
    pub fn default_value(self) -> Option<f64> {
        match self {
            DeviceType::Thermostat => Some(20.0),
            _ => self.value_range().map(|range| *range.start()),
        }
    }

    pub fn has_value(self) -> bool {
        self.value_range().is_some()
    }

    /// Whether the type reports its state through the status string
    pub fn has_status(self) -> bool {
        matches!(
            self,
            DeviceType::Lock | DeviceType::Speaker | DeviceType::Camera
        )
    }

    pub fn default_unit(self) -> Option<&'static str> {
        match self {
            DeviceType::Light => Some("%"),
            DeviceType::Thermostat => Some("°C"),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceType::Light => "Light",
            DeviceType::Thermostat => "Thermostat",
            DeviceType::Lock => "Lock",
            DeviceType::Speaker => "Speaker",
            DeviceType::Camera => "Camera",
            DeviceType::Fan => "Fan",
        }
    }
}

/// A controllable smart-home device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub room: String,
    #[serde(default, alias = "is_on")]
    pub is_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Device {
    pub fn new(
        id: impl Into<DeviceId>,
        name: impl Into<String>,
        device_type: DeviceType,
        room: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_type,
            room: room.into(),
            is_on: false,
            value: None,
            unit: device_type.default_unit().map(String::from),
            status: None,
        }
    }

    pub fn with_power(mut self, is_on: bool) -> Self {
        self.is_on = is_on;
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// A sparse patch for one device
///
/// A field that is `None` was not mentioned and stays as it is. For `value`
/// and `status`, `Some(None)` means the field was sent as `null` and clears
/// the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialUpdate {
    pub id: DeviceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<Option<String>>,
}

/// Marks a field as present even when its JSON value is `null`
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl PartialUpdate {
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            is_on: None,
            value: None,
            status: None,
        }
    }

    pub fn with_power(mut self, is_on: bool) -> Self {
        self.is_on = Some(is_on);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(Some(value));
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(Some(status.into()));
        self
    }

    /// True if the update carries no field at all
    pub fn is_empty(&self) -> bool {
        self.is_on.is_none() && self.value.is_none() && self.status.is_none()
    }

    /// Drop the fields that make no sense for `device_type` and clamp the
    /// numeric value into the type's range.
    pub fn restricted_to(&self, device_type: DeviceType) -> PartialUpdate {
        let value = match device_type.value_range() {
            Some(range) => self
                .value
                .map(|v| v.map(|v| v.clamp(*range.start(), *range.end()))),
            None => None,
        };
        let status = if device_type.has_status() {
            self.status.clone()
        } else {
            None
        };

        PartialUpdate {
            id: self.id.clone(),
            is_on: self.is_on,
            value,
            status,
        }
    }
}
