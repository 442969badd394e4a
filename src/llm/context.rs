//! Device context for LLM prompts
//!
//! Only the fields needed to resolve a command are sent: id, name, type,
//! room, power state and value. Units and status strings stay local.

use crate::core::error::Result;
use crate::core::types::DeviceId;
use crate::device::model::{Device, DeviceType};
use serde::Serialize;

/// Role and output contract given to the model
pub const SYSTEM_INSTRUCTION: &str = r#"You are an IoT assistant that controls a smart home.
Given the current state of the devices and a user command, return a JSON array of the devices that need to be updated.
Only include devices whose state must change. Each entry has the device "id" and the fields to change: "isOn", "value" or "status".
If a command implies multiple devices (e.g. "Turn off all lights"), return an update for every relevant device.
If the command is unclear or impossible, return an empty array.
Do not explain, just return JSON."#;

/// Minimal view of one device, serialized into the prompt
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProjection<'a> {
    pub id: &'a DeviceId,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub room: &'a str,
    pub is_on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl<'a> From<&'a Device> for DeviceProjection<'a> {
    fn from(device: &'a Device) -> Self {
        Self {
            id: &device.id,
            name: &device.name,
            device_type: device.device_type,
            room: &device.room,
            is_on: device.is_on,
            value: device.value,
        }
    }
}

/// Snapshot of the home borrowed for the duration of one prompt
pub struct DeviceContext<'a> {
    pub devices: Vec<DeviceProjection<'a>>,
}

impl<'a> DeviceContext<'a> {
    pub fn from_devices(devices: &'a [Device]) -> Self {
        Self {
            devices: devices.iter().map(DeviceProjection::from).collect(),
        }
    }

    /// Prompt embedding the device state and the raw command
    pub fn prompt(&self, command: &str) -> Result<String> {
        let state = serde_json::to_string(&self.devices)?;
        // Debug-format the command so quotes and newlines are escaped
        Ok(format!(
            "Current Devices: {}\nUser Command: {:?}",
            state, command
        ))
    }
}
