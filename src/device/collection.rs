//! The authoritative, ordered device list owned by the application

use crate::command::reconciler::apply_updates;
use crate::core::error::{HomeError, Result};
use crate::core::types::DeviceId;
use crate::device::model::{Device, DeviceType, PartialUpdate};
use std::collections::HashSet;

/// Reject a device list in which an identifier appears twice
pub fn ensure_unique_ids(devices: &[Device]) -> Result<()> {
    let mut seen = HashSet::new();
    for device in devices {
        if !seen.insert(&device.id) {
            return Err(HomeError::Config(format!(
                "duplicate device id: {}",
                device.id
            )));
        }
    }
    Ok(())
}

/// Ordered sequence of devices with unique identifiers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceCollection {
    devices: Vec<Device>,
}

impl DeviceCollection {
    /// Build a collection, rejecting duplicate identifiers
    pub fn new(devices: Vec<Device>) -> Result<Self> {
        ensure_unique_ids(&devices)?;
        Ok(Self { devices })
    }

    /// The six devices the panel ships with
    pub fn demo() -> Self {
        Self {
            devices: vec![
                Device::new("1", "Living Room Main", DeviceType::Light, "Living Room")
                    .with_power(true)
                    .with_value(80.0),
                Device::new("2", "Smart Thermostat", DeviceType::Thermostat, "Hallway")
                    .with_power(true)
                    .with_value(22.0),
                Device::new("3", "Front Door", DeviceType::Lock, "Entrance")
                    .with_status("Unlocked"),
                Device::new("4", "Kitchen Spots", DeviceType::Light, "Kitchen").with_value(0.0),
                Device::new("5", "Sonos Arc", DeviceType::Speaker, "Living Room")
                    .with_power(true)
                    .with_status("Playing"),
                Device::new("6", "Ceiling Fan", DeviceType::Fan, "Bedroom")
                    .with_power(true)
                    .with_value(2.0),
            ],
        }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    /// Merge updates into the collection, returning how many devices changed
    pub fn apply(&mut self, updates: &[PartialUpdate]) -> usize {
        let next = apply_updates(&self.devices, updates);
        let changed = self
            .devices
            .iter()
            .zip(&next)
            .filter(|(before, after)| before != after)
            .count();
        self.devices = next;
        changed
    }

    /// Switch a device on or off
    pub fn toggle(&mut self, id: &DeviceId, is_on: bool) -> Result<()> {
        self.require(id)?;
        self.apply(&[PartialUpdate::new(id.clone()).with_power(is_on)]);
        Ok(())
    }

    /// Set the numeric channel (brightness, temperature, speed)
    pub fn set_value(&mut self, id: &DeviceId, value: f64) -> Result<()> {
        let device = self.require(id)?;
        if !device.device_type.has_value() {
            return Err(HomeError::InvalidCommand(format!(
                "{} has no adjustable value",
                device.name
            )));
        }
        self.apply(&[PartialUpdate::new(id.clone()).with_value(value)]);
        Ok(())
    }

    /// Nudge the numeric channel by `delta` (the thermostat +/- buttons)
    pub fn step_value(&mut self, id: &DeviceId, delta: f64) -> Result<()> {
        let device = self.require(id)?;
        let current = device
            .value
            .or_else(|| device.device_type.default_value())
            .unwrap_or_default();
        self.set_value(id, current + delta)
    }

    /// Distinct rooms in the order they first appear
    pub fn rooms(&self) -> Vec<&str> {
        let mut rooms: Vec<&str> = Vec::new();
        for device in &self.devices {
            if !rooms.contains(&device.room.as_str()) {
                rooms.push(&device.room);
            }
        }
        rooms
    }

    /// Devices in `room`, or every device when no filter is given
    pub fn in_room<'a>(&'a self, room: Option<&'a str>) -> impl Iterator<Item = &'a Device> + 'a {
        self.devices
            .iter()
            .filter(move |d| room.map_or(true, |r| d.room.eq_ignore_ascii_case(r)))
    }

    /// Number of devices currently switched on
    pub fn active_count(&self) -> usize {
        self.devices.iter().filter(|d| d.is_on).count()
    }

    fn require(&self, id: &DeviceId) -> Result<&Device> {
        self.get(id)
            .ok_or_else(|| HomeError::DeviceNotFound(id.clone()))
    }
}
