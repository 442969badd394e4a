//! Merge partial updates into a device list
//!
//! This is where model output meets the authoritative state. The response
//! schema only guarantees each update is well-typed, so referential integrity
//! (does the id exist?) and per-type validity (a lock has no brightness) are
//! enforced here.

use crate::device::model::{Device, PartialUpdate};
use tracing::debug;

/// Apply `updates` to `devices`, returning the new collection
///
/// - Output order and length equal the input.
/// - A device with no matching update passes through unchanged.
/// - Only fields present in the update are overwritten.
/// - Updates for unknown ids are dropped without error.
/// - If several updates share an id, the first one wins.
pub fn apply_updates(devices: &[Device], updates: &[PartialUpdate]) -> Vec<Device> {
    for update in updates {
        if !devices.iter().any(|d| d.id == update.id) {
            debug!(id = %update.id, "Dropping update for unknown device");
        }
    }

    devices
        .iter()
        .map(|device| match updates.iter().find(|u| u.id == device.id) {
            Some(update) => merge(device, &update.restricted_to(device.device_type)),
            None => device.clone(),
        })
        .collect()
}

fn merge(device: &Device, update: &PartialUpdate) -> Device {
    let mut merged = device.clone();
    if let Some(is_on) = update.is_on {
        merged.is_on = is_on;
    }
    if let Some(value) = update.value {
        merged.value = value;
    }
    if let Some(status) = &update.status {
        merged.status = status.clone();
    }
    merged
}
