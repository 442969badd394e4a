//! Property tests for merging partial updates into a device list

use monomind::command::apply_updates;
use monomind::core::types::DeviceId;
use monomind::device::{Device, DeviceType, PartialUpdate};
use proptest::prelude::*;
use proptest::sample::select;

const TYPES: [DeviceType; 6] = [
    DeviceType::Light,
    DeviceType::Thermostat,
    DeviceType::Lock,
    DeviceType::Speaker,
    DeviceType::Camera,
    DeviceType::Fan,
];

fn arb_device(index: usize) -> impl Strategy<Value = Device> {
    (
        select(TYPES.to_vec()),
        select(vec!["Living Room", "Kitchen", "Bedroom"]),
        any::<bool>(),
        proptest::option::of(0.0f64..100.0),
        proptest::option::of(select(vec!["Playing", "Locked", "Unlocked"])),
    )
        .prop_map(move |(device_type, room, is_on, value, status)| Device {
            id: DeviceId::new(format!("d{}", index)),
            name: format!("Device {}", index),
            device_type,
            room: room.to_string(),
            is_on,
            value,
            unit: device_type.default_unit().map(String::from),
            status: status.map(String::from),
        })
}

/// Devices with unique ids d0..dN
fn arb_devices() -> impl Strategy<Value = Vec<Device>> {
    (0usize..8).prop_flat_map(|n| (0..n).map(arb_device).collect::<Vec<_>>())
}

/// Updates referencing ids d0..d9, so some hit and some miss
fn arb_update() -> impl Strategy<Value = PartialUpdate> {
    (
        0usize..10,
        proptest::option::of(any::<bool>()),
        proptest::option::of(proptest::option::of(-20.0f64..150.0)),
        proptest::option::of(proptest::option::of(select(vec!["Playing", "Paused", "Locked"]))),
    )
        .prop_map(|(index, is_on, value, status)| PartialUpdate {
            id: DeviceId::new(format!("d{}", index)),
            is_on,
            value,
            status: status.map(|s| s.map(String::from)),
        })
}

fn arb_updates() -> impl Strategy<Value = Vec<PartialUpdate>> {
    proptest::collection::vec(arb_update(), 0..6)
}

proptest! {
    #[test]
    fn prop_unknown_ids_are_identity(devices in arb_devices(), updates in arb_updates()) {
        let unknown: Vec<PartialUpdate> = updates
            .into_iter()
            .map(|mut u| {
                u.id = DeviceId::new(format!("missing-{}", u.id));
                u
            })
            .collect();
        prop_assert_eq!(apply_updates(&devices, &unknown), devices);
    }

    #[test]
    fn prop_preserves_length_and_order(devices in arb_devices(), updates in arb_updates()) {
        let result = apply_updates(&devices, &updates);
        prop_assert_eq!(result.len(), devices.len());
        for (before, after) in devices.iter().zip(&result) {
            prop_assert_eq!(&before.id, &after.id);
            prop_assert_eq!(&before.name, &after.name);
            prop_assert_eq!(before.device_type, after.device_type);
            prop_assert_eq!(&before.room, &after.room);
            prop_assert_eq!(&before.unit, &after.unit);
        }
    }

    #[test]
    fn prop_power_only_update_changes_only_power(
        devices in arb_devices().prop_filter("non-empty", |d| !d.is_empty()),
        pick in any::<prop::sample::Index>(),
        is_on in any::<bool>(),
    ) {
        let target = pick.index(devices.len());
        let update = PartialUpdate::new(devices[target].id.clone()).with_power(is_on);
        let result = apply_updates(&devices, &[update]);

        for (i, (before, after)) in devices.iter().zip(&result).enumerate() {
            if i == target {
                let mut expected = before.clone();
                expected.is_on = is_on;
                prop_assert_eq!(after, &expected);
            } else {
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn prop_idempotent(devices in arb_devices(), updates in arb_updates()) {
        let once = apply_updates(&devices, &updates);
        let twice = apply_updates(&once, &updates);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn prop_values_stay_in_type_range(devices in arb_devices(), updates in arb_updates()) {
        let result = apply_updates(&devices, &updates);
        for (before, after) in devices.iter().zip(&result) {
            match after.device_type.value_range() {
                Some(range) => {
                    if after.value != before.value {
                        let value = after.value;
                        prop_assert!(value.map_or(true, |v| range.contains(&v)));
                    }
                }
                None => prop_assert_eq!(after.value, before.value),
            }
        }
    }
}
