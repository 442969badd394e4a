//! Interpret natural language commands into device updates
//!
//! The model sees the current device state and the command, and is
//! constrained to answer with a list of partial updates. The schema makes
//! every entry well-typed; it says nothing about whether an id exists or a
//! field suits the device, which the reconciler checks when merging.

use crate::core::error::{HomeError, Result};
use crate::device::model::{Device, PartialUpdate};
use crate::llm::context::{DeviceContext, SYSTEM_INSTRUCTION};
use crate::llm::schema::ResponseSchema;
use crate::llm::service::{GenerationRequest, GenerationService};
use serde_json::Value;
use tracing::{debug, error};

/// Build the generation request for `command` against `devices`
pub fn build_request(command: &str, devices: &[Device]) -> Result<GenerationRequest> {
    let prompt = DeviceContext::from_devices(devices).prompt(command)?;
    Ok(GenerationRequest {
        system: SYSTEM_INSTRUCTION.to_string(),
        prompt,
        schema: ResponseSchema::device_updates(),
    })
}

/// Interpret a command, keeping failures distinguishable from "nothing to do"
///
/// `Ok(vec![])` means the model understood nothing actionable. `Err` means the
/// service call failed or its answer could not be decoded. Exactly one
/// service call is made; there are no retries.
pub async fn interpret_command<S>(
    service: &S,
    command: &str,
    devices: &[Device],
) -> Result<Vec<PartialUpdate>>
where
    S: GenerationService + ?Sized,
{
    let command = command.trim();
    if command.is_empty() {
        return Err(HomeError::InvalidCommand("empty command".into()));
    }

    let request = build_request(command, devices)?;
    debug!(
        devices = devices.len(),
        prompt_len = request.prompt.len(),
        "Sending command to generation service"
    );

    let text = service.generate(&request).await?;
    decode_updates(&text)
}

/// Interpret a command, degrading every failure to an empty list
///
/// Failures are logged and never propagate past this call.
pub async fn interpret<S>(service: &S, command: &str, devices: &[Device]) -> Vec<PartialUpdate>
where
    S: GenerationService + ?Sized,
{
    match interpret_command(service, command, devices).await {
        Ok(updates) => updates,
        Err(e) => {
            error!(error = %e, "Command interpretation failed");
            Vec::new()
        }
    }
}

/// Decode the service's text payload into partial updates
///
/// Accepts a bare array, or an object wrapping the array under `updates`.
/// Entries that carry no field besides the id are dropped.
pub fn decode_updates(text: &str) -> Result<Vec<PartialUpdate>> {
    if text.trim().is_empty() {
        return Err(HomeError::Decode("empty response payload".into()));
    }

    let json_str = extract_json(text)?;
    let value: Value = serde_json::from_str(json_str).map_err(|e| {
        HomeError::Decode(format!("Failed to parse updates: {} - Response: {}", e, text))
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("updates") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(HomeError::Decode(
                    "expected an array of updates".into(),
                ))
            }
        },
        _ => {
            return Err(HomeError::Decode(
                "expected an array of updates".into(),
            ))
        }
    };

    let updates: Vec<PartialUpdate> = serde_json::from_value(Value::Array(items))
        .map_err(|e| HomeError::Decode(format!("Invalid update entry: {}", e)))?;

    let (updates, empty): (Vec<_>, Vec<_>) = updates.into_iter().partition(|u| !u.is_empty());
    if !empty.is_empty() {
        debug!(count = empty.len(), "Ignoring updates with no fields");
    }

    Ok(updates)
}

/// Extract the JSON array or object from a response (handles surrounding text)
fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find(|c| c == '[' || c == '{')
        .ok_or_else(|| HomeError::Decode("No JSON found in response".into()))?;
    let close = if response[start..].starts_with('[') {
        ']'
    } else {
        '}'
    };
    let end = response
        .rfind(close)
        .filter(|&end| end > start)
        .ok_or_else(|| HomeError::Decode("No closing bracket found in response".into()))?;
    Ok(&response[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DeviceId;

    #[test]
    fn test_extract_json_simple() {
        let response = r#"[{"id": "1", "isOn": true}]"#;
        assert_eq!(extract_json(response).unwrap(), response);
    }

    #[test]
    fn test_extract_json_code_fence() {
        let response = "```json\n[{\"id\": \"1\"}]\n```";
        assert_eq!(extract_json(response).unwrap(), "[{\"id\": \"1\"}]");
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(extract_json("not json").is_err());
        assert!(extract_json("] backwards [").is_err());
    }

    #[test]
    fn test_decode_array() {
        let updates =
            decode_updates(r#"[{"id": "1", "isOn": true, "value": 80}, {"id": "3", "status": "Locked"}]"#)
                .unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].id, DeviceId::new("1"));
        assert_eq!(updates[0].is_on, Some(true));
        assert_eq!(updates[0].value, Some(Some(80.0)));
        assert_eq!(updates[1].status, Some(Some("Locked".into())));
    }

    #[test]
    fn test_decode_wrapped_object() {
        let updates = decode_updates(r#"{"updates": [{"id": "6", "value": 3}]}"#).unwrap();
        assert_eq!(updates, vec![PartialUpdate::new("6").with_value(3.0)]);
    }

    #[test]
    fn test_decode_empty_array() {
        assert!(decode_updates("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_drops_id_only_entries() {
        let updates = decode_updates(r#"[{"id": "1"}, {"id": "2", "isOn": false}]"#).unwrap();
        assert_eq!(updates, vec![PartialUpdate::new("2").with_power(false)]);
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(decode_updates(""), Err(HomeError::Decode(_))));
        assert!(matches!(decode_updates("not json"), Err(HomeError::Decode(_))));
        assert!(matches!(
            decode_updates(r#"{"devices": []}"#),
            Err(HomeError::Decode(_))
        ));
        assert!(matches!(
            decode_updates(r#"[{"isOn": true}]"#),
            Err(HomeError::Decode(_))
        ));
        assert!(matches!(
            decode_updates(r#"[{"id": "1", "isOn": "yes"}]"#),
            Err(HomeError::Decode(_))
        ));
    }

    #[test]
    fn test_build_request() {
        let devices = vec![Device::new(
            "1",
            "Desk Lamp",
            crate::device::model::DeviceType::Light,
            "Office",
        )];
        let request = build_request("dim the lamp", &devices).unwrap();
        assert_eq!(request.system, SYSTEM_INSTRUCTION);
        assert!(request.prompt.contains("Desk Lamp"));
        assert!(request.prompt.contains("dim the lamp"));
        assert_eq!(request.schema, ResponseSchema::device_updates());
    }
}
