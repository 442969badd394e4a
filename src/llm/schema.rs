//! Response-shape constraint for device updates
//!
//! The model must answer with an array of objects, each with a required
//! `id` and optional `isOn`, `value` and `status`. Providers describe schemas
//! in different dialects, so the same field list is rendered per dialect.
//! Dialects whose schema root must be an object get the array wrapped under
//! [`ResponseSchema::wrapper_key`].

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Number,
}

impl FieldKind {
    fn json_schema_name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::Number => "number",
        }
    }

    fn gemini_name(self) -> &'static str {
        match self {
            FieldKind::String => "STRING",
            FieldKind::Boolean => "BOOLEAN",
            FieldKind::Number => "NUMBER",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
}

/// Schema for an array of flat objects
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    /// Identifier used where a provider wants a schema or tool name
    pub name: &'static str,
    /// Property holding the array when the root has to be an object
    pub wrapper_key: &'static str,
    pub fields: Vec<SchemaField>,
}

impl ResponseSchema {
    /// `[{ id: string, isOn?: boolean, value?: number|null, status?: string|null }]`
    pub fn device_updates() -> Self {
        Self {
            name: "device_updates",
            wrapper_key: "updates",
            fields: vec![
                SchemaField {
                    name: "id",
                    kind: FieldKind::String,
                    required: true,
                    nullable: false,
                },
                SchemaField {
                    name: "isOn",
                    kind: FieldKind::Boolean,
                    required: false,
                    nullable: false,
                },
                SchemaField {
                    name: "value",
                    kind: FieldKind::Number,
                    required: false,
                    nullable: true,
                },
                SchemaField {
                    name: "status",
                    kind: FieldKind::String,
                    required: false,
                    nullable: true,
                },
            ],
        }
    }

    fn required(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }

    /// Gemini `responseSchema` (OpenAPI subset), array at the root
    pub fn gemini(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut property = json!({ "type": field.kind.gemini_name() });
            if field.nullable {
                property["nullable"] = Value::Bool(true);
            }
            properties.insert(field.name.to_string(), property);
        }

        json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": properties,
                "required": self.required(),
            }
        })
    }

    /// JSON Schema for one array element
    pub fn item_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let kind = field.kind.json_schema_name();
            let ty = if field.nullable {
                json!([kind, "null"])
            } else {
                json!(kind)
            };
            properties.insert(field.name.to_string(), json!({ "type": ty }));
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required(),
        })
    }

    /// JSON Schema with an object root: `{ "<wrapper_key>": [item, ...] }`
    pub fn wrapped_json_schema(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            self.wrapper_key.to_string(),
            json!({ "type": "array", "items": self.item_json_schema() }),
        );

        json!({
            "type": "object",
            "properties": properties,
            "required": [self.wrapper_key],
        })
    }
}
