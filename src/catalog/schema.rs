//! Input schema trees
//!
//! A small JSON-Schema subset (object, string, number, array, enum) used both to
//! advertise each operation's arguments and to validate incoming calls.

use serde_json::{json, Map, Value};

/// Shape of one schema node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    /// JSON object. Properties keep declaration order; extra keys are allowed.
    Object {
        properties: Vec<(String, InputSchema)>,
        required: Vec<String>,
    },
    String,
    Number,
    Array { items: Box<InputSchema> },
    /// String restricted to an ordered set of allowed values
    Enum { values: Vec<String> },
}

/// A schema node with an optional human description
#[derive(Debug, Clone, PartialEq)]
pub struct InputSchema {
    pub kind: SchemaType,
    pub description: Option<String>,
}

impl InputSchema {
    fn of(kind: SchemaType) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn object(properties: Vec<(&str, InputSchema)>, required: &[&str]) -> Self {
        Self::of(SchemaType::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required: required.iter().map(|r| r.to_string()).collect(),
        })
    }

    /// Free-form object with no declared properties
    pub fn any_object() -> Self {
        Self::object(Vec::new(), &[])
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    pub fn array(items: InputSchema) -> Self {
        Self::of(SchemaType::Array {
            items: Box::new(items),
        })
    }

    pub fn enumeration(values: &[&str]) -> Self {
        Self::of(SchemaType::Enum {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the structural invariants of the tree: every required name is a
    /// declared property, property names are unique, and enums are non-empty.
    ///
    /// Returns the dotted path and problem of the first violation.
    pub fn verify(&self) -> Result<(), String> {
        self.verify_at("")
    }

    fn verify_at(&self, path: &str) -> Result<(), String> {
        let here = if path.is_empty() { "<root>" } else { path };

        match &self.kind {
            SchemaType::Object {
                properties,
                required,
            } => {
                for (i, (name, _)) in properties.iter().enumerate() {
                    if properties[..i].iter().any(|(other, _)| other == name) {
                        return Err(format!("{}: property '{}' declared twice", here, name));
                    }
                }
                for name in required {
                    if !properties.iter().any(|(p, _)| p == name) {
                        return Err(format!(
                            "{}: required property '{}' is not declared",
                            here, name
                        ));
                    }
                }
                for (name, schema) in properties {
                    schema.verify_at(&join_path(path, name))?;
                }
                Ok(())
            }
            SchemaType::Array { items } => items.verify_at(&join_path(path, "items")),
            SchemaType::Enum { values } if values.is_empty() => {
                Err(format!("{}: enum has no allowed values", here))
            }
            _ => Ok(()),
        }
    }

    /// JSON Schema rendering advertised to clients
    pub fn to_json(&self) -> Value {
        let mut node = match &self.kind {
            SchemaType::Object {
                properties,
                required,
            } => {
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.to_json()))
                    .collect();
                let mut node = json!({"type": "object", "properties": props});
                if !required.is_empty() {
                    node["required"] = json!(required);
                }
                node
            }
            SchemaType::String => json!({"type": "string"}),
            SchemaType::Number => json!({"type": "number"}),
            SchemaType::Array { items } => json!({"type": "array", "items": items.to_json()}),
            SchemaType::Enum { values } => json!({"type": "string", "enum": values}),
        };

        if let Some(description) = &self.description {
            node["description"] = json!(description);
        }
        node
    }
}

/// Dotted path of `name` beneath `parent`
pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}
