// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! YAML schema parsing.
//!
//! The compiler only constrains the in-memory object shape, not the input
//! syntax; this front-end deserializes one receiver per YAML document and
//! validates the attribute combinations the code generators rely on.

use crate::definition::{MessageAttribute, Receiver};
use crate::error::{Result, SchemaError};
use std::collections::HashSet;
use std::path::Path;

/// Parse a receiver schema from a YAML string.
pub fn parse_yaml(yaml: &str) -> Result<Receiver> {
    let receiver: Receiver = serde_yaml::from_str(yaml)?;
    validate_receiver(&receiver)?;
    Ok(receiver)
}

/// Parse a receiver schema from a YAML file.
pub fn parse_yaml_file(path: &Path) -> Result<Receiver> {
    let yaml = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SchemaError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            SchemaError::IoError(e)
        }
    })?;

    parse_yaml(&yaml)
}

/// Validate a parsed receiver.
fn validate_receiver(receiver: &Receiver) -> Result<()> {
    if receiver.name.is_empty() {
        return Err(SchemaError::MissingField {
            field: "name".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for message in &receiver.messages {
        if message.name.is_empty() {
            return Err(SchemaError::InvalidReceiver {
                name: receiver.name.clone(),
                reason: "message name cannot be empty".to_string(),
            });
        }

        if !seen.insert(message.name.as_str()) {
            return Err(SchemaError::InvalidMessage {
                receiver: receiver.name.clone(),
                message: message.name.clone(),
                reason: "duplicate message name".to_string(),
            });
        }

        if message.is_synchronous() && message.is_async() {
            return Err(SchemaError::InvalidMessage {
                receiver: receiver.name.clone(),
                message: message.name.clone(),
                reason: "Synchronous and Async are mutually exclusive".to_string(),
            });
        }

        if (message.is_synchronous() || message.is_async()) && !message.has_reply() {
            let attribute = if message.is_async() {
                MessageAttribute::Async
            } else {
                MessageAttribute::Synchronous
            };
            return Err(SchemaError::InvalidMessage {
                receiver: receiver.name.clone(),
                message: message.name.clone(),
                reason: format!("{:?} requires reply parameters", attribute),
            });
        }

        for parameter in message
            .parameters
            .iter()
            .chain(message.reply_parameters().iter())
        {
            if parameter.name.is_empty() || parameter.ty.is_empty() {
                return Err(SchemaError::InvalidMessage {
                    receiver: receiver.name.clone(),
                    message: message.name.clone(),
                    reason: "parameter name and type cannot be empty".to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Validate a whole generation run: receiver names must be globally unique.
pub fn validate_receivers(receivers: &[Receiver]) -> Result<()> {
    let mut seen = HashSet::new();
    for receiver in receivers {
        if !seen.insert(receiver.name.as_str()) {
            return Err(SchemaError::InvalidReceiver {
                name: receiver.name.clone(),
                reason: "duplicate receiver name".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ParameterKind, ReceiverAttribute};

    #[test]
    fn test_parse_receiver_minimal() {
        let yaml = r#"
name: ResourceLoader
"#;

        let receiver = parse_yaml(yaml).unwrap();
        assert_eq!(receiver.name, "ResourceLoader");
        assert!(receiver.condition.is_none());
        assert!(receiver.superclass.is_none());
        assert!(receiver.messages.is_empty());
    }

    #[test]
    fn test_parse_receiver_full() {
        let yaml = r#"
name: StorageArea
condition: ENABLE(DOM_STORAGE)
superclass: StorageAreaBase
attributes: [LegacyReceiver, NotRefCounted]

messages:
  - name: SetItem
    parameters:
      - name: key
        type: String
      - name: value
        type: String
        condition: ENABLE(LARGE_VALUES)
    reply_parameters:
      - name: quotaError
        type: bool
    attributes: [Async]

  - name: Clear
    attributes: [WantsConnection]
"#;

        let receiver = parse_yaml(yaml).unwrap();
        assert_eq!(receiver.name, "StorageArea");
        assert_eq!(receiver.condition.as_deref(), Some("ENABLE(DOM_STORAGE)"));
        assert_eq!(receiver.superclass.as_deref(), Some("StorageAreaBase"));
        assert!(receiver.is_legacy());
        assert!(!receiver.is_ref_counted());
        assert!(!receiver.has_attribute(ReceiverAttribute::WantsDispatchMessage));

        assert_eq!(receiver.messages.len(), 2);
        let set_item = &receiver.messages[0];
        assert!(set_item.is_async());
        assert_eq!(set_item.parameters.len(), 2);
        assert_eq!(set_item.parameters[0].kind, ParameterKind::Class);
        assert_eq!(
            set_item.parameters[1].condition.as_deref(),
            Some("ENABLE(LARGE_VALUES)")
        );
        assert_eq!(set_item.reply_parameters().len(), 1);

        let clear = &receiver.messages[1];
        assert!(clear.wants_connection());
        assert!(!clear.has_reply());
    }

    #[test]
    fn test_parse_enum_kind() {
        let yaml = r#"
name: GestureController
messages:
  - name: BeginGesture
    parameters:
      - name: gestureType
        type: Courier::GestureType
        kind: enum:uint8_t
"#;

        let receiver = parse_yaml(yaml).unwrap();
        assert_eq!(
            receiver.messages[0].parameters[0].kind,
            ParameterKind::Enum {
                width: "uint8_t".to_string()
            }
        );
    }

    #[test]
    fn test_reject_unknown_kind() {
        let yaml = r#"
name: GestureController
messages:
  - name: BeginGesture
    parameters:
      - name: gestureType
        type: Courier::GestureType
        kind: union
"#;

        assert!(parse_yaml(yaml).is_err());
    }

    #[test]
    fn test_reject_synchronous_and_async() {
        let yaml = r#"
name: ResourceLoader
messages:
  - name: StartLoad
    reply_parameters:
      - name: ok
        type: bool
    attributes: [Synchronous, Async]
"#;

        let err = parse_yaml(yaml).unwrap_err().to_string();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn test_reject_async_without_reply() {
        let yaml = r#"
name: ResourceLoader
messages:
  - name: StartLoad
    attributes: [Async]
"#;

        let err = parse_yaml(yaml).unwrap_err().to_string();
        assert!(err.contains("requires reply parameters"));
    }

    #[test]
    fn test_reject_duplicate_message_names() {
        let yaml = r#"
name: ResourceLoader
messages:
  - name: StartLoad
  - name: StartLoad
"#;

        let err = parse_yaml(yaml).unwrap_err().to_string();
        assert!(err.contains("duplicate message name"));
    }

    #[test]
    fn test_reject_duplicate_receiver_names() {
        let a = parse_yaml("name: ResourceLoader").unwrap();
        let b = parse_yaml("name: ResourceLoader").unwrap();
        let err = validate_receivers(&[a, b]).unwrap_err().to_string();
        assert!(err.contains("duplicate receiver name"));
    }
}
