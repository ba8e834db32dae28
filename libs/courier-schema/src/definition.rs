// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Receiver schema types.

use serde::{Deserialize, Serialize};

/// Attributes a receiver may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiverAttribute {
    /// Handler functions take the originating connection as their first
    /// argument.
    WantsConnection,
    /// The receiver sees raw messages through its own `dispatchMessage()`
    /// before falling through to the superclass.
    WantsDispatchMessage,
    /// Generated entry points embed the receiver name
    /// (`didReceiveFooMessage` instead of `didReceiveMessage`).
    LegacyReceiver,
    /// The receiver is not reference counted; dispatch skips the
    /// `protectedThis` guard.
    NotRefCounted,
}

/// Attributes a message may carry.
///
/// `Synchronous` and `Async` are mutually exclusive; either requires the
/// message to declare reply parameters. Validation happens in
/// [`crate::parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageAttribute {
    Synchronous,
    Async,
    WantsConnection,
}

/// How a parameter type was declared in the schema.
///
/// Serialized as `"class"`, `"struct"`, or `"enum:<width>"` (the width is
/// the underlying type of the enumeration, e.g. `enum:uint8_t`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParameterKind {
    #[default]
    Class,
    Struct,
    Enum {
        width: String,
    },
}

impl ParameterKind {
    /// Parse the schema string form of a kind tag.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "class" => Some(ParameterKind::Class),
            "struct" => Some(ParameterKind::Struct),
            _ => s.strip_prefix("enum:").map(|width| ParameterKind::Enum {
                width: width.to_string(),
            }),
        }
    }

    /// The schema string form of this kind tag.
    pub fn as_tag(&self) -> String {
        match self {
            ParameterKind::Class => "class".to_string(),
            ParameterKind::Struct => "struct".to_string(),
            ParameterKind::Enum { width } => format!("enum:{}", width),
        }
    }
}

impl Serialize for ParameterKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_tag())
    }
}

impl<'de> Deserialize<'de> for ParameterKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ParameterKindVisitor;

        impl Visitor<'_> for ParameterKindVisitor {
            type Value = ParameterKind;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("'class', 'struct', or 'enum:<width>'")
            }

            fn visit_str<E>(self, value: &str) -> Result<ParameterKind, E>
            where
                E: de::Error,
            {
                ParameterKind::parse(value).ok_or_else(|| {
                    de::Error::custom(format!("unknown parameter kind '{}'", value))
                })
            }
        }

        deserializer.deserialize_str(ParameterKindVisitor)
    }
}

/// A single typed parameter of a message (or of its reply).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (the call-argument name in generated code).
    pub name: String,

    /// Possibly-namespaced, possibly-templated type name
    /// (e.g. `HashMap<String, uint64_t>`).
    #[serde(rename = "type")]
    pub ty: String,

    /// Kind tag controlling passing form and forward-declaration shape.
    #[serde(default)]
    pub kind: ParameterKind,

    /// Platform guard narrower than the message's.
    #[serde(default)]
    pub condition: Option<String>,
}

/// One named, typed operation offered by a receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message name, unique within its receiver.
    pub name: String,

    /// Call-argument order is the declaration order.
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// `None` means fire-and-forget; present means the message has a reply
    /// channel.
    #[serde(default)]
    pub reply_parameters: Option<Vec<Parameter>>,

    #[serde(default)]
    pub attributes: Vec<MessageAttribute>,

    /// Platform guard, independent of the receiver's guard.
    #[serde(default)]
    pub condition: Option<String>,
}

impl Message {
    pub fn has_attribute(&self, attribute: MessageAttribute) -> bool {
        self.attributes.contains(&attribute)
    }

    pub fn is_synchronous(&self) -> bool {
        self.has_attribute(MessageAttribute::Synchronous)
    }

    pub fn is_async(&self) -> bool {
        self.has_attribute(MessageAttribute::Async)
    }

    pub fn wants_connection(&self) -> bool {
        self.has_attribute(MessageAttribute::WantsConnection)
    }

    pub fn has_reply(&self) -> bool {
        self.reply_parameters.is_some()
    }

    /// The reply parameters, empty for fire-and-forget messages.
    pub fn reply_parameters(&self) -> &[Parameter] {
        self.reply_parameters.as_deref().unwrap_or(&[])
    }

    /// Whether the generated declaration carries `isSync = true`: the
    /// message has a reply channel and is not asynchronous.
    pub fn is_sync(&self) -> bool {
        self.has_reply() && !self.is_async()
    }

    /// The name of the implicit reply pseudo-message of an async message.
    pub fn reply_name(&self) -> String {
        format!("{}Reply", self.name)
    }
}

/// A named interface that can accept messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receiver {
    /// Receiver name, globally unique.
    pub name: String,

    /// Platform guard wrapping everything generated for this receiver.
    #[serde(default)]
    pub condition: Option<String>,

    /// Fallback dispatch target for unmatched messages.
    #[serde(default)]
    pub superclass: Option<String>,

    #[serde(default)]
    pub attributes: Vec<ReceiverAttribute>,

    /// Declaration order fixes identity assignment order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Receiver {
    pub fn has_attribute(&self, attribute: ReceiverAttribute) -> bool {
        self.attributes.contains(&attribute)
    }

    pub fn wants_connection(&self) -> bool {
        self.has_attribute(ReceiverAttribute::WantsConnection)
    }

    pub fn wants_dispatch_message(&self) -> bool {
        self.has_attribute(ReceiverAttribute::WantsDispatchMessage)
    }

    pub fn is_legacy(&self) -> bool {
        self.has_attribute(ReceiverAttribute::LegacyReceiver)
    }

    pub fn is_ref_counted(&self) -> bool {
        !self.has_attribute(ReceiverAttribute::NotRefCounted)
    }

    /// All message parameters in declaration order, then all reply
    /// parameters in declaration order.
    pub fn iter_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.messages
            .iter()
            .flat_map(|message| message.parameters.iter())
            .chain(
                self.messages
                    .iter()
                    .flat_map(|message| message.reply_parameters().iter()),
            )
    }

    /// File name of the generated message declarations header.
    pub fn messages_header_name(&self) -> String {
        format!("{}Messages.h", self.name)
    }

    /// File name of the generated reply declarations header.
    pub fn replies_header_name(&self) -> String {
        format!("{}MessagesReplies.h", self.name)
    }

    /// File name of the generated dispatch glue source.
    pub fn receiver_source_name(&self) -> String {
        format!("{}MessageReceiver.cpp", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter(name: &str, ty: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            ty: ty.to_string(),
            kind: ParameterKind::Class,
            condition: None,
        }
    }

    #[test]
    fn test_parameter_kind_tags() {
        assert_eq!(ParameterKind::parse("class"), Some(ParameterKind::Class));
        assert_eq!(ParameterKind::parse("struct"), Some(ParameterKind::Struct));
        assert_eq!(
            ParameterKind::parse("enum:uint8_t"),
            Some(ParameterKind::Enum {
                width: "uint8_t".to_string()
            })
        );
        assert_eq!(ParameterKind::parse("union"), None);

        assert_eq!(
            ParameterKind::Enum {
                width: "uint16_t".to_string()
            }
            .as_tag(),
            "enum:uint16_t"
        );
    }

    #[test]
    fn test_message_sync_flags() {
        let fire_and_forget = Message {
            name: "DidClose".to_string(),
            parameters: vec![],
            reply_parameters: None,
            attributes: vec![],
            condition: None,
        };
        assert!(!fire_and_forget.is_sync());
        assert!(!fire_and_forget.has_reply());

        let sync = Message {
            name: "LoadState".to_string(),
            parameters: vec![],
            reply_parameters: Some(vec![parameter("ok", "bool")]),
            attributes: vec![MessageAttribute::Synchronous],
            condition: None,
        };
        assert!(sync.is_sync());
        assert!(sync.is_synchronous());
        assert!(!sync.is_async());

        let asynchronous = Message {
            name: "FetchState".to_string(),
            parameters: vec![],
            reply_parameters: Some(vec![parameter("state", "String")]),
            attributes: vec![MessageAttribute::Async],
            condition: None,
        };
        assert!(!asynchronous.is_sync());
        assert!(asynchronous.is_async());
        assert_eq!(asynchronous.reply_name(), "FetchStateReply");
    }

    #[test]
    fn test_iter_parameters_order() {
        let receiver = Receiver {
            name: "ResourceLoader".to_string(),
            condition: None,
            superclass: None,
            attributes: vec![],
            messages: vec![
                Message {
                    name: "StartLoad".to_string(),
                    parameters: vec![parameter("url", "String"), parameter("priority", "uint8_t")],
                    reply_parameters: Some(vec![parameter("accepted", "bool")]),
                    attributes: vec![MessageAttribute::Async],
                    condition: None,
                },
                Message {
                    name: "CancelLoad".to_string(),
                    parameters: vec![parameter("identifier", "uint64_t")],
                    reply_parameters: None,
                    attributes: vec![],
                    condition: None,
                },
            ],
        };

        let names: Vec<&str> = receiver
            .iter_parameters()
            .map(|parameter| parameter.name.as_str())
            .collect();
        assert_eq!(names, ["url", "priority", "identifier", "accepted"]);
    }

    #[test]
    fn test_generated_file_names() {
        let receiver = Receiver {
            name: "ResourceLoader".to_string(),
            condition: None,
            superclass: None,
            attributes: vec![],
            messages: vec![],
        };
        assert_eq!(receiver.messages_header_name(), "ResourceLoaderMessages.h");
        assert_eq!(
            receiver.replies_header_name(),
            "ResourceLoaderMessagesReplies.h"
        );
        assert_eq!(
            receiver.receiver_source_name(),
            "ResourceLoaderMessageReceiver.cpp"
        );
    }
}
