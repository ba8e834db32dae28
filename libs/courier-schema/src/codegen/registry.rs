// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The cross-receiver message name registry.
//!
//! Identity assignment is the one global, inherently sequential pass: every
//! receiver and message is numbered exactly once, in schema order, and the
//! generated lookup functions are exhaustive over the resulting space.
//! Conditionally-compiled messages still consume their identity value so the
//! numbering is stable across build configurations.

use crate::definition::Receiver;

use super::file_banner;

/// Receiver meta-identities appended after the schema-declared receivers.
const META_RECEIVERS: [&str; 3] = ["IPC", "AsyncReply", "Invalid"];

/// Message meta-identities appended after the schema-declared messages.
const META_MESSAGES: [&str; 4] = [
    "WrappedAsyncMessageForTesting",
    "SyncMessageReply",
    "InitializeConnection",
    "LegacySessionState",
];

/// A numbered receiver enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverIdentity {
    pub name: String,
    pub value: u16,
}

/// A numbered message enumerator, including implicit async replies and the
/// trailing meta-messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageIdentity {
    /// Enumerator name, e.g. `Foo_Bar` or `Foo_QuxReply`.
    pub enumerator: String,
    /// Human-readable description, e.g. `Foo::Bar`.
    pub description: String,
    /// Owning `ReceiverName` enumerator (`AsyncReply` for implicit replies,
    /// `IPC` for meta-messages).
    pub receiver: String,
    pub value: u16,
    pub condition: Option<String>,
}

/// The full identity space of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAssignment {
    pub receivers: Vec<ReceiverIdentity>,
    pub messages: Vec<MessageIdentity>,
}

/// Number every receiver and message in schema order, starting at 1, with an
/// async message's implicit reply taking the immediately following value.
pub fn assign_identities(receivers: &[Receiver]) -> IdentityAssignment {
    let mut receiver_identities = Vec::new();
    let mut value = 1u16;
    for receiver in receivers {
        receiver_identities.push(ReceiverIdentity {
            name: receiver.name.clone(),
            value,
        });
        value += 1;
    }
    for meta in META_RECEIVERS {
        receiver_identities.push(ReceiverIdentity {
            name: meta.to_string(),
            value,
        });
        value += 1;
    }

    let mut message_identities = Vec::new();
    let mut value = 1u16;
    for receiver in receivers {
        for message in &receiver.messages {
            message_identities.push(MessageIdentity {
                enumerator: format!("{}_{}", receiver.name, message.name),
                description: format!("{}::{}", receiver.name, message.name),
                receiver: receiver.name.clone(),
                value,
                condition: message.condition.clone(),
            });
            value += 1;

            if message.is_async() {
                message_identities.push(MessageIdentity {
                    enumerator: format!("{}_{}", receiver.name, message.reply_name()),
                    description: format!("{}::{}", receiver.name, message.reply_name()),
                    receiver: "AsyncReply".to_string(),
                    value,
                    condition: message.condition.clone(),
                });
                value += 1;
            }
        }
    }
    for meta in META_MESSAGES {
        message_identities.push(MessageIdentity {
            enumerator: meta.to_string(),
            description: format!("IPC::{}", meta),
            receiver: "IPC".to_string(),
            value,
            condition: None,
        });
        value += 1;
    }

    IdentityAssignment {
        receivers: receiver_identities,
        messages: message_identities,
    }
}

/// Append `text` under `condition`, keeping an already-open guard block open
/// while consecutive entries share the same condition.
fn push_guarded(out: &mut String, open: &mut Option<String>, condition: Option<&str>, text: &str) {
    if open.as_deref() != condition {
        if open.take().is_some() {
            out.push_str("#endif\n");
        }
        if let Some(condition) = condition {
            out.push_str(&format!("#if {}\n", condition));
            *open = Some(condition.to_string());
        }
    }
    out.push_str(text);
}

fn close_guard(out: &mut String, open: &mut Option<String>) {
    if open.take().is_some() {
        out.push_str("#endif\n");
    }
}

/// Generate `MessageNames.h`: the receiver and message enumerations plus the
/// lookup function declarations.
pub fn generate_message_names_header(receivers: &[Receiver]) -> String {
    let assignment = assign_identities(receivers);

    let mut out = file_banner("all receiver schemas");
    out.push_str("#pragma once\n\n");
    out.push_str("#include <base/EnumTraits.h>\n\n");
    out.push_str("namespace IPC {\n\n");

    out.push_str("enum class ReceiverName : uint8_t {\n");
    for identity in &assignment.receivers {
        out.push_str(&format!("    {} = {},\n", identity.name, identity.value));
    }
    out.push_str("};\n\n");

    out.push_str("enum class MessageName : uint16_t {\n");
    let mut open = None;
    for identity in &assignment.messages {
        push_guarded(
            &mut out,
            &mut open,
            identity.condition.as_deref(),
            &format!("    {} = {},\n", identity.enumerator, identity.value),
        );
    }
    close_guard(&mut out, &mut open);
    out.push_str("};\n\n");

    out.push_str("ReceiverName receiverName(MessageName);\n");
    out.push_str("const char* description(MessageName);\n");
    out.push_str("bool isValidMessageName(MessageName);\n\n");
    out.push_str("} // namespace IPC\n\n");

    out.push_str("namespace Base {\n\n");
    out.push_str("template<>\n");
    out.push_str("class HasCustomIsValidEnum<IPC::MessageName> : public std::true_type { };\n");
    out.push_str("template<typename E, typename T, std::enable_if_t<std::is_same_v<E, IPC::MessageName>>* = nullptr>\n");
    out.push_str("bool isValidEnum(T messageName)\n");
    out.push_str("{\n");
    out.push_str("    static_assert(sizeof(T) == sizeof(E), \"isValidEnum<IPC::MessageName> should only be called with 16-bit types\");\n");
    out.push_str("    return IPC::isValidMessageName(static_cast<E>(messageName));\n");
    out.push_str("}\n\n");
    out.push_str("} // namespace Base\n");

    out
}

/// Generate `MessageNames.cpp`: the three exhaustive lookup functions. Every
/// assigned identity gets a case, guarded exactly like the identity itself;
/// there is no default case, and control past the cases is a hard invariant
/// violation.
pub fn generate_message_names_implementation(receivers: &[Receiver]) -> String {
    let assignment = assign_identities(receivers);

    let mut out = file_banner("all receiver schemas");
    out.push_str("#include \"config.h\"\n");
    out.push_str("#include \"MessageNames.h\"\n\n");
    out.push_str("namespace IPC {\n\n");

    out.push_str("const char* description(MessageName name)\n{\n    switch (name) {\n");
    let mut open = None;
    for identity in &assignment.messages {
        push_guarded(
            &mut out,
            &mut open,
            identity.condition.as_deref(),
            &format!(
                "    case MessageName::{}:\n        return \"{}\";\n",
                identity.enumerator, identity.description
            ),
        );
    }
    close_guard(&mut out, &mut open);
    out.push_str("    }\n");
    out.push_str("    ASSERT_NOT_REACHED();\n");
    out.push_str("    return \"<invalid message name>\";\n");
    out.push_str("}\n\n");

    out.push_str("ReceiverName receiverName(MessageName messageName)\n{\n    switch (messageName) {\n");
    for receiver in receivers {
        let mut open = None;
        for identity in assignment
            .messages
            .iter()
            .filter(|identity| identity.receiver == receiver.name)
        {
            push_guarded(
                &mut out,
                &mut open,
                identity.condition.as_deref(),
                &format!("    case MessageName::{}:\n", identity.enumerator),
            );
        }
        close_guard(&mut out, &mut open);
        out.push_str(&format!("        return ReceiverName::{};\n", receiver.name));
    }
    let mut open = None;
    for identity in assignment
        .messages
        .iter()
        .filter(|identity| identity.receiver == "AsyncReply")
    {
        push_guarded(
            &mut out,
            &mut open,
            identity.condition.as_deref(),
            &format!("    case MessageName::{}:\n", identity.enumerator),
        );
    }
    close_guard(&mut out, &mut open);
    out.push_str("        return ReceiverName::AsyncReply;\n");
    for identity in assignment
        .messages
        .iter()
        .filter(|identity| identity.receiver == "IPC")
    {
        out.push_str(&format!("    case MessageName::{}:\n", identity.enumerator));
    }
    out.push_str("        return ReceiverName::IPC;\n");
    out.push_str("    }\n");
    out.push_str("    ASSERT_NOT_REACHED();\n");
    out.push_str("    return ReceiverName::Invalid;\n");
    out.push_str("}\n\n");

    out.push_str("bool isValidMessageName(MessageName messageName)\n{\n");
    let mut open = None;
    for identity in &assignment.messages {
        push_guarded(
            &mut out,
            &mut open,
            identity.condition.as_deref(),
            &format!(
                "    if (messageName == IPC::MessageName::{})\n        return true;\n",
                identity.enumerator
            ),
        );
    }
    close_guard(&mut out, &mut open);
    out.push_str("    return false;\n");
    out.push_str("}\n\n");
    out.push_str("} // namespace IPC\n");

    out
}
