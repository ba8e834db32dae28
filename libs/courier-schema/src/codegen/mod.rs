// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Code generation for receiver schemas.

pub mod dispatch;
pub mod headers;
pub mod messages;
pub mod registry;
pub mod types;

pub use dispatch::{dispatch_routine, generate_message_handler};
pub use messages::{generate_messages_header, generate_messages_reply_header};
pub use registry::{
    assign_identities, generate_message_names_header, generate_message_names_implementation,
    IdentityAssignment, MessageIdentity, ReceiverIdentity,
};
pub use types::{
    argument_coder_headers_for_type, conditions_for_header, function_parameter_type,
    headers_for_type, move_type, reply_parameter_type,
};

use crate::definition::Receiver;
use crate::error::Result;

/// A generated source artifact, named relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub contents: String,
}

pub(crate) fn file_banner(source: &str) -> String {
    format!(
        "// Generated by courier from {}.\n// DO NOT EDIT - regenerate with `courier generate`.\n\n",
        source
    )
}

/// Wrap `text` in a platform guard when one applies.
pub(crate) fn surround_in_condition(text: String, condition: Option<&str>) -> String {
    match condition {
        None => text,
        Some(condition) => format!("#if {}\n{}#endif\n", condition, text),
    }
}

/// Generate the three per-receiver artifacts: the message declarations
/// header, the reply continuations header, and the dispatch source.
pub fn generate_receiver_artifacts(receiver: &Receiver) -> Result<Vec<GeneratedFile>> {
    tracing::debug!(receiver = %receiver.name, "generating receiver artifacts");

    Ok(vec![
        GeneratedFile {
            name: receiver.messages_header_name(),
            contents: messages::generate_messages_header(receiver)?,
        },
        GeneratedFile {
            name: receiver.replies_header_name(),
            contents: messages::generate_messages_reply_header(receiver)?,
        },
        GeneratedFile {
            name: receiver.receiver_source_name(),
            contents: dispatch::generate_message_handler(receiver)?,
        },
    ])
}

/// Generate the cross-receiver registry header and implementation.
pub fn generate_registry(receivers: &[Receiver]) -> Vec<GeneratedFile> {
    tracing::debug!(receivers = receivers.len(), "generating message name registry");

    vec![
        GeneratedFile {
            name: "MessageNames.h".to_string(),
            contents: registry::generate_message_names_header(receivers),
        },
        GeneratedFile {
            name: "MessageNames.cpp".to_string(),
            contents: registry::generate_message_names_implementation(receivers),
        },
    ]
}
