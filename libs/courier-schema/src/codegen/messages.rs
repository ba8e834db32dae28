// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Per-receiver message and reply-continuation declaration headers.

use crate::definition::{Message, Parameter, Receiver};
use crate::error::Result;

use super::headers;
use super::types::{function_parameter_type, move_type, reply_parameter_type};
use super::{file_banner, surround_in_condition};

fn arguments_type(message: &Message) -> String {
    format!(
        "std::tuple<{}>",
        message
            .parameters
            .iter()
            .map(|parameter| function_parameter_type(&parameter.ty, &parameter.kind))
            .collect::<Vec<_>>()
            .join(", ")
    )
}

fn reply_type(message: &Message) -> String {
    format!(
        "std::tuple<{}>",
        message
            .reply_parameters()
            .iter()
            .map(|parameter| reply_parameter_type(&parameter.ty))
            .collect::<Vec<_>>()
            .join(", ")
    )
}

fn reply_arguments_type(message: &Message) -> String {
    format!(
        "std::tuple<{}>",
        message
            .reply_parameters()
            .iter()
            .map(|parameter| parameter.ty.clone())
            .collect::<Vec<_>>()
            .join(", ")
    )
}

/// `type name, type name` for a completion-handler signature.
pub(crate) fn completion_handler_parameters(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|parameter| {
            format!(
                "{} {}",
                function_parameter_type(&parameter.ty, &parameter.kind),
                parameter.name
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `T&&, U&&` for a completion-handler the generated code moves into.
pub(crate) fn move_parameters(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|parameter| move_type(&parameter.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The reply-continuation alias for a synchronous or asynchronous message,
/// `None` for fire-and-forget and legacy reply messages.
fn message_to_reply_forward_declaration(message: &Message) -> Option<String> {
    if !message.has_reply() || !(message.is_synchronous() || message.is_async()) {
        return None;
    }

    let parameters = completion_handler_parameters(message.reply_parameters());
    let alias = if message.is_async() {
        format!(
            "using {}AsyncReply = CompletionHandler<void({})>;\n",
            message.name, parameters
        )
    } else {
        format!(
            "using {}DelayedReply = CompletionHandler<void({})>;\n",
            message.name, parameters
        )
    };

    Some(surround_in_condition(alias, message.condition.as_deref()))
}

fn message_to_struct_declaration(receiver: &Receiver, message: &Message) -> String {
    let mut out = String::new();

    out.push_str(&format!("class {} {{\npublic:\n", message.name));
    out.push_str(&format!(
        "    using Arguments = {};\n\n",
        arguments_type(message)
    ));
    out.push_str(&format!(
        "    static IPC::MessageName name() {{ return IPC::MessageName::{}_{}; }}\n",
        receiver.name, message.name
    ));
    out.push_str(&format!(
        "    static const bool isSync = {};\n\n",
        if message.is_sync() { "true" } else { "false" }
    ));

    if message.has_reply() {
        let reply_parameters = message.reply_parameters();

        if message.is_async() {
            let moves = move_parameters(reply_parameters);
            out.push_str(&format!(
                "    static void callReply(IPC::Decoder&, CompletionHandler<void({})>&&);\n",
                moves
            ));
            out.push_str(&format!(
                "    static void cancelReply(CompletionHandler<void({})>&&);\n",
                moves
            ));
            out.push_str(&format!(
                "    static IPC::MessageName asyncMessageReplyName() {{ return IPC::MessageName::{}_{}; }}\n",
                receiver.name,
                message.reply_name()
            ));
            out.push_str(&format!("    using AsyncReply = {}AsyncReply;\n", message.name));
        } else if message.is_synchronous() {
            out.push_str(&format!(
                "    using DelayedReply = {}DelayedReply;\n",
                message.name
            ));
        }

        if message.is_synchronous() || message.is_async() {
            out.push_str("    static void send(std::unique_ptr<IPC::Encoder>&&, IPC::Connection&");
            if !reply_parameters.is_empty() {
                out.push_str(&format!(
                    ", {}",
                    completion_handler_parameters(reply_parameters)
                ));
            }
            out.push_str(");\n");
        }

        out.push_str(&format!("    using Reply = {};\n", reply_type(message)));
        out.push_str(&format!(
            "    using ReplyArguments = {};\n",
            reply_arguments_type(message)
        ));
    }

    if !message.parameters.is_empty() {
        let explicit = if message.parameters.len() == 1 {
            "explicit "
        } else {
            ""
        };
        let constructor_parameters = message
            .parameters
            .iter()
            .map(|parameter| {
                format!(
                    "{} {}",
                    function_parameter_type(&parameter.ty, &parameter.kind),
                    parameter.name
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        let argument_names = message
            .parameters
            .iter()
            .map(|parameter| parameter.name.clone())
            .collect::<Vec<_>>()
            .join(", ");

        out.push_str(&format!(
            "    {}{}({})\n",
            explicit, message.name, constructor_parameters
        ));
        out.push_str(&format!("        : m_arguments({})\n", argument_names));
        out.push_str("    {\n    }\n\n");
    }

    out.push_str("    const Arguments& arguments() const\n");
    out.push_str("    {\n");
    out.push_str("        return m_arguments;\n");
    out.push_str("    }\n");
    out.push('\n');
    out.push_str("private:\n");
    out.push_str("    Arguments m_arguments;\n");
    out.push_str("};\n");

    surround_in_condition(out, message.condition.as_deref())
}

/// Generate the `<Receiver>Messages.h` declaration header.
pub fn generate_messages_header(receiver: &Receiver) -> Result<String> {
    let mut out = file_banner(&format!("the {} receiver schema", receiver.name));
    out.push_str("#pragma once\n\n");

    if let Some(condition) = &receiver.condition {
        out.push_str(&format!("#if {}\n\n", condition));
    }

    let (forward_declarations, includes) = headers::forward_declarations_and_headers(receiver)?;
    for include in includes {
        out.push_str(&include);
    }
    out.push('\n');
    out.push_str(&forward_declarations);
    out.push('\n');

    out.push_str(&format!(
        "namespace Messages {{\nnamespace {} {{\n\n",
        receiver.name
    ));
    out.push_str(&format!(
        "static inline IPC::ReceiverName messageReceiverName()\n{{\n    return IPC::ReceiverName::{};\n}}\n\n",
        receiver.name
    ));

    let declarations: Vec<String> = receiver
        .messages
        .iter()
        .map(|message| message_to_struct_declaration(receiver, message))
        .collect();
    out.push_str(&declarations.join("\n"));
    out.push('\n');

    out.push_str(&format!(
        "}} // namespace {}\n}} // namespace Messages\n",
        receiver.name
    ));

    if let Some(condition) = &receiver.condition {
        out.push_str(&format!("\n#endif // {}\n", condition));
    }

    Ok(out)
}

/// Generate the `<Receiver>MessagesReplies.h` continuation header.
pub fn generate_messages_reply_header(receiver: &Receiver) -> Result<String> {
    let mut out = file_banner(&format!("the {} receiver schema", receiver.name));
    out.push_str("#pragma once\n\n");

    if let Some(condition) = &receiver.condition {
        out.push_str(&format!("#if {}\n\n", condition));
    }

    let (forward_declarations, includes) =
        headers::forward_declarations_and_headers_for_replies(receiver)?;
    for include in includes {
        out.push_str(&include);
    }
    out.push('\n');
    out.push_str(&forward_declarations);
    out.push('\n');

    out.push_str(&format!(
        "namespace Messages {{\nnamespace {} {{\n\n",
        receiver.name
    ));

    let aliases: Vec<String> = receiver
        .messages
        .iter()
        .filter_map(message_to_reply_forward_declaration)
        .collect();
    out.push_str(&aliases.join("\n"));
    out.push('\n');

    out.push_str(&format!(
        "}} // namespace {}\n}} // namespace Messages\n",
        receiver.name
    ));

    if let Some(condition) = &receiver.condition {
        out.push_str(&format!("\n#endif // {}\n", condition));
    }

    Ok(out)
}
