// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Dispatch glue: routes an incoming wire message to its handler function.

use crate::definition::{Message, Receiver};
use crate::error::Result;
use std::collections::{BTreeMap, BTreeSet};

use super::messages::{completion_handler_parameters, move_parameters};
use super::types::{argument_coder_headers_for_type, headers_for_type};
use super::{file_banner, surround_in_condition};

/// Maps a message's attribute combination to the runtime dispatch entry
/// point and whether the connection leads the argument list.
pub fn dispatch_routine(
    synchronous: bool,
    asynchronous: bool,
    wants_connection: bool,
) -> (&'static str, bool) {
    match (synchronous, asynchronous, wants_connection) {
        (true, _, false) => ("handleMessageSynchronous", true),
        (true, _, true) => ("handleMessageSynchronousWantsConnection", true),
        (false, true, false) => ("handleMessageAsync", true),
        (false, true, true) => ("handleMessageAsyncWantsConnection", true),
        (false, false, leading_connection) => ("handleMessage", leading_connection),
    }
}

/// The handler member function a message dispatches to: the message name
/// with its first character lowered, a leading `URL` acronym lowered
/// wholesale.
fn handler_function(receiver: &Receiver, message: &Message) -> String {
    if let Some(rest) = message.name.strip_prefix("URL") {
        return format!("{}::url{}", receiver.name, rest);
    }

    let mut characters = message.name.chars();
    match characters.next() {
        Some(first) => format!(
            "{}::{}{}",
            receiver.name,
            first.to_ascii_lowercase(),
            characters.as_str()
        ),
        None => receiver.name.clone(),
    }
}

/// A message wants the connection when either it or its receiver carries the
/// attribute.
fn wants_connection(receiver: &Receiver, message: &Message) -> bool {
    message.wants_connection() || receiver.wants_connection()
}

fn async_message_statement(receiver: &Receiver, message: &Message) -> String {
    let (routine, leading_connection) =
        dispatch_routine(false, message.is_async(), wants_connection(receiver, message));

    let mut arguments = vec![
        "decoder".to_string(),
        "this".to_string(),
        format!("&{}", handler_function(receiver, message)),
    ];
    if leading_connection {
        arguments.insert(0, "connection".to_string());
    }

    let mut out = String::new();
    out.push_str(&format!(
        "    if (decoder.messageName() == Messages::{}::{}::name()) {{\n",
        receiver.name, message.name
    ));
    out.push_str(&format!(
        "        IPC::{}<Messages::{}::{}>({});\n",
        routine,
        receiver.name,
        message.name,
        arguments.join(", ")
    ));
    out.push_str("        return;\n");
    out.push_str("    }\n");

    surround_in_condition(out, message.condition.as_deref())
}

fn sync_message_statement(receiver: &Receiver, message: &Message) -> String {
    let (routine, leading_connection) = dispatch_routine(
        message.is_synchronous(),
        false,
        wants_connection(receiver, message),
    );
    let connection = if leading_connection { "connection, " } else { "" };
    // Legacy reply messages (no Synchronous attribute) hand the encoder over
    // by value.
    let reply_encoder = if message.is_synchronous() {
        "replyEncoder"
    } else {
        "*replyEncoder"
    };

    let mut out = String::new();
    out.push_str(&format!(
        "    if (decoder.messageName() == Messages::{}::{}::name()) {{\n",
        receiver.name, message.name
    ));
    out.push_str(&format!(
        "        IPC::{}<Messages::{}::{}>({}decoder, {}, this, &{});\n",
        routine,
        receiver.name,
        message.name,
        connection,
        reply_encoder,
        handler_function(receiver, message)
    ));
    out.push_str("        return;\n");
    out.push_str("    }\n");

    surround_in_condition(out, message.condition.as_deref())
}

/// Collect every header the dispatch source needs, tracking the conditions
/// of each use site. A header required unconditionally anywhere is emitted
/// without a guard.
fn dispatch_header_conditions(
    receiver: &Receiver,
) -> Result<BTreeMap<String, Vec<Option<String>>>> {
    let mut header_conditions: BTreeMap<String, Vec<Option<String>>> = BTreeMap::new();
    header_conditions.insert(
        format!("\"{}\"", receiver.messages_header_name()),
        vec![None],
    );
    header_conditions.insert("\"HandleMessage.h\"".to_string(), vec![None]);
    header_conditions.insert("\"Decoder.h\"".to_string(), vec![None]);

    let mut type_conditions: BTreeMap<String, Vec<Option<String>>> = BTreeMap::new();
    for parameter in receiver.iter_parameters() {
        let conditions = type_conditions.entry(parameter.ty.clone()).or_default();
        if !conditions.contains(&parameter.condition) {
            conditions.push(parameter.condition.clone());
        }
    }

    for parameter in receiver.iter_parameters() {
        let conditions = &type_conditions[&parameter.ty];
        for header in argument_coder_headers_for_type(&parameter.ty)? {
            header_conditions
                .entry(header)
                .or_default()
                .extend(conditions.iter().cloned());
        }
        for header in headers_for_type(&parameter.ty)? {
            header_conditions
                .entry(header)
                .or_default()
                .extend(conditions.iter().cloned());
        }
    }

    // Reply parameter types are additionally used under the message's own
    // condition when the reply continuation is generated.
    for message in &receiver.messages {
        for parameter in message.reply_parameters() {
            for header in argument_coder_headers_for_type(&parameter.ty)? {
                header_conditions
                    .entry(header)
                    .or_default()
                    .push(message.condition.clone());
            }
            for header in headers_for_type(&parameter.ty)? {
                header_conditions
                    .entry(header)
                    .or_default()
                    .push(message.condition.clone());
            }
        }
    }

    Ok(header_conditions)
}

/// Generate the `<Receiver>MessageReceiver.cpp` dispatch source.
pub fn generate_message_handler(receiver: &Receiver) -> Result<String> {
    let header_conditions = dispatch_header_conditions(receiver)?;

    let mut out = file_banner(&format!("the {} receiver schema", receiver.name));
    out.push_str("#include \"config.h\"\n\n");

    if let Some(condition) = &receiver.condition {
        out.push_str(&format!("#if {}\n\n", condition));
    }

    out.push_str(&format!("#include \"{}.h\"\n\n", receiver.name));
    for (header, conditions) in &header_conditions {
        if !conditions.is_empty() && !conditions.contains(&None) {
            let guards: BTreeSet<&str> = conditions
                .iter()
                .flatten()
                .map(|condition| condition.as_str())
                .collect();
            out.push_str(&format!(
                "#if {}\n#include {}\n#endif\n",
                guards.into_iter().collect::<Vec<_>>().join(" || "),
                header
            ));
        } else {
            out.push_str(&format!("#include {}\n", header));
        }
    }
    out.push('\n');

    let delayed_or_async: Vec<&Message> = receiver
        .messages
        .iter()
        .filter(|message| message.has_reply() && (message.is_synchronous() || message.is_async()))
        .collect();

    if !delayed_or_async.is_empty() {
        out.push_str(&format!(
            "namespace Messages {{\n\nnamespace {} {{\n\n",
            receiver.name
        ));

        for message in &delayed_or_async {
            let reply_parameters = message.reply_parameters();

            if let Some(condition) = &message.condition {
                out.push_str(&format!("#if {}\n\n", condition));
            }

            if message.is_async() {
                let moves = move_parameters(reply_parameters);
                out.push_str(&format!(
                    "void {}::callReply(IPC::Decoder& decoder, CompletionHandler<void({})>&& completionHandler)\n{{\n",
                    message.name, moves
                ));
                out.push_str("    UNUSED_PARAM(decoder);\n");
                out.push_str("    UNUSED_PARAM(completionHandler);\n");
                for parameter in reply_parameters {
                    out.push_str(&format!(
                        "    std::optional<{}> {};\n",
                        parameter.ty, parameter.name
                    ));
                    out.push_str(&format!("    decoder >> {};\n", parameter.name));
                    out.push_str(&format!(
                        "    if (!{}) {{\n        ASSERT_NOT_REACHED();\n        cancelReply(std::move(completionHandler));\n        return;\n    }}\n",
                        parameter.name
                    ));
                }
                out.push_str("    completionHandler(");
                out.push_str(
                    &reply_parameters
                        .iter()
                        .map(|parameter| format!("std::move(*{})", parameter.name))
                        .collect::<Vec<_>>()
                        .join(", "),
                );
                out.push_str(");\n}\n\n");

                out.push_str(&format!(
                    "void {}::cancelReply(CompletionHandler<void({})>&& completionHandler)\n{{\n    completionHandler(",
                    message.name, moves
                ));
                out.push_str(
                    &reply_parameters
                        .iter()
                        .map(|parameter| format!("IPC::AsyncReplyError<{}>::create()", parameter.ty))
                        .collect::<Vec<_>>()
                        .join(", "),
                );
                out.push_str(");\n}\n\n");
            }

            out.push_str(&format!(
                "void {}::send(std::unique_ptr<IPC::Encoder>&& encoder, IPC::Connection& connection",
                message.name
            ));
            if !reply_parameters.is_empty() {
                out.push_str(&format!(
                    ", {}",
                    completion_handler_parameters(reply_parameters)
                ));
            }
            out.push_str(")\n{\n");
            for parameter in reply_parameters {
                out.push_str(&format!("    *encoder << {};\n", parameter.name));
            }
            out.push_str("    connection.sendSyncReply(std::move(encoder));\n");
            out.push_str("}\n\n");

            if message.condition.is_some() {
                out.push_str("#endif\n\n");
            }
        }

        out.push_str(&format!(
            "}} // namespace {}\n\n}} // namespace Messages\n\n",
            receiver.name
        ));
    }

    let mut async_messages: Vec<&Message> = Vec::new();
    let mut sync_messages: Vec<&Message> = Vec::new();
    for message in &receiver.messages {
        if message.has_reply() && !message.is_async() {
            sync_messages.push(message);
        } else {
            async_messages.push(message);
        }
    }

    let legacy_infix = if receiver.is_legacy() {
        receiver.name.as_str()
    } else {
        ""
    };

    out.push_str("namespace Courier {\n\n");

    if !async_messages.is_empty() || receiver.wants_dispatch_message() {
        out.push_str(&format!(
            "void {}::didReceive{}Message(IPC::Connection& connection, IPC::Decoder& decoder)\n{{\n",
            receiver.name, legacy_infix
        ));
        if receiver.is_ref_counted() {
            out.push_str("    auto protectedThis = makeRef(*this);\n");
        }
        for message in &async_messages {
            out.push_str(&async_message_statement(receiver, message));
        }
        if receiver.wants_dispatch_message() {
            out.push_str("    if (dispatchMessage(connection, decoder))\n");
            out.push_str("        return;\n");
        }
        if let Some(superclass) = &receiver.superclass {
            out.push_str(&format!(
                "    {}::didReceiveMessage(connection, decoder);\n",
                superclass
            ));
        } else {
            out.push_str("    UNUSED_PARAM(connection);\n");
            out.push_str("    UNUSED_PARAM(decoder);\n");
            out.push_str("    ASSERT_NOT_REACHED();\n");
        }
        out.push_str("}\n");
    }

    if !sync_messages.is_empty() || receiver.wants_dispatch_message() {
        out.push('\n');
        out.push_str(&format!(
            "void {}::didReceiveSync{}Message(IPC::Connection& connection, IPC::Decoder& decoder, std::unique_ptr<IPC::Encoder>& replyEncoder)\n{{\n",
            receiver.name, legacy_infix
        ));
        if receiver.is_ref_counted() {
            out.push_str("    auto protectedThis = makeRef(*this);\n");
        }
        for message in &sync_messages {
            out.push_str(&sync_message_statement(receiver, message));
        }
        if receiver.wants_dispatch_message() {
            out.push_str("    if (dispatchSyncMessage(connection, decoder, replyEncoder))\n");
            out.push_str("        return;\n");
        }
        out.push_str("    UNUSED_PARAM(connection);\n");
        out.push_str("    UNUSED_PARAM(decoder);\n");
        out.push_str("    UNUSED_PARAM(replyEncoder);\n");
        out.push_str("    ASSERT_NOT_REACHED();\n");
        out.push_str("}\n");
    }

    out.push_str("\n} // namespace Courier\n");

    if let Some(condition) = &receiver.condition {
        out.push_str(&format!("\n#endif // {}\n", condition));
    }

    Ok(out)
}
