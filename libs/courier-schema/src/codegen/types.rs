// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Type resolution: parameter passing forms, forward-declarability, and the
//! header sets a type drags into generated code.
//!
//! The lookup tables in this module are data, not logic. Growing the
//! protocol's type vocabulary means adding a table entry here, never touching
//! the generators.

use crate::definition::ParameterKind;
use crate::error::{Result, SchemaError};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Scalar types passed by value rather than by const reference.
const BUILTIN_TYPES: [&str; 11] = [
    "bool", "float", "double", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "int8_t", "int16_t",
    "int32_t", "int64_t",
];

/// Base-library value types usable without qualification in schemas. They
/// group under the `Base` namespace when forward-declared.
pub(crate) const NON_TEMPLATE_BASE_TYPES: [&str; 6] = [
    "MachSendRight",
    "MediaTime",
    "MonotonicTime",
    "Seconds",
    "String",
    "WallTime",
];

/// Opaque or ABI-sensitive types whose full header must always be included.
static TYPES_THAT_CANNOT_BE_FORWARD_DECLARED: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    vec![
        "MachSendRight",
        "MediaTime",
        "String",
        "Courier::ActivityStateChangeID",
        "Courier::FetchIdentifier",
        "Courier::FrameIdentifier",
        "Courier::GeolocationIdentifier",
        "Courier::LayerHostingContextID",
        "Courier::PageIdentifier",
        "Courier::PointerID",
        "Courier::ProcessIdentifier",
        "Courier::RenderingMode",
        "Courier::SleepDisablerIdentifier",
        "Courier::StorageAreaIdentifier",
        "Courier::StorageNamespaceIdentifier",
        "Courier::TransactionID",
        "Courier::WebSocketIdentifier",
    ]
});

/// Headers a class template drags in, for the declaration and for its
/// encode/decode support.
pub(crate) struct TemplateHeaderInfo {
    pub headers: &'static [&'static str],
    pub argument_coder_headers: &'static [&'static str],
}

static CLASS_TEMPLATE_TYPES: LazyLock<HashMap<&'static str, TemplateHeaderInfo>> =
    LazyLock::new(|| {
        let mut table = HashMap::new();
        let mut insert = |name, headers| {
            table.insert(
                name,
                TemplateHeaderInfo {
                    headers,
                    argument_coder_headers: &["\"ArgumentCoders.h\""],
                },
            );
        };
        insert("Courier::RectEdges", &["\"RectEdges.h\""] as &[_]);
        insert("Expected", &["<base/Expected.h>"]);
        insert("HashMap", &["<base/HashMap.h>"]);
        insert("HashSet", &["<base/HashSet.h>"]);
        insert("OptionSet", &["<base/OptionSet.h>"]);
        insert("Vector", &["<base/Vector.h>"]);
        insert("std::optional", &["<optional>"]);
        insert("std::pair", &["<utility>"]);
        table
    });

/// Types whose declaration header cannot be derived from their name.
static HEADERS_FOR_SPECIAL_TYPES: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| {
        let mut table: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        table.insert(
            "IPC::SharedBufferDataReference",
            &["\"SharedBufferDataReference.h\"", "\"DataReference.h\""],
        );
        table.insert("MachSendRight", &["<base/MachSendRight.h>"]);
        table.insert("MediaTime", &["<base/MediaTime.h>"]);
        table.insert("MonotonicTime", &["<base/MonotonicTime.h>"]);
        table.insert("Seconds", &["<base/Seconds.h>"]);
        table.insert("WallTime", &["<base/WallTime.h>"]);
        table.insert("String", &["<base/text/BaseString.h>"]);
        table.insert("Courier::ProcessIdentifier", &["<ProcessIdentifier.h>"]);
        table.insert("Courier::FrameLoadType", &["<NavigationTypes.h>"]);
        table.insert("Courier::HasInsecureContent", &["<NavigationTypes.h>"]);
        table.insert("Courier::PolicyAction", &["<NavigationTypes.h>"]);
        table.insert("Courier::IncludeSecureCookies", &["<CookieStorage.h>"]);
        table.insert(
            "Courier::ThirdPartyCookieBlockingMode",
            &["<CookieStorage.h>"],
        );
        table.insert("Courier::GestureType", &["\"GestureTypes.h\""]);
        table.insert("Courier::GestureRecognizerState", &["\"GestureTypes.h\""]);
        table.insert(
            "Courier::LayerHostingContextID",
            &["\"LayerHostingContext.h\""],
        );
        table.insert("Courier::ActivityStateChangeID", &["\"DrawingAreaInfo.h\""]);
        table.insert("Courier::BackForwardItemState", &["\"SessionState.h\""]);
        table.insert("Courier::PageState", &["\"SessionState.h\""]);
        table
    });

/// Types whose encode/decode support lives in a header of its own.
static ARGUMENT_CODER_SPECIAL_TYPES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut table = HashMap::new();
        table.insert("String", "\"ArgumentCoders.h\"");
        table.insert(
            "Courier::UserContentControllerHandle",
            "\"UserContentControllerShared.h\"",
        );
        table
    });

/// Platform guards for headers only present on some targets.
static HEADER_CONDITIONS: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| {
        let mut table: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        table.insert(
            "\"InputMethodState.h\"",
            &["PLATFORM(GTK)", "PLATFORM(WPE)"],
        );
        table.insert("\"LayerHostingContext.h\"", &["PLATFORM(COCOA)"]);
        table.insert("\"GestureTypes.h\"", &["PLATFORM(IOS_FAMILY)"]);
        table
    });

/// Platform guards required to include `header`, or `None` when the header
/// exists on every target.
pub fn conditions_for_header(header: &str) -> Option<&'static [&'static str]> {
    HEADER_CONDITIONS.get(header).copied()
}

/// The form a parameter takes in a generated function signature. Built-in
/// scalars and enumerations pass by value; everything else by const
/// reference.
pub fn function_parameter_type(ty: &str, kind: &ParameterKind) -> String {
    if BUILTIN_TYPES.contains(&ty) {
        return ty.to_string();
    }

    if matches!(kind, ParameterKind::Enum { .. }) {
        return ty.to_string();
    }

    format!("const {}&", ty)
}

/// Reply-output parameters are populated in place.
pub fn reply_parameter_type(ty: &str) -> String {
    format!("{}&", ty)
}

/// The form used when ownership transfers into a continuation.
pub fn move_type(ty: &str) -> String {
    format!("{}&&", ty)
}

/// Whether a type may be forward-declared at all. Template instantiations
/// and the opaque table entries always need their full header.
pub(crate) fn cannot_forward_declare(ty: &str) -> bool {
    ty.contains('<') || TYPES_THAT_CANNOT_BE_FORWARD_DECLARED.contains(&ty)
}

/// Split a template parameter list on commas, respecting nested angle
/// bracket and parenthesis grouping.
pub(crate) fn split_template_parameters(parameters: &str) -> Vec<String> {
    let mut split = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for character in parameters.chars() {
        if character == ',' && depth == 0 {
            split.push(current.clone());
            current.clear();
            continue;
        }
        if character == '<' || character == '(' {
            depth += 1;
        } else if character == '>' || character == ')' {
            depth = depth.saturating_sub(1);
        }
        current.push(character);
    }

    split.push(current);
    split
}

/// A template type string decomposed into the containers it instantiates and
/// the leaf types it mentions.
pub(crate) struct TemplateExpansion {
    pub header_infos: Vec<&'static TemplateHeaderInfo>,
    pub leaf_types: Vec<String>,
}

/// Recursively decompose `type_string`. A non-template type is its own single
/// leaf. An unrecognized template name is fatal; guessing a header would
/// corrupt the generated build.
pub(crate) fn class_template_headers(type_string: &str) -> Result<TemplateExpansion> {
    let type_string = type_string.trim();

    let Some(open) = type_string.find('<') else {
        return Ok(TemplateExpansion {
            header_infos: Vec::new(),
            leaf_types: vec![type_string.to_string()],
        });
    };
    let close = match type_string.rfind('>') {
        Some(close) if close > open => close,
        _ => {
            return Ok(TemplateExpansion {
                header_infos: Vec::new(),
                leaf_types: vec![type_string.to_string()],
            });
        }
    };

    let template_name = type_string[..open].trim();
    let parameter_string = &type_string[open + 1..close];

    let Some(info) = CLASS_TEMPLATE_TYPES.get(template_name) else {
        return Err(SchemaError::UnsupportedTemplate {
            type_name: type_string.to_string(),
        });
    };

    let mut header_infos = vec![info];
    let mut leaf_types = Vec::new();

    for parameter in split_template_parameters(parameter_string) {
        let expansion = class_template_headers(&parameter)?;
        header_infos.extend(expansion.header_infos);
        leaf_types.extend(expansion.leaf_types);
    }

    Ok(TemplateExpansion {
        header_infos,
        leaf_types,
    })
}

/// Every header needed to use `type_string` in generated code: container
/// headers for template instantiations, special-case entries, and the
/// namespace-derived header for qualified types. `Courier::` and `IPC::`
/// types live in this repository (quoted includes); any other namespace is an
/// external library (angle includes). Unqualified builtins need no header.
pub fn headers_for_type(type_string: &str) -> Result<Vec<String>> {
    let expansion = class_template_headers(type_string)?;

    let mut headers = Vec::new();
    for info in &expansion.header_infos {
        headers.extend(info.headers.iter().map(|header| (*header).to_string()));
    }

    for leaf in &expansion.leaf_types {
        if let Some(special) = HEADERS_FOR_SPECIAL_TYPES.get(leaf.as_str()) {
            headers.extend(special.iter().map(|header| (*header).to_string()));
            continue;
        }

        let segments: Vec<&str> = leaf.split("::").collect();
        if segments.len() < 2 {
            continue;
        }

        if segments[0] == "Courier" || segments[0] == "IPC" {
            headers.push(format!("\"{}.h\"", segments[1]));
        } else {
            headers.push(format!("<{}.h>", segments[1]));
        }
    }

    Ok(headers)
}

/// The narrower lookup for encode/decode support headers, independent of the
/// declaration headers.
pub fn argument_coder_headers_for_type(type_string: &str) -> Result<Vec<String>> {
    let expansion = class_template_headers(type_string)?;

    let mut headers = Vec::new();
    for info in &expansion.header_infos {
        headers.extend(
            info.argument_coder_headers
                .iter()
                .map(|header| (*header).to_string()),
        );
    }

    for leaf in &expansion.leaf_types {
        if let Some(special) = ARGUMENT_CODER_SPECIAL_TYPES.get(leaf.as_str()) {
            headers.push((*special).to_string());
            continue;
        }

        let segments: Vec<&str> = leaf.split("::").collect();
        if segments.len() < 2 {
            continue;
        }
        if segments[0] == "Courier" {
            headers.push("\"CourierArgumentCoders.h\"".to_string());
        }
    }

    Ok(headers)
}
