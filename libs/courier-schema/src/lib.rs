// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Receiver schema parsing and IPC code generation for Courier.
//!
//! This crate provides:
//! - YAML receiver schema parsing
//! - Per-receiver message/reply/dispatch source generation
//! - The cross-receiver message name registry
//!
//! # Example
//!
//! ```
//! use courier_schema::{codegen, parser};
//!
//! let yaml = r#"
//! name: ResourceLoader
//! messages:
//!   - name: CancelLoad
//!     parameters:
//!       - name: identifier
//!         type: uint64_t
//! "#;
//!
//! let receiver = parser::parse_yaml(yaml).unwrap();
//! let header = codegen::generate_messages_header(&receiver).unwrap();
//! assert!(header.contains("class CancelLoad"));
//! ```

pub mod codegen;
pub mod definition;
pub mod error;
pub mod parser;

pub use codegen::{generate_receiver_artifacts, generate_registry, GeneratedFile};
pub use definition::{
    Message, MessageAttribute, Parameter, ParameterKind, Receiver, ReceiverAttribute,
};
pub use error::{Result, SchemaError};
pub use parser::{parse_yaml, parse_yaml_file, validate_receivers};
