// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The `courier validate` command.

use anyhow::Result;
use courier_schema::parser;
use std::path::PathBuf;

/// Parse each schema and print a summary, failing on the first invalid one.
pub fn run(schemas: &[PathBuf]) -> Result<()> {
    let mut receivers = Vec::new();

    for path in schemas {
        println!("Validating receiver schema: {}", path.display());

        match parser::parse_yaml_file(path) {
            Ok(receiver) => {
                println!();
                println!("  Name:       {}", receiver.name);
                if let Some(condition) = &receiver.condition {
                    println!("  Condition:  {}", condition);
                }
                if let Some(superclass) = &receiver.superclass {
                    println!("  Superclass: {}", superclass);
                }
                if !receiver.attributes.is_empty() {
                    println!("  Attributes: {:?}", receiver.attributes);
                }
                if !receiver.messages.is_empty() {
                    println!("  Messages:");
                    for message in &receiver.messages {
                        let shape = if message.is_async() {
                            "async"
                        } else if message.has_reply() {
                            "sync"
                        } else {
                            "one-way"
                        };
                        println!(
                            "    - {} ({}, {} parameters)",
                            message.name,
                            shape,
                            message.parameters.len()
                        );
                    }
                }
                println!();
                receivers.push(receiver);
            }
            Err(e) => {
                println!();
                anyhow::bail!("Validation failed: {}", e);
            }
        }
    }

    parser::validate_receivers(&receivers)?;

    println!("{} receiver schemas are valid.", receivers.len());
    Ok(())
}
