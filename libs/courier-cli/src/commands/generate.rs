// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The `courier generate` command.

use anyhow::{Context, Result};
use courier_schema::{codegen, parser, GeneratedFile};
use std::path::{Path, PathBuf};

/// Generate all receiver artifacts plus the registry into `out_dir`.
///
/// Every artifact is generated before anything is written: a failure aborts
/// the whole run without leaving partial output behind, since a half-written
/// set of headers would silently corrupt the consuming build.
pub fn run(schemas: &[PathBuf], out_dir: &Path) -> Result<()> {
    let mut receivers = Vec::new();
    for path in schemas {
        let receiver = parser::parse_yaml_file(path)
            .with_context(|| format!("failed to load receiver schema {}", path.display()))?;
        receivers.push(receiver);
    }
    parser::validate_receivers(&receivers)?;

    let mut files: Vec<GeneratedFile> = Vec::new();
    for receiver in &receivers {
        files.extend(codegen::generate_receiver_artifacts(receiver)?);
    }
    files.extend(codegen::generate_registry(&receivers));
    tracing::debug!(files = files.len(), "generation complete, writing output");

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    for file in &files {
        let path = out_dir.join(&file.name);
        std::fs::write(&path, &file.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("  wrote {}", path.display());
    }

    println!();
    println!(
        "Generated {} files for {} receivers.",
        files.len(),
        receivers.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_schema(dir: &Path, name: &str, yaml: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn test_generate_writes_all_artifacts() {
        let temp = TempDir::new().unwrap();
        let schema = write_schema(
            temp.path(),
            "Foo.yaml",
            r#"
name: Foo
messages:
  - name: Bar
    parameters:
      - name: x
        type: int32_t
"#,
        );
        let out_dir = temp.path().join("generated");

        run(&[schema], &out_dir).unwrap();

        for name in [
            "FooMessages.h",
            "FooMessagesReplies.h",
            "FooMessageReceiver.cpp",
            "MessageNames.h",
            "MessageNames.cpp",
        ] {
            assert!(out_dir.join(name).exists(), "missing {}", name);
        }
    }

    #[test]
    fn test_generate_aborts_before_writing_on_error() {
        let temp = TempDir::new().unwrap();
        let good = write_schema(temp.path(), "Foo.yaml", "name: Foo\n");
        let bad = write_schema(
            temp.path(),
            "Broken.yaml",
            r#"
name: Broken
messages:
  - name: Probe
    parameters:
      - name: widget
        type: Frobnicator<int32_t>
"#,
        );
        let out_dir = temp.path().join("generated");

        let err = run(&[good, bad], &out_dir).unwrap_err();
        assert!(err.to_string().contains("Frobnicator"));
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_generate_rejects_duplicate_receivers() {
        let temp = TempDir::new().unwrap();
        let first = write_schema(temp.path(), "Foo.yaml", "name: Foo\n");
        let second = write_schema(temp.path(), "AlsoFoo.yaml", "name: Foo\n");
        let out_dir = temp.path().join("generated");

        let err = run(&[first, second], &out_dir).unwrap_err();
        assert!(err.to_string().contains("duplicate receiver name"));
        assert!(!out_dir.exists());
    }
}
