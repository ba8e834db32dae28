// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Courier CLI
//!
//! Command-line interface for the Courier IPC message compiler.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "courier")]
#[command(author, version, about = "Courier IPC message compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate message, reply, dispatch, and registry sources
    Generate {
        /// Receiver schema files (YAML), in registry order
        #[arg(value_name = "SCHEMA", required = true)]
        schemas: Vec<PathBuf>,

        /// Directory generated sources are written into
        #[arg(short, long, value_name = "DIR")]
        out_dir: PathBuf,
    },

    /// Validate receiver schema files
    Validate {
        /// Receiver schema files (YAML)
        #[arg(value_name = "SCHEMA", required = true)]
        schemas: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate { schemas, out_dir } => commands::generate::run(&schemas, &out_dir),
        Commands::Validate { schemas } => commands::validate::run(&schemas),
    }
}
