//! IdentiForge CLI - Bridge interface for scripting
//!
//! Commands: render, manifest, verify
//! Outputs JSON to stdout
//! Returns non-zero on render or verification failure

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use identiforge_core::{encode_hex, pipeline, IdenticonManifest};

#[derive(Parser)]
#[command(name = "identiforge-cli")]
#[command(about = "IdentiForge CLI - Deterministic Identicon Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory rendered PNG files are written into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an identicon and write <input>.png
    Render {
        /// Input string
        #[arg(short, long)]
        input: String,

        /// Also print the full reproduction manifest
        #[arg(long)]
        manifest: bool,
    },

    /// Print the reproduction manifest without writing any file
    Manifest {
        /// Input string
        #[arg(short, long)]
        input: String,
    },

    /// Verify a saved manifest against the running engine
    Verify {
        /// Path to a manifest JSON file
        #[arg(short, long)]
        manifest: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { input, manifest } => {
            let identicon = match pipeline::render(&input) {
                Ok(i) => i,
                Err(e) => {
                    println!(r#"{{"success": false, "error": "{}"}}"#, e);
                    return ExitCode::from(2);
                }
            };

            let path = match identicon.save(&cli.out_dir) {
                Ok(p) => p,
                Err(e) => {
                    println!(r#"{{"success": false, "error": "{}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            if manifest {
                match identicon.manifest() {
                    Ok(m) => {
                        let output = serde_json::json!({
                            "success": true,
                            "path": path,
                            "manifest": m,
                        });
                        println!("{}", serde_json::to_string_pretty(&output).unwrap());
                        ExitCode::SUCCESS
                    }
                    Err(e) => {
                        println!(r#"{{"success": false, "error": "{}"}}"#, e);
                        ExitCode::FAILURE
                    }
                }
            } else {
                let output = serde_json::json!({
                    "success": true,
                    "path": path,
                    "digest": encode_hex(&identicon.digest),
                    "color": identicon.color.to_array(),
                    "visible_cells": identicon.cells.len(),
                });
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
                ExitCode::SUCCESS
            }
        }

        Commands::Manifest { input } => {
            let result = pipeline::render(&input).and_then(|i| i.manifest());
            match result {
                Ok(m) => {
                    println!("{}", serde_json::to_string_pretty(&m).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    println!(r#"{{"success": false, "error": "{}"}}"#, e);
                    ExitCode::from(2)
                }
            }
        }

        Commands::Verify { manifest } => {
            let content = match fs::read_to_string(&manifest) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!(r#"{{"error": "Failed to read manifest: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            let parsed: IdenticonManifest = match serde_json::from_str(&content) {
                Ok(m) => m,
                Err(e) => {
                    println!(r#"{{"valid": false, "error": "Invalid manifest: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            match pipeline::verify_manifest(&parsed) {
                Ok(()) => {
                    let output = serde_json::json!({
                        "valid": true,
                        "input": parsed.input,
                        "digest": parsed.digest_hex,
                    });
                    println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    println!(r#"{{"valid": false, "error": "{}"}}"#, e);
                    ExitCode::from(2) // Verification failure
                }
            }
        }
    }
}
