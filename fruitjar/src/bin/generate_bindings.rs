//! Generate UniFFI bindings for the native FruitJar app
//!
//! Run: cargo run --bin generate-bindings -- --language swift
//!
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ DEPENDENCY MAP - Output paths must match the app project's expectations     │
//! │                                                                             │
//! │ Inputs:                                                                     │
//! │   target/release/libfruitjar.{dylib,so}  ← Built library for bindgen        │
//! │                                                                             │
//! │ Outputs:                                                                    │
//! │   bindings/<language>/fruitjar.swift     ← Swift bindings (or .kt)          │
//! │   bindings/<language>/fruitjarFFI.h      ← C header (Swift only)            │
//! │   bindings/<language>/module.modulemap   ← Clang module map (Swift only)    │
//! └─────────────────────────────────────────────────────────────────────────────┘

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Language {
    Swift,
    Kotlin,
}

impl Language {
    fn as_str(&self) -> &'static str {
        match self {
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Regenerate the FruitJar FFI bindings")]
struct Args {
    #[arg(long, value_enum, default_value = "swift")]
    language: Language,

    /// Output directory (default: <crate>/bindings/<language>)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rust_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| rust_dir.join("bindings").join(args.language.as_str()));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    println!("Building Rust library...");
    run_cmd("cargo", &["build", "--release", "--lib"], &rust_dir)?;

    let library = release_library(&rust_dir)?;

    println!("Generating {} bindings...", args.language.as_str());
    run_cmd(
        "cargo",
        &[
            "run",
            "--bin",
            "uniffi-bindgen",
            "generate",
            "--library",
            &library.to_string_lossy(),
            "--language",
            args.language.as_str(),
            "--out-dir",
            &out_dir.to_string_lossy(),
        ],
        &rust_dir,
    )?;

    if let Language::Swift = args.language {
        // Swift 6 strict concurrency rejects the generated global
        println!("Patching generated Swift file...");
        let swift_file = out_dir.join("fruitjar.swift");
        let swift_content = fs::read_to_string(&swift_file)
            .with_context(|| format!("Failed to read {}", swift_file.display()))?
            .replace(
                "private var initializationResult",
                "nonisolated(unsafe) private var initializationResult",
            );
        fs::write(&swift_file, swift_content)?;

        println!("Writing modulemap...");
        fs::write(
            out_dir.join("module.modulemap"),
            "module fruitjarFFI {\n    header \"fruitjarFFI.h\"\n    export *\n}\n",
        )?;
    }

    println!("Done! Bindings written to {}", out_dir.display());
    Ok(())
}

/// The cdylib produced by `cargo build --release`
fn release_library(rust_dir: &Path) -> Result<PathBuf> {
    let release = rust_dir.join("../target/release");
    ["libfruitjar.dylib", "libfruitjar.so", "fruitjar.dll"]
        .iter()
        .map(|name| release.join(name))
        .find(|path| path.exists())
        .with_context(|| format!("No fruitjar library found in {}", release.display()))
}

fn run_cmd(program: &str, args: &[&str], dir: &Path) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("Failed to run {}", program))?;

    if !status.success() {
        bail!("{} failed with status: {}", program, status);
    }
    Ok(())
}
