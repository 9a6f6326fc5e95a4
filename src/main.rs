//! Firefox build CLI

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use firefox_port::cli::ConsoleProgress;
use firefox_port::packager::create_xpi;
use firefox_port::{BuildConfig, Builder, MissPolicy};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "firefox-port")]
#[command(about = "Build a Firefox MV3 extension from a Chrome MV3 source tree", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full Firefox build
    Build {
        /// Extension source root (the directory holding manifest.json)
        #[arg(short, long, default_value = ".")]
        source: PathBuf,

        /// Output directory, overriding the configured one
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Build configuration file (defaults to firefox-port.toml in the source root)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Treat rewrite rules that do not match as warnings instead of errors
        #[arg(long)]
        warn_on_miss: bool,

        /// Also package the output as an .xpi archive next to it
        #[arg(short, long)]
        package: bool,

        /// Write a markdown build report next to the output
        #[arg(short, long)]
        report: bool,
    },

    /// Print the synthesized Firefox manifest without building
    Manifest {
        #[arg(short, long, default_value = ".")]
        source: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Logs go to stderr so stdout stays clean for `manifest` output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "firefox_port=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Build { source, output, config, warn_on_miss, package, report } => {
            run_build(source, output, config, warn_on_miss, package, report)
        }
        Commands::Manifest { source, config } => print_manifest(source, config),
    };

    if let Err(e) = result {
        eprintln!("{}", "❌ Build failed!".red().bold());
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn run_build(
    source: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    warn_on_miss: bool,
    package: bool,
    report: bool,
) -> anyhow::Result<()> {
    println!("{}", "Firefox Extension Build".bold().blue());
    println!("{}", "=".repeat(50).blue());
    println!();

    let mut config = BuildConfig::resolve(&source, config.as_deref())?;
    if warn_on_miss {
        config.on_pattern_miss = MissPolicy::Warn;
    }

    let mut builder = Builder::new(&source, config)?;
    if let Some(output) = output {
        builder = builder.with_output(output)?;
    }

    let mut progress = ConsoleProgress::new();
    let outcome = builder.build_with(&mut progress);
    progress.finish();
    let build = outcome?;

    println!();
    println!("{}", "✅ Firefox build complete!".green().bold());
    println!();
    println!("📊 Summary:");
    println!("  - Extension: {} v{}", build.extension_name, build.extension_version);
    println!("  - Assets copied: {}", build.assets_mirrored.len());
    println!("  - Scripts converted: {}", build.scripts_transformed.len());
    println!("  - API calls rewritten: {}", build.api_aliases_rewritten);
    println!("  - Pages patched: {}", build.markup_patched.len());
    println!("  - Output: {}", build.output_dir.display());

    if package {
        let xpi_path = build.output_dir.with_extension("xpi");
        create_xpi(&build.output_dir, &xpi_path)?;
        println!("  - Package: {}", xpi_path.display());
    }

    if report {
        let report_path = build.output_dir.with_extension("md");
        std::fs::write(&report_path, firefox_port::report::generate_report(&build))
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        println!("  - Report: {}", report_path.display());
    }

    if !build.warnings.is_empty() {
        println!();
        println!("{}", "⚠️  Warnings:".yellow().bold());
        for warning in &build.warnings {
            println!("  - {}", warning);
        }
    }

    println!();
    println!("Load it in Firefox via about:debugging > This Firefox > Load Temporary Add-on");

    Ok(())
}

fn print_manifest(source: PathBuf, config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = BuildConfig::resolve(&source, config.as_deref())?;
    let manifest = Builder::new(&source, config)?.synthesize_manifest()?;
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}
