//! blockweld: generate Blockly blocks, Python generators and toolbox entries

use anyhow::{Context, Result};
use block_weld::build::{update_toolbox_file, BlocklyGenerator, GeneratedOutput};
use block_weld::RunRegistry;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

mod manifest;

use manifest::Manifest;

#[derive(Parser)]
#[command(name = "blockweld", version, about = "Blockly code generation from host action manifests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write block and generator modules and merge the toolbox
    Generate(GenerateArgs),
    /// Print the generated artifacts without writing anything
    Print {
        /// Manifest file
        manifest: PathBuf,
        /// Only print this host
        #[arg(long)]
        host: Option<String>,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Manifest file
    manifest: PathBuf,
    /// Directory receiving `<Host>.mjs` block definition modules
    #[arg(long, default_value = "blocks")]
    blocks_dir: PathBuf,
    /// Directory receiving `<Host>.mjs` generator modules
    #[arg(long, default_value = "generators")]
    generators_dir: PathBuf,
    /// Toolbox XML file to merge categories into
    #[arg(long, default_value = "toolbox.xml")]
    toolbox: PathBuf,
    /// Skip parsing generated modules before writing them
    #[arg(long)]
    no_verify: bool,
}

fn main() -> Result<()> {
    // Use BLOCKWELD_LOG env var for log level configuration, default to "info"
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("BLOCKWELD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    match Cli::parse().command {
        Command::Generate(args) => generate(&args),
        Command::Print { manifest, host } => print(&manifest, host.as_deref()),
    }
}

/// Generate every host of a manifest
///
/// Nothing is written unless every host generates (and verifies) cleanly.
/// Host names and block ids must be unique across the whole run.
fn generate_all(manifest: &Manifest) -> Result<Vec<GeneratedOutput>> {
    let mut run = RunRegistry::new();
    manifest
        .hosts
        .iter()
        .map(|host| {
            let output = BlocklyGenerator::new(host.clone())
                .with_config(manifest.generator.clone())
                .generate()
                .with_context(|| format!("failed to generate blocks for {}", host.name))?;
            run.claim(&output.host_name, &output.blocks)
                .with_context(|| format!("blocks of {} collide with an earlier host", host.name))?;
            Ok(output)
        })
        .collect()
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let outputs = generate_all(&manifest)?;

    if !args.no_verify {
        for output in &outputs {
            output
                .verify()
                .with_context(|| format!("generated modules for {} do not parse", output.host_name))?;
        }
    }

    for output in &outputs {
        output
            .write_modules(&args.blocks_dir, &args.generators_dir, false)
            .with_context(|| format!("failed to write modules for {}", output.host_name))?;
    }

    let categories: Vec<_> = outputs.iter().map(|o| o.category.clone()).collect();
    update_toolbox_file(&categories, &args.toolbox)
        .with_context(|| format!("failed to update toolbox {}", args.toolbox.display()))?;

    let blocks: usize = outputs.iter().map(|o| o.blocks.len()).sum();
    tracing::info!(hosts = outputs.len(), blocks, "generation complete");
    Ok(())
}

fn print(manifest: &Path, host: Option<&str>) -> Result<()> {
    let manifest = Manifest::load(manifest)?;
    let outputs = generate_all(&manifest)?;

    let mut found = false;
    for output in outputs.iter().filter(|o| host.map_or(true, |h| o.host_name == h)) {
        found = true;
        println!("// Block definitions for {}", output.host_name);
        println!("{}", output.block_definitions_text());
        println!("// Python generators for {}", output.host_name);
        println!("{}", output.call_code_text());
        println!("<!-- Toolbox category for {} -->", output.host_name);
        println!("{}", output.toolbox_xml());
    }

    if let (Some(name), false) = (host, found) {
        anyhow::bail!("manifest has no host named {}", name);
    }
    Ok(())
}
