//! Prepare one circuit input artifact.
//!
//! ```text
//! generate-input [PRIVATE_KEY] [--config FILE] [--asset-id N] [--counter N]
//!                [--tree-height H] [--output PATH] [--no-write] [--reveal-key]
//! ```

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::OsRng;
use tracing_subscriber::EnvFilter;

use asset_zk_circuits::{field_to_decimal, PoseidonHasher};
use asset_zk_prover::{pipeline, resolve_private_key, PipelineConfig, PipelineError};

#[derive(Parser, Debug)]
#[command(name = "generate-input", about = "Generate the circuit input for an asset-ownership proof")]
struct Args {
    /// secp256k1 private key, 64 hex digits with optional 0x prefix. A random
    /// key is used when absent or malformed.
    private_key: Option<String>,

    /// Pipeline configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    asset_id: Option<u64>,

    #[arg(long)]
    counter: Option<u64>,

    #[arg(long)]
    tree_height: Option<usize>,

    /// Artifact path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run every stage but do not write the artifact
    #[arg(long)]
    no_write: bool,

    /// Print the private key used for the run
    #[arg(long)]
    reveal_key: bool,
}

impl Args {
    fn pipeline_config(&self) -> Result<PipelineConfig, PipelineError> {
        let mut config = PipelineConfig::load_or_default(self.config.as_deref())?;
        if let Some(asset_id) = self.asset_id {
            config.asset_id = asset_id;
        }
        if let Some(counter) = self.counter {
            config.counter = counter;
        }
        if let Some(height) = self.tree_height {
            config.tree_height = height;
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn execute(args: &Args) -> Result<(), PipelineError> {
    let config = args.pipeline_config()?;
    let hasher = PoseidonHasher::new()?;

    let key = resolve_private_key(args.private_key.as_deref(), &mut OsRng);
    let output = pipeline::prepare(&hasher, &config, key, &[])?;
    if !args.no_write {
        output.input.write_artifact(&config.output_path)?;
        println!("Artifact:   {}", config.output_path.display());
    }

    println!("Key origin: {}", output.key_origin.as_str());
    if args.reveal_key {
        println!("Private key: 0x{}", output.private_key.to_hex());
    }
    println!("Address:    {}", output.address);
    println!("Leaf:       {}", field_to_decimal(&output.leaf_commitment));
    println!("Root:       {}", output.input.root);
    println!("Nullifier:  {}", output.input.nullifier);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = execute(&args) {
        eprintln!("generate-input failed: {}", e);
        std::process::exit(1);
    }
}
