use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use nodeglue::BindSpec;

#[derive(Parser)]
#[command(name = "nodeglue")]
#[command(about = "Node.js addon glue generator for GObject-style C APIs", long_about = None)]
struct Cli {
    /// Path to the binding spec (JSON)
    spec: PathBuf,

    /// Output file for the generated C++ source (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.spec)
        .with_context(|| format!("failed to read spec {}", cli.spec.display()))?;
    let spec: BindSpec = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse spec {}", cli.spec.display()))?;

    let code = nodeglue::generate(&spec)
        .with_context(|| format!("failed to generate glue for target `{}`", spec.target))?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &code)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = code.len(), "wrote addon source");
        }
        None => print!("{code}"),
    }
    Ok(())
}
