use std::path::PathBuf;

use clap::Parser;

use songo::errors::SongoResult;
use songo::players::nn::export::export_to_json;
use songo::players::nn::loader;

/// Exports checkpointed weights as the JSON document consumed by the
/// browser inference client.
#[derive(Parser, Debug)]
#[command(name = "export")]
struct ExportConfig {
    /// Checkpoint to export (.safetensors/.json stem)
    #[arg(long)]
    checkpoint: PathBuf,

    /// Output JSON path
    #[arg(long, default_value = "songo_model.json")]
    output: PathBuf,
}

fn main() {
    env_logger::init();
    let config = ExportConfig::parse();
    if let Err(e) = run(&config) {
        eprintln!("[export] fatal: {e}");
        std::process::exit(1);
    }
}

fn run(config: &ExportConfig) -> SongoResult<()> {
    let (net, meta) = loader::open_checkpoint(&config.checkpoint, loader::device())?;
    println!(
        "[export] loaded {} (hidden {}, iteration {})",
        meta.architecture, meta.hidden_size, meta.iteration
    );

    export_to_json(&net, &config.output)?;
    let bytes = std::fs::metadata(&config.output)?.len();
    println!(
        "[export] wrote {} ({:.2} MB)",
        config.output.display(),
        bytes as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}
