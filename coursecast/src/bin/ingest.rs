use anyhow::{Context, Result};
use coursecast::core::config::{load_config, Config};
use coursecast::core::ingest::ingest_manifest;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 2 {
        log::error!("Usage: ingest <manifest> <output>");
        std::process::exit(2);
    }
    let manifest_path = Path::new(&args[0]);
    let output_path = Path::new(&args[1]);

    let config_path = std::env::var("COURSECAST_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = if Path::new(&config_path).exists() {
        load_config(&config_path)?
    } else {
        Config::default()
    };
    config.apply_env();

    let manifest = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("reading manifest {}", manifest_path.display()))?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let summary = ingest_manifest(&manifest, base_dir, &config.pipeline)?;
    std::fs::write(output_path, &summary.blob)
        .with_context(|| format!("writing records to {}", output_path.display()))?;

    log::info!(
        "Saved {} record(s) to {} ({} failed, estimated {:.2} audio hours)",
        summary.records,
        output_path.display(),
        summary.errors,
        summary.total_hours
    );
    if summary.total_hours < 20.0 {
        log::warn!("Total estimated hours are below 20. Add more sources to increase content volume.");
    }

    Ok(())
}
