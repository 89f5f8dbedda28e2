//! Example: Open the hero backdrop in a window.
//!
//! Run with:
//!     cargo run --example hero_window -- [config.json]

use anyhow::Context;
use hero_waveform::app;
use hero_waveform::HeroConfig;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => HeroConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => HeroConfig::default(),
    };

    app::run(config)?;
    Ok(())
}
