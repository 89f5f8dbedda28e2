//! Example: Render a short headless sequence of the hero backdrop to PNGs.
//!
//! Run with:
//!     cargo run --example render_frames -- [output_dir] [frame_count]

use anyhow::Context;
use hero_waveform::gpu::OffscreenRenderer;
use hero_waveform::{HeroConfig, VoiceWaveform};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "hero_frames".to_string()));
    let frame_count: usize = match args.next() {
        Some(n) => n.parse().context("frame_count must be a number")?,
        None => 120,
    };

    let config = HeroConfig {
        width: 960,
        height: 540,
        seed: Some(0x5eed),
        ..HeroConfig::default()
    };
    let viewport = config.viewport(1.0);
    let options = config.scene_options()?;

    println!("Hero Waveform - Headless Frames");
    println!("===============================\n");
    println!("  Resolution: {}x{}", viewport.width, viewport.height);
    println!("  Frames: {}", frame_count);
    println!("  Output: {}\n", output_dir.display());

    let renderer = OffscreenRenderer::new(&viewport)
        .await
        .context("Failed to create offscreen renderer")?;
    let mut waveform = VoiceWaveform::mount(renderer, viewport, options);

    std::fs::create_dir_all(&output_dir)?;
    for index in 0..frame_count {
        waveform.frame()?;
        let path = output_dir.join(format!("frame_{:04}.png", index));
        waveform.backend().save_png(&path)?;

        if (index + 1) % 30 == 0 {
            println!("  Rendered {}/{} frames", index + 1, frame_count);
        }
    }

    waveform.unmount();
    println!("\nDone. t = {:.2}", waveform.scene().clock.time());
    Ok(())
}
