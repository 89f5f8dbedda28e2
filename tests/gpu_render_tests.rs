//! GPU integration tests for headless rendering.
//!
//! Every test skips when no adapter is available.


use hero_waveform::gpu::offscreen::OUTPUT_FORMAT;
use hero_waveform::gpu::{GpuContext, OffscreenRenderer, RenderError};
use hero_waveform::scene::{SceneOptions, Viewport, WaveformScene};
use hero_waveform::{SceneBackend, VoiceWaveform};
use scene_fixtures::{small_viewport, test_options};

async fn offscreen(viewport: &Viewport) -> Option<OffscreenRenderer> {
    match GpuContext::new().await {
        Ok(ctx) => Some(OffscreenRenderer::with_context(ctx, viewport)),
        Err(e) => {
            eprintln!("Skipping GPU test: {}", e);
            None
        }
    }
}

fn lit_pixels(pixels: &[u8], background: [u8; 3]) -> usize {
    pixels
        .chunks_exact(4)
        .filter(|px| px[..3] != background)
        .count()
}

#[tokio::test]
async fn test_render_returns_full_frame() {
    let viewport = small_viewport();
    let Some(mut renderer) = offscreen(&viewport).await else {
        return;
    };
    assert_eq!(OUTPUT_FORMAT, wgpu::TextureFormat::Rgba8Unorm);

    let mut scene = WaveformScene::build(viewport, test_options());
    for _ in 0..30 {
        scene.update();
    }
    let pixels = renderer.render(&scene.frame()).unwrap().to_vec();

    assert_eq!(pixels.len(), 160 * 90 * 4);
    assert!(lit_pixels(&pixels, [0, 0, 0]) > 0, "frame is entirely background");
}

#[tokio::test]
async fn test_background_color_clears_frame() {
    let viewport = small_viewport();
    let Some(mut renderer) = offscreen(&viewport).await else {
        return;
    };

    let options = SceneOptions {
        background: [0.0, 0.0, 1.0],
        ..test_options()
    };
    let scene = WaveformScene::build(viewport, options);
    let pixels = renderer.render(&scene.frame()).unwrap();

    // The top-left corner is far from the bars.
    assert_eq!(pixels[2], 255);
    assert_eq!(pixels[3], 255);
}

#[tokio::test]
async fn test_drawing_buffer_follows_pixel_ratio() {
    let viewport = Viewport::new(80, 40, 3.0, 2.0);
    let Some(mut renderer) = offscreen(&viewport).await else {
        return;
    };
    assert_eq!(renderer.size(), (160, 80));

    let scene = WaveformScene::build(viewport, test_options());
    assert_eq!(renderer.render(&scene.frame()).unwrap().len(), 160 * 80 * 4);
}

#[tokio::test]
async fn test_hd_frame_at_double_pixel_ratio() {
    let viewport = Viewport::new(1280, 720, 2.0, 2.0);
    let ctx = match GpuContext::new().await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Skipping GPU test: {}", e);
            return;
        }
    };
    let expected = viewport.drawing_buffer_size_within(ctx.max_texture_dimension());
    if ctx.max_texture_dimension() >= 2560 {
        assert_eq!(expected, (2560, 1440));
    }

    let mut renderer = OffscreenRenderer::with_context(ctx, &viewport);
    assert_eq!(renderer.size(), expected);

    let mut scene = WaveformScene::build(viewport, test_options());
    scene.update();
    let pixels = renderer.render(&scene.frame()).unwrap();
    assert_eq!(pixels.len(), (expected.0 * expected.1 * 4) as usize);
}

#[tokio::test]
async fn test_resize_reallocates_target() {
    let viewport = small_viewport();
    let Some(renderer) = offscreen(&viewport).await else {
        return;
    };

    let mut waveform = VoiceWaveform::mount(renderer, viewport, test_options());
    waveform.frame().unwrap();
    assert!(waveform.resize(64, 32));
    waveform.frame().unwrap();

    assert_eq!(waveform.backend().size(), (64, 32));
    assert_eq!(waveform.backend().pixels().unwrap().len(), 64 * 32 * 4);
}

#[tokio::test]
async fn test_unmount_releases_all_resources() {
    let viewport = small_viewport();
    let Some(renderer) = offscreen(&viewport).await else {
        return;
    };

    let mut waveform = VoiceWaveform::mount(renderer, viewport, test_options());
    waveform.frame().unwrap();
    waveform.resize(100, 50);
    assert!(waveform.backend().ledger().outstanding() > 0);

    waveform.unmount();
    waveform.unmount();

    let ledger = waveform.backend().ledger();
    assert!(ledger.balanced(), "unbalanced ledger: {:?}", ledger);
    assert_eq!(ledger.outstanding(), 0);
    assert!(waveform.backend().is_disposed());
}

#[tokio::test]
async fn test_render_after_dispose_fails() {
    let viewport = small_viewport();
    let Some(mut renderer) = offscreen(&viewport).await else {
        return;
    };
    renderer.dispose();

    let scene = WaveformScene::build(viewport, test_options());
    assert!(matches!(
        renderer.render(&scene.frame()),
        Err(RenderError::Disposed)
    ));
}

#[tokio::test]
async fn test_save_png_roundtrip() {
    let viewport = small_viewport();
    let Some(mut renderer) = offscreen(&viewport).await else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hero.png");

    assert!(matches!(renderer.save_png(&path), Err(RenderError::NoFrame)));

    let mut scene = WaveformScene::build(viewport, test_options());
    scene.update();
    renderer.render(&scene.frame()).unwrap();
    renderer.save_png(&path).unwrap();

    let image = image::open(&path).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (160, 90));
}
