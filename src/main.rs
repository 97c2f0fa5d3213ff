//! Headless frame-transform runner.
//!
//! Feeds a generated test pattern through the transform for the configured
//! number of ticks and writes the last composited frame as a PNG.
//!
//! Usage: `frame-transform [config.json]`. Without an argument the config is
//! read from the default path, or built-in defaults are used.

use std::path::PathBuf;
use std::process::ExitCode;

use frame_transform::backend::{PatternSource, WgpuDevice};
use frame_transform::camera::pixel_projection;
use frame_transform::host::{Color, GraphicsDevice, RenderState};
use frame_transform::settings::register_defaults;
use frame_transform::{ConfigError, DeviceError, RunConfig, SettingsStore, TransformFilter};
use transform_gpu::{GpuConfig, GpuContext, GpuError};

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error("Failed to read effect {path:?}: {source}")]
    Effect {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write output image: {0}")]
    Image(#[from] image::ImageError),
}

fn load_config() -> Result<RunConfig, ConfigError> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => RunConfig::load(&path),
        None => Ok(RunConfig::load_from_default_path().unwrap_or_default()),
    }
}

fn run(config: &RunConfig) -> Result<(), RunError> {
    let gpu_config = if config.software_adapter {
        GpuConfig::software()
    } else {
        GpuConfig::default()
    };
    let ctx = pollster::block_on(GpuContext::with_config(gpu_config))?;
    let mut device = WgpuDevice::new(ctx);

    let mut settings = SettingsStore::from_values(config.settings.clone());
    register_defaults(&mut settings);
    TransformFilter::<WgpuDevice>::migrate(&mut settings, config.settings_version.packed());

    let visibility = TransformFilter::<WgpuDevice>::on_settings_changed(&settings);
    log::debug!("Property visibility: {:?}", visibility);

    let (width, height) = (config.frame.width, config.frame.height);
    let mut filter = TransformFilter::new(&mut device, &settings)?;
    let mut source = PatternSource::new(&device, width, height)?;
    let output = device.create_render_target(width, height)?;

    let effect = match &config.effect {
        Some(path) => {
            let wgsl = std::fs::read_to_string(path).map_err(|source| RunError::Effect {
                path: path.clone(),
                source,
            })?;
            Some(device.load_effect(&path.display().to_string(), &wgsl))
        }
        None => None,
    };

    let mut rendered = 0;
    for tick in 0..config.ticks {
        filter.video_tick(&mut device, &source, tick as f32 / 60.0);
        for _ in 0..config.renders_per_tick {
            device.begin_target(&output, Color::BLACK)?;
            device.set_render_state(RenderState::blended());
            device.set_projection(&pixel_projection(width, height));
            if filter
                .video_render(&mut device, &mut source, effect.as_ref())
                .is_rendered()
            {
                rendered += 1;
            }
            device.end_target();
        }
    }
    log::info!("Rendered {} frame(s), skipped {}", rendered, source.skipped());

    let pixels = output.read_rgba8(device.context())?;
    image::save_buffer(
        &config.output,
        &pixels,
        width,
        height,
        image::ColorType::Rgba8,
    )?;
    log::info!("Wrote {:?}", config.output);

    filter.destroy(&mut device);
    device.release_texture(output);
    Ok(())
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
