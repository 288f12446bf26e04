//! Headless Raylume demo
//!
//! Runs noise -> temporal accumulation -> tone mapping -> display on the CPU
//! device and logs the displayed image's mean and variance every frame. The
//! variance falls as samples accumulate and jumps back when the camera moves
//! or the output is resized.

mod cli;
mod noise;

use std::process::ExitCode;
use clap::Parser;
use glam::{Mat4, Vec3};
use raylume_engine::raylume::device::SoftwareDevice;
use raylume_engine::raylume::log::LogSeverity;
use raylume_engine::raylume::pipeline::{HostEvent, Pipeline};
use raylume_engine::raylume::registry::OUTPUT_CHANNEL;
use raylume_engine::raylume::scene::{BasicScene, Camera};
use raylume_engine::raylume::stages::{CopyToOutputStage, TemporalAccumulationStage, ToneMappingStage};
use raylume_engine::raylume::{Engine, PipelineConfig, Result};
use raylume_engine::{engine_error, engine_info};
use cli::Cli;
use noise::NoiseStage;

const SOURCE: &str = "raylume_demo";
const NOISE_CHANNEL: &str = "Noise";
const DISPLAY_CHANNEL: &str = "Display";

fn main() -> ExitCode {
    let cli = Cli::parse();
    Engine::set_min_severity(if cli.verbose { LogSeverity::Debug } else { LogSeverity::Info });

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!(SOURCE, "Demo failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut device = SoftwareDevice::new();
    noise::register(&mut device);

    let config = PipelineConfig::default()
        .with_output_size(cli.width, cli.height)
        .with_random_seed(cli.seed);
    let mut pipeline = Pipeline::new(device, config);
    pipeline.add_stage(NoiseStage::new(NOISE_CHANNEL, cli.seed))?;
    pipeline.add_stage(TemporalAccumulationStage::new(NOISE_CHANNEL))?;
    pipeline.add_stage(ToneMappingStage::new(NOISE_CHANNEL, DISPLAY_CHANNEL).with_exposure(cli.exposure))?;
    pipeline.add_stage(CopyToOutputStage::displaying(DISPLAY_CHANNEL))?;

    let camera = Camera::new(Mat4::look_at_rh(Vec3::Z, Vec3::ZERO, Vec3::Y), Mat4::IDENTITY);
    pipeline.load_scene(Box::new(BasicScene::new("demo").with_camera(camera)))?;
    pipeline.initialize()?;

    for frame in 0..cli.frames {
        if cli.move_camera_at == Some(frame) {
            if let Some(camera) = pipeline.scene_mut().and_then(|s| s.active_camera_mut()) {
                let view = *camera.view_matrix() * Mat4::from_translation(Vec3::X);
                camera.set_view_matrix(view);
                engine_info!(SOURCE, "Camera moved before frame {}", frame);
            }
        }
        if cli.resize_at == Some(frame) {
            let (width, height) = (cli.width.max(2) / 2, cli.height.max(2) / 2);
            pipeline.handle_event(HostEvent::Resized { width, height })?;
            engine_info!(SOURCE, "Resized to {}x{} before frame {}", width, height, frame);
        }

        pipeline.handle_event(HostEvent::Frame)?;

        let (mean, variance) = output_statistics(&pipeline);
        let accumulated = pipeline
            .stage::<TemporalAccumulationStage>(1)
            .map(|s| s.frames_accumulated())
            .unwrap_or(0);
        engine_info!(SOURCE, "Frame {:>3}: mean {:.4} variance {:.6} ({} accumulated)",
            frame, mean, variance, accumulated);
    }
    Ok(())
}

/// Mean and variance of the output's red channel
fn output_statistics(pipeline: &Pipeline<SoftwareDevice>) -> (f32, f32) {
    let texels = pipeline
        .registry()
        .channel(OUTPUT_CHANNEL)
        .and_then(|texture| pipeline.device().texels(texture))
        .unwrap_or(&[]);
    if texels.is_empty() {
        return (0.0, 0.0);
    }
    let count = texels.len() as f32;
    let mean = texels.iter().map(|t| t.x).sum::<f32>() / count;
    let variance = texels.iter().map(|t| (t.x - mean).powi(2)).sum::<f32>() / count;
    (mean, variance)
}
