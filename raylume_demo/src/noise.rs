/// Noise source stage
///
/// Fills a channel with per-pixel uniform noise in `[0, 1)`. Each frame
/// draws a fresh seed, so the channel's average over many frames converges
/// to 0.5 everywhere.

use std::any::Any;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use glam::Vec4;
use raylume_engine::raylume::device::{GraphicsDevice, KernelContext, SoftwareDevice};
use raylume_engine::raylume::launch::FullscreenLaunch;
use raylume_engine::raylume::stage::{ConfigureContext, FrameContext, RenderStage};
use raylume_engine::raylume::Result;
use raylume_engine::shaders::TARGET_SLOT;

pub const NOISE_SOURCE: &str = "raylume_demo/noise.ps";
const SEED_SLOT: &str = "gSeed";

/// Register the noise kernel on the CPU device
pub fn register(device: &mut SoftwareDevice) {
    device.register_kernel(NOISE_SOURCE, noise_kernel);
}

fn noise_kernel(ctx: &mut KernelContext<'_>) -> Result<()> {
    let seed = ctx.constant_global(SEED_SLOT).and_then(|v| v.as_u32()).unwrap_or(0);
    let pixel = ctx.pixel();
    let index = pixel.y.wrapping_mul(ctx.extent().x).wrapping_add(pixel.x);
    let value = to_unit(pcg_hash(index ^ pcg_hash(seed)));
    ctx.store_global(TARGET_SLOT, Vec4::new(value, value, value, 1.0))
}

/// PCG integer hash
fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28).wrapping_add(4))) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

fn to_unit(bits: u32) -> f32 {
    (bits >> 8) as f32 / (1u32 << 24) as f32
}

pub struct NoiseStage {
    channel: String,
    rng: StdRng,
    launch: Option<FullscreenLaunch>,
}

impl NoiseStage {
    pub fn new(channel: &str, seed: u64) -> Self {
        Self {
            channel: channel.to_string(),
            rng: StdRng::seed_from_u64(seed),
            launch: None,
        }
    }
}

impl RenderStage for NoiseStage {
    fn name(&self) -> &str {
        "Noise Source"
    }

    fn requires_compute_backend(&self) -> bool {
        true
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        ctx.request_channel(&self.channel)?;
        self.launch = Some(FullscreenLaunch::new(ctx, NOISE_SOURCE)?);
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let (Some(launch), Some(target)) = (self.launch.as_ref(), ctx.channel(&self.channel)) else {
            return Ok(());
        };
        let extent = ctx.output_size();
        let seed: u32 = self.rng.random();
        let device = ctx.device();
        launch.set_constant(device, SEED_SLOT, seed)?;
        launch.set_target(device, target)?;
        launch.execute(device, extent)
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(launch) = self.launch.take() {
            launch.release(device);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
