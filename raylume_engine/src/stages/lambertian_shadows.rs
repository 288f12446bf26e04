/// LambertianShadowsStage - Lambertian shading with one shadow ray per light
///
/// Reads WorldPosition, WorldNormal and MaterialDiffuse; writes OutputChannel.
/// The output is cleared every frame, even when the launch is not ready, so a
/// scene without ray tracing shows black instead of a stale frame.

use std::any::Any;
use glam::Vec4;
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::launch::RayLaunch;
use crate::registry::OUTPUT_CHANNEL;
use crate::scene::Scene;
use crate::shaders;
use crate::stage::{ConfigureContext, FrameContext, RenderStage};
use super::ray_traced_gbuffer::{MATERIAL_DIFFUSE, WORLD_NORMAL, WORLD_POSITION};

/// Direct Lambertian lighting with ray traced shadows
pub struct LambertianShadowsStage {
    output_channel: String,
    launch: RayLaunch,
    min_t: f32,
}

impl LambertianShadowsStage {
    /// Write into `OutputChannel`
    pub fn new() -> Self {
        Self::with_output(OUTPUT_CHANNEL)
    }

    /// Write into `channel`
    pub fn with_output(channel: &str) -> Self {
        Self {
            output_channel: channel.to_string(),
            launch: RayLaunch::new(shaders::LAMBERTIAN_SHADOWS_SOURCE, shaders::LAMBERTIAN_SHADOWS_RAY_GEN),
            min_t: 0.0,
        }
    }

    pub fn output_channel(&self) -> &str {
        &self.output_channel
    }

    pub fn launch(&self) -> &RayLaunch {
        &self.launch
    }
}

impl Default for LambertianShadowsStage {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStage for LambertianShadowsStage {
    fn name(&self) -> &str {
        "Lambertian Plus Shadows"
    }

    fn requires_scene(&self) -> bool {
        true
    }

    fn requires_compute_backend(&self) -> bool {
        true
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        ctx.request_channels(&[WORLD_POSITION, WORLD_NORMAL, MATERIAL_DIFFUSE])?;
        ctx.request_channel(&self.output_channel)?;
        self.min_t = ctx.config().min_t_distance;

        self.launch.release(ctx.device());
        self.launch = RayLaunch::new(shaders::LAMBERTIAN_SHADOWS_SOURCE, shaders::LAMBERTIAN_SHADOWS_RAY_GEN);
        self.launch.add_miss_shader(shaders::SHADOW_MISS);
        self.launch.add_hit_shader(Some(shaders::SHADOW_CLOSEST_HIT), Some(shaders::SHADOW_ANY_HIT));
        self.launch.compile(ctx)
    }

    fn on_scene_loaded(&mut self, ctx: &mut ConfigureContext<'_>, scene: &dyn Scene) -> Result<()> {
        self.launch.set_scene(ctx.device(), scene)?;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let Some(output) = ctx.cleared_channel(&self.output_channel, Vec4::ZERO)? else {
            return Ok(());
        };
        if !self.launch.ready_to_render() {
            return Ok(());
        }
        let (Some(position), Some(normal), Some(diffuse)) = (
            ctx.channel(WORLD_POSITION),
            ctx.channel(WORLD_NORMAL),
            ctx.channel(MATERIAL_DIFFUSE),
        ) else {
            return Ok(());
        };
        let extent = ctx.output_size();

        let device = ctx.device();
        self.launch.ray_gen_constant(device, shaders::MIN_T_SLOT, self.min_t)?;
        self.launch.ray_gen_texture(device, shaders::POSITION_SLOT, position)?;
        self.launch.ray_gen_texture(device, shaders::NORMAL_SLOT, normal)?;
        self.launch.ray_gen_texture(device, shaders::DIFFUSE_SLOT, diffuse)?;
        self.launch.ray_gen_texture(device, shaders::OUTPUT_SLOT, output)?;
        self.launch.execute(device, extent)
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.launch.release(device);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "lambertian_shadows_tests.rs"]
mod tests;
