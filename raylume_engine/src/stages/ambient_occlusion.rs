/// AmbientOcclusionStage - ray traced ambient occlusion
///
/// Reads WorldPosition and WorldNormal, writes OutputChannel (cleared to zero
/// each frame). The AO radius is derived from the scene's bounding radius
/// whenever a scene loads.

use std::any::Any;
use glam::Vec4;
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::launch::RayLaunch;
use crate::registry::OUTPUT_CHANNEL;
use crate::scene::Scene;
use crate::shaders;
use crate::stage::{ConfigureContext, DiagnosticUi, FrameContext, RenderStage};
use crate::engine_debug;
use super::ray_traced_gbuffer::{WORLD_NORMAL, WORLD_POSITION};

const SOURCE: &str = "raylume::AmbientOcclusion";

/// Smallest radius picked on scene load
const MIN_AO_RADIUS: f32 = 0.1;
/// Fraction of the scene radius used as AO radius
const AO_RADIUS_SCALE: f32 = 0.05;

/// Ambient occlusion from the G-buffer
pub struct AmbientOcclusionStage {
    launch: RayLaunch,
    ao_radius: f32,
    rays_per_pixel: i32,
    frame_count: u32,
    min_t: f32,
}

impl AmbientOcclusionStage {
    pub fn new() -> Self {
        Self {
            launch: RayLaunch::new(shaders::AO_SOURCE, shaders::AO_RAY_GEN),
            ao_radius: 0.0,
            rays_per_pixel: 1,
            frame_count: 0,
            min_t: 0.0,
        }
    }

    pub fn with_rays_per_pixel(mut self, rays: i32) -> Self {
        self.rays_per_pixel = rays.max(1);
        self
    }

    pub fn ao_radius(&self) -> f32 {
        self.ao_radius
    }

    pub fn set_ao_radius(&mut self, radius: f32) {
        self.ao_radius = radius.max(0.0);
    }

    pub fn rays_per_pixel(&self) -> i32 {
        self.rays_per_pixel
    }

    pub fn launch(&self) -> &RayLaunch {
        &self.launch
    }
}

impl Default for AmbientOcclusionStage {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStage for AmbientOcclusionStage {
    fn name(&self) -> &str {
        "Ambient Occlusion"
    }

    fn requires_scene(&self) -> bool {
        true
    }

    fn requires_compute_backend(&self) -> bool {
        true
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        ctx.request_channels(&[WORLD_POSITION, WORLD_NORMAL, OUTPUT_CHANNEL])?;
        self.min_t = ctx.config().min_t_distance;

        self.launch.release(ctx.device());
        self.launch = RayLaunch::new(shaders::AO_SOURCE, shaders::AO_RAY_GEN);
        self.launch.add_miss_shader(shaders::AO_MISS);
        self.launch.add_hit_shader(None, Some(shaders::AO_ANY_HIT));
        self.launch.compile(ctx)
    }

    fn on_scene_loaded(&mut self, ctx: &mut ConfigureContext<'_>, scene: &dyn Scene) -> Result<()> {
        self.ao_radius = (scene.bounding_radius() * AO_RADIUS_SCALE).max(MIN_AO_RADIUS);
        engine_debug!(SOURCE, "AO radius {} for scene '{}'", self.ao_radius, scene.name());
        self.launch.set_scene(ctx.device(), scene)?;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        if !self.launch.ready_to_render() {
            return Ok(());
        }
        let (Some(position), Some(normal)) = (ctx.channel(WORLD_POSITION), ctx.channel(WORLD_NORMAL)) else {
            return Ok(());
        };
        let Some(output) = ctx.cleared_channel(OUTPUT_CHANNEL, Vec4::ZERO)? else {
            return Ok(());
        };
        let extent = ctx.output_size();

        let device = ctx.device();
        self.launch.ray_gen_texture(device, shaders::POSITION_SLOT, position)?;
        self.launch.ray_gen_texture(device, shaders::NORMAL_SLOT, normal)?;
        self.launch.ray_gen_texture(device, shaders::OUTPUT_SLOT, output)?;
        self.launch.ray_gen_constant(device, shaders::AO_RADIUS_SLOT, self.ao_radius)?;
        self.launch.ray_gen_constant(device, shaders::FRAME_COUNT_SLOT, self.frame_count)?;
        self.launch.ray_gen_constant(device, shaders::MIN_T_SLOT, self.min_t)?;
        self.launch.ray_gen_constant(device, shaders::AO_NUM_RAYS_SLOT, self.rays_per_pixel)?;
        self.frame_count = self.frame_count.wrapping_add(1);
        self.launch.execute(device, extent)
    }

    fn render_gui(&mut self, ui: &mut dyn DiagnosticUi) -> bool {
        let mut changed = ui.int_var("AO rays per pixel", &mut self.rays_per_pixel, 1, 64);
        changed |= ui.float_var("AO radius", &mut self.ao_radius, 1e-4, 1e38);
        changed
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
#[path = "ambient_occlusion_tests.rs"]
mod tests;
