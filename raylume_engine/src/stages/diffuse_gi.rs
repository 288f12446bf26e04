/// DiffuseGiStage - one-bounce diffuse global illumination
///
/// Hit group 0 / miss 0 trace shadow rays, hit group 1 / miss 1 trace GI
/// rays. The environment map is bound to the miss shader selected by
/// `env_map_miss_index` (0 unless configured otherwise).

use std::any::Any;
use glam::Vec4;
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::launch::RayLaunch;
use crate::registry::{ENVIRONMENT_MAP, OUTPUT_CHANNEL};
use crate::scene::Scene;
use crate::shaders;
use crate::stage::{ConfigureContext, DiagnosticUi, FrameContext, RenderStage};
use crate::config_bail;
use super::ray_traced_gbuffer::{MATERIAL_DIFFUSE, WORLD_NORMAL, WORLD_POSITION};

const SOURCE: &str = "raylume::DiffuseGi";

/// Miss shader sampling the environment map unless told otherwise
pub const DEFAULT_ENV_MAP_MISS_INDEX: u32 = 0;

/// Diffuse GI with optional shadow rays
pub struct DiffuseGiStage {
    output_channel: String,
    env_map_miss_index: u32,
    launch: RayLaunch,
    do_shadows: bool,
    do_gi: bool,
    do_cos_sampling: bool,
    recursion_depth: i32,
    frame_count: u32,
    min_t: f32,
}

impl DiffuseGiStage {
    /// Write into `OutputChannel`
    pub fn new() -> Self {
        Self::with_output(OUTPUT_CHANNEL)
    }

    /// Write into `channel`
    pub fn with_output(channel: &str) -> Self {
        Self {
            output_channel: channel.to_string(),
            env_map_miss_index: DEFAULT_ENV_MAP_MISS_INDEX,
            launch: RayLaunch::new(shaders::DIFFUSE_GI_SOURCE, shaders::DIFFUSE_GI_RAY_GEN),
            do_shadows: true,
            do_gi: true,
            do_cos_sampling: true,
            recursion_depth: 1,
            frame_count: 0,
            min_t: 0.0,
        }
    }

    /// Bind the environment map to miss shader `index`
    pub fn with_env_map_miss_index(mut self, index: u32) -> Self {
        self.env_map_miss_index = index;
        self
    }

    // ===== GETTERS =====

    pub fn output_channel(&self) -> &str {
        &self.output_channel
    }

    pub fn env_map_miss_index(&self) -> u32 {
        self.env_map_miss_index
    }

    pub fn shoots_shadow_rays(&self) -> bool {
        self.do_shadows
    }

    pub fn shoots_gi_rays(&self) -> bool {
        self.do_gi
    }

    pub fn uses_cos_sampling(&self) -> bool {
        self.do_cos_sampling
    }

    pub fn recursion_depth(&self) -> i32 {
        self.recursion_depth
    }

    pub fn launch(&self) -> &RayLaunch {
        &self.launch
    }

    // ===== SETTERS =====

    pub fn set_shadow_rays(&mut self, enabled: bool) {
        self.do_shadows = enabled;
    }

    pub fn set_gi_rays(&mut self, enabled: bool) {
        self.do_gi = enabled;
    }

    pub fn set_cos_sampling(&mut self, enabled: bool) {
        self.do_cos_sampling = enabled;
    }

    pub fn set_recursion_depth(&mut self, depth: i32) {
        self.recursion_depth = depth.max(0);
    }
}

impl Default for DiffuseGiStage {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStage for DiffuseGiStage {
    fn name(&self) -> &str {
        "Diffuse GI"
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
        ctx.environment_map()?;
        self.min_t = ctx.config().min_t_distance;

        self.launch.release(ctx.device());
        self.launch = RayLaunch::new(shaders::DIFFUSE_GI_SOURCE, shaders::DIFFUSE_GI_RAY_GEN);
        // Shadow rays
        self.launch.add_hit_shader(Some(shaders::SHADOW_CLOSEST_HIT), Some(shaders::SHADOW_ANY_HIT));
        self.launch.add_miss_shader(shaders::SHADOW_MISS);
        // GI rays
        self.launch.add_hit_shader(Some(shaders::GI_CLOSEST_HIT), Some(shaders::GI_ANY_HIT));
        self.launch.add_miss_shader(shaders::GI_MISS);

        if self.env_map_miss_index >= self.launch.miss_count() {
            config_bail!(SOURCE, "Environment map miss index {} out of range ({} miss shaders)",
                self.env_map_miss_index, self.launch.miss_count());
        }
        self.launch.compile(ctx)
    }

    fn on_scene_loaded(&mut self, ctx: &mut ConfigureContext<'_>, scene: &dyn Scene) -> Result<()> {
        self.launch.set_scene(ctx.device(), scene)?;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        if !self.launch.ready_to_render() {
            return Ok(());
        }
        let (Some(position), Some(normal), Some(diffuse), Some(env_map)) = (
            ctx.channel(WORLD_POSITION),
            ctx.channel(WORLD_NORMAL),
            ctx.channel(MATERIAL_DIFFUSE),
            ctx.channel(ENVIRONMENT_MAP),
        ) else {
            return Ok(());
        };
        let Some(output) = ctx.cleared_channel(&self.output_channel, Vec4::ZERO)? else {
            return Ok(());
        };
        let extent = ctx.output_size();

        let device = ctx.device();
        self.launch.ray_gen_constant(device, shaders::FRAME_COUNT_SLOT, self.frame_count)?;
        self.launch.ray_gen_constant(device, shaders::MIN_T_SLOT, self.min_t)?;
        self.launch.ray_gen_constant(device, shaders::MAX_T_SLOT, f32::MAX)?;
        self.launch.ray_gen_constant(device, shaders::DO_SHADOWS_SLOT, self.do_shadows)?;
        self.launch.ray_gen_constant(device, shaders::DO_COS_SAMPLING_SLOT, self.do_cos_sampling)?;
        self.launch.ray_gen_constant(device, shaders::RECURSION_DEPTH_SLOT, self.recursion_depth.max(0) as u32)?;
        self.launch.ray_gen_constant(device, shaders::DO_GI_SLOT, self.do_gi)?;
        self.launch.ray_gen_texture(device, shaders::POSITION_SLOT, position)?;
        self.launch.ray_gen_texture(device, shaders::NORMAL_SLOT, normal)?;
        self.launch.ray_gen_texture(device, shaders::DIFFUSE_SLOT, diffuse)?;
        self.launch.ray_gen_texture(device, shaders::OUTPUT_SLOT, output)?;
        self.launch.miss_texture(device, self.env_map_miss_index, shaders::ENV_MAP_SLOT, env_map)?;
        self.frame_count = self.frame_count.wrapping_add(1);
        self.launch.execute(device, extent)
    }

    fn render_gui(&mut self, ui: &mut dyn DiagnosticUi) -> bool {
        let mut changed = ui.checkbox("Shoot shadow rays", &mut self.do_shadows);
        changed |= ui.checkbox("Shoot GI rays", &mut self.do_gi);
        changed |= ui.checkbox("Cosine-weighted hemisphere sampling", &mut self.do_cos_sampling);
        ui.separator();
        changed |= ui.int_var("Recursion depth", &mut self.recursion_depth, 0, i32::MAX);
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
#[path = "diffuse_gi_tests.rs"]
mod tests;
