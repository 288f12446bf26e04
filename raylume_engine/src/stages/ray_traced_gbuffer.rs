/// RayTracedGBufferStage - primary rays into the geometry channels
///
/// Binds the scene, so scene-dependent stages placed after it can run.
/// Optional per-frame sub-pixel jitter and thin-lens sampling are drawn
/// from an RNG seeded by `PipelineConfig::random_seed`.

use std::any::Any;
use std::f32::consts::TAU;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::launch::RayLaunch;
use crate::scene::Scene;
use crate::shaders;
use crate::stage::{ConfigureContext, DiagnosticUi, FrameContext, RenderStage};

pub const WORLD_POSITION: &str = "WorldPosition";
pub const WORLD_NORMAL: &str = "WorldNormal";
pub const MATERIAL_DIFFUSE: &str = "MaterialDiffuse";
pub const MATERIAL_SPEC_ROUGH: &str = "MaterialSpecRough";
pub const MATERIAL_EXTRA_PARAMS: &str = "MaterialExtraParams";
pub const EMISSIVE: &str = "Emissive";

/// Channel written by the primary hit group, with its binding name
const GBUFFER_BINDINGS: [(&str, &str); 6] = [
    (WORLD_POSITION, shaders::POSITION_SLOT),
    (WORLD_NORMAL, shaders::NORMAL_SLOT),
    (MATERIAL_DIFFUSE, shaders::DIFFUSE_SLOT),
    (MATERIAL_SPEC_ROUGH, shaders::SPEC_ROUGH_SLOT),
    (MATERIAL_EXTRA_PARAMS, shaders::EXTRA_PARAMS_SLOT),
    (EMISSIVE, shaders::EMISSIVE_SLOT),
];

/// Ray traced G-buffer
pub struct RayTracedGBufferStage {
    launch: RayLaunch,
    background: Vec3,
    use_jitter: bool,
    use_thin_lens: bool,
    min_t: f32,
    rng: StdRng,
    last_jitter: Vec2,
}

impl RayTracedGBufferStage {
    pub fn new() -> Self {
        Self {
            launch: RayLaunch::new(shaders::GBUFFER_SOURCE, shaders::GBUFFER_RAY_GEN),
            background: Vec3::new(0.5, 0.5, 1.0),
            use_jitter: false,
            use_thin_lens: false,
            min_t: 0.0,
            rng: StdRng::seed_from_u64(0),
            last_jitter: Vec2::ZERO,
        }
    }

    pub fn with_background(mut self, color: Vec3) -> Self {
        self.background = color;
        self
    }

    pub fn with_jitter(mut self, enabled: bool) -> Self {
        self.use_jitter = enabled;
        self
    }

    pub fn with_thin_lens(mut self, enabled: bool) -> Self {
        self.use_thin_lens = enabled;
        self
    }

    // ===== GETTERS =====

    pub fn background(&self) -> Vec3 {
        self.background
    }

    pub fn uses_jitter(&self) -> bool {
        self.use_jitter
    }

    pub fn uses_thin_lens(&self) -> bool {
        self.use_thin_lens
    }

    /// Sub-pixel offset used by the last executed frame
    pub fn last_jitter(&self) -> Vec2 {
        self.last_jitter
    }

    pub fn launch(&self) -> &RayLaunch {
        &self.launch
    }

    /// Uniform point on the unit disk
    fn sample_disk(&mut self) -> Vec2 {
        let r = self.rng.random::<f32>().sqrt();
        let theta = TAU * self.rng.random::<f32>();
        Vec2::new(r * theta.cos(), r * theta.sin())
    }
}

impl Default for RayTracedGBufferStage {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStage for RayTracedGBufferStage {
    fn name(&self) -> &str {
        "Ray Traced G-Buffer"
    }

    fn requires_scene(&self) -> bool {
        true
    }

    fn requires_compute_backend(&self) -> bool {
        true
    }

    fn binds_scene(&self) -> bool {
        true
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        for (channel, _) in GBUFFER_BINDINGS {
            ctx.request_channel(channel)?;
        }
        self.min_t = ctx.config().min_t_distance;
        self.rng = StdRng::seed_from_u64(ctx.config().random_seed);

        self.launch.release(ctx.device());
        self.launch = RayLaunch::new(shaders::GBUFFER_SOURCE, shaders::GBUFFER_RAY_GEN);
        self.launch.add_miss_shader(shaders::GBUFFER_PRIMARY_MISS);
        self.launch.add_hit_shader(
            Some(shaders::GBUFFER_PRIMARY_CLOSEST_HIT),
            Some(shaders::GBUFFER_PRIMARY_ANY_HIT),
        );
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
        let mut targets = Vec::with_capacity(GBUFFER_BINDINGS.len());
        for (channel, slot) in GBUFFER_BINDINGS {
            let Some(texture) = ctx.channel(channel) else {
                return Ok(());
            };
            targets.push((slot, texture));
        }

        let camera = ctx.scene().and_then(|s| s.active_camera());
        let (lens_radius, focal_distance) = match camera {
            Some(camera) if self.use_thin_lens => (camera.lens_radius(), camera.focal_distance()),
            _ => (0.0, 1.0),
        };
        self.last_jitter = if self.use_jitter {
            Vec2::new(self.rng.random::<f32>() - 0.5, self.rng.random::<f32>() - 0.5)
        } else {
            Vec2::ZERO
        };
        let lens_sample = if lens_radius > 0.0 { self.sample_disk() } else { Vec2::ZERO };
        let extent = ctx.output_size();
        // Shader frame counter wraps at u32::MAX
        let frame_count = (ctx.frame_index() & u64::from(u32::MAX)) as u32;

        let device = ctx.device();
        for (slot, texture) in &targets {
            self.launch.hit_texture(device, 0, slot, *texture)?;
        }
        // Rays that miss write the background into the diffuse channel
        self.launch.miss_texture(device, 0, shaders::DIFFUSE_SLOT, targets[2].1)?;
        self.launch.miss_constant(device, 0, shaders::BACKGROUND_SLOT, self.background)?;

        self.launch.global_constant(device, shaders::MIN_T_SLOT, self.min_t)?;
        self.launch.ray_gen_constant(device, shaders::FRAME_COUNT_SLOT, frame_count)?;
        self.launch.ray_gen_constant(device, shaders::JITTER_SLOT, self.last_jitter)?;
        self.launch.ray_gen_constant(device, shaders::LENS_RADIUS_SLOT, lens_radius)?;
        self.launch.ray_gen_constant(device, shaders::FOCAL_DISTANCE_SLOT, focal_distance)?;
        self.launch.ray_gen_constant(device, shaders::LENS_SAMPLE_SLOT, lens_sample)?;
        self.launch.execute(device, extent)
    }

    fn render_gui(&mut self, ui: &mut dyn DiagnosticUi) -> bool {
        let mut changed = ui.checkbox("Use camera jitter", &mut self.use_jitter);
        changed |= ui.checkbox("Use thin lens", &mut self.use_thin_lens);
        changed |= ui.float_var("Background red", &mut self.background.x, 0.0, 1.0);
        changed |= ui.float_var("Background green", &mut self.background.y, 0.0, 1.0);
        changed |= ui.float_var("Background blue", &mut self.background.z, 0.0, 1.0);
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
#[path = "ray_traced_gbuffer_tests.rs"]
mod tests;
