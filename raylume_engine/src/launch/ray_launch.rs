/// RayLaunch - ray tracing program builder and dispatcher
///
/// Collects a ray generation entry point, miss shaders and hit groups, then
/// compiles them into one program. Miss shaders and hit groups are numbered
/// in the order they were added; every binding names its scope index
/// explicitly.
///
/// A launch is only ready to render once it is compiled and a scene with ray
/// tracing support is bound. Scenes without it leave the launch unbound,
/// which stages treat as "nothing to do this frame".

use glam::UVec2;
use crate::device::{
    BindingSlot, EntryPoint, GraphicsDevice, ProgramDesc, ProgramId, ProgramKind, ShaderStage,
    ShaderValue, TextureId,
};
use crate::error::Result;
use crate::scene::Scene;
use crate::stage::ConfigureContext;
use crate::{engine_bail, engine_debug, engine_trace};

const SOURCE: &str = "raylume::RayLaunch";

struct HitGroup {
    closest_hit: Option<String>,
    any_hit: Option<String>,
}

/// Ray tracing program with explicit miss and hit group tables
pub struct RayLaunch {
    source: String,
    ray_gen: String,
    miss_shaders: Vec<String>,
    hit_groups: Vec<HitGroup>,
    program: Option<ProgramId>,
    scene: Option<String>,
}

impl RayLaunch {
    /// Start a launch for `source` with its ray generation entry point
    pub fn new(source: &str, ray_gen: &str) -> Self {
        Self {
            source: source.to_string(),
            ray_gen: ray_gen.to_string(),
            miss_shaders: Vec::new(),
            hit_groups: Vec::new(),
            program: None,
            scene: None,
        }
    }

    /// Append a miss shader; returns its miss index
    pub fn add_miss_shader(&mut self, entry: &str) -> u32 {
        self.miss_shaders.push(entry.to_string());
        (self.miss_shaders.len() - 1) as u32
    }

    /// Append a hit group; returns its hit group index
    pub fn add_hit_shader(&mut self, closest_hit: Option<&str>, any_hit: Option<&str>) -> u32 {
        self.hit_groups.push(HitGroup {
            closest_hit: closest_hit.map(str::to_string),
            any_hit: any_hit.map(str::to_string),
        });
        (self.hit_groups.len() - 1) as u32
    }

    /// Program descriptor for the entry points added so far
    pub fn desc(&self) -> ProgramDesc {
        let mut entry_points = vec![EntryPoint::new(ShaderStage::RayGen, self.ray_gen.as_str(), 0)];
        for (index, miss) in self.miss_shaders.iter().enumerate() {
            entry_points.push(EntryPoint::new(ShaderStage::Miss, miss.as_str(), index as u32));
        }
        for (index, group) in self.hit_groups.iter().enumerate() {
            if let Some(closest) = &group.closest_hit {
                entry_points.push(EntryPoint::new(ShaderStage::ClosestHit, closest.as_str(), index as u32));
            }
            if let Some(any) = &group.any_hit {
                entry_points.push(EntryPoint::new(ShaderStage::AnyHit, any.as_str(), index as u32));
            }
        }
        ProgramDesc {
            source: self.source.clone(),
            kind: ProgramKind::RayTracing,
            entry_points,
        }
    }

    /// Build the program (replacing a previous one)
    ///
    /// # Errors
    ///
    /// `CompileError` if the backend cannot build it.
    pub fn compile(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        if let Some(old) = self.program.take() {
            ctx.device().destroy_program(old);
        }
        self.scene = None;
        let program = ctx.compile_program(&self.desc())?;
        self.program = Some(program);
        Ok(())
    }

    /// Bind scene geometry
    ///
    /// Returns `Ok(false)` and leaves the launch unbound when the scene has
    /// no ray tracing support or the program is not compiled.
    pub fn set_scene(&mut self, device: &mut dyn GraphicsDevice, scene: &dyn Scene) -> Result<bool> {
        self.scene = None;
        let Some(program) = self.program else {
            engine_debug!(SOURCE, "'{}' not compiled, scene '{}' not bound", self.source, scene.name());
            return Ok(false);
        };
        if !scene.supports_ray_tracing() {
            engine_debug!(SOURCE, "Scene '{}' cannot be ray traced, '{}' stays idle",
                scene.name(), self.source);
            return Ok(false);
        }
        device.bind_scene(program, scene)?;
        self.scene = Some(scene.name().to_string());
        Ok(true)
    }

    /// Compiled and bound to a scene
    pub fn ready_to_render(&self) -> bool {
        self.program.is_some() && self.scene.is_some()
    }

    // ===== BINDINGS =====

    fn bound_program(&self) -> Result<ProgramId> {
        match self.program {
            Some(program) => Ok(program),
            None => engine_bail!(SOURCE, "'{}' used before compile", self.source),
        }
    }

    fn check_miss(&self, index: u32) -> Result<()> {
        if index as usize >= self.miss_shaders.len() {
            engine_bail!(SOURCE, "'{}': miss index {} out of range ({} miss shaders)",
                self.source, index, self.miss_shaders.len());
        }
        Ok(())
    }

    fn check_hit_group(&self, index: u32) -> Result<()> {
        if index as usize >= self.hit_groups.len() {
            engine_bail!(SOURCE, "'{}': hit group {} out of range ({} hit groups)",
                self.source, index, self.hit_groups.len());
        }
        Ok(())
    }

    pub fn ray_gen_texture(&self, device: &mut dyn GraphicsDevice, name: &str, texture: TextureId) -> Result<()> {
        device.bind_texture(self.bound_program()?, &BindingSlot::ray_gen(name), texture)
    }

    pub fn ray_gen_constant(
        &self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        value: impl Into<ShaderValue>,
    ) -> Result<()> {
        device.set_constant(self.bound_program()?, &BindingSlot::ray_gen(name), value.into())
    }

    pub fn miss_texture(
        &self,
        device: &mut dyn GraphicsDevice,
        index: u32,
        name: &str,
        texture: TextureId,
    ) -> Result<()> {
        self.check_miss(index)?;
        device.bind_texture(self.bound_program()?, &BindingSlot::miss(index, name), texture)
    }

    pub fn miss_constant(
        &self,
        device: &mut dyn GraphicsDevice,
        index: u32,
        name: &str,
        value: impl Into<ShaderValue>,
    ) -> Result<()> {
        self.check_miss(index)?;
        device.set_constant(self.bound_program()?, &BindingSlot::miss(index, name), value.into())
    }

    pub fn hit_texture(
        &self,
        device: &mut dyn GraphicsDevice,
        group: u32,
        name: &str,
        texture: TextureId,
    ) -> Result<()> {
        self.check_hit_group(group)?;
        device.bind_texture(self.bound_program()?, &BindingSlot::hit_group(group, name), texture)
    }

    pub fn hit_constant(
        &self,
        device: &mut dyn GraphicsDevice,
        group: u32,
        name: &str,
        value: impl Into<ShaderValue>,
    ) -> Result<()> {
        self.check_hit_group(group)?;
        device.set_constant(self.bound_program()?, &BindingSlot::hit_group(group, name), value.into())
    }

    /// Set a constant visible to every entry point
    pub fn global_constant(
        &self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        value: impl Into<ShaderValue>,
    ) -> Result<()> {
        device.set_constant(self.bound_program()?, &BindingSlot::global(name), value.into())
    }

    /// Trace rays over `extent`; no-op until ready
    pub fn execute(&self, device: &mut dyn GraphicsDevice, extent: UVec2) -> Result<()> {
        let (Some(program), Some(_)) = (self.program, self.scene.as_ref()) else {
            engine_trace!(SOURCE, "'{}' not ready, launch skipped", self.source);
            return Ok(());
        };
        device.dispatch(program, extent)
    }

    // ===== GETTERS =====

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    pub fn miss_count(&self) -> u32 {
        self.miss_shaders.len() as u32
    }

    pub fn hit_group_count(&self) -> u32 {
        self.hit_groups.len() as u32
    }

    /// Name of the bound scene
    pub fn scene_name(&self) -> Option<&str> {
        self.scene.as_deref()
    }

    /// Destroy the program and forget the scene
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(program) = self.program.take() {
            device.destroy_program(program);
        }
        self.scene = None;
    }
}

#[cfg(test)]
#[path = "ray_launch_tests.rs"]
mod tests;
