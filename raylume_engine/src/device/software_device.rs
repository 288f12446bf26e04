/// CPU reference execution backend.
///
/// Textures are plain `Vec<Vec4>` arrays and programs resolve to Rust
/// closures ("kernels") looked up by program source. A dispatch runs the
/// kernel once per pixel; reads observe the contents from before the
/// dispatch and writes are committed when it ends, which matches how a GPU
/// pass sees its inputs.
///
/// Every device call is appended to an event log so tests can assert on
/// ordering without a GPU.

use std::sync::Arc;
use glam::{UVec2, Vec4};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::error::{Error, Result};
use crate::scene::Scene;
use crate::{engine_bail, engine_debug, engine_err, engine_error, engine_trace};
use super::graphics_device::{DeviceCapabilities, GraphicsDevice, ProgramId, TextureId};
use super::kernels;
use super::program::{BindingSlot, ProgramDesc, ProgramKind, ProgramScope, ShaderStage, ShaderValue};
use super::texture::{TextureDesc, TextureInfo};

const SOURCE: &str = "raylume::SoftwareDevice";

/// Per-pixel program body
pub type Kernel = Arc<dyn Fn(&mut KernelContext<'_>) -> Result<()> + Send + Sync>;

/// Device call recorded by `SoftwareDevice`
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    CreateTexture { texture: TextureId, name: String, width: u32, height: u32 },
    ResizeTexture { texture: TextureId, width: u32, height: u32 },
    DestroyTexture { texture: TextureId },
    ClearTexture { texture: TextureId, value: Vec4 },
    WriteTexture { texture: TextureId },
    CopyTexture { src: TextureId, dst: TextureId },
    CompileProgram { program: ProgramId, source: String },
    DestroyProgram { program: ProgramId },
    BindScene { program: ProgramId, scene: String },
    Dispatch { program: ProgramId, source: String, extent: UVec2 },
}

struct SoftwareTexture {
    name: String,
    info: TextureInfo,
    texels: Vec<Vec4>,
}

struct SoftwareProgram {
    desc: ProgramDesc,
    kernel: Kernel,
    textures: Vec<(BindingSlot, TextureId)>,
    constants: Vec<(BindingSlot, ShaderValue)>,
    scene: Option<String>,
}

impl SoftwareProgram {
    fn check_scope(&self, slot: &BindingSlot) -> Result<()> {
        match slot.scope {
            ProgramScope::Miss(index) if index >= self.desc.miss_count() => {
                engine_bail!(SOURCE, "'{}': miss index {} out of range ({} miss shaders)",
                    self.desc.source, index, self.desc.miss_count());
            }
            ProgramScope::HitGroup(index) if index >= self.desc.hit_group_count() => {
                engine_bail!(SOURCE, "'{}': hit group {} out of range ({} hit groups)",
                    self.desc.source, index, self.desc.hit_group_count());
            }
            ProgramScope::RayGen | ProgramScope::Miss(_) | ProgramScope::HitGroup(_)
                if self.desc.kind != ProgramKind::RayTracing =>
            {
                engine_bail!(SOURCE, "'{}': scope {:?} requires a ray tracing program",
                    self.desc.source, slot.scope);
            }
            _ => Ok(()),
        }
    }
}

// ===== KERNEL CONTEXT =====

/// View of one program invocation handed to a kernel for a single pixel
pub struct KernelContext<'a> {
    pixel: UVec2,
    extent: UVec2,
    textures: &'a SlotMap<TextureId, SoftwareTexture>,
    program: &'a SoftwareProgram,
    writes: &'a mut FxHashMap<TextureId, Vec<Vec4>>,
}

impl<'a> KernelContext<'a> {
    /// Pixel being shaded
    pub fn pixel(&self) -> UVec2 {
        self.pixel
    }

    /// Dispatch extent
    pub fn extent(&self) -> UVec2 {
        self.extent
    }

    /// Name of the scene bound to the program, if any
    pub fn scene_name(&self) -> Option<&str> {
        self.program.scene.as_deref()
    }

    fn bound(&self, scope: ProgramScope, name: &str) -> Option<TextureId> {
        self.program
            .textures
            .iter()
            .find(|(slot, _)| slot.scope == scope && slot.name == name)
            .map(|(_, texture)| *texture)
    }

    /// True if a texture is bound at `scope`/`name`
    pub fn is_bound(&self, scope: ProgramScope, name: &str) -> bool {
        self.bound(scope, name).is_some()
    }

    /// Read the pre-dispatch texel at the current pixel (clamped to the texture edge)
    pub fn load(&self, scope: ProgramScope, name: &str) -> Result<Vec4> {
        let Some(id) = self.bound(scope, name) else {
            engine_bail!(SOURCE, "'{}': nothing bound at {:?}/{}", self.program.desc.source, scope, name);
        };
        let Some(texture) = self.textures.get(id) else {
            return Err(Error::InvalidResource(format!("texture bound at '{}' was destroyed", name)));
        };
        let x = self.pixel.x.min(texture.info.width.saturating_sub(1));
        let y = self.pixel.y.min(texture.info.height.saturating_sub(1));
        Ok(texture.texels[(y * texture.info.width + x) as usize])
    }

    /// Read from the global scope
    pub fn load_global(&self, name: &str) -> Result<Vec4> {
        self.load(ProgramScope::Global, name)
    }

    /// Write the texel at the current pixel; pixels outside the texture are dropped
    pub fn store(&mut self, scope: ProgramScope, name: &str, value: Vec4) -> Result<()> {
        let Some(id) = self.bound(scope, name) else {
            engine_bail!(SOURCE, "'{}': nothing bound at {:?}/{}", self.program.desc.source, scope, name);
        };
        let Some(texture) = self.textures.get(id) else {
            return Err(Error::InvalidResource(format!("texture bound at '{}' was destroyed", name)));
        };
        if self.pixel.x >= texture.info.width || self.pixel.y >= texture.info.height {
            return Ok(());
        }
        let index = (self.pixel.y * texture.info.width + self.pixel.x) as usize;
        let staged = self.writes.entry(id).or_insert_with(|| texture.texels.clone());
        staged[index] = value;
        Ok(())
    }

    /// Write to the global scope
    pub fn store_global(&mut self, name: &str, value: Vec4) -> Result<()> {
        self.store(ProgramScope::Global, name, value)
    }

    /// Constant bound at `scope`/`name`
    pub fn constant(&self, scope: ProgramScope, name: &str) -> Option<ShaderValue> {
        self.program
            .constants
            .iter()
            .find(|(slot, _)| slot.scope == scope && slot.name == name)
            .map(|(_, value)| *value)
    }

    /// Constant in the global scope
    pub fn constant_global(&self, name: &str) -> Option<ShaderValue> {
        self.constant(ProgramScope::Global, name)
    }
}

// ===== SOFTWARE DEVICE =====

/// CPU implementation of `GraphicsDevice`
pub struct SoftwareDevice {
    capabilities: DeviceCapabilities,
    textures: SlotMap<TextureId, SoftwareTexture>,
    programs: SlotMap<ProgramId, SoftwareProgram>,
    kernels: FxHashMap<String, Kernel>,
    events: Vec<DeviceEvent>,
}

impl SoftwareDevice {
    /// Device with compute and ray tracing enabled and the built-in kernels registered
    pub fn new() -> Self {
        Self::with_capabilities(DeviceCapabilities::default())
    }

    /// Device with an explicit feature set
    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        let mut device = Self {
            capabilities,
            textures: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            kernels: FxHashMap::default(),
            events: Vec::new(),
        };
        kernels::register_builtin(&mut device);
        device
    }

    /// Register (or replace) the kernel compiled for `source`
    pub fn register_kernel<F>(&mut self, source: &str, kernel: F)
    where
        F: Fn(&mut KernelContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.kernels.insert(source.to_string(), Arc::new(kernel));
    }

    /// True if a kernel is registered for `source`
    pub fn has_kernel(&self, source: &str) -> bool {
        self.kernels.contains_key(source)
    }

    // ===== INSPECTION =====

    /// Texel at (x, y)
    pub fn texel(&self, texture: TextureId, x: u32, y: u32) -> Option<Vec4> {
        let texture = self.textures.get(texture)?;
        if x >= texture.info.width || y >= texture.info.height {
            return None;
        }
        texture.texels.get((y * texture.info.width + x) as usize).copied()
    }

    /// All texels, row-major
    pub fn texels(&self, texture: TextureId) -> Option<&[Vec4]> {
        self.textures.get(texture).map(|t| t.texels.as_slice())
    }

    /// Raw bytes of the texel array
    pub fn texture_bytes(&self, texture: TextureId) -> Option<&[u8]> {
        self.textures.get(texture).map(|t| bytemuck::cast_slice(t.texels.as_slice()))
    }

    /// Debug name given at creation
    pub fn texture_name(&self, texture: TextureId) -> Option<&str> {
        self.textures.get(texture).map(|t| t.name.as_str())
    }

    /// Texture bound at `slot`
    pub fn bound_texture(&self, program: ProgramId, slot: &BindingSlot) -> Option<TextureId> {
        self.programs
            .get(program)?
            .textures
            .iter()
            .find(|(s, _)| s == slot)
            .map(|(_, t)| *t)
    }

    /// Constant bound at `slot`
    pub fn bound_constant(&self, program: ProgramId, slot: &BindingSlot) -> Option<ShaderValue> {
        self.programs
            .get(program)?
            .constants
            .iter()
            .find(|(s, _)| s == slot)
            .map(|(_, v)| *v)
    }

    /// Scene bound to a program
    pub fn bound_scene(&self, program: ProgramId) -> Option<&str> {
        self.programs.get(program)?.scene.as_deref()
    }

    /// Descriptor a program was compiled from
    pub fn program_desc(&self, program: ProgramId) -> Option<&ProgramDesc> {
        self.programs.get(program).map(|p| &p.desc)
    }

    /// Live programs compiled from `source`
    pub fn programs_from(&self, source: &str) -> Vec<ProgramId> {
        self.programs
            .iter()
            .filter(|(_, p)| p.desc.source == source)
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of live textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of live programs
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Recorded device calls, oldest first
    pub fn events(&self) -> &[DeviceEvent] {
        &self.events
    }

    /// Forget recorded device calls
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn program_mut(&mut self, program: ProgramId) -> Result<&mut SoftwareProgram> {
        match self.programs.get_mut(program) {
            Some(p) => Ok(p),
            None => {
                engine_error!(SOURCE, "Unknown program {:?}", program);
                Err(Error::InvalidResource(format!("program {:?}", program)))
            }
        }
    }
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for SoftwareDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!(SOURCE, "Texture '{}' has zero size ({}x{})", desc.name, desc.width, desc.height);
        }
        let info = TextureInfo {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            usage: desc.usage,
        };
        let texels = vec![Vec4::ZERO; info.texel_count()];
        let id = self.textures.insert(SoftwareTexture { name: desc.name.clone(), info, texels });
        engine_trace!(SOURCE, "Created texture '{}' {}x{} {:?}", desc.name, desc.width, desc.height, desc.format);
        self.events.push(DeviceEvent::CreateTexture {
            texture: id,
            name: desc.name.clone(),
            width: desc.width,
            height: desc.height,
        });
        Ok(id)
    }

    fn resize_texture(&mut self, texture: TextureId, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            engine_bail!(SOURCE, "Cannot resize texture {:?} to zero size", texture);
        }
        let Some(target) = self.textures.get_mut(texture) else {
            engine_bail!(SOURCE, "resize_texture: unknown texture {:?}", texture);
        };
        target.info.width = width;
        target.info.height = height;
        target.texels = vec![Vec4::ZERO; target.info.texel_count()];
        self.events.push(DeviceEvent::ResizeTexture { texture, width, height });
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if self.textures.remove(texture).is_some() {
            self.events.push(DeviceEvent::DestroyTexture { texture });
        }
    }

    fn texture_info(&self, texture: TextureId) -> Option<TextureInfo> {
        self.textures.get(texture).map(|t| t.info.clone())
    }

    fn clear_texture(&mut self, texture: TextureId, value: Vec4) -> Result<()> {
        let Some(target) = self.textures.get_mut(texture) else {
            engine_bail!(SOURCE, "clear_texture: unknown texture {:?}", texture);
        };
        target.texels.fill(value);
        self.events.push(DeviceEvent::ClearTexture { texture, value });
        Ok(())
    }

    fn write_texels(&mut self, texture: TextureId, texels: &[Vec4]) -> Result<()> {
        let Some(target) = self.textures.get_mut(texture) else {
            engine_bail!(SOURCE, "write_texels: unknown texture {:?}", texture);
        };
        if target.texels.len() != texels.len() {
            engine_bail!(SOURCE, "write_texels: '{}' holds {} texels, got {}",
                target.name, target.texels.len(), texels.len());
        }
        target.texels.copy_from_slice(texels);
        self.events.push(DeviceEvent::WriteTexture { texture });
        Ok(())
    }

    fn copy_texture(&mut self, src: TextureId, dst: TextureId) -> Result<()> {
        let Some(source) = self.textures.get(src) else {
            engine_bail!(SOURCE, "copy_texture: unknown source {:?}", src);
        };
        let (src_w, src_h) = (source.info.width, source.info.height);
        let Some(target) = self.textures.get(dst) else {
            engine_bail!(SOURCE, "copy_texture: unknown destination {:?}", dst);
        };
        let (dst_w, dst_h) = (target.info.width, target.info.height);

        // Nearest-neighbour blit
        let copied: Vec<Vec4> = if (src_w, src_h) == (dst_w, dst_h) {
            source.texels.clone()
        } else {
            (0..dst_h)
                .flat_map(|y| (0..dst_w).map(move |x| (x, y)))
                .map(|(x, y)| {
                    let sx = (x as u64 * src_w as u64 / dst_w as u64) as u32;
                    let sy = (y as u64 * src_h as u64 / dst_h as u64) as u32;
                    source.texels[(sy * src_w + sx) as usize]
                })
                .collect()
        };

        if let Some(target) = self.textures.get_mut(dst) {
            target.texels = copied;
        }
        self.events.push(DeviceEvent::CopyTexture { src, dst });
        Ok(())
    }

    fn compile_program(&mut self, desc: &ProgramDesc) -> Result<ProgramId> {
        let compile_error = |message: String| {
            engine_error!(SOURCE, "Failed to compile '{}': {}", desc.source, message);
            Error::CompileError { program: desc.source.clone(), message }
        };

        match desc.kind {
            ProgramKind::RayTracing if !self.capabilities.ray_tracing => {
                return Err(compile_error("device does not support ray tracing".to_string()));
            }
            ProgramKind::Compute if !self.capabilities.compute => {
                return Err(compile_error("device does not support compute".to_string()));
            }
            ProgramKind::RayTracing
                if !desc.entry_points.iter().any(|e| e.stage == ShaderStage::RayGen) =>
            {
                return Err(compile_error("missing ray generation entry point".to_string()));
            }
            _ => {}
        }

        let Some(kernel) = self.kernels.get(&desc.source).cloned() else {
            return Err(compile_error("no kernel registered for this source".to_string()));
        };

        let id = self.programs.insert(SoftwareProgram {
            desc: desc.clone(),
            kernel,
            textures: Vec::new(),
            constants: Vec::new(),
            scene: None,
        });
        engine_debug!(SOURCE, "Compiled '{}' ({} entry points)", desc.source, desc.entry_points.len());
        self.events.push(DeviceEvent::CompileProgram { program: id, source: desc.source.clone() });
        Ok(id)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        if self.programs.remove(program).is_some() {
            self.events.push(DeviceEvent::DestroyProgram { program });
        }
    }

    fn bind_texture(&mut self, program: ProgramId, slot: &BindingSlot, texture: TextureId) -> Result<()> {
        if !self.textures.contains_key(texture) {
            engine_error!(SOURCE, "bind_texture: unknown texture {:?} for '{}'", texture, slot.name);
            return Err(Error::InvalidResource(format!("texture {:?}", texture)));
        }
        let target = self.program_mut(program)?;
        target.check_scope(slot)?;
        match target.textures.iter_mut().find(|(s, _)| s == slot) {
            Some(entry) => entry.1 = texture,
            None => target.textures.push((slot.clone(), texture)),
        }
        Ok(())
    }

    fn set_constant(&mut self, program: ProgramId, slot: &BindingSlot, value: ShaderValue) -> Result<()> {
        let target = self.program_mut(program)?;
        target.check_scope(slot)?;
        match target.constants.iter_mut().find(|(s, _)| s == slot) {
            Some(entry) => entry.1 = value,
            None => target.constants.push((slot.clone(), value)),
        }
        Ok(())
    }

    fn bind_scene(&mut self, program: ProgramId, scene: &dyn Scene) -> Result<()> {
        if !scene.supports_ray_tracing() {
            engine_bail!(SOURCE, "Scene '{}' has no ray tracing acceleration data", scene.name());
        }
        let target = self.program_mut(program)?;
        target.scene = Some(scene.name().to_string());
        self.events.push(DeviceEvent::BindScene { program, scene: scene.name().to_string() });
        Ok(())
    }

    fn dispatch(&mut self, program: ProgramId, extent: UVec2) -> Result<()> {
        let Some(target) = self.programs.get(program) else {
            engine_error!(SOURCE, "dispatch: unknown program {:?}", program);
            return Err(Error::InvalidResource(format!("program {:?}", program)));
        };
        if target.desc.kind == ProgramKind::RayTracing && target.scene.is_none() {
            return Err(engine_err!(SOURCE, "'{}' dispatched without a scene", target.desc.source));
        }

        let kernel = target.kernel.clone();
        let mut writes: FxHashMap<TextureId, Vec<Vec4>> = FxHashMap::default();
        for y in 0..extent.y {
            for x in 0..extent.x {
                let mut ctx = KernelContext {
                    pixel: UVec2::new(x, y),
                    extent,
                    textures: &self.textures,
                    program: target,
                    writes: &mut writes,
                };
                (*kernel)(&mut ctx)?;
            }
        }
        let source = target.desc.source.clone();

        for (id, texels) in writes {
            if let Some(texture) = self.textures.get_mut(id) {
                texture.texels = texels;
            }
        }
        engine_trace!(SOURCE, "Dispatched '{}' over {}x{}", source, extent.x, extent.y);
        self.events.push(DeviceEvent::Dispatch { program, source, extent });
        Ok(())
    }
}

#[cfg(test)]
#[path = "software_device_tests.rs"]
mod tests;
