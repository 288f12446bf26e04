/// Pipeline orchestrator.
///
/// Owns the execution device, the resource registry, the ordered stage slots
/// and the current scene. Stage index order is the dependency order: a
/// stage may read any channel written by a stage with a lower index during
/// the same frame. No other dependency graph is kept.
///
/// Error policy:
/// - `ConfigurationError` aborts `initialize` before any frame runs
/// - `CompileError` marks the owning stage `Failed`; the others keep running
/// - any other error from a frame or lifecycle hook is returned to the host
///
/// Stage hooks get a `ConfigureContext` (registry mutable) during lifecycle
/// events and a `FrameContext` (registry read-only) during frames, so channel
/// allocation and resizing never overlap an `execute` call.

use glam::{UVec2, Vec4};
use crate::config::PipelineConfig;
use crate::device::GraphicsDevice;
use crate::error::{Error, Result};
use crate::registry::ResourceRegistry;
use crate::scene::Scene;
use crate::stage::{ConfigureContext, DiagnosticUi, FrameContext, RenderStage, StageState};
use crate::{config_bail, engine_debug, engine_error, engine_info, engine_trace, engine_warn};

const SOURCE: &str = "raylume::Pipeline";

/// Event delivered by the window / host
pub enum HostEvent {
    /// Output size changed
    Resized { width: u32, height: u32 },
    /// A new scene replaces the current one
    SceneLoaded(Box<dyn Scene>),
    /// Cumulative state is no longer valid
    Refresh,
    /// Render one frame
    Frame,
}

struct StageSlot {
    stage: Box<dyn RenderStage>,
    state: StageState,
    dirty: bool,
}

impl StageSlot {
    /// Apply the error policy to a hook result
    fn absorb(&mut self, index: usize, phase: &str, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_compile() => {
                self.fail(index, phase, &err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn fail(&mut self, index: usize, phase: &str, err: &Error) {
        engine_error!(SOURCE, "Stage {} '{}' failed during {}: {}", index, self.stage.name(), phase, err);
        self.state = StageState::Failed;
    }
}

/// Ordered render stages sharing one resource registry
pub struct Pipeline<D: GraphicsDevice> {
    config: PipelineConfig,
    device: D,
    registry: ResourceRegistry,
    slots: Vec<Option<StageSlot>>,
    scene: Option<Box<dyn Scene>>,
    frame_index: u64,
    initialized: bool,
    /// A stage aborted startup; the pipeline must be reassembled
    startup_failed: bool,
    refresh_requested: bool,
}

impl<D: GraphicsDevice> Pipeline<D> {
    /// Empty pipeline; the registry starts at the configured output size
    pub fn new(device: D, config: PipelineConfig) -> Self {
        let registry = ResourceRegistry::new(config.output_width, config.output_height);
        Self {
            config,
            device,
            registry,
            slots: Vec::new(),
            scene: None,
            frame_index: 0,
            initialized: false,
            startup_failed: false,
            refresh_requested: false,
        }
    }

    // ===== ASSEMBLY =====

    /// Place a stage at `index`, replacing whatever was there
    ///
    /// Slots between the previous end and `index` stay empty; `initialize`
    /// rejects pipelines with empty slots.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` once the pipeline is initialized.
    pub fn set_stage(&mut self, index: usize, stage: Box<dyn RenderStage>) -> Result<()> {
        if self.initialized || self.startup_failed {
            config_bail!(SOURCE, "Cannot place stage '{}' at {}: pipeline already initialized",
                stage.name(), index);
        }
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        engine_debug!(SOURCE, "Stage {} = '{}'", index, stage.name());
        self.slots[index] = Some(StageSlot {
            stage,
            state: StageState::Uninitialized,
            dirty: false,
        });
        Ok(())
    }

    /// Append a stage; returns its index
    pub fn add_stage<S: RenderStage>(&mut self, stage: S) -> Result<usize> {
        let index = self.slots.len();
        self.set_stage(index, Box::new(stage))?;
        Ok(index)
    }

    /// Append several boxed stages in order
    pub fn add_stages(&mut self, stages: Vec<Box<dyn RenderStage>>) -> Result<()> {
        for stage in stages {
            let index = self.slots.len();
            self.set_stage(index, stage)?;
        }
        Ok(())
    }

    /// Check the stage list before anything is initialized
    fn validate_composition(&self) -> Result<()> {
        if self.slots.is_empty() {
            config_bail!(SOURCE, "Pipeline has no stages");
        }
        let capabilities = self.device.capabilities();
        let mut scene_bound_upstream = false;
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(slot) = slot else {
                config_bail!(SOURCE, "Stage slot {} is empty", index);
            };
            let stage = &slot.stage;
            scene_bound_upstream |= stage.binds_scene();
            if stage.requires_compute_backend() && !capabilities.compute {
                config_bail!(SOURCE, "Stage {} '{}' needs compute support, device has none",
                    index, stage.name());
            }
            if stage.requires_scene() && !scene_bound_upstream {
                config_bail!(SOURCE, "Stage {} '{}' needs a scene but no stage up to it binds one",
                    index, stage.name());
            }
        }
        Ok(())
    }

    // ===== LIFECYCLE =====

    /// Validate composition, then initialize every stage in index order
    ///
    /// Stages whose initialization fails with anything other than a
    /// `ConfigurationError` are marked `Failed` and skipped from then on.
    /// A scene loaded beforehand is delivered afterwards.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for an invalid composition, a second call, or a
    /// stage reporting one. After a stage reports one, every later call
    /// fails too: stages are never initialized twice.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            config_bail!(SOURCE, "Pipeline initialized twice");
        }
        if self.startup_failed {
            config_bail!(SOURCE, "Pipeline startup already failed, reassemble it");
        }
        self.validate_composition()?;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(slot) = slot else { continue };
            let mut ctx = ConfigureContext::new(&mut self.registry, &mut self.device, &self.config);
            match slot.stage.initialize(&mut ctx) {
                Ok(()) => slot.state = StageState::Initialized,
                Err(err) if err.is_configuration() => {
                    self.startup_failed = true;
                    return Err(err);
                }
                Err(err) => slot.fail(index, "initialize", &err),
            }
        }

        for slot in self.slots.iter_mut().flatten() {
            if slot.state.is_live() {
                slot.stage.on_pipeline_updated(&self.registry);
                slot.state = StageState::Ready;
            }
        }
        self.initialized = true;
        engine_info!(SOURCE, "Initialized {} stages ({} failed), {} channels",
            self.slots.len(), self.failed_count(), self.registry.channel_count());

        if self.scene.is_some() {
            self.deliver_scene()?;
        }
        Ok(())
    }

    /// Make `scene` current and hand it to every live stage in order
    pub fn load_scene(&mut self, scene: Box<dyn Scene>) -> Result<()> {
        engine_info!(SOURCE, "Scene '{}' loaded", scene.name());
        self.scene = Some(scene);
        if self.initialized {
            self.deliver_scene()?;
        }
        Ok(())
    }

    fn deliver_scene(&mut self) -> Result<()> {
        let Some(scene) = self.scene.as_deref() else {
            return Ok(());
        };
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(slot) = slot else { continue };
            if !slot.state.is_live() {
                continue;
            }
            let mut ctx = ConfigureContext::new(&mut self.registry, &mut self.device, &self.config);
            let result = slot.stage.on_scene_loaded(&mut ctx, scene);
            slot.absorb(index, "scene load", result)?;
            if slot.state.is_live() {
                slot.state = StageState::SceneBound;
            }
        }
        Ok(())
    }

    /// Drop the current scene; scene-dependent stages idle until the next one
    pub fn unload_scene(&mut self) -> Option<Box<dyn Scene>> {
        let scene = self.scene.take()?;
        for slot in self.slots.iter_mut().flatten() {
            if matches!(slot.state, StageState::SceneBound | StageState::Running) {
                slot.state = StageState::Ready;
            }
        }
        engine_info!(SOURCE, "Scene '{}' unloaded", scene.name());
        Some(scene)
    }

    /// Resize every screen-sized channel, then notify every live stage
    ///
    /// Zero-area and unchanged sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            engine_debug!(SOURCE, "Ignoring resize to {}x{}", width, height);
            return Ok(());
        }
        if self.registry.output_size() == UVec2::new(width, height) {
            return Ok(());
        }
        self.registry.resize_all(&mut self.device, width, height)?;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(slot) = slot else { continue };
            if !slot.state.is_live() {
                continue;
            }
            let mut ctx = ConfigureContext::new(&mut self.registry, &mut self.device, &self.config);
            let result = slot.stage.on_resize(&mut ctx, width, height);
            slot.absorb(index, "resize", result)?;
        }
        Ok(())
    }

    /// Replace the environment map between frames
    ///
    /// Accumulated results lit by the old map are stale, so a refresh is
    /// requested for the next frame.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if `texels` does not hold `width * height` values.
    pub fn update_environment_map(&mut self, width: u32, height: u32, texels: &[Vec4]) -> Result<()> {
        self.registry.update_environment_map(&mut self.device, width, height, texels)?;
        self.refresh_requested = true;
        Ok(())
    }

    /// Force every stage to drop cumulative state before the next frame
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Raise the Dirty flag of one stage
    pub fn mark_dirty(&mut self, index: usize) {
        if let Some(Some(slot)) = self.slots.get_mut(index) {
            slot.dirty = true;
        }
    }

    fn fan_out_refresh(&mut self) {
        let dirty = self.slots.iter().flatten().any(|s| s.dirty && s.state.is_live());
        if !(dirty || self.refresh_requested) {
            return;
        }
        engine_debug!(SOURCE, "Forced refresh before frame {}", self.frame_index);
        for slot in self.slots.iter_mut().flatten() {
            if slot.state.is_live() {
                slot.stage.on_forced_refresh();
            }
            slot.dirty = false;
        }
        self.refresh_requested = false;
    }

    /// Execute every live stage once, in index order
    ///
    /// Stages that need a scene are skipped while none is loaded.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` before `initialize`; any non-compile error a
    /// stage returns (the frame is abandoned and `frame_index` unchanged).
    pub fn render_frame(&mut self) -> Result<()> {
        if self.startup_failed {
            config_bail!(SOURCE, "render_frame called after failed startup");
        }
        if !self.initialized {
            config_bail!(SOURCE, "render_frame called before initialize");
        }
        self.fan_out_refresh();

        let scene = self.scene.as_deref();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(slot) = slot else { continue };
            if !slot.state.is_live() {
                continue;
            }
            if slot.stage.requires_scene() && scene.is_none() {
                engine_trace!(SOURCE, "Stage {} '{}' waiting for a scene", index, slot.stage.name());
                continue;
            }
            let mut ctx = FrameContext::new(
                &self.registry,
                &mut self.device,
                scene,
                &self.config,
                self.frame_index,
            );
            let result = slot.stage.execute(&mut ctx);
            slot.absorb(index, "execute", result)?;
            if slot.state.is_live() {
                slot.state = StageState::Running;
            }
        }

        self.frame_index += 1;
        Ok(())
    }

    /// Let every live stage describe its toggles; changes raise Dirty flags
    pub fn render_gui(&mut self, ui: &mut dyn DiagnosticUi) {
        for slot in self.slots.iter_mut().flatten() {
            if !slot.state.is_live() {
                continue;
            }
            ui.begin_group(slot.stage.name());
            if slot.stage.render_gui(ui) {
                slot.dirty = true;
            }
            ui.end_group();
        }
    }

    /// Dispatch a host event to the matching operation
    pub fn handle_event(&mut self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::Resized { width, height } => self.resize(width, height),
            HostEvent::SceneLoaded(scene) => self.load_scene(scene),
            HostEvent::Refresh => {
                self.request_refresh();
                Ok(())
            }
            HostEvent::Frame => self.render_frame(),
        }
    }

    // ===== GETTERS =====

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn scene(&self) -> Option<&dyn Scene> {
        self.scene.as_deref()
    }

    /// Current scene, for hosts driving its camera
    pub fn scene_mut(&mut self) -> Option<&mut (dyn Scene + 'static)> {
        self.scene.as_deref_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// A stage aborted `initialize` with a `ConfigurationError`
    pub fn startup_failed(&self) -> bool {
        self.startup_failed
    }

    /// Frames rendered so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Number of stage slots (including empty ones)
    pub fn stage_count(&self) -> usize {
        self.slots.len()
    }

    pub fn stage_state(&self, index: usize) -> Option<StageState> {
        self.slots.get(index)?.as_ref().map(|s| s.state)
    }

    pub fn stage_name(&self, index: usize) -> Option<&str> {
        self.slots.get(index)?.as_ref().map(|s| s.stage.name())
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(slot)) if slot.dirty)
    }

    /// Stage at `index` as its concrete type
    pub fn stage<T: RenderStage>(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()?.stage.as_any().downcast_ref::<T>()
    }

    /// Mutable stage at `index` as its concrete type
    pub fn stage_mut<T: RenderStage>(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()?.stage.as_any_mut().downcast_mut::<T>()
    }

    fn failed_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.state == StageState::Failed)
            .count()
    }
}

impl<D: GraphicsDevice> Drop for Pipeline<D> {
    fn drop(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.stage.release(&mut self.device);
        }
        if self.registry.channel_count() > 0 {
            engine_trace!(SOURCE, "Releasing {} channels", self.registry.channel_count());
        }
        self.registry.release(&mut self.device);
        if self.failed_count() > 0 {
            engine_warn!(SOURCE, "Pipeline dropped with {} failed stages", self.failed_count());
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
