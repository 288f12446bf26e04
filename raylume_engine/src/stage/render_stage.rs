/// Render stage contract.
///
/// Every stage in a pipeline implements `RenderStage`. Shared behavior
/// (program launches, channel lookups) is composed from helpers such as
/// `FullscreenLaunch` and `RayLaunch` rather than inherited.
///
/// Call order, driven by the pipeline:
/// 1. `initialize` exactly once, before anything else
/// 2. `on_pipeline_updated` once every stage is initialized
/// 3. `on_scene_loaded` / `on_resize` whenever the host reports them
/// 4. `on_forced_refresh` before a frame when any stage was marked dirty
/// 5. `execute` once per frame, in pipeline order
///
/// `execute` must treat missing channels, programs or scenes as "nothing to
/// do this frame" and return `Ok(())`.

use std::any::Any;
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::registry::ResourceRegistry;
use crate::scene::Scene;
use super::context::{ConfigureContext, FrameContext};
use super::diagnostic_ui::DiagnosticUi;

/// Per-stage lifecycle state tracked by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    /// Constructed, `initialize` not called yet
    Uninitialized,
    /// `initialize` succeeded
    Initialized,
    /// Initialized and waiting for a scene or a frame
    Ready,
    /// A scene was delivered since the last frame
    SceneBound,
    /// Executed at least once since the last lifecycle event
    Running,
    /// Initialization or program build failed; never executed again
    Failed,
}

impl StageState {
    /// True for stages that take part in lifecycle fan-out and frames
    pub fn is_live(&self) -> bool {
        !matches!(self, StageState::Uninitialized | StageState::Failed)
    }
}

/// One unit of per-frame work
pub trait RenderStage: Any {
    /// Display name
    fn name(&self) -> &str;

    /// Stage needs a loaded scene to do anything
    fn requires_scene(&self) -> bool {
        false
    }

    /// Stage needs compute / ray tracing dispatch on the device
    fn requires_compute_backend(&self) -> bool {
        false
    }

    /// Stage supplies the scene binding scene-dependent stages rely on
    fn binds_scene(&self) -> bool {
        false
    }

    /// Declare channels and build programs
    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()>;

    /// Every stage has declared its channels
    fn on_pipeline_updated(&mut self, _registry: &ResourceRegistry) {}

    /// A new scene was loaded; reset scene-tied state
    fn on_scene_loaded(&mut self, _ctx: &mut ConfigureContext<'_>, _scene: &dyn Scene) -> Result<()> {
        Ok(())
    }

    /// Output size changed; the registry has already resized its channels
    fn on_resize(&mut self, _ctx: &mut ConfigureContext<'_>, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }

    /// Run this stage for one frame
    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()>;

    /// Cumulative state is no longer valid
    fn on_forced_refresh(&mut self) {}

    /// Describe toggles; return true if one changed
    fn render_gui(&mut self, _ui: &mut dyn DiagnosticUi) -> bool {
        false
    }

    /// Free stage-owned device objects
    fn release(&mut self, _device: &mut dyn GraphicsDevice) {}

    /// Allow downcasting
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
