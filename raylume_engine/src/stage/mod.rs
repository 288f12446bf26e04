/// Stage contract, phase contexts and the diagnostic UI interface

pub mod render_stage;
pub mod context;
pub mod diagnostic_ui;

pub use render_stage::{RenderStage, StageState};
pub use context::{ConfigureContext, FrameContext};
pub use diagnostic_ui::{DiagnosticUi, UiEdit, UiRecorder, UiWidget};
