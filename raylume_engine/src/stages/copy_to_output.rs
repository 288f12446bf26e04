/// CopyToOutputStage - display any channel
///
/// Blits the channel picked in the "Displayed" dropdown into `OutputChannel`.
/// The dropdown lists every channel declared by the pipeline except the
/// output itself, in declaration order.

use std::any::Any;
use glam::Vec4;
use crate::error::Result;
use crate::registry::{ResourceRegistry, OUTPUT_CHANNEL};
use crate::stage::{ConfigureContext, DiagnosticUi, FrameContext, RenderStage};
use crate::engine_debug;

const SOURCE: &str = "raylume::CopyToOutput";

/// Output selection stage
pub struct CopyToOutputStage {
    channels: Vec<String>,
    selected: usize,
    preferred: Option<String>,
}

impl CopyToOutputStage {
    /// Display the first declared channel
    pub fn new() -> Self {
        Self { channels: Vec::new(), selected: 0, preferred: None }
    }

    /// Display `channel` once the pipeline has declared it
    pub fn displaying(channel: &str) -> Self {
        Self { preferred: Some(channel.to_string()), ..Self::new() }
    }

    /// Selectable channel names
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Currently displayed channel
    pub fn selected_channel(&self) -> Option<&str> {
        self.channels.get(self.selected).map(String::as_str)
    }

    /// Display `channel`; returns false if it is not selectable
    pub fn select(&mut self, channel: &str) -> bool {
        match self.channels.iter().position(|c| c == channel) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }
}

impl Default for CopyToOutputStage {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStage for CopyToOutputStage {
    fn name(&self) -> &str {
        "Copy To Output"
    }

    fn initialize(&mut self, ctx: &mut ConfigureContext<'_>) -> Result<()> {
        ctx.request_channel(OUTPUT_CHANNEL)?;
        Ok(())
    }

    fn on_pipeline_updated(&mut self, registry: &ResourceRegistry) {
        let current = self.selected_channel().map(str::to_string);
        self.channels = registry
            .channel_names()
            .into_iter()
            .filter(|name| *name != OUTPUT_CHANNEL)
            .map(str::to_string)
            .collect();
        self.selected = 0;
        if let Some(wanted) = current.or_else(|| self.preferred.clone()) {
            self.select(&wanted);
        }
        engine_debug!(SOURCE, "{} channels selectable, displaying {:?}",
            self.channels.len(), self.selected_channel());
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let Some(output) = ctx.channel(OUTPUT_CHANNEL) else {
            return Ok(());
        };
        match self.selected_channel().and_then(|name| ctx.channel(name)) {
            Some(source) => ctx.device().copy_texture(source, output),
            None => {
                ctx.cleared_channel(OUTPUT_CHANNEL, Vec4::new(0.0, 0.0, 0.0, 1.0))?;
                Ok(())
            }
        }
    }

    fn render_gui(&mut self, ui: &mut dyn DiagnosticUi) -> bool {
        if self.channels.is_empty() {
            ui.text("No channels to display");
            return false;
        }
        ui.dropdown("Displayed", &self.channels, &mut self.selected)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "copy_to_output_tests.rs"]
mod tests;
