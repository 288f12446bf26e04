/// Diagnostic UI host interface.
///
/// Stages describe their toggles through `DiagnosticUi`; each widget call
/// returns true when the host changed the value this frame. The host may
/// be a real immediate-mode GUI or `UiRecorder`, which records widget
/// descriptions and replays scripted edits (headless hosts, tests).

use rustc_hash::FxHashMap;

/// Widget sink implemented by a GUI host
pub trait DiagnosticUi {
    /// Read-only text line
    fn text(&mut self, text: &str);

    /// Boolean toggle; returns true if changed
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    /// Integer field clamped to `[min, max]`; returns true if changed
    fn int_var(&mut self, label: &str, value: &mut i32, min: i32, max: i32) -> bool;

    /// Float field clamped to `[min, max]`; returns true if changed
    fn float_var(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> bool;

    /// Pick one entry; `selected` indexes `options`; returns true if changed
    fn dropdown(&mut self, label: &str, options: &[String], selected: &mut usize) -> bool;

    /// Visual separator
    fn separator(&mut self) {}

    /// Start a group of widgets owned by one stage
    fn begin_group(&mut self, _name: &str) {}

    /// End the current group
    fn end_group(&mut self) {}
}

/// Widget emitted to a `UiRecorder`
#[derive(Debug, Clone, PartialEq)]
pub enum UiWidget {
    Group(String),
    Text(String),
    Checkbox { label: String, value: bool },
    IntVar { label: String, value: i32 },
    FloatVar { label: String, value: f32 },
    Dropdown { label: String, options: Vec<String>, selected: usize },
    Separator,
}

/// Scripted edit applied the next time a widget with that label is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEdit {
    Bool(bool),
    Int(i32),
    Float(f32),
    Select(usize),
}

/// Recording `DiagnosticUi` host
#[derive(Debug, Default)]
pub struct UiRecorder {
    widgets: Vec<UiWidget>,
    edits: FxHashMap<String, UiEdit>,
}

impl UiRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an edit for the widget labelled `label`
    pub fn queue_edit(&mut self, label: &str, edit: UiEdit) {
        self.edits.insert(label.to_string(), edit);
    }

    /// Widgets recorded so far
    pub fn widgets(&self) -> &[UiWidget] {
        &self.widgets
    }

    /// Recorded text lines
    pub fn texts(&self) -> Vec<&str> {
        self.widgets
            .iter()
            .filter_map(|w| match w {
                UiWidget::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded widgets (queued edits are kept)
    pub fn clear(&mut self) {
        self.widgets.clear();
    }
}

impl DiagnosticUi for UiRecorder {
    fn text(&mut self, text: &str) {
        self.widgets.push(UiWidget::Text(text.to_string()));
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        let changed = match self.edits.remove(label) {
            Some(UiEdit::Bool(v)) if v != *value => {
                *value = v;
                true
            }
            _ => false,
        };
        self.widgets.push(UiWidget::Checkbox { label: label.to_string(), value: *value });
        changed
    }

    fn int_var(&mut self, label: &str, value: &mut i32, min: i32, max: i32) -> bool {
        let changed = match self.edits.remove(label) {
            Some(UiEdit::Int(v)) => {
                let v = v.clamp(min, max);
                let changed = v != *value;
                *value = v;
                changed
            }
            _ => false,
        };
        self.widgets.push(UiWidget::IntVar { label: label.to_string(), value: *value });
        changed
    }

    fn float_var(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> bool {
        let changed = match self.edits.remove(label) {
            Some(UiEdit::Float(v)) => {
                let v = v.clamp(min, max);
                let changed = v != *value;
                *value = v;
                changed
            }
            _ => false,
        };
        self.widgets.push(UiWidget::FloatVar { label: label.to_string(), value: *value });
        changed
    }

    fn dropdown(&mut self, label: &str, options: &[String], selected: &mut usize) -> bool {
        let changed = match self.edits.remove(label) {
            Some(UiEdit::Select(v)) if v < options.len() && v != *selected => {
                *selected = v;
                true
            }
            _ => false,
        };
        self.widgets.push(UiWidget::Dropdown {
            label: label.to_string(),
            options: options.to_vec(),
            selected: *selected,
        });
        changed
    }

    fn separator(&mut self) {
        self.widgets.push(UiWidget::Separator);
    }

    fn begin_group(&mut self, name: &str) {
        self.widgets.push(UiWidget::Group(name.to_string()));
    }
}

#[cfg(test)]
#[path = "diagnostic_ui_tests.rs"]
mod tests;
