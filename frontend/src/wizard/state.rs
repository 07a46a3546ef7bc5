//! Wizard states, the selected file, and drop-target highlighting.

use std::fmt;

use crate::config::ALLOWED_EXTENSIONS;

/// The five mutually exclusive views of the upload wizard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WizardState {
    /// Waiting for a file (picker or drop)
    Landing,
    /// A valid file is selected and can be submitted
    Preview,
    /// Extraction request in flight
    Loading,
    /// Extracted receipt is displayed
    Results,
    /// Something failed; the message is displayed
    Error,
}

impl WizardState {
    pub const ALL: [WizardState; 5] = [
        WizardState::Landing,
        WizardState::Preview,
        WizardState::Loading,
        WizardState::Results,
        WizardState::Error,
    ];

    /// DOM id of the container holding this view.
    pub fn view_id(&self) -> &'static str {
        match self {
            WizardState::Landing => "landing-view",
            WizardState::Preview => "preview-view",
            WizardState::Loading => "loading-view",
            WizardState::Results => "results-view",
            WizardState::Error => "error-view",
        }
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardState::Landing => "landing",
            WizardState::Preview => "preview",
            WizardState::Loading => "loading",
            WizardState::Results => "results",
            WizardState::Error => "error",
        };
        f.write_str(name)
    }
}

/// A file picked by the user, kept until the wizard returns to Landing.
///
/// `F` is the opaque payload (a `web_sys::File` in the browser).
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile<F> {
    pub payload: F,
    pub name: String,
    /// Lower-cased text after the last `.`
    pub extension: String,
}

impl<F> SelectedFile<F> {
    pub fn new(name: impl Into<String>, payload: F) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        Self { payload, name, extension }
    }

    pub fn is_allowed(&self) -> bool {
        is_allowed_extension(&self.extension)
    }
}

/// Lower-cased text after the last `.` of a file name.
///
/// A name without a dot yields the whole name, which is never an allowed
/// extension.
pub fn extension_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}

pub fn is_allowed_extension(extension: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension)
}

/// Drag events the Landing drop target listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Enter,
    Over,
    Leave,
    Drop,
}

/// Highlight state of the drop target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DropZone {
    highlighted: bool,
}

impl DropZone {
    /// Apply a drag event and return whether the zone is now highlighted.
    pub fn handle(&mut self, phase: DragPhase) -> bool {
        self.highlighted = matches!(phase, DragPhase::Enter | DragPhase::Over);
        self.highlighted
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}
