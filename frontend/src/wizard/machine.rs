//! The upload wizard state machine.
//!
//! [`UploadWizard`] owns the selected file, the last extraction result and a
//! [`ViewRenderer`]. Every event handler runs to completion and leaves
//! exactly one view visible. Events that make no sense in the current state
//! are ignored.

use chrono::NaiveDateTime;
use std::fmt;

use super::receipt::{normalize, ExtractionResult, ResultsView};
use super::state::{SelectedFile, WizardState};
use crate::types::{ExtractionResponse, ServiceError};

/// Message shown for a disallowed file extension.
pub const INVALID_FILE_TYPE: &str = "Invalid file type. Only JPG, JPEG, and PNG files are allowed.";

/// Fallback message when the extraction service gives no reason.
pub const PROCESSING_FAILED: &str = "Error processing receipt";

/// Message shown when a successful response cannot be displayed.
pub const DISPLAY_FAILED: &str = "Error displaying extraction results";

/// Why an attempt ended in the Error view.
#[derive(Clone, Debug, PartialEq)]
pub enum WizardError {
    /// Disallowed file extension, caught at selection time.
    Validation,
    /// The extraction call failed or the service refused the file.
    Service(String),
    /// The service answered but the payload could not be bound.
    Render(String),
}

impl WizardError {
    /// Text displayed in the Error view.
    pub fn message(&self) -> &str {
        match self {
            WizardError::Validation => INVALID_FILE_TYPE,
            WizardError::Service(msg) => msg,
            WizardError::Render(_) => DISPLAY_FAILED,
        }
    }
}

impl fmt::Display for WizardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for WizardError {}

/// Rendering surface the wizard writes into.
///
/// Implemented with Leptos signals in the browser and with a recorder in
/// tests.
pub trait ViewRenderer {
    /// Make `state`'s view the only visible one.
    fn show(&mut self, state: WizardState);

    /// Fill the preview's filename and metadata line.
    fn show_selected_file(&mut self, name: &str, info: &str);

    /// Fill every field of the results view.
    fn bind_results(&mut self, view: &ResultsView);

    fn show_error(&mut self, message: &str);

    /// Clear the value of the file picker.
    fn reset_file_input(&mut self);
}

/// Metadata line shown under the selected file name.
pub fn uploaded_info(at: NaiveDateTime) -> String {
    format!(
        "Uploaded by User, Uploaded on {} at {}",
        at.format("%-m/%-d/%Y"),
        at.format("%I:%M %p")
    )
}

/// Receipt upload wizard.
pub struct UploadWizard<F, R> {
    state: WizardState,
    selected: Option<SelectedFile<F>>,
    result: Option<ExtractionResult>,
    error: Option<WizardError>,
    pending: bool,
    renderer: R,
}

impl<F: Clone, R: ViewRenderer> UploadWizard<F, R> {
    /// Create the wizard and show the Landing view.
    pub fn new(renderer: R) -> Self {
        let mut wizard = Self {
            state: WizardState::Landing,
            selected: None,
            result: None,
            error: None,
            pending: false,
            renderer,
        };
        wizard.renderer.show(WizardState::Landing);
        wizard
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile<F>> {
        self.selected.as_ref()
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&WizardError> {
        self.error.as_ref()
    }

    /// Whether an extraction call is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// A file was chosen with the picker or dropped on the Landing view.
    ///
    /// Accepted in Landing and Preview (a new choice replaces the old one).
    pub fn select_file(&mut self, name: &str, payload: F, at: NaiveDateTime) -> WizardState {
        if !matches!(self.state, WizardState::Landing | WizardState::Preview) {
            log::debug!("Ignoring file selection in {} state", self.state);
            return self.state;
        }

        let file = SelectedFile::new(name, payload);
        if !file.is_allowed() {
            log::warn!("Rejected file '{}' (.{})", file.name, file.extension);
            self.selected = None;
            self.fail(WizardError::Validation);
            return self.state;
        }

        log::info!("Selected receipt '{}'", file.name);
        self.renderer.show_selected_file(&file.name, &uploaded_info(at));
        self.selected = Some(file);
        self.enter(WizardState::Preview);
        self.state
    }

    /// "Remove file" in the Preview view.
    pub fn remove_file(&mut self) -> WizardState {
        if self.state == WizardState::Preview {
            self.reset();
        }
        self.state
    }

    /// "Start over" from Preview, Results or Error.
    pub fn start_over(&mut self) -> WizardState {
        if matches!(
            self.state,
            WizardState::Preview | WizardState::Results | WizardState::Error
        ) {
            self.reset();
        }
        self.state
    }

    /// "Try again" in the Error view.
    pub fn retry(&mut self) -> WizardState {
        if self.state == WizardState::Error {
            self.reset();
        }
        self.state
    }

    /// "Extract" in the Preview view.
    ///
    /// Returns the payload to submit, or `None` when there is nothing to
    /// submit or an extraction is already pending.
    pub fn begin_extraction(&mut self) -> Option<F> {
        if self.state != WizardState::Preview || self.pending {
            return None;
        }
        let payload = self.selected.as_ref()?.payload.clone();
        self.pending = true;
        self.enter(WizardState::Loading);
        Some(payload)
    }

    /// Outcome of the call started by [`begin_extraction`](Self::begin_extraction).
    pub fn finish_extraction(
        &mut self,
        outcome: Result<ExtractionResponse, ServiceError>,
    ) -> WizardState {
        if !self.pending || self.state != WizardState::Loading {
            log::warn!("Dropping extraction outcome received in {} state", self.state);
            return self.state;
        }
        self.pending = false;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                log::error!("Extraction request failed: {}", e);
                self.fail(WizardError::Service(non_empty_or_fallback(e.message())));
                return self.state;
            }
        };

        if !response.is_success() {
            let message = response.message.as_deref().unwrap_or_default();
            log::warn!("Extraction service refused the receipt: {}", message);
            self.fail(WizardError::Service(non_empty_or_fallback(message)));
            return self.state;
        }

        match normalize(response.data.as_ref()) {
            Ok(result) => {
                self.renderer.bind_results(&ResultsView::from_result(&result));
                self.result = Some(result);
                self.enter(WizardState::Results);
            }
            Err(e) => {
                log::error!("{}", e);
                self.fail(WizardError::Render(e.reason));
            }
        }
        self.state
    }

    fn reset(&mut self) {
        self.selected = None;
        self.renderer.reset_file_input();
        self.enter(WizardState::Landing);
    }

    fn fail(&mut self, error: WizardError) {
        self.renderer.show_error(error.message());
        self.error = Some(error);
        self.enter(WizardState::Error);
    }

    fn enter(&mut self, state: WizardState) {
        if state != WizardState::Results {
            self.result = None;
        }
        if state != WizardState::Error {
            self.error = None;
        }
        self.state = state;
        self.renderer.show(state);
    }
}

fn non_empty_or_fallback(message: &str) -> String {
    if message.is_empty() {
        PROCESSING_FAILED.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::receipt::{ItemRow, ItemRows};
    use chrono::NaiveDate;
    use serde_json::json;

    /// Records what the wizard asked the view to do.
    #[derive(Default)]
    struct Recorder {
        visible: Vec<WizardState>,
        filename: String,
        file_info: String,
        results: Option<ResultsView>,
        error: String,
        input_resets: usize,
    }

    impl ViewRenderer for Recorder {
        fn show(&mut self, state: WizardState) {
            self.visible.clear();
            self.visible.push(state);
        }

        fn show_selected_file(&mut self, name: &str, info: &str) {
            self.filename = name.to_string();
            self.file_info = info.to_string();
        }

        fn bind_results(&mut self, view: &ResultsView) {
            self.results = Some(view.clone());
        }

        fn show_error(&mut self, message: &str) {
            self.error = message.to_string();
        }

        fn reset_file_input(&mut self) {
            self.input_resets += 1;
        }
    }

    type Wizard = UploadWizard<&'static str, Recorder>;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 0)
            .unwrap()
    }

    fn previewing(name: &'static str) -> Wizard {
        let mut wizard = Wizard::new(Recorder::default());
        wizard.select_file(name, name, now());
        wizard
    }

    fn loading() -> Wizard {
        let mut wizard = previewing("receipt.jpg");
        assert_eq!(wizard.begin_extraction(), Some("receipt.jpg"));
        wizard
    }

    fn response(json: serde_json::Value) -> Result<ExtractionResponse, ServiceError> {
        Ok(serde_json::from_value(json).unwrap())
    }

    fn assert_only_visible(wizard: &Wizard, state: WizardState) {
        assert_eq!(wizard.state(), state);
        assert_eq!(wizard.renderer().visible, vec![state]);
    }

    #[test]
    fn test_starts_on_landing() {
        let wizard = Wizard::new(Recorder::default());
        assert_only_visible(&wizard, WizardState::Landing);
        assert!(wizard.selected_file().is_none());
    }

    #[test]
    fn test_invalid_extensions_go_to_error() {
        for name in ["receipt.pdf", "receipt.txt", "receipt", "photo.gif", "scan.jpg.zip"] {
            let wizard = previewing(name);
            assert_only_visible(&wizard, WizardState::Error);
            assert_eq!(wizard.renderer().error, INVALID_FILE_TYPE);
            assert_eq!(wizard.error(), Some(&WizardError::Validation));
            assert!(wizard.selected_file().is_none());
        }
    }

    #[test]
    fn test_invalid_file_never_reaches_loading() {
        let mut wizard = previewing("receipt.bmp");
        assert_eq!(wizard.begin_extraction(), None);
        assert_only_visible(&wizard, WizardState::Error);
    }

    #[test]
    fn test_valid_selection_shows_preview() {
        for name in ["a.jpg", "b.JPEG", "c.png"] {
            let wizard = previewing(name);
            assert_only_visible(&wizard, WizardState::Preview);
            let file = wizard.selected_file().unwrap();
            assert_eq!(file.name, name);
            assert_eq!(file.extension, name.rsplit('.').next().unwrap().to_lowercase());
            assert_eq!(wizard.renderer().filename, name);
        }
    }

    #[test]
    fn test_preview_metadata_line() {
        let wizard = previewing("receipt.png");
        assert_eq!(
            wizard.renderer().file_info,
            "Uploaded by User, Uploaded on 3/5/2024 at 02:07 PM"
        );
    }

    #[test]
    fn test_new_selection_replaces_previous() {
        let mut wizard = previewing("first.jpg");
        wizard.select_file("second.png", "second.png", now());
        assert_only_visible(&wizard, WizardState::Preview);
        assert_eq!(wizard.selected_file().unwrap().name, "second.png");
    }

    #[test]
    fn test_remove_file_returns_to_landing() {
        let mut wizard = previewing("receipt.jpg");
        wizard.remove_file();
        assert_only_visible(&wizard, WizardState::Landing);
        assert!(wizard.selected_file().is_none());
        assert_eq!(wizard.renderer().input_resets, 1);
    }

    #[test]
    fn test_successful_extraction_binds_results() {
        let mut wizard = loading();
        assert_only_visible(&wizard, WizardState::Loading);

        wizard.finish_extraction(response(json!({
            "status": "success",
            "data": {
                "vendor_name": "Acme",
                "date": "2024-03-05",
                "currency": "EUR",
                "receipt_items": [{"item_name": "Pen", "item_cost": 1.5}],
                "tax": 0.3,
                "total": 1.8
            }
        })));

        assert_only_visible(&wizard, WizardState::Results);
        let view = wizard.renderer().results.as_ref().unwrap();
        assert_eq!(view.vendor, "Acme");
        assert_eq!(view.date, "March 5, 2024");
        assert_eq!(view.currency, "EUR");
        assert_eq!(
            view.rows,
            ItemRows::Items(vec![ItemRow { name: "Pen".into(), cost: "$1.50".into() }])
        );
        assert_eq!(view.tax, "$0.30");
        assert_eq!(view.total, "$1.80");
        assert!(wizard.result().is_some());
        assert!(!wizard.is_pending());
    }

    #[test]
    fn test_sparse_success_uses_defaults() {
        let mut wizard = loading();
        wizard.finish_extraction(response(json!({
            "status": "success",
            "data": {"receipt_items": []}
        })));

        assert_only_visible(&wizard, WizardState::Results);
        let view = wizard.renderer().results.as_ref().unwrap();
        assert_eq!(view.vendor, "Unknown Vendor");
        assert_eq!(view.date, "N/A");
        assert_eq!(view.tax, "$0.00");
        assert_eq!(view.total, "$0.00");
        assert_eq!(view.rows, ItemRows::Empty);
    }

    #[test]
    fn test_service_message_is_shown() {
        let mut wizard = loading();
        wizard.finish_extraction(response(json!({"status": "error", "message": "File too large"})));
        assert_only_visible(&wizard, WizardState::Error);
        assert_eq!(wizard.renderer().error, "File too large");
    }

    #[test]
    fn test_service_error_without_message_uses_fallback() {
        let mut wizard = loading();
        wizard.finish_extraction(response(json!({"status": "error"})));
        assert_eq!(wizard.renderer().error, PROCESSING_FAILED);
    }

    #[test]
    fn test_network_failure_message_is_shown() {
        let mut wizard = loading();
        wizard.finish_extraction(Err(ServiceError::Network("NetworkDown".into())));
        assert_only_visible(&wizard, WizardState::Error);
        assert_eq!(wizard.renderer().error, "NetworkDown");
    }

    #[test]
    fn test_unbindable_payload_goes_to_error_without_binding() {
        let mut wizard = loading();
        wizard.finish_extraction(response(json!({"status": "success", "data": null})));
        assert_only_visible(&wizard, WizardState::Error);
        assert_eq!(wizard.renderer().error, DISPLAY_FAILED);
        assert!(wizard.renderer().results.is_none());
        assert!(wizard.result().is_none());
    }

    #[test]
    fn test_second_extraction_is_rejected_while_pending() {
        let mut wizard = loading();
        assert_eq!(wizard.begin_extraction(), None);
        assert!(wizard.is_pending());
        assert_only_visible(&wizard, WizardState::Loading);
    }

    #[test]
    fn test_outcome_without_pending_request_is_ignored() {
        let mut wizard = previewing("receipt.jpg");
        wizard.finish_extraction(Err(ServiceError::Network("late".into())));
        assert_only_visible(&wizard, WizardState::Preview);
    }

    #[test]
    fn test_start_over_from_each_state() {
        let mut from_preview = previewing("receipt.jpg");
        from_preview.start_over();

        let mut from_results = loading();
        from_results.finish_extraction(response(json!({"status": "success", "data": {}})));
        assert_eq!(from_results.state(), WizardState::Results);
        from_results.start_over();

        let mut from_error = loading();
        from_error.finish_extraction(Err(ServiceError::Malformed("bad json".into())));
        assert_eq!(from_error.state(), WizardState::Error);
        from_error.start_over();

        for wizard in [&from_preview, &from_results, &from_error] {
            assert_only_visible(wizard, WizardState::Landing);
            assert!(wizard.selected_file().is_none());
            assert!(wizard.result().is_none());
            assert_eq!(wizard.renderer().input_resets, 1);
        }
    }

    #[test]
    fn test_retry_returns_to_landing() {
        let mut wizard = previewing("receipt.pdf");
        wizard.retry();
        assert_only_visible(&wizard, WizardState::Landing);
        assert!(wizard.error().is_none());
    }

    #[test]
    fn test_events_out_of_place_are_ignored() {
        let mut wizard = Wizard::new(Recorder::default());
        wizard.remove_file();
        wizard.start_over();
        wizard.retry();
        assert_eq!(wizard.begin_extraction(), None);
        assert_only_visible(&wizard, WizardState::Landing);

        let mut wizard = loading();
        wizard.start_over();
        wizard.select_file("other.png", "other.png", now());
        assert_only_visible(&wizard, WizardState::Loading);
    }

    #[test]
    fn test_full_cycle_can_repeat() {
        let mut wizard = loading();
        wizard.finish_extraction(response(json!({"status": "success", "data": {}})));
        wizard.start_over();
        wizard.select_file("next.png", "next.png", now());
        assert_eq!(wizard.begin_extraction(), Some("next.png"));
        assert_only_visible(&wizard, WizardState::Loading);
    }
}
