//! Receipt upload wizard.
//!
//! A DOM-free state machine driving the receipt extraction page:
//!
//! ```text
//!            select (ok)            extract             success
//! Landing ───────────────▶ Preview ────────▶ Loading ───────────▶ Results
//!    │ ▲                     │                  │                     │
//!    │ └──── remove / start over ◀──────────────┼──── start over ─────┘
//!    │ select (bad type)                        │ failure
//!    └──────────────────▶ Error ◀───────────────┘
//!                           │ retry / start over
//!                           └──────────────▶ Landing
//! ```
//!
//! - [`state`] - States, selected file, drop-target highlighting
//! - [`receipt`] - Response normalization and result formatting
//! - [`machine`] - [`UploadWizard`] and the [`ViewRenderer`] boundary

pub mod machine;
pub mod receipt;
pub mod state;

pub use machine::{
    uploaded_info, UploadWizard, ViewRenderer, WizardError, DISPLAY_FAILED, INVALID_FILE_TYPE,
    PROCESSING_FAILED,
};
pub use receipt::{
    format_date, format_money, normalize, ExtractionResult, ItemRow, ItemRows, ReceiptItem,
    RenderError, ResultsView, NO_ITEMS,
};
pub use state::{extension_of, DragPhase, DropZone, SelectedFile, WizardState};
