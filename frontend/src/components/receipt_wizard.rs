//! Receipt upload wizard with drag & drop support.
//!
//! The [`UploadWizard`] owns the transitions; this component only feeds it
//! DOM events and mirrors what it renders into signals.

use leptos::html::Input;
use leptos::*;
use web_sys::{DragEvent, Event, File, HtmlInputElement};

use crate::config::FILE_ACCEPT;
use crate::services::extract_receipt;
use crate::wizard::{
    DragPhase, DropZone, ItemRows, ResultsView, UploadWizard, ViewRenderer, WizardState, NO_ITEMS,
};

/// Renders wizard output through signals.
#[derive(Clone, Copy)]
struct SignalRenderer {
    set_state: WriteSignal<WizardState>,
    set_file_name: WriteSignal<String>,
    set_file_info: WriteSignal<String>,
    set_results: WriteSignal<Option<ResultsView>>,
    set_error: WriteSignal<String>,
    file_input: NodeRef<Input>,
}

impl ViewRenderer for SignalRenderer {
    fn show(&mut self, state: WizardState) {
        self.set_state.set(state);
    }

    fn show_selected_file(&mut self, name: &str, info: &str) {
        self.set_file_name.set(name.to_string());
        self.set_file_info.set(info.to_string());
    }

    fn bind_results(&mut self, view: &ResultsView) {
        self.set_results.set(Some(view.clone()));
    }

    fn show_error(&mut self, message: &str) {
        self.set_error.set(message.to_string());
    }

    fn reset_file_input(&mut self) {
        if let Some(input) = self.file_input.get_untracked() {
            input.set_value("");
        }
    }
}

#[component]
pub fn ReceiptWizard() -> impl IntoView {
    let (state, set_state) = create_signal(WizardState::Landing);
    let (file_name, set_file_name) = create_signal(String::new());
    let (file_info, set_file_info) = create_signal(String::new());
    let (results, set_results) = create_signal(None::<ResultsView>);
    let (error, set_error) = create_signal(String::new());
    let (drop_zone, set_drop_zone) = create_signal(DropZone::default());
    let file_input = create_node_ref::<Input>();

    let wizard = store_value(UploadWizard::<File, _>::new(SignalRenderer {
        set_state,
        set_file_name,
        set_file_info,
        set_results,
        set_error,
        file_input,
    }));

    let select = move |file: File| {
        let name = file.name();
        let at = chrono::Local::now().naive_local();
        wizard.update_value(move |w| {
            w.select_file(&name, file, at);
        });
    };

    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            select(file);
        }
    };

    let on_drag = move |ev: DragEvent, phase: DragPhase| {
        ev.prevent_default();
        ev.stop_propagation();
        set_drop_zone.update(|zone| {
            zone.handle(phase);
        });
        if phase == DragPhase::Drop {
            let dropped = ev
                .data_transfer()
                .and_then(|dt| dt.files())
                .and_then(|files| files.get(0));
            if let Some(file) = dropped {
                select(file);
            }
        }
    };

    let browse = move |_| {
        if let Some(input) = file_input.get_untracked() {
            input.click();
        }
    };

    let on_extract = move |_| {
        let Some(file) = wizard.try_update_value(|w| w.begin_extraction()).flatten() else {
            return;
        };
        log::info!("📤 Uploading receipt for extraction...");
        spawn_local(async move {
            let outcome = extract_receipt(file).await;
            let _ = wizard.try_update_value(move |w| {
                w.finish_extraction(outcome);
            });
        });
    };

    let remove_file = move |_| wizard.update_value(|w| {
        w.remove_file();
    });
    let start_over = move |_| wizard.update_value(|w| {
        w.start_over();
    });
    let retry = move |_| wizard.update_value(|w| {
        w.retry();
    });

    let hidden = move |view: WizardState| move || state.get() != view;
    let field = move |f: fn(&ResultsView) -> String| move || results.get().map(|r| f(&r)).unwrap_or_default();

    view! {
        <div class="receipt-wizard">
            <input
                type="file"
                id="receipt-file-input"
                accept=FILE_ACCEPT
                style="display:none"
                node_ref=file_input
                on:change=on_file_change
            />

            // Landing
            <div id=WizardState::Landing.view_id() class:d-none=hidden(WizardState::Landing)>
                <div
                    class="upload-area"
                    class:highlight=move || drop_zone.get().is_highlighted()
                    on:dragenter=move |ev| on_drag(ev, DragPhase::Enter)
                    on:dragover=move |ev| on_drag(ev, DragPhase::Over)
                    on:dragleave=move |ev| on_drag(ev, DragPhase::Leave)
                    on:drop=move |ev| on_drag(ev, DragPhase::Drop)
                >
                    <div class="upload-icon">"🧾"</div>
                    <div class="upload-text">"Drag and drop your receipt here"</div>
                    <div class="upload-hint">"JPG, JPEG or PNG"</div>
                    <button class="btn btn-primary" on:click=browse>"Browse files"</button>
                </div>
            </div>

            // Preview
            <div id=WizardState::Preview.view_id() class:d-none=hidden(WizardState::Preview)>
                <div class="file-card">
                    <div class="file-name">{move || file_name.get()}</div>
                    <div class="file-info">{move || file_info.get()}</div>
                    <button class="btn btn-link" on:click=remove_file>"Remove file"</button>
                </div>
                <div class="wizard-actions">
                    <button class="btn btn-secondary" on:click=start_over>"Start over"</button>
                    <button
                        class="btn btn-primary"
                        disabled=move || state.get() == WizardState::Loading
                        on:click=on_extract
                    >
                        "Extract"
                    </button>
                </div>
            </div>

            // Loading
            <div id=WizardState::Loading.view_id() class:d-none=hidden(WizardState::Loading)>
                <div class="spinner"></div>
                <p>"Extracting receipt details..."</p>
            </div>

            // Results
            <div id=WizardState::Results.view_id() class:d-none=hidden(WizardState::Results)>
                <div class="results-grid">
                    <img class="receipt-image" alt="Receipt" src=field(|r| r.image_url.clone())/>
                    <div class="receipt-details">
                        <dl>
                            <dt>"Vendor"</dt>
                            <dd id="vendor-name">{field(|r| r.vendor.clone())}</dd>
                            <dt>"Date"</dt>
                            <dd id="receipt-date">{field(|r| r.date.clone())}</dd>
                            <dt>"Currency"</dt>
                            <dd id="receipt-currency">{field(|r| r.currency.clone())}</dd>
                        </dl>
                        <table class="table">
                            <thead>
                                <tr><th>"Item"</th><th>"Cost"</th></tr>
                            </thead>
                            <tbody id="receipt-items">
                                {move || match results.get().map(|r| r.rows) {
                                    Some(ItemRows::Items(rows)) => rows
                                        .into_iter()
                                        .map(|row| view! { <tr><td>{row.name}</td><td>{row.cost}</td></tr> })
                                        .collect_view(),
                                    _ => view! {
                                        <tr><td colspan="2" class="text-center">{NO_ITEMS}</td></tr>
                                    }
                                    .into_view(),
                                }}
                            </tbody>
                            <tfoot>
                                <tr><th>"Tax"</th><td id="receipt-tax">{field(|r| r.tax.clone())}</td></tr>
                                <tr><th>"Total"</th><td id="receipt-total">{field(|r| r.total.clone())}</td></tr>
                            </tfoot>
                        </table>
                    </div>
                </div>
                <div class="wizard-actions">
                    <button class="btn btn-secondary" on:click=start_over>"Start over"</button>
                </div>
            </div>

            // Error
            <div id=WizardState::Error.view_id() class:d-none=hidden(WizardState::Error)>
                <div class="error-message">{move || error.get()}</div>
                <div class="wizard-actions">
                    <button class="btn btn-secondary" on:click=start_over>"Start over"</button>
                    <button class="btn btn-primary" on:click=retry>"Try again"</button>
                </div>
            </div>
        </div>
    }
}
