//! Finance assistant chat panel.

use gloo_timers::future::TimeoutFuture;
use leptos::*;
use web_sys::KeyboardEvent;

use crate::assistant::Transcript;
use crate::config::ASSISTANT_REPLY_DELAY_MS;

#[component]
pub fn AssistantPanel() -> impl IntoView {
    let (query, set_query) = create_signal(String::new());
    let (transcript, set_transcript) = create_signal(Transcript::default());

    let submit = move || {
        let text = query.get_untracked();
        let mut asked = None;
        set_transcript.update(|t| asked = t.submit(&text));
        let Some(asked) = asked else {
            return;
        };
        set_query.set(String::new());
        spawn_local(async move {
            TimeoutFuture::new(ASSISTANT_REPLY_DELAY_MS).await;
            set_transcript.update(|t| t.answer(&asked));
        });
    };

    let on_key = move |ev: KeyboardEvent| {
        if ev.key() == "Enter" {
            ev.prevent_default();
            submit();
        }
    };

    view! {
        <div class="card ai-assistant">
            <div class="card-header">"Finance Assistant"</div>
            <div class="card-body">
                <div id="ai-messages" class="ai-messages">
                    <For
                        each=move || transcript.get().messages().to_vec().into_iter().enumerate()
                        key=|(i, _)| *i
                        children=|(_, message)| view! {
                            <div class=message.speaker.css_class()>
                                <strong>{message.speaker.label()}</strong>
                                {message.lines.into_iter().map(|line| view! { <p>{line}</p> }).collect_view()}
                            </div>
                        }
                    />
                </div>
                <div class="input-group">
                    <input
                        type="text"
                        class="form-control"
                        placeholder="Ask about your finances..."
                        prop:value=move || query.get()
                        on:input=move |ev| set_query.set(event_target_value(&ev))
                        on:keypress=on_key
                    />
                    <button class="btn btn-primary" on:click=move |_| submit()>"Ask"</button>
                </div>
            </div>
        </div>
    }
}
