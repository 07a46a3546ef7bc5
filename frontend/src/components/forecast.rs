//! Cash flow forecast page.

use leptos::*;

use crate::config::FORECAST_PERIODS;
use crate::services::{bundle_key, fetch_all_forecasts, fetch_forecast, ForecastCard};

#[component]
pub fn ForecastPage() -> impl IntoView {
    view! {
        <div class="forecast-page">
            <h2>"Cash Flow Forecast"</h2>
            <div class="forecast-grid">
                {FORECAST_PERIODS
                    .iter()
                    .map(|days| view! { <ForecastPeriod days=*days/> })
                    .collect_view()}
            </div>
            <AllForecasts/>
        </div>
    }
}

/// One horizon with its own button, loading indicator and result area.
#[component]
fn ForecastPeriod(days: u32) -> impl IntoView {
    let (loading, set_loading) = create_signal(false);
    let (card, set_card) = create_signal(None::<ForecastCard>);

    let generate = move |_| {
        set_loading.set(true);
        set_card.set(None);
        spawn_local(async move {
            log::info!("📈 Requesting {}-day forecast", days);
            let next = match fetch_forecast(days).await {
                Ok(report) => ForecastCard::from_report(Some(&report)),
                Err(e) => {
                    log::error!("❌ Forecast request failed: {}", e);
                    ForecastCard::from_error(&e)
                }
            };
            set_card.set(Some(next));
            set_loading.set(false);
        });
    };

    view! {
        <div class="card forecast-period">
            <div class="card-header">{format!("{}-Day Forecast", days)}</div>
            <div class="card-body">
                <button class="btn btn-primary" disabled=move || loading.get() on:click=generate>
                    {format!("Generate {}-Day Forecast", days)}
                </button>
                <Show when=move || loading.get() fallback=|| view! {}>
                    <div class="loading-indicator">
                        <div class="spinner"></div>
                        <span>"Generating forecast..."</span>
                    </div>
                </Show>
                {move || card.get().map(|card| view! { <ForecastCardView card=card/> })}
            </div>
        </div>
    }
}

/// The "Generate All Forecasts" button and its accordion.
#[component]
fn AllForecasts() -> impl IntoView {
    let (loading, set_loading) = create_signal(false);
    let (outcome, set_outcome) = create_signal(None::<Result<Vec<(u32, ForecastCard)>, ForecastCard>>);

    let generate = move |_| {
        set_loading.set(true);
        set_outcome.set(None);
        spawn_local(async move {
            log::info!("📈 Requesting all forecasts");
            let next = match fetch_all_forecasts().await {
                Ok(bundle) => Ok(FORECAST_PERIODS
                    .iter()
                    .map(|days| (*days, ForecastCard::from_report(bundle.get(&bundle_key(*days)))))
                    .collect()),
                Err(e) => {
                    log::error!("❌ Forecast request failed: {}", e);
                    Err(ForecastCard::from_error(&e))
                }
            };
            set_outcome.set(Some(next));
            set_loading.set(false);
        });
    };

    view! {
        <div class="all-forecasts">
            <button class="btn btn-success" disabled=move || loading.get() on:click=generate>
                "Generate All Forecasts"
            </button>
            <Show when=move || loading.get() fallback=|| view! {}>
                <div class="loading-indicator">
                    <div class="spinner"></div>
                    <span>"Generating all forecasts..."</span>
                </div>
            </Show>
            {move || match outcome.get() {
                None => ().into_view(),
                Some(Err(card)) => view! { <ForecastCardView card=card/> }.into_view(),
                Some(Ok(cards)) => view! {
                    <div class="accordion">
                        {cards
                            .into_iter()
                            .map(|(days, card)| view! { <AccordionPanel days=days card=card open={days == 30}/> })
                            .collect_view()}
                    </div>
                }
                .into_view(),
            }}
        </div>
    }
}

#[component]
fn AccordionPanel(days: u32, card: ForecastCard, open: bool) -> impl IntoView {
    let (expanded, set_expanded) = create_signal(open);

    view! {
        <div class="accordion-item">
            <button
                class="accordion-button"
                class:collapsed=move || !expanded.get()
                on:click=move |_| set_expanded.update(|e| *e = !*e)
            >
                {format!("{}-Day Forecast", days)}
            </button>
            <div class="accordion-body" class:d-none=move || !expanded.get()>
                <ForecastCardView card=card/>
            </div>
        </div>
    }
}

#[component]
fn ForecastCardView(card: ForecastCard) -> impl IntoView {
    match card {
        ForecastCard::Failed(message) => view! {
            <div class="alert alert-danger">{format!("Error: {}", message)}</div>
        }
        .into_view(),
        ForecastCard::Ready { start, end, balance, text } => view! {
            <div class="forecast-result">
                <p>
                    <strong>"Forecast Period: "</strong>
                    {format!("{} to {}", start, end)}
                </p>
                <p>
                    <strong>"Current Balance: "</strong>
                    {balance}
                </p>
                <pre class="forecast-text">{text}</pre>
            </div>
        }
        .into_view(),
    }
}
