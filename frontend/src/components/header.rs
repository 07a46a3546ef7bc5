//! Navigation bar

use leptos::*;
use leptos_router::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header>
            <div class="header-left">
                <A href="/" class="logo">"Cash Flow Agent"</A>
            </div>
            <nav class="header-right">
                <A href="/" exact=true class="nav-link">"Dashboard"</A>
                <A href="/forecast" class="nav-link">"Forecast"</A>
                <A href="/receipts" class="nav-link">"Receipts"</A>
            </nav>
        </header>
    }
}
