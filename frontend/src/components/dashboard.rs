//! Dashboard page: sample charts drawn onto canvases.

use leptos::html::Canvas;
use leptos::*;
use plotters::coord::Shift;
use plotters::prelude::{DrawingArea, IntoDrawingArea};
use plotters_canvas::CanvasBackend;
use web_sys::HtmlCanvasElement;

use crate::charts::{
    cash_flow, css_color, draw_bar_chart, draw_doughnut, draw_line_chart, expense_breakdown,
    revenue_overview,
};

type CanvasArea = DrawingArea<CanvasBackend, Shift>;

#[component]
pub fn Dashboard() -> impl IntoView {
    view! {
        <div class="dashboard">
            <div class="row">
                <div class="card chart-card wide">
                    <div class="card-header">"Revenue Overview"</div>
                    <RevenueChart/>
                </div>
                <div class="card chart-card">
                    <div class="card-header">"Expense Breakdown"</div>
                    <ExpenseChart/>
                </div>
            </div>
            <div class="card chart-card">
                <div class="card-header">"Cash Flow Forecast"</div>
                <CashFlowChart/>
            </div>
        </div>
    }
}

/// Run `draw` on the canvas once it exists.
fn draw_on_load(node: NodeRef<Canvas>, name: &'static str, draw: impl FnOnce(&CanvasArea) -> Result<(), String> + 'static) {
    node.on_load(move |canvas| {
        let element: &HtmlCanvasElement = &canvas;
        let Some(backend) = CanvasBackend::with_canvas_object(element.clone()) else {
            log::warn!("⚠️ No 2D context for the {} chart", name);
            return;
        };
        if let Err(e) = draw(&backend.into_drawing_area()) {
            log::error!("❌ Failed to draw the {} chart: {}", name, e);
        }
    });
}

fn legend(entries: Vec<(&'static str, String)>) -> impl IntoView {
    view! {
        <ul class="chart-legend">
            {entries
                .into_iter()
                .map(|(label, color)| view! {
                    <li>
                        <span class="swatch" style={format!("background:{}", color)}></span>
                        {label}
                    </li>
                })
                .collect_view()}
        </ul>
    }
}

#[component]
fn RevenueChart() -> impl IntoView {
    let chart = revenue_overview();
    let entries = chart.series.iter().map(|s| (s.label, css_color(s.color, 1.0))).collect();
    let node = create_node_ref::<Canvas>();
    draw_on_load(node, "revenue", move |root| draw_line_chart(root, &chart));

    view! {
        <canvas class="chart" node_ref=node width="480" height="240"></canvas>
        {legend(entries)}
    }
}

#[component]
fn CashFlowChart() -> impl IntoView {
    let chart = cash_flow();
    let entries = chart
        .series
        .iter()
        .map(|s| (s.label, css_color(s.color, s.opacity)))
        .collect();
    let node = create_node_ref::<Canvas>();
    draw_on_load(node, "cash flow", move |root| draw_bar_chart(root, &chart));

    view! {
        <canvas class="chart" node_ref=node width="480" height="240"></canvas>
        {legend(entries)}
    }
}

#[component]
fn ExpenseChart() -> impl IntoView {
    let chart = expense_breakdown();
    let entries = chart.slices.iter().map(|s| (s.label, css_color(s.color, 1.0))).collect();
    let node = create_node_ref::<Canvas>();
    draw_on_load(node, "expense", move |root| draw_doughnut(root, &chart));

    view! {
        <canvas class="chart doughnut" node_ref=node width="200" height="200"></canvas>
        {legend(entries)}
    }
}
