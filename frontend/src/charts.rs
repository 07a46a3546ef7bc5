//! Dashboard charts.
//!
//! The dashboard shows static sample figures. This module holds those
//! datasets and draws them with `plotters` onto any drawing area; the
//! dashboard hands it a canvas, tests hand it an SVG string.

use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;

/// Category axis of six months.
type MonthAxis = SegmentValue<u32>;

/// `$` + value, as on the revenue axis.
pub fn dollar_tick(value: f64) -> String {
    format!("${}", value)
}

/// `$0`, `$500`, `$14k`, `$2.5k`, as on the cash flow axis.
pub fn thousands_tick(value: f64) -> String {
    if value == 0.0 {
        "$0".to_string()
    } else if value >= 1000.0 {
        format!("${}k", value / 1000.0)
    } else {
        format!("${}", value)
    }
}

/// Label of a segment on a month axis; empty past the last month.
pub fn month_label(value: &MonthAxis, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i as usize).map(|l| l.to_string()).unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

/// CSS color for the HTML legends.
pub fn css_color(color: RGBColor, alpha: f64) -> String {
    format!("rgba({}, {}, {}, {})", color.0, color.1, color.2, alpha)
}

fn draw_error(e: impl std::fmt::Display) -> String {
    e.to_string()
}

/// Top of the value axis: 10% headroom above the largest value.
fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

const GRID: RGBColor = RGBColor(233, 236, 239);

// =============================================================================
// Line chart
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct LineData {
    pub label: &'static str,
    pub values: Vec<f64>,
    pub color: RGBColor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineChart {
    pub labels: Vec<&'static str>,
    pub series: Vec<LineData>,
}

impl LineChart {
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// Revenue and expenses, January to June.
pub fn revenue_overview() -> LineChart {
    LineChart {
        labels: vec!["Jan", "Feb", "Mar", "Apr", "May", "Jun"],
        series: vec![
            LineData {
                label: "Revenue",
                values: vec![3000.0, 6500.0, 6000.0, 8000.0, 9500.0, 12000.0],
                color: RGBColor(13, 110, 253),
            },
            LineData {
                label: "Expenses",
                values: vec![2000.0, 4000.0, 3800.0, 5500.0, 6500.0, 7500.0],
                color: RGBColor(123, 128, 254),
            },
        ],
    }
}

/// Filled line chart with `$value` ticks.
pub fn draw_line_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &LineChart,
) -> Result<(), String> {
    root.fill(&WHITE).map_err(draw_error)?;
    let months = data.labels.len() as u32;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(28)
        .y_label_area_size(56)
        .build_cartesian_2d((0..months).into_segmented(), 0.0..headroom(data.max_value()))
        .map_err(draw_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(&WHITE)
        .bold_line_style(&GRID)
        .y_labels(6)
        .y_label_formatter(&|v| dollar_tick(*v))
        .x_label_formatter(&|v| month_label(v, &data.labels))
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(draw_error)?;

    for series in &data.series {
        let points = || {
            series
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| (SegmentValue::CenterOf(i as u32), *v))
        };
        chart
            .draw_series(AreaSeries::new(points(), 0.0, &series.color.mix(0.2)))
            .map_err(draw_error)?;
        chart
            .draw_series(LineSeries::new(points(), series.color.stroke_width(2)))
            .map_err(draw_error)?;
    }

    root.present().map_err(draw_error)
}

// =============================================================================
// Bar chart
// =============================================================================

/// A bar series; `None` leaves the month empty.
#[derive(Clone, Debug, PartialEq)]
pub struct BarData {
    pub label: &'static str,
    pub values: Vec<Option<f64>>,
    pub color: RGBColor,
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarChart {
    pub labels: Vec<&'static str>,
    pub series: Vec<BarData>,
}

impl BarChart {
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .fold(0.0, f64::max)
    }
}

/// Actual and projected cash flow, July to December.
pub fn cash_flow() -> BarChart {
    BarChart {
        labels: vec!["Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
        series: vec![
            BarData {
                label: "Actual",
                values: vec![Some(11000.0), Some(13000.0)],
                color: RGBColor(13, 110, 253),
                opacity: 1.0,
            },
            BarData {
                label: "Projected",
                values: vec![None, None, Some(14000.0), Some(16000.0), Some(19000.0), Some(22000.0)],
                color: RGBColor(13, 110, 253),
                opacity: 0.4,
            },
        ],
    }
}

/// Bar chart with `$Nk` ticks. Series must not share a month.
pub fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &BarChart,
) -> Result<(), String> {
    root.fill(&WHITE).map_err(draw_error)?;
    let months = data.labels.len() as u32;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(28)
        .y_label_area_size(56)
        .build_cartesian_2d((0..months).into_segmented(), 0.0..headroom(data.max_value()))
        .map_err(draw_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(&WHITE)
        .bold_line_style(&GRID)
        .y_labels(6)
        .y_label_formatter(&|v| thousands_tick(*v))
        .x_label_formatter(&|v| month_label(v, &data.labels))
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(draw_error)?;

    for series in &data.series {
        let style = series.color.mix(series.opacity).filled();
        let bars = series
            .values
            .iter()
            .enumerate()
            .take(months as usize)
            .filter_map(|(i, v)| v.map(|v| (i as u32, v)))
            .map(move |(i, v)| {
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                    style,
                );
                bar.set_margin(0, 0, 8, 8);
                bar
            });
        chart.draw_series(bars).map_err(draw_error)?;
    }

    root.present().map_err(draw_error)
}

// =============================================================================
// Doughnut chart
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Slice {
    pub label: &'static str,
    pub value: f64,
    pub color: RGBColor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DoughnutChart {
    pub slices: Vec<Slice>,
    /// Inner radius as a fraction of the outer radius
    pub cutout: f64,
}

/// Expense breakdown by category, in percent.
pub fn expense_breakdown() -> DoughnutChart {
    DoughnutChart {
        slices: vec![
            Slice { label: "Operations", value: 35.0, color: RGBColor(13, 202, 240) },
            Slice { label: "Marketing", value: 25.0, color: RGBColor(123, 128, 254) },
            Slice { label: "Payroll", value: 20.0, color: RGBColor(255, 145, 26) },
            Slice { label: "Equipment", value: 10.0, color: RGBColor(25, 135, 84) },
            Slice { label: "Other", value: 10.0, color: RGBColor(108, 117, 125) },
        ],
        cutout: 0.65,
    }
}

/// Doughnut centered in `root`, starting at 12 o'clock. Labels are left to
/// the HTML legend.
pub fn draw_doughnut<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &DoughnutChart,
) -> Result<(), String> {
    root.fill(&WHITE).map_err(draw_error)?;

    let (width, height) = root.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) / 2.0 - 4.0;

    let sizes: Vec<f64> = data.slices.iter().map(|s| s.value.max(0.0)).collect();
    if sizes.iter().sum::<f64>() <= 0.0 {
        return root.present().map_err(draw_error);
    }
    let colors: Vec<RGBColor> = data.slices.iter().map(|s| s.color).collect();
    let labels: Vec<&str> = data.slices.iter().map(|_| "").collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.donut_hole(radius * data.cutout);
    root.draw(&pie).map_err(draw_error)?;

    root.present().map_err(draw_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(draw: impl FnOnce(&DrawingArea<SVGBackend, Shift>) -> Result<(), String>) -> String {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (480, 240)).into_drawing_area();
            draw(&root).unwrap();
        }
        svg
    }

    #[test]
    fn test_tick_labels() {
        assert_eq!(dollar_tick(3000.0), "$3000");
        assert_eq!(thousands_tick(0.0), "$0");
        assert_eq!(thousands_tick(500.0), "$500");
        assert_eq!(thousands_tick(14000.0), "$14k");
        assert_eq!(thousands_tick(2500.0), "$2.5k");
    }

    #[test]
    fn test_month_labels() {
        let labels = cash_flow().labels;
        assert_eq!(month_label(&SegmentValue::CenterOf(0), &labels), "Jul");
        assert_eq!(month_label(&SegmentValue::Exact(5), &labels), "Dec");
        assert_eq!(month_label(&SegmentValue::CenterOf(6), &labels), "");
        assert_eq!(month_label(&SegmentValue::Last, &labels), "");
    }

    #[test]
    fn test_revenue_dataset() {
        let chart = revenue_overview();
        assert_eq!(chart.labels.first(), Some(&"Jan"));
        assert_eq!(chart.labels.last(), Some(&"Jun"));
        assert!(chart.series.iter().all(|s| s.values.len() == chart.labels.len()));
        assert_eq!(chart.max_value(), 12000.0);
    }

    #[test]
    fn test_cash_flow_dataset() {
        let chart = cash_flow();
        assert_eq!(chart.max_value(), 22000.0);
        // actual for Jul and Aug, projected from Sep
        assert_eq!(chart.series[0].values.len(), 2);
        assert_eq!(chart.series[1].values.iter().flatten().count(), 4);
        assert_eq!(chart.series[1].values[2], Some(14000.0));
    }

    #[test]
    fn test_expense_breakdown_dataset() {
        let chart = expense_breakdown();
        let total: f64 = chart.slices.iter().map(|s| s.value).sum();
        assert_eq!(total, 100.0);
        assert_eq!(chart.slices[0].label, "Operations");
        assert_eq!(chart.cutout, 0.65);
        assert_eq!(css_color(chart.slices[2].color, 1.0), "rgba(255, 145, 26, 1)");
    }

    #[test]
    fn test_charts_render() {
        let bars = render(|root| draw_bar_chart(root, &cash_flow()));
        assert!(bars.contains("<svg"));
        assert!(bars.contains("$0"));
        assert!(bars.contains("Jul"));

        let lines = render(|root| draw_line_chart(root, &revenue_overview()));
        assert!(lines.contains("Jan"));

        let ring = render(|root| draw_doughnut(root, &expense_breakdown()));
        assert!(ring.contains("<svg"));
    }
}
