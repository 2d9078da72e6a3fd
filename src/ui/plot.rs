use eframe::egui::{Align2, Color32, RichText, Ui};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, Points, Text};

use digiscope::color::Rgb;
use digiscope::data::series::{
    dimension_chart, index_comparison_chart, total_frequency_chart, TrendChart,
};
use digiscope::data::summary::CompanySummary;
use digiscope::export::chart::format_value;

use crate::state::{AppState, TrendTab};

const PLOT_HEIGHT: f32 = 320.0;

fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

pub fn metrics(ui: &mut Ui, state: &AppState) {
    let Some(summary) = state.populated_view().and_then(CompanySummary::from_view) else {
        return;
    };

    ui.heading(format!(
        "{}  ({})  {}",
        summary.company_name,
        summary.stock_code,
        summary.year_range()
    ));
    ui.columns(4, |cols| {
        metric(&mut cols[0], "Industry", &summary.industry_label);
        metric(&mut cols[1], "Records", &summary.record_count.to_string());
        metric(
            &mut cols[2],
            "Mean total word frequency",
            &format!("{:.2}", summary.mean_total_word_freq),
        );
        metric(
            &mut cols[3],
            "Transformation index (mean / max / min)",
            &format!(
                "{:.4} / {:.4} / {:.4}",
                summary.mean_transformation_index,
                summary.max_transformation_index,
                summary.min_transformation_index
            ),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).size(18.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Trend charts
// ---------------------------------------------------------------------------

/// Company trend: total word frequency or selected dimensions.
pub fn trend_section(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.selectable_value(
            &mut state.trend_tab,
            TrendTab::TotalFrequency,
            "Total word frequency",
        );
        ui.selectable_value(&mut state.trend_tab, TrendTab::Dimensions, "Technology dimensions");
    });

    let Some(view) = state.populated_view() else {
        return;
    };
    let chart = match state.trend_tab {
        TrendTab::TotalFrequency => total_frequency_chart(view),
        TrendTab::Dimensions => dimension_chart(view, &state.dimensions),
    };
    show_chart(ui, "trend_plot", &chart);
}

/// Company index against its industry (and any extra industries).
pub fn comparison_section(ui: &mut Ui, state: &AppState) {
    let (Some(table), Some(view)) = (state.table.as_ref(), state.populated_view()) else {
        return;
    };
    let chart = index_comparison_chart(table, view, &state.extra_industries);
    show_chart(ui, "comparison_plot", &chart);
}

fn show_chart(ui: &mut Ui, id: &str, chart: &TrendChart) {
    ui.strong(&chart.title);
    if chart.is_empty() {
        ui.label("Nothing to plot for this selection.");
        return;
    }

    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let color = color32(series.color);
                let points = || -> PlotPoints {
                    series
                        .points
                        .iter()
                        .map(|&(year, value)| [f64::from(year), value])
                        .collect()
                };

                let mut line = Line::new(points())
                    .name(&series.name)
                    .color(color)
                    .width(2.0);
                if series.dashed {
                    line = line.style(LineStyle::dashed_loose());
                }
                plot_ui.line(line);
                plot_ui.points(
                    Points::new(points())
                        .name(&series.name)
                        .color(color)
                        .radius(3.5),
                );

                if series.annotated {
                    for &(year, value) in &series.points {
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(f64::from(year), value),
                                format_value(value),
                            )
                            .anchor(Align2::CENTER_BOTTOM)
                            .color(color),
                        );
                    }
                }
            }
        });
}
