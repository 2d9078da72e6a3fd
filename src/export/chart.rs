use anyhow::{anyhow, Result};
use plotters::prelude::*;

use crate::color::Rgb;
use crate::data::series::TrendChart;

pub const CHART_WIDTH: u32 = 900;
pub const CHART_HEIGHT: u32 = 500;

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Render a trend chart as a standalone SVG document.
///
/// An empty chart still renders (axes over the default year range), so a
/// report always has both images.
pub fn render_svg(chart: &TrendChart) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("filling chart: {e}"))?;

        let (first_year, last_year) = chart.year_bounds().unwrap_or((2010, 2011));
        let y_max = match chart.max_value() {
            Some(v) if v > 0.0 => v * 1.15,
            _ => 1.0,
        };

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 22))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(64)
            .build_cartesian_2d((first_year - 1)..(last_year + 1), 0f64..y_max)
            .map_err(|e| anyhow!("building chart: {e}"))?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(((last_year - first_year + 3).max(2)) as usize)
            .x_label_formatter(&|year: &i32| year.to_string())
            .draw()
            .map_err(|e| anyhow!("drawing mesh: {e}"))?;

        for series in &chart.series {
            let color = rgb(series.color);
            let width = if series.dashed { 2 } else { 3 };
            ctx.draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(width),
            ))
            .map_err(|e| anyhow!("drawing {}: {e}", series.name))?
            .label(series.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));

            ctx.draw_series(
                series
                    .points
                    .iter()
                    .map(|&(year, value)| Circle::new((year, value), 4, color.filled())),
            )
            .map_err(|e| anyhow!("drawing markers of {}: {e}", series.name))?;

            if series.annotated {
                ctx.draw_series(series.points.iter().map(|&(year, value)| {
                    Text::new(
                        format_value(value),
                        (year, value),
                        ("sans-serif", 13).into_font().color(&BLACK),
                    )
                }))
                .map_err(|e| anyhow!("labelling {}: {e}", series.name))?;
            }
        }

        if !chart.series.is_empty() {
            ctx.configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK)
                .draw()
                .map_err(|e| anyhow!("drawing legend: {e}"))?;
        }

        root.present().map_err(|e| anyhow!("finishing chart: {e}"))?;
    }
    Ok(svg)
}

/// Whole numbers without decimals, everything else with two.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
