use super::filter::{industry_peer_average, CompanyView};
use super::model::UnifiedTable;
use super::schema::TechDimension;
use crate::color::{generate_palette, palette_color, Rgb, PRIMARY, SECONDARY};

/// One line of a trend chart: `(year, value)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub name: String,
    pub points: Vec<(i32, f64)>,
    pub color: Rgb,
    /// Drawn dashed (industry averages).
    pub dashed: bool,
    /// Value labels next to the markers.
    pub annotated: bool,
}

impl TrendSeries {
    fn company(name: String, points: Vec<(i32, f64)>, color: Rgb) -> Self {
        Self {
            name,
            points,
            color,
            dashed: false,
            annotated: true,
        }
    }

    fn average(name: String, points: Vec<(i32, f64)>, color: Rgb) -> Self {
        Self {
            name,
            points,
            color,
            dashed: true,
            annotated: false,
        }
    }
}

/// A titled set of series over years.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<TrendSeries>,
}

impl TrendChart {
    /// No series has any point.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// `(min, max)` over all years, `None` when empty.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let years = self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
        let min = years.clone().min()?;
        let max = years.max()?;
        Some((min, max))
    }

    /// Largest value across all series, `None` when empty.
    pub fn max_value(&self) -> Option<f64> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }
}

// ---------------------------------------------------------------------------
// Charts of a company view
// ---------------------------------------------------------------------------

/// Company total word frequency against the industry average.
pub fn total_frequency_chart(view: &CompanyView) -> TrendChart {
    let name = view.company_name();
    let mut series = Vec::new();
    if !view.records.is_empty() {
        series.push(TrendSeries::company(
            format!("{name} total word frequency"),
            view.records
                .iter()
                .map(|r| (r.year, r.total_word_freq as f64))
                .collect(),
            PRIMARY,
        ));
    }
    if !view.peer_average.is_empty() {
        series.push(TrendSeries::average(
            format!("{} industry average", view.industry_label),
            view.peer_average
                .iter()
                .map(|p| (p.year, p.mean_total_word_freq))
                .collect(),
            SECONDARY,
        ));
    }
    TrendChart {
        title: format!(
            "{name} total word frequency ({}-{})",
            view.selection.year_start, view.selection.year_end
        ),
        x_label: "Year".into(),
        y_label: "Total word frequency".into(),
        series,
    }
}

/// Company transformation index against the industry average, plus one
/// average line per extra industry that has data in the range.
pub fn index_comparison_chart(
    table: &UnifiedTable,
    view: &CompanyView,
    extra_industries: &[String],
) -> TrendChart {
    let name = view.company_name();
    let mut series = Vec::new();
    if !view.records.is_empty() {
        series.push(TrendSeries::company(
            format!("{name} transformation index"),
            view.records
                .iter()
                .map(|r| (r.year, r.transformation_index))
                .collect(),
            PRIMARY,
        ));
    }
    if !view.peer_average.is_empty() {
        series.push(TrendSeries::average(
            format!("{} industry average index", view.industry_label),
            view.peer_average
                .iter()
                .map(|p| (p.year, p.mean_transformation_index))
                .collect(),
            SECONDARY,
        ));
    }

    let extra_colors = generate_palette(extra_industries.len());
    for (industry, color) in extra_industries.iter().zip(extra_colors) {
        let points: Vec<(i32, f64)> = industry_peer_average(
            table,
            industry,
            view.selection.year_start,
            view.selection.year_end,
        )
        .into_iter()
        .map(|p| (p.year, p.mean_transformation_index))
        .collect();
        if !points.is_empty() {
            series.push(TrendSeries::average(
                format!("{industry} industry average"),
                points,
                color,
            ));
        }
    }

    TrendChart {
        title: format!("{name} vs industry transformation index"),
        x_label: "Year".into(),
        y_label: "Transformation index".into(),
        series,
    }
}

/// One company line per chosen technology dimension.
pub fn dimension_chart(view: &CompanyView, dimensions: &[TechDimension]) -> TrendChart {
    let series = if view.records.is_empty() {
        Vec::new()
    } else {
        dimensions
            .iter()
            .enumerate()
            .map(|(i, &dim)| TrendSeries {
                name: dim.label().to_string(),
                points: view
                    .records
                    .iter()
                    .map(|r| (r.year, r.dimensions.get(dim)))
                    .collect(),
                color: palette_color(i),
                dashed: false,
                annotated: false,
            })
            .collect()
    };
    TrendChart {
        title: format!("{} technology dimension word frequency", view.company_name()),
        x_label: "Year".into(),
        y_label: "Word frequency".into(),
        series,
    }
}
