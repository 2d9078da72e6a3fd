/// Exports of a company view: CSV / XLSX tables, SVG charts and the HTML
/// report that embeds them.
pub mod chart;
pub mod report;
pub mod table;

/// Default file name (without extension) for exports of one selection.
///
/// Path separators in the company name are replaced so the stem is always a
/// single path component.
pub fn file_stem(company_name: &str, year_start: i32, year_end: i32) -> String {
    let safe: String = company_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    format!("{safe}_{year_start}-{year_end}_transformation")
}
