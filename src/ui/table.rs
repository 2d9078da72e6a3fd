use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use digiscope::export::table::{export_headers, export_row};

use crate::state::AppState;

/// Per-year rows of the selected company, same columns as the exports.
pub fn detail_table(ui: &mut Ui, state: &AppState) {
    let Some(view) = state.populated_view() else {
        return;
    };

    ui.strong("Detailed data");
    let headers = export_headers();
    let rows: Vec<Vec<String>> = view.records.iter().map(export_row).collect();

    ui.push_id("detail_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .columns(Column::auto().at_least(56.0), headers.len())
            .header(20.0, |mut header| {
                for name in &headers {
                    header.col(|ui| {
                        ui.strong(*name);
                    });
                }
            })
            .body(|mut body| {
                for cells in &rows {
                    body.row(18.0, |mut row| {
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}
