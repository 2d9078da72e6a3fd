use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use digiscope::data::schema::TechDimension;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selection");
    ui.separator();

    if state.table.is_none() {
        ui.label("No dataset loaded.");
        data_source(ui, state);
        return;
    }

    // Clone what we need so we can mutate state inside the closures.
    let companies = state.company_options.clone();
    let years = state.years.clone();
    let industries = state.industry_options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Company ----
            ui.strong("Company");
            let current = state.selected_company.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("company")
                .selected_text(&current)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for key in &companies {
                        if ui.selectable_label(current == *key, key).clicked() {
                            state.select_company(key.clone());
                        }
                    }
                });
            ui.add_space(6.0);

            // ---- Year range ----
            ui.strong("Years");
            ui.horizontal(|ui: &mut Ui| {
                if let Some(year) = year_combo(ui, "year_start", state.year_start, &years) {
                    state.set_year_start(year);
                }
                ui.label("to");
                if let Some(year) = year_combo(ui, "year_end", state.year_end, &years) {
                    state.set_year_end(year);
                }
            });
            if state.year_start > state.year_end {
                ui.label(RichText::new("Start year is after end year").color(Color32::RED));
            }
            ui.separator();

            // ---- Technology dimensions ----
            let header = format!(
                "Technology dimensions  ({}/{})",
                state.dimensions.len(),
                TechDimension::ALL.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("dimensions")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for dim in TechDimension::ALL {
                        let mut checked = state.dimensions.contains(&dim);
                        if ui.checkbox(&mut checked, dim.label()).changed() {
                            state.toggle_dimension(dim);
                        }
                    }
                });

            // ---- Extra industries for the comparison chart ----
            let header = format!(
                "Compare industries  ({}/{})",
                state.extra_industries.len(),
                industries.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("industries")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    if industries.is_empty() {
                        ui.label("No classified industries.");
                    }
                    for industry in &industries {
                        let mut checked = state.extra_industries.contains(industry);
                        if ui.checkbox(&mut checked, industry).changed() {
                            state.toggle_industry(industry);
                        }
                    }
                });

            ui.separator();
            data_source(ui, state);
        });
}

/// Year picker; returns the newly chosen year.
fn year_combo(ui: &mut Ui, id: &str, current: i32, years: &[i32]) -> Option<i32> {
    let mut chosen = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.to_string())
        .width(72.0)
        .show_ui(ui, |ui: &mut Ui| {
            for &year in years {
                if ui
                    .selectable_label(current == year, year.to_string())
                    .clicked()
                {
                    chosen = Some(year);
                }
            }
        });
    chosen.filter(|year| *year != current)
}

fn data_source(ui: &mut Ui, state: &AppState) {
    egui::CollapsingHeader::new("Data source")
        .id_salt("data_source")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label(format!("Directory: {}", state.config.data_dir.display()));
            ui.label(format!("Primary: {}", state.config.primary_file.display()));
            ui.label(format!("Industry: {}", state.config.secondary_file.display()));
            ui.label(format!("Year cutoff: >= {}", state.config.year_cutoff));
            if let Some(table) = &state.table {
                ui.label(format!("{} records", table.len()));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload data").clicked() {
                state.reload(true);
                ui.close_menu();
            }
        });

        let can_export = state.populated_view().is_some();
        ui.add_enabled_ui(can_export, |ui: &mut Ui| {
            ui.menu_button("Export", |ui: &mut Ui| {
                if ui.button("CSV…").clicked() {
                    ui.close_menu();
                    export_csv_dialog(state);
                }
                if ui.button("Excel…").clicked() {
                    ui.close_menu();
                    export_xlsx_dialog(state);
                }
                if ui.button("Report…").clicked() {
                    ui.close_menu();
                    export_report_dialog(state);
                }
            });
        });

        ui.separator();

        if let Some(msg) = &state.status_message {
            let color = if state.status_is_error {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });

    for warning in &state.warnings {
        ui.label(RichText::new(warning).color(Color32::from_rgb(0xE6, 0x7E, 0x22)));
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn save_dialog(state: &AppState, title: &str, filter: &str, extension: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(format!("{}.{extension}", state.export_stem()))
        .add_filter(filter, &[extension])
        .save_file()
}

pub fn export_csv_dialog(state: &mut AppState) {
    if let Some(path) = save_dialog(state, "Export CSV", "CSV", "csv") {
        let result = state.export_csv(&path);
        state.report_result("CSV export", result);
    }
}

pub fn export_xlsx_dialog(state: &mut AppState) {
    if let Some(path) = save_dialog(state, "Export Excel", "Excel workbook", "xlsx") {
        let result = state.export_xlsx(&path);
        state.report_result("Excel export", result);
    }
}

pub fn export_report_dialog(state: &mut AppState) {
    if let Some(path) = save_dialog(state, "Export report", "HTML report", "html") {
        let result = state.export_report(&path);
        state.report_result("Report export", result);
    }
}
