use std::sync::Arc;

use eframe::egui::{self, FontData, FontDefinitions, FontFamily};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

/// System fonts that cover CJK company and industry names.
const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DigiscopeApp {
    pub state: AppState,
}

impl DigiscopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        install_cjk_font(&cc.egui_ctx);
        Self { state }
    }
}

/// Append the first available CJK font as a fallback to both families.
fn install_cjk_font(ctx: &egui::Context) {
    let Some((path, bytes)) = CJK_FONT_CANDIDATES
        .iter()
        .find_map(|path| std::fs::read(path).ok().map(|bytes| (*path, bytes)))
    else {
        log::warn!("No CJK font found; Chinese labels may not render");
        return;
    };

    log::info!("Using CJK fallback font {path}");
    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk".to_owned(), Arc::new(FontData::from_owned(bytes)));
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("cjk".to_owned());
    }
    ctx.set_fonts(fonts);
}

impl eframe::App for DigiscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.refresh_if_stale();

        // ---- Top panel: menu bar + status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, detail table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            match self.state.view.as_ref() {
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.heading("No data loaded  (File → Reload data)");
                    });
                    return;
                }
                Some(view) if view.is_empty() => {
                    ui.centered_and_justified(|ui| {
                        ui.heading("Insufficient data for the selected company and years");
                    });
                    return;
                }
                Some(_) => {}
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    plot::metrics(ui, &self.state);
                    ui.separator();
                    plot::trend_section(ui, &mut self.state);
                    ui.separator();
                    plot::comparison_section(ui, &self.state);
                    ui.separator();
                    table::detail_table(ui, &self.state);
                });
        });
    }
}
