//! Chart Viewer Widget
//! Central scrollable panel showing the six dashboard charts in fixed order.

use crate::charts::{ChartKind, ChartPlotter};
use crate::stats::DashboardData;
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 15.0;

/// Scrollable column of chart cards.
#[derive(Default)]
pub struct ChartViewer {
    pub data: Option<DashboardData>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }

    pub fn set_data(&mut self, data: DashboardData) {
        self.data = Some(data);
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("Crime Analysis Dashboard").size(26.0).strong());
        ui.add_space(10.0);

        let Some(data) = &self.data else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for kind in ChartKind::ALL {
                    Self::draw_chart_card(ui, kind, data);
                    ui.add_space(CARD_SPACING);
                }
            });
    }

    fn draw_chart_card(ui: &mut egui::Ui, kind: ChartKind, data: &DashboardData) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(90)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(RichText::new(kind.header(data.selection)).size(18.0).strong());
                    if !kind.follows_selection() {
                        ui.label(
                            RichText::new("(all categories)")
                                .size(12.0)
                                .color(Color32::GRAY),
                        );
                    }
                });
                ui.label(RichText::new(kind.caption()).size(13.0).color(Color32::GRAY));
                ui.add_space(6.0);
                ChartPlotter::draw(ui, kind, data);
            });
    }
}
