//! Chart Plotter Module
//! Draws the six dashboard views interactively using egui_plot.

use crate::charts::{coolwarm, short_label, ChartKind};
use crate::stats::{
    AgeDistribution, CategoryTrend, CorrelationMatrix, DashboardData, DescriptionCounts,
    ScatterPairs, YearlyCounts,
};
use egui::{Align2, Color32, FontId, RichText, Sense, Stroke};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

pub const BAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const DENSITY_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red

pub const PALETTE: [Color32; 6] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
];

const CHART_HEIGHT: f32 = 280.0;
const LABEL_CHARS: usize = 14;

/// Draws dashboard charts inside egui panels.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw one panel of the dashboard.
    pub fn draw(ui: &mut egui::Ui, kind: ChartKind, data: &DashboardData) {
        match kind {
            ChartKind::YearlyTrend => Self::draw_yearly_chart(ui, &data.yearly_counts),
            ChartKind::TopDescriptions => Self::draw_top_descriptions(ui, &data.top_descriptions),
            ChartKind::AgeDistribution => Self::draw_age_distribution(ui, &data.age_distribution),
            ChartKind::CorrelationHeatmap => Self::draw_heatmap(ui, &data.correlation),
            ChartKind::AgeVsArea => Self::draw_age_vs_area(ui, &data.age_vs_area),
            ChartKind::CategoryTrend => Self::draw_category_trend(ui, &data.category_trend),
        }
    }

    /// Bar chart over categorical x positions 0..n with text tick labels.
    fn draw_labeled_bars(
        ui: &mut egui::Ui,
        id: &str,
        x_label: &str,
        y_label: &str,
        entries: Vec<(String, usize)>,
    ) {
        let tick_labels: Vec<String> = entries
            .iter()
            .map(|(label, _)| short_label(label, LABEL_CHARS))
            .collect();

        let bars: Vec<Bar> = entries
            .iter()
            .enumerate()
            .map(|(i, (label, count))| {
                Bar::new(i as f64, *count as f64)
                    .width(0.8)
                    .name(label)
            })
            .collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                    return String::new();
                }
                tick_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));
            });
    }

    /// Offenses per year as bars.
    pub fn draw_yearly_chart(ui: &mut egui::Ui, counts: &YearlyCounts) {
        let entries = counts
            .entries
            .iter()
            .map(|(year, count)| (year.to_string(), *count))
            .collect();
        Self::draw_labeled_bars(ui, "yearly_counts", "Year", "Number of Offenses", entries);
    }

    /// Ten most frequent descriptions as bars.
    pub fn draw_top_descriptions(ui: &mut egui::Ui, counts: &DescriptionCounts) {
        Self::draw_labeled_bars(
            ui,
            "top_descriptions",
            "Offense Type",
            "Frequency",
            counts.entries.clone(),
        );
    }

    /// Histogram bars with the density curve on top.
    pub fn draw_age_distribution(ui: &mut egui::Ui, dist: &AgeDistribution) {
        let width = dist.histogram.bin_width();
        let bars: Vec<Bar> = dist
            .histogram
            .counts
            .iter()
            .zip(dist.histogram.edges.windows(2))
            .map(|(&count, edge)| {
                Bar::new((edge[0] + edge[1]) / 2.0, count as f64)
                    .width(width)
                    .name(format!("{:.1} – {:.1}", edge[0], edge[1]))
            })
            .collect();

        Plot::new("age_distribution")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Age")
            .y_axis_label("Count")
            .include_y(0.0)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(BAR_COLOR.gamma_multiply(0.7))
                        .name("Ages"),
                );
                if !dist.density.is_empty() {
                    plot_ui.line(
                        Line::new(PlotPoints::new(dist.density.clone()))
                            .color(DENSITY_COLOR)
                            .width(2.0)
                            .name("Density"),
                    );
                }
            });
    }

    /// Square grid of correlation cells, annotated with two decimals.
    pub fn draw_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        let n = matrix.labels.len();
        if n == 0 {
            ui.label(RichText::new("No numeric data").color(Color32::GRAY));
            return;
        }

        let label_width = 170.0;
        let cell = ((ui.available_width() - label_width - 20.0) / n as f32).clamp(60.0, 140.0);
        let size = egui::vec2(label_width + cell * n as f32, cell * n as f32 + 30.0);
        let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter();
        let text_color = ui.visuals().text_color();
        let grid_origin = rect.min + egui::vec2(label_width, 0.0);

        for (row, values) in matrix.values.iter().enumerate() {
            painter.text(
                egui::pos2(grid_origin.x - 8.0, grid_origin.y + cell * (row as f32 + 0.5)),
                Align2::RIGHT_CENTER,
                &matrix.labels[row],
                FontId::proportional(13.0),
                text_color,
            );

            for (col, &value) in values.iter().enumerate() {
                let min = grid_origin + egui::vec2(cell * col as f32, cell * row as f32);
                let cell_rect = egui::Rect::from_min_size(min, egui::vec2(cell, cell));
                let [r, g, b] = coolwarm(value);
                painter.rect_filled(cell_rect, 0.0, Color32::from_rgb(r, g, b));
                painter.rect_stroke(cell_rect, 0.0, Stroke::new(1.0, Color32::WHITE));

                let annotation = if value.is_nan() {
                    "nan".to_string()
                } else {
                    format!("{value:.2}")
                };
                painter.text(
                    cell_rect.center(),
                    Align2::CENTER_CENTER,
                    annotation,
                    FontId::proportional(16.0),
                    Color32::BLACK,
                );
            }
        }

        for (col, label) in matrix.labels.iter().enumerate() {
            painter.text(
                egui::pos2(
                    grid_origin.x + cell * (col as f32 + 0.5),
                    grid_origin.y + cell * n as f32 + 12.0,
                ),
                Align2::CENTER_CENTER,
                label,
                FontId::proportional(13.0),
                text_color,
            );
        }
    }

    /// Age against reporting area, half transparent.
    pub fn draw_age_vs_area(ui: &mut egui::Ui, pairs: &ScatterPairs) {
        Plot::new("age_vs_area")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Age")
            .y_axis_label("Reporting Area")
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(PlotPoints::new(pairs.points.clone()))
                        .radius(2.5)
                        .color(BAR_COLOR.gamma_multiply(0.5)),
                );
            });
    }

    /// One line per category across years.
    pub fn draw_category_trend(ui: &mut egui::Ui, trend: &CategoryTrend) {
        Plot::new("category_trend")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label("Number of Offenses")
            .include_y(0.0)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (idx, (category, counts)) in
                    trend.categories.iter().zip(&trend.counts).enumerate()
                {
                    let points: PlotPoints = trend
                        .years
                        .iter()
                        .zip(counts)
                        .map(|(&year, &count)| [year as f64, count as f64])
                        .collect();
                    plot_ui.line(
                        Line::new(points)
                            .color(PALETTE[idx % PALETTE.len()])
                            .width(2.0)
                            .name(category),
                    );
                }
            });
    }
}
