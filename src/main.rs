//! Crime Dashboard - Incident Data Analysis & Interactive Chart Viewer
//!
//! Loads a police incident CSV, derives offense categories and shows six
//! descriptive charts filtered by category.

mod charts;
mod data;
mod export;
mod gui;
mod stats;

use eframe::egui;
use gui::CrimeDashboardApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Crime Analysis Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Crime Analysis Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(CrimeDashboardApp::new(cc)))),
    )
}
