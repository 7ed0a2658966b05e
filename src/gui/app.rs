//! Crime Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::data::{CategoryFilter, DataLoader, DataProcessor};
use crate::export::DashboardExporter;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::DashboardData;
use anyhow::Context;
use egui::SidePanel;
use log::{error, info, warn};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// CSV loading result from background thread
enum LoadResult {
    Progress(f32, String),
    Complete {
        df: DataFrame,
        path: PathBuf,
        dashboard: DashboardData,
    },
    Error(String),
}

/// Main application window.
pub struct CrimeDashboardApp {
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl CrimeDashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self {
            loader: DataLoader::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };
        let path = app.control_panel.settings.csv_path.clone();
        app.start_loading(path);
        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    /// Load, clean and classify a CSV in a background thread.
    fn start_loading(&mut self, path: PathBuf) {
        self.chart_viewer.clear();
        self.loader.clear();
        self.control_panel.export_enabled = false;
        self.control_panel.settings.csv_path = path.clone();
        self.control_panel.set_progress(5.0, "Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let selection = self.control_panel.settings.selection;

        thread::spawn(move || Self::run_loading(tx, path, selection));
    }

    /// Run loading (called from background thread)
    fn run_loading(tx: Sender<LoadResult>, path: PathBuf, selection: CategoryFilter) {
        info!("Loading incidents from {}", path.display());

        let df = match DataLoader::read_csv(&path) {
            Ok(df) => df,
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(LoadResult::Progress(
            40.0,
            "Cleaning and classifying...".to_string(),
        ));
        let df = match DataProcessor::prepare(df) {
            Ok(df) => df,
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(LoadResult::Progress(70.0, "Computing charts...".to_string()));
        match DashboardData::compute(&df, selection) {
            Ok(dashboard) => {
                let _ = tx.send(LoadResult::Complete {
                    df,
                    path,
                    dashboard,
                });
            }
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
            }
        }
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    LoadResult::Complete {
                        df,
                        path,
                        dashboard,
                    } => {
                        self.loader.set_dataframe(df, path);
                        self.is_loading = false;
                        if dashboard.selection == self.control_panel.settings.selection {
                            self.show_dashboard(dashboard);
                        } else {
                            // selection moved while the load was running
                            self.handle_selection_changed();
                        }
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(err) => {
                        error!("Load failed: {err}");
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {err}"));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn show_dashboard(&mut self, dashboard: DashboardData) {
        let file_name = self
            .loader
            .get_file_path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let status = format!(
            "{}: showing {} of {} rows, {} columns",
            file_name,
            dashboard.row_count,
            self.loader.get_row_count(),
            self.loader.get_columns().len()
        );
        self.chart_viewer.set_data(dashboard);
        self.control_panel.export_enabled = true;
        self.control_panel.set_progress(100.0, &status);
    }

    /// Recompute the filtered views for the new selection.
    fn handle_selection_changed(&mut self) {
        let selection = self.control_panel.settings.selection;
        let Some(df) = self.loader.get_dataframe() else {
            // nothing loaded, or a load in flight picks the selection up when it finishes
            return;
        };

        match DashboardData::compute(df, selection) {
            Ok(dashboard) => self.show_dashboard(dashboard),
            Err(e) => {
                error!("Computing {selection} views failed: {e}");
                self.chart_viewer.clear();
                self.control_panel.export_enabled = false;
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
            }
        }
    }

    /// Export chart images and a JSON snapshot to a chosen folder.
    fn handle_export(&mut self) {
        let Some(data) = &self.chart_viewer.data else {
            self.control_panel.set_progress(0.0, "No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        let result = DashboardExporter::export(data, &dir).and_then(|files| {
            open::that(&dir).with_context(|| format!("opening {}", dir.display()))?;
            Ok(files)
        });

        match result {
            Ok(files) => {
                let status = format!("Exported {} files to {}", files.len(), dir.display());
                self.control_panel.set_progress(100.0, &status);
            }
            Err(e) => {
                warn!("Export failed: {e:#}");
                self.control_panel
                    .set_progress(0.0, &format!("Error: export failed: {e}"));
            }
        }
    }
}

impl eframe::App for CrimeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::SelectionChanged => {
                            if !self.is_loading {
                                self.handle_selection_changed();
                            }
                        }
                        ControlPanelAction::Export => self.handle_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
