//! Dashboard Export Module
//! Writes every chart as a PNG plus a JSON snapshot of the computed views.

use crate::charts::{ChartKind, StaticChartRenderer};
use crate::stats::DashboardData;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Size of each exported chart image.
pub const EXPORT_WIDTH: u32 = 1400;
pub const EXPORT_HEIGHT: u32 = 1000;

pub const SNAPSHOT_FILE: &str = "dashboard.json";

/// Exports the current dashboard to a folder.
pub struct DashboardExporter;

impl DashboardExporter {
    /// Write the six chart images and the snapshot. Returns the written paths.
    pub fn export(data: &DashboardData, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let mut written = Vec::with_capacity(ChartKind::ALL.len() + 1);
        for kind in ChartKind::ALL {
            let png = StaticChartRenderer::render_png(kind, data, EXPORT_WIDTH, EXPORT_HEIGHT)
                .with_context(|| format!("rendering {}", kind.caption()))?;
            let path = dir.join(format!("{}.png", kind.file_stem()));
            fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
            written.push(path);
        }

        written.push(Self::write_snapshot(data, dir)?);
        info!("Exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Serialize the views and the active selection as pretty JSON.
    pub fn write_snapshot(data: &DashboardData, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(SNAPSHOT_FILE);
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CategoryFilter, DataProcessor};
    use polars::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_contains_selection_and_views() {
        let raw = DataFrame::new(vec![
            Column::new("offensedate".into(), vec!["2014-01-02", "2015-06-07"]),
            Column::new("offensereporteddate".into(), vec!["2014-01-03", ""]),
            Column::new("offenseage".into(), vec!["25", "x"]),
            Column::new("offenserace".into(), vec!["B", ""]),
            Column::new("offensegender".into(), vec!["", "F"]),
            Column::new("offensedescription".into(), vec!["THEFT", "BURGLARY"]),
            Column::new("offensereportingarea".into(), vec!["10", "20"]),
        ])
        .unwrap();
        let df = DataProcessor::prepare(raw).unwrap();
        let data = DashboardData::compute(&df, CategoryFilter::Theft).unwrap();

        let dir = TempDir::new().unwrap();
        let path = DashboardExporter::write_snapshot(&data, dir.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(json["selection"], "Theft");
        assert_eq!(json["row_count"], 1);
        assert_eq!(json["yearly_counts"]["entries"][0][0], 2014);
        // single pair: correlation undefined, serialized as null
        assert!(json["correlation"]["values"][0][1].is_null());
        assert_eq!(json["category_trend"]["years"].as_array().unwrap().len(), 2);
    }
}
