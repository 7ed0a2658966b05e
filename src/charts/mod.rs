//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;

use crate::data::CategoryFilter;

/// The six dashboard panels, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    YearlyTrend,
    TopDescriptions,
    AgeDistribution,
    CorrelationHeatmap,
    AgeVsArea,
    CategoryTrend,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::YearlyTrend,
        ChartKind::TopDescriptions,
        ChartKind::AgeDistribution,
        ChartKind::CorrelationHeatmap,
        ChartKind::AgeVsArea,
        ChartKind::CategoryTrend,
    ];

    /// Panel header shown above the chart.
    pub fn header(&self, selection: CategoryFilter) -> String {
        match self {
            ChartKind::YearlyTrend => format!("Offense Trends for {selection}"),
            ChartKind::TopDescriptions => "Top 10 Offense Types".to_string(),
            ChartKind::AgeDistribution => "Age Distribution".to_string(),
            ChartKind::CorrelationHeatmap => "Correlation Heatmap".to_string(),
            ChartKind::AgeVsArea => "Age vs. Reporting Area".to_string(),
            ChartKind::CategoryTrend => "Theft vs Burglary Trends".to_string(),
        }
    }

    /// Title drawn inside the chart itself.
    pub fn caption(&self) -> &'static str {
        match self {
            ChartKind::YearlyTrend => "Offenses Over Years",
            ChartKind::TopDescriptions => "Top 10 Offense Types",
            ChartKind::AgeDistribution => "Age Distribution of Offenders",
            ChartKind::CorrelationHeatmap => "Correlation Heatmap",
            ChartKind::AgeVsArea => "Age vs. Reporting Area",
            ChartKind::CategoryTrend => "Theft vs Burglary Trends Over Time",
        }
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartKind::YearlyTrend => "1_offense_trends",
            ChartKind::TopDescriptions => "2_top_offense_types",
            ChartKind::AgeDistribution => "3_age_distribution",
            ChartKind::CorrelationHeatmap => "4_correlation_heatmap",
            ChartKind::AgeVsArea => "5_age_vs_reporting_area",
            ChartKind::CategoryTrend => "6_theft_vs_burglary_trends",
        }
    }

    /// The category trend is drawn from the whole table.
    pub fn follows_selection(&self) -> bool {
        !matches!(self, ChartKind::CategoryTrend)
    }
}

/// Diverging blue-white-red map for values in [-1, 1]. NaN maps to gray.
pub fn coolwarm(value: f64) -> [u8; 3] {
    const COOL: [f64; 3] = [59.0, 76.0, 192.0];
    const MID: [f64; 3] = [221.0, 221.0, 221.0];
    const WARM: [f64; 3] = [180.0, 4.0, 38.0];

    if value.is_nan() {
        return [160, 160, 160];
    }
    let v = value.clamp(-1.0, 1.0);
    let (from, to, t) = if v < 0.0 {
        (COOL, MID, v + 1.0)
    } else {
        (MID, WARM, v)
    };
    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = (from[i] + (to[i] - from[i]) * t).round() as u8;
    }
    rgb
}

/// Shorten long axis labels, keeping whole characters.
pub fn short_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), [59, 76, 192]);
        assert_eq!(coolwarm(0.0), [221, 221, 221]);
        assert_eq!(coolwarm(1.0), [180, 4, 38]);
        assert_eq!(coolwarm(5.0), coolwarm(1.0));
        assert_eq!(coolwarm(f64::NAN), [160, 160, 160]);
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("THEFT", 10), "THEFT");
        assert_eq!(short_label("BURGLARY OF HABITATION", 10), "BURGLARY …");
    }

    #[test]
    fn test_only_category_trend_ignores_selection() {
        let fixed: Vec<ChartKind> = ChartKind::ALL
            .into_iter()
            .filter(|k| !k.follows_selection())
            .collect();
        assert_eq!(fixed, vec![ChartKind::CategoryTrend]);
        assert_eq!(
            ChartKind::YearlyTrend.header(CategoryFilter::Theft),
            "Offense Trends for Theft"
        );
    }
}
