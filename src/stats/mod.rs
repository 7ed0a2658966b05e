//! Stats module - dashboard aggregations

mod aggregator;
mod calculator;

pub use aggregator::{
    AgeDistribution, CategoryTrend, CorrelationMatrix, DashboardData, DescriptionCounts,
    ScatterPairs, YearlyCounts,
};
pub use calculator::Histogram;
