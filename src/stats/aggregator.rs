//! Aggregator Module
//! The six read-only views behind the dashboard charts.

use crate::data::schema::{self, find_column};
use crate::data::{CategoryFilter, DataProcessor, ProcessorError};
use crate::stats::calculator::{Histogram, StatsCalculator};
use chrono::{DateTime, Datelike, Utc};
use log::debug;
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

/// Number of descriptions kept by the frequency view.
pub const TOP_N: usize = 10;
/// Fixed bin count of the age histogram.
pub const HISTOGRAM_BINS: usize = 30;
/// Evaluation points of the density overlay.
pub const KDE_GRID_SIZE: usize = 200;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Offenses per calendar year, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearlyCounts {
    pub entries: Vec<(i32, usize)>,
}

/// Most frequent descriptions, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescriptionCounts {
    pub entries: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgeDistribution {
    pub ages: Vec<f64>,
    pub histogram: Histogram,
    /// (age, density scaled to histogram counts)
    pub density: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Raw (age, reporting area) pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScatterPairs {
    pub points: Vec<[f64; 2]>,
}

/// Yearly counts per category. `counts[c][y]` pairs `categories[c]` with `years[y]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTrend {
    pub years: Vec<i32>,
    pub categories: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

/// Everything the dashboard draws for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub selection: CategoryFilter,
    pub row_count: usize,
    pub yearly_counts: YearlyCounts,
    pub top_descriptions: DescriptionCounts,
    pub age_distribution: AgeDistribution,
    pub correlation: CorrelationMatrix,
    pub age_vs_area: ScatterPairs,
    /// Always computed over the unfiltered table.
    pub category_trend: CategoryTrend,
}

impl DashboardData {
    /// Filter the table and compute every view.
    pub fn compute(full: &DataFrame, selection: CategoryFilter) -> Result<Self, AggregateError> {
        let filtered = DataProcessor::filter_by_category(full, selection)?;
        debug!("{selection}: {} of {} rows", filtered.height(), full.height());

        Ok(Self {
            selection,
            row_count: filtered.height(),
            yearly_counts: Aggregator::yearly_counts(&filtered)?,
            top_descriptions: Aggregator::top_descriptions(&filtered, TOP_N)?,
            age_distribution: Aggregator::age_distribution(&filtered)?,
            correlation: Aggregator::correlation_matrix(&filtered)?,
            age_vs_area: Aggregator::age_area_pairs(&filtered)?,
            category_trend: Aggregator::category_trend(full)?,
        })
    }
}

/// Computes the dashboard views from a cleaned, classified table.
pub struct Aggregator;

impl Aggregator {
    fn require<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, AggregateError> {
        find_column(df, name).ok_or_else(|| AggregateError::ColumnNotFound(name.to_string()))
    }

    /// Calendar year of each offense date, `None` where absent.
    fn offense_years(df: &DataFrame) -> Result<Vec<Option<i32>>, AggregateError> {
        let millis = Self::require(df, schema::OFFENSE_DATE)?.cast(&DataType::Int64)?;
        let years = millis
            .i64()?
            .into_iter()
            .map(|ms| {
                ms.and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|dt| dt.year())
            })
            .collect();
        Ok(years)
    }

    fn numbers(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, AggregateError> {
        let column = Self::require(df, name)?.cast(&DataType::Float64)?;
        Ok(column.f64()?.into_iter().collect())
    }

    fn texts(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, AggregateError> {
        let column = Self::require(df, name)?.cast(&DataType::String)?;
        let values = column
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Rows per year of offense date; undated rows are skipped.
    pub fn yearly_counts(df: &DataFrame) -> Result<YearlyCounts, AggregateError> {
        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for year in Self::offense_years(df)?.into_iter().flatten() {
            *counts.entry(year).or_default() += 1;
        }
        Ok(YearlyCounts {
            entries: counts.into_iter().collect(),
        })
    }

    /// The `n` most frequent descriptions. Ties keep first-appearance order.
    pub fn top_descriptions(df: &DataFrame, n: usize) -> Result<DescriptionCounts, AggregateError> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();

        for description in Self::texts(df, schema::DESCRIPTION)?.into_iter().flatten() {
            match index.get(&description) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(description.clone(), entries.len());
                    entries.push((description, 1));
                }
            }
        }

        // stable sort keeps first-appearance order among equal counts
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        Ok(DescriptionCounts { entries })
    }

    /// Non-null ages with a 30-bin histogram and a density overlay.
    pub fn age_distribution(df: &DataFrame) -> Result<AgeDistribution, AggregateError> {
        let ages: Vec<f64> = Self::numbers(df, schema::AGE)?.into_iter().flatten().collect();
        let histogram = StatsCalculator::histogram(&ages, HISTOGRAM_BINS);
        let scale = ages.len() as f64 * histogram.bin_width();
        let density = StatsCalculator::gaussian_kde(&ages, KDE_GRID_SIZE, scale);

        Ok(AgeDistribution {
            ages,
            histogram,
            density,
        })
    }

    /// Rows where both reporting area and age are present.
    fn complete_pairs(df: &DataFrame) -> Result<Vec<(f64, f64)>, AggregateError> {
        let areas = Self::numbers(df, schema::REPORTING_AREA)?;
        let ages = Self::numbers(df, schema::AGE)?;
        Ok(areas
            .into_iter()
            .zip(ages)
            .filter_map(|(area, age)| Some((area?, age?)))
            .collect())
    }

    /// Pearson matrix over [reporting area, age].
    pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix, AggregateError> {
        let (areas, ages): (Vec<f64>, Vec<f64>) = Self::complete_pairs(df)?.into_iter().unzip();
        Ok(CorrelationMatrix {
            labels: vec![schema::REPORTING_AREA.to_string(), schema::AGE.to_string()],
            values: StatsCalculator::correlation_matrix(&[areas, ages]),
        })
    }

    /// Raw (age, reporting area) pairs for the scatter plot.
    pub fn age_area_pairs(df: &DataFrame) -> Result<ScatterPairs, AggregateError> {
        let points = Self::complete_pairs(df)?
            .into_iter()
            .map(|(area, age)| [age, area])
            .collect();
        Ok(ScatterPairs { points })
    }

    /// Yearly counts per category over every year between the first and
    /// last dated row. Gap years count zero.
    pub fn category_trend(df: &DataFrame) -> Result<CategoryTrend, AggregateError> {
        let years = Self::offense_years(df)?;
        let categories = Self::texts(df, schema::CATEGORY)?;

        let mut cells: HashMap<(i32, String), usize> = HashMap::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for (year, category) in years.into_iter().zip(categories) {
            if let (Some(year), Some(category)) = (year, category) {
                seen.insert(category.clone());
                *cells.entry((year, category)).or_default() += 1;
            }
        }

        let (Some(first), Some(last)) = (
            cells.keys().map(|(y, _)| *y).min(),
            cells.keys().map(|(y, _)| *y).max(),
        ) else {
            return Ok(CategoryTrend::default());
        };

        let years: Vec<i32> = (first..=last).collect();
        let categories: Vec<String> = seen.into_iter().collect();
        let counts = categories
            .iter()
            .map(|category| {
                years
                    .iter()
                    .map(|&year| cells.get(&(year, category.clone())).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        Ok(CategoryTrend {
            years,
            categories,
            counts,
        })
    }
}
