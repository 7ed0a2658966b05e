//! Data Processor Module
//! Cleans the raw incident table, derives the offense category and filters
//! rows by the selected category.

use crate::data::category::{CategoryFilter, OffenseCategory};
use crate::data::schema::{self, find_column, is_missing_marker};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};
use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse a timestamp cell. Anything unrecognised yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a numeric cell. NaN and infinities count as absent.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Per-column tally of cells that were present but failed to coerce.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleaningReport {
    pub coerced: Vec<(String, usize)>,
}

impl CleaningReport {
    pub fn total(&self) -> usize {
        self.coerced.iter().map(|(_, n)| n).sum()
    }
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Clean and classify a freshly loaded table.
    pub fn prepare(mut df: DataFrame) -> Result<DataFrame, ProcessorError> {
        let report = Self::clean(&mut df)?;
        if report.total() > 0 {
            info!("Coerced {} malformed cells to null", report.total());
        }
        Self::classify(&mut df)?;
        Ok(df)
    }

    /// Read a column as optional text with missing markers mapped to `None`.
    fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, ProcessorError> {
        let column = find_column(df, name)
            .ok_or_else(|| ProcessorError::ColumnNotFound(name.to_string()))?
            .cast(&DataType::String)?;
        let values = column
            .str()?
            .into_iter()
            .map(|v| v.filter(|s| !is_missing_marker(s)).map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Coerce dates, numbers and text in place. Bad cells become null.
    pub fn clean(df: &mut DataFrame) -> Result<CleaningReport, ProcessorError> {
        let mut report = CleaningReport::default();

        for name in [schema::OFFENSE_DATE, schema::REPORTED_DATE] {
            let raw = Self::text_column(df, name)?;
            let millis: Vec<Option<i64>> = raw
                .iter()
                .map(|v| {
                    v.as_deref()
                        .and_then(parse_timestamp)
                        .map(|dt| dt.and_utc().timestamp_millis())
                })
                .collect();
            Self::record_coerced(&mut report, name, &raw, &millis);

            let column = Column::new(name.into(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
            df.with_column(column)?;
        }

        for name in [schema::AGE, schema::REPORTING_AREA] {
            let raw = Self::text_column(df, name)?;
            let numbers: Vec<Option<f64>> = raw
                .iter()
                .map(|v| v.as_deref().and_then(parse_number))
                .collect();
            Self::record_coerced(&mut report, name, &raw, &numbers);
            df.with_column(Column::new(name.into(), numbers))?;
        }

        for name in [schema::RACE, schema::GENDER] {
            let filled: Vec<String> = Self::text_column(df, name)?
                .into_iter()
                .map(|v| v.unwrap_or_else(|| schema::UNKNOWN.to_string()))
                .collect();
            df.with_column(Column::new(name.into(), filled))?;
        }

        let descriptions = Self::text_column(df, schema::DESCRIPTION)?;
        df.with_column(Column::new(schema::DESCRIPTION.into(), descriptions))?;

        Ok(report)
    }

    fn record_coerced<T>(
        report: &mut CleaningReport,
        name: &str,
        raw: &[Option<String>],
        parsed: &[Option<T>],
    ) {
        let failed = raw
            .iter()
            .zip(parsed)
            .filter(|(r, p)| r.is_some() && p.is_none())
            .count();
        if failed > 0 {
            debug!("{name}: {failed} cells failed to parse");
            report.coerced.push((name.to_string(), failed));
        }
    }

    /// Derive the offense category column from the descriptions.
    pub fn classify(df: &mut DataFrame) -> Result<(), ProcessorError> {
        let column = find_column(df, schema::DESCRIPTION)
            .ok_or_else(|| ProcessorError::ColumnNotFound(schema::DESCRIPTION.to_string()))?
            .cast(&DataType::String)?;
        let descriptions: Vec<Option<&str>> = column.str()?.into_iter().collect();

        let labels: Vec<&str> = descriptions
            .par_iter()
            .map(|d| OffenseCategory::from_description(*d).label())
            .collect();

        df.with_column(Column::new(schema::CATEGORY.into(), labels))?;
        Ok(())
    }

    /// Keep the rows matching the selection; "All" keeps every row.
    pub fn filter_by_category(
        df: &DataFrame,
        filter: CategoryFilter,
    ) -> Result<DataFrame, ProcessorError> {
        if find_column(df, schema::CATEGORY).is_none() {
            return Err(ProcessorError::ColumnNotFound(schema::CATEGORY.to_string()));
        }
        let Some(category) = filter.category() else {
            return Ok(df.clone());
        };

        let filtered = df
            .clone()
            .lazy()
            .filter(col(schema::CATEGORY).eq(lit(category.label())))
            .collect()?;
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn raw_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                schema::OFFENSE_DATE.into(),
                vec![Some("2014-06-01T10:30:00.000"), Some("not a date"), None],
            ),
            Column::new(
                schema::REPORTED_DATE.into(),
                vec![Some("06/02/2014 09:15:00 AM"), Some("2015-01-03"), Some("")],
            ),
            Column::new(schema::AGE.into(), vec![Some("31"), Some("abc"), None]),
            Column::new(schema::RACE.into(), vec![Some("White"), None, Some("NA")]),
            Column::new(schema::GENDER.into(), vec![None, Some("F"), Some("M")]),
            Column::new(
                schema::DESCRIPTION.into(),
                vec![Some("BURGLARY OF HABITATION"), Some("theft from auto"), None],
            ),
            Column::new(
                schema::REPORTING_AREA.into(),
                vec![Some("1125"), Some("2210"), Some("x")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let dt = parse_timestamp("2014-06-01T10:30:00.000").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2014, 6, 1, 10));

        let dt = parse_timestamp("06/02/2014 09:15:00 PM").unwrap();
        assert_eq!((dt.year(), dt.hour()), (2014, 21));

        let dt = parse_timestamp("2015-01-03").unwrap();
        assert_eq!((dt.year(), dt.hour()), (2015, 0));

        let dt = parse_timestamp("2016-03-04T05:06:07+02:00").unwrap();
        assert_eq!(dt.hour(), 3);

        assert!(parse_timestamp("2014-13-45").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("  ").is_none());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("17.5"), Some(17.5));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("forty"), None);
    }

    #[test]
    fn test_clean_coerces_and_fills() {
        let mut df = raw_frame();
        let report = DataProcessor::clean(&mut df).unwrap();

        let dates = df.column(schema::OFFENSE_DATE).unwrap();
        assert!(matches!(dates.dtype(), DataType::Datetime(_, _)));
        assert_eq!(dates.null_count(), 2);
        assert_eq!(df.column(schema::REPORTED_DATE).unwrap().null_count(), 1);

        let ages: Vec<Option<f64>> = df
            .column(schema::AGE)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ages, vec![Some(31.0), None, None]);

        for name in [schema::RACE, schema::GENDER] {
            let values: Vec<Option<&str>> = df
                .column(name)
                .unwrap()
                .str()
                .unwrap()
                .into_iter()
                .collect();
            assert!(values.iter().all(|v| v.is_some()));
        }
        let races: Vec<Option<&str>> = df
            .column(schema::RACE)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(races, vec![Some("White"), Some("Unknown"), Some("Unknown")]);

        // "not a date", "abc" and "x" were present but unparseable
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_clean_missing_column() {
        let mut df = raw_frame();
        let _ = df.drop_in_place(schema::GENDER).unwrap();
        let err = DataProcessor::clean(&mut df).unwrap_err();
        assert!(matches!(err, ProcessorError::ColumnNotFound(ref c) if c == schema::GENDER));
    }

    #[test]
    fn test_classify_assigns_one_category_per_row() {
        let df = DataProcessor::prepare(raw_frame()).unwrap();
        let labels: Vec<Option<&str>> = df
            .column(schema::CATEGORY)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels, vec![Some("Burglary"), Some("Theft"), Some("Other")]);
    }

    #[test]
    fn test_filter_by_category() {
        let df = DataProcessor::prepare(raw_frame()).unwrap();

        let all = DataProcessor::filter_by_category(&df, CategoryFilter::All).unwrap();
        assert!(all.equals_missing(&df));

        let burglary = DataProcessor::filter_by_category(&df, CategoryFilter::Burglary).unwrap();
        assert_eq!(burglary.height(), 1);
        let labels: Vec<Option<&str>> = burglary
            .column(schema::CATEGORY)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels, vec![Some("Burglary")]);
    }

    #[test]
    fn test_filter_requires_category_column() {
        let df = raw_frame();
        let err = DataProcessor::filter_by_category(&df, CategoryFilter::Theft).unwrap_err();
        assert!(matches!(err, ProcessorError::ColumnNotFound(_)));
    }
}
