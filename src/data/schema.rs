//! Column names of the incident dataset and lookup helpers.

use polars::prelude::*;

pub const OFFENSE_DATE: &str = "offensedate";
pub const REPORTED_DATE: &str = "offensereporteddate";
pub const AGE: &str = "offenseage";
pub const RACE: &str = "offenserace";
pub const GENDER: &str = "offensegender";
pub const DESCRIPTION: &str = "offensedescription";
pub const REPORTING_AREA: &str = "offensereportingarea";

/// Derived by the classifier.
pub const CATEGORY: &str = "offense_category";

/// Sentinel written into race / gender cells that were absent.
pub const UNKNOWN: &str = "Unknown";

/// Text cells that count as absent, as dataframe CSV readers usually treat them.
const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True when a raw text cell should be read as a missing value.
pub fn is_missing_marker(value: &str) -> bool {
    MISSING_MARKERS.contains(&value)
}

/// Look up a column by name, returning `None` when the frame lacks it.
///
/// Callers wrap the `None` into their own `ColumnNotFound` variant so the
/// missing name survives into the error message.
pub fn find_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Column> {
    df.get_column_index(name).map(|idx| &df.get_columns()[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_markers() {
        assert!(is_missing_marker(""));
        assert!(is_missing_marker("NA"));
        assert!(is_missing_marker("null"));
        assert!(!is_missing_marker("Unknown"));
        assert!(!is_missing_marker("M"));
    }

    #[test]
    fn test_find_column() {
        let df = DataFrame::new(vec![Column::new(AGE.into(), vec!["31", "44"])]).unwrap();
        assert!(find_column(&df, AGE).is_some());
        assert!(find_column(&df, RACE).is_none());
    }
}
