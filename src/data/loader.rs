//! CSV Data Loader Module
//! Reads the incident CSV into a Polars DataFrame with every column as text.

use log::info;
use polars::prelude::*;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Cannot access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Holds the incident table once loaded.
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Read a CSV file into a DataFrame.
    ///
    /// Schema inference is disabled so every column arrives as text; typed
    /// coercion happens in the cleaner where bad cells can become null.
    pub fn read_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
        let access_error = |source: io::Error| LoaderError::FileAccess {
            path: file_path.to_path_buf(),
            source,
        };
        let metadata = File::open(file_path)
            .and_then(|file| file.metadata())
            .map_err(access_error)?;
        if !metadata.is_file() {
            return Err(access_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        Ok(df)
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Forget the current table, e.g. while another file is loading.
    pub fn clear(&mut self) {
        self.df = None;
        self.file_path = None;
    }

    /// Replace the table with one prepared on a background thread.
    pub fn set_dataframe(&mut self, df: DataFrame, file_path: PathBuf) {
        self.df = Some(df);
        self.file_path = Some(file_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_reads_all_columns_as_text() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "offenseage,offensedescription").unwrap();
        writeln!(file, "31,THEFT FROM AUTO").unwrap();
        writeln!(file, ",BURGLARY").unwrap();

        let df = DataLoader::read_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("offenseage").unwrap().dtype(), &DataType::String);

        let mut loader = DataLoader::new();
        loader.set_dataframe(df, file.path().to_path_buf());
        assert_eq!(loader.get_row_count(), 2);
        assert_eq!(
            loader.get_columns(),
            vec!["offenseage".to_string(), "offensedescription".to_string()]
        );
        assert_eq!(loader.get_file_path().unwrap(), &file.path().to_path_buf());
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let err = DataLoader::read_csv(Path::new("/definitely/not/here/incidents.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::FileAccess { .. }));
        assert!(DataLoader::new().get_dataframe().is_none());
    }

    #[test]
    fn test_directory_is_file_access_error() {
        let dir = TempDir::new().unwrap();
        let err = DataLoader::read_csv(dir.path()).unwrap_err();
        assert!(matches!(err, LoaderError::FileAccess { ref path, .. } if path == dir.path()));
    }

    #[test]
    fn test_clear_drops_table() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "offensedescription").unwrap();
        writeln!(file, "THEFT").unwrap();

        let mut loader = DataLoader::new();
        let df = DataLoader::read_csv(file.path()).unwrap();
        loader.set_dataframe(df, file.path().to_path_buf());
        assert!(loader.get_dataframe().is_some());

        loader.clear();
        assert!(loader.get_dataframe().is_none());
        assert!(loader.get_file_path().is_none());
        assert_eq!(loader.get_row_count(), 0);
    }
}
