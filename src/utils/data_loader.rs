//! Data loading utilities

use crate::error::{EtaError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Loader for historical delivery records
pub struct DataLoader {
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(100),
        }
    }

    /// Set the number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = Some(n);
        self
    }

    /// Load a CSV file of delivery records
    pub fn load_csv(&self, path: &str) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| EtaError::DataError(e.to_string()))?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| EtaError::DataError(e.to_string()))
    }

    /// Get row/column counts and header names without loading full data
    pub fn get_file_info(&self, path: &str) -> Result<FileInfo> {
        let metadata =
            std::fs::metadata(path).map_err(|e| EtaError::DataError(e.to_string()))?;
        let file_size = metadata.len();

        let file = File::open(path).map_err(|e| EtaError::DataError(e.to_string()))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header = lines
            .next()
            .transpose()
            .map_err(|e| EtaError::DataError(e.to_string()))?
            .unwrap_or_default();

        let columns: Vec<String> = header.split(',').map(|s| s.trim().to_string()).collect();
        let n_cols = columns.len();
        let n_rows = lines.count();

        Ok(FileInfo {
            path: path.to_string(),
            file_size,
            n_rows,
            n_cols,
            columns,
        })
    }
}

/// File information
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub file_size: u64,
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<String>,
}

/// Save a DataFrame to CSV
pub fn save_csv(df: &mut DataFrame, path: &str) -> Result<()> {
    let mut file = File::create(path).map_err(|e| EtaError::DataError(e.to_string()))?;

    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(|e| EtaError::DataError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a,b,c").unwrap();
        writeln!(file, "1,2,3").unwrap();
        writeln!(file, "4,5,6").unwrap();
        writeln!(file, "7,8,9").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let loader = DataLoader::new();

        let df = loader.load_csv(file.path().to_str().unwrap()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_get_file_info() {
        let file = create_test_csv();
        let loader = DataLoader::new();

        let info = loader.get_file_info(file.path().to_str().unwrap()).unwrap();

        assert_eq!(info.n_rows, 3);
        assert_eq!(info.n_cols, 3);
        assert_eq!(info.columns, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_save_csv_round_trip() {
        let mut df = df!(
            "a" => &[1i64, 2, 3],
            "b" => &[4i64, 5, 6]
        )
        .unwrap();

        let file = NamedTempFile::new().unwrap();
        save_csv(&mut df, file.path().to_str().unwrap()).unwrap();

        let loader = DataLoader::new();
        let loaded = loader.load_csv(file.path().to_str().unwrap()).unwrap();

        assert_eq!(loaded.height(), 3);
        assert_eq!(loaded.width(), 2);
    }
}
