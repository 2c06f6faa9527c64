//! CSV file data adapter.
//!
//! One file per symbol in a flat directory. The symbol is the file name up
//! to its first `.`, so `AAPL.csv` and `AAPL.daily.csv` both load as `AAPL`.
//! Columns are found by header name (`Date`, `Close`, any case); all others
//! are ignored.

use crate::domain::error::MacrossError;
use crate::domain::price::PricePoint;
use crate::domain::series::Series;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn symbol_of(file_name: &str) -> Option<&str> {
        if !file_name.ends_with(".csv") {
            return None;
        }
        file_name.split('.').next().filter(|s| !s.is_empty())
    }

    fn csv_files(&self) -> Result<Vec<(String, PathBuf)>, MacrossError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MacrossError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MacrossError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = Self::symbol_of(&name_str) {
                files.push((symbol.to_string(), entry.path()));
            }
        }
        files.sort();
        Ok(files)
    }

    fn csv_path(&self, symbol: &str) -> Result<PathBuf, MacrossError> {
        let direct = self.base_path.join(format!("{}.csv", symbol));
        if direct.is_file() {
            return Ok(direct);
        }
        self.csv_files()?
            .into_iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, path)| path)
            .ok_or_else(|| MacrossError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn parse_date(raw: &str) -> Option<NaiveDate> {
        // Accept a trailing time component ("2024-01-02 00:00:00", "2024-01-02T00:00").
        let day = raw.split([' ', 'T']).next().unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn read_series(symbol: &str, path: &Path) -> Result<Series, MacrossError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| MacrossError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let headers = rdr.headers()?.clone();
        if headers.iter().all(|h| h.is_empty()) {
            return Ok(Series::empty(symbol));
        }

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| MacrossError::DataSource {
                    reason: format!("{}: missing {} column", path.display(), name),
                })
        };
        let date_col = column("date")?;
        let close_col = column("close")?;

        let mut points = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result?;

            let malformed = |reason: String| MacrossError::MalformedInput {
                symbol: symbol.to_string(),
                row,
                reason,
            };

            let date_str = record.get(date_col).unwrap_or_default();
            let date = Self::parse_date(date_str)
                .ok_or_else(|| malformed(format!("invalid date {:?}", date_str)))?;

            let close_str = record.get(close_col).unwrap_or_default();
            let close: f64 = close_str
                .parse()
                .map_err(|e| malformed(format!("invalid close {:?}: {}", close_str, e)))?;

            points.push(PricePoint::new(date, close));
        }

        Ok(Series::new(symbol.to_string(), points))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<Series, MacrossError> {
        let path = self.csv_path(symbol)?;
        Self::read_series(symbol, &path)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MacrossError> {
        let mut symbols: Vec<String> = self.csv_files()?.into_iter().map(|(s, _)| s).collect();
        symbols.dedup();
        Ok(symbols)
    }
}
