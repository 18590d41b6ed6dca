use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Reader, Xls, Xlsx};

/// A parsed row: column header -> cell value
pub type Row = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("Failed to parse tabular file: {0}")]
    Parse(String),
}

/// Seam for tabular-file ingestion (bulk imports). Rows come back as
/// header-keyed mappings regardless of the underlying format.
pub trait TabularReader: Send + Sync {
    fn parse(&self, filename: &str, bytes: &[u8]) -> Result<Vec<Row>, TabularError>;
}

/// Extension-dispatched reader for CSV and Excel workbooks
pub struct FileTabularReader;

impl FileTabularReader {
    fn parse_csv(bytes: &[u8]) -> Result<Vec<Row>, TabularError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| TabularError::Parse(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| TabularError::Parse(e.to_string()))?;
            let row: Row = headers
                .iter()
                .cloned()
                .zip(record.iter().map(|cell| cell.to_string()))
                .collect();
            rows.push(row);
        }

        Ok(rows)
    }

    fn rows_from_range(range: calamine::Range<calamine::Data>) -> Vec<Row> {
        let mut iter = range.rows();

        let headers: Vec<String> = match iter.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => return Vec::new(),
        };

        iter.map(|cells| {
            headers
                .iter()
                .cloned()
                .zip(cells.iter().map(|cell| cell.to_string().trim().to_string()))
                .collect()
        })
        .collect()
    }

    fn parse_xlsx(bytes: &[u8]) -> Result<Vec<Row>, TabularError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| TabularError::Parse(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TabularError::Parse("Workbook has no sheets".to_string()))?
            .map_err(|e| TabularError::Parse(e.to_string()))?;

        Ok(Self::rows_from_range(range))
    }

    fn parse_xls(bytes: &[u8]) -> Result<Vec<Row>, TabularError> {
        let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| TabularError::Parse(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TabularError::Parse("Workbook has no sheets".to_string()))?
            .map_err(|e| TabularError::Parse(e.to_string()))?;

        Ok(Self::rows_from_range(range))
    }
}

impl TabularReader for FileTabularReader {
    fn parse(&self, filename: &str, bytes: &[u8]) -> Result<Vec<Row>, TabularError> {
        let extension = filename
            .rsplit('.')
            .next()
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Self::parse_csv(bytes),
            "xlsx" => Self::parse_xlsx(bytes),
            "xls" => Self::parse_xls(bytes),
            other => Err(TabularError::Unsupported(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_rows_keyed_by_header() {
        let reader = FileTabularReader;
        let bytes = b"username,email\nalice,alice@example.com\nbob,bob@example.com\n";

        let rows = reader.parse("import.csv", bytes).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["username"], "alice");
        assert_eq!(rows[0]["email"], "alice@example.com");
        assert_eq!(rows[1]["username"], "bob");
    }

    #[test]
    fn test_parse_csv_trims_whitespace() {
        let reader = FileTabularReader;
        let bytes = b"username,points\n  carol , 200 \n";

        let rows = reader.parse("points.csv", bytes).unwrap();

        assert_eq!(rows[0]["username"], "carol");
        assert_eq!(rows[0]["points"], "200");
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let reader = FileTabularReader;

        let result = reader.parse("import.pdf", b"whatever");

        assert!(matches!(result, Err(TabularError::Unsupported(_))));
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        let reader = FileTabularReader;
        let bytes = b"username,email\ndave,dave@example.com\n";

        let rows = reader.parse("IMPORT.CSV", bytes).unwrap();

        assert_eq!(rows[0]["username"], "dave");
    }
}
