//! CSV ingest for customer acquisition datasets.
//! Validates the header against the required columns and parses each row into
//! a [`CustomerRecord`].

use cltv_core::types::REQUIRED_COLUMNS;
use cltv_core::{CustomerRecord, DashboardError, DashboardResult};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Position of each required column within the input header.
struct ColumnIndex {
    customer_id: usize,
    channel: usize,
    cost: usize,
    conversion_rate: usize,
    revenue: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> DashboardResult<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| position(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::MissingColumns {
                missing,
                expected: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            });
        }

        // Presence was checked above; default keeps this total.
        let at = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            customer_id: at("customer_id"),
            channel: at("channel"),
            cost: at("cost"),
            conversion_rate: at("conversion_rate"),
            revenue: at("revenue"),
        })
    }
}

/// Parse every data row of a CSV stream. Extra columns are ignored.
pub fn read_records<R: Read>(reader: R) -> DashboardResult<Vec<CustomerRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

    let mut records = Vec::new();
    for (i, row) in csv_reader.records().enumerate() {
        let row = row?;
        let row_no = i + 1;
        let text = |idx: usize| row.get(idx).unwrap_or("").to_string();

        let cost = parse_number(&row, columns.cost, row_no, "cost")?;
        if cost <= 0.0 {
            return Err(DashboardError::InvalidRecord {
                row: row_no,
                column: "cost".to_string(),
                reason: format!("cost must be positive, got {cost}"),
            });
        }

        records.push(CustomerRecord {
            customer_id: text(columns.customer_id),
            channel: text(columns.channel),
            cost,
            conversion_rate: parse_number(&row, columns.conversion_rate, row_no, "conversion_rate")?,
            revenue: parse_number(&row, columns.revenue, row_no, "revenue")?,
        });
    }

    if records.is_empty() {
        return Err(DashboardError::EmptyDataset);
    }

    debug!(rows = records.len(), "Parsed acquisition dataset");
    Ok(records)
}

fn parse_number(
    row: &csv::StringRecord,
    idx: usize,
    row_no: usize,
    column: &str,
) -> DashboardResult<f64> {
    let raw = row.get(idx).unwrap_or("");
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DashboardError::InvalidRecord {
            row: row_no,
            column: column.to_string(),
            reason: format!("'{raw}' is not a finite number"),
        }),
    }
}

/// Parse an uploaded CSV body.
pub fn load_bytes(bytes: &[u8]) -> DashboardResult<Vec<CustomerRecord>> {
    read_records(bytes)
}

/// Load a dataset from disk. A missing file is reported as
/// [`DashboardError::DatasetNotFound`] so callers can point users at uploads.
pub fn load_path(path: impl AsRef<Path>) -> DashboardResult<Vec<CustomerRecord>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DashboardError::DatasetNotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    let records = read_records(std::io::BufReader::new(file))?;
    info!(path = %path.display(), rows = records.len(), "Loaded dataset from disk");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
customer_id,channel,cost,conversion_rate,revenue
1,referral,8.32,0.12,4199
2,paid advertising,30.45,0.016,3410
";

    #[test]
    fn test_read_records_parses_rows() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].customer_id, "1");
        assert_eq!(records[1].channel, "paid advertising");
        assert!((records[1].cost - 30.45).abs() < 1e-12);
        assert!((records[0].revenue - 4199.0).abs() < 1e-12);
    }

    #[test]
    fn test_column_order_and_extra_columns_are_free() {
        let csv = "revenue,region,channel,customer_id,conversion_rate,cost\n100,eu,email marketing,c1,0.05,10\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].customer_id, "c1");
        assert_eq!(records[0].channel, "email marketing");
        assert!((records[0].cost - 10.0).abs() < 1e-12);
        assert!((records[0].revenue - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_columns_reported() {
        let csv = "customer_id,channel,cost\n1,referral,5\n";
        match read_records(csv.as_bytes()) {
            Err(DashboardError::MissingColumns { missing, expected }) => {
                assert_eq!(missing, vec!["conversion_rate", "revenue"]);
                assert_eq!(expected.len(), 5);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_value_names_row_and_column() {
        let csv = "customer_id,channel,cost,conversion_rate,revenue\n1,referral,5,0.1,100\n2,referral,abc,0.1,100\n";
        match read_records(csv.as_bytes()) {
            Err(DashboardError::InvalidRecord { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "cost");
            }
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_cost_rejected() {
        let csv = "customer_id,channel,cost,conversion_rate,revenue\n1,referral,0,0.1,100\n";
        assert!(matches!(
            read_records(csv.as_bytes()),
            Err(DashboardError::InvalidRecord { row: 1, .. })
        ));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let csv = "customer_id,channel,cost,conversion_rate,revenue\n";
        assert!(matches!(
            read_records(csv.as_bytes()),
            Err(DashboardError::EmptyDataset)
        ));
    }

    #[test]
    fn test_load_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(matches!(
            load_path(&missing),
            Err(DashboardError::DatasetNotFound(_))
        ));
    }

    #[test]
    fn test_load_path_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_path(dir.path()),
            Err(DashboardError::DatasetNotFound(_))
        ));
    }

    #[test]
    fn test_load_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let records = load_path(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }
}
