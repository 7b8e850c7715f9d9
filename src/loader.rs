use crate::error::{DashboardError, DashboardResult};
use crate::normalize::{canonical_region, is_known_region};
use crate::types::{RawRow, SalesRecord};
use crate::util::{parse_count_safe, parse_f64_safe, parse_i32_safe};
use csv::ReaderBuilder;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    /// Raw region spellings the normalization table does not know.
    pub unmapped_regions: BTreeSet<String>,
}

pub fn load_sales(path: impl AsRef<Path>) -> DashboardResult<(Vec<SalesRecord>, LoadReport)> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| DashboardError::io(path, e))?;
    let (records, report) = load_sales_from_reader(file)?;
    if records.is_empty() {
        return Err(DashboardError::NoData(path.to_path_buf()));
    }
    Ok((records, report))
}

pub fn load_sales_from_reader<R: Read>(reader: R) -> DashboardResult<(Vec<SalesRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut report = LoadReport::default();
    let mut records: Vec<SalesRecord> = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Row {}: CSV parse error: {}", idx + 1, e);
                report.parse_errors += 1;
                continue;
            }
        };

        let raw_region = match row.region.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => { report.parse_errors += 1; continue; }
        };
        let year = match parse_i32_safe(row.year.as_deref()) { Some(y) => y, None => { report.parse_errors += 1; continue; } };
        let month = match parse_i32_safe(row.month.as_deref()) {
            Some(m) if (1..=12).contains(&m) => m as u32,
            _ => { report.parse_errors += 1; continue; }
        };
        let total_sales = match parse_f64_safe(row.total_sales.as_deref()) { Some(v) => v, None => { report.parse_errors += 1; continue; } };
        let total_items = match parse_count_safe(row.total_items.as_deref()) { Some(v) => v, None => { report.parse_errors += 1; continue; } };

        if !is_known_region(&raw_region) {
            report.unmapped_regions.insert(raw_region.clone());
        }

        records.push(SalesRecord {
            region: canonical_region(&raw_region),
            year,
            month,
            total_sales,
            total_items,
        });
    }

    report.loaded_rows = records.len();
    Ok((records, report))
}
