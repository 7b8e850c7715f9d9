use crate::error::{DashboardError, DashboardResult};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> DashboardResult<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|e| DashboardError::io(path.as_ref(), e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> DashboardResult<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path.as_ref(), s).map_err(|e| DashboardError::io(path.as_ref(), e))?;
    Ok(())
}

/// Render rows as a Markdown table, or `(no rows)`.
pub fn markdown_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T])
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", markdown_table(rows));
}
