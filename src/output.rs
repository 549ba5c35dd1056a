use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "csv written");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    info!(path = %path.display(), "json written");
    Ok(())
}

/// Render the first `max_rows` rows as a markdown table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AreaAverageRow, StateAverageRow};
    use tempfile::TempDir;

    #[test]
    fn markdown_table_is_truncated() {
        let rows = vec![
            StateAverageRow { state: "Delhi".into(), avg: 280 },
            StateAverageRow { state: "Bihar".into(), avg: 190 },
            StateAverageRow { state: "Goa".into(), avg: 60 },
        ];
        let table = render_table(&rows, 2);
        assert!(table.contains("State"));
        assert!(table.contains("Delhi"));
        assert!(table.contains("Bihar"));
        assert!(!table.contains("Goa"));
        assert_eq!(render_table::<StateAverageRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn csv_uses_serde_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("areas.csv");
        let rows = vec![AreaAverageRow { area: "Rohini".into(), avg_aqi: 250 }];
        write_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "area,avgAQI\nRohini,250\n");
    }

    #[test]
    fn json_is_pretty_printed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("top.json");
        write_json(&path, &StateAverageRow { state: "Goa".into(), avg: 60 }).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["state"], "Goa");
        assert_eq!(value["avg"], 60);
    }
}
