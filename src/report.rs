use crate::batch::BatchResult;
use crate::xiv_model::NO_RECENT_SALES;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::fs;
use std::path::{Path, PathBuf};
use thousands::Separable;

pub fn format_price(price: i64) -> String {
    if price == NO_RECENT_SALES {
        "---".to_string()
    } else {
        price.separate_with_commas()
    }
}

pub fn generate_price_table(result: &BatchResult) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .force_no_tty()
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "NQ Price", "HQ Price"]);

    for item in result.items.iter() {
        table.add_row(vec![
            item.name.as_str(),
            format_price(item.nq_price).as_str(),
            format_price(item.hq_price).as_str(),
        ]);
    }

    table.to_string()
}

pub fn render_report(category_name: &str, result: &BatchResult, last_update: DateTime<Local>) -> String {
    let mut output = format!("category: {}\n", category_name);
    output += &format!("last update: {}\n", last_update.format("%Y-%m-%d %H:%M:%S"));
    output += &format!("\n{}\n", generate_price_table(result));

    if !result.failures.is_empty() {
        output += "\nerrors for item names:\n";
        for failure in result.failures.iter() {
            output += &format!("    {} ({}: {})\n", failure.name, failure.kind, failure.message);
        }
    }

    output
}

/// Writes the report to `<results_dir>/<category_name>`, replacing an earlier one.
pub fn write_report(results_dir: &Path, category_name: &str, report: &str) -> Result<PathBuf> {
    fs::create_dir_all(results_dir).with_context(|| format!("Failed to create results dir {:?}", results_dir))?;
    let path = results_dir.join(category_name);
    fs::write(&path, report).with_context(|| format!("Failed to write report {:?}", path))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ItemFailure;
    use crate::error::ErrorKind;
    use crate::xiv_model::{ItemId, ItemRecord};
    use chrono::TimeZone;

    fn result() -> BatchResult {
        BatchResult {
            items: vec![ItemRecord {
                id: ItemId(5111),
                name: "Iron Ore".to_string(),
                nq_price: 12345,
                hq_price: NO_RECENT_SALES,
            }],
            failures: vec![ItemFailure {
                name: "Cobalt Ore".to_string(),
                kind: ErrorKind::Lookup,
                message: "Lookup of 'Cobalt Ore' failed: search returned no results".to_string(),
            }],
        }
    }

    #[test]
    fn prices_are_separated_and_sentinel_is_dashed() {
        assert_eq!(format_price(12345), "12,345");
        assert_eq!(format_price(0), "0");
        assert_eq!(format_price(NO_RECENT_SALES), "---");
    }

    #[test]
    fn report_lists_items_and_failures() {
        let last_update = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let report = render_report("ores", &result(), last_update);

        assert!(report.starts_with("category: ores\nlast update: 2024-03-01 12:30:00\n"));
        assert!(report.contains("Iron Ore"));
        assert!(report.contains("12,345"));
        assert!(report.contains("errors for item names:\n    Cobalt Ore (Lookup: "));
    }

    #[test]
    fn report_without_failures_has_no_error_section() {
        let mut result = result();
        result.failures.clear();

        let report = render_report("ores", &result, Local::now());
        assert!(!report.contains("errors for item names"));
    }

    #[test]
    fn report_is_written_into_results_dir() {
        let dir = tempfile::tempdir().unwrap();
        let results_dir = dir.path().join("results");

        let path = write_report(&results_dir, "ores", "category: ores\n").unwrap();

        assert_eq!(path, results_dir.join("ores"));
        assert_eq!(fs::read_to_string(path).unwrap(), "category: ores\n");
    }
}
