use std::path::Path;

use locscrape_scraper::{to_csv_string, LocationRecord};

use crate::OutputFormat;

pub(crate) fn render(records: &[LocationRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(records)
                .map_err(|e| anyhow::anyhow!("failed to serialize records: {e}"))?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Csv => Ok(to_csv_string(records)),
    }
}

/// Write records to `path`, or stdout when no path is given.
pub(crate) fn emit(
    records: &[LocationRecord],
    format: OutputFormat,
    path: Option<&Path>,
) -> anyhow::Result<()> {
    let rendered = render(records, format)?;
    match path {
        Some(path) => {
            std::fs::write(path, rendered)
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
            eprintln!("Wrote {} locations to {}", records.len(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
