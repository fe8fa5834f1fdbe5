// Journal-entry CSV export

use std::io::Write;
use std::path::Path;

/// Write journal lines as CSV: UTF-8 with a byte-order mark so Excel
/// renders accents correctly, every field quoted.
pub fn export_journal(
    headers: &[&str],
    rows: &[Vec<String>],
    path: &Path,
) -> Result<(), String> {
    let mut file = std::fs::File::create(path).map_err(|e| e.to_string())?;
    file.write_all(&[0xEF, 0xBB, 0xBF]).map_err(|e| e.to_string())?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(file);

    writer.write_record(headers).map_err(|e| e.to_string())?;
    for row in rows {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
