// JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use jeongsan_recon::ReconResult;

/// Export the full result (meta, summary, rows, views, warnings) as pretty JSON.
pub fn export(result: &ReconResult, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, result).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn to_string(result: &ReconResult) -> Result<String, String> {
    serde_json::to_string_pretty(result).map_err(|e| e.to_string())
}
