//! Reading the source document from a file or standard input.

use std::path::Path;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::time::timeout;

/// Read the whole input file as UTF-8 text.
pub async fn read_file(path: &Path) -> Result<String, String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))
}

/// Read all of standard input.
///
/// Returns `None` when no data arrives within `wait`, or when stdin is empty.
pub async fn read_stdin(wait: Duration) -> Result<Option<String>, String> {
    let mut stdin = tokio::io::stdin();
    let mut chunk = [0u8; 8192];
    let Ok(first) = timeout(wait, stdin.read(&mut chunk)).await else {
        return Ok(None);
    };
    let first = first.map_err(|e| format!("Failed to read standard input: {e}"))?;
    if first == 0 {
        return Ok(None);
    }

    let mut data = chunk[..first].to_vec();
    stdin
        .read_to_end(&mut data)
        .await
        .map_err(|e| format!("Failed to read standard input: {e}"))?;
    String::from_utf8(data)
        .map(Some)
        .map_err(|e| format!("Standard input is not valid UTF-8: {e}"))
}
