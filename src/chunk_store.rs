//! On-disk chunk files.
//!
//! Each chunk can be mirrored to `<dir>/source_code_NNNN.txt` so a run can
//! be inspected afterwards or resumed without re-splitting the source.
//! Files are read back keyed by the numeric suffix, so order never depends
//! on how the names compare as text.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::Chunk;

const PREFIX: &str = "source_code_";
const EXTENSION: &str = "txt";

/// File name for chunk `index`, e.g. `source_code_0007.txt`.
pub fn chunk_file_name(index: usize) -> String {
    format!("{}{:04}.{}", PREFIX, index, EXTENSION)
}

/// Parse the chunk index out of a file name, if it follows the scheme.
///
/// Returns `Ok(None)` for unrelated files and an error for files that use
/// the prefix but carry a non-numeric suffix.
fn parse_chunk_index(file_name: &str) -> Result<Option<usize>> {
    let Some(rest) = file_name.strip_prefix(PREFIX) else {
        return Ok(None);
    };
    let Some(digits) = rest.strip_suffix(&format!(".{}", EXTENSION)) else {
        return Ok(None);
    };
    let index: usize = digits
        .parse()
        .with_context(|| format!("Invalid chunk file name: {}", file_name))?;
    if index == 0 {
        bail!("Invalid chunk file name: {} (indices start at 1)", file_name);
    }
    Ok(Some(index))
}

/// Write every chunk to `dir`, replacing chunk files from earlier runs.
pub fn write_chunks(dir: &Path, chunks: &[Chunk]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chunk directory: {}", dir.display()))?;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(name) = name.to_str() {
            if name.starts_with(PREFIX) && entry.file_type()?.is_file() {
                std::fs::remove_file(entry.path())?;
            }
        }
    }

    for chunk in chunks {
        let path = dir.join(chunk_file_name(chunk.index));
        std::fs::write(&path, &chunk.text)
            .with_context(|| format!("Failed to write chunk file: {}", path.display()))?;
    }

    Ok(())
}

/// Read chunk files from `dir` in numeric index order.
///
/// The indices found must form the sequence `1..=n` with no gaps or
/// duplicates; anything else means the directory does not hold one
/// complete split of a source.
pub fn read_chunks(dir: &Path) -> Result<Vec<Chunk>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read chunk directory: {}", dir.display()))?;

    let mut by_index = BTreeMap::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(index) = parse_chunk_index(name)? else {
            continue;
        };
        if by_index.insert(index, entry.path()).is_some() {
            bail!("Duplicate chunk index {} in {}", index, dir.display());
        }
    }

    let mut chunks = Vec::with_capacity(by_index.len());
    for (expected, (index, path)) in (1..).zip(by_index) {
        if index != expected {
            bail!(
                "Missing chunk {} in {} (found {} next)",
                expected,
                dir.display(),
                index
            );
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read chunk file: {}", path.display()))?;
        chunks.push(Chunk { index, text });
    }

    Ok(chunks)
}
