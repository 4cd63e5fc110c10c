//! The resolution table embedded in each game DLL.
//!
//! The game picks its output mode from a table of 15 width/height pairs
//! (little-endian `u32`s). Overwriting every pair with the target resolution
//! leaves the game no other choice.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use recode_core::{BytePattern, format_bytes, scan};
use tracing::{info, warn};

/// Number of width/height pairs in the table
pub const TABLE_PAIRS: usize = 15;

/// The table as shipped: 800x600 up to 3840x2160.
pub const STOCK_TABLE: &str = "20 03 00 00 58 02 00 00 00 04 00 00 00 03 00 00 \
00 05 00 00 D0 02 00 00 00 05 00 00 20 03 00 00 00 05 00 00 00 04 00 00 \
50 05 00 00 00 03 00 00 A0 05 00 00 84 03 00 00 40 06 00 00 84 03 00 00 \
40 06 00 00 B0 04 00 00 90 06 00 00 1A 04 00 00 80 07 00 00 38 04 00 00 \
80 07 00 00 B0 04 00 00 00 0A 00 00 A0 05 00 00 00 0A 00 00 40 06 00 00 \
00 0F 00 00 70 08 00 00";

/// Every pair set to `width` x `height`.
pub fn replacement(width: u32, height: u32) -> Vec<u8> {
    let mut pair = width.to_le_bytes().to_vec();
    pair.extend_from_slice(&height.to_le_bytes());
    pair.repeat(TABLE_PAIRS)
}

/// What happened to one DLL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Table found at this file offset (and written unless dry-run)
    Patched { offset: usize },
    /// The file exists but the table does not
    NotFound,
    /// No such file in the game directory
    MissingFile,
}

/// Replace the first occurrence of `pattern` in the file at `path`.
pub fn patch_file(path: &Path, pattern: &BytePattern, payload: &[u8], dry_run: bool) -> Result<Outcome> {
    if !path.is_file() {
        return Ok(Outcome::MissingFile);
    }
    let mut bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let Some(offset) = scan(&bytes, 0, pattern).next() else {
        return Ok(Outcome::NotFound);
    };
    let end = offset + payload.len();
    if end > bytes.len() {
        anyhow::bail!("Replacement runs past the end of {}", path.display());
    }

    if !dry_run {
        bytes[offset..end].copy_from_slice(payload);
        fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(Outcome::Patched { offset })
}

/// Patch every listed DLL under `dir`, logging each result.
pub fn patch_dir<'a>(
    dir: &Path,
    modules: impl IntoIterator<Item = &'a str>,
    pattern: &BytePattern,
    payload: &[u8],
    dry_run: bool,
) -> Result<Vec<(PathBuf, Outcome)>> {
    let mut results = Vec::new();
    for module in modules {
        let path = dir.join(module);
        let outcome = patch_file(&path, pattern, payload, dry_run)?;
        match &outcome {
            Outcome::Patched { offset } => info!(
                "Patched {} @ {:#x} with '{}'{}",
                module,
                offset,
                format_bytes(payload),
                if dry_run { " (dry run)" } else { "" }
            ),
            Outcome::NotFound => warn!("Resolution table not found in {}", module),
            Outcome::MissingFile => warn!("{} does not exist, skipped", path.display()),
        }
        results.push((path, outcome));
    }
    Ok(results)
}
