//! Brute-force wildcard scanner.
//!
//! The first literal byte of the pattern is used as an anchor and located with
//! `memchr`; every anchor hit is then compared token by token. Results are
//! produced lazily in ascending address order.

use std::iter::FusedIterator;

use super::BytePattern;

/// Lazy enumeration of every address in a region where a pattern matches.
///
/// Consuming; once exhausted it stays exhausted.
#[derive(Debug, Clone)]
pub struct Scan<'a> {
    region: &'a [u8],
    base: usize,
    pattern: &'a BytePattern,
    anchor: Option<(usize, u8)>,
    pos: usize,
}

/// Scan `region`, which lives at absolute address `base`, for `pattern`.
///
/// The caller guarantees `region` covers readable memory only; the scanner
/// never looks past `region.len()`.
pub fn scan<'a>(region: &'a [u8], base: usize, pattern: &'a BytePattern) -> Scan<'a> {
    Scan {
        region,
        base,
        pattern,
        anchor: pattern.anchor(),
        pos: 0,
    }
}

impl Scan<'_> {
    /// Offset of the last position a match may start at, if any.
    fn last_start(&self) -> Option<usize> {
        self.region.len().checked_sub(self.pattern.len())
    }
}

impl Iterator for Scan<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let last = self.last_start()?;
        let len = self.pattern.len();

        while self.pos <= last {
            let start = match self.anchor {
                Some((index, byte)) => {
                    let haystack = &self.region[self.pos + index..=last + index];
                    match memchr::memchr(byte, haystack) {
                        Some(found) => self.pos + found,
                        None => {
                            self.pos = last + 1;
                            return None;
                        }
                    }
                }
                None => self.pos,
            };

            self.pos = start + 1;
            if self.pattern.matches(&self.region[start..start + len]) {
                return Some(self.base + start);
            }
        }

        None
    }
}

impl FusedIterator for Scan<'_> {}
