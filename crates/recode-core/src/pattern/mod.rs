//! Byte patterns with wildcard positions and the scanner that locates them.
//!
//! Patterns are written the way they appear in a disassembler's byte column,
//! e.g. `"C7 87 ?? ?? ?? ?? F3 41 0F 5C C1"`. `??` (or `?`) matches any byte.

mod scanner;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub use scanner::{Scan, scan};

/// An ordered sequence of literal bytes and wildcards. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BytePattern {
    tokens: Vec<Option<u8>>,
}

impl BytePattern {
    /// Parse a whitespace separated pattern of hex bytes and `??` wildcards.
    pub fn parse(pattern: &str) -> Result<Self> {
        let tokens = pattern
            .split_whitespace()
            .map(|token| match token {
                "??" | "?" => Ok(None),
                _ => u8::from_str_radix(token, 16).map(Some).map_err(|e| {
                    Error::InvalidPattern(format!("Invalid signature token '{}': {}", token, e))
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        if tokens.is_empty() {
            return Err(Error::InvalidPattern("Signature pattern is empty".to_string()));
        }
        Ok(Self { tokens })
    }

    /// Build a pattern that matches `bytes` exactly.
    pub fn literal(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidPattern("Signature pattern is empty".to_string()));
        }
        Ok(Self {
            tokens: bytes.iter().copied().map(Some).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the pattern has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Option<u8>] {
        &self.tokens
    }

    /// Number of wildcard positions
    pub fn wildcards(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_none()).count()
    }

    /// First literal token, used by the scanner as its search anchor
    pub(crate) fn anchor(&self) -> Option<(usize, u8)> {
        self.tokens
            .iter()
            .enumerate()
            .find_map(|(i, t)| t.map(|b| (i, b)))
    }

    /// Check `window` (exactly `len()` bytes) against every literal token.
    pub fn matches(&self, window: &[u8]) -> bool {
        window.len() == self.tokens.len()
            && self
                .tokens
                .iter()
                .zip(window)
                .all(|(token, byte)| token.is_none_or(|t| t == *byte))
    }
}

impl FromStr for BytePattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BytePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match token {
                Some(byte) => write!(f, "{:02X}", byte)?,
                None => f.write_str("??")?,
            }
        }
        Ok(())
    }
}

/// Format concrete bytes the same way patterns are written.
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
