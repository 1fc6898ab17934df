//! Guest-text parser
//!
//! Turns free-form chat text into [`GuestRecord`]s. Two input shapes:
//!
//! - `Single`: one `Nombre - correo@ejemplo.com` per line
//! - `Categorized`: blocks introduced by a recognized header line
//!   (`Hombres:`, `Mujeres:`, `General:`) followed by `Nombre - correo`
//!   lines until the next header or end of input
//!
//! Parsing is a strategy trait so an AI-assisted implementation can be
//! tried first and fall back to the deterministic one; the deterministic
//! parser accepts every format the AI path accepts.

use crate::error::{Error, ParseError, Result};
use crate::model::{GuestCategory, GuestRecord};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}")
        .expect("EMAIL_RE is a compile-time constant")
});

/// Which input shape the caller expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMode {
    /// Plain `Nombre - correo` lines, no headers
    Single,
    /// Category blocks with recognized header lines
    Categorized,
}

/// Does the text open with a recognized category header?
///
/// The state machine uses this on the first non-empty line to pick the
/// parse mode, and to let categorized input skip the guest-type question.
#[must_use]
pub fn looks_categorized(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .is_some_and(|l| GuestCategory::from_header(l).is_some())
}

/// Is there exactly one syntactically valid email address in the text?
#[must_use]
pub fn is_valid_email(text: &str) -> bool {
    EMAIL_RE
        .find(text)
        .is_some_and(|m| m.start() == 0 && m.end() == text.len())
}

/// Guest-text parsing strategy
#[async_trait::async_trait]
pub trait GuestParser: Send + Sync {
    /// Parse chat text into guest records.
    ///
    /// Returns `Error::Parse` for malformed input (the caller turns it into
    /// corrective guidance and leaves conversation state untouched) and
    /// other variants when the strategy itself is unavailable.
    async fn parse(&self, text: &str, mode: CategoryMode) -> Result<Vec<GuestRecord>>;
}

/// Deterministic line-based parser
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicParser;

impl DeterministicParser {
    /// Create a parser
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Synchronous parse; the trait impl delegates here.
    pub fn parse_text(
        text: &str,
        mode: CategoryMode,
    ) -> std::result::Result<Vec<GuestRecord>, ParseError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        if lines.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let mut guests = Vec::new();
        let mut current_category: Option<GuestCategory> = None;

        for line in lines {
            match mode {
                CategoryMode::Single => {
                    let (name, email) = parse_guest_line(line)?;
                    guests.push(GuestRecord::new(name, email));
                }
                CategoryMode::Categorized => {
                    if is_header_candidate(line) {
                        match GuestCategory::from_header(line) {
                            Some(category) => current_category = Some(category),
                            None => {
                                return Err(ParseError::UnrecognizedCategory {
                                    header: line.to_string(),
                                })
                            }
                        }
                        continue;
                    }
                    // Guest data before any header has no category to land in
                    let Some(category) = current_category else {
                        return Err(ParseError::UnrecognizedCategory {
                            header: line.to_string(),
                        });
                    };
                    let (name, email) = parse_guest_line(line)?;
                    guests.push(GuestRecord::new(name, email).with_category(category));
                }
            }
        }

        if guests.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        Ok(guests)
    }
}

#[async_trait::async_trait]
impl GuestParser for DeterministicParser {
    async fn parse(&self, text: &str, mode: CategoryMode) -> Result<Vec<GuestRecord>> {
        Self::parse_text(text, mode).map_err(Error::Parse)
    }
}

/// A line that introduces a category block: either `Algo:` or a bare
/// recognized category word. Lines carrying an email are never headers.
fn is_header_candidate(line: &str) -> bool {
    if line.contains('@') {
        return false;
    }
    line.ends_with(':') || GuestCategory::from_header(line).is_some()
}

/// Split one guest line into (name, email).
///
/// Exactly one valid email is required; the name is everything before it,
/// minus separator punctuation.
fn parse_guest_line(line: &str) -> std::result::Result<(String, String), ParseError> {
    let mut matches = EMAIL_RE.find_iter(line);
    let Some(first) = matches.next() else {
        // No valid email on the line, malformed ("juan@ejemplo") or absent:
        // either way the batch is unbalanced
        return Err(ParseError::UnbalancedData {
            line: line.to_string(),
        });
    };
    if matches.next().is_some() {
        return Err(ParseError::InvalidEmailFormat {
            line: line.to_string(),
        });
    }

    let name = line[..first.start()]
        .trim()
        .trim_end_matches(['-', '–', ':', ','])
        .trim();
    if name.is_empty() {
        return Err(ParseError::UnbalancedData {
            line: line.to_string(),
        });
    }

    Ok((name.to_string(), first.as_str().to_string()))
}

/// Parser chain: optional AI-assisted primary, deterministic fallback
///
/// The state machine depends only on [`GuestParser`]; the primary is an
/// optimization, never a required path. Any primary failure (API trouble,
/// schema-invalid output) falls through to the deterministic parser, whose
/// typed error is what the user ultimately sees.
pub struct ChainParser {
    primary: Option<Arc<dyn GuestParser>>,
    fallback: DeterministicParser,
}

impl ChainParser {
    /// Deterministic-only chain
    #[must_use]
    pub fn deterministic() -> Self {
        Self {
            primary: None,
            fallback: DeterministicParser::new(),
        }
    }

    /// Chain with an AI-assisted primary
    #[must_use]
    pub fn with_primary(primary: Arc<dyn GuestParser>) -> Self {
        Self {
            primary: Some(primary),
            fallback: DeterministicParser::new(),
        }
    }
}

#[async_trait::async_trait]
impl GuestParser for ChainParser {
    async fn parse(&self, text: &str, mode: CategoryMode) -> Result<Vec<GuestRecord>> {
        if let Some(primary) = &self.primary {
            match primary.parse(text, mode).await {
                Ok(guests) => return Ok(guests),
                Err(e) => {
                    debug!(error = %e, "primary parser failed, falling back to deterministic");
                }
            }
        }
        self.fallback.parse(text, mode).await
    }
}
