//! Identifier resolution.
//!
//! Turns raw command-line tokens into a clean [`IdentifierSequence`]. Each
//! token is classified exactly once, with this precedence:
//!
//! 1. an existing regular file (one index per line)
//! 2. an inclusive range such as `16000-16010`
//! 3. a single unsigned integer
//! 4. anything else is unparseable and produces a warning
//!
//! A file named like a range (`1-3`) is read as a file and never expanded.

use crate::error::{SweepError, SweepResult};
use crate::identifier::{FeatureId, IdentifierSequence};
use std::path::{Path, PathBuf};

/// Largest number of features a single range token may expand to.
pub const MAX_RANGE_SPAN: u64 = 1_000_000;

/// Classification of a single raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    IntegerLiteral(FeatureId),
    RangeLiteral { start: u64, end: u64 },
    FilePath(PathBuf),
    Unparseable,
}

/// Why a token contributed nothing to the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningReason {
    Unparseable,
    EmptyRange { start: u64, end: u64 },
    RangeTooLarge { start: u64, end: u64 },
    UnreadableFile(String),
}

/// Non-fatal problem with one token. Resolution continues past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWarning {
    pub token: String,
    pub reason: WarningReason,
}

impl std::fmt::Display for TokenWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            WarningReason::Unparseable => {
                write!(f, "Could not parse '{}' as feature index, file, or range", self.token)
            }
            WarningReason::EmptyRange { start, end } => {
                write!(f, "Range '{}' is empty ({start} > {end})", self.token)
            }
            WarningReason::RangeTooLarge { start, end } => write!(
                f,
                "Range '{}' expands to more than {MAX_RANGE_SPAN} features ({start}..={end})",
                self.token
            ),
            WarningReason::UnreadableFile(err) => {
                write!(f, "Could not read feature list '{}': {err}", self.token)
            }
        }
    }
}

/// Outcome of resolving a token list.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub identifiers: IdentifierSequence,
    pub warnings: Vec<TokenWarning>,
}

impl Resolution {
    /// Hand over the identifiers, failing when nothing resolved.
    pub fn into_sequence(self) -> SweepResult<IdentifierSequence> {
        if self.identifiers.is_empty() {
            return Err(SweepError::NoIdentifiers);
        }
        Ok(self.identifiers)
    }
}

/// Classify a raw token without expanding it.
pub fn classify_token(token: &str) -> TokenKind {
    let path = Path::new(token);
    if !token.is_empty() && path.is_file() {
        return TokenKind::FilePath(path.to_path_buf());
    }

    if let Some((start, end)) = parse_range(token) {
        return TokenKind::RangeLiteral { start, end };
    }

    match token.trim().parse::<u64>() {
        Ok(value) => TokenKind::IntegerLiteral(FeatureId(value)),
        Err(_) => TokenKind::Unparseable,
    }
}

fn parse_range(token: &str) -> Option<(u64, u64)> {
    if token.starts_with('-') {
        return None;
    }
    let (start, end) = token.split_once('-')?;
    if end.contains('-') {
        return None;
    }
    let start = start.trim().parse::<u64>().ok()?;
    let end = end.trim().parse::<u64>().ok()?;
    Some((start, end))
}

/// Parse a feature list file: one index per line, blank and non-numeric
/// lines ignored.
fn read_feature_list(path: &Path) -> std::io::Result<Vec<FeatureId>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|line| line.parse::<u64>().ok())
        .map(FeatureId)
        .collect())
}

/// Resolve raw tokens into a deduplicated, order-preserving sequence.
///
/// Never fails on its own; call [`Resolution::into_sequence`] to treat an
/// empty result as fatal.
pub fn resolve_tokens<I, S>(tokens: I) -> Resolution
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut expanded: Vec<FeatureId> = Vec::new();
    let mut warnings = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        let kind = classify_token(token);
        tracing::debug!(token, ?kind, "classified token");

        match kind {
            TokenKind::IntegerLiteral(id) => expanded.push(id),
            TokenKind::RangeLiteral { start, end } => {
                if start > end {
                    warnings.push(TokenWarning {
                        token: token.to_string(),
                        reason: WarningReason::EmptyRange { start, end },
                    });
                } else if end - start >= MAX_RANGE_SPAN {
                    warnings.push(TokenWarning {
                        token: token.to_string(),
                        reason: WarningReason::RangeTooLarge { start, end },
                    });
                } else {
                    expanded.extend((start..=end).map(FeatureId));
                }
            }
            TokenKind::FilePath(path) => match read_feature_list(&path) {
                Ok(ids) => expanded.extend(ids),
                Err(e) => warnings.push(TokenWarning {
                    token: token.to_string(),
                    reason: WarningReason::UnreadableFile(e.to_string()),
                }),
            },
            TokenKind::Unparseable => warnings.push(TokenWarning {
                token: token.to_string(),
                reason: WarningReason::Unparseable,
            }),
        }
    }

    Resolution { identifiers: expanded.into_iter().collect(), warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn ids(resolution: &Resolution) -> Vec<u64> {
        resolution.identifiers.iter().map(|id| id.get()).collect()
    }

    #[test]
    fn test_range_expands_inclusive_ascending() {
        let resolution = resolve_tokens(["16000-16010"]);
        assert_eq!(ids(&resolution), (16000..=16010).collect::<Vec<_>>());
        assert_eq!(resolution.identifiers.len(), 11);
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let resolution = resolve_tokens(["5", "3", "5", "7", "3"]);
        assert_eq!(ids(&resolution), vec![5, 3, 7]);
    }

    #[test]
    fn test_dedup_across_ranges_and_literals() {
        let resolution = resolve_tokens(["3", "1-4", "2"]);
        assert_eq!(ids(&resolution), vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_file_ignores_blank_and_non_numeric_lines() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "10\n\n20\nabc\n30").unwrap();
        file.flush().unwrap();

        let token = file.path().to_str().unwrap();
        let resolution = resolve_tokens([token]);
        assert_eq!(ids(&resolution), vec![10, 20, 30]);
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_file_lines_are_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "  11  \n\t12\n-13\n1 4\n").unwrap();
        file.flush().unwrap();

        let resolution = resolve_tokens([file.path().to_str().unwrap()]);
        assert_eq!(ids(&resolution), vec![11, 12]);
    }

    #[test]
    fn test_malformed_token_warns_and_continues() {
        let resolution = resolve_tokens(["16751", "not-a-number-or-file"]);
        assert_eq!(ids(&resolution), vec![16751]);
        assert_eq!(resolution.warnings.len(), 1);
        assert_eq!(resolution.warnings[0].token, "not-a-number-or-file");
        assert_eq!(resolution.warnings[0].reason, WarningReason::Unparseable);
        assert!(resolution.into_sequence().is_ok());
    }

    #[test]
    fn test_file_takes_precedence_over_range() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("1-3");
        std::fs::write(&path, "7\n").unwrap();

        let token = path.to_str().unwrap();
        assert_eq!(classify_token(token), TokenKind::FilePath(path.clone()));
        let resolution = resolve_tokens([token]);
        assert_eq!(ids(&resolution), vec![7]);
    }

    #[test]
    fn test_reversed_range_is_empty_with_warning() {
        let resolution = resolve_tokens(["10-5", "2"]);
        assert_eq!(ids(&resolution), vec![2]);
        assert_eq!(resolution.warnings.len(), 1);
        assert_eq!(resolution.warnings[0].reason, WarningReason::EmptyRange { start: 10, end: 5 });
    }

    #[test]
    fn test_oversized_range_is_rejected_with_warning() {
        let resolution = resolve_tokens(["0-18446744073709551615", "0-10000000000", "9"]);
        assert_eq!(ids(&resolution), vec![9]);
        assert_eq!(resolution.warnings.len(), 2);
        assert_eq!(
            resolution.warnings[0].reason,
            WarningReason::RangeTooLarge { start: 0, end: u64::MAX }
        );
        assert!(resolution.warnings[1].to_string().contains("'0-10000000000'"));
    }

    #[test]
    fn test_range_at_span_limit_expands() {
        let end = MAX_RANGE_SPAN - 1;
        let resolution = resolve_tokens([format!("0-{end}")]);
        assert_eq!(resolution.identifiers.len(), MAX_RANGE_SPAN as usize);
        assert!(resolution.warnings.is_empty());

        let resolution = resolve_tokens([format!("0-{MAX_RANGE_SPAN}")]);
        assert!(resolution.identifiers.is_empty());
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_utf8_file_warns_and_contributes_nothing() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1\n\xff\n2\n").unwrap();
        file.flush().unwrap();

        let token = file.path().to_str().unwrap();
        let resolution = resolve_tokens([token, "5"]);
        assert_eq!(ids(&resolution), vec![5]);
        assert_eq!(resolution.warnings.len(), 1);
        assert_eq!(resolution.warnings[0].token, token);
        assert!(matches!(resolution.warnings[0].reason, WarningReason::UnreadableFile(_)));
    }

    #[test]
    fn test_overflowing_line_is_skipped_silently() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "4\n99999999999999999999\n18446744073709551615\n").unwrap();
        file.flush().unwrap();

        let resolution = resolve_tokens([file.path().to_str().unwrap()]);
        assert_eq!(ids(&resolution), vec![4, u64::MAX]);
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_classify_shapes() {
        assert_eq!(classify_token("42"), TokenKind::IntegerLiteral(FeatureId(42)));
        assert_eq!(classify_token("1-2"), TokenKind::RangeLiteral { start: 1, end: 2 });
        assert_eq!(classify_token("-5"), TokenKind::Unparseable);
        assert_eq!(classify_token("1-2-3"), TokenKind::Unparseable);
        assert_eq!(classify_token("1-"), TokenKind::Unparseable);
        assert_eq!(classify_token("a-b"), TokenKind::Unparseable);
        assert_eq!(classify_token(""), TokenKind::Unparseable);
    }

    #[test]
    fn test_empty_resolution_is_fatal() {
        let resolution = resolve_tokens(["nope", "-1", "x-y"]);
        assert_eq!(resolution.warnings.len(), 3);
        assert!(matches!(resolution.into_sequence(), Err(SweepError::NoIdentifiers)));
    }

    #[test]
    fn test_warning_message_names_token() {
        let resolution = resolve_tokens(["bogus"]);
        let message = resolution.warnings[0].to_string();
        assert!(message.contains("'bogus'"));
    }
}
