//! Frontmatter parsing and order-preserving patching.
//!
//! A frontmatter block is a `---` delimited region at byte 0 of the
//! document. Absence of the opening delimiter is an explicit [`Absent`]
//! outcome, not an error — some documents legitimately lack frontmatter.
//! An opening delimiter without a closing one is malformed.
//!
//! [`Absent`]: FrontmatterOutcome::Absent

use std::ops::Range;

use flagsync_core::types::{Frontmatter, FrontmatterValue};

use crate::error::DocError;

const DELIMITER: &str = "---";

/// Result of [`parse_frontmatter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterOutcome {
    /// The document does not start with a frontmatter block.
    Absent,
    /// Decoded frontmatter plus the byte range of the whole block,
    /// delimiter lines included. `text[span.end..]` is the document body.
    Present {
        frontmatter: Frontmatter,
        span: Range<usize>,
    },
}

/// Split `text` into `(start, end, content)` line steps, carrying byte
/// positions so block boundaries can be reported exactly.
pub(crate) fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let content = raw.strip_suffix('\n').unwrap_or(raw);
        let content = content.strip_suffix('\r').unwrap_or(content);
        (start, offset, content)
    })
}

/// Parse the leading frontmatter block, if any.
pub fn parse_frontmatter(text: &str) -> Result<FrontmatterOutcome, DocError> {
    let mut lines = lines_with_offsets(text);
    match lines.next() {
        Some((0, _, first)) if first == DELIMITER => {}
        _ => return Ok(FrontmatterOutcome::Absent),
    }

    let mut frontmatter = Frontmatter::default();
    // Index into `entries` of the list currently accepting items. An index
    // rather than a key: a duplicate key would resolve a lookup to the
    // wrong (earlier) entry.
    let mut open_list: Option<usize> = None;

    for (_, end, content) in lines {
        if content == DELIMITER {
            return Ok(FrontmatterOutcome::Present {
                frontmatter,
                span: 0..end,
            });
        }
        if content.trim().is_empty() {
            continue;
        }
        if let Some(item) = content.trim_start().strip_prefix("- ") {
            let Some(index) = open_list else {
                return Err(DocError::MalformedFrontmatter {
                    reason: format!("list item without a list key: {content:?}"),
                });
            };
            let (_, FrontmatterValue::List(items)) = &mut frontmatter.entries[index] else {
                return Err(DocError::MalformedFrontmatter {
                    reason: format!("list item under a scalar key: {content:?}"),
                });
            };
            items.push(unquote(item.trim()).to_owned());
            continue;
        }
        open_list = None;
        let Some((key, value)) = content.split_once(':') else {
            return Err(DocError::MalformedFrontmatter {
                reason: format!("expected `key: value`, got {content:?}"),
            });
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(DocError::MalformedFrontmatter {
                reason: format!("empty key in line {content:?}"),
            });
        }
        if value.is_empty() {
            frontmatter
                .entries
                .push((key.to_owned(), FrontmatterValue::List(Vec::new())));
            open_list = Some(frontmatter.entries.len() - 1);
        } else {
            frontmatter.entries.push((
                key.to_owned(),
                FrontmatterValue::Scalar(unquote(value).to_owned()),
            ));
        }
    }

    Err(DocError::MalformedFrontmatter {
        reason: "opening delimiter without a closing delimiter".to_owned(),
    })
}

/// Apply a partial update: listed keys change (in place, preserving their
/// position), new keys append at the end. Everything outside the block is
/// copied byte for byte.
pub fn update_frontmatter(
    text: &str,
    patch: &[(String, FrontmatterValue)],
) -> Result<String, DocError> {
    let (mut frontmatter, span) = match parse_frontmatter(text)? {
        FrontmatterOutcome::Present { frontmatter, span } => (frontmatter, span),
        FrontmatterOutcome::Absent => return Err(DocError::FrontmatterAbsent),
    };
    for (key, value) in patch {
        frontmatter.set(key, value.clone());
    }
    let mut out = serialize(&frontmatter);
    out.push_str(&text[span.end..]);
    Ok(out)
}

fn serialize(frontmatter: &Frontmatter) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    for (key, value) in &frontmatter.entries {
        match value {
            FrontmatterValue::Scalar(s) => {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(s);
                out.push('\n');
            }
            FrontmatterValue::List(items) => {
                out.push_str(key);
                out.push_str(":\n");
                for item in items {
                    out.push_str("  - ");
                    out.push_str(item);
                    out.push('\n');
                }
            }
        }
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out
}

fn unquote(s: &str) -> &str {
    let stripped = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')));
    stripped.unwrap_or(s)
}
