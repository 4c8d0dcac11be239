//! Flag block parsing and in-place rebuild.
//!
//! A flag block is a markdown table between `<!-- flags:start -->` and
//! `<!-- flags:end -->` marker lines:
//!
//! ```text
//! <!-- flags:start -->
//! | Context  | Key | Type    | Default | Description |
//! | -------- | --- | ------- | ------- | ----------- |
//! | Checkout |     | boolean | false   | Gate the new checkout |
//! <!-- flags:end -->
//! ```
//!
//! A missing start marker is `Ok(None)` — flag blocks are optional per
//! document. Rebuild replaces only the table between the markers; everything
//! outside the region is copied byte for byte, and a no-op rebuild
//! reproduces the input exactly regardless of how the table was formatted.

use std::ops::Range;

use flagsync_core::types::{FlagBlock, FlagKey, FlagRow, ValueType};

use crate::error::DocError;
use crate::frontmatter::lines_with_offsets;

pub const BLOCK_START: &str = "<!-- flags:start -->";
pub const BLOCK_END: &str = "<!-- flags:end -->";

const COLUMNS: [&str; 5] = ["Context", "Key", "Type", "Default", "Description"];

/// A parsed flag block plus the byte range of the table between the markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagBlockRegion {
    pub block: FlagBlock,
    pub span: Range<usize>,
}

/// Locate and parse the flag block. `Ok(None)` when no start marker exists.
pub fn parse_flag_block(text: &str) -> Result<Option<FlagBlockRegion>, DocError> {
    let Some(span) = find_region(text)? else {
        return Ok(None);
    };
    let block = parse_table(&text[span.clone()])?;
    Ok(Some(FlagBlockRegion { block, span }))
}

/// Replace the flag block's table with a re-rendered table built from `rows`.
///
/// When `rows` matches what the current table already decodes to, the
/// document is returned unchanged, whatever its original formatting. Only
/// an actual row change triggers re-rendering.
pub fn rebuild_flag_block(text: &str, rows: &[FlagRow]) -> Result<String, DocError> {
    let Some(span) = find_region(text)? else {
        return Err(DocError::MalformedFlagBlock {
            reason: "no flag block markers to rebuild into".to_owned(),
        });
    };
    if parse_table(&text[span.clone()])?.rows == rows {
        return Ok(text.to_owned());
    }
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    out.push_str(&render_table(rows));
    out.push_str(&text[span.end..]);
    Ok(out)
}

/// Collect every non-empty `Key` cell. Used by the garbage-collector to
/// build the active-key set without needing frontmatter context.
pub fn extract_flag_keys_from_content(text: &str) -> Result<Vec<FlagKey>, DocError> {
    match parse_flag_block(text)? {
        Some(region) => Ok(region
            .block
            .rows
            .into_iter()
            .filter_map(|row| row.key)
            .collect()),
        None => Ok(Vec::new()),
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

fn find_region(text: &str) -> Result<Option<Range<usize>>, DocError> {
    let mut table_start: Option<usize> = None;
    for (start, end, content) in lines_with_offsets(text) {
        let line = content.trim();
        if line == BLOCK_START {
            if table_start.is_some() {
                return Err(DocError::MalformedFlagBlock {
                    reason: "nested or repeated start marker".to_owned(),
                });
            }
            table_start = Some(end);
        } else if line == BLOCK_END {
            let Some(from) = table_start else {
                return Err(DocError::MalformedFlagBlock {
                    reason: "end marker without a start marker".to_owned(),
                });
            };
            return Ok(Some(from..start));
        }
    }
    if table_start.is_some() {
        return Err(DocError::MalformedFlagBlock {
            reason: "start marker without an end marker".to_owned(),
        });
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Table grammar: header row, separator row, data rows
// ---------------------------------------------------------------------------

fn parse_table(region: &str) -> Result<FlagBlock, DocError> {
    let mut lines = region
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let header = lines.next().ok_or_else(|| DocError::MalformedFlagBlock {
        reason: "empty table region".to_owned(),
    })?;
    let header_cells = split_cells(header)?;
    if header_cells.len() != COLUMNS.len()
        || !header_cells
            .iter()
            .zip(COLUMNS)
            .all(|(cell, name)| cell.eq_ignore_ascii_case(name))
    {
        return Err(DocError::MalformedFlagBlock {
            reason: format!("unexpected header row: {header:?}"),
        });
    }

    let separator = lines.next().ok_or_else(|| DocError::MalformedFlagBlock {
        reason: "missing separator row".to_owned(),
    })?;
    let separator_cells = split_cells(separator)?;
    let is_rule = |cell: &String| {
        !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':')
    };
    if separator_cells.len() != COLUMNS.len() || !separator_cells.iter().all(is_rule) {
        return Err(DocError::MalformedFlagBlock {
            reason: format!("unexpected separator row: {separator:?}"),
        });
    }

    let mut rows = Vec::new();
    for line in lines {
        let cells = split_cells(line)?;
        if cells.len() != COLUMNS.len() {
            return Err(DocError::MalformedFlagBlock {
                reason: format!("expected {} cells, got {}: {line:?}", COLUMNS.len(), cells.len()),
            });
        }
        let value_type =
            ValueType::parse(&cells[2]).ok_or_else(|| DocError::MalformedFlagBlock {
                reason: format!("unknown value type {:?} in row {line:?}", cells[2]),
            })?;
        let key = if cells[1].is_empty() {
            None
        } else {
            Some(FlagKey::from(cells[1].as_str()))
        };
        rows.push(FlagRow {
            context: cells[0].clone(),
            key,
            value_type,
            default_value: cells[3].clone(),
            description: cells[4].clone(),
        });
    }

    Ok(FlagBlock { rows })
}

/// Split a `| a | b |` line into unescaped, trimmed cells. `\|` inside a
/// cell is a literal pipe, `\\` a literal backslash.
fn split_cells(line: &str) -> Result<Vec<String>, DocError> {
    let inner = line
        .strip_prefix('|')
        .and_then(|rest| rest.strip_suffix('|'))
        .ok_or_else(|| DocError::MalformedFlagBlock {
            reason: format!("table row must be pipe-delimited: {line:?}"),
        })?;

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped @ ('|' | '\\')) => cell.push(escaped),
                Some(other) => {
                    cell.push('\\');
                    cell.push(other);
                }
                None => cell.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(ch),
        }
    }
    cells.push(cell);
    Ok(cells.into_iter().map(|c| c.trim().to_owned()).collect())
}

fn escape_cell(cell: &str) -> String {
    cell.replace('\\', "\\\\").replace('|', "\\|")
}

fn render_table(rows: &[FlagRow]) -> String {
    let rendered_rows: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                escape_cell(&row.context),
                escape_cell(row.key.as_ref().map(|k| k.0.as_str()).unwrap_or("")),
                row.value_type.to_string(),
                escape_cell(&row.default_value),
                escape_cell(&row.description),
            ]
        })
        .collect();

    let mut widths: [usize; 5] = COLUMNS.map(str::len);
    for row in &rendered_rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &COLUMNS.map(str::to_owned), &widths);
    push_row(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &rendered_rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(cell);
        for _ in cell.len()..*width {
            out.push(' ');
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_rows(rows: &[FlagRow]) -> String {
        format!(
            "# Flags\n\nIntro text.\n\n{BLOCK_START}\n{}{BLOCK_END}\n\nOutro.\n",
            render_table(rows)
        )
    }

    fn sample_rows() -> Vec<FlagRow> {
        vec![
            FlagRow {
                context: "Checkout".into(),
                key: Some(FlagKey::from("feature_fe_5_fl_2_checkout_enabled")),
                value_type: ValueType::Boolean,
                default_value: "false".into(),
                description: "Gate the new checkout".into(),
            },
            FlagRow {
                context: "Cart badge".into(),
                key: None,
                value_type: ValueType::Number,
                default_value: "3".into(),
                description: "Max badge count".into(),
            },
        ]
    }

    #[test]
    fn parse_returns_rows_in_order() {
        let doc = doc_with_rows(&sample_rows());
        let region = parse_flag_block(&doc).expect("parse").expect("present");
        assert_eq!(region.block.rows, sample_rows());
    }

    #[test]
    fn no_markers_is_absent_not_error() {
        let result = parse_flag_block("# Doc without flags\n").expect("parse");
        assert!(result.is_none());
    }

    #[test]
    fn missing_end_marker_is_malformed() {
        let doc = format!("{BLOCK_START}\n| a |\n");
        let err = parse_flag_block(&doc).expect_err("unclosed");
        assert!(matches!(err, DocError::MalformedFlagBlock { .. }));
    }

    #[test]
    fn unknown_value_type_is_malformed() {
        let doc = doc_with_rows(&sample_rows()).replace("boolean", "flagged");
        let err = parse_flag_block(&doc).expect_err("bad type");
        match err {
            DocError::MalformedFlagBlock { reason } => assert!(reason.contains("flagged")),
            other => panic!("expected MalformedFlagBlock, got {other:?}"),
        }
    }

    #[test]
    fn noop_rebuild_reproduces_input_exactly() {
        let doc = doc_with_rows(&sample_rows());
        let region = parse_flag_block(&doc).expect("parse").expect("present");
        let rebuilt = rebuild_flag_block(&doc, &region.block.rows).expect("rebuild");
        assert_eq!(rebuilt, doc);
    }

    #[test]
    fn noop_rebuild_keeps_hand_written_formatting() {
        // Minimal separators, no cell padding: the shape a human authors.
        let doc = format!(
            "{BLOCK_START}\n\
             | Context | Key | Type | Default | Description |\n\
             | --- | --- | --- | --- | --- |\n\
             | Checkout | | boolean | false | Gate the new checkout |\n\
             {BLOCK_END}\n"
        );
        let region = parse_flag_block(&doc).expect("parse").expect("present");
        let rebuilt = rebuild_flag_block(&doc, &region.block.rows).expect("rebuild");
        assert_eq!(rebuilt, doc);
    }

    #[test]
    fn changed_rows_rerender_the_table() {
        let doc = format!(
            "{BLOCK_START}\n\
             | Context | Key | Type | Default | Description |\n\
             | --- | --- | --- | --- | --- |\n\
             | Checkout | | boolean | false | Gate the new checkout |\n\
             {BLOCK_END}\n"
        );
        let mut rows = parse_flag_block(&doc)
            .expect("parse")
            .expect("present")
            .block
            .rows;
        rows[0].key = Some(FlagKey::from("feature_fe_5_fl_2_checkout_enabled"));
        let rebuilt = rebuild_flag_block(&doc, &rows).expect("rebuild");
        assert_ne!(rebuilt, doc);
        let region = parse_flag_block(&rebuilt).expect("reparse").expect("present");
        assert_eq!(region.block.rows, rows);
    }

    #[test]
    fn roundtrip_survives_embedded_pipes() {
        let rows = vec![FlagRow {
            context: "A|B test".into(),
            key: None,
            value_type: ValueType::String,
            default_value: "left|right".into(),
            description: "Chooses left | right arm".into(),
        }];
        let doc = doc_with_rows(&rows);
        let region = parse_flag_block(&doc).expect("parse").expect("present");
        assert_eq!(region.block.rows, rows, "pipes unescaped on parse");
        let rebuilt = rebuild_flag_block(&doc, &region.block.rows).expect("rebuild");
        assert_eq!(rebuilt, doc);
    }

    #[test]
    fn rebuild_touches_only_the_region() {
        let doc = doc_with_rows(&sample_rows());
        let mut rows = sample_rows();
        rows[1].key = Some(FlagKey::from("feature_fe_5_fl_2_cart_badge_enabled"));
        let rebuilt = rebuild_flag_block(&doc, &rows).expect("rebuild");
        assert!(rebuilt.starts_with("# Flags\n\nIntro text.\n"));
        assert!(rebuilt.ends_with("\nOutro.\n"));
        let region = parse_flag_block(&rebuilt).expect("parse").expect("present");
        assert_eq!(region.block.rows, rows);
    }

    #[test]
    fn extract_keys_skips_empty_cells() {
        let doc = doc_with_rows(&sample_rows());
        let keys = extract_flag_keys_from_content(&doc).expect("extract");
        assert_eq!(keys, vec![FlagKey::from("feature_fe_5_fl_2_checkout_enabled")]);
    }

    #[test]
    fn extract_keys_on_plain_doc_is_empty() {
        let keys = extract_flag_keys_from_content("no flags here\n").expect("extract");
        assert!(keys.is_empty());
    }

    #[test]
    fn rebuild_without_markers_is_an_error() {
        let err = rebuild_flag_block("plain\n", &[]).expect_err("no markers");
        assert!(matches!(err, DocError::MalformedFlagBlock { .. }));
    }
}
