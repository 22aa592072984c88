//! Constitution amendments as unified diffs.
//!
//! Only the hunks matter: `---`/`+++` file headers are skipped, and every
//! context and removed line of a hunk must match the current text exactly.

use crate::GovernanceError;

#[derive(Clone, Debug, PartialEq, Eq)]
enum HunkLine {
    Context(String),
    Remove(String),
    Add(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Hunk {
    old_start: usize,
    old_len: usize,
    lines: Vec<HunkLine>,
}

fn invalid(reason: impl Into<String>) -> GovernanceError {
    GovernanceError::InvalidProposalContent(format!("constitution amendment: {}", reason.into()))
}

/// Parse `"-l,s"` / `"+l,s"` ranges; a missing length means one line.
fn parse_range(raw: &str, sign: char) -> Result<(usize, usize), GovernanceError> {
    let body = raw
        .strip_prefix(sign)
        .ok_or_else(|| invalid(format!("bad hunk range {raw}")))?;
    let (start, len) = match body.split_once(',') {
        Some((s, l)) => (s, l),
        None => (body, "1"),
    };
    let start = start
        .parse()
        .map_err(|_| invalid(format!("bad hunk range {raw}")))?;
    let len = len
        .parse()
        .map_err(|_| invalid(format!("bad hunk range {raw}")))?;
    Ok((start, len))
}

fn parse_header(line: &str) -> Result<(usize, usize, usize), GovernanceError> {
    let mut parts = line.split_whitespace();
    let (Some("@@"), Some(old), Some(new), Some("@@")) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid(format!("bad hunk header {line}")));
    };
    let (old_start, old_len) = parse_range(old, '-')?;
    let (_, new_len) = parse_range(new, '+')?;
    Ok((old_start, old_len, new_len))
}

fn parse(patch: &str) -> Result<Vec<Hunk>, GovernanceError> {
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut old_left = 0usize;
    let mut new_left = 0usize;

    for line in patch.lines() {
        if old_left == 0 && new_left == 0 {
            if line.starts_with("@@") {
                let (old_start, old_len, new_len) = parse_header(line)?;
                hunks.push(Hunk {
                    old_start,
                    old_len,
                    lines: Vec::new(),
                });
                old_left = old_len;
                new_left = new_len;
            } else if line.starts_with("--- ")
                || line.starts_with("+++ ")
                || line.starts_with('\\')
                || line.trim().is_empty()
            {
                continue;
            } else {
                return Err(invalid(format!("unexpected line outside a hunk: {line}")));
            }
            continue;
        }

        let Some(hunk) = hunks.last_mut() else {
            return Err(invalid("hunk line before any header"));
        };
        let (tag, text) = match line.chars().next() {
            Some(c) => (c, line[c.len_utf8()..].to_string()),
            // a blank context line whose leading space was stripped
            None => (' ', String::new()),
        };
        match tag {
            ' ' if old_left > 0 && new_left > 0 => {
                old_left -= 1;
                new_left -= 1;
                hunk.lines.push(HunkLine::Context(text));
            }
            '-' if old_left > 0 => {
                old_left -= 1;
                hunk.lines.push(HunkLine::Remove(text));
            }
            '+' if new_left > 0 => {
                new_left -= 1;
                hunk.lines.push(HunkLine::Add(text));
            }
            '\\' => {}
            _ => return Err(invalid(format!("hunk line does not match its header: {line}"))),
        }
    }

    if old_left != 0 || new_left != 0 {
        return Err(invalid("truncated hunk"));
    }
    if hunks.is_empty() {
        return Err(invalid("no hunks"));
    }
    Ok(hunks)
}

/// Check that `patch` is a well-formed unified diff.
pub fn validate_amendment(patch: &str) -> Result<(), GovernanceError> {
    parse(patch).map(|_| ())
}

/// Apply `patch` to `text`.
pub fn apply_amendment(text: &str, patch: &str) -> Result<String, GovernanceError> {
    let hunks = parse(patch)?;
    let original: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(original.len());
    let mut cursor = 0usize;

    for hunk in &hunks {
        // a pure insertion names the line it follows
        let start = if hunk.old_len == 0 {
            hunk.old_start
        } else {
            hunk.old_start.saturating_sub(1)
        };
        if start < cursor || start > original.len() {
            return Err(invalid(format!("hunk at line {} is out of order", hunk.old_start)));
        }
        out.extend(original[cursor..start].iter().map(|l| l.to_string()));
        let mut pos = start;
        for line in &hunk.lines {
            match line {
                HunkLine::Context(expected) | HunkLine::Remove(expected) => {
                    if original.get(pos) != Some(&expected.as_str()) {
                        return Err(invalid(format!(
                            "line {} does not match: expected {expected:?}",
                            pos + 1
                        )));
                    }
                    if let HunkLine::Context(l) = line {
                        out.push(l.clone());
                    }
                    pos += 1;
                }
                HunkLine::Add(l) => out.push(l.clone()),
            }
        }
        cursor = pos;
    }
    out.extend(original[cursor..].iter().map(|l| l.to_string()));

    let mut result = out.join("\n");
    if !result.is_empty() && (text.ends_with('\n') || text.is_empty()) {
        result.push('\n');
    }
    Ok(result)
}
