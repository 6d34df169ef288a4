//! One-line summaries from markdown docs.

/// Returns the plain-text first paragraph of `docs`.
///
/// Leading headings and code blocks are skipped. Link labels and code span
/// text are kept while markup is dropped. Empty docs give an empty summary.
#[must_use]
pub fn short_summary(docs: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_code = false;

    for line in docs.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            if !lines.is_empty() {
                break;
            }
            in_code = !in_code;
            continue;
        }
        if in_code {
            continue;
        }
        if trimmed.is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        if is_heading(trimmed) {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(trimmed);
    }

    let text = strip_inline_markdown(&lines.join(" "));
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|ch| *ch == '#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with(' ')
}

fn strip_inline_markdown(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut idx = 0;

    while idx < chars.len() {
        let ch = chars[idx];
        match ch {
            '\\' if idx + 1 < chars.len() => {
                out.push(chars[idx + 1]);
                idx += 2;
            }
            '`' | '*' => idx += 1,
            '_' => {
                let prev_word = idx > 0 && chars[idx - 1].is_alphanumeric();
                let next_word = chars.get(idx + 1).is_some_and(|next| next.is_alphanumeric());
                if prev_word && next_word {
                    out.push('_');
                }
                idx += 1;
            }
            '[' => {
                if let Some((label, next)) = parse_link(&chars, idx) {
                    out.push_str(&strip_inline_markdown(&label));
                    idx = next;
                } else {
                    out.push('[');
                    idx += 1;
                }
            }
            _ => {
                out.push(ch);
                idx += 1;
            }
        }
    }
    out
}

/// Parses `[label](target)`, `[label][ref]`, or `[label]` starting at
/// `start`, returning the label and the index after the link.
fn parse_link(chars: &[char], start: usize) -> Option<(String, usize)> {
    let close = find_char(chars, start + 1, ']')?;
    let label: String = chars[start + 1..close].iter().collect();
    if label.trim().is_empty() {
        return None;
    }
    let next = match chars.get(close + 1) {
        Some('(') => find_char(chars, close + 2, ')').map_or(close + 1, |end| end + 1),
        Some('[') => find_char(chars, close + 2, ']').map_or(close + 1, |end| end + 1),
        _ => close + 1,
    };
    Some((label, next))
}

fn find_char(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars
        .get(from..)?
        .iter()
        .position(|ch| *ch == target)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::short_summary;

    #[test]
    fn takes_first_paragraph() {
        let docs = "Get information about a guild.\n\nReturns a `Guild` model.";
        assert_eq!(short_summary(docs), "Get information about a guild.");
    }

    #[test]
    fn joins_wrapped_lines() {
        let docs = "Delete a guild permanently.\nThe user must be the owner.\n";
        assert_eq!(
            short_summary(docs),
            "Delete a guild permanently. The user must be the owner."
        );
    }

    #[test]
    fn strips_links_and_code_spans() {
        let docs = "Update a guild's [`Widget`](crate::Widget) via [`Client`].";
        assert_eq!(short_summary(docs), "Update a guild's Widget via Client.");
    }

    #[test]
    fn keeps_snake_case_and_drops_emphasis() {
        let docs = "See *update_guild* and __bold__ text.";
        assert_eq!(short_summary(docs), "See update_guild and bold text.");
    }

    #[test]
    fn skips_leading_heading_and_code() {
        let docs = "# Examples\n\n```rust\nlet x = 1;\n```\n\nReal summary.";
        assert_eq!(short_summary(docs), "Real summary.");
    }

    #[test]
    fn empty_docs_give_empty_summary() {
        assert_eq!(short_summary(""), "");
        assert_eq!(short_summary("\n\n"), "");
    }
}
