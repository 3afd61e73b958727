//! Splitting of declaration values into comma- and space-separated lists.
//!
//! Separators inside quotes or parentheses do not split, so
//! `cubic-bezier(0, 0, 1, 1)` stays one entry of a comma list.

/// Split a value on top-level commas: `a 1s, b 2s` → `["a 1s", "b 2s"]`.
pub fn comma(value: &str) -> Vec<String> {
    split(value, &[','])
}

/// Split a value on top-level whitespace: `spin 1s linear` → `["spin", "1s", "linear"]`.
pub fn space(value: &str) -> Vec<String> {
    split(value, &[' ', '\n', '\t', '\r', '\x0C'])
}

fn split(value: &str, separators: &[char]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in value.chars() {
        if escaped {
            escaped = false;
            current.push(ch);
            continue;
        }
        if ch == '\\' {
            escaped = true;
            current.push(ch);
            continue;
        }
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && separators.contains(&ch) => {
                flush(&mut out, &mut current);
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    flush(&mut out, &mut current);
    out
}

fn flush(out: &mut Vec<String>, current: &mut String) {
    let entry = current.trim();
    if !entry.is_empty() {
        out.push(entry.to_string());
    }
    current.clear();
}
