//! Key, login and slug sanitizers.
//!
//! Both ends of the wire normalize identifiers the same way so that a type
//! slug or login produced on one side matches on the other.

/// Lowercases and keeps only `a-z`, `0-9`, `_` and `-`.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Strict login sanitization.
///
/// Drops markup and anything outside `A-Z a-z 0-9 space _ . - @`, then
/// trims and collapses runs of whitespace.
pub fn sanitize_user(raw: &str) -> String {
    let stripped = strip_tags(raw);
    let kept: String = stripped
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-' | '@'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Produces a URL-safe name: lowercase alphanumerics separated by single
/// hyphens, with no leading or trailing hyphen.
pub fn sanitize_title(raw: &str) -> String {
    let stripped = strip_tags(raw);
    let mut out = String::with_capacity(stripped.len());
    let mut pending_dash = false;
    for c in stripped.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' || c == '.' {
            pending_dash = true;
        }
    }
    out
}

/// Basic email validity check.
///
/// Requires at least six characters, exactly one `@`, a non-empty local part
/// and a dotted domain whose labels are non-empty alphanumerics or hyphens.
pub fn is_email(raw: &str) -> bool {
    if raw.len() < 6 {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c));
    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    local_ok && domain_ok
}

fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
