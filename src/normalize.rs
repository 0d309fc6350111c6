//! Text cleanup applied to every extracted field

/// Collapse whitespace runs to one space, drop non-breaking spaces (raw or
/// as a leftover `&nbsp;` entity) and trim.
pub fn clean_text(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
