/// Reduce a model reply to plain text: trims surrounding whitespace and
/// unwraps a reply that is entirely one fenced code block.
pub fn strip_wrapper(raw: &str) -> String {
    let text = raw.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text.to_string();
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return text.to_string();
    };
    // Drop an info string such as ```markdown
    let body = match inner.split_once('\n') {
        Some((info, rest)) if !info.trim().contains(' ') => rest,
        _ => inner,
    };
    body.trim().to_string()
}
