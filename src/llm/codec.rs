//! Recover the structured payload from oracle prose
//!
//! Models like to wrap JSON in markdown fences. Stripping them never
//! fails; a reply that is still not valid JSON afterwards is the
//! decoder's problem, not ours.

const OPENING_FENCE: &str = "```json";
const CLOSING_FENCE: &str = "```";

/// Remove a ```` ```json ```` fence pair around the reply, if present
///
/// Without a leading fence the trimmed input comes back unchanged.
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();

    let Some(rest) = text.strip_prefix(OPENING_FENCE) else {
        return text;
    };

    let rest = rest.trim();
    let body = match rest.rfind(CLOSING_FENCE) {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    body.trim()
}
