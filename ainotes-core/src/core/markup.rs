//! Plain-text helpers for rich-text note content.

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

/// Strips markup tags from `markup`, decodes the common HTML entities and
/// collapses runs of whitespace into single spaces.
///
/// ```rust
/// use ainotes_core::plain_text;
///
/// assert_eq!(plain_text("<p>Fish &amp; chips</p><p>today</p>"), "Fish & chips today");
/// ```
pub fn plain_text(markup: &str) -> String {
    let stripped = TAG.replace_all(markup, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the text before the first `.`, `!` or `?` that is followed by
/// whitespace or the end of input, trimmed. `None` when that is empty.
pub fn first_sentence(text: &str) -> Option<&str> {
    let mut chars = text.char_indices().peekable();
    let mut end = text.len();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
            if boundary {
                end = i;
                break;
            }
        }
    }
    let sentence = text[..end].trim();
    (!sentence.is_empty()).then_some(sentence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_tags_and_whitespace() {
        assert_eq!(
            plain_text("<h1>Title</h1>\n<p>First   line<br/>second</p>"),
            "Title First line second"
        );
        assert_eq!(plain_text(""), "");
        assert_eq!(plain_text("<p></p>"), "");
    }

    #[test]
    fn test_plain_text_decodes_entities() {
        assert_eq!(plain_text("a&nbsp;&lt;b&gt; &quot;c&quot; &#39;d&#39;"), "a <b> \"c\" 'd'");
        assert_eq!(plain_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_first_sentence() {
        assert_eq!(first_sentence("Hello world. More text."), Some("Hello world"));
        assert_eq!(first_sentence("Is it? Yes"), Some("Is it"));
        assert_eq!(first_sentence("Version 1.2 is out! Go"), Some("Version 1.2 is out"));
        assert_eq!(first_sentence("No terminator"), Some("No terminator"));
        assert_eq!(first_sentence("Ends here."), Some("Ends here"));
        assert_eq!(first_sentence("   "), None);
        assert_eq!(first_sentence(". leading"), None);
    }
}
