//! The disable-comment guard.
//!
//! `// dittory-disable-next-line` (leading) and `// dittory-disable-line`
//! (trailing) suppress the usages of the call/JSX element they annotate.
//! Implemented as a text scan over the enclosing statement's line and the
//! line above it, using `ast::line_and_previous` — there is no pre-built
//! trivia index available, and a line-based scan is sufficient for the
//! single-line/line-above placements the protocol defines.

const DISABLE_NEXT_LINE: &str = "dittory-disable-next-line";
const DISABLE_LINE: &str = "dittory-disable-line";

/// `node_offset` is the byte offset of the call/JSX element's enclosing
/// statement (or, failing that, the node itself) within `text`.
pub fn has_disable(text: &str, node_offset: u32) -> bool {
    let (line, prev) = crate::ast::line_and_previous(text, node_offset);
    if line.contains(DISABLE_LINE) {
        return true;
    }
    if let Some(prev) = prev {
        if prev.contains(DISABLE_NEXT_LINE) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_leading_disable_next_line() {
        let text = "// dittory-disable-next-line\nlog(\"a\", \"INFO\");\n";
        let offset = text.find("log(").unwrap() as u32;
        assert!(has_disable(text, offset));
    }

    #[test]
    fn detects_trailing_disable_line() {
        let text = "log(\"a\", \"INFO\"); // dittory-disable-line\n";
        let offset = text.find("log(").unwrap() as u32;
        assert!(has_disable(text, offset));
    }

    #[test]
    fn matches_as_substring_alongside_other_disables() {
        let text = "// eslint-disable-next-line dittory-disable-next-line no-unused\nlog(\"a\");\n";
        let offset = text.find("log(").unwrap() as u32;
        assert!(has_disable(text, offset));
    }

    #[test]
    fn no_false_positive_without_token() {
        let text = "log(\"a\", \"INFO\");\n";
        let offset = text.find("log(").unwrap() as u32;
        assert!(!has_disable(text, offset));
    }
}
