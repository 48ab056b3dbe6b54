//! Substring token extraction from third-party markup

/// Extract the text between the first occurrence of `start` and the next
/// occurrence of `end`, or `None` when either marker is absent.
///
/// The share page embeds its tokens in inline JavaScript, so this is plain
/// string search against markup the origin can change at any time. Callers
/// must treat `None` as a resolution failure, not retry.
pub fn find_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let len = text[from..].find(end)?;
    Some(&text[from..from + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_between_markers() {
        let text = r#"var x = fn%28%22TOKEN123%22%29;"#;
        assert_eq!(find_between(text, "fn%28%22", "%22%29"), Some("TOKEN123"));
    }

    #[test]
    fn test_start_marker_absent() {
        assert_eq!(find_between("no markers here", "fn%28%22", "%22%29"), None);
    }

    #[test]
    fn test_end_marker_absent() {
        assert_eq!(find_between("fn%28%22TOKEN123", "fn%28%22", "%22%29"), None);
    }

    #[test]
    fn test_empty_match() {
        assert_eq!(find_between("ab", "a", "b"), Some(""));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let text = "dp-logid=111&x=1&dp-logid=222&";
        assert_eq!(find_between(text, "dp-logid=", "&"), Some("111"));
    }

    #[test]
    fn test_quoted_json_field() {
        let text = r#"{"bdstoken":"abc123","other":"x"}"#;
        assert_eq!(find_between(text, r#"bdstoken":""#, r#"""#), Some("abc123"));
    }
}
