/// A text insertion at a byte offset into a file's original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte offset into the original text.
    pub position: usize,

    /// Text inserted at `position`.
    pub text: String,
}

impl Edit {
    /// Creates a new [`Edit`].
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// Inserts every edit into `original`. Edits never replace text. Edits at the same position
/// are inserted in the order they appear in `edits`.
///
/// Positions past the end of `original` are clamped to its end.
pub fn splice(original: &str, mut edits: Vec<Edit>) -> String {
    // `sort_by_key` is stable, which keeps same-position edits in list order.
    edits.sort_by_key(|edit| edit.position);

    let inserted: usize = edits.iter().map(|edit| edit.text.len()).sum();
    let mut out = String::with_capacity(original.len() + inserted);
    let mut cursor = 0;

    for edit in &edits {
        let position = edit.position.min(original.len());
        out.push_str(&original[cursor..position]);
        out.push_str(&edit.text);
        cursor = position;
    }

    out.push_str(&original[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn no_edits() {
        assert_eq!(splice("abc", vec![]), "abc");
    }

    #[test]
    fn edits_are_applied_in_position_order() {
        let edits = vec![Edit::new(3, "<3>"), Edit::new(0, "<0>"), Edit::new(6, "<6>")];
        assert_eq!(splice("abcdef", edits), "<0>abc<3>def<6>");
    }

    #[test]
    fn ties_keep_insertion_order() {
        let edits = vec![Edit::new(1, "A"), Edit::new(2, "x"), Edit::new(1, "B")];
        assert_eq!(splice("012", edits), "0AB1x2");
    }

    #[test]
    fn original_text_survives() {
        let original = "class A {\n  m() {}\n}\n";
        let edits = vec![
            Edit::new(0, "//start\n"),
            Edit::new(12, "/** doc */\n"),
            Edit::new(original.len(), "//end\n"),
            Edit::new(12, "/** more */\n"),
        ];

        let spliced = splice(original, edits.clone());
        let mut rest = spliced.as_str();
        let mut rebuilt = String::new();
        let mut sorted = edits;
        sorted.sort_by_key(|edit| edit.position);

        let mut cursor = 0;
        for edit in &sorted {
            let untouched = edit.position - cursor;
            rebuilt.push_str(&rest[..untouched]);
            rest = &rest[untouched..];
            assert!(rest.starts_with(&edit.text));
            rest = &rest[edit.text.len()..];
            cursor = edit.position;
        }
        rebuilt.push_str(rest);

        assert_eq!(rebuilt, original);
    }

    #[test]
    fn positions_past_the_end_are_clamped() {
        assert_eq!(splice("ab", vec![Edit::new(10, "!")]), "ab!");
    }
}
