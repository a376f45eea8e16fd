//! Token stream for generated query text
//!
//! The text generator only decides *what* goes where; indentation is
//! applied afterwards by `render_fragments`.

/// One token of generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Literal text, written as is
    Text(String),
    /// Increase the indentation of following lines
    Indent,
    /// Decrease the indentation of following lines
    Outdent,
    /// End the current line
    Newline,
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Fragment::Text(text.to_string())
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Fragment::Text(text)
    }
}

/// Pretty-print a token stream
///
/// Indentation is written lazily before the first text of each line, so
/// an `Indent` or `Outdent` placed right after a `Newline` affects that
/// line. Outdenting below column zero is clamped.
pub fn render_fragments(fragments: &[Fragment], indent_width: usize) -> String {
    let mut code = String::new();
    let mut depth: usize = 0;
    let mut start_of_line = true;

    for fragment in fragments {
        match fragment {
            Fragment::Newline => {
                code.push('\n');
                start_of_line = true;
            }
            Fragment::Indent => depth += 1,
            Fragment::Outdent => depth = depth.saturating_sub(1),
            Fragment::Text(text) => {
                if start_of_line {
                    code.push_str(&" ".repeat(depth * indent_width));
                    start_of_line = false;
                }
                code.push_str(text);
            }
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_text() {
        let fragments = vec![Fragment::from("a"), Fragment::from(" b")];
        assert_eq!(render_fragments(&fragments, 2), "a b");
    }

    #[test]
    fn test_render_indented_block() {
        let fragments = vec![
            Fragment::from("{"),
            Fragment::Newline,
            Fragment::Indent,
            Fragment::from("x"),
            Fragment::Newline,
            Fragment::Outdent,
            Fragment::from("}"),
        ];
        assert_eq!(render_fragments(&fragments, 2), "{\n  x\n}");
        assert_eq!(render_fragments(&fragments, 4), "{\n    x\n}");
    }

    #[test]
    fn test_indent_applies_mid_line_to_next_line_only() {
        let fragments = vec![
            Fragment::from("a"),
            Fragment::Indent,
            Fragment::from("b"),
            Fragment::Newline,
            Fragment::from("c"),
        ];
        assert_eq!(render_fragments(&fragments, 2), "ab\n  c");
    }

    #[test]
    fn test_outdent_clamps_at_zero() {
        let fragments = vec![Fragment::Outdent, Fragment::Outdent, Fragment::from("x")];
        assert_eq!(render_fragments(&fragments, 2), "x");
    }
}
