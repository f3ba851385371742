use super::*;

impl JavaCodeGenerator {
    /// Escape special characters in Java string literals.
    pub(super) fn escape_string(value: &str) -> String {
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    /// Push multiple lines to JavaSourceBuilder, preserving indentation.
    pub(super) fn push_lines(builder: &mut JavaSourceBuilder, text: &str) {
        for line in text.lines() {
            builder.push_line(line);
        }
    }

    /// Parenthesizes expression text unless it is already atomic.
    pub(super) fn parenthesize(code: String) -> String {
        let atomic = code
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '$' || c == '"');
        if atomic {
            code
        } else {
            format!("({})", code)
        }
    }
}
