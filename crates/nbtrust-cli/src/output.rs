//! Output formatting utilities.

use serde_json::json;
use std::path::Path;

/// Formats the outcome of an operation on one notebook.
pub fn verdict_line(path: &Path, verdict: &str, as_json: bool) -> String {
    if as_json {
        json!({ "path": path.display().to_string(), "verdict": verdict }).to_string()
    } else {
        format!("{:<10} {}", verdict, path.display())
    }
}

/// Formats a bare notebook path.
pub fn path_line(path: &Path, as_json: bool) -> String {
    if as_json {
        json!({ "path": path.display().to_string() }).to_string()
    } else {
        path.display().to_string()
    }
}

/// Quotes a canonical token so control characters and empty tokens stay visible.
pub fn token_line(token: &str) -> String {
    serde_json::Value::String(token.to_owned()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_columns_align() {
        assert_eq!(
            verdict_line(Path::new("a.ipynb"), "trusted", false),
            "trusted    a.ipynb"
        );
    }

    #[test]
    fn json_lines_are_objects() {
        let line = verdict_line(Path::new("a.ipynb"), "signed", true);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["verdict"], "signed");
        assert_eq!(parsed["path"], "a.ipynb");
    }

    #[test]
    fn tokens_are_quoted() {
        assert_eq!(token_line(""), "\"\"");
        assert_eq!(token_line("a\nb"), "\"a\\nb\"");
    }
}
