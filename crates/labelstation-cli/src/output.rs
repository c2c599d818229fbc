//! Text or JSON output.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

/// How answers are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Output {
    json: bool,
    compact: bool,
}

impl Output {
    /// Human-readable text.
    pub fn text() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON documents.
    pub fn json() -> Self {
        Self {
            json: true,
            compact: false,
        }
    }

    pub fn new(json: bool) -> Self {
        if json { Self::json() } else { Self::text() }
    }

    /// One JSON object per line.
    pub fn line_delimited(mut self) -> Self {
        self.compact = true;
        self
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Write `value` as JSON, or the text built by `text`.
    pub fn emit<W, T, F>(&self, out: &mut W, value: &T, text: F) -> Result<()>
    where
        W: Write,
        T: Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        if self.json {
            let doc = if self.compact {
                serde_json::to_string(value)?
            } else {
                serde_json::to_string_pretty(value)?
            };
            writeln!(out, "{doc}")?;
        } else {
            writeln!(out, "{}", text())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn emitted(output: Output) -> String {
        let mut buf = Vec::new();
        output
            .emit(&mut buf, &json!({"ready": true, "reasons": []}), || "Device ready".to_string())
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_output() {
        assert_eq!(emitted(Output::text()), "Device ready\n");
    }

    #[test]
    fn test_json_output_is_pretty() {
        let text = emitted(Output::json());
        assert!(text.contains("\n  \"ready\": true"));
    }

    #[test]
    fn test_line_delimited_json() {
        let text = emitted(Output::json().line_delimited());
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["ready"], true);
    }
}
