//! Output formatting
//!
//! Every command builds one [`Output`]; in `--json` mode the fields are
//! printed as a single object, otherwise the human-readable lines are.

use serde::Serialize;
use serde_json::{Map, Value};

/// Output builder for formatted CLI output
pub struct Output {
    json_mode: bool,
    fields: Map<String, Value>,
    lines: Vec<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: Map::new(),
            lines: Vec::new(),
        }
    }

    /// Add a string field
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.into()));
        self
    }

    /// Add a u64 field
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add a boolean field
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), Value::Bool(value));
        self
    }

    /// Add any serializable field. Values that fail to serialize become null.
    pub fn field_serialize<T: Serialize>(mut self, key: &str, value: &T) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Append a human-readable line
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Render without printing
    pub fn render(&self) -> String {
        if self.json_mode {
            serde_json::to_string_pretty(&self.fields).unwrap_or_default()
        } else {
            self.lines.join("\n")
        }
    }

    /// Print the output
    pub fn print(self) {
        let rendered = self.render();
        if !rendered.is_empty() {
            println!("{rendered}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_mode_prints_lines() {
        let output = Output::new(false)
            .field("status", "ok")
            .line("first")
            .line("second");
        assert_eq!(output.render(), "first\nsecond");
    }

    #[test]
    fn test_json_mode_prints_fields() {
        let output = Output::new(true)
            .field("status", "ok")
            .field_u64("gasUsed", 24)
            .field_bool("success", true)
            .field_serialize("logs", &Vec::<u8>::new())
            .line("ignored");
        let value: Value = serde_json::from_str(&output.render()).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["gasUsed"], 24);
        assert_eq!(value["success"], true);
        assert_eq!(value["logs"], serde_json::json!([]));
    }
}
