// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output formatting: `--json` machine output vs. a human key/value table,
//! with color gated on TTY + `NO_COLOR` + `--no-color` (§4.6, §6.3).

use std::io::IsTerminal;

use serde_json::Value;

const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Human,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputFormat::Json } else { OutputFormat::Human }
    }
}

/// Whether ANSI color should be used for this invocation: TTY, `NO_COLOR`
/// unset, and `--no-color` not passed (§4.6).
pub fn color_enabled(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn paint(s: &str, code: &str, color: bool) -> String {
    if color { format!("{code}{s}{RESET}") } else { s.to_string() }
}

/// Render a successful result.
pub fn render_value(value: &Value, format: OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
        OutputFormat::Human => render_table(value, color),
    }
}

/// Render an error (§7): JSON mode emits `{"error":{...}}`; human mode
/// prints the `Error::Display` string, bolded red when color is enabled.
pub fn render_error(err: &erpl_error::Error, format: OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&err.to_json()).unwrap_or_default(),
        OutputFormat::Human => paint(&err.to_string(), &format!("{BOLD}{RED}"), color),
    }
}

fn render_table(value: &Value, color: bool) -> String {
    match value {
        Value::Object(map) => {
            let mut lines = Vec::new();
            for (key, v) in map {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    Value::Array(items) => format!("[{} items]", items.len()),
                    other => other.to_string(),
                };
                let key = paint(key, BOLD, color);
                lines.push(format!("{key:<24} {rendered}"));
            }
            lines.join("\n")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn human_table_renders_object_fields() {
        let value = json!({ "uri": "/sap/bc/adt/oo/classes/zcl_demo", "exists": true });
        let rendered = render_table(&value, false);
        assert!(rendered.contains("uri"));
        assert!(rendered.contains("/sap/bc/adt/oo/classes/zcl_demo"));
    }

    #[test]
    fn json_format_is_parseable() {
        let value = json!({ "a": 1 });
        let rendered = render_value(&value, OutputFormat::Json, false);
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn no_color_flag_disables_color_unconditionally() {
        assert!(!color_enabled(true));
    }
}
