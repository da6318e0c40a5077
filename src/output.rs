use serde_json::Value;

use crate::normalize::Summary;
use crate::pipeline::{RunError, Workflow};

/// Render a summary as pretty-printed JSON
pub fn render_json(summary: &Summary) -> String {
    serde_json::to_string_pretty(&summary.to_value()).unwrap_or_else(|_| summary.to_value().to_string())
}

/// Render a summary for reading in a terminal: keys as headings, arrays as bullets
pub fn render_text(summary: &Summary) -> String {
    match summary {
        Summary::Fallback(fb) => format!("⚠️ {}\n\n{}", fb.error, fb.original_content),
        Summary::Parsed(map) => {
            let mut out = String::new();
            for (key, value) in map {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&format!("■ {key}\n"));
                push_value(&mut out, value, 1);
            }
            out.trim_end().to_string()
        }
    }
}

fn push_value(out: &mut String, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Array(_) | Value::Object(_) => {
                        out.push_str(&format!("{indent}-\n"));
                        push_value(out, item, depth + 1);
                    }
                    _ => out.push_str(&format!("{indent}- {}\n", scalar(item))),
                }
            }
        }
        Value::Object(map) => {
            for (key, inner) in map {
                match inner {
                    Value::Array(_) | Value::Object(_) => {
                        out.push_str(&format!("{indent}{key}:\n"));
                        push_value(out, inner, depth + 1);
                    }
                    _ => out.push_str(&format!("{indent}{key}: {}\n", scalar(inner))),
                }
            }
        }
        _ => {
            for line in scalar(value).lines() {
                out.push_str(&format!("{indent}{line}\n"));
            }
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render a terminal run failure as a one-line message
pub fn render_failure(workflow: Workflow, error: &RunError) -> String {
    format!("ERROR: {workflow} run failed - {error}")
}
