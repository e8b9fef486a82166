use crate::core::cleaner::clean_response;
use crate::domain::model::{EvaluationRow, QueryReference, RowOutcome, ScoredPair};
use crate::utils::error::{EvalError, Result};
use serde_json::Value;

/// 解析 reference 欄位：JSON 陣列，每個元素含 query 與 summary
pub fn parse_references(row_index: usize, raw: &str) -> Result<Vec<QueryReference>> {
    let references: Vec<QueryReference> =
        serde_json::from_str(raw).map_err(|e| EvalError::ReferenceError {
            row: row_index,
            message: e.to_string(),
        })?;

    Ok(references
        .into_iter()
        .map(|r| QueryReference {
            query: r.query.trim().to_string(),
            summary: r.summary,
        })
        .collect())
}

fn prediction_text(item: &Value) -> String {
    match item.get("summary") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => python_text(other),
        None => String::new(),
    }
}

/// 非字串的 summary 以 Python `str()` 的寫法轉成文字（None / True / repr）
fn python_text(value: &Value) -> String {
    let mut out = String::new();
    write_python(value, &mut out);
    out
}

fn write_python(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_python_repr(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_python(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_python_repr(key, out);
                out.push_str(": ");
                write_python(item, out);
            }
            out.push('}');
        }
    }
}

fn write_python_repr(s: &str, out: &mut String) {
    // 含單引號但沒有雙引號時改用雙引號
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || (0x7f..0xa0).contains(&(c as u32)) => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Predictions from a cleaned response, or `None` if it is not valid JSON.
///
/// Only the first `expected` elements are used. A valid JSON value that is not
/// an array yields no predictions.
pub fn parse_predictions(cleaned: &str, expected: usize) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(cleaned).ok()?;
    let predictions = match value {
        Value::Array(items) => items.iter().take(expected).map(prediction_text).collect(),
        _ => Vec::new(),
    };
    Some(predictions)
}

/// Score-ready pairs for one CSV row.
///
/// Every reference gets exactly one prediction; missing ones are empty
/// strings, so a row that fails to parse still drags the file's ROUGE down.
pub fn process_row(row_index: usize, row: &EvaluationRow) -> Result<RowOutcome> {
    let references = parse_references(row_index, &row.reference)?;
    let cleaned = clean_response(&row.summary);

    let (parsed, mut predictions) = match parse_predictions(&cleaned, references.len()) {
        Some(predictions) => (true, predictions),
        None => {
            tracing::debug!("Row {}: response is not valid JSON after cleaning", row_index);
            (false, Vec::new())
        }
    };
    predictions.resize(references.len(), String::new());

    let pairs = references
        .into_iter()
        .zip(predictions)
        .map(|(reference, prediction)| ScoredPair {
            query: reference.query,
            prediction,
            reference: reference.summary,
        })
        .collect();

    Ok(RowOutcome {
        parsed,
        pairs,
    })
}
