//! Heuristic repair of raw LLM responses into parseable JSON arrays.
//!
//! The rules mirror the output patterns seen from instruction-tuned models
//! answering a multi-query prompt: the prompt echoed before `[/INST]`,
//! markdown fences, quoted words inside summaries, objects missing the
//! separating comma, and trailing commentary after the array.

use regex::Regex;
use std::sync::LazyLock;

const INST_MARKER: &str = "[/INST]";
const TRANSCRIPT_END_MARKER: &str = "#Transcript End";
const PROTECTED_KEYS: [&str; 2] = ["query", "summary"];

static QUOTED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(\w(?:[\w-]*\w)?)""#).expect("quoted word pattern"));

static ADJACENT_OBJECTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}(\s*)\{").expect("adjacent objects pattern"));

/// Clean a raw model response so it has a chance of parsing as a JSON array.
///
/// Returns an empty string when nothing is left after cleaning; callers treat
/// that as a format failure.
pub fn clean_response(raw: &str) -> String {
    let response = raw.trim();

    // 只保留最後一個 [/INST] 之後的內容
    let response = match response.rfind(INST_MARKER) {
        Some(idx) => &response[idx + INST_MARKER.len()..],
        None => response,
    };

    // 從第一個 '[' 開始
    let mut response = match response.find('[') {
        Some(idx) => response[idx..].to_string(),
        None => "[".to_string(),
    };

    response = response.replace('\n', " ");
    response = response.replace(",\"", ",");
    response = replace_quotes(&response);
    response = response.replace("```", "");
    response = response.replace('\'', " ");
    response = response.replace("â€˜", " ");
    response = response.replace("â€œ", " ");
    response = response.replace("[ / JSONObjects]", " ");
    response = ADJACENT_OBJECTS
        .replace_all(&response, "},${1}{")
        .into_owned();

    let response = match response.rfind(TRANSCRIPT_END_MARKER) {
        Some(idx) => &response[idx + TRANSCRIPT_END_MARKER.len()..],
        None => response.as_str(),
    }
    .trim();

    if response.is_empty() {
        return String::new();
    }

    if response.ends_with(']') {
        return response.to_string();
    }

    match response.rfind(']') {
        Some(idx) => response[..=idx].to_string(),
        None => "]".to_string(),
    }
}

/// Turn `"word"` into `'word'` for single quoted words, leaving the JSON keys
/// `"query"` and `"summary"` untouched.
///
/// A rejected candidate only consumes its opening quote, so its closing quote
/// can still open the next match.
pub fn replace_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut pos = 0;

    while let Some(caps) = QUOTED_WORD.captures_at(text, pos) {
        let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
            break;
        };

        if is_protected_key(word.as_str()) {
            pos = whole.start() + 1;
            continue;
        }

        out.push_str(&text[last..whole.start()]);
        out.push('\'');
        out.push_str(word.as_str());
        out.push('\'');
        last = whole.end();
        pos = whole.end();
    }

    out.push_str(&text[last..]);
    out
}

fn is_protected_key(word: &str) -> bool {
    PROTECTED_KEYS.iter().any(|key| {
        word == *key
            || word
                .strip_prefix(key)
                .is_some_and(|rest| rest.starts_with('-'))
    })
}
