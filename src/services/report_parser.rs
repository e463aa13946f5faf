//! Recovery of the narrative report from free-form model output.
//!
//! The model is asked for a JSON object but answers are untrusted. Recovery
//! runs a cascade of increasingly permissive strategies and stops at the
//! first one that yields an object with at least one known report field.

use crate::models::report::{AiNarrative, AiStatus, Recommendation};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

/// Minimum number of fields the key-by-key fallback must find before its
/// result is trusted.
pub const MIN_REGEX_FIELDS: usize = 5;

/// Report keys as `(camelCase, snake_case)`.
pub const REPORT_FIELDS: [(&str, &str); 8] = [
    ("technicalAnalysis", "technical_analysis"),
    ("personalityAnalysis", "personality_analysis"),
    ("strengths", "strengths"),
    ("weaknesses", "weaknesses"),
    ("overallAssessment", "overall_assessment"),
    ("interviewFocus", "interview_focus"),
    ("recommendation", "recommendation"),
    ("recommendationReason", "recommendation_reason"),
];

const MANUAL_REVIEW: &str = "manual review recommended.";

lazy_static! {
    /// ```json ... ``` or a bare ``` ... ``` block
    static ref FENCED_RE: Regex = Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").unwrap();

    /// Trailing commas before } or ]
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();

    /// `"key": "value"` for every known key, escape-aware on the value
    static ref FIELD_RES: Vec<(&'static str, Regex)> = REPORT_FIELDS
        .iter()
        .map(|(camel, snake)| {
            let pattern = format!(
                r#""(?:{}|{})"\s*:\s*"((?:[^"\\]|\\.)*)""#,
                regex::escape(camel),
                regex::escape(snake)
            );
            (*camel, Regex::new(&pattern).unwrap())
        })
        .collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStage {
    Strict,
    Fenced,
    Balanced,
    Permissive,
    FieldRegex,
}

impl RecoveryStage {
    pub fn status(self) -> AiStatus {
        match self {
            RecoveryStage::Strict => AiStatus::Generated,
            _ => AiStatus::Recovered,
        }
    }
}

pub fn extract_fenced(text: &str) -> Option<&str> {
    FENCED_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// First `{...}` span whose braces balance, ignoring braces inside string
/// literals. Starts after an unbalanced opening brace are retried from the
/// next one.
pub fn balanced_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, &b) in bytes.iter().enumerate().skip(start) {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=i]);
                    }
                }
                _ => {}
            }
        }

        search_from = start + 1;
    }

    None
}

/// Example: `{"a": "b",}` -> `{"a": "b"}`
pub fn fix_trailing_commas(json_str: &str) -> String {
    TRAILING_COMMA_RE.replace_all(json_str, "$1").to_string()
}

fn field<'a>(map: &'a Map<String, JsonValue>, camel: &str, snake: &str) -> Option<&'a JsonValue> {
    map.get(camel).or_else(|| map.get(snake))
}

fn has_known_field(map: &Map<String, JsonValue>) -> bool {
    REPORT_FIELDS
        .iter()
        .any(|(camel, snake)| field(map, camel, snake).is_some())
}

fn parse_object(candidate: &str) -> Option<Map<String, JsonValue>> {
    match serde_json::from_str::<JsonValue>(candidate.trim()) {
        Ok(JsonValue::Object(map)) if has_known_field(&map) => Some(map),
        _ => None,
    }
}

fn extract_fields(text: &str) -> Option<Map<String, JsonValue>> {
    let mut map = Map::new();
    for (key, re) in FIELD_RES.iter() {
        if let Some(raw) = re.captures(text).and_then(|c| c.get(1)) {
            let value = serde_json::from_str::<String>(&format!("\"{}\"", raw.as_str()))
                .unwrap_or_else(|_| raw.as_str().to_string());
            map.insert(key.to_string(), JsonValue::String(value));
        }
    }
    (map.len() >= MIN_REGEX_FIELDS).then_some(map)
}

/// Runs the recovery cascade. `None` means the output is unusable.
pub fn recover_fields(text: &str) -> Option<(Map<String, JsonValue>, RecoveryStage)> {
    if let Some(map) = parse_object(text) {
        return Some((map, RecoveryStage::Strict));
    }

    let fenced = extract_fenced(text);
    if let Some(map) = fenced.and_then(parse_object) {
        return Some((map, RecoveryStage::Fenced));
    }

    let balanced = fenced
        .and_then(balanced_span)
        .into_iter()
        .chain(balanced_span(text))
        .collect::<Vec<_>>();
    if let Some(map) = balanced.iter().find_map(|s| parse_object(s)) {
        return Some((map, RecoveryStage::Balanced));
    }

    let candidates = std::iter::once(text)
        .chain(fenced)
        .chain(balanced.iter().copied());
    for candidate in candidates {
        if let Some(map) = parse_object(&fix_trailing_commas(candidate)) {
            return Some((map, RecoveryStage::Permissive));
        }
    }

    extract_fields(text).map(|map| (map, RecoveryStage::FieldRegex))
}

fn value_text(value: &JsonValue) -> Option<String> {
    let text = match value {
        JsonValue::Null => return None,
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(" "),
        JsonValue::Object(map) => map
            .values()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn placeholder_text(camel: &str) -> String {
    let subject = match camel {
        "technicalAnalysis" => "Technical analysis",
        "personalityAnalysis" => "Personality analysis",
        "strengths" => "Strengths",
        "weaknesses" => "Weaknesses",
        "overallAssessment" => "Overall assessment",
        "interviewFocus" => "Interview focus",
        "recommendationReason" => "Recommendation reasoning",
        _ => "Analysis",
    };
    format!("{} unavailable; {}", subject, MANUAL_REVIEW)
}

/// Flattens a recovered map into the fixed narrative shape. Arrays are
/// joined with a space; missing or empty fields get a placeholder sentence.
pub fn normalize_report(map: &Map<String, JsonValue>) -> AiNarrative {
    let text = |camel: &str, snake: &str| {
        field(map, camel, snake)
            .and_then(value_text)
            .unwrap_or_else(|| placeholder_text(camel))
    };

    let recommendation = match field(map, "recommendation", "recommendation").and_then(value_text) {
        Some(raw) => Recommendation::parse(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "unrecognised recommendation, using medium");
            Recommendation::Medium
        }),
        None => Recommendation::Medium,
    };

    AiNarrative {
        technical_analysis: text("technicalAnalysis", "technical_analysis"),
        personality_analysis: text("personalityAnalysis", "personality_analysis"),
        strengths: text("strengths", "strengths"),
        weaknesses: text("weaknesses", "weaknesses"),
        overall_assessment: text("overallAssessment", "overall_assessment"),
        interview_focus: text("interviewFocus", "interview_focus"),
        recommendation,
        recommendation_reason: text("recommendationReason", "recommendation_reason"),
    }
}

pub fn placeholder_report() -> AiNarrative {
    normalize_report(&Map::new())
}

/// Narrative plus how it was obtained. Unusable output yields the
/// placeholder narrative and [`AiStatus::Fallback`].
pub fn interpret(raw: &str) -> (AiNarrative, AiStatus) {
    match recover_fields(raw) {
        Some((map, stage)) => {
            if stage != RecoveryStage::Strict {
                tracing::warn!(?stage, "model output needed recovery");
            }
            (normalize_report(&map), stage.status())
        }
        None => {
            tracing::warn!(len = raw.len(), "model output unusable, using placeholder report");
            (placeholder_report(), AiStatus::Fallback)
        }
    }
}
