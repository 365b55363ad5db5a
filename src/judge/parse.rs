//! Tolerant extraction of a verdict from free-form generator output

use crate::types::Verdict;
use serde_json::{Map, Value};

/// Why a generator response could not be turned into a [`Verdict`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerdictParseError {
    #[error("response contains no JSON object")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing field \"{0}\"")]
    MissingField(&'static str),

    #[error("\"score\" must be an integer, got {0}")]
    InvalidScore(String),

    #[error("\"reasoning\" must be a string")]
    InvalidReasoning,

    #[error("{0}")]
    OutOfRange(String),
}

/// Parse a verdict out of `response`.
///
/// Accepts the object bare, wrapped in a markdown code fence, or surrounded
/// by prose. `score` may be an integer, an integral float or a string holding
/// an integer.
pub fn parse_verdict(response: &str) -> Result<Verdict, VerdictParseError> {
    let object = extract_object(response)?;

    let score = match object.get("score") {
        None | Some(Value::Null) => return Err(VerdictParseError::MissingField("score")),
        Some(value) => parse_score(value)?,
    };
    let reasoning = match object.get("reasoning") {
        None | Some(Value::Null) => return Err(VerdictParseError::MissingField("reasoning")),
        Some(Value::String(reasoning)) => reasoning.trim().to_string(),
        Some(_) => return Err(VerdictParseError::InvalidReasoning),
    };

    Verdict::new(score, reasoning).map_err(VerdictParseError::OutOfRange)
}

/// The outermost `{...}` span of `response`, decoded as a JSON object
fn extract_object(response: &str) -> Result<Map<String, Value>, VerdictParseError> {
    let start = response.find('{').ok_or(VerdictParseError::NoJsonObject)?;
    let end = response.rfind('}').ok_or(VerdictParseError::NoJsonObject)?;
    if end < start {
        return Err(VerdictParseError::NoJsonObject);
    }

    match serde_json::from_str::<Value>(&response[start..=end]) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(VerdictParseError::NoJsonObject),
        Err(e) => Err(VerdictParseError::InvalidJson(e.to_string())),
    }
}

fn parse_score(value: &Value) -> Result<i64, VerdictParseError> {
    match value {
        Value::Number(n) => {
            if let Some(score) = n.as_i64() {
                return Ok(score);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e9 => Ok(f as i64),
                _ => Err(VerdictParseError::InvalidScore(n.to_string())),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| VerdictParseError::InvalidScore(format!("{:?}", s))),
        other => Err(VerdictParseError::InvalidScore(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object() {
        let verdict = parse_verdict(r#"{"score": 8, "reasoning": "Directly about the cast."}"#).unwrap();
        assert_eq!(verdict.score(), 8);
        assert_eq!(verdict.reasoning(), "Directly about the cast.");
    }

    #[test]
    fn fenced_object_with_prose() {
        let response = "Sure! Here is my evaluation:\n```json\n{\n  \"score\": 3,\n  \"reasoning\": \"Off topic.\"\n}\n```\nLet me know if you need more.";
        let verdict = parse_verdict(response).unwrap();
        assert_eq!(verdict.score(), 3);
    }

    #[test]
    fn lenient_score_forms() {
        assert_eq!(parse_verdict(r#"{"score": 7.0, "reasoning": "x"}"#).unwrap().score(), 7);
        assert_eq!(parse_verdict(r#"{"score": " 9 ", "reasoning": "x"}"#).unwrap().score(), 9);
    }

    #[test]
    fn fractional_score_is_rejected() {
        assert!(matches!(
            parse_verdict(r#"{"score": 7.5, "reasoning": "x"}"#),
            Err(VerdictParseError::InvalidScore(_))
        ));
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        assert!(matches!(
            parse_verdict(r#"{"score": 0, "reasoning": "x"}"#),
            Err(VerdictParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_verdict(r#"{"score": "11", "reasoning": "x"}"#),
            Err(VerdictParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn missing_and_mistyped_fields() {
        assert_eq!(
            parse_verdict(r#"{"reasoning": "x"}"#),
            Err(VerdictParseError::MissingField("score"))
        );
        assert_eq!(
            parse_verdict(r#"{"score": 5}"#),
            Err(VerdictParseError::MissingField("reasoning"))
        );
        assert_eq!(
            parse_verdict(r#"{"score": 5, "reasoning": ["x"]}"#),
            Err(VerdictParseError::InvalidReasoning)
        );
        assert!(matches!(
            parse_verdict(r#"{"score": true, "reasoning": "x"}"#),
            Err(VerdictParseError::InvalidScore(_))
        ));
    }

    #[test]
    fn no_object_at_all() {
        assert_eq!(parse_verdict("I'd say about a 7."), Err(VerdictParseError::NoJsonObject));
        assert_eq!(parse_verdict("} backwards {"), Err(VerdictParseError::NoJsonObject));
        assert_eq!(parse_verdict(""), Err(VerdictParseError::NoJsonObject));
    }

    #[test]
    fn truncated_json() {
        assert!(matches!(
            parse_verdict(r#"{"score": 6, "reasoning": "cut off}"#),
            Err(VerdictParseError::InvalidJson(_))
        ));
    }
}
