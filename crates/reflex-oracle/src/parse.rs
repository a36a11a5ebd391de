//! LLM response parsing into a validated choice.
//!
//! The LLM returns raw text (ideally JSON). This module extracts a
//! `{"choice": <index>, "rationale": "..."}` object, recovering from
//! the common failure shapes: markdown code fences, trailing commas,
//! and bare-integer answers. An out-of-range index is a parse failure
//! like any other; the caller substitutes the fallback decision.

use rand::Rng;
use serde::Deserialize;

use crate::error::OracleError;

/// A validated opponent decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// 0-based index into the trial's option list.
    pub choice: usize,
    /// The model's stated reasoning, if any (logged, never acted on).
    pub rationale: Option<String>,
}

impl Decision {
    /// The decision substituted when the oracle fails for any reason:
    /// a uniform-random in-range choice. There is no retry path; the
    /// experiment never waits on a second network round trip.
    pub fn fallback<R: Rng + ?Sized>(num_options: usize, rng: &mut R) -> Self {
        let choice = if num_options == 0 {
            0
        } else {
            rng.random_range(0..num_options)
        };
        Self {
            choice,
            rationale: Some("fallback: uniform random choice".to_owned()),
        }
    }
}

/// Intermediate struct for deserializing the LLM's raw JSON response.
#[derive(Debug, Deserialize)]
struct RawDecision {
    choice: usize,
    #[serde(default)]
    rationale: Option<String>,
}

/// Parse an LLM response into a [`Decision`] with `choice` in
/// `0..num_options`.
///
/// Recovery strategies, in order:
/// 1. Direct `serde_json` deserialization
/// 2. Extract JSON from a markdown code block
/// 3. Strip trailing commas and retry
/// 4. Code block extract plus trailing-comma strip
/// 5. A bare integer at the start of the text
///
/// # Errors
///
/// Returns [`OracleError::Parse`] if no strategy yields an in-range
/// choice.
pub fn parse_decision(raw: &str, num_options: usize) -> Result<Decision, OracleError> {
    let trimmed = raw.trim();

    if let Ok(parsed) = serde_json::from_str::<RawDecision>(trimmed) {
        return validate(parsed, num_options);
    }

    if let Some(json_str) = extract_json_from_codeblock(trimmed)
        && let Ok(parsed) = serde_json::from_str::<RawDecision>(json_str)
    {
        return validate(parsed, num_options);
    }

    let cleaned = strip_trailing_commas(trimmed);
    if let Ok(parsed) = serde_json::from_str::<RawDecision>(&cleaned) {
        return validate(parsed, num_options);
    }

    if let Some(json_str) = extract_json_from_codeblock(trimmed) {
        let cleaned_inner = strip_trailing_commas(json_str);
        if let Ok(parsed) = serde_json::from_str::<RawDecision>(&cleaned_inner) {
            return validate(parsed, num_options);
        }
    }

    if let Some(choice) = leading_integer(trimmed) {
        return validate(
            RawDecision {
                choice,
                rationale: None,
            },
            num_options,
        );
    }

    Err(OracleError::Parse(format!(
        "all parse strategies failed for: {trimmed}"
    )))
}

/// Range-check a parsed decision.
fn validate(raw: RawDecision, num_options: usize) -> Result<Decision, OracleError> {
    if raw.choice >= num_options {
        return Err(OracleError::Parse(format!(
            "choice {} out of range (0..{num_options})",
            raw.choice
        )));
    }
    Ok(Decision {
        choice: raw.choice,
        rationale: raw.rationale,
    })
}

/// Extract JSON from a markdown code block (```json fenced or plain).
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let start = text
        .find("```json")
        .map(|i| after_fence(text, i, 7))
        .or_else(|| text.find("```").map(|i| after_fence(text, i, 3)));

    let start = start?;
    let remaining = text.get(start..)?;
    let end = remaining.find("```")?;
    remaining.get(..end).map(str::trim)
}

/// Position of the content following a code fence at `i` of width
/// `tag_len` (skipping to the next line when one exists).
fn after_fence(text: &str, i: usize, tag_len: usize) -> usize {
    let after_tag = i.checked_add(tag_len).unwrap_or(i);
    text.get(after_tag..)
        .and_then(|s| s.find('\n'))
        .and_then(|nl| after_tag.checked_add(nl))
        .and_then(|pos| pos.checked_add(1))
        .unwrap_or(after_tag)
}

/// Strip trailing commas before closing braces and brackets (common
/// LLM error).
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut i = 0;
    while i < len {
        let c = chars.get(i).copied().unwrap_or(' ');
        if c == ',' {
            // Look ahead past whitespace for } or ]
            let mut j = i.checked_add(1).unwrap_or(i);
            while j < len && chars.get(j).copied().unwrap_or(' ').is_whitespace() {
                j = j.checked_add(1).unwrap_or(j);
            }
            let next = chars.get(j).copied().unwrap_or(' ');
            if next == '}' || next == ']' {
                i = i.checked_add(1).unwrap_or(i);
                continue;
            }
        }
        result.push(c);
        i = i.checked_add(1).unwrap_or(len);
    }

    result
}

/// Parse a bare integer at the start of the text ("2", "3.", "1 -- ...").
fn leading_integer(text: &str) -> Option<usize> {
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_direct_json() {
        let raw = r#"{"choice": 2, "rationale": "they keep picking slow"}"#;
        let decision = parse_decision(raw, 4).unwrap();
        assert_eq!(decision.choice, 2);
        assert_eq!(decision.rationale.as_deref(), Some("they keep picking slow"));
    }

    #[test]
    fn parse_without_rationale() {
        let decision = parse_decision(r#"{"choice": 0}"#, 4).unwrap();
        assert_eq!(decision.choice, 0);
        assert!(decision.rationale.is_none());
    }

    #[test]
    fn parse_from_codeblock() {
        let raw = "Here is my decision:\n\n```json\n{\"choice\": 1, \"rationale\": \"mix it up\"}\n```\n";
        let decision = parse_decision(raw, 4).unwrap();
        assert_eq!(decision.choice, 1);
    }

    #[test]
    fn parse_trailing_comma() {
        let raw = r#"{"choice": 3, "rationale": "go fast",}"#;
        let decision = parse_decision(raw, 4).unwrap();
        assert_eq!(decision.choice, 3);
    }

    #[test]
    fn parse_bare_integer() {
        let decision = parse_decision("2", 4).unwrap();
        assert_eq!(decision.choice, 2);
        let decision = parse_decision("3. Going fast here.", 4).unwrap();
        assert_eq!(decision.choice, 3);
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let result = parse_decision(r#"{"choice": 4}"#, 4);
        assert!(matches!(result, Err(OracleError::Parse(_))));
        assert!(matches!(parse_decision("7", 4), Err(OracleError::Parse(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let raw = "I think I will go quite fast this round.";
        assert!(parse_decision(raw, 4).is_err());
        assert!(parse_decision("", 4).is_err());
    }

    #[test]
    fn strip_trailing_commas_basic() {
        assert_eq!(
            strip_trailing_commas(r#"{"a": 1, "b": 2,}"#),
            r#"{"a": 1, "b": 2}"#
        );
        assert_eq!(strip_trailing_commas("[1, 2, 3,]"), "[1, 2, 3]");
    }

    #[test]
    fn fallback_is_always_in_range() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(17);
        for _ in 0..100 {
            let decision = Decision::fallback(4, &mut rng);
            assert!(decision.choice < 4);
            assert!(decision.rationale.is_some());
        }
    }

    #[test]
    fn extract_json_from_markdown() {
        assert_eq!(
            extract_json_from_codeblock("```json\n{\"choice\": 1}\n```"),
            Some("{\"choice\": 1}")
        );
        assert_eq!(
            extract_json_from_codeblock("```\n{\"choice\": 1}\n```"),
            Some("{\"choice\": 1}")
        );
    }
}
