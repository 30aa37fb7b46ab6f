//! Contract code parsing and the folder-name prefixes derived from it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Structured view of a contract/quotation code such as `LSG-CN-PU-CON-0018D_03`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCode {
    /// Hyphen-joined leading tokens (`LSG-CN-PU`), absent for two-token codes
    pub prefix: Option<String>,

    /// Penultimate token (`CON`, `VAO`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Numeric body of the last token
    pub digits: String,

    /// Optional letter suffix right after the digits
    pub letter: Option<String>,

    /// Optional revision after the underscore
    pub rev: Option<String>,
}

impl ParsedCode {
    /// `{prefix-}{TYPE}`, the part every candidate shares.
    pub fn stem(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}-{}", self.kind),
            None => self.kind.clone(),
        }
    }

    /// Candidate folder-name prefixes, most specific first.
    pub fn candidates(&self) -> Vec<String> {
        let stem = self.stem();
        let mut out = Vec::with_capacity(2);
        if let Some(letter) = &self.letter {
            out.push(format!("{stem}-{}{letter}", self.digits));
        }
        out.push(format!("{stem}-{}", self.digits));
        out
    }
}

fn code_tail() -> &'static Regex {
    static TAIL: OnceLock<Regex> = OnceLock::new();
    TAIL.get_or_init(|| {
        Regex::new(r"^(?P<digits>[0-9]+)(?P<letter>[A-Z]+)?(?:_(?P<rev>[0-9]+))?$")
            .expect("code tail pattern is valid")
    })
}

/// Parse a raw code into its parts.
///
/// Returns `None` when the input has no recognizable structure; callers fall
/// back to whole-string heuristics in that case.
pub fn parse_code(raw: &str) -> Option<ParsedCode> {
    let upper = raw.trim().to_uppercase();
    let tokens: Vec<&str> = upper.split('-').filter(|t| !t.is_empty()).collect();
    if tokens.len() < 2 {
        return None;
    }

    let last = tokens[tokens.len() - 1];
    let kind = tokens[tokens.len() - 2];
    let caps = code_tail().captures(last)?;

    let prefix = (tokens.len() > 2).then(|| tokens[..tokens.len() - 2].join("-"));
    let digits = caps.name("digits").map(|m| m.as_str().to_string())?;

    Some(ParsedCode {
        prefix,
        kind: kind.to_string(),
        digits,
        letter: caps.name("letter").map(|m| m.as_str().to_string()),
        rev: caps.name("rev").map(|m| m.as_str().to_string()),
    })
}

/// Ordered search prefixes for a raw code; empty when the code is unstructured.
pub fn candidate_basenames(raw: &str) -> Vec<String> {
    match parse_code(raw) {
        Some(parsed) if !parsed.kind.is_empty() && !parsed.digits.is_empty() => {
            parsed.candidates()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_code_with_letter_and_revision() {
        let parsed = parse_code("LSG-CN-PU-CON-0018D_03").expect("structured");
        assert_eq!(parsed.prefix.as_deref(), Some("LSG-CN-PU"));
        assert_eq!(parsed.kind, "CON");
        assert_eq!(parsed.digits, "0018");
        assert_eq!(parsed.letter.as_deref(), Some("D"));
        assert_eq!(parsed.rev.as_deref(), Some("03"));
    }

    #[test]
    fn parses_two_token_code_without_prefix() {
        let parsed = parse_code("vao-0018").expect("structured");
        assert_eq!(parsed.prefix, None);
        assert_eq!(parsed.kind, "VAO");
        assert_eq!(parsed.letter, None);
        assert_eq!(parsed.rev, None);
    }

    #[test]
    fn ignores_empty_tokens_and_surrounding_whitespace() {
        let parsed = parse_code("  LSG--CON-5069a ").expect("structured");
        assert_eq!(parsed.prefix.as_deref(), Some("LSG"));
        assert_eq!(parsed.letter.as_deref(), Some("A"));
    }

    #[test]
    fn rejects_unstructured_codes() {
        assert_eq!(parse_code("NOCODE"), None);
        assert_eq!(parse_code(""), None);
        assert_eq!(parse_code("ABC-CON-X18"), None);
        assert_eq!(parse_code("ABC-CON-0018_"), None);
    }

    #[test]
    fn candidates_are_most_specific_first() {
        assert_eq!(
            candidate_basenames("LSG-CN-PU-CON-0018D_03"),
            vec!["LSG-CN-PU-CON-0018D", "LSG-CN-PU-CON-0018"]
        );
        assert_eq!(
            candidate_basenames("LSG-CN-PU-CON-5069A"),
            vec!["LSG-CN-PU-CON-5069A", "LSG-CN-PU-CON-5069"]
        );
    }

    #[test]
    fn candidates_without_letter_have_single_entry() {
        assert_eq!(candidate_basenames("ABC-VAO-0018"), vec!["ABC-VAO-0018"]);
    }

    #[test]
    fn candidates_keep_the_type_segment() {
        let candidates = candidate_basenames("ABC-CON-0018");
        assert!(candidates.iter().all(|c| c.contains("-CON-")));
        assert!(candidates.iter().all(|c| !c.contains("VAO")));
    }

    #[test]
    fn malformed_code_has_no_candidates() {
        assert!(candidate_basenames("NOCODE").is_empty());
        assert!(candidate_basenames("Dossier general").is_empty());
    }
}
