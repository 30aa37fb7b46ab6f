//! Four-stage name similarity: containment, family, truncation, fuzzy ratio.

use serde::{Deserialize, Serialize};

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.86;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Minimum edit-distance ratio accepted by the last stage (0..=1)
    pub fuzzy_threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl SimilarityConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        let fuzzy_threshold = if threshold.is_nan() {
            DEFAULT_FUZZY_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self { fuzzy_threshold }
    }
}

/// One stage of the similarity cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Either normalized string contains the other
    Containment,

    /// Leading two hyphen segments are equal
    Family,

    /// Segment prefixes agree for some length between full and two
    Truncation,

    /// Edit-distance ratio reaches the configured threshold
    FuzzyRatio,
}

impl MatchStrategy {
    /// Cheap, precise checks first; fuzzy ratio last.
    pub const CASCADE: [MatchStrategy; 4] = [
        MatchStrategy::Containment,
        MatchStrategy::Family,
        MatchStrategy::Truncation,
        MatchStrategy::FuzzyRatio,
    ];

    pub fn matches(self, name: &str, target: &str, config: &SimilarityConfig) -> bool {
        match self {
            MatchStrategy::Containment => contains_normalized(name, target),
            MatchStrategy::Family => same_family(name, target),
            MatchStrategy::Truncation => truncation_match(name, target),
            MatchStrategy::FuzzyRatio => fuzzy_ratio(name, target) >= config.fuzzy_threshold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStrategy::Containment => "containment",
            MatchStrategy::Family => "family",
            MatchStrategy::Truncation => "truncation",
            MatchStrategy::FuzzyRatio => "fuzzy_ratio",
        }
    }
}

/// Lowercase and drop everything that is not a letter or digit.
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn segments(raw: &str) -> Vec<String> {
    raw.split('-')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

fn normalized_segments(raw: &str) -> Vec<String> {
    raw.split('-')
        .map(normalize_name)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Leading two hyphen segments, uppercased (`KLV-682-03` -> `KLV-682`).
pub fn family(raw: &str) -> Option<String> {
    let segs = segments(raw);
    (segs.len() >= 2).then(|| format!("{}-{}", segs[0], segs[1]))
}

pub fn contains_normalized(a: &str, b: &str) -> bool {
    let a = normalize_name(a);
    let b = normalize_name(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

pub fn same_family(a: &str, b: &str) -> bool {
    match (family(a), family(b)) {
        (Some(fa), Some(fb)) => fa == fb,
        _ => false,
    }
}

/// Compare segment prefixes from the longest length down to two segments.
/// A side shorter than the current length contributes all of its segments.
pub fn truncation_match(a: &str, b: &str) -> bool {
    let sa = normalized_segments(a);
    let sb = normalized_segments(b);
    if sa.len() < 2 || sb.len() < 2 {
        return false;
    }

    let longest = sa.len().max(sb.len());
    (2..=longest)
        .rev()
        .any(|len| sa[..len.min(sa.len())] == sb[..len.min(sb.len())])
}

/// `1 - levenshtein / max_len` over normalized names; 0 when either is empty.
pub fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = normalize_name(a).chars().collect();
    let b: Vec<char> = normalize_name(b).chars().collect();
    let longest = a.len().max(b.len());
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = levenshtein(&a, &b);
    1.0 - distance as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// First stage of the cascade that accepts `name` against any target.
pub fn similarity_stage<S: AsRef<str>>(
    name: &str,
    targets: &[S],
    config: &SimilarityConfig,
) -> Option<MatchStrategy> {
    for strategy in MatchStrategy::CASCADE {
        if let Some(target) = targets
            .iter()
            .map(AsRef::as_ref)
            .find(|target| strategy.matches(name, target, config))
        {
            log::trace!(
                "'{name}' matched '{target}' via {}",
                strategy.as_str()
            );
            return Some(strategy);
        }
    }
    None
}

/// True when `name` is similar to any of `targets` under the default cascade.
pub fn is_similar<S: AsRef<str>>(name: &str, targets: &[S], fuzzy_threshold: f64) -> bool {
    similarity_stage(name, targets, &SimilarityConfig::with_threshold(fuzzy_threshold)).is_some()
}
