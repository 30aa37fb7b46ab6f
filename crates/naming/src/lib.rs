//! # Dossier Naming
//!
//! Contract-code parsing and folder-name similarity used to match quality
//! dossier folders to sales contracts.
//!
//! ```text
//! raw code ("LSG-CN-PU-CON-0018D_03")
//!     │
//!     ├──> parse_code          prefix / type / digits / letter / rev
//!     │
//!     ├──> candidate_basenames ["LSG-CN-PU-CON-0018D", "LSG-CN-PU-CON-0018"]
//!     │
//!     └──> is_similar          containment → family → truncation → fuzzy ratio
//! ```

mod code;
mod similarity;

pub use code::{candidate_basenames, parse_code, ParsedCode};
pub use similarity::{
    contains_normalized, family, fuzzy_ratio, is_similar, normalize_name, same_family,
    similarity_stage, truncation_match, MatchStrategy, SimilarityConfig,
    DEFAULT_FUZZY_THRESHOLD,
};
