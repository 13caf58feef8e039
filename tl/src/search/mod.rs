//! Template search
//!
//! Index-backed scoring search plus the deep content-scan fallback.

mod deep;
mod engine;

pub use deep::{ContentMatch, ContentScanner, DEEP_MATCH_SCORE, DeepSearch, DeepSearchError, GrepScanner};
pub use engine::{MatchedField, SearchEngine, SearchNote, SearchOptions, SearchOutcome, SearchResult};
