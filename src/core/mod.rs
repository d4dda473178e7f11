// Core algorithm exports
pub mod assembler;
pub mod filters;
pub mod recommender;
pub mod relaxed;
pub mod scoring;
pub mod validation;

pub use assembler::{assemble_results, compare_results, Recommendation};
pub use filters::{build_filter_spec, departure_window, matches_filter_spec, matches_geography};
pub use recommender::Recommender;
pub use relaxed::{expand_search, needs_relaxed_search, relaxed_filter_spec};
pub use scoring::{calculate_match_score, score_candidates};
pub use validation::{sanitize_preferences, sanitize_text};
