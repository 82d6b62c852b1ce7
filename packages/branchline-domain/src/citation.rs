use serde::{Deserialize, Serialize};

use crate::fuzzy;

/// A supporting quotation asserted by the generation step. Quotes are never
/// trusted as-is; they must survive [`quote_is_grounded`] against the
/// passages that were actually retrieved for the query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Citation {
	pub source: String,
	pub locator: String,
	pub quote: String,
	pub context: Option<String>,
}

/// Checks a claimed quote against the retrieved passage texts. Quotes below
/// the configured minimum length are too short to verify meaningfully and are
/// rejected outright; otherwise the quote must reach the configured
/// partial-ratio score against at least one passage. Case-insensitive, so
/// minor casing and whitespace drift from the generation step still verifies.
pub fn quote_is_grounded(
	quote: &str,
	passage_texts: &[String],
	cfg: &branchline_config::Citations,
) -> bool {
	if quote.chars().count() < cfg.min_quote_chars as usize {
		return false;
	}

	let quote = quote.to_lowercase();

	passage_texts.iter().any(|text| {
		fuzzy::partial_ratio(&quote, &text.to_lowercase()) >= cfg.min_match_score as f64
	})
}
