/// Substring-tolerant similarity between `needle` and `haystack` on a 0-100
/// scale. The shorter string is slid over every same-length window of the
/// longer one and the best normalized edit-distance similarity wins, so a
/// quote that matches a region of a passage scores high even when the passage
/// is much longer.
pub fn partial_ratio(needle: &str, haystack: &str) -> f64 {
	if needle.is_empty() || haystack.is_empty() {
		return 0.0;
	}

	let needle_chars: Vec<char> = needle.chars().collect();
	let haystack_chars: Vec<char> = haystack.chars().collect();
	let (shorter, longer) = if needle_chars.len() <= haystack_chars.len() {
		(needle, haystack_chars)
	} else {
		(haystack, needle_chars)
	};

	let window = shorter.chars().count();

	if window == longer.len() {
		return strsim::normalized_levenshtein(shorter, &longer.iter().collect::<String>()) * 100.0;
	}

	let mut best = 0.0_f64;

	for start in 0..=longer.len() - window {
		let candidate: String = longer[start..start + window].iter().collect();
		let score = strsim::normalized_levenshtein(shorter, &candidate) * 100.0;

		if score > best {
			best = score;
		}
		if best >= 100.0 {
			break;
		}
	}

	best
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exact_substring_scores_full() {
		let score = partial_ratio("diminishing returns", "a formula with diminishing returns baked in");

		assert_eq!(score, 100.0);
	}

	#[test]
	fn identical_strings_score_full() {
		assert_eq!(partial_ratio("the fork point", "the fork point"), 100.0);
	}

	#[test]
	fn near_match_scores_high() {
		let score = partial_ratio(
			"the oversight comittee votes to continue",
			"In October, the oversight committee votes to continue internal deployment.",
		);

		assert!(score >= 85.0, "Expected a high score, got {score}");
	}

	#[test]
	fn unrelated_text_scores_low() {
		let score = partial_ratio("quarterly revenue grew", "the model weights were stolen in february");

		assert!(score < 60.0, "Expected a low score, got {score}");
	}

	#[test]
	fn empty_inputs_score_zero() {
		assert_eq!(partial_ratio("", "anything"), 0.0);
		assert_eq!(partial_ratio("anything", ""), 0.0);
	}
}
