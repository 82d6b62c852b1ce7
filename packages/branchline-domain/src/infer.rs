use crate::branch::BranchChoice;

/// Infers a branch filter from free query text when the caller did not pick
/// one. Ordered substring rules, first match wins; the rule order is
/// observable behavior and must not be reordered.
pub fn infer_branch(query: &str, cfg: &branchline_config::Branches) -> BranchChoice {
	let query = query.to_lowercase();

	if query.contains("race ending") || query.contains("race scenario") {
		return BranchChoice::Race;
	}
	if query.contains("slowdown ending") || query.contains("slowdown scenario") {
		return BranchChoice::Slowdown;
	}
	if query.contains("shared timeline") || query.contains("before the branch") {
		return BranchChoice::Shared;
	}

	// Everything up to mid 2027 happens before the fork.
	if ["2025", "2026"].iter().any(|year| query.contains(year)) {
		return BranchChoice::Shared;
	}
	if query.contains("early 2027") || query.contains("mid 2027") {
		return BranchChoice::Shared;
	}
	if ["late 2027", "2028", "2029", "2030"].iter().any(|cue| query.contains(cue)) {
		return BranchChoice::Both;
	}
	if cfg.cross_branch_entities.iter().any(|entity| query.contains(entity.as_str())) {
		return BranchChoice::Both;
	}

	BranchChoice::Auto
}

#[cfg(test)]
mod tests {
	use super::*;

	fn branches() -> branchline_config::Branches {
		Default::default()
	}

	#[test]
	fn explicit_ending_mentions_win() {
		assert_eq!(
			infer_branch("In the Race ending, how does control fail?", &branches()),
			BranchChoice::Race
		);
		assert_eq!(
			infer_branch("What changes in the slowdown scenario?", &branches()),
			BranchChoice::Slowdown
		);
		assert_eq!(
			infer_branch("Summarize the shared timeline.", &branches()),
			BranchChoice::Shared
		);
	}

	#[test]
	fn explicit_mention_beats_year_cue() {
		assert_eq!(
			infer_branch("In the race ending, what happens during 2026?", &branches()),
			BranchChoice::Race
		);
	}

	#[test]
	fn pre_fork_years_map_to_shared() {
		assert_eq!(infer_branch("What happens in early 2026?", &branches()), BranchChoice::Shared);
		assert_eq!(infer_branch("Progress by mid 2027?", &branches()), BranchChoice::Shared);
	}

	#[test]
	fn post_fork_years_are_ambiguous() {
		assert_eq!(infer_branch("What does 2029 look like?", &branches()), BranchChoice::Both);
		assert_eq!(infer_branch("Events in late 2027?", &branches()), BranchChoice::Both);
	}

	#[test]
	fn cross_branch_entities_are_ambiguous() {
		assert_eq!(infer_branch("Who controls Agent-5?", &branches()), BranchChoice::Both);
	}

	#[test]
	fn falls_through_to_auto() {
		assert_eq!(
			infer_branch("What is neuralese and why does it matter?", &branches()),
			BranchChoice::Auto
		);
	}
}
