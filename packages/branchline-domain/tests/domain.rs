use branchline_domain::{
	branch::{self, Branch, BranchChoice},
	chunk::Chunk,
	citation, infer,
};

#[test]
fn branch_labels_round_trip_through_serde() {
	for (branch, label) in [
		(Branch::Shared, "\"shared\""),
		(Branch::Race, "\"race\""),
		(Branch::Slowdown, "\"slowdown\""),
		(Branch::Appendix, "\"appendix\""),
	] {
		let encoded = serde_json::to_string(&branch).expect("Failed to encode branch.");

		assert_eq!(encoded, label);

		let decoded: Branch = serde_json::from_str(&encoded).expect("Failed to decode branch.");

		assert_eq!(decoded, branch);
	}
}

#[test]
fn chunk_feed_records_decode() {
	let raw = r#"{
		"id": "chunk_12",
		"text": "Early 2026 brings coding automation.",
		"page": 5,
		"branch": "shared",
		"chunk_index": 0
	}"#;
	let chunk: Chunk = serde_json::from_str(raw).expect("Failed to decode chunk.");

	assert_eq!(chunk.id, "chunk_12");
	assert_eq!(chunk.page, 5);
	assert_eq!(chunk.branch, Branch::Shared);
}

#[test]
fn inferred_choice_resolves_to_a_filter_admitting_shared() {
	let cfg = branchline_config::Branches::default();
	let choice = infer::infer_branch("In the Race ending, how does control fail?", &cfg);

	assert_eq!(choice, BranchChoice::Race);

	let filter = branch::resolve_filter(choice);

	assert!(filter.admits(Branch::Shared));
	assert!(filter.admits(Branch::Race));
	assert!(!filter.admits(Branch::Slowdown));
}

#[test]
fn inference_never_panics_on_odd_input() {
	let cfg = branchline_config::Branches::default();

	for query in ["", "   ", "????", "\u{1F600}\u{1F600}", "2027 2028 2026"] {
		let _ = infer::infer_branch(query, &cfg);
	}
}

#[test]
fn custom_entity_list_overrides_default() {
	let cfg = branchline_config::Branches {
		cross_branch_entities: vec!["safer-4".to_string()],
	};

	assert_eq!(infer::infer_branch("What does Safer-4 do?", &cfg), BranchChoice::Both);
	assert_eq!(infer::infer_branch("Who controls Agent-5?", &cfg), BranchChoice::Auto);
}

#[test]
fn grounding_thresholds_come_from_config() {
	let passages = vec!["The fork point arrives in October 2027.".to_string()];
	let strict = branchline_config::Citations {
		min_quote_chars: 10,
		max_quote_chars: 300,
		min_match_score: 100.0,
	};

	assert!(citation::quote_is_grounded("fork point arrives in October", &passages, &strict));
	assert!(!citation::quote_is_grounded("fork point arrive in Oktober", &passages, &strict));
}
