use branchline_domain::branch::Branch;
use branchline_service::QueryRequest;
use branchline_testkit::{build_indexed_service, sample_chunks};

fn query() -> QueryRequest {
	QueryRequest {
		query: "In the Race ending, how does control fail?".to_string(),
		branch: None,
		top_k: None,
	}
}

#[tokio::test]
async fn grounded_citations_survive_verification() {
	let draft = serde_json::json!({
		"answer": "Oversight fails as deployment accelerates. [Citation 1]",
		"branch": "race",
		"citations": [
			{
				"locator": "page 23",
				"quote": "oversight fails as deployment accelerates",
				"context": "States the control failure directly."
			}
		],
		"assumptions_or_limits": ["Based on the race ending only."],
		"followup_questions": ["What happens to the committee?"],
		"confidence_score": 0.9
	});
	let service = build_indexed_service(sample_chunks(), draft).await;
	let response = service.answer(&query()).await.expect("Answer failed.");

	assert_eq!(response.answer, "Oversight fails as deployment accelerates. [Citation 1]");
	assert_eq!(response.branch, "race");
	assert_eq!(response.citations.len(), 1);
	assert_eq!(response.citations[0].source, "scenario-report.pdf");
	assert_eq!(response.citations[0].locator, "page 23");
	assert!((response.confidence_score - 0.9).abs() < f32::EPSILON);
}

#[tokio::test]
async fn unverifiable_citations_downgrade_to_refusal() {
	let draft = serde_json::json!({
		"answer": "The treaty resolves everything.",
		"branch": "race",
		"citations": [
			{
				"locator": "page 99",
				"quote": "the treaty is signed in geneva that winter",
				"context": "Fabricated."
			},
			{ "locator": "page 1", "quote": "too short" }
		],
		"confidence_score": 0.95
	});
	let service = build_indexed_service(sample_chunks(), draft).await;
	let response = service.answer(&query()).await.expect("Answer failed.");

	assert_eq!(response.confidence_score, 0.0);
	assert!(response.citations.is_empty());
	assert!(response.answer.starts_with("I cannot answer"));
	assert_eq!(response.branch, "race");
}

#[tokio::test]
async fn empty_evidence_refuses_without_calling_generation() {
	let draft = serde_json::json!({
		"answer": "This draft should never be used.",
		"branch": "shared",
		"citations": [
			{ "locator": "page 5", "quote": "irrelevant quote entirely" }
		],
		"confidence_score": 0.9
	});
	let endings_only = sample_chunks()
		.into_iter()
		.filter(|chunk| chunk.branch != Branch::Shared)
		.collect::<Vec<_>>();
	let service = build_indexed_service(endings_only, draft).await;
	let response = service
		.answer(&QueryRequest {
			query: "What happens in early 2026?".to_string(),
			branch: None,
			top_k: None,
		})
		.await
		.expect("Answer failed.");

	assert_eq!(response.confidence_score, 0.0);
	assert!(response.citations.is_empty());
	assert!(response.answer.contains("no relevant information"));
}

#[tokio::test]
async fn invalid_drafts_downgrade_to_refusal() {
	let draft = serde_json::json!({ "unexpected": true });
	let service = build_indexed_service(sample_chunks(), draft).await;
	let response = service.answer(&query()).await.expect("Answer failed.");

	assert_eq!(response.confidence_score, 0.0);
	assert!(response.answer.starts_with("I cannot answer"));
}

#[tokio::test]
async fn followup_questions_are_capped_and_quotes_truncated() {
	let draft = serde_json::json!({
		"answer": "Oversight fails. [Citation 1]",
		"branch": "race",
		"citations": [
			{
				"locator": "page 23",
				"quote": "oversight fails as deployment accelerates",
				"context": "Supports the claim."
			}
		],
		"followup_questions": ["q1", "q2", "q3", "q4", "q5"],
		"confidence_score": 0.8
	});
	let mut service = build_indexed_service(sample_chunks(), draft).await;

	service.cfg.citations.max_quote_chars = 20;

	let response = service.answer(&query()).await.expect("Answer failed.");

	assert_eq!(response.followup_questions.len(), 3);
	assert_eq!(response.citations[0].quote.chars().count(), 20);
}
