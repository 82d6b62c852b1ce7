use serde::{Deserialize, Serialize};
use serde_json::Value;

use branchline_domain::{
	branch::BranchChoice,
	citation::{self, Citation},
};

use crate::{
	Result, ScenarioService,
	search::{RetrieveRequest, ScoredPassage},
};

const MAX_FOLLOWUP_QUESTIONS: usize = 3;

const SYSTEM_PROMPT: &str = "\
You are an analyst answering questions about a single scenario-forecasting report \
whose timeline forks into a 'race' ending and a 'slowdown' ending.

Rules:
1. Only use information from the retrieved passages provided.
2. Every factual claim must be supported by a citation quoting a passage verbatim.
3. If the evidence is weak or missing, say so instead of guessing.
4. Name the timeline branch explicitly when it matters (shared timeline, race ending, slowdown ending).

Return a JSON object with this exact structure:
{
  \"answer\": \"answer text\",
  \"branch\": \"shared|race|slowdown|both|unknown\",
  \"citations\": [
    { \"locator\": \"page N\", \"quote\": \"verbatim quote from a passage\", \"context\": \"why this supports the claim\" }
  ],
  \"assumptions_or_limits\": [\"caveats\"],
  \"followup_questions\": [\"up to three suggested questions\"],
  \"confidence_score\": 0.0
}";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryRequest {
	pub query: String,
	pub branch: Option<BranchChoice>,
	pub top_k: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryResponse {
	pub answer: String,
	pub branch: String,
	pub citations: Vec<Citation>,
	pub assumptions_or_limits: Vec<String>,
	pub followup_questions: Vec<String>,
	pub confidence_score: f32,
}

impl ScenarioService {
	/// Full question-answering flow: retrieve, generate a draft, then gate
	/// the draft on citation verification. Content-quality problems degrade
	/// the response; only infrastructure failures surface as errors.
	pub async fn answer(&self, req: &QueryRequest) -> Result<QueryResponse> {
		let choice = self.resolve_branch(&req.query, req.branch);
		let passages = self
			.retrieve(&RetrieveRequest {
				query: req.query.clone(),
				branch: Some(choice),
				top_k: req.top_k,
			})
			.await?;

		if passages.is_empty() {
			return Ok(refusal_response(
				"no relevant information found in the document.",
				"unknown",
			));
		}

		let messages = build_messages(&req.query, &passages, choice);
		let draft = self
			.providers
			.generation
			.generate(&self.cfg.providers.generation, &messages)
			.await?;

		Ok(self.finalize_draft(draft, &passages))
	}

	/// Validates a draft answer against the passages that were actually
	/// retrieved. Ungrounded citations are dropped; a draft left with none is
	/// downgraded to a refusal with zero confidence.
	pub fn finalize_draft(&self, draft: Value, passages: &[ScoredPassage]) -> QueryResponse {
		let Some(answer) = draft.get("answer").and_then(|v| v.as_str()) else {
			return refusal_response("the generation step returned an invalid draft.", "unknown");
		};
		let branch =
			draft.get("branch").and_then(|v| v.as_str()).unwrap_or("unknown").to_string();
		let passage_texts: Vec<String> =
			passages.iter().map(|passage| passage.text.clone()).collect();
		let draft_citations = draft
			.get("citations")
			.and_then(|v| v.as_array())
			.map(|arr| arr.as_slice())
			.unwrap_or(&[]);
		let mut citations = Vec::new();

		for item in draft_citations {
			let quote = item.get("quote").and_then(|v| v.as_str()).unwrap_or("");

			if !citation::quote_is_grounded(quote, &passage_texts, &self.cfg.citations) {
				tracing::warn!(
					locator = item.get("locator").and_then(|v| v.as_str()).unwrap_or(""),
					"Dropping citation whose quote is not grounded in the retrieved passages."
				);

				continue;
			}

			let locator = item
				.get("locator")
				.and_then(|v| v.as_str())
				.map(str::to_string)
				.unwrap_or_else(|| format!("page {}", passages[0].page));

			citations.push(Citation {
				source: self.cfg.corpus.source_name.clone(),
				locator,
				quote: truncate_chars(quote, self.cfg.citations.max_quote_chars as usize),
				context: item.get("context").and_then(|v| v.as_str()).map(str::to_string),
			});
		}

		if citations.is_empty() {
			return refusal_response(
				"could not verify any citation against the retrieved passages.",
				&branch,
			);
		}

		let assumptions_or_limits = string_list(draft.get("assumptions_or_limits"));
		let mut followup_questions = string_list(draft.get("followup_questions"));

		followup_questions.truncate(MAX_FOLLOWUP_QUESTIONS);

		QueryResponse {
			answer: answer.to_string(),
			branch,
			citations,
			assumptions_or_limits,
			followup_questions,
			confidence_score: draft
				.get("confidence_score")
				.and_then(|v| v.as_f64())
				.map(|score| score.clamp(0.0, 1.0) as f32)
				.unwrap_or(0.7),
		}
	}
}

pub fn refusal_response(reason: &str, branch: &str) -> QueryResponse {
	QueryResponse {
		answer: format!("I cannot answer this question with confidence. Reason: {reason}"),
		branch: branch.to_string(),
		citations: Vec::new(),
		assumptions_or_limits: vec![reason.to_string()],
		followup_questions: Vec::new(),
		confidence_score: 0.0,
	}
}

fn build_messages(query: &str, passages: &[ScoredPassage], choice: BranchChoice) -> Vec<Value> {
	let branch_context = match choice {
		BranchChoice::Auto => String::new(),
		choice => format!("BRANCH CONTEXT: the user is asking about the '{choice}' branch.\n\n"),
	};
	let user_prompt = format!(
		"{branch_context}RETRIEVED PASSAGES:\n{}\nUSER QUERY:\n{query}\n\nReturn a JSON object following the system rules.",
		format_passages(passages)
	);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

fn format_passages(passages: &[ScoredPassage]) -> String {
	let mut out = String::new();

	for (index, passage) in passages.iter().enumerate() {
		out.push_str(&format!(
			"[Passage {}]\nPage: {}\nBranch: {}\nContent: {}\n\n",
			index + 1,
			passage.page,
			passage.branch,
			passage.text
		));
	}

	out
}

fn string_list(value: Option<&Value>) -> Vec<String> {
	value
		.and_then(|v| v.as_array())
		.map(|arr| arr.iter().filter_map(|item| item.as_str()).map(str::to_string).collect())
		.unwrap_or_default()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
	text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn refusal_forces_zero_confidence() {
		let response = refusal_response("no relevant information found.", "unknown");

		assert_eq!(response.confidence_score, 0.0);
		assert!(response.citations.is_empty());
		assert!(response.answer.starts_with("I cannot answer"));
	}

	#[test]
	fn user_prompt_carries_passages_and_branch_context() {
		let passages = vec![ScoredPassage {
			id: "chunk_0".to_string(),
			text: "Oversight fails in October.".to_string(),
			page: 23,
			branch: branchline_domain::branch::Branch::Race,
			score: 0.9,
			normalized_score: 1.0,
			source: crate::search::RetrievalSource::Dense,
		}];
		let messages = build_messages("How does control fail?", &passages, BranchChoice::Race);
		let user = messages[1]
			.get("content")
			.and_then(|v| v.as_str())
			.expect("Missing user message content.");

		assert!(user.contains("Oversight fails in October."));
		assert!(user.contains("'race' branch"));
		assert!(user.contains("Page: 23"));
	}

	#[test]
	fn auto_choice_omits_branch_context() {
		let messages = build_messages("A question?", &[], BranchChoice::Auto);
		let user = messages[1]
			.get("content")
			.and_then(|v| v.as_str())
			.expect("Missing user message content.");

		assert!(!user.contains("BRANCH CONTEXT"));
	}
}
