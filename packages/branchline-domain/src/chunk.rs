use serde::{Deserialize, Serialize};

use crate::branch::Branch;

/// Atomic unit of retrieval: a fixed-size window of source text with its page
/// and branch metadata, produced once by the offline ingestion step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chunk {
	pub id: String,
	pub text: String,
	pub page: u32,
	pub branch: Branch,
	pub chunk_index: u32,
}
