pub const BRANCH_PAYLOAD_KEY: &str = "branch";
pub const CHUNK_ID_PAYLOAD_KEY: &str = "chunk_id";
pub const CHUNK_INDEX_PAYLOAD_KEY: &str = "chunk_index";
pub const PAGE_PAYLOAD_KEY: &str = "page";

use crate::Result;

pub struct VectorStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl VectorStore {
	pub fn new(cfg: &branchline_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}
}
