#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Vector index is not initialized. Run ingestion first.")]
	NotInitialized,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Vector index error: {message}")]
	Vector { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<branchline_storage::Error> for Error {
	fn from(err: branchline_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
