#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Malformed match tree: {message}")]
	MalformedTree { message: String },
	#[error("Unrecognized criteria: {message}")]
	UnrecognizedCriteria { message: String },
	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },
}
