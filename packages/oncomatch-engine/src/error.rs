pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Malformed match tree: {message}")]
	MalformedTree { message: String },
	#[error("Unrecognized criteria: {message}")]
	UnrecognizedCriteria { message: String },
	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },
	#[error("Validation failed: {message}")]
	Validation { message: String },
	#[error("Store error: {message}")]
	Store { message: String },
	#[error("Taxonomy error: {message}")]
	Taxonomy { message: String },
	#[error("Another matching run is already in progress.")]
	RunInProgress,
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl Error {
	/// Store connectivity failures are retried with backoff at the per-trial
	/// boundary; everything else fails the trial (or the run) immediately.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Store { .. })
	}
}

impl From<oncomatch_domain::Error> for Error {
	fn from(err: oncomatch_domain::Error) -> Self {
		match err {
			oncomatch_domain::Error::MalformedTree { message } => Self::MalformedTree { message },
			oncomatch_domain::Error::UnrecognizedCriteria { message } => {
				Self::UnrecognizedCriteria { message }
			},
			oncomatch_domain::Error::MissingRequiredField { field } => {
				Self::MissingRequiredField { field }
			},
		}
	}
}

impl From<oncomatch_storage::Error> for Error {
	fn from(err: oncomatch_storage::Error) -> Self {
		match err {
			oncomatch_storage::Error::Sqlx(inner) => Self::Store { message: inner.to_string() },
			oncomatch_storage::Error::Decode { message } => Self::Validation { message },
			oncomatch_storage::Error::RunActive => Self::RunInProgress,
		}
	}
}
