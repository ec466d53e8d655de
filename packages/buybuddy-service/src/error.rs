pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Retrieval failed: {message}")]
	Retrieval { message: String },
	#[error("Intent classification failed after {attempts} attempt(s): {message}")]
	Classification { attempts: u32, message: String },
	#[error("Answer synthesis failed: {message}")]
	Synthesis { message: String },
}
impl From<buybuddy_storage::Error> for Error {
	fn from(err: buybuddy_storage::Error) -> Self {
		Self::Retrieval { message: err.to_string() }
	}
}
