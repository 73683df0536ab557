//! Shared HTTP plumbing: the error envelope and the validated JSON extractor.

pub mod error;
pub mod validated_json;

pub use error::{ApiError, ApiResult, ConflictDto, ErrorResponse};
pub use validated_json::ValidatedJson;
