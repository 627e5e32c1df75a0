// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{DrawLogEntry, Gender, MatchedProfile, ProfileDraft, UserProfile};
pub use requests::{DrawRequest, SubmitRequest};
pub use responses::{ApiError, ApiResponse, ErrorCode, HealthResponse, SubmitData};
