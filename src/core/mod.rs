// Core decision procedure exports
pub mod draw;
pub mod submission;

pub use draw::{check_cooldown, DrawEngine, DrawError, DEFAULT_COOLDOWN_SECS};
pub use submission::{validate_submission, ValidationError};
