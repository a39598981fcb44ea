//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod confirm_email;
pub mod current_user;
pub mod log_in;
pub mod log_out;
pub mod refresh_session;
pub mod request_email;
pub mod session;
pub mod sign_up;

// Re-exports
pub use config::AuthConfig;
pub use confirm_email::{ConfirmEmailUseCase, ConfirmOutcome};
pub use current_user::CurrentUserUseCase;
pub use log_in::{LogInInput, LogInUseCase};
pub use log_out::LogOutUseCase;
pub use refresh_session::RefreshSessionUseCase;
pub use request_email::{RequestEmailOutcome, RequestEmailUseCase};
pub use session::TokenPair;
pub use sign_up::{SignUpInput, SignUpUseCase};
