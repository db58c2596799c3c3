pub mod auth;
pub mod request_logger;

pub use auth::{CurrentUser, MaybeUser};
pub use request_logger::RequestLogger;
