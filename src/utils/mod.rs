pub mod error;
pub mod logger;
pub mod validation;
