pub mod auth;
pub mod envelope;
pub mod rate_limit;
