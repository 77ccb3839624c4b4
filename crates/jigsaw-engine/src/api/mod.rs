pub mod types;
pub mod session;
