pub mod geometry;
pub mod store;
pub mod time;
