pub mod rng;
pub mod scatter;
pub mod drag;
pub mod spring;
pub mod snap;
pub mod render;
