pub mod piece;
pub mod group;
pub mod layer;
