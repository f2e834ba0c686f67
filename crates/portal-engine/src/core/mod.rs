pub mod time;
pub mod geometry;
pub mod body;
pub mod bodies;
pub mod raycast;
pub mod portal;
pub mod teleport;
pub mod triggers;
pub mod world;
