pub mod desc;
pub mod spawn;
pub mod score;
