pub mod data;
pub mod recommendation;
