pub mod art;
pub mod collision;
pub mod grid;
pub mod snake;
