pub mod compose;
pub mod input;
pub mod renderer;
