pub mod event;
pub mod input;
pub mod step;
pub mod world;
