pub mod drill;
pub mod feedback;
pub mod focus;
pub mod game;
pub mod lesson;
pub mod result;
pub mod stage;
pub mod timer;
