// Presentation collaborators: terminal front end and text rendering.

pub mod console;
pub mod render;
