//! CPU rendering of pick-and-place scenes into RGB frames and PNG files.

pub mod canvas;
pub mod draw;

pub use canvas::Canvas;
