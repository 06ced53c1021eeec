pub mod config;
pub mod controller;
pub mod geometry;
pub mod relay;
pub mod sanitize;
pub mod timer;

pub use controller::{Effect, LinkTarget, PreviewController, PreviewState};
