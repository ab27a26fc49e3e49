//! Two-player versus fighter: stack-driven screens over a fixed-step winit
//! loop, fighters driven by stacked actions, and per-user stats on disk.

pub mod assets;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod fade;
pub mod fight;
pub mod fighter;
pub mod geometry;
pub mod input;
pub mod renderer;
pub mod screens;
pub mod stack;
pub mod store;
pub mod ui;

pub use engine::{Context, EngineBuilder};
