//! Strangewave library - audio-reactive strange attractor point clouds

pub mod attractor;
pub mod audio;
pub mod cli;
pub mod engine;
pub mod error;
pub mod fps;
pub mod params;
pub mod simulation;
pub mod snapshot;
pub mod surface;
