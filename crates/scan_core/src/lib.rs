// src/lib.rs
//! Core of the streaming scan viewer.
//!
//! This crate owns everything that does not need a GPU: the fixed-capacity
//! point ring, the synthetic scanner, the shared camera state, per-frame
//! transform planning, color mapping, picking and the generation worker that
//! feeds the render context through a single-slot handoff.

pub mod camera;
pub mod color;
pub mod error;
pub mod frame;
pub mod generator;
pub mod geometry;
pub mod picker;
pub mod point;
pub mod ring;
pub mod session;
pub mod transform;
pub mod worker;

// Re-export commonly used types for convenience.
pub use self::camera::{CameraController, CameraState};
pub use self::color::ColorMode;
pub use self::error::CoreError;
pub use self::frame::{FramePlan, ViewSettings};
pub use self::generator::PointGenerator;
pub use self::picker::PickHit;
pub use self::point::PointRecord;
pub use self::ring::PointBuffer;
pub use self::session::{ScanSession, SessionConfig};
