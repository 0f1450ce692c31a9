//! Vivid Core: domain layer for the per-monitor color effect.
//!
//! This crate contains the color math, monitor-slot bookkeeping, settings
//! persistence and the CPU reference of the shading stage. No GPU or
//! compositor dependencies.

pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod guard;
pub mod image;
pub mod params;
pub mod publish;
pub mod registry;
pub mod sync;
pub mod transform;

// Re-exports for convenience.
pub use config::{ChangeOrigin, ColorSettings, ConfigStore, MemoryStore, WriterId};
pub use controller::{EffectController, EffectEvent};
pub use editor::SettingsEditor;
pub use error::ConfigError;
pub use geometry::{GeometryAdapter, LogicalMonitor, StaticLayout};
pub use image::FrameImage;
pub use params::{ColorParams, MAX_MONITORS, PARAM_SLOTS, RegionRect, ShadeParams};
pub use publish::{SnapshotHandle, SnapshotPublisher};
pub use registry::RegionRegistry;
pub use sync::{MonitorLayout, ParameterSynchronizer, UniformSink};
pub use transform::shading::adjust_rgb;
pub use transform::snapshot::EffectSnapshot;
