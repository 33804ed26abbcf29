//! Geometry core for an interactive room-acoustics studio.
//!
//! Loads a triangulated room mesh, splits it into surfaces along feature
//! edges, tracks per-surface appearance, resolves pointer rays to triangles
//! and exports scaled wall geometry for an external acoustic engine.
//!
//! ```no_run
//! use roomstudio::config::StudioConfig;
//! use roomstudio::room::RoomModel;
//!
//! let config = StudioConfig::default();
//! let room = RoomModel::load("resources/room.stl", &config)?;
//! println!("{} surfaces", room.segmentation().len());
//! let center = room.room_center()?;
//! println!("room center: {:?}", center.center);
//! # Ok::<(), roomstudio::StudioError>(())
//! ```

pub mod acoustics;
pub mod config;
pub mod error;
pub mod math;
pub mod mesh;
pub mod picking;
pub mod registry;
pub mod room;
pub mod segmentation;

pub use error::{Result, StudioError};
