//! Before Evening: pseudo-3D road racer core
//!
//! - `road` lays out the lap as a ring of `segment::Segment`s
//! - `state` advances player physics, collisions and lap timing per tick
//! - `traffic` steers and moves the AI cars
//! - `render` projects the visible window of segments onto a `surface::Surface`
//! - `game` ties them together behind the interface a host or training
//!   harness drives

pub mod colors;
pub mod game;
pub mod input;
pub mod render;
pub mod road;
pub mod segment;
pub mod sprites;
pub mod state;
pub mod stats;
pub mod surface;
pub mod traffic;
pub mod util;

pub use game::BeforeEvening;
pub use input::{Action, InputKeys, Key, KeyMode};
pub use state::{ActionPreview, SimulationState, StateUpdate};
pub use stats::StatsReadout;
pub use surface::{ImageId, Rect, Surface};
