pub mod config;
pub mod error;
pub mod geometry;
pub mod plane;
pub mod topo;
pub mod variables;

pub use config::PlaneConfig;
pub use error::{PlaneError, Result};
pub use plane::{Plane, PlaneEvent, Status};
pub use topo::EntityId;

pub fn version() -> &'static str {
    "0.1.0"
}
