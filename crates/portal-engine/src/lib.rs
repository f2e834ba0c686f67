pub mod api;
pub mod core;
pub mod level;
pub mod input;
pub mod bridge;

// Re-export key types at crate root for convenience
pub use crate::api::config::{ConfigError, SimConfig};
pub use crate::api::types::{BodyId, SwitchId, GoalId, PortalKind, SimEvent, GameEvent};
pub use crate::core::time::{FixedTimestep, Countdown};
pub use crate::core::geometry::{Rect, SurfaceKind, GeometryQuery, LevelGeometry};
pub use crate::core::body::{KinematicBody, BodyKind, BodyInput, BodyState, AxisOutcome, Teleportable};
pub use crate::core::bodies::BodySet;
pub use crate::core::raycast::{RaycastPlacer, RayHit};
pub use crate::core::portal::{Portal, PortalSlots};
pub use crate::core::teleport::{transfer, TransferParams, TransferOutcome};
pub use crate::core::triggers::{Switch, Goal};
pub use crate::core::world::{SimulationWorld, SimPhase, PortalPlaced, PlacementRejected};
pub use crate::level::desc::{LevelDesc, LevelError};
pub use crate::level::score::{star_rating, DEFAULT_STAR_TIMES};
pub use crate::input::queue::{InputEvent, InputQueue, ControlState};
pub use crate::bridge::protocol::{ProtocolLayout, SnapshotBuffer};
