//! Shapeboard Core Library
//!
//! Editing state for a vector drawing canvas: shape records, undoable
//! commands with a bounded history, drag snapping, and document persistence.
//! Rendering is left to the host, which plugs in through [`BoundsProvider`].

pub mod command;
pub mod config;
pub mod document;
pub mod registry;
pub mod session;
pub mod shapes;
pub mod snap;
pub mod storage;
pub mod surface;

pub use command::{
    CombineCommand, Command, CommandManager, HistoryStatus, MAXIMUM_HISTORY_SIZE, SubscriptionId,
};
pub use config::{ConfigError, EditorConfig, ShapeDefaults};
pub use document::{DocumentError, DocumentFile};
pub use registry::{CanvasOption, RegistryError, ShapeRegistry, ShapesUpdate, Snapshot};
pub use session::EditorSession;
pub use shapes::{Shape, ShapeId, ShapeKind, ShapePatch, ShapeStyle, ShapeType};
pub use snap::{
    DEFAULT_SNAP_TOLERANCE, GuideLine, Orientation, SnapEdges, SnapOptions, SnapOutcome,
    calculate_snap, collect_snap_targets,
};
pub use storage::{AutoSaveManager, FileStorage, MemoryStorage, Storage, StorageError};
pub use surface::{BoundsProvider, GeometryBounds};
