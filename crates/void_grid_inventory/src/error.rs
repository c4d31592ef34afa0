//! Error types

use crate::container::ContainerId;
use crate::grid::GridPos;
use crate::item::ItemId;
use crate::policy::FilterRejection;
use crate::slot::{PointerButton, SlotRef};
use thiserror::Error;

/// Why a placement was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementRejected {
    #[error("region leaves the grid")]
    OutOfBounds,

    #[error("cell {0} is occupied")]
    Occupied(GridPos),

    #[error("cell {0} is disabled")]
    Disabled(GridPos),

    #[error("the empty item cannot be placed")]
    EmptyItem,

    #[error("no free region is large enough")]
    NoSpace,
}

/// Container and slot operation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    #[error("cannot place item {item} at {position}: {reason}")]
    PlacementRejected {
        item: ItemId,
        position: GridPos,
        reason: PlacementRejected,
    },

    #[error("item {item} rejected by slot filter: {reason}")]
    FilterRejected {
        item: ItemId,
        reason: FilterRejection,
    },

    #[error("rollback could not restore item {item} at {position}")]
    RollbackConflict { item: ItemId, position: GridPos },

    #[error("merging {added} into item {item} with a stack of {stack} overflows")]
    StackOverflow { item: ItemId, stack: u32, added: u32 },

    #[error("cannot split {amount} from a stack of {stack}")]
    InvalidSplit { stack: u32, amount: u32 },

    #[error("no item at {0}")]
    NoItem(GridPos),

    #[error("unknown container {0}")]
    UnknownContainer(ContainerId),

    #[error("unknown slot {0}")]
    UnknownSlot(SlotRef),
}

/// Drag protocol errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DragError {
    #[error("a drag is already in progress")]
    AlreadyDragging,

    #[error("no drag in progress")]
    NotDragging,

    #[error("the drop was already resolved")]
    AlreadyResolved,

    #[error("slot {0} holds no item")]
    EmptySource(SlotRef),

    #[error("slot {0} is locked")]
    LockedSource(SlotRef),

    #[error("slot {slot} accepts {expected:?}, got {got:?}")]
    ButtonMismatch {
        slot: SlotRef,
        expected: PointerButton,
        got: PointerButton,
    },

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Persistence errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown icon '{0}'")]
    UnknownIcon(String),

    #[error("snapshot is {found:?}, container is {expected:?}")]
    SizeMismatch { expected: [u32; 2], found: [u32; 2] },

    #[error("grid {0:?} exceeds {MAX_SNAPSHOT_CELLS} cells")]
    GridTooLarge([u32; 2]),

    #[error("invalid item size {0:?}")]
    InvalidSize([i32; 2]),

    #[error(transparent)]
    Placement(#[from] InventoryError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Binary(#[from] bincode::Error),
}

/// Largest grid a snapshot may describe
pub const MAX_SNAPSHOT_CELLS: u64 = 1 << 20;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for container operations
pub type Result<T> = std::result::Result<T, InventoryError>;
