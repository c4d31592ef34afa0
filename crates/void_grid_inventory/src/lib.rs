//! Void Grid Inventory - Grid containers with drag and drop
//!
//! This crate provides spatial inventories where items occupy rectangular
//! footprints on a grid of slots.
//!
//! # Features
//!
//! - Containers with footprint-aware placement and first-fit search
//! - Stackable items with merge and split
//! - Slot filters and stack display policies
//! - A drag and drop protocol with rotation, swapping and rollback
//! - Drop listeners and container change events
//! - Size-ordered sorting and staggered search reveal
//! - JSON and bincode snapshots
//!
//! # Example
//!
//! ```ignore
//! use void_grid_inventory::prelude::*;
//!
//! let mut set = ContainerSet::new();
//! let backpack = set.create_container(4, 4);
//! set.place_item(SlotRef::grid(backpack, (0, 0)), Item::new(1, Footprint::new(2, 1)))?;
//!
//! let mut drag = DragCoordinator::new(InventoryConfig::new());
//! drag.begin_drag(&mut set, SlotRef::grid(backpack, (0, 0)), PointerInput::default())?;
//! drag.drop(&[SlotRef::grid(backpack, (2, 3))])?;
//! let outcome = drag.end_drag(&mut set)?;
//! assert_eq!(outcome.signal, DropSignal::Valid);
//! ```

pub mod codec;
pub mod config;
pub mod container;
pub mod drag;
pub mod error;
pub mod events;
pub mod grid;
pub mod item;
pub mod policy;
pub mod resolver;
pub mod search;
pub mod set;
pub mod slot;
pub mod sort;

pub mod prelude {
    pub use crate::codec::{ContainerData, IconCatalog, IconLookup, ItemData, PlacedItemData};
    pub use crate::config::{DragMode, InventoryConfig, SearchConfig};
    pub use crate::container::{Container, ContainerId};
    pub use crate::drag::{DragCoordinator, DragSession, HoverFeedback, PointerInput, SourceState};
    pub use crate::error::{CodecError, ConfigError, DragError, InventoryError, PlacementRejected};
    pub use crate::events::{ContainerEvent, DropEvent, DropFilter, DropListeners, DropSignal, ListenerId};
    pub use crate::grid::{Footprint, GridPos, Region};
    pub use crate::item::{IconRef, Item, ItemId, KindKey};
    pub use crate::policy::{FilterPolicy, FilterRejection, SlotCapabilities, StackDisplayPolicy};
    pub use crate::resolver::DropOutcome;
    pub use crate::search::SearchReveal;
    pub use crate::set::ContainerSet;
    pub use crate::slot::{PointerButton, Slot, SlotRef, SlotState, StandaloneId};
}

pub use prelude::*;
