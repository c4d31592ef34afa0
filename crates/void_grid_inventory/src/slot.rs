//! Slots: single grid cells and standalone item holders

use crate::container::ContainerId;
use crate::error::{InventoryError, Result};
use crate::grid::GridPos;
use crate::item::Item;
use crate::policy::SlotCapabilities;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pointer button that starts a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointerButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Identifier of a slot that is not part of any grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StandaloneId(pub u32);

impl fmt::Display for StandaloneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "standalone#{}", self.0)
    }
}

/// Address of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotRef {
    /// A cell inside a container
    Grid {
        container: ContainerId,
        position: GridPos,
    },
    /// A slot outside any grid
    Standalone(StandaloneId),
}

impl SlotRef {
    /// Address of a grid cell
    pub fn grid(container: ContainerId, position: impl Into<GridPos>) -> Self {
        Self::Grid {
            container,
            position: position.into(),
        }
    }

    /// Owning container, `None` for standalone slots
    pub fn container(&self) -> Option<ContainerId> {
        match self {
            Self::Grid { container, .. } => Some(*container),
            Self::Standalone(_) => None,
        }
    }

    /// Grid position, `None` for standalone slots
    pub fn position(&self) -> Option<GridPos> {
        match self {
            Self::Grid { position, .. } => Some(*position),
            Self::Standalone(_) => None,
        }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid {
                container,
                position,
            } => write!(f, "{}{}", container, position),
            Self::Standalone(id) => write!(f, "{}", id),
        }
    }
}

/// Observable slot state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// No item, available for placement
    Empty,
    /// Holds an item
    Anchored,
    /// Part of a neighbouring anchor's footprint
    Covered,
    /// Collapsed by a visibility toggle
    Hidden,
}

/// One addressable cell or standalone holder
#[derive(Debug, Clone)]
pub struct Slot {
    position: GridPos,
    pub(crate) enabled: bool,
    pub(crate) active: bool,
    pub(crate) locked: bool,
    pub(crate) hidden: bool,
    pub(crate) can_empty: bool,
    pub(crate) button: PointerButton,
    pub(crate) item: Option<Item>,
    pub(crate) covered_by: Option<GridPos>,
    pub(crate) display_size: [f32; 2],
    pub(crate) capabilities: SlotCapabilities,
}

impl Slot {
    /// Create an empty, enabled slot
    pub fn new(position: GridPos) -> Self {
        Self {
            position,
            enabled: true,
            active: false,
            locked: false,
            hidden: false,
            can_empty: false,
            button: PointerButton::Left,
            item: None,
            covered_by: None,
            display_size: [0.0, 0.0],
            capabilities: SlotCapabilities::none(),
        }
    }

    /// Create a standalone slot
    pub fn standalone() -> Self {
        Self::new(GridPos::default())
    }

    /// Attach capabilities
    pub fn with_capabilities(mut self, capabilities: SlotCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Allow dropping this slot's item into the void
    pub fn with_can_empty(mut self, can_empty: bool) -> Self {
        self.can_empty = can_empty;
        self
    }

    /// Set accepted pointer button
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Set display size
    pub fn with_display_size(mut self, size: [f32; 2]) -> Self {
        self.display_size = size;
        self
    }

    /// Grid position
    pub fn position(&self) -> GridPos {
        self.position
    }

    /// Held item
    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    /// Whether no item is held
    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn can_empty(&self) -> bool {
        self.can_empty
    }

    /// Accepted pointer button
    pub fn button(&self) -> PointerButton {
        self.button
    }

    /// Anchor owning this cell, when covered
    pub fn covered_by(&self) -> Option<GridPos> {
        self.covered_by
    }

    pub fn display_size(&self) -> [f32; 2] {
        self.display_size
    }

    pub fn capabilities(&self) -> &SlotCapabilities {
        &self.capabilities
    }

    /// Current state
    pub fn state(&self) -> SlotState {
        if self.hidden {
            SlotState::Hidden
        } else if self.covered_by.is_some() {
            SlotState::Covered
        } else if self.item.is_some() {
            SlotState::Anchored
        } else {
            SlotState::Empty
        }
    }

    /// Whether a drag may start here
    pub fn can_drag(&self, button: PointerButton) -> bool {
        self.item.is_some() && !self.locked && self.button == button
    }

    /// Count shown by the stack display, if any
    pub fn displayed_stack(&self) -> Option<u32> {
        let policy = self.capabilities.stack_display?;
        policy.display(self.item.as_ref()?)
    }

    /// Put an item in a standalone slot, running the filter.
    ///
    /// Returns the previously held item.
    pub fn try_set_item(&mut self, item: Item) -> Result<Option<Item>> {
        if item.is_empty() {
            return Ok(self.take_item());
        }
        if let Err(reason) = self.capabilities.check(&item) {
            log::warn!("Slot {} rejected item {}: {}", self.position, item.id, reason);
            return Err(InventoryError::FilterRejected {
                item: item.id,
                reason,
            });
        }
        Ok(self.set_item(item))
    }

    /// Put an item in a standalone slot without filtering.
    ///
    /// Returns the previously held item.
    pub fn set_item(&mut self, item: Item) -> Option<Item> {
        if item.is_empty() {
            return self.take_item();
        }
        self.active = true;
        self.item.replace(item)
    }

    /// Take the held item out of a standalone slot
    pub fn take_item(&mut self) -> Option<Item> {
        self.active = false;
        self.item.take()
    }
}
