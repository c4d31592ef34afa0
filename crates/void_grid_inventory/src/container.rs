//! Container: a rectangular grid of slots holding multi-cell items
//!
//! Each placed item occupies a `w x h` block. The top-left cell of the block
//! is the anchor and stores the item; the remaining cells are covered and
//! point back at the anchor. All placements are all-or-nothing.

use crate::error::{InventoryError, PlacementRejected, Result};
use crate::events::ContainerEvent;
use crate::grid::{Footprint, GridPos, Region};
use crate::item::{Item, ItemId};
use crate::policy::SlotCapabilities;
use crate::slot::{PointerButton, Slot, SlotRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(pub u32);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

/// Default display size of one cell
pub const DEFAULT_CELL_SIZE: [f32; 2] = [64.0, 64.0];

/// Grid of slots
#[derive(Debug, Clone)]
pub struct Container {
    id: ContainerId,
    width: u32,
    height: u32,
    cell_size: [f32; 2],
    /// Column-major: index `x * height + y`
    pub(crate) slots: Vec<Slot>,
    /// Lock state applied with `lock`
    locked: bool,
    pub(crate) events: Vec<ContainerEvent>,
}

impl Container {
    /// Create a container with every slot empty. Sides are capped at
    /// `Footprint::MAX_SIDE`.
    pub fn new(id: ContainerId, width: u32, height: u32) -> Self {
        let (width, height) = (width.min(Footprint::MAX_SIDE), height.min(Footprint::MAX_SIDE));
        let mut slots = Vec::with_capacity((width as usize).saturating_mul(height as usize));
        let columns = if height == 0 { 0 } else { width as i32 };
        for x in 0..columns {
            for y in 0..height as i32 {
                slots.push(Slot::new(GridPos::new(x, y)).with_display_size(DEFAULT_CELL_SIZE));
            }
        }
        Self {
            id,
            width,
            height,
            cell_size: DEFAULT_CELL_SIZE,
            slots,
            locked: false,
            events: Vec::new(),
        }
    }

    /// Set cell display size
    pub fn with_cell_size(mut self, cell_size: [f32; 2]) -> Self {
        self.cell_size = cell_size;
        for slot in &mut self.slots {
            slot.display_size = cell_size;
        }
        self
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> [f32; 2] {
        self.cell_size
    }

    /// Number of cells
    pub fn cell_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether no item is placed
    pub fn is_empty(&self) -> bool {
        self.anchors().next().is_none()
    }

    /// Whether a position lies inside the grid
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// The whole grid as a region, `None` when it has no cells
    pub fn bounds(&self) -> Option<Region> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(Region::new(
            GridPos::new(0, 0),
            Footprint::new(self.width, self.height),
        ))
    }

    /// Whether every cell of a region lies inside the grid
    pub fn contains_region(&self, region: Region) -> bool {
        self.clip(region) == Some(region)
    }

    /// Part of a region inside the grid
    pub fn clip(&self, region: Region) -> Option<Region> {
        self.bounds()?.intersect(&region)
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.x as usize * self.height as usize + pos.y as usize)
        } else {
            None
        }
    }

    /// Slot at a position
    pub fn slot(&self, pos: GridPos) -> Option<&Slot> {
        self.index(pos).map(|i| &self.slots[i])
    }

    pub(crate) fn slot_mut(&mut self, pos: GridPos) -> Option<&mut Slot> {
        let i = self.index(pos)?;
        Some(&mut self.slots[i])
    }

    /// All slots in scan order
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Address of a cell in this container
    pub fn slot_ref(&self, pos: GridPos) -> SlotRef {
        SlotRef::grid(self.id, pos)
    }

    /// Anchor owning a cell: the cell itself when it holds an item, its
    /// anchor when covered, `None` otherwise
    pub fn anchor_of(&self, pos: GridPos) -> Option<GridPos> {
        let slot = self.slot(pos)?;
        if slot.item.is_some() {
            Some(pos)
        } else {
            slot.covered_by
        }
    }

    /// Anchors and their items in scan order (x outer, y inner)
    pub fn anchors(&self) -> impl Iterator<Item = (GridPos, &Item)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.item.as_ref().map(|item| (slot.position(), item)))
    }

    // Placement checks

    /// Check whether a footprint fits at a position
    pub fn check_placement(
        &self,
        pos: GridPos,
        footprint: Footprint,
    ) -> std::result::Result<(), PlacementRejected> {
        self.check_placement_excluding(pos, footprint, None)
    }

    /// Like `check_placement`, treating the block of `exclude` as free
    pub fn check_placement_excluding(
        &self,
        pos: GridPos,
        footprint: Footprint,
        exclude: Option<GridPos>,
    ) -> std::result::Result<(), PlacementRejected> {
        let region = Region::new(pos, footprint);
        if !self.contains_region(region) {
            return Err(PlacementRejected::OutOfBounds);
        }
        for cell in region.cells() {
            let slot = self.slot(cell).ok_or(PlacementRejected::OutOfBounds)?;
            let owner = if slot.item.is_some() {
                Some(cell)
            } else {
                slot.covered_by
            };
            match owner {
                Some(anchor) if Some(anchor) == exclude => continue,
                Some(_) => return Err(PlacementRejected::Occupied(cell)),
                None if !slot.enabled => return Err(PlacementRejected::Disabled(cell)),
                None => {}
            }
        }
        Ok(())
    }

    /// Whether every cell of the block is in bounds, enabled and empty
    pub fn is_valid(&self, pos: GridPos, footprint: Footprint) -> bool {
        self.check_placement(pos, footprint).is_ok()
    }

    /// `is_valid`, ignoring the item anchored at `exclude`
    pub fn is_valid_excluding(&self, pos: GridPos, footprint: Footprint, exclude: GridPos) -> bool {
        self.check_placement_excluding(pos, footprint, Some(exclude))
            .is_ok()
    }

    /// First position a footprint fits at, scanning x outer, y inner
    pub fn first_fit(&self, footprint: Footprint) -> Option<GridPos> {
        (0..self.width as i32)
            .flat_map(|x| (0..self.height as i32).map(move |y| GridPos::new(x, y)))
            .find(|pos| self.is_valid(*pos, footprint))
    }

    // Placement

    /// Place an item with its anchor at `pos`
    pub fn try_add_item_at(&mut self, item: Item, pos: GridPos) -> Result<()> {
        let rejected = |reason| InventoryError::PlacementRejected {
            item: item.id,
            position: pos,
            reason,
        };
        if item.is_empty() {
            return Err(rejected(PlacementRejected::EmptyItem));
        }
        if let Err(reason) = self.check_placement(pos, item.footprint) {
            log::debug!("{}: cannot place item {} at {}: {}", self.id, item.id, pos, reason);
            return Err(rejected(reason));
        }

        let footprint = item.footprint;
        for cell in Region::new(pos, footprint).cells() {
            if let Some(slot) = self.slot_mut(cell) {
                slot.enabled = false;
                slot.active = false;
                slot.covered_by = Some(pos);
            }
        }

        let display_size = self.block_display_size(footprint);
        if let Some(anchor) = self.slot_mut(pos) {
            anchor.enabled = true;
            anchor.active = true;
            anchor.covered_by = None;
            anchor.display_size = display_size;
            anchor.item = Some(item.clone());
        }

        log::debug!("{}: added {} at {}", self.id, item, pos);
        self.events.push(ContainerEvent::ItemAdded {
            position: pos,
            item,
        });
        Ok(())
    }

    /// Place an item with its anchor at `pos`. Returns false, leaving the
    /// container untouched, if the block is not valid.
    pub fn add_item_at(&mut self, item: Item, pos: GridPos) -> bool {
        self.try_add_item_at(item, pos).is_ok()
    }

    /// Place an item at the first position it fits
    pub fn try_add_item(&mut self, item: Item) -> Result<GridPos> {
        if item.is_empty() {
            return Err(InventoryError::PlacementRejected {
                item: item.id,
                position: GridPos::default(),
                reason: PlacementRejected::EmptyItem,
            });
        }
        match self.first_fit(item.footprint) {
            Some(pos) => self.try_add_item_at(item, pos).map(|_| pos),
            None => {
                log::debug!("{}: no room for {}", self.id, item);
                Err(InventoryError::PlacementRejected {
                    item: item.id,
                    position: GridPos::default(),
                    reason: PlacementRejected::NoSpace,
                })
            }
        }
    }

    /// First-fit placement
    pub fn add_item(&mut self, item: Item) -> bool {
        self.try_add_item(item).is_ok()
    }

    // Removal

    /// Remove the item whose block contains `pos`
    pub fn remove_item_at(&mut self, pos: GridPos) -> Option<Item> {
        let anchor = self.anchor_of(pos)?;
        let cell_size = self.cell_size;
        let locked = self.locked;

        let slot = self.slot_mut(anchor)?;
        let item = slot.item.take()?;
        let was_hidden = slot.hidden;
        slot.hidden = false;
        slot.active = false;
        slot.display_size = cell_size;

        for cell in Region::new(anchor, item.footprint).cells() {
            if let Some(slot) = self.slot_mut(cell) {
                slot.enabled = true;
                slot.covered_by = None;
                if was_hidden {
                    slot.locked = locked;
                }
            }
        }

        log::debug!("{}: removed {} from {}", self.id, item, anchor);
        self.events.push(ContainerEvent::ItemRemoved {
            position: anchor,
            item: item.clone(),
        });
        Some(item)
    }

    /// Remove the first item with a given id, in scan order
    pub fn remove_item_by_id(&mut self, id: ItemId) -> Option<Item> {
        let pos = self.anchors().find(|(_, item)| item.id == id).map(|(pos, _)| pos)?;
        self.remove_item_at(pos)
    }

    /// Remove every item anchored inside a region. Out-of-bounds cells are
    /// skipped.
    pub fn remove_items_in(&mut self, region: Region) -> Vec<Item> {
        let anchors: Vec<GridPos> = self
            .clipped_cells(region)
            .filter(|cell| self.slot(*cell).map_or(false, |slot| slot.item.is_some()))
            .collect();
        anchors
            .into_iter()
            .filter_map(|pos| self.remove_item_at(pos))
            .collect()
    }

    /// Remove every item
    pub fn remove_all(&mut self) -> Vec<Item> {
        let anchors: Vec<GridPos> = self.anchors().map(|(pos, _)| pos).collect();
        anchors
            .into_iter()
            .filter_map(|pos| self.remove_item_at(pos))
            .collect()
    }

    // Queries

    /// Number of distinct kinds intersecting a region, `usize::MAX` if any
    /// cell is out of bounds
    pub fn count_distinct(&self, region: Region) -> usize {
        if !self.contains_region(region) {
            return usize::MAX;
        }
        let mut kinds: Vec<&Item> = Vec::new();
        for cell in region.cells() {
            if let Some(item) = self.anchor_of(cell).and_then(|anchor| self.get_item(anchor)) {
                if !kinds.iter().any(|known| known.same_kind(item)) {
                    kinds.push(item);
                }
            }
        }
        kinds.len()
    }

    /// Item anchored at `pos`
    pub fn get_item(&self, pos: GridPos) -> Option<&Item> {
        self.slot(pos)?.item.as_ref()
    }

    /// First item anchored inside a region
    pub fn get_item_in(&self, region: Region) -> Option<&Item> {
        self.clipped_cells(region).find_map(|cell| self.get_item(cell))
    }

    /// All items in scan order
    pub fn items(&self) -> Vec<&Item> {
        self.anchors().map(|(_, item)| item).collect()
    }

    /// Items anchored inside a region
    pub fn items_in(&self, region: Region) -> Vec<&Item> {
        self.clipped_cells(region)
            .filter_map(|cell| self.get_item(cell))
            .collect()
    }

    /// In-grid cells of a region
    fn clipped_cells(&self, region: Region) -> impl Iterator<Item = GridPos> {
        self.clip(region).into_iter().flat_map(|clipped| clipped.cells())
    }

    /// Anchor of the first item of the same kind
    pub fn find_position(&self, item: &Item) -> Option<GridPos> {
        self.anchors()
            .find(|(_, placed)| placed.same_kind(item))
            .map(|(pos, _)| pos)
    }

    // Visibility and locking

    /// Collapse or restore the item whose block contains `pos`
    pub fn set_visibility(&mut self, pos: GridPos, visible: bool) -> Result<()> {
        let anchor = self.anchor_of(pos).ok_or(InventoryError::NoItem(pos))?;
        let footprint = self
            .get_item(anchor)
            .map(|item| item.footprint)
            .ok_or(InventoryError::NoItem(pos))?;
        let locked = self.locked;

        for cell in Region::new(anchor, footprint).cells() {
            if cell == anchor {
                continue;
            }
            if let Some(slot) = self.slot_mut(cell) {
                slot.enabled = false;
                slot.locked = if visible { locked } else { true };
            }
        }

        let display_size = if visible {
            self.block_display_size(footprint)
        } else {
            self.cell_size
        };
        if let Some(slot) = self.slot_mut(anchor) {
            slot.hidden = !visible;
            slot.locked = if visible { locked } else { true };
            slot.display_size = display_size;
        }
        Ok(())
    }

    /// Whether the item at `pos` is shown expanded. Cells without an item
    /// report visible.
    pub fn get_visibility(&self, pos: GridPos) -> bool {
        match self.anchor_of(pos).and_then(|anchor| self.slot(anchor)) {
            Some(slot) => !slot.hidden && slot.enabled,
            None => true,
        }
    }

    /// Set the lock flag on every slot
    pub fn lock(&mut self, locked: bool) {
        self.locked = locked;
        for slot in &mut self.slots {
            slot.locked = locked;
        }
        log::debug!(
            "{}: {} slots {}",
            self.id,
            self.slots.len(),
            if locked { "locked" } else { "unlocked" }
        );
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    // Stacks

    pub(crate) fn anchor_item_mut(&mut self, pos: GridPos) -> Option<&mut Item> {
        let anchor = self.anchor_of(pos)?;
        self.slot_mut(anchor)?.item.as_mut()
    }

    /// Set the stack of the item at `pos`. A stack of zero removes the item.
    pub fn set_stack(&mut self, pos: GridPos, stack: u32) -> Result<()> {
        if stack == 0 {
            return self
                .remove_item_at(pos)
                .map(|_| ())
                .ok_or(InventoryError::NoItem(pos));
        }
        let item = self.anchor_item_mut(pos).ok_or(InventoryError::NoItem(pos))?;
        item.stack = stack;
        Ok(())
    }

    /// Split the stack at `pos` and place the new stack first-fit.
    ///
    /// Without an amount the new stack takes `floor(stack / 2)` and the
    /// source keeps the rest. Returns the new stack's anchor. On failure the
    /// source keeps its whole stack.
    pub fn split(&mut self, pos: GridPos, amount: Option<u32>) -> Result<GridPos> {
        let anchor = self.anchor_of(pos).ok_or(InventoryError::NoItem(pos))?;
        let source = self
            .get_item(anchor)
            .cloned()
            .ok_or(InventoryError::NoItem(pos))?;

        let amount = amount.unwrap_or(source.stack / 2);
        let (moved, rest) = source.split(amount).ok_or(InventoryError::InvalidSplit {
            stack: source.stack,
            amount,
        })?;

        self.set_stack(anchor, rest.stack)?;
        match self.try_add_item(moved) {
            Ok(new_anchor) => {
                log::debug!(
                    "{}: split {} from {} into {}",
                    self.id,
                    amount,
                    anchor,
                    new_anchor
                );
                Ok(new_anchor)
            }
            Err(err) => {
                log::warn!("{}: split of {} at {} failed: {}", self.id, amount, anchor, err);
                self.set_stack(anchor, source.stack)?;
                Err(err)
            }
        }
    }

    // Configuration

    /// Allow or forbid dropping items into the void from every slot
    pub fn set_can_empty(&mut self, can_empty: bool) {
        for slot in &mut self.slots {
            slot.can_empty = can_empty;
        }
    }

    /// Pointer button accepted by every slot
    pub fn set_button(&mut self, button: PointerButton) {
        for slot in &mut self.slots {
            slot.button = button;
        }
    }

    /// Attach capabilities to one slot
    pub fn set_capabilities(&mut self, pos: GridPos, capabilities: SlotCapabilities) -> Result<()> {
        let slot_ref = self.slot_ref(pos);
        let slot = self
            .slot_mut(pos)
            .ok_or(InventoryError::UnknownSlot(slot_ref))?;
        slot.capabilities = capabilities;
        Ok(())
    }

    /// Attach the same capabilities to every slot
    pub fn set_all_capabilities(&mut self, capabilities: SlotCapabilities) {
        for slot in &mut self.slots {
            slot.capabilities = capabilities.clone();
        }
    }

    /// Enable or disable an empty, uncovered cell
    pub fn set_slot_enabled(&mut self, pos: GridPos, enabled: bool) -> Result<()> {
        let slot_ref = self.slot_ref(pos);
        let slot = self
            .slot_mut(pos)
            .ok_or(InventoryError::UnknownSlot(slot_ref))?;
        if slot.item.is_some() || slot.covered_by.is_some() {
            return Err(InventoryError::PlacementRejected {
                item: slot.item.as_ref().map_or(Item::EMPTY_ID, |item| item.id),
                position: pos,
                reason: PlacementRejected::Occupied(pos),
            });
        }
        slot.enabled = enabled;
        Ok(())
    }

    // Events

    /// Pending events
    pub fn events(&self) -> &[ContainerEvent] {
        &self.events
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<ContainerEvent> {
        std::mem::take(&mut self.events)
    }

    fn block_display_size(&self, footprint: Footprint) -> [f32; 2] {
        [
            self.cell_size[0] * footprint.width() as f32,
            self.cell_size[1] * footprint.height() as f32,
        ]
    }
}
