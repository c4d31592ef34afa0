//! Drop resolution
//!
//! Given the active session and the slot a drop landed on, decide the outcome
//! and apply it. Every mutation runs against a checkpoint of the touched
//! containers and standalone slots; a failed placement restores the
//! checkpoint and then undoes the drag itself.

use crate::container::{Container, ContainerId};
use crate::drag::{DragSession, SourceState};
use crate::error::{InventoryError, PlacementRejected};
use crate::events::DropSignal;
use crate::grid::{GridPos, Region};
use crate::item::Item;
use crate::set::ContainerSet;
use crate::slot::SlotRef;

/// Result of resolving a drop
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    pub signal: DropSignal,
    /// Slot the drop resolved on: the target, or the source when there is none
    pub slot: SlotRef,
    /// Where the drag started
    pub source: SlotRef,
    /// Why the drop failed. A rollback that could not restore the source
    /// reports `RollbackConflict` here instead.
    pub error: Option<InventoryError>,
    /// Item that could not be put back anywhere
    pub orphan: Option<Item>,
}

impl DropOutcome {
    fn new(signal: DropSignal, slot: SlotRef, source: SlotRef) -> Self {
        Self {
            signal,
            slot,
            source,
            error: None,
            orphan: None,
        }
    }

    /// Whether the item was placed, merged or swapped
    pub fn is_valid(&self) -> bool {
        self.signal == DropSignal::Valid
    }
}

/// Resolve a drop on `target`, or outside any slot when `target` is `None`
pub fn resolve_drop(
    set: &mut ContainerSet,
    session: &DragSession,
    target: Option<SlotRef>,
) -> DropOutcome {
    let source = session.source();
    let target = match target {
        Some(target) => set.resolve(target),
        None => return drop_outside(set, session),
    };

    if target == source {
        log::debug!("Item {} dropped back on {}", session.item().id, source);
        let mut outcome = DropOutcome::new(DropSignal::SelfDrop, target, source);
        restore_into(&mut outcome, set, session);
        return outcome;
    }

    let checkpoint = set.checkpoint(&[source, target]);
    match apply_drop(set, session, target) {
        Ok(()) => {
            log::debug!("Item {} dropped on {}", session.item().id, target);
            DropOutcome::new(DropSignal::Valid, target, source)
        }
        Err(err) => {
            log::warn!(
                "Drop of item {} on {} failed: {}",
                session.item().id,
                target,
                err
            );
            set.restore(checkpoint);
            let mut outcome = DropOutcome::new(DropSignal::Failed, target, source);
            outcome.error = Some(err);
            restore_into(&mut outcome, set, session);
            outcome
        }
    }
}

/// Drop with no slot under the pointer
fn drop_outside(set: &mut ContainerSet, session: &DragSession) -> DropOutcome {
    let source = session.source();
    let can_empty = set.slot(source).map_or(false, |slot| slot.can_empty());

    if can_empty {
        if session.source_state() == SourceState::Intact {
            set.take_item(source);
        }
        log::debug!("Item {} dropped into the void", session.item().id);
        return DropOutcome::new(DropSignal::Void, source, source);
    }

    let mut outcome = DropOutcome::new(DropSignal::SelfDrop, source, source);
    restore_into(&mut outcome, set, session);
    outcome
}

fn apply_drop(
    set: &mut ContainerSet,
    session: &DragSession,
    target: SlotRef,
) -> Result<(), InventoryError> {
    let dragged = session.item().clone();
    let slot = set.slot(target).ok_or(InventoryError::UnknownSlot(target))?;
    slot.capabilities()
        .check(&dragged)
        .map_err(|reason| InventoryError::FilterRejected {
            item: dragged.id,
            reason,
        })?;

    match set.item_at(target).cloned() {
        None => place_on_empty(set, session, target, dragged),
        Some(held) if held.same_kind(&dragged) => merge_onto(set, session, target, dragged),
        Some(held) => swap_with(set, session, target, dragged, held),
    }
}

fn place_on_empty(
    set: &mut ContainerSet,
    session: &DragSession,
    target: SlotRef,
    dragged: Item,
) -> Result<(), InventoryError> {
    if let SlotRef::Grid {
        container,
        position,
    } = target
    {
        let exclude = intact_source_in(session, container);
        set.require(container)?
            .check_placement_excluding(position, dragged.footprint, exclude)
            .map_err(|reason| InventoryError::PlacementRejected {
                item: dragged.id,
                position,
                reason,
            })?;
    }
    vacate_source(set, session);
    set.place_item(target, dragged)
}

fn merge_onto(
    set: &mut ContainerSet,
    session: &DragSession,
    target: SlotRef,
    dragged: Item,
) -> Result<(), InventoryError> {
    let held = set
        .item_at(target)
        .ok_or(InventoryError::UnknownSlot(target))?;
    let merged = held.merge(&dragged).ok_or(InventoryError::StackOverflow {
        item: dragged.id,
        stack: held.stack,
        added: dragged.stack,
    })?;
    vacate_source(set, session);
    let held = set
        .item_mut(target)
        .ok_or(InventoryError::UnknownSlot(target))?;
    *held = merged;
    Ok(())
}

fn swap_with(
    set: &mut ContainerSet,
    session: &DragSession,
    target: SlotRef,
    dragged: Item,
    held: Item,
) -> Result<(), InventoryError> {
    let occupied = |position: GridPos| InventoryError::PlacementRejected {
        item: dragged.id,
        position,
        reason: PlacementRejected::Occupied(position),
    };
    let target_pos = target.position().unwrap_or_default();

    // half a stack cannot trade places with another item
    if !session.all_stack() {
        return Err(occupied(target_pos));
    }

    if let SlotRef::Grid {
        container,
        position,
    } = target
    {
        let region = Region::new(position, dragged.footprint);
        let exclude = intact_source_in(session, container);
        if distinct_kinds(set.require(container)?, region, exclude) >= 2 {
            return Err(occupied(position));
        }
    }

    set.take_item(target);
    vacate_source(set, session);
    set.place_item(target, dragged)?;
    set.place_item(session.source(), held)
}

/// Anchor of the source when it still holds the whole dragged item inside
/// `container`
fn intact_source_in(session: &DragSession, container: ContainerId) -> Option<GridPos> {
    match (session.source_state(), session.source()) {
        (
            SourceState::Intact,
            SlotRef::Grid {
                container: source_container,
                position,
            },
        ) if source_container == container => Some(position),
        _ => None,
    }
}

/// Distinct kinds intersecting a region, ignoring the item anchored at
/// `exclude`. `usize::MAX` if the region leaves the grid.
fn distinct_kinds(container: &Container, region: Region, exclude: Option<GridPos>) -> usize {
    if !container.contains_region(region) {
        return usize::MAX;
    }
    let mut kinds: Vec<&Item> = Vec::new();
    for cell in region.cells() {
        let anchor = match container.anchor_of(cell) {
            Some(anchor) if Some(anchor) != exclude => anchor,
            _ => continue,
        };
        if let Some(item) = container.get_item(anchor) {
            if !kinds.iter().any(|known| known.same_kind(item)) {
                kinds.push(item);
            }
        }
    }
    kinds.len()
}

/// Remove the source item if it was left in place when the drag began
fn vacate_source(set: &mut ContainerSet, session: &DragSession) {
    if session.source_state() == SourceState::Intact {
        set.take_item(session.source());
    }
}

fn restore_into(outcome: &mut DropOutcome, set: &mut ContainerSet, session: &DragSession) {
    if let Err((conflict, orphan)) = restore_source(set, session) {
        outcome.error = Some(conflict);
        outcome.orphan = orphan;
    }
}

/// Undo the drag: put the withdrawn item back on its source with its
/// original footprint.
///
/// If the source cannot take it the item goes to the first free position of
/// the source container, and is handed back if even that fails.
pub(crate) fn restore_source(
    set: &mut ContainerSet,
    session: &DragSession,
) -> Result<(), (InventoryError, Option<Item>)> {
    let source = session.source();
    let original = session.original_item();

    match session.source_state() {
        SourceState::Intact => return Ok(()),
        SourceState::Reduced { .. } => {
            if let Some(held) = set.item_mut(source) {
                if let Some(merged) = held.merge(&original) {
                    *held = merged;
                    return Ok(());
                }
            }
        }
        SourceState::Vacated => {}
    }

    let placed = match source {
        SlotRef::Grid { .. } => set.place_item(source, original.clone()),
        SlotRef::Standalone(id) => match set.standalone_mut(id) {
            Some(slot) if slot.is_empty() => {
                slot.set_item(original.clone());
                Ok(())
            }
            _ => Err(InventoryError::UnknownSlot(source)),
        },
    };
    if placed.is_ok() {
        log::debug!("Item {} restored on {}", original.id, source);
        return Ok(());
    }

    let position = source.position().unwrap_or_default();
    let conflict = InventoryError::RollbackConflict {
        item: original.id,
        position,
    };
    log::error!("{}", conflict);

    if let Some(container) = source.container() {
        if let Ok(pos) = set.place_anywhere(container, original.clone()) {
            log::warn!("Item {} re-placed at {} in {}", original.id, pos, container);
            return Err((conflict, None));
        }
    }
    Err((conflict, Some(original)))
}
