//! Drag and drop protocol
//!
//! A `DragCoordinator` owns the single drag session. A gesture runs
//! `begin_drag`, any number of `hover_enter`/`hover_exit`/`rotate` calls,
//! `drop` with the hit slots (topmost first), `resolve`, and finally
//! `end_drag`, which always disposes the session. Dropping only collects
//! candidates; nothing is mutated until the batch is resolved.

use crate::config::{DragMode, InventoryConfig};
use crate::container::ContainerId;
use crate::error::{DragError, InventoryError};
use crate::events::{DropEvent, DropListeners};
use crate::grid::{Footprint, Region};
use crate::item::{half_stack_ceil, Item};
use crate::resolver::{resolve_drop, DropOutcome};
use crate::set::ContainerSet;
use crate::slot::{PointerButton, SlotRef};

/// Pointer state at drag start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerInput {
    pub button: PointerButton,
    /// Whether the split modifier key is held
    pub split_modifier: bool,
}

impl PointerInput {
    /// Press of a button without modifiers
    pub fn new(button: PointerButton) -> Self {
        Self {
            button,
            split_modifier: false,
        }
    }

    /// Hold the split modifier
    pub fn with_split_modifier(mut self) -> Self {
        self.split_modifier = true;
        self
    }
}

/// What happened to the source slot when the drag began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// The item was removed from the source
    Vacated,
    /// The source still holds the whole item
    Intact,
    /// Part of the stack was withdrawn, the rest stays on the source
    Reduced { withdrawn: u32 },
}

/// The single in-flight drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    item: Item,
    source: SlotRef,
    source_container: Option<ContainerId>,
    original_footprint: Footprint,
    all_stack: bool,
    rotate_count: u32,
    source_state: SourceState,
}

impl DragSession {
    /// Item being dragged, including any rotation
    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Anchor the drag started from
    pub fn source(&self) -> SlotRef {
        self.source
    }

    /// Container of the source, `None` for standalone slots
    pub fn source_container(&self) -> Option<ContainerId> {
        self.source_container
    }

    /// Footprint when the drag began
    pub fn original_footprint(&self) -> Footprint {
        self.original_footprint
    }

    /// Whether the whole stack is being moved
    pub fn all_stack(&self) -> bool {
        self.all_stack
    }

    /// Number of rotations applied
    pub fn rotate_count(&self) -> u32 {
        self.rotate_count
    }

    pub fn source_state(&self) -> SourceState {
        self.source_state
    }

    /// Quantity taken from the source
    pub fn withdrawn(&self) -> u32 {
        self.item.stack
    }

    /// The dragged item with its original footprint
    pub fn original_item(&self) -> Item {
        let mut item = self.item.clone();
        item.footprint = self.original_footprint;
        item
    }
}

/// Hover feedback for a candidate slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverFeedback {
    pub slot: SlotRef,
    /// Whether a drop here would place or merge the item
    pub valid: bool,
    /// Distinct kinds under the dragged footprint
    pub kinds: usize,
}

/// Owner of the drag session, the pending drop batch and the drop listeners
#[derive(Debug, Default)]
pub struct DragCoordinator {
    config: InventoryConfig,
    session: Option<DragSession>,
    candidates: Vec<SlotRef>,
    hover: Option<HoverFeedback>,
    outcome: Option<DropOutcome>,
    events: Vec<DropEvent>,
    listeners: DropListeners,
}

impl DragCoordinator {
    /// Create a coordinator
    pub fn new(config: InventoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Drag mode used by every container this coordinator touches
    pub fn drag_mode(&self) -> DragMode {
        self.config.drag_mode
    }

    /// Change the drag mode. Takes effect with the next drag.
    pub fn set_drag_mode(&mut self, mode: DragMode) {
        self.config.drag_mode = mode;
    }

    /// Active session
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Current hover feedback
    pub fn hover(&self) -> Option<&HoverFeedback> {
        self.hover.as_ref()
    }

    /// Candidates collected for the pending drop
    pub fn candidates(&self) -> &[SlotRef] {
        &self.candidates
    }

    /// Outcome of the current gesture, once resolved
    pub fn outcome(&self) -> Option<&DropOutcome> {
        self.outcome.as_ref()
    }

    pub fn listeners(&self) -> &DropListeners {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut DropListeners {
        &mut self.listeners
    }

    /// Take the queued drop events
    pub fn drain_events(&mut self) -> Vec<DropEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start dragging the item at `source`.
    ///
    /// With the split modifier held on a slot that shows its stack, half the
    /// stack (rounded up) is withdrawn and the rest stays on the source.
    pub fn begin_drag(
        &mut self,
        set: &mut ContainerSet,
        source: SlotRef,
        input: PointerInput,
    ) -> Result<&DragSession, DragError> {
        if self.session.is_some() {
            return Err(DragError::AlreadyDragging);
        }

        let source = set.resolve(source);
        let slot = set
            .slot(source)
            .ok_or(InventoryError::UnknownSlot(source))?;
        let item = slot.item().cloned().ok_or(DragError::EmptySource(source))?;
        if slot.is_locked() {
            return Err(DragError::LockedSource(source));
        }
        if slot.button() != input.button {
            return Err(DragError::ButtonMismatch {
                slot: source,
                expected: slot.button(),
                got: input.button,
            });
        }

        let partial =
            input.split_modifier && slot.capabilities().splits_on_modifier() && item.stack >= 2;

        let (dragged, source_state) = if partial {
            let withdrawn = half_stack_ceil(item.stack);
            let remainder = item.stack - withdrawn;
            if let Some(held) = set.item_mut(source) {
                held.stack = remainder;
            }
            (
                item.with_stack(withdrawn),
                SourceState::Reduced { withdrawn },
            )
        } else {
            match self.config.drag_mode {
                DragMode::RemoveOnDrag => {
                    set.take_item(source);
                    (item, SourceState::Vacated)
                }
                DragMode::RemoveOnDrop => (item, SourceState::Intact),
            }
        };

        log::debug!(
            "Drag started on {} with {} ({:?})",
            source,
            dragged,
            source_state
        );

        self.candidates.clear();
        self.hover = None;
        self.outcome = None;
        Ok(self.session.insert(DragSession {
            original_footprint: dragged.footprint,
            all_stack: !partial,
            rotate_count: 0,
            source_container: source.container(),
            item: dragged,
            source,
            source_state,
        }))
    }

    /// Compute feedback for hovering over `slot`. Does not mutate anything.
    pub fn hover_enter(
        &mut self,
        set: &ContainerSet,
        slot: SlotRef,
    ) -> Result<HoverFeedback, DragError> {
        let session = self.session.as_ref().ok_or(DragError::NotDragging)?;
        let feedback = hover_feedback(set, session, slot);
        self.hover = Some(feedback);
        Ok(feedback)
    }

    /// Clear hover feedback for `slot`
    pub fn hover_exit(&mut self, slot: SlotRef) {
        if self.hover.map_or(false, |hover| hover.slot == slot) {
            self.hover = None;
        }
    }

    /// Turn the dragged item by 90 degrees, returning its new footprint
    pub fn rotate(&mut self) -> Result<Footprint, DragError> {
        let session = self.session.as_mut().ok_or(DragError::NotDragging)?;
        if !session.item.footprint.is_square() {
            session.item = session.item.rotated();
        }
        session.rotate_count += 1;
        Ok(session.item.footprint)
    }

    /// Collect drop candidates, topmost first. Repeated slots are ignored.
    pub fn drop(&mut self, candidates: &[SlotRef]) -> Result<(), DragError> {
        if self.session.is_none() {
            return Err(DragError::NotDragging);
        }
        if self.outcome.is_some() {
            return Err(DragError::AlreadyResolved);
        }
        for candidate in candidates {
            if !self.candidates.contains(candidate) {
                self.candidates.push(*candidate);
            }
        }
        Ok(())
    }

    /// Resolve the pending drop on its topmost candidate, or outside any
    /// slot when no candidate was collected
    pub fn resolve(&mut self, set: &mut ContainerSet) -> Result<DropOutcome, DragError> {
        let target = self.candidates.first().copied();
        self.resolve_on(set, target)
    }

    /// Resolve the pending drop for one slot.
    ///
    /// Only the topmost candidate acts; for any other slot this is a no-op
    /// and returns `None`.
    pub fn resolve_for(
        &mut self,
        set: &mut ContainerSet,
        slot: SlotRef,
    ) -> Result<Option<DropOutcome>, DragError> {
        if self.session.is_none() {
            return Err(DragError::NotDragging);
        }
        let is_topmost = self
            .candidates
            .first()
            .map_or(false, |top| set.resolve(*top) == set.resolve(slot));
        if !is_topmost {
            log::debug!("Drop resolution for {} aborted, not the topmost candidate", slot);
            return Ok(None);
        }
        self.resolve_on(set, Some(slot)).map(Some)
    }

    /// Finish the gesture. Resolves the pending drop if that has not
    /// happened yet, then disposes the session.
    pub fn end_drag(&mut self, set: &mut ContainerSet) -> Result<DropOutcome, DragError> {
        if self.session.is_none() {
            return Err(DragError::NotDragging);
        }
        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None => self.resolve(set)?,
        };
        self.session = None;
        self.candidates.clear();
        self.hover = None;
        self.outcome = None;
        log::debug!("Drag ended: {:?} on {}", outcome.signal, outcome.slot);
        Ok(outcome)
    }

    fn resolve_on(
        &mut self,
        set: &mut ContainerSet,
        target: Option<SlotRef>,
    ) -> Result<DropOutcome, DragError> {
        let session = self.session.as_ref().ok_or(DragError::NotDragging)?;
        if self.outcome.is_some() {
            return Err(DragError::AlreadyResolved);
        }

        let outcome = resolve_drop(set, session, target);
        let event = DropEvent {
            signal: outcome.signal,
            slot: outcome.slot,
            source: outcome.source,
        };
        self.listeners.emit(&event);
        self.events.push(event);
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }
}

/// Feedback for hovering `slot`, computed on the cell a drop there would
/// resolve to (the anchor when `slot` is covered)
fn hover_feedback(set: &ContainerSet, session: &DragSession, slot: SlotRef) -> HoverFeedback {
    let dragged = session.item();
    let target = set.resolve(slot);
    let accepts = set
        .slot(target)
        .map_or(false, |s| s.capabilities().check(dragged).is_ok());
    let merges = |held: &Item| held.merge(dragged).is_some();

    match target {
        SlotRef::Standalone(_) => {
            let held = set.item_at(target);
            let kinds = usize::from(held.is_some());
            let valid = accepts && held.map_or(true, merges);
            HoverFeedback { slot, valid, kinds }
        }
        SlotRef::Grid {
            container,
            position,
        } => {
            let Some(grid) = set.container(container) else {
                return HoverFeedback {
                    slot,
                    valid: false,
                    kinds: 0,
                };
            };

            let shows_stack = grid
                .slot(position)
                .map_or(false, |s| s.capabilities().stack_display.is_some());
            if shows_stack && target != session.source() {
                if let Some(held) = grid.get_item(position) {
                    if held.same_kind(dragged) {
                        return HoverFeedback {
                            slot,
                            valid: accepts && merges(held),
                            kinds: 1,
                        };
                    }
                }
            }

            let exclude = match (session.source_state(), session.source()) {
                (
                    SourceState::Intact,
                    SlotRef::Grid {
                        container: source_container,
                        position: anchor,
                    },
                ) if source_container == container => Some(anchor),
                _ => None,
            };
            let kinds = grid.count_distinct(Region::new(position, dragged.footprint));
            let valid = accepts
                && kinds < 2
                && grid
                    .check_placement_excluding(position, dragged.footprint, exclude)
                    .is_ok();
            HoverFeedback { slot, valid, kinds }
        }
    }
}
