//! Registry of containers and standalone slots
//!
//! Every slot taking part in a drag is addressed through a `SlotRef`, so one
//! coordinator can move items between any containers and standalone slots
//! registered here.

use crate::config::InventoryConfig;
use crate::container::{Container, ContainerId};
use crate::error::{InventoryError, PlacementRejected, Result};
use crate::events::ContainerEvent;
use crate::grid::GridPos;
use crate::item::Item;
use crate::slot::{PointerButton, Slot, SlotRef, StandaloneId};
use std::collections::BTreeMap;

/// Containers and standalone slots sharing one drag coordinator
#[derive(Debug, Clone, Default)]
pub struct ContainerSet {
    containers: BTreeMap<ContainerId, Container>,
    standalone: BTreeMap<StandaloneId, Slot>,
    next_container: u32,
    next_standalone: u32,
    default_button: PointerButton,
}

impl ContainerSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set whose new slots take the configured button
    pub fn with_config(config: &InventoryConfig) -> Self {
        Self {
            default_button: config.default_button,
            ..Self::default()
        }
    }

    /// Button accepted by slots created through this set
    pub fn default_button(&self) -> PointerButton {
        self.default_button
    }

    /// Create and register a container
    pub fn create_container(&mut self, width: u32, height: u32) -> ContainerId {
        let id = ContainerId(self.next_container);
        self.next_container += 1;
        let mut container = Container::new(id, width, height);
        container.set_button(self.default_button);
        self.containers.insert(id, container);
        id
    }

    /// Register an existing container, replacing one with the same id
    pub fn insert_container(&mut self, container: Container) -> Option<Container> {
        let id = container.id();
        self.next_container = self.next_container.max(id.0.saturating_add(1));
        self.containers.insert(id, container)
    }

    /// Unregister a container
    pub fn remove_container(&mut self, id: ContainerId) -> Option<Container> {
        self.containers.remove(&id)
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(&id)
    }

    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.get_mut(&id)
    }

    /// Container or `UnknownContainer`
    pub fn require(&self, id: ContainerId) -> Result<&Container> {
        self.container(id).ok_or(InventoryError::UnknownContainer(id))
    }

    /// Mutable container or `UnknownContainer`
    pub fn require_mut(&mut self, id: ContainerId) -> Result<&mut Container> {
        self.container_mut(id)
            .ok_or(InventoryError::UnknownContainer(id))
    }

    /// Registered containers in id order
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.values()
    }

    /// Register a standalone slot
    pub fn add_standalone(&mut self, slot: Slot) -> StandaloneId {
        let id = StandaloneId(self.next_standalone);
        self.next_standalone += 1;
        self.standalone.insert(id, slot);
        id
    }

    /// Unregister a standalone slot
    pub fn remove_standalone(&mut self, id: StandaloneId) -> Option<Slot> {
        self.standalone.remove(&id)
    }

    pub fn standalone(&self, id: StandaloneId) -> Option<&Slot> {
        self.standalone.get(&id)
    }

    pub fn standalone_mut(&mut self, id: StandaloneId) -> Option<&mut Slot> {
        self.standalone.get_mut(&id)
    }

    /// Slot behind a reference
    pub fn slot(&self, slot: SlotRef) -> Option<&Slot> {
        match slot {
            SlotRef::Grid {
                container,
                position,
            } => self.container(container)?.slot(position),
            SlotRef::Standalone(id) => self.standalone(id),
        }
    }

    /// Whether a reference points at a registered slot
    pub fn contains(&self, slot: SlotRef) -> bool {
        self.slot(slot).is_some()
    }

    /// Resolve a covered grid cell to its anchor. Other references are
    /// returned unchanged.
    pub fn resolve(&self, slot: SlotRef) -> SlotRef {
        match slot {
            SlotRef::Grid {
                container,
                position,
            } => {
                let anchor = self
                    .container(container)
                    .and_then(|c| c.anchor_of(position))
                    .unwrap_or(position);
                SlotRef::grid(container, anchor)
            }
            standalone => standalone,
        }
    }

    /// Item held by a slot, looking through covered cells
    pub fn item_at(&self, slot: SlotRef) -> Option<&Item> {
        match self.resolve(slot) {
            SlotRef::Grid {
                container,
                position,
            } => self.container(container)?.get_item(position),
            SlotRef::Standalone(id) => self.standalone(id)?.item(),
        }
    }

    /// Remove the item held by a slot
    pub fn take_item(&mut self, slot: SlotRef) -> Option<Item> {
        match slot {
            SlotRef::Grid {
                container,
                position,
            } => self.container_mut(container)?.remove_item_at(position),
            SlotRef::Standalone(id) => self.standalone_mut(id)?.take_item(),
        }
    }

    /// Place an item into a slot. Grid slots check the footprint, standalone
    /// slots must be empty and run their filter.
    pub fn place_item(&mut self, slot: SlotRef, item: Item) -> Result<()> {
        match slot {
            SlotRef::Grid {
                container,
                position,
            } => self.require_mut(container)?.try_add_item_at(item, position),
            SlotRef::Standalone(id) => {
                let target = self
                    .standalone_mut(id)
                    .ok_or(InventoryError::UnknownSlot(slot))?;
                if !target.is_empty() {
                    return Err(InventoryError::PlacementRejected {
                        item: item.id,
                        position: GridPos::default(),
                        reason: PlacementRejected::Occupied(GridPos::default()),
                    });
                }
                target.try_set_item(item).map(|_| ())
            }
        }
    }

    /// Place an item anywhere in a container
    pub fn place_anywhere(&mut self, container: ContainerId, item: Item) -> Result<GridPos> {
        self.require_mut(container)?.try_add_item(item)
    }

    /// Mutable access to the item held by a slot
    pub(crate) fn item_mut(&mut self, slot: SlotRef) -> Option<&mut Item> {
        match slot {
            SlotRef::Grid {
                container,
                position,
            } => self.container_mut(container)?.anchor_item_mut(position),
            SlotRef::Standalone(id) => self.standalone_mut(id)?.item.as_mut(),
        }
    }

    /// Copy of the containers and standalone slots behind `slots`
    pub(crate) fn checkpoint(&self, slots: &[SlotRef]) -> Checkpoint {
        let mut checkpoint = Checkpoint::default();
        for slot in slots {
            match *slot {
                SlotRef::Grid { container, .. } => {
                    let known = checkpoint.containers.iter().any(|c| c.id() == container);
                    if let (false, Some(c)) = (known, self.container(container)) {
                        checkpoint.containers.push(c.clone());
                    }
                }
                SlotRef::Standalone(id) => {
                    let known = checkpoint.standalone.iter().any(|(saved, _)| *saved == id);
                    if let (false, Some(s)) = (known, self.standalone(id)) {
                        checkpoint.standalone.push((id, s.clone()));
                    }
                }
            }
        }
        checkpoint
    }

    /// Put back everything saved in a checkpoint
    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        for container in checkpoint.containers {
            self.containers.insert(container.id(), container);
        }
        for (id, slot) in checkpoint.standalone {
            self.standalone.insert(id, slot);
        }
    }

    /// Assign the drag button of every registered slot and of slots created
    /// later
    pub fn set_drag_button(&mut self, button: PointerButton) {
        self.default_button = button;
        for container in self.containers.values_mut() {
            container.set_button(button);
        }
        for slot in self.standalone.values_mut() {
            slot.button = button;
        }
        log::debug!("Drag button set to {:?}", button);
    }

    /// Take pending events of every container
    pub fn drain_events(&mut self) -> Vec<(ContainerId, ContainerEvent)> {
        let mut events = Vec::new();
        for (id, container) in &mut self.containers {
            events.extend(container.drain_events().into_iter().map(|e| (*id, e)));
        }
        events
    }
}

/// Saved state of the slots touched by a drop
#[derive(Debug, Clone, Default)]
pub(crate) struct Checkpoint {
    containers: Vec<Container>,
    standalone: Vec<(StandaloneId, Slot)>,
}
