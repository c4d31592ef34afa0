//! Integration tests for the drag and drop protocol

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use void_grid_inventory::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Fixture {
    set: ContainerSet,
    backpack: ContainerId,
    drag: DragCoordinator,
}

impl Fixture {
    fn new(mode: DragMode) -> Self {
        init_logging();
        let mut set = ContainerSet::new();
        let backpack = set.create_container(4, 4);
        Self {
            set,
            backpack,
            drag: DragCoordinator::new(InventoryConfig::new().with_drag_mode(mode)),
        }
    }

    fn cell(&self, x: i32, y: i32) -> SlotRef {
        SlotRef::grid(self.backpack, (x, y))
    }

    fn place(&mut self, x: i32, y: i32, item: Item) {
        let slot = self.cell(x, y);
        self.set.place_item(slot, item).unwrap();
    }

    fn id_at(&self, x: i32, y: i32) -> Option<ItemId> {
        self.set.item_at(self.cell(x, y)).map(|item| item.id)
    }

    fn begin(&mut self, from: SlotRef, input: PointerInput) -> DragSession {
        self.drag
            .begin_drag(&mut self.set, from, input)
            .unwrap()
            .clone()
    }

    /// Full gesture: begin on `from`, release over `targets`
    fn gesture(&mut self, from: SlotRef, targets: &[SlotRef]) -> DropOutcome {
        self.begin(from, PointerInput::default());
        self.drag.drop(targets).unwrap();
        self.drag.end_drag(&mut self.set).unwrap()
    }
}

fn potion(stack: u32) -> Item {
    Item::new(10, Footprint::ONE)
        .with_icon(IconRef::named("potion"))
        .with_stack(stack)
}

#[test]
fn test_move_to_empty_cell() {
    for mode in [DragMode::RemoveOnDrag, DragMode::RemoveOnDrop] {
        let mut fx = Fixture::new(mode);
        fx.place(0, 0, Item::new(1, Footprint::new(2, 1)));

        let outcome = fx.gesture(fx.cell(0, 0), &[fx.cell(2, 3)]);
        assert_eq!(outcome.signal, DropSignal::Valid);
        assert_eq!(fx.id_at(2, 3), Some(1));
        assert_eq!(fx.id_at(3, 3), Some(1));
        assert_eq!(fx.id_at(0, 0), None);
        assert!(!fx.drag.is_dragging());
    }
}

#[test]
fn test_merge_same_kind() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrop);
    fx.place(0, 0, potion(3));
    fx.place(3, 3, potion(4));

    let outcome = fx.gesture(fx.cell(0, 0), &[fx.cell(3, 3)]);
    assert!(outcome.is_valid());
    assert_eq!(fx.set.item_at(fx.cell(3, 3)).unwrap().stack, 7);
    assert!(fx.set.item_at(fx.cell(0, 0)).is_none());
}

#[test]
fn test_non_topmost_candidate_is_noop() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    fx.place(0, 0, Item::new(1, Footprint::ONE));
    fx.begin(fx.cell(0, 0), PointerInput::default());

    let top = fx.cell(3, 3);
    let below = fx.cell(0, 3);
    fx.drag.drop(&[top, below]).unwrap();

    let before = fx.set.require(fx.backpack).unwrap().snapshot();
    assert_eq!(fx.drag.resolve_for(&mut fx.set, below).unwrap(), None);
    assert_eq!(fx.set.require(fx.backpack).unwrap().snapshot(), before);

    let outcome = fx.drag.resolve_for(&mut fx.set, top).unwrap().unwrap();
    assert_eq!(outcome.signal, DropSignal::Valid);
    assert_eq!(fx.drag.end_drag(&mut fx.set).unwrap(), outcome);
    assert_eq!(fx.id_at(3, 3), Some(1));
    assert_eq!(fx.id_at(0, 3), None);
}

#[test]
fn test_swap_different_kinds() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    fx.place(0, 0, Item::new(1, Footprint::new(1, 2)));
    fx.place(2, 0, Item::new(2, Footprint::new(1, 2)));

    let outcome = fx.gesture(fx.cell(0, 0), &[fx.cell(2, 1)]);
    assert!(outcome.is_valid());
    assert_eq!(fx.id_at(2, 0), Some(1));
    assert_eq!(fx.id_at(0, 0), Some(2));
    assert_eq!(fx.id_at(0, 1), Some(2));
}

#[test]
fn test_swap_rolls_back_when_source_cannot_take_target() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    fx.place(0, 0, Item::new(1, Footprint::ONE));
    fx.place(2, 0, Item::new(2, Footprint::new(2, 2)));
    fx.place(1, 1, Item::new(3, Footprint::ONE));

    let outcome = fx.gesture(fx.cell(0, 0), &[fx.cell(2, 0)]);
    assert_eq!(outcome.signal, DropSignal::Failed);
    assert!(outcome.error.is_some());
    assert!(outcome.orphan.is_none());
    assert_eq!(fx.id_at(0, 0), Some(1));
    assert_eq!(fx.id_at(2, 0), Some(2));
    assert_eq!(fx.id_at(3, 1), Some(2));
    assert_eq!(fx.id_at(1, 1), Some(3));
}

#[test]
fn test_swap_refused_over_two_kinds() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    fx.place(0, 0, Item::new(1, Footprint::new(2, 1)));
    fx.place(0, 2, Item::new(2, Footprint::ONE));
    fx.place(1, 2, Item::new(3, Footprint::ONE));

    let outcome = fx.gesture(fx.cell(0, 0), &[fx.cell(0, 2)]);
    assert_eq!(outcome.signal, DropSignal::Failed);
    assert_eq!(fx.id_at(0, 0), Some(1));
    assert_eq!(fx.id_at(1, 0), Some(1));
    assert_eq!(fx.id_at(0, 2), Some(2));
    assert_eq!(fx.id_at(1, 2), Some(3));
}

#[test]
fn test_void_and_self_drops() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrop);
    fx.place(0, 0, Item::new(1, Footprint::new(2, 2)));

    // back onto one of its own covered cells
    let outcome = fx.gesture(fx.cell(1, 1), &[fx.cell(1, 0)]);
    assert_eq!(outcome.signal, DropSignal::SelfDrop);
    assert_eq!(fx.id_at(0, 0), Some(1));

    // outside, emptying disabled
    let outcome = fx.gesture(fx.cell(0, 0), &[]);
    assert_eq!(outcome.signal, DropSignal::SelfDrop);
    assert_eq!(fx.id_at(0, 0), Some(1));

    fx.set.require_mut(fx.backpack).unwrap().set_can_empty(true);
    fx.set.drain_events();
    let outcome = fx.gesture(fx.cell(0, 0), &[]);
    assert_eq!(outcome.signal, DropSignal::Void);
    assert_eq!(fx.id_at(0, 0), None);
    assert!(matches!(
        fx.set.drain_events().as_slice(),
        [(_, ContainerEvent::ItemRemoved { .. })]
    ));
}

#[test]
fn test_rotated_drop() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    fx.place(0, 0, Item::new(1, Footprint::new(1, 3)));

    fx.begin(fx.cell(0, 0), PointerInput::default());
    fx.drag.rotate().unwrap();
    fx.drag.drop(&[fx.cell(1, 3)]).unwrap();
    let outcome = fx.drag.end_drag(&mut fx.set).unwrap();

    assert!(outcome.is_valid());
    let placed = fx.set.item_at(fx.cell(3, 3)).unwrap();
    assert_eq!(placed.footprint, Footprint::new(3, 1));
}

#[test]
fn test_partial_drag_to_empty_and_back() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    fx.set
        .require_mut(fx.backpack)
        .unwrap()
        .set_all_capabilities(SlotCapabilities::none().with_stack_display(StackDisplayPolicy::new()));
    fx.place(0, 0, potion(5));
    fx.place(3, 0, Item::new(2, Footprint::ONE));
    let split = PointerInput::default().with_split_modifier();

    fx.begin(fx.cell(0, 0), split);
    fx.drag.drop(&[fx.cell(3, 3)]).unwrap();
    assert!(fx.drag.end_drag(&mut fx.set).unwrap().is_valid());
    assert_eq!(fx.set.item_at(fx.cell(0, 0)).unwrap().stack, 2);
    assert_eq!(fx.set.item_at(fx.cell(3, 3)).unwrap().stack, 3);

    // half a stack never swaps
    fx.begin(fx.cell(3, 3), split);
    fx.drag.drop(&[fx.cell(3, 0)]).unwrap();
    let outcome = fx.drag.end_drag(&mut fx.set).unwrap();
    assert_eq!(outcome.signal, DropSignal::Failed);
    assert_eq!(fx.set.item_at(fx.cell(3, 3)).unwrap().stack, 3);
    assert_eq!(fx.id_at(3, 0), Some(2));
}

#[test]
fn test_standalone_slot_filter() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    let ring_slot = SlotRef::Standalone(fx.set.add_standalone(
        Slot::standalone().with_capabilities(
            SlotCapabilities::none().with_filter(FilterPolicy::new().with_tags(["ring"])),
        ),
    ));
    fx.place(0, 0, Item::new(1, Footprint::ONE));
    fx.place(1, 0, Item::new(2, Footprint::ONE).with_tag("ring"));

    let outcome = fx.gesture(fx.cell(0, 0), &[ring_slot]);
    assert_eq!(outcome.signal, DropSignal::Failed);
    assert!(matches!(outcome.error, Some(InventoryError::FilterRejected { .. })));
    assert_eq!(fx.id_at(0, 0), Some(1));

    let outcome = fx.gesture(fx.cell(1, 0), &[ring_slot]);
    assert!(outcome.is_valid());
    assert_eq!(fx.set.item_at(ring_slot).map(|i| i.id), Some(2));

    // and back into the grid
    let outcome = fx.gesture(ring_slot, &[fx.cell(2, 2)]);
    assert!(outcome.is_valid());
    assert!(fx.set.item_at(ring_slot).is_none());
    assert_eq!(fx.id_at(2, 2), Some(2));
}

#[test]
fn test_move_between_containers() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrop);
    let chest = fx.set.create_container(2, 2);
    fx.place(0, 0, Item::new(1, Footprint::new(2, 2)));

    let outcome = fx.gesture(fx.cell(0, 0), &[SlotRef::grid(chest, (0, 0))]);
    assert!(outcome.is_valid());
    assert_eq!(fx.id_at(0, 0), None);
    assert_eq!(
        fx.set.item_at(SlotRef::grid(chest, (1, 1))).map(|i| i.id),
        Some(1)
    );

    // too large for the remaining room
    fx.place(0, 0, Item::new(2, Footprint::new(1, 3)));
    let outcome = fx.gesture(fx.cell(0, 0), &[SlotRef::grid(chest, (1, 0))]);
    assert_eq!(outcome.signal, DropSignal::Failed);
    assert_eq!(fx.id_at(0, 2), Some(2));
}

#[test]
fn test_drop_listeners() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    let any = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(Mutex::new(Vec::new()));

    let counter = any.clone();
    fx.drag.listeners_mut().on_any_drop(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let sink = failed.clone();
    let id = fx
        .drag
        .listeners_mut()
        .subscribe(DropFilter::Only(DropSignal::Failed), move |event| {
            sink.lock().unwrap().push(event.slot);
        });

    fx.place(0, 0, Item::new(1, Footprint::new(2, 2)));
    fx.place(3, 3, Item::new(2, Footprint::ONE));

    fx.gesture(fx.cell(0, 0), &[fx.cell(2, 0)]);
    fx.gesture(fx.cell(2, 0), &[fx.cell(3, 2)]);
    assert_eq!(any.load(Ordering::SeqCst), 2);
    assert_eq!(*failed.lock().unwrap(), vec![fx.cell(3, 2)]);

    fx.drag.listeners_mut().unsubscribe(id);
    fx.gesture(fx.cell(2, 0), &[fx.cell(3, 2)]);
    assert_eq!(any.load(Ordering::SeqCst), 3);
    assert_eq!(failed.lock().unwrap().len(), 1);

    let signals: Vec<DropSignal> = fx.drag.drain_events().iter().map(|e| e.signal).collect();
    assert_eq!(
        signals,
        vec![DropSignal::Valid, DropSignal::Failed, DropSignal::Failed]
    );
}

#[test]
fn test_drag_mode_from_json_config() {
    init_logging();
    let config = InventoryConfig::from_json(r#"{ "drag_mode": "remove_on_drop" }"#).unwrap();
    let mut fx = Fixture::new(config.drag_mode);
    fx.place(1, 1, Item::new(1, Footprint::ONE));

    let session = fx.begin(fx.cell(1, 1), PointerInput::default());
    assert_eq!(session.source_state(), SourceState::Intact);
    assert_eq!(fx.id_at(1, 1), Some(1));
}

#[test]
fn test_merge_that_would_overflow_fails() {
    for mode in [DragMode::RemoveOnDrag, DragMode::RemoveOnDrop] {
        let mut fx = Fixture::new(mode);
        fx.place(3, 3, potion(u32::MAX - 1));
        fx.place(0, 0, potion(10));

        let outcome = fx.gesture(fx.cell(0, 0), &[fx.cell(3, 3)]);
        assert_eq!(outcome.signal, DropSignal::Failed);
        assert!(matches!(outcome.error, Some(InventoryError::StackOverflow { .. })));
        assert_eq!(fx.set.item_at(fx.cell(3, 3)).map(|i| i.stack), Some(u32::MAX - 1));
        assert_eq!(fx.set.item_at(fx.cell(0, 0)).map(|i| i.stack), Some(10));
    }
}

#[test]
fn test_failed_drop_replaces_item_when_source_is_taken() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    fx.place(0, 0, Item::new(1, Footprint::new(2, 1)));

    let from = fx.cell(0, 0);
    fx.begin(from, PointerInput::default());
    // the vacated source fills up while the item is held
    fx.place(0, 0, Item::new(2, Footprint::ONE));

    // a 2x1 item cannot sit on the last column
    let target = fx.cell(3, 3);
    fx.drag.drop(&[target]).unwrap();
    let outcome = fx.drag.end_drag(&mut fx.set).unwrap();

    assert_eq!(outcome.signal, DropSignal::Failed);
    assert!(matches!(
        outcome.error,
        Some(InventoryError::RollbackConflict { item: 1, .. })
    ));
    assert!(outcome.orphan.is_none());
    assert_eq!(fx.id_at(0, 0), Some(2));
    assert_eq!(fx.id_at(0, 1), Some(1));
    assert_eq!(fx.id_at(1, 1), Some(1));
}

#[test]
fn test_rollback_into_full_container_orphans_item() {
    let mut fx = Fixture::new(DragMode::RemoveOnDrag);
    fx.place(0, 0, potion(3));

    let from = fx.cell(0, 0);
    fx.begin(from, PointerInput::default());
    fx.place(0, 0, Item::new(2, Footprint::new(4, 4)));

    fx.drag.drop(&[]).unwrap();
    let outcome = fx.drag.end_drag(&mut fx.set).unwrap();

    assert_eq!(outcome.signal, DropSignal::SelfDrop);
    assert!(matches!(outcome.error, Some(InventoryError::RollbackConflict { .. })));
    let orphan = outcome.orphan.expect("item should be handed back");
    assert!(orphan.same_kind(&potion(3)));
    assert_eq!(orphan.stack, 3);
    assert_eq!(fx.id_at(0, 0), Some(2));
}
