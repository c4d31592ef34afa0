//! Container sorting: coalesce equal kinds, then repack largest first

use crate::container::Container;
use crate::grid::GridPos;
use crate::item::Item;
use std::cmp::Ordering;

/// Merge items of the same kind in one pass, keeping first-appearance order.
/// A stack that would overflow every existing group starts a new one.
pub fn coalesce(items: Vec<Item>) -> Vec<Item> {
    let mut groups: Vec<Item> = Vec::with_capacity(items.len());
    for item in items {
        let merged = groups.iter_mut().any(|group| match group.merge(&item) {
            Some(merged) => {
                *group = merged;
                true
            }
            None => false,
        });
        if !merged {
            groups.push(item);
        }
    }
    groups
}

/// Order items largest diagonal first. Ties keep their order.
pub fn order_by_size(items: &mut [Item]) {
    items.sort_by(|a, b| {
        b.diagonal()
            .partial_cmp(&a.diagonal())
            .unwrap_or(Ordering::Equal)
    });
}

impl Container {
    /// Coalesce and repack every item.
    ///
    /// Cells are scanned row by row (y outer, x inner); each enabled empty
    /// cell receives the first remaining item that fits there. If some item
    /// cannot be placed the previous layout is kept and `false` is returned.
    pub fn sort(&mut self) -> bool {
        let saved_slots = self.slots.clone();
        let saved_events = self.events.len();

        let mut remaining = coalesce(self.remove_all());
        order_by_size(&mut remaining);

        'rows: for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                if remaining.is_empty() {
                    break 'rows;
                }
                let pos = GridPos::new(x, y);
                let free = self
                    .slot(pos)
                    .map_or(false, |slot| slot.is_enabled() && slot.is_empty());
                if !free {
                    continue;
                }
                if let Some(index) = remaining
                    .iter()
                    .position(|item| self.is_valid(pos, item.footprint))
                {
                    let item = remaining.remove(index);
                    self.add_item_at(item, pos);
                }
            }
        }

        if !remaining.is_empty() {
            log::warn!(
                "{}: sort could not repack {} item(s), keeping previous layout",
                self.id(),
                remaining.len()
            );
            self.slots = saved_slots;
            self.events.truncate(saved_events);
            return false;
        }

        log::debug!("{}: sorted {} item(s)", self.id(), self.items().len());
        true
    }
}
