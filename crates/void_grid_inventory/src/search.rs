//! Progressive container search
//!
//! `refresh` collapses every item of a container, then items are revealed one
//! at a time, either per tick through `update` or manually with `step`.

use crate::config::{InventoryConfig, SearchConfig};
use crate::container::Container;
use crate::grid::GridPos;

/// Reveals a container's items one by one
#[derive(Debug, Clone)]
pub struct SearchReveal {
    config: SearchConfig,
    pending: Vec<GridPos>,
    index: usize,
    elapsed: f32,
    next_reveal: f32,
    searched: bool,
}

impl SearchReveal {
    /// Create a search with the given timing
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            index: 0,
            elapsed: 0.0,
            next_reveal: config.delay,
            searched: false,
        }
    }

    /// Create a search with the timing of an inventory configuration
    pub fn from_config(config: &InventoryConfig) -> Self {
        Self::new(config.search)
    }

    /// Hide every item of the container and restart the search.
    ///
    /// Returns false when there is nothing to search.
    pub fn refresh(&mut self, container: &mut Container) -> bool {
        self.pending = container.anchors().map(|(pos, _)| pos).collect();
        for pos in &self.pending {
            // every pending position is an anchor, so this cannot fail
            let _ = container.set_visibility(*pos, false);
        }
        self.index = 0;
        self.elapsed = 0.0;
        self.next_reveal = self.config.delay;
        self.searched = self.pending.is_empty();
        log::debug!(
            "{}: search started over {} item(s)",
            container.id(),
            self.pending.len()
        );
        !self.pending.is_empty()
    }

    /// Reveal the next item. Items removed since `refresh` are skipped.
    pub fn step(&mut self, container: &mut Container) -> Option<GridPos> {
        while self.index < self.pending.len() {
            let pos = self.pending[self.index];
            self.index += 1;
            if container.set_visibility(pos, true).is_ok() {
                if self.index == self.pending.len() {
                    self.finish();
                }
                return Some(pos);
            }
        }
        self.finish();
        None
    }

    /// Advance the search clock, returning the items revealed during `dt`
    pub fn update(&mut self, container: &mut Container, dt: f32) -> Vec<GridPos> {
        let mut revealed = Vec::new();
        if self.searched {
            return revealed;
        }
        self.elapsed += dt.max(0.0);
        while !self.searched && self.elapsed >= self.next_reveal {
            match self.step(container) {
                Some(pos) => revealed.push(pos),
                None => break,
            }
            self.next_reveal += self.config.rate();
        }
        revealed
    }

    /// Whether every item has been revealed
    pub fn is_searched(&self) -> bool {
        self.searched
    }

    /// Items still hidden
    pub fn remaining(&self) -> usize {
        self.pending.len().saturating_sub(self.index)
    }

    fn finish(&mut self) {
        if !self.searched {
            log::debug!("Search finished after {} item(s)", self.pending.len());
        }
        self.searched = true;
        self.pending.clear();
        self.index = 0;
    }
}

impl Default for SearchReveal {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerId;
    use crate::grid::Footprint;
    use crate::item::Item;

    fn filled() -> Container {
        let mut c = Container::new(ContainerId(1), 3, 3);
        c.add_item_at(Item::new(1, Footprint::new(2, 1)), GridPos::new(0, 0));
        c.add_item_at(Item::new(2, Footprint::ONE), GridPos::new(2, 2));
        c
    }

    #[test]
    fn test_refresh_hides_everything() {
        let mut c = filled();
        let mut search = SearchReveal::default();
        assert!(search.refresh(&mut c));
        assert!(!c.get_visibility(GridPos::new(0, 0)));
        assert!(!c.get_visibility(GridPos::new(2, 2)));
        assert_eq!(search.remaining(), 2);

        let mut empty = Container::new(ContainerId(2), 2, 2);
        assert!(!search.refresh(&mut empty));
        assert!(search.is_searched());
    }

    #[test]
    fn test_manual_steps() {
        let mut c = filled();
        let mut search = SearchReveal::default();
        search.refresh(&mut c);

        assert_eq!(search.step(&mut c), Some(GridPos::new(0, 0)));
        assert!(c.get_visibility(GridPos::new(0, 0)));
        assert!(!search.is_searched());
        assert_eq!(search.step(&mut c), Some(GridPos::new(2, 2)));
        assert!(search.is_searched());
        assert_eq!(search.step(&mut c), None);
    }

    #[test]
    fn test_timed_reveal() {
        let mut c = filled();
        let mut search = SearchReveal::new(SearchConfig {
            interval: 0.5,
            multiplier: 1.0,
            delay: 1.0,
        });
        search.refresh(&mut c);

        assert!(search.update(&mut c, 0.9).is_empty());
        assert_eq!(search.update(&mut c, 0.2), vec![GridPos::new(0, 0)]);
        assert!(search.update(&mut c, 0.2).is_empty());
        assert_eq!(search.update(&mut c, 0.4), vec![GridPos::new(2, 2)]);
        assert!(search.is_searched());
    }

    #[test]
    fn test_removed_items_are_skipped() {
        let mut c = filled();
        let mut search = SearchReveal::default();
        search.refresh(&mut c);
        c.remove_item_at(GridPos::new(0, 0));

        assert_eq!(search.step(&mut c), Some(GridPos::new(2, 2)));
        assert!(search.is_searched());
    }

    #[test]
    fn test_from_config_uses_search_timing() {
        let config = InventoryConfig::new().with_search(SearchConfig {
            interval: 0.25,
            multiplier: 1.0,
            delay: 0.0,
        });
        let mut c = filled();
        let mut search = SearchReveal::from_config(&config);
        search.refresh(&mut c);

        assert_eq!(search.update(&mut c, 0.1), vec![GridPos::new(0, 0)]);
        assert!(search.update(&mut c, 0.1).is_empty());
        assert_eq!(search.update(&mut c, 0.2), vec![GridPos::new(2, 2)]);
    }
}
