//! Item values and stacks

use crate::grid::Footprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Kind identifier of an item
pub type ItemId = i32;

/// Opaque handle to an icon resource owned by the rendering layer.
///
/// The engine only needs the icon's name: it takes part in kind equality and
/// is what gets persisted. `IconRef::none()` is an item without icon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IconRef(Option<Arc<str>>);

impl IconRef {
    /// Create an icon handle for a named resource
    pub fn named(name: impl AsRef<str>) -> Self {
        Self(Some(Arc::from(name.as_ref())))
    }

    /// Handle for "no icon"
    pub const fn none() -> Self {
        Self(None)
    }

    /// Resource name, if any
    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Check if this handle points to nothing
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

/// A stack of one kind of thing with a rectangular footprint
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Kind identifier
    pub id: ItemId,
    /// Cells occupied in a container
    pub footprint: Footprint,
    /// Icon resource
    pub icon: IconRef,
    /// How many copies are held in this stack
    pub stack: u32,
    /// Informational tags, used by slot filters
    pub tags: BTreeSet<String>,
    /// Opaque passthrough payload, never interpreted by the engine
    pub extra: Option<serde_json::Value>,
}

impl Item {
    /// Id reserved for the empty sentinel
    pub const EMPTY_ID: ItemId = ItemId::MIN;

    /// Create a new item with a stack of one
    pub fn new(id: ItemId, footprint: Footprint) -> Self {
        Self {
            id,
            footprint,
            icon: IconRef::none(),
            stack: 1,
            tags: BTreeSet::new(),
            extra: None,
        }
    }

    /// The empty sentinel: minimum id, 1x1, no stack
    pub fn empty() -> Self {
        Self {
            id: Self::EMPTY_ID,
            footprint: Footprint::ONE,
            icon: IconRef::none(),
            stack: 0,
            tags: BTreeSet::new(),
            extra: None,
        }
    }

    /// Whether this is the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.id == Self::EMPTY_ID
    }

    /// Set icon
    pub fn with_icon(mut self, icon: IconRef) -> Self {
        self.icon = icon;
        self
    }

    /// Set stack count
    pub fn with_stack(mut self, stack: u32) -> Self {
        self.stack = stack;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add multiple tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Attach a passthrough payload
    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Check if item has a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Kind equality: id, icon and footprint match. Stack, tags and extra
    /// are not part of an item's kind.
    pub fn same_kind(&self, other: &Item) -> bool {
        self.id == other.id && self.icon == other.icon && self.footprint == other.footprint
    }

    /// Combine two stacks of the same kind.
    ///
    /// The result keeps `self`'s payload and carries the union of both tag
    /// sets. Returns `None` for different kinds or when the summed stack
    /// does not fit a `u32`.
    pub fn merge(&self, other: &Item) -> Option<Item> {
        if !self.same_kind(other) {
            return None;
        }
        let mut merged = self.clone();
        merged.stack = self.stack.checked_add(other.stack)?;
        merged.tags.extend(other.tags.iter().cloned());
        Some(merged)
    }

    /// Split off `amount` copies.
    ///
    /// Returns `(taken, rest)` with stacks `amount` and `stack - amount`, or
    /// `None` unless `0 < amount < stack`.
    pub fn split(&self, amount: u32) -> Option<(Item, Item)> {
        if amount == 0 || amount >= self.stack {
            return None;
        }
        let taken = self.clone().with_stack(amount);
        let rest = self.clone().with_stack(self.stack - amount);
        Some((taken, rest))
    }

    /// The same item turned by 90 degrees
    pub fn rotated(&self) -> Item {
        let mut item = self.clone();
        item.footprint = self.footprint.rotated();
        item
    }

    /// Footprint diagonal, the sort key used by container repacking
    pub fn diagonal(&self) -> f32 {
        self.footprint.diagonal()
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Item {} [{}] icon={} stack={}",
            self.id,
            self.footprint,
            self.icon.name().unwrap_or("<none>"),
            self.stack
        )
    }
}

/// Stack size split used when dragging half a stack: `ceil(stack / 2)`
pub fn half_stack_ceil(stack: u32) -> u32 {
    stack / 2 + stack % 2
}

/// Item kind summary used when comparing container contents
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KindKey {
    pub id: ItemId,
    pub icon: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl From<&Item> for KindKey {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            icon: item.icon.name().map(str::to_owned),
            width: item.footprint.width(),
            height: item.footprint.height(),
        }
    }
}
