//! Slot capabilities
//!
//! Filtering and stack display are optional behaviours attached to a slot.
//! Both drag protocol paths consult them, so a slot gains tag gating or a
//! visible stack count without a separate slot type.

use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Why a filter refused an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterRejection {
    /// The item holds nothing
    EmptyStack,
    /// Stack is below the slot's minimum
    StackBelowMinimum { stack: u32, min: u32 },
    /// Too few of the required tags are present
    MissingTags { matched: usize, required: usize },
}

impl fmt::Display for FilterRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStack => write!(f, "empty stack"),
            Self::StackBelowMinimum { stack, min } => {
                write!(f, "stack {} below minimum {}", stack, min)
            }
            Self::MissingTags { matched, required } => {
                write!(f, "{} of {} required tags matched", matched, required)
            }
        }
    }
}

/// Tag and minimum-stack gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPolicy {
    /// Whether tag matching is applied
    pub enabled: bool,
    /// Accepted tags
    pub tags: BTreeSet<String>,
    /// How many of `tags` the item must carry
    pub min_matches: usize,
    /// Minimum stack accepted
    pub min_stack: u32,
}

impl FilterPolicy {
    /// Create a filter accepting any non-empty stack
    pub fn new() -> Self {
        Self {
            enabled: false,
            tags: BTreeSet::new(),
            min_matches: 1,
            min_stack: 0,
        }
    }

    /// Require tags, enabling the filter
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self.enabled = true;
        self
    }

    /// Set how many tags must match
    pub fn with_min_matches(mut self, min_matches: usize) -> Self {
        self.min_matches = min_matches;
        self
    }

    /// Set minimum stack
    pub fn with_min_stack(mut self, min_stack: u32) -> Self {
        self.min_stack = min_stack;
        self
    }

    /// Check an item against this filter
    pub fn check(&self, item: &Item) -> Result<(), FilterRejection> {
        if item.stack == 0 {
            return Err(FilterRejection::EmptyStack);
        }
        if item.stack < self.min_stack {
            return Err(FilterRejection::StackBelowMinimum {
                stack: item.stack,
                min: self.min_stack,
            });
        }
        if self.enabled {
            let matched = item.tags.intersection(&self.tags).count();
            if matched < self.min_matches {
                return Err(FilterRejection::MissingTags {
                    matched,
                    required: self.min_matches,
                });
            }
        }
        Ok(())
    }

    /// Whether an item passes
    pub fn accepts(&self, item: &Item) -> bool {
        self.check(item).is_ok()
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Visible stack count and half-stack dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDisplayPolicy {
    /// Lower display clamp
    pub min: u32,
    /// Upper display clamp
    pub max: u32,
    /// Refresh the shown count whenever the stack changes
    pub live_update: bool,
    /// Holding the split modifier at drag start drags half the stack
    pub split_on_modifier: bool,
}

impl StackDisplayPolicy {
    /// Create a policy with the default `0..=9999` range
    pub fn new() -> Self {
        Self {
            min: 0,
            max: 9999,
            live_update: true,
            split_on_modifier: true,
        }
    }

    /// Set display range
    pub fn with_range(mut self, min: u32, max: u32) -> Self {
        self.min = min.min(max);
        self.max = max.max(min);
        self
    }

    /// Enable or disable live updates
    pub fn with_live_update(mut self, live_update: bool) -> Self {
        self.live_update = live_update;
        self
    }

    /// Enable or disable half-stack dragging
    pub fn with_split_on_modifier(mut self, enabled: bool) -> Self {
        self.split_on_modifier = enabled;
        self
    }

    /// The count to show for an item, `None` when nothing is shown
    pub fn display(&self, item: &Item) -> Option<u32> {
        if item.is_empty() || !self.live_update {
            return None;
        }
        Some(item.stack.clamp(self.min, self.max))
    }
}

impl Default for StackDisplayPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Optional behaviours of a slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCapabilities {
    pub filter: Option<FilterPolicy>,
    pub stack_display: Option<StackDisplayPolicy>,
}

impl SlotCapabilities {
    /// No capabilities
    pub fn none() -> Self {
        Self::default()
    }

    /// Attach a filter
    pub fn with_filter(mut self, filter: FilterPolicy) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Attach stack display
    pub fn with_stack_display(mut self, policy: StackDisplayPolicy) -> Self {
        self.stack_display = Some(policy);
        self
    }

    /// Run the filter, if any
    pub fn check(&self, item: &Item) -> Result<(), FilterRejection> {
        match &self.filter {
            Some(filter) => filter.check(item),
            None => Ok(()),
        }
    }

    /// Whether a drag from this slot may take half the stack
    pub fn splits_on_modifier(&self) -> bool {
        self.stack_display
            .map(|policy| policy.split_on_modifier)
            .unwrap_or(false)
    }
}
