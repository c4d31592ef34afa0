//! Persistence data contract
//!
//! Items are stored as
//!
//! ```json
//! { "Id": 7, "Size": [1, 2], "IconName": "potion", "Stack": 3, "Tags": ["consumable"] }
//! ```
//!
//! and container snapshots as `{ "Size": [w, h], "Items": [{ "Position": [x, y], "Item": ... }] }`.
//! Icon names are resolved through an `IconLookup` when loading; an empty name
//! means "no icon". Snapshots can be encoded as JSON or with bincode.

use crate::container::{Container, ContainerId};
use crate::error::{CodecError, MAX_SNAPSHOT_CELLS};
use crate::grid::{Footprint, GridPos};
use crate::item::{IconRef, Item, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolves icon names to icon handles
pub trait IconLookup {
    /// Handle for a name, `None` if unknown
    fn lookup(&self, name: &str) -> Option<IconRef>;
}

/// Name-indexed icon registry
#[derive(Debug, Clone, Default)]
pub struct IconCatalog {
    icons: BTreeMap<String, IconRef>,
}

impl IconCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an icon
    pub fn with_icon(mut self, name: impl Into<String>) -> Self {
        self.register(name);
        self
    }

    /// Register an icon, returning its handle
    pub fn register(&mut self, name: impl Into<String>) -> IconRef {
        let name = name.into();
        self.icons
            .entry(name.clone())
            .or_insert_with(|| IconRef::named(&name))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl IconLookup for IconCatalog {
    fn lookup(&self, name: &str) -> Option<IconRef> {
        self.icons.get(name).cloned()
    }
}

/// Serialized item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    #[serde(rename = "Id")]
    pub id: ItemId,
    #[serde(rename = "Size")]
    pub size: [i32; 2],
    #[serde(rename = "IconName")]
    pub icon_name: String,
    #[serde(rename = "Stack")]
    pub stack: u32,
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
}

impl ItemData {
    /// Capture an item. The passthrough payload is not persisted.
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id,
            size: [
                item.footprint.width() as i32,
                item.footprint.height() as i32,
            ],
            icon_name: item.icon.name().unwrap_or_default().to_string(),
            stack: item.stack,
            tags: item.tags.iter().cloned().collect(),
        }
    }

    /// Rebuild the item, resolving its icon
    pub fn to_item(&self, icons: &impl IconLookup) -> Result<Item, CodecError> {
        let [w, h] = self.size;
        if w < 1 || h < 1 {
            return Err(CodecError::InvalidSize(self.size));
        }
        let icon = if self.icon_name.is_empty() {
            IconRef::none()
        } else {
            icons
                .lookup(&self.icon_name)
                .ok_or_else(|| CodecError::UnknownIcon(self.icon_name.clone()))?
        };
        Ok(Item::new(self.id, Footprint::new(w as u32, h as u32))
            .with_icon(icon)
            .with_stack(self.stack)
            .with_tags(self.tags.iter().cloned()))
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Serialized item and its anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedItemData {
    #[serde(rename = "Position")]
    pub position: [i32; 2],
    #[serde(rename = "Item")]
    pub item: ItemData,
}

/// Serialized container contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerData {
    #[serde(rename = "Size")]
    pub size: [u32; 2],
    #[serde(rename = "Items")]
    pub items: Vec<PlacedItemData>,
}

impl ContainerData {
    /// Encode as JSON
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode with bincode
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl Container {
    /// Capture every item and its anchor
    pub fn snapshot(&self) -> ContainerData {
        ContainerData {
            size: [self.width(), self.height()],
            items: self
                .anchors()
                .map(|(pos, item)| PlacedItemData {
                    position: [pos.x, pos.y],
                    item: ItemData::from_item(item),
                })
                .collect(),
        }
    }

    /// Replace the contents with a snapshot.
    ///
    /// The snapshot must match this container's size. Nothing changes if an
    /// icon is unknown or an item cannot be placed.
    pub fn load(&mut self, data: &ContainerData, icons: &impl IconLookup) -> Result<(), CodecError> {
        let expected = [self.width(), self.height()];
        if data.size != expected {
            return Err(CodecError::SizeMismatch {
                expected,
                found: data.size,
            });
        }

        let items = data
            .items
            .iter()
            .map(|placed| {
                let [x, y] = placed.position;
                Ok((GridPos::new(x, y), placed.item.to_item(icons)?))
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        let mut staged = self.clone();
        staged.remove_all();
        for (pos, item) in items {
            staged.try_add_item_at(item, pos)?;
        }
        *self = staged;
        log::debug!("{}: loaded {} item(s)", self.id(), data.items.len());
        Ok(())
    }

    /// Build a container from a snapshot
    pub fn from_snapshot(
        id: ContainerId,
        data: &ContainerData,
        icons: &impl IconLookup,
    ) -> Result<Self, CodecError> {
        let [width, height] = data.size;
        let oversized = width.max(height) > Footprint::MAX_SIDE;
        if oversized || u64::from(width) * u64::from(height) > MAX_SNAPSHOT_CELLS {
            return Err(CodecError::GridTooLarge(data.size));
        }
        let mut container = Container::new(id, width, height);
        container.load(data, icons)?;
        container.drain_events();
        Ok(container)
    }
}
