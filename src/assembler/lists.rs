//! List arena.
//!
//! Lists are plain values stored in an arena and addressed by [`ListId`].
//! Everything that changes while the document is assembled (next element
//! value per depth, which level definitions the sink has already seen,
//! continuation value) lives in a cursor table keyed by the same id.

use std::collections::HashMap;

use crate::model::{List, ListId, ListLevel, ListLevelProperties};

#[derive(Debug, Clone, Default)]
struct ListCursor {
    /// Bumped each time a level definition changes
    generation: u32,
    /// Generation last announced to the sink, per depth index
    announced: Vec<Option<u32>>,
    /// Value of the next element, per depth index
    next_values: Vec<u32>,
    /// Next value recorded when level 1 last closed
    continuation: Option<u32>,
}

impl ListCursor {
    fn slot<T: Clone + Default>(values: &mut Vec<T>, depth: u8) -> &mut T {
        let index = depth as usize - 1;
        if values.len() <= index {
            values.resize(index + 1, T::default());
        }
        &mut values[index]
    }
}

/// Session-wide store of lists and their numbering cursors.
#[derive(Debug, Clone, Default)]
pub struct ListArena {
    lists: Vec<List>,
    cursors: HashMap<ListId, ListCursor>,
}

impl ListArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new list and return its id. Ids start at 1.
    pub fn create(&mut self, levels: Vec<ListLevel>) -> ListId {
        self.insert(None, levels)
    }

    /// Register a list whose level 1 continues the numbering of `previous`.
    pub fn create_continuing(&mut self, previous: ListId, levels: Vec<ListLevel>) -> ListId {
        let previous = self.contains(previous).then_some(previous);
        self.insert(previous, levels)
    }

    fn insert(&mut self, previous: Option<ListId>, levels: Vec<ListLevel>) -> ListId {
        let id = ListId(self.lists.len() as u32 + 1);
        self.lists.push(List {
            id,
            previous,
            levels,
        });
        self.cursors.insert(id, ListCursor::default());
        id
    }

    /// Look up a list.
    pub fn get(&self, id: ListId) -> Option<&List> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.lists.get(index)
    }

    /// Check if the id was issued by this arena.
    pub fn contains(&self, id: ListId) -> bool {
        self.get(id).is_some()
    }

    /// Number of lists.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Check if no list was created.
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Replace (or add) the definition of a depth.
    ///
    /// Later openings of that depth announce the new definition again.
    /// Returns `false` for unknown ids or depth 0.
    pub fn set_level(&mut self, id: ListId, depth: u8, level: ListLevel) -> bool {
        if depth == 0 {
            return false;
        }
        let Some(index) = (id.0 as usize).checked_sub(1) else {
            return false;
        };
        let Some(list) = self.lists.get_mut(index) else {
            return false;
        };
        let slot = depth as usize - 1;
        if list.levels.len() <= slot {
            list.levels.resize(slot + 1, ListLevel::default());
        }
        if list.levels[slot] == level {
            return true;
        }
        list.levels[slot] = level;
        if let Some(cursor) = self.cursors.get_mut(&id) {
            cursor.generation = cursor.generation.wrapping_add(1);
        }
        true
    }

    /// Find or create a list that matches `base` above `depth` and uses
    /// `level` at `depth`.
    ///
    /// Decoders that only know per-paragraph level definitions use this to
    /// obtain a stable list identity per nesting signature.
    pub fn derive(&mut self, base: Option<ListId>, depth: u8, level: ListLevel) -> ListId {
        let depth = depth.max(1);
        let mut levels: Vec<ListLevel> = base
            .and_then(|id| self.get(id))
            .map(|list| list.levels.iter().take(depth as usize - 1).cloned().collect())
            .unwrap_or_default();
        levels.resize(depth as usize - 1, ListLevel::default());

        if let Some(id) = base {
            if let Some(list) = self.get(id) {
                if list.level(depth) == Some(&level) {
                    return id;
                }
            }
        }

        let existing = self.lists.iter().find(|list| {
            list.level(depth) == Some(&level)
                && list.levels.iter().take(depth as usize - 1).eq(levels.iter())
        });
        if let Some(list) = existing {
            return list.id;
        }

        levels.push(level);
        log::debug!("deriving new list at depth {} from {:?}", depth, base);
        self.create(levels)
    }

    /// Check if the sink still has to see the definition of a depth.
    pub fn needs_definition(&self, id: ListId, depth: u8) -> bool {
        if depth == 0 {
            return false;
        }
        match self.cursors.get(&id) {
            Some(cursor) => {
                cursor.announced.get(depth as usize - 1).copied().flatten()
                    != Some(cursor.generation)
            }
            None => false,
        }
    }

    /// Remember that the current definition of a depth was announced.
    pub fn mark_announced(&mut self, id: ListId, depth: u8) {
        if depth == 0 {
            return;
        }
        if let Some(cursor) = self.cursors.get_mut(&id) {
            let generation = cursor.generation;
            *ListCursor::slot(&mut cursor.announced, depth) = Some(generation);
        }
    }

    /// Start a depth: reset its numbering and return the sink payload.
    ///
    /// Level 1 of a continuing list starts where its predecessor stopped.
    /// Undefined depths fall back to a plain bullet level.
    pub fn open_level(&mut self, id: ListId, depth: u8) -> Option<ListLevelProperties> {
        if depth == 0 {
            return None;
        }
        let list = self.get(id)?;
        let level = list
            .level(depth)
            .cloned()
            .unwrap_or_else(|| ListLevel::bullet("\u{2022}"));

        let continued = if depth == 1 {
            list.previous
                .and_then(|prev| self.cursors.get(&prev))
                .and_then(|c| c.continuation)
        } else {
            None
        };
        let start_value = continued.unwrap_or(level.start_value);

        let cursor = self.cursors.entry(id).or_default();
        *ListCursor::slot(&mut cursor.next_values, depth) = start_value;

        Some(ListLevelProperties {
            list_id: id,
            depth,
            level,
            start_value,
        })
    }

    /// Close a depth. Closing level 1 records the continuation value.
    pub fn close_level(&mut self, id: ListId, depth: u8) {
        if depth != 1 {
            return;
        }
        if let Some(cursor) = self.cursors.get_mut(&id) {
            cursor.continuation = cursor.next_values.first().copied();
        }
    }

    /// Consume one element value at a depth and return it.
    pub fn next_value(&mut self, id: ListId, depth: u8) -> Option<u32> {
        if depth == 0 || !self.contains(id) {
            return None;
        }
        let cursor = self.cursors.entry(id).or_default();
        let slot = ListCursor::slot(&mut cursor.next_values, depth);
        let value = *slot;
        *slot = slot.saturating_add(1);
        Some(value)
    }

    /// Check if the given depth of a list is numbered.
    pub fn is_numeric(&self, id: ListId, depth: u8) -> bool {
        self.get(id).map(|l| l.is_numeric(depth)).unwrap_or(false)
    }
}
