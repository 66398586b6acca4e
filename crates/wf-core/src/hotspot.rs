//! Hotspot registry: stable analytics identity for linked elements.
//!
//! A hotspot is allocated the first time an element gains a link target and
//! lives until that link is cleared (or the element or either screen goes
//! away). Editing the element's content or geometry only refreshes the
//! hotspot's metadata; the id itself never changes.
//!
//! The registry is also the single `HotspotId → Element` map that preview
//! attribution resolves through.

use crate::id::{ElementId, HotspotId, ScreenId};
use crate::model::Element;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Metadata for one hotspot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hotspot {
    pub id: HotspotId,
    /// Screen the linked element sits on.
    pub screen_id: ScreenId,
    pub element_id: ElementId,
    pub target_screen_id: ScreenId,
    /// Derived from the element's label; recomputed on every refresh.
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct HotspotRegistry {
    entries: HashMap<HotspotId, Hotspot>,
    by_element: HashMap<ElementId, HotspotId>,
    /// Next numeric suffix to hand out. Never moves backwards.
    next_id: u64,
}

impl Default for HotspotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HotspotRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            by_element: HashMap::new(),
            next_id: 1,
        }
    }

    /// Return the element's hotspot id, allocating one if it has none.
    ///
    /// An id already present on the element (e.g. set out of band) is kept,
    /// and the allocation counter is advanced past its numeric suffix so
    /// later allocations cannot collide with it. An id that already belongs
    /// to a different element is replaced.
    pub fn ensure_hotspot_id(&mut self, element: &mut Element) -> HotspotId {
        if let Some(id) = element.hotspot_id {
            self.observe(id);
            let owned_elsewhere = self
                .entries
                .get(&id)
                .is_some_and(|h| h.element_id != element.id);
            if !owned_elsewhere {
                self.by_element.insert(element.id, id);
                return id;
            }
        }
        let id = self.allocate();
        log::debug!("hotspot {id} allocated for element {}", element.id);
        element.hotspot_id = Some(id);
        self.by_element.insert(element.id, id);
        id
    }

    /// Recompute `{screen, target, name}` for a linked element.
    ///
    /// If the element has no target, or the target screen no longer exists,
    /// the hotspot is released and the stale target is cleared. Returns
    /// `true` only when something observable changed.
    pub fn refresh_metadata(
        &mut self,
        screen_id: ScreenId,
        element: &mut Element,
        target_exists: bool,
    ) -> bool {
        let target = match element.target_screen {
            Some(target) if target_exists => target,
            _ => {
                let had_link = element.target_screen.take().is_some();
                let released = self.release(element).is_some();
                return had_link || released;
            }
        };

        let id = self.ensure_hotspot_id(element);
        let next = Hotspot {
            id,
            screen_id,
            element_id: element.id,
            target_screen_id: target,
            name: element.label(),
        };
        if self.entries.get(&id) == Some(&next) {
            return false;
        }
        log::trace!("hotspot {id} metadata -> {:?}", next.name);
        self.entries.insert(id, next);
        true
    }

    /// Drop the element's hotspot and clear its id.
    pub fn release(&mut self, element: &mut Element) -> Option<Hotspot> {
        let by_id = element.hotspot_id.take();
        let by_elem = self.by_element.remove(&element.id);
        let id = by_id.or(by_elem)?;
        let removed = self.entries.remove(&id);
        if removed.is_some() {
            log::debug!("hotspot {id} released (element {})", element.id);
        }
        removed
    }

    /// Drop whatever hotspot an element id holds, without the element at hand.
    pub fn release_element(&mut self, element_id: ElementId) -> Option<Hotspot> {
        let id = self.by_element.remove(&element_id)?;
        self.entries.remove(&id)
    }

    pub fn get(&self, id: HotspotId) -> Option<&Hotspot> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: HotspotId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn hotspot_for_element(&self, element_id: ElementId) -> Option<HotspotId> {
        self.by_element
            .get(&element_id)
            .copied()
            .filter(|id| self.entries.contains_key(id))
    }

    /// Hotspots on `screen_id` that link to `target`.
    pub fn linking(&self, screen_id: ScreenId, target: ScreenId) -> SmallVec<[&Hotspot; 2]> {
        let mut found: SmallVec<[&Hotspot; 2]> = self
            .entries
            .values()
            .filter(|h| h.screen_id == screen_id && h.target_screen_id == target)
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn observe(&mut self, id: HotspotId) {
        if let Some(n) = id.numeric_suffix() {
            self.next_id = self.next_id.max(n.saturating_add(1));
        }
    }

    fn allocate(&mut self) -> HotspotId {
        loop {
            let id = match self.next_id.checked_add(1) {
                Some(after) => {
                    let id = HotspotId::intern(&format!("hotspot-{}", self.next_id));
                    self.next_id = after;
                    id
                }
                // Counter pinned at u64::MAX by an out-of-band id.
                None => HotspotId::generate(),
            };
            if !self.entries.contains_key(&id) {
                return id;
            }
        }
    }
}
