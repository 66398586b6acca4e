//! In-memory element clipboard.
//!
//! Holds a typed copy of one element. Consecutive pastes cascade: each is
//! offset from where the previous one landed, stepping `(n + 1) × 16` px
//! and cycling back after six pastes.

use wf_core::geometry::PASTE_OFFSET_STEP;
use wf_core::id::ScreenId;
use wf_core::model::Element;

const PASTE_CYCLE: u32 = 6;

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    item: Option<Element>,
    paste_iteration: u32,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    pub fn item(&self) -> Option<&Element> {
        self.item.as_ref()
    }

    /// Replace the clipboard contents and restart the paste cascade.
    pub fn copy(&mut self, element: &Element) {
        let mut item = element.clone();
        item.hotspot_id = None;
        self.item = Some(item);
        self.paste_iteration = 0;
    }

    /// A fresh element to paste, shifted by the current cascade offset.
    /// The caller still has to fit it onto the target canvas.
    pub fn next_paste(&self) -> Option<Element> {
        let item = self.item.as_ref()?;
        let shift = (self.paste_iteration + 1) as f32 * PASTE_OFFSET_STEP;
        let mut copy = item.duplicate();
        copy.geometry.x += shift;
        copy.geometry.y += shift;
        Some(copy)
    }

    /// Record where a paste actually landed so the next one cascades from it.
    pub fn commit_paste(&mut self, placed: &Element) {
        if let Some(item) = self.item.as_mut() {
            item.geometry = placed.geometry;
            item.target_screen = placed.target_screen;
        }
        self.paste_iteration = (self.paste_iteration + 1) % PASTE_CYCLE;
    }

    /// Drop a link to a screen that no longer exists.
    pub fn forget_target(&mut self, screen: ScreenId) {
        if let Some(item) = self.item.as_mut()
            && item.target_screen == Some(screen)
        {
            item.target_screen = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_core::geometry::Rect;
    use wf_core::model::ComponentKind;

    #[test]
    fn cascade_offsets_grow_then_cycle() {
        let mut cb = Clipboard::new();
        let el = Element::new(ComponentKind::Button, Rect::new(0.0, 0.0, 144.0, 48.0));
        cb.copy(&el);

        let mut shifts = Vec::new();
        for _ in 0..7 {
            let next = cb.next_paste().unwrap();
            shifts.push(next.geometry.x - cb.item().unwrap().geometry.x);
            // Pretend it landed back on the original spot.
            let mut placed = next.clone();
            placed.geometry = el.geometry;
            cb.commit_paste(&placed);
        }
        assert_eq!(shifts, vec![16.0, 32.0, 48.0, 64.0, 80.0, 96.0, 16.0]);
    }

    #[test]
    fn paste_gets_new_id_and_no_hotspot() {
        let mut cb = Clipboard::new();
        let mut el = Element::new(ComponentKind::Button, Rect::new(0.0, 0.0, 144.0, 48.0));
        el.hotspot_id = Some(wf_core::id::HotspotId::intern("hotspot-9"));
        cb.copy(&el);
        let pasted = cb.next_paste().unwrap();
        assert_ne!(pasted.id, el.id);
        assert_eq!(pasted.hotspot_id, None);
    }

    #[test]
    fn forget_target_strips_link() {
        let mut cb = Clipboard::new();
        let mut el = Element::new(ComponentKind::Card, Rect::new(0.0, 0.0, 288.0, 208.0));
        let gone = ScreenId::intern("screen-gone");
        el.target_screen = Some(gone);
        cb.copy(&el);
        cb.forget_target(gone);
        assert_eq!(cb.item().unwrap().target_screen, None);
    }
}
