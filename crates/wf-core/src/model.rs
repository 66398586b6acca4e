//! Core data model for wireframe projects.
//!
//! A project is a set of `Screen`s. Each screen owns an ordered list of
//! `Element`s (UI-component placeholders). An element may link to another
//! screen; the link is what turns the wireframe into a clickable prototype.
//! Geometry is always stored in screen-local logical coordinates.

use crate::error::{EditError, EditResult};
use crate::geometry::{CanvasSize, Rect};
use crate::id::{ElementId, HotspotId, ScreenId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let pair = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, 1.0)),
            8 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// Quantize to 8-bit channels.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Linear interpolation between two colors, `t` in [0, 1].
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

/// A gradient stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32, // 0.0 .. 1.0
    pub color: Color,
}

// ─── Components ──────────────────────────────────────────────────────────

/// The fixed set of component types the palette offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Button,
    Input,
    Dropdown,
    Card,
    Heading,
    Paragraph,
    Image,
    Text,
    RadioGroup,
    Slider,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 10] = [
        ComponentKind::Button,
        ComponentKind::Input,
        ComponentKind::Dropdown,
        ComponentKind::Card,
        ComponentKind::Heading,
        ComponentKind::Paragraph,
        ComponentKind::Image,
        ComponentKind::Text,
        ComponentKind::RadioGroup,
        ComponentKind::Slider,
    ];

    /// Palette token, e.g. `radio-group`.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Button => "button",
            ComponentKind::Input => "input",
            ComponentKind::Dropdown => "dropdown",
            ComponentKind::Card => "card",
            ComponentKind::Heading => "heading",
            ComponentKind::Paragraph => "paragraph",
            ComponentKind::Image => "image",
            ComponentKind::Text => "text",
            ComponentKind::RadioGroup => "radio-group",
            ComponentKind::Slider => "slider",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL.into_iter().find(|k| k.as_str() == token)
    }

    /// Human label used in the selection bar ("Radio group").
    pub fn display_name(self) -> &'static str {
        match self {
            ComponentKind::Button => "Button",
            ComponentKind::Input => "Input",
            ComponentKind::Dropdown => "Dropdown",
            ComponentKind::Card => "Card",
            ComponentKind::Heading => "Heading",
            ComponentKind::Paragraph => "Paragraph",
            ComponentKind::Image => "Image",
            ComponentKind::Text => "Text",
            ComponentKind::RadioGroup => "Radio group",
            ComponentKind::Slider => "Slider",
        }
    }

    /// Unsnapped size a freshly dropped component asks for.
    pub fn default_size(self) -> (f32, f32) {
        match self {
            ComponentKind::Button => (140.0, 48.0),
            ComponentKind::Input | ComponentKind::Dropdown => (260.0, 48.0),
            ComponentKind::Card => (280.0, 200.0),
            ComponentKind::Heading => (280.0, 60.0),
            ComponentKind::Paragraph => (320.0, 120.0),
            ComponentKind::Image => (200.0, 160.0),
            ComponentKind::Text => (200.0, 48.0),
            ComponentKind::RadioGroup => (220.0, 120.0),
            ComponentKind::Slider => (260.0, 48.0),
        }
    }

    /// Editable content fields and their placeholder values.
    pub fn default_fields(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ComponentKind::Button => &[("label", "Button")],
            ComponentKind::Input => &[("placeholder", "Input field")],
            ComponentKind::Dropdown => &[("label", "Dropdown")],
            ComponentKind::Card => &[
                ("title", "Card title"),
                ("body", "Supporting description text goes here."),
                ("action", "Action"),
            ],
            ComponentKind::Heading => &[("text", "Heading")],
            ComponentKind::Paragraph => {
                &[("text", "Lorem ipsum placeholder copy for quick wireframes.")]
            }
            ComponentKind::Image => &[("caption", "Image")],
            ComponentKind::Text => &[("text", "Text")],
            ComponentKind::RadioGroup => &[
                ("label", "Choose one"),
                ("options", "Option 1\nOption 2\nOption 3"),
            ],
            ComponentKind::Slider => &[
                ("label", "Slider"),
                ("min", "0"),
                ("max", "100"),
                ("value", "50"),
            ],
        }
    }

    /// The field whose text names the component (a button's label, a
    /// card's title).
    pub fn label_field(self) -> &'static str {
        match self {
            ComponentKind::Input => "placeholder",
            ComponentKind::Card => "title",
            ComponentKind::Heading | ComponentKind::Paragraph | ComponentKind::Text => "text",
            ComponentKind::Image => "caption",
            ComponentKind::Button
            | ComponentKind::Dropdown
            | ComponentKind::RadioGroup
            | ComponentKind::Slider => "label",
        }
    }

    fn is_numeric_field(self, field: &str) -> bool {
        matches!(self, ComponentKind::Slider) && matches!(field, "min" | "max" | "value")
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// A placed UI-component placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ComponentKind,
    /// Screen-local, untransformed.
    pub geometry: Rect,
    /// Type-specific text content, keyed by field id.
    pub content: BTreeMap<String, String>,
    /// Screen this element navigates to in preview.
    pub target_screen: Option<ScreenId>,
    /// Analytics identity; present exactly while the link is.
    pub hotspot_id: Option<HotspotId>,
}

impl Element {
    pub fn new(kind: ComponentKind, geometry: Rect) -> Self {
        let content = kind
            .default_fields()
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self {
            id: ElementId::generate(),
            kind,
            geometry,
            content,
            target_screen: None,
            hotspot_id: None,
        }
    }

    /// The text that names this element, falling back to the type name.
    pub fn label(&self) -> String {
        self.content
            .get(self.kind.label_field())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(self.kind.display_name())
            .to_string()
    }

    /// Type-specific property setter. Returns `Ok(true)` if the value changed.
    pub fn set_field(&mut self, field: &str, value: &str) -> EditResult<bool> {
        if !self.kind.default_fields().iter().any(|(k, _)| *k == field) {
            return Err(EditError::UnknownField {
                kind: self.kind.as_str(),
                field: field.to_string(),
            });
        }
        if self.kind.is_numeric_field(field) && value.trim().parse::<f64>().is_err() {
            return Err(EditError::InvalidFieldValue {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
        let slot = self.content.entry(field.to_string()).or_default();
        if slot.as_str() == value {
            return Ok(false);
        }
        *slot = value.to_string();
        Ok(true)
    }

    /// Deep copy under a fresh id. The link target is kept but the hotspot
    /// identity is not; the owner allocates a new one.
    pub fn duplicate(&self) -> Self {
        Self {
            id: ElementId::generate(),
            hotspot_id: None,
            ..self.clone()
        }
    }

    /// Selection-bar caption: `Button selected` or `Button -> Checkout`.
    pub fn caption(&self, target_name: Option<&str>) -> String {
        match target_name {
            Some(name) => format!("{} -> {}", self.kind.display_name(), name),
            None => format!("{} selected", self.kind.display_name()),
        }
    }
}

// ─── Screens ─────────────────────────────────────────────────────────────

/// Canvas size presets offered in the size picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SizePreset {
    /// 375 × 667
    Phone,
    /// 768 × 1024
    Tablet,
    /// 1280 × 720
    #[default]
    Desktop,
    /// 1440 × 900
    Laptop,
    /// 1920 × 1080
    FullHd,
    Custom,
}

impl SizePreset {
    pub const FIXED: [SizePreset; 5] = [
        SizePreset::Phone,
        SizePreset::Tablet,
        SizePreset::Desktop,
        SizePreset::Laptop,
        SizePreset::FullHd,
    ];

    pub fn dimensions(self) -> Option<(u32, u32)> {
        match self {
            SizePreset::Phone => Some((375, 667)),
            SizePreset::Tablet => Some((768, 1024)),
            SizePreset::Desktop => Some((1280, 720)),
            SizePreset::Laptop => Some((1440, 900)),
            SizePreset::FullHd => Some((1920, 1080)),
            SizePreset::Custom => None,
        }
    }

    /// Picker key: `"1280x720"` or `"custom"`.
    pub fn key(self) -> &'static str {
        match self {
            SizePreset::Phone => "375x667",
            SizePreset::Tablet => "768x1024",
            SizePreset::Desktop => "1280x720",
            SizePreset::Laptop => "1440x900",
            SizePreset::FullHd => "1920x1080",
            SizePreset::Custom => "custom",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::FIXED
            .into_iter()
            .chain(std::iter::once(SizePreset::Custom))
            .find(|p| p.key() == key)
    }

    /// The fixed preset with exactly these dimensions, if any.
    pub fn matching(width: u32, height: u32) -> Option<Self> {
        Self::FIXED
            .into_iter()
            .find(|p| p.dimensions() == Some((width, height)))
    }
}

/// One named canvas in the prototype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    pub id: ScreenId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub preset: SizePreset,
    /// Paint order: later elements sit on top.
    pub elements: Vec<Element>,
}

impl Screen {
    /// A new empty screen at the default 1280 × 720 size.
    pub fn new(id: ScreenId, name: impl Into<String>) -> Self {
        let preset = SizePreset::default();
        let (width, height) = preset.dimensions().unwrap_or((1280, 720));
        Self {
            id,
            name: name.into(),
            width,
            height,
            preset,
            elements: Vec::new(),
        }
    }

    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize::new(self.width as f32, self.height as f32)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn size_label(&self) -> String {
        format!("{} \u{00D7} {}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_parsing() {
        let c = Color::from_hex("#22C55E").unwrap();
        assert_eq!(c.to_rgba8(), [0x22, 0xC5, 0x5E, 0xFF]);
        assert_eq!(Color::from_hex("#fff").unwrap().to_rgba8(), [255; 4]);

        let c2 = Color::from_hex("#EF444480").unwrap();
        assert!((c2.a - 128.0 / 255.0).abs() < 0.01);
        assert!(Color::from_hex("#12345").is_none());
    }

    #[test]
    fn color_lerp_midpoint() {
        let a = Color::rgba(0.0, 0.0, 0.0, 0.0);
        let b = Color::rgba(1.0, 1.0, 1.0, 1.0);
        assert_eq!(a.lerp(&b, 0.5), Color::rgba(0.5, 0.5, 0.5, 0.5));
        assert_eq!(a.lerp(&b, 3.0), b);
    }

    #[test]
    fn component_tokens_roundtrip() {
        for kind in ComponentKind::ALL {
            assert_eq!(ComponentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ComponentKind::parse("carousel"), None);
    }

    #[test]
    fn element_label_falls_back_to_type_name() {
        let mut el = Element::new(ComponentKind::Button, Rect::default());
        assert_eq!(el.label(), "Button");
        el.set_field("label", "Sign in").unwrap();
        assert_eq!(el.label(), "Sign in");
        el.set_field("label", "   ").unwrap();
        assert_eq!(el.label(), "Button");
    }

    #[test]
    fn card_label_uses_title() {
        let mut el = Element::new(ComponentKind::Card, Rect::default());
        el.set_field("title", "Pricing").unwrap();
        assert_eq!(el.label(), "Pricing");
    }

    #[test]
    fn set_field_rejects_unknown_and_non_numeric() {
        let mut slider = Element::new(ComponentKind::Slider, Rect::default());
        assert!(matches!(
            slider.set_field("color", "red"),
            Err(EditError::UnknownField { .. })
        ));
        assert!(matches!(
            slider.set_field("value", "lots"),
            Err(EditError::InvalidFieldValue { .. })
        ));
        assert_eq!(slider.set_field("value", "75"), Ok(true));
        assert_eq!(slider.set_field("value", "75"), Ok(false));
    }

    #[test]
    fn duplicate_drops_hotspot_keeps_target() {
        let mut el = Element::new(ComponentKind::Button, Rect::new(0.0, 0.0, 144.0, 48.0));
        el.target_screen = Some(ScreenId::intern("screen-target"));
        el.hotspot_id = Some(HotspotId::intern("hotspot-1"));
        let copy = el.duplicate();
        assert_ne!(copy.id, el.id);
        assert_eq!(copy.target_screen, el.target_screen);
        assert_eq!(copy.hotspot_id, None);
    }

    #[test]
    fn size_preset_lookup() {
        assert_eq!(SizePreset::matching(375, 667), Some(SizePreset::Phone));
        assert_eq!(SizePreset::matching(800, 600), None);
        assert_eq!(SizePreset::from_key("custom"), Some(SizePreset::Custom));
        assert_eq!(SizePreset::from_key("1920x1080"), Some(SizePreset::FullHd));
    }

    #[test]
    fn new_screen_is_desktop_sized() {
        let s = Screen::new(ScreenId::intern("s"), "Home");
        assert_eq!((s.width, s.height), (1280, 720));
        assert_eq!(s.preset.key(), "1280x720");
        assert_eq!(s.size_label(), "1280 × 720");
    }
}
