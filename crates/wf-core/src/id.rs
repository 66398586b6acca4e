use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for screen, element, and hotspot ids.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Parse the trailing `-N` / `_N` number of an id string, if any.
pub fn numeric_suffix(s: &str) -> Option<u64> {
    let digits_start = s
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    if digits_start >= s.len() {
        return None;
    }
    s[digits_start..].parse().ok()
}

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing one.
            pub fn intern(s: &str) -> Self {
                Self(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate a fresh, process-unique id (e.g. `screen-3`).
            pub fn generate() -> Self {
                use std::sync::atomic::{AtomicU64, Ordering};
                static COUNTER: AtomicU64 = AtomicU64::new(1);
                let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                Self::intern(&format!("{}-{n}", $prefix))
            }

            /// Trailing numeric suffix of the id, if it has one.
            pub fn numeric_suffix(&self) -> Option<u64> {
                numeric_suffix(self.as_str())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        // Numeric-aware so `hotspot-2` sorts before `hotspot-10`.
        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                if self == other {
                    return Ordering::Equal;
                }
                self.numeric_suffix()
                    .cmp(&other.numeric_suffix())
                    .then_with(|| self.as_str().cmp(other.as_str()))
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identifies one screen (canvas) in the prototype.
    ScreenId,
    "screen"
);

interned_id!(
    /// Identifies a placed element. Stable for the element's lifetime.
    ElementId,
    "el"
);

interned_id!(
    /// Persistent identity of a linked element, used to attribute analytics.
    /// Allocated by the `HotspotRegistry`.
    HotspotId,
    "hotspot"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ScreenId::intern("checkout");
        let b = ScreenId::intern("checkout");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "checkout");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ElementId::generate();
        let b = ElementId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("el-"));
    }

    #[test]
    fn suffix_parsing() {
        assert_eq!(numeric_suffix("hotspot-42"), Some(42));
        assert_eq!(numeric_suffix("hotspot_7"), Some(7));
        assert_eq!(numeric_suffix("42"), Some(42));
        assert_eq!(numeric_suffix("hotspot"), None);
        assert_eq!(numeric_suffix(""), None);
    }

    #[test]
    fn ordering_is_numeric_aware() {
        let two = HotspotId::intern("hotspot-2");
        let ten = HotspotId::intern("hotspot-10");
        assert!(two < ten);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ScreenId::intern("screen-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"screen-7\"");
        let back: ScreenId = serde_json::from_str("\"screen-7\"").unwrap();
        assert_eq!(back, id);
    }
}
