//! Plugin priority keys.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// Priority attached to a registered plugin.
///
/// `Ordered` keys compare ascending (lower value, higher priority) and always
/// sort before `Unordered`. Two equal keys compare equal, so a stable sort keeps
/// their registration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKey {
    /// Explicit priority.
    Ordered(i32),
    /// No priority; placed after every ordered plugin.
    #[default]
    Unordered,
}

impl OrderKey {
    /// Highest possible priority.
    pub const FIRST: Self = Self::Ordered(i32::MIN);

    /// Lowest explicit priority. Still sorts before [`OrderKey::Unordered`].
    pub const LAST: Self = Self::Ordered(i32::MAX);

    /// Picks the explicit order if present, otherwise the fallback.
    ///
    /// Used to let a registration-time order override the one a plugin
    /// declares about itself.
    pub fn resolve(explicit: Option<i32>, declared: Option<i32>) -> Self {
        explicit.or(declared).into()
    }

    /// Returns `true` for [`OrderKey::Ordered`].
    pub fn is_ordered(&self) -> bool {
        matches!(self, Self::Ordered(_))
    }

    /// The explicit priority value, if any.
    pub fn value(&self) -> Option<i32> {
        match self {
            Self::Ordered(v) => Some(*v),
            Self::Unordered => None,
        }
    }
}

impl From<Option<i32>> for OrderKey {
    fn from(value: Option<i32>) -> Self {
        value.map_or(Self::Unordered, Self::Ordered)
    }
}

impl From<i32> for OrderKey {
    fn from(value: i32) -> Self {
        Self::Ordered(value)
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Ordered(a), Self::Ordered(b)) => a.cmp(b),
            (Self::Ordered(_), Self::Unordered) => Ordering::Less,
            (Self::Unordered, Self::Ordered(_)) => Ordering::Greater,
            (Self::Unordered, Self::Unordered) => Ordering::Equal,
        }
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordered(v) => write!(f, "{v}"),
            Self::Unordered => f.write_str("unordered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_before_unordered() {
        assert!(OrderKey::Ordered(i32::MAX) < OrderKey::Unordered);
        assert!(OrderKey::LAST < OrderKey::Unordered);
        assert!(OrderKey::FIRST < OrderKey::Ordered(0));
    }

    #[test]
    fn test_lower_value_wins() {
        assert!(OrderKey::Ordered(-5) < OrderKey::Ordered(3));
        assert_eq!(OrderKey::Ordered(2).cmp(&OrderKey::Ordered(2)), Ordering::Equal);
        assert_eq!(OrderKey::Unordered.cmp(&OrderKey::Unordered), Ordering::Equal);
    }

    #[test]
    fn test_explicit_overrides_declared() {
        assert_eq!(OrderKey::resolve(Some(1), Some(9)), OrderKey::Ordered(1));
        assert_eq!(OrderKey::resolve(None, Some(9)), OrderKey::Ordered(9));
        assert_eq!(OrderKey::resolve(None, None), OrderKey::Unordered);
    }

    #[test]
    fn test_stable_sort_keeps_ties() {
        let mut keys = vec![
            (OrderKey::Unordered, "a"),
            (OrderKey::Ordered(2), "b"),
            (OrderKey::Unordered, "c"),
            (OrderKey::Ordered(1), "d"),
            (OrderKey::Ordered(2), "e"),
        ];
        keys.sort_by_key(|(k, _)| *k);
        let names: Vec<_> = keys.into_iter().map(|(_, n)| n).collect();
        assert_eq!(names, ["d", "b", "e", "a", "c"]);
    }
}
