//! The [`Presence`] trait: whether a field value carries data.
//!
//! `Required` fields are only copied from an incoming record when the incoming
//! value is present. Optional values are absent when `None`, JSON values are
//! absent when `null`. Primitives, strings and collections have no absent
//! state, so they are always present and `Required` behaves like `Mandatory`
//! for them. An empty string or an empty `Vec` is still a value.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// Whether a value is present or the type's absent sentinel.
pub trait Presence {
    /// Returns `true` unless the value is the absent sentinel.
    fn is_present(&self) -> bool;

    /// Convenience negation of [`Presence::is_present`].
    fn is_absent(&self) -> bool {
        !self.is_present()
    }
}

impl<T> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl Presence for serde_json::Value {
    fn is_present(&self) -> bool {
        !self.is_null()
    }
}

impl<T: Presence + ?Sized> Presence for Box<T> {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

impl<T: Presence + ?Sized> Presence for Rc<T> {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

impl<T: Presence + ?Sized> Presence for Arc<T> {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

macro_rules! impl_always_present {
    ($($type:ty),* $(,)?) => {
        $(
            impl Presence for $type {
                fn is_present(&self) -> bool {
                    true
                }
            }
        )*
    };
}

impl_always_present!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, str,
);

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T> Presence for VecDeque<T> {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T> Presence for [T] {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T, const N: usize> Presence for [T; N] {
    fn is_present(&self) -> bool {
        true
    }
}

impl<K, V, S> Presence for HashMap<K, V, S> {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T, S> Presence for HashSet<T, S> {
    fn is_present(&self) -> bool {
        true
    }
}

impl<K, V> Presence for BTreeMap<K, V> {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T> Presence for BTreeSet<T> {
    fn is_present(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn option_presence() {
        assert!(Some(0u8).is_present());
        assert!(None::<String>.is_absent());
    }

    #[test]
    fn json_null_is_absent() {
        assert!(json!(null).is_absent());
        assert!(json!(false).is_present());
        assert!(json!([]).is_present());
    }

    #[test]
    fn empty_containers_are_present() {
        assert!(String::new().is_present());
        assert!(Vec::<u8>::new().is_present());
        assert!(BTreeMap::<String, u8>::new().is_present());
    }

    #[test]
    fn smart_pointers_delegate() {
        assert!(Box::new(None::<u8>).is_absent());
        assert!(Arc::new(Some(1)).is_present());
        assert!(Rc::new(json!(null)).is_absent());
    }

    proptest! {
        #[test]
        fn primitives_are_always_present(i in any::<i64>(), f in any::<f64>(), b in any::<bool>()) {
            prop_assert!(i.is_present());
            prop_assert!(f.is_present());
            prop_assert!(b.is_present());
        }

        #[test]
        fn option_matches_is_some(value in proptest::option::of(any::<u32>())) {
            prop_assert_eq!(value.is_present(), value.is_some());
        }
    }
}
