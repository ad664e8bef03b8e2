//! Conversion between an option's canonical backend value and the value
//! handed to users.
//!
//! Parsers only ever produce lists of [`Scalar`] items. The adapter for an
//! option decides how that list is stored (its *backend*) and how the
//! backend is exposed (its *user* type):
//!
//! | Shape      | Backend   | User                                  |
//! |------------|-----------|---------------------------------------|
//! | `Scalar`   | `T`       | `T`                                   |
//! | `Sequence` | `Vec<T>`  | `Vec<T>`                              |
//! | `Set`      | `Vec<T>`  | any [`SetLike`] (`BTreeSet`, `HashSet`, counted multisets) |
//!
//! For sets the backend keeps command-line order (repeated flags accumulate
//! in order); [`Adapter::to_user`] folds the list into the container, which
//! then decides deduplication and iteration order.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use crate::scalar::Scalar;

/// The structural kind of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Sequence,
    Set,
}

/// A user value rendered to text.
///
/// `Display` renders lists as `{a, b, c}`, the form used in error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Plain(String),
    List(Vec<String>),
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Plain(s) => f.write_str(s),
            Rendered::List(items) => write!(f, "{{{}}}", items.join(", ")),
        }
    }
}

/// Bidirectional mapping between an option's backend and user types.
pub trait Adapter: Send + Sync + 'static {
    type Item: Scalar;
    type Backend: Clone + fmt::Debug + Send + Sync + 'static;
    type User: Clone + fmt::Debug + Send + Sync + 'static;

    const SHAPE: Shape;

    /// Build a backend value from parsed items, in input order.
    ///
    /// Returns `None` when the items cannot form a value (an empty list for a
    /// scalar option).
    fn collect(items: Vec<Self::Item>) -> Option<Self::Backend>;

    /// The backend value as a list of items.
    fn items(backend: &Self::Backend) -> Vec<Self::Item>;

    fn to_user(backend: &Self::Backend) -> Self::User;

    fn to_backend(user: &Self::User) -> Self::Backend;

    fn render(user: &Self::User) -> Rendered;
}

/// A single value; backend and user types coincide.
pub struct ScalarAdapter<T>(PhantomData<fn() -> T>);

impl<T: Scalar> Adapter for ScalarAdapter<T> {
    type Item = T;
    type Backend = T;
    type User = T;

    const SHAPE: Shape = Shape::Scalar;

    fn collect(items: Vec<T>) -> Option<T> {
        items.into_iter().last()
    }

    fn items(backend: &T) -> Vec<T> {
        vec![backend.clone()]
    }

    fn to_user(backend: &T) -> T {
        backend.clone()
    }

    fn to_backend(user: &T) -> T {
        user.clone()
    }

    fn render(user: &T) -> Rendered {
        Rendered::Plain(user.render())
    }
}

/// An ordered list; occurrences accumulate in input order.
pub struct SequenceAdapter<T>(PhantomData<fn() -> T>);

impl<T: Scalar> Adapter for SequenceAdapter<T> {
    type Item = T;
    type Backend = Vec<T>;
    type User = Vec<T>;

    const SHAPE: Shape = Shape::Sequence;

    fn collect(items: Vec<T>) -> Option<Vec<T>> {
        Some(items)
    }

    fn items(backend: &Vec<T>) -> Vec<T> {
        backend.clone()
    }

    fn to_user(backend: &Vec<T>) -> Vec<T> {
        backend.clone()
    }

    fn to_backend(user: &Vec<T>) -> Vec<T> {
        user.clone()
    }

    fn render(user: &Vec<T>) -> Rendered {
        Rendered::List(user.iter().map(Scalar::render).collect())
    }
}

/// A container built from a list of items with its own membership rules.
pub trait SetLike: Clone + fmt::Debug + Send + Sync + 'static {
    type Item: Scalar;

    fn from_items(items: Vec<Self::Item>) -> Self;

    /// Members in the container's iteration order, repeated per multiplicity.
    fn to_items(&self) -> Vec<Self::Item>;
}

impl<T: Scalar + Ord> SetLike for BTreeSet<T> {
    type Item = T;

    fn from_items(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }

    fn to_items(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T, S> SetLike for HashSet<T, S>
where
    T: Scalar + Eq + Hash,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    type Item = T;

    fn from_items(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }

    fn to_items(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

/// Ordered multiset: each member maps to its multiplicity.
impl<T: Scalar + Ord> SetLike for BTreeMap<T, usize> {
    type Item = T;

    fn from_items(items: Vec<T>) -> Self {
        let mut counts = BTreeMap::new();
        for item in items {
            *counts.entry(item).or_insert(0) += 1;
        }
        counts
    }

    fn to_items(&self) -> Vec<T> {
        self.iter()
            .flat_map(|(item, &count)| std::iter::repeat_n(item.clone(), count))
            .collect()
    }
}

/// Unordered multiset: each member maps to its multiplicity.
impl<T, S> SetLike for HashMap<T, usize, S>
where
    T: Scalar + Eq + Hash,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    type Item = T;

    fn from_items(items: Vec<T>) -> Self {
        let mut counts = HashMap::with_hasher(S::default());
        for item in items {
            *counts.entry(item).or_insert(0) += 1;
        }
        counts
    }

    fn to_items(&self) -> Vec<T> {
        self.iter()
            .flat_map(|(item, &count)| std::iter::repeat_n(item.clone(), count))
            .collect()
    }
}

/// A set-like container stored as a list.
pub struct SetAdapter<C>(PhantomData<fn() -> C>);

impl<C: SetLike> Adapter for SetAdapter<C> {
    type Item = C::Item;
    type Backend = Vec<C::Item>;
    type User = C;

    const SHAPE: Shape = Shape::Set;

    fn collect(items: Vec<C::Item>) -> Option<Vec<C::Item>> {
        Some(items)
    }

    fn items(backend: &Vec<C::Item>) -> Vec<C::Item> {
        backend.clone()
    }

    fn to_user(backend: &Vec<C::Item>) -> C {
        C::from_items(backend.clone())
    }

    fn to_backend(user: &C) -> Vec<C::Item> {
        user.to_items()
    }

    fn render(user: &C) -> Rendered {
        Rendered::List(user.to_items().iter().map(Scalar::render).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Reverse;

    #[test]
    fn scalar_collect_takes_last() {
        assert_eq!(ScalarAdapter::<u16>::collect(vec![1, 2, 3]), Some(3));
        assert_eq!(ScalarAdapter::<u16>::collect(vec![]), None);
    }

    #[test]
    fn sequence_keeps_order_and_duplicates() {
        let backend = SequenceAdapter::<i32>::collect(vec![7, 7, 5, 3, 3, 1]).unwrap();
        assert_eq!(SequenceAdapter::<i32>::to_user(&backend), vec![7, 7, 5, 3, 3, 1]);
    }

    #[test]
    fn btree_set_dedups_and_sorts() {
        let set = SetAdapter::<BTreeSet<i32>>::to_user(&vec![7, 7, 5, 3, 3, 1]);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 3, 5, 7]);
    }

    #[test]
    fn reverse_set_iterates_descending() {
        let backend = vec![Reverse(32u32), Reverse(128), Reverse(64)];
        let set = SetAdapter::<BTreeSet<Reverse<u32>>>::to_user(&backend);
        let rendered = SetAdapter::<BTreeSet<Reverse<u32>>>::render(&set);
        assert_eq!(rendered.to_string(), "{128, 64, 32}");
    }

    #[test]
    fn hash_set_dedups() {
        let set: HashSet<i32> = SetAdapter::<HashSet<i32>>::to_user(&vec![7, 7, 5, 3, 3, 1]);
        assert_eq!(set.len(), 4);
        assert!([1, 3, 5, 7].iter().all(|x| set.contains(x)));
    }

    #[test]
    fn multisets_keep_multiplicity() {
        let items = vec![7, 7, 5, 3, 3, 1];
        let ordered = SetAdapter::<BTreeMap<i32, usize>>::to_user(&items);
        assert_eq!(ordered.values().sum::<usize>(), 6);
        assert_eq!(ordered[&7], 2);
        assert_eq!(ordered[&3], 2);
        assert_eq!(ordered[&1], 1);
        assert_eq!(ordered.to_items(), vec![1, 3, 3, 5, 7, 7]);

        let unordered = SetAdapter::<HashMap<i32, usize>>::to_user(&items);
        assert_eq!(unordered.values().sum::<usize>(), 6);
        assert_eq!(unordered[&7], 2);
        assert_eq!(unordered[&5], 1);
    }

    #[test]
    fn set_round_trip_preserves_members() {
        let original: BTreeSet<u32> = [4, 8, 16].into_iter().collect();
        let backend = SetAdapter::<BTreeSet<u32>>::to_backend(&original);
        assert_eq!(SetAdapter::<BTreeSet<u32>>::to_user(&backend), original);
    }

    #[test]
    fn rendered_display() {
        assert_eq!(Rendered::Plain("80".into()).to_string(), "80");
        assert_eq!(Rendered::List(vec![]).to_string(), "{}");
        assert_eq!(
            Rendered::List(vec!["4".into(), "8".into()]).to_string(),
            "{4, 8}"
        );
    }
}
