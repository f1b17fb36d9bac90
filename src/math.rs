use std::collections::BTreeSet;

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Type alias for sets whose elements are kept in sorted order.
pub type OrderedSet<S> = BTreeSet<S>;

/// A set that remembers the order in which its elements were inserted. The position of an
/// element doubles as a stable identifier, which is what discovery-ordered naming relies on.
pub type IndexedSet<S> = indexmap::IndexSet<S, fxhash::FxBuildHasher>;
/// A map that remembers the order in which its keys were inserted.
pub type IndexedMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;

/// A partition groups elements of type `I` into disjoint classes. The classes are numbered
/// consecutively, starting from `0`.
#[derive(Debug, Clone)]
pub struct Partition<I: Ord>(Vec<BTreeSet<I>>);

impl<I: Ord> std::ops::Deref for Partition<I> {
    type Target = Vec<BTreeSet<I>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, I: Ord> IntoIterator for &'a Partition<I> {
    type Item = &'a BTreeSet<I>;
    type IntoIter = std::slice::Iter<'a, BTreeSet<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I: Ord> PartialEq for Partition<I> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|o| other.contains(o))
    }
}
impl<I: Ord> Eq for Partition<I> {}

impl<I: Ord> Partition<I> {
    /// Returns the size of the partition, i.e. the number of classes.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Builds a new partition from an iterator that yields iterators which yield elements
    /// of type `I`.
    pub fn new<X: IntoIterator<Item = I>, Y: IntoIterator<Item = X>>(iter: Y) -> Self {
        Self(
            iter.into_iter()
                .map(|it| it.into_iter().collect::<BTreeSet<_>>())
                .collect(),
        )
    }

    /// Returns the smallest element of the class with the given `id`, if the class exists
    /// and is not empty.
    pub fn representative(&self, id: usize) -> Option<&I> {
        self.0.get(id).and_then(|class| class.first())
    }

    /// Tries to find the id of the class containing `element`.
    pub fn class_of(&self, element: &I) -> Option<usize> {
        self.0.iter().position(|class| class.contains(element))
    }
}

impl Partition<usize> {
    /// Builds the partition induced by an assignment of class ids, where `assignment[i]` is
    /// the class of element `i`. Class ids that are never used give empty classes.
    pub fn from_assignment(assignment: &[usize]) -> Self {
        let size = assignment.iter().max().map(|max| max + 1).unwrap_or(0);
        let mut classes = vec![BTreeSet::new(); size];
        for (element, &class) in assignment.iter().enumerate() {
            classes[class].insert(element);
        }
        Self(classes)
    }
}

impl<I: Ord> From<Vec<BTreeSet<I>>> for Partition<I> {
    fn from(value: Vec<BTreeSet<I>>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Partition;

    #[test]
    fn partition_from_assignment() {
        let partition = Partition::from_assignment(&[0, 1, 1, 0, 2]);
        assert_eq!(partition.size(), 3);
        assert_eq!(partition, Partition::new([vec![1, 2], vec![4], vec![0, 3]]));
        assert_eq!(partition.representative(0), Some(&0));
        assert_eq!(partition.representative(1), Some(&1));
        assert_eq!(partition.class_of(&3), Some(0));
        assert_eq!(partition.class_of(&7), None);
    }
}
