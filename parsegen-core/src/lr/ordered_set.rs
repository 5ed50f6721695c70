use std::collections::{hash_map::DefaultHasher, HashMap};
use std::hash::{Hash, Hasher};

/// An insertion-ordered set. Members are looked up by hash and then compared
/// structurally, so two distinct values that share a hash both keep their
/// own slot.
#[derive(Debug, Clone)]
pub(crate) struct OrderedSet<T: Hash + Eq> {
    elem_idx: HashMap<u64, Vec<usize>>,
    elems: Vec<T>,
}

impl<T: Hash + Eq> OrderedSet<T> {
    fn hash_of(elem: &T) -> u64 {
        let mut hasher = DefaultHasher::default();
        elem.hash(&mut hasher);
        hasher.finish()
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Insert an element into a set, returning `true` if the item was not
    /// previously a member of the set.
    pub fn insert(&mut self, elem: T) -> bool {
        self.insert_full(elem).1
    }

    /// Inserts an element, returning its slot and whether it was newly
    /// added.
    pub fn insert_full(&mut self, elem: T) -> (usize, bool) {
        let elem_hash = Self::hash_of(&elem);

        if let Some(slot) = self.position_with_hash(elem_hash, &elem) {
            return (slot, false);
        }

        let slot = self.elems.len();
        self.elem_idx.entry(elem_hash).or_default().push(slot);
        self.elems.push(elem);

        (slot, true)
    }

    fn position_with_hash(&self, elem_hash: u64, elem: &T) -> Option<usize> {
        self.elem_idx
            .get(&elem_hash)?
            .iter()
            .copied()
            .find(|&slot| &self.elems[slot] == elem)
    }

    /// Returns the position of a given element is a member the set, otherwise
    /// `None` is returned.
    #[cfg(test)]
    pub fn position(&self, elem: &T) -> Option<usize> {
        self.position_with_hash(Self::hash_of(elem), elem)
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.elems.get(slot)
    }

    pub fn to_vec(self) -> Vec<T> {
        self.elems
    }
}

impl<T: Hash + Eq> AsRef<[T]> for OrderedSet<T> {
    fn as_ref(&self) -> &[T] {
        &self.elems
    }
}

impl<T: Hash + Eq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.elems == other.elems
    }
}

impl<T: Hash + Eq> Eq for OrderedSet<T> {}

impl<T: Hash + Eq> IntoIterator for OrderedSet<T> {
    type Item = T;

    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.into_iter()
    }
}

impl<T: Hash + Eq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OrderedSet::default();

        for elem in iter {
            set.insert(elem);
        }

        set
    }
}

impl<T: Hash + Eq> Hash for OrderedSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elems.hash(state);
    }
}

impl<T: Hash + Eq> From<OrderedSet<T>> for Vec<T> {
    fn from(value: OrderedSet<T>) -> Self {
        value.to_vec()
    }
}

impl<T: Hash + Eq> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            elem_idx: Default::default(),
            elems: Default::default(),
        }
    }
}
