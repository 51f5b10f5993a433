use std::{
    collections::BTreeMap,
    marker::PhantomData,
    ops::{Index, IndexMut},
};

#[macro_export]
macro_rules! key_type {
    ($vis:vis $name:ident) => {
        #[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
        $vis struct $name($crate::idmap::ID);

        impl $crate::idmap::AsID for $name {
            fn id(&self) -> $crate::idmap::ID {
                self.0
            }

            fn to_id(id: $crate::idmap::ID) -> Self {
                $name(id)
            }
        }

        impl From<$crate::idmap::ID> for $name {
            fn from(id: $crate::idmap::ID) -> $name {
                $name(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub trait AsID {
    fn id(&self) -> ID;
    fn to_id(id: ID) -> Self;
}

pub type ID = u32;

/// Map that stores values and returns their id.
///
/// Ids are handed out in increasing order and never reused, so iteration
/// order is insertion order and a stale key can never alias a newer value.
#[derive(Debug)]
pub struct IdMap<K: AsID, V> {
    map: BTreeMap<ID, V>,
    next_id: ID,
    _phantom: PhantomData<K>,
}

impl<K: AsID, V> IdMap<K, V> {
    pub fn insert(&mut self, value: V) -> K {
        let id = self.next_id;
        self.next_id += 1;
        self.map.insert(id, value);
        K::to_id(id)
    }

    /// Insert a value whose construction needs to know its own key
    pub fn insert_with<F: FnOnce(K) -> V>(&mut self, f: F) -> K {
        let id = self.next_id;
        self.next_id += 1;
        self.map.insert(id, f(K::to_id(id)));
        K::to_id(id)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(&key.id())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(&key.id())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Remove all values, ids already handed out stay retired
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn iter(&self) -> Iter<K, V> {
        let iter = self.map.iter();
        Iter {
            iter,
            _phantom: PhantomData,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<K, V> {
        let iter = self.map.iter_mut();
        IterMut {
            iter,
            _phantom: PhantomData,
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = K> + '_ {
        self.map.keys().map(|id| K::to_id(*id))
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.map.values()
    }

    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut V> + '_ {
        self.map.values_mut()
    }

    /// Most recently inserted key that is still present
    pub fn last_key(&self) -> Option<K> {
        self.map.keys().next_back().map(|id| K::to_id(*id))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(&key.id())
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.map.get_mut(&key.id())
    }
}

impl<K: AsID, V> Index<K> for IdMap<K, V> {
    type Output = V;

    fn index(&self, index: K) -> &Self::Output {
        self.map.get(&index.id()).unwrap()
    }
}

impl<K: AsID, V> IndexMut<K> for IdMap<K, V> {
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        self.map.get_mut(&index.id()).unwrap()
    }
}

pub struct Iter<'a, K: AsID, V> {
    iter: std::collections::btree_map::Iter<'a, ID, V>,
    _phantom: PhantomData<K>,
}

impl<'a, K: AsID, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, val) = self.iter.next()?;
        let id = K::to_id(*id);

        Some((id, val))
    }
}

pub struct IterMut<'a, K: AsID, V> {
    iter: std::collections::btree_map::IterMut<'a, ID, V>,
    _phantom: PhantomData<K>,
}

impl<'a, K: AsID, V> Iterator for IterMut<'a, K, V> {
    type Item = (K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, val) = self.iter.next()?;
        let id = K::to_id(*id);

        Some((id, val))
    }
}

impl<K: AsID, V> Default for IdMap<K, V> {
    fn default() -> Self {
        Self {
            map: BTreeMap::default(),
            next_id: 1,
            _phantom: PhantomData,
        }
    }
}
