//! Bidirectional global↔local id translation for the rows and columns of a
//! sub-model.

use std::collections::HashMap;

use crate::error::{DecompError, DecompResult};

/// Maps local ids `0..len` onto global ids of the original matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexMap {
    /// Local id equals global id for every id in `0..n`
    Identity(usize),
    /// Explicit translation in both directions
    Sparse {
        local_to_global: Vec<usize>,
        global_to_local: HashMap<usize, usize>,
    },
}

impl IndexMap {
    pub fn identity(n: usize) -> Self {
        IndexMap::Identity(n)
    }

    /// Builds a map whose local ids follow the iteration order of `globals`
    ///
    /// A global id seen twice would leave two local ids pointing at the same
    /// original entry and is rejected.
    pub fn from_globals<I>(globals: I) -> DecompResult<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let local_to_global: Vec<usize> = globals.into_iter().collect();
        let mut global_to_local = HashMap::with_capacity(local_to_global.len());

        for (local, &global) in local_to_global.iter().enumerate() {
            if global_to_local.insert(global, local).is_some() {
                return Err(DecompError::InvariantViolation(format!(
                    "global id {} mapped twice",
                    global
                )));
            }
        }

        Ok(IndexMap::Sparse {
            local_to_global,
            global_to_local,
        })
    }

    pub fn len(&self) -> usize {
        match self {
            IndexMap::Identity(n) => *n,
            IndexMap::Sparse { local_to_global, .. } => local_to_global.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, IndexMap::Identity(_))
    }

    pub fn to_global(&self, local: usize) -> Option<usize> {
        match self {
            IndexMap::Identity(n) => (local < *n).then_some(local),
            IndexMap::Sparse { local_to_global, .. } => local_to_global.get(local).copied(),
        }
    }

    pub fn to_local(&self, global: usize) -> Option<usize> {
        match self {
            IndexMap::Identity(n) => (global < *n).then_some(global),
            IndexMap::Sparse { global_to_local, .. } => global_to_local.get(&global).copied(),
        }
    }

    /// Global ids in local order
    pub fn globals(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).map(move |local| match self {
            IndexMap::Identity(_) => local,
            IndexMap::Sparse { local_to_global, .. } => local_to_global[local],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_map() {
        let map = IndexMap::identity(4);
        assert_eq!(map.len(), 4);
        assert_eq!(map.to_global(3), Some(3));
        assert_eq!(map.to_local(4), None);
        assert_eq!(map.globals().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_sparse_map() {
        let map = IndexMap::from_globals(vec![7, 2, 9]).unwrap();
        assert_eq!(map.to_global(0), Some(7));
        assert_eq!(map.to_local(9), Some(2));
        assert_eq!(map.to_local(3), None);
        assert_eq!(map.to_global(3), None);
        assert!(!map.is_identity());

        for local in 0..map.len() {
            let global = map.to_global(local).unwrap();
            assert_eq!(map.to_local(global), Some(local));
        }
    }

    #[test]
    fn test_duplicate_global_rejected() {
        let err = IndexMap::from_globals(vec![1, 4, 1]).unwrap_err();
        assert!(matches!(err, DecompError::InvariantViolation(_)));
    }
}
