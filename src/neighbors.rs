//! Precomputed nearest-neighbor index
//!
//! Maps an example id to an ordered list of similar example ids, loaded once
//! from a static tab-separated file and never mutated afterwards. Neighbor
//! order is significant: the predictor consults neighbors in file order.

use crate::example::ExampleId;
use crate::PruneError;
use std::collections::HashMap;
use std::path::Path;

/// Read-only mapping from example id to its ordered neighbor list
#[derive(Debug, Clone, Default)]
pub struct NeighborIndex {
    neighbors: HashMap<ExampleId, Vec<ExampleId>>,
}

impl NeighborIndex {
    /// Load the index from a file
    ///
    /// Line format: `id<TAB>neighbor_id1,neighbor_id2,...`. An unreadable
    /// path or a line without a tab separator is a fatal error; the file is
    /// a required static resource and there is no retry.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PruneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let index = Self::parse(&text)?;
        tracing::info!(
            path = %path.display(),
            examples = index.len(),
            "loaded cached neighbors"
        );
        Ok(index)
    }

    /// Parse index contents from text
    pub fn parse(text: &str) -> Result<Self, PruneError> {
        let mut neighbors = HashMap::new();
        for (i, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let (id, rest) = line
                .split_once('\t')
                .ok_or(PruneError::MalformedNeighborFile { line: i + 1 })?;
            let ids: Vec<ExampleId> = rest
                .split(',')
                .filter(|s| !s.is_empty())
                .map(ExampleId::from)
                .collect();
            neighbors.insert(ExampleId::from(id), ids);
        }
        Ok(Self { neighbors })
    }

    /// Ordered neighbor list for an example; `None` if no record exists
    pub fn neighbors(&self, id: &ExampleId) -> Option<&[ExampleId]> {
        self.neighbors.get(id).map(Vec::as_slice)
    }

    /// Number of examples with a neighbor record
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether the index has no records
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}
