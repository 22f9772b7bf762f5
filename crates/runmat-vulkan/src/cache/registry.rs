use crate::device::PipelineHandle;
use crate::geometry::WorkGroup;
use std::collections::HashMap;

/// Pipeline variants of one shader object, one per work-group shape.
#[derive(Debug, Default)]
pub struct PipelineRegistry {
    inner: HashMap<WorkGroup, PipelineHandle>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &WorkGroup) -> Option<PipelineHandle> {
        self.inner.get(key).copied()
    }

    /// Returns the pipeline already registered for `key`, if any, leaving it in place.
    pub fn insert(&mut self, key: WorkGroup, pipeline: PipelineHandle) -> Option<PipelineHandle> {
        match self.inner.get(&key) {
            Some(existing) => Some(*existing),
            None => {
                self.inner.insert(key, pipeline);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn shapes(&self) -> impl Iterator<Item = &WorkGroup> {
        self.inner.keys()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (WorkGroup, PipelineHandle)> + '_ {
        self.inner.drain()
    }
}
