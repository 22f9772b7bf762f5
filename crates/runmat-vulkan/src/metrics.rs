use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Shader objects (module + layouts) built.
    pub object_builds: u64,
    pub pipeline_builds: u64,
    /// Requests served by an existing pipeline variant.
    pub pipeline_hits: u64,
    pub failures: u64,
}

impl CacheStats {
    pub fn requests(&self) -> u64 {
        self.pipeline_builds + self.pipeline_hits
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
