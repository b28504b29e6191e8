//! Configuration for the reference resolver.

/// Configuration for the reference resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum number of fetch passes before giving up.
    pub max_passes: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { max_passes: 100 }
    }
}

impl ResolverConfig {
    /// Creates a new configuration with the specified pass limit.
    pub fn with_max_passes(mut self, max_passes: u32) -> Self {
        self.max_passes = max_passes;
        self
    }
}
