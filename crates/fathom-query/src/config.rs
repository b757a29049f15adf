//! Planner configuration.

/// Default cap on the candidate set handed back by a pipeline.
pub const DEFAULT_MAX_RESULT_SIZE: usize = 150;

/// Default length limit for the entity type clause.
pub const DEFAULT_MAX_QUERY_STR_LENGTH_TYPES: usize = 512;

/// Default length limit for the classification trait clause.
pub const DEFAULT_MAX_QUERY_STR_LENGTH_TAGS: usize = 512;

/// Tunables for a planning session.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of candidate vertices a pipeline returns.
    pub max_result_size: usize,
    /// Maximum rendered length of the entity type clause.
    pub max_query_str_length_types: usize,
    /// Maximum rendered length of the classification trait clause.
    pub max_query_str_length_tags: usize,
}

impl SearchConfig {
    /// Creates a configuration with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_result_size: DEFAULT_MAX_RESULT_SIZE,
            max_query_str_length_types: DEFAULT_MAX_QUERY_STR_LENGTH_TYPES,
            max_query_str_length_tags: DEFAULT_MAX_QUERY_STR_LENGTH_TAGS,
        }
    }

    /// Sets the maximum result size.
    #[must_use]
    pub const fn with_max_result_size(mut self, max: usize) -> Self {
        self.max_result_size = max;
        self
    }

    /// Sets the type clause length limit.
    #[must_use]
    pub const fn with_max_types_length(mut self, max: usize) -> Self {
        self.max_query_str_length_types = max;
        self
    }

    /// Sets the trait clause length limit.
    #[must_use]
    pub const fn with_max_tags_length(mut self, max: usize) -> Self {
        self.max_query_str_length_tags = max;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SearchConfig::new();
        assert_eq!(config.max_result_size, 150);
        assert_eq!(config.max_query_str_length_types, 512);
        assert_eq!(config.max_query_str_length_tags, 512);
    }

    #[test]
    fn builders() {
        let config = SearchConfig::new().with_max_result_size(10).with_max_types_length(64);
        assert_eq!(config.max_result_size, 10);
        assert_eq!(config.max_query_str_length_types, 64);
        assert_eq!(config.max_query_str_length_tags, 512);
    }
}
