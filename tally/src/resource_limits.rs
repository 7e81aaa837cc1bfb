use serde::{Deserialize, Serialize};

/// Resource limits that keep evaluation bounded
///
/// These limits protect against runaway inputs while being generous enough
/// for all legitimate notepad use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum document size in bytes
    /// Real usage: ~2KB, Limit: 1MB (500x)
    pub max_document_bytes: usize,

    /// Maximum length of a single line in characters
    /// Real usage: ~40 chars, Limit: 4096 (100x)
    pub max_line_length: usize,

    /// Maximum nesting of user-defined function calls
    /// Real usage: ~2 levels, Limit: 20
    pub max_call_depth: usize,

    /// Maximum number of items in a list or range
    /// Real usage: ~10 items, Limit: 10,000 (1000x)
    pub max_list_length: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_document_bytes: 1024 * 1024, // 1 MB
            max_line_length: 4096,
            max_call_depth: 20,
            max_list_length: 10_000,
        }
    }
}

impl ResourceLimits {
    /// Create a new ResourceLimits with default values
    pub fn new() -> Self {
        Self::default()
    }
}
