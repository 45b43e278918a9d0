use std::env;

/// Page size used by the memory backend's chunked scan when none is
/// configured.
pub const DEFAULT_PAGE_SIZE: usize = 25;

const PAGE_SIZE_VAR: &str = "MARROW_SCAN_PAGE_SIZE";

///
/// StoreConfig
///

#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Maximum number of items delivered per scan chunk.
    pub page_size: usize,
}

impl StoreConfig {
    /// Read configuration from the process environment, falling back to
    /// defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let page_size = env::var(PAGE_SIZE_VAR)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|&size| size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self { page_size }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_size_is_positive() {
        assert!(StoreConfig::default().page_size > 0);
    }
}
