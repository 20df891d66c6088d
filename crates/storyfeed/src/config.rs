//! Paging configuration.

use storyfeed_core::Result;
use storyfeed_core::error::InvalidInputError;

/// How a feed pages through the remote story list.
///
/// ```
/// use storyfeed::PagingConfig;
///
/// let config = PagingConfig::new(10).unwrap();
/// assert_eq!(config.initial_load_size(), 30);
/// assert_eq!(config.prefetch_distance(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    page_size: u32,
    initial_load_size: u32,
    prefetch_distance: u32,
    initial_refresh: bool,
}

impl PagingConfig {
    pub const DEFAULT_PAGE_SIZE: u32 = 5;

    /// Configuration for `page_size` items per page.
    ///
    /// The initial load is three pages and prefetching starts one page
    /// from either edge.
    pub fn new(page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(InvalidInputError::PagingConfig {
                reason: "page size must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(Self {
            page_size,
            initial_load_size: page_size.saturating_mul(3),
            prefetch_distance: page_size,
            initial_refresh: true,
        })
    }

    /// Size of the first load of a memory-only feed, a whole number of
    /// pages.
    pub fn with_initial_load_size(mut self, size: u32) -> Result<Self> {
        if size < self.page_size || size % self.page_size != 0 {
            return Err(InvalidInputError::PagingConfig {
                reason: format!(
                    "initial load size {size} is not a multiple of page size {}",
                    self.page_size
                ),
            }
            .into());
        }
        self.initial_load_size = size;
        Ok(self)
    }

    pub fn with_prefetch_distance(mut self, distance: u32) -> Self {
        self.prefetch_distance = distance;
        self
    }

    /// Whether a cache-backed feed refreshes when it starts.
    pub fn with_initial_refresh(mut self, refresh: bool) -> Self {
        self.initial_refresh = refresh;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn initial_load_size(&self) -> u32 {
        self.initial_load_size
    }

    /// Pages covered by the initial load.
    pub fn initial_load_pages(&self) -> u32 {
        self.initial_load_size / self.page_size
    }

    pub fn prefetch_distance(&self) -> u32 {
        self.prefetch_distance
    }

    pub fn initial_refresh(&self) -> bool {
        self.initial_refresh
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            initial_load_size: Self::DEFAULT_PAGE_SIZE * 3,
            prefetch_distance: Self::DEFAULT_PAGE_SIZE,
            initial_refresh: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyfeed_core::Error;

    #[test]
    fn default_matches_new_with_default_page_size() {
        assert_eq!(
            PagingConfig::default(),
            PagingConfig::new(PagingConfig::DEFAULT_PAGE_SIZE).unwrap()
        );
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(matches!(
            PagingConfig::new(0),
            Err(Error::InvalidInput(InvalidInputError::PagingConfig { .. }))
        ));
    }

    #[test]
    fn initial_load_smaller_than_page_is_rejected() {
        let config = PagingConfig::new(5).unwrap();
        assert!(config.with_initial_load_size(4).is_err());
        assert_eq!(
            config.with_initial_load_size(5).unwrap().initial_load_size(),
            5
        );
    }

    #[test]
    fn initial_load_must_be_whole_pages() {
        let config = PagingConfig::new(5).unwrap();
        assert!(config.with_initial_load_size(12).is_err());
        assert_eq!(
            config.with_initial_load_size(20).unwrap().initial_load_pages(),
            4
        );
        assert_eq!(config.initial_load_pages(), 3);
    }
}
