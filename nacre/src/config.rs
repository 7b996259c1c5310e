// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use core::num::NonZeroUsize;

use crate::cache::CacheConfig;

/// Settings for a single build or stream.
///
/// By default no match cache is used and the number of rule calls is unlimited.
///
/// # Examples
///
/// ```
/// # use nacre::Config;
/// let config = Config::new().with_cache(64, 16).with_call_limit(10_000);
///
/// assert_eq!(config.cache.map(|cache| cache.depth), Some(64));
/// assert_eq!(config.call_limit.map(|limit| limit.get()), Some(10_000));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// Bounds of the match cache, if one should be used
    pub cache: Option<CacheConfig>,
    /// Maximum number of rule calls per build or stream
    pub call_limit: Option<NonZeroUsize>,
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Enables a match cache of `depth` positions by `breadth` rules.
    pub fn with_cache(mut self, depth: usize, breadth: usize) -> Config {
        self.cache = Some(CacheConfig { depth, breadth });
        self
    }

    /// Limits the number of rule calls per build or stream. A limit of 0 removes the limit.
    pub fn with_call_limit(mut self, limit: usize) -> Config {
        self.call_limit = NonZeroUsize::new(limit);
        self
    }
}
