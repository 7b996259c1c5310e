// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::ops::Range;
use std::collections::HashMap;

use log::debug;

use crate::error::Diagnostic;
use crate::grammar::RuleId;
use crate::node::Node;

/// Bounds of a [`MatchCache`](struct.MatchCache.html).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CacheConfig {
    /// How many distinct positions are remembered
    pub depth: usize,
    /// How many rules are remembered per position
    pub breadth: usize,
}

// One step of a match, as seen by failure reporting. `Leave` closes the innermost open `Enter`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Attempt {
    Enter(usize),
    Leave {
        rule: RuleId,
        // negations opened since the logged match started
        negation: usize,
        matched: bool,
    },
}

/// The rules a cached match attempted, in the order they were entered and left.
///
/// Replaying a cached result retraces its log, so failure messages come out the same whether
/// or not a match was served from the cache.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptLog(Rc<[Attempt]>);

impl AttemptLog {
    pub(crate) fn new(attempts: Vec<Attempt>) -> AttemptLog {
        AttemptLog(attempts.into())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Attempt> {
        self.0.iter()
    }

    /// Returns how many rule evaluations were logged.
    pub fn len(&self) -> usize {
        self.0
            .iter()
            .filter(|attempt| matches!(attempt, Attempt::Enter(_)))
            .count()
    }

    /// Returns `true` if no rule evaluation was logged.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for AttemptLog {
    fn default() -> AttemptLog {
        AttemptLog::new(vec![])
    }
}

/// The memoized outcome of matching a rule at a position.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchResult {
    /// The rule matched up to `end`, contributing `nodes` and raising `diagnostics`.
    Success {
        /// Position after the match
        end: usize,
        /// Part of the match not covered by skipped rules at its edges; `None` if it only skipped
        content: Option<Range<usize>>,
        /// Nodes handed to the parent rule, shared between hits
        nodes: Rc<[Node]>,
        /// Diagnostics raised by pinned rules during the match
        diagnostics: Vec<Diagnostic>,
        /// Rules attempted during the match
        attempts: AttemptLog,
    },
    /// The rule did not match.
    Failure {
        /// Rules attempted during the match
        attempts: AttemptLog,
    },
}

impl MatchResult {
    /// Returns a failure that attempted nothing.
    pub fn failure() -> MatchResult {
        MatchResult::Failure {
            attempts: AttemptLog::default(),
        }
    }
}

/// A bounded packrat cache keyed by position and rule.
///
/// At most `depth` positions are kept, each holding at most `breadth` rules. When either bound is
/// hit the oldest entry is evicted. Eviction only costs time: a missing entry is simply
/// recomputed.
///
/// # Examples
///
/// ```
/// # use nacre::{MatchCache, MatchResult};
/// # use nacre::Grammar;
/// # use nacre::Rule;
/// # let grammar = Grammar::builder().root(Rule::any()).build().unwrap();
/// let rule = grammar.root();
/// let mut cache = MatchCache::new(2, 1);
///
/// cache.insert(0, rule, MatchResult::failure());
/// cache.insert(1, rule, MatchResult::failure());
/// cache.insert(2, rule, MatchResult::failure());
///
/// assert_eq!(cache.get(0, rule), None);
/// assert_eq!(cache.get(2, rule), Some(MatchResult::failure()));
/// ```
#[derive(Debug)]
pub struct MatchCache {
    config: CacheConfig,
    positions: VecDeque<usize>,
    entries: HashMap<usize, Vec<(RuleId, MatchResult)>>,
    hits: usize,
    misses: usize,
}

impl MatchCache {
    /// Creates a cache holding `depth` positions of `breadth` rules each.
    pub fn new(depth: usize, breadth: usize) -> MatchCache {
        MatchCache::with_config(CacheConfig { depth, breadth })
    }

    /// Creates a cache from a `CacheConfig`.
    pub fn with_config(config: CacheConfig) -> MatchCache {
        MatchCache {
            config,
            positions: VecDeque::with_capacity(config.depth),
            entries: HashMap::with_capacity(config.depth),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the bounds.
    #[inline]
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Returns the result cached for `rule` at `position`. Nodes and logs are shared with the
    /// cached entry rather than copied.
    pub fn get(&mut self, position: usize, rule: RuleId) -> Option<MatchResult> {
        let result = self.entries.get(&position).and_then(|entries| {
            entries
                .iter()
                .find(|(id, _)| *id == rule)
                .map(|(_, result)| result.clone())
        });

        match result {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }

        result
    }

    /// Caches `result` for `rule` at `position`, evicting the oldest entries past the bounds.
    pub fn insert(&mut self, position: usize, rule: RuleId, result: MatchResult) {
        if self.config.depth == 0 || self.config.breadth == 0 {
            return;
        }

        if !self.entries.contains_key(&position) {
            if self.positions.len() == self.config.depth {
                if let Some(oldest) = self.positions.pop_front() {
                    debug!("evicting cached matches at position {}", oldest);
                    self.entries.remove(&oldest);
                }
            }

            self.positions.push_back(position);
        }

        let breadth = self.config.breadth;
        let entries = self.entries.entry(position).or_default();

        if let Some(entry) = entries.iter_mut().find(|(id, _)| *id == rule) {
            entry.1 = result;
            return;
        }
        if entries.len() == breadth {
            debug!("evicting the oldest cached rule at position {}", position);
            entries.remove(0);
        }

        entries.push((rule, result));
    }

    /// Returns the number of cached results.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the most results the cache can hold.
    pub fn capacity(&self) -> usize {
        self.config.depth * self.config.breadth
    }

    /// Returns how many lookups found a result.
    #[inline]
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Returns how many lookups found nothing.
    #[inline]
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Drops every cached result.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Annotations;
    use crate::token::Token;

    fn ids(n: usize) -> Vec<RuleId> {
        (0..n).map(RuleId::from_index).collect()
    }

    fn success(end: usize) -> MatchResult {
        MatchResult::Success {
            end,
            content: Some(0..end),
            nodes: Rc::from(vec![]),
            diagnostics: vec![],
            attempts: AttemptLog::default(),
        }
    }

    #[test]
    fn hit_and_miss() {
        let ids = ids(2);
        let mut cache = MatchCache::new(4, 4);

        cache.insert(3, ids[0], success(5));

        assert_eq!(cache.get(3, ids[0]), Some(success(5)));
        assert_eq!(cache.get(3, ids[1]), None);
        assert_eq!(cache.get(4, ids[0]), None);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn hits_share_nodes() {
        let ids = ids(1);
        let mut cache = MatchCache::new(1, 1);
        let node = Node::new(Token::named("a"), 0..1, Annotations::new());

        cache.insert(
            0,
            ids[0],
            MatchResult::Success {
                end: 1,
                content: Some(0..1),
                nodes: Rc::from(vec![node]),
                diagnostics: vec![],
                attempts: AttemptLog::default(),
            },
        );

        match (cache.get(0, ids[0]), cache.get(0, ids[0])) {
            (
                Some(MatchResult::Success { nodes: first, .. }),
                Some(MatchResult::Success { nodes: second, .. }),
            ) => assert!(Rc::ptr_eq(&first, &second)),
            other => panic!("expected two cached successes, got {:?}", other),
        }
    }

    #[test]
    fn replace_existing() {
        let ids = ids(1);
        let mut cache = MatchCache::new(4, 1);

        cache.insert(0, ids[0], success(1));
        cache.insert(0, ids[0], MatchResult::failure());

        assert_eq!(cache.get(0, ids[0]), Some(MatchResult::failure()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn depth_bound() {
        let ids = ids(1);
        let mut cache = MatchCache::new(3, 2);

        for position in 0..10 {
            cache.insert(position, ids[0], MatchResult::failure());
            assert!(cache.len() <= cache.capacity());
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(6, ids[0]), None);
        assert_eq!(cache.get(7, ids[0]), Some(MatchResult::failure()));
    }

    #[test]
    fn breadth_bound() {
        let ids = ids(3);
        let mut cache = MatchCache::new(3, 2);

        for &id in &ids {
            cache.insert(0, id, MatchResult::failure());
        }

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(0, ids[0]), None);
        assert_eq!(cache.get(0, ids[2]), Some(MatchResult::failure()));
    }

    #[test]
    fn disabled() {
        let ids = ids(1);
        let mut cache = MatchCache::new(0, 10);

        cache.insert(0, ids[0], MatchResult::failure());

        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 0);
    }
}
