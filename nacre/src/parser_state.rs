// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use core::num::NonZeroUsize;
use core::ops::Range;

use log::{debug, trace, warn};

use crate::annotations::{Annotation, AnnotationValue};
use crate::behaviour::Kind;
use crate::cache::{Attempt, AttemptLog, MatchCache, MatchResult};
use crate::config::Config;
use crate::error::{self, Diagnostic};
use crate::grammar::{Body, Compiled, Grammar, RuleId, Shape};
use crate::ir::{IntermediateRepresentation, Production};
use crate::scanner::Scanner;
use crate::source::Source;
use crate::token::Token;

/// Why a rule did not match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Failure {
    /// The input did not match; alternatives may still be tried.
    Mismatch,
    /// The configured call limit was reached; the whole build stops.
    CallLimit,
}

/// The type returned by every matching operation.
pub type ParseResult = Result<(), Failure>;

#[derive(Debug)]
struct CallLimitTracker {
    current_call_limit: Option<(usize, usize)>,
}

impl CallLimitTracker {
    fn new(limit: Option<NonZeroUsize>) -> CallLimitTracker {
        CallLimitTracker {
            current_call_limit: limit.map(|limit| (0, limit.get())),
        }
    }

    fn limit_reached(&self) -> bool {
        self.current_call_limit
            .map_or(false, |(current, limit)| current >= limit)
    }

    fn increment_depth(&mut self) {
        if let Some((current, _)) = &mut self.current_call_limit {
            *current += 1;
        }
    }
}

// Tracks which parts of a rule's span came from skipping children so that they can be trimmed
// off the edges of the node it produces.
#[derive(Clone, Copy, Debug)]
struct Mark {
    lead: usize,
    trail: Option<(usize, usize)>,
    anchored: bool,
}

impl Mark {
    fn new(origin: usize) -> Mark {
        Mark {
            lead: origin,
            trail: None,
            anchored: false,
        }
    }

    fn skipped(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }

        if !self.anchored && start == self.lead {
            self.lead = end;
        } else {
            self.trail = match self.trail {
                Some((from, to)) if to == start => Some((from, end)),
                _ => Some((start, end)),
            };
        }
    }

    fn consumed(&mut self) {
        self.anchored = true;
        self.trail = None;
    }

    // folds in a transparent child spanning start..end whose own content is `content`
    fn absorb(&mut self, start: usize, end: usize, content: Option<Range<usize>>) {
        match content {
            Some(content) => {
                self.skipped(start, content.start);
                self.consumed();
                self.skipped(content.end, end);
            }
            None => self.skipped(start, end),
        }
    }

    fn summary(&self, end: usize) -> Option<Range<usize>> {
        if self.anchored {
            Some(self.content(end))
        } else {
            None
        }
    }

    fn content(&self, end: usize) -> Range<usize> {
        let stop = match self.trail {
            Some((from, to)) if to == end => from,
            _ => end,
        };

        self.lead..stop.max(self.lead)
    }
}

#[derive(Clone, Copy, Debug)]
struct Checkpoint {
    position: usize,
    frame_len: usize,
    errors_len: usize,
    mark: Option<Mark>,
}

#[derive(Debug, Default)]
struct Attempts {
    pos: usize,
    positives: Vec<String>,
    negatives: Vec<String>,
}

#[derive(Clone, Copy, Debug)]
struct AttemptsSnapshot {
    positives: usize,
    negatives: usize,
    count: usize,
}

impl Attempts {
    fn count_at(&self, pos: usize) -> usize {
        if pos == self.pos {
            self.positives.len() + self.negatives.len()
        } else {
            0
        }
    }

    fn snapshot(&self, pos: usize) -> AttemptsSnapshot {
        AttemptsSnapshot {
            positives: self.positives.len(),
            negatives: self.negatives.len(),
            count: self.count_at(pos),
        }
    }
}

/// The state of one build or stream over a [`Source`](struct.Source.html).
///
/// `ParserState` walks the compiled rules of a [`Grammar`](struct.Grammar.html), reporting every
/// evaluation to an [`IntermediateRepresentation`](ir/trait.IntermediateRepresentation.html).
/// Closure rules receive it to drive matching themselves.
///
/// # Examples
///
/// ```
/// # use nacre::{Grammar, Rule, Source};
/// let grammar = Grammar::builder()
///     .rule("digit", Rule::range('0', '9').token("digit"))
///     .root(Rule::closure(|state, ir| {
///         state.match_named("digit", ir)?;
///         state.match_named("digit", ir)
///     }).token("pair"))
///     .build()
///     .unwrap();
///
/// let tree = grammar.parse(&Source::new("42")).unwrap();
///
/// assert_eq!(tree.to_string(), "pair(0, 2, [digit(0, 1), digit(1, 2)])");
/// assert!(grammar.parse(&Source::new("4")).is_err());
/// ```
#[derive(Debug)]
pub struct ParserState<'g, 's> {
    grammar: &'g Grammar,
    scanner: Scanner<'s>,
    cache: Option<MatchCache>,
    marks: Vec<Mark>,
    errors: Vec<Diagnostic>,
    attempts: Attempts,
    // rule entries and exits of the current pass, kept while caching
    journal: Vec<Attempt>,
    negation: usize,
    call_tracker: CallLimitTracker,
}

impl<'g, 's> ParserState<'g, 's> {
    /// Creates a state at the start of `source`.
    pub fn new(grammar: &'g Grammar, source: &'s Source, config: &Config) -> ParserState<'g, 's> {
        ParserState {
            grammar,
            scanner: Scanner::new(source),
            cache: config.cache.map(MatchCache::with_config),
            marks: vec![],
            errors: vec![],
            attempts: Attempts::default(),
            journal: vec![],
            negation: 0,
            call_tracker: CallLimitTracker::new(config.call_limit),
        }
    }

    /// Returns the grammar being matched.
    #[inline]
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Returns the scanner.
    #[inline]
    pub fn scanner(&self) -> &Scanner<'s> {
        &self.scanner
    }

    /// Returns the scanner mutably.
    #[inline]
    pub fn scanner_mut(&mut self) -> &mut Scanner<'s> {
        &mut self.scanner
    }

    /// Returns the current position.
    #[inline]
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Returns the diagnostics collected so far.
    #[inline]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Returns the match cache, if one is configured.
    #[inline]
    pub fn cache(&self) -> Option<&MatchCache> {
        self.cache.as_ref()
    }

    /// Returns `true` once the configured call limit has been reached.
    #[inline]
    pub fn reached_call_limit(&self) -> bool {
        self.call_tracker.limit_reached()
    }

    /// Runs passes of the root rule until the source is consumed.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic describing the first pass that failed or that consumed nothing.
    pub fn parse(&mut self, ir: &mut dyn IntermediateRepresentation) -> Result<(), Diagnostic> {
        while !self.scanner.end_of_input() {
            let start = self.scanner.position();

            if let Err(failure) = self.pass(ir) {
                let diagnostic = self.diagnose(failure);
                debug!("pass starting at {} failed: {}", start, diagnostic);
                return Err(diagnostic);
            }

            if self.scanner.position() == start {
                let diagnostic = self.diagnose(Failure::Mismatch);
                debug!("pass starting at {} consumed nothing", start);
                return Err(diagnostic);
            }
        }

        Ok(())
    }

    /// Matches the root rule once at the current position.
    pub fn pass(&mut self, ir: &mut dyn IntermediateRepresentation) -> ParseResult {
        self.attempts = Attempts::default();
        self.journal.clear();
        self.marks.clear();

        self.match_rule(self.grammar.root(), ir)
    }

    /// Matches the rule `id` at the current position.
    ///
    /// On success the scanner is left after the match (or where it started, for lookahead
    /// rules). On failure it is always restored.
    pub fn match_rule(
        &mut self,
        id: RuleId,
        ir: &mut dyn IntermediateRepresentation,
    ) -> ParseResult {
        if self.call_tracker.limit_reached() {
            return Err(Failure::CallLimit);
        }
        self.call_tracker.increment_depth();

        let grammar = self.grammar;
        let rule = grammar.get(id);
        let origin = self.scanner.position();

        if let Some(cached) = self.cache.as_mut().and_then(|cache| cache.get(origin, id)) {
            trace!("reusing cached match of {} at {}", rule, origin);
            return self.replay(rule, origin, cached, ir);
        }

        trace!("matching {} at {}", rule, origin);

        let frame_len = ir.frame_len();
        let errors_len = self.errors.len();
        let journal_len = self.journal.len();
        let attempts = self.attempts.snapshot(origin);
        self.log(Attempt::Enter(origin));

        ir.evaluating(rule.token.as_ref());
        self.marks.push(Mark::new(origin));
        let result = self.repeat(rule, ir);
        let mark = self.marks.pop().unwrap_or_else(|| Mark::new(origin));

        match result {
            Ok(()) => {
                let end = self.scanner.position();
                self.succeed(rule, origin, mark, ir);

                if self.negation > 0 {
                    self.track(rule, origin, attempts, true);
                }
                self.log(Attempt::Leave {
                    rule: id,
                    negation: self.negation,
                    matched: true,
                });

                if self.cache.is_some() {
                    if let Some(nodes) = ir.contributed(frame_len) {
                        let result = MatchResult::Success {
                            end: self.scanner.position(),
                            content: mark.summary(end),
                            nodes: nodes.into(),
                            diagnostics: self.errors[errors_len..].to_vec(),
                            attempts: self.logged_since(journal_len),
                        };

                        if let Some(cache) = self.cache.as_mut() {
                            cache.insert(origin, id, result);
                        }
                    }
                }

                Ok(())
            }
            Err(Failure::Mismatch) => {
                ir.failed();
                self.scanner.set_position(origin);
                self.errors.truncate(errors_len);

                if self.negation == 0 {
                    self.track(rule, origin, attempts, false);
                }
                self.log(Attempt::Leave {
                    rule: id,
                    negation: self.negation,
                    matched: false,
                });

                if self.cache.is_some() {
                    let attempts = self.logged_since(journal_len);

                    if let Some(cache) = self.cache.as_mut() {
                        cache.insert(origin, id, MatchResult::Failure { attempts });
                    }
                }

                self.recover(rule, origin, ir)
            }
            Err(failure) => {
                ir.failed();
                self.scanner.set_position(origin);
                Err(failure)
            }
        }
    }

    /// Matches the rule defined under `name`. Unknown names never match.
    pub fn match_named(
        &mut self,
        name: &str,
        ir: &mut dyn IntermediateRepresentation,
    ) -> ParseResult {
        match self.grammar.rule_named(name) {
            Some(id) => self.match_rule(id, ir),
            None => {
                warn!("no rule is defined under {}", name);
                Err(Failure::Mismatch)
            }
        }
    }

    /// Runs `f` against the scanner, restoring the position if it returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nacre::{Grammar, Rule, Source};
    /// let grammar = Grammar::builder()
    ///     .root(Rule::closure(|state, _| state.scan(|scanner| scanner.scan_string("ab"))).token("ab"))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(grammar.parse(&Source::new("ab")).unwrap().to_string(), "ab(0, 2)");
    /// ```
    pub fn scan<F>(&mut self, f: F) -> ParseResult
    where
        F: FnOnce(&mut Scanner<'s>) -> bool,
    {
        let start = self.scanner.position();

        if f(&mut self.scanner) {
            Ok(())
        } else {
            self.scanner.set_position(start);
            Err(Failure::Mismatch)
        }
    }

    /// Describes `failure` at the furthest position any rule was attempted.
    pub fn diagnose(&self, failure: Failure) -> Diagnostic {
        let position = self.scanner.position();

        match failure {
            Failure::CallLimit => Diagnostic::new(position..position, "call limit reached"),
            Failure::Mismatch => {
                let pos = self.attempts.pos.max(position);
                let mut positives = self.attempts.positives.clone();
                let mut negatives = self.attempts.negatives.clone();
                positives.sort();
                positives.dedup();
                negatives.sort();
                negatives.dedup();

                let end = if pos < self.scanner.source().len() {
                    pos + 1
                } else {
                    pos
                };

                Diagnostic::new(
                    pos..end,
                    error::parsing_error_message(&positives, &negatives, |name| name.clone()),
                )
            }
        }
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    pub(crate) fn into_errors(self) -> Vec<Diagnostic> {
        self.errors
    }

    fn replay(
        &mut self,
        rule: &'g Compiled,
        origin: usize,
        cached: MatchResult,
        ir: &mut dyn IntermediateRepresentation,
    ) -> ParseResult {
        ir.evaluating(rule.token.as_ref());

        match cached {
            MatchResult::Success {
                end,
                content,
                nodes,
                diagnostics,
                attempts,
            } => {
                ir.restored(&nodes);
                self.scanner.set_position(end);
                self.errors.extend(diagnostics);
                self.retrace(&attempts);

                if !rule.behaviour.lookahead {
                    self.report(rule, origin, end, content);
                }

                Ok(())
            }
            MatchResult::Failure { attempts } => {
                ir.failed();
                self.retrace(&attempts);

                self.recover(rule, origin, ir)
            }
        }
    }

    fn log(&mut self, attempt: Attempt) {
        if self.cache.is_some() {
            self.journal.push(attempt);
        }
    }

    fn logged_since(&self, start: usize) -> AttemptLog {
        let negation = self.negation;

        AttemptLog::new(
            self.journal[start..]
                .iter()
                .map(|&attempt| match attempt {
                    Attempt::Leave {
                        rule,
                        negation: depth,
                        matched,
                    } => Attempt::Leave {
                        rule,
                        negation: depth.saturating_sub(negation),
                        matched,
                    },
                    enter => enter,
                })
                .collect(),
        )
    }

    // tracks every rule a cached match attempted, as if it were matched again
    fn retrace(&mut self, log: &AttemptLog) {
        let grammar = self.grammar;
        let mut open = vec![];

        for &attempt in log.iter() {
            match attempt {
                Attempt::Enter(pos) => {
                    open.push((pos, self.attempts.snapshot(pos)));
                    self.log(attempt);
                }
                Attempt::Leave {
                    rule,
                    negation,
                    matched,
                } => {
                    let negation = self.negation + negation;

                    if let Some((pos, snapshot)) = open.pop() {
                        if matched == (negation > 0) {
                            self.track(grammar.get(rule), pos, snapshot, negation > 0);
                        }
                    }

                    self.log(Attempt::Leave {
                        rule,
                        negation,
                        matched,
                    });
                }
            }
        }
    }

    fn repeat(&mut self, rule: &'g Compiled, ir: &mut dyn IntermediateRepresentation) -> ParseResult {
        let cardinality = rule.behaviour.cardinality;
        let mut matches = 0;

        while cardinality.maximum.map_or(true, |maximum| matches < maximum) {
            let checkpoint = self.checkpoint(&*ir);

            match self.iterate(rule, ir) {
                Ok(()) => matches += 1,
                Err(Failure::Mismatch) => {
                    self.restore(checkpoint, ir);
                    break;
                }
                Err(failure) => return Err(failure),
            }

            // a match that consumed nothing would match forever
            if self.scanner.position() == checkpoint.position {
                break;
            }
        }

        if cardinality.accepts(matches) {
            Ok(())
        } else {
            Err(Failure::Mismatch)
        }
    }

    fn iterate(&mut self, rule: &'g Compiled, ir: &mut dyn IntermediateRepresentation) -> ParseResult {
        if !rule.behaviour.negate {
            return self.test(rule, ir);
        }

        let checkpoint = self.checkpoint(&*ir);

        self.negation += 1;
        let result = self.test(rule, ir);
        self.negation -= 1;

        self.restore(checkpoint, ir);

        match result {
            Ok(()) => Err(Failure::Mismatch),
            Err(Failure::Mismatch) if rule.behaviour.lookahead => Ok(()),
            Err(Failure::Mismatch) => self.scanner.consume().map(|_| ()).ok_or(Failure::Mismatch),
            Err(failure) => Err(failure),
        }
    }

    fn test(&mut self, rule: &'g Compiled, ir: &mut dyn IntermediateRepresentation) -> ParseResult {
        match rule.body {
            Body::Terminal(ref terminal) => {
                if terminal.scan(&mut self.scanner) {
                    Ok(())
                } else {
                    Err(Failure::Mismatch)
                }
            }
            Body::Reference(target) | Body::Group(target) => self.match_rule(target, ir),
            Body::Shared(target) => {
                let grammar = self.grammar;
                self.test(grammar.get(target), ir)
            }
            Body::Closure(ref test) => test(self, ir),
            Body::Sequence(ref rules) => {
                for &id in rules {
                    self.match_rule(id, ir)?;
                }

                Ok(())
            }
            Body::Choice(ref rules) => {
                for &id in rules {
                    match self.match_rule(id, ir) {
                        Err(Failure::Mismatch) => continue,
                        result => return result,
                    }
                }

                Err(Failure::Mismatch)
            }
        }
    }

    fn succeed(
        &mut self,
        rule: &'g Compiled,
        origin: usize,
        mark: Mark,
        ir: &mut dyn IntermediateRepresentation,
    ) {
        let end = self.scanner.position();
        let range = mark.content(end);

        if rule.behaviour.lookahead {
            self.scanner.set_position(origin);
            ir.succeeded(Production::Discarded);
            return;
        }

        let production = match (rule.shape, &rule.token) {
            (Shape::Node, Some(token)) => Production::Node {
                token,
                annotations: &rule.annotations,
                range,
            },
            (Shape::Discarded, _) => Production::Discarded,
            _ => Production::Transparent,
        };

        ir.succeeded(production);
        self.report(rule, origin, end, mark.summary(end));
    }

    fn report(&mut self, rule: &Compiled, start: usize, end: usize, content: Option<Range<usize>>) {
        let transparent = self.is_transparent(rule);

        if let Some(parent) = self.marks.last_mut() {
            if rule.behaviour.is_skipping() {
                parent.skipped(start, end);
            } else if transparent {
                parent.absorb(start, end, content);
            } else {
                parent.consumed();
            }
        }
    }

    // scanning rules that only match through other rules pass their skipped edges on
    fn is_transparent(&self, rule: &Compiled) -> bool {
        matches!(rule.behaviour.kind, Kind::Scanning)
            && !rule.behaviour.negate
            && self.is_transparent_body(rule)
    }

    fn is_transparent_body(&self, rule: &Compiled) -> bool {
        match rule.body {
            Body::Shared(target) => self.is_transparent_body(self.grammar.get(target)),
            Body::Reference(_) | Body::Group(_) | Body::Sequence(_) | Body::Choice(_) => true,
            Body::Terminal(_) | Body::Closure(_) => false,
        }
    }

    fn recover(
        &mut self,
        rule: &'g Compiled,
        origin: usize,
        ir: &mut dyn IntermediateRepresentation,
    ) -> ParseResult {
        if !rule.annotations.pinned() {
            return Err(Failure::Mismatch);
        }

        let message = match rule.annotations.error() {
            Some(message) => message.to_owned(),
            None => format!("expected {}", self.expected(rule)),
        };

        debug!("recovering from {} at {}: {}", rule, origin, message);

        let token = Token::error();
        let annotations = rule
            .annotations
            .clone()
            .with(Annotation::Error, AnnotationValue::String(message.clone()));

        ir.evaluating(Some(&token));
        ir.succeeded(Production::Node {
            token: &token,
            annotations: &annotations,
            range: origin..origin,
        });

        if let Some(parent) = self.marks.last_mut() {
            parent.consumed();
        }
        self.errors.push(Diagnostic::new(origin..origin, message));

        Ok(())
    }

    // anonymous references are reported as what they refer to
    fn expected(&self, rule: &Compiled) -> String {
        match (&rule.token, &rule.name, &rule.body) {
            (None, None, &Body::Reference(target)) | (None, None, &Body::Shared(target)) => {
                self.expected(self.grammar.get(target))
            }
            _ => rule.expected(),
        }
    }

    fn track(
        &mut self,
        rule: &Compiled,
        pos: usize,
        snapshot: AttemptsSnapshot,
        negated: bool,
    ) {
        if rule.token.is_none() && rule.name.is_none() {
            return;
        }

        // If nested rules made no progress, there is no use to report them; it's only useful to
        // track the current rule, the exception being when only one attempt has been made during
        // the children rules.
        let current = self.attempts.count_at(pos);
        if current > snapshot.count && current - snapshot.count == 1 {
            return;
        }

        if pos == self.attempts.pos {
            self.attempts.positives.truncate(snapshot.positives);
            self.attempts.negatives.truncate(snapshot.negatives);
        }

        if pos > self.attempts.pos {
            self.attempts.positives.clear();
            self.attempts.negatives.clear();
            self.attempts.pos = pos;
        }

        if pos == self.attempts.pos {
            if negated {
                self.attempts.negatives.push(rule.expected());
            } else {
                self.attempts.positives.push(rule.expected());
            }
        }
    }

    fn checkpoint(&self, ir: &dyn IntermediateRepresentation) -> Checkpoint {
        Checkpoint {
            position: self.scanner.position(),
            frame_len: ir.frame_len(),
            errors_len: self.errors.len(),
            mark: self.marks.last().copied(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint, ir: &mut dyn IntermediateRepresentation) {
        self.scanner.set_position(checkpoint.position);
        ir.truncate(checkpoint.frame_len);
        self.errors.truncate(checkpoint.errors_len);

        if let (Some(mark), Some(top)) = (checkpoint.mark, self.marks.last_mut()) {
            *top = mark;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_limit_tracker() {
        let mut tracker = CallLimitTracker::new(NonZeroUsize::new(2));

        assert!(!tracker.limit_reached());
        tracker.increment_depth();
        tracker.increment_depth();
        assert!(tracker.limit_reached());
    }

    #[test]
    fn no_call_limit() {
        let mut tracker = CallLimitTracker::new(None);

        for _ in 0..100 {
            tracker.increment_depth();
        }

        assert!(!tracker.limit_reached());
    }

    #[test]
    fn mark_trims_leading_skips() {
        let mut mark = Mark::new(0);
        mark.skipped(0, 2);
        mark.skipped(2, 3);
        mark.consumed();

        assert_eq!(mark.content(8), 3..8);
    }

    #[test]
    fn mark_trims_trailing_skips() {
        let mut mark = Mark::new(0);
        mark.consumed();
        mark.skipped(4, 6);
        mark.skipped(6, 7);

        assert_eq!(mark.content(7), 0..4);
    }

    #[test]
    fn mark_keeps_inner_skips() {
        let mut mark = Mark::new(0);
        mark.consumed();
        mark.skipped(2, 3);
        mark.consumed();

        assert_eq!(mark.content(5), 0..5);
    }

    #[test]
    fn mark_only_skips() {
        let mut mark = Mark::new(1);
        mark.skipped(1, 4);

        assert_eq!(mark.content(4), 4..4);
    }

    #[test]
    fn mark_absorbs_transparent_children() {
        let mut mark = Mark::new(0);
        mark.absorb(0, 2, None);
        mark.absorb(2, 9, Some(3..7));

        assert_eq!(mark.content(9), 3..7);
    }

    #[test]
    fn attempts_count_only_at_their_position() {
        let attempts = Attempts {
            pos: 3,
            positives: vec!["a".to_owned()],
            negatives: vec!["b".to_owned()],
        };

        assert_eq!(attempts.count_at(3), 2);
        assert_eq!(attempts.count_at(2), 0);
    }
}
