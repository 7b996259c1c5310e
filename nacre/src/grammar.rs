// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use alloc::collections::btree_map::BTreeMap;
use core::fmt;

use crate::annotations::Annotations;
use crate::behaviour::{Behaviour, Kind};
use crate::config::Config;
use crate::constructor::AbstractSyntaxTreeConstructor;
use crate::error::{ConstructionError, GrammarError};
use crate::node::Node;
use crate::rule::{Expression, Rule, Terminal, Test};
use crate::source::Source;
use crate::stream::TokenStream;
use crate::token::Token;

/// Identifies a compiled rule occurrence inside a [`Grammar`](struct.Grammar.html).
///
/// Ids are the keys of the match cache, so two occurrences share cached results only when they
/// share an id.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RuleId(usize);

impl RuleId {
    /// Returns the index of the rule in its grammar.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> RuleId {
        RuleId(index)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Shape {
    Node,
    Transparent,
    Discarded,
}

#[derive(Clone)]
pub(crate) enum Body {
    Terminal(Terminal),
    // full match of the target
    Reference(RuleId),
    // the target's test under this entry's behaviour and annotations
    Shared(RuleId),
    Closure(Test),
    Sequence(Vec<RuleId>),
    Choice(Vec<RuleId>),
    Group(RuleId),
}

pub(crate) struct Compiled {
    pub(crate) name: Option<String>,
    pub(crate) description: String,
    pub(crate) behaviour: Behaviour,
    pub(crate) annotations: Annotations,
    pub(crate) token: Option<Token>,
    pub(crate) shape: Shape,
    pub(crate) body: Body,
}

impl Compiled {
    fn new(rule: &Rule, body: Body) -> Compiled {
        Compiled {
            name: None,
            description: rule.to_string(),
            behaviour: rule.behaviour().clone(),
            annotations: rule.annotations().clone(),
            token: None,
            shape: Shape::Transparent,
            body,
        }
    }

    fn finish(&mut self) {
        self.token = self.behaviour.token().map(|token| match self.annotations.token() {
            Some(name) => token.renamed(name),
            None => token.clone(),
        });

        self.shape = match self.behaviour.kind {
            Kind::Structural(_) if self.annotations.void() => Shape::Discarded,
            Kind::Structural(_) if self.annotations.transient() => Shape::Transparent,
            Kind::Structural(_) => Shape::Node,
            Kind::Scanning => Shape::Transparent,
            Kind::Skipping => Shape::Discarded,
        };
    }

    /// What the rule is reported as in diagnostics.
    pub(crate) fn expected(&self) -> String {
        match (&self.token, &self.name) {
            (Some(token), _) => token.name().to_owned(),
            (None, Some(name)) => name.clone(),
            (None, None) => self.description.clone(),
        }
    }
}

impl fmt::Display for Compiled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(ref name) => write!(f, "{}", name),
            None => write!(f, "{}", self.description),
        }
    }
}

impl fmt::Debug for Compiled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiled")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// A validated set of rules ready to parse sources.
///
/// Grammars are built with a [`GrammarBuilder`](struct.GrammarBuilder.html), which resolves
/// references by name, checks every behaviour and rejects left-recursive rules.
///
/// # Examples
///
/// ```
/// # use nacre::{CharacterSet, Grammar, Rule, Source};
/// let grammar = Grammar::builder()
///     .rule("word", Rule::set(CharacterSet::Letters).one_or_more().token("word"))
///     .root(Rule::reference("word"))
///     .build()
///     .unwrap();
///
/// let tree = grammar.parse(&Source::new("Hello")).unwrap();
///
/// assert_eq!(tree.to_string(), "word(0, 5)");
/// ```
pub struct Grammar {
    rules: Vec<Compiled>,
    names: BTreeMap<String, RuleId>,
    root: RuleId,
}

impl Grammar {
    /// Starts building a grammar.
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    /// Returns the id of the root rule.
    #[inline]
    pub fn root(&self) -> RuleId {
        self.root
    }

    /// Returns the id of the rule defined under `name`.
    pub fn rule_named(&self, name: &str) -> Option<RuleId> {
        self.names.get(name).copied()
    }

    /// Returns the number of compiled rule occurrences.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the grammar holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns a description of a rule occurrence.
    pub fn describe(&self, id: RuleId) -> Option<String> {
        self.rules.get(id.0).map(|rule| rule.description.clone())
    }

    /// Builds a tree from `source` with the default configuration.
    pub fn parse(&self, source: &Source) -> Result<Node, ConstructionError> {
        AbstractSyntaxTreeConstructor::new(self).build(source)
    }

    /// Builds a tree from `source` with `config`.
    pub fn parse_with(&self, source: &Source, config: Config) -> Result<Node, ConstructionError> {
        AbstractSyntaxTreeConstructor::with_config(self, config).build(source)
    }

    /// Returns a lazy stream of the top-level nodes of `source`.
    pub fn stream<'g, 's>(&'g self, source: &'s Source) -> TokenStream<'g, 's> {
        TokenStream::new(self, source)
    }

    #[inline]
    pub(crate) fn get(&self, id: RuleId) -> &Compiled {
        &self.rules[id.0]
    }

    fn check_left_recursion(&self) -> Result<(), GrammarError> {
        let mut definitions: Vec<_> = self.names.values().copied().collect();
        definitions.sort();

        for id in definitions {
            let mut trace = vec![id];

            if let Some(chain) = self.left_recursive(id, &mut trace) {
                let chain: Vec<_> = chain
                    .iter()
                    .filter_map(|&id| self.get(id).name.clone())
                    .collect();

                return Err(GrammarError::LeftRecursion {
                    rule: self.get(id).name.clone().unwrap_or_default(),
                    chain: chain.join(" -> "),
                });
            }
        }

        Ok(())
    }

    fn left_recursive(&self, id: RuleId, trace: &mut Vec<RuleId>) -> Option<Vec<RuleId>> {
        match self.get(id).body {
            Body::Reference(target) | Body::Shared(target) => {
                if target == trace[0] {
                    let mut chain = trace.clone();
                    chain.push(target);
                    return Some(chain);
                }
                if trace.contains(&target) {
                    return None;
                }

                trace.push(target);
                let chain = self.left_recursive(target, trace);
                trace.pop();

                chain
            }
            Body::Group(inner) => self.left_recursive(inner, trace),
            Body::Sequence(ref rules) => {
                for &rule in rules {
                    if let Some(chain) = self.left_recursive(rule, trace) {
                        return Some(chain);
                    }
                    if !self.is_nullable(rule, &mut vec![]) {
                        break;
                    }
                }

                None
            }
            Body::Choice(ref rules) => rules
                .iter()
                .find_map(|&rule| self.left_recursive(rule, trace)),
            Body::Terminal(_) | Body::Closure(_) => None,
        }
    }

    // whether the rule can succeed without consuming anything
    fn is_nullable(&self, id: RuleId, trace: &mut Vec<RuleId>) -> bool {
        let rule = self.get(id);

        if rule.behaviour.cardinality.is_optional()
            || rule.behaviour.lookahead
            || rule.annotations.pinned()
        {
            return true;
        }
        if rule.behaviour.negate {
            return false;
        }

        match rule.body {
            Body::Terminal(ref terminal) => terminal.can_be_empty(),
            Body::Reference(target) | Body::Shared(target) => {
                if trace.contains(&target) {
                    return false;
                }

                trace.push(target);
                let nullable = self.is_nullable(target, trace);
                trace.pop();

                nullable
            }
            Body::Group(inner) => self.is_nullable(inner, trace),
            Body::Sequence(ref rules) => rules.iter().all(|&rule| self.is_nullable(rule, trace)),
            Body::Choice(ref rules) => rules.iter().any(|&rule| self.is_nullable(rule, trace)),
            Body::Closure(_) => false,
        }
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("rules", &self.names.keys().collect::<Vec<_>>())
            .field("root", &self.get(self.root).description)
            .finish()
    }
}

/// Collects named rules and a root rule into a [`Grammar`](struct.Grammar.html).
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    definitions: Vec<(String, Rule)>,
    root: Option<Rule>,
}

impl GrammarBuilder {
    /// Defines `rule` under `name` so that references can reach it.
    pub fn rule(mut self, name: &str, rule: Rule) -> GrammarBuilder {
        self.definitions.push((name.to_owned(), rule));
        self
    }

    /// Sets the rule every parsing pass starts from.
    pub fn root(mut self, rule: Rule) -> GrammarBuilder {
        self.root = Some(rule);
        self
    }

    /// Sets several root rules; each pass matches the first one that succeeds.
    pub fn roots(self, rules: Vec<Rule>) -> GrammarBuilder {
        self.root(Rule::choice(rules))
    }

    /// Sets a root that matches every rule of `rules` in order.
    pub fn root_sequence(self, rules: Vec<Rule>) -> GrammarBuilder {
        self.root(Rule::sequence(rules))
    }

    /// Resolves and validates the rules.
    ///
    /// # Errors
    ///
    /// Fails on a missing root, duplicate or undefined names, invalid behaviours or
    /// cardinalities and left recursion.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let root = self.root.ok_or(GrammarError::MissingRoot)?;
        let mut compiler = Compiler::default();

        for (name, rule) in &self.definitions {
            if compiler.names.contains_key(name) {
                return Err(GrammarError::DuplicateRule(name.clone()));
            }

            let id = RuleId(compiler.rules.len());
            compiler.names.insert(name.clone(), id);
            compiler
                .rules
                .push(Compiled::new(rule, Body::Sequence(vec![])));
        }

        for (index, (name, rule)) in self.definitions.iter().enumerate() {
            let mut compiled = compiler.lower(rule)?;
            compiled.name = Some(name.clone());
            compiler.rules[index] = compiled;
        }

        let root = compiler.push(&root)?;
        compiler.resolve_substitutions();

        for rule in &mut compiler.rules {
            rule.finish();
        }

        let grammar = Grammar {
            rules: compiler.rules,
            names: compiler.names,
            root,
        };

        grammar.check_left_recursion()?;

        Ok(grammar)
    }
}

#[derive(Default)]
struct Compiler {
    rules: Vec<Compiled>,
    names: BTreeMap<String, RuleId>,
    substitutions: Vec<(RuleId, RuleId, Option<Behaviour>, Option<Annotations>)>,
}

impl Compiler {
    fn push(&mut self, rule: &Rule) -> Result<RuleId, GrammarError> {
        let compiled = self.lower(rule)?;
        self.rules.push(compiled);

        Ok(RuleId(self.rules.len() - 1))
    }

    fn lower(&mut self, rule: &Rule) -> Result<Compiled, GrammarError> {
        rule.behaviour()
            .check()
            .map_err(|reason| GrammarError::InvalidBehaviour {
                rule: rule.to_string(),
                reason,
            })?;

        let body = match *rule.expression() {
            Expression::Terminal(ref terminal) => Body::Terminal(terminal.clone()),
            Expression::Reference {
                ref name,
                ref behaviour,
                ref annotations,
            } => {
                let target = *self
                    .names
                    .get(name)
                    .ok_or_else(|| GrammarError::UndefinedRule(name.clone()))?;

                if behaviour.is_none() && annotations.is_none() {
                    Body::Reference(target)
                } else {
                    if let Some(behaviour) = behaviour {
                        behaviour
                            .check()
                            .map_err(|reason| GrammarError::InvalidBehaviour {
                                rule: name.clone(),
                                reason,
                            })?;
                    }

                    let mut substitute = Compiled::new(rule, Body::Shared(target));
                    substitute.description = name.clone();
                    let id = RuleId(self.rules.len());
                    self.rules.push(substitute);
                    self.substitutions
                        .push((id, target, behaviour.clone(), annotations.clone()));

                    Body::Reference(id)
                }
            }
            Expression::Closure(ref test) => Body::Closure(test.clone()),
            Expression::Sequence(ref rules) => Body::Sequence(self.push_all(rules)?),
            Expression::Choice(ref rules) => Body::Choice(self.push_all(rules)?),
            Expression::Group(ref inner) => Body::Group(self.push(inner)?),
        };

        Ok(Compiled::new(rule, body))
    }

    fn push_all(&mut self, rules: &[Rule]) -> Result<Vec<RuleId>, GrammarError> {
        rules.iter().map(|rule| self.push(rule)).collect()
    }

    // substituted occurrences inherit whatever half the reference left unspecified, which is
    // only known once every definition has been lowered
    fn resolve_substitutions(&mut self) {
        for (id, target, behaviour, annotations) in self.substitutions.drain(..) {
            let behaviour = behaviour.unwrap_or_else(|| self.rules[target.0].behaviour.clone());
            let annotations =
                annotations.unwrap_or_else(|| self.rules[target.0].annotations.clone());

            let substitute = &mut self.rules[id.0];
            substitute.behaviour = behaviour;
            substitute.annotations = annotations;
        }
    }
}
