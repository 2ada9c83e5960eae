//! Placeholder tokens and the per-invocation registry behind them.

use std::cell::Cell;

use rustc_hash::FxHashMap;

use crate::ctxt::StructuralRole;
use crate::syntax::{Node, Span};

/// Source of fresh ids for placeholder tokens.
pub trait IdGenerator {
    fn fresh_id(&self) -> String;
}

/// Collision-resistant random ids from `cuid2`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cuid2Ids;

impl IdGenerator for Cuid2Ids {
    fn fresh_id(&self) -> String {
        cuid2::create_id()
    }
}

/// Deterministic ids: `__tsc0`, `__tsc1`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn fresh_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("__tsc{n}")
    }
}

/// A substitution waiting to be spliced back in.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// The substitution invoked with the implicit parameter.
    pub payload: Node,
    pub role: StructuralRole,
    /// Span of the substitution in its file.
    pub span: Span,
}

/// Token → placeholder map for one invocation. Entries are taken at most once.
#[derive(Debug, Default)]
pub struct PlaceholderRegistry {
    entries: FxHashMap<String, Placeholder>,
}

/// Draws before giving up on the generator and disambiguating by suffix.
const MAX_DRAWS: usize = 16;

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws a token that is a legal identifier, is not registered yet and
    /// does not occur in `text`.
    pub fn fresh_token(&self, ids: &dyn IdGenerator, text: &str) -> String {
        let is_free = |token: &str| !self.entries.contains_key(token) && !text.contains(token);
        let mut token = sanitize(&ids.fresh_id());
        for _ in 1..MAX_DRAWS {
            if is_free(&token) {
                return token;
            }
            token = sanitize(&ids.fresh_id());
        }
        let mut suffix = 0usize;
        loop {
            let candidate = format!("{token}_{suffix}");
            if is_free(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    pub fn insert(&mut self, token: String, placeholder: Placeholder) {
        debug_assert!(!self.entries.contains_key(&token));
        self.entries.insert(token, placeholder);
    }

    pub fn get(&self, token: &str) -> Option<&Placeholder> {
        self.entries.get(token)
    }

    /// Removes and returns the entry for `token`.
    pub fn take(&mut self, token: &str) -> Option<Placeholder> {
        self.entries.remove(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries never taken, in source order.
    pub fn remaining(&self) -> Vec<(&str, &Placeholder)> {
        let mut remaining: Vec<_> = self
            .entries
            .iter()
            .map(|(token, placeholder)| (token.as_str(), placeholder))
            .collect();
        remaining.sort_by_key(|(_, placeholder)| placeholder.span.start);
        remaining
    }
}

/// Strips characters that cannot appear in an identifier and makes sure the
/// result starts with a letter or `_`.
fn sanitize(id: &str) -> String {
    let mut token: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if !token.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        token.insert(0, '_');
    }
    token
}
