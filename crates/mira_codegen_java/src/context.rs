use std::collections::HashSet;

/// Per-scope state threaded through expression and statement lowering.
///
/// A context owns the set of identifier names visible in its scope and a list
/// of hoisted statements: statement text that multi-statement expression
/// lowerings produced and that the enclosing statement emitter must flush
/// before the line that consumes their result.
#[derive(Debug, Clone, Default)]
pub struct GenContext {
    used_names: HashSet<String>,
    hoisted: Vec<String>,
    /// Label substituted for unlabeled breaks in this scope. Set while
    /// switch sections lower into an if-chain wrapped in a labeled block,
    /// where a bare `break` would have nothing to bind to.
    pub break_label: Option<String>,
    /// Set inside the body of a generated anonymous class, where `this`
    /// no longer refers to the enclosing declaration.
    pub in_anonymous_body: bool,
}

impl GenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child scope for a nested body: visible names carry over, hoisted
    /// statements do not.
    pub fn extend(&self) -> Self {
        Self {
            used_names: self.used_names.clone(),
            hoisted: Vec::new(),
            break_label: self.break_label.clone(),
            in_anonymous_body: self.in_anonymous_body,
        }
    }

    /// Sibling context sharing the full state, including pending hoists.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn declare_name(&mut self, name: &str) {
        self.used_names.insert(name.to_string());
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used_names.contains(name)
    }

    /// Returns `prefix` or the first `prefix{n}` not yet visible in scope,
    /// and marks it used.
    pub fn fresh_name(&mut self, prefix: &str) -> String {
        if !self.used_names.contains(prefix) {
            self.used_names.insert(prefix.to_string());
            return prefix.to_string();
        }
        let mut counter = 1usize;
        loop {
            let candidate = format!("{}{}", prefix, counter);
            if !self.used_names.contains(&candidate) {
                self.used_names.insert(candidate.clone());
                return candidate;
            }
            counter += 1;
        }
    }

    pub fn hoist(&mut self, statement: String) {
        self.hoisted.push(statement);
    }

    pub fn has_hoisted(&self) -> bool {
        !self.hoisted.is_empty()
    }

    pub fn take_hoisted(&mut self) -> Vec<String> {
        std::mem::take(&mut self.hoisted)
    }
}
