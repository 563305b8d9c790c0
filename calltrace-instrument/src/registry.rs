use std::collections::HashSet;

use calltrace_diagnostics::fuzzy;

/// Names of the functions selected for instrumentation in the current run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetRegistry {
    names: HashSet<String>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the name was already selected
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Selected names in sorted order
    pub fn sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().cloned().collect();
        names.sort();
        names
    }

    /// "Did you mean" candidates for a name that matches no function
    pub fn suggest(name: &str, functions: &[String]) -> Vec<String> {
        fuzzy::find_similar_functions(name, functions)
    }
}

impl<S: Into<String>> FromIterator<S> for TargetRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
