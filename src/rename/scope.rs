//! Used-name accumulator for one renaming batch.

use rustc_hash::FxHashSet;

/// Whether two names collide when they differ only by case.
///
/// Matches the *target* language's identifier rules: converting into a
/// case-insensitive language means `Value` and `value` are the same name.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    pub fn fold(self, name: &str) -> String {
        match self {
            CaseSensitivity::Sensitive => name.to_string(),
            CaseSensitivity::Insensitive => name.to_lowercase(),
        }
    }
}

/// Names already claimed within one scope of one renaming batch.
///
/// Explicitly single-threaded: the resolver takes `&mut NameScope` and runs
/// sequentially even while document conversion around it is parallel.
pub struct NameScope {
    case: CaseSensitivity,
    used: FxHashSet<String>,
}

impl NameScope {
    pub fn new(case: CaseSensitivity) -> Self {
        Self {
            case,
            used: FxHashSet::default(),
        }
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(&self.case.fold(name))
    }

    /// Claims a name. Returns false if it was already taken.
    pub fn claim(&mut self, name: &str) -> bool {
        self.used.insert(self.case.fold(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insensitive_scope_folds_case() {
        let mut scope = NameScope::new(CaseSensitivity::Insensitive);
        assert!(scope.claim("Widget"));
        assert!(scope.contains("widget"));
        assert!(!scope.claim("WIDGET"));
    }

    #[test]
    fn sensitive_scope_keeps_case_distinct() {
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        assert!(scope.claim("Widget"));
        assert!(!scope.contains("widget"));
        assert!(scope.claim("widget"));
    }
}
