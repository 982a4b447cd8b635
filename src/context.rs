// ABOUTME: Evaluation scopes mapping names to values, with parent-chain lookup

use crate::value::Value;
use indexmap::IndexMap;
use std::rc::Rc;

/// A name→value binding scope. The root scope holds the caller-supplied
/// context; filters and quantifiers derive child scopes whose bindings
/// shadow the parent. Scopes are immutable once built; a parent is never
/// modified through its children.
#[derive(Debug)]
pub struct Scope {
    bindings: IndexMap<String, Value>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    /// Creates a root scope from caller-supplied bindings
    pub fn root(bindings: IndexMap<String, Value>) -> Rc<Self> {
        Rc::new(Scope {
            bindings,
            parent: None,
        })
    }

    /// Creates an empty root scope
    pub fn empty() -> Rc<Self> {
        Scope::root(IndexMap::new())
    }

    /// Creates a child scope whose bindings shadow the parent's
    pub fn child(parent: &Rc<Scope>, bindings: IndexMap<String, Value>) -> Rc<Self> {
        Rc::new(Scope {
            bindings,
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Looks up a name in this scope and parent scopes recursively
    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value);
        }
        self.parent.as_deref()?.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, i64)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::int(*v)))
            .collect()
    }

    #[test]
    fn test_root_lookup() {
        let scope = Scope::root(bindings(&[("x", 42)]));
        assert_eq!(scope.get("x"), Some(&Value::int(42)));
        assert_eq!(scope.get("y"), None);
    }

    #[test]
    fn test_shadowing() {
        let parent = Scope::root(bindings(&[("x", 42)]));
        let child = Scope::child(&parent, bindings(&[("x", 100)]));
        assert_eq!(child.get("x"), Some(&Value::int(100)));
        assert_eq!(parent.get("x"), Some(&Value::int(42)));
    }

    #[test]
    fn test_parent_lookup() {
        let parent = Scope::root(bindings(&[("x", 42)]));
        let child = Scope::child(&parent, IndexMap::new());
        assert_eq!(child.get("x"), Some(&Value::int(42)));
    }

    #[test]
    fn test_multiple_levels() {
        let grandparent = Scope::root(bindings(&[("a", 1)]));
        let parent = Scope::child(&grandparent, bindings(&[("b", 2)]));
        let child = Scope::child(&parent, bindings(&[("c", 3)]));
        assert_eq!(child.get("a"), Some(&Value::int(1)));
        assert_eq!(child.get("b"), Some(&Value::int(2)));
        assert_eq!(child.get("c"), Some(&Value::int(3)));
    }
}
