//! Lexical scope tracking shared by both traversal passes.

/// What opened a scope frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Class,
    Function,
}

#[derive(Debug, Clone)]
struct Frame {
    fqn: String,
    kind: ScopeKind,
    /// First parameter of a function frame (`self` for most methods).
    receiver: Option<String>,
}

/// Stack of enclosing scopes: module → class → function, nested freely.
///
/// Each frame caches its full FQN so lookups never re-join the stack.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// Start a stack rooted at a module FQN.
    pub fn new(module_fqn: &str) -> Self {
        Self {
            frames: vec![Frame {
                fqn: module_fqn.to_string(),
                kind: ScopeKind::Module,
                receiver: None,
            }],
        }
    }

    /// FQN of the innermost scope.
    pub fn current_fqn(&self) -> &str {
        self.frames
            .last()
            .map(|f| f.fqn.as_str())
            .unwrap_or_default()
    }

    /// FQN a definition named `name` would get in the current scope.
    pub fn child_fqn(&self, name: &str) -> String {
        format!("{}.{}", self.current_fqn(), name)
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.frames
            .last()
            .map(|f| f.kind)
            .unwrap_or(ScopeKind::Module)
    }

    pub fn push_class(&mut self, name: &str) {
        let fqn = self.child_fqn(name);
        self.frames.push(Frame {
            fqn,
            kind: ScopeKind::Class,
            receiver: None,
        });
    }

    pub fn push_function(&mut self, name: &str, receiver: Option<String>) {
        let fqn = self.child_fqn(name);
        self.frames.push(Frame {
            fqn,
            kind: ScopeKind::Function,
            receiver,
        });
    }

    /// Pop the innermost frame. The module frame is never popped.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// If the innermost scope is a method, its class FQN and receiver name.
    pub fn enclosing_method(&self) -> Option<(&str, &str)> {
        let n = self.frames.len();
        if n < 2 {
            return None;
        }
        let function = &self.frames[n - 1];
        let class = &self.frames[n - 2];
        match (function.kind, class.kind, function.receiver.as_deref()) {
            (ScopeKind::Function, ScopeKind::Class, Some(receiver)) => {
                Some((class.fqn.as_str(), receiver))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqn_tracks_nesting() {
        let mut scopes = ScopeStack::new("pkg.mod");
        assert_eq!(scopes.current_fqn(), "pkg.mod");

        scopes.push_class("Service");
        scopes.push_function("run", Some("self".into()));
        assert_eq!(scopes.current_fqn(), "pkg.mod.Service.run");
        assert_eq!(scopes.child_fqn("inner"), "pkg.mod.Service.run.inner");
        assert_eq!(
            scopes.enclosing_method(),
            Some(("pkg.mod.Service", "self"))
        );

        for _ in 0..4 {
            scopes.pop();
        }
        assert_eq!(scopes.current_fqn(), "pkg.mod");
        assert_eq!(scopes.current_kind(), ScopeKind::Module);
    }

    #[test]
    fn test_nested_function_is_not_a_method() {
        let mut scopes = ScopeStack::new("m");
        scopes.push_class("C");
        assert_eq!(scopes.current_kind(), ScopeKind::Class);
        assert_eq!(scopes.enclosing_method(), None);

        scopes.push_function("method", Some("self".into()));
        assert_eq!(scopes.enclosing_method(), Some(("m.C", "self")));

        scopes.push_function("inner", None);
        assert_eq!(scopes.current_fqn(), "m.C.method.inner");
        assert_eq!(scopes.enclosing_method(), None);
    }
}
