use crate::ast::Identifier;
use rustc_hash::FxHashSet;

/// Lexical scope kinds. `break` frees up to the nearest [ScopeKind::Loop]
/// scope; `return` frees up to the enclosing [ScopeKind::Function] scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ScopeKind {
    Function,
    Loop,
    Block,
}

#[derive(Debug)]
struct Local {
    name: Identifier,
    struct_name: Identifier,
    owned: bool,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    locals: Vec<Local>,
}

/// Stack of struct-typed locals and their ownership state, mirroring the
/// lexical scopes of the program being generated. Declaration order is kept
/// so frees can be emitted in reverse.
#[derive(Debug, Default)]
pub(super) struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn enter(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope {
            kind,
            locals: Vec::new(),
        });
    }

    /// Pops the innermost scope, returning its still-owned locals as
    /// (variable, struct name) pairs in reverse declaration order.
    pub fn exit(&mut self) -> Vec<(Identifier, Identifier)> {
        let scope = self
            .scopes
            .pop()
            .expect("scope stack is never empty while generating");
        scope
            .locals
            .into_iter()
            .rev()
            .filter(|local| local.owned)
            .map(|local| (local.name, local.struct_name))
            .collect()
    }

    pub fn declare(&mut self, name: Identifier, struct_name: Identifier, owned: bool) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty while generating")
            .locals
            .push(Local {
                name,
                struct_name,
                owned,
            });
    }

    pub fn mark_moved(&mut self, name: &str) {
        if let Some(local) = self.local_mut(name) {
            local.owned = false;
        }
    }

    pub fn set_owned(&mut self, name: &str, owned: bool) {
        if let Some(local) = self.local_mut(name) {
            local.owned = owned;
        }
    }

    pub fn is_owned(&self, name: &str) -> bool {
        self.local(name).is_some_and(|local| local.owned)
    }

    /// Whether the binding `name` resolves to was declared in the
    /// innermost scope.
    pub fn in_innermost(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.locals.iter().any(|local| local.name == name))
    }

    pub fn struct_name(&self, name: &str) -> Option<Identifier> {
        self.local(name).map(|local| local.struct_name.clone())
    }

    pub fn pending_at_return(&self, escaping: Option<&str>) -> Vec<(Identifier, Identifier)> {
        self.pending_until(ScopeKind::Function, escaping)
    }

    pub fn pending_at_break(&self) -> Vec<(Identifier, Identifier)> {
        self.pending_until(ScopeKind::Loop, None)
    }

    /// Owned locals of every scope from the innermost up to and including
    /// the nearest `stop` scope, inside-out and in reverse declaration
    /// order. A name shadowed at the emit site cannot be referenced there,
    /// so only the innermost binding of each name is considered.
    fn pending_until(
        &self,
        stop: ScopeKind,
        escaping: Option<&str>,
    ) -> Vec<(Identifier, Identifier)> {
        let mut seen: FxHashSet<&str> = escaping.into_iter().collect();
        let mut frees = Vec::new();
        for scope in self.scopes.iter().rev() {
            for local in scope.locals.iter().rev() {
                if seen.insert(local.name.as_str()) && local.owned {
                    frees.push((local.name.clone(), local.struct_name.clone()));
                }
            }
            if scope.kind == stop {
                break;
            }
        }
        frees
    }

    fn local(&self, name: &str) -> Option<&Local> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.locals.iter().rev().find(|local| local.name == name))
    }

    fn local_mut(&mut self, name: &str) -> Option<&mut Local> {
        self.scopes.iter_mut().rev().find_map(|scope| {
            scope
                .locals
                .iter_mut()
                .rev()
                .find(|local| local.name == name)
        })
    }
}
