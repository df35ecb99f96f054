//! Namespace tracking and name resolution.
//!
//! Tracks the current namespace and three alias tables (types,
//! functions, constants) populated by `use` declarations. Resolving a
//! bare identifier:
//!
//! 1. a leading `\` means fully qualified — strip it and stop;
//! 2. an alias hit (on the name, or on its first segment for relative
//!    qualified names) substitutes and stops;
//! 3. inside a namespace, qualify with it and keep the bare name as a
//!    global fallback so builtins and core classes stay reachable;
//! 4. at global scope the name is already resolved.

use rustc_hash::FxHashMap;

use quill_ir::{Name, StringInterner, UseKind};

/// A resolved name: the primary candidate plus an optional global
/// fallback the caller tries when the primary misses its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub primary: Name,
    pub fallback: Option<Name>,
}

impl Resolved {
    fn exact(name: Name) -> Self {
        Resolved {
            primary: name,
            fallback: None,
        }
    }
}

/// Per-program namespace state.
#[derive(Debug, Default)]
pub struct NamespaceContext {
    /// Current namespace; `Name::EMPTY` at global scope.
    current: Name,
    type_aliases: FxHashMap<Name, Name>,
    func_aliases: FxHashMap<Name, Name>,
    const_aliases: FxHashMap<Name, Name>,
}

impl NamespaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Name {
        self.current
    }

    /// Enter a `namespace Foo\Bar;` block. Alias tables reset — `use`
    /// declarations apply to the block that contains them.
    pub fn enter(&mut self, namespace: Name) {
        self.current = namespace;
        self.type_aliases.clear();
        self.func_aliases.clear();
        self.const_aliases.clear();
    }

    /// Record a `use` declaration.
    pub fn add_use(&mut self, kind: UseKind, path: Name, alias: Name) {
        self.table_mut(kind).insert(alias, path);
    }

    /// Qualify a declared name (function, class, const) with the current
    /// namespace.
    pub fn qualify(&self, name: Name, interner: &StringInterner) -> Name {
        if self.current.is_empty() {
            name
        } else {
            interner.intern(&format!(
                "{}\\{}",
                interner.lookup(self.current),
                interner.lookup(name)
            ))
        }
    }

    /// Resolve a name used in expression position.
    pub fn resolve(&self, kind: UseKind, name: Name, interner: &StringInterner) -> Resolved {
        let text = interner.lookup(name);
        if let Some(stripped) = text.strip_prefix('\\') {
            return Resolved::exact(interner.intern(stripped));
        }

        let table = self.table(kind);
        if let Some(&target) = table.get(&name) {
            return Resolved::exact(target);
        }
        // Relative qualified name: the first segment may be an alias
        // (`use App\Util; Util\helper()` — aliases are always type-kind
        // imports of a namespace or class).
        if let Some((head, rest)) = text.split_once('\\') {
            let head_name = interner.intern(head);
            if let Some(&target) = self.type_aliases.get(&head_name) {
                let joined = format!("{}\\{rest}", interner.lookup(target));
                return Resolved::exact(interner.intern(&joined));
            }
        }

        if self.current.is_empty() {
            Resolved::exact(name)
        } else {
            Resolved {
                primary: self.qualify(name, interner),
                fallback: Some(name),
            }
        }
    }

    fn table(&self, kind: UseKind) -> &FxHashMap<Name, Name> {
        match kind {
            UseKind::Type => &self.type_aliases,
            UseKind::Function => &self.func_aliases,
            UseKind::Constant => &self.const_aliases,
        }
    }

    fn table_mut(&mut self, kind: UseKind) -> &mut FxHashMap<Name, Name> {
        match kind {
            UseKind::Type => &mut self.type_aliases,
            UseKind::Function => &mut self.func_aliases,
            UseKind::Constant => &mut self.const_aliases,
        }
    }
}
