//! The tree-walking interpreter.
//!
//! One [`Interpreter`] owns everything mutable about one execution unit:
//! the global environment, the call-frame stack, the class/function/
//! constant registries, namespace state, the output handle, and the
//! generator collector stack. Nothing is process-global, so independent
//! interpreter instances coexist (and may run on different threads).
//!
//! # Module layout
//!
//! - `stmt` — statement dispatch and control-signal consumption
//! - `expr` — expression dispatch and operator plumbing
//! - `lvalue` — the generic assign-to-lvalue paths
//! - `call` — function/method/closure dispatch, the generator runner
//! - `decl` — declaration execution (functions, classes, interfaces,
//!   traits, constants)

mod call;
mod decl;
mod expr;
mod lvalue;
mod stmt;

use std::rc::Rc;

use rustc_hash::FxHashMap;

use quill_ir::{Name, Program, StringInterner};

use crate::builtins::BuiltinRegistry;
use crate::classes::{bootstrap, ClassId, ClassRegistry, CoreClasses, FunctionInfo};
use crate::environment::Environment;
use crate::namespace::NamespaceContext;
use crate::output::{stdout_output, SharedOutput};
use crate::signal::{EvalError, Signal};
use crate::value::{ArrayKey, ObjRef, Value};

/// Call frames deeper than this fail with an evaluator error instead of
/// exhausting the host stack.
const MAX_CALL_DEPTH: usize = 1024;

/// Pre-interned magic-method and keyword names.
///
/// Interned once at construction so dispatch-path checks are single
/// `u32` compares instead of string lookups.
#[derive(Clone, Copy)]
pub(crate) struct MagicNames {
    pub construct: Name,
    pub get: Name,
    pub set: Name,
    pub call: Name,
    pub invoke: Name,
    pub to_string: Name,
    pub isset: Name,
    pub unset: Name,
    pub clone: Name,
    /// The `$this` variable.
    pub this: Name,
}

impl MagicNames {
    fn new(interner: &StringInterner) -> Self {
        MagicNames {
            construct: interner.intern("__construct"),
            get: interner.intern("__get"),
            set: interner.intern("__set"),
            call: interner.intern("__call"),
            invoke: interner.intern("__invoke"),
            to_string: interner.intern("__toString"),
            isset: interner.intern("__isset"),
            unset: interner.intern("__unset"),
            clone: interner.intern("__clone"),
            this: interner.intern("this"),
        }
    }
}

/// Which magic hook a guard entry belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum MagicKind {
    Get,
    Set,
    Isset,
    Unset,
}

/// One call frame: fresh variable table plus the method-context anchors.
pub(crate) struct Frame {
    pub env: Environment,
    pub this: Option<ObjRef>,
    /// Lexical class, for visibility checks and `self::`.
    pub class: Option<ClassId>,
    /// Late-static-binding target (`static::`): the class the call was
    /// dispatched through, not the one that declared the method.
    pub static_class: Option<ClassId>,
}

/// Sequence collector for one running generator call.
pub(crate) struct SeqCollector {
    entries: Vec<(ArrayKey, Value)>,
    next_key: i64,
}

impl SeqCollector {
    pub(crate) fn new() -> Self {
        SeqCollector {
            entries: Vec::new(),
            next_key: 0,
        }
    }

    /// `yield $v` — auto-incrementing int key.
    pub(crate) fn push_auto(&mut self, value: Value) {
        self.entries.push((ArrayKey::Int(self.next_key), value));
        self.next_key = self.next_key.saturating_add(1);
    }

    /// `yield $k => $v` — an int key bumps the auto counter past it.
    pub(crate) fn push_keyed(&mut self, key: ArrayKey, value: Value) {
        if let ArrayKey::Int(i) = key {
            if i >= self.next_key {
                self.next_key = i.saturating_add(1);
            }
        }
        self.entries.push((key, value));
    }

    pub(crate) fn into_entries(self) -> Vec<(ArrayKey, Value)> {
        self.entries
    }
}

/// How a program run ended.
#[derive(Debug)]
pub enum Halt {
    /// Ran to completion; the value is the last statement's result.
    Complete(Value),
    /// `exit`/`die` unwound to the top.
    Exit {
        status: i64,
        message: Option<Rc<str>>,
    },
    /// An exception reached the top level uncaught.
    UncaughtException { message: String, value: Value },
    /// A terminal evaluator error.
    Fatal(EvalError),
}

/// Tree-walking evaluator for one program.
pub struct Interpreter<'p> {
    program: &'p Program,
    globals: Environment,
    frames: Vec<Frame>,
    registry: ClassRegistry,
    core: CoreClasses,
    functions: FxHashMap<Name, Rc<FunctionInfo>>,
    constants: FxHashMap<Name, Value>,
    builtins: BuiltinRegistry,
    namespace: NamespaceContext,
    output: SharedOutput,
    collectors: Vec<SeqCollector>,
    names: MagicNames,
    /// In-flight magic-method calls, keyed by instance and property.
    /// Prevents `__get`/`__set`/`__isset`/`__unset` from re-entering
    /// themselves when their bodies touch the same property — the
    /// access falls through to the direct path instead.
    magic_stack: Vec<(usize, Name, MagicKind)>,
}

impl<'p> Interpreter<'p> {
    /// Interpreter writing to stdout.
    pub fn new(program: &'p Program) -> Self {
        Self::with_output(program, stdout_output())
    }

    /// Interpreter writing to the given output handle.
    pub fn with_output(program: &'p Program, output: SharedOutput) -> Self {
        let interner = &program.interner;
        let mut registry = ClassRegistry::new();
        let core = bootstrap(&mut registry, interner);
        Interpreter {
            program,
            globals: Environment::new(),
            frames: Vec::new(),
            registry,
            core,
            functions: FxHashMap::default(),
            constants: FxHashMap::default(),
            builtins: BuiltinRegistry::standard(interner),
            namespace: NamespaceContext::new(),
            output,
            collectors: Vec::new(),
            names: MagicNames::new(interner),
            magic_stack: Vec::new(),
        }
    }

    /// Run the program to a [`Halt`].
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self) -> Halt {
        match self.exec_block(self.program.body) {
            Ok(value) => Halt::Complete(value),
            Err(Signal::Return(value)) => Halt::Complete(value),
            Err(Signal::Exit { status, message }) => Halt::Exit { status, message },
            Err(Signal::Thrown(value)) => {
                let message = self.exception_message(&value);
                Halt::UncaughtException { message, value }
            }
            Err(Signal::Error(err)) => Halt::Fatal(err),
            Err(Signal::Break(_) | Signal::Continue(_)) => Halt::Fatal(crate::signal::internal(
                "break/continue escaped all enclosing loops",
            )),
        }
    }

    /// Best-effort message for an uncaught exception report.
    fn exception_message(&self, value: &Value) -> String {
        if let Value::Object(obj) = value {
            let message_name = self.interner().intern("message");
            if let Some(Value::Str(s)) = obj.borrow().props.get(message_name) {
                return s.to_string();
            }
        }
        String::from("(no message)")
    }

    // Accessors shared across the submodules and the builtin catalog.

    pub fn interner(&self) -> &'p StringInterner {
        &self.program.interner
    }

    pub(crate) fn program(&self) -> &'p Program {
        self.program
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ClassRegistry {
        &mut self.registry
    }

    pub(crate) fn names(&self) -> &MagicNames {
        &self.names
    }

    pub(crate) fn core(&self) -> CoreClasses {
        self.core
    }

    pub fn output(&self) -> &SharedOutput {
        &self.output
    }

    pub(crate) fn write_output(&self, s: &str) {
        self.output.write(s);
    }

    /// A name is callable as a function: builtin or user-defined.
    pub(crate) fn function_exists(&self, name: Name) -> bool {
        self.builtins.contains(name) || self.functions.contains_key(&name)
    }

    /// Read a global variable by source name (test and driver surface).
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(self.interner().intern(name))
    }

    // Environment plumbing. The current scope is the innermost frame,
    // or the globals when the frame stack is empty (top-level code).

    pub(crate) fn env(&self) -> &Environment {
        self.frames.last().map_or(&self.globals, |f| &f.env)
    }

    pub(crate) fn env_mut(&mut self) -> &mut Environment {
        self.frames.last_mut().map_or(&mut self.globals, |f| &mut f.env)
    }

    /// `global $name;` — alias the local name to the global slot.
    pub(crate) fn import_global(&mut self, name: Name) {
        let slot = self.globals.slot(name);
        if let Some(frame) = self.frames.last_mut() {
            frame.env.link(name, slot);
        }
    }

    pub(crate) fn current_this(&self) -> Option<ObjRef> {
        self.frames.last().and_then(|f| f.this.clone())
    }

    /// The lexical class context for visibility checks.
    pub(crate) fn current_class(&self) -> Option<ClassId> {
        self.frames.last().and_then(|f| f.class)
    }

    pub(crate) fn current_static_class(&self) -> Option<ClassId> {
        self.frames.last().and_then(|f| f.static_class)
    }

    // Frame and collector stacks.

    pub(crate) fn push_frame(&mut self, frame: Frame) -> Result<(), Signal> {
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(crate::signal::internal("maximum call depth exceeded").into());
        }
        self.frames.push(frame);
        Ok(())
    }

    pub(crate) fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Try to enter a magic hook for `(instance, property)`. `false`
    /// means the hook is already running for that key and the caller
    /// must use the direct path.
    pub(crate) fn magic_enter(&mut self, obj: &ObjRef, name: Name, kind: MagicKind) -> bool {
        let key = (Rc::as_ptr(obj).cast::<()>() as usize, name, kind);
        if self.magic_stack.contains(&key) {
            return false;
        }
        self.magic_stack.push(key);
        true
    }

    pub(crate) fn magic_exit(&mut self) {
        self.magic_stack.pop();
    }

    pub(crate) fn push_collector(&mut self) {
        self.collectors.push(SeqCollector::new());
    }

    pub(crate) fn pop_collector(&mut self) -> Option<SeqCollector> {
        self.collectors.pop()
    }

    pub(crate) fn collector_mut(&mut self) -> Option<&mut SeqCollector> {
        self.collectors.last_mut()
    }

    pub(crate) fn namespace(&self) -> &NamespaceContext {
        &self.namespace
    }

    pub(crate) fn namespace_mut(&mut self) -> &mut NamespaceContext {
        &mut self.namespace
    }

    pub(crate) fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }

    pub(crate) fn user_function(&self, name: Name) -> Option<Rc<FunctionInfo>> {
        self.functions.get(&name).cloned()
    }

    pub(crate) fn define_function(
        &mut self,
        name: Name,
        info: Rc<FunctionInfo>,
    ) -> Result<(), Signal> {
        if self.functions.contains_key(&name) {
            return Err(crate::signal::invalid_declaration(format!(
                "cannot redeclare function {}",
                self.interner().lookup(name)
            ))
            .into());
        }
        self.functions.insert(name, info);
        Ok(())
    }

    pub(crate) fn constant(&self, name: Name) -> Option<Value> {
        self.constants.get(&name).cloned()
    }

    pub(crate) fn define_constant(&mut self, name: Name, value: Value) -> Result<(), Signal> {
        if self.constants.contains_key(&name) {
            return Err(crate::signal::invalid_declaration(format!(
                "cannot redeclare constant {}",
                self.interner().lookup(name)
            ))
            .into());
        }
        self.constants.insert(name, value);
        Ok(())
    }
}
