//! Declaration execution.
//!
//! Declarations register into the interpreter's flat registries when
//! their statement executes. This is where default-value and constant
//! expressions are evaluated — exactly once; calls reuse the stored
//! values — and where class declarations are lowered to the resolved
//! [`crate::classes::ClassInput`] form.

use std::rc::Rc;

use quill_ir::{
    ClassDeclId, FuncId, InterfaceDeclId, MethodDecl, Name, Param, TraitDeclId, UseKind,
};

use crate::classes::{
    ClassInput, FunctionInfo, InterfaceId, MemberFlags, MethodInput, PropInput, TraitDef,
    TraitId, TraitMethod, TraitUseInput,
};
use crate::interp::Interpreter;
use crate::signal::{undefined_class, ExecResult, Signal};
use crate::value::Value;

impl Interpreter<'_> {
    /// Evaluate parameter defaults at declaration time.
    pub(crate) fn eval_param_defaults(
        &mut self,
        params: &[Param],
    ) -> Result<Vec<Option<Value>>, Signal> {
        let mut defaults = Vec::with_capacity(params.len());
        for param in params {
            defaults.push(match param.default {
                Some(expr) => Some(self.eval_expr(expr)?),
                None => None,
            });
        }
        Ok(defaults)
    }

    fn function_info(&mut self, func: FuncId, name: Name) -> Result<Rc<FunctionInfo>, Signal> {
        let decl = self.program().arena.func(func);
        let defaults = self.eval_param_defaults(&decl.params)?;
        Ok(Rc::new(FunctionInfo {
            name,
            params: decl.params.clone(),
            defaults,
            body: decl.body,
            is_generator: decl.is_generator,
        }))
    }

    pub(crate) fn declare_function(&mut self, func: FuncId) -> ExecResult {
        let decl = self.program().arena.func(func);
        let qualified = self.namespace().qualify(decl.name, self.interner());
        let info = self.function_info(func, qualified)?;
        self.define_function(qualified, info)?;
        Ok(Value::Null)
    }

    pub(crate) fn declare_class(&mut self, id: ClassDeclId) -> ExecResult {
        let decl = self.program().arena.class(id);
        let name = self.namespace().qualify(decl.name, self.interner());

        let parent = match decl.parent {
            Some(parent) => Some(self.resolve_type_name(parent)?),
            None => None,
        };
        let mut interfaces = Vec::with_capacity(decl.interfaces.len());
        for &iface in &decl.interfaces {
            interfaces.push(self.resolve_interface_name(iface)?);
        }
        let mut traits = Vec::with_capacity(decl.uses.len());
        for use_ in &decl.uses {
            traits.push(TraitUseInput {
                trait_id: self.resolve_trait_name(use_.name)?,
                adaptations: use_.adaptations.clone(),
            });
        }

        let mut consts = Vec::with_capacity(decl.consts.len());
        for c in &decl.consts {
            let value = self.eval_expr(c.value)?;
            consts.push((c.name, value));
        }
        let mut props = Vec::with_capacity(decl.props.len());
        for p in &decl.props {
            let default = match p.default {
                Some(expr) => self.eval_expr(expr)?,
                None => Value::Null,
            };
            props.push(PropInput {
                name: p.name,
                visibility: p.visibility,
                is_static: p.is_static,
                default,
            });
        }

        let mut methods = Vec::with_capacity(decl.methods.len());
        for m in &decl.methods {
            let func = self.program().arena.func(m.func);
            let method_name = func.name;
            let info = self.function_info(m.func, method_name)?;
            methods.push(MethodInput {
                name: method_name,
                func: Rc::clone(&info),
                visibility: m.visibility,
                flags: method_flags(m),
            });
            // Promoted constructor parameters declare properties.
            if method_name == self.names().construct {
                for param in &info.params {
                    if let Some(visibility) = param.promote {
                        props.push(PropInput {
                            name: param.name,
                            visibility,
                            is_static: false,
                            default: Value::Null,
                        });
                    }
                }
            }
        }

        let input = ClassInput {
            name,
            parent,
            interfaces,
            traits,
            consts,
            props,
            methods,
            is_abstract: decl.is_abstract,
            is_final: decl.is_final,
        };
        let interner = self.interner();
        self.registry_mut().declare_class(interner, input)?;
        Ok(Value::Null)
    }

    pub(crate) fn declare_interface(&mut self, id: InterfaceDeclId) -> ExecResult {
        let decl = self.program().arena.interface(id);
        let name = self.namespace().qualify(decl.name, self.interner());
        let mut extends = Vec::with_capacity(decl.extends.len());
        for &parent in &decl.extends {
            extends.push(self.resolve_interface_name(parent)?);
        }
        let methods: Vec<Name> = decl
            .methods
            .iter()
            .map(|m| self.program().arena.func(m.func).name)
            .collect();
        let mut consts = Vec::with_capacity(decl.consts.len());
        for c in &decl.consts {
            let value = self.eval_expr(c.value)?;
            consts.push((c.name, value));
        }
        let interner = self.interner();
        self.registry_mut()
            .declare_interface(interner, name, extends, methods, consts)?;
        Ok(Value::Null)
    }

    pub(crate) fn declare_trait(&mut self, id: TraitDeclId) -> ExecResult {
        let decl = self.program().arena.trait_decl(id);
        let name = self.namespace().qualify(decl.name, self.interner());
        let mut methods = Vec::with_capacity(decl.methods.len());
        for m in &decl.methods {
            let method_name = self.program().arena.func(m.func).name;
            let info = self.function_info(m.func, method_name)?;
            methods.push(TraitMethod {
                name: method_name,
                func: info,
                visibility: m.visibility,
                flags: method_flags(m),
            });
        }
        let mut props = Vec::with_capacity(decl.props.len());
        for p in &decl.props {
            let default = match p.default {
                Some(expr) => self.eval_expr(expr)?,
                None => Value::Null,
            };
            props.push((p.name, p.visibility, default));
        }
        let interner = self.interner();
        self.registry_mut().declare_trait(
            interner,
            TraitDef {
                name,
                methods,
                props,
            },
        )?;
        Ok(Value::Null)
    }

    /// Resolve a class name appearing in a declaration (`extends`).
    fn resolve_type_name(&mut self, name: Name) -> Result<crate::classes::ClassId, Signal> {
        let resolved = self
            .namespace()
            .resolve(UseKind::Type, name, self.interner());
        for candidate in std::iter::once(resolved.primary).chain(resolved.fallback) {
            if let Some(id) = self.registry().class_id(candidate) {
                return Ok(id);
            }
        }
        Err(undefined_class(self.interner().lookup(name)).into())
    }

    fn resolve_interface_name(&mut self, name: Name) -> Result<InterfaceId, Signal> {
        let resolved = self
            .namespace()
            .resolve(UseKind::Type, name, self.interner());
        for candidate in std::iter::once(resolved.primary).chain(resolved.fallback) {
            if let Some(id) = self.registry().interface_id(candidate) {
                return Ok(id);
            }
        }
        Err(undefined_class(self.interner().lookup(name)).into())
    }

    fn resolve_trait_name(&mut self, name: Name) -> Result<TraitId, Signal> {
        let resolved = self
            .namespace()
            .resolve(UseKind::Type, name, self.interner());
        for candidate in std::iter::once(resolved.primary).chain(resolved.fallback) {
            if let Some(id) = self.registry().trait_id(candidate) {
                return Ok(id);
            }
        }
        Err(undefined_class(self.interner().lookup(name)).into())
    }
}

fn method_flags(decl: &MethodDecl) -> MemberFlags {
    let mut flags = MemberFlags::empty();
    if decl.is_static {
        flags |= MemberFlags::STATIC;
    }
    if decl.is_abstract {
        flags |= MemberFlags::ABSTRACT;
    }
    if decl.is_final {
        flags |= MemberFlags::FINAL;
    }
    flags
}
