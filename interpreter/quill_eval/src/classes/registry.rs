//! The class/interface/trait registry.
//!
//! One registry per interpreter instance — never process-global — so
//! independent interpreters coexist freely.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use quill_ir::{Name, StringInterner, TraitAdaptation, Visibility};

use crate::classes::{
    ClassDef, ClassId, FunctionInfo, InterfaceDef, InterfaceId, MemberFlags, MethodBody, MethodDef,
    PropEntry, StaticProp, TraitDef, TraitId, TraitMethod,
};
use crate::environment::new_slot;
use crate::signal::{invalid_declaration, undefined_class, EvalError};
use crate::value::Value;

/// Declaration-time input for one class, with names already resolved to
/// ids and every default/constant expression already evaluated.
pub struct ClassInput {
    pub name: Name,
    pub parent: Option<ClassId>,
    pub interfaces: Vec<InterfaceId>,
    pub traits: Vec<TraitUseInput>,
    pub consts: Vec<(Name, Value)>,
    pub props: Vec<PropInput>,
    pub methods: Vec<MethodInput>,
    pub is_abstract: bool,
    pub is_final: bool,
}

pub struct TraitUseInput {
    pub trait_id: TraitId,
    pub adaptations: Vec<TraitAdaptation>,
}

pub struct PropInput {
    pub name: Name,
    pub visibility: Visibility,
    pub is_static: bool,
    pub default: Value,
}

pub struct MethodInput {
    pub name: Name,
    pub func: Rc<FunctionInfo>,
    pub visibility: Visibility,
    pub flags: MemberFlags,
}

/// Arena of class/interface/trait definitions plus name tables.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassDef>,
    interfaces: Vec<InterfaceDef>,
    traits: Vec<TraitDef>,
    class_names: FxHashMap<Name, ClassId>,
    interface_names: FxHashMap<Name, InterfaceId>,
    trait_names: FxHashMap<Name, TraitId>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    pub fn interface(&self, id: InterfaceId) -> &InterfaceDef {
        &self.interfaces[id.index()]
    }

    pub fn trait_def(&self, id: TraitId) -> &TraitDef {
        &self.traits[id.index()]
    }

    pub fn class_id(&self, name: Name) -> Option<ClassId> {
        self.class_names.get(&name).copied()
    }

    pub fn interface_id(&self, name: Name) -> Option<InterfaceId> {
        self.interface_names.get(&name).copied()
    }

    pub fn trait_id(&self, name: Name) -> Option<TraitId> {
        self.trait_names.get(&name).copied()
    }

    pub fn class_name(&self, id: ClassId) -> Name {
        self.classes[id.index()].name
    }

    /// O(1) method lookup in the resolved table.
    pub fn find_method(&self, class: ClassId, name: Name) -> Option<Rc<MethodDef>> {
        self.classes[class.index()].methods.get(&name).cloned()
    }

    /// Declared instance property, if any.
    pub fn find_prop(&self, class: ClassId, name: Name) -> Option<&PropEntry> {
        self.classes[class.index()]
            .props
            .iter()
            .find(|p| p.name == name)
    }

    /// A static property with its storage slot. Shared up the
    /// inheritance chain unless the subclass redeclared it.
    pub fn static_prop(&self, class: ClassId, name: Name) -> Option<StaticProp> {
        self.classes[class.index()].statics.get(&name).cloned()
    }

    pub fn constant(&self, class: ClassId, name: Name) -> Option<Value> {
        self.classes[class.index()].consts.get(&name).cloned()
    }

    /// `a` is `b` or a descendant of it.
    pub fn is_subclass_or_self(&self, a: ClassId, b: ClassId) -> bool {
        let mut cursor = Some(a);
        while let Some(id) = cursor {
            if id == b {
                return true;
            }
            cursor = self.classes[id.index()].parent;
        }
        false
    }

    /// `class` (or an ancestor) implements `iface` (or one of its
    /// ancestors).
    pub fn implements(&self, class: ClassId, iface: InterfaceId) -> bool {
        let mut cursor = Some(class);
        while let Some(id) = cursor {
            for &direct in &self.classes[id.index()].interfaces {
                if self.interface_extends_or_self(direct, iface) {
                    return true;
                }
            }
            cursor = self.classes[id.index()].parent;
        }
        false
    }

    fn interface_extends_or_self(&self, a: InterfaceId, b: InterfaceId) -> bool {
        if a == b {
            return true;
        }
        self.interfaces[a.index()]
            .extends
            .iter()
            .any(|&parent| self.interface_extends_or_self(parent, b))
    }

    /// Member access rules, checked against the caller's lexical class:
    /// public always; protected when the caller class is the declaring
    /// class, an ancestor, or a descendant; private only from the
    /// declaring class itself.
    pub fn can_access(
        &self,
        caller: Option<ClassId>,
        declared_in: ClassId,
        visibility: Visibility,
    ) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Protected => caller.is_some_and(|c| {
                self.is_subclass_or_self(c, declared_in) || self.is_subclass_or_self(declared_in, c)
            }),
            Visibility::Private => caller == Some(declared_in),
        }
    }

    /// The id the next class registration will receive. Bootstrap code
    /// uses this to anchor `declared_in` on native method defs before
    /// the class exists.
    pub(crate) fn next_class_id(&self) -> ClassId {
        ClassId::new(len_u32(self.classes.len()))
    }

    /// Register a pre-resolved class, bypassing declaration checks.
    /// Only the bootstrapped core classes enter this way.
    pub(crate) fn register_native_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.next_class_id();
        self.class_names.insert(def.name, id);
        self.classes.push(def);
        id
    }

    /// Execute an interface declaration.
    pub fn declare_interface(
        &mut self,
        interner: &StringInterner,
        name: Name,
        extends: Vec<InterfaceId>,
        methods: Vec<Name>,
        consts: Vec<(Name, Value)>,
    ) -> Result<InterfaceId, EvalError> {
        if self.interface_names.contains_key(&name) || self.class_names.contains_key(&name) {
            return Err(invalid_declaration(format!(
                "cannot redeclare {}",
                interner.lookup(name)
            )));
        }
        let id = InterfaceId::new(len_u32(self.interfaces.len()));
        // Constants inherit down the extends chain.
        let mut all_consts = FxHashMap::default();
        for &parent in &extends {
            all_consts.extend(
                self.interfaces[parent.index()]
                    .consts
                    .iter()
                    .map(|(k, v)| (*k, v.clone())),
            );
        }
        all_consts.extend(consts);
        self.interfaces.push(InterfaceDef {
            name,
            extends,
            methods,
            consts: all_consts,
        });
        self.interface_names.insert(name, id);
        Ok(id)
    }

    /// Execute a trait declaration.
    pub fn declare_trait(
        &mut self,
        interner: &StringInterner,
        def: TraitDef,
    ) -> Result<TraitId, EvalError> {
        if self.trait_names.contains_key(&def.name) {
            return Err(invalid_declaration(format!(
                "cannot redeclare trait {}",
                interner.lookup(def.name)
            )));
        }
        let id = TraitId::new(len_u32(self.traits.len()));
        self.trait_names.insert(def.name, id);
        self.traits.push(def);
        Ok(id)
    }

    /// Execute a class declaration: inherit, compose traits, add own
    /// members, then verify abstract and interface obligations. All
    /// structural errors surface here, never at instantiation.
    pub fn declare_class(
        &mut self,
        interner: &StringInterner,
        input: ClassInput,
    ) -> Result<ClassId, EvalError> {
        let class_str = interner.lookup(input.name);
        if self.class_names.contains_key(&input.name)
            || self.interface_names.contains_key(&input.name)
        {
            return Err(invalid_declaration(format!("cannot redeclare {class_str}")));
        }
        let id = ClassId::new(len_u32(self.classes.len()));

        // Inherit the parent's resolved tables.
        let (mut methods, mut props, mut consts, mut statics) = match input.parent {
            Some(parent) => {
                let p = &self.classes[parent.index()];
                if p.is_final {
                    return Err(invalid_declaration(format!(
                        "class {class_str} cannot extend final class {}",
                        interner.lookup(p.name)
                    )));
                }
                (
                    p.methods.clone(),
                    p.props.clone(),
                    p.consts.clone(),
                    p.statics.clone(),
                )
            }
            None => Default::default(),
        };

        // Interface constants become class constants.
        for &iface in &input.interfaces {
            consts.extend(
                self.interfaces[iface.index()]
                    .consts
                    .iter()
                    .map(|(k, v)| (*k, v.clone())),
            );
        }

        // Trait composition. `insteadof` picks a winner per method name;
        // any remaining same-name collision between traits is an error.
        let composed = self.compose_traits(interner, class_str, id, &input.traits)?;
        for (name, method) in composed.methods {
            methods.insert(name, method);
        }
        for (name, visibility, default) in composed.props {
            if !props.iter().any(|p| p.name == name) {
                props.push(PropEntry {
                    name,
                    visibility,
                    default,
                    declared_in: id,
                });
            }
        }

        // Own constants override inherited ones.
        for (name, value) in input.consts {
            consts.insert(name, value);
        }

        // Own properties: redeclaration replaces the inherited entry in
        // place; new names append in declaration order.
        for prop in input.props {
            if prop.is_static {
                statics.insert(
                    prop.name,
                    StaticProp {
                        slot: new_slot(prop.default),
                        visibility: prop.visibility,
                        declared_in: id,
                    },
                );
                continue;
            }
            let entry = PropEntry {
                name: prop.name,
                visibility: prop.visibility,
                default: prop.default,
                declared_in: id,
            };
            match props.iter_mut().find(|p| p.name == prop.name) {
                Some(existing) => *existing = entry,
                None => props.push(entry),
            }
        }

        // Own methods override inherited and trait-composed ones.
        for method in input.methods {
            if let Some(inherited) = methods.get(&method.name) {
                if inherited.is_final() {
                    return Err(invalid_declaration(format!(
                        "cannot override final method {}::{}",
                        interner.lookup(self.class_name(inherited.declared_in)),
                        interner.lookup(method.name)
                    )));
                }
            }
            if method.flags.contains(MemberFlags::ABSTRACT) && !input.is_abstract {
                return Err(invalid_declaration(format!(
                    "class {class_str} declares abstract method {} but is not abstract",
                    interner.lookup(method.name)
                )));
            }
            methods.insert(
                method.name,
                Rc::new(MethodDef {
                    name: method.name,
                    body: MethodBody::User(method.func),
                    visibility: method.visibility,
                    flags: method.flags,
                    declared_in: id,
                }),
            );
        }

        // A concrete class must have no abstract method left anywhere in
        // its resolved table...
        if !input.is_abstract {
            if let Some(m) = methods.values().find(|m| m.is_abstract()) {
                return Err(invalid_declaration(format!(
                    "class {class_str} must implement abstract method {}",
                    interner.lookup(m.name)
                )));
            }
            // ...and must satisfy every implemented interface.
            for &iface in &input.interfaces {
                let mut required = Vec::new();
                self.collect_interface_methods(iface, &mut required);
                for method_name in required {
                    let satisfied = methods
                        .get(&method_name)
                        .is_some_and(|m| !m.is_abstract());
                    if !satisfied {
                        return Err(invalid_declaration(format!(
                            "class {class_str} must implement method {}::{}",
                            interner.lookup(self.interfaces[iface.index()].name),
                            interner.lookup(method_name)
                        )));
                    }
                }
            }
        }

        self.classes.push(ClassDef {
            name: input.name,
            parent: input.parent,
            interfaces: input.interfaces,
            is_abstract: input.is_abstract,
            is_final: input.is_final,
            methods,
            props,
            consts,
            statics,
        });
        self.class_names.insert(input.name, id);
        Ok(id)
    }

    fn collect_interface_methods(&self, iface: InterfaceId, out: &mut Vec<Name>) {
        let def = &self.interfaces[iface.index()];
        out.extend(&def.methods);
        for &parent in &def.extends {
            self.collect_interface_methods(parent, out);
        }
    }

    fn compose_traits(
        &self,
        interner: &StringInterner,
        class_str: &str,
        class_id: ClassId,
        uses: &[TraitUseInput],
    ) -> Result<ComposedTraits, EvalError> {
        let mut composed = ComposedTraits::default();
        if uses.is_empty() {
            return Ok(composed);
        }

        // `A::m insteadof B` — method name → winning trait name.
        let mut winners: FxHashMap<Name, Name> = FxHashMap::default();
        for use_ in uses {
            for adaptation in &use_.adaptations {
                if let TraitAdaptation::InsteadOf { method, winner } = adaptation {
                    winners.insert(*method, *winner);
                }
            }
        }

        let mut sources: FxHashMap<Name, Name> = FxHashMap::default();
        for use_ in uses {
            let trait_def = self.trait_def(use_.trait_id);
            for method in &trait_def.methods {
                if winners.get(&method.name).is_some_and(|w| *w != trait_def.name) {
                    continue;
                }
                if let Some(other) = sources.get(&method.name) {
                    return Err(invalid_declaration(format!(
                        "trait method {} collides between {} and {} in class {class_str}",
                        interner.lookup(method.name),
                        interner.lookup(*other),
                        interner.lookup(trait_def.name)
                    )));
                }
                sources.insert(method.name, trait_def.name);
                composed
                    .methods
                    .push((method.name, self.composed_method(method, method.name, None, class_id)));
            }
            for (name, visibility, default) in &trait_def.props {
                composed.props.push((*name, *visibility, default.clone()));
            }
        }

        // `A::m as protected n` — re-expose under a new name and/or
        // visibility, in addition to the normally composed method.
        for use_ in uses {
            for adaptation in &use_.adaptations {
                let TraitAdaptation::Alias {
                    method,
                    from,
                    alias,
                    visibility,
                } = adaptation
                else {
                    continue;
                };
                let source = self.find_trait_method(uses, *method, *from).ok_or_else(|| {
                    invalid_declaration(format!(
                        "aliased trait method {} not found in class {class_str}",
                        interner.lookup(*method)
                    ))
                })?;
                composed.methods.push((
                    *alias,
                    self.composed_method(&source, *alias, *visibility, class_id),
                ));
            }
        }

        Ok(composed)
    }

    fn find_trait_method(
        &self,
        uses: &[TraitUseInput],
        method: Name,
        from: Option<Name>,
    ) -> Option<TraitMethod> {
        for use_ in uses {
            let trait_def = self.trait_def(use_.trait_id);
            if from.is_some_and(|f| f != trait_def.name) {
                continue;
            }
            if let Some(m) = trait_def.methods.iter().find(|m| m.name == method) {
                return Some(m.clone());
            }
        }
        None
    }

    /// Trait methods behave as if declared by the using class.
    fn composed_method(
        &self,
        source: &TraitMethod,
        name: Name,
        visibility: Option<Visibility>,
        class_id: ClassId,
    ) -> Rc<MethodDef> {
        Rc::new(MethodDef {
            name,
            body: MethodBody::User(Rc::clone(&source.func)),
            visibility: visibility.unwrap_or(source.visibility),
            flags: source.flags,
            declared_in: class_id,
        })
    }

    /// Resolve a class name for `new`/`instanceof`/static access,
    /// rendering a uniform error when it is unknown.
    pub fn expect_class(
        &self,
        interner: &StringInterner,
        name: Name,
    ) -> Result<ClassId, EvalError> {
        self.class_id(name)
            .ok_or_else(|| undefined_class(interner.lookup(name)))
    }
}

#[derive(Default)]
struct ComposedTraits {
    methods: Vec<(Name, Rc<MethodDef>)>,
    props: Vec<(Name, Visibility, Value)>,
}

#[inline]
#[expect(clippy::cast_possible_truncation, reason = "registry capacity fits u32")]
fn len_u32(len: usize) -> u32 {
    len as u32
}
