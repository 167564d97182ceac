//! Explicit class registry: the set of types the evaluator is able to
//! construct and call into, together with the inheritance lattice used for
//! overload resolution.

use crate::errors::{InvokeResult, RaisedError};
use crate::types::{JavaType, OBJECT_CLASS};
use crate::value::Value;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::rc::Rc;
use tracing::debug;

/// Body of a constructor: receives the resolved arguments, returns the new
/// instance or raises.
pub type CtorBody = Rc<dyn Fn(&[Value]) -> InvokeResult>;

/// Body of a method: receives the receiver (`None` for statics) and the
/// resolved arguments.
pub type MethodBody = Rc<dyn Fn(Option<&Value>, &[Value]) -> InvokeResult>;

/// Field read body: receives the receiver (`None` for statics).
pub type FieldGetBody = Rc<dyn Fn(Option<&Value>) -> InvokeResult>;

/// Field write body.
pub type FieldSetBody = Rc<dyn Fn(Option<&Value>, Value) -> InvokeResult>;

#[derive(Clone)]
pub struct ConstructorDef {
    pub params: Vec<JavaType>,
    pub body: CtorBody,
}

#[derive(Clone)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<JavaType>,
    pub ret: Option<JavaType>,
    pub is_static: bool,
    pub body: MethodBody,
}

#[derive(Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: JavaType,
    pub is_static: bool,
    pub get: FieldGetBody,
    pub set: Option<FieldSetBody>,
}

/// Definition of one registered class or interface.
pub struct ClassDef {
    name: String,
    superclass: Option<String>,
    interfaces: Vec<String>,
    is_interface: bool,
    constructors: Vec<ConstructorDef>,
    methods: Vec<MethodDef>,
    fields: Vec<FieldDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            interfaces: Vec::new(),
            is_interface: false,
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Declare an interface (no constructors, hierarchy anchor only).
    pub fn interface(name: impl Into<String>) -> Self {
        let mut def = Self::new(name);
        def.is_interface = true;
        def
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn constructor(
        mut self,
        params: Vec<JavaType>,
        body: impl Fn(&[Value]) -> InvokeResult + 'static,
    ) -> Self {
        self.constructors.push(ConstructorDef {
            params,
            body: Rc::new(body),
        });
        self
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        params: Vec<JavaType>,
        ret: Option<JavaType>,
        body: impl Fn(&Value, &[Value]) -> InvokeResult + 'static,
    ) -> Self {
        let name = name.into();
        self.methods.push(MethodDef {
            name: name.clone(),
            params,
            ret,
            is_static: false,
            body: Rc::new(move |recv, args| match recv {
                Some(recv) => body(recv, args),
                None => Err(missing_receiver(&name)),
            }),
        });
        self
    }

    pub fn static_method(
        mut self,
        name: impl Into<String>,
        params: Vec<JavaType>,
        ret: Option<JavaType>,
        body: impl Fn(&[Value]) -> InvokeResult + 'static,
    ) -> Self {
        self.methods.push(MethodDef {
            name: name.into(),
            params,
            ret,
            is_static: true,
            body: Rc::new(move |_recv, args| body(args)),
        });
        self
    }

    pub fn static_field(
        mut self,
        name: impl Into<String>,
        ty: JavaType,
        get: impl Fn() -> InvokeResult + 'static,
    ) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
            is_static: true,
            get: Rc::new(move |_recv| get()),
            set: None,
        });
        self
    }

    pub fn field(
        mut self,
        name: impl Into<String>,
        ty: JavaType,
        get: impl Fn(&Value) -> InvokeResult + 'static,
        set: Option<FieldSetBody>,
    ) -> Self {
        let name = name.into();
        let get_name = name.clone();
        self.fields.push(FieldDef {
            name,
            ty,
            is_static: false,
            get: Rc::new(move |recv| match recv {
                Some(recv) => get(recv),
                None => Err(missing_receiver(&get_name)),
            }),
            set,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    pub fn constructors(&self) -> &[ConstructorDef] {
        &self.constructors
    }
}

fn missing_receiver(member: &str) -> RaisedError {
    format!("instance member {member} invoked without a receiver").into()
}

/// Registry of class definitions, keyed by fully-qualified name.
///
/// Deliberately explicit: nothing is resolvable unless it was registered, so
/// the reachable surface is the registration set intersected with the
/// [`crate::filter::ClassFilter`] policy.
#[derive(Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, Rc<ClassDef>>,
}

impl ClassRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the standard builtins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register(&mut registry);
        registry
    }

    /// Register (or replace) a class definition.
    pub fn register(&mut self, def: ClassDef) {
        if self.classes.contains_key(def.name()) {
            debug!(class = %def.name(), "replacing registered class definition");
        }
        self.classes.insert(def.name().to_string(), Rc::new(def));
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<ClassDef>> {
        self.classes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// All methods named `name` visible on `class`, walking the superclass
    /// chain and interfaces (document order: own methods first).
    pub fn methods_named(&self, class: &str, name: &str) -> Vec<(String, MethodDef)> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([class.to_string()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(def) = self.lookup(&current) {
                for method in def.methods.iter().filter(|m| m.name == name) {
                    out.push((current.clone(), method.clone()));
                }
                queue.extend(self.supertype_names(&def));
            } else if current != OBJECT_CLASS {
                queue.push_back(OBJECT_CLASS.to_string());
            }
        }
        out
    }

    /// Find a field by name on `class` or any of its supertypes.
    pub fn field_named(&self, class: &str, name: &str) -> Option<(String, FieldDef)> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([class.to_string()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(def) = self.lookup(&current) {
                if let Some(field) = def.fields.iter().find(|f| f.name == name) {
                    return Some((current, field.clone()));
                }
                queue.extend(self.supertype_names(&def));
            }
        }
        None
    }

    fn supertype_names(&self, def: &ClassDef) -> Vec<String> {
        let mut names = Vec::new();
        match &def.superclass {
            Some(superclass) => names.push(superclass.clone()),
            None if def.name != OBJECT_CLASS => names.push(OBJECT_CLASS.to_string()),
            None => {}
        }
        names.extend(def.interfaces.iter().cloned());
        names
    }

    /// Direct supertypes of a type descriptor within the lattice.
    fn neighbors(&self, ty: &JavaType) -> Vec<JavaType> {
        match ty {
            JavaType::Primitive(kind) => vec![JavaType::class(kind.wrapper_class())],
            JavaType::Array(component) => {
                // Reference arrays are covariant; every array is an Object.
                let mut out = vec![JavaType::object()];
                if !component.is_primitive() {
                    out.extend(
                        self.neighbors(component)
                            .into_iter()
                            .filter(|n| *n != JavaType::object())
                            .map(JavaType::array_of),
                    );
                }
                out
            }
            JavaType::Class(name) => {
                if name == OBJECT_CLASS {
                    return Vec::new();
                }
                match self.lookup(name) {
                    Some(def) => self
                        .supertype_names(&def)
                        .into_iter()
                        .map(JavaType::Class)
                        .collect(),
                    // Unregistered names still sit under Object.
                    None => vec![JavaType::object()],
                }
            }
        }
    }

    /// Number of inheritance hops from `from` up to `to`; `Some(0)` when the
    /// types are identical, `None` when `from` is not assignable to `to`.
    pub fn distance(&self, to: &JavaType, from: &JavaType) -> Option<u32> {
        if to == from {
            return Some(0);
        }
        // Unboxing a wrapper into a primitive parameter costs one hop.
        if let JavaType::Primitive(kind) = to {
            return match from {
                JavaType::Class(name) if name == kind.wrapper_class() => Some(1),
                _ => None,
            };
        }
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([(from.clone(), 0u32)]);
        while let Some((current, hops)) = queue.pop_front() {
            if &current == to {
                return Some(hops);
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            for neighbor in self.neighbors(&current) {
                queue.push_back((neighbor, hops + 1));
            }
        }
        None
    }

    /// Whether a value of runtime type `from` may bind to a slot of declared
    /// type `to`.
    pub fn is_assignable(&self, to: &JavaType, from: &JavaType) -> bool {
        self.distance(to, from).is_some()
    }

    /// Whether `value` may bind to a slot of declared type `to` (null binds
    /// to any reference type).
    pub fn accepts_value(&self, to: &JavaType, value: &Value) -> bool {
        match value.runtime_type() {
            Some(from) => self.is_assignable(to, &from),
            None => !to.is_primitive(),
        }
    }
}
