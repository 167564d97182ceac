//! Safe expression/statement evaluation: given a target, an operation name
//! and argument values, resolve exactly one registered operation and invoke
//! it, consulting the [`ClassFilter`] immediately before every class
//! resolution and member invocation.

use crate::errors::{EvalError, EvalResult, PolicyViolation};
use crate::filter::{ClassFilter, ConstructorDesc, MethodDesc};
use crate::registry::{ClassRegistry, FieldDef, MethodDef};
use crate::types::{JavaType, PrimitiveKind};
use crate::value::Value;
use lru::LruCache;
use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::Arc;
use tracing::warn;

const REFLECT_ARRAY_CLASS: &str = "java.lang.reflect.Array";
const CLASS_CLASS: &str = "java.lang.Class";
const DEFAULT_CACHE_CAPACITY: usize = 256;

/// The object or class an operation is applied to.
#[derive(Debug, Clone)]
pub enum CallTarget {
    /// A class: constructor calls, static members, array component types.
    Class(JavaType),
    /// A previously resolved value: instance members, array accessors.
    Instance(Value),
}

/// The single resolution strategy chosen for an invocation.
///
/// Selected by pattern matching on the target/operation/arguments, in the
/// priority order of the decision table; the filter runs between planning and
/// execution so nothing rejected is ever invoked.
enum Plan {
    ArrayGet,
    ArraySet,
    ArrayAllocWithLength,
    ArrayAlloc(JavaType),
    ClassForName,
    Constructor(JavaType),
    MethodCall(String),
}

/// Resolves and invokes registered operations. Pure computation plus registry
/// dispatch; owns its (injectable) method-resolution cache so no state leaks
/// across unrelated evaluators.
pub struct Evaluator {
    registry: Rc<ClassRegistry>,
    filter: Arc<dyn ClassFilter>,
    cache: RefCell<LruCache<(String, String), Rc<Vec<(String, MethodDef)>>>>,
}

impl Evaluator {
    pub fn new(registry: Rc<ClassRegistry>, filter: Arc<dyn ClassFilter>) -> Self {
        Self {
            registry,
            filter,
            cache: RefCell::new(LruCache::new(
                NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap(),
            )),
        }
    }

    /// Diagnostic-only constructor that disables all member filtering for
    /// this evaluator instance. Scoped to the instance, never ambient.
    pub fn unfiltered(registry: Rc<ClassRegistry>) -> Self {
        warn!("class filtering DISABLED for this evaluator; every class and member is permitted");
        Self::new(registry, Arc::new(crate::filter::PermitAllFilter))
    }

    /// Replace the resolution cache with one of the given capacity.
    pub fn with_cache_capacity(self, capacity: usize) -> Self {
        Self {
            cache: RefCell::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).unwrap(),
            )),
            ..self
        }
    }

    pub fn registry(&self) -> &Rc<ClassRegistry> {
        &self.registry
    }

    /// Resolve a source-style type name, consulting `permit_class` on the
    /// base reference class before it is looked up.
    pub fn class_for_name(&self, name: &str) -> EvalResult<JavaType> {
        let ty = JavaType::parse(name)?;
        if let Some(base) = ty.base().as_class_name() {
            if !self.filter.permit_class(base) {
                return Err(PolicyViolation::ClassNotPermitted(base.to_string()).into());
            }
            if !self.registry.contains(base) {
                return Err(EvalError::ClassNotFound(base.to_string()));
            }
        }
        Ok(ty)
    }

    /// Accessor name for a property: `p` becomes `getP` or `setP`.
    pub fn property_accessor(property: &str, write: bool) -> String {
        let mut chars = property.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{}{capitalized}", if write { "set" } else { "get" })
    }

    /// Resolve and invoke one operation.
    pub fn invoke(&self, target: &CallTarget, operation: &str, args: &[Value]) -> EvalResult<Value> {
        match self.plan(target, operation, args)? {
            Plan::ArrayGet => self.array_get(target, args),
            Plan::ArraySet => self.array_set(target, args),
            Plan::ArrayAllocWithLength => self.array_alloc_with_length(args),
            Plan::ArrayAlloc(component) => self.array_alloc(component, args),
            Plan::ClassForName => self.class_for_name_value(args),
            Plan::Constructor(ty) => self.construct(ty, args),
            Plan::MethodCall(class) => {
                let receiver = match target {
                    CallTarget::Instance(value) => Some(value),
                    CallTarget::Class(_) => None,
                };
                self.invoke_method(&class, receiver, operation, args)
            }
        }
    }

    fn plan(&self, target: &CallTarget, operation: &str, args: &[Value]) -> EvalResult<Plan> {
        match target {
            CallTarget::Instance(value @ Value::Array(_)) => match operation {
                "get" => Ok(Plan::ArrayGet),
                "set" => Ok(Plan::ArraySet),
                _ => Err(EvalError::NoSuchMethod {
                    class: value.type_label(),
                    name: operation.to_string(),
                    arity: args.len(),
                }),
            },
            CallTarget::Instance(Value::Null) => Err(EvalError::TypeMismatch(format!(
                "cannot invoke {operation} on null"
            ))),
            CallTarget::Instance(value) => {
                let class = value
                    .runtime_type()
                    .and_then(|ty| ty.as_class_name().map(str::to_string))
                    .ok_or_else(|| {
                        EvalError::TypeMismatch(format!(
                            "cannot invoke {operation} on {}",
                            value.type_label()
                        ))
                    })?;
                Ok(Plan::MethodCall(class))
            }
            CallTarget::Class(ty) => {
                if let Some(name) = ty.as_class_name() {
                    if name == REFLECT_ARRAY_CLASS && operation == "newInstance" {
                        return Ok(Plan::ArrayAllocWithLength);
                    }
                    if name == CLASS_CLASS && operation == "forName" {
                        return Ok(Plan::ClassForName);
                    }
                }
                match operation {
                    "new" | "newInstance" => Ok(Plan::Constructor(ty.clone())),
                    "newArray" => Ok(Plan::ArrayAlloc(ty.clone())),
                    _ => {
                        let name = ty.as_class_name().ok_or_else(|| {
                            EvalError::TypeMismatch(format!(
                                "static call {operation} on non-class type {ty}"
                            ))
                        })?;
                        Ok(Plan::MethodCall(name.to_string()))
                    }
                }
            }
        }
    }

    fn array_get(&self, target: &CallTarget, args: &[Value]) -> EvalResult<Value> {
        let array = expect_array_target(target)?;
        if args.len() != 1 {
            return Err(EvalError::TypeMismatch(format!(
                "array get requires exactly 1 argument, got {}",
                args.len()
            )));
        }
        let index = expect_index(&args[0])?;
        let body = array.borrow();
        body.elements
            .get(index as usize)
            .cloned()
            .ok_or(EvalError::IndexOutOfBounds {
                index,
                len: body.elements.len(),
            })
    }

    fn array_set(&self, target: &CallTarget, args: &[Value]) -> EvalResult<Value> {
        let array = expect_array_target(target)?;
        if args.len() != 2 {
            return Err(EvalError::TypeMismatch(format!(
                "array set requires exactly 2 arguments, got {}",
                args.len()
            )));
        }
        let index = expect_index(&args[0])?;
        let mut body = array.borrow_mut();
        if !self.registry.accepts_value(&body.component, &args[1]) {
            return Err(EvalError::TypeMismatch(format!(
                "cannot store {} into {}[]",
                args[1].type_label(),
                body.component
            )));
        }
        let len = body.elements.len();
        match body.elements.get_mut(index as usize) {
            Some(slot) => {
                *slot = args[1].clone();
                Ok(Value::Null)
            }
            None => Err(EvalError::IndexOutOfBounds { index, len }),
        }
    }

    fn array_alloc_with_length(&self, args: &[Value]) -> EvalResult<Value> {
        let (component, length) = match args {
            [Value::ClassRef(component), length] => (component.clone(), expect_index(length)?),
            _ => {
                return Err(EvalError::TypeMismatch(
                    "Array.newInstance expects (component class, int length)".to_string(),
                ))
            }
        };
        if length < 0 {
            return Err(EvalError::TypeMismatch(format!(
                "negative array length: {length}"
            )));
        }
        let fill = default_value(&component);
        Ok(Value::array(
            component,
            std::iter::repeat_with(|| fill.clone())
                .take(length as usize)
                .collect(),
        ))
    }

    fn array_alloc(&self, component: JavaType, args: &[Value]) -> EvalResult<Value> {
        for (position, arg) in args.iter().enumerate() {
            if !self.registry.accepts_value(&component, arg) {
                return Err(EvalError::TypeMismatch(format!(
                    "array element {position}: cannot store {} into {component}[]",
                    arg.type_label()
                )));
            }
        }
        Ok(Value::array(component, args.to_vec()))
    }

    fn class_for_name_value(&self, args: &[Value]) -> EvalResult<Value> {
        let name = match args {
            [Value::Str(name)] => name,
            _ => {
                return Err(EvalError::TypeMismatch(
                    "Class.forName expects a single string argument".to_string(),
                ))
            }
        };
        self.class_for_name(name).map(Value::ClassRef)
    }

    fn construct(&self, ty: JavaType, args: &[Value]) -> EvalResult<Value> {
        let class = ty
            .as_class_name()
            .ok_or_else(|| EvalError::TypeMismatch(format!("cannot construct {ty}")))?;
        if !self.filter.permit_class(class) {
            return Err(PolicyViolation::ClassNotPermitted(class.to_string()).into());
        }
        let def = self
            .registry
            .lookup(class)
            .ok_or_else(|| EvalError::ClassNotFound(class.to_string()))?;

        let candidates: Vec<(u32, usize)> = def
            .constructors()
            .iter()
            .enumerate()
            .filter(|(_, ctor)| ctor.params.len() == args.len())
            .filter_map(|(idx, ctor)| self.score(&ctor.params, args).map(|s| (s, idx)))
            .collect();

        let chosen = match most_specific(&candidates) {
            Selection::None => {
                return Err(EvalError::NoSuchConstructor {
                    class: class.to_string(),
                    arity: args.len(),
                })
            }
            Selection::Tie(a, b) => {
                // Deliberately a hard failure: declaration order never
                // decides which constructor runs.
                return Err(EvalError::AmbiguousConstructor {
                    first: ConstructorDesc::new(class, def.constructors()[a].params.clone())
                        .to_string(),
                    second: ConstructorDesc::new(class, def.constructors()[b].params.clone())
                        .to_string(),
                });
            }
            Selection::One(idx) => &def.constructors()[idx],
        };

        let desc = ConstructorDesc::new(class, chosen.params.clone());
        if !self.filter.permit_constructor(&desc) {
            return Err(PolicyViolation::ConstructorNotPermitted(desc).into());
        }
        (chosen.body)(args).map_err(EvalError::raised)
    }

    fn invoke_method(
        &self,
        class: &str,
        receiver: Option<&Value>,
        name: &str,
        args: &[Value],
    ) -> EvalResult<Value> {
        let methods = self.methods_named(class, name);
        let applicable: Vec<&(String, MethodDef)> = methods
            .iter()
            .filter(|(_, m)| m.params.len() == args.len())
            .filter(|(_, m)| receiver.is_some() || m.is_static)
            .collect();

        let scored: Vec<(u32, usize)> = applicable
            .iter()
            .enumerate()
            .filter_map(|(idx, (_, m))| self.score(&m.params, args).map(|s| (s, idx)))
            .collect();

        let entry = match most_specific_with_returns(
            &scored,
            |idx| applicable[idx].1.ret.as_ref(),
            &self.registry,
        ) {
            Selection::None => {
                return Err(EvalError::NoSuchMethod {
                    class: class.to_string(),
                    name: name.to_string(),
                    arity: args.len(),
                })
            }
            Selection::Tie(a, b) => {
                return Err(EvalError::AmbiguousMethod {
                    first: method_desc(applicable[a]).to_string(),
                    second: method_desc(applicable[b]).to_string(),
                });
            }
            Selection::One(idx) => applicable[idx],
        };
        let (declaring, method) = (&entry.0, &entry.1);

        let desc = MethodDesc::new(declaring.clone(), name, method.params.clone());
        if !self.filter.permit_method(&desc) {
            return Err(PolicyViolation::MethodNotPermitted(desc).into());
        }
        let recv = if method.is_static { None } else { receiver };
        (method.body)(recv, args).map_err(EvalError::raised)
    }

    /// Read a field, or a static field when the target is a class.
    pub fn get_field(&self, target: &CallTarget, name: &str) -> EvalResult<Value> {
        let (declaring, field, receiver) = self.resolve_field(target, name)?;
        self.permit_field(&declaring, &field, false)?;
        let recv = if field.is_static { None } else { receiver };
        (field.get)(recv.as_ref()).map_err(EvalError::raised)
    }

    /// Write a field, subject to the same filtering as reads.
    pub fn set_field(&self, target: &CallTarget, name: &str, value: Value) -> EvalResult<Value> {
        let (declaring, field, receiver) = self.resolve_field(target, name)?;
        self.permit_field(&declaring, &field, true)?;
        if !self.registry.accepts_value(&field.ty, &value) {
            return Err(EvalError::TypeMismatch(format!(
                "cannot assign {} to field {declaring}.{name} of type {}",
                value.type_label(),
                field.ty
            )));
        }
        let set = field.set.as_ref().ok_or_else(|| EvalError::FieldNotWritable {
            class: declaring.clone(),
            name: name.to_string(),
        })?;
        let recv = if field.is_static { None } else { receiver };
        set(recv.as_ref(), value).map_err(EvalError::raised)
    }

    fn resolve_field(
        &self,
        target: &CallTarget,
        name: &str,
    ) -> EvalResult<(String, FieldDef, Option<Value>)> {
        let (class, receiver) = match target {
            CallTarget::Class(ty) => (
                ty.as_class_name()
                    .ok_or_else(|| {
                        EvalError::TypeMismatch(format!("field access on non-class type {ty}"))
                    })?
                    .to_string(),
                None,
            ),
            CallTarget::Instance(value) => {
                let class = value
                    .runtime_type()
                    .and_then(|ty| ty.as_class_name().map(str::to_string))
                    .ok_or_else(|| {
                        EvalError::TypeMismatch(format!(
                            "field access on {}",
                            value.type_label()
                        ))
                    })?;
                (class, Some(value.clone()))
            }
        };
        let (declaring, field) =
            self.registry
                .field_named(&class, name)
                .ok_or_else(|| EvalError::NoSuchField {
                    class: class.clone(),
                    name: name.to_string(),
                })?;
        Ok((declaring, field, receiver))
    }

    /// Field access runs through `permit_method` with a synthetic accessor
    /// descriptor so the field path is filtered like any other member.
    fn permit_field(&self, declaring: &str, field: &FieldDef, write: bool) -> EvalResult<()> {
        let params = if write {
            vec![field.ty.clone()]
        } else {
            Vec::new()
        };
        let desc = MethodDesc::new(declaring, field.name.clone(), params);
        if self.filter.permit_method(&desc) {
            Ok(())
        } else {
            Err(PolicyViolation::MethodNotPermitted(desc).into())
        }
    }

    fn methods_named(&self, class: &str, name: &str) -> Rc<Vec<(String, MethodDef)>> {
        let key = (class.to_string(), name.to_string());
        if let Some(hit) = self.cache.borrow_mut().get(&key) {
            return hit.clone();
        }
        let methods = Rc::new(self.registry.methods_named(class, name));
        self.cache.borrow_mut().put(key, methods.clone());
        methods
    }

    /// Summed inheritance distance of the arguments to the parameter list;
    /// `None` when some argument cannot bind.
    fn score(&self, params: &[JavaType], args: &[Value]) -> Option<u32> {
        let mut total = 0u32;
        for (param, arg) in params.iter().zip(args) {
            match arg.runtime_type() {
                None => {
                    if param.is_primitive() {
                        return None;
                    }
                }
                Some(runtime) => total += self.registry.distance(param, &runtime)?,
            }
        }
        Some(total)
    }
}

fn method_desc(entry: &(String, MethodDef)) -> MethodDesc {
    MethodDesc::new(entry.0.clone(), entry.1.name.clone(), entry.1.params.clone())
}

fn expect_array_target(target: &CallTarget) -> EvalResult<&crate::value::ArrayRef> {
    match target {
        CallTarget::Instance(Value::Array(array)) => Ok(array),
        _ => Err(EvalError::TypeMismatch(
            "array accessor on a non-array target".to_string(),
        )),
    }
}

fn expect_index(value: &Value) -> EvalResult<i32> {
    value.as_int().ok_or_else(|| {
        EvalError::TypeMismatch(format!(
            "array index must be an int, got {}",
            value.type_label()
        ))
    })
}

/// Zero value for a freshly allocated array slot.
fn default_value(component: &JavaType) -> Value {
    match component {
        JavaType::Primitive(PrimitiveKind::Boolean) => Value::Boolean(false),
        JavaType::Primitive(PrimitiveKind::Byte) => Value::Byte(0),
        JavaType::Primitive(PrimitiveKind::Short) => Value::Short(0),
        JavaType::Primitive(PrimitiveKind::Int) => Value::Int(0),
        JavaType::Primitive(PrimitiveKind::Long) => Value::Long(0),
        JavaType::Primitive(PrimitiveKind::Float) => Value::Float(0.0),
        JavaType::Primitive(PrimitiveKind::Double) => Value::Double(0.0),
        JavaType::Primitive(PrimitiveKind::Char) => Value::Char('\0'),
        JavaType::Class(_) | JavaType::Array(_) => Value::Null,
    }
}

enum Selection {
    None,
    One(usize),
    Tie(usize, usize),
}

/// Pick the candidate with the smallest score; a tie is a tie.
fn most_specific(scored: &[(u32, usize)]) -> Selection {
    let Some(min) = scored.iter().map(|(s, _)| *s).min() else {
        return Selection::None;
    };
    let tied: Vec<usize> = scored
        .iter()
        .filter(|(s, _)| *s == min)
        .map(|(_, idx)| *idx)
        .collect();
    match tied.as_slice() {
        [only] => Selection::One(*only),
        [a, b, ..] => Selection::Tie(*a, *b),
        [] => Selection::None,
    }
}

/// Like [`most_specific`], but a score tie between candidates with covariant
/// return types is broken in favor of the narrower return type.
fn most_specific_with_returns<'a>(
    scored: &[(u32, usize)],
    ret_of: impl Fn(usize) -> Option<&'a JavaType>,
    registry: &ClassRegistry,
) -> Selection {
    match most_specific(scored) {
        Selection::Tie(first, second) => {
            let min = scored.iter().map(|(s, _)| *s).min().unwrap();
            let tied: Vec<usize> = scored
                .iter()
                .filter(|(s, _)| *s == min)
                .map(|(_, idx)| *idx)
                .collect();
            let narrower = tied.iter().copied().find(|&candidate| {
                tied.iter().filter(|&&other| other != candidate).all(|&other| {
                    match (ret_of(candidate), ret_of(other)) {
                        (Some(a), Some(b)) => a != b && registry.is_assignable(b, a),
                        _ => false,
                    }
                })
            });
            match narrower {
                Some(winner) => Selection::One(winner),
                None => Selection::Tie(first, second),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PermitAllFilter;

    fn evaluator() -> Evaluator {
        Evaluator::new(
            Rc::new(ClassRegistry::with_builtins()),
            Arc::new(PermitAllFilter),
        )
    }

    #[test]
    fn property_accessor_names() {
        assert_eq!(Evaluator::property_accessor("owner", false), "getOwner");
        assert_eq!(Evaluator::property_accessor("owner", true), "setOwner");
        assert_eq!(Evaluator::property_accessor("x", false), "getX");
    }

    #[test]
    fn array_get_and_set() {
        let eval = evaluator();
        let array = Value::array(
            JavaType::Primitive(PrimitiveKind::Int),
            vec![Value::Int(1), Value::Int(2)],
        );
        let target = CallTarget::Instance(array.clone());

        let got = eval.invoke(&target, "get", &[Value::Int(1)]).unwrap();
        assert!(got.loose_eq(&Value::Int(2)));

        eval.invoke(&target, "set", &[Value::Int(0), Value::Int(9)])
            .unwrap();
        let got = eval.invoke(&target, "get", &[Value::Int(0)]).unwrap();
        assert!(got.loose_eq(&Value::Int(9)));
    }

    #[test]
    fn array_accessor_arity_and_index_type_are_checked() {
        let eval = evaluator();
        let target = CallTarget::Instance(Value::array(
            JavaType::Primitive(PrimitiveKind::Int),
            vec![Value::Int(1)],
        ));

        assert!(matches!(
            eval.invoke(&target, "get", &[]),
            Err(EvalError::TypeMismatch(_))
        ));
        assert!(matches!(
            eval.invoke(&target, "get", &[Value::Str("0".into())]),
            Err(EvalError::TypeMismatch(_))
        ));
        assert!(matches!(
            eval.invoke(&target, "get", &[Value::Int(5)]),
            Err(EvalError::IndexOutOfBounds { index: 5, len: 1 })
        ));
        assert!(matches!(
            eval.invoke(&target, "set", &[Value::Int(0), Value::Str("no".into())]),
            Err(EvalError::TypeMismatch(_))
        ));
    }

    #[test]
    fn alloc_with_length_fills_defaults() {
        let eval = evaluator();
        let target = CallTarget::Class(JavaType::class(REFLECT_ARRAY_CLASS));
        let array = eval
            .invoke(
                &target,
                "newInstance",
                &[
                    Value::ClassRef(JavaType::Primitive(PrimitiveKind::Int)),
                    Value::Int(3),
                ],
            )
            .unwrap();
        let body = array.as_array().unwrap().borrow();
        assert_eq!(body.elements.len(), 3);
        assert!(body.elements[0].loose_eq(&Value::Int(0)));
    }

    #[test]
    fn new_array_checks_component_compatibility() {
        let eval = evaluator();
        let target = CallTarget::Class(JavaType::Primitive(PrimitiveKind::Int));
        let ok = eval
            .invoke(&target, "newArray", &[Value::Int(1), Value::Int(2)])
            .unwrap();
        assert_eq!(ok.as_array().unwrap().borrow().elements.len(), 2);

        assert!(matches!(
            eval.invoke(&target, "newArray", &[Value::Int(1), Value::Null]),
            Err(EvalError::TypeMismatch(_))
        ));
    }

    #[test]
    fn constructs_and_calls_instance_methods() {
        let eval = evaluator();
        let list = eval
            .invoke(
                &CallTarget::Class(JavaType::class("java.util.ArrayList")),
                "new",
                &[],
            )
            .unwrap();
        let target = CallTarget::Instance(list);
        eval.invoke(&target, "add", &[Value::Str("x".into())])
            .unwrap();
        let size = eval.invoke(&target, "size", &[]).unwrap();
        assert!(size.loose_eq(&Value::Int(1)));
    }

    #[test]
    fn raised_errors_pass_through_unwrapped() {
        let eval = evaluator();
        let list = eval
            .invoke(
                &CallTarget::Class(JavaType::class("java.util.ArrayList")),
                "new",
                &[],
            )
            .unwrap();
        let err = eval
            .invoke(&CallTarget::Instance(list), "get", &[Value::Int(4)])
            .unwrap_err();
        match err {
            EvalError::Raised(inner) => {
                assert_eq!(inner.to_string(), "index 4 out of bounds for length 0")
            }
            other => panic!("expected raised error, got {other:?}"),
        }
    }

    #[test]
    fn static_members_resolve_on_class_targets() {
        let eval = evaluator();
        let integer = CallTarget::Class(JavaType::class("java.lang.Integer"));
        let parsed = eval
            .invoke(&integer, "parseInt", &[Value::Str("42".into())])
            .unwrap();
        assert!(parsed.loose_eq(&Value::Int(42)));

        let max = eval.get_field(&integer, "MAX_VALUE").unwrap();
        assert!(max.loose_eq(&Value::Int(i32::MAX)));
    }

    #[test]
    fn overload_resolution_prefers_the_more_specific_parameter() {
        let eval = evaluator();
        let s = Value::Str("hello".into());
        let target = CallTarget::Instance(s);
        // substring(int) vs substring(int,int) differ in arity; equals(Object)
        // and concat(String) exercise assignable matching.
        let out = eval
            .invoke(&target, "substring", &[Value::Int(1)])
            .unwrap();
        assert!(out.loose_eq(&Value::Str("ello".into())));
        let out = eval
            .invoke(&target, "substring", &[Value::Int(1), Value::Int(3)])
            .unwrap();
        assert!(out.loose_eq(&Value::Str("el".into())));
    }

    #[test]
    fn forname_returns_class_refs() {
        let eval = evaluator();
        let target = CallTarget::Class(JavaType::class(CLASS_CLASS));
        let class = eval
            .invoke(&target, "forName", &[Value::Str("java.util.ArrayList".into())])
            .unwrap();
        assert!(matches!(
            class,
            Value::ClassRef(JavaType::Class(name)) if name == "java.util.ArrayList"
        ));
    }
}
