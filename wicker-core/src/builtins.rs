//! Standard class definitions registered by [`ClassRegistry::with_builtins`].
//!
//! The set mirrors what decoded documents most commonly reference: the
//! collection classes, the wrapper hierarchy for boxing, and the reflective
//! anchors (`java.lang.Class`, `java.lang.reflect.Array`). Host applications
//! register their own domain classes next to these.

use crate::errors::{InvokeResult, RaisedError};
use crate::registry::{ClassDef, ClassRegistry};
use crate::types::{JavaType, PrimitiveKind};
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

type ListState = RefCell<Vec<Value>>;
type MapState = RefCell<Vec<(Value, Value)>>;

pub(crate) fn register(registry: &mut ClassRegistry) {
    registry.register(object_class());
    registry.register(string_class());
    registry.register(class_class());
    registry.register(reflect_array_class());
    registry.register(ClassDef::interface("java.lang.CharSequence"));
    registry.register(ClassDef::interface("java.lang.Comparable"));
    registry.register(ClassDef::interface("java.util.Collection"));
    registry.register(ClassDef::interface("java.util.List").implements("java.util.Collection"));
    registry.register(ClassDef::interface("java.util.Map"));
    registry.register(number_class());
    for def in wrapper_classes() {
        registry.register(def);
    }
    registry.register(array_list_class());
    registry.register(hash_map_class());
}

fn raise(msg: String) -> RaisedError {
    msg.into()
}

fn object_class() -> ClassDef {
    ClassDef::new("java.lang.Object")
        .constructor(vec![], |_args| {
            Ok(Value::object("java.lang.Object", Box::new(())))
        })
        .method("toString", vec![], Some(JavaType::string()), |recv, _| {
            Ok(Value::Str(describe(recv)))
        })
        .method(
            "equals",
            vec![JavaType::object()],
            Some(JavaType::Primitive(PrimitiveKind::Boolean)),
            |recv, args| Ok(Value::Boolean(recv.loose_eq(&args[0]))),
        )
        .method(
            "hashCode",
            vec![],
            Some(JavaType::Primitive(PrimitiveKind::Int)),
            |recv, _| Ok(Value::Int(identity_hash(recv))),
        )
        .method("getClass", vec![], Some(JavaType::class("java.lang.Class")), |recv, _| {
            recv.runtime_type()
                .map(Value::ClassRef)
                .ok_or_else(|| raise("null has no class".to_string()))
        })
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(v) => v.to_string(),
        Value::Byte(v) => v.to_string(),
        Value::Short(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Char(v) => v.to_string(),
        Value::Str(v) => v.clone(),
        Value::ClassRef(ty) => format!("class {ty}"),
        Value::Object(body) => format!("{}@{:x}", body.class_name(), Rc::as_ptr(body) as usize),
        Value::Array(body) => {
            let body = body.borrow();
            format!("{}[{}]", body.component, body.elements.len())
        }
    }
}

fn identity_hash(value: &Value) -> i32 {
    match value {
        Value::Object(body) => Rc::as_ptr(body) as usize as i32,
        Value::Array(body) => Rc::as_ptr(body) as *const () as usize as i32,
        other => describe(other).bytes().fold(0i32, |acc, b| {
            acc.wrapping_mul(31).wrapping_add(b as i32)
        }),
    }
}

fn string_class() -> ClassDef {
    ClassDef::new("java.lang.String")
        .implements("java.lang.CharSequence")
        .implements("java.lang.Comparable")
        .constructor(vec![], |_| Ok(Value::Str(String::new())))
        .constructor(vec![JavaType::string()], |args| {
            expect_str(&args[0]).map(|s| Value::Str(s.to_string()))
        })
        .method(
            "length",
            vec![],
            Some(JavaType::Primitive(PrimitiveKind::Int)),
            |recv, _| expect_str(recv).map(|s| Value::Int(s.chars().count() as i32)),
        )
        .method(
            "isEmpty",
            vec![],
            Some(JavaType::Primitive(PrimitiveKind::Boolean)),
            |recv, _| expect_str(recv).map(|s| Value::Boolean(s.is_empty())),
        )
        .method("concat", vec![JavaType::string()], Some(JavaType::string()), |recv, args| {
            let lhs = expect_str(recv)?;
            let rhs = expect_str(&args[0])?;
            Ok(Value::Str(format!("{lhs}{rhs}")))
        })
        .method("toUpperCase", vec![], Some(JavaType::string()), |recv, _| {
            expect_str(recv).map(|s| Value::Str(s.to_uppercase()))
        })
        .method("toLowerCase", vec![], Some(JavaType::string()), |recv, _| {
            expect_str(recv).map(|s| Value::Str(s.to_lowercase()))
        })
        .method(
            "substring",
            vec![JavaType::Primitive(PrimitiveKind::Int)],
            Some(JavaType::string()),
            |recv, args| substring(recv, &args[0], None),
        )
        .method(
            "substring",
            vec![
                JavaType::Primitive(PrimitiveKind::Int),
                JavaType::Primitive(PrimitiveKind::Int),
            ],
            Some(JavaType::string()),
            |recv, args| substring(recv, &args[0], Some(&args[1])),
        )
        .method(
            "charAt",
            vec![JavaType::Primitive(PrimitiveKind::Int)],
            Some(JavaType::Primitive(PrimitiveKind::Char)),
            |recv, args| {
                let s = expect_str(recv)?;
                let idx = expect_int(&args[0])?;
                s.chars()
                    .nth(idx as usize)
                    .map(Value::Char)
                    .ok_or_else(|| raise(format!("string index {idx} out of range")))
            },
        )
        .static_method(
            "valueOf",
            vec![JavaType::object()],
            Some(JavaType::string()),
            |args| Ok(Value::Str(describe(&args[0]))),
        )
}

fn substring(recv: &Value, begin: &Value, end: Option<&Value>) -> InvokeResult {
    let s = expect_str(recv)?;
    let begin = expect_int(begin)? as usize;
    let end = match end {
        Some(v) => expect_int(v)? as usize,
        None => s.chars().count(),
    };
    let total = s.chars().count();
    if begin > end || end > total {
        return Err(raise(format!(
            "begin {begin}, end {end}, length {total}"
        )));
    }
    Ok(Value::Str(s.chars().skip(begin).take(end - begin).collect()))
}

fn class_class() -> ClassDef {
    // Class.forName is resolved by the evaluator itself so the class filter
    // can run against the *argument* before anything is looked up.
    ClassDef::new("java.lang.Class")
        .method("getName", vec![], Some(JavaType::string()), |recv, _| {
            match recv {
                Value::ClassRef(ty) => Ok(Value::Str(ty.to_string())),
                other => Err(raise(format!(
                    "getName on non-class value {}",
                    other.type_label()
                ))),
            }
        })
}

fn reflect_array_class() -> ClassDef {
    // newInstance is resolved by the evaluator (array allocation plan).
    ClassDef::new("java.lang.reflect.Array")
}

fn number_class() -> ClassDef {
    ClassDef::new("java.lang.Number")
}

fn wrapper_classes() -> Vec<ClassDef> {
    let mut defs = Vec::new();
    for kind in PrimitiveKind::ALL {
        let def = ClassDef::new(kind.wrapper_class());
        let def = match kind {
            PrimitiveKind::Boolean | PrimitiveKind::Char => def.implements("java.lang.Comparable"),
            _ => def
                .extends("java.lang.Number")
                .implements("java.lang.Comparable"),
        };
        defs.push(specialize_wrapper(kind, def));
    }
    defs
}

fn specialize_wrapper(kind: PrimitiveKind, def: ClassDef) -> ClassDef {
    match kind {
        PrimitiveKind::Int => def
            .static_method(
                "parseInt",
                vec![JavaType::string()],
                Some(JavaType::Primitive(PrimitiveKind::Int)),
                |args| {
                    let s = expect_str(&args[0])?;
                    s.trim()
                        .parse::<i32>()
                        .map(Value::Int)
                        .map_err(|e| raise(format!("for input string {s:?}: {e}")))
                },
            )
            .static_field(
                "MAX_VALUE",
                JavaType::Primitive(PrimitiveKind::Int),
                || Ok(Value::Int(i32::MAX)),
            )
            .static_field(
                "MIN_VALUE",
                JavaType::Primitive(PrimitiveKind::Int),
                || Ok(Value::Int(i32::MIN)),
            )
            .method(
                "intValue",
                vec![],
                Some(JavaType::Primitive(PrimitiveKind::Int)),
                |recv, _| expect_int(recv).map(Value::Int),
            ),
        PrimitiveKind::Long => def.static_field(
            "MAX_VALUE",
            JavaType::Primitive(PrimitiveKind::Long),
            || Ok(Value::Long(i64::MAX)),
        ),
        _ => def,
    }
}

fn array_list_class() -> ClassDef {
    ClassDef::new("java.util.ArrayList")
        .implements("java.util.List")
        .constructor(vec![], |_| Ok(new_list(Vec::new())))
        .constructor(vec![JavaType::Primitive(PrimitiveKind::Int)], |args| {
            let capacity = expect_int(&args[0])?;
            if capacity < 0 {
                return Err(raise(format!("illegal capacity: {capacity}")));
            }
            Ok(new_list(Vec::with_capacity(capacity as usize)))
        })
        .method(
            "add",
            vec![JavaType::object()],
            Some(JavaType::Primitive(PrimitiveKind::Boolean)),
            |recv, args| {
                list_state(recv)?.borrow_mut().push(args[0].clone());
                Ok(Value::Boolean(true))
            },
        )
        .method(
            "get",
            vec![JavaType::Primitive(PrimitiveKind::Int)],
            Some(JavaType::object()),
            |recv, args| {
                let idx = expect_int(&args[0])?;
                let state = list_state(recv)?.borrow();
                state
                    .get(idx as usize)
                    .cloned()
                    .ok_or_else(|| raise(list_bounds(idx, state.len())))
            },
        )
        .method(
            "set",
            vec![JavaType::Primitive(PrimitiveKind::Int), JavaType::object()],
            Some(JavaType::object()),
            |recv, args| {
                let idx = expect_int(&args[0])?;
                let mut state = list_state(recv)?.borrow_mut();
                let len = state.len();
                let slot = state
                    .get_mut(idx as usize)
                    .ok_or_else(|| raise(list_bounds(idx, len)))?;
                Ok(std::mem::replace(slot, args[1].clone()))
            },
        )
        .method(
            "remove",
            vec![JavaType::Primitive(PrimitiveKind::Int)],
            Some(JavaType::object()),
            |recv, args| {
                let idx = expect_int(&args[0])?;
                let mut state = list_state(recv)?.borrow_mut();
                if (idx as usize) < state.len() {
                    Ok(state.remove(idx as usize))
                } else {
                    Err(raise(list_bounds(idx, state.len())))
                }
            },
        )
        .method(
            "size",
            vec![],
            Some(JavaType::Primitive(PrimitiveKind::Int)),
            |recv, _| Ok(Value::Int(list_state(recv)?.borrow().len() as i32)),
        )
        .method(
            "contains",
            vec![JavaType::object()],
            Some(JavaType::Primitive(PrimitiveKind::Boolean)),
            |recv, args| {
                let found = list_state(recv)?
                    .borrow()
                    .iter()
                    .any(|v| v.loose_eq(&args[0]));
                Ok(Value::Boolean(found))
            },
        )
        .method(
            "clear",
            vec![],
            None,
            |recv, _| {
                list_state(recv)?.borrow_mut().clear();
                Ok(Value::Null)
            },
        )
}

fn new_list(elements: Vec<Value>) -> Value {
    Value::object("java.util.ArrayList", Box::new(RefCell::new(elements)))
}

fn list_bounds(index: i32, len: usize) -> String {
    format!("index {index} out of bounds for length {len}")
}

fn list_state(recv: &Value) -> Result<&ListState, RaisedError> {
    recv.as_object()
        .and_then(|body| body.state::<ListState>())
        .ok_or_else(|| raise("receiver is not an ArrayList".to_string()))
}

fn hash_map_class() -> ClassDef {
    ClassDef::new("java.util.HashMap")
        .implements("java.util.Map")
        .constructor(vec![], |_| {
            Ok(Value::object(
                "java.util.HashMap",
                Box::new(RefCell::new(Vec::<(Value, Value)>::new())),
            ))
        })
        .method(
            "put",
            vec![JavaType::object(), JavaType::object()],
            Some(JavaType::object()),
            |recv, args| {
                let mut state = map_state(recv)?.borrow_mut();
                for (key, value) in state.iter_mut() {
                    if key.loose_eq(&args[0]) {
                        return Ok(std::mem::replace(value, args[1].clone()));
                    }
                }
                state.push((args[0].clone(), args[1].clone()));
                Ok(Value::Null)
            },
        )
        .method(
            "get",
            vec![JavaType::object()],
            Some(JavaType::object()),
            |recv, args| {
                let state = map_state(recv)?.borrow();
                Ok(state
                    .iter()
                    .find(|(key, _)| key.loose_eq(&args[0]))
                    .map(|(_, value)| value.clone())
                    .unwrap_or(Value::Null))
            },
        )
        .method(
            "containsKey",
            vec![JavaType::object()],
            Some(JavaType::Primitive(PrimitiveKind::Boolean)),
            |recv, args| {
                let found = map_state(recv)?
                    .borrow()
                    .iter()
                    .any(|(key, _)| key.loose_eq(&args[0]));
                Ok(Value::Boolean(found))
            },
        )
        .method(
            "remove",
            vec![JavaType::object()],
            Some(JavaType::object()),
            |recv, args| {
                let mut state = map_state(recv)?.borrow_mut();
                match state.iter().position(|(key, _)| key.loose_eq(&args[0])) {
                    Some(idx) => Ok(state.remove(idx).1),
                    None => Ok(Value::Null),
                }
            },
        )
        .method(
            "size",
            vec![],
            Some(JavaType::Primitive(PrimitiveKind::Int)),
            |recv, _| Ok(Value::Int(map_state(recv)?.borrow().len() as i32)),
        )
}

fn map_state(recv: &Value) -> Result<&MapState, RaisedError> {
    recv.as_object()
        .and_then(|body| body.state::<MapState>())
        .ok_or_else(|| raise("receiver is not a HashMap".to_string()))
}

fn expect_str(value: &Value) -> Result<&str, RaisedError> {
    value
        .as_str()
        .ok_or_else(|| raise(format!("expected a string, got {}", value.type_label())))
}

fn expect_int(value: &Value) -> Result<i32, RaisedError> {
    value
        .as_int()
        .ok_or_else(|| raise(format!("expected an int, got {}", value.type_label())))
}
