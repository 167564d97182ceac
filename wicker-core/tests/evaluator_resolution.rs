//! End-to-end resolution behavior: overload specificity, ambiguity handling,
//! and filter enforcement.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use wicker_core::{
    CallTarget, ClassDef, ClassRegistry, ConstructorDesc, EvalError, Evaluator, JavaType,
    MethodDesc, PermitAllFilter, PolicyViolation, PrimitiveKind, Value, WhitelistFilter,
};

/// A class with `(String)` and `(Object)` constructors, recording which ran.
fn holder_class() -> ClassDef {
    ClassDef::new("test.Holder")
        .constructor(vec![JavaType::string()], |args| {
            Ok(Value::object(
                "test.Holder",
                Box::new(RefCell::new(format!("string:{:?}", args[0].as_str()))),
            ))
        })
        .constructor(vec![JavaType::object()], |_args| {
            Ok(Value::object(
                "test.Holder",
                Box::new(RefCell::new("object".to_string())),
            ))
        })
        .method("getTag", vec![], Some(JavaType::string()), |recv, _| {
            let tag = recv
                .as_object()
                .and_then(|b| b.state::<RefCell<String>>())
                .ok_or("not a Holder")?;
            Ok(Value::Str(tag.borrow().clone()))
        })
}

fn registry_with(defs: Vec<ClassDef>) -> Rc<ClassRegistry> {
    let mut registry = ClassRegistry::with_builtins();
    for def in defs {
        registry.register(def);
    }
    Rc::new(registry)
}

fn unrestricted(defs: Vec<ClassDef>) -> Evaluator {
    Evaluator::new(registry_with(defs), Arc::new(PermitAllFilter))
}

#[test]
fn string_constructor_beats_object_constructor() {
    let eval = unrestricted(vec![holder_class()]);
    let target = CallTarget::Class(JavaType::class("test.Holder"));

    // Deterministic across runs: the more specific overload always wins.
    for _ in 0..20 {
        let holder = eval
            .invoke(&target, "new", &[Value::Str("hi".into())])
            .unwrap();
        let tag = eval
            .invoke(&CallTarget::Instance(holder), "getTag", &[])
            .unwrap();
        assert_eq!(tag.as_str().unwrap(), "string:Some(\"hi\")");
    }

    // A non-string argument falls through to the (Object) overload.
    let list = eval
        .invoke(
            &CallTarget::Class(JavaType::class("java.util.ArrayList")),
            "new",
            &[],
        )
        .unwrap();
    let holder = eval.invoke(&target, "new", &[list]).unwrap();
    let tag = eval
        .invoke(&CallTarget::Instance(holder), "getTag", &[])
        .unwrap();
    assert_eq!(tag.as_str().unwrap(), "object");
}

#[test]
fn true_constructor_ties_are_hard_failures() {
    // Two unrelated single-argument reference overloads: a null argument
    // matches both at the same distance and nothing can break the tie.
    let ambiguous = ClassDef::new("test.Ambiguous")
        .constructor(vec![JavaType::string()], |_| {
            Ok(Value::object("test.Ambiguous", Box::new(())))
        })
        .constructor(vec![JavaType::class("java.util.ArrayList")], |_| {
            Ok(Value::object("test.Ambiguous", Box::new(())))
        });
    let eval = unrestricted(vec![ambiguous]);

    let err = eval
        .invoke(
            &CallTarget::Class(JavaType::class("test.Ambiguous")),
            "new",
            &[Value::Null],
        )
        .unwrap_err();
    assert!(
        matches!(err, EvalError::AmbiguousConstructor { .. }),
        "expected ambiguity, got {err:?}"
    );
}

#[test]
fn no_matching_constructor_is_benign() {
    let eval = unrestricted(vec![holder_class()]);
    let err = eval
        .invoke(
            &CallTarget::Class(JavaType::class("test.Holder")),
            "new",
            &[Value::Int(1), Value::Int(2)],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EvalError::NoSuchConstructor { ref class, arity: 2 } if class == "test.Holder"
    ));
    assert!(!err.is_policy_violation());
}

#[test]
fn method_tie_broken_by_narrower_return_type() {
    let covariant = ClassDef::new("test.Covariant")
        .constructor(vec![], |_| Ok(Value::object("test.Covariant", Box::new(()))))
        .method(
            "self",
            vec![],
            Some(JavaType::object()),
            |_recv, _| Ok(Value::Str("wide".into())),
        )
        .method(
            "self",
            vec![],
            Some(JavaType::string()),
            |_recv, _| Ok(Value::Str("narrow".into())),
        );
    let eval = unrestricted(vec![covariant]);
    let instance = eval
        .invoke(
            &CallTarget::Class(JavaType::class("test.Covariant")),
            "new",
            &[],
        )
        .unwrap();
    let out = eval
        .invoke(&CallTarget::Instance(instance), "self", &[])
        .unwrap();
    assert_eq!(out.as_str().unwrap(), "narrow");
}

#[test]
fn filter_rejections_are_typed_per_member_kind() {
    // Permits the class and nothing else.
    let filter = WhitelistFilter::new().allow_class("java.util.ArrayList");
    let eval = Evaluator::new(registry_with(vec![]), Arc::new(filter));
    let list_class = CallTarget::Class(JavaType::class("java.util.ArrayList"));

    let err = eval.invoke(&list_class, "new", &[]).unwrap_err();
    assert!(matches!(
        err,
        EvalError::Policy(PolicyViolation::ConstructorNotPermitted(ref desc))
            if *desc == ConstructorDesc::new("java.util.ArrayList", vec![])
    ));

    let err = eval
        .invoke(
            &CallTarget::Class(JavaType::class("java.lang.Integer")),
            "parseInt",
            &[Value::Str("1".into())],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EvalError::Policy(PolicyViolation::MethodNotPermitted(_))
    ));

    let err = eval.class_for_name("java.util.HashMap").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Policy(PolicyViolation::ClassNotPermitted(ref name))
            if name == "java.util.HashMap"
    ));
}

#[test]
fn class_permission_is_checked_before_lookup() {
    // The class is not registered, but the policy check must fire first:
    // an unpermitted name reports the policy violation, not "not found".
    let filter = WhitelistFilter::new();
    let eval = Evaluator::new(registry_with(vec![]), Arc::new(filter));
    let err = eval.class_for_name("ghost.Unregistered").unwrap_err();
    assert!(err.is_policy_violation());
}

#[test]
fn permitted_but_unregistered_class_is_not_found() {
    let filter = WhitelistFilter::new().allow_class("ghost.Unregistered");
    let eval = Evaluator::new(registry_with(vec![]), Arc::new(filter));
    let err = eval.class_for_name("ghost.Unregistered").unwrap_err();
    assert!(matches!(err, EvalError::ClassNotFound(ref name) if name == "ghost.Unregistered"));
}

#[test]
fn field_reads_are_gated_through_the_method_filter() {
    let filter = WhitelistFilter::new().allow_class("java.lang.Integer");
    let eval = Evaluator::new(registry_with(vec![]), Arc::new(filter));
    let integer = CallTarget::Class(JavaType::class("java.lang.Integer"));

    let err = eval.get_field(&integer, "MAX_VALUE").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Policy(PolicyViolation::MethodNotPermitted(ref desc))
            if *desc == MethodDesc::new("java.lang.Integer", "MAX_VALUE", vec![])
    ));

    let open = WhitelistFilter::new().allow_method("java.lang.Integer.MAX_VALUE");
    let eval = Evaluator::new(registry_with(vec![]), Arc::new(open));
    let max = eval.get_field(&integer, "MAX_VALUE").unwrap();
    assert!(max.loose_eq(&Value::Int(i32::MAX)));
}

#[test]
fn evaluators_do_not_share_resolution_state() {
    // Two evaluators over different registries resolve the same name to
    // their own classes; nothing is cached globally.
    let variant_a = ClassDef::new("test.Variant")
        .constructor(vec![], |_| Ok(Value::object("test.Variant", Box::new(()))))
        .method("tag", vec![], Some(JavaType::string()), |_, _| {
            Ok(Value::Str("a".into()))
        });
    let variant_b = ClassDef::new("test.Variant")
        .constructor(vec![], |_| Ok(Value::object("test.Variant", Box::new(()))))
        .method("tag", vec![], Some(JavaType::string()), |_, _| {
            Ok(Value::Str("b".into()))
        });

    let eval_a = unrestricted(vec![variant_a]);
    let eval_b = unrestricted(vec![variant_b]);
    let class = CallTarget::Class(JavaType::class("test.Variant"));

    let a = eval_a.invoke(&class, "new", &[]).unwrap();
    let b = eval_b.invoke(&class, "new", &[]).unwrap();
    let tag_a = eval_a.invoke(&CallTarget::Instance(a), "tag", &[]).unwrap();
    let tag_b = eval_b.invoke(&CallTarget::Instance(b), "tag", &[]).unwrap();
    assert_eq!(tag_a.as_str().unwrap(), "a");
    assert_eq!(tag_b.as_str().unwrap(), "b");
}

#[test]
fn boxed_arguments_bind_to_primitive_parameters() {
    let eval = unrestricted(vec![]);
    let list = eval
        .invoke(
            &CallTarget::Class(JavaType::class("java.util.ArrayList")),
            "new",
            &[Value::Int(8)],
        )
        .unwrap();
    let size = eval
        .invoke(&CallTarget::Instance(list), "size", &[])
        .unwrap();
    assert!(size.loose_eq(&Value::Int(0)));

    // int cannot receive a long.
    let err = eval
        .invoke(
            &CallTarget::Class(JavaType::class("java.util.ArrayList")),
            "new",
            &[Value::Long(8)],
        )
        .unwrap_err();
    assert!(matches!(err, EvalError::NoSuchConstructor { .. }));
}

#[test]
fn null_arguments_match_any_reference_parameter() {
    let eval = unrestricted(vec![holder_class()]);
    let list = eval
        .invoke(
            &CallTarget::Class(JavaType::class("java.util.ArrayList")),
            "new",
            &[],
        )
        .unwrap();
    eval.invoke(&CallTarget::Instance(list.clone()), "add", &[Value::Null])
        .unwrap();
    let got = eval
        .invoke(&CallTarget::Instance(list), "get", &[Value::Int(0)])
        .unwrap();
    assert!(got.is_null());
}

#[test]
fn primitive_kind_checks_apply_to_primitive_arrays() {
    let eval = unrestricted(vec![]);
    for (kind, good) in [
        (PrimitiveKind::Boolean, Value::Boolean(true)),
        (PrimitiveKind::Byte, Value::Byte(1)),
        (PrimitiveKind::Short, Value::Short(1)),
        (PrimitiveKind::Int, Value::Int(1)),
        (PrimitiveKind::Long, Value::Long(1)),
        (PrimitiveKind::Float, Value::Float(1.0)),
        (PrimitiveKind::Double, Value::Double(1.0)),
        (PrimitiveKind::Char, Value::Char('a')),
    ] {
        let target = CallTarget::Class(JavaType::Primitive(kind));
        let array = eval.invoke(&target, "newArray", &[good.clone()]).unwrap();
        assert_eq!(array.as_array().unwrap().borrow().elements.len(), 1);

        let err = eval
            .invoke(&target, "newArray", &[Value::Str("nope".into())])
            .unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch(_)), "{kind:?}");
    }
}
