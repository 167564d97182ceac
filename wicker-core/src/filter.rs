//! The security policy consulted before every class load, constructor call,
//! or method call triggered by evaluation or decoding.

use crate::types::JavaType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Descriptor of a constructor about to be invoked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructorDesc {
    pub class: String,
    pub params: Vec<JavaType>,
}

impl ConstructorDesc {
    pub fn new(class: impl Into<String>, params: Vec<JavaType>) -> Self {
        Self {
            class: class.into(),
            params,
        }
    }
}

impl fmt::Display for ConstructorDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.class, join_params(&self.params))
    }
}

/// Descriptor of a method about to be invoked.
///
/// Field accesses are funnelled through [`ClassFilter::permit_method`] with a
/// synthetic descriptor (field name, zero params for a read / one for a
/// write) so the field path can never bypass member filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDesc {
    pub class: String,
    pub name: String,
    pub params: Vec<JavaType>,
}

impl MethodDesc {
    pub fn new(class: impl Into<String>, name: impl Into<String>, params: Vec<JavaType>) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            params,
        }
    }

    /// `class.name` without the parameter list, the coarse whitelist key.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class, self.name)
    }
}

impl fmt::Display for MethodDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.class,
            self.name,
            join_params(&self.params)
        )
    }
}

fn join_params(params: &[JavaType]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Pure, side-effect-free permission predicate.
///
/// Every class name that will be resolved and every reflective member
/// invocation is checked with the corresponding predicate immediately before
/// the resolution/invocation happens. A `false` answer aborts the operation
/// as a [`crate::errors::PolicyViolation`].
pub trait ClassFilter: Send + Sync {
    fn permit_class(&self, class_name: &str) -> bool;
    fn permit_constructor(&self, ctor: &ConstructorDesc) -> bool;
    fn permit_method(&self, method: &MethodDesc) -> bool;
}

impl<T> ClassFilter for Arc<T>
where
    T: ClassFilter + ?Sized,
{
    fn permit_class(&self, class_name: &str) -> bool {
        (**self).permit_class(class_name)
    }

    fn permit_constructor(&self, ctor: &ConstructorDesc) -> bool {
        (**self).permit_constructor(ctor)
    }

    fn permit_method(&self, method: &MethodDesc) -> bool {
        (**self).permit_method(method)
    }
}

impl<T> ClassFilter for Box<T>
where
    T: ClassFilter + ?Sized,
{
    fn permit_class(&self, class_name: &str) -> bool {
        (**self).permit_class(class_name)
    }

    fn permit_constructor(&self, ctor: &ConstructorDesc) -> bool {
        (**self).permit_constructor(ctor)
    }

    fn permit_method(&self, method: &MethodDesc) -> bool {
        (**self).permit_method(method)
    }
}

/// Diagnostic-only filter that permits everything.
///
/// Never a default anywhere; it is only reachable through the explicit
/// `*_unfiltered` constructors, which log loudly when they engage it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermitAllFilter;

impl ClassFilter for PermitAllFilter {
    fn permit_class(&self, _class_name: &str) -> bool {
        true
    }

    fn permit_constructor(&self, _ctor: &ConstructorDesc) -> bool {
        true
    }

    fn permit_method(&self, _method: &MethodDesc) -> bool {
        true
    }
}

/// Explicit allow-list filter.
///
/// Classes are matched by fully-qualified name. Constructors match either the
/// bare class name (any overload) or the full rendered descriptor
/// `class(paramtypes)`. Methods match either `class.name` (any overload) or
/// the full rendered descriptor `class.name(paramtypes)`.
///
/// The type deserializes from JSON so deployments can ship the policy as
/// configuration:
///
/// ```json
/// {
///   "classes": ["java.util.ArrayList"],
///   "constructors": ["java.util.ArrayList"],
///   "methods": ["java.util.ArrayList.add"]
/// }
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhitelistFilter {
    #[serde(default)]
    classes: BTreeSet<String>,
    #[serde(default)]
    constructors: BTreeSet<String>,
    #[serde(default)]
    methods: BTreeSet<String>,
}

impl WhitelistFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a whitelist from its JSON representation.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Permit a class by fully-qualified name.
    pub fn allow_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    /// Permit every constructor overload of a class, or a single overload
    /// when the entry carries a parameter list.
    pub fn allow_constructor(mut self, entry: impl Into<String>) -> Self {
        self.constructors.insert(entry.into());
        self
    }

    /// Permit a method by `class.name`, or a single overload when the entry
    /// carries a parameter list.
    pub fn allow_method(mut self, entry: impl Into<String>) -> Self {
        self.methods.insert(entry.into());
        self
    }
}

impl ClassFilter for WhitelistFilter {
    fn permit_class(&self, class_name: &str) -> bool {
        self.classes.contains(class_name)
    }

    fn permit_constructor(&self, ctor: &ConstructorDesc) -> bool {
        self.constructors.contains(&ctor.class) || self.constructors.contains(&ctor.to_string())
    }

    fn permit_method(&self, method: &MethodDesc) -> bool {
        self.methods.contains(&method.qualified_name())
            || self.methods.contains(&method.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveKind;

    fn add_desc() -> MethodDesc {
        MethodDesc::new("java.util.ArrayList", "add", vec![JavaType::object()])
    }

    #[test]
    fn descriptor_rendering() {
        assert_eq!(
            add_desc().to_string(),
            "java.util.ArrayList.add(java.lang.Object)"
        );
        let ctor = ConstructorDesc::new(
            "java.util.ArrayList",
            vec![JavaType::Primitive(PrimitiveKind::Int)],
        );
        assert_eq!(ctor.to_string(), "java.util.ArrayList(int)");
    }

    #[test]
    fn whitelist_matches_coarse_and_exact_entries() {
        let filter = WhitelistFilter::new()
            .allow_class("java.util.ArrayList")
            .allow_constructor("java.util.ArrayList")
            .allow_method("java.util.ArrayList.add");

        assert!(filter.permit_class("java.util.ArrayList"));
        assert!(!filter.permit_class("java.lang.Runtime"));
        assert!(filter.permit_method(&add_desc()));
        assert!(!filter.permit_method(&MethodDesc::new(
            "java.util.ArrayList",
            "clear",
            vec![]
        )));

        let exact = WhitelistFilter::new()
            .allow_method("java.util.ArrayList.add(java.lang.Object)");
        assert!(exact.permit_method(&add_desc()));
        assert!(!exact.permit_method(&MethodDesc::new(
            "java.util.ArrayList",
            "add",
            vec![JavaType::string()]
        )));
    }

    #[test]
    fn whitelist_deserializes_from_json() {
        let filter = WhitelistFilter::from_json(
            r#"{"classes":["java.util.ArrayList"],"methods":["java.util.ArrayList.add"]}"#,
        )
        .expect("json");
        assert!(filter.permit_class("java.util.ArrayList"));
        assert!(filter.permit_method(&add_desc()));
        assert!(!filter.permit_constructor(&ConstructorDesc::new("java.util.ArrayList", vec![])));
    }
}
