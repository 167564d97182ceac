use crate::errors::EvalError;
use std::fmt;
use std::str::FromStr;

/// Fully-qualified name of the universal reference supertype.
pub const OBJECT_CLASS: &str = "java.lang.Object";

/// The eight primitive kinds, with their wrapper-class mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Char,
    ];

    /// Source-style type name (`int`, `boolean`, ...).
    pub fn type_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Char => "char",
        }
    }

    /// Fully-qualified wrapper class name (`java.lang.Integer`, ...).
    pub fn wrapper_class(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
            PrimitiveKind::Char => "java.lang.Character",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }

    pub fn from_wrapper_class(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.wrapper_class() == name)
    }
}

/// A type descriptor: primitive, named reference class, or array thereof.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Primitive(PrimitiveKind),
    Class(String),
    Array(Box<JavaType>),
}

impl JavaType {
    pub fn class(name: impl Into<String>) -> Self {
        JavaType::Class(name.into())
    }

    pub fn object() -> Self {
        JavaType::Class(OBJECT_CLASS.to_string())
    }

    pub fn string() -> Self {
        JavaType::Class("java.lang.String".to_string())
    }

    pub fn array_of(component: JavaType) -> Self {
        JavaType::Array(Box::new(component))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, JavaType::Primitive(_))
    }

    /// Reference class name, if this is a plain class type.
    pub fn as_class_name(&self) -> Option<&str> {
        match self {
            JavaType::Class(name) => Some(name),
            _ => None,
        }
    }

    /// Innermost non-array type of this descriptor.
    pub fn base(&self) -> &JavaType {
        match self {
            JavaType::Array(component) => component.base(),
            other => other,
        }
    }

    /// Parse a source-style type name: `int`, `java.lang.String`,
    /// `java.lang.String[]`, `int[][]`.
    pub fn parse(input: &str) -> Result<Self, EvalError> {
        let name = input.trim();
        if let Some(component) = name.strip_suffix("[]") {
            return Ok(JavaType::array_of(JavaType::parse(component)?));
        }
        if let Some(kind) = PrimitiveKind::from_type_name(name) {
            return Ok(JavaType::Primitive(kind));
        }
        validate_class_name(name).map_err(|_| EvalError::InvalidTypeName(input.to_string()))?;
        Ok(JavaType::Class(name.to_string()))
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Primitive(kind) => f.write_str(kind.type_name()),
            JavaType::Class(name) => f.write_str(name),
            JavaType::Array(component) => write!(f, "{component}[]"),
        }
    }
}

impl FromStr for JavaType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JavaType::parse(s)
    }
}

/// Validate a fully-qualified class name.
pub fn validate_class_name(name: &str) -> Result<(), EvalError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '$'));
    if valid {
        Ok(())
    } else {
        Err(EvalError::InvalidTypeName(name.to_string()))
    }
}
