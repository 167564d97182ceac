//! Frame model: one entry per XML element currently open, each carrying its
//! lifecycle flags and the argument values its closed children produced.

use wicker_core::{JavaType, Value};

/// The operation an `<object>`/`<void>` element resolves through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FrameOp {
    /// Constructor invocation (the default when no operation attribute is
    /// present).
    New,
    Method(String),
    Property(String),
    Index(i32),
    Field(String),
    /// Method named by the `owner` attribute, invoked on the decoder's owner
    /// object.
    Owner(String),
}

#[derive(Debug)]
pub(crate) enum FrameKind {
    Object {
        /// Eagerly resolved `class` attribute; `None` means the target is
        /// implicit (enclosing frame's value, or the owner).
        class: Option<JavaType>,
        op: FrameOp,
    },
    Array {
        component: JavaType,
        /// Present when a `length` attribute preallocated the array.
        sized: bool,
    },
    Literal(LiteralKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LiteralKind {
    Str,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Class,
    Null,
}

impl LiteralKind {
    pub(crate) fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "string" => LiteralKind::Str,
            "boolean" => LiteralKind::Boolean,
            "byte" => LiteralKind::Byte,
            "short" => LiteralKind::Short,
            "int" => LiteralKind::Int,
            "long" => LiteralKind::Long,
            "float" => LiteralKind::Float,
            "double" => LiteralKind::Double,
            "char" => LiteralKind::Char,
            "class" => LiteralKind::Class,
            "null" => LiteralKind::Null,
            _ => return None,
        })
    }
}

/// One in-progress XML element.
///
/// The stack holds only *open* frames; a child that closes hands its result
/// to its parent's `args` (or to the decoder's output queue at top level), so
/// argument order is exactly document order.
#[derive(Debug)]
pub(crate) struct Frame {
    pub tag: &'static str,
    pub kind: FrameKind,
    pub id: Option<String>,
    pub idref: Option<String>,
    /// Accumulated character data (literals only).
    pub text: String,
    /// Whether the frame's result is visible to the enclosing frame.
    pub expression: bool,
    /// A result has been computed and memoized; never recomputed.
    pub executed: bool,
    /// The frame failed benignly; its result is null.
    pub failed: bool,
    /// Results of closed expression children, in document order.
    pub args: Vec<Value>,
    pub result: Value,
}

impl Frame {
    pub(crate) fn new(tag: &'static str, kind: FrameKind, expression: bool) -> Self {
        Self {
            tag,
            kind,
            id: None,
            idref: None,
            text: String::new(),
            expression,
            executed: false,
            failed: false,
            args: Vec::new(),
            result: Value::Null,
        }
    }

    pub(crate) fn is_literal(&self) -> bool {
        matches!(self.kind, FrameKind::Literal(_))
    }

    /// Whether execution must resolve the target from the enclosing frame
    /// (or the owner) rather than an explicit class or idref.
    pub(crate) fn needs_implicit_target(&self) -> bool {
        if self.idref.is_some() || self.failed {
            return false;
        }
        matches!(
            self.kind,
            FrameKind::Object {
                class: None,
                op: FrameOp::New
                    | FrameOp::Method(_)
                    | FrameOp::Property(_)
                    | FrameOp::Index(_)
                    | FrameOp::Field(_),
            }
        )
    }
}
