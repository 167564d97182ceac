//! Core primitives for safe object-graph reconstruction: the dynamic value
//! model, the explicit class registry, the whitelist policy contract, and the
//! expression/statement evaluator that resolves and invokes registered
//! operations under that policy.

pub mod builtins;
pub mod errors;
pub mod eval;
pub mod filter;
pub mod registry;
pub mod types;
pub mod value;

pub use errors::{EvalError, EvalResult, InvokeResult, PolicyViolation, RaisedError};
pub use eval::{CallTarget, Evaluator};
pub use filter::{ClassFilter, ConstructorDesc, MethodDesc, PermitAllFilter, WhitelistFilter};
pub use registry::{ClassDef, ClassRegistry, ConstructorDef, FieldDef, MethodDef};
pub use types::{JavaType, PrimitiveKind, OBJECT_CLASS};
pub use value::{ArrayBody, ArrayRef, ObjRef, ObjectBody, Value};
