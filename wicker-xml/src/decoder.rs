//! The element-stack decode machine.
//!
//! Parsing is event-driven: start tags push frames, character data
//! accumulates into literal frames, end tags execute and fold frames into
//! their parents. The stack holds only open frames; each open frame carries
//! the results its closed children produced, in document order.

use crate::error::{DecodeError, DecodeResult};
use crate::frame::{Frame, FrameKind, FrameOp, LiteralKind};
use crate::limits::DecodeLimits;
use crate::listener::{DecodeListener, TracingListener};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{HashMap, VecDeque};
use std::io::BufRead;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;
use wicker_core::{
    CallTarget, ClassFilter, ClassRegistry, EvalError, Evaluator, JavaType, Value,
};

const ROOT_TAG: &str = "java";
const REFLECT_ARRAY_CLASS: &str = "java.lang.reflect.Array";

/// Configures and creates [`SafeXmlDecoder`] instances.
pub struct SafeXmlDecoderBuilder {
    evaluator: Rc<Evaluator>,
    limits: DecodeLimits,
    listener: Box<dyn DecodeListener>,
    owner: Option<Value>,
}

impl SafeXmlDecoderBuilder {
    /// A decoder over the given registry, guarded by the given filter.
    pub fn new(registry: Rc<ClassRegistry>, filter: Arc<dyn ClassFilter>) -> Self {
        Self::with_evaluator(Rc::new(Evaluator::new(registry, filter)))
    }

    /// Diagnostic-only: a decoder with all class filtering disabled. The
    /// escape hatch is scoped to this decoder instance and logs loudly.
    pub fn unfiltered(registry: Rc<ClassRegistry>) -> Self {
        Self::with_evaluator(Rc::new(Evaluator::unfiltered(registry)))
    }

    /// Reuse an existing evaluator (and therefore its resolution cache).
    pub fn with_evaluator(evaluator: Rc<Evaluator>) -> Self {
        Self {
            evaluator,
            limits: DecodeLimits::default(),
            listener: Box::new(TracingListener),
            owner: None,
        }
    }

    pub fn limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn listener(mut self, listener: impl DecodeListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    /// Object targeted by `owner` attributes and by top-level elements with
    /// no `class` attribute.
    pub fn owner(mut self, owner: Value) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn decode_str(self, xml: &str) -> SafeXmlDecoder<&[u8]> {
        self.build(Reader::from_str(xml))
    }

    pub fn decode_reader<R: BufRead>(self, reader: R) -> SafeXmlDecoder<R> {
        self.build(Reader::from_reader(reader))
    }

    fn build<R: BufRead>(self, reader: Reader<R>) -> SafeXmlDecoder<R> {
        SafeXmlDecoder {
            reader,
            evaluator: self.evaluator,
            limits: self.limits,
            listener: self.listener,
            owner: self.owner,
            started: false,
            results: VecDeque::new(),
        }
    }
}

/// Streaming decoder for the restricted `<java>` object-graph dialect.
///
/// The caller owns the underlying reader; the decoder opens and closes
/// nothing itself.
pub struct SafeXmlDecoder<R: BufRead> {
    reader: Reader<R>,
    evaluator: Rc<Evaluator>,
    limits: DecodeLimits,
    listener: Box<dyn DecodeListener>,
    owner: Option<Value>,
    started: bool,
    results: VecDeque<Value>,
}

impl<R: BufRead> SafeXmlDecoder<R> {
    /// Return the next completed top-level value.
    ///
    /// The first call drives the parse to completion. Asking for more values
    /// than the stream holds is a bounds failure
    /// ([`DecodeError::NoMoreObjects`]), never a null; after a structural
    /// failure no partial results are served.
    pub fn read_object(&mut self) -> DecodeResult<Value> {
        if !self.started {
            self.started = true;
            if let Err(err) = self.drive() {
                self.results.clear();
                self.listener.error(&err);
                return Err(err);
            }
        }
        self.results.pop_front().ok_or(DecodeError::NoMoreObjects)
    }

    fn drive(&mut self) -> DecodeResult<()> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut ids: HashMap<String, Value> = HashMap::new();
        let mut buf = Vec::new();
        let mut root_seen = false;
        let mut root_open = false;
        loop {
            let event = self
                .reader
                .read_event_into(&mut buf)
                .map_err(|err| DecodeError::Parse(err.to_string()))?;
            match event {
                Event::Decl(_) | Event::Comment(_) => {}
                Event::PI(_) => self.listener.warning("processing instruction ignored"),
                Event::DocType(_) => return Err(DecodeError::DoctypeForbidden),
                Event::Start(start) => {
                    self.on_start(&start, &mut stack, &mut root_seen, &mut root_open)?
                }
                Event::Empty(start) => {
                    self.on_start(&start, &mut stack, &mut root_seen, &mut root_open)?;
                    // The root element is never empty; a pushed frame closes
                    // immediately.
                    if root_open && !stack.is_empty() {
                        self.on_end(&mut stack, &mut ids, &mut root_open)?;
                    }
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|err| DecodeError::EntityForbidden(err.to_string()))?;
                    self.on_text(&text, &mut stack);
                }
                Event::CData(data) => {
                    let raw = data.into_inner();
                    let text = std::str::from_utf8(&raw)
                        .map_err(|err| DecodeError::Parse(err.to_string()))?
                        .to_string();
                    self.on_text(&text, &mut stack);
                }
                Event::End(_) => self.on_end(&mut stack, &mut ids, &mut root_open)?,
                Event::Eof => break,
            }
            buf.clear();
        }
        debug!(
            top_level = self.results.len(),
            ids = ids.len(),
            "document decoded"
        );
        Ok(())
    }

    fn on_start(
        &self,
        start: &BytesStart<'_>,
        stack: &mut Vec<Frame>,
        root_seen: &mut bool,
        root_open: &mut bool,
    ) -> DecodeResult<()> {
        let name = start.name();
        let tag = std::str::from_utf8(name.as_ref())
            .map_err(|err| DecodeError::Parse(err.to_string()))?
            .to_string();
        if !*root_seen {
            if tag != ROOT_TAG {
                return Err(DecodeError::UnknownTag(tag));
            }
            // Root attributes (version markers and the like) carry nothing
            // the decoder acts on.
            *root_seen = true;
            *root_open = true;
            return Ok(());
        }
        if !*root_open {
            return Err(DecodeError::Parse(format!(
                "content after the document root: <{tag}>"
            )));
        }
        if let Some(parent) = stack.last() {
            if parent.is_literal() {
                return Err(DecodeError::UnexpectedElement {
                    parent: parent.tag.to_string(),
                    child: tag,
                });
            }
            if parent.idref.is_some() {
                return Err(DecodeError::BadAttributes {
                    element: parent.tag.to_string(),
                    detail: "idref elements must not have children".to_string(),
                });
            }
        }
        if stack.len() + 1 > self.limits.max_depth {
            return Err(DecodeError::DepthExceeded {
                depth: stack.len() + 1,
                max: self.limits.max_depth,
            });
        }
        let attrs = self.read_attrs(start)?;
        let frame = self.make_frame(&tag, attrs)?;
        stack.push(frame);
        Ok(())
    }

    fn read_attrs(&self, start: &BytesStart<'_>) -> DecodeResult<Vec<(String, String)>> {
        let mut out = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| DecodeError::Parse(err.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| DecodeError::Parse(err.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|err| DecodeError::EntityForbidden(err.to_string()))?
                .into_owned();
            out.push((key, value));
        }
        Ok(out)
    }

    fn make_frame(&self, tag: &str, attrs: Vec<(String, String)>) -> DecodeResult<Frame> {
        match tag {
            "object" => self.object_frame("object", attrs, false),
            "void" => self.object_frame("void", attrs, true),
            "array" => self.array_frame(attrs),
            other => match LiteralKind::from_tag(other) {
                Some(kind) => self.literal_frame(kind, attrs),
                None => Err(DecodeError::UnknownTag(other.to_string())),
            },
        }
    }

    fn object_frame(
        &self,
        tag: &'static str,
        attrs: Vec<(String, String)>,
        void: bool,
    ) -> DecodeResult<Frame> {
        let mut id = None;
        let mut idref = None;
        let mut class_attr = None;
        let mut ops: Vec<FrameOp> = Vec::new();
        for (key, value) in attrs {
            match key.as_str() {
                "id" => id = Some(value),
                "idref" => idref = Some(value),
                "class" => class_attr = Some(value),
                "method" => ops.push(FrameOp::Method(value)),
                "property" => ops.push(FrameOp::Property(value)),
                "index" => {
                    let index = value.trim().parse::<i32>().map_err(|_| {
                        DecodeError::BadAttributes {
                            element: tag.to_string(),
                            detail: format!("invalid index {value:?}"),
                        }
                    })?;
                    ops.push(FrameOp::Index(index));
                }
                "field" => ops.push(FrameOp::Field(value)),
                "owner" => ops.push(FrameOp::Owner(value)),
                other => self
                    .listener
                    .warning(&format!("ignoring attribute {other:?} on <{tag}>")),
            }
        }

        if let Some(idref) = idref {
            if id.is_some() || class_attr.is_some() || !ops.is_empty() {
                return Err(DecodeError::BadAttributes {
                    element: tag.to_string(),
                    detail: "idref excludes every other attribute".to_string(),
                });
            }
            let mut frame = Frame::new(
                tag,
                FrameKind::Object {
                    class: None,
                    op: FrameOp::New,
                },
                !void,
            );
            frame.idref = Some(idref);
            return Ok(frame);
        }

        if ops.len() > 1 {
            return Err(DecodeError::BadAttributes {
                element: tag.to_string(),
                detail: "at most one of method/property/index/field/owner".to_string(),
            });
        }
        let op = ops.pop().unwrap_or(FrameOp::New);
        let (class, failed) = self.resolve_class_attr(class_attr)?;
        let mut frame = Frame::new(tag, FrameKind::Object { class, op }, !void);
        frame.id = id;
        frame.failed = failed;
        Ok(frame)
    }

    fn array_frame(&self, attrs: Vec<(String, String)>) -> DecodeResult<Frame> {
        let mut id = None;
        let mut class_attr = None;
        let mut length = None;
        for (key, value) in attrs {
            match key.as_str() {
                "id" => id = Some(value),
                "class" => class_attr = Some(value),
                "length" => {
                    let parsed = value
                        .trim()
                        .parse::<i32>()
                        .ok()
                        .filter(|len| *len >= 0)
                        .ok_or_else(|| DecodeError::BadAttributes {
                            element: "array".to_string(),
                            detail: format!("invalid length {value:?}"),
                        })?;
                    length = Some(parsed);
                }
                other => self
                    .listener
                    .warning(&format!("ignoring attribute {other:?} on <array>")),
            }
        }
        if class_attr.is_none() {
            return Err(DecodeError::BadAttributes {
                element: "array".to_string(),
                detail: "a component class attribute is required".to_string(),
            });
        }
        let (component, mut failed) = self.resolve_class_attr(class_attr)?;
        let component = component.unwrap_or_else(JavaType::object);
        let mut frame = Frame::new(
            "array",
            FrameKind::Array {
                component: component.clone(),
                sized: length.is_some(),
            },
            true,
        );
        frame.id = id;
        if let Some(len) = length {
            if !failed {
                // Allocate immediately; the frame is executed from here on
                // and `<void index>` children can target it.
                let target = CallTarget::Class(JavaType::class(REFLECT_ARRAY_CLASS));
                let args = [Value::ClassRef(component), Value::Int(len)];
                match self.evaluator.invoke(&target, "newInstance", &args) {
                    Ok(value) => {
                        frame.result = value;
                        frame.executed = true;
                    }
                    Err(err) if err.is_policy_violation() => return Err(err.into()),
                    Err(err) => {
                        self.listener.error(&DecodeError::Eval(err));
                        failed = true;
                    }
                }
            }
            if failed {
                frame.executed = true;
            }
        }
        frame.failed = failed;
        Ok(frame)
    }

    fn literal_frame(&self, kind: LiteralKind, attrs: Vec<(String, String)>) -> DecodeResult<Frame> {
        let tag = match kind {
            LiteralKind::Str => "string",
            LiteralKind::Boolean => "boolean",
            LiteralKind::Byte => "byte",
            LiteralKind::Short => "short",
            LiteralKind::Int => "int",
            LiteralKind::Long => "long",
            LiteralKind::Float => "float",
            LiteralKind::Double => "double",
            LiteralKind::Char => "char",
            LiteralKind::Class => "class",
            LiteralKind::Null => "null",
        };
        let mut frame = Frame::new(tag, FrameKind::Literal(kind), true);
        for (key, value) in attrs {
            match key.as_str() {
                "id" => frame.id = Some(value),
                other => self
                    .listener
                    .warning(&format!("ignoring attribute {other:?} on <{tag}>")),
            }
        }
        Ok(frame)
    }

    /// Resolve a `class` attribute eagerly. Policy rejections are fatal;
    /// anything else poisons just this frame.
    fn resolve_class_attr(
        &self,
        class_attr: Option<String>,
    ) -> DecodeResult<(Option<JavaType>, bool)> {
        match class_attr {
            None => Ok((None, false)),
            Some(name) => match self.evaluator.class_for_name(&name) {
                Ok(ty) => Ok((Some(ty), false)),
                Err(err) if err.is_policy_violation() => Err(err.into()),
                Err(err) => {
                    self.listener.error(&DecodeError::Eval(err));
                    Ok((None, true))
                }
            },
        }
    }

    fn on_text(&self, text: &str, stack: &mut Vec<Frame>) {
        match stack.last_mut() {
            Some(frame) if frame.is_literal() => frame.text.push_str(text),
            _ if text.trim().is_empty() => {}
            Some(frame) => self
                .listener
                .warning(&format!("ignoring character data inside <{}>", frame.tag)),
            None => self
                .listener
                .warning("ignoring character data outside any element"),
        }
    }

    fn on_end(
        &mut self,
        stack: &mut Vec<Frame>,
        ids: &mut HashMap<String, Value>,
        root_open: &mut bool,
    ) -> DecodeResult<()> {
        if stack.is_empty() {
            *root_open = false;
            return Ok(());
        }
        // Execute the closing frame, first forcing any chain of enclosing
        // frames its implicit target depends on, outermost first.
        let idx = stack.len() - 1;
        let mut start = idx;
        while start > 0 && stack[start].needs_implicit_target() && !stack[start - 1].executed {
            start -= 1;
        }
        for i in start..=idx {
            if !stack[i].executed {
                self.execute_frame(i, stack, ids)?;
            }
        }
        self.apply_pending_args(idx, stack)?;

        let frame = stack.pop().expect("closing frame");
        if frame.expression {
            match stack.last_mut() {
                Some(parent) => {
                    if parent.args.len() >= self.limits.max_args {
                        return Err(DecodeError::TooManyArguments {
                            max: self.limits.max_args,
                        });
                    }
                    parent.args.push(frame.result);
                }
                None => self.results.push_back(frame.result),
            }
        }
        Ok(())
    }

    /// Compute one frame's value. Benign failures null the frame through the
    /// listener; policy violations abort.
    fn execute_frame(
        &self,
        i: usize,
        stack: &mut [Frame],
        ids: &mut HashMap<String, Value>,
    ) -> DecodeResult<()> {
        if let Some(idref) = stack[i].idref.clone() {
            match ids.get(&idref) {
                Some(value) => stack[i].result = value.clone(),
                None => {
                    let err = DecodeError::UnresolvedIdRef(idref);
                    self.listener.error(&err);
                    stack[i].failed = true;
                }
            }
            stack[i].executed = true;
            return Ok(());
        }
        if stack[i].failed {
            stack[i].executed = true;
            return Ok(());
        }

        let args = std::mem::take(&mut stack[i].args);
        let outcome: Result<Value, EvalError> = match &stack[i].kind {
            FrameKind::Literal(kind) => self.decode_literal(*kind, &stack[i].text),
            FrameKind::Array { component, .. } => {
                // Unsized arrays: length is the number of consumed children.
                self.evaluator
                    .invoke(&CallTarget::Class(component.clone()), "newArray", &args)
            }
            FrameKind::Object { class, op } => {
                let target = match (class, op) {
                    (_, FrameOp::Owner(_)) => self
                        .owner
                        .clone()
                        .map(CallTarget::Instance)
                        .ok_or_else(|| {
                            EvalError::TypeMismatch("no owner object configured".to_string())
                        }),
                    (Some(class), _) => Ok(CallTarget::Class(class.clone())),
                    (None, _) if i > 0 => Ok(CallTarget::Instance(stack[i - 1].result.clone())),
                    (None, _) => self
                        .owner
                        .clone()
                        .map(CallTarget::Instance)
                        .ok_or_else(|| {
                            EvalError::TypeMismatch(
                                "element has no target: no class attribute, no enclosing element, no owner"
                                    .to_string(),
                            )
                        }),
                };
                target.and_then(|target| self.run_op(&target, op, &args))
            }
        };

        match outcome {
            Ok(value) => stack[i].result = value,
            Err(err) if err.is_policy_violation() => return Err(err.into()),
            Err(err) => {
                self.listener.error(&DecodeError::Eval(err));
                stack[i].failed = true;
                stack[i].result = Value::Null;
            }
        }
        stack[i].executed = true;
        if let Some(id) = stack[i].id.clone() {
            // Recorded exactly once, at first execution.
            ids.entry(id).or_insert_with(|| stack[i].result.clone());
        }
        Ok(())
    }

    /// Children that closed after their parent was already executed: sized
    /// arrays consume them positionally, anything else discards them.
    fn apply_pending_args(&self, idx: usize, stack: &mut [Frame]) -> DecodeResult<()> {
        if stack[idx].args.is_empty() {
            return Ok(());
        }
        let args = std::mem::take(&mut stack[idx].args);
        let frame = &stack[idx];
        match frame.kind {
            FrameKind::Array { sized: true, .. } if !frame.failed => {
                let target = CallTarget::Instance(frame.result.clone());
                for (slot, value) in args.into_iter().enumerate() {
                    let set_args = [Value::Int(slot as i32), value];
                    match self.evaluator.invoke(&target, "set", &set_args) {
                        Ok(_) => {}
                        Err(err) if err.is_policy_violation() => return Err(err.into()),
                        Err(err) => self.listener.error(&DecodeError::Eval(err)),
                    }
                }
            }
            _ => self.listener.warning(&format!(
                "<{}> already evaluated; {} dangling argument(s) discarded",
                frame.tag,
                args.len()
            )),
        }
        Ok(())
    }

    fn run_op(&self, target: &CallTarget, op: &FrameOp, args: &[Value]) -> Result<Value, EvalError> {
        match op {
            FrameOp::New => self.evaluator.invoke(target, "new", args),
            FrameOp::Method(name) | FrameOp::Owner(name) => {
                self.evaluator.invoke(target, name, args)
            }
            FrameOp::Property(name) => {
                let accessor = Evaluator::property_accessor(name, !args.is_empty());
                self.evaluator.invoke(target, &accessor, args)
            }
            FrameOp::Index(index) => {
                // The index becomes a synthesized leading argument.
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(Value::Int(*index));
                full.extend_from_slice(args);
                let name = if args.is_empty() { "get" } else { "set" };
                self.evaluator.invoke(target, name, &full)
            }
            FrameOp::Field(name) => match args {
                [] => self.evaluator.get_field(target, name),
                [value] => self.evaluator.set_field(target, name, value.clone()),
                _ => Err(EvalError::TypeMismatch(format!(
                    "field {name} accepts at most one argument, got {}",
                    args.len()
                ))),
            },
        }
    }

    fn decode_literal(&self, kind: LiteralKind, text: &str) -> Result<Value, EvalError> {
        let bad = |what: &str| EvalError::TypeMismatch(format!("invalid {what} literal {text:?}"));
        match kind {
            LiteralKind::Str => Ok(Value::Str(text.to_string())),
            LiteralKind::Null => Ok(Value::Null),
            LiteralKind::Boolean => match text.trim() {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(bad("boolean")),
            },
            LiteralKind::Byte => text.trim().parse().map(Value::Byte).map_err(|_| bad("byte")),
            LiteralKind::Short => text
                .trim()
                .parse()
                .map(Value::Short)
                .map_err(|_| bad("short")),
            LiteralKind::Int => text.trim().parse().map(Value::Int).map_err(|_| bad("int")),
            LiteralKind::Long => text.trim().parse().map(Value::Long).map_err(|_| bad("long")),
            LiteralKind::Float => text
                .trim()
                .parse()
                .map(Value::Float)
                .map_err(|_| bad("float")),
            LiteralKind::Double => text
                .trim()
                .parse()
                .map(Value::Double)
                .map_err(|_| bad("double")),
            LiteralKind::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => {
                        let trimmed = text.trim();
                        let mut chars = trimmed.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => Ok(Value::Char(c)),
                            _ => Err(bad("char")),
                        }
                    }
                }
            }
            LiteralKind::Class => self
                .evaluator
                .class_for_name(text.trim())
                .map(Value::ClassRef),
        }
    }
}
