//! The object model: a closed sum over concrete object kinds (§3, §9
//! "Polymorphic object hierarchy in an ownership-strict language").
//!
//! Rather than a trait-object hierarchy, every heap object is one variant
//! of [`Object`]; shared state (prototype, own properties, extensibility)
//! lives in [`ObjectHeader`] and operations dispatch via `match`.

use indexmap::IndexMap;

use djs_gc::{GcObject, ObjectId};

use crate::propkey::PropKey;
use crate::value::Value;

/// A single own-property entry.
#[derive(Debug, Clone)]
pub struct PropertySlot {
    /// The stored value.
    pub value: Value,
    /// Can be overwritten.
    pub writable: bool,
    /// Can be deleted or have its attributes changed.
    pub configurable: bool,
    /// Visible to `for-in`/enumeration.
    pub enumerable: bool,
}

impl PropertySlot {
    /// A freshly created own property: writable, configurable, enumerable.
    pub fn fresh(value: Value) -> Self {
        Self {
            value,
            writable: true,
            configurable: true,
            enumerable: true,
        }
    }
}

/// Shared state every object variant carries.
#[derive(Debug, Clone, Default)]
pub struct ObjectHeader {
    /// The object's `__proto__` pointer.
    pub prototype: Option<ObjectId>,
    /// Own properties, in insertion order (enumeration order).
    pub properties: IndexMap<PropKey, PropertySlot>,
    /// Whether new own properties may be added.
    pub extensible: bool,
    /// Whether `freeze` has been applied (clears writability everywhere).
    pub frozen: bool,
}

impl ObjectHeader {
    /// A fresh, extensible header with the given prototype.
    pub fn new(prototype: Option<ObjectId>) -> Self {
        Self {
            prototype,
            properties: IndexMap::new(),
            extensible: true,
            frozen: false,
        }
    }
}

/// Opaque identifier for a host-native function, resolved against the
/// native registry the embedder supplies to the VM. The catalog of
/// natives themselves lives outside the core (§1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeId(pub u32);

/// `{…}` or `new F(…)` or `Object.create(p)`.
#[derive(Debug, Clone)]
pub struct PlainObject {
    pub header: ObjectHeader,
}

/// A dense JS array. Integer keys index `items` directly; every other key
/// falls through to the property pool.
#[derive(Debug, Clone)]
pub struct ArrayObject {
    pub header: ObjectHeader,
    pub items: Vec<Value>,
}

/// An immutable byte buffer participating in `+` as concatenation, with
/// byte-wise structural equality.
#[derive(Debug, Clone)]
pub struct JsString {
    pub header: ObjectHeader,
    pub bytes: String,
}

/// A boxed boolean primitive (`new Boolean(true)`).
#[derive(Debug, Clone)]
pub struct BooleanBox {
    pub header: ObjectHeader,
    pub boolean: bool,
}

/// A host-callable function. Holds no code of its own — invocation goes
/// through the VM's native registry via `native_id`.
#[derive(Debug, Clone)]
pub struct NativeFunction {
    pub header: ObjectHeader,
    pub name: String,
    pub native_id: NativeId,
    pub min_arity: u32,
}

/// A compiled bytecode function. `def_env` is the environment object that
/// was live when this closure was created (`None` for the boot-time
/// template that `MakeClosure` clones from — never called directly). A
/// call chains its fresh frame environment off `def_env` rather than the
/// caller's, so a closure keeps seeing the scope it was defined in no
/// matter who ends up invoking it (§8, "Closures").
#[derive(Debug, Clone)]
pub struct LambdaObject {
    pub header: ObjectHeader,
    pub chunk_id: u32,
    pub min_arity: u32,
    pub name: String,
    pub def_env: Option<ObjectId>,
}

/// `Error`/`TypeError`/etc. Carries just enough to stringify for an
/// uncaught-exception report.
#[derive(Debug, Clone)]
pub struct ErrorObject {
    pub header: ObjectHeader,
    pub name: String,
    pub message: String,
}

/// The closed sum of every heap-resident object kind.
#[derive(Debug, Clone)]
pub enum Object {
    Plain(PlainObject),
    Array(ArrayObject),
    Str(JsString),
    BoolBox(BooleanBox),
    Native(NativeFunction),
    Lambda(LambdaObject),
    Error(ErrorObject),
}

impl Object {
    /// Create a plain object linked to `prototype`.
    pub fn plain(prototype: Option<ObjectId>) -> Self {
        Object::Plain(PlainObject {
            header: ObjectHeader::new(prototype),
        })
    }

    /// Create an array with the given initial items.
    pub fn array(prototype: Option<ObjectId>, items: Vec<Value>) -> Self {
        Object::Array(ArrayObject {
            header: ObjectHeader::new(prototype),
            items,
        })
    }

    /// Create a dynamic string object.
    pub fn string(prototype: Option<ObjectId>, bytes: impl Into<String>) -> Self {
        Object::Str(JsString {
            header: ObjectHeader::new(prototype),
            bytes: bytes.into(),
        })
    }

    /// Create a boxed boolean.
    pub fn boolean_box(prototype: Option<ObjectId>, boolean: bool) -> Self {
        Object::BoolBox(BooleanBox {
            header: ObjectHeader::new(prototype),
            boolean,
        })
    }

    /// Create a native function object.
    pub fn native(
        prototype: Option<ObjectId>,
        name: impl Into<String>,
        native_id: NativeId,
        min_arity: u32,
    ) -> Self {
        Object::Native(NativeFunction {
            header: ObjectHeader::new(prototype),
            name: name.into(),
            native_id,
            min_arity,
        })
    }

    /// Create a lambda (bytecode function) object. `def_env` starts unset —
    /// this is the boot-time template `MakeClosure` clones from, not a
    /// value user code ever calls directly.
    pub fn lambda(
        prototype: Option<ObjectId>,
        chunk_id: u32,
        min_arity: u32,
        name: impl Into<String>,
    ) -> Self {
        Object::Lambda(LambdaObject {
            header: ObjectHeader::new(prototype),
            chunk_id,
            min_arity,
            name: name.into(),
            def_env: None,
        })
    }

    /// Clone this lambda template into a fresh closure bound to `env`
    /// (`MakeClosure`). Panics if called on a non-`Lambda` object — a
    /// compiler invariant, since `MakeClosure` only ever targets a lambda
    /// constant.
    pub fn close_over(&self, env: ObjectId) -> Object {
        match self {
            Object::Lambda(lo) => Object::Lambda(LambdaObject {
                header: lo.header.clone(),
                chunk_id: lo.chunk_id,
                min_arity: lo.min_arity,
                name: lo.name.clone(),
                def_env: Some(env),
            }),
            other => unreachable!("close_over called on a non-lambda object: {other:?}"),
        }
    }

    /// Create an error object.
    pub fn error(prototype: Option<ObjectId>, name: impl Into<String>, message: impl Into<String>) -> Self {
        Object::Error(ErrorObject {
            header: ObjectHeader::new(prototype),
            name: name.into(),
            message: message.into(),
        })
    }

    /// Shared header, regardless of variant.
    pub fn header(&self) -> &ObjectHeader {
        match self {
            Object::Plain(o) => &o.header,
            Object::Array(o) => &o.header,
            Object::Str(o) => &o.header,
            Object::BoolBox(o) => &o.header,
            Object::Native(o) => &o.header,
            Object::Lambda(o) => &o.header,
            Object::Error(o) => &o.header,
        }
    }

    /// Mutable shared header.
    pub fn header_mut(&mut self) -> &mut ObjectHeader {
        match self {
            Object::Plain(o) => &mut o.header,
            Object::Array(o) => &mut o.header,
            Object::Str(o) => &mut o.header,
            Object::BoolBox(o) => &mut o.header,
            Object::Native(o) => &mut o.header,
            Object::Lambda(o) => &mut o.header,
            Object::Error(o) => &mut o.header,
        }
    }

    /// `class-name` used by `Object.prototype.toString`-style reporting.
    pub fn class_name(&self) -> &'static str {
        match self {
            Object::Plain(_) => "Object",
            Object::Array(_) => "Array",
            Object::Str(_) => "String",
            Object::BoolBox(_) => "Boolean",
            Object::Native(_) => "Function",
            Object::Lambda(_) => "Function",
            Object::Error(_) => "Error",
        }
    }

    /// `typeof` name.
    pub fn typeof_name(&self) -> &'static str {
        match self {
            Object::Native(_) | Object::Lambda(_) => "function",
            _ => "object",
        }
    }

    /// Sequential items, for arrays only.
    pub fn sequential_items(&self) -> Option<&[Value]> {
        match self {
            Object::Array(a) => Some(&a.items),
            _ => None,
        }
    }

    /// Mutable sequential items, for arrays only.
    pub fn sequential_items_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Object::Array(a) => Some(&mut a.items),
            _ => None,
        }
    }

    /// The string content, for dynamic strings only.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::Str(s) => Some(&s.bytes),
            _ => None,
        }
    }

    /// `is-extensible`.
    pub fn is_extensible(&self) -> bool {
        self.header().extensible && !self.header().frozen
    }

    /// Whether `freeze` has been applied.
    pub fn is_frozen(&self) -> bool {
        self.header().frozen
    }

    /// Clears writability on every own property and marks the object
    /// frozen (§4.4, "Freezing"). Does not descend into referenced
    /// objects — only this object's own property descriptors are
    /// affected, not the object graph reachable through them.
    pub fn freeze(&mut self) {
        let header = self.header_mut();
        header.frozen = true;
        header.extensible = false;
        for slot in header.properties.values_mut() {
            slot.writable = false;
            slot.configurable = false;
        }
    }
}

impl GcObject for Object {
    fn trace(&self, mark: &mut dyn FnMut(ObjectId)) {
        let header = self.header();
        if let Some(proto) = header.prototype {
            mark(proto);
        }
        for slot in header.properties.values() {
            trace_value(&slot.value, mark);
        }
        if let Some(items) = self.sequential_items() {
            for item in items {
                trace_value(item, mark);
            }
        }
        if let Object::Lambda(lo) = self {
            if let Some(env) = lo.def_env {
                mark(env);
            }
        }
    }

    fn approx_size(&self) -> usize {
        let base = 48 + self.header().properties.len() * 48;
        base + match self {
            Object::Array(a) => a.items.len() * 24,
            Object::Str(s) => s.bytes.len(),
            _ => 0,
        }
    }
}

/// Enqueue the `ObjectId`(s) a [`Value`] reaches, if any.
pub fn trace_value(value: &Value, mark: &mut dyn FnMut(ObjectId)) {
    match value {
        Value::Object(id) => mark(*id),
        Value::Ref(r) => match &r.target {
            crate::value::RefTarget::Property { holder, .. }
            | crate::value::RefTarget::Item { holder, .. }
            | crate::value::RefTarget::Proto { holder } => mark(*holder),
            crate::value::RefTarget::Local { .. } => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_clears_writability() {
        let mut obj = Object::plain(None);
        obj.header_mut()
            .properties
            .insert(PropKey::new("x"), PropertySlot::fresh(Value::Int(1)));
        obj.freeze();
        assert!(obj.is_frozen());
        assert!(!obj.is_extensible());
        assert!(!obj.header().properties[&PropKey::new("x")].writable);
    }

    #[test]
    fn trace_reaches_prototype_and_property_values() {
        let proto_id = ObjectId::new(0);
        let held_id = ObjectId::new(1);
        let mut obj = Object::plain(Some(proto_id));
        obj.header_mut()
            .properties
            .insert(PropKey::new("x"), PropertySlot::fresh(Value::Object(held_id)));

        let mut seen = Vec::new();
        obj.trace(&mut |id| seen.push(id));
        assert!(seen.contains(&proto_id));
        assert!(seen.contains(&held_id));
    }
}
