//! The host-supplied preload list (§6, "Compiler input") that seeds the
//! compiler's global namespace and the program's heap prelude.

/// Where a preload entry's value lives once the program boots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// A primitive value, interned straight into the constant pool.
    Constant,
    /// An object that must exist in the heap before execution begins
    /// (a native function or an anonymous plain object).
    HeapObject,
    /// A property-name string, interned as a key constant.
    KeyString,
}

/// A primitive constant a preload entry may carry.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveConst {
    /// `undefined`.
    Undefined,
    /// `null`.
    Null,
    /// `NaN`.
    NaN,
    /// A boolean literal.
    Bool(bool),
    /// A 32-bit integer literal.
    Int(i32),
    /// A floating point literal.
    Float(f64),
    /// A string literal.
    Str(String),
}

/// The payload a preload entry supplies, depending on its `location`.
#[derive(Debug, Clone)]
pub enum PreloadEntity {
    /// A host-native function, resolved by name at VM boot against the
    /// embedder's native registry (`djs-vm`'s `NativeRegistry`).
    NativeFn {
        /// Lookup key in the native registry.
        native_name: String,
        /// Minimum argument count the VM enforces before calling it.
        arity: u32,
    },
    /// Reserved: a preloaded bytecode lambda. No host currently supplies
    /// one (lambdas are always compiler-internal), but the shape mirrors
    /// `djs_bytecode::PreludeObject::Lambda` for forward compatibility.
    Lambda {
        /// Chunk id of the lambda's code.
        chunk_id: u32,
        /// Declared parameter count.
        arity: u32,
    },
    /// An empty plain object — either an anonymous preload entry or a
    /// base-prototype placeholder.
    AnonymousObject,
    /// A primitive value (used with `LocationKind::Constant`).
    Primitive(PrimitiveConst),
}

/// One entry of the host's preload list: `{name, entity, location}`
/// exactly per §6. An entry whose `name` is empty creates an anonymous
/// heap object (not registered as a global); an entry whose `name` has
/// the form `"Foo::prototype"` additionally populates the corresponding
/// `djs_bytecode::BasePrototypes` slot.
#[derive(Debug, Clone)]
pub struct PreloadEntry {
    /// The global name this entry is reachable under, or empty for an
    /// anonymous heap object.
    pub name: String,
    /// What this entry actually is.
    pub entity: PreloadEntity,
    /// Where it is recorded.
    pub location: LocationKind,
    /// When set, this entry's materialized object is *also* installed
    /// as `(holder_name)[key]` once `holder_name` — itself the `name`
    /// of an earlier preload entry, or an `"X::prototype"` base-prototype
    /// target — has been materialized. This is how a dotted JS-visible
    /// name (`console.log`, `Array.prototype.push`) becomes reachable
    /// without the compiler's global table supporting dotted lookups.
    pub property_of: Option<(String, String)>,
}

impl PreloadEntry {
    /// Build a named constant entry.
    pub fn constant(name: impl Into<String>, value: PrimitiveConst) -> Self {
        Self {
            name: name.into(),
            entity: PreloadEntity::Primitive(value),
            location: LocationKind::Constant,
            property_of: None,
        }
    }

    /// Build a named native-function entry.
    pub fn native(name: impl Into<String>, native_name: impl Into<String>, arity: u32) -> Self {
        Self {
            name: name.into(),
            entity: PreloadEntity::NativeFn {
                native_name: native_name.into(),
                arity,
            },
            location: LocationKind::HeapObject,
            property_of: None,
        }
    }

    /// Build a named anonymous-object entry (e.g. `console`, or a
    /// `Foo::prototype` base-prototype placeholder).
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: PreloadEntity::AnonymousObject,
            location: LocationKind::HeapObject,
            property_of: None,
        }
    }

    /// Build a key-string entry, used to pre-intern a property name the
    /// compiler will reference often (e.g. `"length"`).
    pub fn key_string(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: name.clone(),
            entity: PreloadEntity::Primitive(PrimitiveConst::Str(name)),
            location: LocationKind::KeyString,
            property_of: None,
        }
    }

    /// Build an anonymous native-function entry installed as `holder[key]`
    /// rather than as a flat global — the mechanism behind
    /// `console.log`, `Array.prototype.push`, and every other dotted
    /// native this catalog exposes. `holder` must be the `name` of a
    /// preload entry processed earlier in the same list (typically an
    /// `object(...)` entry or an `"X::prototype"` target).
    pub fn method(holder: impl Into<String>, key: impl Into<String>, native_name: impl Into<String>, arity: u32) -> Self {
        Self {
            name: String::new(),
            entity: PreloadEntity::NativeFn {
                native_name: native_name.into(),
                arity,
            },
            location: LocationKind::HeapObject,
            property_of: Some((holder.into(), key.into())),
        }
    }

    /// The base-prototype name this entry targets, if `name` has the
    /// form `"Foo::prototype"`.
    pub fn base_prototype_target(&self) -> Option<&str> {
        self.name.strip_suffix("::prototype")
    }
}
