//! # djs value
//!
//! The runtime value and object model (§3, §4.2, §4.4): the tagged
//! [`value::Value`] union, the closed [`object::Object`] enum every heap
//! slot holds, and the property-access protocol and abstract conversions
//! layered on top of [`djs_gc::Heap`].

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod convert;
pub mod object;
pub mod property;
pub mod propkey;
pub mod value;

pub use convert::{ArithOp, arith, less_equal, less_than, step, strict_equals, to_display_string, to_number, type_name};
pub use object::{
    ArrayObject, BooleanBox, ErrorObject, LambdaObject, NativeFunction, NativeId, Object,
    ObjectHeader, PlainObject, PropertySlot, trace_value,
};
pub use property::{Descriptor, PropertyError, delete_own, get_value, lookup, to_property_key, write_value};
pub use propkey::PropKey;
pub use value::{RefFlags, RefTarget, Value, ValueRef};

pub use djs_gc::{GcConfig, GcObject, GcStats, Heap, ObjectId, collect, should_collect};
