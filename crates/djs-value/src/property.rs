//! The property-access protocol (§4.4): resolving `holder[key]` across a
//! prototype chain, materializing lazy own-properties on write, and the
//! coercions that turn an arbitrary [`Value`] into a [`PropKey`].

use djs_gc::{Heap, ObjectId};
use thiserror::Error;

use crate::object::{Object, PropertySlot};
use crate::propkey::PropKey;
use crate::value::Value;

/// Failures the property protocol can raise. Non-strict writes to a
/// frozen/non-writable slot or to a non-extensible object are *not* errors
/// here — they are dropped silently per the write rule below; this type
/// only covers a handle that does not name a live object, which signals a
/// VM bug rather than ordinary script behavior.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertyError {
    /// `holder` does not name a live object.
    #[error("dangling object handle")]
    DanglingHandle,
}

/// Where a lookup bottomed out.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// Found in `holder`'s own property pool.
    Own { holder: ObjectId, key: PropKey },
    /// Found as a sequential item of an array.
    Item { holder: ObjectId, index: u32 },
    /// A synthetic `length` read — not backed by a real slot.
    Length(u32),
    /// The chain was walked fully and the key was not found anywhere.
    Missing,
}

/// Walk `start`'s prototype chain looking for `key`, per the §4.4
/// resolution order: the array's sequential items first (when `key` is a
/// canonical index and `start` is an array), then `length` if synthetic,
/// then each link's own-property pool, then its prototype.
pub fn lookup(heap: &Heap<Object>, start: ObjectId, key: &PropKey) -> Descriptor {
    let mut current = Some(start);
    let mut first = true;
    while let Some(holder) = current {
        let Some(obj) = heap.get(holder) else {
            return Descriptor::Missing;
        };

        if first {
            if let Some(items) = obj.sequential_items() {
                if let Some(index) = key.as_index() {
                    if (index as usize) < items.len() {
                        return Descriptor::Item { holder, index };
                    }
                }
                if key.as_str() == "length" {
                    return Descriptor::Length(items.len() as u32);
                }
            }
            if let Some(s) = obj.as_str() {
                if key.as_str() == "length" {
                    return Descriptor::Length(s.chars().count() as u32);
                }
            }
        }
        first = false;

        if obj.header().properties.contains_key(key) {
            return Descriptor::Own {
                holder,
                key: key.clone(),
            };
        }
        current = obj.header().prototype;
    }
    Descriptor::Missing
}

/// Read the value a key resolves to, walking the prototype chain.
/// Missing keys read as `undefined`, matching normal `[[Get]]` semantics.
pub fn get_value(heap: &Heap<Object>, start: ObjectId, key: &PropKey) -> Value {
    match lookup(heap, start, key) {
        Descriptor::Own { holder, key } => heap
            .get(holder)
            .and_then(|o| o.header().properties.get(&key))
            .map(|slot| slot.value.clone())
            .unwrap_or(Value::Undefined),
        Descriptor::Item { holder, index } => heap
            .get(holder)
            .and_then(|o| o.sequential_items())
            .and_then(|items| items.get(index as usize))
            .cloned()
            .unwrap_or(Value::Undefined),
        Descriptor::Length(n) => Value::int(n as i32),
        Descriptor::Missing => Value::Undefined,
    }
}

/// Write `value` at `key` on `start`. A write through a non-writable slot,
/// onto a frozen array, or adding a new property to a non-extensible
/// object is dropped silently rather than raised as an error — this
/// system's chosen non-strict-mode behavior (§4.4). If `key` is not found
/// anywhere in the chain, a new own property is created on `start` itself
/// — never on an ancestor — matching ordinary `[[Put]]` semantics where
/// lazy creation always targets the original receiver.
pub fn write_value(
    heap: &mut Heap<Object>,
    start: ObjectId,
    key: &PropKey,
    value: Value,
) -> Result<(), PropertyError> {
    match lookup(heap, start, key) {
        Descriptor::Own { holder, key } => {
            let obj = heap.get_mut(holder).ok_or(PropertyError::DanglingHandle)?;
            if let Some(slot) = obj.header_mut().properties.get_mut(&key) {
                if slot.writable {
                    slot.value = value;
                }
            }
            Ok(())
        }
        Descriptor::Item { holder, index } => {
            let obj = heap.get_mut(holder).ok_or(PropertyError::DanglingHandle)?;
            if obj.is_frozen() {
                return Ok(());
            }
            if let Some(items) = obj.sequential_items_mut() {
                items[index as usize] = value;
            }
            Ok(())
        }
        Descriptor::Length(_) => Ok(()),
        Descriptor::Missing => {
            let obj = heap.get_mut(start).ok_or(PropertyError::DanglingHandle)?;
            if let Some(index) = key.as_index() {
                if let Some(items) = obj.sequential_items_mut() {
                    let index = index as usize;
                    if index >= items.len() {
                        items.resize(index + 1, Value::Undefined);
                    }
                    items[index] = value;
                    return Ok(());
                }
            }
            if obj.is_extensible() {
                obj.header_mut()
                    .properties
                    .insert(key.clone(), PropertySlot::fresh(value));
            }
            Ok(())
        }
    }
}

/// Delete an own property or array item from `holder` directly (no
/// prototype-chain walk — `delete` only ever targets the receiver).
/// Returns whether anything was removed.
pub fn delete_own(heap: &mut Heap<Object>, holder: ObjectId, key: &PropKey) -> bool {
    let Some(obj) = heap.get_mut(holder) else {
        return false;
    };
    if let Some(index) = key.as_index() {
        if let Some(items) = obj.sequential_items_mut() {
            if (index as usize) < items.len() {
                items[index as usize] = Value::Undefined;
                return true;
            }
            return false;
        }
    }
    match obj.header_mut().properties.shift_remove(key) {
        Some(slot) => slot.configurable,
        None => false,
    }
}

/// Coerce an arbitrary value into a property key the way a bracket
/// subscript (`obj[expr]`) does: numbers print as their decimal form,
/// everything else falls back to its already-string-shaped representation.
/// Objects are not valid subscripts in this subset and coerce to their
/// class name.
pub fn to_property_key(heap: &Heap<Object>, value: &Value) -> PropKey {
    match value {
        Value::Int(i) => PropKey::from(i.to_string()),
        Value::Float(f) => PropKey::from(f.to_string()),
        Value::NaN => PropKey::from("NaN"),
        Value::Bool(b) => PropKey::from(b.to_string()),
        Value::Undefined => PropKey::from("undefined"),
        Value::Null => PropKey::from("null"),
        Value::Object(id) => match heap.get(*id).and_then(|o| o.as_str()) {
            Some(s) => PropKey::from(s),
            None => heap
                .get(*id)
                .map(|o| PropKey::from(o.class_name()))
                .unwrap_or_else(|| PropKey::from("undefined")),
        },
        Value::Ref(_) | Value::ProtoKey => PropKey::from("undefined"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use djs_gc::Heap;

    fn new_heap() -> Heap<Object> {
        Heap::new(64)
    }

    #[test]
    fn reads_through_prototype_chain() {
        let mut heap = new_heap();
        let proto = heap.add(Object::plain(None)).unwrap();
        write_value(&mut heap, proto, &PropKey::new("greeting"), Value::int(7)).unwrap();
        let child = heap.add(Object::plain(Some(proto))).unwrap();

        assert_eq!(get_value(&heap, child, &PropKey::new("greeting")), Value::int(7));
        assert_eq!(get_value(&heap, child, &PropKey::new("missing")), Value::Undefined);
    }

    #[test]
    fn write_on_missing_key_creates_on_receiver_not_ancestor() {
        let mut heap = new_heap();
        let proto = heap.add(Object::plain(None)).unwrap();
        let child = heap.add(Object::plain(Some(proto))).unwrap();

        write_value(&mut heap, child, &PropKey::new("x"), Value::int(1)).unwrap();

        assert!(heap.get(child).unwrap().header().properties.contains_key(&PropKey::new("x")));
        assert!(!heap.get(proto).unwrap().header().properties.contains_key(&PropKey::new("x")));
    }

    #[test]
    fn write_through_inherited_writable_slot_updates_ancestor() {
        let mut heap = new_heap();
        let proto = heap.add(Object::plain(None)).unwrap();
        write_value(&mut heap, proto, &PropKey::new("x"), Value::int(1)).unwrap();
        let child = heap.add(Object::plain(Some(proto))).unwrap();

        write_value(&mut heap, child, &PropKey::new("x"), Value::int(2)).unwrap();

        assert_eq!(get_value(&heap, proto, &PropKey::new("x")), Value::int(2));
    }

    #[test]
    fn frozen_object_drops_writes_silently() {
        let mut heap = new_heap();
        let id = heap.add(Object::plain(None)).unwrap();
        write_value(&mut heap, id, &PropKey::new("x"), Value::int(1)).unwrap();
        heap.get_mut(id).unwrap().freeze();

        write_value(&mut heap, id, &PropKey::new("x"), Value::int(2)).unwrap();
        assert_eq!(get_value(&heap, id, &PropKey::new("x")), Value::int(1));

        write_value(&mut heap, id, &PropKey::new("y"), Value::int(9)).unwrap();
        assert_eq!(get_value(&heap, id, &PropKey::new("y")), Value::Undefined);
    }

    #[test]
    fn array_length_is_synthetic_and_tracks_items() {
        let mut heap = new_heap();
        let id = heap
            .add(Object::array(None, vec![Value::int(1), Value::int(2)]))
            .unwrap();
        assert_eq!(get_value(&heap, id, &PropKey::length()), Value::int(2));
        assert_eq!(get_value(&heap, id, &PropKey::new("0")), Value::int(1));
    }

    #[test]
    fn writing_past_array_end_grows_with_holes() {
        let mut heap = new_heap();
        let id = heap.add(Object::array(None, vec![Value::int(1)])).unwrap();
        write_value(&mut heap, id, &PropKey::new("3"), Value::int(9)).unwrap();
        let items = heap.get(id).unwrap().sequential_items().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[1], Value::Undefined);
        assert_eq!(items[3], Value::int(9));
    }

    #[test]
    fn delete_own_respects_configurable_flag() {
        let mut heap = new_heap();
        let id = heap.add(Object::plain(None)).unwrap();
        write_value(&mut heap, id, &PropKey::new("x"), Value::int(1)).unwrap();
        assert!(delete_own(&mut heap, id, &PropKey::new("x")));
        assert_eq!(get_value(&heap, id, &PropKey::new("x")), Value::Undefined);
    }

    #[test]
    fn to_property_key_stringifies_numbers() {
        let heap = new_heap();
        assert_eq!(to_property_key(&heap, &Value::int(42)).as_str(), "42");
        assert_eq!(to_property_key(&heap, &Value::NaN).as_str(), "NaN");
    }
}
