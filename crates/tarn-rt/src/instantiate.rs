//! Instantiation: objects, fragments and literal population.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tarn_caps::Capability;
use tarn_contracts::INSTANCE_POS;

use crate::alloc::AllocKind;
use crate::attr::Attr;
use crate::invoke::invoke;
use crate::object::{AllocPolicy, Fragment, FragmentRef, ObjRef, Object};
use crate::raise::{self, capability_fault, RtResult};
use crate::runtime::{ClassLayout, Runtime};
use crate::table::Table;

/// Allocates an instance of `class` with `size` slots and records its class.
///
/// Slots other than `__class__` are left empty for the caller. An immutable object
/// comes from the immutable allocation policy; nothing checks that it is left alone
/// once its creator has populated it.
pub fn new_object(
    rt: &Runtime,
    table: &Arc<Table>,
    class: &ObjRef,
    size: usize,
    immutable: bool,
) -> RtResult<Attr> {
    let policy = if immutable {
        AllocPolicy::Immutable
    } else {
        AllocPolicy::Heap
    };
    let Ok(attrs) = rt.allocator().allocate(AllocKind::Object(policy), size) else {
        return raise::memory_error();
    };
    let obj = Rc::new(Object::from_parts(
        Arc::clone(table),
        INSTANCE_POS,
        policy,
        attrs,
    ));
    obj.store(rt.layout().class.pos, Attr::object(Rc::clone(class)));
    Ok(Attr::object(obj))
}

pub fn new_instance(rt: &Runtime, class: &ClassLayout, immutable: bool) -> RtResult<Attr> {
    new_object(rt, &class.table, &class.class, class.size, immutable)
}

/// A fragment with capacity `n` and nothing in it.
pub fn new_fragment(rt: &Runtime, n: usize) -> RtResult<FragmentRef> {
    let Ok(attrs) = rt.allocator().allocate(AllocKind::Fragment, n) else {
        return raise::memory_error();
    };
    Ok(Rc::new(RefCell::new(Fragment::with_storage(attrs))))
}

/// Stores a fragment holding exactly `values` into `this`'s `__data__` slot.
pub fn populate_sequence(rt: &Runtime, this: Attr, values: &[Attr]) -> RtResult<Attr> {
    let Some(obj) = this.as_object() else {
        return raise::type_error("sequence literal target is not an object");
    };
    let frag = new_fragment(rt, values.len())?;
    frag.borrow_mut().fill(values);
    obj.store(rt.layout().data.pos, Attr::Seq(frag));
    Ok(this)
}

/// Initialises a mapping from `values` by calling the mapping type's `__init__`
/// with a temporary list.
///
/// Only programs built with mapping support may reach this.
pub fn populate_mapping(rt: &Runtime, this: Attr, values: &[Attr]) -> RtResult<Attr> {
    if let Err(missing) = rt.caps().require(Capability::Mapping) {
        capability_fault(missing);
    }
    let Some(init) = rt.builtins().dict_init else {
        return raise::type_error("mapping initialiser is not registered");
    };
    let list = new_list(rt, values)?;
    init(rt, &[this.clone(), list])?;
    Ok(this)
}

pub fn new_list(rt: &Runtime, values: &[Attr]) -> RtResult<Attr> {
    let Some(list) = &rt.builtins().list else {
        return raise::type_error("list type is not registered");
    };
    new_literal(rt, list, values)
}

pub fn new_tuple(rt: &Runtime, values: &[Attr]) -> RtResult<Attr> {
    let Some(tuple) = &rt.builtins().tuple else {
        return raise::type_error("tuple type is not registered");
    };
    new_literal(rt, tuple, values)
}

/// Instance of a sequence class populated from `values`.
pub fn new_literal(rt: &Runtime, class: &ClassLayout, values: &[Attr]) -> RtResult<Attr> {
    let this = new_instance(rt, class, false)?;
    populate_sequence(rt, this, values)
}

/// Tuple holding the current elements of a list.
pub fn list_to_tuple(rt: &Runtime, list: &Attr) -> RtResult<Attr> {
    let data = match list.as_object() {
        Some(obj) => obj.load_checked(rt.layout().data)?,
        None => return raise::type_error("list_to_tuple expects a list"),
    };
    let Some(frag) = data.as_seq() else {
        return raise::type_error("list has no sequence data");
    };
    let values: Vec<Attr> = frag.borrow().as_slice().to_vec();
    new_tuple(rt, &values)
}

/// Wrapper that binds `target` to `context` for later invocation.
pub fn new_wrapper(rt: &Runtime, context: Attr, target: Attr) -> RtResult<Attr> {
    let Some(wrapper) = &rt.builtins().wrapper else {
        return raise::type_error("wrapper type is not registered");
    };
    let this = new_instance(rt, wrapper, false)?;
    if let Some(obj) = this.as_object() {
        obj.store_checked(rt.layout().context, context)?;
        obj.store_checked(rt.layout().value, target)?;
    }
    Ok(this)
}

/// Instances are returned as given; anything else is called to produce one.
pub fn ensure_instance(rt: &Runtime, value: Attr) -> RtResult<Attr> {
    if value.as_object().is_some_and(|obj| obj.is_instance()) {
        return Ok(value);
    }
    invoke(rt, &value, false, &[], &[], &[Attr::Null])
}
