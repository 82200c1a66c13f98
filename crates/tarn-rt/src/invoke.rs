//! Generic invocation: binds positional, keyword and default arguments against a
//! callable's parameter table and dispatches to its function.
//!
//! Argument arrays always start with the context slot. A callable with `max`
//! parameters (context included) receives exactly `max` attrs.

use std::borrow::Cow;

use tarn_contracts::CONTEXT_ARG;

use crate::attr::{Attr, NativeFn};
use crate::object::ObjRef;
use crate::raise::{self, RtResult};
use crate::runtime::Runtime;
use crate::table::Param;

/// Invokes `callable` with `args` (positional, context first) and the keyword
/// arguments described by `kwcodes` and supplied in `kwargs`.
///
/// With `always_callable` set, the code generator has proven that the target
/// provides `__fn__` and the check is skipped.
pub fn invoke(
    rt: &Runtime,
    callable: &Attr,
    always_callable: bool,
    kwcodes: &[Param],
    kwargs: &[Attr],
    args: &[Attr],
) -> RtResult<Attr> {
    debug_assert_eq!(kwcodes.len(), kwargs.len());

    let (target, context) = unwrap_callable(rt, callable);
    let Some(target) = target.as_object() else {
        return raise::type_error("object is not callable");
    };

    let args_attr = target.load_checked(rt.layout().args)?;
    let Some((_, ptable)) = args_attr.as_args() else {
        return raise::type_error("object is not callable");
    };
    let (min, max) = (ptable.min(), ptable.max());

    let mut supplied: Cow<'_, [Attr]> = Cow::Borrowed(args);
    if let Some(context) = context {
        let slots = supplied.to_mut();
        match slots.get_mut(CONTEXT_ARG) {
            Some(slot) => *slot = context,
            None => slots.push(context),
        }
    }

    let nargs = supplied.len();
    let nkwargs = kwargs.len();
    let total = nargs + nkwargs;

    let bound: Cow<'_, [Attr]> = if nargs == max && nkwargs == 0 {
        supplied
    } else if total < min || total > max {
        tracing::trace!(nargs, nkwargs, min, max, "arity mismatch");
        return raise::type_error("wrong number of arguments");
    } else {
        let mut all: Vec<Attr> = Vec::with_capacity(max);
        all.extend_from_slice(&supplied);
        all.resize(max, Attr::Null);

        for (desc, value) in kwcodes.iter().zip(kwargs) {
            let pos = match ptable.resolve(desc.pos as usize, desc.code) {
                Some(pos) if pos >= nargs => pos,
                _ => return raise::type_error("unexpected keyword argument"),
            };
            match all.get_mut(pos) {
                Some(slot) if slot.is_null() => *slot = value.clone(),
                _ => return raise::type_error("keyword argument binds an occupied parameter"),
            }
        }

        for (pos, slot) in all.iter_mut().enumerate().skip(nargs) {
            if slot.is_null() {
                *slot = default_for(rt, target, pos, min)?;
            }
        }
        Cow::Owned(all)
    };

    let context = bound.get(CONTEXT_ARG).cloned().unwrap_or_default();
    let func = if always_callable {
        function_unwrapped(rt, &context, target)?
    } else {
        check_and_function_unwrapped(rt, &context, target)?
    };
    func(rt, &bound)
}

/// Splits a wrapper into its target and bound context; other callables pass through.
pub fn unwrap_callable(rt: &Runtime, callable: &Attr) -> (Attr, Option<Attr>) {
    if let Some(obj) = callable.as_object() {
        let value = obj.load_or_null(rt.layout().value);
        if !value.is_null() {
            let context = obj.load_or_null(rt.layout().context);
            return (value, Some(context));
        }
    }
    (callable.clone(), None)
}

/// Default stored on the function object for argument position `pos`.
///
/// Defaults cover positions `min..max` and are stored after the function instance
/// attributes, indexed from `min`.
fn default_for(rt: &Runtime, target: &ObjRef, pos: usize, min: usize) -> RtResult<Attr> {
    let Some(index) = pos.checked_sub(min) else {
        return raise::type_error("missing required argument");
    };
    match target.get(rt.layout().default_pos(index)) {
        Some(value) if !value.is_null() => Ok(value),
        _ => raise::type_error("missing default for parameter"),
    }
}

/// Writes the default for argument position `min + index`.
pub fn set_default(rt: &Runtime, target: &ObjRef, index: usize, value: Attr) {
    target.store(rt.layout().default_pos(index), value);
}

pub fn get_default(rt: &Runtime, target: &ObjRef, index: usize) -> Attr {
    target.load(rt.layout().default_pos(index))
}

/// Null contexts call functions, instance contexts call methods; a class context
/// means a method taken from its class was called without an instance.
fn function_unwrapped(rt: &Runtime, context: &Attr, target: &ObjRef) -> RtResult<NativeFn> {
    if accepts_context(context) {
        function_member(rt, target)
    } else {
        Ok(unbound_method)
    }
}

fn check_and_function_unwrapped(
    rt: &Runtime,
    context: &Attr,
    target: &ObjRef,
) -> RtResult<NativeFn> {
    if !accepts_context(context) {
        return Ok(unbound_method);
    }
    if !target.has_attr(rt.layout().func) {
        return raise::type_error("object is not callable");
    }
    function_member(rt, target)
}

fn accepts_context(context: &Attr) -> bool {
    match context {
        Attr::Value { value, .. } => value.is_instance(),
        _ => true,
    }
}

/// The function in `__fn__`; methods hold their bound version's function there.
fn function_member(rt: &Runtime, target: &ObjRef) -> RtResult<NativeFn> {
    let member = target.load(rt.layout().func.pos);
    let Some((bound, func)) = member.as_callable() else {
        return raise::type_error("object is not callable");
    };
    let Some(bound) = bound else {
        return Ok(func);
    };
    match bound.load(rt.layout().func.pos).as_callable() {
        Some((_, func)) => Ok(func),
        None => raise::type_error("object is not callable"),
    }
}

/// Function installed in `__fn__` of methods accessed through their class.
pub fn unbound_method(_rt: &Runtime, _args: &[Attr]) -> RtResult<Attr> {
    raise::unbound_method()
}
