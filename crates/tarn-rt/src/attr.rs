//! The attribute value carried in every object slot, argument array and fragment.
//!
//! Generated code always knows which interpretation a slot holds (an object
//! reference for ordinary members, an arity/table pair for `__args__`, a bound
//! reference and function for `__fn__`, a scalar for `__data__`). The enum keeps a
//! runtime discriminant anyway so that a mismatch is observable instead of
//! undefined; hot paths still read exactly one variant through the `as_*`
//! accessors.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::object::{FragmentRef, ObjRef};
use crate::raise::RtResult;
use crate::runtime::Runtime;
use crate::table::ParamTable;

/// Uniform call signature: one argument array in (slot 0 is the context), one attr out.
pub type NativeFn = fn(&Runtime, &[Attr]) -> RtResult<Attr>;

#[derive(Clone, Default)]
pub enum Attr {
    /// Empty slot.
    #[default]
    Null,
    /// Object reference with the context it was obtained through.
    Value {
        context: Option<ObjRef>,
        value: ObjRef,
    },
    /// `__args__`: minimum arity and the parameter table.
    Args { min: u32, ptable: Arc<ParamTable> },
    /// `__fn__`: reference to the bound version of a method, and the function.
    Callable {
        bound: Option<ObjRef>,
        func: NativeFn,
    },
    Int(i64),
    Float(f64),
    Str(Rc<[u8]>),
    /// Sequence backing store held in `__data__`.
    Seq(FragmentRef),
}

impl Attr {
    pub fn object(value: ObjRef) -> Self {
        Attr::Value {
            context: None,
            value,
        }
    }

    pub fn with_context(context: ObjRef, value: ObjRef) -> Self {
        Attr::Value {
            context: Some(context),
            value,
        }
    }

    pub fn str(bytes: impl Into<Rc<[u8]>>) -> Self {
        Attr::Str(bytes.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Attr::Value { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&ObjRef> {
        match self {
            Attr::Value { context, .. } => context.as_ref(),
            _ => None,
        }
    }

    pub fn as_args(&self) -> Option<(u32, &Arc<ParamTable>)> {
        match self {
            Attr::Args { min, ptable } => Some((*min, ptable)),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<(Option<&ObjRef>, NativeFn)> {
        match self {
            Attr::Callable { bound, func } => Some((bound.as_ref(), *func)),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Attr::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Attr::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Attr::Str(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&FragmentRef> {
        match self {
            Attr::Seq(f) => Some(f),
            _ => None,
        }
    }

    /// Identity test against a specific object.
    pub fn is(&self, obj: &ObjRef) -> bool {
        self.as_object().is_some_and(|v| Rc::ptr_eq(v, obj))
    }

    /// Identity test between two attrs: same object, or both empty.
    pub fn same(&self, other: &Attr) -> bool {
        match (self, other) {
            (Attr::Null, Attr::Null) => true,
            _ => match (self.as_object(), other.as_object()) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            },
        }
    }
}

impl fmt::Debug for Attr {
    // Objects may refer back to themselves through their class, so only addresses are shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Null => f.write_str("Null"),
            Attr::Value { context, value } => f
                .debug_struct("Value")
                .field("context", &context.as_ref().map(Rc::as_ptr))
                .field("value", &Rc::as_ptr(value))
                .finish(),
            Attr::Args { min, ptable } => f
                .debug_struct("Args")
                .field("min", min)
                .field("max", &ptable.max())
                .finish(),
            Attr::Callable { bound, func } => f
                .debug_struct("Callable")
                .field("bound", &bound.as_ref().map(Rc::as_ptr))
                .field("func", &(*func as usize as *const ()))
                .finish(),
            Attr::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Attr::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Attr::Str(b) => f
                .debug_tuple("Str")
                .field(&String::from_utf8_lossy(b))
                .finish(),
            Attr::Seq(frag) => f
                .debug_struct("Seq")
                .field("size", &frag.borrow().size())
                .finish(),
        }
    }
}
