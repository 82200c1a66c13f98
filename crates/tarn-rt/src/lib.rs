//! Core runtime of the tarn object model.
//!
//! Objects are fixed-size attribute arrays described by structural tables that the
//! code generator computes ahead of time. This crate supplies what generated code
//! calls into: instantiation, generic invocation with argument binding, truth
//! testing, the raising primitives, code-point string indexing and the descriptor
//! I/O bridge.

pub mod alloc;
pub mod attr;
pub mod diagnostics;
pub mod instantiate;
pub mod invoke;
pub mod io;
pub mod manifest;
pub mod object;
pub mod raise;
pub mod runtime;
pub mod table;
pub mod truth;
pub mod unicode;

pub use attr::{Attr, NativeFn};
pub use manifest::{LayoutManifest, ProgramLayout};
pub use object::{AllocPolicy, Fragment, FragmentRef, ObjRef, Object};
pub use raise::{ExceptionKind, Raise, RtResult};
pub use runtime::{Builtins, ClassLayout, Runtime};
pub use table::{AttrSlot, Layout, Param, ParamTable, Table};
