//! Structural attribute tables and parameter tables.
//!
//! Both kinds of table are produced by the code generator before the program runs
//! and never change afterwards. Every attribute name is assigned one code and one
//! position for the whole program, so a table only has to say whether its shape
//! holds that code at that position. Resolution is therefore a single indexed
//! compare rather than a search.

use serde::{Deserialize, Serialize};
use tarn_contracts::GAP_CODE;

/// Attribute table: `codes[pos]` is the code present at `pos`, or [`GAP_CODE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    codes: Box<[u32]>,
}

impl Table {
    pub fn new(codes: impl Into<Box<[u32]>>) -> Self {
        Self {
            codes: codes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    /// Returns `pos` when this shape exposes `code` there.
    pub fn resolve(&self, pos: usize, code: u32) -> Option<usize> {
        if code == GAP_CODE {
            return None;
        }
        (self.codes.get(pos) == Some(&code)).then_some(pos)
    }
}

/// One parameter table entry: the parameter `code` and the argument position it binds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub code: u16,
    pub pos: u16,
}

impl Param {
    pub const fn new(code: u16, pos: u16) -> Self {
        Self { code, pos }
    }

    pub fn is_gap(self) -> bool {
        self.code == 0
    }
}

/// Parameter table of a callable.
///
/// Entries are indexed by the per-program parameter slot of each parameter name; a
/// keyword descriptor carries that slot as its position hint. Arity counts include
/// the context argument in slot 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTable {
    min: u32,
    max: u32,
    params: Box<[Param]>,
}

impl ParamTable {
    pub fn new(min: u32, max: u32, params: impl Into<Box<[Param]>>) -> Self {
        Self {
            min,
            max,
            params: params.into(),
        }
    }

    pub fn min(&self) -> usize {
        self.min as usize
    }

    pub fn max(&self) -> usize {
        self.max as usize
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Resolves a keyword descriptor to the argument position it binds.
    pub fn resolve(&self, hint: usize, code: u16) -> Option<usize> {
        if code == 0 {
            return None;
        }
        let entry = self.params.get(hint)?;
        (entry.code == code).then_some(entry.pos as usize)
    }
}

/// Position and code of one attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrSlot {
    pub pos: usize,
    pub code: u32,
}

impl AttrSlot {
    pub const fn new(pos: usize, code: u32) -> Self {
        Self { pos, code }
    }
}

/// The special attributes the runtime itself reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    /// `__class__` on every instance.
    pub class: AttrSlot,
    /// `__args__` (minimum arity and parameter table) on callables.
    pub args: AttrSlot,
    /// `__fn__` (bound reference and function pointer) on callables.
    #[serde(rename = "fn")]
    pub func: AttrSlot,
    /// `__data__` on literal-backed instances.
    pub data: AttrSlot,
    /// `__value__` on wrappers.
    pub value: AttrSlot,
    /// `__context__` on wrappers.
    pub context: AttrSlot,
    /// Attribute count of a function instance; defaults follow it.
    pub function_instance_size: usize,
}

impl Layout {
    pub fn slots(&self) -> [(&'static str, AttrSlot); 6] {
        [
            ("class", self.class),
            ("args", self.args),
            ("fn", self.func),
            ("data", self.data),
            ("value", self.value),
            ("context", self.context),
        ]
    }

    pub fn default_pos(&self, index: usize) -> usize {
        self.function_instance_size + index
    }
}
