//! Objects and sequence fragments.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tarn_contracts::INSTANCE_POS;

use crate::attr::Attr;
use crate::raise::{self, RtResult};
use crate::table::{AttrSlot, Table};

pub type ObjRef = Rc<Object>;
pub type FragmentRef = Rc<RefCell<Fragment>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocPolicy {
    /// Ordinary heap object.
    Heap,
    /// Never written after its creator finishes populating it (interned constants).
    Immutable,
}

/// A table reference, the class position and a fixed number of attribute slots.
///
/// The slot count is decided at creation and never changes. Slot writes go through a
/// `RefCell` because objects are shared by reference; the runtime is single-threaded
/// and never holds a slot borrow across a call.
pub struct Object {
    table: Arc<Table>,
    pos: u32,
    policy: AllocPolicy,
    attrs: RefCell<Box<[Attr]>>,
}

impl Object {
    pub(crate) fn from_parts(
        table: Arc<Table>,
        pos: u32,
        policy: AllocPolicy,
        attrs: Box<[Attr]>,
    ) -> Self {
        Self {
            table,
            pos,
            policy,
            attrs: RefCell::new(attrs),
        }
    }

    /// A structure emitted by the code generator: classes, functions, constants.
    ///
    /// `pos` is [`INSTANCE_POS`] for instances and the position of the type attribute
    /// for classes.
    pub fn predefined(table: Arc<Table>, pos: u32, attrs: Vec<Attr>) -> ObjRef {
        Rc::new(Self::from_parts(
            table,
            pos,
            AllocPolicy::Immutable,
            attrs.into_boxed_slice(),
        ))
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn pos(&self) -> u32 {
        self.pos
    }

    pub fn policy(&self) -> AllocPolicy {
        self.policy
    }

    pub fn is_instance(&self) -> bool {
        self.pos == INSTANCE_POS
    }

    pub fn len(&self) -> usize {
        self.attrs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_attr(&self, slot: AttrSlot) -> bool {
        self.table.resolve(slot.pos, slot.code).is_some() && slot.pos < self.len()
    }

    /// Unchecked read of a position the code generator proved present.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the object.
    pub fn load(&self, pos: usize) -> Attr {
        self.attrs.borrow()[pos].clone()
    }

    /// Unchecked write of a position the code generator proved present.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the object.
    pub fn store(&self, pos: usize, value: Attr) {
        self.attrs.borrow_mut()[pos] = value;
    }

    /// Like [`Object::load`] but returns `None` past the end.
    pub fn get(&self, pos: usize) -> Option<Attr> {
        self.attrs.borrow().get(pos).cloned()
    }

    pub fn load_checked(&self, slot: AttrSlot) -> RtResult<Attr> {
        if !self.has_attr(slot) {
            return raise::type_error("object does not provide the attribute");
        }
        Ok(self.load(slot.pos))
    }

    /// Checked read that yields [`Attr::Null`] instead of raising.
    pub fn load_or_null(&self, slot: AttrSlot) -> Attr {
        if self.has_attr(slot) {
            self.load(slot.pos)
        } else {
            Attr::Null
        }
    }

    pub fn store_checked(&self, slot: AttrSlot, value: Attr) -> RtResult<()> {
        if !self.has_attr(slot) {
            return raise::type_error("object does not provide the attribute");
        }
        self.store(slot.pos, value);
        Ok(())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("pos", &self.pos)
            .field("policy", &self.policy)
            .field("attrs", &self.attrs.borrow())
            .finish()
    }
}

/// Size/capacity tracked attr array backing list and tuple data.
///
/// Capacity is fixed when the fragment is created; growing past it means replacing
/// the fragment, which is the owning type's business.
pub struct Fragment {
    size: usize,
    attrs: Box<[Attr]>,
}

impl Fragment {
    pub(crate) fn with_storage(attrs: Box<[Attr]>) -> Self {
        Self { size: 0, attrs }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.attrs.len()
    }

    pub fn as_slice(&self) -> &[Attr] {
        &self.attrs[..self.size]
    }

    pub fn get(&self, index: usize) -> Option<&Attr> {
        self.as_slice().get(index)
    }

    /// Appends within capacity; hands the value back when full.
    pub fn push(&mut self, value: Attr) -> Result<(), Attr> {
        match self.attrs.get_mut(self.size) {
            Some(slot) => {
                *slot = value;
                self.size += 1;
                Ok(())
            }
            None => Err(value),
        }
    }

    pub(crate) fn fill(&mut self, values: &[Attr]) {
        debug_assert!(values.len() <= self.capacity());
        self.attrs[..values.len()].clone_from_slice(values);
        self.size = values.len();
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("size", &self.size)
            .field("capacity", &self.capacity())
            .field("attrs", &self.as_slice())
            .finish()
    }
}
