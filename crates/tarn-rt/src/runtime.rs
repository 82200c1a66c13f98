use std::sync::Arc;

use tarn_caps::BuildCaps;

use crate::alloc::{Allocator, SystemAllocator};
use crate::attr::NativeFn;
use crate::manifest::ProgramLayout;
use crate::object::ObjRef;
use crate::table::{Layout, Table};

/// What `new_object` needs to instantiate one class.
#[derive(Debug, Clone)]
pub struct ClassLayout {
    pub table: Arc<Table>,
    pub class: ObjRef,
    /// Attribute count of an instance.
    pub size: usize,
}

/// Program objects the runtime refers to directly.
#[derive(Debug, Clone)]
pub struct Builtins {
    pub true_: ObjRef,
    pub false_: ObjRef,
    pub none: ObjRef,
    /// Boolean conversion, called as `bool(value)` with a null context.
    pub bool_fn: NativeFn,
    pub list: Option<ClassLayout>,
    pub tuple: Option<ClassLayout>,
    pub wrapper: Option<ClassLayout>,
    /// The mapping type's `__init__`, called with `[self, list]`.
    pub dict_init: Option<NativeFn>,
}

/// Everything the core reads at run time: layout contract, build capabilities,
/// builtin objects and the allocator.
pub struct Runtime {
    layout: Layout,
    caps: BuildCaps,
    builtins: Builtins,
    alloc: Box<dyn Allocator>,
}

impl Runtime {
    pub fn new(layout: Layout, caps: BuildCaps, builtins: Builtins) -> Self {
        tracing::debug!(?caps, "runtime initialised");
        Self {
            layout,
            caps,
            builtins,
            alloc: Box::new(SystemAllocator::from_env()),
        }
    }

    /// Runtime for a loaded layout manifest.
    pub fn from_program(program: &ProgramLayout, builtins: Builtins) -> Self {
        Self::new(program.layout.clone(), program.caps, builtins)
    }

    pub fn with_allocator(mut self, alloc: impl Allocator + 'static) -> Self {
        self.alloc = Box::new(alloc);
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn caps(&self) -> BuildCaps {
        self.caps
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn allocator(&self) -> &dyn Allocator {
        self.alloc.as_ref()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("layout", &self.layout)
            .field("caps", &self.caps)
            .field("alloc", &self.alloc.stats())
            .finish_non_exhaustive()
    }
}
