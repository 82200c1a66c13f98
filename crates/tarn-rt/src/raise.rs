//! Error-raising primitives.
//!
//! Raising is modelled as the error side of [`RtResult`]: every primitive returns
//! `Err`, and callers propagate with `?` until a handler (or the program entry point)
//! takes it. No primitive ever produces a success value.
//!
//! `IOError`, `EOFError` and `OSError` only exist in builds that include them. Raising
//! one of those in a build without it is a fatal fault: the process aborts rather
//! than continuing past the failed operation.

use std::fmt;

use tarn_caps::{Capability, CapabilityMissing};

use crate::attr::Attr;
use crate::runtime::Runtime;

pub type RtResult<T> = Result<T, Raise>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    MemoryError,
    OverflowError,
    /// Arity mismatch, bad keyword, non-callable target, unbound method invocation.
    TypeError,
    ZeroDivisionError,
    IoError,
    EofError,
    OsError,
}

impl ExceptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExceptionKind::MemoryError => "MemoryError",
            ExceptionKind::OverflowError => "OverflowError",
            ExceptionKind::TypeError => "TypeError",
            ExceptionKind::ZeroDivisionError => "ZeroDivisionError",
            ExceptionKind::IoError => "IOError",
            ExceptionKind::EofError => "EOFError",
            ExceptionKind::OsError => "OSError",
        }
    }

    /// Build capability the exception class depends on; `None` for core classes.
    pub fn capability(self) -> Option<Capability> {
        match self {
            ExceptionKind::IoError => Some(Capability::IoError),
            ExceptionKind::EofError => Some(Capability::EofError),
            ExceptionKind::OsError => Some(Capability::OsError),
            ExceptionKind::MemoryError
            | ExceptionKind::OverflowError
            | ExceptionKind::TypeError
            | ExceptionKind::ZeroDivisionError => None,
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raised exception travelling towards its handler.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Raise {
    pub kind: ExceptionKind,
    /// Constructor arguments of the exception instance (error code, path argument).
    pub args: Vec<Attr>,
    pub message: &'static str,
}

impl Raise {
    pub fn new(kind: ExceptionKind, message: &'static str) -> Self {
        Self {
            kind,
            args: Vec::new(),
            message,
        }
    }

    pub fn with_args(mut self, args: Vec<Attr>) -> Self {
        self.args = args;
        self
    }

    pub fn is(&self, kind: ExceptionKind) -> bool {
        self.kind == kind
    }

    /// OS error code carried by `IOError`/`OSError`.
    pub fn code(&self) -> Option<i64> {
        self.args.first().and_then(Attr::as_int)
    }
}

fn raise<T>(raised: Raise) -> RtResult<T> {
    tracing::trace!(kind = %raised.kind, message = raised.message, "raise");
    Err(raised)
}

fn require(rt: &Runtime, kind: ExceptionKind) {
    if let Some(cap) = kind.capability() {
        if let Err(missing) = rt.caps().require(cap) {
            capability_fault(missing);
        }
    }
}

/// Terminates the process when an optional subsystem is needed but absent.
pub fn capability_fault(missing: CapabilityMissing) -> ! {
    tracing::error!(capability = missing.cap.as_str(), "{missing}");
    eprintln!("tarn runtime: fatal: {missing}");
    std::process::abort();
}

pub fn memory_error<T>() -> RtResult<T> {
    raise(Raise::new(ExceptionKind::MemoryError, "allocation failed"))
}

pub fn overflow_error<T>() -> RtResult<T> {
    raise(Raise::new(ExceptionKind::OverflowError, "value out of range"))
}

pub fn type_error<T>(message: &'static str) -> RtResult<T> {
    raise(Raise::new(ExceptionKind::TypeError, message))
}

pub fn zero_division_error<T>() -> RtResult<T> {
    raise(Raise::new(ExceptionKind::ZeroDivisionError, "division by zero"))
}

/// Raised when a method obtained from its class is called without an instance.
pub fn unbound_method<T>() -> RtResult<T> {
    type_error("unbound method invoked without an instance")
}

pub fn io_error<T>(rt: &Runtime, code: i32) -> RtResult<T> {
    require(rt, ExceptionKind::IoError);
    raise(
        Raise::new(ExceptionKind::IoError, "input/output operation failed")
            .with_args(vec![Attr::Int(code.into())]),
    )
}

pub fn eof_error<T>(rt: &Runtime) -> RtResult<T> {
    require(rt, ExceptionKind::EofError);
    raise(Raise::new(ExceptionKind::EofError, "end of input"))
}

pub fn os_error<T>(rt: &Runtime, code: i32, arg: Attr) -> RtResult<T> {
    require(rt, ExceptionKind::OsError);
    raise(
        Raise::new(ExceptionKind::OsError, "operating system call failed")
            .with_args(vec![Attr::Int(code.into()), arg]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_kinds_need_no_capability() {
        for kind in [
            ExceptionKind::MemoryError,
            ExceptionKind::OverflowError,
            ExceptionKind::TypeError,
            ExceptionKind::ZeroDivisionError,
        ] {
            assert_eq!(kind.capability(), None);
        }
        assert_eq!(
            ExceptionKind::EofError.capability(),
            Some(Capability::EofError)
        );
    }

    #[test]
    fn primitives_never_succeed() {
        let err = type_error::<()>("bad call").unwrap_err();
        assert!(err.is(ExceptionKind::TypeError));
        assert_eq!(err.to_string(), "TypeError: bad call");
        assert!(memory_error::<()>().unwrap_err().is(ExceptionKind::MemoryError));
        assert!(overflow_error::<()>().unwrap_err().is(ExceptionKind::OverflowError));
        assert!(zero_division_error::<()>()
            .unwrap_err()
            .is(ExceptionKind::ZeroDivisionError));
        assert!(unbound_method::<()>().unwrap_err().is(ExceptionKind::TypeError));
    }
}
