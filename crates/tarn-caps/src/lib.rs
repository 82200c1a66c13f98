//! Build capability descriptors.
//!
//! A program build either includes an optional runtime subsystem (mapping literals,
//! the I/O and OS exception classes) or it does not. The descriptor is resolved once
//! when the runtime is built and consulted at every optional call site; a site that
//! needs a capability the build lacks fails hard instead of continuing.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Mapping,
    IoError,
    EofError,
    OsError,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Mapping,
        Capability::IoError,
        Capability::EofError,
        Capability::OsError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Mapping => "mapping",
            Capability::IoError => "io-error",
            Capability::EofError => "eof-error",
            Capability::OsError => "os-error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "mapping" => Some(Capability::Mapping),
            "io-error" => Some(Capability::IoError),
            "eof-error" => Some(Capability::EofError),
            "os-error" => Some(Capability::OsError),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Capability::Mapping => 1,
            Capability::IoError => 1 << 1,
            Capability::EofError => 1 << 2,
            Capability::OsError => 1 << 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Core exceptions only; no mapping literals.
    #[default]
    Core,
    /// Core plus the I/O exception classes.
    Io,
    /// Everything.
    Full,
}

impl Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Core => "core",
            Profile::Io => "io",
            Profile::Full => "full",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "core" => Some(Profile::Core),
            "io" => Some(Profile::Io),
            "full" => Some(Profile::Full),
            _ => None,
        }
    }

    pub fn caps(self) -> BuildCaps {
        match self {
            Profile::Core => BuildCaps::none(),
            Profile::Io => BuildCaps::none()
                .with(Capability::IoError)
                .with(Capability::EofError),
            Profile::Full => BuildCaps::all(),
        }
    }
}

#[cfg(feature = "clap")]
impl clap::ValueEnum for Profile {
    fn value_variants<'a>() -> &'a [Self] {
        const ALL: [Profile; 3] = [Profile::Core, Profile::Io, Profile::Full];
        &ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// The set of optional subsystems present in a program build.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BuildCaps {
    bits: u8,
}

impl BuildCaps {
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    pub fn all() -> Self {
        Capability::ALL
            .iter()
            .fold(Self::none(), |caps, &c| caps.with(c))
    }

    pub fn with(mut self, cap: Capability) -> Self {
        self.bits |= cap.bit();
        self
    }

    pub fn has(self, cap: Capability) -> bool {
        self.bits & cap.bit() != 0
    }

    pub fn require(self, cap: Capability) -> Result<(), CapabilityMissing> {
        if self.has(cap) {
            Ok(())
        } else {
            Err(CapabilityMissing { cap })
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |&c| self.has(c))
    }

    /// Parses a comma separated list of capability names or a single profile name.
    pub fn parse_list(s: &str) -> Result<Self, CapabilityParseError> {
        let s = s.trim();
        if let Some(profile) = Profile::parse(s) {
            return Ok(profile.caps());
        }
        let mut caps = Self::none();
        for raw in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let cap = Capability::parse(raw).ok_or_else(|| CapabilityParseError {
                value: raw.to_string(),
            })?;
            caps = caps.with(cap);
        }
        Ok(caps)
    }
}

impl fmt::Debug for BuildCaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(Capability::as_str))
            .finish()
    }
}

impl FromStr for BuildCaps {
    type Err = CapabilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_list(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityMissing {
    pub cap: Capability,
}

impl fmt::Display for CapabilityMissing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "program build does not include capability {:?}",
            self.cap.as_str()
        )
    }
}

impl std::error::Error for CapabilityMissing {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityParseError {
    pub value: String,
}

impl fmt::Display for CapabilityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown capability {:?} (expected a profile: core, io, full; or a list of: mapping, io-error, eof-error, os-error)",
            self.value
        )
    }
}

impl std::error::Error for CapabilityParseError {}
