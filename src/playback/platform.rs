/// Optional platform capabilities (fullscreen, picture-in-picture)
///
/// Hosts may lack these entirely or refuse them at runtime. Callers probe
/// first and branch on the answer instead of attempting and catching.

use crate::error::CapabilityError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Fullscreen,
    PictureInPicture,
}

impl Capability {
    pub fn name(self) -> &'static str {
        match self {
            Capability::Fullscreen => "fullscreen",
            Capability::PictureInPicture => "picture-in-picture",
        }
    }
}

/// Answer to a capability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Supported,
    Unsupported,
    /// Present, but the user or a policy refused it
    Denied,
}

pub trait Platform {
    fn probe(&self, capability: Capability) -> Support;

    fn is_active(&self, capability: Capability) -> bool;

    /// Enter or leave the capability's mode
    fn set_active(&mut self, capability: Capability, active: bool) -> Result<(), CapabilityError>;
}

/// A host without any optional capabilities
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapabilities;

impl Platform for NoCapabilities {
    fn probe(&self, _capability: Capability) -> Support {
        Support::Unsupported
    }

    fn is_active(&self, _capability: Capability) -> bool {
        false
    }

    fn set_active(&mut self, capability: Capability, _active: bool) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported(capability.name()))
    }
}
