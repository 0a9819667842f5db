//! Capability tokens.

use std::fmt;

use bitflags::bitflags;
use vault_common::constants::MAC_SIZE;
use vault_common::types::{CapId, ProcessId};

use crate::seal::SEAL_INPUT_SIZE;

bitflags! {
    /// Capability rights.
    ///
    /// Rights can only be reduced, never added, when a capability is
    /// derived from another.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Rights: u32 {
        /// Read rows.
        const READ = 1 << 0;
        /// Insert and update rows.
        const WRITE = 1 << 1;
        /// Execute (processes).
        const EXECUTE = 1 << 2;
        /// Delete rows.
        const DELETE = 1 << 3;
        /// Derive capabilities for other processes.
        const GRANT = 1 << 4;
        /// Revoke derived capabilities.
        const REVOKE = 1 << 5;
        /// Every right.
        const ALL = 0x3F;
    }
}

/// The kind of object a capability refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ObjectType {
    /// A single row.
    TableRow = 0,
    /// A whole table.
    Table = 1,
    /// A process.
    Process = 2,
    /// A device.
    Device = 3,
    /// System-wide; matches every object in access checks.
    System = 4,
}

impl ObjectType {
    /// Returns the numeric tag committed to by the seal.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TableRow => "row",
            Self::Table => "table",
            Self::Process => "process",
            Self::Device => "device",
            Self::System => "system",
        };
        f.write_str(name)
    }
}

/// A sealed capability token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// Unique id, never reused.
    pub cap_id: CapId,
    /// Referenced object.
    pub object_id: u64,
    /// Kind of the referenced object.
    pub object_type: ObjectType,
    /// Owning process.
    pub owner_pid: ProcessId,
    /// Granted rights.
    pub rights: Rights,
    /// HMAC-SHA256 over [`Capability::seal_input`].
    pub seal: [u8; MAC_SIZE],
    /// Capability this one was derived from ([`CapId::NONE`] for roots).
    pub parent: CapId,
    /// Tick of creation.
    pub created_at: u64,
    /// Expiry tick, 0 for never.
    pub expires_at: u64,
    /// Set once revoked; never cleared.
    pub revoked: bool,
}

impl Capability {
    /// Returns the bytes the seal commits to.
    ///
    /// Layout (little-endian): cap_id (8) ‖ object_id (8) ‖ owner_pid (8) ‖
    /// rights (4) ‖ object_type (4) ‖ parent (8).
    pub fn seal_input(&self) -> [u8; SEAL_INPUT_SIZE] {
        let mut buf = [0u8; SEAL_INPUT_SIZE];
        buf[0..8].copy_from_slice(&self.cap_id.as_u64().to_le_bytes());
        buf[8..16].copy_from_slice(&self.object_id.to_le_bytes());
        buf[16..24].copy_from_slice(&self.owner_pid.as_u64().to_le_bytes());
        buf[24..28].copy_from_slice(&self.rights.bits().to_le_bytes());
        buf[28..32].copy_from_slice(&self.object_type.as_u32().to_le_bytes());
        buf[32..40].copy_from_slice(&self.parent.as_u64().to_le_bytes());
        buf
    }

    /// Returns true for capabilities not derived from another.
    pub fn is_root(&self) -> bool {
        !self.parent.is_valid()
    }

    /// Returns true if the capability has an expiry tick that `now` passed.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at != 0 && now > self.expires_at
    }

    /// Returns true if this capability covers `object_id`.
    pub fn covers(&self, object_id: u64) -> bool {
        self.object_id == object_id || self.object_type == ObjectType::System
    }
}
