//! The capability manager.

use std::collections::HashSet;
use std::sync::Arc;

use vault_common::config::CapabilityConfig;
use vault_common::platform::{RandomSource, TickSource};
use vault_common::types::{CapId, ProcessId};

use crate::cache::ValidationCache;
use crate::error::{CapError, CapResult};
use crate::seal::SealKey;
use crate::table::CapTable;
use crate::token::{Capability, ObjectType, Rights};

/// Owns every capability of an engine and mediates access checks.
///
/// The manager is not internally synchronized; the engine that owns it
/// serializes access.
pub struct CapabilityManager {
    config: CapabilityConfig,
    key: SealKey,
    table: CapTable,
    cache: ValidationCache,
    next_id: CapId,
    clock: Arc<dyn TickSource>,
}

impl CapabilityManager {
    /// Creates a manager with a fresh seal key and the root capability.
    ///
    /// The root capability (id 1) is owned by the kernel, covers every
    /// object and holds every right.
    pub fn new(
        config: CapabilityConfig,
        rng: &mut dyn RandomSource,
        clock: Arc<dyn TickSource>,
    ) -> CapResult<Self> {
        config.validate().map_err(CapError::InvalidConfig)?;

        let mut manager = Self {
            key: SealKey::generate(rng),
            table: CapTable::new(config.table_capacity),
            cache: ValidationCache::new(config.cache_slots, config.cache_ttl),
            next_id: CapId::FIRST,
            clock,
            config,
        };
        let root = manager.create(0, ObjectType::System, ProcessId::KERNEL, Rights::ALL, CapId::NONE)?;
        tracing::info!(
            "Capability manager ready: root cap {}, {} slots, cache ttl {}",
            root,
            manager.config.table_capacity,
            manager.config.cache_ttl
        );
        Ok(manager)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CapabilityConfig {
        &self.config
    }

    /// Returns the current tick.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Returns the root capability id.
    pub fn root(&self) -> CapId {
        CapId::FIRST
    }

    /// Number of stored capabilities.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if no capability is stored.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the capability with this id.
    pub fn get(&self, cap_id: CapId) -> Option<&Capability> {
        self.table.get(cap_id)
    }

    /// Iterates over the capabilities owned by `pid`, in id order.
    pub fn capabilities_of(&self, pid: ProcessId) -> impl Iterator<Item = &Capability> + '_ {
        self.table.iter().filter(move |cap| cap.owner_pid == pid)
    }

    // =========================================================================
    // Creation and validation
    // =========================================================================

    /// Creates and seals a new capability.
    ///
    /// No authorization is performed; this is the kernel's minting path.
    pub fn create(
        &mut self,
        object_id: u64,
        object_type: ObjectType,
        owner_pid: ProcessId,
        rights: Rights,
        parent: CapId,
    ) -> CapResult<CapId> {
        let cap_id = self.next_id;
        if !self.table.has_slot(cap_id) {
            return Err(CapError::Full {
                capacity: self.table.capacity(),
            });
        }

        let mut cap = Capability {
            cap_id,
            object_id,
            object_type,
            owner_pid,
            rights,
            seal: [0; 32],
            parent,
            created_at: self.now(),
            expires_at: 0,
            revoked: false,
        };
        cap.seal = self.key.seal(&cap)?;
        self.table.insert(cap)?;
        self.next_id = cap_id.next();

        tracing::debug!(
            "Created cap {} on {} {} for pid {} rights {:?} parent {}",
            cap_id,
            object_type,
            object_id,
            owner_pid,
            rights,
            parent
        );
        Ok(cap_id)
    }

    /// Checks that a capability is live and correctly sealed.
    ///
    /// Revocation and expiry are always checked first. The seal check is
    /// memoized in the validation cache for its TTL.
    pub fn validate(&mut self, cap_id: CapId) -> CapResult<()> {
        let now = self.clock.now();
        let cap = self.table.get(cap_id).ok_or(CapError::NotFound(cap_id))?;

        if cap.revoked {
            return Err(CapError::Revoked(cap_id));
        }
        if cap.is_expired(now) {
            return Err(CapError::Expired(cap_id));
        }

        let valid = match self.cache.lookup(cap_id, now) {
            Some(valid) => valid,
            None => {
                let valid = self.key.verify(cap);
                self.cache.record(cap_id, now, valid);
                valid
            }
        };
        if valid {
            Ok(())
        } else {
            tracing::warn!("Capability {} failed seal verification", cap_id);
            Err(CapError::Invalid(cap_id))
        }
    }

    /// Returns true if the capability validates.
    pub fn is_valid(&mut self, cap_id: CapId) -> bool {
        self.validate(cap_id).is_ok()
    }

    /// Returns true if `pid` holds a valid capability on `object_id` with at
    /// least `required` rights. The kernel always passes.
    pub fn check(&mut self, pid: ProcessId, object_id: u64, required: Rights) -> bool {
        if pid.is_kernel() {
            return true;
        }
        let candidates: Vec<CapId> = self
            .table
            .iter()
            .filter(|cap| {
                cap.owner_pid == pid && cap.covers(object_id) && cap.rights.contains(required)
            })
            .map(|cap| cap.cap_id)
            .collect();
        candidates.into_iter().any(|cap_id| self.is_valid(cap_id))
    }

    /// Finds a valid capability `pid` owns covering `object_id` that carries
    /// GRANT. Capabilities naming the object win over System wildcards.
    pub fn find_grantable(&mut self, pid: ProcessId, object_id: u64) -> Option<CapId> {
        let mut candidates: Vec<(bool, CapId)> = self
            .table
            .iter()
            .filter(|cap| {
                cap.owner_pid == pid && cap.covers(object_id) && cap.rights.contains(Rights::GRANT)
            })
            .map(|cap| (cap.object_id != object_id, cap.cap_id))
            .collect();
        candidates.sort_unstable();
        candidates
            .into_iter()
            .map(|(_, cap_id)| cap_id)
            .find(|&cap_id| self.is_valid(cap_id))
    }

    // =========================================================================
    // Derivation and revocation
    // =========================================================================

    /// Derives a capability for `target` from one `granter` owns.
    ///
    /// The child holds `rights` intersected with the parent's rights, so a
    /// grant can never widen access.
    pub fn grant(
        &mut self,
        granter: ProcessId,
        cap_id: CapId,
        target: ProcessId,
        rights: Rights,
    ) -> CapResult<CapId> {
        let parent = self.lookup(granter, cap_id)?;
        if parent.owner_pid != granter {
            return Err(denied(granter, cap_id));
        }
        let (object_id, object_type, parent_rights) =
            (parent.object_id, parent.object_type, parent.rights);

        self.validate(cap_id)?;
        if !parent_rights.contains(Rights::GRANT) {
            return Err(denied(granter, cap_id));
        }

        let child = self.create(object_id, object_type, target, rights & parent_rights, cap_id)?;
        tracing::info!(
            "Pid {} granted cap {} (from {}) to pid {}",
            granter,
            child,
            cap_id,
            target
        );
        Ok(child)
    }

    /// Revokes a capability and everything derived from it.
    ///
    /// Only the owner or the kernel may revoke. Descendants are revoked no
    /// matter who owns them. Returns the number of capabilities newly
    /// marked revoked.
    pub fn revoke(&mut self, pid: ProcessId, cap_id: CapId) -> CapResult<usize> {
        let cap = self.lookup(pid, cap_id)?;
        if !pid.is_kernel() && cap.owner_pid != pid {
            tracing::warn!("Pid {} denied revoke of cap {}", pid, cap_id);
            return Err(denied(pid, cap_id));
        }

        let mut revoked = 0;
        let mut visited = HashSet::new();
        let mut worklist = vec![cap_id];
        while let Some(id) = worklist.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(cap) = self.table.get_mut(id) {
                if !cap.revoked {
                    cap.revoked = true;
                    revoked += 1;
                }
            }
            self.cache.evict(id);
            worklist.extend_from_slice(self.table.children(id));
        }

        tracing::info!("Pid {} revoked cap {} ({} affected)", pid, cap_id, revoked);
        Ok(revoked)
    }

    /// Transfers ownership of a capability and reseals it.
    pub fn delegate(&mut self, from: ProcessId, cap_id: CapId, to: ProcessId) -> CapResult<()> {
        let cap = self.lookup(from, cap_id)?;
        if cap.owner_pid != from {
            return Err(denied(from, cap_id));
        }
        self.validate(cap_id)?;

        let cap = self.table.get_mut(cap_id).ok_or(CapError::NotFound(cap_id))?;
        cap.owner_pid = to;
        cap.seal = self.key.seal(cap)?;
        self.cache.evict(cap_id);

        tracing::info!("Cap {} delegated from pid {} to pid {}", cap_id, from, to);
        Ok(())
    }

    /// Sets the expiry tick (0 for never).
    pub fn set_expiry(&mut self, cap_id: CapId, expires_at: u64) -> CapResult<()> {
        let cap = self.table.get_mut(cap_id).ok_or(CapError::NotFound(cap_id))?;
        cap.expires_at = expires_at;
        self.cache.evict(cap_id);
        Ok(())
    }

    /// Frees a capability's slot. Its id is not reused.
    pub fn remove(&mut self, cap_id: CapId) -> Option<Capability> {
        self.cache.evict(cap_id);
        self.table.remove(cap_id)
    }

    /// Looks up a capability, hiding its existence from non-kernel callers.
    fn lookup(&self, pid: ProcessId, cap_id: CapId) -> CapResult<&Capability> {
        self.table.get(cap_id).ok_or_else(|| {
            if pid.is_kernel() {
                CapError::NotFound(cap_id)
            } else {
                denied(pid, cap_id)
            }
        })
    }

    #[cfg(test)]
    fn get_mut(&mut self, cap_id: CapId) -> Option<&mut Capability> {
        self.table.get_mut(cap_id)
    }
}

fn denied(pid: ProcessId, cap_id: CapId) -> CapError {
    CapError::PermissionDenied { pid, cap_id }
}

impl std::fmt::Debug for CapabilityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityManager")
            .field("len", &self.table.len())
            .field("capacity", &self.table.capacity())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}
