//! Capability probing
//!
//! [`detect`] asks the host once which entry points exist and decides the API
//! generation. [`EntryPoints`] is the "primary, else fallback, else
//! unavailable" primitive every handler calls through.

use crate::host::{HostApi, HostResult};
use panel_bridge_core::{ApiCapabilitySet, ApiGeneration, BridgeError, Capability, Result};
use tracing::{debug, info};

/// First candidate accepted by `available`, in order
pub fn first_available(
    candidates: impl IntoIterator<Item = Capability>,
    available: impl Fn(Capability) -> bool,
) -> Option<Capability> {
    candidates.into_iter().find(|c| available(*c))
}

/// Probe the host once and freeze the result
pub fn detect(host: &dyn HostApi) -> ApiCapabilitySet {
    let available: Vec<Capability> = Capability::ALL
        .iter()
        .copied()
        .filter(|c| host.supports(*c))
        .collect();

    // Role-based access control only exists on the modern API
    let generation = match first_available(
        [Capability::SetRole, Capability::SetAccessLevel],
        |c| available.contains(&c),
    ) {
        Some(Capability::SetRole) => ApiGeneration::Modern,
        _ => ApiGeneration::Legacy,
    };

    let caps = ApiCapabilitySet::new(generation, available);
    info!(
        "Detected {} host API, {} of {} entry points available",
        caps.generation,
        caps.len(),
        Capability::ALL.len()
    );
    caps
}

/// Value returned by an entry point plus the capability that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Called<T> {
    pub value: T,
    pub via: Capability,
}

impl<T> Called<T> {
    /// Name reported back to the host as `method`
    pub fn method(&self) -> &'static str {
        self.via.entry_point()
    }
}

type Attempt<'a, T> = Box<dyn FnOnce(&mut dyn HostApi) -> HostResult<T> + 'a>;

/// Ordered chain of entry points for one operation
///
/// ```ignore
/// let called = EntryPoints::new()
///     .primary(Capability::TeleportTo, |h| h.teleport_to(name, to))
///     .fallback(Capability::SetPosition, |h| h.set_position(name, to))
///     .call(ctx.host, ctx.caps)?;
/// ```
pub struct EntryPoints<'a, T> {
    chain: Vec<(Capability, Attempt<'a, T>)>,
}

impl<'a, T> Default for EntryPoints<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> EntryPoints<'a, T> {
    pub fn new() -> Self {
        Self { chain: Vec::new() }
    }

    pub fn primary(
        mut self,
        capability: Capability,
        attempt: impl FnOnce(&mut dyn HostApi) -> HostResult<T> + 'a,
    ) -> Self {
        self.chain.insert(0, (capability, Box::new(attempt)));
        self
    }

    pub fn fallback(
        mut self,
        capability: Capability,
        attempt: impl FnOnce(&mut dyn HostApi) -> HostResult<T> + 'a,
    ) -> Self {
        self.chain.push((capability, Box::new(attempt)));
        self
    }

    /// Invoke the first available entry point
    ///
    /// A fault raised by that entry point is reported as-is; later fallbacks
    /// are only for absent entry points, not failing ones.
    pub fn call(self, host: &mut dyn HostApi, caps: &ApiCapabilitySet) -> Result<Called<T>> {
        let tried: Vec<Capability> = self.chain.iter().map(|(c, _)| *c).collect();
        for (capability, attempt) in self.chain {
            if !caps.has(capability) {
                continue;
            }
            debug!("Calling {}", capability.entry_point());
            return attempt(host)
                .map(|value| Called {
                    value,
                    via: capability,
                })
                .map_err(|fault| BridgeError::fault(capability.entry_point(), fault.0));
        }
        Err(BridgeError::CapabilityUnavailable(
            tried
                .iter()
                .map(|c| c.entry_point())
                .collect::<Vec<_>>()
                .join(" | "),
        ))
    }
}
