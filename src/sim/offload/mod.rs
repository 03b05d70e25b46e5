//! Offload strategies: the decision surface that drives the transfer state
//! machine. All three strategies share the fleet-walk skeleton of the
//! scheduler but differ in two call sites, modeled here as the two hooks of
//! [`OffloadPolicy`].

pub mod oracle;
pub mod proactive;
pub mod reactive;

pub use oracle::OraclePolicy;
pub use proactive::ProactivePolicy;
pub use reactive::ReactivePolicy;

use crate::energy::Harvester;
use crate::fleet::Fleet;

/// What a transfer moves: a running service, or the raw measurement buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffloadingUnit {
    Model,
    Data,
}

/// Strategy-agnostic hook pair the scheduler drives every tick. `decide`
/// walks edge devices and may initiate transfers or execute immediate
/// moves; `post_pass` runs once per tick after the walk and is a no-op for
/// strategies that need nothing further. Both hooks see the harvester
/// read-only, since the proactive upload/download triggers are
/// battery-aware but never mutate battery state themselves.
pub trait OffloadPolicy {
    fn decide(&mut self, fleet: &mut Fleet, harvester: &Harvester, tick: usize);

    fn post_pass(&mut self, fleet: &mut Fleet, harvester: &Harvester, tick: usize) {
        let _ = (fleet, harvester, tick);
    }

    /// Only the proactive strategy carries a transfer that spans multiple
    /// ticks; the scheduler uses this to decide whether a hosted service is
    /// stopped while its device has an in-flight transfer, and whether
    /// telemetry should carry the transfer fields at all.
    fn multi_tick_transfers(&self) -> bool {
        false
    }
}
