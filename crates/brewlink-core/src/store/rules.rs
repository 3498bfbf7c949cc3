// ── Cross-slice rules ──
//
// Invariants spanning more than one slice. Each rule is a pure check
// against current store values returning the follow-up it requires, so
// the pump can enforce it in the same turn that violated it.

use crate::model::BrewByWeightConfig;
use crate::store::Store;

/// Brew-by-weight must be off whenever the scale is disconnected.
///
/// Returns the disabled configuration to write and send when the rule is
/// currently violated, `None` when the store already satisfies it. The
/// rule is re-asserted on every scale update, not just checked at save
/// time, so a mid-shot scale dropout also shuts brew-by-weight off.
pub fn bbw_requires_scale(store: &Store) -> Option<BrewByWeightConfig> {
    let config = store.brew_by_weight();
    if config.enabled && !store.scale().connected {
        Some(BrewByWeightConfig {
            enabled: false,
            ..config
        })
    } else {
        None
    }
}
