//! `From` implementations bridging `battcal_config` types to `battcal_core` types.
//!
//! Sample rows convert in `battcal_config` itself, next to the CSV schema.

use crate::fallback::ClosedFormFallback;

// ── ClosedFormFallback ───────────────────────────────────────────────────────

impl From<&battcal_config::FallbackCfg> for ClosedFormFallback {
    fn from(c: &battcal_config::FallbackCfg) -> Self {
        Self::from_anchors(
            (c.empty_voltage, c.empty_percentage),
            (c.full_voltage, c.full_percentage),
        )
    }
}
