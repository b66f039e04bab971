//! Rebuild statistics.

use std::time::Duration;

/// Immutable snapshot of one rebuild run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildStats {
    /// Functions across all loaded summary modules.
    pub summary_functions: usize,
    /// Instructions across all loaded summary modules.
    pub summary_instructions: usize,
    /// Synthetic methods minted and attached.
    pub rebuilt_methods: usize,
    pub total_call_sites: usize,
    pub instance_call_sites: usize,
    pub static_call_sites: usize,
    pub pointer_call_sites: usize,
    /// Wall time of the cross-language resolution scan.
    pub resolution_time: Duration,
    /// Wall time of per-call-site inference, lowering, and assembly.
    pub lowering_time: Duration,
    pub total_time: Duration,
}

impl RebuildStats {
    /// Rebuilt methods per loaded summary function. Exceeds 1.0 when
    /// exports are called from several sites.
    pub fn success_rate(&self) -> f64 {
        if self.summary_functions == 0 {
            0.0
        } else {
            self.rebuilt_methods as f64 / self.summary_functions as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_handles_empty_store() {
        assert_eq!(RebuildStats::default().success_rate(), 0.0);
    }

    #[test]
    fn test_success_rate() {
        let stats = RebuildStats {
            summary_functions: 4,
            rebuilt_methods: 6,
            ..RebuildStats::default()
        };
        assert!((stats.success_rate() - 1.5).abs() < f64::EPSILON);
    }
}
