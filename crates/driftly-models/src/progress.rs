//! Projection of free-text job phases onto a coarse progress percentage.
//!
//! The service only reports a human readable phase such as
//! `"Creating video with Veo 3..."`. Rules are checked in order and the
//! first matching rule wins, so a phase containing both
//! `"Generating script"` and `"script"` maps to 15, never 30.

/// Percentage shown once a job completes.
pub const COMPLETE_PERCENT: u8 = 100;

/// A single phase rule: any of `needles` contained in the phase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRule {
    pub needles: &'static [&'static str],
    pub percent: u8,
}

impl PhaseRule {
    /// Whether the phase text matches this rule (case-sensitive substring).
    pub fn matches(&self, phase: &str) -> bool {
        self.needles.iter().any(|needle| phase.contains(needle))
    }
}

/// Ordered phase rules. Order is significant.
pub const PHASE_RULES: &[PhaseRule] = &[
    PhaseRule { needles: &["Initializing"], percent: 5 },
    PhaseRule { needles: &["Generating script"], percent: 15 },
    PhaseRule { needles: &["script"], percent: 30 },
    PhaseRule { needles: &["Creating video"], percent: 45 },
    PhaseRule { needles: &["Processing"], percent: 55 },
    PhaseRule { needles: &["video"], percent: 70 },
    PhaseRule { needles: &["Finalizing"], percent: 85 },
    PhaseRule { needles: &["YouTube", "Saving"], percent: 95 },
];

/// Map a phase description to a percentage.
///
/// Returns `None` when no rule matches; callers keep the previous value.
pub fn phase_progress(phase: &str) -> Option<u8> {
    PHASE_RULES
        .iter()
        .find(|rule| rule.matches(phase))
        .map(|rule| rule.percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initializing_always_five() {
        assert_eq!(phase_progress("Initializing..."), Some(5));
        assert_eq!(phase_progress("Initializing video pipeline"), Some(5));
        assert_eq!(phase_progress("Initializing script and YouTube upload"), Some(5));
    }

    #[test]
    fn test_earlier_rule_wins() {
        assert_eq!(phase_progress("Generating script with Grok..."), Some(15));
        assert_eq!(
            phase_progress("Generating script for 3 segments with Grok..."),
            Some(15)
        );
        assert_eq!(phase_progress("Refining script"), Some(30));
        // "Creating video" is checked before the bare "video" rule.
        assert_eq!(phase_progress("Creating video with Veo 3..."), Some(45));
        assert_eq!(phase_progress("Creating 3 video segments with Veo 3..."), Some(70));
    }

    #[test]
    fn test_late_phases() {
        assert_eq!(phase_progress("Processing segment 2"), Some(55));
        assert_eq!(phase_progress("Finalizing output"), Some(85));
        assert_eq!(phase_progress("Uploading to YouTube..."), Some(95));
        // "Saving video locally" also contains "video", which is checked first.
        assert_eq!(phase_progress("Saving video locally..."), Some(70));
        assert_eq!(phase_progress("Saving output"), Some(95));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(phase_progress("initializing"), None);
        assert_eq!(phase_progress("Uploading to youtube"), None);
        assert_eq!(phase_progress(""), None);
    }
}
