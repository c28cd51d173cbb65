//! Progress reporting

use std::path::PathBuf;

use hookpass_core::Stage;

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress event for one unit entering a stage
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub stage: Stage,
    /// 1-based index of the unit
    pub current: usize,
    pub total: usize,
    pub source: PathBuf,
    pub message: String,
}

/// What happened to one translation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Ran through the full pipeline
    Instrumented {
        /// The annotation tool produced nothing, so expand and merge were skipped
        copied_through: bool,
    },
    /// Excluded by the allowlist; the source was not touched
    Skipped,
}

/// Summary of a finished run
///
/// Skipped units are counted on their own and never as instrumented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub total: usize,
    pub instrumented: usize,
    pub copied_through: usize,
    pub skipped: usize,
}

impl RunReport {
    pub fn record(&mut self, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Instrumented { copied_through } => {
                self.instrumented += 1;
                if copied_through {
                    self.copied_through += 1;
                }
            }
            UnitOutcome::Skipped => self.skipped += 1,
        }
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} units: {} instrumented ({} copied through), {} skipped",
            self.total, self.instrumented, self.copied_through, self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = RunReport {
            total: 3,
            ..Default::default()
        };
        report.record(UnitOutcome::Instrumented { copied_through: false });
        report.record(UnitOutcome::Instrumented { copied_through: true });
        report.record(UnitOutcome::Skipped);

        assert_eq!(report.instrumented, 2);
        assert_eq!(report.copied_through, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            report.to_string(),
            "3 units: 2 instrumented (1 copied through), 1 skipped"
        );
    }
}
