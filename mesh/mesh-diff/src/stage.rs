//! Run stages and their failures.

use serde::Serialize;

/// Where a run is in its linear sequence of stages.
///
/// There are no back-edges: each state is entered once, and every run ends
/// in [`RunState::Complete`] whatever the individual stages returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing has run yet.
    Start,
    /// Alignment attempted.
    Aligned,
    /// Cloud-to-cloud comparison attempted.
    CloudToCloudDone,
    /// Cloud-to-mesh comparison attempted.
    CloudToMeshDone,
    /// Reference mesh measurement attempted.
    MeasuredReference,
    /// Compared mesh measurement attempted.
    MeasuredCompared,
    /// All stages attempted.
    Complete,
}

impl RunState {
    /// The following state; `Complete` is terminal.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Start => Self::Aligned,
            Self::Aligned => Self::CloudToCloudDone,
            Self::CloudToCloudDone => Self::CloudToMeshDone,
            Self::CloudToMeshDone => Self::MeasuredReference,
            Self::MeasuredReference => Self::MeasuredCompared,
            Self::MeasuredCompared | Self::Complete => Self::Complete,
        }
    }
}

/// A unit of work that can fail without stopping the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading the reference mesh file.
    LoadReference,
    /// Reading the compared mesh file.
    LoadCompared,
    /// Aligning the compared mesh onto the reference.
    Align,
    /// Cloud-to-cloud comparison.
    CloudToCloud,
    /// Cloud-to-mesh comparison.
    CloudToMesh,
    /// Measuring the reference mesh.
    MeasureReference,
    /// Measuring the aligned compared mesh.
    MeasureCompared,
}

impl Stage {
    /// What the run used instead of this stage's output.
    #[must_use]
    pub const fn fallback(self) -> &'static str {
        match self {
            Self::LoadReference | Self::LoadCompared => "empty mesh",
            Self::Align => "unaligned compared mesh, identity transform",
            Self::CloudToCloud | Self::CloudToMesh => "single zero-distance error sample",
            Self::MeasureReference | Self::MeasureCompared => "measurement error record",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::LoadReference => "load reference",
            Self::LoadCompared => "load compared",
            Self::Align => "align",
            Self::CloudToCloud => "cloud-to-cloud",
            Self::CloudToMesh => "cloud-to-mesh",
            Self::MeasureReference => "measure reference",
            Self::MeasureCompared => "measure compared",
        })
    }
}

/// A stage that failed, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    /// The failed stage.
    pub stage: Stage,
    /// Display form of the underlying error.
    pub message: String,
}

impl StageFailure {
    /// Record `error` against `stage`.
    pub fn new(stage: Stage, error: &impl std::fmt::Display) -> Self {
        Self {
            stage,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} failed: {} (fallback: {})",
            self.stage,
            self.message,
            self.stage.fallback()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_advance_to_complete() {
        let mut state = RunState::Start;
        let mut steps = 0;
        while state != RunState::Complete {
            let next = state.next();
            assert!(next > state);
            state = next;
            steps += 1;
        }
        assert_eq!(steps, 6);
        assert_eq!(RunState::Complete.next(), RunState::Complete);
    }

    #[test]
    fn failure_display_names_fallback() {
        let failure = StageFailure::new(Stage::Align, &"too few correspondences");
        assert_eq!(
            failure.to_string(),
            "align failed: too few correspondences (fallback: unaligned compared mesh, identity transform)"
        );
    }
}
