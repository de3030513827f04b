use std::fmt;

/// Where a pipeline run is.
///
/// ```text
/// Idle -> Ingesting -> Ready -> Retrieving -> Done
///              |         ^
///              v         |
///         IngestFailed --+
/// ```
///
/// `IngestFailed` records that some sources were skipped; it always moves on
/// to `Ready`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Ingesting,
    IngestFailed { skipped: usize },
    Ready,
    Retrieving,
    Done,
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Ingesting => "Ingesting",
            PipelineState::IngestFailed { .. } => "IngestFailed",
            PipelineState::Ready => "Ready",
            PipelineState::Retrieving => "Retrieving",
            PipelineState::Done => "Done",
        }
    }

    pub fn can_transition_to(&self, next: &PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, next),
            (Idle, Ingesting)
                | (Ingesting, IngestFailed { .. })
                | (Ingesting, Ready)
                | (IngestFailed { .. }, Ready)
                | (Ready, Retrieving)
                | (Retrieving, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::IngestFailed { skipped } => write!(f, "IngestFailed({skipped})"),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn test_happy_path_is_valid() {
        let path = [Idle, Ingesting, Ready, Retrieving, Done];
        assert!(path.windows(2).all(|w| w[0].can_transition_to(&w[1])));
    }

    #[test]
    fn test_failed_ingest_rejoins_ready() {
        let path = [Idle, Ingesting, IngestFailed { skipped: 2 }, Ready];
        assert!(path.windows(2).all(|w| w[0].can_transition_to(&w[1])));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!Idle.can_transition_to(&Retrieving));
        assert!(!Ready.can_transition_to(&Ingesting));
        assert!(!Done.can_transition_to(&Idle));
        assert!(!IngestFailed { skipped: 1 }.can_transition_to(&Retrieving));
        assert!(Done.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(IngestFailed { skipped: 3 }.to_string(), "IngestFailed(3)");
        assert_eq!(Ready.to_string(), "Ready");
    }
}
