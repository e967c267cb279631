use crate::domain::HomeworkStatus;

/// What a single poll cycle ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The API reported no homeworks since the cursor
    Idle,
    /// The latest homework still has the last notified status
    Unchanged(HomeworkStatus),
    /// A status change was sent to the chat
    Notified(HomeworkStatus),
    /// A new failure was sent to the chat
    FailureReported(String),
    /// The failure matches the last reported one and was not resent
    FailureSuppressed(String),
}

impl CycleOutcome {
    pub fn variant_name(&self) -> &'static str {
        match self {
            CycleOutcome::Idle => "Idle",
            CycleOutcome::Unchanged(_) => "Unchanged",
            CycleOutcome::Notified(_) => "Notified",
            CycleOutcome::FailureReported(_) => "FailureReported",
            CycleOutcome::FailureSuppressed(_) => "FailureSuppressed",
        }
    }
}
