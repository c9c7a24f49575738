//! Container state to operation status translation
//!
//! Pure classification of low-level runtime state into the small
//! [`OperationStatus`] enum the rest of the system reasons about. The rule
//! ordering is a deliberate tie-break: a container reported both dead and
//! exited counts as operator-stopped, so the dead flag is checked before any
//! exit-code inspection.

use capstan_core::domain::OperationStatus;

/// Conventional exit code for a SIGKILLed process (128 + 9)
const EXIT_CODE_SIGKILL: i64 = 137;

/// Snapshot of the runtime state flags the translator inspects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectedState {
    /// Container is created but was never started
    pub created: bool,
    /// Container process is currently running
    pub running: bool,
    /// Runtime marked the container dead/killed
    pub dead: bool,
    /// Container process has exited
    pub exited: bool,
    /// Exit code, meaningful only when `exited` is set
    pub exit_code: i64,
}

/// Classifies runtime state into an operation status
///
/// Rules, in priority order: created, dead, running, then exit-code
/// inspection (0 finished, 137 stopped, anything else failed). State that
/// matches none of the rules is Unknown rather than an error.
pub fn translate(state: &InspectedState) -> OperationStatus {
    if state.created {
        OperationStatus::Waiting
    } else if state.dead {
        OperationStatus::Stopped
    } else if state.running {
        OperationStatus::Running
    } else if state.exited {
        match state.exit_code {
            0 => OperationStatus::Finished,
            EXIT_CODE_SIGKILL => OperationStatus::Stopped,
            _ => OperationStatus::Failed,
        }
    } else {
        OperationStatus::Unknown
    }
}
