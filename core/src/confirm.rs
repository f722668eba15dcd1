//! Confirmation tokens for irreversible requests.
//!
//! Deleting a worker and the sensor maintenance commands cannot be undone.
//! Their `build_*` methods take a `Confirmation`, which the UI only obtains
//! after showing `DestructiveAction::prompt()` and getting a yes.

/// Requests that require an explicit confirm step before they are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructiveAction {
    DeleteWorker,
    ClearCommand,
    /// Erases every enrolled template on the fingerprint sensor.
    FormatSensor,
}

impl DestructiveAction {
    pub fn prompt(&self) -> &'static str {
        match self {
            DestructiveAction::DeleteWorker => {
                "Delete this worker? Access and attendance history keeps referring to them."
            }
            DestructiveAction::ClearCommand => "Discard the command pending on the device?",
            DestructiveAction::FormatSensor => {
                "Format the fingerprint sensor? ALL enrolled fingerprints will be erased."
            }
        }
    }
}

/// Proof that the user confirmed one specific action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    action: DestructiveAction,
}

impl Confirmation {
    pub fn granted(action: DestructiveAction) -> Self {
        Self { action }
    }

    pub fn action(&self) -> DestructiveAction {
        self.action
    }

    pub(crate) fn covers(&self, action: DestructiveAction) -> bool {
        self.action == action
    }
}
