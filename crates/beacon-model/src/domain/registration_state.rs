use serde::{Deserialize, Serialize};

/// Lifecycle of a single registration.
///
/// A `RegistrationHandle` only exists once the backend acknowledged the record, so it
/// observes `Registered` and `Deregistered`. `Unregistered` is the state until
/// `register` returns, and `Failed` is carried by the `Err` it returns instead.
///
/// ```text
/// Unregistered --register ok--> Registered --shutdown--> Deregistered
/// Unregistered --register err-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationState {
    /// Nothing has been submitted yet.
    #[default]
    Unregistered,
    /// The backend acknowledged the record.
    Registered,
    /// Deregistration was attempted (successfully or not).
    Deregistered,
    /// Submission failed; the instance must not serve.
    Failed,
}

impl RegistrationState {
    /// Returns `true` if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationState::Deregistered | RegistrationState::Failed
        )
    }
}
