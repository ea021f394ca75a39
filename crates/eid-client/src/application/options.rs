//! Parameters for starting a workflow.

use eid_core::UserInfoMessages;

/// Options for `RUN_AUTH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationOptions {
    /// Accept test cards and relax some checks of BSI TR-03124-1.
    pub developer_mode: bool,
    /// Texts for the platform NFC dialog; engine defaults when `None`.
    pub user_info_messages: Option<UserInfoMessages>,
    /// Ask the engine to send `STATUS` events while the workflow runs.
    pub status_messages: bool,
}

impl Default for AuthenticationOptions {
    fn default() -> Self {
        Self {
            developer_mode: false,
            user_info_messages: None,
            status_messages: true,
        }
    }
}

/// Options for `RUN_CHANGE_PIN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePinOptions {
    pub user_info_messages: Option<UserInfoMessages>,
    pub status_messages: bool,
}

impl Default for ChangePinOptions {
    fn default() -> Self {
        Self {
            user_info_messages: None,
            status_messages: true,
        }
    }
}
