//! Governance rejections.
//!
//! Every rejection is reported back to the sender as an `Invalid-*-Notice`;
//! none of them mutate state. Display strings are the protocol's error texts.

/// Result type for governance handlers.
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Rejection taxonomy carried in the `Error-Kind` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Sender is not allowed to perform the action.
    Authorization,
    /// Missing, empty, or malformed field.
    Validation,
    /// Request conflicts with current state.
    StateConflict,
}

impl ErrorKind {
    pub fn as_tag(&self) -> &'static str {
        match self {
            ErrorKind::Authorization => "Unauthorized",
            ErrorKind::Validation => "Bad-Input",
            ErrorKind::StateConflict => "Conflict",
        }
    }
}

/// Governance errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovernanceError {
    #[error("Sender is not a registered Controller!")]
    NotController,

    #[error("Only the proposer may revoke a Proposal")]
    NotProposer,

    #[error("Proposal-Type must be one of Add-Controller, Remove-Controller, Eval")]
    InvalidProposalType,

    #[error("Controller is required")]
    ControllerRequired,

    #[error("Process-Id is required")]
    ProcessIdRequired,

    #[error("Process-Id cannot be empty")]
    ProcessIdEmpty,

    #[error("Process-Id cannot be only whitespace")]
    ProcessIdWhitespace,

    #[error("Eval string is expected in message Data")]
    EvalStringRequired,

    #[error("Vote, if provided, must be 'yay' or 'nay'")]
    InvalidInitialVote,

    #[error("A Vote of 'yay' or 'nay' is required")]
    InvalidVote,

    #[error("Proposal-Number is required")]
    ProposalNumberRequired,

    #[error("Proposal-Number must be a positive integer")]
    InvalidProposalNumber,

    #[error("At least one initial Controller is required")]
    NoControllers,

    #[error("Initial Controller cannot be blank")]
    InvalidController,

    #[error("Controller already exists")]
    ControllerExists,

    #[error("Controller is not recognized")]
    ControllerNotRecognized,

    #[error("Cannot remove the last Controller")]
    LastController,

    #[error("Proposal already exists")]
    ProposalExists,

    #[error("Proposal does not exist")]
    ProposalNotFound,
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GovernanceError::NotController | GovernanceError::NotProposer => {
                ErrorKind::Authorization
            }
            GovernanceError::InvalidProposalType
            | GovernanceError::ControllerRequired
            | GovernanceError::ProcessIdRequired
            | GovernanceError::ProcessIdEmpty
            | GovernanceError::ProcessIdWhitespace
            | GovernanceError::EvalStringRequired
            | GovernanceError::InvalidInitialVote
            | GovernanceError::InvalidVote
            | GovernanceError::ProposalNumberRequired
            | GovernanceError::InvalidProposalNumber
            | GovernanceError::NoControllers
            | GovernanceError::InvalidController => ErrorKind::Validation,
            GovernanceError::ControllerExists
            | GovernanceError::ControllerNotRecognized
            | GovernanceError::LastController
            | GovernanceError::ProposalExists
            | GovernanceError::ProposalNotFound => ErrorKind::StateConflict,
        }
    }
}
