use crate::commands::{CommandError, CommandOutput};
use mockall::automock;

/// A repository driven by the git executable.
pub mod git;

/// A working tree that can be synchronized with its remote.
///
/// Both operations block until the underlying command finishes. A non-zero exit
/// code is not an error here, it is returned in the output for the caller to judge.
#[automock]
pub trait Repository: Send + Sync {
    /// Pull the remote changes into the working tree.
    fn pull(&self) -> Result<CommandOutput, CommandError>;
    /// Abort the merge left behind by the last pull.
    fn abort_merge(&self) -> Result<CommandOutput, CommandError>;
}
