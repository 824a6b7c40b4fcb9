//! Interaction seam between a scanning session and its operator.

use super::ScanMode;
use super::report::RoundReport;

/// What the operator wants to do at a round boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundCommand {
    /// Take the next snapshot and refine with this mode
    Advance(ScanMode),
    /// End the session
    Quit,
}

/// Trait for operator interaction during a scanning session.
///
/// `prompt_round` is the single blocking point of a session: it returns
/// once the operator says a snapshot-worthy moment has occurred.
pub trait ScanPrompter {
    /// Ask for the next command. `surviving` is `None` before the set has
    /// been seeded.
    fn prompt_round(&self, round: u32, surviving: Option<usize>) -> RoundCommand;

    fn display_round(&self, report: &RoundReport);

    fn display_message(&self, message: &str);
}
