//! Outcome evaluation.

use super::types::{Choice, Outcome};
use tracing::instrument;

/// Compares two choices.
///
/// Rock beats scissors, scissors beat paper, paper beats rock; equal choices tie.
#[instrument]
pub fn evaluate(first: Choice, second: Choice) -> Outcome {
    if first == second {
        Outcome::Tie
    } else if first.beats() == second {
        Outcome::FirstWins
    } else {
        Outcome::SecondWins
    }
}
