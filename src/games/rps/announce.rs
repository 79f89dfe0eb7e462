//! Human-readable result messages.

use super::rules::evaluate;
use super::types::{Choice, Outcome};
use tracing::instrument;

/// Formats a two-player result, e.g. `"C chose rock, D chose scissors: C wins"`.
///
/// Argument order only affects phrasing.
#[instrument]
pub fn format_result(first: &str, first_choice: Choice, second: &str, second_choice: Choice) -> String {
    let verdict = match evaluate(first_choice, second_choice) {
        Outcome::Tie => "tie".to_string(),
        Outcome::FirstWins => format!("{first} wins"),
        Outcome::SecondWins => format!("{second} wins"),
    };
    format!("{first} chose {first_choice}, {second} chose {second_choice}: {verdict}")
}

/// Formats the result of a game against the bot, addressed to the player.
#[instrument]
pub fn format_solo_result(bot_choice: Choice, player_choice: Choice) -> String {
    let verdict = match evaluate(bot_choice, player_choice) {
        Outcome::Tie => "tie",
        Outcome::FirstWins => "the bot wins",
        Outcome::SecondWins => "you win",
    };
    format!("The bot chose {bot_choice}, you chose {player_choice}: {verdict}")
}
