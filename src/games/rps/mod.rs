//! Rock-paper-scissors: choices, outcome evaluation and result phrasing.

mod announce;
mod rules;
mod types;

pub use announce::{format_result, format_solo_result};
pub use rules::evaluate;
pub use types::{Choice, Outcome};
