//! Core domain types for rock-paper-scissors.

use rand::Rng;
use strum::{Display, EnumIter};
use tracing::instrument;

/// A move in rock-paper-scissors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Choice {
    /// Rock beats scissors.
    Rock,
    /// Paper beats rock.
    Paper,
    /// Scissors beat paper.
    Scissors,
}

impl Choice {
    /// Parses a move token (`rock`/`r`, `paper`/`p`, `scissors`/`s`), ignoring
    /// case and surrounding whitespace.
    ///
    /// Returns `None` for anything else; unknown input is never stored.
    #[instrument]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "rock" | "r" => Some(Self::Rock),
            "paper" | "p" => Some(Self::Paper),
            "scissors" | "s" => Some(Self::Scissors),
            _ => None,
        }
    }

    /// Maps a draw from `[0, 1)` onto a choice using cut points at 1/3 and 2/3.
    #[instrument]
    pub fn from_unit(draw: f64) -> Self {
        if draw < 1.0 / 3.0 {
            Self::Rock
        } else if draw < 2.0 / 3.0 {
            Self::Paper
        } else {
            Self::Scissors
        }
    }

    /// Draws a uniformly random choice for the bot.
    #[instrument(skip(rng))]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_unit(rng.gen_range(0.0..1.0))
    }

    /// The choice this one defeats.
    pub fn beats(self) -> Self {
        match self {
            Self::Rock => Self::Scissors,
            Self::Scissors => Self::Paper,
            Self::Paper => Self::Rock,
        }
    }
}

/// Result of comparing two choices, relative to argument order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Both sides chose the same.
    Tie,
    /// The first choice wins.
    FirstWins,
    /// The second choice wins.
    SecondWins,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_parse_full_and_short_tokens() {
        assert_eq!(Choice::parse("rock"), Some(Choice::Rock));
        assert_eq!(Choice::parse("P"), Some(Choice::Paper));
        assert_eq!(Choice::parse("  Scissors "), Some(Choice::Scissors));
        assert_eq!(Choice::parse("s"), Some(Choice::Scissors));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Choice::parse("lizard"), None);
        assert_eq!(Choice::parse(""), None);
        assert_eq!(Choice::parse("rock paper"), None);
    }

    #[test]
    fn test_from_unit_cut_points() {
        assert_eq!(Choice::from_unit(0.0), Choice::Rock);
        assert_eq!(Choice::from_unit(0.333), Choice::Rock);
        assert_eq!(Choice::from_unit(1.0 / 3.0), Choice::Paper);
        assert_eq!(Choice::from_unit(0.5), Choice::Paper);
        assert_eq!(Choice::from_unit(2.0 / 3.0), Choice::Scissors);
        assert_eq!(Choice::from_unit(0.999_999), Choice::Scissors);
    }

    #[test]
    fn test_random_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 3];
        let trials = 30_000;
        for _ in 0..trials {
            match Choice::random(&mut rng) {
                Choice::Rock => counts[0] += 1,
                Choice::Paper => counts[1] += 1,
                Choice::Scissors => counts[2] += 1,
            }
        }
        for count in counts {
            // Expected 10_000 each; 5% slack is far outside sampling noise.
            assert!((9_500..=10_500).contains(&count), "skewed counts: {counts:?}");
        }
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(Choice::Rock.to_string(), "rock");
        assert_eq!(Choice::Scissors.to_string(), "scissors");
    }
}
