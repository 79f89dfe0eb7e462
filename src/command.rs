//! Textual command recognition.

use strum::Display;
use tracing::instrument;

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    /// Start a game (`new`, `n`).
    New,
    /// Join the open group game (`join`, `j`).
    Join,
    /// Abort the open group game (`abort`, `a`).
    Abort,
    /// Reserved, no behavior.
    Start,
    /// Reserved, no behavior.
    Stop,
}

impl Command {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "new" | "n" => Some(Self::New),
            "join" | "j" => Some(Self::Join),
            "abort" | "a" => Some(Self::Abort),
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

/// Classification of an inbound text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedText {
    /// A command meant for this bot.
    Command(Command),
    /// Slash-prefixed text that is not a known command.
    UnknownCommand(String),
    /// A command explicitly addressed to another bot.
    NotForMe,
    /// Plain text, possibly a move.
    Text,
}

/// Parses commands of the form `/name[@botname] [args...]` or a bare
/// `name[@botname]`, ignoring case.
#[derive(Debug, Clone)]
pub struct CommandParser {
    bot_username: String,
}

impl CommandParser {
    /// Creates a parser accepting `@bot_username` suffixes.
    #[instrument]
    pub fn new(bot_username: &str) -> Self {
        Self {
            bot_username: bot_username.trim_start_matches('@').to_lowercase(),
        }
    }

    /// Classifies `text`.
    ///
    /// A slash command may carry trailing words, which are ignored. Without
    /// the slash the whole text must be the command, so ordinary chatter that
    /// merely starts with a command word stays [`ParsedText::Text`].
    #[instrument(skip(self))]
    pub fn parse(&self, text: &str) -> ParsedText {
        let mut words = text.split_whitespace();
        let Some(word) = words.next() else {
            return ParsedText::Text;
        };
        let word = word.to_lowercase();
        let slashed = word.starts_with('/');
        if !slashed && words.next().is_some() {
            return ParsedText::Text;
        }
        let word = word.trim_start_matches('/');

        let (name, addressee) = match word.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (word, None),
        };

        if let Some(addressee) = addressee
            && addressee != self.bot_username
        {
            return if slashed {
                ParsedText::NotForMe
            } else {
                ParsedText::Text
            };
        }

        match Command::from_token(name) {
            Some(command) => ParsedText::Command(command),
            None if slashed => ParsedText::UnknownCommand(name.to_string()),
            None => ParsedText::Text,
        }
    }
}

/// Help shown for unrecognized commands in private chats.
pub const HELP_TEXT: &str = "Commands: /new to start a game (against me in private, \
or open one in a group), /join to join a group game, /abort to cancel the group game you opened. \
Moves: rock, paper or scissors (r, p, s).";
