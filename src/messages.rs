//! Texts the bot sends to users.

/// The sender already holds a pending move.
pub const ALREADY_IN_GAME: &str = "You are already in a game right now";

/// Solo game opened in a private chat.
pub const SOLO_PROMPT: &str =
    "You will play against the bot. Make your choice! (reply with rock, paper or scissors)";

/// A participant's private chat is unknown.
pub const NO_PRIVATE_CHAT: &str =
    "I have lost track of our private chat. Please write me personally and try again";

/// `/new` in a group that is already recruiting.
pub const GROUP_ALREADY_OPEN: &str = "This group already has an open game.";

/// Group game opened.
pub const GROUP_OPENED: &str = "Game opened. Join with /join, abort with /abort";

/// The creator tried to join their own game.
pub const CREATOR_ALREADY_JOINED: &str = "The creator is already in the game";

/// The creator is busy in another game at join time.
pub const CREATOR_BUSY: &str =
    "The creator is already in a game right now, game will remain open...";

/// The joining participant is busy in another game.
pub const PARTNER_BUSY: &str = "You are already in a game right now, game will remain open...";

/// Private prompt sent to both players of a group game.
pub const MOVE_PROMPT: &str = "Waiting for your choice. (rock, paper, scissors)";

/// Group game matched two players.
pub const GAME_STARTED: &str = "Game started, send me your choices in a private chat.";

/// Creator aborted the group game.
pub const GAME_ABORTED: &str = "Game aborted.";

/// Someone other than the creator tried to abort.
pub const ONLY_CREATOR_ABORTS: &str = "Only the creator can abort a game";

/// Pending move text was not a move.
pub const DID_NOT_UNDERSTAND: &str =
    "Sorry, I didn't understand that. Reply with rock, paper or scissors.";

/// A solo move never arrived within the move timeout.
pub const SOLO_TIMED_OUT: &str = "You took too long to choose, the game is over.";

/// A group game's moves never arrived within the move timeout.
pub const GROUP_TIMED_OUT: &str = "Not everyone chose in time, the game is over.";

/// Nobody joined within the recruiting timeout.
pub const RECRUIT_TIMED_OUT: &str = "Nobody joined in time, the game is closed.";

/// A move slot was released before the game could finish.
pub const GAME_CANCELLED: &str = "The game was cancelled.";
