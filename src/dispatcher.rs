//! Routes inbound messages to the directory, the registry or the coordinator.

use crate::command::{Command, HELP_TEXT, ParsedText};
use crate::coordinator::{GameCoordinator, StartRejection};
use crate::games::rps::Choice;
use crate::messages;
use crate::session::{Delivery, Forward};
use crate::transport::{ChatId, InboundMessage, UserId};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// What the dispatcher did with a message.
#[derive(Debug)]
pub enum Dispatch {
    /// Nothing to do (non-text, not for this bot, or idle chatter).
    Ignored,
    /// A game task was spawned.
    GameStarted(JoinHandle<()>),
    /// `/new` was refused; the requester was told why.
    GameRejected(StartRejection),
    /// A join or abort was handed to the group's recruiting session.
    Forwarded,
    /// A join or abort arrived in a chat without a recruiting session.
    NoOpenGroup,
    /// A move was delivered to the sender's pending slot.
    MoveDelivered,
    /// The sender has a pending move but the text was not a move.
    MoveNotUnderstood,
    /// A reserved command with no behavior.
    Reserved(Command),
    /// An unknown command in a private chat; help was sent.
    HelpSent,
}

/// Serial entry point for inbound messages.
///
/// Never waits on game progress: lookups in the registry are non-blocking and
/// games run on their own tasks.
#[derive(Clone)]
pub struct Dispatcher {
    coordinator: GameCoordinator,
}

impl Dispatcher {
    /// Creates a dispatcher driving `coordinator`.
    pub fn new(coordinator: GameCoordinator) -> Self {
        Self { coordinator }
    }

    /// The coordinator behind this dispatcher.
    pub fn coordinator(&self) -> &GameCoordinator {
        &self.coordinator
    }

    /// Handles one inbound message.
    #[instrument(
        skip(self, msg),
        fields(message_id = msg.message_id(), user_id = msg.from().id(), chat_id = msg.chat())
    )]
    pub async fn handle(&self, msg: InboundMessage) -> Dispatch {
        let Some(text) = msg.text().clone() else {
            debug!("Ignoring non-text message");
            return Dispatch::Ignored;
        };
        debug!(text = %text, kind = ?msg.kind(), "Inbound message");

        let user = *msg.from().id();
        let chat = *msg.chat();

        if msg.is_private() {
            self.coordinator.directory().put(user, chat);
        }

        match self.coordinator.parser().parse(&text) {
            ParsedText::Command(Command::New) => match self.coordinator.start_game(&msg).await {
                Ok(handle) => Dispatch::GameStarted(handle),
                Err(rejection) => {
                    info!(?rejection, "Game not started");
                    Dispatch::GameRejected(rejection)
                }
            },
            ParsedText::Command(Command::Join | Command::Abort) => {
                match self.coordinator.registry().forward(chat, msg) {
                    Forward::Delivered => Dispatch::Forwarded,
                    Forward::NoSuchGroup => {
                        debug!("No open game in this chat");
                        Dispatch::NoOpenGroup
                    }
                }
            }
            ParsedText::Command(command @ (Command::Start | Command::Stop)) => {
                debug!(%command, "Reserved command");
                Dispatch::Reserved(command)
            }
            ParsedText::UnknownCommand(name) if msg.is_private() => {
                debug!(command = %name, "Unknown command");
                self.coordinator.send(chat, HELP_TEXT).await;
                Dispatch::HelpSent
            }
            ParsedText::UnknownCommand(_) | ParsedText::NotForMe => Dispatch::Ignored,
            ParsedText::Text if msg.is_private() => self.handle_move(user, chat, &text).await,
            ParsedText::Text => Dispatch::Ignored,
        }
    }

    async fn handle_move(&self, user: UserId, chat: ChatId, text: &str) -> Dispatch {
        let registry = self.coordinator.registry();
        if !registry.has_slot(user) {
            debug!("No pending move, ignoring text");
            return Dispatch::Ignored;
        }

        let Some(choice) = Choice::parse(text) else {
            self.coordinator.send(chat, messages::DID_NOT_UNDERSTAND).await;
            return Dispatch::MoveNotUnderstood;
        };

        match registry.deliver(user, choice) {
            Delivery::Delivered => Dispatch::MoveDelivered,
            Delivery::NoSuchSlot => Dispatch::Ignored,
        }
    }
}
