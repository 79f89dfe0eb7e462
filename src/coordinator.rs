//! Game session coordination.
//!
//! Every game runs as its own task. A solo game waits on one [`AwaitSlot`];
//! a group game first recruits a partner from its [`GroupInbox`], then waits
//! on both players' slots. The coordinator never touches another game's
//! state; everything shared goes through the [`SessionRegistry`].

use crate::command::{Command, CommandParser, ParsedText};
use crate::directory::Directory;
use crate::games::rps::{Choice, format_result, format_solo_result};
use crate::messages;
use crate::session::{AwaitSlot, GroupInbox, PairConflict, SessionRegistry};
use crate::transport::{ChatId, InboundMessage, Participant, Transport, UserId};
use derive_getters::Getters;
use derive_new::new;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::error::Elapsed;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

/// Optional limits on how long a game may wait for input.
///
/// `None` waits forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters, new)]
pub struct CoordinatorSettings {
    /// Limit on waiting for moves.
    move_timeout: Option<Duration>,
    /// Limit on a group game's recruiting phase.
    recruit_timeout: Option<Duration>,
}

/// Why `/new` did not start a game. The requester has already been told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRejection {
    /// The requester holds a pending move.
    AlreadyInGame,
    /// The requester's private chat is unknown (group games only).
    NoPrivateChat,
    /// The group is already recruiting.
    GroupAlreadyOpen,
}

/// A matched group game, ready to collect moves.
struct Recruited {
    partner: Participant,
    creator_slot: AwaitSlot,
    partner_slot: AwaitSlot,
}

/// Starts games and runs each one to completion on its own task.
#[derive(Clone)]
pub struct GameCoordinator {
    registry: SessionRegistry,
    directory: Arc<Directory>,
    transport: Arc<dyn Transport>,
    parser: CommandParser,
    settings: CoordinatorSettings,
}

impl GameCoordinator {
    /// Creates a coordinator over shared state.
    #[instrument(skip(registry, directory, transport))]
    pub fn new(
        registry: SessionRegistry,
        directory: Arc<Directory>,
        transport: Arc<dyn Transport>,
        settings: CoordinatorSettings,
    ) -> Self {
        let parser = CommandParser::new(transport.identity().username());
        info!("Creating game coordinator");
        Self {
            registry,
            directory,
            transport,
            parser,
            settings,
        }
    }

    /// The session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The private chat directory.
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// The command parser for this bot.
    pub fn parser(&self) -> &CommandParser {
        &self.parser
    }

    /// Sends `text` to `chat`. Failures are logged; game state is unaffected.
    #[instrument(skip(self, text))]
    pub async fn send(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.transport.send_text(chat, text).await {
            warn!(chat, error = %e, "Failed to send message");
        }
    }

    /// Handles `/new`: a solo game in a private chat, a recruiting group game
    /// otherwise.
    ///
    /// Returns the handle of the spawned game task.
    #[instrument(skip(self, msg), fields(user_id = msg.from().id(), chat_id = msg.chat()))]
    pub async fn start_game(&self, msg: &InboundMessage) -> Result<JoinHandle<()>, StartRejection> {
        let user = *msg.from().id();
        let chat = *msg.chat();

        if self.registry.has_slot(user) {
            self.send(chat, messages::ALREADY_IN_GAME).await;
            return Err(StartRejection::AlreadyInGame);
        }

        if msg.is_private() {
            self.start_solo(user, chat).await
        } else {
            self.start_group(msg.from().clone(), chat).await
        }
    }

    async fn start_solo(&self, user: UserId, chat: ChatId) -> Result<JoinHandle<()>, StartRejection> {
        let Ok(slot) = self.registry.try_claim(user) else {
            self.send(chat, messages::ALREADY_IN_GAME).await;
            return Err(StartRejection::AlreadyInGame);
        };

        self.send(chat, messages::SOLO_PROMPT).await;
        info!(user, "Solo game started");

        let this = self.clone();
        let span = info_span!("solo_game", user, chat);
        Ok(tokio::spawn(this.run_solo(chat, slot).instrument(span)))
    }

    async fn run_solo(self, chat: ChatId, slot: AwaitSlot) {
        let choice = match bounded(self.settings.move_timeout, slot.recv()).await {
            Ok(Ok(choice)) => choice,
            Ok(Err(_)) => {
                info!("Move slot released, ending solo game");
                return;
            }
            Err(_) => {
                info!("Solo game timed out");
                self.send(chat, messages::SOLO_TIMED_OUT).await;
                return;
            }
        };

        let bot_choice = Choice::random(&mut rand::thread_rng());
        info!(%choice, %bot_choice, "Solo game resolved");
        self.send(chat, &format_solo_result(bot_choice, choice)).await;
    }

    async fn start_group(
        &self,
        creator: Participant,
        group: ChatId,
    ) -> Result<JoinHandle<()>, StartRejection> {
        if !self.directory.contains(*creator.id()) {
            self.send(group, messages::NO_PRIVATE_CHAT).await;
            return Err(StartRejection::NoPrivateChat);
        }

        let Ok(inbox) = self.registry.open_group(group) else {
            self.send(group, messages::GROUP_ALREADY_OPEN).await;
            return Err(StartRejection::GroupAlreadyOpen);
        };

        self.send(group, messages::GROUP_OPENED).await;
        info!(creator = creator.id(), group, "Group game opened");

        let this = self.clone();
        let span = info_span!("group_game", creator = creator.id(), group);
        Ok(tokio::spawn(this.run_group(creator, inbox).instrument(span)))
    }

    async fn run_group(self, creator: Participant, mut inbox: GroupInbox) {
        let group = inbox.group();

        let outcome = bounded(
            self.settings.recruit_timeout,
            self.recruit(&creator, &mut inbox),
        )
        .await;
        let recruited = match outcome {
            Ok(Some(recruited)) => recruited,
            Ok(None) => return,
            Err(_) => {
                inbox.close();
                info!("Recruiting timed out");
                self.send(group, messages::RECRUIT_TIMED_OUT).await;
                return;
            }
        };
        drop(inbox);

        let Recruited {
            partner,
            creator_slot,
            partner_slot,
        } = recruited;

        for player in [&creator, &partner] {
            match self.directory.get(*player.id()) {
                Some(chat) => self.send(chat, messages::MOVE_PROMPT).await,
                None => warn!(user = player.id(), "No private chat for player"),
            }
        }
        self.send(group, messages::GAME_STARTED).await;
        info!(partner = partner.id(), "Group game started");

        let collected = bounded(self.settings.move_timeout, async {
            tokio::try_join!(creator_slot.recv(), partner_slot.recv())
        })
        .await;

        match collected {
            Ok(Ok((creator_choice, partner_choice))) => {
                info!(%creator_choice, %partner_choice, "Group game resolved");
                let result = format_result(
                    creator.display_name(),
                    creator_choice,
                    partner.display_name(),
                    partner_choice,
                );
                self.send(group, &result).await;
            }
            Ok(Err(_)) => {
                info!("Move slot released, cancelling group game");
                self.send(group, messages::GAME_CANCELLED).await;
            }
            Err(_) => {
                info!("Group game timed out");
                self.send(group, messages::GROUP_TIMED_OUT).await;
            }
        }
    }

    /// Consumes group messages until a partner joins (`Some`) or the creator
    /// aborts (`None`). Anything but join and abort is ignored.
    async fn recruit(&self, creator: &Participant, inbox: &mut GroupInbox) -> Option<Recruited> {
        let group = inbox.group();

        while let Some(msg) = inbox.next().await {
            let Some(text) = msg.text() else {
                continue;
            };
            let from = msg.from();

            match self.parser.parse(text) {
                ParsedText::Command(Command::Join) => {
                    if from.id() == creator.id() {
                        self.send(group, messages::CREATOR_ALREADY_JOINED).await;
                        continue;
                    }

                    let partner = *from.id();
                    let claimed =
                        self.registry
                            .try_claim_pair(*creator.id(), partner, || {
                                self.directory.contains(partner)
                            });

                    match claimed {
                        Ok((creator_slot, partner_slot)) => {
                            inbox.close();
                            return Some(Recruited {
                                partner: from.clone(),
                                creator_slot,
                                partner_slot,
                            });
                        }
                        Err(conflict) => {
                            debug!(partner, ?conflict, "Join refused, game stays open");
                            let reply = match conflict {
                                PairConflict::CreatorBusy => messages::CREATOR_BUSY,
                                PairConflict::PartnerBusy => messages::PARTNER_BUSY,
                                PairConflict::PartnerUnreachable => messages::NO_PRIVATE_CHAT,
                            };
                            self.send(group, reply).await;
                        }
                    }
                }
                ParsedText::Command(Command::Abort) => {
                    if from.id() == creator.id() {
                        inbox.close();
                        info!("Group game aborted by creator");
                        self.send(group, messages::GAME_ABORTED).await;
                        return None;
                    }
                    self.send(group, messages::ONLY_CREATOR_ABORTS).await;
                }
                _ => {}
            }
        }

        None
    }
}

/// Runs `fut`, giving up after `limit` if one is set.
async fn bounded<F: Future>(limit: Option<Duration>, fut: F) -> Result<F::Output, Elapsed> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await,
        None => Ok(fut.await),
    }
}
