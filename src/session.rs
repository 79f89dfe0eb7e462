//! Session registry: who is waiting for a move, and which groups are recruiting.
//!
//! The registry is the only place that decides whether a participant is
//! "already in a game". A participant holds at most one [`AwaitSlot`] at a
//! time and a group has at most one open [`GroupInbox`]. Both handles release
//! their registry entry when dropped, so an abandoned or timed-out session
//! never leaves a stale claim behind.

use crate::games::rps::Choice;
use crate::transport::{ChatId, InboundMessage, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// Buffered group messages per recruiting session; excess messages are dropped.
const GROUP_INBOX_CAPACITY: usize = 32;

/// Result of [`SessionRegistry::deliver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The choice was handed to the waiting session and the slot removed.
    Delivered,
    /// The participant has no open slot.
    NoSuchSlot,
}

/// Result of [`SessionRegistry::forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forward {
    /// The message was queued for the recruiting session.
    Delivered,
    /// The group has no recruiting session.
    NoSuchGroup,
}

/// The participant already has an open move slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyClaimed;

/// The group already has a recruiting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyOpen;

/// Why a two-player claim was refused. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairConflict {
    /// The game creator holds an open move slot elsewhere.
    CreatorBusy,
    /// The joining participant holds an open move slot elsewhere.
    PartnerBusy,
    /// The joining participant cannot be reached privately.
    PartnerUnreachable,
}

/// The session owning an [`AwaitSlot`] went away before a choice arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClosed;

#[derive(Debug)]
struct PendingMove {
    ticket: u64,
    tx: oneshot::Sender<Choice>,
}

#[derive(Debug)]
struct OpenGroup {
    ticket: u64,
    tx: mpsc::Sender<InboundMessage>,
}

type MoveMap = RwLock<HashMap<UserId, PendingMove>>;
type GroupMap = RwLock<HashMap<ChatId, OpenGroup>>;

/// Process-wide registry of pending moves and recruiting groups.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    moves: Arc<MoveMap>,
    groups: Arc<GroupMap>,
    tickets: Arc<AtomicU64>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session registry");
        Self::default()
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::Relaxed)
    }

    /// Claims a move slot for `participant`.
    ///
    /// Fails if the participant already has one. The check and the insert
    /// happen under one write lock.
    #[instrument(skip(self))]
    pub fn try_claim(&self, participant: UserId) -> Result<AwaitSlot, AlreadyClaimed> {
        let mut moves = self.moves.write().unwrap_or_else(PoisonError::into_inner);
        if moves.contains_key(&participant) {
            debug!(participant, "Participant already holds a move slot");
            return Err(AlreadyClaimed);
        }
        let slot = self.insert_slot(&mut moves, participant);
        info!(participant, ticket = slot.ticket, "Move slot claimed");
        Ok(slot)
    }

    /// Claims move slots for both players of a group game in one critical
    /// section.
    ///
    /// `partner_reachable` is evaluated while the lock is held, after both
    /// busy checks; nothing is claimed unless every check passes.
    #[instrument(skip(self, partner_reachable))]
    pub fn try_claim_pair(
        &self,
        creator: UserId,
        partner: UserId,
        partner_reachable: impl FnOnce() -> bool,
    ) -> Result<(AwaitSlot, AwaitSlot), PairConflict> {
        let mut moves = self.moves.write().unwrap_or_else(PoisonError::into_inner);
        if moves.contains_key(&creator) {
            return Err(PairConflict::CreatorBusy);
        }
        if creator == partner || moves.contains_key(&partner) {
            return Err(PairConflict::PartnerBusy);
        }
        if !partner_reachable() {
            return Err(PairConflict::PartnerUnreachable);
        }
        let creator_slot = self.insert_slot(&mut moves, creator);
        let partner_slot = self.insert_slot(&mut moves, partner);
        info!(creator, partner, "Move slots claimed for both players");
        Ok((creator_slot, partner_slot))
    }

    fn insert_slot(
        &self,
        moves: &mut HashMap<UserId, PendingMove>,
        participant: UserId,
    ) -> AwaitSlot {
        let ticket = self.next_ticket();
        let (tx, rx) = oneshot::channel();
        moves.insert(participant, PendingMove { ticket, tx });
        AwaitSlot {
            participant,
            ticket,
            rx: Some(rx),
            moves: Arc::downgrade(&self.moves),
        }
    }

    /// Returns `true` if `participant` currently holds a move slot.
    #[instrument(skip(self))]
    pub fn has_slot(&self, participant: UserId) -> bool {
        self.moves
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&participant)
    }

    /// Hands `choice` to the session waiting on `participant`'s slot and
    /// removes the slot. Exactly one delivery per claim succeeds.
    #[instrument(skip(self))]
    pub fn deliver(&self, participant: UserId, choice: Choice) -> Delivery {
        let pending = self
            .moves
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&participant);

        match pending {
            Some(pending) => match pending.tx.send(choice) {
                Ok(()) => {
                    info!(participant, %choice, "Move delivered");
                    Delivery::Delivered
                }
                Err(_) => {
                    warn!(participant, "Move slot had no listener");
                    Delivery::NoSuchSlot
                }
            },
            None => Delivery::NoSuchSlot,
        }
    }

    /// Removes `participant`'s slot without delivering. The waiting session
    /// observes [`SlotClosed`].
    #[instrument(skip(self))]
    pub fn release(&self, participant: UserId) {
        let removed = self
            .moves
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&participant);
        if removed.is_some() {
            info!(participant, "Move slot released");
        }
    }

    /// Opens a recruiting session for `group`.
    #[instrument(skip(self))]
    pub fn open_group(&self, group: ChatId) -> Result<GroupInbox, AlreadyOpen> {
        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        if groups.contains_key(&group) {
            debug!(group, "Group already has an open game");
            return Err(AlreadyOpen);
        }
        let ticket = self.next_ticket();
        let (tx, rx) = mpsc::channel(GROUP_INBOX_CAPACITY);
        groups.insert(group, OpenGroup { ticket, tx });
        info!(group, ticket, "Group opened");
        Ok(GroupInbox {
            group,
            ticket,
            rx,
            groups: Arc::downgrade(&self.groups),
            closed: false,
        })
    }

    /// Returns `true` if `group` has a recruiting session.
    #[instrument(skip(self))]
    pub fn is_group_open(&self, group: ChatId) -> bool {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&group)
    }

    /// Closes `group`'s recruiting session, whoever owns it.
    #[instrument(skip(self))]
    pub fn close_group(&self, group: ChatId) {
        let removed = self
            .groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&group);
        if removed.is_some() {
            info!(group, "Group closed");
        }
    }

    /// Queues `message` for `group`'s recruiting session without blocking.
    ///
    /// A full inbox drops the message.
    #[instrument(skip(self, message), fields(message_id = message.message_id()))]
    pub fn forward(&self, group: ChatId, message: InboundMessage) -> Forward {
        let groups = self.groups.read().unwrap_or_else(PoisonError::into_inner);
        let Some(open) = groups.get(&group) else {
            return Forward::NoSuchGroup;
        };
        match open.tx.try_send(message) {
            Ok(()) => Forward::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(group, "Group inbox full, dropping message");
                Forward::Delivered
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Forward::NoSuchGroup,
        }
    }
}

/// A claimed move slot. Await it with [`AwaitSlot::recv`].
///
/// Dropping the slot releases the registry entry if it still belongs to
/// this claim.
#[derive(Debug)]
pub struct AwaitSlot {
    participant: UserId,
    ticket: u64,
    rx: Option<oneshot::Receiver<Choice>>,
    moves: Weak<MoveMap>,
}

impl AwaitSlot {
    /// The participant this slot belongs to.
    pub fn participant(&self) -> UserId {
        self.participant
    }

    /// Waits for the participant's choice.
    ///
    /// Cancel-safe only in the sense that dropping the future drops the slot
    /// and releases the claim.
    pub async fn recv(mut self) -> Result<Choice, SlotClosed> {
        match self.rx.take() {
            Some(rx) => rx.await.map_err(|_| SlotClosed),
            None => Err(SlotClosed),
        }
    }
}

impl Drop for AwaitSlot {
    fn drop(&mut self) {
        let Some(moves) = self.moves.upgrade() else {
            return;
        };
        let mut moves = moves.write().unwrap_or_else(PoisonError::into_inner);
        if moves
            .get(&self.participant)
            .is_some_and(|pending| pending.ticket == self.ticket)
        {
            moves.remove(&self.participant);
            debug!(participant = self.participant, "Abandoned move slot released");
        }
    }
}

/// Receiving end of a group's recruiting session.
///
/// Dropping the inbox closes the group if it is still registered under this
/// session.
#[derive(Debug)]
pub struct GroupInbox {
    group: ChatId,
    ticket: u64,
    rx: mpsc::Receiver<InboundMessage>,
    groups: Weak<GroupMap>,
    closed: bool,
}

impl GroupInbox {
    /// The group this inbox belongs to.
    pub fn group(&self) -> ChatId {
        self.group
    }

    /// Waits for the next message forwarded to this group.
    pub async fn next(&mut self) -> Option<InboundMessage> {
        if self.closed {
            return None;
        }
        self.rx.recv().await
    }

    /// Removes the group from the registry so a new game can be opened there.
    ///
    /// Idempotent; later calls to [`GroupInbox::next`] return `None`.
    #[instrument(skip(self), fields(group = self.group))]
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.rx.close();
        let Some(groups) = self.groups.upgrade() else {
            return;
        };
        let mut groups = groups.write().unwrap_or_else(PoisonError::into_inner);
        if groups
            .get(&self.group)
            .is_some_and(|open| open.ticket == self.ticket)
        {
            groups.remove(&self.group);
            info!(group = self.group, "Group closed");
        }
    }
}

impl Drop for GroupInbox {
    fn drop(&mut self) {
        self.close();
    }
}
