//! Process-level wiring: dispatch loop, directory snapshots, shutdown.

use crate::config::BotConfig;
use crate::coordinator::{CoordinatorSettings, GameCoordinator};
use crate::directory::Directory;
use crate::dispatcher::Dispatcher;
use crate::session::SessionRegistry;
use crate::transport::{InboundMessage, TelegramTransport, Transport};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Capacity of the channel between the transport poller and the dispatcher.
const INBOUND_CAPACITY: usize = 64;

/// A wired bot: shared state, dispatcher and persistence settings.
#[derive(Clone)]
pub struct Bot {
    dispatcher: Dispatcher,
    directory: Arc<Directory>,
    chats_file: PathBuf,
    save_interval: Duration,
}

impl Bot {
    /// Wires a bot over `transport` with fresh shared state.
    #[instrument(skip(config, transport))]
    pub fn new(config: &BotConfig, transport: Arc<dyn Transport>) -> Self {
        let directory = Arc::new(Directory::new());
        let settings = CoordinatorSettings::new(config.move_timeout(), config.recruit_timeout());
        let coordinator = GameCoordinator::new(
            SessionRegistry::new(),
            Arc::clone(&directory),
            transport,
            settings,
        );
        info!(?settings, "Bot wired");
        Self {
            dispatcher: Dispatcher::new(coordinator),
            directory,
            chats_file: config.chats_file().clone(),
            save_interval: config.save_interval(),
        }
    }

    /// The dispatcher handling inbound messages.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The private chat directory.
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Loads the directory file on the blocking pool. Failures are logged and
    /// leave the directory as it was.
    #[instrument(skip(self), fields(path = %self.chats_file.display()))]
    pub async fn restore_directory(&self) {
        let directory = Arc::clone(&self.directory);
        let path = self.chats_file.clone();
        match tokio::task::spawn_blocking(move || directory.load_file(&path)).await {
            Ok(Ok(count)) => info!(count, "Loaded private chats"),
            Ok(Err(e)) => warn!(error = %e, "Could not load private chats"),
            Err(e) => warn!(error = %e, "Directory load task failed"),
        }
    }

    /// Writes the directory file on the blocking pool. Failures are logged.
    #[instrument(skip(self), fields(path = %self.chats_file.display()))]
    pub async fn save_directory(&self) {
        let directory = Arc::clone(&self.directory);
        let path = self.chats_file.clone();
        match tokio::task::spawn_blocking(move || directory.save_file(&path)).await {
            Ok(Ok(count)) => debug!(count, "Saved private chats"),
            Ok(Err(e)) => warn!(error = %e, "Could not save private chats"),
            Err(e) => warn!(error = %e, "Directory save task failed"),
        }
    }

    /// Saves the directory every interval until `stop` fires.
    #[instrument(skip_all)]
    pub fn spawn_snapshots(&self, stop: CancellationToken) -> JoinHandle<()> {
        let bot = self.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(bot.save_interval);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticks.tick().await;
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticks.tick() => {
                        info!("Saving private chats");
                        bot.save_directory().await;
                    }
                }
            }
        })
    }

    /// Dispatches `inbound` until `shutdown` fires or the channel closes,
    /// then writes a final snapshot.
    ///
    /// Running games are abandoned, not drained.
    #[instrument(skip_all)]
    pub async fn run(&self, mut inbound: mpsc::Receiver<InboundMessage>, shutdown: CancellationToken) {
        let snapshot_stop = shutdown.child_token();
        let snapshots = self.spawn_snapshots(snapshot_stop.clone());
        info!("Dispatch loop started");

        loop {
            let msg = tokio::select! {
                _ = shutdown.cancelled() => break,
                msg = inbound.recv() => msg,
            };
            let Some(msg) = msg else {
                info!("Inbound channel closed");
                break;
            };
            let _ = self.dispatcher.handle(msg).await;
        }

        info!("Dispatch loop stopped");
        snapshot_stop.cancel();
        if let Err(e) = snapshots.await {
            warn!(error = %e, "Snapshot task failed");
        }
        info!("Saving private chats");
        self.save_directory().await;
    }
}

/// Runs the bot against the Telegram Bot API until `shutdown` fires.
///
/// # Errors
///
/// Fails only if the token is missing or the API cannot be reached at startup.
#[instrument(skip_all)]
pub async fn run_telegram(config: BotConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    let token = config.require_token()?;
    let transport = Arc::new(
        TelegramTransport::connect(config.api_url(), token, config.poll_timeout()).await?,
    );

    let bot = Bot::new(&config, transport.clone());
    bot.restore_directory().await;

    let (tx, rx) = mpsc::channel(INBOUND_CAPACITY);
    let poller = transport.spawn_poller(tx, shutdown.clone());

    bot.run(rx, shutdown.clone()).await;

    shutdown.cancel();
    if let Err(e) = poller.await {
        warn!(error = %e, "Poller task failed");
    }
    info!("Bot stopped");
    Ok(())
}
