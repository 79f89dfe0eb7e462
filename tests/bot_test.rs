//! Tests for bot wiring: directory persistence around the dispatch loop.

use std::sync::Arc;
use std::time::Duration;

use strictly_rps::{
    Bot, BotConfig, BotIdentity, ChatKind, ConfigOverrides, Directory, InboundMessage,
    MemoryTransport, Participant,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn bot_with_file(path: &std::path::Path) -> Bot {
    let overrides = ConfigOverrides {
        token: Some("test-token".to_string()),
        chats_file: Some(path.to_path_buf()),
        ..Default::default()
    };
    let config = BotConfig::default()
        .apply(overrides)
        .expect("Config rejected");
    let (transport, _log) = MemoryTransport::new(BotIdentity::new(1, "rps_bot".to_string()));
    Bot::new(&config, Arc::new(transport))
}

fn private_hello(user: i64) -> InboundMessage {
    InboundMessage::new(
        1,
        Participant::new(user, format!("user{user}")),
        user,
        ChatKind::Private,
        Some("hello".to_string()),
    )
}

#[tokio::test]
async fn test_save_and_restore_from_async_context() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("chats.json");

    let bot = bot_with_file(&path);
    bot.directory().put(5, 50);
    bot.directory().put(6, 60);
    bot.save_directory().await;

    let reloaded = Directory::new();
    assert_eq!(reloaded.load_file(&path).expect("Load failed"), 2);
    assert_eq!(reloaded.get(6), Some(60));

    let restored = bot_with_file(&path);
    restored.restore_directory().await;
    assert_eq!(restored.directory().get(5), Some(50));
}

#[tokio::test]
async fn test_restore_with_missing_file_leaves_directory_empty() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let bot = bot_with_file(&dir.path().join("absent.json"));
    bot.restore_directory().await;
    assert!(bot.directory().is_empty());
}

#[tokio::test]
async fn test_run_saves_on_shutdown() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("chats.json");
    let bot = bot_with_file(&path);

    let (tx, rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    let running = {
        let bot = bot.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { bot.run(rx, shutdown).await })
    };

    tx.send(private_hello(9)).await.expect("Send failed");
    drop(tx);
    tokio::time::timeout(Duration::from_secs(2), running)
        .await
        .expect("Bot did not stop")
        .expect("Bot task panicked");

    let reloaded = Directory::new();
    reloaded.load_file(&path).expect("Load failed");
    assert_eq!(reloaded.get(9), Some(9));
    assert!(!shutdown.is_cancelled());
}
