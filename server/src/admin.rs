//! Console commands for the server operator

use crate::controller::SessionHandle;
use crate::network::Outbox;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// True for a line asking to start the game.
pub fn is_start_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("start")
}

/// Reads operator commands until the game has started or input ends.
pub async fn listen<R>(handle: Arc<SessionHandle>, outbox: Outbox, input: R)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if handle.has_started().await {
                    info!("Game already running, console listener stopping");
                    break;
                }
                if !is_start_command(&line) {
                    warn!("Unknown console command: {}", line.trim());
                    continue;
                }
                if handle.manual_start(&outbox).await {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read console input: {}", e);
                break;
            }
        }
    }
}

/// Spawns [`listen`] on the process's standard input.
pub fn spawn_console_listener(handle: Arc<SessionHandle>, outbox: Outbox) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Type 'start' to begin the game before the lobby is full");
        listen(handle, outbox, BufReader::new(tokio::io::stdin())).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::letters::ScriptedLetters;
    use crate::network::Outgoing;
    use crate::session::{Phase, Session};
    use std::net::SocketAddr;

    fn handle() -> Arc<SessionHandle> {
        SessionHandle::new(Session::new(
            GameConfig::default(),
            Box::new(ScriptedLetters::new(["ABCDEFGHIJ"])),
        ))
    }

    fn outbox() -> Outbox {
        Outbox::new().0
    }

    async fn join(handle: &SessionHandle, port: u16) {
        let (outbox, _rx) = Outbox::new();
        let peer = SocketAddr::from(([127, 0, 0, 1], port)).into();
        handle.join(peer, "player", &outbox).await.unwrap();
    }

    #[test]
    fn test_start_command() {
        assert!(is_start_command("start"));
        assert!(is_start_command("  START \n"));
        assert!(is_start_command("Start"));
        assert!(!is_start_command("stop"));
        assert!(!is_start_command("start now"));
    }

    #[tokio::test]
    async fn test_start_on_command() {
        let handle = handle();
        join(&handle, 1).await;

        let (outbox, mut rx) = Outbox::new();
        listen(Arc::clone(&handle), outbox, &b"hello\nstart\n"[..]).await;

        assert_eq!(handle.read().await.phase(), Phase::RoundActive(1));
        match rx.try_recv() {
            Ok(Outgoing::Broadcast { text, .. }) => assert_eq!(text, "ROUND_START:1"),
            other => panic!("Expected the round announcement, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_refused_on_empty_lobby() {
        let handle = handle();

        listen(Arc::clone(&handle), outbox(), &b"start\n"[..]).await;

        assert_eq!(handle.read().await.phase(), Phase::Lobby);
    }

    #[tokio::test]
    async fn test_retry_after_refused_start() {
        let handle = handle();

        listen(Arc::clone(&handle), outbox(), &b"start\n"[..]).await;
        assert!(!handle.has_started().await);

        join(&handle, 1).await;
        listen(Arc::clone(&handle), outbox(), &b"start\n"[..]).await;

        assert!(handle.has_started().await);
    }
}
