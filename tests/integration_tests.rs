//! Integration tests for the word round server and client
//!
//! These tests play games over real UDP sockets on the loopback interface.

use client::network::Client;
use server::config::GameConfig;
use server::controller::SessionHandle;
use server::dictionary::{WordList, WordValidator};
use server::letters::ScriptedLetters;
use server::network::{GameServer, Outbox};
use server::session::{GameResult, GameSummary, Session};
use shared::{ClientMessage, RejectReason, ServerMessage, Standing};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const WORDS: &[&str] = &["cat", "act", "dog", "god", "goat", "bird", "snake", "bid"];
const WAIT: Duration = Duration::from_secs(5);

struct TestServer {
    addr: String,
    handle: Arc<SessionHandle>,
    outbox: Outbox,
    game: JoinHandle<GameSummary>,
}

async fn start_server(max_players: usize, rounds: u32, pools: &[&str]) -> TestServer {
    let config = GameConfig {
        max_players,
        rounds,
        letters_per_round: 10,
    };
    start_server_with(config, pools).await
}

async fn start_server_with(config: GameConfig, pools: &[&str]) -> TestServer {
    let session = Session::new(config, Box::new(ScriptedLetters::new(pools.to_vec())));
    let validator = WordValidator::new(Arc::new(WordList::from_words(WORDS.iter().copied())));

    let server = GameServer::bind("127.0.0.1:0", session, validator)
        .await
        .expect("Failed to bind server");
    let addr = server.local_addr().unwrap().to_string();
    let handle = server.handle();
    let outbox = server.outbox();

    let game = tokio::spawn(async move { server.run().await.expect("Game failed") });
    TestServer {
        addr,
        handle,
        outbox,
        game,
    }
}

async fn player(addr: &str) -> Client {
    Client::new(addr).await.expect("Failed to create client")
}

async fn recv(client: &Client) -> ServerMessage {
    timeout(WAIT, client.next_message())
        .await
        .expect("Timed out waiting for the server")
        .expect("Socket error")
}

async fn join(client: &mut Client, name: &str) -> ServerMessage {
    client
        .send(&ClientMessage::Join {
            name: name.to_string(),
        })
        .await
        .unwrap();
    let reply = recv(client).await;
    client.handle_message(&reply);
    reply
}

async fn word(client: &Client, word: &str) {
    client
        .send(&ClientMessage::Word {
            word: word.to_string(),
        })
        .await
        .unwrap();
}

async fn expect_round_start(client: &Client, round: u32, letters: &str) {
    assert_eq!(recv(client).await, ServerMessage::RoundStart { round });
    assert_eq!(
        recv(client).await,
        ServerMessage::RoundLetters {
            letters: letters.to_string()
        }
    );
}

/// GAME FLOW TESTS
mod game_flow_tests {
    use super::*;

    /// Two players, two rounds, one clear winner
    #[tokio::test]
    async fn full_game_with_winner() {
        let TestServer { addr, game, .. } =
            start_server(2, 2, &["CATDOGXYZQ", "BIRDSNAKEQ"]).await;

        let mut alice = player(&addr).await;
        let mut bob = player(&addr).await;

        assert_eq!(
            join(&mut alice, "alice").await,
            ServerMessage::JoinOk {
                name: "alice".to_string()
            }
        );
        assert_eq!(
            join(&mut bob, "bob").await,
            ServerMessage::JoinOk {
                name: "bob".to_string()
            }
        );
        assert!(alice.is_joined() && bob.is_joined());

        for client in [&alice, &bob] {
            expect_round_start(client, 1, "CATDOGXYZQ").await;
        }

        word(&alice, "cat").await;
        assert_eq!(recv(&alice).await, ServerMessage::Received { round: 1 });
        // Formable but unknown to the dictionary
        word(&bob, "gox").await;
        assert_eq!(recv(&bob).await, ServerMessage::Received { round: 1 });

        let round_one = ServerMessage::RoundOver {
            round: 1,
            scores: vec![Standing::new("alice", 3), Standing::new("bob", 0)],
        };
        for client in [&alice, &bob] {
            assert_eq!(recv(client).await, round_one);
            expect_round_start(client, 2, "BIRDSNAKEQ").await;
        }

        word(&alice, "bird").await;
        assert_eq!(recv(&alice).await, ServerMessage::Received { round: 2 });
        word(&bob, "SNAKE").await;
        assert_eq!(recv(&bob).await, ServerMessage::Received { round: 2 });

        let round_two = ServerMessage::RoundOver {
            round: 2,
            scores: vec![Standing::new("alice", 7), Standing::new("bob", 5)],
        };
        let winner = ServerMessage::Winner {
            name: "alice".to_string(),
            score: 7,
        };
        for client in [&mut alice, &mut bob] {
            assert_eq!(recv(client).await, round_two);
            let last = recv(client).await;
            assert_eq!(last, winner);
            assert!(client.handle_message(&last));
        }

        let summary = timeout(WAIT, game).await.unwrap().unwrap();
        assert_eq!(summary.rounds.len(), 2);
        assert_eq!(summary.rounds[0].submissions[1].word, "gox");
        assert_eq!(summary.rounds[0].submissions[1].points, Some(0));
        assert_eq!(
            summary.result,
            GameResult::Winner {
                name: "alice".to_string(),
                score: 7
            }
        );
    }

    /// Four players over the default five rounds, the shipped game shape
    #[tokio::test]
    async fn default_game_runs_all_rounds() {
        let config = GameConfig::default();
        assert_eq!((config.max_players, config.rounds), (4, 5));
        let TestServer { addr, game, .. } = start_server_with(config, &["CATDOGXYZQ"]).await;

        let names = ["ann", "ben", "cid", "dee"];
        // ben outscores the rest every round; "zz" needs a second Z
        let words = ["cat", "goat", "dog", "zz"];

        let mut clients = Vec::new();
        for name in names {
            let mut client = player(&addr).await;
            join(&mut client, name).await;
            clients.push(client);
        }

        for round in 1..=5u32 {
            for client in &clients {
                expect_round_start(client, round, "CATDOGXYZQ").await;
            }
            for (client, w) in clients.iter().zip(words) {
                word(client, w).await;
                assert_eq!(recv(client).await, ServerMessage::Received { round });
            }

            let scores = vec![
                Standing::new("ann", 3 * round),
                Standing::new("ben", 4 * round),
                Standing::new("cid", 3 * round),
                Standing::new("dee", 0),
            ];
            for client in &clients {
                assert_eq!(
                    recv(client).await,
                    ServerMessage::RoundOver {
                        round,
                        scores: scores.clone()
                    }
                );
            }
        }

        for client in &clients {
            assert_eq!(
                recv(client).await,
                ServerMessage::Winner {
                    name: "ben".to_string(),
                    score: 20
                }
            );
        }

        let summary = timeout(WAIT, game).await.unwrap().unwrap();
        assert_eq!(summary.rounds.len(), 5);
        assert!(summary
            .rounds
            .iter()
            .all(|r| r.letters.len() == 10 && r.submissions.len() == 4));
    }

    /// Equal top scores end in a tie listing every leader in join order
    #[tokio::test]
    async fn tied_game() {
        let TestServer { addr, game, .. } = start_server(2, 1, &["CATDOGXYZQ"]).await;

        let mut alice = player(&addr).await;
        let mut bob = player(&addr).await;
        join(&mut alice, "alice").await;
        join(&mut bob, "bob").await;

        for client in [&alice, &bob] {
            expect_round_start(client, 1, "CATDOGXYZQ").await;
        }

        word(&bob, "dog").await;
        recv(&bob).await;
        word(&alice, "act").await;
        recv(&alice).await;

        let tie = ServerMessage::Tie {
            names: vec!["alice".to_string(), "bob".to_string()],
            score: 3,
        };
        for client in [&alice, &bob] {
            assert!(matches!(recv(client).await, ServerMessage::RoundOver { .. }));
            assert_eq!(recv(client).await, tie);
        }

        let summary = timeout(WAIT, game).await.unwrap().unwrap();
        assert_eq!(
            summary.standings,
            vec![Standing::new("alice", 3), Standing::new("bob", 3)]
        );
    }

    /// The operator can start a game before the lobby fills
    #[tokio::test]
    async fn manual_start_with_partial_lobby() {
        let TestServer {
            addr,
            handle,
            outbox,
            game,
        } = start_server(4, 1, &["CATDOGXYZQ"]).await;

        let mut alice = player(&addr).await;
        join(&mut alice, "alice").await;
        assert!(!handle.has_started().await);

        assert!(handle.manual_start(&outbox).await);
        expect_round_start(&alice, 1, "CATDOGXYZQ").await;

        // Late joiners are turned away
        let mut late = player(&addr).await;
        assert_eq!(
            join(&mut late, "late").await,
            ServerMessage::JoinReject {
                reason: RejectReason::GameAlreadyStarted
            }
        );
        assert!(!late.is_joined());

        word(&alice, "cat").await;
        assert_eq!(recv(&alice).await, ServerMessage::Received { round: 1 });
        assert!(matches!(recv(&alice).await, ServerMessage::RoundOver { .. }));
        assert_eq!(
            recv(&alice).await,
            ServerMessage::Winner {
                name: "alice".to_string(),
                score: 3
            }
        );

        timeout(WAIT, game).await.unwrap().unwrap();
    }
}

/// DUPLICATE AND OUT-OF-ORDER MESSAGE TESTS
mod protocol_tests {
    use super::*;

    #[tokio::test]
    async fn second_join_from_same_peer_is_rejected() {
        let TestServer { addr, game, .. } = start_server(3, 1, &["CATDOGXYZQ"]).await;

        let mut alice = player(&addr).await;
        join(&mut alice, "alice").await;
        assert_eq!(
            join(&mut alice, "alice2").await,
            ServerMessage::JoinReject {
                reason: RejectReason::DuplicatePlayer
            }
        );

        game.abort();
    }

    /// Only the first word of a round counts and only it is acknowledged
    #[tokio::test]
    async fn duplicate_word_is_ignored() {
        let TestServer { addr, game, .. } = start_server(2, 1, &["CATDOGXYZQ"]).await;

        let mut alice = player(&addr).await;
        let mut bob = player(&addr).await;
        join(&mut alice, "alice").await;
        join(&mut bob, "bob").await;
        for client in [&alice, &bob] {
            expect_round_start(client, 1, "CATDOGXYZQ").await;
        }

        word(&alice, "cat").await;
        word(&alice, "dog").await;
        assert_eq!(recv(&alice).await, ServerMessage::Received { round: 1 });

        word(&bob, "god").await;
        recv(&bob).await;

        // The next message after the single ack is the scoreboard
        assert_eq!(
            recv(&alice).await,
            ServerMessage::RoundOver {
                round: 1,
                scores: vec![Standing::new("alice", 3), Standing::new("bob", 3)],
            }
        );

        let summary = timeout(WAIT, game).await.unwrap().unwrap();
        assert_eq!(summary.rounds[0].submissions[0].word, "cat");
    }

    /// Malformed datagrams and words sent from the lobby are dropped silently
    #[tokio::test]
    async fn junk_is_dropped() {
        let TestServer {
            addr,
            handle,
            game,
            ..
        } = start_server(2, 1, &["CATDOGXYZQ"]).await;

        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.send_to(b"HELLO:there", &addr).await.unwrap();
        socket.send_to(b"WORD:cat", &addr).await.unwrap();
        socket.send_to(&[0xff, 0xfe, 0x00], &addr).await.unwrap();
        socket.send_to(b"JOIN:", &addr).await.unwrap();

        // A real join afterwards is the first thing answered
        socket.send_to(b"JOIN:alice", &addr).await.unwrap();
        let mut buf = [0u8; 1024];
        let (len, _) = timeout(WAIT, socket.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..len], b"JOIN_OK:Welcome alice");

        let session = handle.read().await;
        assert_eq!(session.registry().len(), 1);
        assert!(!session.has_started());
        drop(session);

        game.abort();
    }
}

/// CONCURRENCY TESTS
mod concurrency_tests {
    use super::*;

    /// Many simultaneous joins never overfill the lobby
    #[tokio::test]
    async fn concurrent_joins_fill_exactly() {
        let TestServer {
            addr,
            handle,
            game,
            ..
        } = start_server(3, 1, &["CATDOGXYZQ"]).await;

        let mut tasks = Vec::new();
        for i in 0..8 {
            let addr = addr.clone();
            tasks.push(tokio::spawn(async move {
                let mut client = player(&addr).await;
                join(&mut client, &format!("player{}", i)).await
            }));
        }

        let mut accepted = 0;
        let mut rejected = 0;
        for task in tasks {
            match task.await.unwrap() {
                ServerMessage::JoinOk { .. } => accepted += 1,
                ServerMessage::JoinReject { reason } => {
                    assert!(matches!(
                        reason,
                        RejectReason::LobbyFull | RejectReason::GameAlreadyStarted
                    ));
                    rejected += 1;
                }
                other => panic!("Unexpected reply: {:?}", other),
            }
        }

        assert_eq!(accepted, 3);
        assert_eq!(rejected, 5);
        assert!(handle.has_started().await);
        assert_eq!(handle.read().await.registry().len(), 3);

        game.abort();
    }

    /// Words arriving at the same moment all land in the round
    #[tokio::test]
    async fn concurrent_submissions_close_the_round_once() {
        let TestServer { addr, game, .. } = start_server(4, 1, &["CATDOGXYZQ"]).await;

        let mut clients = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let mut client = player(&addr).await;
            join(&mut client, name).await;
            clients.push(client);
        }
        for client in &clients {
            expect_round_start(client, 1, "CATDOGXYZQ").await;
        }

        let words = ["cat", "dog", "act", "zzz"];
        let mut tasks = Vec::new();
        for (client, w) in clients.into_iter().zip(words) {
            tasks.push(tokio::spawn(async move {
                word(&client, w).await;
                let ack = recv(&client).await;
                let scores = recv(&client).await;
                let result = recv(&client).await;
                (ack, scores, result)
            }));
        }

        for task in tasks {
            let (ack, scores, result) = task.await.unwrap();
            assert_eq!(ack, ServerMessage::Received { round: 1 });
            assert_eq!(
                scores,
                ServerMessage::RoundOver {
                    round: 1,
                    scores: vec![
                        Standing::new("a", 3),
                        Standing::new("b", 3),
                        Standing::new("c", 3),
                        Standing::new("d", 0),
                    ],
                }
            );
            assert_eq!(
                result,
                ServerMessage::Tie {
                    names: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                    score: 3
                }
            );
        }

        let summary = timeout(WAIT, game).await.unwrap().unwrap();
        assert_eq!(summary.rounds[0].submissions.len(), 4);
    }
}
