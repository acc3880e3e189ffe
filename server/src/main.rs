use clap::Parser;
use log::{error, info};
use server::admin;
use server::config::GameConfig;
use server::dictionary::{WordList, WordValidator};
use server::letters::{LetterSource, RandomLetters};
use server::network::GameServer;
use server::session::Session;
use shared::{DEFAULT_PORT, LETTERS_PER_ROUND, MAX_PLAYERS, NUM_ROUNDS};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// UDP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Players needed to start automatically
    #[arg(short, long, default_value_t = MAX_PLAYERS)]
    max_players: usize,

    /// Number of rounds per game
    #[arg(short, long, default_value_t = NUM_ROUNDS)]
    rounds: u32,

    /// Letters dealt each round
    #[arg(short, long, default_value_t = LETTERS_PER_ROUND)]
    letters: usize,

    /// Word list, one word per line
    #[arg(short, long, default_value = "/usr/share/dict/words")]
    dictionary: PathBuf,

    /// Seed for reproducible letter draws
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON record of the game here when it ends
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = GameConfig {
        max_players: args.max_players,
        rounds: args.rounds,
        letters_per_round: args.letters,
    };
    config.validate()?;

    let words = WordList::load(&args.dictionary)?;
    info!(
        "Loaded {} words from {}",
        words.len(),
        args.dictionary.display()
    );

    let letters: Box<dyn LetterSource> = match args.seed {
        Some(seed) => Box::new(RandomLetters::seeded(seed)),
        None => Box::new(RandomLetters::new()),
    };

    info!(
        "Starting game: {} players, {} rounds, {} letters per round",
        config.max_players, config.rounds, config.letters_per_round
    );

    let address = format!("{}:{}", args.host, args.port);
    let server = GameServer::bind(
        &address,
        Session::new(config, letters),
        WordValidator::new(Arc::new(words)),
    )
    .await?;

    admin::spawn_console_listener(server.handle(), server.outbox());

    // The console listener may still be blocked on stdin: exit explicitly from here on
    let summary = match server.run().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Game aborted: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = args.summary {
        match File::create(&path) {
            Ok(file) => {
                if let Err(e) = serde_json::to_writer_pretty(file, &summary) {
                    error!("Failed to write game summary: {}", e);
                } else {
                    info!("Game summary written to {}", path.display());
                }
            }
            Err(e) => error!("Failed to create {}: {}", path.display(), e),
        }
    }

    info!("Game finished. Shutting down.");
    std::process::exit(0);
}
