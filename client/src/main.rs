use clap::Parser;
use client::network::Client;
use log::info;
use shared::DEFAULT_PORT;
use tokio::io::BufReader;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
    server: String,

    /// Player name; asked for interactively when omitted
    #[arg(short = 'n', long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let mut client = Client::new(&args.server).await?;
    info!("Client bound to {}", client.local_addr()?);

    client
        .run(args.name, BufReader::new(tokio::io::stdin()))
        .await?;

    info!("Game over. Exiting.");

    // Stdin reads run on a blocking thread that may never return
    std::process::exit(0);
}
