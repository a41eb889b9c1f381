mod input;
mod network;
mod poller;

use clap::Parser;
use input::{parse_line, Command};
use log::{error, info, warn};
use network::GameClient;
use poller::{spawn_poller, PollerConfig};
use rand::seq::SliceRandom;
use shared::{Direction, GameSnapshot};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::time::sleep;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Player id to register with
    player_id: String,

    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:1234")]
    server: String,

    /// Snapshot polling interval in milliseconds
    #[arg(long, default_value = "100")]
    poll_ms: u64,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,

    /// Take this many random steps instead of reading commands from stdin
    #[arg(long)]
    bot: Option<u32>,

    /// Pause between bot steps in milliseconds
    #[arg(long, default_value = "200")]
    bot_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to: {}", args.server);
    let mut client = GameClient::connect(&args.server, &args.player_id)
        .await?
        .with_fake_ping(args.fake_ping);

    if !client.register().await? {
        error!(
            "Could not register {}: id already in use or no free cell",
            args.player_id
        );
        return Err("registration refused".into());
    }
    info!("Registered as {}", args.player_id);

    let (snapshots, _poller) = spawn_poller(
        args.server.clone(),
        args.player_id.clone(),
        PollerConfig {
            interval: Duration::from_millis(args.poll_ms),
            ..PollerConfig::default()
        },
    );

    let result = match args.bot {
        Some(steps) => run_bot(&mut client, steps, Duration::from_millis(args.bot_delay_ms)).await,
        None => run_interactive(&mut client, &snapshots).await,
    };

    if let Err(e) = client.disconnect().await {
        warn!("Error disconnecting: {}", e);
    }
    print_status(client.player_id(), snapshots.borrow().as_ref());

    result
}

async fn run_bot(
    client: &mut GameClient,
    steps: u32,
    delay: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut accepted = 0;
    for _ in 0..steps {
        let direction = *Direction::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&Direction::Up);
        if client.step(direction).await? {
            accepted += 1;
        }
        sleep(delay).await;
    }
    info!("Bot finished: {} of {} steps accepted", accepted, steps);
    Ok(())
}

async fn run_interactive(
    client: &mut GameClient,
    snapshots: &watch::Receiver<Option<GameSnapshot>>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Commands: w/a/s/d to move, p for status, q to quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        for command in parse_line(&line) {
            match command {
                Command::Move(direction) => {
                    if !client.step(direction).await? {
                        println!("Blocked");
                    }
                }
                Command::Status => print_status(client.player_id(), snapshots.borrow().as_ref()),
                Command::Quit => return Ok(()),
            }
        }
    }
    Ok(())
}

fn print_status(player_id: &str, snapshot: Option<&GameSnapshot>) {
    let Some(snapshot) = snapshot else {
        println!("No snapshot received yet");
        return;
    };

    match snapshot.player(player_id) {
        Some(me) => println!(
            "{} at ({}, {}), sequence {}, {} players online",
            player_id,
            me.x,
            me.y,
            me.sequence,
            snapshot.players.len()
        ),
        None => println!(
            "{} not in the world, {} players online",
            player_id,
            snapshot.players.len()
        ),
    }
}
