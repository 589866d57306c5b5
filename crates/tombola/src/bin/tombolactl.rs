use clap::{Parser, Subcommand};
use std::io::Write;
use std::os::unix::net::UnixStream;

const SOCKET_PATH: &str = "/tmp/tombola.sock";

#[derive(Parser, Debug)]
#[command(name = "tombolactl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Spin the wheel
    Spin {
        /// Land on this segment index instead of a random one
        #[arg(short, long)]
        winner: Option<usize>,
    },
    /// Reload configuration and entries
    Reload,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Spin {
            winner: Some(index),
        } => send_command(&format!("spin {}", index)),
        Commands::Spin { winner: None } => send_command("spin"),
        Commands::Reload => send_command("reload"),
    }
}

fn send_command(cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to tombola daemon at {}: {}. Is tombola running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
