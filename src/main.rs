use clap::{Parser, Subcommand};
use fortuna::config;
use fortuna::gui::app::AppModel;
use fortuna::gui::wheel::Wheel;
use fortuna::sys::loader::BackgroundLoader;
use fortuna::sys::runtime;
use fortuna::sys::server::{IpcCommand, SOCKET_PATH};
use relm4::prelude::*;
use std::io::Write;
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "fortuna", version, about = "Spin a wheel to pick something", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Spin the wheel of a running instance
    Spin,
    /// Make a running instance reload its configuration
    Reload,
    /// Write the default configuration file if none exists and print its path
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Spin) => send_command(IpcCommand::Spin),
        Some(Commands::Reload) => send_command(IpcCommand::Reload),
        Some(Commands::InitConfig) => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        None => run_gui(),
    }
}

fn run_gui() -> anyhow::Result<()> {
    let config = config::load_or_default();
    let wheel = Wheel::new(config.sectors(), config.spin);

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    let handle = runtime::start_background_services(tx.clone())?;
    let loader = BackgroundLoader::new(handle, tx);

    let app = RelmApp::new("org.fortuna.Wheel").with_args(Vec::new());

    app.run::<AppModel>((wheel, loader, rx));
    Ok(())
}

fn send_command(cmd: IpcCommand) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to fortuna at {}: {}. Is fortuna running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
