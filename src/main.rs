use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;

use tourism_chat::app::App;
use tourism_chat::{handler, logging, tui, ui};
use tourism_chat::{ApiClient, ChatController, Config, Role};

#[derive(Parser)]
#[command(name = "tourism-chat")]
#[command(about = "Chat with the tourism guide: weather and places to visit for any city")]
struct Cli {
    /// Base URL of the query service (overrides the config file)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Path to a config file instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Where to write the diagnostic log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the guide's answer
    Ask {
        /// Your question, e.g. "I'm going to Bangalore, what's the weather?"
        query: String,
        /// Print the escaped HTML markup instead of terminal text
        #[arg(long)]
        markup: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    }
    .with_overrides(cli.server, cli.log_file);

    let _log_guard = logging::init(&config.log_file()?)?;

    match cli.command {
        Some(Commands::Ask { query, markup }) => ask_once(&config, &query, markup).await,
        None => run_interactive(&config).await,
    }
}

async fn run_interactive(config: &Config) -> Result<()> {
    let mut app = App::new(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = event_loop(&mut terminal, &mut app).await;

    app.shutdown();
    tui::restore()?;
    result
}

async fn event_loop(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}

async fn ask_once(config: &Config, query: &str, markup: bool) -> Result<()> {
    let client = ApiClient::new(config.server_url(), config.request_timeout())?;
    let mut chat = ChatController::new();
    if let Some(input) = chat.input_mut() {
        input.set(query);
    }

    if !chat.submit(&client).await {
        bail!("Nothing to ask: the query is empty");
    }

    let Some(reply) = chat.log().last().filter(|entry| entry.role() == Role::Bot) else {
        bail!("No reply from {}", client.base_url());
    };

    if markup {
        println!("{}", reply.markup());
    } else {
        for line in reply.lines() {
            if line.emphasized {
                println!("{}", line.text.as_str().bold());
            } else {
                println!("{}", line.text);
            }
        }
    }

    Ok(())
}
