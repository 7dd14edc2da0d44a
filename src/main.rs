mod client;
mod config;
mod controller;
mod form;
mod logging;
mod protocol;
mod render;
mod ui;

use clap::Parser;
use client::StoryClient;
use config::{Cli, Command, GenerateArgs, OutputFormat};
use controller::StoryRequestController;
use logging::LogTarget;

type MainResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> MainResult<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = StoryClient::new(cli.client_config());

    match cli.command {
        None | Some(Command::Tui) => {
            let path = cli.log_file.unwrap_or_else(config::default_log_file);
            logging::init(LogTarget::File(path))?;
            ui::run_tui(client)
        }
        Some(Command::Generate(args)) => {
            logging::init(cli.log_file.map_or(LogTarget::Stderr, LogTarget::File))?;
            run_generate(&client, &args).await
        }
        Some(Command::Schema) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&protocol::response_schema())?
            );
            Ok(())
        }
    }
}

async fn run_generate(client: &StoryClient, args: &GenerateArgs) -> MainResult<()> {
    let mut controller = StoryRequestController::new();
    if let Err(err) = controller.handle_submit(client, &args.to_input()).await {
        tracing::debug!(error = %err, "generate finished with an error");
    }

    let state = controller.state();
    if let Some(message) = state.error() {
        match args.format {
            OutputFormat::Text => println!("{message}"),
            OutputFormat::Html => {
                print!("{}", render::page_html(&[render::error_html(message)]))
            }
        }
        std::process::exit(1);
    }

    match args.format {
        OutputFormat::Text => {
            let blocks: Vec<String> = state
                .cards()
                .map(|rendered| rendered.card.to_plain_text())
                .collect();
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Html => {
            let fragments: Vec<String> =
                state.cards().map(|rendered| rendered.card.to_html()).collect();
            print!("{}", render::page_html(&fragments));
        }
    }
    Ok(())
}
