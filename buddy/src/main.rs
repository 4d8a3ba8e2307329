use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use buddy::api::{ApiClient, PaperApi};
use buddy::app::{run_search, Flow, ReaderApp};
use buddy::config::Config;
use buddy::routes::Route;

#[derive(Parser)]
#[command(name = "buddy")]
#[command(about = "Search research papers and read them chunk by chunk")]
struct Args {
    /// Backend base URL (overrides BUDDY_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Display width in pixels used to scale page regions
    #[arg(long, global = true)]
    width: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for papers with a free-text query
    Search {
        #[arg(required = true)]
        query: Vec<String>,

        /// Number of results to request
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Open a paper in the interactive reader
    Read {
        /// Paper id, or a /paper/<id> path
        paper: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    buddy::telemetry::init();

    let mut config = Config::from_env();
    if let Some(api_url) = args.api_url {
        config.api.base_url = api_url;
    }
    if let Some(width) = args.width {
        config.viewer.display_width = width;
    }

    let api: Arc<dyn PaperApi> = Arc::new(ApiClient::new(&config.api)?);
    tracing::debug!(base_url = %config.api.base_url, "API client ready");

    match args.command {
        Command::Search { query, limit } => {
            let limit = limit.unwrap_or(config.api.search_limit);
            for line in run_search(api.as_ref(), &query.join(" "), limit).await {
                println!("{line}");
            }
            Ok(())
        }
        Command::Read { paper } => {
            let paper = match Route::parse(&paper) {
                Route::Paper(id) => id,
                _ => paper,
            };
            run_reader(api, &config, &paper).await
        }
    }
}

async fn run_reader(api: Arc<dyn PaperApi>, config: &Config, paper: &str) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = ReaderApp::new(api, &config.viewer, tx)?;

    print_lines(&app.open(paper)?);
    println!("Type 'help' for commands.");
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match app.handle_line(&line) {
                    Flow::Continue(output) => print_lines(&output),
                    Flow::Quit => break,
                }
                prompt();
            }
            Some(event) = rx.recv() => {
                let output = app.handle_event(event);
                if !output.is_empty() {
                    println!();
                    print_lines(&output);
                    prompt();
                }
            }
        }
    }

    tracing::info!("Reader closed");
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
