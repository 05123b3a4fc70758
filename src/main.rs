mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use cli::{BrowseCommand, Cli, Commands, QueryArgs, BROWSE_HELP};
use stargaze::config::Config;
use stargaze::render::{PageReport, TextPage};
use stargaze::search::SearchState;
use stargaze::view::{ResultsView, ViewAction};
use stargaze::Stargaze;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stargaze=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Search { query, page, expand, json } => {
            let app = Stargaze::new(config)?;
            let snapshot = app.search(query.params(), query.refresh).await;
            let mut view = app.view().reduce(ViewAction::Sync(snapshot)).reduce(ViewAction::GoToPage(page));
            if expand {
                view = expand_visible(view);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&PageReport::new(&view))?);
            } else {
                print!("{}", TextPage { view: &view });
            }
            if let SearchState::Error(e) = view.state() {
                if !e.is_no_results() {
                    std::process::exit(1);
                }
            }
        }
        Commands::Browse { query } => {
            let app = Stargaze::new(config)?;
            browse(&app, query).await?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config).context("serializing config")?);
        }
    }
    Ok(())
}

/// Open every collapsed description on the current page.
fn expand_visible(view: ResultsView) -> ResultsView {
    let collapsed: Vec<usize> = view
        .visible()
        .page_items
        .iter()
        .filter(|i| i.description.as_ref().is_some_and(|d| d.truncated && !d.expanded))
        .map(|i| i.number)
        .collect();
    collapsed.into_iter().fold(view, |v, n| v.reduce(ViewAction::ToggleDescription(n)))
}

async fn browse(app: &Stargaze, query: QueryArgs) -> Result<()> {
    let mut params = query.params();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(format!("{}\n", stargaze::error::LOADING_MESSAGE).as_bytes()).await?;
    let mut view = app.view().reduce(ViewAction::Sync(app.search(params.clone(), query.refresh).await));

    loop {
        stdout.write_all(format!("{}\n{}\n> ", TextPage { view: &view }, BROWSE_HELP).as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else { break };
        let action = match line.parse::<BrowseCommand>() {
            Ok(BrowseCommand::Quit) => break,
            Ok(BrowseCommand::Help) => continue,
            Ok(BrowseCommand::Next) => ViewAction::NextPage,
            Ok(BrowseCommand::Prev) => ViewAction::PrevPage,
            Ok(BrowseCommand::Goto(n)) => ViewAction::GoToPage(n),
            Ok(BrowseCommand::Play(n)) => ViewAction::RevealVideo(n),
            Ok(BrowseCommand::Describe(n)) => ViewAction::ToggleDescription(n),
            Ok(BrowseCommand::Search(keywords)) => {
                params.keywords = keywords;
                stdout.write_all(format!("{}\n", stargaze::error::LOADING_MESSAGE).as_bytes()).await?;
                ViewAction::Sync(app.search(params.clone(), false).await)
            }
            Err(e) => {
                stdout.write_all(format!("! {}\n", e).as_bytes()).await?;
                continue;
            }
        };
        view = view.reduce(action);
    }
    Ok(())
}
