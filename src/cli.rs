use std::path::PathBuf;

use chrono::Datelike;
use clap::{Args, Parser, Subcommand};

use stargaze::types::{MediaType, SearchParams, DEFAULT_YEAR_START};

/// Search the NASA image and video library from the terminal
#[derive(Parser)]
#[command(name = "stargaze", version)]
#[command(about = "Search a public media archive and page through the results", long_about = None)]
pub struct Cli {
    /// Config file (defaults to config.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    /// Keywords to search for (2-50 characters)
    #[arg(value_parser = parse_keywords)]
    pub keywords: String,
    /// image, video or audio
    #[arg(short, long)]
    pub media_type: MediaType,
    /// Earliest year to include
    #[arg(short, long, value_parser = parse_year)]
    pub year_start: Option<i32>,
    /// Skip the response cache
    #[arg(long)]
    pub refresh: bool,
}

impl QueryArgs {
    pub fn params(&self) -> SearchParams { SearchParams::new(self.keywords.clone(), self.media_type, self.year_start) }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one search and print a page of results
    Search {
        #[command(flatten)]
        query: QueryArgs,
        /// Page to print (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Show full descriptions and transcripts
        #[arg(long)]
        expand: bool,
        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search, then page through results interactively
    Browse {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print the effective configuration
    Config,
}

pub fn parse_keywords(s: &str) -> Result<String, String> {
    let s = s.trim();
    match s.chars().count() {
        0 | 1 => Err("keywords must be at least 2 characters".into()),
        2..=50 => Ok(s.to_string()),
        _ => Err("keywords must be at most 50 characters".into()),
    }
}

pub fn parse_year(s: &str) -> Result<i32, String> {
    let year: i32 = s.trim().parse().map_err(|_| format!("`{}` is not a year", s))?;
    let current = chrono::Local::now().year();
    if (DEFAULT_YEAR_START..=current).contains(&year) {
        Ok(year)
    } else {
        Err(format!("year must be between {} and {}", DEFAULT_YEAR_START, current))
    }
}

/// One line typed at the `browse` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Goto(usize),
    Play(usize),
    Describe(usize),
    Search(String),
    Help,
    Quit,
}

pub const BROWSE_HELP: &str = "n next page | p previous page | g N go to page | v N play video | d N toggle description | s WORDS new search | q quit";

impl std::str::FromStr for BrowseCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let number = || rest.parse::<usize>().map_err(|_| format!("`{}` needs a number", cmd));
        match cmd {
            "n" => Ok(BrowseCommand::Next),
            "p" => Ok(BrowseCommand::Prev),
            "g" => number().map(BrowseCommand::Goto),
            "v" => number().map(BrowseCommand::Play),
            "d" => number().map(BrowseCommand::Describe),
            "s" => parse_keywords(rest).map(BrowseCommand::Search),
            "h" | "?" | "" => Ok(BrowseCommand::Help),
            "q" => Ok(BrowseCommand::Quit),
            other => Err(format!("unknown command `{}`", other)),
        }
    }
}
