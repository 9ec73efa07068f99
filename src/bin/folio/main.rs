use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use spdlog::{info, warn};

use folio::config::Config;
use folio::filter::PostFilter;
use folio::logger::configure_logger;
use folio::post::{PostType, TopicCategory};
use folio::repository::BlogRepository;
use folio::server::server_run;

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "folio.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serves the blog API over HTTP (default)
    Serve,
    /// Lists posts as JSON
    List {
        /// Case-insensitive search on titles
        #[arg(short, long)]
        search: Option<String>,
        /// Post type, e.g. "Build Log". Repeat for several
        #[arg(short = 't', long = "type")]
        post_types: Vec<String>,
        /// Topic category, e.g. Tech. Repeat for several
        #[arg(short = 'c', long = "topic")]
        topics: Vec<String>,
        /// Serve from the full list cache instead of the top posts
        #[arg(short, long)]
        all: bool,
    },
    /// Prints a post as JSON, by id or title slug
    Get {
        id: String,
    },
    /// Checks the connection to the content store
    Check,
}

fn build_filter(search: Option<String>, post_types: &[String], topics: &[String]) -> Result<PostFilter> {
    let post_types = post_types.iter()
        .map(|t| t.parse::<PostType>().map_err(|e| anyhow!(e)))
        .collect::<Result<Vec<_>>>()?;
    let topics = topics.iter()
        .map(|t| t.parse::<TopicCategory>().map_err(|e| anyhow!(e)))
        .collect::<Result<Vec<_>>>()?;

    Ok(PostFilter {
        search,
        post_types,
        topic_categories: topics,
    })
}

async fn run_command(config: Config, command: Command) -> Result<()> {
    if let Command::Serve = command {
        info!("Starting Folio =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
        info!("Listening on {}:{}", config.server.address, config.server.port);
        return Ok(server_run(config).await?);
    }

    let repository = BlogRepository::from_config(&config)?;
    match command {
        Command::List { search, post_types, topics, all } => {
            let filter = build_filter(search, &post_types, &topics)?;
            let listing = repository.list_posts(&filter, all).await;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Get { id } => {
            let lookup = repository.get_post(&id).await;
            println!("{}", serde_json::to_string_pretty(&lookup)?);
            if lookup.post.is_none() {
                return Err(anyhow!("Post {} not found", id));
            }
        }
        Command::Check => {
            let status = repository.check_connection().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            if !status.ok {
                return Err(anyhow!("Store at {} is not reachable", status.host));
            }
        }
        Command::Serve => {}
    }

    Ok(())
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run folio --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    run_command(config, args.command.unwrap_or(Command::Serve)).await
}
