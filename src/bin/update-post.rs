//! Command-line interface for textile-post
//!
//! Reads a Textile post from stdin, writes the updated post to stdout and a
//! one-line summary of the changes to stderr.
//!
//! Usage:
//!   update-post [--config `<file>`] [--levels `<2,3>`] [--toc-marker `<marker>`]
//!               [--only `<footnotes|toc>`] < post.textile > updated.textile

use clap::{value_parser, Arg, ArgMatches, Command};
use std::io::{self, Read};
use textile_post::post::config::ConfigError;
use textile_post::post::{
    standard_updaters, update_post, FootnoteUpdater, Loader, PostConfig, TableOfContentsUpdater,
    Updater,
};

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    let matches = Command::new("update-post")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Expands new footnotes, renumbers footnotes and rebuilds the table of contents of a Textile post")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("TOML file layered over the default configuration"),
        )
        .arg(
            Arg::new("levels")
                .long("levels")
                .value_name("LEVELS")
                .value_delimiter(',')
                .value_parser(value_parser!(u8).range(1..=6))
                .help("Headline levels listed in the table of contents, e.g. 2,3"),
        )
        .arg(
            Arg::new("toc-marker")
                .long("toc-marker")
                .value_name("MARKER")
                .help("Marker opening the table of contents paragraph"),
        )
        .arg(
            Arg::new("only")
                .long("only")
                .value_name("UPDATER")
                .value_parser(["footnotes", "toc"])
                .help("Run a single updater instead of both"),
        )
        .get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut updaters = select_updaters(&config, matches.get_one::<String>("only"));

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Error: failed to read stdin: {}", e);
        std::process::exit(1);
    }

    match update_post(&mut updaters, &input) {
        Ok(update) => {
            print!("{}", update.text);
            if !update.summary.is_empty() {
                eprintln!("{}", update.summary);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(matches: &ArgMatches) -> Result<PostConfig, ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(levels) = matches.get_many::<u8>("levels") {
        loader = loader.headline_levels(&levels.copied().collect::<Vec<_>>())?;
    }
    if let Some(marker) = matches.get_one::<String>("toc-marker") {
        loader = loader.toc_marker(marker)?;
    }
    loader.build()
}

fn select_updaters(config: &PostConfig, only: Option<&String>) -> Vec<Box<dyn Updater>> {
    match only.map(String::as_str) {
        Some("footnotes") => vec![Box::new(FootnoteUpdater::new(&config.footnotes))],
        Some("toc") => vec![Box::new(TableOfContentsUpdater::new(&config.toc))],
        _ => standard_updaters(config),
    }
}
