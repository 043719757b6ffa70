//! notemark CLI: the engine's four operations as JSON over stdin/stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notemark_config::Config;
use notemark_engine::api::{
    ParseMarkdownRequest, RestoreMarkdownNodesRequest, StringifyMarkdownNodesRequest,
    parse_markdown_nodes, restore_markdown_nodes, stringify_markdown_nodes,
};
use notemark_engine::{decode, parse_bytes};
use notemark_links::{CacheSettings, HttpFetcher, HttpSettings, LinkMetadata, LinkResolver};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "notemark")]
#[command(author, version, about = "Markdown note engine", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/notemark/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse markdown into nodes and warnings
    Parse {
        /// Markdown file (use - or omit for stdin)
        input: Option<PathBuf>,

        /// Byte offset of the editor caret; orders warnings nearest-first
        #[arg(long)]
        caret: Option<usize>,
    },

    /// Repair a JSON `{"nodes": [...]}` request into a valid tree
    Restore {
        /// JSON file (use - or omit for stdin)
        input: Option<PathBuf>,
    },

    /// Write a JSON `{"nodes": [...]}` request back out as markdown
    Stringify {
        /// JSON file (use - or omit for stdin)
        input: Option<PathBuf>,

        /// Print `{"markdown": ...}` instead of raw text
        #[arg(long)]
        json: bool,
    },

    /// Fetch preview metadata for a URL
    LinkMetadata { url: String },

    /// Parse markdown and fetch metadata for every link in it
    Links {
        /// Markdown file (use - or omit for stdin)
        input: Option<PathBuf>,
    },
}

/// One entry of the `links` output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedLink {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<LinkMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse { input, caret } => {
            let bytes = read_input(input.as_deref())?;
            let markdown = decode(&bytes)?.to_string();
            let response = parse_markdown_nodes(ParseMarkdownRequest { markdown, caret });
            print_json(&response)?;
        }
        Commands::Restore { input } => {
            let request: RestoreMarkdownNodesRequest = read_json(input.as_deref())?;
            print_json(&restore_markdown_nodes(request))?;
        }
        Commands::Stringify { input, json } => {
            let request: StringifyMarkdownNodesRequest = read_json(input.as_deref())?;
            let response = stringify_markdown_nodes(request);
            if json {
                print_json(&response)?;
            } else {
                println!("{}", response.markdown);
            }
        }
        Commands::LinkMetadata { url } => {
            let resolver = resolver(&config)?;
            let metadata = resolver.resolve(&url).await?;
            print_json(&metadata)?;
        }
        Commands::Links { input } => {
            let bytes = read_input(input.as_deref())?;
            let document = parse_bytes(&bytes)?.document;
            let resolver = resolver(&config)?;
            let resolved: Vec<ResolvedLink> = resolver
                .resolve_tree(&document)
                .await
                .into_iter()
                .map(|(url, result)| match result {
                    Ok(metadata) => ResolvedLink {
                        url,
                        metadata: Some(metadata),
                        error: None,
                    },
                    Err(e) => ResolvedLink {
                        url,
                        metadata: None,
                        error: Some(e.to_string()),
                    },
                })
                .collect();
            print_json(&resolved)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => {
            let config_path = Config::expand_path(path).unwrap_or_else(|| path.to_path_buf());
            log::debug!("Config path: {}", config_path.display());
            Config::load_from_path(&config_path)?
        }
        None => {
            log::debug!("Config path: {}", Config::config_path().display());
            Config::load()?
        }
    };
    Ok(loaded.unwrap_or_default())
}

fn resolver(config: &Config) -> Result<LinkResolver<HttpFetcher>> {
    let settings = &config.link_metadata;
    let fetcher = HttpFetcher::new(&HttpSettings {
        timeout: settings.timeout(),
        max_body_bytes: settings.max_body_bytes,
        max_redirects: settings.max_redirects,
        user_agent: settings.user_agent.clone(),
    })?;
    Ok(LinkResolver::new(
        fetcher,
        CacheSettings {
            ttl: settings.ttl(),
            negative_ttl: settings.negative_ttl(),
            timeout: settings.timeout(),
        },
    ))
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let bytes = read_input(path)?;
    serde_json::from_slice(&bytes).context("Input is not a valid request")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_accepts_caret_and_global_config() {
        let cli = Cli::try_parse_from([
            "notemark", "parse", "note.md", "--caret", "12", "--config", "c.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        match cli.command {
            Commands::Parse { input, caret } => {
                assert_eq!(input, Some(PathBuf::from("note.md")));
                assert_eq!(caret, Some(12));
            }
            _ => panic!("expected parse"),
        }
    }

    #[test]
    fn link_metadata_takes_a_url() {
        let cli =
            Cli::try_parse_from(["notemark", "link-metadata", "https://example.test"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::LinkMetadata { url } if url == "https://example.test"
        ));
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let config = load_config(Some(Path::new("/nonexistent/notemark.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }
}
