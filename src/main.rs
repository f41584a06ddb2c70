use clap::{Parser, Subcommand};
use notefold::posts::{PostService, SnapshotProvider, find_post};
use notefold::regroup::Element;
use notefold::{config, output, regroup};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notefold")]
#[command(about = "Static blog generator for workspace-hosted content")]
#[command(long_about = "\
Static blog generator for workspace-hosted content

Your workspace is the data source. A database page holds the posts, its
schema names their properties (title, slug, date, tags, status, type),
and its views decide their order. Builds run offline against exported
record-map snapshots.

Content structure:

  content/
  ├── config.toml                            # Site config (optional)
  ├── 0a1b2c3d-4e5f-....json                 # Root database snapshot
  ├── 97f1e2d3-....json                      # Per-page block snapshots
  └── c1...v1.table.json                     # Collection query (optional)

A post is listed when its status is Published, it has a title and a
slug, and its type is Post (pages join with --include-pages).")]
#[command(version)]
struct Cli {
    /// Content directory (config.toml + record-map snapshots)
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List publishable posts
    Posts {
        /// Also list standalone pages, not just posts
        #[arg(long)]
        include_pages: bool,
        /// Emit the listing as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the normalized block map for one post as JSON
    Page {
        /// Slug of the post or page
        slug: String,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Apply configured card-grid rules to a rendered element tree
    Regroup {
        /// Slug whose grid rules apply
        slug: String,
        /// Rendered element tree JSON (renderer output)
        #[arg(long)]
        tree: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate config and report root id resolution
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.source)?;

    match cli.command {
        Command::Posts {
            include_pages,
            json,
        } => {
            let service = PostService::new(SnapshotProvider::new(&cli.source), config);
            let posts = service.list_posts(include_pages);
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                output::print_posts(&posts);
            }
        }
        Command::Page { slug, output } => {
            let service = PostService::new(SnapshotProvider::new(&cli.source), config);
            let posts = service.list_posts(true);
            let post = find_post(&posts, &slug)
                .ok_or_else(|| format!("no published post or page with slug \"{slug}\""))?;
            let blocks = service.get_blocks(&post.id)?;
            write_json(output.as_deref(), &serde_json::to_string_pretty(&blocks)?)?;
        }
        Command::Regroup { slug, tree, output } => {
            let content = std::fs::read_to_string(&tree)?;
            let mut root: Element = serde_json::from_str(&content)?;
            let cards = regroup::regroup_page(&mut root, &config.grids, &slug);
            write_json(output.as_deref(), &serde_json::to_string_pretty(&root)?)?;
            if output.is_some() {
                println!("Regrouped {cards} cards for \"{slug}\"");
            }
        }
        Command::Check => {
            output::print_check(&config);
            println!("Config is valid");
        }
    }

    Ok(())
}

/// Write JSON to the given file, or to stdout when no file was asked for.
fn write_json(path: Option<&std::path::Path>, json: &str) -> std::io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, json),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
