//! pressmigrate CLI
//!
//! Command-line tools for batch content imports.
//!
//! # Commands
//!
//! - `types` - List the source's public content types
//! - `step` - Import one page and print the step response
//! - `import` - Import pages until the source is exhausted
//! - `watermark` - Show or reset the per-type watermarks
//! - `serve` - Serve a JSON fixture of records as an export source
//! - `token` - Generate an export token

mod commands;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// pressmigrate batch content import tools.
#[derive(Parser)]
#[command(name = "pressmigrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Posts endpoint of the source
    #[arg(global = true, long, env = "PRESSMIGRATE_URL")]
    url: Option<String>,

    /// Bearer token presented to the source
    #[arg(global = true, long, env = "PRESSMIGRATE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory holding the destination snapshot, watermarks and uploads
    #[arg(global = true, short, long, default_value = ".pressmigrate")]
    dest: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the source's public content types
    Types {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Import one page and print the step response as JSON
    Step {
        /// Content type to import
        #[arg(long = "type", default_value = "post")]
        post_type: String,

        /// Status to import
        #[arg(long, default_value = "publish")]
        status: String,

        /// Import records with ids above this one
        #[arg(long, default_value = "0")]
        start_id: u64,

        /// Records per page
        #[arg(long, default_value = "5")]
        batch_size: i64,
    },

    /// Import pages until the source is exhausted
    Import {
        /// Content type to import
        #[arg(long = "type", default_value = "post")]
        post_type: String,

        /// Status to import
        #[arg(long, default_value = "publish")]
        status: String,

        /// Stop after this many records
        #[arg(long)]
        total: Option<u64>,

        /// Records per page
        #[arg(long, default_value = "5")]
        batch_size: u32,

        /// Start from this id instead of the stored watermark
        #[arg(long)]
        start_id: Option<u64>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show or reset the per-type watermarks
    Watermark {
        #[command(subcommand)]
        action: WatermarkAction,
    },

    /// Serve a JSON fixture of records as an export source
    Serve {
        /// JSON file holding an array of records or an export page
        #[arg(long)]
        records: PathBuf,

        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Route prefix, e.g. /wp-json/batch/v1
        #[arg(long, default_value = "")]
        prefix: String,

        /// Records per page when a request names no count
        #[arg(long, default_value = "10")]
        page_size: u32,
    },

    /// Generate an export token
    Token,
}

#[derive(Subcommand)]
enum WatermarkAction {
    /// Print every stored watermark
    Show,
    /// Forget the watermark of one content type
    Reset {
        /// Content type whose watermark is dropped
        #[arg(long = "type", default_value = "post")]
        post_type: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let dest = commands::Destination::new(cli.dest);
    match cli.command {
        Commands::Types { format } => {
            let source = commands::Source::from_args(cli.url, cli.token)?;
            commands::types::run(&source, &format)?;
        }
        Commands::Step {
            post_type,
            status,
            start_id,
            batch_size,
        } => {
            let source = commands::Source::from_args(cli.url, cli.token)?;
            commands::step::run(&source, &dest, &post_type, &status, start_id, batch_size)?;
        }
        Commands::Import {
            post_type,
            status,
            total,
            batch_size,
            start_id,
            format,
        } => {
            let source = commands::Source::from_args(cli.url, cli.token)?;
            let options =
                commands::import::options(&post_type, &status, total, batch_size, start_id);
            commands::import::run(&source, &dest, &options, &format)?;
        }
        Commands::Watermark { action } => match action {
            WatermarkAction::Show => commands::watermark::show(&dest)?,
            WatermarkAction::Reset { post_type } => {
                commands::watermark::reset(&dest, &post_type)?
            }
        },
        Commands::Serve {
            records,
            bind,
            prefix,
            page_size,
        } => {
            commands::serve::run(&records, bind, &prefix, page_size, cli.token)?;
        }
        Commands::Token => {
            println!("{}", pressmigrate_server::generate_token().as_str());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pressmigrate").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn import_flags() {
        let cli = parse(&[
            "import",
            "--url",
            "https://src.example/wp-json/batch/v1/posts",
            "--total",
            "12",
            "--batch-size",
            "4",
            "--start-id",
            "30",
        ]);
        assert_eq!(
            cli.url.as_deref(),
            Some("https://src.example/wp-json/batch/v1/posts")
        );
        match cli.command {
            Commands::Import {
                post_type,
                total,
                batch_size,
                start_id,
                ..
            } => {
                assert_eq!(post_type, "post");
                assert_eq!(total, Some(12));
                assert_eq!(batch_size, 4);
                assert_eq!(start_id, Some(30));
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn step_accepts_negative_batch_size() {
        let cli = parse(&["step", "--type", "page", "--batch-size=-3"]);
        match cli.command {
            Commands::Step {
                post_type,
                batch_size,
                start_id,
                ..
            } => {
                assert_eq!(post_type, "page");
                assert_eq!(batch_size, -3);
                assert_eq!(start_id, 0);
            }
            _ => panic!("expected step"),
        }
    }

    #[test]
    fn watermark_reset() {
        let cli = parse(&["watermark", "reset", "--type", "page", "--dest", "/tmp/x"]);
        assert_eq!(cli.dest, PathBuf::from("/tmp/x"));
        assert!(matches!(
            cli.command,
            Commands::Watermark {
                action: WatermarkAction::Reset { ref post_type }
            } if post_type == "page"
        ));
    }

    #[test]
    fn serve_requires_records() {
        assert!(Cli::try_parse_from(["pressmigrate", "serve"]).is_err());
        let cli = parse(&["serve", "--records", "fixture.json", "--bind", "0.0.0.0:9000"]);
        assert!(matches!(cli.command, Commands::Serve { bind, .. } if bind.port() == 9000));
    }

    #[test]
    fn verifies_command_tree() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
