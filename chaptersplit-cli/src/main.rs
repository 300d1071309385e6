use std::path::PathBuf;

use chaptersplit::{BatchPolicy, SplitOptions, VideoOutcome};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "chaptersplit",
    about = "Split chaptered videos into one tagged audio file per chapter"
)]
struct Cli {
    /// Link to a single video.
    #[arg(short, long, conflicts_with = "playlist", required_unless_present = "playlist")]
    link: Option<String>,

    /// Path to a file with one link per line.
    #[arg(short, long)]
    playlist: Option<PathBuf>,

    /// Keep downloaded audio, metadata dumps, and thumbnails.
    #[arg(long = "keep-tmp")]
    keep_tmp: bool,

    /// Parent folder for per-video output (default: "download", or the
    /// playlist path without its extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Folder for intermediate files.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// How many " copy" suffixes to try before giving up on a track name.
    #[arg(long, default_value_t = chaptersplit::config::DEFAULT_MAX_DUPLICATES)]
    max_duplicates: usize,

    /// Keep going with the next link when a video fails.
    #[arg(long)]
    continue_on_error: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "chaptersplit=debug"
    } else {
        "chaptersplit=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().expect("valid directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let links = match (&cli.link, &cli.playlist) {
        (Some(link), _) => vec![link.clone()],
        (None, Some(path)) => match chaptersplit::read_link_list(path) {
            Ok(links) => links,
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        (None, None) => {
            eprintln!("Error: no link specified");
            std::process::exit(1);
        }
    };

    if links.is_empty() {
        eprintln!("Error: playlist contains no links");
        std::process::exit(1);
    }

    let output_root = cli
        .output
        .unwrap_or_else(|| chaptersplit::default_output_root(cli.playlist.as_deref()));

    let policy = if cli.continue_on_error {
        BatchPolicy::ContinueOnError
    } else {
        BatchPolicy::FailFast
    };

    let mut opts = SplitOptions::new()
        .output_root(output_root)
        .keep_artifacts(cli.keep_tmp)
        .max_duplicates(cli.max_duplicates)
        .batch_policy(policy);
    if let Some(dir) = cli.work_dir {
        opts = opts.work_dir(dir);
    }

    let report = match chaptersplit::split_with_options(&links, opts).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    for video in &report.videos {
        match video {
            VideoOutcome::Skipped { title, .. } => {
                eprintln!("Skipped \"{title}\" (folder exists)");
            }
            VideoOutcome::Completed {
                title,
                directory,
                tracks,
            } => {
                eprintln!(
                    "Split \"{title}\" into {} tracks in {}",
                    tracks.len(),
                    directory.display()
                );
            }
        }
    }
    for failure in &report.failures {
        eprintln!(
            "Failed {} (at {:?}): {}",
            failure.link, failure.stage, failure.error
        );
    }
    for failure in &report.cleanup.failed {
        eprintln!(
            "Warning: could not remove {}: {}",
            failure.path.display(),
            failure.error
        );
    }

    if cli.json {
        match report.to_json_pretty() {
            Ok(j) => println!("{j}"),
            Err(e) => {
                eprintln!("JSON error: {e}");
                std::process::exit(1);
            }
        }
    }

    if !report.failures.is_empty() {
        std::process::exit(1);
    }
}
