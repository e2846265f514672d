use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use wordsync::pipeline::{annotate_chapter, export_chapter, validate_chapter, ChapterOptions};
use wordsync::{ChapterStats, ChapterStatus, RunSummary, SiteConfig, SyncError, Tolerance};

/// Word-level sync tooling for narrated chapters
#[derive(Debug, Parser)]
#[command(name = "wordsync")]
#[command(about = "Align reading-page markup with ASR word timing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root containing output/ and site/
    #[arg(long, env = "WORDSYNC_ROOT", default_value = ".", global = true)]
    root: PathBuf,

    /// Process only this chapter number
    #[arg(short, long, global = true)]
    chapter: Option<u32>,

    /// Process every chapter with a transcript
    #[arg(short, long, global = true)]
    all: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit the run summary as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Wrap reading-page words with transcript indices
    Annotate {
        /// Preview without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Re-annotate even if already annotated
        #[arg(short, long)]
        force: bool,
    },
    /// Export compact word-timing JSON from transcripts
    Export {
        /// Preview without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Cross-check annotated pages against exported timing
    Validate {
        /// Maximum tolerated mismatched words per chapter
        #[arg(long, default_value_t = 0)]
        max_mismatches: usize,

        /// Maximum tolerated dead (unclickable) words per chapter
        #[arg(long, default_value_t = 10)]
        max_dead_words: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = SiteConfig::new(&cli.root);
    let chapters = match select_chapters(&cfg, cli.chapter, cli.all) {
        Ok(chapters) => chapters,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if chapters.is_empty() {
        eprintln!("no chapters found under {}", cfg.transcript_dir.display());
        return ExitCode::SUCCESS;
    }

    let opts = chapter_options(&cli.command);
    let bar = progress_bar(chapters.len() as u64);

    let mut stats = Vec::with_capacity(chapters.len());
    for chapter in chapters {
        bar.set_message(format!("chapter {chapter:02}"));
        let result = match &cli.command {
            Commands::Annotate { .. } => annotate_chapter(&cfg, chapter, &opts),
            Commands::Export { .. } => export_chapter(&cfg, chapter, &opts),
            Commands::Validate { .. } => validate_chapter(&cfg, chapter, &opts),
        };
        // One chapter's bad input never blocks the rest of the batch.
        stats.push(result.unwrap_or_else(|err| {
            tracing::warn!(chapter, error = %err, "chapter pass failed");
            ChapterStats::failed(chapter, err.to_string())
        }));
        bar.inc(1);
    }
    bar.finish_and_clear();

    let summary = RunSummary::from_chapters(stats);
    print_summary(&summary, cli.json, cli.verbose > 0);

    if summary.out_of_tolerance() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wordsync={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn select_chapters(
    cfg: &SiteConfig,
    chapter: Option<u32>,
    all: bool,
) -> Result<Vec<u32>, SyncError> {
    match chapter {
        Some(n) => Ok(vec![n]),
        None if all => cfg.discover_chapters(),
        // Default to the full batch, matching the rest of the pipeline.
        None => cfg.discover_chapters(),
    }
}

fn chapter_options(command: &Commands) -> ChapterOptions {
    let mut opts = ChapterOptions::default();
    match command {
        Commands::Annotate { dry_run, force } => {
            opts.dry_run = *dry_run;
            opts.force = *force;
        }
        Commands::Export { dry_run } => {
            opts.dry_run = *dry_run;
        }
        Commands::Validate {
            max_mismatches,
            max_dead_words,
        } => {
            opts.tolerance = Tolerance {
                max_mismatches: *max_mismatches,
                max_dead_words: *max_dead_words,
            };
        }
    }
    opts
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .expect("progress template is valid"),
    );
    bar
}

fn print_summary(summary: &RunSummary, json: bool, verbose: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("error: serialize summary: {err}"),
        }
        return;
    }

    for chapter in &summary.chapters {
        println!(
            "chapter {:02}: {:?} ({} words, {} wrapped, {} mismatches, {} dead)",
            chapter.chapter,
            chapter.status,
            chapter.transcript_words,
            chapter.wrapped,
            chapter.mismatches,
            chapter.dead_words
        );
        let shown = if verbose {
            chapter.notes.len()
        } else if chapter.status == ChapterStatus::Failed
            || chapter.status == ChapterStatus::OutOfTolerance
        {
            5.min(chapter.notes.len())
        } else {
            0
        };
        for note in &chapter.notes[..shown] {
            println!("  - {note}");
        }
    }

    println!(
        "total: {} wrapped, {} mismatches, {} dead words, {} failed chapters",
        summary.total_wrapped,
        summary.total_mismatches,
        summary.total_dead_words,
        summary.failed_chapters
    );
    if summary.out_of_tolerance() {
        println!("validation out of tolerance: published pages would mis-seek");
    }
}
