//! changelog-generator - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::Confirm;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use changelog_generator::changelog::{
    ReleaseNotes, render_json, render_markdown, write_atomically,
};
use changelog_generator::generator::{DEFAULT_MAX_LENGTH, prepare_release};
use changelog_generator::git::TargetRange;
use changelog_generator::release::{GhCli, PublishOutcome, publish_release, release_pairs};
use changelog_generator::repository::{HEAD, RepositoryManager};
use changelog_generator::summary::{DefaultExecutor, check_installed, generate_ai_summary};

/// Render a release changelog from conventional commits between release tags.
#[derive(Parser, Debug)]
#[command(name = "changelog-generator")]
#[command(about = "Render a release changelog from conventional commits between release tags")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the git working copy
    #[arg(short = 'r', long, default_value = ".", global = true)]
    repository: PathBuf,

    /// Tag prefix; release tags are then `<prefix>/X.Y.Z`
    #[arg(short = 't', long, env = "TAG_PREFIX", global = true)]
    tag_prefix: Option<String>,

    /// Only consider commits touching these paths (repeat or separate with ';')
    #[arg(short = 'p', long = "path", value_delimiter = ';', global = true)]
    path_filters: Vec<String>,

    /// Length budget of the rendered changelog
    #[arg(long, env = "CHANGELOG_MAX_LENGTH", default_value_t = DEFAULT_MAX_LENGTH, global = true)]
    max_length: usize,

    /// Skip the AI summary of the diff
    #[arg(long, global = true)]
    no_ai: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Write the changelog to a file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Explicit `rev1..rev2` range instead of the last two release tags
    #[arg(long, global = true)]
    target: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish the changelog as the GitHub release of the current tag
    Publish {
        /// Only update existing releases, never create one
        #[arg(long)]
        no_create: bool,
    },
    /// Regenerate and publish the changelog of every release
    PublishAll {
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let manager = RepositoryManager::open(
        &cli.repository,
        cli.tag_prefix.as_deref(),
        cli.path_filters.clone(),
    )
    .with_context(|| format!("Failed to open repository at {}", cli.repository.display()))?;

    match &cli.command {
        None => {
            let target = parse_target(cli.target.as_deref())?;
            let notes = build_notes(&cli, &manager, target.as_ref()).await?;
            emit(&cli, &notes)
        }
        Some(Command::Publish { no_create }) => {
            let target = parse_target(cli.target.as_deref())?;
            let notes = build_notes(&cli, &manager, target.as_ref()).await?;
            if notes.current_tag == HEAD {
                bail!("No release tag found. Nothing to publish.");
            }

            let gh = GhCli::default();
            gh.check_installed()?;
            publish(&gh, &manager, &notes, !no_create)
        }
        Some(Command::PublishAll { yes }) => publish_all(&cli, &manager, *yes).await,
    }
}

/// Log to stderr, `RUST_LOG` overriding the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_target(target: Option<&str>) -> Result<Option<TargetRange>> {
    target
        .map(TargetRange::parse)
        .transpose()
        .context("Target must look like rev1..rev2")
}

/// Prepare the notes and attach the AI summary when enabled.
async fn build_notes(
    cli: &Cli,
    manager: &RepositoryManager,
    target: Option<&TargetRange>,
) -> Result<ReleaseNotes> {
    let prepared =
        prepare_release(manager, target, cli.max_length).context("Failed to collect commits")?;
    let mut notes = prepared.notes;

    info!(
        previous = %notes.previous_tag,
        current = %notes.current_tag,
        commits = notes.commit_count(),
        "Prepared release notes"
    );

    if !cli.no_ai && prepared.diff.is_some() {
        let executor = DefaultExecutor::from_env();
        match check_installed(executor.command()) {
            Ok(()) => {
                notes.ai_summary = generate_ai_summary(
                    &executor,
                    cli.tag_prefix.as_deref(),
                    prepared.diff.as_ref().map(|d| d.text.as_str()),
                )
                .await;
            }
            Err(e) => warn!(error = %e, "Skipping AI summary"),
        }
    }

    Ok(notes)
}

fn emit(cli: &Cli, notes: &ReleaseNotes) -> Result<()> {
    let rendered = match cli.format {
        OutputFormat::Markdown => render_markdown(notes),
        OutputFormat::Json => render_json(notes).context("Failed to render changelog")?,
    };

    match &cli.output {
        Some(path) => {
            write_atomically(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote changelog for {} to {}", notes.current_tag, path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn publish(
    gh: &GhCli,
    manager: &RepositoryManager,
    notes: &ReleaseNotes,
    create: bool,
) -> Result<()> {
    let body = render_markdown(notes);
    let outcome = publish_release(gh, manager.path(), &notes.current_tag, &body, create)
        .with_context(|| format!("Failed to publish release {}", notes.current_tag))?;

    match outcome {
        PublishOutcome::Created => eprintln!("Created release {}", notes.current_tag),
        PublishOutcome::Updated => eprintln!("Updated release {}", notes.current_tag),
        PublishOutcome::Skipped => eprintln!(
            "Release {} does not exist, skipped (creation disabled)",
            notes.current_tag
        ),
    }

    Ok(())
}

async fn publish_all(cli: &Cli, manager: &RepositoryManager, yes: bool) -> Result<()> {
    let tags = manager.list_release_tags().context("Failed to list release tags")?;
    let pairs = release_pairs(tags);

    if pairs.is_empty() {
        eprintln!("Fewer than two release tags found. Nothing to publish.");
        return Ok(());
    }

    let gh = GhCli::default();
    gh.check_installed()?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Rewrite {} GitHub releases?", pairs.len()))
            .default(false)
            .interact()
            .context("Confirmation prompt failed")?;

        if !confirmed {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    for pair in &pairs {
        let notes = build_notes(cli, manager, Some(pair)).await?;
        publish(&gh, manager, &notes, true)?;
    }

    Ok(())
}
