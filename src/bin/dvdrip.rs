use std::{io, path::PathBuf, sync::Arc, sync::OnceLock};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use dvdrip::{
    CancellationToken, ProgramTags, ProgressCallback, ProgressInfo, RipOptions, Ripper, RunTags,
    Stage, ToolPaths, UnknownLanguagePolicy, toc,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  dvdrip toc --count 4\n  dvdrip rip --title 'Alien' --year 1979\n  dvdrip rip --title 'Pilot|Second' --episodes 'S01E01|S01E02' --show 'Some Show'\n  dvdrip completions zsh > _dvdrip";

#[derive(Debug, Parser)]
#[command(
    name = "dvdrip",
    version,
    about = "Dump DVD titles to tagged MP4 files without re-encoding",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output, including full tool command lines.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long, global = true)]
    progress: bool,

    /// DVD device or image to read (defaults to the tools' default drive).
    #[arg(long, global = true)]
    device: Option<PathBuf>,

    /// Directory for the raw dump file.
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    /// Directory for tagged output files.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Directory for diagnostic files after a failed remux.
    #[arg(long, global = true)]
    artifact_dir: Option<PathBuf>,

    /// Maximum ffmpeg attempts per title.
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Output container extension.
    #[arg(long, global = true)]
    ext: Option<String>,

    /// Language for streams labeled "unknown": a 3-letter code, or "reject".
    #[arg(long, global = true)]
    unknown_language: Option<String>,

    /// Path to lsdvd.
    #[arg(long, global = true)]
    lsdvd: Option<String>,

    /// Path to mplayer.
    #[arg(long, global = true)]
    mplayer: Option<String>,

    /// Path to ffmpeg.
    #[arg(long, global = true)]
    ffmpeg: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rip titles to tagged files.
    #[command(
        about = "Rip titles to tagged files",
        after_help = "Examples:\n  dvdrip rip --title 'Alien' --year 1979\n  dvdrip rip --title 'A|B' --episodes '1x01|1x02' --show 'Show' --tracks 3 4 --yes"
    )]
    Rip {
        /// Movie title, or episode titles delimited with |.
        #[arg(short, long, value_delimiter = '|', required = true)]
        title: Vec<String>,
        /// Episode identifiers delimited with |, one per title.
        #[arg(short, long, value_delimiter = '|')]
        episodes: Vec<String>,
        /// Name of the TV show.
        #[arg(short, long)]
        show: Option<String>,
        /// Release year.
        #[arg(short, long)]
        year: Option<String>,
        /// Title numbers to rip instead of the longest titles.
        #[arg(long, num_args = 1..)]
        tracks: Vec<u32>,
        /// Accept the default title selection without asking.
        #[arg(long)]
        yes: bool,
    },

    /// Print the disc's titles.
    #[command(
        about = "List disc titles",
        visible_alias = "list",
        after_help = "Examples:\n  dvdrip toc\n  dvdrip toc --count 3 --json"
    )]
    Toc {
        /// Mark the N titles that would be selected by default.
        #[arg(long)]
        count: Option<usize>,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

static ACTIVE_BAR: OnceLock<ProgressBar> = OnceLock::new();

/// Colored `log` output on stderr that stays clear of the progress bar.
struct TerminalLogger {
    level: LevelFilter,
}

impl Log for TerminalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let text = record.args().to_string();
        let line = match record.level() {
            Level::Error => format!("{} {}", "error:".red().bold(), text.red()),
            Level::Warn => format!("{} {}", "warning:".yellow().bold(), text.yellow()),
            Level::Info => text.green().to_string(),
            Level::Debug | Level::Trace => text.dimmed().to_string(),
        };

        match ACTIVE_BAR.get() {
            Some(bar) => bar.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // Only fails if a logger is already installed.
    if log::set_logger(Box::leak(Box::new(TerminalLogger { level }))).is_ok() {
        log::set_max_level(level);
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        let _ = ACTIVE_BAR.set(bar.clone());
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_length(info.total);
        self.bar.set_position(info.current);
        let stage = match info.stage {
            Stage::ReadingToc => "reading table of contents",
            Stage::Dumping => "dumping",
            Stage::Remuxing => "remuxing",
            Stage::TitleDone => "done",
            _ => "working",
        };
        match info.title {
            Some(title) => self.bar.set_message(format!("title {title}: {stage}")),
            None => self.bar.set_message(stage),
        }
    }
}

fn parse_unknown_language(value: &str) -> Option<UnknownLanguagePolicy> {
    let value = value.trim().to_ascii_lowercase();
    if value == "reject" {
        return Some(UnknownLanguagePolicy::Reject);
    }
    if value.len() == 3 && value.chars().all(|c| c.is_ascii_lowercase()) {
        return Some(UnknownLanguagePolicy::Substitute(value));
    }
    None
}

fn parse_track_list(line: &str) -> Result<Vec<u32>, Box<dyn std::error::Error>> {
    let mut titles = Vec::new();
    for word in line.split_whitespace() {
        let title = word
            .parse::<u32>()
            .map_err(|_| format!("not a title number: {word}"))?;
        titles.push(title);
    }
    Ok(titles)
}

fn build_programs(
    titles: &[String],
    episodes: &[String],
) -> Result<Vec<ProgramTags>, Box<dyn std::error::Error>> {
    if titles.iter().any(|title| title.trim().is_empty()) {
        return Err("titles must not be empty".into());
    }
    if !episodes.is_empty() && episodes.len() != titles.len() {
        return Err(format!(
            "got {} title(s), but {} episode ID(s)",
            titles.len(),
            episodes.len()
        )
        .into());
    }

    Ok(titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let program = ProgramTags::new(title.trim());
            match episodes.get(i) {
                Some(episode) => program.with_episode(episode.trim()),
                None => program,
            }
        })
        .collect())
}

/// Cancel `token` on the first Ctrl-C; exit on the second.
fn install_interrupt_handler(token: CancellationToken) -> Result<(), Box<dyn std::error::Error>> {
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(130);
        }
        log::warn!("Interrupted, stopping once the running tool exits");
        token.cancel();
    })?;
    Ok(())
}

fn build_options(
    global: &GlobalOptions,
    cancellation: CancellationToken,
) -> Result<RipOptions, Box<dyn std::error::Error>> {
    let defaults = ToolPaths::default();
    let tools = ToolPaths {
        lsdvd: global.lsdvd.clone().unwrap_or(defaults.lsdvd),
        mplayer: global.mplayer.clone().unwrap_or(defaults.mplayer),
        ffmpeg: global.ffmpeg.clone().unwrap_or(defaults.ffmpeg),
    };
    let mut options = RipOptions::new()
        .with_tools(tools)
        .with_cancellation(cancellation);

    if let Some(device) = &global.device {
        options = options.with_device(device);
    }
    if let Some(dir) = &global.work_dir {
        options = options.with_work_dir(dir);
    }
    if let Some(dir) = &global.output_dir {
        options = options.with_output_dir(dir);
    }
    if let Some(dir) = &global.artifact_dir {
        options = options.with_artifact_dir(dir);
    }
    if let Some(attempts) = global.max_attempts {
        if attempts == 0 {
            return Err("--max-attempts must be greater than 0".into());
        }
        options = options.with_max_attempts(attempts);
    }
    if let Some(ext) = &global.ext {
        options = options.with_extension(ext.clone());
    }
    if let Some(policy) = &global.unknown_language {
        let parsed = parse_unknown_language(policy)
            .ok_or(format!("unsupported --unknown-language: {policy}"))?;
        options = options.with_unknown_language(parsed);
    }
    if global.progress {
        options = options.with_progress(Arc::new(TerminalProgress::new()?));
    }

    Ok(options)
}

fn confirm_titles(defaults: Vec<u32>) -> Result<Vec<u32>, Box<dyn std::error::Error>> {
    let listed = defaults
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("\n{} {}\n", "Default titles:".green().bold(), listed);
    println!("Enter to continue, type new title numbers, or Ctrl-C.");

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    if line.trim().is_empty() {
        Ok(defaults)
    } else {
        parse_track_list(&line)
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    let cancellation = CancellationToken::new();
    install_interrupt_handler(cancellation.clone())?;

    match cli.command {
        Commands::Rip {
            title,
            episodes,
            show,
            year,
            tracks,
            yes,
        } => {
            let programs = build_programs(&title, &episodes)?;
            let run = RunTags { show, year };
            let ripper = Ripper::new(build_options(&cli.global, cancellation)?);

            let titles = if tracks.is_empty() {
                let defaults = ripper.default_titles(programs.len())?;
                if yes {
                    defaults
                } else {
                    confirm_titles(defaults)?
                }
            } else {
                tracks
            };

            let result = ripper.rip_titles(&titles, &programs, &run);
            if let Some(bar) = ACTIVE_BAR.get() {
                bar.finish_and_clear();
            }

            for ripped in result? {
                println!(
                    "{} title {} -> {}",
                    "saved".green().bold(),
                    ripped.title,
                    ripped.output.display()
                );
            }
            println!("{}", "See You Space Cowboy".green());
        }
        Commands::Toc { count, json } => {
            let ripper = Ripper::new(build_options(&cli.global, cancellation)?);
            let entries = ripper.list_titles()?;
            let selected: Vec<u32> = match count {
                Some(count) => toc::select_entries(entries.clone(), count)?
                    .into_iter()
                    .map(|entry| entry.index)
                    .collect(),
                None => Vec::new(),
            };

            if json {
                let payload: Vec<_> = entries
                    .iter()
                    .map(|entry| {
                        json!({
                            "title": entry.index,
                            "duration_seconds": entry.duration_seconds(),
                            "selected": selected.contains(&entry.index),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for entry in &entries {
                    let seconds = entry.duration.as_secs();
                    let line = format!(
                        "Title {:>2}  {:02}:{:02}:{:02}",
                        entry.index,
                        seconds / 3600,
                        (seconds / 60) % 60,
                        seconds % 60
                    );
                    if selected.contains(&entry.index) {
                        println!("{} {}", line.green().bold(), "*".green());
                    } else {
                        println!("{line}");
                    }
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "dvdrip", &mut io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GlobalOptions, build_options, build_programs, parse_track_list, parse_unknown_language,
    };
    use dvdrip::{CancellationToken, UnknownLanguagePolicy};

    #[test]
    fn build_options_attaches_cancellation() {
        let token = CancellationToken::new();
        let options = build_options(&GlobalOptions::default(), token).unwrap();
        assert!(format!("{options:?}").contains("has_cancellation: true"));
    }

    #[test]
    fn build_options_rejects_zero_attempts() {
        let global = GlobalOptions {
            max_attempts: Some(0),
            ..GlobalOptions::default()
        };
        assert!(build_options(&global, CancellationToken::new()).is_err());
    }

    #[test]
    fn parse_unknown_language_values() {
        assert_eq!(
            parse_unknown_language("reject"),
            Some(UnknownLanguagePolicy::Reject)
        );
        assert_eq!(
            parse_unknown_language("FRA"),
            Some(UnknownLanguagePolicy::Substitute("fra".to_string()))
        );
        assert!(parse_unknown_language("fr").is_none());
        assert!(parse_unknown_language("english").is_none());
    }

    #[test]
    fn parse_track_list_numbers() {
        assert_eq!(parse_track_list(" 3 4  7\n").unwrap(), vec![3, 4, 7]);
        assert!(parse_track_list("3 four").is_err());
    }

    #[test]
    fn build_programs_pairs_titles_and_episodes() {
        let titles = vec!["Pilot".to_string(), "Second".to_string()];
        let episodes = vec!["S01E01".to_string(), "".to_string()];
        let programs = build_programs(&titles, &episodes).unwrap();
        assert_eq!(programs[0].episode_id.as_deref(), Some("S01E01"));
        assert_eq!(programs[1].episode_id, None);
    }

    #[test]
    fn build_programs_rejects_count_mismatch() {
        let titles = vec!["Pilot".to_string(), "Second".to_string()];
        let episodes = vec!["S01E01".to_string()];
        let error = build_programs(&titles, &episodes).unwrap_err();
        assert!(error.to_string().contains("episode ID"));
    }

    #[test]
    fn build_programs_without_episodes() {
        let titles = vec!["Alien".to_string()];
        let programs = build_programs(&titles, &[]).unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].episode_id, None);
    }
}
