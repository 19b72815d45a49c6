//! docling-converter CLI - PDF to Markdown with table structure recognition

mod logging;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docling_converter::{
    default_output_path, resource_path, validate_pdf_file, CleanupPreset, ConversionEvent,
    ConversionSession, ConvertOptions, ErrorMode, PageSelection, ParseOptions, PdfParser,
    RenderOptions, DEFAULT_CHUNK_SIZE,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "docling-converter")]
#[command(version)]
#[command(
    about = "Convert PDF documents to Markdown, with fast or accurate table recognition",
    long_about = None
)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    flags: ConvertFlags,

    /// Log file, appended to on every run
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "DOCLING_CONVERTER_LOG_FILE",
        default_value = "converter.log"
    )]
    log_file: PathBuf,

    /// Log to stderr only
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF to Markdown
    #[command(alias = "md")]
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        flags: ConvertFlags,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct ConvertFlags {
    /// Output file (defaults to the input name with a .md extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the Markdown instead of saving it
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Accurate table recognition (slower)
    #[arg(short, long, env = "DOCLING_CONVERTER_ACCURATE")]
    accurate: bool,

    /// Disable table structure recognition
    #[arg(long)]
    no_tables: bool,

    /// Include YAML frontmatter
    #[arg(short, long)]
    frontmatter: bool,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Text cleanup preset
    #[arg(long, value_enum)]
    cleanup: Option<CleanupLevel>,

    /// Maximum heading level (1-6)
    #[arg(long, default_value = "6")]
    max_heading: u8,

    /// Analyze pages on a single thread
    #[arg(long)]
    sequential: bool,

    /// Fail on the first unreadable page instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Write chunk size in bytes when saving
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

impl ConvertFlags {
    /// Everything but the table mode, which the session owns.
    fn to_options(&self) -> CliResult<ConvertOptions> {
        let pages = match self.pages.as_deref() {
            Some(p) => PageSelection::parse(p)?,
            None => PageSelection::All,
        };

        let error_mode = if self.strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        };
        let parse = ParseOptions::new()
            .with_error_mode(error_mode)
            .with_parallel(!self.sequential);

        let mut render = RenderOptions::new()
            .with_frontmatter(self.frontmatter)
            .with_max_heading(self.max_heading);
        if let Some(level) = self.cleanup {
            render = render.with_cleanup_preset(level.into());
        }

        Ok(ConvertOptions::new()
            .with_parse_options(parse)
            .with_render_options(render)
            .with_table_structure(!self.no_tables)
            .with_pages(pages)
            .with_chunk_size(self.chunk_size))
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Unicode normalization and whitespace only
    Minimal,
    /// Also fixes ligatures and hyphenation, drops page numbers
    Standard,
    /// Also strips private-use characters and blank-line runs
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    if let Err(e) = logging::init(log_file) {
        eprintln!(
            "{}: cannot open log file {}: {}",
            "Warning".yellow().bold(),
            cli.log_file.display(),
            e
        );
    }

    let result = match cli.command {
        Some(Commands::Convert { input, flags }) => cmd_convert(&input, &flags),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_convert(&input, &cli.flags)
            } else {
                println!("{}", "Usage: docling-converter <FILE> [OPTIONS]".yellow());
                println!("       docling-converter --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(input: &Path, flags: &ConvertFlags) -> CliResult<()> {
    let mut session = ConversionSession::new(flags.to_options()?);
    session.set_accurate_mode(flags.accurate);
    log::debug!(
        "Table mode: {}",
        if session.accurate_mode() { "accurate" } else { "fast" }
    );

    let mut job = session.select_pdf(input)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(session.status().to_string());
    pb.enable_steady_tick(POLL_INTERVAL);
    let _quiet_logs = logging::suspend_progress(&pb);

    let event = loop {
        if let Some(event) = job.wait_timeout(POLL_INTERVAL) {
            break event;
        }
    };

    let failure = match &event {
        ConversionEvent::Failed(message) => Some(message.clone()),
        ConversionEvent::Completed(_) => None,
    };
    session.apply(event);
    if let Some(message) = failure {
        pb.finish_and_clear();
        return Err(message.into());
    }
    pb.finish_with_message(session.status().green().to_string());

    if flags.stdout {
        if let Some(content) = session.content() {
            println!("{}", content);
        }
        return Ok(());
    }

    let target = flags
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    let written = session.save(&target)?;
    println!("{} {}", session.status().green(), written.display());

    if let Some(stats) = session.stats() {
        println!(
            "  {} {} pages, {} headings, {} tables, {} words",
            "└─".dimmed(),
            stats.page_count,
            stats.heading_count,
            stats.table_count,
            stats.word_count
        );
    }
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> CliResult<()> {
    validate_pdf_file(input)?;

    // Lenient so metadata still shows when some pages cannot be read
    let parser = PdfParser::open_with_options(input, ParseOptions::new().lenient())?;
    let doc = parser.parse()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc.metadata)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if doc.metadata.encrypted { "Yes" } else { "No" }
    );

    let fields = [
        ("Title", &doc.metadata.title),
        ("Author", &doc.metadata.author),
        ("Subject", &doc.metadata.subject),
        ("Creator", &doc.metadata.creator),
        ("Producer", &doc.metadata.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label.bold(), value);
        }
    }
    if let Some(created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());
    println!("{}: {}", "Tables".bold(), doc.table_count());
    if let Some(ref outline) = doc.outline {
        println!("{}: {}", "Bookmarks".bold(), outline.total_items());
    }
    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "docling-converter".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("PDF to Markdown converter with table structure recognition");
    println!();
    println!("Resources: {}", resource_path().display());
    println!("License: MIT");
}
