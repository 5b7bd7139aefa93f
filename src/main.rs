#![allow(clippy::print_stderr)]
#![allow(clippy::exhaustive_enums)]
#![allow(clippy::exhaustive_structs)]
#![allow(clippy::struct_excessive_bools)]

use clap::{ArgAction, CommandFactory, Parser, ValueEnum, ValueHint, value_parser};
use clap_complete::aot::{Shell, generate};
use std::{
    io::{self, stdout},
    path::PathBuf,
    process::ExitCode,
};
use storefind::{
    Finder, StorageConfig, Store,
    filters::{DateExpressionParser, EntryKindParser, SizeExpressionParser},
    fs::{EntryKind, LocalStorage},
    util::PrinterBuilder,
};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STOREFIND_LOG";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortKey {
    Name,
    Size,
    Date,
    Extension,
}

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"), about = "Find and filter files in a storage directory")]
pub struct Args {
    #[arg(
        value_name = "PATH",
        help = "Directory to list, relative to the storage root (defaults to the root)",
        index = 1
    )]
    path: Option<String>,

    #[arg(
        short = 'C',
        long = "root",
        value_hint = ValueHint::DirPath,
        help = "Storage root directory, overrides base_path from --config (defaults to .)"
    )]
    root: Option<PathBuf>,

    #[arg(
        long = "config",
        value_hint = ValueHint::FilePath,
        help = "TOML file with base_path, visibility and directory_visibility"
    )]
    config: Option<PathBuf>,

    #[arg(short = 'r', long = "recursive", help = "List everything below PATH\n")]
    recursive: bool,

    #[arg(
        short = 't',
        long = "type",
        value_parser = EntryKindParser,
        help = "Only keep files (f) or directories (d)"
    )]
    kind: Option<EntryKind>,

    #[arg(
        short = 'o',
        long = "only",
        value_delimiter = ',',
        help = "Only keep these extensions, eg -o txt,php"
    )]
    only: Vec<String>,

    #[arg(
        short = 'x',
        long = "except",
        value_delimiter = ',',
        help = "Drop these extensions, eg -x log"
    )]
    except: Vec<String>,

    #[arg(
        short = 's',
        long = "size",
        value_parser = SizeExpressionParser,
        help = "Size predicate, repeatable, eg -s '< 25' -s '>= 1k' (needs -t f)"
    )]
    sizes: Vec<String>,

    #[arg(
        short = 'd',
        long = "date",
        value_parser = DateExpressionParser,
        help = "Date predicate, repeatable, eg -d 'after 2021-01-01' -d '> 3 days'"
    )]
    dates: Vec<String>,

    #[arg(long = "sort", value_enum, help = "Sort the results")]
    sort: Option<SortKey>,

    #[arg(long = "reverse", requires = "sort", help = "Sort in descending order")]
    reverse: bool,

    #[arg(
        short = 'l',
        long = "long",
        help = "Show visibility, size, modification time and MIME type"
    )]
    long: bool,

    #[arg(
        short = 'n',
        long = "max-results",
        help = "Print at most N results"
    )]
    top_n: Option<usize>,

    #[arg(short = '0', long = "print0", help = "Separate results with NUL instead of newline")]
    null_terminated: bool,

    #[arg(long = "no-colour", visible_alias = "no-color", help = "Disable coloured output")]
    no_colour: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help = "Log more (repeatable), STOREFIND_LOG overrides"
    )]
    verbose: u8,

    #[arg(
        long = "generate",
        action = ArgAction::Set,
        value_parser = value_parser!(Shell),
        help = "Generate shell completions"
    )]
    generate: Option<Shell>,
}

fn setup_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_store(args: &Args) -> storefind::Result<Store<LocalStorage>> {
    let mut config = match &args.config {
        Some(path) => StorageConfig::load(path)?,
        None => StorageConfig::default(),
    };
    if let Some(root) = &args.root {
        config = StorageConfig::new(root)
            .with_visibility(config.visibility())
            .with_directory_visibility(config.directory_visibility());
    }
    Store::local(config)
}

fn run(args: &Args) -> storefind::Result<()> {
    let store = build_store(args)?;

    let mut finder = Finder::new(store.storage())
        .within(args.path.clone().unwrap_or_default())
        .recursive(args.recursive)
        .only(args.only.clone())
        .except(args.except.clone())
        .size(args.sizes.clone())
        .date(args.dates.clone());
    finder = match args.kind {
        Some(EntryKind::File) => finder.files(),
        Some(EntryKind::Directory) => finder.directories(),
        None => finder,
    };

    finder.get()?;
    tracing::info!(count = finder.count(), "search finished");

    if let Some(key) = args.sort {
        match key {
            SortKey::Name => finder.sort_by_name(args.reverse),
            SortKey::Size => finder.sort_by_size(args.reverse),
            SortKey::Date => finder.sort_by_date(args.reverse),
            SortKey::Extension => finder.sort_by_extension(args.reverse),
        };
    }

    let printed = PrinterBuilder::new(finder.iter())
        .limit(args.top_n)
        .nocolour(args.no_colour)
        .long(args.long)
        .null_terminated(args.null_terminated)
        .print();
    // the reader going away (eg `| head`) is not a failure
    if let Err(err) = printed
        && err.kind() != io::ErrorKind::BrokenPipe
    {
        tracing::error!("failed to write results: {err}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(generator) = args.generate {
        let mut cmd = Args::command();
        let cmd_clone = cmd.clone();
        generate(
            generator,
            &mut cmd,
            cmd_clone.get_name().to_owned(),
            &mut stdout(),
        );
        return ExitCode::SUCCESS;
    }

    setup_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("storefind: {err}");
            ExitCode::FAILURE
        }
    }
}
