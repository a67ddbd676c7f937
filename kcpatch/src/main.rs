use std::{
    io::{self, Write as _},
    path::PathBuf,
    process,
};

use anyhow::Context as _;
use clap::Parser;
use console::style;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kubecreds::{expand_tilde, finish, prepare, Mode, Settings, DEFAULT_CONFIG_PATH};

mod prompt;

/// Update one context's server, CA and credentials in a kubeconfig from a
/// pasted kubeconfig, leaving everything else alone.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// Path to kubeconfig file
    #[clap(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Try mode: do not update file, just print output
    #[clap(name = "try", long = "try")]
    try_run: bool,

    /// In try mode, also print a diff against the current file
    #[clap(long, requires = "try")]
    diff: bool,

    /// Read the pasted kubeconfig from FILE instead of opening an editor
    #[clap(long, value_name = "FILE")]
    from: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[clap(short, long, parse(from_occurrences))]
    verbose: u64,
}

impl Cli {
    fn settings(self) -> kubecreds::Result<Settings> {
        let mode = if self.try_run {
            Mode::Try { diff: self.diff }
        } else {
            Mode::Apply
        };
        Ok(Settings {
            config_path: expand_tilde(&self.config)?,
            mode,
            pasted_from: self.from,
        })
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{} {err:#}", style("error:").red().bold());
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings().context("Error resolving kubeconfig path")?;
    debug!(?settings, "starting");

    let patch = prepare(&settings, &mut prompt::Terminal::new())?;
    let mut stdout = io::stdout().lock();
    finish(&settings, &patch, &mut stdout)?;
    stdout.flush().context("Error flushing output")?;

    Ok(())
}

fn init_tracing(verbose: u64) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();
}
