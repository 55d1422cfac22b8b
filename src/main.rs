use abiv2fuzz::{Config, Contract, Error, Parse};
use clap::Parser;
use microxdg::{Xdg, XdgError};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const HISTFILE: &'static str = "abiv2fuzz.history";

/// Generate self-checking ABI v2 round-trip programs from input trees.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Input tree in text notation, `-` for stdin. Starts a REPL when omitted.
    file: Option<PathBuf>,

    /// Version constraint for `pragma solidity`.
    #[arg(long, default_value = ">=0.0")]
    pragma: String,

    /// Longest static array dimension that is still expanded.
    #[arg(long, default_value_t = 4)]
    max_static_length: u64,

    /// Log skipped nodes and array expansion.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let config = Config::default()
        .with_pragma(cli.pragma)
        .with_max_static_length(cli.max_static_length);
    debug!(?config, "configured");

    match cli.file {
        Some(path) => {
            let src = read_input(path)?;
            let contract = Contract::parse(&src).into_result().map_err(Error::syntax)?;
            println!("{}", contract.to_solidity(&config));
            Ok(())
        }
        None => repl(&config),
    }
}

fn read_input(path: PathBuf) -> Result<String, Error> {
    if path.as_os_str() == "-" {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        Ok(src)
    } else {
        fs::read_to_string(&path).map_err(|source| Error::Read { path, source })
    }
}

fn repl(config: &Config) -> Result<(), Error> {
    let mut rl = DefaultEditor::new()?;

    let history = history_path();
    if let Some(history) = &history {
        rl.load_history(history).ok();
    }

    loop {
        let readline = rl.readline("> ");
        match readline {
            Ok(line) => match Contract::parse(line.as_str()).into_result() {
                Ok(contract) => {
                    rl.add_history_entry(line.as_str())?;
                    println!("{}", contract.to_solidity(config));
                }
                Err(errors) => println!("{}", Error::syntax(errors)),
            },
            Err(ReadlineError::Interrupted) => {
                println!("Ctrl-C pressed. Exiting.");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("Ctrl-D pressed. Exiting.");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(history) = &history {
        rl.save_history(history).ok();
    }

    Ok(())
}

/// History file in the XDG state directory, created on demand.
fn history_path() -> Option<PathBuf> {
    let mut state = get_xdg_state_dir().ok()?;
    state.push("abiv2fuzz");
    fs::create_dir_all(&state).ok()?;
    state.push(HISTFILE);
    Some(state)
}

fn get_xdg_state_dir() -> Result<PathBuf, XdgError> {
    let xdg = Xdg::new()?;
    let state_dir = xdg.state()?;
    Ok(state_dir)
}
