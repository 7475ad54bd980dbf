use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustyline::{error::ReadlineError, Editor};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use contelog::Session;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "contelog",
    about = "Contelog implementation with bottom-up semi-naive evaluation"
)]
struct Opt {
    /// Contelog program file. Starts an interactive session when omitted.
    #[structopt(parse(from_os_str))]
    file: Option<PathBuf>,
}

fn run_file(path: &Path) -> Result<()> {
    let code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read program file {}", path.display()))?;

    let mut session = Session::default();
    for error in session.load(&code)? {
        println!("{}", error);
    }

    if session.is_empty() {
        return Ok(());
    }

    print!("{}", session.evaluate());
    Ok(())
}

fn run_interactive() -> Result<()> {
    let mut editor = Editor::<()>::new();
    let mut session = Session::default();

    loop {
        let readline = editor.readline("contelog > ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str());

                match session.execute(&line) {
                    Ok(output) => print!("{}", output),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::from_args();
    match opt.file {
        Some(path) => run_file(&path),
        None => run_interactive(),
    }
}
