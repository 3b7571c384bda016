use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use slotfs::shell::{Shell, ShellConfig};
use slotfs::{image, Session};

#[derive(Parser, Debug)]
#[command(author, version, about = "Single-file virtual volume with a flat file table.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a zero-filled volume image
    Allocate {
        volume: PathBuf,
        /// Image size in bytes
        size: u64,
    },
    /// Delete a volume image
    Deallocate { volume: PathBuf },
    /// Erase a volume image, keeping its size
    Truncate { volume: PathBuf },
    /// Print the image as hex
    Dump { volume: PathBuf },
    /// Mount a volume and start the command shell
    Mount { volume: PathBuf },
}

fn run(cli: Cli) -> slotfs::Result<()> {
    match cli.command {
        Commands::Allocate { volume, size } => image::allocate(volume, size),
        Commands::Deallocate { volume } => image::deallocate(volume),
        Commands::Truncate { volume } => image::truncate(volume),
        Commands::Dump { volume } => {
            let mut out = io::stdout().lock();
            image::dump(&volume, &mut out)?;
            writeln!(out)?;
            Ok(())
        }
        Commands::Mount { volume } => {
            let mut session = Session::new();
            session.mount(&volume)?;
            println!("Volume {} has been mounted.", volume.display());
            let mut shell = Shell::new(session, ShellConfig::default());
            shell.run(io::stdin().lock(), &mut io::stdout().lock())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
