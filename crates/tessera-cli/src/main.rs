use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;

mod commands;
mod error;
mod graph;
mod io;

#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(about = "Lower front-end type graphs to machine-level types", long_about = None)]
struct Args {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Lower every type in a TOML type graph
    Lower {
        /// Type graph to lower
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Target triple (overrides the file's [target] table)
        #[arg(short, long, value_name = "TRIPLE")]
        target: Option<String>,
        /// Take the [target] table from this file instead
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Also print the Cranelift value type of each entry
        #[arg(long)]
        clif: bool,
    },

    /// Print the machine format chosen for `real`
    RealWidth {
        /// Target triple (defaults to the host)
        #[arg(short, long, value_name = "TRIPLE")]
        target: Option<String>,
        /// Read the [target] table from this file
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.command {
        Command::Lower { file, target, config, clif } => {
            commands::lower::handle_lower(file, target, config, clif)?
        }
        Command::RealWidth { target, config } => {
            commands::real_width::handle_real_width(target, config)?
        }
    }
    Ok(())
}
