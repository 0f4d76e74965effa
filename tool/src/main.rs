use std::{
    path::{Path, PathBuf},
    process,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, LevelFilter};
use nbt::io::Compression;
use nbt_tool::{CompileOptions, DumpOptions, Settings};
use nbt_util::logging;

/// Inspects and converts NBT files
#[derive(Parser)]
#[command(name = "nbt", version, about)]
struct Cli {
    /// Path of a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a binary NBT file as SNBT
    Dump {
        /// The binary NBT file
        file: PathBuf,
        /// Compression of the file: none, gzip or zlib (detected by default)
        #[arg(long)]
        compression: Option<Compression>,
        /// Spaces per indentation level
        #[arg(long)]
        indent: Option<u32>,
        /// Write legacy list indices
        #[arg(long)]
        legacy: bool,
    },
    /// Write an SNBT file as binary NBT
    Compile {
        /// The SNBT file
        snbt: PathBuf,
        /// The binary NBT file to create
        out: PathBuf,
        /// Compression of the output: none, gzip or zlib
        #[arg(long)]
        compression: Option<Compression>,
        /// Name of the root tag
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Print the examination string of a binary NBT file
    Examine {
        /// The binary NBT file
        file: PathBuf,
        /// Compression of the file: none, gzip or zlib (detected by default)
        #[arg(long)]
        compression: Option<Compression>,
    },
    /// Print the default configuration
    Config {
        /// Also write it to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        logging::DEFAULT_LEVEL
    };
    let logging_ready = match logging::init_logger("nbt", &cli.log_dir, level) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            false
        }
    };

    if let Err(e) = run(cli.command, cli.config.as_deref()) {
        if logging_ready {
            error!("{:#}", e);
        } else {
            eprintln!("{:#}", e);
        }
        process::exit(1);
    }
}

fn run(command: Commands, config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config)?;

    match command {
        Commands::Dump {
            file,
            compression,
            indent,
            legacy,
        } => {
            let options = DumpOptions {
                compression,
                indent,
                legacy,
            };
            println!("{}", nbt_tool::dump(&file, &options, &settings)?);
        }

        Commands::Compile {
            snbt,
            out,
            compression,
            name,
        } => {
            let options = CompileOptions { compression, name };
            nbt_tool::compile(&snbt, &out, &options, &settings)?;
        }

        Commands::Examine { file, compression } => {
            println!("{}", nbt_tool::examine(&file, compression, &settings)?);
        }

        Commands::Config { output } => {
            println!("{}", nbt_tool::write_default_config(output.as_ref())?);
        }
    }

    Ok(())
}
