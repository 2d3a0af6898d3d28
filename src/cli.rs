use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scsfs")]
#[command(version)]
#[command(about = "Browse SCS game archives and decode map sectors", long_about = None)]
#[command(after_help = "Examples:\n  \
  scsfs -s base.scs -s def.scs ls def/country        list a merged directory\n  \
  scsfs -s ~/ets2 cat def/city.sii | less             print a file from every archive in a directory\n  \
  scsfs -s base.scs sector map/europe/sec+0000+0000.base\n  \
  scsfs hash def/world/road_look.template.sii")]
pub struct Cli {
    /// Archive file or directory of archives to mount, in load order
    #[arg(short = 's', long = "source", value_name = "PATH")]
    pub sources: Vec<PathBuf>,

    /// Verbose logging (-vv => debug, -vvv => trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List a directory of the merged namespace
    Ls {
        /// Directory path (empty for the root)
        #[arg(value_name = "DIR", default_value = "")]
        dir: String,

        /// Only list files whose name contains this text
        #[arg(short = 'f', long)]
        filter: Option<String>,
    },

    /// Write a file's contents to stdout or a file
    Cat {
        #[arg(value_name = "FILE")]
        path: String,

        /// Write to this file instead of stdout
        #[arg(short = 'o', long = "output", value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Decode a map sector file and summarize its items
    Sector {
        #[arg(value_name = "FILE")]
        path: String,
    },

    /// Print the hash of a path
    Hash {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// List mounted archives and their formats
    Archives,
}

impl Cli {
    /// Log level filter implied by the `-v` count
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    /// Whether the command reads from mounted archives
    pub fn needs_sources(&self) -> bool {
        !matches!(self.command, Command::Hash { .. })
    }
}
