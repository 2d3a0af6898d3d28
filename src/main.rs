//! Main entry point for the scsfs CLI application.
//!
//! Mounts the given archives in order and runs one command against the
//! merged namespace.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use scsfs::cli::{Cli, Command};
use scsfs::hash::{hash_path, normalize_path};
use scsfs::{FileSystem, decode_sector};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if let Command::Hash { path } = &cli.command {
        println!("{:016x}  {}", hash_path(path), normalize_path(path));
        return Ok(());
    }

    if cli.needs_sources() && cli.sources.is_empty() {
        bail!("no archives to read; pass at least one --source");
    }

    let mut fs = FileSystem::new();
    for source in &cli.sources {
        fs.mount(source)
            .with_context(|| format!("Failed to mount {}", source.display()))?;
    }

    let result = run(&fs, &cli.command);
    fs.close_archives();
    result
}

/// Dispatch a command against the mounted namespace
fn run(fs: &FileSystem, command: &Command) -> Result<()> {
    match command {
        Command::Ls { dir, filter } => list_dir(fs, dir, filter.as_deref()),
        Command::Cat { path, output } => {
            let data = read_required(fs, path)?;
            match output {
                Some(out) => write_output(out, &data),
                None => {
                    let mut stdout = io::stdout().lock();
                    stdout.write_all(&data)?;
                    stdout.flush()?;
                    Ok(())
                }
            }
        }
        Command::Sector { path } => print_sector(fs, path),
        Command::Archives => {
            for (handle, kind) in fs.archives() {
                let size = handle.size().map(format_size).unwrap_or_default();
                println!("{:<18} {:>12}  {}", kind.name(), size, handle.name());
            }
            println!(
                "{} archives, {} directories, {} files",
                fs.archives().len(),
                fs.dir_count(),
                fs.file_count()
            );
            Ok(())
        }
        Command::Hash { .. } => Ok(()),
    }
}

fn list_dir(fs: &FileSystem, dir: &str, filter: Option<&str>) -> Result<()> {
    let Some(entry) = fs.get_dir(dir) else {
        bail!("directory '{}' not found", normalize_path(dir));
    };

    if let Some(filter) = filter {
        for file in fs.get_files_in_dir(dir, filter) {
            println!(
                "{:>10}  {}",
                format_size(file.size()),
                file.path().unwrap_or_default()
            );
        }
        return Ok(());
    }

    for subdir in entry.subdirs() {
        println!("{:>10}  {subdir}/", "");
    }
    for file in fs.get_files_in_dir(dir, "") {
        let name = file
            .path()
            .and_then(|p| p.rsplit('/').next())
            .unwrap_or_default();
        println!("{:>10}  {name}", format_size(file.size()));
    }
    log::debug!("'{}' merged from: {}", normalize_path(dir), entry.sources().join(", "));
    Ok(())
}

fn print_sector(fs: &FileSystem, path: &str) -> Result<()> {
    let data = read_required(fs, path)?;
    let sector = decode_sector(&data).with_context(|| format!("Failed to decode sector {path}"))?;

    let game_id = String::from_utf8_lossy(&sector.header.game_id);
    println!(
        "version {}, map version {}, game '{}'",
        sector.header.version,
        sector.header.map_version,
        game_id.trim_end_matches('\0')
    );
    println!("{} items:", sector.header.item_count);
    for (item_type, count) in &sector.item_counts {
        println!("  {count:>6}  {} ({})", item_type.name(), item_type.tag());
    }

    println!("Roads:");
    for road in sector.roads() {
        println!(
            "  {:016x} -> {:016x}  {:.2}",
            road.start_node_uid, road.end_node_uid, road.length
        );
    }
    println!("{} nodes", sector.node_count);
    Ok(())
}

fn read_required(fs: &FileSystem, path: &str) -> Result<Vec<u8>> {
    match fs.read_file(path).with_context(|| format!("Failed to read {path}"))? {
        Some(data) => Ok(data),
        None => bail!("file '{}' not found", normalize_path(path)),
    }
}

fn write_output(out: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(out, data).with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(())
}

/// Format a byte size into a human-readable string.
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
