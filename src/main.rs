//! Main entry point for the scanzip CLI application.
//!
//! Lists or extracts a ZIP archive by walking its local file headers, so
//! archives with a missing or damaged central directory can still be read.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use scanzip::zip::sanitized_path;
use scanzip::{Cli, ZipEntry, ZipExtractor};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging, and dispatches to list,
/// pipe or extract mode.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    let extractor = ZipExtractor::new(&cli.file, cli.scan_config());
    log::debug!(
        "Reading {} with {:?}",
        extractor.path().display(),
        extractor.config()
    );

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        return list_files(&extractor, cli.verbose).await;
    }

    let entries = extractor.list_files().await?;
    let selected: Vec<ZipEntry> = entries
        .into_iter()
        .filter(|e| is_selected(e, &cli))
        .collect();

    if cli.pipe {
        // Keep archive order on stdout
        let show_names = selected.len() > 1;
        for entry in &selected {
            if show_names {
                use tokio::io::AsyncWriteExt;
                tokio::io::stdout()
                    .write_all(format!("--- {} ---\n", entry.name_lossy()).as_bytes())
                    .await?;
            }
            extractor.extract_to_stdout(entry).await?;
        }
        return Ok(());
    }

    extract_all(&extractor, selected, &cli).await
}

/// Decide whether an entry takes part in extraction.
///
/// Filters are applied in order:
/// - Directory entries are dropped unless the directory layout is preserved
/// - If FILES are given, the entry must match one of them
/// - Entries matching a `-x` pattern are excluded
///
/// # Arguments
///
/// * `entry` - The scanned local header
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `true` if the entry should be extracted.
fn is_selected(entry: &ZipEntry, cli: &Cli) -> bool {
    let name = entry.name_lossy();

    // Directories only matter when the full tree is recreated on disk
    if entry.is_dir() && (cli.pipe || cli.junk_paths || !cli.files.is_empty()) {
        return false;
    }

    // If specific files are requested via positional arguments,
    // only include entries that match
    if !cli.files.is_empty() {
        let basename = Path::new(&name)
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let wanted = cli.files.iter().any(|f| {
            if f.contains(['*', '?']) {
                // Pattern contains wildcards: use glob matching
                glob_match(f, &name)
            } else {
                // No wildcards: exact match on full path or basename
                *f == name || *f == basename
            }
        });
        if !wanted {
            return false;
        }
    }

    // Exclude files matching the -x patterns
    !cli
        .exclude
        .iter()
        .any(|x| name.contains(x.as_str()) || glob_match(x, &name))
}

/// List files in the archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Table with sizes, compression ratio, timestamp and CRC-32
///
/// # Arguments
///
/// * `extractor` - The ZIP extractor instance
/// * `verbose` - If true, display detailed information in table format
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the scan fails.
async fn list_files(extractor: &ZipExtractor, verbose: bool) -> Result<()> {
    let entries = extractor.list_files().await?;

    if !verbose {
        // Simple format: just the file name
        for entry in &entries {
            println!("{}", entry.name_lossy());
        }
        return Ok(());
    }

    // Print table header for verbose output
    println!("Archive:  {}", extractor.path().display());
    println!(
        "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  {:>8}  Name",
        "Length", "Size", "Cmpr", "Date", "Time", "CRC-32"
    );
    println!("{}", "-".repeat(70));

    // Track totals for summary line
    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        let modified = entry.modified();
        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {:08x}  {}",
            entry.uncompressed_size(),
            entry.compressed_size(),
            ratio(entry.compressed_size(), entry.uncompressed_size()),
            modified.year(),
            u8::from(modified.month()),
            modified.day(),
            modified.hour(),
            modified.minute(),
            entry.crc32(),
            entry.name_lossy()
        );

        // Accumulate totals (excluding directories)
        if !entry.is_dir() {
            total_uncompressed += entry.uncompressed_size();
            total_compressed += entry.compressed_size();
            file_count += 1;
        }
    }

    // Print summary line
    println!("{}", "-".repeat(70));
    println!(
        "{:>10}  {:>10}  {}  {:>31}  {} files",
        total_uncompressed,
        total_compressed,
        ratio(total_compressed, total_uncompressed),
        "",
        file_count
    );

    Ok(())
}

/// Space saved by compression, as a right-aligned percentage.
///
/// Entries that did not shrink report `0%`.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed == 0 || compressed >= uncompressed {
        return "  0%".to_string();
    }
    format!("{:>4}%", 100 - compressed * 100 / uncompressed)
}

/// Extract the selected entries, several at a time.
///
/// Handles the extraction options:
/// - Custom output directory (`-d`): Extract below the specified directory
/// - Junk paths (`-j`): Ignore directory structure in archive
/// - Overwrite control (`-n`, `-o`): Handle existing files
/// - Parallelism (`--jobs`): At most this many entries in flight
///
/// Each task opens its own handle onto the archive, so no two tasks share a
/// stream cursor.
///
/// # Arguments
///
/// * `extractor` - The ZIP extractor instance
/// * `entries` - Entries that passed [`is_selected`]
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` once every task has finished, or the first extraction
/// error.
async fn extract_all(extractor: &ZipExtractor, entries: Vec<ZipEntry>, cli: &Cli) -> Result<()> {
    let base = cli
        .extract_dir
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_default();
    let permits = Arc::new(Semaphore::new(cli.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for entry in entries {
        // Determine the output path, dropping anything that escapes `base`
        let relative = sanitized_path(&entry.name_lossy(), cli.junk_paths);
        if relative.as_os_str().is_empty() {
            log::warn!("Skipping entry with unusable name {:?}", entry.name_lossy());
            continue;
        }
        let output_path = base.join(relative);

        // Existing files are kept unless -o is given
        if !entry.is_dir() && output_path.exists() {
            if cli.never_overwrite {
                if !cli.is_quiet() {
                    eprintln!("Skipping: {} (file exists)", entry.name_lossy());
                }
                continue;
            }
            if !cli.overwrite {
                if !cli.is_quiet() {
                    eprintln!("Skipping: {} (use -o to overwrite)", entry.name_lossy());
                }
                continue;
            }
        }

        if !cli.is_quiet() {
            let action = if entry.is_dir() { "creating" } else { "extracting" };
            println!("{:>12}: {}", action, entry.name_lossy());
        }

        // Wait for a free slot before spawning
        let permit = permits.clone().acquire_owned().await?;
        let extractor = extractor.clone();
        tasks.spawn(async move {
            let _permit = permit;
            extractor
                .extract_to_file(&entry, &output_path)
                .await
                .with_context(|| format!("Failed to extract {}", entry.name_lossy()))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined??;
    }

    Ok(())
}

/// Simple glob pattern matching.
///
/// Supports:
/// - `*` matches any sequence of characters (including empty)
/// - `?` matches exactly one character
///
/// # Arguments
///
/// * `pattern` - The glob pattern
/// * `text` - The text to match against
///
/// # Returns
///
/// Returns `true` if the whole text matches the pattern.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last `*` and how much text it has swallowed so far
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    star = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
