use clap::Parser;

use crate::zip::{DEFAULT_MAX_DECOMPRESSED_SIZE, ScanConfig};

#[derive(Parser, Debug)]
#[command(name = "scanzip")]
#[command(version)]
#[command(about = "Extract ZIP archives by walking their local file headers", long_about = None)]
#[command(after_help = "Examples:\n  \
  scanzip data1.zip -x joe          extract all files except joe from data1.zip\n  \
  scanzip -p foo.zip | more         send contents of foo.zip via pipe into more\n  \
  scanzip --paranoid -v broken.zip  list a zip whose central directory is damaged")]
pub struct Cli {
    /// ZIP file path
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Files to extract (default: all); `*` and `?` wildcards allowed
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Fail on bad timestamps, empty names and a missing central directory
    #[arg(long)]
    pub strict: bool,

    /// Verify size and CRC-32 of every entry before writing it
    #[arg(long)]
    pub paranoid: bool,

    /// Largest entry paranoid mode will inflate, in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_DECOMPRESSED_SIZE)]
    pub max_size: u64,

    /// Number of entries extracted in parallel
    #[arg(long, value_name = "N", default_value_t = 4)]
    pub jobs: usize,

    /// Show scanner diagnostics
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Scanner policy selected on the command line.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_strict(self.strict)
            .with_paranoid(self.paranoid || self.strict)
            .with_max_decompressed_size(self.max_size)
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.is_very_quiet() {
            "error"
        } else {
            "warn"
        }
    }
}
