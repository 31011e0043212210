//! CLI argument definitions using clap
//!
//! The derive-generated command tree is the command registry: categories are
//! subcommand enums, (category, command) uniqueness is enforced by the
//! variants, and `list-commands` walks the same tree without invoking any
//! handler.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

/// Terminal utility aggregator: system monitoring, network checks, file operations, and text utilities
#[derive(Parser, Debug)]
#[command(name = "termkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase debug output (-d info, -dd debug, -ddd trace)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ~/.config/termkit/termkit.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// System monitoring and information
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },

    /// Network utilities and diagnostics
    Network {
        #[command(subcommand)]
        command: NetworkCommands,
    },

    /// File operations and management
    Filelab {
        #[command(subcommand)]
        command: FilelabCommands,
    },

    /// General-purpose utilities
    Utils {
        #[command(subcommand)]
        command: UtilsCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version and host information
    Info,

    /// Enumerate all registered commands
    ListCommands,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Sample CPU usage
    Cpu {
        /// Seconds between readings
        #[arg(long, default_value_t = 1)]
        interval: u64,

        /// Number of readings to take
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },

    /// Show RAM and swap usage
    Memory,

    /// List top processes by resource usage
    Processes {
        /// Number of processes to display
        #[arg(long, default_value_t = 10, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        limit: usize,

        /// Sort key
        #[arg(long, value_enum, default_value = "memory")]
        sort_by: ProcessSort,
    },

    /// Show disk usage per partition
    Disk {
        /// Extra path to report on
        #[arg(long, default_value = "/", value_hint = ValueHint::DirPath)]
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum NetworkCommands {
    /// Show your public IP address
    Ip,

    /// Check HTTP status of a URL
    HttpCheck {
        /// URL to check (scheme defaults to https)
        url: String,

        /// HTTP method
        #[arg(long, value_enum, default_value = "get")]
        method: HttpMethod,
    },

    /// TCP connect scan of a port range
    PortScan {
        /// Host to scan (IP or hostname)
        host: String,

        /// First port of the range
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        start_port: u16,

        /// Last port of the range
        #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u16).range(1..))]
        end_port: u16,

        /// Connection timeout in milliseconds
        #[arg(long, default_value_t = 500)]
        timeout_ms: u64,
    },

    /// TCP reachability probe (connects to port 80)
    Ping {
        /// Host to probe
        host: String,

        /// Number of attempts
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum FilelabCommands {
    /// Bulk rename files (preview unless --apply)
    Rename {
        /// Directory containing the files
        #[arg(value_hint = ValueHint::DirPath)]
        directory: PathBuf,

        /// Only files whose name contains this substring
        #[arg(long)]
        pattern: Option<String>,

        /// Prefix to add
        #[arg(long)]
        prefix: Option<String>,

        /// Suffix to add (inserted before the extension)
        #[arg(long)]
        suffix: Option<String>,

        /// Text to replace
        #[arg(long)]
        replace_from: Option<String>,

        /// Replacement text
        #[arg(long, requires = "replace_from")]
        replace_to: Option<String>,

        /// Perform the renames instead of previewing
        #[arg(long)]
        apply: bool,
    },

    /// Show metadata for a file or the files of a directory
    Metadata {
        /// File or directory path
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },

    /// Render a directory tree
    Tree {
        /// Directory to visualize
        #[arg(default_value = ".", value_hint = ValueHint::DirPath)]
        directory: PathBuf,

        /// Maximum depth to traverse
        #[arg(long, default_value_t = 3, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        max_depth: usize,

        /// Show hidden files
        #[arg(long)]
        show_hidden: bool,
    },

    /// Search files by name, extension, and size
    Search {
        /// Directory to search
        #[arg(default_value = ".", value_hint = ValueHint::DirPath)]
        directory: PathBuf,

        /// Substring of the filename (case-insensitive)
        #[arg(long)]
        name: Option<String>,

        /// File extension filter (with or without leading dot)
        #[arg(long)]
        extension: Option<String>,

        /// Minimum file size in bytes
        #[arg(long)]
        min_size: Option<u64>,

        /// Maximum file size in bytes
        #[arg(long)]
        max_size: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UtilsCommands {
    /// Convert an amount between currencies using live rates
    Currency {
        /// Amount to convert
        amount: f64,

        /// Source currency code (e.g. USD)
        from: String,

        /// Target currency code (e.g. EUR)
        to: String,
    },

    /// Generate secure random passwords
    Password {
        /// Password length (default from settings)
        #[arg(long)]
        length: Option<u16>,

        /// Number of passwords to generate
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: u32,

        /// Exclude special characters
        #[arg(long)]
        no_special: bool,

        /// Exclude numbers
        #[arg(long)]
        no_numbers: bool,

        /// Exclude uppercase letters
        #[arg(long)]
        no_uppercase: bool,
    },

    /// Render markdown to the terminal
    Markdown {
        /// Markdown file to render
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,

        /// Markdown text to render directly
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
    },

    /// Encode or decode base64
    Base64 {
        /// Text to encode or decode
        text: String,

        /// Decode instead of encode
        #[arg(long)]
        decode: bool,
    },

    /// Hash text with a chosen algorithm
    Hash {
        /// Text to hash
        text: String,

        /// Hash algorithm
        #[arg(long, value_enum, default_value = "sha256")]
        algorithm: HashAlgorithm,
    },

    /// Generate random (v4) UUIDs
    Uuid {
        /// Number of UUIDs to generate
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings as TOML
    Show,

    /// Show config file locations
    Path,

    /// Write a commented config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessSort {
    Memory,
    Cpu,
    Name,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Head => "HEAD",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Algorithms kept for interoperability but unsuitable for security use.
    pub fn is_weak(&self) -> bool {
        matches!(self, HashAlgorithm::Md5 | HashAlgorithm::Sha1)
    }
}
