use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for leadtui
#[derive(Parser, Debug)]
#[command(version, about = "leadtui")]
pub struct Args {
    /// Spreadsheet to open (.xlsx, .xls, .ods or .csv)
    pub path: Option<PathBuf>,

    /// Specify the delimiter to use when reading a CSV file
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Rows per table page (overrides the config file)
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Remove all saved profiles and exit
    #[arg(long = "clear-saved", action)]
    pub clear_saved: bool,

    /// Override the config directory (primarily for scripting and tests)
    #[arg(long = "config-dir")]
    pub config_dir: Option<PathBuf>,

    /// Override the data directory (primarily for scripting and tests)
    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,
}
