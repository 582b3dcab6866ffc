mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "porter")]
#[command(version, about = "Batch front end for the document conversion service")]
pub struct Args {
    /// Files to convert.
    pub files: Vec<PathBuf>,

    /// Target format: markdown, text, pdf, docx or xlsx.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Conversion server base URL (overrides the config file).
    #[arg(long)]
    pub server: Option<String>,

    /// Directory converted files are written to (overrides the config file).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Path to the RON configuration file.
    #[arg(long, default_value = "porter.ron")]
    pub config: PathBuf,

    /// Write a default configuration file and exit.
    #[arg(long)]
    pub init_config: bool,

    /// List the target formats available for the selected files and exit.
    #[arg(long)]
    pub list_formats: bool,

    /// Probe the conversion server and exit.
    #[arg(long)]
    pub check: bool,

    /// Also write logs to ./porter.log.
    #[arg(long)]
    pub log_file: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    platform::run_app(args)
}
