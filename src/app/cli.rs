use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate VS Code C/C++ settings from a compilation database"
)]
pub struct Cli {
    /// Use a named preset from presets.toml (defaults to the project folder name)
    #[arg(long)]
    pub preset: Option<String>,

    /// Presets file to read instead of ~/.config/vscode_optimize/presets.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compilation database to read
    #[arg(long, value_name = "FILE")]
    pub compile_commands: Option<PathBuf>,

    /// Directory the VS Code documents are written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Compiler path to use instead of detecting it from the database
    #[arg(long)]
    pub compiler: Option<String>,

    /// Also write files.txt, defs.txt, incs.txt and epaths.txt into DIR
    #[arg(long, value_name = "DIR")]
    pub dump: Option<PathBuf>,
}
