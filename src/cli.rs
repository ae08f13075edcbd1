// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "scene-composer")]
#[command(about = "Static scene with an imported mesh and a light colour control", long_about = None)]
pub struct Cli {
    /// Model file to load; overrides the config file and GLTF_FILE
    #[arg(long)]
    pub model: Option<String>,

    /// JSON scene configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Compose without a window and exit once the mesh load settles
    #[arg(long, default_value = "false")]
    pub headless: bool,

    /// Print the composed scene as JSON
    #[arg(long, requires = "headless")]
    pub dump: bool,
}
