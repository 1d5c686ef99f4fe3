//! Version command - deck and external tool versions

use console::style;
use deck_engine::{ProcessRunner, ToolCommand, ToolRunner};
use std::path::Path;

use crate::error::Result;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let runner = ProcessRunner::new(config.tools.clone());

    println!("deck {}", env!("CARGO_PKG_VERSION"));

    let tools = [
        ("helm", ToolCommand::new("helm").args(["version", "--short"])),
        ("git", ToolCommand::new("git").arg("--version")),
    ];

    for (tool, command) in tools {
        match runner.run(&command) {
            Ok(output) if output.success() => println!("{}: {}", tool, output.stdout.trim()),
            Ok(output) => println!(
                "{}: {}",
                tool,
                style(format!("error ({})", output.stderr.trim())).yellow()
            ),
            Err(e) => println!("{}: {}", tool, style(format!("not available ({})", e)).yellow()),
        }
    }

    Ok(())
}
