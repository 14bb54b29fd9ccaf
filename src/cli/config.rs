use huffpack::config::CodecConfig;

use crate::cli::{ConfigCommand, Result};

pub fn config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Save { output } => {
            CodecConfig::default().save(&output)?;
            eprintln!("default configuration written to {}", output.display());
            Ok(())
        }
        ConfigCommand::Show { config } => {
            let json = serde_json::to_string_pretty(&config.load()?)?;
            println!("{}", json);
            Ok(())
        }
    }
}
