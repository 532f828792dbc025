use crate::error::CliError;
use crate::utils::Output;
use colored::Colorize;
use ugs_config::{Config, ConfigKey};

fn parse_key(key: &str) -> anyhow::Result<ConfigKey> {
    Ok(key.parse::<ConfigKey>()?)
}

pub fn get(key: &str) -> anyhow::Result<()> {
    let key = parse_key(key)?;
    let config = Config::load()?;
    match config.get(key) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(CliError::handled(format!("'{}' is not set", key)).into()),
    }
}

pub fn set(key: &str, value: &str, output: Output) -> anyhow::Result<()> {
    let key = parse_key(key)?;
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    tracing::info!(%key, "Configuration updated");
    output.info(format!("{} {} = {}", "✓".green(), key, value));
    Ok(())
}

pub fn delete(key: &str, output: Output) -> anyhow::Result<()> {
    let key = parse_key(key)?;
    let mut config = Config::load()?;
    if config.unset(key) {
        config.save()?;
        output.info(format!("{} {} deleted", "✓".green(), key));
    } else {
        output.info(format!("'{}' was not set", key));
    }
    Ok(())
}
