use crate::config::GitVerseConfig;

pub fn show_config(config: &GitVerseConfig, init: bool) -> anyhow::Result<()> {
    if init {
        let path = config.save()?;
        println!("Config written to {} (credentials are read from the environment).", path.display());
    }

    match GitVerseConfig::config_path() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not created, using defaults)", path.display()),
        None => println!("Config file: unavailable (HOME not set)"),
    }
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
    Ok(())
}
