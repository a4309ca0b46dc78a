use anyhow::Result;
use owo_colors::OwoColorize;
use salonsync_core::config::SalonConfig;

pub fn run(
    api_url: Option<String>,
    token: Option<String>,
    branch_id: Option<String>,
) -> Result<()> {
    let path = SalonConfig::config_path()?;

    if api_url.is_none() && token.is_none() && branch_id.is_none() {
        if path.exists() {
            println!("{}", path.display());
        } else {
            println!("{} {}", path.display(), "(not created yet)".dimmed());
        }
        return Ok(());
    }

    let mut config = SalonConfig::load()?;
    if let Some(api_url) = api_url {
        config.api_url = api_url;
    }
    if token.is_some() {
        config.token = token;
    }
    if branch_id.is_some() {
        config.branch_id = branch_id;
    }
    config.save()?;

    println!("{} {}", "Saved".green(), path.display());
    Ok(())
}
