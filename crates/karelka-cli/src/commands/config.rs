use super::prompts;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::Result;
use watch_sync_config::{Config, CredentialStore, PathManager, StoreConfig, TraktConfig};
use watch_sync_sources::trakt::trakt_authenticate;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(output),
        ConfigCommands::Trakt {
            client_id,
            client_secret,
        } => configure_trakt(client_id, client_secret, output).await,
        ConfigCommands::Store { database_url } => configure_store(database_url, output),
    }
}

fn mask_secret(secret: &str) -> String {
    if secret.len() <= 4 {
        return "****".to_string();
    }
    format!("{}****", &secret[..4])
}

fn show_config(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = Config::load_or_default(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load configuration: {}", e))?;

    output.info(format!(
        "Configuration file: {}",
        path_manager.config_file().display()
    ));

    match &config.trakt {
        Some(trakt) => {
            output.info(format!("Trakt client id: {}", trakt.client_id));
            output.info(format!(
                "Trakt client secret: {}",
                mask_secret(&trakt.client_secret)
            ));
        }
        None => output.warn("Trakt is not configured"),
    }

    match &config.store {
        Some(store) => output.info(format!("Progress database: {}", store.database_url)),
        None => output.warn("Progress database is not configured"),
    }

    let report_path = config
        .report
        .path
        .clone()
        .unwrap_or_else(|| path_manager.report_file());
    output.info(format!("Report path: {}", report_path.display()));

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let authorized = cred_store.get_trakt_access_token().is_some();
    output.info(format!(
        "Trakt authorization: {}",
        if authorized { "saved" } else { "not yet authorized" }
    ));

    Ok(())
}

async fn configure_trakt(
    client_id: Option<String>,
    client_secret: Option<String>,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to prepare directories: {}", e))?;

    let mut config = Config::load_or_default(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load configuration: {}", e))?;

    let existing = config.trakt.as_ref();
    let client_id = match client_id {
        Some(id) => id,
        None => prompts::prompt_string(
            "Trakt Client ID",
            existing.map(|t| t.client_id.as_str()),
        )?,
    };
    let client_secret = match client_secret {
        Some(secret) => secret,
        None => prompts::prompt_secret("Trakt Client Secret")?,
    };

    config.trakt = Some(TraktConfig {
        client_id: client_id.clone(),
        client_secret: client_secret.clone(),
    });
    config
        .save(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save configuration: {}", e))?;

    // Authorize right away so the first sync run doesn't stop for input
    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let refresh_token = cred_store.get_trakt_refresh_token().cloned();

    let token_info = trakt_authenticate(&client_id, &client_secret, refresh_token.as_deref())
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Trakt authorization failed: {}", e))?;

    cred_store.set_trakt_access_token(token_info.access_token);
    cred_store.set_trakt_refresh_token(token_info.refresh_token);
    cred_store.set_trakt_token_expires(token_info.expires_at);
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    output.success("Trakt configured and authorized");
    Ok(())
}

fn configure_store(database_url: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to prepare directories: {}", e))?;

    let mut config = Config::load_or_default(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load configuration: {}", e))?;

    let existing = config.store.as_ref().map(|s| s.database_url.clone());
    let database_url = match database_url {
        Some(url) => url,
        None => prompts::prompt_string("Progress database URL", existing.as_deref())?,
    };

    config.store = Some(StoreConfig { database_url });
    config
        .save(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save configuration: {}", e))?;

    output.success("Progress database configured");
    Ok(())
}
