use std::env;
use std::path::PathBuf;

use folio::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()));
    let candidates = [
        exe_dir,
        env::current_dir().ok(),
        dirs::config_dir(),
    ];

    candidates.into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(get_config_path) {
        None => return Err("Could not find Folio configuration".to_string()),
        Some(x) => x,
    };

    println!("Reading config from {}", config_path.display());
    let mut config = match read_config(&config_path) {
        Ok(config) => config,
        Err(e) => return Err(e.to_string()),
    };

    if let Some(mut log) = config.log {
        if log.location.is_none() {
            log.location = dirs::cache_dir().map(|dir| dir.join("Folio").join("log").join("folio.log"));
        }
        match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled. Using stdout"),
        }
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}
