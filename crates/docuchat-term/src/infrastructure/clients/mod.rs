pub mod docuchat_backend;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendClientBox;

pub struct BackendClientManager {}

impl BackendClientManager {
    pub fn get() -> Result<BackendClientBox> {
        let url = Config::get(ConfigKey::BackendUrl);
        let timeout = Config::get_millis(ConfigKey::Timeout)?;

        return Ok(Box::new(docuchat_backend::DocuchatBackend::new(
            &url, timeout,
        )?));
    }
}
