use std::{fs, path::Path};

use serde::Deserialize;

use crate::{FormflowError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// wizard navigation config
    #[serde(default)]
    pub wizard: WizardConfig,
    /// session store config
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// route of the first step, defaults to the model's or the first declared step
    pub first_step: Option<String>,
    /// route of the confirmation (summary) step
    pub confirm_step: String,
    /// prefix the wizard is mounted under
    pub base_url: String,
    /// suffix marking a route as opened in edit mode
    pub edit_suffix: String,
    /// default for steps without their own `continue_on_edit`
    pub continue_on_edit: bool,
    /// reset the session when a terminal step is entered
    pub clear_session: bool,
    /// forget steps that are only reachable from an abandoned fork branch
    pub path_invalidation: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// max number of sessions kept by the registry
    pub session_capacity: usize,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            first_step: None,
            confirm_step: "/confirm".to_string(),
            base_url: "/".to_string(),
            edit_suffix: "/edit".to_string(),
            continue_on_edit: false,
            clear_session: true,
            path_invalidation: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            session_capacity: 10_000,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| FormflowError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.wizard.edit_suffix.starts_with('/') || self.wizard.edit_suffix.len() < 2 {
            return Err(FormflowError::Config(format!("invalid edit_suffix '{}'", self.wizard.edit_suffix)));
        }
        if !self.wizard.base_url.starts_with('/') {
            return Err(FormflowError::Config(format!("base_url '{}' must start with '/'", self.wizard.base_url)));
        }
        if self.store.session_capacity == 0 {
            return Err(FormflowError::Config("session_capacity must be greater than 0".to_string()));
        }
        Ok(())
    }
}
