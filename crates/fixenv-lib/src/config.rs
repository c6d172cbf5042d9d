//! Configuration for the explanation service.
//!
//! Stored as JSON in the fixenv config directory. The API key is never written to disk,
//! it is taken from the `OPENAI_API_KEY` environment variable instead.

use serde::{Serialize, Deserialize};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	api_url: String,
	model: String,
	#[serde(skip)]
	api_key: Option<String>,
	timeout_secs: u64,
	https_only: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			api_url: DEFAULT_API_URL.to_string(),
			model: DEFAULT_MODEL.to_string(),
			api_key: None,
			timeout_secs: DEFAULT_TIMEOUT_SECS,
			https_only: true,
		}
	}
}

impl Config {
	/// Directory the config file lives in.
	///
	/// `$XDG_CONFIG_HOME/fixenv` falling back to `$HOME/.config/fixenv`, `%APPDATA%\fixenv` on windows.
	pub fn config_dir() -> crate::Result<std::path::PathBuf> {
		#[cfg(target_os = "windows")]
		let path = std::env::var("APPDATA").map(std::path::PathBuf::from).map_err(|_| crate::Error::NoConfigDir)?;

		#[cfg(not(target_os = "windows"))]
		let path = if let Ok(e) = std::env::var("XDG_CONFIG_HOME") {
			std::path::PathBuf::from(e)
		} else {
			std::path::PathBuf::from(std::env::var("HOME").map_err(|_| crate::Error::NoConfigDir)?).join(".config")
		};

		Ok(path.join("fixenv"))
	}

	/// Loads the config from the default config directory and applies environment overrides.
	///
	/// # Errors
	/// - [`IO`](crate::Error::IO) when the file is missing or unreadable.
	/// - [`SerdeJSON`](crate::Error::SerdeJSON) when the file isn't a valid config.
	pub fn load_from_disk() -> crate::Result<Self> {
		Self::load_from_file(Self::config_dir()?.join(CONFIG_FILE_NAME))
	}

	pub fn load_from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
		let path = path.as_ref();
		log::debug!("Reading config from {}", path.display());
		let data = std::fs::read_to_string(path)?;
		let mut config: Config = serde_json::from_str(&data)?;
		if config.timeout_secs == 0 {
			log::warn!("Config {} has a zero timeout, using {}s instead", path.display(), DEFAULT_TIMEOUT_SECS);
			config.timeout_secs = DEFAULT_TIMEOUT_SECS;
		}
		config.apply_env_overrides();
		Ok(config)
	}

	pub fn save_to_disk(&self) -> crate::Result<()> {
		let dir = Self::config_dir()?;
		std::fs::create_dir_all(&dir)?;
		self.save_to_file(dir.join(CONFIG_FILE_NAME))
	}

	pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
		let data = serde_json::to_string_pretty(self)?;
		std::fs::write(path, data)?;
		Ok(())
	}

	/// Reads `OPENAI_API_KEY`, `FIXENV_API_URL` and `FIXENV_MODEL`.
	pub fn apply_env_overrides(&mut self) {
		if let Ok(key) = std::env::var("OPENAI_API_KEY") {
			self.set_api_key(Some(key));
		}
		if let Ok(url) = std::env::var("FIXENV_API_URL") {
			self.api_url = url;
		}
		if let Ok(model) = std::env::var("FIXENV_MODEL") {
			self.model = model;
		}
	}

	pub fn api_url(&self) -> &str {
		&self.api_url
	}
	pub fn set_api_url(&mut self, api_url: impl Into<String>) {
		self.api_url = api_url.into();
	}

	pub fn model(&self) -> &str {
		&self.model
	}
	pub fn set_model(&mut self, model: impl Into<String>) {
		self.model = model.into();
	}

	pub fn api_key(&self) -> Option<&str> {
		self.api_key.as_deref()
	}
	/// Blank keys are treated as missing.
	pub fn set_api_key(&mut self, api_key: Option<String>) {
		self.api_key = api_key
			.map(|k| k.trim().to_string())
			.filter(|k| !k.is_empty());
	}

	pub fn timeout(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.timeout_secs)
	}
	/// returns if the timeout is valid or not, a zero timeout is rejected.
	pub fn set_timeout_secs(&mut self, timeout_secs: u64) -> bool {
		if timeout_secs > 0 {
			self.timeout_secs = timeout_secs;
			true
		} else {
			false
		}
	}

	pub fn https_only(&self) -> bool {
		self.https_only
	}
	pub fn set_https_only(&mut self, https_only: bool) {
		self.https_only = https_only;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn api_key_is_not_serialized() {
		let mut config = Config::default();
		config.set_api_key(Some("sk-secret".to_string()));
		let json = serde_json::to_string(&config).unwrap();
		assert!(!json.contains("sk-secret"));
	}

	#[test]
	fn blank_api_key_is_missing() {
		let mut config = Config::default();
		config.set_api_key(Some("   ".to_string()));
		assert_eq!(config.api_key(), None);
	}

	#[test]
	fn zero_timeout_rejected() {
		let mut config = Config::default();
		assert!(!config.set_timeout_secs(0));
		assert_eq!(config.timeout(), std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS));
	}

	#[test]
	fn zero_timeout_in_file_falls_back_to_default() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		std::io::Write::write_all(&mut file, br#"{ "timeout_secs": 0 }"#).unwrap();
		let config = Config::load_from_file(file.path()).unwrap();
		assert!(config.timeout() > std::time::Duration::ZERO);
		assert_eq!(config.timeout(), std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS));
	}

	#[test]
	fn partial_file_uses_defaults() {
		let config: Config = serde_json::from_str(r#"{ "model": "gpt-4o" }"#).unwrap();
		assert_eq!(config.model(), "gpt-4o");
		assert_eq!(config.api_url(), DEFAULT_API_URL);
		assert!(config.https_only());
	}
}
