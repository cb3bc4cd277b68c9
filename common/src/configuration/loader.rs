// Copyright 2024. The Tari Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! # Application configuration
//!
//! Each crate owns one section of the configuration file. A struct that implements [`Deserialize`] and
//! [`ServerTypeConfigPath`] can be loaded from a [`Config`] with [`ConfigLoader::load_from`]; values in the
//! `[section.{server_type}]` subtable override the values in `[section]`, where the server type is taken from
//! `section.server_type`.
//!
//! [`DefaultConfigLoader`] additionally falls back to the struct's [`Default`] for keys that are not present.
//!
//! ## Example
//!
//! ```
//! # use config::Config;
//! # use serde::Deserialize;
//! # use rts_common::{ConfigLoader, ServerTypeConfigPath};
//! #[derive(Deserialize)]
//! struct PayoutConfig {
//!     account: String,
//! }
//! impl ServerTypeConfigPath for PayoutConfig {
//!     fn main_key_prefix() -> &'static str {
//!         "payout"
//!     }
//! }
//!
//! # let mut config = Config::new();
//! config.set("payout.account", "default").unwrap();
//! config.set("payout.server_type", "outgoing").unwrap();
//! config.set("payout.outgoing.account", "OUTGOING_ACCOUNT").unwrap();
//! let payout = <PayoutConfig as ConfigLoader>::load_from(&config).unwrap();
//! assert_eq!(payout.account, "OUTGOING_ACCOUNT");
//! ```
//!
//! [`Deserialize`]: serde::Deserialize

use config::Config;

use super::{error::ConfigurationError, server_type::ServerType};

/// Load struct from config's main section and subsection override
pub trait ConfigPath {
    /// Main configuration section
    fn main_key_prefix() -> &'static str;
    /// Path to the subsection whose values override the main section, or `None` when no override applies.
    fn overload_key_prefix(config: &Config) -> Result<Option<String>, ConfigurationError>;
    /// Merge the override subsection into the main section, producing a config that `Self` can be deserialized
    /// from under `main_key_prefix()`.
    fn merge_subconfig(config: &Config) -> Result<Config, ConfigurationError> {
        use config::Value;
        match Self::overload_key_prefix(config)? {
            Some(key) => {
                // No subsection for this server type, the main section applies as is
                let overload: Value = match config.get(key.as_str()) {
                    Ok(overload) => overload,
                    Err(_) => return Ok(config.clone()),
                };
                let base: Value = config.get(Self::main_key_prefix()).unwrap_or_default();
                let mut base_config = Config::new();
                base_config.set(Self::main_key_prefix(), base)?;
                let mut config = Config::new();
                // Merging the base first and then setting the overload on top is what makes nested tables merge
                config.merge(base_config)?;
                config.set(Self::main_key_prefix(), overload)?;
                Ok(config)
            },
            None => Ok(config.clone()),
        }
    }
}

/// Load struct from config's main section and server type subsection override
///
/// The subsection is chosen by the `server_type` key of the main section. An unknown server type is an error.
pub trait ServerTypeConfigPath {
    /// Main configuration section
    fn main_key_prefix() -> &'static str;
    /// Path for the `server_type` key in config
    fn server_type_config_key() -> String {
        format!("{}.server_type", <Self as ServerTypeConfigPath>::main_key_prefix())
    }
}

impl<C: ServerTypeConfigPath> ConfigPath for C {
    fn main_key_prefix() -> &'static str {
        <Self as ServerTypeConfigPath>::main_key_prefix()
    }

    fn overload_key_prefix(config: &Config) -> Result<Option<String>, ConfigurationError> {
        let key = Self::server_type_config_key();
        match config.get_str(key.as_str()).ok() {
            Some(s) => {
                let server_type: ServerType = s.parse()?;
                Ok(Some(format!("{}.{}", Self::main_key_prefix(), server_type)))
            },
            None => Ok(None),
        }
    }
}

/// Configuration loader based on ConfigPath selectors
pub trait ConfigLoader: ConfigPath + for<'de> serde::de::Deserialize<'de> {
    /// Try to load configuration from supplied Config by `main_key_prefix()` with values overloaded from
    /// `overload_key_prefix()`.
    ///
    /// Default values will be taken from `#[serde(default)]` attributes or `Config::set_default()`.
    /// For automated inheritance of Default values use DefaultConfigLoader.
    fn load_from(config: &Config) -> Result<Self, ConfigurationError> {
        let merger = Self::merge_subconfig(config)?;
        Ok(merger.get(Self::main_key_prefix())?)
    }
}
impl<C> ConfigLoader for C where C: ConfigPath + for<'de> serde::de::Deserialize<'de> {}

/// Configuration loader based on ConfigPath selectors with Defaults
pub trait DefaultConfigLoader:
    ConfigPath + Default + serde::ser::Serialize + for<'de> serde::de::Deserialize<'de>
{
    /// Try to load configuration from supplied Config by `main_key_prefix()` with values overloaded from
    /// `overload_key_prefix()`.
    ///
    /// Default values will be taken from the Default impl of the struct.
    fn load_from(config: &Config) -> Result<Self, ConfigurationError> {
        let default = <Self as Default>::default();
        let buf = serde_json::to_string(&default)?;
        let value: config::Value = serde_json::from_str(buf.as_str())?;
        let mut merger = Self::merge_subconfig(config)?;
        merger.set_default(Self::main_key_prefix(), value)?;
        Ok(merger.get(Self::main_key_prefix())?)
    }
}
impl<C> DefaultConfigLoader for C where
    C: ConfigPath + Default + serde::ser::Serialize + for<'de> serde::de::Deserialize<'de>
{
}
