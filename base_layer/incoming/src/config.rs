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

use std::collections::HashMap;

use config::Config;
use log::*;
use rts_common::{ConfigurationError, DefaultConfigLoader, ServerType, ServerTypeConfigPath};
use serde::{Deserialize, Serialize};

use crate::amount::Navtoshi;

const LOG_TARGET: &str = "rts::incoming::config";

/// Static settings for incoming preparation, read once and shared read-only by every run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareIncomingConfig {
    /// Sub-chain fee paid by each transaction in a batch
    pub sub_chain_tx_fee: Navtoshi,
    /// Fixed amount of sub-chain coin consumed by each transaction in a batch
    pub sub_coins_per_tx: Navtoshi,
    /// Maximum number of new addresses that may be created in one cycle
    pub max_addresses: usize,
    pub server_type: ServerType,
    /// Wallet account holding received payments, per server type
    pub accounts: HashMap<ServerType, String>,
}

impl Default for PrepareIncomingConfig {
    fn default() -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(ServerType::Incoming, "INCOMING".to_string());
        accounts.insert(ServerType::Outgoing, "OUTGOING".to_string());
        Self {
            sub_chain_tx_fee: Navtoshi(10_000),
            sub_coins_per_tx: Navtoshi(100_000),
            max_addresses: 100,
            server_type: ServerType::Incoming,
            accounts,
        }
    }
}

impl ServerTypeConfigPath for PrepareIncomingConfig {
    fn main_key_prefix() -> &'static str {
        "prepare_incoming"
    }
}

impl PrepareIncomingConfig {
    /// Load from the `prepare_incoming` section of `config`, falling back to defaults for missing keys.
    pub fn load_from(config: &Config) -> Result<Self, ConfigurationError> {
        let cfg = <Self as DefaultConfigLoader>::load_from(config)?;
        cfg.validate()?;
        trace!(
            target: LOG_TARGET,
            "Loaded config - server type: {}, max addresses: {}, per tx cost: {}",
            cfg.server_type,
            cfg.max_addresses,
            cfg.per_tx_cost()
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_addresses == 0 {
            return Err(ConfigurationError::new(
                "prepare_incoming.max_addresses",
                "must be greater than zero",
            ));
        }
        if self.sub_chain_tx_fee.checked_add(self.sub_coins_per_tx).is_none() {
            return Err(ConfigurationError::new(
                "prepare_incoming.sub_coins_per_tx",
                "per transaction cost overflows",
            ));
        }
        if self.per_tx_cost().is_zero() {
            return Err(ConfigurationError::new(
                "prepare_incoming.sub_chain_tx_fee",
                "per transaction cost must be greater than zero",
            ));
        }
        self.account_name().map(|_| ())
    }

    /// Sub-chain balance consumed by each transaction in a batch
    pub fn per_tx_cost(&self) -> Navtoshi {
        self.sub_coins_per_tx + self.sub_chain_tx_fee
    }

    /// The wallet account that holds payments for the configured server type
    pub fn account_name(&self) -> Result<&str, ConfigurationError> {
        self.accounts
            .get(&self.server_type)
            .map(String::as_str)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                ConfigurationError::new(
                    format!("prepare_incoming.accounts.{}", self.server_type),
                    "no wallet account configured for server type",
                )
            })
    }
}

/// Per-run settings supplied by the caller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Percentage of each amount taken as the anonymization fee
    pub anon_fee_percent: f64,
}

impl RunSettings {
    pub fn new(anon_fee_percent: f64) -> Self {
        Self { anon_fee_percent }
    }
}
