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

use std::path::Path;

use config::{Config, File, FileFormat};
use log::*;

use crate::ConfigurationError;

const LOG_TARGET: &str = "rts::common::configuration";

/// Load the configuration file at `path`. The file must exist; its format is inferred from the extension.
pub fn load_configuration<P: AsRef<Path>>(path: P) -> Result<Config, ConfigurationError> {
    let path = path.as_ref();
    debug!(target: LOG_TARGET, "Loading configuration file from {}", path.display());
    if !path.exists() {
        return Err(ConfigurationError::new(
            path.display().to_string(),
            "configuration file does not exist",
        ));
    }
    let mut cfg = Config::new();
    cfg.merge(File::from(path).required(true))?;
    Ok(cfg)
}

/// Load configuration from a TOML string
pub fn load_configuration_from_str(contents: &str) -> Result<Config, ConfigurationError> {
    let mut cfg = Config::new();
    cfg.merge(File::from_str(contents, FileFormat::Toml))?;
    Ok(cfg)
}
