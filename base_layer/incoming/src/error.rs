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

use rts_common::ConfigurationError;
use thiserror::Error;

use crate::{
    diagnostics::DiagnosticCode,
    types::{PendingTransaction, PreparedIncoming},
};

/// Errors reported by the external collaborators the pipeline calls out to
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Wallet RPC error: `{0}`")]
    WalletRpc(String),
    #[error("Collaborator rejected the request: `{0}`")]
    Rejected(String),
    #[error("Collaborator returned a malformed response: `{0}`")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid selection params: {0}")]
    InvalidParams(&'static str),
    #[error("No pending group fits under the fee budget and the maximum amount")]
    NothingSelected,
}

/// Broad categories of run failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed options, detected before any collaborator is called
    InvalidInput,
    /// A collaborator returned no usable data
    UpstreamEmpty,
    /// A collaborator call errored
    UpstreamFailure,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PrepareIncomingError {
    #[error("Invalid options provided to PrepareIncoming::run, missing: {}", .missing.join(", "))]
    InvalidOptions { missing: Vec<&'static str> },
    #[error("Invalid anonymization fee percentage: {0}")]
    InvalidAnonFeePercent(f64),
    #[error("No unspent transactions found")]
    NoUnspentOutputs,
    #[error("Failed to list unspent: {0}")]
    ListUnspentFailed(CollaboratorError),
    #[error("No current pending to return")]
    NoCurrentPending,
    #[error("Failed to filter unspent: {0}")]
    FilterUnspentFailed(CollaboratorError),
    #[error("Grouping partial transactions failed: {0}")]
    GroupPartialsFailed(String),
    #[error("Grouping partial transactions returned nothing ready to process")]
    NothingReadyToProcess,
    #[error("Selection failed: {0}")]
    Selection(#[from] SelectionError),
    #[error("None of the selected groups could be flattened")]
    NothingFlattened,
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl PrepareIncomingError {
    pub fn kind(&self) -> ErrorKind {
        use PrepareIncomingError::*;
        match self {
            InvalidOptions { .. } |
            InvalidAnonFeePercent(_) |
            Configuration(_) |
            Selection(SelectionError::InvalidParams(_)) => ErrorKind::InvalidInput,
            ListUnspentFailed(_) | FilterUnspentFailed(_) | GroupPartialsFailed(_) => ErrorKind::UpstreamFailure,
            NoUnspentOutputs |
            NoCurrentPending |
            NothingReadyToProcess |
            Selection(SelectionError::NothingSelected) |
            NothingFlattened => ErrorKind::UpstreamEmpty,
        }
    }

    /// The diagnostic code logged when a run terminates with this error
    pub fn diagnostic_code(&self) -> DiagnosticCode {
        use PrepareIncomingError::*;
        match self {
            InvalidOptions { .. } | InvalidAnonFeePercent(_) | Configuration(_) => DiagnosticCode::InvalidOptions,
            NoUnspentOutputs => DiagnosticCode::NoUnspent,
            ListUnspentFailed(_) => DiagnosticCode::ListUnspentFailed,
            NoCurrentPending | FilterUnspentFailed(_) => DiagnosticCode::FilterUnspentFailed,
            GroupPartialsFailed(_) => DiagnosticCode::GroupPartialsFailed,
            NothingReadyToProcess => DiagnosticCode::GroupPartialsNotReady,
            Selection(SelectionError::InvalidParams(_)) => DiagnosticCode::SelectionInvalidParams,
            Selection(SelectionError::NothingSelected) => DiagnosticCode::SelectionFailed,
            NothingFlattened => DiagnosticCode::FlattenExhausted,
        }
    }
}

/// A failed run. Whatever the run had computed before it failed is kept in `partial` so the caller can take an
/// alternate path with it, e.g. return `partial.pending_to_return` without anonymization.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{error}")]
pub struct PrepareIncomingFailure {
    #[source]
    pub error: PrepareIncomingError,
    pub partial: PreparedIncoming,
}

impl PrepareIncomingFailure {
    pub fn new(error: PrepareIncomingError) -> Self {
        Self {
            error,
            partial: PreparedIncoming::default(),
        }
    }

    pub fn with_partial(error: PrepareIncomingError, partial: PreparedIncoming) -> Self {
        Self { error, partial }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn pending_to_return(&self) -> Option<&Vec<PendingTransaction>> {
        self.partial.pending_to_return.as_ref()
    }
}
