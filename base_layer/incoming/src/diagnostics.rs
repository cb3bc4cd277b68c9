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

//! Categorized diagnostic codes for the incoming preparation pipeline.
//!
//! Every terminal failure and every skipped flatten attempt is logged under one of these codes so operators can grep
//! for a stage regardless of the message text.

use std::fmt::{self, Debug, Display, Formatter};

use log::*;
use strum_macros::EnumIter;

const LOG_TARGET: &str = "rts::incoming::diagnostics";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum DiagnosticCode {
    InvalidOptions,
    ListUnspentFailed,
    FilterUnspentFailed,
    GroupPartialsFailed,
    GroupPartialsNotReady,
    SelectionInvalidParams,
    SelectionFailed,
    FlattenFailed,
    NoUnspent,
    FlattenExhausted,
}

impl DiagnosticCode {
    pub const fn as_str(self) -> &'static str {
        use DiagnosticCode::*;
        match self {
            InvalidOptions => "PREPI_001",
            ListUnspentFailed => "PREPI_002",
            FilterUnspentFailed => "PREPI_003",
            GroupPartialsFailed => "PREPI_003A",
            GroupPartialsNotReady => "PREPI_003AA",
            SelectionInvalidParams => "PREPI_003B",
            SelectionFailed => "PREPI_003C",
            FlattenFailed => "PREPI_004",
            NoUnspent => "PREPI_005",
            FlattenExhausted => "PREPI_006",
        }
    }

    /// Codes that are part of normal operation (nothing to do this cycle, a group skipped until next cycle) are
    /// logged as warnings, everything else as errors.
    pub fn level(self) -> Level {
        use DiagnosticCode::*;
        match self {
            NoUnspent | FilterUnspentFailed | SelectionFailed | FlattenFailed | FlattenExhausted => Level::Warn,
            _ => Level::Error,
        }
    }
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write a categorized diagnostic. This never fails and never affects the outcome of a run.
pub fn write_log<C: Debug + ?Sized>(code: DiagnosticCode, message: &str, context: &C) {
    log!(target: LOG_TARGET, code.level(), "{} {}: {:?}", code, message, context);
}
