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

//! # Incoming payment preparation
//!
//! Received payments are returned to their senders through anonymized sub-payments. Each cycle, this crate decides
//! which pending payments can be afforded under the wallet's current balances and breaks each of them into smaller
//! sub-payments, without generating more new addresses than the cycle allows.
//!
//! The wallet RPC, the filter that identifies returnable outputs, the grouping of partial payments and the actual
//! construction of sub-payments are supplied by the caller through the traits in [`interface`].

pub mod amount;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod interface;
pub mod prepare_incoming;
pub mod test_utils;
pub mod types;

pub use config::{PrepareIncomingConfig, RunSettings};
pub use error::{PrepareIncomingError, PrepareIncomingFailure};
pub use prepare_incoming::{PrepareIncoming, PrepareIncomingOptions, PrepareIncomingReport};
