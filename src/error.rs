// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Error types for engine operations.

use crate::store::StoreError;
use thiserror::Error;

/// Engine operation failures.
///
/// All validation failures are detected before any record is persisted,
/// except a multi-write sequence failing partway through, which surfaces
/// as [`PartialWriteFailure`](EngineError::PartialWriteFailure). Every
/// failure is a value returned to the caller; none aborts the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed numeric input or a wrong argument count.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required record read came back empty.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A creation targeted a key that already holds a record.
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// Balance (or historical average, on the overdraft path) does not
    /// cover the requested amount.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// No transfer history to compute credit eligibility from.
    #[error("insufficient history for eligibility")]
    InsufficientHistory,

    /// Requested principal exceeds five times the historical average.
    #[error("credit limit exceeded")]
    CreditLimitExceeded,

    /// The client's open credit is not fully repaid.
    #[error("outstanding credit is not fully repaid")]
    OutstandingCredit,

    /// Payment is below the per-installment rate.
    #[error("amount is below the installment rate")]
    BelowMinimumInstallment,

    /// The client has no linked open credit.
    #[error("no open credit")]
    NoOpenCredit,

    /// A write in a multi-write operation failed after earlier writes
    /// landed. No automatic rollback; the caller reconciles.
    #[error("partial write failure: {applied} of {total} writes applied")]
    PartialWriteFailure { applied: usize, total: usize },

    /// The ledger store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A record failed to encode or decode.
    #[error("codec error: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Codec(err.to_string())
    }
}
