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

//! Record key types for ledger entities.
//!
//! Every entity lives under a string key in the ledger store: clients
//! under `c{n}`, credits under `cr{n}`, transactions under `t{n}`, banks
//! under `b{n}`, and each client's transfer history under `<clientKey>h`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved counter key backing client id allocation.
pub const CLIENT_SEQ_KEY: &str = "seq:client";

/// Reserved counter key backing credit id allocation.
pub const CREDIT_SEQ_KEY: &str = "seq:credit";

/// Reserved counter key backing transaction id allocation.
pub const TRANSACTION_SEQ_KEY: &str = "seq:transaction";

/// Key of a client record (`"c1"`, `"c2"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    /// Builds the key for the `index`-th client.
    pub fn from_index(index: u64) -> Self {
        Self(format!("c{index}"))
    }

    /// Key of this client's transfer history record.
    pub fn history_key(&self) -> HistoryKey {
        HistoryKey(format!("{}h", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a credit record (`"cr1"`, `"cr2"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CreditId(pub String);

impl CreditId {
    /// Builds the key for the `index`-th credit.
    pub fn from_index(index: u64) -> Self {
        Self(format!("cr{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CreditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a client history record (`"c1h"`, `"c2h"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct HistoryKey(pub String);

impl HistoryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
