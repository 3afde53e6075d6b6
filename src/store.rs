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

//! Ledger store contract and the in-memory reference backend.

use dashmap::DashMap;
use thiserror::Error;

/// Errors from ledger store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend refused to persist a value for `key`.
    #[error("write rejected for key {0}")]
    WriteRejected(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value ledger store with a per-key append-only change feed.
///
/// All implementations must satisfy these invariants:
/// - `get` and `put` are atomic and linearizable per key.
/// - Every `put` appends to the key's change feed; `history` returns the
///   full feed, oldest value first.
/// - There are no multi-key transactions. Cross-key consistency is the
///   caller's responsibility.
/// - The store never interprets record contents.
pub trait LedgerStore: Send + Sync {
    /// Latest value written for `key`, or `Ok(None)` if never written.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Writes a new value for `key`.
    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Every past value written for `key`, oldest first. Empty if the
    /// key was never written.
    fn history(&self, key: &str) -> StoreResult<Vec<Vec<u8>>>;
}

/// In-memory store for tests and embedding.
///
/// Each key maps to its full version log; the last entry is the current
/// value and the whole log is the change feed. Per-key atomicity comes
/// from the map's sharded locking.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, Vec<Vec<u8>>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of keys currently holding at least one value.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no key was ever written.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl LedgerStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self
            .records
            .get(key)
            .and_then(|versions| versions.last().cloned()))
    }

    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.records.entry(key.to_string()).or_default().push(value);
        Ok(())
    }

    fn history(&self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        Ok(self
            .records
            .get(key)
            .map(|versions| versions.value().clone())
            .unwrap_or_default())
    }
}
