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

//! # Bank Ledger
//!
//! This library implements the business logic of a simple banking
//! ledger: client accounts, money transfers with a conditional overdraft
//! rule, credit issuance, and installment repayment, all persisted as
//! key/value records in a ledger store.
//!
//! ## Core Components
//!
//! - [`Engine`]: the account & credit engine deciding whether a
//!   transfer, issuance, or repayment is permitted and how it mutates
//!   the stored records
//! - [`LedgerStore`]: the key/value collaborator contract with a per-key
//!   append-only change feed
//! - [`MemoryStore`]: in-memory reference backend
//! - [`Request`] / [`dispatch`]: operation-name routing onto the engine
//! - [`seed`]: bootstrap dataset for a fresh ledger
//!
//! ## Example
//!
//! ```
//! use bank_ledger_rs::{Client, ClientId, Engine, MemoryStore};
//! use rust_decimal_macros::dec;
//!
//! let engine = Engine::new(MemoryStore::new());
//! bank_ledger_rs::seed(engine.store()).unwrap();
//!
//! // c1 holds 500; the 5000 transfer rides the overdraft path, covered
//! // by the 6500 mean of c1's transfer history.
//! engine
//!     .transfer(&ClientId("c1".into()), &ClientId("c2".into()), dec!(5000), true)
//!     .unwrap();
//!
//! let raw = engine.query_record("c1").unwrap();
//! let sender: Client = bank_ledger_rs::decode(&raw).unwrap();
//! assert_eq!(sender.money_amount, dec!(-4500));
//! ```
//!
//! ## Consistency
//!
//! The store guarantees atomic, linearizable access per key but offers
//! no multi-key transactions. Each operation validates before writing;
//! a multi-write sequence failing partway through is reported as
//! [`EngineError::PartialWriteFailure`] and never rolled back.

pub mod base;
mod dispatch;
mod engine;
pub mod error;
pub mod record;
mod seed;
pub mod store;

pub use base::{ClientId, CreditId, HistoryKey};
pub use dispatch::{Reply, Request, dispatch};
pub use engine::Engine;
pub use error::EngineError;
pub use record::{
    Bank, Client, ClientHistory, Credit, NO_CREDIT, Sequence, Transaction, decode, encode,
};
pub use seed::seed;
pub use store::{LedgerStore, MemoryStore, StoreError};
