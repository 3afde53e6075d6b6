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

//! Account & credit engine.
//!
//! The [`Engine`] owns the business rules of the ledger: whether a
//! transfer, credit issuance, or installment payment is permitted, and
//! how it mutates client, credit, and history records.
//!
//! # Operations
//!
//! - **Transfers**: debit sender, credit receiver, append the amount to
//!   the receiver's transfer history. Beyond the sender's balance, the
//!   overdraft path permits the transfer when the mean of the sender's
//!   history covers the amount.
//! - **Credit issuance**: principal capped at five times the client's
//!   mean historical inflow; a renewal after a fully repaid credit gets a
//!   reduced installment multiplier.
//! - **Installment payment**: counts a rate as paid and debits the
//!   balance; the final installment closes the credit and unlinks it.
//!
//! # Invariants
//!
//! - Validation happens before any record is persisted; once a write set
//!   begins, a mid-sequence failure is reported as
//!   [`EngineError::PartialWriteFailure`] without rollback.
//! - A record is never mutated without first re-reading its latest
//!   persisted value within the same operation.
//! - Sequential ids come from counter records in the store, advanced
//!   only as part of a successful creation commit.

use crate::base::{CLIENT_SEQ_KEY, CREDIT_SEQ_KEY, ClientId, CreditId, HistoryKey};
use crate::error::EngineError;
use crate::record::{Client, ClientHistory, Credit, Sequence, decode, encode};
use crate::store::LedgerStore;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Fixed interest fraction recorded on every issued credit.
const INTEREST_RATE: Decimal = dec!(0.4);

/// Per-installment multiplier applied to a first credit.
const FIRST_ISSUE_MULTIPLIER: Decimal = dec!(1.4);

/// Reduced per-installment multiplier applied to a renewal after a fully
/// repaid credit.
const RENEWAL_MULTIPLIER: Decimal = dec!(0.4);

/// Principal may not exceed this multiple of the mean historical inflow.
const CREDIT_LIMIT_FACTOR: Decimal = dec!(5);

/// Hours covered by one installment period.
const HOURS_PER_RATE: i64 = 30 * 24;

/// Transactional account & credit engine over a [`LedgerStore`].
///
/// Each operation reads the minimal record set it needs, validates the
/// business rules, and writes back a consistent set of records. The
/// engine holds no state of its own; everything lives in the store.
pub struct Engine<S> {
    store: S,
}

impl<S: LedgerStore> Engine<S> {
    /// Creates an engine over the given store.
    pub fn new(store: S) -> Self {
        Engine { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a new client record under the next sequential key.
    ///
    /// # Errors
    ///
    /// - [`EngineError::AlreadyExists`] - the allocated key already holds
    ///   a record (id-generator reuse guard). The counter is not
    ///   advanced in that case.
    pub fn add_client(
        &self,
        account_number: &str,
        name: &str,
        last_name: &str,
        email: &str,
        amount: Decimal,
        credit: Option<CreditId>,
    ) -> Result<ClientId, EngineError> {
        let mut seq = self.sequence(CLIENT_SEQ_KEY)?;
        let id = ClientId::from_index(seq.next);
        if self.store.get(id.as_str())?.is_some() {
            return Err(EngineError::AlreadyExists(id.to_string()));
        }
        seq.next += 1;

        let client = Client {
            id: id.clone(),
            account_number: account_number.to_string(),
            name: name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            money_amount: amount,
            credit,
        };

        self.commit(vec![
            (CLIENT_SEQ_KEY.to_string(), encode(&seq)?),
            (id.as_str().to_string(), encode(&client)?),
        ])?;
        debug!(client = %id, "client added");
        Ok(id)
    }

    /// Moves `amount` from `sender_id` to `receiver_id`.
    ///
    /// Within the sender's balance the transfer always goes through.
    /// Beyond it, `allow_overdraft` opens the overdraft path: the
    /// transfer is permitted when the sender's transfer history is
    /// non-empty and its arithmetic mean covers the amount.
    ///
    /// A successful transfer writes the sender record, the receiver
    /// record, and the receiver's history (with `amount` appended) as
    /// one ordered write set.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] - sender or receiver missing.
    /// - [`EngineError::InvalidArgument`] - non-positive amount, or
    ///   sender and receiver are the same account.
    /// - [`EngineError::InsufficientFunds`] - balance short and the
    ///   overdraft path is closed, the history is empty, or its mean is
    ///   below the amount.
    /// - [`EngineError::PartialWriteFailure`] - a write landed before a
    ///   later one failed.
    pub fn transfer(
        &self,
        sender_id: &ClientId,
        receiver_id: &ClientId,
        amount: Decimal,
        allow_overdraft: bool,
    ) -> Result<(), EngineError> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidArgument(format!(
                "transfer amount must be positive, got {amount}"
            )));
        }
        if sender_id == receiver_id {
            return Err(EngineError::InvalidArgument(
                "sender and receiver are the same account".to_string(),
            ));
        }

        let mut sender: Client = self.read(sender_id.as_str())?;
        let mut receiver: Client = self.read(receiver_id.as_str())?;

        if amount > sender.money_amount {
            if !allow_overdraft {
                return Err(EngineError::InsufficientFunds);
            }
            // Overdraft eligibility reads the account being debited
            // beyond its balance: the sender.
            let history = self.read_history(&sender_id.history_key())?;
            let average = history.mean().ok_or(EngineError::InsufficientFunds)?;
            if average < amount {
                return Err(EngineError::InsufficientFunds);
            }
            debug!(sender = %sender_id, %average, %amount, "overdraft permitted");
        }

        sender.money_amount -= amount;
        receiver.money_amount += amount;

        let history_key = receiver_id.history_key();
        let mut receiver_history = self.read_history(&history_key)?;
        receiver_history.push(amount);

        self.commit(vec![
            (sender_id.as_str().to_string(), encode(&sender)?),
            (receiver_id.as_str().to_string(), encode(&receiver)?),
            (history_key.as_str().to_string(), encode(&receiver_history)?),
        ])?;
        debug!(sender = %sender_id, receiver = %receiver_id, %amount, "transfer applied");
        Ok(())
    }

    /// Issues a credit of `amount` repayable in `num_installments` rates.
    ///
    /// Eligibility requires a non-empty transfer history with
    /// `amount <= 5 * mean(history)`. A first credit prices the rate at
    /// `amount / num_installments * 1.4`; a renewal after a fully repaid
    /// credit gets the reduced `0.4` multiplier. Both record an interest
    /// fraction of `0.4`.
    ///
    /// The issued principal lands on the client's balance and the client
    /// is linked to the new credit.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] - client (or its linked credit)
    ///   missing.
    /// - [`EngineError::InsufficientHistory`] - empty transfer history.
    /// - [`EngineError::CreditLimitExceeded`] - amount above the cap.
    /// - [`EngineError::OutstandingCredit`] - linked credit not fully
    ///   repaid.
    pub fn issue_credit(
        &self,
        client_id: &ClientId,
        amount: Decimal,
        num_installments: u32,
    ) -> Result<CreditId, EngineError> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidArgument(format!(
                "credit amount must be positive, got {amount}"
            )));
        }
        if num_installments == 0 {
            return Err(EngineError::InvalidArgument(
                "number of installments must be positive".to_string(),
            ));
        }

        let mut client: Client = self.read(client_id.as_str())?;

        let history = self.read_history(&client_id.history_key())?;
        let average = history.mean().ok_or(EngineError::InsufficientHistory)?;
        if amount > average * CREDIT_LIMIT_FACTOR {
            return Err(EngineError::CreditLimitExceeded);
        }

        let multiplier = match &client.credit {
            Some(old_id) => {
                let old: Credit = self.read(old_id.as_str())?;
                if !old.is_settled() {
                    return Err(EngineError::OutstandingCredit);
                }
                RENEWAL_MULTIPLIER
            }
            None => FIRST_ISSUE_MULTIPLIER,
        };

        let mut seq = self.sequence(CREDIT_SEQ_KEY)?;
        let id = CreditId::from_index(seq.next);
        if self.store.get(id.as_str())?.is_some() {
            return Err(EngineError::AlreadyExists(id.to_string()));
        }
        seq.next += 1;

        let approval = Utc::now();
        let credit = Credit {
            id: id.clone(),
            approval_date: approval,
            end_date: approval + Duration::hours(num_installments as i64 * HOURS_PER_RATE),
            rate_size: amount / Decimal::from(num_installments) * multiplier,
            interest_rate: INTEREST_RATE,
            total_num_of_rates: num_installments,
            paid_rates: 0,
            money_amount: amount,
        };

        client.money_amount += amount;
        client.credit = Some(id.clone());

        self.commit(vec![
            (CREDIT_SEQ_KEY.to_string(), encode(&seq)?),
            (id.as_str().to_string(), encode(&credit)?),
            (client_id.as_str().to_string(), encode(&client)?),
        ])?;
        debug!(client = %client_id, credit = %id, %amount, rates = num_installments, "credit issued");
        Ok(id)
    }

    /// Pays one installment of the client's open credit.
    ///
    /// The payment must cover the per-installment rate and the client's
    /// balance must cover the payment; both checks run before any field
    /// is mutated. The final installment closes the credit and reverts
    /// the client's link to the sentinel.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] - client or linked credit missing.
    /// - [`EngineError::NoOpenCredit`] - no linked credit, or the linked
    ///   credit is already fully repaid.
    /// - [`EngineError::BelowMinimumInstallment`] - amount below the
    ///   rate.
    /// - [`EngineError::InsufficientFunds`] - balance below the amount.
    pub fn pay_installment(
        &self,
        client_id: &ClientId,
        amount: Decimal,
    ) -> Result<(), EngineError> {
        let mut client: Client = self.read(client_id.as_str())?;
        let credit_id = client.credit.clone().ok_or(EngineError::NoOpenCredit)?;
        let mut credit: Credit = self.read(credit_id.as_str())?;

        if credit.is_settled() {
            // A seeded client may still link a repaid credit; there is
            // nothing payable on it.
            return Err(EngineError::NoOpenCredit);
        }
        if amount < credit.rate_size {
            return Err(EngineError::BelowMinimumInstallment);
        }
        if amount > client.money_amount {
            return Err(EngineError::InsufficientFunds);
        }

        credit.paid_rates += 1;
        client.money_amount -= amount;
        if credit.is_settled() {
            client.credit = None;
        }

        self.commit(vec![
            (credit_id.as_str().to_string(), encode(&credit)?),
            (client_id.as_str().to_string(), encode(&client)?),
        ])?;
        debug!(
            client = %client_id,
            credit = %credit_id,
            paid = credit.paid_rates,
            total = credit.total_num_of_rates,
            "installment paid"
        );
        Ok(())
    }

    /// Raw stored bytes for `key`, without interpretation.
    pub fn query_record(&self, key: &str) -> Result<Vec<u8>, EngineError> {
        self.store
            .get(key)?
            .ok_or_else(|| EngineError::NotFound(key.to_string()))
    }

    /// Reads and decodes the record under `key`, failing `NotFound` when
    /// the key is empty.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<T, EngineError> {
        let bytes = self
            .store
            .get(key)?
            .ok_or_else(|| EngineError::NotFound(key.to_string()))?;
        decode(&bytes)
    }

    /// Reads a history record, starting a fresh empty one when the key
    /// was never written.
    fn read_history(&self, key: &HistoryKey) -> Result<ClientHistory, EngineError> {
        match self.store.get(key.as_str())? {
            Some(bytes) => decode(&bytes),
            None => Ok(ClientHistory::new(key.clone())),
        }
    }

    /// Reads a sequence counter record, defaulting to 1 when unseeded.
    fn sequence(&self, key: &str) -> Result<Sequence, EngineError> {
        match self.store.get(key)? {
            Some(bytes) => decode(&bytes),
            None => Ok(Sequence { next: 1 }),
        }
    }

    /// Applies a write set in order.
    ///
    /// The store has no multi-key transaction primitive: a failure on
    /// the first write surfaces as a plain store error (nothing
    /// persisted), a failure after earlier writes landed surfaces as
    /// [`EngineError::PartialWriteFailure`] with no rollback attempted.
    fn commit(&self, writes: Vec<(String, Vec<u8>)>) -> Result<(), EngineError> {
        let total = writes.len();
        for (applied, (key, value)) in writes.into_iter().enumerate() {
            if let Err(err) = self.store.put(&key, value) {
                if applied == 0 {
                    return Err(err.into());
                }
                return Err(EngineError::PartialWriteFailure { applied, total });
            }
        }
        Ok(())
    }
}
