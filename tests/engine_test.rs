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

//! Engine public API integration tests: client creation, transfers, and
//! raw queries.

use bank_ledger_rs::base::CLIENT_SEQ_KEY;
use bank_ledger_rs::store::StoreResult;
use bank_ledger_rs::{
    Client, ClientHistory, ClientId, Engine, EngineError, LedgerStore, MemoryStore, Sequence,
    StoreError, decode, seed,
};
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};

fn seeded_engine() -> Engine<MemoryStore> {
    let engine = Engine::new(MemoryStore::new());
    seed(engine.store()).unwrap();
    engine
}

fn read_client<S: LedgerStore>(engine: &Engine<S>, key: &str) -> Client {
    decode(&engine.query_record(key).unwrap()).unwrap()
}

fn read_history<S: LedgerStore>(engine: &Engine<S>, key: &str) -> ClientHistory {
    decode(&engine.query_record(key).unwrap()).unwrap()
}

fn cid(key: &str) -> ClientId {
    ClientId(key.into())
}

// === Client Creation ===

#[test]
fn add_client_allocates_sequential_keys() {
    let engine = seeded_engine();

    let first = engine
        .add_client("99999", "Ana", "Petrovic", "ana@example.com", dec!(1000), None)
        .unwrap();
    let second = engine
        .add_client("88888", "Marko", "Savic", "marko@example.com", dec!(0), None)
        .unwrap();

    assert_eq!(first, cid("c4"));
    assert_eq!(second, cid("c5"));

    let client = read_client(&engine, "c4");
    assert_eq!(client.name, "Ana");
    assert_eq!(client.money_amount, dec!(1000));
    assert_eq!(client.credit, None);
}

#[test]
fn add_client_counter_survives_in_store() {
    let engine = seeded_engine();
    engine
        .add_client("99999", "Ana", "Petrovic", "ana@example.com", dec!(1000), None)
        .unwrap();

    let seq: Sequence = decode(&engine.query_record(CLIENT_SEQ_KEY).unwrap()).unwrap();
    assert_eq!(seq.next, 5);
}

#[test]
fn add_client_rejects_occupied_key() {
    let engine = seeded_engine();
    // Occupy the key the generator would hand out next.
    let squatter = Client {
        id: cid("c4"),
        account_number: "1".into(),
        name: "X".into(),
        last_name: "Y".into(),
        email: "x@example.com".into(),
        money_amount: dec!(0),
        credit: None,
    };
    engine
        .store()
        .put("c4", bank_ledger_rs::encode(&squatter).unwrap())
        .unwrap();

    let result = engine.add_client("2", "A", "B", "a@example.com", dec!(0), None);
    assert_eq!(result, Err(EngineError::AlreadyExists("c4".into())));

    // The counter only advances as part of a successful creation.
    let seq: Sequence = decode(&engine.query_record(CLIENT_SEQ_KEY).unwrap()).unwrap();
    assert_eq!(seq.next, 4);
}

// === Standard Transfers ===

#[test]
fn standard_transfer_moves_funds() {
    let engine = seeded_engine();
    engine.transfer(&cid("c2"), &cid("c3"), dec!(9000), false).unwrap();

    assert_eq!(read_client(&engine, "c2").money_amount, dec!(5491000));
    assert_eq!(read_client(&engine, "c3").money_amount, dec!(509000));
}

#[test]
fn standard_transfer_conserves_total_balance() {
    let engine = seeded_engine();
    let before =
        read_client(&engine, "c2").money_amount + read_client(&engine, "c3").money_amount;

    engine.transfer(&cid("c2"), &cid("c3"), dec!(12345.67), false).unwrap();

    let after =
        read_client(&engine, "c2").money_amount + read_client(&engine, "c3").money_amount;
    assert_eq!(before, after);
}

#[test]
fn standard_transfer_appends_to_receiver_history() {
    let engine = seeded_engine();
    engine.transfer(&cid("c2"), &cid("c1"), dec!(777), false).unwrap();

    let history = read_history(&engine, "c1h");
    assert_eq!(history.history, vec![dec!(8000), dec!(5000), dec!(777)]);

    // Sender history untouched.
    let history = read_history(&engine, "c2h");
    assert_eq!(history.history, vec![dec!(15000)]);
}

#[test]
fn transfer_to_fresh_client_starts_history() {
    let engine = seeded_engine();
    engine
        .add_client("99999", "Ana", "Petrovic", "ana@example.com", dec!(0), None)
        .unwrap();

    engine.transfer(&cid("c2"), &cid("c4"), dec!(1000), false).unwrap();

    let history = read_history(&engine, "c4h");
    assert_eq!(history.history, vec![dec!(1000)]);
}

#[test]
fn transfer_missing_sender() {
    let engine = seeded_engine();
    let result = engine.transfer(&cid("c9"), &cid("c1"), dec!(100), false);
    assert_eq!(result, Err(EngineError::NotFound("c9".into())));
}

#[test]
fn transfer_missing_receiver() {
    let engine = seeded_engine();
    let result = engine.transfer(&cid("c1"), &cid("c9"), dec!(100), false);
    assert_eq!(result, Err(EngineError::NotFound("c9".into())));
}

#[test]
fn transfer_rejects_non_positive_amount() {
    let engine = seeded_engine();
    let result = engine.transfer(&cid("c2"), &cid("c1"), dec!(0), false);
    assert!(matches!(result, Err(EngineError::InvalidArgument(_))));

    let result = engine.transfer(&cid("c2"), &cid("c1"), dec!(-5), true);
    assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
}

#[test]
fn transfer_rejects_self_transfer() {
    let engine = seeded_engine();
    let result = engine.transfer(&cid("c1"), &cid("c1"), dec!(100), false);
    assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
}

// === Overdraft Transfers ===

#[test]
fn overdraft_covered_by_history_mean() {
    // c1 holds 500 with history [8000, 5000] (mean 6500); 5000 exceeds
    // the balance but not the mean.
    let engine = seeded_engine();
    engine.transfer(&cid("c1"), &cid("c2"), dec!(5000), true).unwrap();

    assert_eq!(read_client(&engine, "c1").money_amount, dec!(-4500));
    assert_eq!(read_client(&engine, "c2").money_amount, dec!(5505000));

    let history = read_history(&engine, "c2h");
    assert_eq!(history.history, vec![dec!(15000), dec!(5000)]);
}

#[test]
fn overdraft_denied_without_flag() {
    let engine = seeded_engine();
    let result = engine.transfer(&cid("c1"), &cid("c2"), dec!(5000), false);
    assert_eq!(result, Err(EngineError::InsufficientFunds));

    // Nothing persisted.
    assert_eq!(read_client(&engine, "c1").money_amount, dec!(500));
    assert_eq!(read_client(&engine, "c2").money_amount, dec!(5500000));
}

#[test]
fn overdraft_denied_when_mean_below_amount() {
    let engine = seeded_engine();
    let result = engine.transfer(&cid("c1"), &cid("c2"), dec!(7000), true);
    assert_eq!(result, Err(EngineError::InsufficientFunds));
}

#[test]
fn overdraft_denied_on_empty_history() {
    let engine = seeded_engine();
    engine
        .add_client("99999", "Ana", "Petrovic", "ana@example.com", dec!(100), None)
        .unwrap();

    let result = engine.transfer(&cid("c4"), &cid("c1"), dec!(500), true);
    assert_eq!(result, Err(EngineError::InsufficientFunds));
}

#[test]
fn overdraft_boundary_mean_equal_to_amount_is_permitted() {
    let engine = seeded_engine();
    engine.transfer(&cid("c1"), &cid("c2"), dec!(6500), true).unwrap();

    assert_eq!(read_client(&engine, "c1").money_amount, dec!(-6000));
}

// === Queries ===

#[test]
fn query_returns_raw_bytes() {
    let engine = seeded_engine();
    let bytes = engine.query_record("b1").unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("Intesa"));
}

#[test]
fn query_missing_key() {
    let engine = seeded_engine();
    let result = engine.query_record("b9");
    assert_eq!(result, Err(EngineError::NotFound("b9".into())));
}

// === Partial Write Failures ===

/// Store that rejects every put once its allowance runs out. Reads
/// always pass through.
struct FlakyStore {
    inner: MemoryStore,
    puts_left: AtomicUsize,
}

impl FlakyStore {
    fn seeded(puts_left: usize) -> Self {
        let inner = MemoryStore::new();
        seed(&inner).unwrap();
        Self {
            inner,
            puts_left: AtomicUsize::new(puts_left),
        }
    }
}

impl LedgerStore for FlakyStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        let left = self.puts_left.load(Ordering::SeqCst);
        if left == 0 {
            return Err(StoreError::WriteRejected(key.to_string()));
        }
        self.puts_left.store(left - 1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn history(&self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        self.inner.history(key)
    }
}

#[test]
fn transfer_write_failure_after_first_write_is_partial() {
    let engine = Engine::new(FlakyStore::seeded(1));

    let result = engine.transfer(&cid("c2"), &cid("c3"), dec!(100), false);
    assert_eq!(
        result,
        Err(EngineError::PartialWriteFailure {
            applied: 1,
            total: 3
        })
    );

    // The sender's debit landed; reconciliation is the caller's problem.
    assert_eq!(read_client(&engine, "c2").money_amount, dec!(5499900));
    assert_eq!(read_client(&engine, "c3").money_amount, dec!(500000));
}

#[test]
fn transfer_first_write_failure_is_a_plain_store_error() {
    let engine = Engine::new(FlakyStore::seeded(0));

    let result = engine.transfer(&cid("c2"), &cid("c3"), dec!(100), false);
    assert_eq!(
        result,
        Err(EngineError::Store(StoreError::WriteRejected("c2".into())))
    );

    // Nothing persisted at all.
    assert_eq!(read_client(&engine, "c2").money_amount, dec!(5500000));
    assert_eq!(read_client(&engine, "c3").money_amount, dec!(500000));
}
