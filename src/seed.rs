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

//! Bootstrap records for a freshly created ledger.

use crate::base::{
    CLIENT_SEQ_KEY, CREDIT_SEQ_KEY, ClientId, CreditId, TRANSACTION_SEQ_KEY,
};
use crate::error::EngineError;
use crate::record::{Bank, Client, ClientHistory, Credit, Sequence, Transaction, encode};
use crate::store::LedgerStore;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use tracing::info;

/// Writes the reference dataset: three clients with transfer histories,
/// four credits, four transactions, two banks, and the sequence counters
/// the engine allocates new ids from.
pub fn seed<S: LedgerStore>(store: &S) -> Result<(), EngineError> {
    let now = Utc::now();

    let client1 = client("c1", "12345", "Ivan", "Indjic", "ivan123indjic@gmail.com", dec!(500), None);
    let client2 = client(
        "c2",
        "22345",
        "Milan",
        "Simic",
        "simke123simic@gmail.com",
        dec!(5500000),
        Some(CreditId("cr2".into())),
    );
    let client3 = client(
        "c3",
        "12346",
        "Nikolina",
        "Tomic",
        "curka@gmail.com",
        dec!(500000),
        Some(CreditId("cr3".into())),
    );

    let countries: BTreeSet<String> = ["Senegal".to_string(), "Bosnia".to_string()]
        .into_iter()
        .collect();
    let bank1 = Bank {
        id: "b1".into(),
        name: "Intesa".into(),
        est_year: 1999,
        origin_country: "Serbia".into(),
        business_countries: countries.clone(),
        clients: vec![client1.clone(), client2.clone()],
    };
    let bank2 = Bank {
        id: "b2".into(),
        name: "Unicredit".into(),
        est_year: 2002,
        origin_country: "Serbia".into(),
        business_countries: countries,
        clients: vec![client3.clone()],
    };

    let records: Vec<(String, Vec<u8>)> = vec![
        (
            "c1h".into(),
            encode(&history(&client1.id, &[dec!(8000), dec!(5000)]))?,
        ),
        ("c2h".into(), encode(&history(&client2.id, &[dec!(15000)]))?),
        ("c3h".into(), encode(&history(&client3.id, &[dec!(9000)]))?),
        ("c1".into(), encode(&client1)?),
        ("c2".into(), encode(&client2)?),
        ("c3".into(), encode(&client3)?),
        ("t1".into(), encode(&transaction("t1", now, "c2", "c1", dec!(5000)))?),
        (
            "t2".into(),
            encode(&transaction("t2", now + Duration::minutes(1), "c1", "c2", dec!(15000)))?,
        ),
        (
            "t3".into(),
            encode(&transaction("t3", now + Duration::minutes(2), "c3", "c1", dec!(8000)))?,
        ),
        (
            "t4".into(),
            encode(&transaction("t4", now + Duration::minutes(3), "c2", "c3", dec!(9000)))?,
        ),
        (
            "cr1".into(),
            encode(&credit("cr1", now, 120, dec!(1000), dec!(0.7), 100, 22, dec!(100000)))?,
        ),
        (
            "cr2".into(),
            encode(&credit("cr2", now, 420, dec!(2000), dec!(0.2), 100, 12, dec!(200000)))?,
        ),
        (
            "cr3".into(),
            encode(&credit("cr3", now, 520, dec!(3000), dec!(0.3), 100, 25, dec!(300000)))?,
        ),
        (
            "cr4".into(),
            encode(&credit("cr4", now, 620, dec!(4000), dec!(0.1), 100, 55, dec!(400000)))?,
        ),
        ("b1".into(), encode(&bank1)?),
        ("b2".into(), encode(&bank2)?),
        (CLIENT_SEQ_KEY.into(), encode(&Sequence { next: 4 })?),
        (CREDIT_SEQ_KEY.into(), encode(&Sequence { next: 5 })?),
        (TRANSACTION_SEQ_KEY.into(), encode(&Sequence { next: 5 })?),
    ];

    for (key, bytes) in records {
        store.put(&key, bytes)?;
    }
    info!("ledger seeded");
    Ok(())
}

fn client(
    id: &str,
    account_number: &str,
    name: &str,
    last_name: &str,
    email: &str,
    money_amount: Decimal,
    credit: Option<CreditId>,
) -> Client {
    Client {
        id: ClientId(id.into()),
        account_number: account_number.into(),
        name: name.into(),
        last_name: last_name.into(),
        email: email.into(),
        money_amount,
        credit,
    }
}

fn history(owner: &ClientId, amounts: &[Decimal]) -> ClientHistory {
    ClientHistory {
        id: owner.history_key(),
        history: amounts.to_vec(),
    }
}

fn transaction(
    id: &str,
    date: DateTime<Utc>,
    sender: &str,
    receiver: &str,
    amount: Decimal,
) -> Transaction {
    Transaction {
        id: id.into(),
        date,
        sender: ClientId(sender.into()),
        receiver: ClientId(receiver.into()),
        amount,
    }
}

#[allow(clippy::too_many_arguments)]
fn credit(
    id: &str,
    approval: DateTime<Utc>,
    duration_hours: i64,
    rate_size: Decimal,
    interest_rate: Decimal,
    total: u32,
    paid: u32,
    amount: Decimal,
) -> Credit {
    Credit {
        id: CreditId(id.into()),
        approval_date: approval,
        end_date: approval + Duration::hours(duration_hours),
        rate_size,
        interest_rate,
        total_num_of_rates: total,
        paid_rates: paid,
        money_amount: amount,
    }
}
