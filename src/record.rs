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

//! Persisted record types and their wire codec.
//!
//! Every entity serializes to a self-describing JSON object so records
//! survive independent implementations reading and writing the same
//! store. Field names on the wire are fixed; do not rename them.
//!
//! Money fields are [`Decimal`] and serialize as JSON strings, dates are
//! RFC 3339. A client's credit link is a string on the wire with the
//! sentinel [`NO_CREDIT`] standing for "no linked credit".

use crate::base::{ClientId, CreditId, HistoryKey};
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wire sentinel denoting "no linked credit".
pub const NO_CREDIT: &str = "none";

/// Encodes a record to its stored byte representation.
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, EngineError> {
    Ok(serde_json::to_vec(record)?)
}

/// Decodes a record from its stored byte representation.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EngineError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// A client account record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "IDClient")]
    pub id: ClientId,
    #[serde(rename = "AccountNumber")]
    pub account_number: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    /// May go negative only through the overdraft transfer path.
    #[serde(rename = "MoneyAmount")]
    pub money_amount: Decimal,
    #[serde(rename = "IDCredit", with = "credit_ref")]
    pub credit: Option<CreditId>,
}

/// An issued credit.
///
/// `total_num_of_rates` is the original installment count and never
/// changes after issuance; `paid_rates` only grows. The credit is closed
/// once every installment is paid, at which point the owning client's
/// link reverts to the sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    #[serde(rename = "IDCredit")]
    pub id: CreditId,
    #[serde(rename = "ApprovalDate")]
    pub approval_date: DateTime<Utc>,
    #[serde(rename = "EndDate")]
    pub end_date: DateTime<Utc>,
    /// Minimum amount accepted for one installment payment.
    #[serde(rename = "RateSize")]
    pub rate_size: Decimal,
    #[serde(rename = "InterestRate")]
    pub interest_rate: Decimal,
    #[serde(rename = "TotalNumOfRates")]
    pub total_num_of_rates: u32,
    #[serde(rename = "PaidRates")]
    pub paid_rates: u32,
    /// Issued principal.
    #[serde(rename = "MoneyAmount")]
    pub money_amount: Decimal,
}

impl Credit {
    /// True once every installment has been paid.
    pub fn is_settled(&self) -> bool {
        self.paid_rates >= self.total_num_of_rates
    }

    /// Installments still owed.
    pub fn remaining_rates(&self) -> u32 {
        self.total_num_of_rates.saturating_sub(self.paid_rates)
    }
}

/// A transfer record. Immutable once written; seed data only, never read
/// back by the engine operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "SenderID")]
    pub sender: ClientId,
    #[serde(rename = "ReceiverID")]
    pub receiver: ClientId,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
}

/// Append-only sequence of transfer amounts received by a client.
///
/// Kept as one evolving record: reads are a single `get`, appends rewrite
/// the record. The `id` field holds the history key itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientHistory {
    #[serde(rename = "IDClient")]
    pub id: HistoryKey,
    #[serde(rename = "History")]
    pub history: Vec<Decimal>,
}

impl ClientHistory {
    /// Fresh empty history for the given key.
    pub fn new(id: HistoryKey) -> Self {
        Self {
            id,
            history: Vec::new(),
        }
    }

    pub fn push(&mut self, amount: Decimal) {
        self.history.push(amount);
    }

    /// Arithmetic mean of all entries, or `None` when empty.
    pub fn mean(&self) -> Option<Decimal> {
        if self.history.is_empty() {
            return None;
        }
        let sum: Decimal = self.history.iter().copied().sum();
        Some(sum / Decimal::from(self.history.len() as u64))
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// A bank record. Seed/reference data only; not mutated by operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    #[serde(rename = "IDBank")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "EstYear")]
    pub est_year: i32,
    #[serde(rename = "OriginCountry")]
    pub origin_country: String,
    #[serde(rename = "BusinessCountries")]
    pub business_countries: BTreeSet<String>,
    #[serde(rename = "Clients")]
    pub clients: Vec<Client>,
}

/// Counter record backing sequential id allocation.
///
/// Stored under the reserved `seq:*` keys; `next` is the index the next
/// created entity will take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(rename = "Next")]
    pub next: u64,
}

mod credit_ref {
    //! Serde for the credit link: `Some(id)` is the credit key, `None`
    //! is the [`NO_CREDIT`](super::NO_CREDIT) sentinel.

    use super::NO_CREDIT;
    use crate::base::CreditId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<CreditId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_str(id.as_str()),
            None => serializer.serialize_str(NO_CREDIT),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<CreditId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw == NO_CREDIT {
            Ok(None)
        } else {
            Ok(Some(CreditId(raw)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample_client() -> Client {
        Client {
            id: ClientId("c1".into()),
            account_number: "12345".into(),
            name: "Ivan".into(),
            last_name: "Indjic".into(),
            email: "ivan@example.com".into(),
            money_amount: dec!(500),
            credit: None,
        }
    }

    #[test]
    fn client_round_trip() {
        let client = sample_client();
        let bytes = encode(&client).unwrap();
        let back: Client = decode(&bytes).unwrap();
        assert_eq!(back, client);
    }

    #[test]
    fn credit_link_sentinel_on_wire() {
        let bytes = encode(&sample_client()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["IDCredit"], "none");
    }

    #[test]
    fn credit_link_key_on_wire() {
        let mut client = sample_client();
        client.credit = Some(CreditId("cr2".into()));
        let bytes = encode(&client).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["IDCredit"], "cr2");

        let back: Client = decode(&bytes).unwrap();
        assert_eq!(back.credit, Some(CreditId("cr2".into())));
    }

    #[test]
    fn money_serializes_as_string() {
        let bytes = encode(&sample_client()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["MoneyAmount"], "500");
    }

    #[test]
    fn credit_round_trip() {
        let approval = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let credit = Credit {
            id: CreditId("cr5".into()),
            approval_date: approval,
            end_date: approval + chrono::Duration::hours(7200),
            rate_size: dec!(2800),
            interest_rate: dec!(0.4),
            total_num_of_rates: 10,
            paid_rates: 0,
            money_amount: dec!(20000),
        };
        let back: Credit = decode(&encode(&credit).unwrap()).unwrap();
        assert_eq!(back, credit);
    }

    #[test]
    fn bank_round_trip_with_nested_clients() {
        let bank = Bank {
            id: "b1".into(),
            name: "Intesa".into(),
            est_year: 1999,
            origin_country: "Serbia".into(),
            business_countries: ["Senegal".to_string(), "Bosnia".to_string()]
                .into_iter()
                .collect(),
            clients: vec![sample_client()],
        };
        let back: Bank = decode(&encode(&bank).unwrap()).unwrap();
        assert_eq!(back, bank);
    }

    #[test]
    fn history_mean() {
        let mut history = ClientHistory::new(HistoryKey("c1h".into()));
        assert_eq!(history.mean(), None);

        history.push(dec!(8000));
        history.push(dec!(5000));
        assert_eq!(history.mean(), Some(dec!(6500)));
    }

    #[test]
    fn settled_credit_detection() {
        let approval = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut credit = Credit {
            id: CreditId("cr1".into()),
            approval_date: approval,
            end_date: approval,
            rate_size: dec!(1000),
            interest_rate: dec!(0.4),
            total_num_of_rates: 3,
            paid_rates: 2,
            money_amount: dec!(3000),
        };
        assert!(!credit.is_settled());
        assert_eq!(credit.remaining_rates(), 1);

        credit.paid_rates = 3;
        assert!(credit.is_settled());
        assert_eq!(credit.remaining_rates(), 0);
    }

    #[test]
    fn decode_rejects_garbage() {
        let result: Result<Client, _> = decode(b"not json");
        assert!(result.is_err());
    }
}
