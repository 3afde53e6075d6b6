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

//! Request parsing and dispatch.
//!
//! Maps an incoming operation name and flat argument list onto the
//! engine's entry points. Pure routing: argument-count and numeric-parse
//! failures become [`EngineError::InvalidArgument`] here, every business
//! rule lives in [`Engine`].

use crate::base::{ClientId, CreditId};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::record::NO_CREDIT;
use crate::store::LedgerStore;
use rust_decimal::Decimal;
use std::str::FromStr;

/// A parsed operation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    AddClient {
        account_number: String,
        name: String,
        last_name: String,
        email: String,
        amount: Decimal,
        credit: Option<CreditId>,
    },
    Transfer {
        sender: ClientId,
        receiver: ClientId,
        amount: Decimal,
        allow_overdraft: bool,
    },
    IssueCredit {
        client: ClientId,
        amount: Decimal,
        num_installments: u32,
    },
    PayInstallment {
        client: ClientId,
        amount: Decimal,
    },
    QueryRecord {
        key: String,
    },
}

impl Request {
    /// Parses an operation name and its argument list.
    ///
    /// The original wire names `credit`, `payRate`, and `query` are
    /// accepted as aliases for `issueCredit`, `payInstallment`, and
    /// `queryRecord`.
    pub fn parse(name: &str, args: &[String]) -> Result<Self, EngineError> {
        match name {
            "addClient" => {
                expect_args(name, args, 6)?;
                Ok(Request::AddClient {
                    account_number: args[0].clone(),
                    name: args[1].clone(),
                    last_name: args[2].clone(),
                    email: args[3].clone(),
                    amount: parse_amount(&args[4])?,
                    credit: parse_credit_ref(&args[5]),
                })
            }
            "transfer" => {
                expect_args(name, args, 4)?;
                Ok(Request::Transfer {
                    sender: ClientId(args[0].clone()),
                    receiver: ClientId(args[1].clone()),
                    amount: parse_amount(&args[2])?,
                    allow_overdraft: parse_flag(&args[3])?,
                })
            }
            "issueCredit" | "credit" => {
                expect_args(name, args, 3)?;
                Ok(Request::IssueCredit {
                    client: ClientId(args[0].clone()),
                    amount: parse_amount(&args[1])?,
                    num_installments: parse_count(&args[2])?,
                })
            }
            "payInstallment" | "payRate" => {
                expect_args(name, args, 2)?;
                Ok(Request::PayInstallment {
                    client: ClientId(args[0].clone()),
                    amount: parse_amount(&args[1])?,
                })
            }
            "queryRecord" | "query" => {
                expect_args(name, args, 1)?;
                Ok(Request::QueryRecord {
                    key: args[0].clone(),
                })
            }
            other => Err(EngineError::InvalidArgument(format!(
                "unknown operation: {other}"
            ))),
        }
    }
}

/// Successful dispatch payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Operation completed with nothing to return.
    Done,
    /// Key of a newly created record.
    Created(String),
    /// Raw stored bytes for a queried key.
    Record(Vec<u8>),
}

/// Routes a parsed request to the matching engine operation.
pub fn dispatch<S: LedgerStore>(
    engine: &Engine<S>,
    request: Request,
) -> Result<Reply, EngineError> {
    match request {
        Request::AddClient {
            account_number,
            name,
            last_name,
            email,
            amount,
            credit,
        } => engine
            .add_client(&account_number, &name, &last_name, &email, amount, credit)
            .map(|id| Reply::Created(id.0)),
        Request::Transfer {
            sender,
            receiver,
            amount,
            allow_overdraft,
        } => engine
            .transfer(&sender, &receiver, amount, allow_overdraft)
            .map(|_| Reply::Done),
        Request::IssueCredit {
            client,
            amount,
            num_installments,
        } => engine
            .issue_credit(&client, amount, num_installments)
            .map(|id| Reply::Created(id.0)),
        Request::PayInstallment { client, amount } => engine
            .pay_installment(&client, amount)
            .map(|_| Reply::Done),
        Request::QueryRecord { key } => engine.query_record(&key).map(Reply::Record),
    }
}

fn expect_args(name: &str, args: &[String], want: usize) -> Result<(), EngineError> {
    if args.len() != want {
        return Err(EngineError::InvalidArgument(format!(
            "{name} takes {want} arguments, got {}",
            args.len()
        )));
    }
    Ok(())
}

fn parse_amount(raw: &str) -> Result<Decimal, EngineError> {
    Decimal::from_str(raw.trim())
        .map_err(|_| EngineError::InvalidArgument(format!("bad amount: {raw}")))
}

fn parse_count(raw: &str) -> Result<u32, EngineError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| EngineError::InvalidArgument(format!("bad installment count: {raw}")))
}

// The overdraft flag is numeric on the wire; the literal `0` closes the
// overdraft path, anything else opens it.
fn parse_flag(raw: &str) -> Result<bool, EngineError> {
    raw.trim()
        .parse::<i64>()
        .map(|value| value != 0)
        .map_err(|_| EngineError::InvalidArgument(format!("bad overdraft flag: {raw}")))
}

fn parse_credit_ref(raw: &str) -> Option<CreditId> {
    if raw == NO_CREDIT {
        None
    } else {
        Some(CreditId(raw.to_string()))
    }
}
