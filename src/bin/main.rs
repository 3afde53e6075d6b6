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

use bank_ledger_rs::{Engine, MemoryStore, Reply, Request, dispatch, seed};
use clap::Parser;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Bank Ledger - Process operation batches against the ledger
///
/// Reads operations from a CSV file and prints one result line per
/// operation. Supports client creation, transfers, credit issuance,
/// installment payment, and raw record queries.
#[derive(Parser, Debug)]
#[command(name = "bank-ledger-rs")]
#[command(about = "A banking ledger engine that processes operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Each row is: op,arg1,arg2,...
    /// Example: transfer,c1,c2,5000,1
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Start from an empty ledger instead of the bootstrap dataset
    #[arg(long)]
    no_seed: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let engine = Engine::new(MemoryStore::new());
    if !args.no_seed {
        if let Err(e) = seed(engine.store()) {
            eprintln!("Error seeding ledger: {}", e);
            process::exit(1);
        }
    }

    // Process operations, writing one result line per row to stdout
    if let Err(e) = process_operations(BufReader::new(file), &engine, std::io::stdout()) {
        eprintln!("Error processing operations: {}", e);
        process::exit(1);
    }
}

/// Processes an operation batch from a CSV reader.
///
/// Rows are streamed; arbitrarily large batches never load into memory
/// at once. The first field of each row is the operation name, the rest
/// is its flat argument list. Malformed rows are skipped; operation
/// failures are reported on the row's result line and don't stop
/// processing.
///
/// # CSV Format
///
/// ```csv
/// addClient,99999,Ana,Petrovic,ana@example.com,1000,none
/// transfer,c1,c2,5000,1
/// issueCredit,c1,20000,10
/// payInstallment,c1,2800
/// queryRecord,c1
/// ```
///
/// # Errors
///
/// Returns an I/O error if writing a result line fails.
pub fn process_operations<R: Read, S: bank_ledger_rs::LedgerStore, W: Write>(
    reader: R,
    engine: &Engine<S>,
    mut writer: W,
) -> std::io::Result<()> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " transfer "
        .flexible(true) // Operations take different argument counts
        .has_headers(false)
        .from_reader(reader);

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(_err) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {_err}");
                continue;
            }
        };

        let mut fields = record.iter();
        let Some(name) = fields.next() else { continue };
        if name.is_empty() {
            continue;
        }
        let op_args: Vec<String> = fields.map(str::to_string).collect();

        match Request::parse(name, &op_args).and_then(|request| dispatch(engine, request)) {
            Ok(Reply::Done) => writeln!(writer, "{name}: ok")?,
            Ok(Reply::Created(key)) => writeln!(writer, "{name}: created {key}")?,
            Ok(Reply::Record(bytes)) => {
                writeln!(writer, "{name}: {}", String::from_utf8_lossy(&bytes))?
            }
            Err(err) => writeln!(writer, "{name}: error: {err}")?,
        }
    }

    Ok(())
}
