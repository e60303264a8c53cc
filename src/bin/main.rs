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

use clap::Parser;
use csv::{ReaderBuilder, Trim};
use groupsplit_rs::{
    ColumnMap, Currency, DEFAULT_OPT_IN, Generator, GroupId, Member, ParticipantMap, Roster,
    Settings, UserId,
};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process;

/// Groupsplit - Turn a finance CSV export into shared-expense requests
///
/// Reads transactions from a CSV file, splits each cost between the payer
/// and the participants whose flag columns say "yes", and prints one
/// ready-to-sign expense-creation request per transaction. Signing and
/// submission are left to whatever transport wraps this tool.
#[derive(Parser, Debug)]
#[command(name = "groupsplit-rs")]
#[command(about = "Builds shared-expense requests from a finance CSV export", long_about = None)]
struct Args {
    /// Path to the CSV export
    ///
    /// Example: groupsplit-rs export.csv --group-id 77 --payer-id 100 \
    ///   --currency AED --participant 4=123456 --participant 5=789012
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Expense group id in the remote service
    #[arg(long, value_name = "ID")]
    group_id: u64,

    /// User id of the person who fronted every cost
    #[arg(long, value_name = "ID")]
    payer_id: u64,

    /// 3-letter currency code of the export (e.g. AED)
    #[arg(long, value_name = "CODE")]
    currency: String,

    /// strftime format of the date column
    #[arg(long, default_value = "%d/%m/%Y", value_name = "FORMAT")]
    date_format: String,

    /// Column index of the date cell
    #[arg(long, default_value_t = 0)]
    date_col: usize,

    /// Column index of the amount cell
    #[arg(long, default_value_t = 2)]
    amount_col: usize,

    /// Column index of the description cell
    #[arg(long, default_value_t = 1)]
    desc_col: usize,

    /// Flag-column mapping, repeatable: COL=USER_ID
    ///
    /// Order matters: earlier participants absorb a leftover minor unit
    /// first (after the payer).
    #[arg(long = "participant", value_name = "COL=USER_ID")]
    participants: Vec<String>,

    /// Group roster entry, repeatable: USER_ID=NAME
    ///
    /// Defaults to the payer plus every mapped participant when omitted.
    #[arg(long = "member", value_name = "USER_ID=NAME")]
    members: Vec<String>,

    /// Affirmative token in flag cells
    #[arg(long, default_value = DEFAULT_OPT_IN, value_name = "TOKEN")]
    opt_in: String,

    /// The CSV has no title row
    #[arg(long)]
    no_header: bool,

    /// Print requests as flat JSON objects instead of query strings
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let generator = match build_generator(&args) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let rows = match read_rows(BufReader::new(file), !args.no_header) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Error reading CSV: {e}");
            process::exit(1);
        }
    };

    // Interactive per-row confirmation lives outside this tool; the CLI
    // takes every includable row.
    for outcome in generator.requests(&rows, |_| true) {
        match outcome {
            Ok(request) => {
                if args.json {
                    match serde_json::to_string(&request) {
                        Ok(line) => println!("{line}"),
                        Err(e) => eprintln!("Error encoding request: {e}"),
                    }
                } else {
                    println!("{}", request.to_query_string());
                }
            }
            // A bad row never stops the batch.
            Err(e) => eprintln!("Skipping {e}"),
        }
    }
}

/// Builds the pipeline from command-line flags.
///
/// Fails on an unparsable participant/member flag, a bad currency code,
/// or a duplicated flag column.
fn build_generator(args: &Args) -> Result<Generator, String> {
    let currency = Currency::new(&args.currency).map_err(|e| e.to_string())?;

    let mut entries = Vec::with_capacity(args.participants.len());
    for raw in &args.participants {
        let (column, user) = split_pair(raw)?;
        let column: usize = column
            .parse()
            .map_err(|_| format!("bad column index in '{raw}'"))?;
        let user: u64 = user.parse().map_err(|_| format!("bad user id in '{raw}'"))?;
        entries.push((column, UserId(user)));
    }
    let participants = ParticipantMap::new(entries).map_err(|e| e.to_string())?;

    let roster = if args.members.is_empty() {
        default_roster(UserId(args.payer_id), &participants)
    } else {
        let mut members = Vec::with_capacity(args.members.len());
        for raw in &args.members {
            let (id, name) = split_pair(raw)?;
            let id: u64 = id.parse().map_err(|_| format!("bad user id in '{raw}'"))?;
            members.push(Member {
                id: UserId(id),
                name: name.to_string(),
            });
        }
        Roster::new(members)
    };

    let settings = Settings {
        columns: ColumnMap {
            date: args.date_col,
            amount: args.amount_col,
            description: args.desc_col,
        },
        date_format: args.date_format.clone(),
        currency,
        participants,
        payer: UserId(args.payer_id),
        group: GroupId(args.group_id),
        opt_in: args.opt_in.clone(),
    };

    Ok(Generator::new(settings, roster))
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

/// Roster assumed when none is supplied: the payer and every mapped
/// participant, with their ids as names.
fn default_roster(payer: UserId, participants: &ParticipantMap) -> Roster {
    let mut members = vec![Member {
        id: payer,
        name: payer.to_string(),
    }];
    members.extend(participants.users().map(|id| Member {
        id,
        name: id.to_string(),
    }));
    Roster::new(members)
}

/// Reads raw rows from a CSV reader.
///
/// Rows are kept as plain cell sequences; the column mapping is applied
/// later, and participant flag columns are only reachable through the raw
/// row. `flexible` tolerates the ragged rows bank exports produce.
fn read_rows<R: Read>(reader: R, has_headers: bool) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(has_headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn args(participants: &[&str]) -> Args {
        Args {
            input: PathBuf::from("unused.csv"),
            group_id: 77,
            payer_id: 100,
            currency: "USD".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            date_col: 0,
            amount_col: 2,
            desc_col: 1,
            participants: participants.iter().map(|s| s.to_string()).collect(),
            members: Vec::new(),
            opt_in: DEFAULT_OPT_IN.to_string(),
            no_header: false,
            json: false,
        }
    }

    #[test]
    fn read_rows_skips_header() {
        let csv = "date,item,amount,a,b\n14/02/2024,Coffee,10.00,yes,no\n";
        let rows = read_rows(Cursor::new(csv), true).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], vec!["14/02/2024", "Coffee", "10.00", "yes", "no"]);
    }

    #[test]
    fn read_rows_trims_and_tolerates_ragged_rows() {
        let csv = "a,b,c\n 1 , 2 , 3 \nonly,two\n";
        let rows = read_rows(Cursor::new(csv), true).unwrap();
        assert_eq!(rows[0], vec!["1", "2", "3"]);
        assert_eq!(rows[1], vec!["only", "two"]);
    }

    #[test]
    fn generator_builds_from_flags() {
        let generator = build_generator(&args(&["3=200", "4=300"])).unwrap();
        assert_eq!(generator.settings().payer, UserId(100));
        assert_eq!(generator.settings().participants.len(), 2);
        assert!(generator.roster().contains(UserId(300)));
    }

    #[test]
    fn bad_participant_flag_is_rejected() {
        assert!(build_generator(&args(&["3:200"])).is_err());
        assert!(build_generator(&args(&["x=200"])).is_err());
        assert!(build_generator(&args(&["3=abc"])).is_err());
    }

    #[test]
    fn duplicate_flag_column_is_rejected() {
        let err = build_generator(&args(&["3=200", "3=300"])).unwrap_err();
        assert!(err.contains("column 3"));
    }

    #[test]
    fn end_to_end_rows_to_query_strings() {
        let csv = "date,item,amount,p1,p2\n\
                   14/02/2024,Groceries,21.00,yes,yes\n\
                   15/02/2024,Refund,-5.00,yes,yes\n\
                   16/02/2024,Solo thing,8.00,no,no\n";
        let rows = read_rows(Cursor::new(csv), true).unwrap();
        let generator = build_generator(&args(&["3=200", "4=300"])).unwrap();

        let outcomes = generator.requests(&rows, |_| true);
        // The refund row is excluded at extraction; two requests remain.
        assert_eq!(outcomes.len(), 2);

        let first = outcomes[0].as_ref().unwrap();
        let query = first.to_query_string();
        assert!(query.contains("cost=21.00"));
        assert!(query.contains("users__0__owed_share=7.00"));
        assert!(query.contains("users__2__user_id=300"));

        let second = outcomes[1].as_ref().unwrap();
        assert_eq!(second.users().len(), 1); // nobody opted in, payer only
        assert!(second.to_query_string().contains("users__0__owed_share=8.00"));
    }
}
