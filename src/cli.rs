// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("from")
            .long("from")
            .help("First day, YYYY-MM-DD (default: one month ago)"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .help("Last day, YYYY-MM-DD (default: today)"),
    )
}

fn direction_arg() -> Arg {
    Arg::new("direction")
        .long("direction")
        .value_parser(["income", "outcome"])
}

pub fn build_cli() -> Command {
    Command::new("ledgersync")
        .version(clap::crate_version!())
        .about("Offline-first personal finance ledger")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .env("LEDGERSYNC_API_URL")
                .help("API base URL including /api/v1"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .env("LEDGERSYNC_API_TOKEN")
                .hide_env_values(true)
                .help("Bearer token"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("LEDGERSYNC_DB")
                .help("Path of the local SQLite database"),
        )
        .arg(
            Arg::new("utc-offset")
                .long("utc-offset")
                .global(true)
                .env("LEDGERSYNC_UTC_OFFSET")
                .help("Offset used for day boundaries, e.g. +03:00"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("account")
                .about("Show or change the bank account")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("balance").long("balance").required(true))
                        .arg(Arg::new("currency").long("currency")),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("List categories")
                .subcommand(json_flags(Command::new("list").arg(direction_arg())))
                .subcommand(Command::new("search").arg(Arg::new("query").required(true))),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(json_flags(range_args(
                    Command::new("list")
                        .arg(direction_arg())
                        .arg(
                            Arg::new("sort")
                                .long("sort")
                                .value_parser(["date", "amount"])
                                .default_value("date"),
                        ),
                )))
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("comment").long("comment")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .allow_negative_numbers(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("comment").long("comment")),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .allow_negative_numbers(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(Command::new("sync").about("Replay queued changes against the server"))
        .subcommand(
            Command::new("export").about("Export data").subcommand(range_args(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .value_parser(["csv", "json"])
                            .default_value("json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            )),
        )
        .subcommand(Command::new("doctor").about("Report queued changes and local state"))
        .subcommand(
            Command::new("maintenance").subcommand(
                Command::new("reset-ids")
                    .about("Restart the temporary id sequence")
                    .arg(
                        Arg::new("force")
                            .long("force")
                            .action(ArgAction::SetTrue)
                            .help("Reset even if changes are still queued"),
                    ),
            ),
        )
}
