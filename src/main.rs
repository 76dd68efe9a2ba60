// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use ledgersync::commands::{self, App};
use ledgersync::config::Config;
use ledgersync::services::Stores;
use ledgersync::{cli, db, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    logging::init_tracing(matches.get_flag("verbose"));

    let config = Config::from_matches(&matches)?;
    let conn = db::open_or_init(&config.db_path)?;
    let stores = Stores::sqlite(conn);

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", config.db_path.display());
        }
        Some(("doctor", _)) => commands::doctor::handle(&stores)?,
        Some(("maintenance", sub)) => commands::maintenance::handle(&stores, sub)?,
        Some(("account", sub)) => {
            commands::accounts::handle(&App::connect(config, stores)?, sub).await?
        }
        Some(("category", sub)) => {
            commands::categories::handle(&App::connect(config, stores)?, sub).await?
        }
        Some(("tx", sub)) => {
            commands::transactions::handle(&App::connect(config, stores)?, sub).await?
        }
        Some(("export", sub)) => {
            commands::exporter::handle(&App::connect(config, stores)?, sub).await?
        }
        Some(("sync", _)) => commands::sync::handle(&App::connect(config, stores)?).await?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
