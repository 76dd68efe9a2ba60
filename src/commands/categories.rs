// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{App, direction_filter};
use crate::models::Category;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    let categories = &app.services.categories;
    match m.subcommand() {
        Some(("list", sub)) => {
            let list = match direction_filter(sub)? {
                Some(direction) => categories.get_by_direction(direction).await?,
                None => categories.get_all().await?,
            };
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &list)? {
                println!("{}", category_table(&list));
            }
        }
        Some(("search", sub)) => {
            let query = sub.get_one::<String>("query").map(String::as_str).unwrap_or("");
            let found = categories.search(query).await?;
            if found.is_empty() {
                println!("No categories match '{}'", query);
            } else {
                println!("{}", category_table(&found));
            }
        }
        _ => {}
    }
    Ok(())
}

fn category_table(list: &[Category]) -> comfy_table::Table {
    let rows = list
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.emoji.to_string(),
                c.name.clone(),
                c.direction.to_string(),
            ]
        })
        .collect();
    pretty_table(&["Id", "", "Category", "Direction"], rows)
}
