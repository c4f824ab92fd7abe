//! Policy command implementation
//!
//! Shows how group names resolve to bake policy.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::process::ExitCode;

use bakeline_pipeline::{BakePolicy, Category};

#[derive(Debug, Serialize)]
struct PolicyRow<'a> {
    name: &'a str,
    #[serde(flatten)]
    policy: BakePolicy,
    /// Final texture size under the given multiplier.
    resolution: u32,
    category: Option<Category>,
}

fn category_of(name: &str) -> Option<Category> {
    Category::ORDER.into_iter().find(|c| c.matches(name))
}

/// Run the policy command
pub fn run(names: &[String], multiplier: f32, json_output: bool) -> Result<ExitCode> {
    let rows: Vec<_> = names
        .iter()
        .map(|name| {
            let policy = BakePolicy::resolve(name);
            PolicyRow {
                name,
                policy,
                resolution: policy.resolution(multiplier),
                category: category_of(name),
            }
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(ExitCode::SUCCESS);
    }

    for row in &rows {
        let yes_no = |b: bool| if b { "yes".green() } else { "no".dimmed() };
        println!("{}", row.name.cyan().bold());
        println!(
            "  category:   {}",
            row.category
                .map(|c| c.token().to_string())
                .unwrap_or_else(|| "none (not processed as a root)".to_string())
        );
        println!("  join:       {}", yes_no(row.policy.join));
        println!("  unwrap:     {}", yes_no(row.policy.unwrap));
        println!("  vert:       {}", yes_no(row.policy.vert));
        println!("  tex:        {}", yes_no(row.policy.tex));
        println!(
            "  resolution: {} (tier {} x {})",
            row.resolution, row.policy.resolution_tier, multiplier
        );
    }
    Ok(ExitCode::SUCCESS)
}
