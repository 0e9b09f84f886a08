use std::fmt::Write as _;

use colored::Colorize;
use stateboard_sdk::{
    Activity, AttributeValue, DiffResult, LeafChange, ResourceChange, Snapshot, Stateboard,
};
use stateboard_server::{ServerConfig, StateboardServer};

use crate::cli::*;

pub async fn run_command(cli: Cli, config: ServerConfig) -> anyhow::Result<()> {
    if let Command::Serve(_) = cli.command {
        return StateboardServer::new(config)?.serve().await.map_err(Into::into);
    }

    let board = config.open_board()?;
    let json = cli.format == OutputFormat::Json;
    match cli.command {
        Command::Serve(_) => Ok(()),
        Command::States => cmd_states(&board, json).await,
        Command::Show(args) => cmd_show(&board, args, json).await,
        Command::Activity(args) => cmd_activity(&board, args, json).await,
        Command::Compare(args) => cmd_compare(&board, args, json).await,
    }
}

async fn cmd_states(board: &Stateboard, json: bool) -> anyhow::Result<()> {
    let states = board.list_states().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&states)?);
    } else if states.is_empty() {
        println!("No states.");
    } else {
        for state in &states {
            println!("{}", state.bold());
        }
    }
    Ok(())
}

async fn cmd_show(board: &Stateboard, args: ShowArgs, json: bool) -> anyhow::Result<()> {
    let snapshot = board.get_version(&args.state, &args.serial).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_snapshot(&snapshot));
    }
    Ok(())
}

async fn cmd_activity(board: &Stateboard, args: ActivityArgs, json: bool) -> anyhow::Result<()> {
    let activity = board.list_activity(&args.state).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&activity)?);
    } else {
        print!("{}", render_activity(&activity));
    }
    Ok(())
}

async fn cmd_compare(board: &Stateboard, args: CompareArgs, json: bool) -> anyhow::Result<()> {
    let diff = board.compare_versions(&args.state, &args.from, &args.to).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        print!("{}", render_diff(&diff));
    }
    Ok(())
}

pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "State {}  serial {}",
        snapshot.state.bold(),
        snapshot.serial.to_string().yellow()
    );
    let _ = writeln!(out, "  Modified: {}", snapshot.last_modified.to_rfc3339());
    if !snapshot.tool_version.is_empty() {
        let _ = writeln!(out, "  Terraform: {}", snapshot.tool_version);
    }
    if let Some(lineage) = &snapshot.lineage {
        let _ = writeln!(out, "  Lineage: {}", lineage.dimmed());
    }
    let _ = writeln!(out, "  Resources: {}", snapshot.resources.len());
    for key in snapshot.resources.keys() {
        let _ = writeln!(out, "    {}", key.to_string().cyan());
    }
    out
}

pub fn render_activity(activity: &Activity) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Activity for {}", activity.state().bold());
    for entry in activity {
        let _ = writeln!(
            out,
            "  {:>6}  {}",
            entry.serial.to_string().yellow(),
            entry.last_modified.to_rfc3339()
        );
    }
    out
}

pub fn render_diff(diff: &DiffResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Comparing {} serial {} → {}",
        diff.state.bold(),
        diff.from.serial.to_string().yellow(),
        diff.to.serial.to_string().yellow()
    );
    if diff.is_empty() {
        let _ = writeln!(out, "No changes.");
        return out;
    }

    for change in &diff.changes {
        match change {
            ResourceChange::Added { key, new } => {
                let _ = writeln!(out, "{} {}", "+".green().bold(), key.to_string().green());
                for (name, value) in new {
                    let _ = writeln!(out, "    {name} = {}", value);
                }
            }
            ResourceChange::Removed { key, old } => {
                let _ = writeln!(out, "{} {}", "-".red().bold(), key.to_string().red());
                for (name, value) in old {
                    let _ = writeln!(out, "    {name} = {}", value);
                }
            }
            ResourceChange::Modified { key, attributes } => {
                let _ = writeln!(out, "{} {}", "~".yellow().bold(), key.to_string().yellow());
                for leaf in attributes.iter().flat_map(|a| a.leaf_changes()) {
                    let _ = writeln!(out, "    {}", render_leaf(&leaf));
                }
            }
        }
    }

    let summary = &diff.summary;
    let _ = writeln!(
        out,
        "\n{} added, {} removed, {} modified",
        summary.additions.to_string().green(),
        summary.removals.to_string().red(),
        summary.modifications.to_string().yellow()
    );
    out
}

fn render_leaf(leaf: &LeafChange) -> String {
    let show = |v: &Option<AttributeValue>| match v {
        Some(value) => value.to_string(),
        None => "(absent)".to_string(),
    };
    format!(
        "{}: {} => {}",
        leaf.path,
        show(&leaf.old).red(),
        show(&leaf.new).green()
    )
}
