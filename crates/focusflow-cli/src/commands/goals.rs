use clap::Subcommand;
use focusflow_core::{Config, GoalList};

use super::{open_store, CmdResult};

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals with completion progress
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a goal
    Add { text: String },
    /// Toggle a goal's completion
    Toggle { id: i64 },
    /// Remove a goal
    Remove { id: i64 },
}

pub fn run(config: &Config, action: GoalsAction) -> CmdResult {
    let store = open_store(config)?;
    let mut goals = GoalList::load(&*store)?;

    match action {
        GoalsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&goals)?);
            } else {
                for goal in goals.iter() {
                    let mark = if goal.completed { "x" } else { " " };
                    println!("[{mark}] {:>13}  {}", goal.id, goal.text);
                }
                println!(
                    "{}/{} complete ({}%)",
                    goals.completed_count(),
                    goals.len(),
                    goals.progress_pct()
                );
            }
        }
        GoalsAction::Add { text } => {
            let Some(goal) = goals.add(&text).cloned() else {
                return Err("goal text must not be empty".into());
            };
            goals.save(&*store)?;
            println!("{}", serde_json::to_string_pretty(&goal)?);
        }
        GoalsAction::Toggle { id } => {
            let Some(completed) = goals.toggle(id) else {
                return Err(format!("no goal with id {id}").into());
            };
            goals.save(&*store)?;
            println!("goal {id} {}", if completed { "completed" } else { "reopened" });
        }
        GoalsAction::Remove { id } => {
            if !goals.remove(id) {
                return Err(format!("no goal with id {id}").into());
            }
            goals.save(&*store)?;
            println!("goal {id} removed");
        }
    }
    Ok(())
}
