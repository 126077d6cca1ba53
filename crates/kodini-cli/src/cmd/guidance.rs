use super::{block_on, open_store, orchestrator};
use crate::output::print_json;
use clap::Subcommand;
use kodini_core::model::{parse_id, Guidance};
use kodini_core::{KodiniError, Workflow};
use std::path::Path;

#[derive(Subcommand)]
pub enum GuidanceSubcommand {
    /// Generate step-by-step guidance for a task, replacing any existing
    Generate { task_id: String },
    /// Show a task's guidance
    Show { task_id: String },
    /// Delete guidance by its id
    Delete { id: String },
}

pub fn run(root: &Path, subcmd: GuidanceSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        GuidanceSubcommand::Generate { task_id } => generate(root, &task_id, json),
        GuidanceSubcommand::Show { task_id } => show(root, &task_id, json),
        GuidanceSubcommand::Delete { id } => delete(root, &id, json),
    }
}

fn generate(root: &Path, task_id: &str, json: bool) -> anyhow::Result<()> {
    let task_id = parse_id(task_id)?;
    let store = open_store(root)?;
    let orchestrator = orchestrator(root)?;
    let guidance =
        block_on(Workflow::new(&store, &orchestrator).generate_and_create_guidance(task_id))??;
    if json {
        return print_json(&guidance);
    }
    print_guidance(&guidance);
    Ok(())
}

fn show(root: &Path, task_id: &str, json: bool) -> anyhow::Result<()> {
    let task_id = parse_id(task_id)?;
    let store = open_store(root)?;
    store.get_task(task_id)?;
    let guidance = store
        .guidance_for_task(task_id)?
        .ok_or_else(|| KodiniError::GuidanceNotFound(format!("task {task_id}")))?;
    if json {
        return print_json(&guidance);
    }
    print_guidance(&guidance);
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let store = open_store(root)?;
    store.delete_guidance(id)?;
    if json {
        print_json(&serde_json::json!({ "deleted": id }))?;
    } else {
        println!("Deleted guidance [{id}]");
    }
    Ok(())
}

fn print_guidance(guidance: &Guidance) {
    println!("Guidance [{}]", guidance.id);
    println!();
    for (i, step) in guidance.steps.iter().enumerate() {
        println!("{}. {}", i + 1, step.step);
        println!("   why: {}", step.rationale);
    }
    for example in guidance.code_examples.as_deref().unwrap_or_default() {
        println!();
        println!("--- {} ({}) ---", example.title, example.language);
        println!("{}", example.code);
        if let Some(explanation) = &example.explanation {
            println!("{explanation}");
        }
    }
    if let Some(summary) = &guidance.summary {
        println!();
        println!("{summary}");
    }
}
