use super::{block_on, open_store, orchestrator};
use crate::output::{print_json, print_table, truncate};
use clap::Subcommand;
use kodini_core::model::{parse_id, Task, TaskDraft, TaskUpdate};
use kodini_core::Workflow;
use std::path::Path;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a task to a story
    Add {
        story_id: String,
        #[arg(required = true)]
        description: Vec<String>,
        /// Why this task matters
        #[arg(long)]
        rationale: Option<String>,
    },
    /// List tasks for a story, or for a whole project with --project
    List {
        #[arg(required_unless_present = "project")]
        story_id: Option<String>,
        #[arg(long, conflicts_with = "story_id")]
        project: Option<String>,
    },
    /// Edit task fields
    Update {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        rationale: Option<String>,
    },
    /// Mark a task as done
    Complete { id: String },
    /// Mark a finished task as not done
    Reopen { id: String },
    /// Delete a task and its guidance
    Delete { id: String },
    /// Break a story into tasks with the AI and save them
    Generate { story_id: String },
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            story_id,
            description,
            rationale,
        } => add(
            root,
            &story_id,
            TaskDraft {
                description: description.join(" "),
                rationale,
            },
            json,
        ),
        TaskSubcommand::List { story_id, project } => {
            list(root, story_id.as_deref(), project.as_deref(), json)
        }
        TaskSubcommand::Update {
            id,
            description,
            rationale,
        } => update(
            root,
            &id,
            TaskUpdate {
                description,
                rationale,
                is_completed: None,
            },
            json,
        ),
        TaskSubcommand::Complete { id } => set_completed(root, &id, true, json),
        TaskSubcommand::Reopen { id } => set_completed(root, &id, false, json),
        TaskSubcommand::Delete { id } => delete(root, &id, json),
        TaskSubcommand::Generate { story_id } => generate(root, &story_id, json),
    }
}

fn add(root: &Path, story_id: &str, draft: TaskDraft, json: bool) -> anyhow::Result<()> {
    let story_id = parse_id(story_id)?;
    let store = open_store(root)?;
    let task = store.create_task(story_id, draft)?;
    if json {
        print_json(&task)?;
    } else {
        println!("Added task [{}]: {}", task.id, task.description);
    }
    Ok(())
}

fn list(
    root: &Path,
    story_id: Option<&str>,
    project_id: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let tasks = match (story_id, project_id) {
        (_, Some(project_id)) => {
            let project_id = parse_id(project_id)?;
            store.get_project(project_id)?;
            store.list_tasks_by_project(project_id)?
        }
        (Some(story_id), None) => {
            let story_id = parse_id(story_id)?;
            store.get_story(story_id)?;
            store.list_tasks(story_id)?
        }
        (None, None) => anyhow::bail!("pass a story id or --project <ID>"),
    };

    if json {
        return print_json(&tasks);
    }
    print_tasks(&tasks);
    Ok(())
}

fn update(root: &Path, id: &str, update: TaskUpdate, json: bool) -> anyhow::Result<()> {
    if update.description.is_none() && update.rationale.is_none() {
        anyhow::bail!("nothing to update: pass --description and/or --rationale");
    }
    let id = parse_id(id)?;
    let store = open_store(root)?;
    let task = store.update_task(id, update)?;
    if json {
        print_json(&task)?;
    } else {
        println!("Updated task [{}]: {}", task.id, task.description);
    }
    Ok(())
}

fn set_completed(root: &Path, id: &str, completed: bool, json: bool) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let store = open_store(root)?;
    let task = store.set_task_completed(id, completed)?;
    if json {
        print_json(&task)?;
    } else if completed {
        println!("Completed task [{}]", task.id);
    } else {
        println!("Reopened task [{}]", task.id);
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let store = open_store(root)?;
    store.delete_task(id)?;
    if json {
        print_json(&serde_json::json!({ "deleted": id }))?;
    } else {
        println!("Deleted task [{id}]");
    }
    Ok(())
}

fn generate(root: &Path, story_id: &str, json: bool) -> anyhow::Result<()> {
    let story_id = parse_id(story_id)?;
    let store = open_store(root)?;
    let orchestrator = orchestrator(root)?;
    let tasks =
        block_on(Workflow::new(&store, &orchestrator).generate_and_create_tasks(story_id))??;
    if json {
        return print_json(&tasks);
    }
    println!("Generated {} tasks", tasks.len());
    print_tasks(&tasks);
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    let rows = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                if t.is_completed { "[x]" } else { "[ ]" }.to_string(),
                truncate(&t.description, 70),
            ]
        })
        .collect();
    print_table(&["ID", "DONE", "DESCRIPTION"], rows);
}
