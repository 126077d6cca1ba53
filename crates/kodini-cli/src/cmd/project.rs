use super::idea::print_ideas;
use super::{block_on, open_store, orchestrator};
use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use clap::Subcommand;
use kodini_core::model::{parse_id, ProjectUpdate};
use kodini_core::Workflow;
use std::path::Path;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Create a project from an idea
    Create {
        /// Project title
        #[arg(long)]
        title: String,
        /// The idea, in your own words
        #[arg(required = true)]
        idea: Vec<String>,
    },
    /// List your projects, newest first
    List,
    /// Show a project with its stories
    Show { id: String },
    /// Change a project's title or idea text
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        idea: Option<String>,
    },
    /// Delete a project with all its stories, tasks, and guidance
    Delete { id: String },
    /// Ask the AI to refine the project's idea
    Refine {
        id: String,
        /// Adopt the N-th refined idea (1-based) as title and idea text
        #[arg(long, value_name = "N")]
        apply: Option<usize>,
    },
    /// Ask the AI for variations on the project's idea
    Vary { id: String },
}

pub fn run(root: &Path, user: &str, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Create { title, idea } => create(root, user, &title, &idea.join(" "), json),
        ProjectSubcommand::List => list(root, user, json),
        ProjectSubcommand::Show { id } => show(root, &id, json),
        ProjectSubcommand::Update { id, title, idea } => update(
            root,
            &id,
            ProjectUpdate {
                title,
                idea_text: idea,
            },
            json,
        ),
        ProjectSubcommand::Delete { id } => delete(root, &id, json),
        ProjectSubcommand::Refine { id, apply } => refine(root, &id, apply, json),
        ProjectSubcommand::Vary { id } => vary(root, &id, json),
    }
}

fn create(root: &Path, user: &str, title: &str, idea: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let project = store.create_project(user, title, idea)?;
    if json {
        print_json(&project)?;
    } else {
        println!("Created project [{}]: {}", project.id, project.title);
    }
    Ok(())
}

fn list(root: &Path, user: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let projects = store.list_projects(user)?;

    if json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects. Create one with: kodini project create --title <TITLE> <IDEA>");
        return Ok(());
    }
    let rows = projects
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.title.clone(),
                truncate(&p.idea_text, 50),
                p.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "IDEA", "CREATED"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let store = open_store(root)?;
    let project = store.get_project(id)?;
    let stories = store.list_stories(id)?;

    if json {
        return print_json(&serde_json::json!({ "project": project, "stories": stories }));
    }
    println!("{} [{}]", project.title, project.id);
    println!("{}", project.idea_text);
    println!();
    if stories.is_empty() {
        println!("No stories yet. Try: kodini story generate {}", project.id);
        return Ok(());
    }
    let rows = stories
        .iter()
        .map(|s| vec![s.id.to_string(), s.title.clone(), truncate(&s.sentence(), 60)])
        .collect();
    print_table(&["ID", "STORY", "AS A / I WANT TO / SO THAT"], rows);
    Ok(())
}

fn update(root: &Path, id: &str, update: ProjectUpdate, json: bool) -> anyhow::Result<()> {
    if update.title.is_none() && update.idea_text.is_none() {
        anyhow::bail!("nothing to update: pass --title and/or --idea");
    }
    let id = parse_id(id)?;
    let store = open_store(root)?;
    let project = store.update_project(id, update)?;
    if json {
        print_json(&project)?;
    } else {
        println!("Updated project [{}]: {}", project.id, project.title);
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let store = open_store(root)?;
    store.delete_project(id)?;
    if json {
        print_json(&serde_json::json!({ "deleted": id }))?;
    } else {
        println!("Deleted project [{id}]");
    }
    Ok(())
}

fn refine(root: &Path, id: &str, apply: Option<usize>, json: bool) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let store = open_store(root)?;
    let orchestrator = orchestrator(root)?;
    let workflow = Workflow::new(&store, &orchestrator);
    let result = block_on(workflow.refine_project(id))??;

    let Some(n) = apply else {
        if json {
            return print_json(&result);
        }
        print_ideas(&result.ideas);
        return Ok(());
    };

    let idea = n
        .checked_sub(1)
        .and_then(|i| result.ideas.get(i))
        .with_context(|| format!("--apply {n}: only {} ideas returned", result.ideas.len()))?;
    let project = workflow.apply_idea(id, idea)?;
    if json {
        print_json(&project)?;
    } else {
        println!("Applied idea {n}: {}", project.title);
    }
    Ok(())
}

fn vary(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let store = open_store(root)?;
    let orchestrator = orchestrator(root)?;
    let result = block_on(Workflow::new(&store, &orchestrator).suggest_project_variations(id))??;
    if json {
        return print_json(&result);
    }
    print_ideas(&result.ideas);
    Ok(())
}
