use super::{block_on, open_store, orchestrator};
use crate::output::{print_json, print_table, truncate};
use clap::{Args, Subcommand};
use kodini_core::model::{parse_id, Story, StoryDraft, StoryUpdate};
use kodini_core::Workflow;
use std::path::Path;

#[derive(Subcommand)]
pub enum StorySubcommand {
    /// Add a hand-written story to a project
    Add {
        project_id: String,
        #[arg(long)]
        title: String,
        #[command(flatten)]
        parts: StoryParts,
    },
    /// List a project's stories
    List { project_id: String },
    /// Edit story fields
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long = "as-a")]
        as_a: Option<String>,
        #[arg(long = "i-want-to")]
        i_want_to: Option<String>,
        #[arg(long = "so-that")]
        so_that: Option<String>,
        #[arg(long)]
        rationale: Option<String>,
    },
    /// Delete a story with its tasks and guidance
    Delete { id: String },
    /// Generate user stories from the project's idea and save them
    Generate { project_id: String },
}

#[derive(Args)]
pub struct StoryParts {
    /// Who wants this ("As a ...")
    #[arg(long = "as-a")]
    as_a: String,
    /// What they want ("I want to ...")
    #[arg(long = "i-want-to")]
    i_want_to: String,
    /// Why ("so that ...")
    #[arg(long = "so-that")]
    so_that: String,
    #[arg(long)]
    rationale: Option<String>,
}

pub fn run(root: &Path, subcmd: StorySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        StorySubcommand::Add {
            project_id,
            title,
            parts,
        } => add(
            root,
            &project_id,
            StoryDraft {
                title,
                as_a: parts.as_a,
                i_want_to: parts.i_want_to,
                so_that: parts.so_that,
                rationale: parts.rationale,
            },
            json,
        ),
        StorySubcommand::List { project_id } => list(root, &project_id, json),
        StorySubcommand::Update {
            id,
            title,
            as_a,
            i_want_to,
            so_that,
            rationale,
        } => update(
            root,
            &id,
            StoryUpdate {
                title,
                as_a,
                i_want_to,
                so_that,
                rationale,
            },
            json,
        ),
        StorySubcommand::Delete { id } => delete(root, &id, json),
        StorySubcommand::Generate { project_id } => generate(root, &project_id, json),
    }
}

fn add(root: &Path, project_id: &str, draft: StoryDraft, json: bool) -> anyhow::Result<()> {
    let project_id = parse_id(project_id)?;
    let store = open_store(root)?;
    let story = store.create_story(project_id, draft)?;
    if json {
        print_json(&story)?;
    } else {
        println!("Added story [{}]: {}", story.id, story.title);
    }
    Ok(())
}

fn list(root: &Path, project_id: &str, json: bool) -> anyhow::Result<()> {
    let project_id = parse_id(project_id)?;
    let store = open_store(root)?;
    // Surface a missing project instead of an empty list.
    store.get_project(project_id)?;
    let stories = store.list_stories(project_id)?;
    if json {
        return print_json(&stories);
    }
    print_stories(&stories);
    Ok(())
}

fn update(root: &Path, id: &str, update: StoryUpdate, json: bool) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let store = open_store(root)?;
    let story = store.update_story(id, update)?;
    if json {
        print_json(&story)?;
    } else {
        println!("Updated story [{}]: {}", story.id, story.sentence());
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let store = open_store(root)?;
    store.delete_story(id)?;
    if json {
        print_json(&serde_json::json!({ "deleted": id }))?;
    } else {
        println!("Deleted story [{id}]");
    }
    Ok(())
}

fn generate(root: &Path, project_id: &str, json: bool) -> anyhow::Result<()> {
    let project_id = parse_id(project_id)?;
    let store = open_store(root)?;
    let orchestrator = orchestrator(root)?;
    let stories =
        block_on(Workflow::new(&store, &orchestrator).generate_and_create_stories(project_id))??;
    if json {
        return print_json(&stories);
    }
    println!("Generated {} stories", stories.len());
    print_stories(&stories);
    Ok(())
}

fn print_stories(stories: &[Story]) {
    if stories.is_empty() {
        println!("No stories.");
        return;
    }
    let rows = stories
        .iter()
        .map(|s| vec![s.id.to_string(), s.title.clone(), truncate(&s.sentence(), 70)])
        .collect();
    print_table(&["ID", "TITLE", "STORY"], rows);
}
