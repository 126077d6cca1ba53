use super::{block_on, orchestrator};
use crate::output::print_json;
use clap::Subcommand;
use kodini_core::types::{GeneratedStory, RefinedIdea};
use std::path::Path;

#[derive(Subcommand)]
pub enum IdeaSubcommand {
    /// Three clearer, more specific versions of an idea
    Refine {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Creative variations on an idea
    Vary {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// User stories for an idea
    Stories {
        #[arg(required = true)]
        text: Vec<String>,
    },
}

pub fn run(root: &Path, subcmd: IdeaSubcommand, json: bool) -> anyhow::Result<()> {
    let orchestrator = orchestrator(root)?;
    match subcmd {
        IdeaSubcommand::Refine { text } => {
            let result = block_on(orchestrator.refine_idea(&text.join(" ")))??;
            if json {
                return print_json(&result);
            }
            print_ideas(&result.ideas);
        }
        IdeaSubcommand::Vary { text } => {
            let result = block_on(orchestrator.suggest_variations(&text.join(" ")))??;
            if json {
                return print_json(&result);
            }
            print_ideas(&result.ideas);
        }
        IdeaSubcommand::Stories { text } => {
            let result = block_on(orchestrator.generate_stories(&text.join(" ")))??;
            if json {
                return print_json(&result);
            }
            print_stories(&result.stories);
        }
    }
    Ok(())
}

pub fn print_ideas(ideas: &[RefinedIdea]) {
    for (i, idea) in ideas.iter().enumerate() {
        println!("{}. {}", i + 1, idea.title);
        println!("   {}", idea.description);
        if !idea.tags.is_empty() {
            println!("   tags: {}", idea.tags.join(", "));
        }
    }
}

fn print_stories(stories: &[GeneratedStory]) {
    for (i, story) in stories.iter().enumerate() {
        println!("{}. {}", i + 1, story.title);
        println!(
            "   As a {}, I want to {}, so that {}",
            story.as_a, story.i_want_to, story.so_that
        );
        if let Some(rationale) = &story.rationale {
            println!("   why: {rationale}");
        }
    }
}
