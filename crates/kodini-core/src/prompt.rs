use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::OnceLock;
use thiserror::Error;

use crate::types::Intent;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("prompt template '{template}' needs a value for '{{{name}}}'")]
    MissingPlaceholder {
        template: &'static str,
        name: String,
    },

    #[error("prompt template '{template}' has no placeholder '{{{name}}}'")]
    UnknownPlaceholder {
        template: &'static str,
        name: String,
    },
}

// ---------------------------------------------------------------------------
// PromptTemplate
// ---------------------------------------------------------------------------

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").unwrap())
}

/// A fixed prompt body with `{name}` placeholders.
///
/// Only `{` identifier `}` is a placeholder, so JSON examples embedded in a
/// template (`{"ideas": ...}` or a `{` at end of line) pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub body: &'static str,
}

impl PromptTemplate {
    pub const fn new(name: &'static str, body: &'static str) -> Self {
        Self { name, body }
    }

    /// Distinct placeholder names, sorted.
    pub fn placeholders(&self) -> BTreeSet<&'static str> {
        placeholder_re()
            .captures_iter(self.body)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Substitute every placeholder with its value.
    ///
    /// Every placeholder must be supplied and every supplied name must occur
    /// in the template. Values are inserted verbatim in a single pass; a value
    /// that itself looks like `{name}` is not expanded again.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String, PromptError> {
        let expected: BTreeSet<&str> = self.placeholders();
        let supplied: BTreeSet<&str> = vars.iter().map(|(name, _)| *name).collect();

        if let Some(missing) = expected.difference(&supplied).next() {
            return Err(PromptError::MissingPlaceholder {
                template: self.name,
                name: missing.to_string(),
            });
        }
        if let Some(unknown) = supplied.difference(&expected).next() {
            return Err(PromptError::UnknownPlaceholder {
                template: self.name,
                name: unknown.to_string(),
            });
        }

        let rendered = placeholder_re().replace_all(self.body, |caps: &Captures| {
            let name = &caps[1];
            vars.iter()
                .find(|(n, _)| *n == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub const REFINE_IDEA: PromptTemplate = PromptTemplate::new(
    "refine_idea",
    r#"
You are an expert software development advisor helping a novice developer refine their project idea.

Original idea:
"""
{ideaText}
"""

Please generate 3 refined versions of this idea that are more specific, focused, and implementable.
For each refined idea, provide:
1. A concise title (max 5 words)
2. A detailed description (2-3 sentences)
3. 2-3 relevant tags (e.g., "Beginner", "Web", "Mobile", "API", "Database", etc.)

Format your response as valid JSON with the following structure:
{
"ideas": [
  {
    "title": "string",
    "description": "string",
    "tags": ["string", "string"]
  },
  ...
]
}
"#,
);

pub const SUGGEST_VARIATIONS: PromptTemplate = PromptTemplate::new(
    "suggest_variations",
    r#"
You are an expert software development advisor helping a novice developer explore variations of their project idea.

Original idea:
"""
{ideaText}
"""

Please generate 3 creative variations of this idea that explore different approaches, features, or target audiences.
For each variation, provide:
1. A concise title (max 5 words)
2. A detailed description (2-3 sentences)
3. 2-3 relevant tags (e.g., "Beginner", "Web", "Mobile", "API", "Database", etc.)

Format your response as valid JSON with the following structure:
{
"ideas": [
  {
    "title": "string",
    "description": "string",
    "tags": ["string", "string"]
  },
  ...
]
}
"#,
);

pub const GENERATE_TASKS: PromptTemplate = PromptTemplate::new(
    "generate_tasks",
    r#"
You are an expert software development advisor helping a novice developer break down a user story into specific development tasks.

User Story:
Title: {storyTitle}
As a {asA}, I want to {iWantTo}, so that {soThat}

Please generate 4-6 specific, actionable development tasks that would be needed to implement this user story.
Each task should be concrete enough that a developer would know exactly what to build.

For each task, provide:
1. A clear, specific description of what needs to be done
2. A brief rationale explaining why this task is necessary (optional)

Format your response as valid JSON with the following structure:
{
"tasks": [
  {
    "description": "string",
    "rationale": "string"
  },
  ...
]
}

Ensure the tasks cover both frontend and backend aspects where applicable, and follow a logical sequence.
"#,
);

pub const GENERATE_GUIDANCE: PromptTemplate = PromptTemplate::new(
    "generate_guidance",
    r#"
You are an expert software development advisor helping a novice developer implement a specific task in their project.

Project Context:
Project: {projectTitle}
User Story: As a {asA}, I want to {iWantTo}, so that {soThat}

Task to implement:
"""
{taskDescription}
"""

Please provide detailed step-by-step guidance on how to implement this task. For each step:
1. Provide a clear instruction on what to do
2. Include a rationale explaining why this step is important or how it contributes to the overall task

Additionally, provide 1-3 code examples that demonstrate key aspects of the implementation. Each example should include:
1. A title describing what the code does
2. The programming language
3. The code snippet itself
4. A brief explanation of how the code works (optional)

Format your response as valid JSON with the following structure:
{
"steps": [
  {
    "step": "string",
    "rationale": "string"
  },
  ...
],
"codeExamples": [
  {
    "title": "string",
    "language": "string",
    "code": "string",
    "explanation": "string"
  },
  ...
],
"summary": "string"
}

Focus on providing educational guidance that helps the developer learn while implementing. Avoid providing complete solutions that the developer can copy-paste without understanding.
"#,
);

pub const GENERATE_STORIES: PromptTemplate = PromptTemplate::new(
    "generate_stories",
    r#"
You are an expert software development advisor helping a novice developer create user stories for their project.

Project idea:
"""
{ideaText}
"""

Please generate 5 well-structured user stories following the "As a [role], I want to [action], so that [benefit]" format.
For each user story:
1. Create a concise title
2. Specify the user role (as a...)
3. Describe what they want to do (I want to...)
4. Explain the benefit (so that...)
5. Include a brief rationale explaining why this story is important for the project

Format your response as valid JSON with the following structure:
{
  "stories": [
    {
      "title": "string",
      "asA": "string",
      "iWantTo": "string",
      "soThat": "string",
      "rationale": "string"
    },
    ...
  ]
}

Ensure the stories are specific, valuable, and cover different aspects of the application.
"#,
);

pub fn template_for(intent: Intent) -> &'static PromptTemplate {
    match intent {
        Intent::RefineIdea => &REFINE_IDEA,
        Intent::SuggestVariations => &SUGGEST_VARIATIONS,
        Intent::GenerateTasks => &GENERATE_TASKS,
        Intent::GenerateGuidance => &GENERATE_GUIDANCE,
        Intent::GenerateStories => &GENERATE_STORIES,
    }
}

// ---------------------------------------------------------------------------
// Per-intent builders
// ---------------------------------------------------------------------------

pub fn refine_idea_prompt(idea_text: &str) -> Result<String, PromptError> {
    REFINE_IDEA.render(&[("ideaText", idea_text)])
}

pub fn suggest_variations_prompt(idea_text: &str) -> Result<String, PromptError> {
    SUGGEST_VARIATIONS.render(&[("ideaText", idea_text)])
}

pub fn generate_tasks_prompt(
    story_title: &str,
    as_a: &str,
    i_want_to: &str,
    so_that: &str,
) -> Result<String, PromptError> {
    GENERATE_TASKS.render(&[
        ("storyTitle", story_title),
        ("asA", as_a),
        ("iWantTo", i_want_to),
        ("soThat", so_that),
    ])
}

pub fn generate_guidance_prompt(
    project_title: &str,
    as_a: &str,
    i_want_to: &str,
    so_that: &str,
    task_description: &str,
) -> Result<String, PromptError> {
    GENERATE_GUIDANCE.render(&[
        ("projectTitle", project_title),
        ("asA", as_a),
        ("iWantTo", i_want_to),
        ("soThat", so_that),
        ("taskDescription", task_description),
    ])
}

pub fn generate_stories_prompt(idea_text: &str) -> Result<String, PromptError> {
    GENERATE_STORIES.render(&[("ideaText", idea_text)])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_expose_only_their_placeholders() {
        let names = |t: &PromptTemplate| t.placeholders().into_iter().collect::<Vec<_>>();
        assert_eq!(names(&REFINE_IDEA), vec!["ideaText"]);
        assert_eq!(names(&SUGGEST_VARIATIONS), vec!["ideaText"]);
        assert_eq!(names(&GENERATE_STORIES), vec!["ideaText"]);
        assert_eq!(
            names(&GENERATE_TASKS),
            vec!["asA", "iWantTo", "soThat", "storyTitle"]
        );
        assert_eq!(
            names(&GENERATE_GUIDANCE),
            vec!["asA", "iWantTo", "projectTitle", "soThat", "taskDescription"]
        );
    }

    #[test]
    fn render_is_idempotent() {
        let a = generate_tasks_prompt("Task Creation", "user", "create new tasks", "I can track work")
            .unwrap();
        let b = generate_tasks_prompt("Task Creation", "user", "create new tasks", "I can track work")
            .unwrap();
        assert_eq!(a, b);
        assert!(a.contains("Title: Task Creation"));
        assert!(a.contains("As a user, I want to create new tasks, so that I can track work"));
        assert!(!a.contains("{storyTitle}"));
    }

    #[test]
    fn json_braces_survive_rendering() {
        let out = refine_idea_prompt("a todo app").unwrap();
        assert!(out.contains("\"ideas\": ["));
        assert!(out.contains("{\n\"ideas\""));
        assert!(out.contains("\"\"\"\na todo app\n\"\"\""));
    }

    #[test]
    fn missing_placeholder_fails() {
        let err = GENERATE_TASKS
            .render(&[("storyTitle", "t"), ("asA", "u"), ("iWantTo", "x")])
            .unwrap_err();
        assert_eq!(
            err,
            PromptError::MissingPlaceholder {
                template: "generate_tasks",
                name: "soThat".into()
            }
        );
    }

    #[test]
    fn unknown_placeholder_fails() {
        let err = REFINE_IDEA
            .render(&[("ideaText", "x"), ("audience", "kids")])
            .unwrap_err();
        assert!(matches!(err, PromptError::UnknownPlaceholder { ref name, .. } if name == "audience"));
        assert!(err.to_string().contains("{audience}"));
    }

    #[test]
    fn values_are_not_rescanned() {
        let out = refine_idea_prompt("build {ideaText} and {other}").unwrap();
        assert!(out.contains("build {ideaText} and {other}"));
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let t = PromptTemplate::new("twice", "{a} then {a}");
        assert_eq!(t.render(&[("a", "x")]).unwrap(), "x then x");
    }

    #[test]
    fn long_input_passes_through() {
        let long = "word ".repeat(20_000);
        let out = generate_stories_prompt(&long).unwrap();
        assert!(out.contains(long.as_str()));
    }

    #[test]
    fn template_for_matches_intent_name() {
        for intent in Intent::all() {
            assert_eq!(template_for(*intent).name, intent.as_str());
        }
    }
}
