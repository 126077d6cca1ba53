//! Generate-and-persist operations: read context from the store, run the
//! orchestrator, and project the validated result into new records.
//!
//! A generation or validation failure returns before any write, so the
//! store never holds a partial batch.

use llm_client::GenerationClient;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Guidance, Project, ProjectUpdate, Story, StoryDraft, Task, TaskDraft};
use crate::orchestrator::Orchestrator;
use crate::store::Store;
use crate::types::{RefinedIdea, RefinedIdeasResult};

pub struct Workflow<'a, C> {
    store: &'a Store,
    orchestrator: &'a Orchestrator<C>,
}

impl<'a, C: GenerationClient> Workflow<'a, C> {
    pub fn new(store: &'a Store, orchestrator: &'a Orchestrator<C>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    /// Refinements of a project's idea text. Nothing is stored.
    pub async fn refine_project(&self, project_id: Uuid) -> Result<RefinedIdeasResult> {
        let project = self.store.get_project(project_id)?;
        self.orchestrator.refine_idea(&project.idea_text).await
    }

    /// Variations of a project's idea text. Nothing is stored.
    pub async fn suggest_project_variations(&self, project_id: Uuid) -> Result<RefinedIdeasResult> {
        let project = self.store.get_project(project_id)?;
        self.orchestrator.suggest_variations(&project.idea_text).await
    }

    pub fn apply_idea(&self, project_id: Uuid, idea: &RefinedIdea) -> Result<Project> {
        let project = self.store.update_project(project_id, ProjectUpdate::from(idea))?;
        tracing::info!(project = %project_id, title = %project.title, "applied refined idea");
        Ok(project)
    }

    pub async fn generate_and_create_stories(&self, project_id: Uuid) -> Result<Vec<Story>> {
        let project = self.store.get_project(project_id)?;
        let result = self.orchestrator.generate_stories(&project.idea_text).await?;
        let drafts: Vec<StoryDraft> = result.stories.into_iter().map(StoryDraft::from).collect();
        let stories = self.store.create_stories(project_id, drafts)?;
        tracing::info!(project = %project_id, count = stories.len(), "stored generated stories");
        Ok(stories)
    }

    /// Generated tasks are stored in result order, in one transaction.
    pub async fn generate_and_create_tasks(&self, story_id: Uuid) -> Result<Vec<Task>> {
        let story = self.store.get_story(story_id)?;
        let result = self
            .orchestrator
            .generate_tasks(&story.title, &story.as_a, &story.i_want_to, &story.so_that)
            .await?;
        let drafts: Vec<TaskDraft> = result.tasks.into_iter().map(TaskDraft::from).collect();
        let tasks = self.store.create_tasks(story_id, drafts)?;
        tracing::info!(story = %story_id, count = tasks.len(), "stored generated tasks");
        Ok(tasks)
    }

    /// Replaces any guidance the task already has.
    pub async fn generate_and_create_guidance(&self, task_id: Uuid) -> Result<Guidance> {
        let task = self.store.get_task(task_id)?;
        let story = self.store.get_story(task.story_id)?;
        let project = self.store.get_project(story.project_id)?;
        let result = self
            .orchestrator
            .generate_guidance(
                &project.title,
                &story.as_a,
                &story.i_want_to,
                &story.so_that,
                &task.description,
            )
            .await?;
        let guidance = self.store.put_guidance(task_id, result)?;
        tracing::info!(task = %task_id, steps = guidance.steps.len(), "stored generated guidance");
        Ok(guidance)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KodiniError;
    use llm_client::ScriptedClient;

    struct Fixture {
        store: Store,
        orchestrator: Orchestrator<ScriptedClient>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: Store::in_memory().unwrap(),
                orchestrator: Orchestrator::with_defaults(ScriptedClient::new()),
            }
        }

        fn workflow(&self) -> Workflow<'_, ScriptedClient> {
            Workflow::new(&self.store, &self.orchestrator)
        }

        fn reply(&self, text: &str) {
            self.orchestrator.client().push_response(text);
        }

        fn story(&self) -> Story {
            let p = self
                .store
                .create_project("u", "Todo", "a todo app")
                .unwrap();
            self.store
                .create_story(
                    p.id,
                    StoryDraft {
                        title: "Task Creation".into(),
                        as_a: "user".into(),
                        i_want_to: "create new tasks".into(),
                        so_that: "I can track work".into(),
                        rationale: None,
                    },
                )
                .unwrap()
        }
    }

    #[tokio::test]
    async fn generated_tasks_are_persisted_in_order() {
        let fx = Fixture::new();
        let story = fx.story();
        fx.reply(
            r#"{"tasks":[{"description":"Create DB schema","rationale":"storage"},{"description":"Build form"},{"description":"Wire endpoint"}]}"#,
        );

        let created = fx.workflow().generate_and_create_tasks(story.id).await.unwrap();
        assert_eq!(created.len(), 3);

        let stored: Vec<String> = fx
            .store
            .list_tasks(story.id)
            .unwrap()
            .into_iter()
            .map(|t| t.description)
            .collect();
        assert_eq!(stored, vec!["Create DB schema", "Build form", "Wire endpoint"]);
        assert!(fx.orchestrator.client().calls()[0]
            .prompt
            .contains("Title: Task Creation"));
    }

    #[tokio::test]
    async fn failed_generation_writes_nothing() {
        let fx = Fixture::new();
        let story = fx.story();
        fx.reply(r#"{"tasks":[{"description":"ok"},{"rationale":"no description"}]}"#);

        let err = fx
            .workflow()
            .generate_and_create_tasks(story.id)
            .await
            .unwrap_err();
        assert!(matches!(err, KodiniError::Validation { .. }));
        assert!(fx.store.list_tasks(story.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_generated_fields_are_validation_failures() {
        let fx = Fixture::new();
        let story = fx.story();
        fx.reply(r#"{"tasks":[{"description":"   "}]}"#);
        fx.reply(r#"{"stories":[{"title":"Add","asA":"","iWantTo":"add","soThat":"x"}]}"#);

        let err = fx
            .workflow()
            .generate_and_create_tasks(story.id)
            .await
            .unwrap_err();
        assert!(matches!(err, KodiniError::Validation { .. }));
        assert!(fx.store.list_tasks(story.id).unwrap().is_empty());

        let err = fx
            .workflow()
            .generate_and_create_stories(story.project_id)
            .await
            .unwrap_err();
        assert!(matches!(err, KodiniError::Validation { .. }));
        assert_eq!(fx.store.list_stories(story.project_id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_story_skips_the_provider() {
        let fx = Fixture::new();
        let err = fx
            .workflow()
            .generate_and_create_tasks(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, KodiniError::StoryNotFound(_)));
        assert_eq!(fx.orchestrator.client().call_count(), 0);
    }

    #[tokio::test]
    async fn guidance_uses_full_context_and_replaces_previous() {
        let fx = Fixture::new();
        let story = fx.story();
        let task = fx
            .store
            .create_task(
                story.id,
                TaskDraft {
                    description: "Create DB schema".into(),
                    rationale: None,
                },
            )
            .unwrap();
        fx.reply(r#"{"steps":[{"step":"first","rationale":"r"}]}"#);
        fx.reply(r#"{"steps":[{"step":"second","rationale":"r"}],"summary":"s"}"#);

        fx.workflow().generate_and_create_guidance(task.id).await.unwrap();
        let latest = fx.workflow().generate_and_create_guidance(task.id).await.unwrap();

        let stored = fx.store.guidance_for_task(task.id).unwrap().unwrap();
        assert_eq!(stored.id, latest.id);
        assert_eq!(stored.steps[0].step, "second");

        let prompt = &fx.orchestrator.client().calls()[0].prompt;
        assert!(prompt.contains("Project: Todo"));
        assert!(prompt.contains("As a user, I want to create new tasks, so that I can track work"));
        assert!(prompt.contains("Create DB schema"));
    }

    #[tokio::test]
    async fn stories_are_generated_from_idea_text() {
        let fx = Fixture::new();
        let p = fx.store.create_project("u", "Todo", "a todo app").unwrap();
        fx.reply(
            r#"{"stories":[{"title":"Add","asA":"user","iWantTo":"add tasks","soThat":"I remember"},{"title":"Done","asA":"user","iWantTo":"tick tasks off","soThat":"I see progress","rationale":"motivation"}]}"#,
        );

        let stories = fx.workflow().generate_and_create_stories(p.id).await.unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[1].rationale.as_deref(), Some("motivation"));
        let listed = fx.store.list_stories(p.id).unwrap();
        assert_eq!(listed[0].title, "Add");
        assert!(fx.orchestrator.client().calls()[0]
            .prompt
            .contains("a todo app"));
    }

    #[tokio::test]
    async fn refine_then_apply_idea() {
        let fx = Fixture::new();
        let p = fx.store.create_project("u", "Todo", "a todo app").unwrap();
        fx.reply(
            r#"{"ideas":[{"title":"Team Todo","description":"Shared lists for small teams.","tags":["Web"]}]}"#,
        );

        let result = fx.workflow().refine_project(p.id).await.unwrap();
        let updated = fx.workflow().apply_idea(p.id, &result.ideas[0]).unwrap();
        assert_eq!(updated.title, "Team Todo");
        assert_eq!(updated.idea_text, "Shared lists for small teams.");
        assert_eq!(fx.store.get_project(p.id).unwrap().title, "Team Todo");
    }

    #[tokio::test]
    async fn variations_leave_project_untouched() {
        let fx = Fixture::new();
        let p = fx.store.create_project("u", "Todo", "a todo app").unwrap();
        fx.reply(r#"{"ideas":[{"title":"Voice Todo","description":"d","tags":[]}]}"#);

        let result = fx.workflow().suggest_project_variations(p.id).await.unwrap();
        assert_eq!(result.ideas.len(), 1);
        assert_eq!(fx.store.get_project(p.id).unwrap(), p);
    }
}
