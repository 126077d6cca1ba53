//! Persistent storage for projects, stories, tasks, and guidance using redb.
//!
//! # Table design
//!
//! One table per entity, keyed by the record's 16 uuid bytes, with the
//! JSON-encoded record as value. Parent links live inside the records, so
//! listing children is a scan plus filter. Deletes cascade
//! (project → stories → tasks → guidance) inside one write transaction.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Duration, Utc};
use redb::{
    Database, ReadTransaction, ReadableTable, Table, TableDefinition, WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{KodiniError, Result};
use crate::model::{
    Guidance, Project, ProjectUpdate, Story, StoryDraft, StoryUpdate, Task, TaskDraft, TaskUpdate,
};
use crate::types::GuidanceResult;

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const PROJECTS: RecordDef = TableDefinition::new("projects");
const STORIES: RecordDef = TableDefinition::new("stories");
const TASKS: RecordDef = TableDefinition::new("tasks");
const GUIDANCE: RecordDef = TableDefinition::new("guidance");

type RecordDef = TableDefinition<'static, &'static [u8], &'static [u8]>;
type RecordTable<'txn> = Table<'txn, &'static [u8], &'static [u8]>;

fn store_err(e: impl std::fmt::Display) -> KodiniError {
    KodiniError::Store(e.to_string())
}

// ---------------------------------------------------------------------------
// Record helpers
// ---------------------------------------------------------------------------

trait Record: Serialize + DeserializeOwned {
    fn id(&self) -> Uuid;
}

impl Record for Project {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Story {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Task {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Guidance {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn fetch<T: Record>(
    table: &impl ReadableTable<&'static [u8], &'static [u8]>,
    id: Uuid,
) -> Result<Option<T>> {
    match table.get(id.as_bytes().as_slice()).map_err(store_err)? {
        Some(v) => Ok(Some(serde_json::from_slice(v.value()).map_err(store_err)?)),
        None => Ok(None),
    }
}

fn scan<T: Record>(table: &impl ReadableTable<&'static [u8], &'static [u8]>) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for entry in table.iter().map_err(store_err)? {
        let (_, v) = entry.map_err(store_err)?;
        out.push(serde_json::from_slice(v.value()).map_err(store_err)?);
    }
    Ok(out)
}

fn put<T: Record>(table: &mut RecordTable<'_>, record: &T) -> Result<()> {
    let value = serde_json::to_vec(record).map_err(store_err)?;
    table
        .insert(record.id().as_bytes().as_slice(), value.as_slice())
        .map_err(store_err)?;
    Ok(())
}

fn remove(table: &mut RecordTable<'_>, id: Uuid) -> Result<bool> {
    let removed = table
        .remove(id.as_bytes().as_slice())
        .map_err(store_err)?
        .is_some();
    Ok(removed)
}

/// Remove every record matching `pred`; returns the removed ids.
fn remove_where<T: Record>(
    table: &mut RecordTable<'_>,
    pred: impl Fn(&T) -> bool,
) -> Result<HashSet<Uuid>> {
    let ids: HashSet<Uuid> = scan::<T>(&*table)?
        .into_iter()
        .filter(|r| pred(r))
        .map(|r| r.id())
        .collect();
    for id in &ids {
        remove(table, *id)?;
    }
    Ok(ids)
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Project/story/task/guidance store.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open or create the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(store_err)?;
        Self::init(db)
    }

    /// Volatile store, used by tests.
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(store_err)?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self> {
        let store = Self { db };
        // Ensure tables exist before any reads
        store.write(|wt| {
            for def in [PROJECTS, STORIES, TASKS, GUIDANCE] {
                wt.open_table(def).map_err(store_err)?;
            }
            Ok(())
        })?;
        Ok(store)
    }

    fn read<R>(&self, f: impl FnOnce(&ReadTransaction) -> Result<R>) -> Result<R> {
        let rt = self.db.begin_read().map_err(store_err)?;
        f(&rt)
    }

    /// Run `f` in a write transaction. Any error aborts without writing.
    fn write<R>(&self, f: impl FnOnce(&WriteTransaction) -> Result<R>) -> Result<R> {
        let wt = self.db.begin_write().map_err(store_err)?;
        let out = f(&wt)?;
        wt.commit().map_err(store_err)?;
        Ok(out)
    }

    fn get<T: Record>(&self, def: RecordDef, id: Uuid) -> Result<Option<T>> {
        self.read(|rt| {
            let table = rt.open_table(def).map_err(store_err)?;
            fetch(&table, id)
        })
    }

    fn all<T: Record>(&self, def: RecordDef) -> Result<Vec<T>> {
        self.read(|rt| {
            let table = rt.open_table(def).map_err(store_err)?;
            scan(&table)
        })
    }

    fn replace<T: Record>(&self, def: RecordDef, record: &T) -> Result<()> {
        self.write(|wt| {
            let mut table = wt.open_table(def).map_err(store_err)?;
            put(&mut table, record)
        })
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn create_project(&self, user_id: &str, title: &str, idea_text: &str) -> Result<Project> {
        let project = Project::new(user_id, title, idea_text)?;
        self.replace(PROJECTS, &project)?;
        tracing::debug!(id = %project.id, "created project");
        Ok(project)
    }

    pub fn get_project(&self, id: Uuid) -> Result<Project> {
        self.get(PROJECTS, id)?
            .ok_or_else(|| KodiniError::ProjectNotFound(id.to_string()))
    }

    /// A user's projects, newest first.
    pub fn list_projects(&self, user_id: &str) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .all(PROJECTS)?
            .into_iter()
            .filter(|p: &Project| p.user_id == user_id)
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    pub fn update_project(&self, id: Uuid, update: ProjectUpdate) -> Result<Project> {
        let mut project = self.get_project(id)?;
        update.apply(&mut project)?;
        self.replace(PROJECTS, &project)?;
        Ok(project)
    }

    /// Delete a project with all of its stories, tasks, and guidance.
    pub fn delete_project(&self, id: Uuid) -> Result<()> {
        self.write(|wt| {
            let mut projects = wt.open_table(PROJECTS).map_err(store_err)?;
            if !remove(&mut projects, id)? {
                return Err(KodiniError::ProjectNotFound(id.to_string()));
            }
            let mut stories = wt.open_table(STORIES).map_err(store_err)?;
            let story_ids = remove_where::<Story>(&mut stories, |s| s.project_id == id)?;
            let mut tasks = wt.open_table(TASKS).map_err(store_err)?;
            let task_ids = remove_where::<Task>(&mut tasks, |t| story_ids.contains(&t.story_id))?;
            let mut guidance = wt.open_table(GUIDANCE).map_err(store_err)?;
            remove_where::<Guidance>(&mut guidance, |g| task_ids.contains(&g.task_id))?;
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Stories
    // -----------------------------------------------------------------------

    pub fn create_story(&self, project_id: Uuid, draft: StoryDraft) -> Result<Story> {
        let mut stories = self.create_stories(project_id, vec![draft])?;
        stories
            .pop()
            .ok_or_else(|| KodiniError::Store("story was not created".into()))
    }

    /// Insert several stories for one project in a single transaction,
    /// preserving their order.
    pub fn create_stories(&self, project_id: Uuid, drafts: Vec<StoryDraft>) -> Result<Vec<Story>> {
        for draft in &drafts {
            draft.validate()?;
        }
        self.write(|wt| {
            let projects = wt.open_table(PROJECTS).map_err(store_err)?;
            if fetch::<Project>(&projects, project_id)?.is_none() {
                return Err(KodiniError::ProjectNotFound(project_id.to_string()));
            }
            let mut table = wt.open_table(STORIES).map_err(store_err)?;
            let now = Utc::now();
            let mut created = Vec::with_capacity(drafts.len());
            for (i, draft) in drafts.into_iter().enumerate() {
                let story = draft.into_story(project_id, now + Duration::microseconds(i as i64));
                put(&mut table, &story)?;
                created.push(story);
            }
            Ok(created)
        })
    }

    pub fn get_story(&self, id: Uuid) -> Result<Story> {
        self.get(STORIES, id)?
            .ok_or_else(|| KodiniError::StoryNotFound(id.to_string()))
    }

    /// Stories of a project, oldest first.
    pub fn list_stories(&self, project_id: Uuid) -> Result<Vec<Story>> {
        self.get_project(project_id)?;
        let mut stories: Vec<Story> = self
            .all(STORIES)?
            .into_iter()
            .filter(|s: &Story| s.project_id == project_id)
            .collect();
        stories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(stories)
    }

    pub fn update_story(&self, id: Uuid, update: StoryUpdate) -> Result<Story> {
        let mut story = self.get_story(id)?;
        update.apply(&mut story)?;
        self.replace(STORIES, &story)?;
        Ok(story)
    }

    pub fn delete_story(&self, id: Uuid) -> Result<()> {
        self.write(|wt| {
            let mut stories = wt.open_table(STORIES).map_err(store_err)?;
            if !remove(&mut stories, id)? {
                return Err(KodiniError::StoryNotFound(id.to_string()));
            }
            let mut tasks = wt.open_table(TASKS).map_err(store_err)?;
            let task_ids = remove_where::<Task>(&mut tasks, |t| t.story_id == id)?;
            let mut guidance = wt.open_table(GUIDANCE).map_err(store_err)?;
            remove_where::<Guidance>(&mut guidance, |g| task_ids.contains(&g.task_id))?;
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn create_task(&self, story_id: Uuid, draft: TaskDraft) -> Result<Task> {
        let mut tasks = self.create_tasks(story_id, vec![draft])?;
        tasks
            .pop()
            .ok_or_else(|| KodiniError::Store("task was not created".into()))
    }

    /// Insert several tasks for one story in a single transaction, preserving
    /// their order.
    pub fn create_tasks(&self, story_id: Uuid, drafts: Vec<TaskDraft>) -> Result<Vec<Task>> {
        for draft in &drafts {
            draft.validate()?;
        }
        self.write(|wt| {
            let stories = wt.open_table(STORIES).map_err(store_err)?;
            if fetch::<Story>(&stories, story_id)?.is_none() {
                return Err(KodiniError::StoryNotFound(story_id.to_string()));
            }
            let mut table = wt.open_table(TASKS).map_err(store_err)?;
            let now = Utc::now();
            let mut created = Vec::with_capacity(drafts.len());
            for (i, draft) in drafts.into_iter().enumerate() {
                let task = draft.into_task(story_id, now + Duration::microseconds(i as i64));
                put(&mut table, &task)?;
                created.push(task);
            }
            Ok(created)
        })
    }

    pub fn get_task(&self, id: Uuid) -> Result<Task> {
        self.get(TASKS, id)?
            .ok_or_else(|| KodiniError::TaskNotFound(id.to_string()))
    }

    /// Tasks of a story, oldest first.
    pub fn list_tasks(&self, story_id: Uuid) -> Result<Vec<Task>> {
        self.get_story(story_id)?;
        let mut tasks: Vec<Task> = self
            .all(TASKS)?
            .into_iter()
            .filter(|t: &Task| t.story_id == story_id)
            .collect();
        sort_oldest_first(&mut tasks);
        Ok(tasks)
    }

    /// Every task under every story of a project, oldest first.
    pub fn list_tasks_by_project(&self, project_id: Uuid) -> Result<Vec<Task>> {
        let story_ids: HashSet<Uuid> = self
            .list_stories(project_id)?
            .into_iter()
            .map(|s| s.id)
            .collect();
        let mut tasks: Vec<Task> = self
            .all(TASKS)?
            .into_iter()
            .filter(|t: &Task| story_ids.contains(&t.story_id))
            .collect();
        sort_oldest_first(&mut tasks);
        Ok(tasks)
    }

    pub fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Task> {
        let mut task = self.get_task(id)?;
        update.apply(&mut task)?;
        self.replace(TASKS, &task)?;
        Ok(task)
    }

    pub fn set_task_completed(&self, id: Uuid, completed: bool) -> Result<Task> {
        self.update_task(
            id,
            TaskUpdate {
                is_completed: Some(completed),
                ..Default::default()
            },
        )
    }

    pub fn delete_task(&self, id: Uuid) -> Result<()> {
        self.write(|wt| {
            let mut tasks = wt.open_table(TASKS).map_err(store_err)?;
            if !remove(&mut tasks, id)? {
                return Err(KodiniError::TaskNotFound(id.to_string()));
            }
            let mut guidance = wt.open_table(GUIDANCE).map_err(store_err)?;
            remove_where::<Guidance>(&mut guidance, |g| g.task_id == id)?;
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Guidance
    // -----------------------------------------------------------------------

    /// Store guidance for a task, replacing any existing record.
    pub fn put_guidance(&self, task_id: Uuid, result: GuidanceResult) -> Result<Guidance> {
        let guidance = Guidance::from_result(task_id, result);
        self.write(|wt| {
            let tasks = wt.open_table(TASKS).map_err(store_err)?;
            if fetch::<Task>(&tasks, task_id)?.is_none() {
                return Err(KodiniError::TaskNotFound(task_id.to_string()));
            }
            let mut table = wt.open_table(GUIDANCE).map_err(store_err)?;
            remove_where::<Guidance>(&mut table, |g| g.task_id == task_id)?;
            put(&mut table, &guidance)
        })?;
        Ok(guidance)
    }

    pub fn guidance_for_task(&self, task_id: Uuid) -> Result<Option<Guidance>> {
        self.get_task(task_id)?;
        Ok(self
            .all::<Guidance>(GUIDANCE)?
            .into_iter()
            .find(|g| g.task_id == task_id))
    }

    pub fn get_guidance(&self, id: Uuid) -> Result<Guidance> {
        self.get(GUIDANCE, id)?
            .ok_or_else(|| KodiniError::GuidanceNotFound(id.to_string()))
    }

    pub fn delete_guidance(&self, id: Uuid) -> Result<()> {
        self.write(|wt| {
            let mut table = wt.open_table(GUIDANCE).map_err(store_err)?;
            if !remove(&mut table, id)? {
                return Err(KodiniError::GuidanceNotFound(id.to_string()));
            }
            Ok(())
        })
    }
}

fn sort_oldest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GuidanceStep;
    use tempfile::TempDir;

    fn story_draft(title: &str) -> StoryDraft {
        StoryDraft {
            title: title.into(),
            as_a: "user".into(),
            i_want_to: "create new tasks".into(),
            so_that: "I can track work".into(),
            rationale: None,
        }
    }

    fn task_draft(description: &str) -> TaskDraft {
        TaskDraft {
            description: description.into(),
            rationale: None,
        }
    }

    fn guidance(step: &str) -> GuidanceResult {
        GuidanceResult {
            steps: vec![GuidanceStep {
                step: step.into(),
                rationale: "because".into(),
            }],
            code_examples: None,
            summary: None,
        }
    }

    #[test]
    fn open_on_disk_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".kodini/kodini.redb");
        let id = {
            let store = Store::open(&path).unwrap();
            store.create_project("u", "Todo", "a todo app").unwrap().id
        };
        let store = Store::open(&path).unwrap();
        assert_eq!(store.get_project(id).unwrap().title, "Todo");
    }

    #[test]
    fn list_projects_filters_by_user_newest_first() {
        let store = Store::in_memory().unwrap();
        let first = store.create_project("alice", "First", "one").unwrap();
        let second = store.create_project("alice", "Second", "two").unwrap();
        store.create_project("bob", "Other", "three").unwrap();

        let listed = store.list_projects("alice").unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        let ids: Vec<Uuid> = listed.iter().map(|p| p.id).collect();
        assert!(ids.contains(&first.id) && ids.contains(&second.id));
        assert!(store.list_projects("carol").unwrap().is_empty());
    }

    #[test]
    fn missing_records_are_not_found() {
        let store = Store::in_memory().unwrap();
        let id = Uuid::new_v4();
        assert!(matches!(store.get_project(id), Err(KodiniError::ProjectNotFound(_))));
        assert!(matches!(store.get_story(id), Err(KodiniError::StoryNotFound(_))));
        assert!(matches!(store.get_task(id), Err(KodiniError::TaskNotFound(_))));
        assert!(matches!(store.get_guidance(id), Err(KodiniError::GuidanceNotFound(_))));
        assert!(matches!(
            store.create_story(id, story_draft("x")),
            Err(KodiniError::ProjectNotFound(_))
        ));
        assert!(matches!(
            store.create_task(id, task_draft("x")),
            Err(KodiniError::StoryNotFound(_))
        ));
        assert!(matches!(store.delete_task(id), Err(KodiniError::TaskNotFound(_))));
    }

    #[test]
    fn tasks_keep_insertion_order() {
        let store = Store::in_memory().unwrap();
        let p = store.create_project("u", "P", "idea").unwrap();
        let s = store.create_story(p.id, story_draft("S")).unwrap();
        let drafts = ["one", "two", "three", "four"].map(task_draft).to_vec();
        store.create_tasks(s.id, drafts).unwrap();

        let listed: Vec<String> = store
            .list_tasks(s.id)
            .unwrap()
            .into_iter()
            .map(|t| t.description)
            .collect();
        assert_eq!(listed, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn invalid_draft_writes_nothing() {
        let store = Store::in_memory().unwrap();
        let p = store.create_project("u", "P", "idea").unwrap();
        let s = store.create_story(p.id, story_draft("S")).unwrap();
        let err = store
            .create_tasks(s.id, vec![task_draft("ok"), task_draft("")])
            .unwrap_err();
        assert!(matches!(err, KodiniError::InvalidInput(_)));
        assert!(store.list_tasks(s.id).unwrap().is_empty());
    }

    #[test]
    fn update_and_complete_task() {
        let store = Store::in_memory().unwrap();
        let p = store.create_project("u", "P", "idea").unwrap();
        let s = store.create_story(p.id, story_draft("S")).unwrap();
        let t = store.create_task(s.id, task_draft("Write schema")).unwrap();

        let done = store.set_task_completed(t.id, true).unwrap();
        assert!(done.is_completed);
        assert!(done.updated_at >= t.updated_at);

        let renamed = store
            .update_task(
                t.id,
                TaskUpdate {
                    description: Some("Write migration".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.description, "Write migration");
        assert!(renamed.is_completed);
    }

    #[test]
    fn list_tasks_by_project_spans_stories() {
        let store = Store::in_memory().unwrap();
        let p = store.create_project("u", "P", "idea").unwrap();
        let other = store.create_project("u", "Q", "idea").unwrap();
        let s1 = store.create_story(p.id, story_draft("S1")).unwrap();
        let s2 = store.create_story(p.id, story_draft("S2")).unwrap();
        let s3 = store.create_story(other.id, story_draft("S3")).unwrap();
        store.create_task(s1.id, task_draft("a")).unwrap();
        store.create_task(s2.id, task_draft("b")).unwrap();
        store.create_task(s3.id, task_draft("c")).unwrap();

        let tasks = store.list_tasks_by_project(p.id).unwrap();
        let descriptions: Vec<&str> = tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["a", "b"]);
    }

    #[test]
    fn put_guidance_replaces_existing() {
        let store = Store::in_memory().unwrap();
        let p = store.create_project("u", "P", "idea").unwrap();
        let s = store.create_story(p.id, story_draft("S")).unwrap();
        let t = store.create_task(s.id, task_draft("T")).unwrap();

        let first = store.put_guidance(t.id, guidance("first")).unwrap();
        let second = store.put_guidance(t.id, guidance("second")).unwrap();
        assert_ne!(first.id, second.id);

        let current = store.guidance_for_task(t.id).unwrap().unwrap();
        assert_eq!(current.steps[0].step, "second");
        assert!(matches!(
            store.get_guidance(first.id),
            Err(KodiniError::GuidanceNotFound(_))
        ));

        store.delete_guidance(second.id).unwrap();
        assert!(store.guidance_for_task(t.id).unwrap().is_none());
    }

    #[test]
    fn delete_project_cascades() {
        let store = Store::in_memory().unwrap();
        let p = store.create_project("u", "P", "idea").unwrap();
        let keep = store.create_project("u", "Keep", "idea").unwrap();
        let s = store.create_story(p.id, story_draft("S")).unwrap();
        let kept_story = store.create_story(keep.id, story_draft("K")).unwrap();
        let t = store.create_task(s.id, task_draft("T")).unwrap();
        let g = store.put_guidance(t.id, guidance("g")).unwrap();

        store.delete_project(p.id).unwrap();

        assert!(matches!(store.get_story(s.id), Err(KodiniError::StoryNotFound(_))));
        assert!(matches!(store.get_task(t.id), Err(KodiniError::TaskNotFound(_))));
        assert!(matches!(
            store.get_guidance(g.id),
            Err(KodiniError::GuidanceNotFound(_))
        ));
        assert!(store.get_story(kept_story.id).is_ok());
        assert!(matches!(
            store.delete_project(p.id),
            Err(KodiniError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn delete_story_cascades_to_tasks() {
        let store = Store::in_memory().unwrap();
        let p = store.create_project("u", "P", "idea").unwrap();
        let s = store.create_story(p.id, story_draft("S")).unwrap();
        let t = store.create_task(s.id, task_draft("T")).unwrap();

        store.delete_story(s.id).unwrap();
        assert!(matches!(store.get_task(t.id), Err(KodiniError::TaskNotFound(_))));
        assert!(store.list_stories(p.id).unwrap().is_empty());
    }
}
