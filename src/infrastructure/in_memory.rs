//! In-memory repository implementations.
//!
//! Each collection is a `HashMap` behind `Arc<tokio::sync::RwLock<...>>`.
//! This is the default backend and the one the test-suite runs against.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{
    OwnedRecord, Project, ProjectId, Tag, TagId, Task, TaskId, User, UserId,
};
use crate::infrastructure::{
    ProjectRepository, RepositoryError, RepositoryFuture, TagRepository, TaskRepository,
    UserRepository,
};

type Collection<K, V> = Arc<RwLock<HashMap<K, V>>>;

fn new_collection<K, V>() -> Collection<K, V> {
    Arc::new(RwLock::new(HashMap::new()))
}

// =============================================================================
// Collection Helpers
// =============================================================================

async fn find<K: Eq + Hash, V: Clone>(collection: &Collection<K, V>, id: &K) -> Option<V> {
    collection.read().await.get(id).cloned()
}

/// Returns the owner's records, oldest first. Ties fall back to id order.
async fn list_owned<K, V>(collection: &Collection<K, V>, owner: &UserId) -> Vec<V>
where
    K: Ord,
    V: OwnedRecord + Clone,
{
    let guard = collection.read().await;
    let mut records: Vec<(&K, &V)> = guard
        .iter()
        .filter(|(_, record)| record.is_owned_by(owner))
        .collect();

    records.sort_by(|(left_id, left), (right_id, right)| {
        left.created_at()
            .cmp(right.created_at())
            .then_with(|| left_id.cmp(right_id))
    });
    records.into_iter().map(|(_, record)| record.clone()).collect()
}

async fn insert<K, V>(collection: &Collection<K, V>, id: K, record: V) -> Result<(), RepositoryError>
where
    K: Eq + Hash + std::fmt::Display,
{
    let mut guard = collection.write().await;
    if guard.contains_key(&id) {
        return Err(RepositoryError::Duplicate(format!("id {id}")));
    }
    guard.insert(id, record);
    Ok(())
}

async fn replace<K, V>(collection: &Collection<K, V>, id: K, record: V) -> Result<(), RepositoryError>
where
    K: Eq + Hash + std::fmt::Display,
{
    let mut guard = collection.write().await;
    match guard.get_mut(&id) {
        Some(existing) => {
            *existing = record;
            Ok(())
        }
        None => Err(RepositoryError::NotFound(id.to_string())),
    }
}

async fn remove<K: Eq + Hash, V>(collection: &Collection<K, V>, id: &K) -> bool {
    collection.write().await.remove(id).is_some()
}

async fn clear<K, V>(collection: &Collection<K, V>) -> u64 {
    let mut guard = collection.write().await;
    let removed = guard.len() as u64;
    guard.clear();
    removed
}

// =============================================================================
// In-Memory User Repository
// =============================================================================

/// In-memory implementation of `UserRepository`.
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    users: Collection<UserId, User>,
}

impl InMemoryUserRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: new_collection(),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_id(&self, id: &UserId) -> RepositoryFuture<Option<User>> {
        let users = Arc::clone(&self.users);
        let id = id.clone();
        Box::pin(async move { Ok(find(&users, &id).await) })
    }

    fn find_by_email(&self, email: &str) -> RepositoryFuture<Option<User>> {
        let users = Arc::clone(&self.users);
        let email = email.to_string();
        Box::pin(async move {
            let guard = users.read().await;
            Ok(guard.values().find(|user| user.email == email).cloned())
        })
    }

    fn insert(&self, user: &User) -> RepositoryFuture<()> {
        let users = Arc::clone(&self.users);
        let user = user.clone();
        Box::pin(async move {
            let mut guard = users.write().await;
            // Email uniqueness mirrors the UNIQUE constraint of the SQL schema.
            if guard.values().any(|existing| existing.email == user.email) {
                return Err(RepositoryError::Duplicate(format!("email {}", user.email)));
            }
            if guard.contains_key(&user.user_id) {
                return Err(RepositoryError::Duplicate(format!("id {}", user.user_id)));
            }
            guard.insert(user.user_id.clone(), user);
            Ok(())
        })
    }

    fn clear(&self) -> RepositoryFuture<u64> {
        let users = Arc::clone(&self.users);
        Box::pin(async move { Ok(clear(&users).await) })
    }
}

// =============================================================================
// In-Memory Project Repository
// =============================================================================

/// In-memory implementation of `ProjectRepository`.
#[derive(Debug, Clone)]
pub struct InMemoryProjectRepository {
    projects: Collection<ProjectId, Project>,
}

impl InMemoryProjectRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            projects: new_collection(),
        }
    }
}

impl Default for InMemoryProjectRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        let projects = Arc::clone(&self.projects);
        let id = id.clone();
        Box::pin(async move { Ok(find(&projects, &id).await) })
    }

    fn list_by_owner(&self, owner: &UserId) -> RepositoryFuture<Vec<Project>> {
        let projects = Arc::clone(&self.projects);
        let owner = owner.clone();
        Box::pin(async move { Ok(list_owned(&projects, &owner).await) })
    }

    fn insert(&self, project: &Project) -> RepositoryFuture<()> {
        let projects = Arc::clone(&self.projects);
        let project = project.clone();
        Box::pin(async move { insert(&projects, project.project_id.clone(), project).await })
    }

    fn replace(&self, project: &Project) -> RepositoryFuture<()> {
        let projects = Arc::clone(&self.projects);
        let project = project.clone();
        Box::pin(async move { replace(&projects, project.project_id.clone(), project).await })
    }

    fn delete(&self, id: &ProjectId) -> RepositoryFuture<bool> {
        let projects = Arc::clone(&self.projects);
        let id = id.clone();
        Box::pin(async move { Ok(remove(&projects, &id).await) })
    }

    fn clear(&self) -> RepositoryFuture<u64> {
        let projects = Arc::clone(&self.projects);
        Box::pin(async move { Ok(clear(&projects).await) })
    }
}

// =============================================================================
// In-Memory Tag Repository
// =============================================================================

/// In-memory implementation of `TagRepository`.
#[derive(Debug, Clone)]
pub struct InMemoryTagRepository {
    tags: Collection<TagId, Tag>,
}

impl InMemoryTagRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tags: new_collection(),
        }
    }
}

impl Default for InMemoryTagRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TagRepository for InMemoryTagRepository {
    fn find_by_id(&self, id: &TagId) -> RepositoryFuture<Option<Tag>> {
        let tags = Arc::clone(&self.tags);
        let id = id.clone();
        Box::pin(async move { Ok(find(&tags, &id).await) })
    }

    fn list_by_owner(&self, owner: &UserId) -> RepositoryFuture<Vec<Tag>> {
        let tags = Arc::clone(&self.tags);
        let owner = owner.clone();
        Box::pin(async move { Ok(list_owned(&tags, &owner).await) })
    }

    fn insert(&self, tag: &Tag) -> RepositoryFuture<()> {
        let tags = Arc::clone(&self.tags);
        let tag = tag.clone();
        Box::pin(async move { insert(&tags, tag.tag_id.clone(), tag).await })
    }

    fn replace(&self, tag: &Tag) -> RepositoryFuture<()> {
        let tags = Arc::clone(&self.tags);
        let tag = tag.clone();
        Box::pin(async move { replace(&tags, tag.tag_id.clone(), tag).await })
    }

    fn delete(&self, id: &TagId) -> RepositoryFuture<bool> {
        let tags = Arc::clone(&self.tags);
        let id = id.clone();
        Box::pin(async move { Ok(remove(&tags, &id).await) })
    }

    fn clear(&self) -> RepositoryFuture<u64> {
        let tags = Arc::clone(&self.tags);
        Box::pin(async move { Ok(clear(&tags).await) })
    }
}

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    tasks: Collection<TaskId, Task>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: new_collection(),
        }
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        Box::pin(async move { Ok(find(&tasks, &id).await) })
    }

    fn list_by_owner(&self, owner: &UserId) -> RepositoryFuture<Vec<Task>> {
        let tasks = Arc::clone(&self.tasks);
        let owner = owner.clone();
        Box::pin(async move { Ok(list_owned(&tasks, &owner).await) })
    }

    fn insert(&self, task: &Task) -> RepositoryFuture<()> {
        let tasks = Arc::clone(&self.tasks);
        let task = task.clone();
        Box::pin(async move { insert(&tasks, task.task_id.clone(), task).await })
    }

    fn replace(&self, task: &Task) -> RepositoryFuture<()> {
        let tasks = Arc::clone(&self.tasks);
        let task = task.clone();
        Box::pin(async move { replace(&tasks, task.task_id.clone(), task).await })
    }

    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        Box::pin(async move { Ok(remove(&tasks, &id).await) })
    }

    fn delete_by_project(&self, project: &ProjectId) -> RepositoryFuture<u64> {
        let tasks = Arc::clone(&self.tasks);
        let project = project.clone();
        Box::pin(async move {
            let mut guard = tasks.write().await;
            let before = guard.len();
            guard.retain(|_, task| !task.belongs_to_project(&project));
            Ok((before - guard.len()) as u64)
        })
    }

    fn pull_tag(&self, tag: &TagId) -> RepositoryFuture<u64> {
        let tasks = Arc::clone(&self.tasks);
        let tag = tag.clone();
        Box::pin(async move {
            let mut guard = tasks.write().await;
            let modified = guard
                .values_mut()
                .map(|task| task.remove_tag(&tag))
                .filter(|removed| *removed)
                .count();
            Ok(modified as u64)
        })
    }

    fn clear(&self) -> RepositoryFuture<u64> {
        let tasks = Arc::clone(&self.tasks);
        Box::pin(async move { Ok(clear(&tasks).await) })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;
    use chrono::{Duration, Utc};
    use rstest::rstest;

    fn at(offset_seconds: i64) -> Timestamp {
        Timestamp::from_datetime(Utc::now() + Duration::seconds(offset_seconds))
    }

    fn task_for(owner: &UserId, title: &str, created_at: Timestamp) -> Task {
        Task::new(TaskId::generate(), owner.clone(), title, created_at)
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_insert_and_find() {
        let repository = InMemoryTaskRepository::new();
        let task = task_for(&UserId::generate(), "Find me", Timestamp::now());

        repository.insert(&task).await.unwrap();
        let found = repository.find_by_id(&task.task_id).await.unwrap();

        assert_eq!(found.map(|task| task.title), Some("Find me".to_string()));
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_insert_twice_is_duplicate() {
        let repository = InMemoryTaskRepository::new();
        let task = task_for(&UserId::generate(), "Once", Timestamp::now());

        repository.insert(&task).await.unwrap();
        let result = repository.insert(&task).await;

        assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_replace_missing_is_not_found() {
        let repository = InMemoryTaskRepository::new();
        let task = task_for(&UserId::generate(), "Ghost", Timestamp::now());

        let result = repository.replace(&task).await;

        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_by_owner_filters_and_orders_by_creation() {
        let repository = InMemoryTaskRepository::new();
        let owner = UserId::generate();
        let stranger = UserId::generate();

        repository
            .insert(&task_for(&owner, "second", at(10)))
            .await
            .unwrap();
        repository
            .insert(&task_for(&owner, "first", at(0)))
            .await
            .unwrap();
        repository
            .insert(&task_for(&stranger, "foreign", at(5)))
            .await
            .unwrap();

        let titles: Vec<String> = repository
            .list_by_owner(&owner)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect();

        assert_eq!(titles, vec!["first".to_string(), "second".to_string()]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_by_project_only_removes_project_tasks() {
        let repository = InMemoryTaskRepository::new();
        let owner = UserId::generate();
        let project = ProjectId::generate();

        let scoped = task_for(&owner, "scoped", Timestamp::now()).with_project(Some(project.clone()));
        let loose = task_for(&owner, "loose", Timestamp::now());
        repository.insert(&scoped).await.unwrap();
        repository.insert(&loose).await.unwrap();

        let removed = repository.delete_by_project(&project).await.unwrap();

        assert_eq!(removed, 1);
        assert!(repository.find_by_id(&scoped.task_id).await.unwrap().is_none());
        assert!(repository.find_by_id(&loose.task_id).await.unwrap().is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn test_pull_tag_strips_reference_everywhere() {
        let repository = InMemoryTaskRepository::new();
        let owner = UserId::generate();
        let doomed = TagId::generate();
        let kept = TagId::generate();

        let both = task_for(&owner, "both", Timestamp::now())
            .with_tags(vec![doomed.clone(), kept.clone()]);
        let untagged = task_for(&owner, "untagged", Timestamp::now());
        repository.insert(&both).await.unwrap();
        repository.insert(&untagged).await.unwrap();

        let modified = repository.pull_tag(&doomed).await.unwrap();

        assert_eq!(modified, 1);
        let reloaded = repository.find_by_id(&both.task_id).await.unwrap().unwrap();
        assert_eq!(reloaded.tags, vec![kept]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_user_email_is_unique() {
        let repository = InMemoryUserRepository::new();
        let first = User::new(UserId::generate(), "A", "a@example.com", "hash", Timestamp::now());
        let second = User::new(UserId::generate(), "B", "A@example.com", "hash", Timestamp::now());

        repository.insert(&first).await.unwrap();
        let result = repository.insert(&second).await;

        assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
        let found = repository.find_by_email("a@example.com").await.unwrap();
        assert_eq!(found.map(|user| user.user_id), Some(first.user_id));
    }

    #[rstest]
    #[tokio::test]
    async fn test_clear_reports_removed_count() {
        let repository = InMemoryTagRepository::new();
        let owner = UserId::generate();
        for name in ["a", "b", "c"] {
            repository
                .insert(&Tag::new(TagId::generate(), owner.clone(), name, Timestamp::now()))
                .await
                .unwrap();
        }

        assert_eq!(repository.clear().await.unwrap(), 3);
        assert!(repository.list_by_owner(&owner).await.unwrap().is_empty());
    }
}
