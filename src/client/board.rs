use std::fmt::Write as _;
use std::future::Future;

use chrono::{DateTime, Utc};
use family_tasks_core::{models::*, EntityKind, Error as CoreError, ValidationError};

use super::{demo, ClientError, RpcClient};

pub const DEFAULT_CATEGORY_COLOR: &str = "#64748b";

/// Where the board's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardSource {
    Remote,
    /// Demo dataset, or a copy that has diverged from the server because a
    /// mutation had to be applied locally.
    Demo,
}

impl BoardSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Demo => "demo",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskState>,
    pub assignee: Option<i64>,
    pub category: Option<i64>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.state() == status)
            && self.assignee.map_or(true, |id| task.assigned_to == Some(id))
            && self.category.map_or(true, |id| task.category_id == Some(id))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
}

trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for FamilyMember {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Category {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Task {
    fn key(&self) -> i64 {
        self.id
    }
}

fn next_id<T: Keyed>(items: &[T]) -> i64 {
    items.iter().map(Keyed::key).max().unwrap_or(0) + 1
}

fn replace<T: Keyed>(items: &mut [T], item: T) {
    if let Some(slot) = items.iter_mut().find(|i| i.key() == item.key()) {
        *slot = item;
    }
}

fn position<T: Keyed>(items: &[T], entity: EntityKind, id: i64) -> Result<usize, CoreError> {
    items
        .iter()
        .position(|i| i.key() == id)
        .ok_or_else(|| CoreError::not_found(entity, id))
}

/// In-memory copy of every entity, kept in step with the server when it is
/// reachable and edited locally when it is not.
#[derive(Debug, Clone)]
pub struct Board {
    client: RpcClient,
    source: BoardSource,
    members: Vec<FamilyMember>,
    categories: Vec<Category>,
    tasks: Vec<Task>,
}

impl Board {
    /// Fetch all three lists, falling back to the demo dataset on any failure.
    pub async fn load(client: RpcClient) -> Self {
        let fetched = tokio::try_join!(
            client.get_family_members(),
            client.get_categories(),
            client.get_tasks(),
        );

        match fetched {
            Ok((members, categories, tasks)) => {
                tracing::debug!(
                    members = members.len(),
                    categories = categories.len(),
                    tasks = tasks.len(),
                    "Loaded board from {}",
                    client.base_url()
                );
                Self {
                    client,
                    source: BoardSource::Remote,
                    members,
                    categories,
                    tasks,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load board from {}, using demo data: {}", client.base_url(), e);
                Self::demo(client)
            }
        }
    }

    pub fn demo(client: RpcClient) -> Self {
        Self {
            client,
            source: BoardSource::Demo,
            members: demo::family_members(),
            categories: demo::categories(),
            tasks: demo::tasks(),
        }
    }

    pub fn source(&self) -> BoardSource {
        self.source
    }

    pub fn members(&self) -> &[FamilyMember] {
        &self.members
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Run `call` against the server while the board is remote. `None` means
    /// the caller should apply the mutation locally, with the same checks the
    /// server runs, and then call [`Board::diverge`].
    async fn remote<T>(
        &mut self,
        procedure: &str,
        call: impl Future<Output = Result<T, ClientError>>,
    ) -> Option<T> {
        if self.source == BoardSource::Demo {
            return None;
        }
        match call.await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("{} failed, applying locally: {}", procedure, e);
                None
            }
        }
    }

    /// A mutation was applied locally only. Ids handed out from here on are local
    /// and could collide with the server's, so stop talking to it.
    fn diverge(&mut self) {
        if self.source == BoardSource::Remote {
            tracing::warn!("Board diverged from {}, continuing on local data", self.client.base_url());
            self.source = BoardSource::Demo;
        }
    }

    pub async fn create_family_member(
        &mut self,
        input: CreateFamilyMemberInput,
    ) -> Result<FamilyMember, ClientError> {
        let client = self.client.clone();
        let member = match self
            .remote("createFamilyMember", client.create_family_member(&input))
            .await
        {
            Some(member) => member,
            None => {
                input.validate().map_err(CoreError::from)?;
                self.diverge();
                FamilyMember {
                    id: next_id(&self.members),
                    name: input.name,
                    email: input.email,
                    avatar_url: input.avatar_url,
                    created_at: Utc::now(),
                }
            }
        };
        self.members.push(member.clone());
        Ok(member)
    }

    pub async fn update_family_member(
        &mut self,
        input: UpdateFamilyMemberInput,
    ) -> Result<FamilyMember, ClientError> {
        let client = self.client.clone();
        let member = match self
            .remote("updateFamilyMember", client.update_family_member(&input))
            .await
        {
            Some(member) => member,
            None => {
                input.validate().map_err(CoreError::from)?;
                let idx = position(&self.members, EntityKind::FamilyMember, input.id)?;
                self.diverge();
                input.apply(self.members[idx].clone())
            }
        };
        replace(&mut self.members, member.clone());
        Ok(member)
    }

    /// Removes the member and unassigns their tasks.
    pub async fn delete_family_member(&mut self, id: i64) -> Result<DeleteResult, ClientError> {
        let client = self.client.clone();
        let result = match self.remote("deleteFamilyMember", client.delete_family_member(id)).await {
            Some(result) => result,
            None => {
                self.diverge();
                DeleteResult { success: true }
            }
        };

        self.members.retain(|m| m.id != id);
        let now = Utc::now();
        for task in self.tasks.iter_mut().filter(|t| t.assigned_to == Some(id)) {
            task.assigned_to = None;
            task.updated_at = task.updated_at.max(now);
        }
        Ok(result)
    }

    pub async fn create_category(
        &mut self,
        input: CreateCategoryInput,
    ) -> Result<Category, ClientError> {
        let client = self.client.clone();
        let category = match self
            .remote("createCategory", client.create_category(&input))
            .await
        {
            Some(category) => category,
            None => {
                input.validate().map_err(CoreError::from)?;
                self.diverge();
                Category {
                    id: next_id(&self.categories),
                    name: input.name,
                    description: input.description,
                    color: input.color,
                    created_at: Utc::now(),
                }
            }
        };
        self.categories.push(category.clone());
        Ok(category)
    }

    pub async fn update_category(
        &mut self,
        input: UpdateCategoryInput,
    ) -> Result<Category, ClientError> {
        let client = self.client.clone();
        let category = match self
            .remote("updateCategory", client.update_category(&input))
            .await
        {
            Some(category) => category,
            None => {
                input.validate().map_err(CoreError::from)?;
                let idx = position(&self.categories, EntityKind::Category, input.id)?;
                self.diverge();
                input.apply(self.categories[idx].clone())
            }
        };
        replace(&mut self.categories, category.clone());
        Ok(category)
    }

    /// Removes the category and uncategorizes its tasks.
    pub async fn delete_category(&mut self, id: i64) -> Result<DeleteResult, ClientError> {
        let client = self.client.clone();
        let result = match self.remote("deleteCategory", client.delete_category(id)).await {
            Some(result) => result,
            None => {
                self.diverge();
                DeleteResult { success: true }
            }
        };

        self.categories.retain(|c| c.id != id);
        let now = Utc::now();
        for task in self.tasks.iter_mut().filter(|t| t.category_id == Some(id)) {
            task.category_id = None;
            task.updated_at = task.updated_at.max(now);
        }
        Ok(result)
    }

    fn check_references(
        &self,
        assigned_to: Option<i64>,
        category_id: Option<i64>,
    ) -> Result<(), ValidationError> {
        if let Some(id) = assigned_to.filter(|id| !self.members.iter().any(|m| m.id == *id)) {
            return Err(ValidationError::MissingReference {
                entity: EntityKind::FamilyMember,
                id,
            });
        }
        if let Some(id) = category_id.filter(|id| !self.categories.iter().any(|c| c.id == *id)) {
            return Err(ValidationError::MissingReference {
                entity: EntityKind::Category,
                id,
            });
        }
        Ok(())
    }

    pub async fn create_task(&mut self, input: CreateTaskInput) -> Result<Task, ClientError> {
        let client = self.client.clone();
        let task = match self.remote("createTask", client.create_task(&input)).await {
            Some(task) => task,
            None => {
                input.validate().map_err(CoreError::from)?;
                self.check_references(input.assigned_to, input.category_id)
                    .map_err(CoreError::from)?;
                self.diverge();
                let now = Utc::now();
                Task {
                    id: next_id(&self.tasks),
                    title: input.title,
                    description: input.description,
                    due_date: input.due_date,
                    is_completed: false,
                    assigned_to: input.assigned_to,
                    category_id: input.category_id,
                    created_at: now,
                    updated_at: now,
                }
            }
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub async fn update_task(&mut self, input: UpdateTaskInput) -> Result<Task, ClientError> {
        let client = self.client.clone();
        let task = match self.remote("updateTask", client.update_task(&input)).await {
            Some(task) => task,
            None => {
                input.validate().map_err(CoreError::from)?;
                self.check_references(
                    input.assigned_to.as_value().copied(),
                    input.category_id.as_value().copied(),
                )
                .map_err(CoreError::from)?;
                let idx = position(&self.tasks, EntityKind::Task, input.id)?;
                self.diverge();
                let mut task = input.apply(self.tasks[idx].clone());
                task.updated_at = Utc::now().max(task.updated_at);
                task
            }
        };
        replace(&mut self.tasks, task.clone());
        Ok(task)
    }

    pub async fn delete_task(&mut self, id: i64) -> Result<DeleteResult, ClientError> {
        let client = self.client.clone();
        let result = match self.remote("deleteTask", client.delete_task(id)).await {
            Some(result) => result,
            None => {
                self.diverge();
                DeleteResult { success: true }
            }
        };
        self.tasks.retain(|t| t.id != id);
        Ok(result)
    }

    pub async fn toggle_task(&mut self, id: i64, is_completed: bool) -> Result<Task, ClientError> {
        let client = self.client.clone();
        let task = match self
            .remote("toggleTaskCompletion", client.toggle_task_completion(id, is_completed))
            .await
        {
            Some(task) => task,
            None => {
                let idx = position(&self.tasks, EntityKind::Task, id)?;
                self.diverge();
                let mut task = self.tasks[idx].clone();
                task.is_completed = is_completed;
                task.updated_at = Utc::now().max(task.updated_at);
                task
            }
        };
        replace(&mut self.tasks, task.clone());
        Ok(task)
    }

    pub fn filter_tasks(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn member_name(&self, id: Option<i64>) -> &str {
        match id {
            None => "Unassigned",
            Some(id) => self
                .members
                .iter()
                .find(|m| m.id == id)
                .map_or("Unknown", |m| m.name.as_str()),
        }
    }

    pub fn category_name(&self, id: Option<i64>) -> &str {
        match id {
            None => "No Category",
            Some(id) => self
                .categories
                .iter()
                .find(|c| c.id == id)
                .map_or("Unknown", |c| c.name.as_str()),
        }
    }

    pub fn category_color(&self, id: Option<i64>) -> &str {
        id.and_then(|id| self.categories.iter().find(|c| c.id == id))
            .and_then(|c| c.color.as_deref())
            .unwrap_or(DEFAULT_CATEGORY_COLOR)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> BoardStats {
        BoardStats {
            total: self.tasks.len(),
            completed: self.tasks.iter().filter(|t| t.is_completed).count(),
            overdue: self.tasks.iter().filter(|t| t.is_overdue(now)).count(),
        }
    }

    /// Plain-text rendering used by the `board` command.
    pub fn summary(&self, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Family tasks ({})", self.source.as_str());

        for task in &self.tasks {
            let mark = if task.is_completed { "x" } else { " " };
            let _ = write!(
                out,
                "  [{}] #{} {} ({}, {})",
                mark,
                task.id,
                task.title,
                self.member_name(task.assigned_to),
                self.category_name(task.category_id)
            );
            if let Some(due) = task.due_date {
                let _ = write!(out, " due {}", due.format("%Y-%m-%d"));
            }
            if task.is_overdue(now) {
                out.push_str(" OVERDUE");
            }
            out.push('\n');
        }

        let stats = self.stats(now);
        let _ = writeln!(
            out,
            "{} tasks, {} completed, {} overdue",
            stats.total, stats.completed, stats.overdue
        );
        out
    }
}
