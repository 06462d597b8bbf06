use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

pub mod api;
pub mod fields;

pub use fields::{Day, Priority, Status, ValidationError};

/// A single unit of work planned for a day of the week.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: u32,
    title: String,
    description: String,
    day: Day,
    priority: Priority,
    status: Status,
    created_at: DateTime<Utc>,
}

impl Task {
    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description of the task. Empty when none was given.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns the moment the task was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Merges a patch into the task. Fields missing from the patch are left as they are.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(day) = patch.day {
            self.day = day;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Raw task fields as submitted by a client, before validation.
///
/// A `description` that is present but `null` deserializes to `Some("")`, so it
/// stays distinguishable from a missing key.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct TaskInput {
    /// Title of the task, required on creation
    #[serde(default)]
    pub title: Option<String>,
    /// Free text description
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<String>,
    /// Day of the week, matched ignoring case
    #[serde(default)]
    pub day: Option<String>,
    /// One of "низкий", "средний", "высокий"
    #[serde(default)]
    pub priority: Option<String>,
    /// One of "новая", "в процессе", "завершена"
    #[serde(default)]
    pub status: Option<String>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(Option::<String>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Empty strings count as "not supplied".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn parse_non_empty<T>(value: Option<String>) -> Result<Option<T>, ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    non_empty(value).map(|value| value.parse()).transpose()
}

/// A validated task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: String,
    day: Day,
    priority: Priority,
    status: Status,
}

impl NewTask {
    /// Creates a task with the default priority and status and no description.
    pub fn new(title: impl Into<String>, day: Day) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            day,
            priority: Priority::default(),
            status: Status::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Validates client input for a new task.
    ///
    /// # Returns
    ///
    /// The validated task, or the first rule it breaks: a missing title or day,
    /// then an unknown day, priority or status.
    pub fn parse(input: TaskInput) -> Result<Self, ValidationError> {
        let (Some(title), Some(day)) = (non_empty(input.title), non_empty(input.day)) else {
            return Err(ValidationError::MissingRequired);
        };
        let day = day.parse()?;
        let priority = parse_non_empty(input.priority)?.unwrap_or_default();
        let status = parse_non_empty(input.status)?.unwrap_or_default();

        Ok(Self {
            title,
            description: input.description.unwrap_or_default(),
            day,
            priority,
            status,
        })
    }
}

/// Partial update of a task. `None` keeps the current value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub day: Option<Day>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

impl TaskPatch {
    /// Validates client input for an update.
    ///
    /// Empty title, day, priority and status values mean "keep", while an empty
    /// description clears the description.
    pub fn parse(input: TaskInput) -> Result<Self, ValidationError> {
        Ok(Self {
            title: non_empty(input.title),
            description: input.description,
            day: parse_non_empty(input.day)?,
            priority: parse_non_empty(input.priority)?,
            status: parse_non_empty(input.status)?,
        })
    }
}

/// Number of tasks in each status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    #[serde(rename = "новая")]
    pub new: usize,
    #[serde(rename = "в процессе")]
    pub in_progress: usize,
    #[serde(rename = "завершена")]
    pub completed: usize,
}

/// Number of tasks with each priority.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriorityCounts {
    #[serde(rename = "высокий")]
    pub high: usize,
    #[serde(rename = "средний")]
    pub medium: usize,
    #[serde(rename = "низкий")]
    pub low: usize,
}

/// Aggregate counts over every stored task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TaskStatistics {
    /// Total number of tasks
    pub total: usize,
    /// Tasks per status
    pub statuses: StatusCounts,
    /// Tasks per priority
    #[serde(rename = "byPriority")]
    pub by_priority: PriorityCounts,
}

/// Converts a raw identifier the way `parseInt` would: leading digits are used
/// and anything after them is ignored.
///
/// Returns `None` when the text does not start with a number.
pub fn coerce_task_id(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..digits].parse().ok()
}

/// In-memory collection of tasks kept in insertion order.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u32,
}

impl TaskStore {
    /// Creates an empty store whose first task gets ID 1.
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Creates a store holding the five tasks of a sample teaching week.
    pub fn with_seed_tasks() -> Self {
        let seeds = [
            (
                NewTask::new("Подготовка к лекции", Day::Monday)
                    .with_description("Подготовить материалы для понедельника")
                    .with_priority(Priority::High)
                    .with_status(Status::Completed),
                1,
            ),
            (
                NewTask::new("Проверка домашних заданий", Day::Tuesday)
                    .with_description("Проверить работы студентов")
                    .with_status(Status::InProgress),
                2,
            ),
            (
                NewTask::new("Встреча с кураторами", Day::Wednesday)
                    .with_description("Планерка в 10:00")
                    .with_priority(Priority::High),
                3,
            ),
            (
                NewTask::new("Составление отчёта", Day::Thursday)
                    .with_description("Квартальный отчёт"),
                4,
            ),
            (
                NewTask::new("Консультация студентов", Day::Friday)
                    .with_description("Приём студентов 14:00-16:00")
                    .with_priority(Priority::Low),
                5,
            ),
        ];

        let mut store = Self::new();
        for (task, day_of_month) in seeds {
            let created_at = Utc
                .with_ymd_and_hms(2025, 12, day_of_month, 0, 0, 0)
                .single()
                .unwrap_or_default();
            store.insert(task, created_at);
        }
        store
    }

    /// Returns every task in insertion order.
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the tasks planned for `day`, compared ignoring case.
    ///
    /// Text that is not a weekday simply matches nothing.
    pub fn by_day(&self, day: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.day.matches(day))
            .cloned()
            .collect()
    }

    /// Retrieves a task by its ID.
    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Stores a new task, stamping it with the next ID and the current time.
    ///
    /// # Returns
    ///
    /// A copy of the stored task.
    pub fn create(&mut self, task: NewTask) -> Task {
        self.insert(task, Utc::now())
    }

    fn insert(&mut self, task: NewTask, created_at: DateTime<Utc>) -> Task {
        let task = Task {
            id: self.next_id,
            title: task.title,
            description: task.description,
            day: task.day,
            priority: task.priority,
            status: task.status,
            created_at,
        };
        self.next_id += 1;
        tracing::debug!("Stored task with ID {}", task.id);
        self.tasks.push(task.clone());
        task
    }

    /// Applies a patch to the task with the given ID.
    ///
    /// # Returns
    ///
    /// The updated task, or `None` if no task has that ID.
    pub fn update(&mut self, id: u32, patch: TaskPatch) -> Option<Task> {
        let task = self.get_mut(id)?;
        task.apply(patch);
        tracing::debug!("Updated task with ID {}", id);
        Some(task.clone())
    }

    /// Removes the task with the given ID. IDs are never handed out again.
    ///
    /// # Returns
    ///
    /// The removed task, or `None` if no task has that ID.
    pub fn delete(&mut self, id: u32) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        tracing::debug!("Deleted task with ID {}", id);
        Some(self.tasks.remove(index))
    }

    /// Counts the current tasks by status and priority.
    pub fn statistics(&self) -> TaskStatistics {
        let mut statistics = TaskStatistics {
            total: self.tasks.len(),
            ..Default::default()
        };
        for task in &self.tasks {
            match task.status {
                Status::New => statistics.statuses.new += 1,
                Status::InProgress => statistics.statuses.in_progress += 1,
                Status::Completed => statistics.statuses.completed += 1,
            }
            match task.priority {
                Priority::High => statistics.by_priority.high += 1,
                Priority::Medium => statistics.by_priority.medium += 1,
                Priority::Low => statistics.by_priority.low += 1,
            }
        }
        statistics
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::with_seed_tasks()
    }
}
