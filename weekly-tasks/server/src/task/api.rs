use crate::task::{
    Day, NewTask, Priority, Status, Task, TaskInput, TaskPatch, TaskStatistics, TaskStore,
    coerce_task_id,
};
use crate::web::api::{ApiError, ApiPath, ApiQuery, ErrorResponse, JsonBody};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::{IntoParams, ToSchema};

/// Shared handle to the task store used by the task handlers.
#[derive(Clone, Debug)]
pub struct TaskState {
    pub store: Arc<RwLock<TaskStore>>,
}

impl TaskState {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier of the task
    id: u32,
    title: String,
    /// Empty when no description was given
    description: String,
    day: Day,
    priority: Priority,
    status: Status,
    /// Creation time in RFC 3339 format
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl From<&Task> for TaskJson {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            day: task.day(),
            priority: task.priority(),
            status: task.status(),
            created_at: task.created_at(),
        }
    }
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

/// API response carrying a single task.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    success: bool,
    message: String,
    data: TaskJson,
}

impl TaskResponse {
    fn new(message: &str, task: TaskJson) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: task,
        }
    }
}

/// API response for listing tasks.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskListResponse {
    success: bool,
    message: String,
    /// Number of tasks in `data`
    count: usize,
    data: Vec<TaskJson>,
}

/// API response carrying task statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsResponse {
    success: bool,
    message: String,
    data: TaskStatistics,
}

/// Query parameters for filtering tasks by day.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TasksQuery {
    /// Optional day of the week, matched ignoring case
    #[serde(default)]
    day: Option<String>,
}

/// Handler for GET /api/tasks - Returns all tasks, or the tasks of one day.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(TasksQuery),
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = TaskListResponse),
        (status = 404, description = "No tasks planned for the requested day", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<TaskState>>,
    ApiQuery(query): ApiQuery<TasksQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let store = state.store.read().await;

    let tasks: Vec<TaskJson> = match query.day.filter(|day| !day.is_empty()) {
        Some(day) => {
            let tasks = store.by_day(&day);
            if tasks.is_empty() {
                return Err(ApiError::NoTasksForDay(day));
            }
            tasks.into_iter().map(TaskJson::from).collect()
        }
        None => store.all().iter().map(TaskJson::from).collect(),
    };

    Ok(Json(TaskListResponse {
        success: true,
        message: "Задачи успешно получены".to_string(),
        count: tasks.len(),
        data: tasks,
    }))
}

/// Handler for GET /api/tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let store = state.store.read().await;
    let task = coerce_task_id(&id)
        .and_then(|task_id| store.get(task_id))
        .ok_or(ApiError::TaskNotFound(id))?;

    Ok(Json(TaskResponse::new("Задача найдена", task.into())))
}

/// Handler for POST /api/tasks - Creates a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = TaskInput,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    JsonBody(input): JsonBody<TaskInput>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let new_task = NewTask::parse(input)?;
    let task = state.store.write().await.create(new_task);
    tracing::info!("Created task with ID {}", task.id());

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse::new("Задача успешно создана", task.into())),
    ))
}

/// Handler for PUT /api/tasks/{id} - Updates the supplied fields of a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    request_body = TaskInput,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid field values", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    ApiPath(id): ApiPath<String>,
    JsonBody(input): JsonBody<TaskInput>,
) -> Result<Json<TaskResponse>, ApiError> {
    let patch = TaskPatch::parse(input);

    let mut store = state.store.write().await;
    let task = coerce_task_id(&id)
        .and_then(|task_id| store.get_mut(task_id))
        .ok_or(ApiError::TaskNotFound(id))?;
    task.apply(patch?);
    let task = task.clone();
    tracing::info!("Updated task with ID {}", task.id());

    Ok(Json(TaskResponse::new("Задача успешно обновлена", task.into())))
}

/// Handler for DELETE /api/tasks/{id} - Deletes a task and returns it.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let deleted = match coerce_task_id(&id) {
        Some(task_id) => state.store.write().await.delete(task_id),
        None => None,
    };
    let task = deleted.ok_or(ApiError::TaskNotFound(id))?;
    tracing::info!("Deleted task with ID {}", task.id());

    Ok(Json(TaskResponse::new("Задача успешно удалена", task.into())))
}

/// Handler for GET /api/tasks/stats/summary - Returns task counts.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks/stats/summary",
    responses(
        (status = 200, description = "Statistics computed", body = StatisticsResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_statistics_handler(State(state): State<Arc<TaskState>>) -> Json<StatisticsResponse> {
    let statistics = state.store.read().await.statistics();

    Json(StatisticsResponse {
        success: true,
        message: "Статистика получена".to_string(),
        data: statistics,
    })
}

/// Creates and returns the task router with all task API routes.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route(
            "/api/tasks",
            get(get_tasks_handler).post(create_task_handler),
        )
        .route("/api/tasks/stats/summary", get(get_statistics_handler))
        .route(
            "/api/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
