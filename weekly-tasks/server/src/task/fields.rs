use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Error type for task fields that fall outside their allowed values.
///
/// The messages are user facing and are returned verbatim in API responses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Either the title or the day was not supplied on creation.
    #[error("Поля \"title\" и \"day\" обязательны")]
    MissingRequired,
    /// The day is not one of the seven weekday names.
    #[error("День \"{0}\" не является днём недели. Допустимые дни: {days}", days = allowed_values(&Day::ALL))]
    InvalidDay(String),
    /// The priority is not one of the known priorities.
    #[error("Приоритет \"{0}\" недействителен. Допустимые: {priorities}", priorities = allowed_values(&Priority::ALL))]
    InvalidPriority(String),
    /// The status is not one of the known statuses.
    #[error("Статус \"{0}\" недействителен. Допустимые: {statuses}", statuses = allowed_values(&Status::ALL))]
    InvalidStatus(String),
}

fn allowed_values<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Day of the week a task is planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum Day {
    #[serde(rename = "Понедельник")]
    Monday,
    #[serde(rename = "Вторник")]
    Tuesday,
    #[serde(rename = "Среда")]
    Wednesday,
    #[serde(rename = "Четверг")]
    Thursday,
    #[serde(rename = "Пятница")]
    Friday,
    #[serde(rename = "Суббота")]
    Saturday,
    #[serde(rename = "Воскресенье")]
    Sunday,
}

impl Day {
    /// All days, starting from Monday.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Returns the canonical name of the day.
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Понедельник",
            Day::Tuesday => "Вторник",
            Day::Wednesday => "Среда",
            Day::Thursday => "Четверг",
            Day::Friday => "Пятница",
            Day::Saturday => "Суббота",
            Day::Sunday => "Воскресенье",
        }
    }

    /// Compares the day name against `text`, ignoring case.
    pub fn matches(&self, text: &str) -> bool {
        self.as_str().to_lowercase() == text.to_lowercase()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|day| day.matches(s))
            .ok_or_else(|| ValidationError::InvalidDay(s.to_string()))
    }
}

/// How urgent a task is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum Priority {
    #[serde(rename = "низкий")]
    Low,
    #[default]
    #[serde(rename = "средний")]
    Medium,
    #[serde(rename = "высокий")]
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "низкий",
            Priority::Medium => "средний",
            Priority::High => "высокий",
        }
    }

    /// Returns true for the priority given to tasks created without one.
    pub fn is_default(&self) -> bool {
        *self == Priority::default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidPriority(s.to_string()))
    }
}

/// Progress of a task. Any status may change to any other.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum Status {
    #[default]
    #[serde(rename = "новая")]
    New,
    #[serde(rename = "в процессе")]
    InProgress,
    #[serde(rename = "завершена")]
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::New, Status::InProgress, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "новая",
            Status::InProgress => "в процессе",
            Status::Completed => "завершена",
        }
    }

    /// Returns true for the status given to tasks created without one.
    pub fn is_default(&self) -> bool {
        *self == Status::default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))
    }
}
