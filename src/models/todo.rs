use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the priority of a todo.
/// Corresponds to the `todo_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    /// Low priority.
    Low,
    /// Medium priority (the default).
    Medium,
    /// High priority.
    High,
}

impl Default for TodoPriority {
    fn default() -> Self {
        TodoPriority::Medium
    }
}

/// A todo record as stored in the database and returned by the API.
///
/// `days_until_due` is not a column: it is derived from `due_date` when the
/// record is shaped for a response (see [`Todo::with_derived`]).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: TodoPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Identifier of the owning user, set at creation and never reassigned.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub days_until_due: Option<i64>,
}

impl Todo {
    /// Populates the derived `daysUntilDue` field:
    /// ceil((due_date - now) / 1 day), negative when overdue, `None` when no
    /// due date is set.
    pub fn with_derived(mut self) -> Self {
        self.days_until_due = self.due_date.map(|due| days_until(due, Utc::now()));
        self
    }
}

fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (due - now).num_seconds();
    let day = Duration::days(1).num_seconds();
    if seconds > 0 && seconds % day != 0 {
        seconds / day + 1
    } else {
        seconds / day
    }
}

/// Input payload for creating a todo. Callers should run [`Self::normalized`]
/// before `validate()` so the length checks see trimmed values.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoInput {
    /// Must be non-blank after trimming, at most 100 characters.
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub priority: Option<TodoPriority>,

    pub due_date: Option<DateTime<Utc>>,

    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,

    #[validate(custom = "validate_tags")]
    pub tags: Option<Vec<String>>,
}

impl TodoInput {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.map(|d| d.trim().to_string());
        self.category = self.category.map(|c| c.trim().to_string());
        self.tags = self
            .tags
            .map(|tags| tags.into_iter().map(|t| t.trim().to_string()).collect());
        self
    }
}

/// Partial update payload: absent fields leave the stored value untouched.
///
/// `due_date` distinguishes "absent" from an explicit `null` (which clears
/// the date) by deserializing into a nested `Option`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub completed: Option<bool>,

    pub priority: Option<TodoPriority>,

    #[serde(default, deserialize_with = "explicit_null")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,

    #[validate(custom = "validate_tags")]
    pub tags: Option<Vec<String>>,
}

impl TodoPatch {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.description = self.description.map(|d| d.trim().to_string());
        self.category = self.category.map(|c| c.trim().to_string());
        self.tags = self
            .tags
            .map(|tags| tags.into_iter().map(|t| t.trim().to_string()).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.category.is_none()
            && self.tags.is_none()
    }
}

// Maps a field that is present (even as JSON null) to Some(inner).
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DateTime<Utc>>::deserialize(deserializer).map(Some)
}

fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    for tag in tags {
        if tag.chars().count() > 20 {
            return Err(ValidationError::new("tag_too_long"));
        }
    }
    Ok(())
}

/// Sortable columns for the list endpoint. Restricting the sort key to this
/// enum keeps user input out of the ORDER BY clause.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    CreatedAt,
    DueDate,
    Title,
    Priority,
    Completed,
}

impl SortKey {
    pub fn column(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::DueDate => "due_date",
            SortKey::Title => "title",
            SortKey::Priority => "priority",
            SortKey::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query parameters accepted by the list endpoint. All filters are optional
/// and compose conjunctively.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoQuery {
    pub completed: Option<bool>,
    pub priority: Option<TodoPriority>,
    pub category: Option<String>,
    /// Free-text match against title and description.
    pub search: Option<String>,
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> TodoInput {
        TodoInput {
            title: title.to_string(),
            description: None,
            priority: None,
            due_date: None,
            category: None,
            tags: None,
        }
    }

    #[test]
    fn test_blank_title_rejected_after_trim() {
        let blank = input("   ").normalized();
        assert!(blank.validate().is_err(), "whitespace-only title must fail");

        let ok = input("  Buy milk  ").normalized();
        assert_eq!(ok.title, "Buy milk");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_field_length_bounds() {
        let mut long_title = input(&"a".repeat(101));
        assert!(long_title.validate().is_err());
        long_title.title = "a".repeat(100);
        assert!(long_title.validate().is_ok());

        let mut i = input("ok");
        i.description = Some("b".repeat(501));
        assert!(i.validate().is_err());
        i.description = Some("b".repeat(500));
        assert!(i.validate().is_ok());

        i.category = Some("c".repeat(51));
        assert!(i.validate().is_err());
        i.category = Some("c".repeat(50));
        assert!(i.validate().is_ok());

        i.tags = Some(vec!["fine".to_string(), "t".repeat(21)]);
        assert!(i.validate().is_err());
        i.tags = Some(vec!["fine".to_string(), "t".repeat(20)]);
        assert!(i.validate().is_ok());
    }

    #[test]
    fn test_patch_distinguishes_absent_from_null_due_date() {
        let absent: TodoPatch = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.due_date, None);

        let cleared: TodoPatch = serde_json::from_str(r#"{"dueDate":null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: TodoPatch =
            serde_json::from_str(r#"{"dueDate":"2026-08-10T12:00:00Z"}"#).unwrap();
        assert!(matches!(set.due_date, Some(Some(_))));

        let empty: TodoPatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_days_until_due_rounds_up() {
        let now = Utc::now();

        // A due date 36 hours out is "2 days away".
        assert_eq!(days_until(now + Duration::hours(36), now), 2);
        // Exactly one day out stays 1.
        assert_eq!(days_until(now + Duration::days(1), now), 1);
        // Half a day out still counts as a day.
        assert_eq!(days_until(now + Duration::hours(12), now), 1);
        // Overdue dates go negative.
        assert_eq!(days_until(now - Duration::hours(36), now), -1);
        assert_eq!(days_until(now - Duration::days(3), now), -3);
    }

    #[test]
    fn test_with_derived_handles_missing_due_date() {
        let todo = Todo {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: None,
            completed: false,
            priority: TodoPriority::default(),
            due_date: None,
            category: None,
            tags: vec![],
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            days_until_due: None,
        };
        assert_eq!(todo.with_derived().days_until_due, None);
    }

    #[test]
    fn test_sort_key_whitelist() {
        assert_eq!(SortKey::CreatedAt.column(), "created_at");
        assert_eq!(SortKey::DueDate.column(), "due_date");
        assert_eq!(SortOrder::Desc.keyword(), "DESC");

        // Wire names are camelCase.
        let q: TodoQuery =
            serde_json::from_str(r#"{"sortBy":"dueDate","sortOrder":"asc"}"#).unwrap();
        assert_eq!(q.sort_by, Some(SortKey::DueDate));
        assert_eq!(q.sort_order, Some(SortOrder::Asc));

        // Unknown sort keys are rejected at deserialization.
        assert!(serde_json::from_str::<TodoQuery>(r#"{"sortBy":"id; DROP TABLE"}"#).is_err());
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TodoPriority::High).unwrap(),
            "\"high\""
        );
        let p: TodoPriority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(p, TodoPriority::Low);
        assert_eq!(TodoPriority::default(), TodoPriority::Medium);
    }
}
