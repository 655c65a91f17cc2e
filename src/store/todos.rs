//!
//! # Owner-scoped todo store
//!
//! Every operation on todos goes through [`TodoStore`], which captures the
//! authenticated user's id at construction and injects `user_id = $owner`
//! into each query it runs. Handlers therefore cannot forget the ownership
//! filter, and a record owned by another user is indistinguishable from one
//! that does not exist: both surface as `NotFound`.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{SortKey, SortOrder, Todo, TodoInput, TodoPatch, TodoPriority, TodoQuery};

const TODO_COLUMNS: &str =
    "id, title, description, completed, priority, due_date, category, tags, user_id, \
     created_at, updated_at";

/// Per-user aggregate statistics.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub incomplete: i64,
    /// round(100 * completed / total); 0 when there are no todos.
    pub completion_rate: i64,
    pub priority_breakdown: Vec<PriorityCount>,
    /// The ten largest categories, count descending, name ascending on ties.
    pub category_breakdown: Vec<CategoryCount>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PriorityCount {
    pub priority: TodoPriority,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total == 0 {
        0
    } else {
        // Integer round-half-up of 100 * completed / total.
        (200 * completed + total) / (2 * total)
    }
}

pub struct TodoStore<'a> {
    pool: &'a PgPool,
    owner: Uuid,
}

impl<'a> TodoStore<'a> {
    pub fn for_owner(pool: &'a PgPool, owner: Uuid) -> Self {
        Self { pool, owner }
    }

    /// Lists the owner's todos, applying any combination of the optional
    /// filters conjunctively. The WHERE clause is assembled dynamically with
    /// numbered binds; the ORDER BY column comes from the [`SortKey`]
    /// whitelist, never from raw input.
    pub async fn list(&self, query: &TodoQuery) -> Result<Vec<Todo>, AppError> {
        let mut sql = format!("SELECT {} FROM todos WHERE user_id = $1", TODO_COLUMNS);
        let mut param = 2;

        if query.completed.is_some() {
            sql.push_str(&format!(" AND completed = ${}", param));
            param += 1;
        }
        if query.priority.is_some() {
            sql.push_str(&format!(" AND priority = ${}", param));
            param += 1;
        }
        if query.category.is_some() {
            sql.push_str(&format!(" AND category = ${}", param));
            param += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${} OR description ILIKE ${})",
                param,
                param + 1
            ));
        }

        let sort_key = query.sort_by.unwrap_or(SortKey::CreatedAt);
        let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
        sql.push_str(&format!(
            " ORDER BY {} {}",
            sort_key.column(),
            sort_order.keyword()
        ));

        let mut q = sqlx::query_as::<_, Todo>(&sql).bind(self.owner);
        if let Some(completed) = query.completed {
            q = q.bind(completed);
        }
        if let Some(priority) = query.priority {
            q = q.bind(priority);
        }
        if let Some(category) = &query.category {
            q = q.bind(category);
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search);
            q = q.bind(pattern.clone());
            q = q.bind(pattern);
        }

        let todos = q.fetch_all(self.pool).await?;
        Ok(todos.into_iter().map(Todo::with_derived).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Todo, AppError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(self.owner)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;
        Ok(todo.with_derived())
    }

    /// Inserts a new todo owned by the captured user. Defaults are applied
    /// here: incomplete, medium priority, empty tag list. The owner id never
    /// comes from the input payload.
    pub async fn create(&self, input: TodoInput) -> Result<Todo, AppError> {
        let sql = format!(
            "INSERT INTO todos (id, title, description, completed, priority, due_date, \
             category, tags, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.title)
            .bind(blank_to_null(input.description.as_deref()))
            .bind(false)
            .bind(input.priority.unwrap_or_default())
            .bind(input.due_date)
            .bind(blank_to_null(input.category.as_deref()))
            .bind(input.tags.unwrap_or_default())
            .bind(self.owner)
            .fetch_one(self.pool)
            .await?;
        Ok(todo.with_derived())
    }

    /// Applies a partial update: only fields present in the patch are
    /// written, assembled into a dynamic SET clause. An explicit null
    /// `dueDate` clears the date; a blank description or category clears the
    /// column. An empty patch returns the record unchanged.
    pub async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<Todo, AppError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut sets: Vec<String> = Vec::new();
        let mut param = 1;
        for field in [
            ("title", patch.title.is_some()),
            ("description", patch.description.is_some()),
            ("completed", patch.completed.is_some()),
            ("priority", patch.priority.is_some()),
            ("due_date", patch.due_date.is_some()),
            ("category", patch.category.is_some()),
            ("tags", patch.tags.is_some()),
        ] {
            if field.1 {
                sets.push(format!("{} = ${}", field.0, param));
                param += 1;
            }
        }
        sets.push("updated_at = NOW()".to_string());

        let sql = format!(
            "UPDATE todos SET {} WHERE id = ${} AND user_id = ${} RETURNING {}",
            sets.join(", "),
            param,
            param + 1,
            TODO_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Todo>(&sql);
        if let Some(title) = &patch.title {
            q = q.bind(title);
        }
        if let Some(description) = &patch.description {
            q = q.bind(blank_to_null(Some(description)));
        }
        if let Some(completed) = patch.completed {
            q = q.bind(completed);
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = patch.due_date {
            // Binds NULL when the caller sent an explicit null.
            q = q.bind(due_date);
        }
        if let Some(category) = &patch.category {
            q = q.bind(blank_to_null(Some(category)));
        }
        if let Some(tags) = &patch.tags {
            q = q.bind(tags);
        }

        let todo = q
            .bind(id)
            .bind(self.owner)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;
        Ok(todo.with_derived())
    }

    /// Flips `completed` to its logical negation. Involutive: applying it
    /// twice restores the original value.
    pub async fn toggle(&self, id: Uuid) -> Result<Todo, AppError> {
        let sql = format!(
            "UPDATE todos SET completed = NOT completed, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(self.owner)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;
        Ok(todo.with_derived())
    }

    /// Removes the record and returns its last state.
    pub async fn delete(&self, id: Uuid) -> Result<Todo, AppError> {
        let sql = format!(
            "DELETE FROM todos WHERE id = $1 AND user_id = $2 RETURNING {}",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(self.owner)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;
        Ok(todo.with_derived())
    }

    pub async fn summary(&self) -> Result<TodoStats, AppError> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE completed) FROM todos WHERE user_id = $1",
        )
        .bind(self.owner)
        .fetch_one(self.pool)
        .await?;

        let priority_breakdown = sqlx::query_as::<_, PriorityCount>(
            "SELECT priority, COUNT(*) AS count FROM todos WHERE user_id = $1
             GROUP BY priority ORDER BY priority",
        )
        .bind(self.owner)
        .fetch_all(self.pool)
        .await?;

        // Ties broken by name so repeated calls return the same ten rows.
        let category_breakdown = sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM todos
             WHERE user_id = $1 AND category IS NOT NULL
             GROUP BY category ORDER BY count DESC, category ASC LIMIT 10",
        )
        .bind(self.owner)
        .fetch_all(self.pool)
        .await?;

        Ok(TodoStats {
            total,
            completed,
            incomplete: total - completed,
            completion_rate: completion_rate(completed, total),
            priority_breakdown,
            category_breakdown,
        })
    }

    /// Incomplete todos due within the inclusive window [now, now + 3 days].
    pub async fn due_soon(&self) -> Result<Vec<Todo>, AppError> {
        let sql = format!(
            "SELECT {} FROM todos
             WHERE user_id = $1 AND completed = FALSE
               AND due_date >= NOW() AND due_date <= NOW() + INTERVAL '3 days'
             ORDER BY due_date ASC",
            TODO_COLUMNS
        );
        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(self.owner)
            .fetch_all(self.pool)
            .await?;
        Ok(todos.into_iter().map(Todo::with_derived).collect())
    }
}

fn blank_to_null(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate_rounding() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(0, 5), 0);
        assert_eq!(completion_rate(5, 5), 100);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        // Half rounds up, like Math.round.
        assert_eq!(completion_rate(1, 8), 13);
        assert_eq!(completion_rate(1, 2), 50);
    }

    #[test]
    fn test_blank_to_null() {
        assert_eq!(blank_to_null(None), None);
        assert_eq!(blank_to_null(Some("")), None);
        assert_eq!(blank_to_null(Some("work")), Some("work"));
    }
}
