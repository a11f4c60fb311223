/// PostgreSQL task store
///
/// Listing queries are assembled with `sqlx::QueryBuilder`. Column names come
/// only from [`TaskField::column`] and every operand is a bind parameter, so
/// user input never reaches the SQL text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::task::{NewTask, Task, TaskDetail, UserRef};
use crate::query::{Direction, Filter, FilterValue, Predicate, TaskQuery};
use crate::store::{StoreError, StoreResult, TaskStore};

const TASK_COLUMNS: &str = "id, name, description, start_date, end_date, completion_date, \
     is_active, is_completed, assigned_to, created_by, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT t.id, t.name, t.description, t.start_date, t.end_date, t.completion_date,
           t.is_active, t.is_completed, t.assigned_to, t.created_by, t.created_at, t.updated_at,
           a.first_name AS assignee_first_name, a.last_name AS assignee_last_name,
           a.email AS assignee_email,
           c.first_name AS creator_first_name, c.last_name AS creator_last_name,
           c.email AS creator_email
    FROM tasks t
    JOIN users a ON a.id = t.assigned_to
    JOIN users c ON c.id = t.created_by
"#;

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    completion_date: Option<DateTime<Utc>>,
    is_active: bool,
    is_completed: bool,
    assigned_to: Uuid,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            completion_date: row.completion_date,
            is_active: row.is_active,
            is_completed: row.is_completed,
            assigned_to: row.assigned_to,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskDetailRow {
    #[sqlx(flatten)]
    task: TaskRow,
    assignee_first_name: String,
    assignee_last_name: String,
    assignee_email: String,
    creator_first_name: String,
    creator_last_name: String,
    creator_email: String,
}

impl From<TaskDetailRow> for TaskDetail {
    fn from(row: TaskDetailRow) -> Self {
        let assigned_to = UserRef {
            id: row.task.assigned_to,
            first_name: row.assignee_first_name,
            last_name: row.assignee_last_name,
            email: row.assignee_email,
        };
        let created_by = UserRef {
            id: row.task.created_by,
            first_name: row.creator_first_name,
            last_name: row.creator_last_name,
            email: row.creator_email,
        };

        TaskDetail::new(row.task.into(), assigned_to, created_by)
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Text(v) => builder.push_bind(v.clone()),
        FilterValue::Bool(v) => builder.push_bind(*v),
        FilterValue::Id(v) => builder.push_bind(*v),
        FilterValue::Date(v) => builder.push_bind(*v),
    };
}

/// Appends ` WHERE ...` for a non-empty filter
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    for (i, condition) in filter.conditions.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push("t.").push(condition.field.column());

        match &condition.predicate {
            Predicate::Compare(cmp, value) => {
                builder.push(" ").push(cmp.sql()).push(" ");
                push_value(builder, value);
            }
            Predicate::In(values) => {
                builder.push(" IN (");
                for (j, value) in values.iter().enumerate() {
                    if j > 0 {
                        builder.push(", ");
                    }
                    push_value(builder, value);
                }
                builder.push(")");
            }
        }
    }
}

/// Task gateway over a shared pool
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        task.validate().map_err(StoreError::Invalid)?;

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (name, description, start_date, end_date, is_active,
                               assigned_to, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task.name)
        .bind(task.description)
        .bind(task.start_date)
        .bind(task.end_date)
        .bind(task.is_active)
        .bind(task.assigned_to)
        .bind(task.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_detail(&self, id: Uuid) -> StoreResult<Option<TaskDetail>> {
        let row = sqlx::query_as::<_, TaskDetailRow>(&format!("{DETAIL_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn save(&self, task: &Task) -> StoreResult<()> {
        task.validate().map_err(StoreError::Invalid)?;

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET name = $2,
                description = $3,
                start_date = $4,
                end_date = $5,
                completion_date = $6,
                is_active = $7,
                is_completed = $8,
                assigned_to = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.start_date)
        .bind(task.end_date)
        .bind(task.completion_date)
        .bind(task.is_active)
        .bind(task.is_completed)
        .bind(task.assigned_to)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Task".to_string()));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks t");
        push_filter(&mut builder, filter);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn find(&self, query: &TaskQuery) -> StoreResult<Vec<TaskDetail>> {
        let mut builder = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        push_filter(&mut builder, &query.filter);

        builder.push(" ORDER BY ");
        for key in &query.sort {
            builder.push("t.").push(key.field.column());
            builder.push(match key.direction {
                Direction::Asc => " ASC, ",
                Direction::Desc => " DESC, ",
            });
        }
        builder.push("t.id ASC");

        builder.push(" LIMIT ").push_bind(query.page.sql_limit());
        builder.push(" OFFSET ").push_bind(query.page.sql_offset());

        let rows: Vec<TaskDetailRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_referencing(&self, user_id: Uuid) -> StoreResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE assigned_to = $1 OR created_by = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }
}
