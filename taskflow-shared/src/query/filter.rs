/// Typed task filters
///
/// Every filter key is checked against an allow-list of task fields and a
/// fixed operator set before it becomes a [`Condition`]. Values are parsed into
/// the field's type up front, so backends only ever see typed values and
/// allow-listed column names.

use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

use super::QueryError;
use crate::models::task::Task;

/// Value type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
    Id,
    Date,
}

impl FieldKind {
    /// Whether `gt`/`gte`/`lt`/`lte` make sense for this kind
    pub fn is_ordered(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Date)
    }

    fn expected(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Bool => "true or false",
            FieldKind::Id => "a UUID",
            FieldKind::Date => "a date (YYYY-MM-DD or RFC 3339)",
        }
    }
}

/// Task fields that may appear in filters and sort keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Name,
    Description,
    StartDate,
    EndDate,
    CompletionDate,
    IsActive,
    IsCompleted,
    AssignedTo,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

impl TaskField {
    pub const ALL: [TaskField; 11] = [
        TaskField::Name,
        TaskField::Description,
        TaskField::StartDate,
        TaskField::EndDate,
        TaskField::CompletionDate,
        TaskField::IsActive,
        TaskField::IsCompleted,
        TaskField::AssignedTo,
        TaskField::CreatedBy,
        TaskField::CreatedAt,
        TaskField::UpdatedAt,
    ];

    /// Resolves a camelCase query parameter name
    pub fn from_param(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.param() == name)
    }

    /// Name as it appears in query strings and JSON
    pub fn param(&self) -> &'static str {
        match self {
            TaskField::Name => "name",
            TaskField::Description => "description",
            TaskField::StartDate => "startDate",
            TaskField::EndDate => "endDate",
            TaskField::CompletionDate => "completionDate",
            TaskField::IsActive => "isActive",
            TaskField::IsCompleted => "isCompleted",
            TaskField::AssignedTo => "assignedTo",
            TaskField::CreatedBy => "createdBy",
            TaskField::CreatedAt => "createdAt",
            TaskField::UpdatedAt => "updatedAt",
        }
    }

    /// Column in the `tasks` table
    pub fn column(&self) -> &'static str {
        match self {
            TaskField::Name => "name",
            TaskField::Description => "description",
            TaskField::StartDate => "start_date",
            TaskField::EndDate => "end_date",
            TaskField::CompletionDate => "completion_date",
            TaskField::IsActive => "is_active",
            TaskField::IsCompleted => "is_completed",
            TaskField::AssignedTo => "assigned_to",
            TaskField::CreatedBy => "created_by",
            TaskField::CreatedAt => "created_at",
            TaskField::UpdatedAt => "updated_at",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            TaskField::Name | TaskField::Description => FieldKind::Text,
            TaskField::IsActive | TaskField::IsCompleted => FieldKind::Bool,
            TaskField::AssignedTo | TaskField::CreatedBy => FieldKind::Id,
            TaskField::StartDate
            | TaskField::EndDate
            | TaskField::CompletionDate
            | TaskField::CreatedAt
            | TaskField::UpdatedAt => FieldKind::Date,
        }
    }

    /// Parses a raw query value into this field's type
    pub fn parse_value(&self, raw: &str) -> Result<FilterValue, QueryError> {
        let invalid = || QueryError::InvalidValue {
            field: self.param().to_string(),
            value: raw.to_string(),
            expected: self.kind().expected(),
        };

        match self.kind() {
            FieldKind::Text => Ok(FilterValue::Text(raw.to_string())),
            FieldKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(FilterValue::Bool(true)),
                "false" => Ok(FilterValue::Bool(false)),
                _ => Err(invalid()),
            },
            FieldKind::Id => Uuid::parse_str(raw.trim())
                .map(FilterValue::Id)
                .map_err(|_| invalid()),
            FieldKind::Date => parse_date(raw.trim()).map(FilterValue::Date).ok_or_else(invalid),
        }
    }

    /// Reads this field from a task; `None` for absent optional values
    pub fn value_of(&self, task: &Task) -> Option<FilterValue> {
        match self {
            TaskField::Name => Some(FilterValue::Text(task.name.clone())),
            TaskField::Description => task.description.clone().map(FilterValue::Text),
            TaskField::StartDate => Some(FilterValue::Date(task.start_date)),
            TaskField::EndDate => Some(FilterValue::Date(task.end_date)),
            TaskField::CompletionDate => task.completion_date.map(FilterValue::Date),
            TaskField::IsActive => Some(FilterValue::Bool(task.is_active)),
            TaskField::IsCompleted => Some(FilterValue::Bool(task.is_completed)),
            TaskField::AssignedTo => Some(FilterValue::Id(task.assigned_to)),
            TaskField::CreatedBy => Some(FilterValue::Id(task.created_by)),
            TaskField::CreatedAt => Some(FilterValue::Date(task.created_at)),
            TaskField::UpdatedAt => Some(FilterValue::Date(task.updated_at)),
        }
    }
}

/// Dates are either a calendar day (midnight UTC) or a full RFC 3339 instant
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// A typed filter operand
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    Id(Uuid),
    Date(DateTime<Utc>),
}

impl FilterValue {
    /// Orders two values of the same type; `None` across types
    pub fn compare(&self, other: &FilterValue) -> Option<Ordering> {
        match (self, other) {
            (FilterValue::Text(a), FilterValue::Text(b)) => Some(a.cmp(b)),
            (FilterValue::Bool(a), FilterValue::Bool(b)) => Some(a.cmp(b)),
            (FilterValue::Id(a), FilterValue::Id(b)) => Some(a.cmp(b)),
            (FilterValue::Date(a), FilterValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Binary comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Gte => ordering != Ordering::Less,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Operator token accepted in `field[op]` keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    /// Matches the whole token only; `gtx` or `lighting` are not operators
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "in" => Some(Operator::In),
            _ => None,
        }
    }
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(Comparison, FilterValue),
    In(Vec<FilterValue>),
}

/// One allow-listed field constrained by one predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: TaskField,
    pub predicate: Predicate,
}

impl Condition {
    /// Parses one `key=value` pair
    ///
    /// Keys are `field`, `field[op]`, or `field.op`.
    pub fn parse(key: &str, raw: &str) -> Result<Self, QueryError> {
        let (name, op) = split_key(key)?;

        let field =
            TaskField::from_param(name).ok_or_else(|| QueryError::UnknownField(name.to_string()))?;

        let op = match op {
            None => None,
            Some(token) => Some(
                Operator::from_token(token)
                    .ok_or_else(|| QueryError::UnknownOperator(token.to_string()))?,
            ),
        };

        let predicate = match op {
            None => Predicate::Compare(Comparison::Eq, field.parse_value(raw)?),
            Some(Operator::In) => {
                let values = raw
                    .split(',')
                    .map(|v| field.parse_value(v))
                    .collect::<Result<Vec<_>, _>>()?;
                Predicate::In(values)
            }
            Some(ordering) => {
                if !field.kind().is_ordered() {
                    return Err(QueryError::UnsupportedOperator {
                        field: field.param().to_string(),
                        operator: format!("{:?}", ordering).to_lowercase(),
                    });
                }
                let cmp = match ordering {
                    Operator::Gt => Comparison::Gt,
                    Operator::Gte => Comparison::Gte,
                    Operator::Lt => Comparison::Lt,
                    _ => Comparison::Lte,
                };
                Predicate::Compare(cmp, field.parse_value(raw)?)
            }
        };

        Ok(Self { field, predicate })
    }

    /// Equality on `field`
    pub fn equals(field: TaskField, value: FilterValue) -> Self {
        Self {
            field,
            predicate: Predicate::Compare(Comparison::Eq, value),
        }
    }

    /// Evaluates the condition against an in-memory task
    ///
    /// Absent optional values never match, mirroring SQL `NULL` comparison.
    pub fn matches(&self, task: &Task) -> bool {
        let Some(actual) = self.field.value_of(task) else {
            return false;
        };

        match &self.predicate {
            Predicate::Compare(cmp, expected) => actual
                .compare(expected)
                .map(|ordering| cmp.holds(ordering))
                .unwrap_or(false),
            Predicate::In(values) => values.iter().any(|v| *v == actual),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, Option<&str>), QueryError> {
    if let Some(open) = key.find('[') {
        let inner = key[open + 1..]
            .strip_suffix(']')
            .filter(|inner| !inner.contains('[') && !inner.contains(']'))
            .ok_or_else(|| QueryError::MalformedKey(key.to_string()))?;
        return Ok((&key[..open], Some(inner)));
    }

    match key.split_once('.') {
        Some((name, op)) => Ok((name, Some(op))),
        None => Ok((key, None)),
    }
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Adds a condition; existing conditions are kept
    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// True when every condition holds
    pub fn matches(&self, task: &Task) -> bool {
        self.conditions.iter().all(|c| c.matches(task))
    }
}
