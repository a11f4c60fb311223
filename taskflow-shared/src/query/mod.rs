/// Query Filter Builder
///
/// Turns the flat key/value query string of a task listing into a
/// [`TaskQuery`]: a typed [`Filter`], a sort order, and a [`Page`] window,
/// scoped to what the caller may see.
///
/// # Syntax
///
/// ```text
/// ?startDate[gt]=2024-01-01&isCompleted=false&assignedTo[in]=<id>,<id>
///  &sort=-endDate,name&page=2&limit=5
/// ```
///
/// `sort`, `page`, and `limit` are control parameters; every other key is a
/// filter. Non-admin callers always get `assignedTo = <self>` added to the
/// filter on top of whatever they asked for.
///
/// # Example
///
/// ```
/// use taskflow_shared::query::{Scope, TaskQuery};
///
/// let params = vec![
///     ("startDate[gt]".to_string(), "2024-01-01".to_string()),
///     ("page".to_string(), "2".to_string()),
///     ("limit".to_string(), "5".to_string()),
/// ];
///
/// let query = TaskQuery::parse(&params, Scope::All).unwrap();
/// assert_eq!(query.page.skip(), 5);
/// ```

pub mod filter;
pub mod pagination;

pub use filter::{parse_date, Comparison, Condition, Filter, FilterValue, Predicate, TaskField};
pub use pagination::{Page, PageRef, Pagination};

use std::cmp::Ordering;
use uuid::Uuid;

use crate::models::task::Task;

/// Errors raised while parsing list query parameters
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Unknown filter field: {0}")]
    UnknownField(String),

    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),

    #[error("Operator {operator} is not supported on field {field}")]
    UnsupportedOperator { field: String, operator: String },

    #[error("Invalid value '{value}' for {field}: expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("Malformed filter key: {0}")]
    MalformedKey(String),
}

/// Visibility of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Admins see every task
    All,

    /// Regular users see tasks assigned to them
    AssignedTo(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: TaskField,
    pub direction: Direction,
}

impl SortKey {
    pub fn desc(field: TaskField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    pub fn asc(field: TaskField) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }
}

/// Default order: newest first
pub fn default_sort() -> Vec<SortKey> {
    vec![SortKey::desc(TaskField::CreatedAt)]
}

/// Parses `-endDate,name` style sort lists
///
/// Unknown fields are skipped. If nothing usable remains the default order
/// applies.
pub fn parse_sort(raw: &str) -> Vec<SortKey> {
    let keys: Vec<SortKey> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.strip_prefix('-') {
            Some(name) => TaskField::from_param(name).map(SortKey::desc),
            None => TaskField::from_param(s.trim_start_matches('+')).map(SortKey::asc),
        })
        .collect();

    if keys.is_empty() {
        default_sort()
    } else {
        keys
    }
}

/// Orders two tasks by a sort list
///
/// Absent values sort last in ascending order; ties fall back to the id so
/// paging is stable.
pub fn compare_tasks(a: &Task, b: &Task, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ordering = match (key.field.value_of(a), key.field.value_of(b)) {
            (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        let ordering = match key.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    a.id.cmp(&b.id)
}

/// A scoped, sorted, paginated task listing
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub filter: Filter,
    pub sort: Vec<SortKey>,
    pub page: Page,
}

impl TaskQuery {
    /// Builds a query from raw parameters
    ///
    /// # Errors
    ///
    /// Unknown fields or operators and unparsable values are rejected. Bad
    /// `page`/`limit` values are not errors; they fall back to defaults.
    pub fn parse(params: &[(String, String)], scope: Scope) -> Result<Self, QueryError> {
        let mut conditions = Vec::new();
        let mut sort = None;
        let mut page = None;
        let mut limit = None;

        for (key, value) in params {
            match key.as_str() {
                "sort" => sort = Some(value.as_str()),
                "page" => page = Some(value.as_str()),
                "limit" => limit = Some(value.as_str()),
                _ => conditions.push(Condition::parse(key, value)?),
            }
        }

        Ok(Self {
            filter: Filter::new(conditions).scoped(scope),
            sort: sort.map(parse_sort).unwrap_or_else(default_sort),
            page: Page::from_raw(page, limit),
        })
    }
}

impl Filter {
    /// Intersects the filter with the caller's visibility
    pub fn scoped(self, scope: Scope) -> Self {
        match scope {
            Scope::All => self,
            Scope::AssignedTo(user_id) => {
                self.and(Condition::equals(TaskField::AssignedTo, FilterValue::Id(user_id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::NewTask;
    use chrono::{Duration, TimeZone, Utc};

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_reference_query() {
        let q = TaskQuery::parse(
            &params(&[
                ("startDate[gt]", "2024-01-01"),
                ("sort", "-createdAt"),
                ("page", "2"),
                ("limit", "5"),
            ]),
            Scope::All,
        )
        .unwrap();

        assert_eq!(q.filter.conditions.len(), 1);
        assert_eq!(q.filter.conditions[0].field, TaskField::StartDate);
        assert_eq!(q.sort, vec![SortKey::desc(TaskField::CreatedAt)]);
        assert_eq!(q.page.skip(), 5);
        assert_eq!(q.page.limit, 5);

        assert!(q.page.links(10).next.is_none());
        assert!(q.page.links(11).next.is_some());
        assert!(q.page.links(10).prev.is_some());
    }

    #[test]
    fn test_scope_is_added_not_replaced() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let q = TaskQuery::parse(
            &params(&[("assignedTo", &other.to_string())]),
            Scope::AssignedTo(me),
        )
        .unwrap();

        assert_eq!(q.filter.conditions.len(), 2);
        assert!(q
            .filter
            .conditions
            .contains(&Condition::equals(TaskField::AssignedTo, FilterValue::Id(me))));
        assert!(q
            .filter
            .conditions
            .contains(&Condition::equals(TaskField::AssignedTo, FilterValue::Id(other))));
    }

    #[test]
    fn test_admin_scope_adds_nothing() {
        let q = TaskQuery::parse(&[], Scope::All).unwrap();
        assert!(q.filter.is_empty());
        assert_eq!(q.sort, default_sort());
        assert_eq!(q.page, Page::default());
    }

    #[test]
    fn test_bad_paging_is_not_an_error() {
        let q = TaskQuery::parse(&params(&[("page", "x"), ("limit", "")]), Scope::All).unwrap();
        assert_eq!(q.page, Page::default());
    }

    #[test]
    fn test_unknown_filter_is_an_error() {
        assert!(TaskQuery::parse(&params(&[("owner", "x")]), Scope::All).is_err());
    }

    #[test]
    fn test_parse_sort_list() {
        assert_eq!(
            parse_sort("-endDate, name"),
            vec![SortKey::desc(TaskField::EndDate), SortKey::asc(TaskField::Name)]
        );
        assert_eq!(parse_sort("bogus,-name"), vec![SortKey::desc(TaskField::Name)]);
        assert_eq!(parse_sort("bogus"), default_sort());
        assert_eq!(parse_sort(""), default_sort());
    }

    #[test]
    fn test_compare_tasks() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let make = |name: &str, offset: i64| {
            NewTask {
                name: name.to_string(),
                description: None,
                start_date: base,
                end_date: base + Duration::days(1),
                is_active: true,
                assigned_to: Uuid::new_v4(),
                created_by: Uuid::new_v4(),
            }
            .into_task(Uuid::new_v4(), base + Duration::minutes(offset))
        };

        let mut tasks = vec![make("b", 1), make("a", 2), make("c", 0)];

        tasks.sort_by(|x, y| compare_tasks(x, y, &default_sort()));
        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        tasks.sort_by(|x, y| compare_tasks(x, y, &parse_sort("-name")));
        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["c", "b", "a"]);
    }
}
