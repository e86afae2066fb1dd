//! Admin listing request, the filter built from it, and pagination.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::is_blank;
use super::user::User;
use crate::error::{AppError, AppResult};

/// Sort order value that selects ascending order. Anything else is descending.
pub const SORT_ORDER_ASCEND: &str = "ascend";

/// Largest page an admin listing may request.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Query parameters for the admin user listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserQueryRequest {
    pub id: Option<i64>,
    pub user_account: Option<String>,
    pub user_name: Option<String>,
    pub user_profile: Option<String>,
    pub user_role: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    /// 1-based page number
    pub current: i64,
    pub page_size: i64,
}

impl Default for UserQueryRequest {
    fn default() -> Self {
        Self {
            id: None,
            user_account: None,
            user_name: None,
            user_profile: None,
            user_role: None,
            sort_field: None,
            sort_order: None,
            current: 1,
            page_size: 10,
        }
    }
}

/// Columns a listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    UserAccount,
    UserName,
    UserProfile,
    UserRole,
    CreateTime,
    UpdateTime,
    EditTime,
}

impl SortField {
    /// Parse the camelCase field name used on the wire.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(SortField::Id),
            "userAccount" => Some(SortField::UserAccount),
            "userName" => Some(SortField::UserName),
            "userProfile" => Some(SortField::UserProfile),
            "userRole" => Some(SortField::UserRole),
            "createTime" => Some(SortField::CreateTime),
            "updateTime" => Some(SortField::UpdateTime),
            "editTime" => Some(SortField::EditTime),
            _ => None,
        }
    }

    /// Database column backing this field.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::UserAccount => "user_account",
            SortField::UserName => "user_name",
            SortField::UserProfile => "user_profile",
            SortField::UserRole => "user_role",
            SortField::CreateTime => "create_time",
            SortField::UpdateTime => "update_time",
            SortField::EditTime => "edit_time",
        }
    }

    fn compare(&self, a: &User, b: &User) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::UserAccount => a.user_account.cmp(&b.user_account),
            SortField::UserName => a.user_name.cmp(&b.user_name),
            SortField::UserProfile => a.user_profile.cmp(&b.user_profile),
            SortField::UserRole => a.user_role.as_str().cmp(b.user_role.as_str()),
            SortField::CreateTime => a.create_time.cmp(&b.create_time),
            SortField::UpdateTime => a.update_time.cmp(&b.update_time),
            SortField::EditTime => a.edit_time.cmp(&b.edit_time),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Predicates for a user listing.
///
/// `id` is an equality match; the string fields are literal substring
/// matches, with `%` and `_` carrying no wildcard meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    pub id: Option<i64>,
    pub user_account: Option<String>,
    pub user_name: Option<String>,
    pub user_profile: Option<String>,
    pub user_role: Option<String>,
    pub sort: Option<Sort>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !is_blank(v)).map(str::to_string)
}

impl QueryFilter {
    /// Build a filter from a listing request.
    ///
    /// A missing `sortOrder` with a sort field present sorts descending.
    pub fn from_request(request: &UserQueryRequest) -> AppResult<Self> {
        let sort = match request.sort_field.as_deref().filter(|f| !is_blank(f)) {
            Some(name) => {
                let field = SortField::parse(name).ok_or_else(|| {
                    AppError::InvalidArgument(format!("Unsupported sort field '{}'", name))
                })?;
                let direction = if request.sort_order.as_deref() == Some(SORT_ORDER_ASCEND) {
                    SortDirection::Ascending
                } else {
                    SortDirection::Descending
                };
                Some(Sort { field, direction })
            }
            None => None,
        };

        Ok(Self {
            id: request.id,
            user_account: non_blank(&request.user_account),
            user_name: non_blank(&request.user_name),
            user_profile: non_blank(&request.user_profile),
            user_role: non_blank(&request.user_role),
            sort,
        })
    }

    /// Whether `user` satisfies every predicate.
    pub fn matches(&self, user: &User) -> bool {
        fn like(pattern: &Option<String>, value: &str) -> bool {
            pattern.as_deref().map_or(true, |p| value.contains(p))
        }

        self.id.map_or(true, |id| user.id == id)
            && like(&self.user_account, &user.user_account)
            && like(&self.user_name, &user.user_name)
            && self.user_profile.as_deref().map_or(true, |p| {
                user.user_profile.as_deref().is_some_and(|profile| profile.contains(p))
            })
            && like(&self.user_role, user.user_role.as_str())
    }

    /// Ordering of two users under this filter's sort, falling back to id.
    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        match self.sort {
            Some(Sort { field, direction }) => {
                let ordering = field.compare(a, b);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }
            None => a.id.cmp(&b.id),
        }
    }
}

/// Validated page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub current: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(current: i64, page_size: i64) -> AppResult<Self> {
        if current < 1 {
            return Err(AppError::InvalidArgument("Page number must be at least 1".to_string()));
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::InvalidArgument(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if (current - 1).checked_mul(page_size).is_none() {
            return Err(AppError::InvalidArgument("Page number is too large".to_string()));
        }
        Ok(Self { current, page_size })
    }

    /// Rows skipped before this page. Checked for overflow in [`PageRequest::new`].
    pub fn offset(&self) -> i64 {
        (self.current - 1).saturating_mul(self.page_size)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: i64,
    pub current: i64,
    pub size: i64,
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Page<U> {
        Page {
            records: self.records.iter().map(f).collect(),
            total: self.total,
            current: self.current,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{sample_user, UserRole};

    #[test]
    fn test_role_only_request() {
        let request = UserQueryRequest {
            user_role: Some("admin".to_string()),
            ..Default::default()
        };
        let filter = QueryFilter::from_request(&request).unwrap();
        assert_eq!(
            filter,
            QueryFilter {
                user_role: Some("admin".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_blank_fields_are_ignored() {
        let request = UserQueryRequest {
            user_account: Some("   ".to_string()),
            user_name: Some(String::new()),
            sort_field: Some(" ".to_string()),
            ..Default::default()
        };
        let filter = QueryFilter::from_request(&request).unwrap();
        assert_eq!(filter, QueryFilter::default());
    }

    #[test]
    fn test_sort_direction() {
        let mut request = UserQueryRequest {
            sort_field: Some("createTime".to_string()),
            sort_order: Some("ascend".to_string()),
            ..Default::default()
        };
        let sort = QueryFilter::from_request(&request).unwrap().sort.unwrap();
        assert_eq!(sort.field, SortField::CreateTime);
        assert_eq!(sort.direction, SortDirection::Ascending);

        request.sort_order = Some("descend".to_string());
        let sort = QueryFilter::from_request(&request).unwrap().sort.unwrap();
        assert_eq!(sort.direction, SortDirection::Descending);
    }

    #[test]
    fn test_missing_sort_order_is_descending() {
        let request = UserQueryRequest {
            sort_field: Some("id".to_string()),
            sort_order: None,
            ..Default::default()
        };
        let sort = QueryFilter::from_request(&request).unwrap().sort.unwrap();
        assert_eq!(sort.direction, SortDirection::Descending);
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let request = UserQueryRequest {
            sort_field: Some("userPassword".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            QueryFilter::from_request(&request),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_matches_partial_fields() {
        let mut user = sample_user(3, "lilac_admin");
        user.user_role = UserRole::Admin;

        let filter = QueryFilter {
            user_account: Some("admin".to_string()),
            user_role: Some("adm".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&user));

        let by_id = QueryFilter {
            id: Some(4),
            ..Default::default()
        };
        assert!(!by_id.matches(&user));

        user.user_profile = None;
        let by_profile = QueryFilter {
            user_profile: Some("hel".to_string()),
            ..Default::default()
        };
        assert!(!by_profile.matches(&user));
    }

    #[test]
    fn test_page_request_bounds() {
        assert_eq!(PageRequest::new(3, 10).unwrap().offset(), 20);
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_page_request_rejects_offset_overflow() {
        assert!(matches!(
            PageRequest::new(i64::MAX, 10),
            Err(AppError::InvalidArgument(_))
        ));
        let last = i64::MAX / MAX_PAGE_SIZE;
        assert_eq!(
            PageRequest::new(last, MAX_PAGE_SIZE).unwrap().offset(),
            (last - 1) * MAX_PAGE_SIZE
        );
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: UserQueryRequest = serde_json::from_str(r#"{"userName":"bo"}"#).unwrap();
        assert_eq!(request.current, 1);
        assert_eq!(request.page_size, 10);
        assert_eq!(request.user_name.as_deref(), Some("bo"));
    }
}
