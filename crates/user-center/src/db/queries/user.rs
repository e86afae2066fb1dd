//! User table queries.

use sqlx::{Postgres, QueryBuilder};

use crate::db::models::UserRow;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, PageRequest, QueryFilter};

const USER_COLUMNS: &str = "id, user_account, user_password, user_name, user_profile, \
     user_role, edit_time, create_time, update_time, is_delete";

/// Count live users with exactly this account.
pub async fn count_by_account(pool: &DbPool, account: &str) -> AppResult<i64> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM users
        WHERE user_account = $1 AND is_delete = FALSE
        "#,
    )
    .bind(account)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Get a live user by account and password digest.
pub async fn find_by_account_and_password(
    pool: &DbPool,
    account: &str,
    password_hash: &str,
) -> AppResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE user_account = $1 AND user_password = $2 AND is_delete = FALSE
        "#
    ))
    .bind(account)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert a new user, returning its id.
///
/// A unique-index violation on the account becomes `AccountAlreadyExists`.
pub async fn insert_user(pool: &DbPool, user: &NewUser) -> AppResult<i64> {
    let result: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (user_account, user_password, user_name, user_role)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&user.user_account)
    .bind(&user.user_password)
    .bind(&user.user_name)
    .bind(user.user_role.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::AccountAlreadyExists
        }
        _ => AppError::Database(e),
    })?;

    Ok(result.0)
}

/// Get a live user by ID.
pub async fn find_by_id(pool: &DbPool, id: i64) -> AppResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE id = $1 AND is_delete = FALSE
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Append the WHERE clause for `filter` to a query over `users`.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &QueryFilter) {
    builder.push(" WHERE is_delete = FALSE");

    if let Some(id) = filter.id {
        builder.push(" AND id = ").push_bind(id);
    }

    let partial_matches = [
        ("user_account", &filter.user_account),
        ("user_name", &filter.user_name),
        ("user_profile", &filter.user_profile),
        ("user_role", &filter.user_role),
    ];
    for (column, value) in partial_matches {
        if let Some(value) = value {
            builder
                .push(format!(" AND {} LIKE ", column))
                .push_bind(format!("%{}%", escape_like(value)))
                .push(r" ESCAPE '\'");
        }
    }
}

/// Escape `LIKE` metacharacters so the value matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// List one page of live users matching `filter`, with the total match count.
pub async fn list_users(
    pool: &DbPool,
    filter: &QueryFilter,
    page: PageRequest,
) -> AppResult<(Vec<UserRow>, i64)> {
    let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
    push_filter(&mut count_query, filter);
    let total: i64 = count_query.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut list_query =
        QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
    push_filter(&mut list_query, filter);
    match filter.sort {
        // Column names come from SortField, never from the request text
        Some(sort) => list_query.push(format!(
            " ORDER BY {} {}, id ASC",
            sort.field.column(),
            sort.direction.as_sql()
        )),
        None => list_query.push(" ORDER BY id ASC"),
    };
    list_query
        .push(" LIMIT ")
        .push_bind(page.page_size)
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows = list_query
        .build_query_as::<UserRow>()
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}
