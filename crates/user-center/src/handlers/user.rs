//! User account API handlers.
//!
//! Every endpoint answers with the [`ApiResponse`] envelope. The session is
//! provided by [`session_middleware`](super::middleware::session_middleware).

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::models::{LoginUserView, Page, PublicUserView, UserQueryRequest};
use crate::session::SessionHandle;
use crate::state::AppState;

/// Registration body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRegisterRequest {
    pub user_account: String,
    pub user_password: String,
    pub check_password: String,
}

/// Login body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserLoginRequest {
    pub user_account: String,
    pub user_password: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidArgument(rejection.body_text()))
}

/// Register a new account.
///
/// `POST /user/register`
///
/// # Request Body
///
/// ```json
/// {"userAccount": "alice", "userPassword": "secret1", "checkPassword": "secret1"}
/// ```
///
/// `data` is the new user's id.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<UserRegisterRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<i64>>> {
    let request = body(payload)?;
    let id = state
        .users
        .register(
            &request.user_account,
            &request.user_password,
            &request.check_password,
        )
        .await?;
    Ok(Json(ApiResponse::success(id)))
}

/// Log in and bind the user to the caller's session.
///
/// `POST /user/login`
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    payload: Result<Json<UserLoginRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<LoginUserView>>> {
    let request = body(payload)?;
    let mut session = session.lock().await;
    let view = state
        .users
        .login(&request.user_account, &request.user_password, &mut *session)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// The logged-in user.
///
/// `GET /user/get/login`
pub async fn get_login_user(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> AppResult<Json<ApiResponse<LoginUserView>>> {
    let session = session.lock().await;
    let user = state.users.current_user(&*session).await?;
    Ok(Json(ApiResponse::success(LoginUserView::from(&user))))
}

/// `POST /user/logout`
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let mut session = session.lock().await;
    let logged_out = state.users.logout(&mut *session)?;
    Ok(Json(ApiResponse::success(logged_out)))
}

/// One page of users. Admin only.
///
/// `POST /user/list/page/vo`
///
/// # Request Body
///
/// ```json
/// {
///   "current": 1,
///   "pageSize": 10,
///   "userAccount": "ali",
///   "sortField": "createTime",
///   "sortOrder": "ascend"
/// }
/// ```
pub async fn list_user_vo_by_page(
    State(state): State<AppState>,
    payload: Result<Json<UserQueryRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Page<PublicUserView>>>> {
    let request = payload.ok().map(|Json(request)| request);
    let page = state.users.list_users(request.as_ref()).await?;
    Ok(Json(ApiResponse::success(page)))
}
