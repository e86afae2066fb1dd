//! Session and admin middleware.

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::result_ext::OptionResultExt;
use crate::services::UserAccountService;
use crate::session::{Session, SessionHandle};
use crate::state::AppState;

/// Attach the caller's session to the request and persist it afterwards.
///
/// The handler sees a [`SessionHandle`] in the request extensions. A cookie
/// is only issued once the session holds something; a session emptied by the
/// handler is dropped and its cookie expired. An unknown or expired session
/// id from the client is never reused.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session_cookie.as_str();
    let presented = extract_session_id(request.headers(), cookie_name).map(str::to_string);

    let loaded = match &presented {
        Some(id) => state.sessions.load(id).await.map(|session| (id.clone(), session)),
        None => None,
    };
    let (session_id, session, known) = match loaded {
        Some((id, session)) => (id, session, true),
        None => (state.sessions.issue_id(), Session::new(), false),
    };

    let handle = SessionHandle::new(session);
    request.extensions_mut().insert(handle.clone());

    let mut response = next.run(request).await;

    let session = handle.snapshot().await;
    if session.is_empty() {
        if known {
            state.sessions.invalidate(&session_id).await;
        }
        if presented.is_some() {
            set_cookie(&mut response, &format!("{}=; Max-Age=0", cookie_name));
        }
    } else {
        state.sessions.store(&session_id, session).await;
        if !known {
            set_cookie(&mut response, &format!("{}={}", cookie_name, session_id));
        }
    }

    response
}

/// Let the request through only for a logged-in admin.
///
/// Must run inside [`session_middleware`]. The admin's [`User`](crate::models::User)
/// is added to the request extensions.
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let handle = request
        .extensions()
        .get::<SessionHandle>()
        .cloned()
        .log_none("session handle for admin route")
        .ok_or(AppError::NotAuthenticated)?;

    let user = {
        let session = handle.lock().await;
        state.users.current_user(&*session).await?
    };
    UserAccountService::require_admin(&user)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn set_cookie(response: &mut Response, pair: &str) {
    let cookie = format!("{}; Path=/; HttpOnly; SameSite=Lax", pair);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "Session cookie is not a valid header value"),
    }
}

/// Extract the session id from the `Cookie` headers.
fn extract_session_id<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_session_id() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; USER_CENTER_SESSION=abc123; lang=en"),
        );
        assert_eq!(extract_session_id(&headers, "USER_CENTER_SESSION"), Some("abc123"));
        assert_eq!(extract_session_id(&headers, "OTHER"), None);
    }

    #[test]
    fn test_extract_session_id_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("USER_CENTER_SESSION=xyz"));
        assert_eq!(extract_session_id(&headers, "USER_CENTER_SESSION"), Some("xyz"));
    }

    #[test]
    fn test_empty_cookie_value_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("USER_CENTER_SESSION="));
        assert_eq!(extract_session_id(&headers, "USER_CENTER_SESSION"), None);
    }
}
