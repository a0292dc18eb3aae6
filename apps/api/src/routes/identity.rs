use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

/// Header carrying the user id verified by the auth layer in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's verified identity. Trusted as-is; also the candidate id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| AuthenticatedUser(v.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<AuthenticatedUser, AppError> {
        let (mut parts, _) = req.into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_trimmed_user_id() {
        let req = Request::builder()
            .header(USER_ID_HEADER, " user-7 ")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await.unwrap(), AuthenticatedUser("user-7".into()));
    }

    #[tokio::test]
    async fn test_missing_or_blank_header_is_unauthorized() {
        let missing = Request::builder().body(()).unwrap();
        assert!(matches!(extract(missing).await, Err(AppError::Unauthorized)));

        let blank = Request::builder()
            .header(USER_ID_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(matches!(extract(blank).await, Err(AppError::Unauthorized)));
    }
}
