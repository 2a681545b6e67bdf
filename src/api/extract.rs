//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::HandlerId;
use crate::error::GatewayError;

/// Header set by the session layer with the operator or device account.
pub const HANDLER_ID_HEADER: &str = "x-handler-id";

/// Operator or device account handling the request, if the session layer
/// identified one. Anonymous kiosks send no header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerIdentity(pub Option<HandlerId>);

impl<S> FromRequestParts<S> for HandlerIdentity
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(HANDLER_ID_HEADER) else {
            return Ok(Self(None));
        };
        let id = value
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<uuid::Uuid>().ok())
            .ok_or_else(|| {
                GatewayError::InvalidRequest(format!("{HANDLER_ID_HEADER} must be a UUID"))
            })?;
        Ok(Self(Some(HandlerId::from_uuid(id))))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<HandlerIdentity, GatewayError> {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header(HANDLER_ID_HEADER, h);
        }
        let Ok(request) = builder.body(()) else {
            panic!("valid request");
        };
        let (mut parts, ()) = request.into_parts();
        HandlerIdentity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn missing_header_is_anonymous() {
        assert!(matches!(extract(None).await, Ok(HandlerIdentity(None))));
    }

    #[tokio::test]
    async fn uuid_header_is_parsed() {
        let id = uuid::Uuid::new_v4();
        let Ok(HandlerIdentity(Some(handler))) = extract(Some(&id.to_string())).await else {
            panic!("expected handler identity");
        };
        assert_eq!(*handler.as_uuid(), id);
    }

    #[tokio::test]
    async fn malformed_header_is_rejected() {
        assert!(matches!(
            extract(Some("operator-7")).await,
            Err(GatewayError::InvalidRequest(_))
        ));
    }
}
