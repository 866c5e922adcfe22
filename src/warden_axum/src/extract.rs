//! Request extractors shared by the route handlers.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{HeaderMap, request::Parts},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use secrecy::Secret;
use warden_core::RequestMetadata;

use crate::error::ApiError;

pub const DEVICE_ID_HEADER: &str = "x-device-id";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const REAL_IP_HEADER: &str = "x-real-ip";

/// `Json` whose rejections use the service's error body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// Client details used to annotate issued refresh tokens.
#[derive(Debug, Clone, Default)]
pub struct ClientMetadata(pub RequestMetadata);

impl<S: Send + Sync> FromRequestParts<S> for ClientMetadata {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientMetadata(RequestMetadata {
            user_agent: header_value(&parts.headers, axum::http::header::USER_AGENT.as_str()),
            ip_address: client_ip(&parts.headers).or(peer),
            device_id: header_value(&parts.headers, DEVICE_ID_HEADER),
        }))
    }
}

/// The access token from an `Authorization: Bearer` header, if one is present
/// and well formed.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<Secret<String>>);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|Authorization(bearer)| bearer.token().to_owned())
            .filter(|token| !token.is_empty())
            .map(Secret::new);
        Ok(BearerToken(token))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_value(headers, FORWARDED_FOR_HEADER)
        .and_then(|hops| {
            hops.split(',')
                .next()
                .map(str::trim)
                .filter(|hop| !hop.is_empty())
                .map(str::to_owned)
        })
        .or_else(|| header_value(headers, REAL_IP_HEADER))
}
