//! Client identity extractor used for rate limiting.

use std::future::{Ready, ready};
use std::net::SocketAddr;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};

use crate::state::AppState;

/// The identity a request is rate limited under.
///
/// This is the peer IP address. Behind a trusted reverse proxy
/// (`TRUST_FORWARDED_FOR=true`) the `Forwarded`/`X-Forwarded-For` address is
/// used instead; otherwise those headers are ignored so clients cannot pick
/// their own identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_request_parts(req: &HttpRequest) -> Self {
        let trust_forwarded = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.trust_forwarded_for)
            .unwrap_or(false);

        let id = if trust_forwarded {
            req.connection_info()
                .realip_remote_addr()
                .map(strip_port)
        } else {
            req.peer_addr().map(|addr| addr.ip().to_string())
        };

        ClientId(id.unwrap_or_else(|| "unknown".to_string()))
    }
}

/// `realip_remote_addr` falls back to the peer address, port included.
fn strip_port(addr: &str) -> String {
    addr.parse::<SocketAddr>()
        .map(|socket| socket.ip().to_string())
        .unwrap_or_else(|_| addr.to_string())
}

impl FromRequest for ClientId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_request_parts(req)))
    }
}
