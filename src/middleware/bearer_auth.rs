//! Bearer authentication middleware.
//!
//! Applies the auth gateway before every protected handler and injects
//! the verified `Claims` into request extensions, where handlers pick
//! them up via `web::ReqData<Claims>`. Every failure kind renders the
//! same generic 401 body; the specific kind goes to the logs.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::authenticate;
use crate::configuration::AuthSettings;

pub struct BearerAuth {
    auth_config: AuthSettings,
}

impl BearerAuth {
    pub fn new(auth_config: AuthSettings) -> Self {
        Self { auth_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(BearerAuthService {
            service: Rc::new(service),
            auth_config: self.auth_config.clone(),
        }))
    }
}

pub struct BearerAuthService<S> {
    service: Rc<S>,
    auth_config: AuthSettings,
}

impl<S, B> Service<ServiceRequest> for BearerAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(req.headers(), &self.auth_config) {
            Ok(claims) => {
                tracing::debug!(subject = %claims.sub, "request authenticated");
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(kind) => {
                tracing::warn!(kind = ?kind, path = req.path(), "request failed authentication");
                let response = HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "Unauthorized",
                    "code": "UNAUTHORIZED"
                }));
                Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response(
                        "unauthorized",
                        response,
                    )
                    .into())
                })
            }
        }
    }
}
