//! Admin authentication middleware.
//!
//! Place it on any route or scope that only administrators may use. It looks for an access token in the
//! `fee_access_token` header, then in the cookie of the same name, and validates it with the [`TokenIssuer`] that was
//! registered as app data. On success the [`AdminClaims`] are stored in the request extensions, where handlers can
//! pick them up. Otherwise a 401 response is returned and the wrapped service is never called.
use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    HttpMessage,
};
use futures::future::{ok, Ready};
use log::*;

use crate::{
    auth::TokenIssuer,
    errors::{AuthError, ServerError},
    helpers::access_token,
};

#[derive(Default)]
pub struct AdminAuthMiddlewareFactory;

impl AdminAuthMiddlewareFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AdminAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AdminAuthMiddlewareService { service: Rc::new(service) })
    }
}

pub struct AdminAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let issuer = req.app_data::<web::Data<TokenIssuer>>().cloned().ok_or_else(|| {
                error!("🔐️ No TokenIssuer has been registered. Admin routes are unreachable.");
                ServerError::ConfigurationError("Token issuer is not configured".into())
            })?;
            let token = access_token(req.request()).ok_or(ServerError::AuthenticationError(AuthError::MissingToken))?;
            let claims = issuer.validate(&token).map_err(|e| {
                debug!("🔐️ Admin token rejected for {}. {e}", req.path());
                ServerError::AuthenticationError(e)
            })?;
            trace!("🔐️ {} authenticated for {}", claims.username, req.path());
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
