use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::error::AppError;
use crate::middleware::RequestTrace;
use crate::session::{SessionCookie, SessionHandle, SessionStore};
use crate::state::AppState;

/// Resumes the session named by a valid signed cookie.
///
/// Otherwise the request carries only the store; a session is created when
/// a handler extracts [`SessionHandle`], and its cookie is set on the
/// response.
pub struct SessionMiddleware {
    store: SessionStore,
    cookie: SessionCookie,
}

impl SessionMiddleware {
    pub fn new(store: SessionStore, cookie: SessionCookie) -> Self {
        Self { store, cookie }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.sessions.clone(), state.session_cookie.clone())
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            store: self.store.clone(),
            cookie: self.cookie.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    store: SessionStore,
    cookie: SessionCookie,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
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
        let service = Rc::clone(&self.service);
        let store = self.store.clone();
        let cookie = self.cookie.clone();

        let presented_id = req
            .cookie(cookie.name())
            .and_then(|c| cookie.verify(c));

        Box::pin(async move {
            let existing = match presented_id {
                Some(id) => store.load(&id).await.map(|data| SessionHandle::new(id, data)),
                None => None,
            };
            let resumed = existing.is_some();

            if let Some(handle) = existing {
                let mut extensions = req.extensions_mut();
                if let Some(trace) = extensions.get_mut::<RequestTrace>() {
                    trace.record_session(handle.id());
                }
                extensions.insert(handle);
            }
            req.extensions_mut().insert(store);

            let mut res = service.call(req).await?;

            if resumed {
                return Ok(res);
            }

            let created = res
                .request()
                .extensions()
                .get::<SessionHandle>()
                .map(|handle| handle.id().to_string());
            if let Some(session_id) = created {
                let signed = cookie.sign(&session_id).ok_or_else(|| {
                    AppError::InternalError("failed to sign session cookie".to_string())
                })?;
                res.response_mut().add_cookie(&signed).map_err(|e| {
                    log::error!("[{}] Failed to set session cookie: {}", session_id, e);
                    AppError::InternalError(e.to_string())
                })?;
            }

            Ok(res)
        })
    }
}
