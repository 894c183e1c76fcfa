use std::{future::Future, pin::Pin, sync::Arc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures::future::{Ready, ok};

use common::{
    error::Res,
    jwt::{self, JwtClaims},
};

/// Validates the bearer token, if any, and leaves `Res<JwtClaims>` on the request
/// for handlers to pick up through `AuthUser`.
pub struct ExtractionMiddleware {
    jwt_secret: Arc<str>,
}

impl ExtractionMiddleware {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ExtractionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = ExtractionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ExtractionMiddlewareService {
            service: Arc::new(service),
            jwt_secret: self.jwt_secret.clone(),
        })
    }
}

pub struct ExtractionMiddlewareService<S> {
    service: Arc<S>,
    jwt_secret: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for ExtractionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // retrieve token from authorization header
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
            .map(str::to_owned);

        if let Some(token) = token {
            // validate token and insert claims to request object for future use
            let claims_res = jwt::validate_jwt(&token, &self.jwt_secret);
            if let Err(e) = &claims_res {
                log::debug!("Rejected bearer token on {}: {}", req.path(), e);
            }
            req.extensions_mut().insert::<Res<JwtClaims>>(claims_res);
        }

        let srv = Arc::clone(&self.service);
        Box::pin(async move { srv.call(req).await.map(|res| res.map_into_boxed_body()) })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, Responder, get, http::StatusCode, test};
    use common::{env_config::JwtConfig, jwt::AuthUser};
    use uuid::Uuid;

    use super::*;

    #[get("/whoami")]
    async fn whoami(user: AuthUser) -> impl Responder {
        HttpResponse::Ok().body(user.user_id.to_string())
    }

    #[actix_web::test]
    async fn valid_token_reaches_handler() {
        let user_id = Uuid::new_v4();
        let token = jwt::generate_jwt(
            user_id,
            &JwtConfig {
                secret: "secret".to_string(),
                expiration_hours: 1,
            },
        )
        .unwrap();

        let app = test::init_service(
            App::new()
                .wrap(ExtractionMiddleware::new("secret"))
                .service(whoami),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn missing_or_forged_token_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .wrap(ExtractionMiddleware::new("secret"))
                .service(whoami),
        )
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
