use crate::api::wants_json;
use crate::auth::verify_token;
use crate::config::Config;
use crate::error::AppError;
use actix_web::{web, Error, FromRequest, HttpRequest, HttpResponse};
use mongodb::bson::oid::ObjectId;
use std::future::{ready, Ready};

/// Extracted from a `Bearer` token. Handlers take `AuthenticatedUser` for
/// private endpoints and `Option<AuthenticatedUser>` for public ones that
/// personalize their response when a session is present.
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
    pub username: String,
}

/// Programmatic callers get the structured 401 body; a plain browser
/// navigation is bounced to the login page instead.
fn auth_failure(req: &HttpRequest) -> Error {
    if wants_json(req) {
        AppError::AuthenticationRequired.into()
    } else {
        actix_web::error::InternalError::from_response(
            "authentication required",
            HttpResponse::SeeOther()
                .append_header(("Location", "/login"))
                .finish(),
        )
        .into()
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(header_value) = auth_header {
            if let Ok(header_str) = header_value.to_str() {
                if let Some(token) = header_str.strip_prefix("Bearer ") {
                    let config = req.app_data::<web::Data<Config>>();
                    if let Some(config) = config {
                        match verify_token(token, &config.jwt.secret) {
                            Ok(claims) => {
                                if let Ok(user_id) = ObjectId::parse_str(&claims.sub) {
                                    return ready(Ok(AuthenticatedUser {
                                        user_id,
                                        username: claims.username,
                                    }));
                                }
                            }
                            Err(_) => return ready(Err(auth_failure(req))),
                        }
                    }
                }
            }
        }

        ready(Err(auth_failure(req)))
    }
}
