pub mod auth;
pub mod pins;
pub mod users;

use crate::models::{
    AuthResponse, CommentCreatedResponse, CommentRequest, CommentResponse, FeedPage,
    FollowResponse, LikeResponse, LoginRequest, PinDetailResponse, PinResponse, ProfileResponse,
    RegisterRequest, UserSummary,
};
use crate::pagination::Pagination;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use utoipa::OpenApi;

/// Content negotiation for the dual-mode endpoints: fetch-style callers
/// mark themselves with `X-Requested-With` or an `application/json` Accept
/// header and get the JSON envelope; anything else is a browser
/// navigation and gets a redirect.
pub fn wants_json(req: &HttpRequest) -> bool {
    let xhr = req
        .headers()
        .get("X-Requested-With")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
        .unwrap_or(false);
    let accepts_json = req
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);
    xhr || accepts_json
}

/// Dual-mode mutation response: fetch callers get the JSON envelope,
/// browser form posts bounce back to the page they came from.
pub fn respond(req: &HttpRequest, json: impl Serialize, created: bool) -> HttpResponse {
    if wants_json(req) {
        if created {
            HttpResponse::Created().json(json)
        } else {
            HttpResponse::Ok().json(json)
        }
    } else {
        let back = req
            .headers()
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("/");
        HttpResponse::SeeOther()
            .append_header((header::LOCATION, back))
            .finish()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth endpoints
        auth::register,
        auth::login,
        // Pin endpoints
        pins::get_feed,
        pins::get_pin,
        pins::create_pin,
        pins::toggle_like,
        pins::add_comment,
        // User endpoints
        users::get_profile,
        users::toggle_follow,
    ),
    components(schemas(
        // Auth schemas
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        UserSummary,
        // Pin schemas
        PinResponse,
        PinDetailResponse,
        FeedPage,
        Pagination,
        LikeResponse,
        CommentRequest,
        CommentResponse,
        CommentCreatedResponse,
        // User schemas
        ProfileResponse,
        FollowResponse,
        // Query schemas
        crate::pagination::PageQuery,
    )),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "pins", description = "Feed, pin detail, upload, like and comment endpoints"),
        (name = "users", description = "Profile and follow endpoints"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
