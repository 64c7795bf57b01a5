use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered account. Stored in the `users` collection; the follow
/// relation is kept symmetric by the follow handler (`followers` on one
/// side, `following` on the other, updated as a pair).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub pins: Vec<ObjectId>,
    #[serde(default)]
    pub followers: Vec<ObjectId>,
    #[serde(default)]
    pub following: Vec<ObjectId>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email address.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// The user fields every rendered surface needs; the hex `_id` keeps the
/// JSON free of BSON extended-JSON shapes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl UserSummary {
    pub fn from_user(user: &User, asset_base: &str) -> Self {
        UserSummary {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username.clone(),
            display_name: user
                .display_name
                .clone()
                .unwrap_or_else(|| user.username.clone()),
            avatar_url: user
                .avatar
                .as_ref()
                .map(|a| format!("{}/{}", asset_base, a)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserSummary,
    pub follower_count: u64,
    pub following_count: u64,
    /// Whether the authenticated viewer follows this user; always false
    /// for anonymous viewers and on a user's own profile.
    pub is_following: bool,
    pub posts: Vec<super::PinResponse>,
    pub pagination: crate::pagination::Pagination,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FollowResponse {
    pub success: bool,
    /// Whether the caller follows the target after the toggle.
    pub following: bool,
    pub follower_count: u64,
}
