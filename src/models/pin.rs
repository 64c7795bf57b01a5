use crate::pagination::Pagination;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserSummary;

/// An uploaded image post. `likes` has set semantics (`$addToSet`/`$pull`
/// only); `comments` are embedded oldest-first and immutable once pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Asset reference returned by the store, not a URL.
    pub image: String,
    pub owner: ObjectId,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub user: ObjectId,
    /// Denormalized at write time so rendering a thread costs no lookups.
    pub username: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        CommentResponse {
            id: comment.id.clone(),
            user_id: comment.user.to_hex(),
            username: comment.username.clone(),
            text: comment.text.clone(),
            created_at: comment.created_at,
        }
    }
}

/// One feed tile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PinResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub owner_id: String,
    pub owner_username: String,
    pub like_count: u64,
    pub comment_count: u64,
    pub is_liked: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedPage {
    pub posts: Vec<PinResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PinDetailResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub owner: UserSummary,
    pub like_count: u64,
    pub comment_count: u64,
    pub is_liked: bool,
    pub comments: Vec<CommentResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeResponse {
    pub success: bool,
    /// Whether the caller likes the pin after the toggle, recomputed from
    /// the stored like set rather than echoed from the request.
    pub liked: bool,
    pub like_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentCreatedResponse {
    pub success: bool,
    pub comment: CommentResponse,
    pub comment_count: u64,
}
