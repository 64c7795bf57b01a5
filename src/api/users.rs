use crate::api::respond;
use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{FollowResponse, Pin, PinResponse, ProfileResponse, User, UserSummary};
use crate::pagination::{PageQuery, PageWindow, Pagination};
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database as MongoDatabase;

#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(
        ("username" = String, Path, description = "Profile username"),
        ("page" = Option<u64>, Query, description = "Pin page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Pins per page (default: 20, max: 50)")
    ),
    responses(
        (status = 200, description = "Profile with the user's pins", body = ProfileResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_profile(
    path: web::Path<String>,
    viewer: Option<AuthenticatedUser>,
    mongo_db: web::Data<MongoDatabase>,
    config: web::Data<Config>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let username = path.into_inner();
    let viewer_id = viewer.map(|v| v.user_id);

    let profile_user = mongo_db
        .collection::<User>("users")
        .find_one(doc! { "username": &username }, None)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    let profile_id = profile_user
        .id
        .ok_or_else(|| AppError::Internal("stored user is missing _id".to_string()))?;

    let window = PageWindow::from_query(&query);
    let pins = mongo_db.collection::<Pin>("pins");

    let total = pins
        .count_documents(doc! { "owner": profile_id }, None)
        .await?;

    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .skip(window.skip())
        .limit(window.limit as i64)
        .build();
    let mut cursor = pins.find(doc! { "owner": profile_id }, options).await?;

    let mut posts = Vec::new();
    while let Some(pin) = cursor.next().await {
        let pin = pin?;
        posts.push(PinResponse {
            id: pin.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: pin.title.clone(),
            description: pin.description.clone(),
            image_url: format!("{}/{}", config.assets.public_base, pin.image),
            owner_id: profile_id.to_hex(),
            owner_username: profile_user.username.clone(),
            like_count: pin.likes.len() as u64,
            comment_count: pin.comments.len() as u64,
            is_liked: viewer_id.map(|v| pin.likes.contains(&v)).unwrap_or(false),
            created_at: pin.created_at,
        });
    }

    let is_following = viewer_id
        .map(|v| profile_user.followers.contains(&v))
        .unwrap_or(false);

    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: UserSummary::from_user(&profile_user, &config.assets.public_base),
        follower_count: profile_user.followers.len() as u64,
        following_count: profile_user.following.len() as u64,
        is_following,
        posts,
        pagination: Pagination::compute(window, total),
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/follow",
    params(("user_id" = String, Path, description = "Target user ID")),
    responses(
        (status = 200, description = "Follow toggled", body = FollowResponse),
        (status = 400, description = "Cannot follow yourself"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn toggle_follow(
    req: HttpRequest,
    path: web::Path<String>,
    user: AuthenticatedUser,
    mongo_db: web::Data<MongoDatabase>,
) -> Result<HttpResponse> {
    let target_id =
        ObjectId::parse_str(path.into_inner()).map_err(|_| AppError::NotFound("User"))?;

    if target_id == user.user_id {
        return Err(AppError::Validation("You cannot follow yourself".to_string()));
    }

    let users = mongo_db.collection::<User>("users");

    let target = users
        .find_one(doc! { "_id": target_id }, None)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    // Both sides of the pair use idempotent set operators, so replaying
    // either update cannot corrupt the symmetry.
    let currently_following = target.followers.contains(&user.user_id);
    let (target_update, caller_update) = if currently_following {
        (
            doc! { "$pull": { "followers": user.user_id } },
            doc! { "$pull": { "following": target_id } },
        )
    } else {
        (
            doc! { "$addToSet": { "followers": user.user_id } },
            doc! { "$addToSet": { "following": target_id } },
        )
    };

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated_target = users
        .find_one_and_update(doc! { "_id": target_id }, target_update, options)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    users
        .update_one(doc! { "_id": user.user_id }, caller_update, None)
        .await?;

    let body = FollowResponse {
        success: true,
        following: updated_target.followers.contains(&user.user_id),
        follower_count: updated_target.followers.len() as u64,
    };
    Ok(respond(&req, body, false))
}
