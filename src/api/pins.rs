use crate::api::respond;
use crate::assets::AssetStore;
use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentCreatedResponse, CommentRequest, CommentResponse, FeedPage, LikeResponse,
    Pin, PinDetailResponse, PinResponse, User, UserSummary,
};
use crate::pagination::{PageQuery, PageWindow, Pagination};
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, to_bson};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database as MongoDatabase;
use std::collections::HashMap;
use uuid::Uuid;

const MAX_TITLE_CHARS: usize = 120;
const MAX_DESCRIPTION_CHARS: usize = 2000;
const MAX_COMMENT_CHARS: usize = 500;
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

fn parse_pin_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| AppError::NotFound("Pin"))
}

fn image_url(config: &Config, reference: &str) -> String {
    format!("{}/{}", config.assets.public_base, reference)
}

fn pin_response(
    pin: &Pin,
    owner_username: &str,
    viewer: Option<ObjectId>,
    config: &Config,
) -> PinResponse {
    PinResponse {
        id: pin.id.map(|id| id.to_hex()).unwrap_or_default(),
        title: pin.title.clone(),
        description: pin.description.clone(),
        image_url: image_url(config, &pin.image),
        owner_id: pin.owner.to_hex(),
        owner_username: owner_username.to_string(),
        like_count: pin.likes.len() as u64,
        comment_count: pin.comments.len() as u64,
        is_liked: viewer.map(|v| pin.likes.contains(&v)).unwrap_or(false),
        created_at: pin.created_at,
    }
}

#[utoipa::path(
    get,
    path = "/api/feed",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20, max: 50)")
    ),
    responses(
        (status = 200, description = "Newest-first page of pins", body = FeedPage)
    ),
    tag = "pins"
)]
pub async fn get_feed(
    user: Option<AuthenticatedUser>,
    mongo_db: web::Data<MongoDatabase>,
    config: web::Data<Config>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let viewer = user.map(|u| u.user_id);
    let window = PageWindow::from_query(&query);

    let pins = mongo_db.collection::<Pin>("pins");

    // Total is counted independently of the slice.
    let total = pins.count_documents(None, None).await?;

    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .skip(window.skip())
        .limit(window.limit as i64)
        .build();
    let mut cursor = pins.find(None, options).await?;

    let mut page_pins = Vec::new();
    while let Some(pin) = cursor.next().await {
        page_pins.push(pin?);
    }

    // One username lookup per distinct owner on the page.
    let users = mongo_db.collection::<User>("users");
    let mut usernames: HashMap<ObjectId, String> = HashMap::new();
    for pin in &page_pins {
        if !usernames.contains_key(&pin.owner) {
            let name = users
                .find_one(doc! { "_id": pin.owner }, None)
                .await?
                .map(|u| u.username)
                .unwrap_or_else(|| "deleted".to_string());
            usernames.insert(pin.owner, name);
        }
    }

    let posts = page_pins
        .iter()
        .map(|pin| pin_response(pin, &usernames[&pin.owner], viewer, &config))
        .collect();

    Ok(HttpResponse::Ok().json(FeedPage {
        posts,
        pagination: Pagination::compute(window, total),
    }))
}

#[utoipa::path(
    get,
    path = "/api/pins/{pin_id}",
    params(("pin_id" = String, Path, description = "Pin ID")),
    responses(
        (status = 200, description = "Pin detail", body = PinDetailResponse),
        (status = 404, description = "Pin not found")
    ),
    tag = "pins"
)]
pub async fn get_pin(
    path: web::Path<String>,
    user: Option<AuthenticatedUser>,
    mongo_db: web::Data<MongoDatabase>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let pin_id = parse_pin_id(&path)?;
    let viewer = user.map(|u| u.user_id);

    let pin = mongo_db
        .collection::<Pin>("pins")
        .find_one(doc! { "_id": pin_id }, None)
        .await?
        .ok_or(AppError::NotFound("Pin"))?;

    let owner = mongo_db
        .collection::<User>("users")
        .find_one(doc! { "_id": pin.owner }, None)
        .await?
        .ok_or(AppError::NotFound("Pin owner"))?;

    Ok(HttpResponse::Ok().json(PinDetailResponse {
        id: pin.id.map(|id| id.to_hex()).unwrap_or_default(),
        title: pin.title.clone(),
        description: pin.description.clone(),
        image_url: image_url(&config, &pin.image),
        owner: UserSummary::from_user(&owner, &config.assets.public_base),
        like_count: pin.likes.len() as u64,
        comment_count: pin.comments.len() as u64,
        is_liked: viewer.map(|v| pin.likes.contains(&v)).unwrap_or(false),
        comments: pin.comments.iter().map(CommentResponse::from).collect(),
        created_at: pin.created_at,
    }))
}

struct UploadForm {
    title: Option<String>,
    description: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

async fn read_upload_form(mut payload: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm {
        title: None,
        description: None,
        image: None,
    };

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?;
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?;
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(AppError::Validation("Image is too large".to_string()));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "image" => {
                let filename = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or("upload.bin")
                    .to_string();
                form.image = Some((filename, bytes));
            }
            "title" => {
                form.title = Some(String::from_utf8(bytes).map_err(|_| {
                    AppError::Validation("Title must be valid UTF-8".to_string())
                })?);
            }
            "description" => {
                form.description = Some(String::from_utf8(bytes).map_err(|_| {
                    AppError::Validation("Description must be valid UTF-8".to_string())
                })?);
            }
            _ => {} // unknown fields are dropped
        }
    }

    Ok(form)
}

#[utoipa::path(
    post,
    path = "/api/pins",
    responses(
        (status = 201, description = "Pin created", body = PinResponse),
        (status = 400, description = "Missing title or image"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "pins"
)]
pub async fn create_pin(
    req: HttpRequest,
    payload: Multipart,
    user: AuthenticatedUser,
    mongo_db: web::Data<MongoDatabase>,
    config: web::Data<Config>,
    store: web::Data<dyn AssetStore>,
) -> Result<HttpResponse> {
    let form = read_upload_form(payload).await?;

    let title = form
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("Title is required".to_string()))?
        .to_string();
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }

    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| d.to_string());
    if let Some(d) = &description {
        if d.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::Validation(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            )));
        }
    }

    let (filename, bytes) = form
        .image
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| AppError::Validation("An image file is required".to_string()))?;

    let reference = store.put(&filename, &bytes)?;

    let pin = Pin {
        id: None,
        title,
        description,
        image: reference.clone(),
        owner: user.user_id,
        likes: Vec::new(),
        comments: Vec::new(),
        created_at: Utc::now(),
    };

    let inserted = match mongo_db.collection::<Pin>("pins").insert_one(&pin, None).await {
        Ok(inserted) => inserted,
        Err(e) => {
            // The asset is unreachable without a pin document; clean it up.
            if let Err(cleanup) = store.delete(&reference) {
                log::warn!("Failed to clean up asset {}: {:?}", reference, cleanup);
            }
            return Err(e.into());
        }
    };
    let pin_id = inserted
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::Internal("insert returned a non-ObjectId key".to_string()))?;

    // Second document of the pair; a failure here leaves the pin without a
    // back-reference and is only logged (last-write-wins posture).
    if let Err(e) = mongo_db
        .collection::<User>("users")
        .update_one(
            doc! { "_id": user.user_id },
            doc! { "$push": { "pins": pin_id } },
            None,
        )
        .await
    {
        log::error!(
            "Pin {} created but owner {} was not updated: {:?}",
            pin_id,
            user.user_id,
            e
        );
    }

    let stored = Pin {
        id: Some(pin_id),
        ..pin
    };
    let body = pin_response(&stored, &user.username, Some(user.user_id), &config);
    Ok(respond(&req, body, true))
}

#[utoipa::path(
    post,
    path = "/api/pins/{pin_id}/like",
    params(("pin_id" = String, Path, description = "Pin ID")),
    responses(
        (status = 200, description = "Like toggled", body = LikeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Pin not found")
    ),
    security(("bearer_auth" = [])),
    tag = "pins"
)]
pub async fn toggle_like(
    req: HttpRequest,
    path: web::Path<String>,
    user: AuthenticatedUser,
    mongo_db: web::Data<MongoDatabase>,
) -> Result<HttpResponse> {
    let pin_id = parse_pin_id(&path)?;
    let pins = mongo_db.collection::<Pin>("pins");

    let pin = pins
        .find_one(doc! { "_id": pin_id }, None)
        .await?
        .ok_or(AppError::NotFound("Pin"))?;

    // Concurrent toggles race here; both operators are idempotent so the
    // stored set stays duplicate-free either way.
    let update = if pin.likes.contains(&user.user_id) {
        doc! { "$pull": { "likes": user.user_id } }
    } else {
        doc! { "$addToSet": { "likes": user.user_id } }
    };

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated = pins
        .find_one_and_update(doc! { "_id": pin_id }, update, options)
        .await?
        .ok_or(AppError::NotFound("Pin"))?;

    // The response reports the stored membership, not the client's guess.
    let body = LikeResponse {
        success: true,
        liked: updated.likes.contains(&user.user_id),
        like_count: updated.likes.len() as u64,
    };
    Ok(respond(&req, body, false))
}

#[utoipa::path(
    post,
    path = "/api/pins/{pin_id}/comment",
    params(("pin_id" = String, Path, description = "Pin ID")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentCreatedResponse),
        (status = 400, description = "Empty comment"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Pin not found")
    ),
    security(("bearer_auth" = [])),
    tag = "pins"
)]
pub async fn add_comment(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
    user: AuthenticatedUser,
    mongo_db: web::Data<MongoDatabase>,
) -> Result<HttpResponse> {
    let pin_id = parse_pin_id(&path)?;

    let text = body.text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Validation("Comment text is required".to_string()));
    }
    if text.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::Validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_CHARS
        )));
    }

    let comment = Comment {
        id: Uuid::new_v4().to_string(),
        user: user.user_id,
        username: user.username.clone(),
        text,
        created_at: Utc::now(),
    };
    let comment_bson =
        to_bson(&comment).map_err(|e| AppError::Internal(format!("BSON encode: {}", e)))?;

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated = mongo_db
        .collection::<Pin>("pins")
        .find_one_and_update(
            doc! { "_id": pin_id },
            doc! { "$push": { "comments": comment_bson } },
            options,
        )
        .await?
        .ok_or(AppError::NotFound("Pin"))?;

    let response = CommentCreatedResponse {
        success: true,
        comment: CommentResponse::from(&comment),
        comment_count: updated.comments.len() as u64,
    };
    Ok(respond(&req, response, true))
}
