use crate::auth::{create_token, hash_password, verify_password, Claims};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User, UserSummary};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use mongodb::bson::doc;
use mongodb::Database as MongoDatabase;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;
const PASSWORD_MIN: usize = 8;

fn validate_username(raw: &str) -> Result<String> {
    let username = raw.trim().to_string();
    if username.len() < USERNAME_MIN || username.len() > USERNAME_MAX {
        return Err(AppError::Validation(format!(
            "Username must be {}-{} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, '_' and '.'".to_string(),
        ));
    }
    Ok(username)
}

fn validate_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    Ok(email)
}

fn validate_password(raw: &str) -> Result<()> {
    if raw.len() < PASSWORD_MIN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN
        )));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid username, email or password"),
        (status = 409, description = "User already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    req: web::Json<RegisterRequest>,
    mongo_db: web::Data<MongoDatabase>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let username = validate_username(&req.username)?;
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    let users = mongo_db.collection::<User>("users");

    let existing = users
        .find_one(
            doc! { "$or": [ { "username": &username }, { "email": &email } ] },
            None,
        )
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "User with this email or username already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;

    let user = User {
        id: None,
        username: username.clone(),
        email,
        password_hash,
        display_name: None,
        avatar: None,
        pins: Vec::new(),
        followers: Vec::new(),
        following: Vec::new(),
        created_at: Utc::now(),
    };

    let inserted = users.insert_one(&user, None).await?;
    let user_id = inserted
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::Internal("insert returned a non-ObjectId key".to_string()))?;

    let claims = Claims::new(user_id, username, config.jwt.expiration_hours);
    let token = create_token(&claims, &config.jwt.secret)?;

    let stored = User {
        id: Some(user_id),
        ..user
    };

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserSummary::from_user(&stored, &config.assets.public_base),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn login(
    req: web::Json<LoginRequest>,
    mongo_db: web::Data<MongoDatabase>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let identifier = req.identifier.trim();
    if identifier.is_empty() {
        return Err(AppError::Validation(
            "Username or email is required".to_string(),
        ));
    }

    let users = mongo_db.collection::<User>("users");

    // The identifier matches either unique field.
    let user = users
        .find_one(
            doc! { "$or": [
                { "username": identifier },
                { "email": identifier.to_lowercase() },
            ] },
            None,
        )
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let is_valid = verify_password(&req.password, &user.password_hash)?;
    if !is_valid {
        return Err(AppError::AuthenticationRequired);
    }

    let user_id = user
        .id
        .ok_or_else(|| AppError::Internal("stored user is missing _id".to_string()))?;

    let claims = Claims::new(user_id, user.username.clone(), config.jwt.expiration_hours);
    let token = create_token(&claims, &config.jwt.secret)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserSummary::from_user(&user, &config.assets.public_base),
    }))
}
