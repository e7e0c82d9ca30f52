use crate::{
    auth::{AuthSession, LoginRequest, RegisterRequest, TokenKeys},
    error::AppError,
    models::{PublicUser, User},
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates a new account and issues a first session immediately: the response
/// body carries the public user, the `x-auth` header the session token.
#[post("/users")]
pub async fn create_user(
    pool: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = User::register(pool.get_ref(), &register_data).await?;
    let token = User::issue_session(pool.get_ref(), &keys, user.id).await?;

    Ok(HttpResponse::Ok()
        .insert_header(("x-auth", token))
        .json(PublicUser::from(&user)))
}

/// Login
///
/// Checks the credentials and appends a fresh session token to the user's
/// stored token list. Bad credentials fail with one generic 400 regardless
/// of whether the email exists.
#[post("/users/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let user = User::find_by_credentials(pool.get_ref(), &login_data.email, &login_data.password)
        .await?;
    let token = User::issue_session(pool.get_ref(), &keys, user.id).await?;

    Ok(HttpResponse::Ok()
        .insert_header(("x-auth", token))
        .json(PublicUser::from(&user)))
}

/// Returns the authenticated caller's own public profile.
#[get("/users/me")]
pub async fn me(session: AuthSession) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(PublicUser {
        id: session.user_id,
        email: session.email,
    }))
}

/// Logout: removes exactly the presented session token.
/// The user's other sessions stay valid.
#[delete("/users/me/token")]
pub async fn logout(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    User::remove_token(pool.get_ref(), session.user_id, &session.token).await?;

    Ok(HttpResponse::Ok().finish())
}
