use crate::{
    AppState,
    auth::{self, CurrentUser, OptionalUser},
    error::StoreError,
    flash::{self, Flash},
    models::{
        BlogPost, Comment, CommentForm, LoginForm, NewAccount, PostForm, ROLE_MEMBER,
        RegisterForm,
    },
    password,
};
use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

// --- View Templates ---

/// Every view extends `base.html`, which renders the navigation from `user`
/// and the pending flash messages, so each template struct carries both.

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    user: Option<CurrentUser>,
    flashes: Vec<Flash>,
    posts: Vec<BlogPost>,
}

#[derive(Template)]
#[template(path = "post.html")]
struct PostTemplate {
    user: Option<CurrentUser>,
    flashes: Vec<Flash>,
    post: BlogPost,
    comments: Vec<Comment>,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    user: Option<CurrentUser>,
    flashes: Vec<Flash>,
    // Validation failure, rendered inline next to the form.
    error: Option<String>,
    // Submitted values, echoed back so the visitor does not retype them.
    form: RegisterForm,
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    user: Option<CurrentUser>,
    flashes: Vec<Flash>,
    error: Option<String>,
    form: LoginForm,
}

#[derive(Template)]
#[template(path = "make-post.html")]
struct MakePostTemplate {
    user: Option<CurrentUser>,
    flashes: Vec<Flash>,
    error: Option<String>,
    form: PostForm,
    is_edit: bool,
    // Submit target: /new-post, or /edit-post/{id} when editing.
    action: String,
}

#[derive(Template)]
#[template(path = "about.html")]
struct AboutTemplate {
    user: Option<CurrentUser>,
    flashes: Vec<Flash>,
}

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate {
    user: Option<CurrentUser>,
    flashes: Vec<Flash>,
}

/// render
///
/// Renders a template to an HTML response. Template rendering is infallible
/// in practice (askama checks templates at compile time); a runtime failure
/// is logged and degraded to a plain error body.
fn render<T: Template>(template: T) -> Html<String> {
    Html(template.render().unwrap_or_else(|err| {
        tracing::error!("template render error: {:?}", err);
        String::from("Error rendering template")
    }))
}

/// deny_non_admin
///
/// The uniform answer for an authenticated-but-not-admin caller hitting a
/// post-management handler: a flashed warning and a redirect to the listing,
/// never an error page.
async fn deny_non_admin(session: &Session) -> Response {
    flash::push(session, Flash::warning("Easy now, admins only!")).await;
    Redirect::to("/").into_response()
}

// --- Registration ---

/// register_page
///
/// [Public Route] Renders the empty registration form.
pub async fn register_page(OptionalUser(user): OptionalUser, session: Session) -> Html<String> {
    let flashes = flash::take(&session).await;
    render(RegisterTemplate {
        user,
        flashes,
        error: None,
        form: RegisterForm::default(),
    })
}

/// register
///
/// [Public Route] Creates a new member account.
///
/// Flow: validate → duplicate pre-check → hash → insert. The unique
/// constraint on the email column is the authoritative duplicate check; the
/// pre-check only exists to give the common case a friendlier round trip.
/// Success and store failure both redirect to the login view; duplicates and
/// validation failures re-render the form.
pub async fn register(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if let Err(message) = form.validate() {
        let flashes = flash::take(&session).await;
        return render(RegisterTemplate {
            user,
            flashes,
            error: Some(message.to_string()),
            form,
        })
        .into_response();
    }

    let existing = match state.repo.find_account_by_email(&form.email).await {
        Ok(found) => found,
        Err(err) => {
            tracing::error!("register lookup error: {:?}", err);
            flash::push(
                &session,
                Flash::danger("Sorry, an error occurred during account creation, try again later."),
            )
            .await;
            return Redirect::to("/login").into_response();
        }
    };

    if existing.is_some() {
        let mut flashes = flash::take(&session).await;
        flashes.push(Flash::danger("Sorry, this email is already registered."));
        return render(RegisterTemplate {
            user,
            flashes,
            error: None,
            form,
        })
        .into_response();
    }

    let password_hash = match password::hash_password(&form.password) {
        Ok(digest) => digest,
        Err(err) => {
            tracing::error!("password hashing error: {:?}", err);
            flash::push(
                &session,
                Flash::danger("Sorry, an error occurred during account creation, try again later."),
            )
            .await;
            return Redirect::to("/login").into_response();
        }
    };

    let new_account = NewAccount {
        username: form.username.clone(),
        email: form.email.clone(),
        password_hash,
        role: ROLE_MEMBER.to_string(),
    };

    match state.repo.create_account(new_account).await {
        Ok(account) => {
            flash::push(
                &session,
                Flash::success(format!(
                    "{} has successfully been added to the blog, welcome!",
                    account.username
                )),
            )
            .await;
            Redirect::to("/login").into_response()
        }
        // Lost the race against a concurrent registration with the same email.
        Err(StoreError::DuplicateEmail) => {
            let mut flashes = flash::take(&session).await;
            flashes.push(Flash::danger("Sorry, this email is already registered."));
            render(RegisterTemplate {
                user,
                flashes,
                error: None,
                form,
            })
            .into_response()
        }
        Err(err) => {
            tracing::error!("register insert error: {:?}", err);
            flash::push(
                &session,
                Flash::danger("Sorry, an error occurred during account creation, try again later."),
            )
            .await;
            Redirect::to("/login").into_response()
        }
    }
}

// --- Login / Logout ---

/// login_page
///
/// [Public Route] Renders the empty login form.
pub async fn login_page(OptionalUser(user): OptionalUser, session: Session) -> Html<String> {
    let flashes = flash::take(&session).await;
    render(LoginTemplate {
        user,
        flashes,
        error: None,
        form: LoginForm::default(),
    })
}

/// login
///
/// [Public Route] Resolves credentials and establishes the session.
///
/// The two rejection messages stay distinct ("Email not found." vs
/// "Password incorrect."), matching the application's long-standing
/// observable behavior.
pub async fn login(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Err(message) = form.validate() {
        let flashes = flash::take(&session).await;
        return render(LoginTemplate {
            user,
            flashes,
            error: Some(message.to_string()),
            form,
        })
        .into_response();
    }

    let lookup = state.repo.find_account_by_email(&form.email).await;
    let account = match lookup {
        Ok(found) => found,
        Err(err) => {
            tracing::error!("login lookup error: {:?}", err);
            let mut flashes = flash::take(&session).await;
            flashes.push(Flash::danger("Sorry, something went wrong, try again later."));
            return render(LoginTemplate {
                user,
                flashes,
                error: None,
                form,
            })
            .into_response();
        }
    };

    let Some(account) = account else {
        let mut flashes = flash::take(&session).await;
        flashes.push(Flash::danger("Email not found."));
        return render(LoginTemplate {
            user,
            flashes,
            error: None,
            form,
        })
        .into_response();
    };

    if !password::verify_password(&form.password, &account.password_hash) {
        let mut flashes = flash::take(&session).await;
        flashes.push(Flash::danger("Password incorrect."));
        return render(LoginTemplate {
            user,
            flashes,
            error: None,
            form,
        })
        .into_response();
    }

    if let Err(err) = auth::establish_session(&session, &account).await {
        tracing::error!("session establishment error: {:?}", err);
        let mut flashes = flash::take(&session).await;
        flashes.push(Flash::danger("Sorry, something went wrong, try again later."));
        return render(LoginTemplate {
            user,
            flashes,
            error: None,
            form,
        })
        .into_response();
    }

    flash::push(&session, Flash::success("Successfully logged in.")).await;
    Redirect::to("/").into_response()
}

/// logout
///
/// [Authenticated Route] Clears the session and returns to the listing.
pub async fn logout(_user: CurrentUser, session: Session) -> Response {
    auth::clear_session(&session).await;
    flash::push(&session, Flash::success("Successfully logged out.")).await;
    Redirect::to("/").into_response()
}

// --- Posts ---

/// list_posts
///
/// [Public Route] The front page: every post, in insertion order.
pub async fn list_posts(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    session: Session,
) -> Result<Html<String>, StatusCode> {
    let posts = state.repo.list_posts().await.map_err(|err| {
        tracing::error!("list_posts error: {:?}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let flashes = flash::take(&session).await;
    Ok(render(IndexTemplate {
        user,
        flashes,
        posts,
    }))
}

/// show_post
///
/// [Public Route] A single post with its comments. The comment form is only
/// rendered for authenticated visitors; submission is guarded separately by
/// `add_comment`.
pub async fn show_post(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    session: Session,
    Path(post_id): Path<i32>,
) -> Result<Html<String>, StatusCode> {
    let post = state
        .repo
        .get_post(post_id)
        .await
        .map_err(|err| {
            tracing::error!("show_post error: {:?}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let comments = state.repo.get_comments(post_id).await.map_err(|err| {
        tracing::error!("show_post comments error: {:?}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let flashes = flash::take(&session).await;
    Ok(render(PostTemplate {
        user,
        flashes,
        post,
        comments,
    }))
}

/// add_comment
///
/// [Authenticated Route] Posts a new comment and returns to the post's page.
/// A 404 is only possible when the post vanished between render and submit.
pub async fn add_comment(
    user: CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<i32>,
    Form(form): Form<CommentForm>,
) -> Response {
    if let Err(message) = form.validate() {
        flash::push(&session, Flash::danger(message)).await;
        return Redirect::to(&format!("/post/{post_id}")).into_response();
    }

    match state.repo.add_comment(post_id, user.id, &form.body).await {
        Ok(_) => {
            flash::push(&session, Flash::success("Comment added.")).await;
        }
        Err(StoreError::NotFound) => return StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            tracing::error!("add_comment error: {:?}", err);
            flash::push(
                &session,
                Flash::danger(
                    "Sorry, an error occurred while processing your comment, try again later.",
                ),
            )
            .await;
        }
    }

    Redirect::to(&format!("/post/{post_id}")).into_response()
}

// --- Post Management (Admin) ---

/// new_post_page
///
/// [Admin Route] Renders the empty post form.
pub async fn new_post_page(user: CurrentUser, session: Session) -> Response {
    if !user.is_admin() {
        return deny_non_admin(&session).await;
    }

    let flashes = flash::take(&session).await;
    render(MakePostTemplate {
        user: Some(user),
        flashes,
        error: None,
        form: PostForm::default(),
        is_edit: false,
        action: "/new-post".to_string(),
    })
    .into_response()
}

/// create_post
///
/// [Admin Route] Creates a post stamped with today's date and returns to the
/// listing.
pub async fn create_post(
    user: CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PostForm>,
) -> Response {
    if !user.is_admin() {
        return deny_non_admin(&session).await;
    }

    if let Err(message) = form.validate() {
        let flashes = flash::take(&session).await;
        return render(MakePostTemplate {
            user: Some(user),
            flashes,
            error: Some(message.to_string()),
            form,
            is_edit: false,
            action: "/new-post".to_string(),
        })
        .into_response();
    }

    let created = state.repo.create_post(&form, user.id, &user.username).await;
    match created {
        Ok(_) => Redirect::to("/").into_response(),
        Err(StoreError::DuplicateTitle) => {
            let mut flashes = flash::take(&session).await;
            flashes.push(Flash::danger("A post with this title already exists."));
            render(MakePostTemplate {
                user: Some(user),
                flashes,
                error: None,
                form,
                is_edit: false,
                action: "/new-post".to_string(),
            })
            .into_response()
        }
        Err(err) => {
            tracing::error!("create_post error: {:?}", err);
            flash::push(
                &session,
                Flash::danger("Sorry, an error occurred while saving the post, try again later."),
            )
            .await;
            Redirect::to("/").into_response()
        }
    }
}

/// edit_post_page
///
/// [Admin Route] Renders the post form pre-filled with the post's current
/// fields.
pub async fn edit_post_page(
    user: CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<i32>,
) -> Response {
    if !user.is_admin() {
        return deny_non_admin(&session).await;
    }

    let post = match state.repo.get_post(post_id).await {
        Ok(Some(post)) => post,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            tracing::error!("edit_post_page error: {:?}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let flashes = flash::take(&session).await;
    render(MakePostTemplate {
        user: Some(user),
        flashes,
        error: None,
        form: PostForm {
            title: post.title,
            subtitle: post.subtitle,
            body: post.body,
            img_url: post.img_url,
        },
        is_edit: true,
        action: format!("/edit-post/{post_id}"),
    })
    .into_response()
}

/// update_post
///
/// [Admin Route] Full overwrite of the post's editable fields; the author is
/// reassigned to the editing admin and the publish date is left untouched.
pub async fn update_post(
    user: CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<i32>,
    Form(form): Form<PostForm>,
) -> Response {
    if !user.is_admin() {
        return deny_non_admin(&session).await;
    }

    if let Err(message) = form.validate() {
        let flashes = flash::take(&session).await;
        return render(MakePostTemplate {
            user: Some(user),
            flashes,
            error: Some(message.to_string()),
            form,
            is_edit: true,
            action: format!("/edit-post/{post_id}"),
        })
        .into_response();
    }

    let updated = state
        .repo
        .update_post(post_id, &form, user.id, &user.username)
        .await;
    match updated {
        Ok(Some(post)) => Redirect::to(&format!("/post/{}", post.id)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(StoreError::DuplicateTitle) => {
            let mut flashes = flash::take(&session).await;
            flashes.push(Flash::danger("A post with this title already exists."));
            render(MakePostTemplate {
                user: Some(user),
                flashes,
                error: None,
                form,
                is_edit: true,
                action: format!("/edit-post/{post_id}"),
            })
            .into_response()
        }
        Err(err) => {
            tracing::error!("update_post error: {:?}", err);
            flash::push(
                &session,
                Flash::danger("Sorry, an error occurred while saving the post, try again later."),
            )
            .await;
            Redirect::to(&format!("/edit-post/{post_id}")).into_response()
        }
    }
}

/// delete_post
///
/// [Admin Route] Cascade-deletes the post and its comments, then returns to
/// the listing.
pub async fn delete_post(
    user: CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<i32>,
) -> Response {
    if !user.is_admin() {
        return deny_non_admin(&session).await;
    }

    match state.repo.delete_post(post_id).await {
        Ok(true) => Redirect::to("/").into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            tracing::error!("delete_post error: {:?}", err);
            flash::push(
                &session,
                Flash::danger("Sorry, an error occurred while deleting the post, try again later."),
            )
            .await;
            Redirect::to("/").into_response()
        }
    }
}

// --- Static Pages ---

/// about
///
/// [Public Route] Static content.
pub async fn about(OptionalUser(user): OptionalUser, session: Session) -> Html<String> {
    let flashes = flash::take(&session).await;
    render(AboutTemplate { user, flashes })
}

/// contact
///
/// [Public Route] Static content.
pub async fn contact(OptionalUser(user): OptionalUser, session: Session) -> Html<String> {
    let flashes = flash::take(&session).await;
    render(ContactTemplate { user, flashes })
}
