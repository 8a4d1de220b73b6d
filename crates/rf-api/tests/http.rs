//! HTTP-level behaviour of the forum against the real plugins.

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{CONTENT_TYPE, LOCATION};
use actix_web::http::StatusCode;
use actix_web::middleware::from_fn;
use actix_web::web::Data;
use actix_web::{test, App};
use chrono::{Duration, Utc};
use rf_api::extract::SESSION_COOKIE;
use rf_api::handlers::AppState;
use rf_api::configure_routes;
use rf_api::middleware::{csrf_guard, CSRF_COOKIE, CSRF_HEADER};
use rf_auth_simple::SimpleAuthProvider;
use rf_core::{
    Ban, Complaint, DiscussionRef, Post, PrivateMessage, Rating, RatingValue, Role, Section, Topic, User,
};
use rf_db_sqlite::SqliteForumRepo;
use rf_storage_local::LocalMediaStore;
use uuid::Uuid;

const SEED: &str = "test-csrf-seed";
const PASSWORD: &str = "correct horse";

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .wrap(from_fn(csrf_guard))
                .configure(configure_routes),
        )
        .await
    };
}

async fn forum() -> Data<AppState> {
    let repo = SqliteForumRepo::new("sqlite::memory:").await.unwrap();
    let root = std::env::temp_dir().join(format!("rf-api-{}", Uuid::now_v7().simple()));
    let store = LocalMediaStore::new(root, "/uploads".into());
    let auth = SimpleAuthProvider::new(b"test-secret", Duration::days(30))
        .unwrap()
        .with_cost(8, 1)
        .unwrap();
    Data::new(AppState {
        repo: Box::new(repo),
        store: Box::new(store),
        auth: Box::new(auth),
    })
}

struct Member {
    user: User,
    session_id: String,
}

async fn member(state: &AppState, name: &str, role: Option<Role>) -> Member {
    let now = Utc::now();
    let user = User {
        id: Uuid::now_v7(),
        username: name.into(),
        email: format!("{name}@example.com"),
        password_hash: state.auth.hash_password(PASSWORD).await.unwrap(),
        avatar: None,
        is_deleted: false,
        role,
        created_at: now,
        updated_at: now,
    };
    state.repo.create_user(&user).await.unwrap();
    let session_id = state.auth.create_session(user.id);
    Member { user, session_id }
}

async fn section(state: &AppState, name: &str) -> Section {
    let now = Utc::now();
    let section = Section {
        id: Uuid::now_v7(),
        name: name.into(),
        description: String::new(),
        created_at: now,
        updated_at: now,
    };
    state.repo.create_section(&section).await.unwrap();
    section
}

async fn topic(state: &AppState, section_id: Uuid, author: &Member, is_open: bool) -> Topic {
    let now = Utc::now();
    let topic = Topic {
        id: Uuid::now_v7(),
        section_id,
        author_id: author.user.id,
        title: "Hello".into(),
        content: "First!".into(),
        is_pinned: false,
        is_open,
        created_at: now,
        updated_at: now,
    };
    state.repo.create_topic(&topic).await.unwrap();
    topic
}

async fn post(state: &AppState, discussion: DiscussionRef, author: &Member) -> Post {
    let now = Utc::now();
    let post = Post {
        id: Uuid::now_v7(),
        discussion,
        author_id: author.user.id,
        content: "a reply".into(),
        created_at: now,
        updated_at: now,
    };
    state.repo.create_post(&post).await.unwrap();
    post
}

/// A form POST carrying the CSRF cookie, the matching token and an optional session.
fn form(state: &AppState, path: &str, who: Option<&Member>, fields: &[(&str, &str)]) -> test::TestRequest {
    let mut body: Vec<(String, String)> =
        fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    body.push(("_csrf".into(), state.auth.csrf_token(SEED)));
    with_session(
        test::TestRequest::post()
            .uri(path)
            .cookie(Cookie::new(CSRF_COOKIE, SEED))
            .set_form(&body),
        who,
    )
}

fn get(path: &str, who: Option<&Member>) -> test::TestRequest {
    with_session(test::TestRequest::get().uri(path), who)
}

fn with_session(req: test::TestRequest, who: Option<&Member>) -> test::TestRequest {
    match who {
        Some(m) => req.cookie(Cookie::new(SESSION_COOKIE, m.session_id.clone())),
        None => req,
    }
}

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn first_visit_issues_csrf_cookie() {
    let state = forum().await;
    let app = app!(state);

    let res = test::call_service(&app, get("/", None).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.response().cookies().any(|c| c.name() == CSRF_COOKIE));
}

#[actix_web::test]
async fn state_changes_without_valid_csrf_token_are_rejected() {
    let state = forum().await;
    let moderator = member(&state, "mod", Some(Role::Moderator)).await;
    let app = app!(state);

    // No token at all
    let req = with_session(
        test::TestRequest::post()
            .uri("/sections")
            .cookie(Cookie::new(CSRF_COOKIE, SEED))
            .set_form([("name", "News")]),
        Some(&moderator),
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Token signed for a different seed
    let foreign = state.auth.csrf_token("other-seed");
    let req = with_session(
        test::TestRequest::post()
            .uri("/sections")
            .cookie(Cookie::new(CSRF_COOKIE, SEED))
            .set_form([("name", "News"), ("_csrf", foreign.as_str())]),
        Some(&moderator),
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Valid token but no seed cookie
    let token = state.auth.csrf_token(SEED);
    let req = with_session(
        test::TestRequest::post()
            .uri("/sections")
            .set_form([("name", "News"), ("_csrf", token.as_str())]),
        Some(&moderator),
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(state.repo.list_sections().await.unwrap().is_empty());

    // The header works as well as the form field
    let req = with_session(
        test::TestRequest::post()
            .uri("/sections")
            .cookie(Cookie::new(CSRF_COOKIE, SEED))
            .insert_header((CSRF_HEADER, state.auth.csrf_token(SEED)))
            .set_form([("name", "News")]),
        Some(&moderator),
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.repo.list_sections().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn registration_logs_the_new_user_in() {
    let state = forum().await;
    let app = app!(state);

    let req = form(
        &state,
        "/users",
        None,
        &[
            ("username", "newbie"),
            ("email", "NewBie@Example.com"),
            ("password", "longenough"),
            ("password_confirmation", "different"),
        ],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = form(
        &state,
        "/users",
        None,
        &[
            ("username", "newbie"),
            ("email", "NewBie@Example.com"),
            ("password", "longenough"),
            ("password_confirmation", "longenough"),
        ],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(res.response().cookies().any(|c| c.name() == SESSION_COOKIE));

    let user = state.repo.get_user_by_username("newbie").await.unwrap().unwrap();
    assert_eq!(user.email, "newbie@example.com");

    let req = form(
        &state,
        "/users",
        None,
        &[
            ("username", "newbie"),
            ("email", "other@example.com"),
            ("password", "longenough"),
            ("password_confirmation", "longenough"),
        ],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn topic_without_title_is_not_created() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let general = section(&state, "General").await;
    let app = app!(state);

    let path = format!("/sections/{}/topics", general.id);
    let req = form(&state, &path, Some(&alice), &[("title", "  "), ("content", "body")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(state.repo.list_topics(general.id).await.unwrap().is_empty());

    // Leaving the field out entirely is the same form error, shown as a page
    let req = form(&state, &path, Some(&alice), &[("content", "body")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = String::from_utf8_lossy(&test::read_body(res).await).to_string();
    assert!(html.contains("missing field"), "{html}");
    assert!(state.repo.list_topics(general.id).await.unwrap().is_empty());

    let req = form(&state, &path, Some(&alice), &[("title", "Hi"), ("content", "body")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.repo.list_topics(general.id).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn anonymous_users_cannot_post() {
    let state = forum().await;
    let general = section(&state, "General").await;
    let app = app!(state);

    let path = format!("/sections/{}/topics", general.id);
    let req = form(&state, &path, None, &[("title", "Hi"), ("content", "body")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn only_owner_or_moderator_may_change_a_post() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let bob = member(&state, "bob", None).await;
    let moderator = member(&state, "mod", Some(Role::Moderator)).await;
    let general = section(&state, "General").await;
    let t = topic(&state, general.id, &alice, true).await;
    let p = post(&state, DiscussionRef::Topic(t.id), &alice).await;
    let app = app!(state);

    let path = format!("/posts/{}", p.id);
    let req = form(&state, &path, Some(&bob), &[("_method", "PUT"), ("content", "hijacked")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = form(&state, &path, Some(&bob), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(state.repo.get_post(p.id).await.unwrap().unwrap().content, "a reply");

    let req = form(&state, &path, Some(&moderator), &[("_method", "PUT"), ("content", "tidied")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.repo.get_post(p.id).await.unwrap().unwrap().content, "tidied");

    let req = form(&state, &path, Some(&moderator), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/topics/{}", t.id));
    assert!(state.repo.get_post(p.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn method_override_via_query_string() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let general = section(&state, "General").await;
    let t = topic(&state, general.id, &alice, true).await;
    let p = post(&state, DiscussionRef::Topic(t.id), &alice).await;
    let app = app!(state);

    let path = format!("/posts/{}?_method=delete", p.id);
    let req = form(&state, &path, Some(&alice), &[]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(state.repo.get_post(p.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn pinning_is_reserved_for_moderators() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let moderator = member(&state, "mod", Some(Role::Moderator)).await;
    let general = section(&state, "General").await;
    let t = topic(&state, general.id, &alice, true).await;
    let app = app!(state);

    let path = format!("/topics/{}", t.id);
    let req = form(
        &state,
        &path,
        Some(&alice),
        &[("_method", "PUT"), ("title", "Hello"), ("content", "First!"), ("is_pinned", "true")],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Editing text alone is fine for the owner
    let req = form(
        &state,
        &path,
        Some(&alice),
        &[("_method", "PUT"), ("title", "Hello again"), ("content", "First!")],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let req = form(
        &state,
        &path,
        Some(&moderator),
        &[
            ("_method", "PUT"),
            ("title", "Hello again"),
            ("content", "First!"),
            ("is_pinned", "true"),
            ("is_open", "false"),
        ],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let saved = state.repo.get_topic(t.id).await.unwrap().unwrap();
    assert_eq!(saved.title, "Hello again");
    assert!(saved.is_pinned);
    assert!(!saved.is_open);
}

#[actix_web::test]
async fn closed_topic_rejects_replies() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let general = section(&state, "General").await;
    let closed = topic(&state, general.id, &alice, false).await;
    let app = app!(state);

    let req = form(&state, &format!("/topics/{}/posts", closed.id), Some(&alice), &[("content", "hello?")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let posts = state.repo.list_posts(DiscussionRef::Topic(closed.id)).await.unwrap();
    assert!(posts.is_empty());
}

#[actix_web::test]
async fn second_rating_on_same_target_is_rejected() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let bob = member(&state, "bob", None).await;
    let general = section(&state, "General").await;
    let t = topic(&state, general.id, &alice, true).await;
    let app = app!(state);

    let id = t.id.to_string();
    for value in ["5", "up", ""] {
        let req = form(&state, "/ratings", Some(&bob), &[("rateable_id", id.as_str()), ("value", value)]);
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "value {value:?}");
    }
    let req = form(&state, "/ratings", Some(&bob), &[("rateable_id", id.as_str())]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(state.repo.list_ratings_by(bob.user.id, &[t.id]).await.unwrap().is_empty());

    let req = form(&state, "/ratings", Some(&bob), &[("rateable_id", id.as_str()), ("value", "1")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/topics/{}", t.id));

    let req = form(&state, "/ratings", Some(&bob), &[("rateable_id", id.as_str()), ("value", "-1")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mine = state.repo.list_ratings_by(bob.user.id, &[t.id]).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].value, RatingValue::Up);

    // Changing the vote goes through the rating itself
    let req = form(
        &state,
        &format!("/ratings/{}", mine[0].id),
        Some(&bob),
        &[("_method", "PUT"), ("value", "-1")],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.repo.scores(&[t.id]).await.unwrap().get(&t.id), Some(&-1));
}

#[actix_web::test]
async fn deleting_a_section_removes_everything_beneath_it() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let moderator = member(&state, "mod", Some(Role::Moderator)).await;
    let doomed = section(&state, "Doomed").await;
    let t = topic(&state, doomed.id, &alice, true).await;
    let p = post(&state, DiscussionRef::Topic(t.id), &alice).await;
    state
        .repo
        .create_rating(&Rating {
            id: Uuid::now_v7(),
            owner_id: moderator.user.id,
            target: p.rateable(),
            value: RatingValue::Down,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    state
        .repo
        .create_complaint(&Complaint {
            id: Uuid::now_v7(),
            author_id: moderator.user.id,
            target: t.rateable(),
            reason: "spam".into(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    let app = app!(state);

    // Members cannot delete sections
    let path = format!("/sections/{}", doomed.id);
    let req = form(&state, &path, Some(&alice), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = form(&state, &path, Some(&moderator), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    assert!(state.repo.get_section(doomed.id).await.unwrap().is_none());
    assert!(state.repo.get_topic(t.id).await.unwrap().is_none());
    assert!(state.repo.get_post(p.id).await.unwrap().is_none());
    assert!(state.repo.scores(&[p.id]).await.unwrap().is_empty());
    assert!(state.repo.list_complaints().await.unwrap().is_empty());
}

#[actix_web::test]
async fn banned_user_cannot_log_in() {
    let state = forum().await;
    let troll = member(&state, "troll", None).await;
    let app = app!(state);

    let req = form(&state, "/login", None, &[("username", "troll"), ("password", PASSWORD)]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let now = Utc::now();
    state
        .repo
        .create_ban(&Ban {
            id: Uuid::now_v7(),
            user_id: troll.user.id,
            reason: "spam".into(),
            expires_at: now + Duration::days(1),
            created_at: now,
        })
        .await
        .unwrap();

    let req = form(&state, "/login", None, &[("username", "troll"), ("password", PASSWORD)]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login?banned=1");
    assert!(!res
        .response()
        .cookies()
        .any(|c| c.name() == SESSION_COOKIE && !c.value().is_empty()));

    let req = form(&state, "/login", None, &[("username", "troll"), ("password", "wrong")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(location(&res), "/login?error=1");
}

#[actix_web::test]
async fn existing_session_of_banned_user_is_ended() {
    let state = forum().await;
    let troll = member(&state, "troll", None).await;
    let app = app!(state);

    let res = test::call_service(&app, get("/messages", Some(&troll)).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let now = Utc::now();
    state
        .repo
        .create_ban(&Ban {
            id: Uuid::now_v7(),
            user_id: troll.user.id,
            reason: "spam".into(),
            expires_at: now + Duration::hours(1),
            created_at: now,
        })
        .await
        .unwrap();

    let res = test::call_service(&app, get("/messages", Some(&troll)).to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).starts_with("/login"));
    assert_eq!(state.auth.resolve_session(&troll.session_id), None);
}

#[actix_web::test]
async fn moderator_bans_by_username_but_not_themselves() {
    let state = forum().await;
    let troll = member(&state, "troll", None).await;
    let moderator = member(&state, "mod", Some(Role::Moderator)).await;
    let app = app!(state);

    let req = form(
        &state,
        "/bans",
        Some(&moderator),
        &[("username", "mod"), ("reason", "test"), ("expires_at", "2999-01-01T00:00")],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = form(
        &state,
        "/bans",
        Some(&moderator),
        &[("username", "troll"), ("reason", "spam"), ("expires_at", "2999-01-01T00:00")],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let ban = state.repo.get_ban_for_user(troll.user.id).await.unwrap().unwrap();
    assert!(ban.is_active(Utc::now()));
    assert_eq!(state.auth.resolve_session(&troll.session_id), None);

    let req = form(&state, &format!("/bans/{}", ban.id), Some(&moderator), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(state.repo.get_ban_for_user(troll.user.id).await.unwrap().is_none());
}

/// A multipart settings form for `PUT /users/{id}`. Parts with a filename are file uploads.
fn settings_upload(
    state: &AppState,
    who: &Member,
    user_id: Uuid,
    parts: &[(&str, Option<&str>, &[u8])],
) -> test::TestRequest {
    let boundary = "rf-test-boundary";
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        let disposition = match filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream"
            ),
            None => format!("Content-Disposition: form-data; name=\"{name}\""),
        };
        body.extend_from_slice(format!("--{boundary}\r\n{disposition}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    let uri = format!("/users/{user_id}?_method=PUT&_csrf={}", state.auth.csrf_token(SEED));
    with_session(
        test::TestRequest::post()
            .uri(&uri)
            .cookie(Cookie::new(CSRF_COOKIE, SEED))
            .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}")))
            .set_payload(body),
        Some(who),
    )
}

fn avatar_upload(state: &AppState, who: &Member, filename: &str, bytes: &[u8]) -> test::TestRequest {
    settings_upload(state, who, who.user.id, &[("avatar", Some(filename), bytes)])
}

#[actix_web::test]
async fn avatar_extension_is_checked() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let app = app!(state);

    let req = avatar_upload(&state, &alice, "me.gif", b"GIF89a");
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(state.repo.get_user(alice.user.id).await.unwrap().unwrap().avatar.is_none());

    let req = avatar_upload(&state, &alice, "me.PNG", b"\x89PNG fake");
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let avatar = state.repo.get_user(alice.user.id).await.unwrap().unwrap().avatar.unwrap();
    assert!(avatar.starts_with("avatars/") && avatar.ends_with(".png"));
}

#[actix_web::test]
async fn private_messages_are_hidden_from_outsiders() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let bob = member(&state, "bob", None).await;
    let carol = member(&state, "carol", None).await;
    let app = app!(state);

    let req = form(
        &state,
        "/messages",
        Some(&alice),
        &[("recipients", "bob"), ("title", "Secret"), ("content", "psst")],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let message: PrivateMessage = state.repo.list_messages_for(bob.user.id).await.unwrap().remove(0);
    assert_eq!(message.participants, vec![alice.user.id, bob.user.id]);

    let path = format!("/messages/{}", message.id);
    let res = test::call_service(&app, get(&path, Some(&bob)).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = test::read_body(res).await;
    assert!(String::from_utf8_lossy(&body).contains("psst"));

    let res = test::call_service(&app, get(&path, Some(&carol)).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let id = message.id.to_string();
    let req = form(&state, "/ratings", Some(&carol), &[("rateable_id", id.as_str()), ("value", "1")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = form(&state, &format!("/messages/{}/posts", message.id), Some(&carol), &[("content", "me too")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Unknown recipients are a form error
    let req = form(
        &state,
        "/messages",
        Some(&alice),
        &[("recipients", "nobody"), ("title", "Hi"), ("content", "hello")],
    );
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn topic_page_shows_scores_and_escapes_content() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let general = section(&state, "General").await;
    let t = topic(&state, general.id, &alice, true).await;
    let mut reply = post(&state, DiscussionRef::Topic(t.id), &alice).await;
    reply.content = "<b>bold</b>".into();
    state.repo.update_post(&reply).await.unwrap();
    let app = app!(state);

    let res = test::call_service(&app, get(&format!("/topics/{}", t.id), None).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = String::from_utf8_lossy(&test::read_body(res).await).to_string();
    assert!(html.contains("Hello"));
    assert!(html.contains("&lt;b&gt;bold"));
    assert!(!html.contains("<b>bold</b>"));

    let res = test::call_service(&app, get(&format!("/topics/{}", Uuid::now_v7()), None).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleted_user_is_logged_out_for_good() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let bob = member(&state, "bob", None).await;
    let moderator = member(&state, "mod", Some(Role::Moderator)).await;
    let app = app!(state);

    // Only the owner or a moderator
    let path = format!("/users/{}", alice.user.id);
    let req = form(&state, &path, Some(&bob), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = form(&state, &path, Some(&moderator), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let saved = state.repo.get_user(alice.user.id).await.unwrap().unwrap();
    assert!(saved.is_deleted);
    assert_eq!(state.auth.resolve_session(&alice.session_id), None);

    let req = form(&state, "/login", None, &[("username", "alice"), ("password", PASSWORD)]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(location(&res), "/login?error=1");

    // A session that outlived the deletion counts as anonymous
    let stale = Member {
        user: saved,
        session_id: state.auth.create_session(alice.user.id),
    };
    let res = test::call_service(&app, get("/messages", Some(&stale)).to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let res = test::call_service(&app, get("/", Some(&stale)).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(state.auth.resolve_session(&stale.session_id), None);
}

#[actix_web::test]
async fn members_cannot_promote_themselves() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let moderator = member(&state, "mod", Some(Role::Moderator)).await;
    let app = app!(state);

    let req = settings_upload(&state, &alice, alice.user.id, &[("role", None, b"Moderator".as_slice())]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(state.repo.get_user(alice.user.id).await.unwrap().unwrap().role, None);

    let req = settings_upload(&state, &moderator, alice.user.id, &[("role", None, b"Moderator".as_slice())]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        state.repo.get_user(alice.user.id).await.unwrap().unwrap().role,
        Some(Role::Moderator)
    );
}

#[actix_web::test]
async fn complaints_reach_moderators() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let bob = member(&state, "bob", None).await;
    let moderator = member(&state, "mod", Some(Role::Moderator)).await;
    let general = section(&state, "General").await;
    let t = topic(&state, general.id, &alice, true).await;
    let app = app!(state);

    let path = format!("/rateables/{}/complaints", t.id);
    let req = form(&state, &path, Some(&bob), &[("reason", " ")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = form(&state, &path, Some(&bob), &[("reason", "off-topic rant")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/topics/{}", t.id));
    let complaint = state.repo.list_complaints().await.unwrap().remove(0);
    assert_eq!(complaint.author_id, bob.user.id);

    // The queue is for moderators only
    let res = test::call_service(&app, get("/complaints", Some(&bob)).to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = test::call_service(&app, get("/complaints", Some(&moderator)).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = String::from_utf8_lossy(&test::read_body(res).await).to_string();
    assert!(html.contains("off-topic rant"));

    // Someone else's complaint cannot be dismissed by a member
    let req = form(&state, &format!("/complaints/{}", complaint.id), Some(&alice), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = form(&state, &format!("/complaints/{}", complaint.id), Some(&moderator), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/complaints");
    assert!(state.repo.list_complaints().await.unwrap().is_empty());

    // Authors may withdraw their own
    let req = form(&state, &path, Some(&bob), &[("reason", "never mind")]);
    test::call_service(&app, req.to_request()).await;
    let complaint = state.repo.list_complaints().await.unwrap().remove(0);
    let req = form(&state, &format!("/complaints/{}", complaint.id), Some(&bob), &[("_method", "DELETE")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(state.repo.get_complaint(complaint.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn only_the_author_edits_a_private_message() {
    let state = forum().await;
    let alice = member(&state, "alice", None).await;
    let bob = member(&state, "bob", None).await;
    let app = app!(state);

    let req = form(
        &state,
        "/messages",
        Some(&alice),
        &[("recipients", "bob"), ("title", "Plans"), ("content", "lunch?")],
    );
    test::call_service(&app, req.to_request()).await;
    let message = state.repo.list_messages_for(alice.user.id).await.unwrap().remove(0);

    let path = format!("/messages/{}", message.id);
    let req = form(&state, &path, Some(&bob), &[("_method", "PUT"), ("title", "Mine now"), ("content", "x")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = form(&state, &path, Some(&alice), &[("_method", "PUT"), ("title", "Plans"), ("content", "dinner?")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let saved = state.repo.get_message(message.id).await.unwrap().unwrap();
    assert_eq!(saved.title, "Plans");
    assert_eq!(saved.content, "dinner?");
}

#[actix_web::test]
async fn moderator_edits_a_ban() {
    let state = forum().await;
    let troll = member(&state, "troll", None).await;
    let moderator = member(&state, "mod", Some(Role::Moderator)).await;
    let now = Utc::now();
    let ban = Ban {
        id: Uuid::now_v7(),
        user_id: troll.user.id,
        reason: "spam".into(),
        expires_at: now + Duration::days(1),
        created_at: now,
    };
    state.repo.create_ban(&ban).await.unwrap();
    let app = app!(state);

    let path = format!("/bans/{}", ban.id);
    let fields = [("_method", "PUT"), ("reason", "repeated spam"), ("expires_at", "2999-06-01T12:00")];
    let req = form(&state, &path, Some(&troll), &fields);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).starts_with("/login"));

    let req = form(&state, &path, Some(&moderator), &[("_method", "PUT"), ("reason", "x"), ("expires_at", "2000-01-01T00:00")]);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = form(&state, &path, Some(&moderator), &fields);
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let saved = state.repo.get_ban(ban.id).await.unwrap().unwrap();
    assert_eq!(saved.reason, "repeated spam");
    assert_eq!(saved.expires_at.format("%Y-%m-%dT%H:%M").to_string(), "2999-06-01T12:00");

    let res = test::call_service(&app, get("/bans", Some(&moderator)).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}
