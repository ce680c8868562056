//! End-to-end checks of the router over the in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use bson::{Document, doc, oid::ObjectId};
use futures::future::BoxFuture;
use tower::ServiceExt;

use runboard::{
    config::AppConfig,
    dao::{
        memory::MemoryStore,
        models::{
            ArchiveEntity, CategoryEntity, GameEntity, PlayerEntity, PlayerLinks, ScoreEntity,
        },
        storage::{StorageError, StorageResult},
        store::DocumentStore,
    },
    dto::forms::NewUserForm,
    routes,
    routes::guard::{ADMIN_REQUIRED, LOGIN_REQUIRED},
    services::user_service,
    session::{ADMIN_USERNAME, SessionData, cookie::SESSION_COOKIE},
    state::{AppState, SharedState},
};

/// How [`FaultyStore`] misbehaves when scores are listed.
#[derive(Clone, Copy)]
enum Fault {
    Fail,
    Panic,
}

/// Memory store whose `scores` listing breaks; everything else works.
#[derive(Clone)]
struct FaultyStore {
    inner: MemoryStore,
    fault: Fault,
}

impl DocumentStore for FaultyStore {
    fn find_one(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<Option<Document>>> {
        DocumentStore::find_one(&self.inner, collection, filter)
    }

    fn find_many(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
        if collection != "scores" {
            return DocumentStore::find_many(&self.inner, collection, filter);
        }
        let fault = self.fault;
        Box::pin(async move {
            let result: StorageResult<Vec<Document>> = match fault {
                Fault::Fail => Err(StorageError::unavailable(
                    "scores offline".into(),
                    std::io::Error::other("connection reset"),
                )),
                Fault::Panic => panic!("scores cursor exploded"),
            };
            result
        })
    }

    fn insert_one(
        &self,
        collection: &'static str,
        document: Document,
    ) -> BoxFuture<'static, StorageResult<()>> {
        DocumentStore::insert_one(&self.inner, collection, document)
    }

    fn update_one(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        DocumentStore::update_one(&self.inner, collection, filter, patch)
    }

    fn update_many(
        &self,
        collection: &'static str,
        filter: Document,
        patch: Document,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        DocumentStore::update_many(&self.inner, collection, filter, patch)
    }

    fn delete_one(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        DocumentStore::delete_one(&self.inner, collection, filter)
    }

    fn delete_many(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        DocumentStore::delete_many(&self.inner, collection, filter)
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        DocumentStore::health_check(&self.inner)
    }
}

struct TestApp {
    state: SharedState,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let config = AppConfig::from_lookup(|key| {
            (key == "SECRET_KEY").then(|| "integration-secret".to_owned())
        })
        .unwrap();
        let state = AppState::new(store, config).unwrap();
        let router = routes::router(state.clone());
        Self { state, router }
    }

    fn cookie(&self, user: Option<&str>) -> String {
        let data = SessionData {
            user: user.map(Into::into),
            flashes: Vec::new(),
        };
        format!(
            "{SESSION_COOKIE}={}",
            self.state.session_key().seal(&data).unwrap()
        )
    }

    async fn get(&self, path: &str, user: Option<&str>) -> Response<Body> {
        self.get_with_cookie(path, &self.cookie(user)).await
    }

    async fn get_with_cookie(&self, path: &str, cookie: &str) -> Response<Body> {
        let request = Request::get(path)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn post(&self, path: &str, user: Option<&str>, form: &str) -> Response<Body> {
        let request = Request::post(path)
            .header(header::COOKIE, self.cookie(user))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Session written back by the response, if any.
    fn session_of(&self, response: &Response<Body>) -> SessionData {
        let prefix = format!("{SESSION_COOKIE}=");
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.strip_prefix(&prefix))
            .filter_map(|value| value.split(';').next())
            .find_map(|value| self.state.session_key().open(value))
            .unwrap_or_default()
    }

    async fn insert<T: runboard::dao::models::Entity>(&self, entity: &T) {
        self.state.collection::<T>().insert_one(entity).await.unwrap();
    }

    async fn count<T: runboard::dao::models::Entity>(&self) -> usize {
        self.state
            .collection::<T>()
            .find_many(doc! {})
            .await
            .unwrap()
            .len()
    }

    async fn board(&self) -> (GameEntity, CategoryEntity) {
        let game = GameEntity {
            id: ObjectId::new(),
            name: "Super_Mario_64".into(),
        };
        let category = CategoryEntity {
            id: ObjectId::new(),
            game_id: game.id,
            name: "Any%".into(),
            description: String::new(),
        };
        self.insert(&game).await;
        self.insert(&category).await;
        (game, category)
    }

    async fn player(&self, name: &str) -> PlayerEntity {
        let player = PlayerEntity {
            id: ObjectId::new(),
            name: name.into(),
            links: PlayerLinks::default(),
        };
        self.insert(&player).await;
        player
    }

    async fn score(&self, category: &CategoryEntity, player: &PlayerEntity, value: u64) {
        self.insert(&ScoreEntity {
            id: ObjectId::new(),
            game_id: category.game_id,
            category_id: category.id,
            player_id: player.id,
            score: value,
        })
        .await;
    }
}

/// `session=<value>` pair of the cookie written back by the response.
fn returned_cookie(response: &Response<Body>) -> String {
    let prefix = format!("{SESSION_COOKIE}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .and_then(|value| value.split(';').next())
        .unwrap()
        .to_owned()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn admin_routes_require_the_admin_account() {
    let app = TestApp::new();

    for user in [None, Some("alice")] {
        let response = app.get("/manage_users", user).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert_eq!(app.session_of(&response).flashes, vec![ADMIN_REQUIRED]);
    }

    let response = app.get("/manage_users", Some(ADMIN_USERNAME)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Manage Users"));
}

#[tokio::test]
async fn member_routes_require_a_login() {
    let app = TestApp::new();

    let response = app.get("/admin", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert_eq!(app.session_of(&response).flashes, vec![LOGIN_REQUIRED]);

    let response = app.get("/admin", Some("alice")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_stores_the_lowercased_username() {
    let app = TestApp::new();
    user_service::add(
        &app.state,
        NewUserForm {
            username: "alice".into(),
            password: "hunter2".into(),
        },
    )
    .await
    .unwrap();

    let response = app.post("/login", None, "username=Alice&password=wrong").await;
    assert_eq!(location(&response), "/login");
    let session = app.session_of(&response);
    assert_eq!(session.user, None);
    assert_eq!(
        session.flashes,
        vec!["Username or password incorrect. Please try again."]
    );

    let response = app.post("/login", None, "username=Alice&password=hunter2").await;
    assert_eq!(location(&response), "/admin");
    let session = app.session_of(&response);
    assert_eq!(session.user.as_deref(), Some("alice"));
    assert_eq!(session.flashes, vec!["Welcome, alice"]);

    let logged_in = returned_cookie(&response);
    let response = app.get_with_cookie("/admin", &logged_in).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get_with_cookie("/logout", &logged_in).await;
    assert_eq!(location(&response), "/");
    let session = app.session_of(&response);
    assert_eq!(session.user, None);
    assert_eq!(session.flashes, vec!["You have been logged out."]);

    let logged_out = returned_cookie(&response);
    let response = app.get_with_cookie("/admin", &logged_out).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn duplicate_game_keeps_one_document() {
    let app = TestApp::new();

    let response = app.post("/add_game", Some("alice"), "name=foo").await;
    assert_eq!(location(&response), "/admin");
    assert_eq!(app.session_of(&response).flashes, vec!["Game added."]);

    let response = app.post("/add_game", Some("alice"), "name=foo").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/add_game");
    assert_eq!(
        app.session_of(&response).flashes,
        vec!["The submitted game name is already in use. Please try again."]
    );

    assert_eq!(app.count::<GameEntity>().await, 1);
}

#[tokio::test]
async fn deleting_a_category_archives_its_scores() {
    let app = TestApp::new();
    let (_, category) = app.board().await;
    let runner = app.player("runner").await;
    for value in [300, 200, 100] {
        app.score(&category, &runner, value).await;
    }

    let response = app
        .get(&format!("/delete_category/{}", category.id.to_hex()), Some("alice"))
        .await;
    assert_eq!(location(&response), "/admin");

    let scores = app
        .state
        .collection::<ScoreEntity>()
        .find_many(doc! {"category_id": category.id})
        .await
        .unwrap();
    assert!(scores.is_empty());
    assert_eq!(app.count::<CategoryEntity>().await, 0);

    let archive = app
        .state
        .collection::<ArchiveEntity>()
        .find_many(doc! {})
        .await
        .unwrap();
    assert_eq!(archive.len(), 1);
    assert_eq!(archive[0].scores.len(), 3);
}

#[tokio::test]
async fn leaderboard_lists_best_times_fastest_first() {
    let app = TestApp::new();
    let (_, category) = app.board().await;
    let alpha = app.player("Alpha").await;
    let bravo = app.player("Bravo").await;
    app.score(&category, &alpha, 500).await;
    app.score(&category, &alpha, 300).await;
    app.score(&category, &bravo, 400).await;

    let response = app.get("/", None).await;
    assert_eq!(location(&response), "/Super_Mario_64/Any%25");

    let response = app.get("/Super_Mario_64/Any%25", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Super Mario 64 - Any%"));

    let alpha_at = page.find("<td>Alpha").unwrap();
    let bravo_at = page.find("<td>Bravo").unwrap();
    assert!(alpha_at < bravo_at);
    assert!(page.contains("0:00:03.00"));
    assert!(page.contains("0:00:04.00"));
    assert!(!page.contains("0:00:05.00"));
}

#[tokio::test]
async fn malformed_time_is_reported_without_writing() {
    let app = TestApp::new();
    let (_, category) = app.board().await;
    let runner = app.player("runner").await;
    let path = format!("/add_score/{}", category.id.to_hex());

    let form = format!(
        "player_name={}&hours=abc&minutes=0&seconds=0&centiseconds=0",
        runner.id.to_hex()
    );
    let response = app.post(&path, Some("alice"), &form).await;
    assert_eq!(location(&response), path);
    assert_eq!(
        app.session_of(&response).flashes,
        vec!["Please enter a valid time."]
    );
    assert_eq!(app.count::<ScoreEntity>().await, 0);

    let form = format!(
        "player_name={}&hours=0&minutes=1&seconds=2&centiseconds=3",
        runner.id.to_hex()
    );
    let response = app.post(&path, Some("alice"), &form).await;
    assert_eq!(location(&response), "/admin");
    assert_eq!(app.count::<ScoreEntity>().await, 1);
}

#[tokio::test]
async fn missing_pages_render_the_branded_404() {
    let app = TestApp::new();
    app.board().await;

    for path in [
        "/no/such/page",
        "/Unknown_Game/Any%25",
        "/edit_game/not-an-id",
    ] {
        let response = app.get(path, Some("alice")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        let page = body_text(response).await;
        assert!(page.contains("Page Not Found"), "{path}");
        assert!(page.contains("Super Mario 64"), "menu missing on {path}");
    }
}

#[tokio::test]
async fn healthcheck_reports_ok() {
    let app = TestApp::new();
    let response = app.get("/healthcheck", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn storage_failures_render_the_branded_500() {
    for fault in [Fault::Fail, Fault::Panic] {
        let app = TestApp::with_store(Arc::new(FaultyStore {
            inner: MemoryStore::new(),
            fault,
        }));
        app.board().await;

        let response = app.get("/Super_Mario_64/Any%25", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let page = body_text(response).await;
        assert!(page.contains("Internal Server Error"));
        assert!(page.contains("Super Mario 64"), "menu missing on the 500 page");
        assert!(!page.contains("scores cursor exploded"));
        assert!(!page.contains("connection reset"));
    }
}
