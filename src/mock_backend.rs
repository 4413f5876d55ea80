//! Backend em processo para os testes dos services (actix-web).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::api::ApiClient;

const JWT_SECRET: &str = "mock-backend-secret";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
    jti: String,
}

struct MockUser {
    record: Map<String, Value>,
    password: String,
}

#[derive(Default)]
pub struct MockState {
    users: Vec<MockUser>,
    tokens: HashMap<String, String>,
    sessions: Vec<Value>,
    evaluations: Vec<Value>,
    hits: HashMap<String, usize>,
    delays: HashMap<String, Duration>,
}

impl MockState {
    fn hit(&mut self, path: &str) {
        *self.hits.entry(path.to_string()).or_insert(0) += 1;
    }

    fn user_for(&self, req: &HttpRequest) -> Option<Map<String, Value>> {
        let header = req.headers().get("Authorization")?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?;
        let user_id = self.tokens.get(token)?;
        self.users
            .iter()
            .find(|u| u.record.get("id").and_then(Value::as_str) == Some(user_id.as_str()))
            .map(|u| u.record.clone())
    }

    fn issue_token(&mut self, user_id: &str, ttl_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: String::new(),
            iat: now,
            exp: now + ttl_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
            .expect("mock token");
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }
}

type SharedState = web::Data<Mutex<MockState>>;

// Simula backend lento em rotas configuradas com `set_delay`
async fn pause(state: &SharedState, path: &str) {
    let delay = state.lock().unwrap().delays.get(path).copied();
    if let Some(delay) = delay {
        actix_rt::time::sleep(delay).await;
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "message": "Invalid or expired session" }))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

async fn login(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    pause(&state, "/login").await;
    let mut state = state.lock().unwrap();
    state.hit("/login");

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    let found = state
        .users
        .iter()
        .find(|u| u.record.get("email").and_then(Value::as_str) == Some(email.as_str()) && u.password == password)
        .map(|u| u.record.clone());

    match found {
        Some(record) => {
            let user_id = record["id"].as_str().unwrap_or_default().to_string();
            let token = state.issue_token(&user_id, 3600);
            HttpResponse::Ok().json(json!({ "token": token, "user": record }))
        }
        None => HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" })),
    }
}

async fn register(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    pause(&state, "/register").await;
    let mut state = state.lock().unwrap();
    state.hit("/register");

    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.users.iter().any(|u| u.record.get("email").and_then(Value::as_str) == Some(email.as_str())) {
        return HttpResponse::BadRequest().json(json!({ "error": "User already exists" }));
    }

    let mut record = body.as_object().cloned().unwrap_or_default();
    let password = record
        .remove("password")
        .and_then(|p| p.as_str().map(String::from))
        .unwrap_or_default();
    let user_id = new_id();
    record.insert("id".to_string(), json!(user_id));
    record.insert("created_at".to_string(), json!(chrono::Utc::now().to_rfc3339()));

    state.users.push(MockUser { record: record.clone(), password });
    let token = state.issue_token(&user_id, 3600);
    HttpResponse::Created().json(json!({ "token": token, "user": record }))
}

async fn check_session(state: SharedState, req: HttpRequest) -> HttpResponse {
    pause(&state, "/check-session").await;
    let mut state = state.lock().unwrap();
    state.hit("/check-session");

    match state.user_for(&req) {
        Some(record) => HttpResponse::Ok().json(json!({ "user": record })),
        None => unauthorized(),
    }
}

async fn update_profile(state: SharedState, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    pause(&state, "/update-profile").await;
    let mut state = state.lock().unwrap();
    state.hit("/update-profile");

    let Some(current) = state.user_for(&req) else {
        return unauthorized();
    };
    let user_id = current["id"].as_str().unwrap_or_default().to_string();

    let user = state
        .users
        .iter_mut()
        .find(|u| u.record.get("id").and_then(Value::as_str) == Some(user_id.as_str()))
        .expect("user exists");
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            user.record.insert(key.clone(), value.clone());
        }
    }
    HttpResponse::Ok().json(json!({ "user": user.record }))
}

async fn list_sessions(state: SharedState, req: HttpRequest) -> HttpResponse {
    pause(&state, "/sessions").await;
    let mut state = state.lock().unwrap();
    state.hit("/sessions");

    if state.user_for(&req).is_none() {
        return unauthorized();
    }
    HttpResponse::Ok().json(&state.sessions)
}

async fn list_evaluations(state: SharedState, req: HttpRequest) -> HttpResponse {
    pause(&state, "/evaluations").await;
    let mut state = state.lock().unwrap();
    state.hit("/evaluations");

    if state.user_for(&req).is_none() {
        return unauthorized();
    }
    HttpResponse::Ok().json(&state.evaluations)
}

async fn create_session(state: SharedState, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    pause(&state, "/create-session").await;
    let mut state = state.lock().unwrap();
    state.hit("/create-session");

    let Some(user) = state.user_for(&req) else {
        return unauthorized();
    };
    if user.get("role").and_then(Value::as_str) != Some("instructor") {
        return HttpResponse::Forbidden().json(json!({ "message": "Only instructors can create sessions" }));
    }

    let mut record = body.as_object().cloned().unwrap_or_default();
    record.insert("id".to_string(), json!(new_id()));
    record.insert("created_by".to_string(), user["id"].clone());
    record.insert("created_at".to_string(), json!(chrono::Utc::now().to_rfc3339()));
    let record = Value::Object(record);

    state.sessions.push(record.clone());
    HttpResponse::Created().json(json!({ "message": "Session created", "session": record }))
}

async fn submit_evaluation(state: SharedState, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    pause(&state, "/submit-evaluation").await;
    let mut state = state.lock().unwrap();
    state.hit("/submit-evaluation");

    let Some(user) = state.user_for(&req) else {
        return unauthorized();
    };

    let record = json!({
        "id": new_id(),
        "session_id": body["session_id"].clone(),
        "student_id": body["student_id"].clone(),
        "evaluator_id": user["id"].clone(),
        // Valor propositalmente errado: o cliente deve recalcular
        "evaluator_role": "instructor",
        "criteria": body["criteria"].clone(),
        "created_at": chrono::Utc::now().to_rfc3339(),
    });

    state.evaluations.push(record.clone());
    HttpResponse::Created().json(record)
}

pub struct MockBackend {
    pub base_url: String,
    state: SharedState,
    handle: ServerHandle,
}

impl MockBackend {
    pub async fn start() -> MockBackend {
        let state: SharedState = web::Data::new(Mutex::new(MockState::default()));
        let data = state.clone();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/login", web::post().to(login))
                .route("/register", web::post().to(register))
                .route("/check-session", web::get().to(check_session))
                .route("/update-profile", web::put().to(update_profile))
                .route("/sessions", web::get().to(list_sessions))
                .route("/evaluations", web::get().to(list_evaluations))
                .route("/create-session", web::post().to(create_session))
                .route("/submit-evaluation", web::post().to(submit_evaluation))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .expect("bind mock backend");

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_rt::spawn(server);

        MockBackend {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.base_url)
    }

    /// Cadastra um usuário e devolve o id
    pub fn seed_user(&self, name: &str, email: &str, password: &str, role: &str, roll_number: Option<&str>) -> String {
        let id = new_id();
        let mut record = Map::new();
        record.insert("id".to_string(), json!(id));
        record.insert("name".to_string(), json!(name));
        record.insert("email".to_string(), json!(email));
        record.insert("role".to_string(), json!(role));
        if let Some(roll) = roll_number {
            record.insert("roll_number".to_string(), json!(roll));
        }
        record.insert("created_at".to_string(), json!("2024-01-01 08:00:00"));

        self.state.lock().unwrap().users.push(MockUser {
            record,
            password: password.to_string(),
        });
        id
    }

    pub fn issue_token(&self, user_id: &str) -> String {
        self.state.lock().unwrap().issue_token(user_id, 3600)
    }

    pub fn issue_expired_token(&self, user_id: &str) -> String {
        self.state.lock().unwrap().issue_token(user_id, -60)
    }

    pub fn seed_session(&self, record: Value) {
        self.state.lock().unwrap().sessions.push(record);
    }

    pub fn seed_evaluation(&self, record: Value) {
        self.state.lock().unwrap().evaluations.push(record);
    }

    pub fn set_delay(&self, path: &str, delay: Duration) {
        self.state.lock().unwrap().delays.insert(path.to_string(), delay);
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
