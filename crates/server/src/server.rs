use axum::{
    Extension, Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use std::sync::Arc;

use crate::{
    ServerError, assignments, attendance, auth, classes, reports, students, subjects, teachers,
    user,
};
use api_types::{ErrorBody, Health};
use engine::{Engine, EngineError, Identity, Role};

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, PATCH";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With, Accept, Origin";
const EXPOSE_HEADERS: &str = "Content-Type, Authorization";
const NO_STORE: &str = "no-store, no-cache, must-revalidate, private";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// HTTP-level knobs that are not part of the domain.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    /// Value of `Access-Control-Allow-Origin`.
    pub allowed_origin: String,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    allowed_origin: HeaderValue,
}

/// Resolves the bearer token into an [`Identity`] request extension.
async fn authenticate(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(EngineError::Unauthenticated("Access token required".to_string()).into());
    };

    let identity = state.engine.authenticate(bearer.token())?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn require_role(identity: &Identity, role: Role) -> Result<(), ServerError> {
    if identity.role != role {
        return Err(EngineError::Forbidden("Insufficient permissions".to_string()).into());
    }
    Ok(())
}

async fn admin_only(
    Extension(identity): Extension<Identity>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    require_role(&identity, Role::Admin)?;
    Ok(next.run(request).await)
}

async fn teacher_only(
    Extension(identity): Extension<Identity>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    require_role(&identity, Role::Teacher)?;
    Ok(next.run(request).await)
}

/// Answers preflight requests directly and stamps the cross-origin headers
/// on every other response.
async fn cors(State(state): State<ServerState>, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            state.allowed_origin.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
        return response;
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        state.allowed_origin.clone(),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSE_HEADERS),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    response
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Route not found".to_string(),
        }),
    )
}

/// Builds the full application router, `/health` and `/api/*`.
pub fn router(engine: Engine, options: ServerOptions) -> Router {
    let allowed_origin = HeaderValue::from_str(&options.allowed_origin).unwrap_or_else(|_| {
        tracing::warn!(
            "invalid allowed origin {:?}, falling back to *",
            options.allowed_origin
        );
        HeaderValue::from_static("*")
    });
    let state = ServerState {
        engine: Arc::new(engine),
        allowed_origin,
    };

    let admin = Router::new()
        .route("/classes", get(classes::list).post(classes::create))
        .route("/classes/{id}", delete(classes::remove))
        .route("/subjects", get(subjects::list).post(subjects::create))
        .route("/subjects/{id}", delete(subjects::remove))
        .route("/students", get(students::list).post(students::create))
        .route("/students/{id}", delete(students::remove))
        .route("/teachers", get(teachers::list).post(teachers::create))
        .route("/teachers/{id}", delete(teachers::remove))
        .route(
            "/assignments",
            get(assignments::list).post(assignments::create),
        )
        .route("/assignments/{id}", delete(assignments::remove))
        .route("/attendance", get(reports::records))
        .route("/attendance/student-stats", get(reports::student_stats))
        .route_layer(middleware::from_fn(admin_only));

    let teacher = Router::new()
        .route("/assignments", get(attendance::assignments))
        .route("/students", get(attendance::roster))
        .route("/attendance", post(attendance::submit))
        .route("/attendance/history", get(attendance::history))
        .route_layer(middleware::from_fn(teacher_only));

    let users = Router::new()
        .route("/{user_id}", get(user::detail))
        .route("/{user_id}/credentials", put(user::update_credentials));

    let authenticated = Router::new()
        .route("/auth/profile", get(auth::profile))
        .nest("/admin", admin)
        .nest("/teacher", teacher)
        .nest("/users", users)
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .merge(authenticated);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    options: ServerOptions,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine, options)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    options: ServerOptions,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, options, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
