use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    extract::State,
    extract::connect_info::ConnectInfo,
    http::Method,
    http::Request,
    http::header::{CONTENT_TYPE, HeaderName, HeaderValue},
    middleware,
    middleware::Next,
    response::Response,
    routing::{get, post},
};
use clap::Parser;
use dotenvy::dotenv;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware,
    state::keyed::DashMapStateStore,
};
use hr_common::config::EngineConfig;
use hr_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use hr_common::matching::RetrievalEngine;
use hr_common::store::JsonFileSource;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

pub mod error;
pub mod handlers;

use error::ApiError;
use handlers::{admin, chat, employees, health};

const SHUTDOWN_DRAIN_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Parser)]
#[command(name = "hr-api", about = "HTTP API for natural-language staffing queries")]
struct Cli {
    /// Employee directory JSON (`{"employees": [...]}`)
    #[arg(long, env = "HR_DATA_PATH", default_value = "data/employees.json")]
    data_path: PathBuf,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "HR_CORS_ORIGINS", default_value = "http://localhost:3000")]
    cors_origins: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

type IpRateLimiter = RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock, NoOpMiddleware>;

#[derive(Clone)]
pub struct RateLimits {
    global: Arc<IpRateLimiter>,
    admin: Arc<IpRateLimiter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub global_per_sec: u64,
    pub global_burst: u32,
    pub admin_per_sec: u64,
    pub admin_burst: u32,
}

impl RateLimitConfig {
    fn parse_env<T: std::str::FromStr + PartialOrd + Default>(name: &str) -> Option<T> {
        env::var(name)
            .ok()
            .and_then(|value| value.trim().parse::<T>().ok())
            .filter(|value| *value > T::default())
    }

    fn from_env() -> Self {
        Self {
            global_per_sec: Self::parse_env("HR_RATE_LIMIT_GLOBAL_PER_SEC").unwrap_or(20),
            global_burst: Self::parse_env("HR_RATE_LIMIT_GLOBAL_BURST").unwrap_or(40),
            admin_per_sec: Self::parse_env("HR_RATE_LIMIT_ADMIN_PER_SEC").unwrap_or(1),
            admin_burst: Self::parse_env("HR_RATE_LIMIT_ADMIN_BURST").unwrap_or(2),
        }
    }
}

impl AppConfig {
    fn from_cli(cli: Cli) -> Result<Self, ApiError> {
        let cors_origins = cli
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(ApiError::BadRequest(
                "HR_CORS_ORIGINS must list explicit origins".into(),
            ));
        }

        Ok(Self {
            data_path: cli.data_path,
            port: cli.port,
            cors_origins,
        })
    }

    pub fn for_tests() -> Self {
        Self {
            data_path: PathBuf::from("data/employees.json"),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".into()],
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RetrievalEngine>,
    pub config: AppConfig,
    pub(crate) rate_limits: RateLimits,
    pub readiness: Arc<AtomicBool>,
}

pub type SharedState = Arc<AppState>;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn build_ip_limiter(per_second: u64, burst_size: u32) -> Arc<IpRateLimiter> {
    let nanos_per_token = (1_000_000_000u64 / per_second.max(1)).max(1);
    let burst = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::with_period(Duration::from_nanos(nanos_per_token))
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
        .allow_burst(burst);

    Arc::new(RateLimiter::keyed(quota))
}

pub fn default_rate_limits() -> RateLimits {
    let cfg = RateLimitConfig::from_env();
    RateLimits {
        global: build_ip_limiter(cfg.global_per_sec, cfg.global_burst),
        admin: build_ip_limiter(cfg.admin_per_sec, cfg.admin_burst),
    }
}

fn request_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

fn enforce_rate_limit(limiter: &IpRateLimiter, ip: Option<IpAddr>) -> Result<(), ApiError> {
    if let Some(client_ip) = ip {
        if limiter.check_key(&client_ip).is_err() {
            return Err(ApiError::TooManyRequests("rate limit exceeded".into()));
        }
    }

    Ok(())
}

async fn global_rate_limit(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    enforce_rate_limit(&state.rate_limits.global, request_ip(&req))?;
    Ok(next.run(req).await)
}

async fn admin_rate_limit(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    enforce_rate_limit(&state.rate_limits.admin, request_ip(&req))?;
    Ok(next.run(req).await)
}

async fn attach_request_id_context(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    Ok(error::with_request_id(request_id, next.run(req)).await)
}

pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_header = request_id_header.clone();

    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(&trace_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
            status = tracing::field::Empty,
        )
    });

    let api_routes = Router::new()
        .route("/chat", post(chat::chat))
        .route("/retrieve", post(chat::retrieve))
        .route("/query/interpret", post(chat::interpret))
        .route("/employees", get(employees::list))
        .route("/employees/search", get(employees::search))
        .route("/employees/stats", get(employees::stats))
        .route("/employees/:id", get(employees::get_employee))
        .route(
            "/admin/reload",
            post(admin::reload).route_layer(middleware::from_fn_with_state(
                state.clone(),
                admin_rate_limit,
            )),
        );

    Router::new()
        .route("/health", get(health::readyz))
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            global_rate_limit,
        ))
        .layer(middleware::from_fn(attach_request_id_context))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(
            request_id_header,
            MakeRequestUuid,
        ))
        .layer(cors)
        .with_state(state)
}

fn state_for(engine: RetrievalEngine) -> SharedState {
    Arc::new(AppState {
        engine: Arc::new(engine),
        config: AppConfig::for_tests(),
        rate_limits: default_rate_limits(),
        readiness: Arc::new(AtomicBool::new(true)),
    })
}

fn test_engine(employees: Vec<hr_common::Employee>) -> RetrievalEngine {
    let config = EngineConfig::default();
    RetrievalEngine::new(
        Arc::new(hr_common::store::InMemorySource::new(employees)),
        Arc::new(hr_common::embedding::HashEmbedder::new(config.embedding.dimension)),
        Arc::new(hr_common::generation::TemplateGenerator),
        &config,
    )
}

/// Small fixed directory used by router tests.
pub fn sample_employees() -> Vec<hr_common::Employee> {
    use hr_common::{Availability, Employee};

    let employee = |id: i64,
                    name: &str,
                    role: &str,
                    department: &str,
                    skills: &[&str],
                    years: f64,
                    availability: Availability| Employee {
        id,
        name: name.into(),
        role: role.into(),
        department: department.into(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        experience_years: years,
        projects: vec![format!("{name}'s flagship project")],
        availability,
    };

    vec![
        employee(
            1,
            "Alice Johnson",
            "Full Stack Developer",
            "Engineering",
            &["Python", "React", "AWS", "Docker", "PostgreSQL"],
            5.0,
            Availability::Available,
        ),
        employee(
            2,
            "Bob Smith",
            "Backend Developer",
            "Engineering",
            &["Java"],
            2.0,
            Availability::Busy,
        ),
        employee(
            3,
            "Carol Lee",
            "ML Engineer",
            "Data Science",
            &["Python", "TensorFlow", "AWS"],
            4.0,
            Availability::Available,
        ),
        employee(
            4,
            "Dan Brown",
            "Product Designer",
            "Design",
            &["Figma", "UI/UX"],
            6.0,
            Availability::Unavailable,
        ),
    ]
}

/// State with [`sample_employees`] already loaded.
pub fn test_state() -> SharedState {
    let engine = test_engine(sample_employees());
    let embedder = engine.embedder().clone();
    match hr_common::store::RecordStore::build(sample_employees(), embedder.as_ref()) {
        Ok(store) => {
            engine.store().install(store);
        }
        Err(err) => error!(error = %err, "sample directory failed to build"),
    }
    state_for(engine)
}

/// State whose record store has never been loaded.
pub fn unloaded_test_state() -> SharedState {
    state_for(test_engine(sample_employees()))
}


/// Engine and shared state for `config`, with the record store not yet loaded.
/// Collaborator construction performs no network I/O.
pub fn build_state(config: AppConfig, engine_config: &EngineConfig) -> Result<SharedState, ApiError> {
    let source = Arc::new(JsonFileSource::new(config.data_path.clone()));
    let engine = RetrievalEngine::from_config(engine_config, source)
        .map_err(|err| ApiError::Internal(format!("failed to configure engine: {err}")))?;

    Ok(Arc::new(AppState {
        engine: Arc::new(engine),
        config,
        rate_limits: default_rate_limits(),
        readiness: Arc::new(AtomicBool::new(true)),
    }))
}

pub async fn run() -> Result<(), ApiError> {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"));

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli)?;
    let engine_config = EngineConfig::from_env();

    let state = build_state(config.clone(), &engine_config)?;

    // Serve even if the first load fails; queries answer 503 until a reload succeeds.
    match state.engine.reload().await {
        Ok(summary) => info!(
            snapshot_id = %summary.snapshot_id,
            employees = summary.employees,
            "initial record store loaded"
        ),
        Err(err) => error!(
            error = %err,
            source = %state.engine.source_description(),
            "initial record store load failed"
        ),
    }

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let app = create_router(state.clone());

    info!(
        %addr,
        data_path = %config.data_path.display(),
        embedder = state.engine.embedder().name(),
        generator = state.engine.generator_name(),
        strip_policy = %engine_config.strip_policy,
        "hr-api listening"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let service = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(())
}

async fn shutdown_signal(state: SharedState) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.readiness.store(false, Ordering::SeqCst);

    // Let load balancers observe /readyz as not ready before axum stops accepting.
    tokio::time::sleep(SHUTDOWN_DRAIN_GRACE).await;
}
