use crate::{
    api::routes::{get_dynamic_config, get_pricing_periods, get_quote, health},
    config::{Settings, StoreSettings},
    domain::PricingService,
    infra::store::{ConfigStore, SanityClient},
};

// Mock implementations only available with e2e-testing feature or debug builds
#[cfg(any(feature = "e2e-testing", debug_assertions))]
use crate::infra::store_mock::InMemoryStore;
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::{connect_info::IntoMakeServiceWithConnectInfo, ConnectInfo, Request},
    http::{Extensions, HeaderValue},
    middleware::{self, AddExtension, Next},
    response::IntoResponse,
    routing::get,
    serve::Serve,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::{error, info, warn};
use reqwest_middleware::{
    reqwest::{self, Client},
    ClientBuilder, ClientWithMiddleware, Middleware,
};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio::select;
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub struct Application {
    server: Serve<
        TcpListener,
        IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
        AddExtension<Router, ConnectInfo<SocketAddr>>,
    >,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            config.api_settings.domain, config.api_settings.port
        );
        let listener = SocketAddr::from_str(&address)?;
        let app_state = build_app(config.clone())?;
        let server = build_server(listener, app_state, config.api_settings.origins).await?;
        Ok(Self { server })
    }

    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        info!("Starting server...");
        match self.server.with_graceful_shutdown(shutdown_signal()).await {
            Ok(_) => {
                info!("Shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!("Server shutdown error: {}", e);
                Err(anyhow!("Error during server shutdown: {}", e))
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pricing: Arc<PricingService>,
}

impl AppState {
    pub fn new(pricing: PricingService) -> Self {
        Self {
            pricing: Arc::new(pricing),
        }
    }
}

pub fn build_app(config: Settings) -> Result<AppState, anyhow::Error> {
    let store = build_store(&config.store_settings)?;
    let pricing = PricingService::new(
        store,
        config.pricing_settings.currencies.clone(),
        time::Duration::hours(config.pricing_settings.transition_threshold_hours),
    );
    info!(
        "Pricing configured for currencies: {}",
        config
            .pricing_settings
            .currencies
            .iter()
            .map(|currency| currency.code())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(AppState::new(pricing))
}

fn build_store(settings: &StoreSettings) -> Result<Arc<dyn ConfigStore>, anyhow::Error> {
    if let Some(store) = mock_store(settings)? {
        return Ok(store);
    }

    let client = build_reqwest_client(settings)?;
    let store = SanityClient::new(client, settings)?;
    info!("Document store configured @: {}", store.query_url);
    Ok(Arc::new(store))
}

#[cfg(any(feature = "e2e-testing", debug_assertions))]
fn mock_store(settings: &StoreSettings) -> Result<Option<Arc<dyn ConfigStore>>, anyhow::Error> {
    if !settings.mock_enabled {
        return Ok(None);
    }
    info!("Mock document store configured");
    Ok(Some(Arc::new(InMemoryStore::demo(
        time::OffsetDateTime::now_utc(),
    ))))
}

#[cfg(not(any(feature = "e2e-testing", debug_assertions)))]
fn mock_store(settings: &StoreSettings) -> Result<Option<Arc<dyn ConfigStore>>, anyhow::Error> {
    if settings.mock_enabled {
        return Err(anyhow!(
            "Mock document store requires e2e-testing feature or debug build"
        ));
    }
    Ok(None)
}

pub async fn build_server(
    socket_addr: SocketAddr,
    app_state: AppState,
    origins: Vec<String>,
) -> Result<
    Serve<
        TcpListener,
        IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
        AddExtension<Router, ConnectInfo<SocketAddr>>,
    >,
    anyhow::Error,
> {
    let listener = TcpListener::bind(socket_addr).await?;

    info!("Setting up service");
    let app = app(app_state, origins);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    info!(
        "Service running @: http://{}:{}",
        socket_addr.ip(),
        socket_addr.port()
    );
    Ok(server)
}

pub fn app(app_state: AppState, origins: Vec<String>) -> Router {
    let origins: Vec<HeaderValue> = origins
        .into_iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(AllowOrigin::list(origins));

    let registration_endpoints = Router::new()
        .route("/dynamic-config", get(get_dynamic_config))
        .route("/pricing-periods", get(get_pricing_periods))
        .route("/quote", get(get_quote));

    Router::new()
        .route("/api/v1/health_check", get(health))
        .nest("/api/registration", registration_endpoints)
        .layer(middleware::from_fn(log_request))
        .with_state(Arc::new(app_state))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default()
        .to_string();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, {} code: {}, time: {}", path, response.status().as_str(), response_time);

    response
}

pub fn build_reqwest_client(settings: &StoreSettings) -> Result<ClientWithMiddleware, anyhow::Error> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);
    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .with(LoggingMiddleware)
        .build())
}

struct LoggingMiddleware;

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let method = req.method().clone();
        // The query string holds the full GROQ query, too noisy for info logs
        let mut url = req.url().clone();
        url.set_query(None);

        info!("Making {} request to: {}", method, url);

        let result = next.run(req, extensions).await;

        match &result {
            Ok(response) => {
                info!("{} {} -> Status: {}", method, url, response.status());
            }
            Err(error) => {
                warn!("{} {} -> Error: {:?}", method, url, error);
            }
        }

        result
    }
}

async fn shutdown_signal() {
    let (mut sigint, mut sigterm) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to install signal handlers, falling back to ctrl-c: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for ctrl-c: {}", e);
            }
            return;
        }
    };

    select! {
        _ = sigint.recv() => info!("Received SIGINT signal"),
        _ = sigterm.recv() => info!("Received SIGTERM signal"),
    }
}
