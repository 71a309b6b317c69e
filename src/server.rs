//! Reusable users-service runtime.
//!
//! [`ServerHandle`] wires config, store, service and router together, binds
//! the listener and owns the graceful shutdown of the HTTP server.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::UserService;
use crate::config::AppConfig;
use crate::infrastructure::InMemoryUserRepository;
use crate::interfaces::http::{create_api_router, RouterOptions};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the users service.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Install the Prometheus recorder and mount `GET /metrics` (default: true).
    pub enable_metrics: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            enable_metrics: true,
        }
    }
}

impl From<AppConfig> for ServerOptions {
    fn from(config: AppConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running users service.
///
/// ```rust,no_run
/// use users_service::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Service backing the HTTP API.
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address actually bound (resolves port 0).
    pub local_addr: SocketAddr,

    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Build the store and service, bind the listener and start serving.
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;

        info!("Starting users service...");
        app_cfg.validate()?;

        if app_cfg.uses_default_secret() {
            warn!("⚠️  JWT secret is the built-in default; set JWT_SECRET or security.jwt_secret");
        }

        let prometheus = if opts.enable_metrics {
            prometheus_handle()
        } else {
            None
        };

        // ── Store & service ────────────────────────────────────
        let repo = Arc::new(InMemoryUserRepository::new());
        let jwt_config = app_cfg.jwt_config();
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );
        let user_service = Arc::new(
            UserService::new(repo, jwt_config).with_hash_cost(app_cfg.security.bcrypt_cost),
        );

        let router = create_api_router(
            Arc::clone(&user_service),
            RouterOptions {
                expose_password_hashes: app_cfg.security.expose_password_hashes,
                prometheus,
            },
        );

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);

        // ── HTTP server ────────────────────────────────────────
        let listener = tokio::net::TcpListener::bind(app_cfg.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            user_service,
            config: app_cfg,
            local_addr,
            shutdown,
            api_task,
        })
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown without waiting for it.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop, bounded by `server.shutdown_timeout`.
    pub async fn wait(self) {
        info!("⏳ Waiting for in-flight requests to complete...");

        let api_task = self.api_task;
        let abort = api_task.abort_handle();
        let drained = self
            .shutdown
            .drain(async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task failed: {}", e),
                }
            })
            .await;

        if !drained {
            abort.abort();
        }

        info!("👋 Users service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down users service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Process-wide Prometheus recorder, installed on first use.
///
/// The global recorder can be installed only once, so a restarted server
/// in the same process reuses the first handle.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Metrics disabled, recorder install failed: {}", e);
                None
            }
        })
        .clone()
}

/// Initialize tracing from the application config.
///
/// Call once at process startup, before [`ServerHandle::start`]. `RUST_LOG`
/// takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_options() -> ServerOptions {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.shutdown_timeout = 5;
        config.security.bcrypt_cost = 4;
        ServerOptions {
            config,
            enable_metrics: false,
        }
    }

    async fn raw_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path, addr
        );
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn starts_on_ephemeral_port_and_serves_health() {
        let handle = ServerHandle::start(test_options()).await.unwrap();
        assert_ne!(handle.port(), 0);
        assert!(handle.is_running());

        let response = raw_get(handle.local_addr, "/health").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains("\"healthy\""));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn out_of_range_config_is_refused() {
        let mut opts = test_options();
        opts.config.security.jwt_expiration_hours = i64::MAX;
        assert!(ServerHandle::start(opts).await.is_err());

        let mut opts = test_options();
        opts.config.security.bcrypt_cost = 40;
        assert!(ServerHandle::start(opts).await.is_err());
    }

    #[tokio::test]
    async fn shutdown_stops_accepting_connections() {
        let handle = ServerHandle::start(test_options()).await.unwrap();
        let addr = handle.local_addr;
        let signal = handle.shutdown_signal();

        handle.shutdown().await;

        assert!(signal.is_triggered());
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn service_is_shared_with_the_router() {
        let handle = ServerHandle::start(test_options()).await.unwrap();
        handle
            .user_service
            .register(crate::domain::CreateUserDto {
                name: "A".into(),
                email: "a@x.com".into(),
                password: "p".into(),
                is_admin: false,
            })
            .await
            .unwrap();

        let response = raw_get(handle.local_addr, "/health").await;
        assert!(response.contains("\"users\":1"), "{response}");

        handle.shutdown().await;
    }
}
