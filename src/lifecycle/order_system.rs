use crate::config::{Config, ConfigError, OrchestratorConfig};
use crate::directory::HttpDirectory;
use crate::http;
use crate::orchestrator::OrderOrchestrator;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot build directory client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Running services of the order system.
///
/// `OrderSystem` is responsible for:
/// - **Lifecycle Management**: spawning the user and product store actors and every HTTP
///   server, and stopping them again
/// - **Dependency Wiring**: pointing the order service's directory at the user and product
///   services
///
/// Any subset of the three services can run in one process, which is how the per-service
/// subcommands and the all-in-one mode share this code.
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::bind(&config).await?;
/// let order_url = format!("http://{}/order", system.order_addr.unwrap());
/// // ... drive the services over HTTP ...
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    pub user_addr: Option<SocketAddr>,
    pub product_addr: Option<SocketAddr>,
    pub order_addr: Option<SocketAddr>,
    shutdown: watch::Sender<()>,
    servers: Vec<(&'static str, JoinHandle<std::io::Result<()>>)>,
    actors: Vec<JoinHandle<()>>,
}

/// Collects the listeners for the services a process should run.
pub struct OrderSystemBuilder {
    settings: OrchestratorConfig,
    user: Option<TcpListener>,
    product: Option<TcpListener>,
    order: Option<(TcpListener, String, String)>,
}

impl OrderSystemBuilder {
    pub fn user(mut self, listener: TcpListener) -> Self {
        self.user = Some(listener);
        self
    }

    pub fn product(mut self, listener: TcpListener) -> Self {
        self.product = Some(listener);
        self
    }

    /// Runs the order service; it reaches the others at `user_base` and `product_base`.
    pub fn order(
        mut self,
        listener: TcpListener,
        user_base: impl Into<String>,
        product_base: impl Into<String>,
    ) -> Self {
        self.order = Some((listener, user_base.into(), product_base.into()));
        self
    }

    pub fn start(self) -> Result<OrderSystem, LifecycleError> {
        let limit = self.settings.max_concurrent_requests;
        let (shutdown, _) = watch::channel(());
        let mut system = OrderSystem {
            user_addr: None,
            product_addr: None,
            order_addr: None,
            shutdown,
            servers: Vec::new(),
            actors: Vec::new(),
        };

        if let Some(listener) = self.user {
            let (actor, users) = crate::user_actor::new();
            system.actors.push(tokio::spawn(actor.run()));
            system.user_addr = Some(listener.local_addr()?);
            system.spawn_server("user", listener, http::user::router(users), limit);
        }

        if let Some(listener) = self.product {
            let (actor, products) = crate::product_actor::new();
            system.actors.push(tokio::spawn(actor.run()));
            system.product_addr = Some(listener.local_addr()?);
            system.spawn_server("product", listener, http::product::router(products), limit);
        }

        if let Some((listener, user_base, product_base)) = self.order {
            let directory =
                HttpDirectory::new(user_base, product_base, self.settings.request_timeout())?;
            let orchestrator =
                OrderOrchestrator::new(Arc::new(directory), self.settings.retry_policy());
            system.order_addr = Some(listener.local_addr()?);
            system.spawn_server("order", listener, http::order::router(orchestrator), limit);
        }

        Ok(system)
    }
}

impl OrderSystem {
    pub fn builder(settings: OrchestratorConfig) -> OrderSystemBuilder {
        OrderSystemBuilder {
            settings,
            user: None,
            product: None,
            order: None,
        }
    }

    /// Runs all three services on the given listeners, with the order service wired to the
    /// other two.
    pub fn start(
        settings: OrchestratorConfig,
        user: TcpListener,
        product: TcpListener,
        order: TcpListener,
    ) -> Result<Self, LifecycleError> {
        let user_base = format!("http://{}", user.local_addr()?);
        let product_base = format!("http://{}", product.local_addr()?);
        Self::builder(settings)
            .user(user)
            .product(product)
            .order(order, user_base, product_base)
            .start()
    }

    /// Binds every service at its configured address and starts them all.
    pub async fn bind(config: &Config) -> Result<Self, LifecycleError> {
        let user = TcpListener::bind(config.user_service.socket_addr()?).await?;
        let product = TcpListener::bind(config.product_service.socket_addr()?).await?;
        let order = TcpListener::bind(config.order_service.socket_addr()?).await?;
        Self::start(config.orchestrator.clone(), user, product, order)
    }

    fn spawn_server(
        &mut self,
        name: &'static str,
        listener: TcpListener,
        router: axum::Router,
        limit: usize,
    ) {
        let mut stop = self.shutdown.subscribe();
        let signal = async move {
            let _ = stop.changed().await;
        };
        let handle = tokio::spawn(http::serve(name, listener, router, limit, signal));
        self.servers.push((name, handle));
    }

    /// Runs until Ctrl-C, then shuts down.
    pub async fn run_until_ctrl_c(self) -> Result<(), String> {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| format!("cannot listen for Ctrl-C: {e}"))?;
        self.shutdown().await
    }

    /// Gracefully shuts down every service.
    ///
    /// Servers stop accepting and finish in-flight requests. Dropping the routers drops the
    /// last store clients, which closes the actor channels and lets the actors exit.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        let _ = self.shutdown.send(());

        for (name, handle) in self.servers {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(service = name, error = %e, "Server failed");
                    return Err(format!("{name} server failed: {e}"));
                }
                Err(e) => {
                    error!(service = name, "Server task failed: {:?}", e);
                    return Err(format!("{name} server task failed: {e:?}"));
                }
            }
        }

        for handle in self.actors {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {e:?}"));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
