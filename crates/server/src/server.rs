//! Server bootstrap: bind every endpoint, run them side by side, stop together.
//!
//! A bind failure disables that endpoint only; the others keep serving.

use std::io;
use std::net::SocketAddr;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::app;
use crate::config::ServerConfig;
use crate::deposit::DepositServer;
use crate::services::{build_services, AppServices, PipelineTasks};
use crate::withdrawal::WithdrawalServer;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {endpoint} endpoint on {addr}: {source}")]
    Bind {
        endpoint: &'static str,
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("{endpoint} endpoint failed: {source}")]
    Io {
        endpoint: &'static str,
        #[source]
        source: io::Error,
    },
}

impl ServeError {
    pub(crate) fn bind(endpoint: &'static str, addr: &str, source: io::Error) -> Self {
        Self::Bind {
            endpoint,
            addr: addr.to_string(),
            source,
        }
    }
}

/// Control plane + subscription endpoint.
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
}

impl HttpServer {
    pub async fn bind(addr: &str, services: AppServices) -> Result<Self, ServeError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServeError::bind("http", addr, source))?;
        Ok(Self {
            listener,
            router: app::build_app(services),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServeError> {
        if let Ok(addr) = self.local_addr() {
            tracing::info!(%addr, "http server listening");
        }

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .map_err(|source| ServeError::Io {
                endpoint: "http",
                source,
            })?;

        tracing::info!("http server stopped");
        Ok(())
    }
}

/// Every endpoint sharing one ledger and one broadcast pipeline.
pub struct Server {
    services: AppServices,
    tasks: PipelineTasks,
    http: Option<HttpServer>,
    deposit: Option<DepositServer>,
    withdrawal: Option<WithdrawalServer>,
}

impl Server {
    /// Build the services and bind all three endpoints. Must run inside a
    /// Tokio runtime.
    pub async fn bind(config: &ServerConfig) -> Self {
        let (services, tasks) = build_services(config.heartbeat);

        let http = enabled(HttpServer::bind(&config.http_addr, services.clone()).await);
        let deposit = enabled(DepositServer::bind(&config.deposit_addr, services.clone()).await);
        let withdrawal = enabled(WithdrawalServer::bind(&config.withdraw_addr, services.clone()).await);

        Self {
            services,
            tasks,
            http,
            deposit,
            withdrawal,
        }
    }

    pub fn services(&self) -> &AppServices {
        &self.services
    }

    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn deposit_addr(&self) -> Option<SocketAddr> {
        self.deposit.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn withdraw_addr(&self) -> Option<SocketAddr> {
        self.withdrawal.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn bound_endpoints(&self) -> usize {
        usize::from(self.http.is_some())
            + usize::from(self.deposit.is_some())
            + usize::from(self.withdrawal.is_some())
    }

    /// Serve until `shutdown` fires, then stop the pipeline tasks.
    pub async fn run(self, shutdown: CancellationToken) {
        let Server {
            services: _,
            tasks,
            http,
            deposit,
            withdrawal,
        } = self;

        let http = {
            let shutdown = shutdown.clone();
            async move {
                if let Some(server) = http {
                    if let Err(e) = server.run(shutdown).await {
                        tracing::error!(error = %e, "http endpoint stopped with error");
                    }
                }
            }
        };
        let deposit = {
            let shutdown = shutdown.clone();
            async move {
                if let Some(server) = deposit {
                    server.run(shutdown).await;
                }
            }
        };
        let withdrawal = {
            let shutdown = shutdown.clone();
            async move {
                if let Some(server) = withdrawal {
                    server.run(shutdown).await;
                }
            }
        };

        tokio::join!(http, deposit, withdrawal);
        tasks.abort();
    }
}

fn enabled<T>(bound: Result<T, ServeError>) -> Option<T> {
    match bound {
        Ok(server) => Some(server),
        Err(e) => {
            tracing::error!(error = %e, "endpoint disabled");
            None
        }
    }
}
