//! HTTP front end of the shift scheduler.
//!
//! `GET /` answers a health check and `POST /api/schedule` runs one solve on
//! the blocking pool. Every response carries security headers and an
//! `x-request-id`.

pub mod error;
pub mod response;
pub mod routes;

use core::convert::Infallible;
use core::future::Future;
use core::sync::atomic::{AtomicU64, Ordering};
use std::error::Error as StdError;
use std::sync::Arc;

use futures_util::pin_mut;
use http::{header, Request};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use shift_schedule_config::Config;
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::watch;
use tracing::{debug_span, error, info, info_span, warn, Instrument};

use crate::error::AppError;
use crate::response::{decorate, JsonResponse};

pub struct AppState {
    pub config: Config,
    requests: AtomicU64,
}

impl AppState {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            requests: AtomicU64::new(0),
        }
    }

    fn next_request_id(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Routes one request and decorates the response. Never fails: errors are
/// turned into JSON bodies with a matching status.
pub async fn handle<B>(state: Arc<AppState>, request: Request<B>) -> JsonResponse
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let request_id = state.next_request_id();
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|origin| origin.to_str().ok())
        .map(str::to_owned);
    let span = info_span!(
        "request",
        id = request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    async move {
        let mut response = routes::route(&state, request).await;
        decorate(
            &mut response,
            request_id,
            origin.as_deref(),
            &state.config.cors,
        );
        info!(status = response.status().as_u16(), "handled request");
        response
    }
    .instrument(span)
    .await
}

/// Binds the listener and returns the accept loop. The loop ends after
/// ctrl-c or SIGTERM once every open connection has finished.
#[allow(clippy::cognitive_complexity)]
pub async fn run_server(config: Config) -> Result<impl Future<Output = Result<(), AppError>>, AppError> {
    let address = config.server.socket_addr();
    let listener = TcpListener::bind(address).await?;
    let state = Arc::new(AppState::new(config));

    // tell the connections to shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let shutdown_tx = Arc::new(shutdown_tx);

    // wait for the connections to finish shutdown
    let (closed_tx, closed_rx) = watch::channel(());

    info!(%address, "started up server...");

    Ok(async move {
        let shutdown = shutdown_signal();
        pin_mut!(shutdown);

        #[allow(clippy::redundant_pub_crate)]
        loop {
            select! {
                accept = listener.accept() => {
                    let (socket, remote_addr) = match accept {
                        Ok(accepted) => accepted,
                        Err(error) => {
                            warn!(%error, "failed to accept connection");
                            continue;
                        }
                    };

                    let state = Arc::clone(&state);
                    let shutdown_tx = Arc::clone(&shutdown_tx);
                    let closed_rx = closed_rx.clone();

                    let fut = async move {
                        let socket = TokioIo::new(socket);
                        let service = hyper::service::service_fn(move |request: Request<Incoming>| {
                            let state = Arc::clone(&state);
                            async move { Ok::<_, Infallible>(handle(state, request).await) }
                        });

                        let connection = http1::Builder::new().serve_connection(socket, service);
                        pin_mut!(connection);

                        let mut draining = false;
                        loop {
                            select! {
                                connection_result = connection.as_mut() => {
                                    if let Err(err) = connection_result {
                                        let err = AppError::from(err);
                                        error!("failed to serve connection: {err:#}");
                                    }
                                    break; // (gracefully) finished connection
                                }
                                () = shutdown_tx.closed(), if !draining => {
                                    draining = true;
                                    connection.as_mut().graceful_shutdown();
                                }
                            }
                        }

                        drop(closed_rx);
                    };
                    tokio::spawn(fut.instrument(debug_span!("connection", %remote_addr)));
                }
                () = &mut shutdown => {
                    warn!("shutting down, waiting for open connections");
                    break;
                }
            }
        }

        drop(listener);
        drop(shutdown_rx);
        drop(closed_rx);
        closed_tx.closed().await;
        info!("server stopped");
        Ok(())
    })
}

#[allow(clippy::redundant_pub_crate)]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!(%error, "failed to install ctrl-c handler");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                error!(%error, "failed to install SIGTERM handler");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
