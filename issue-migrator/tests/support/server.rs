//! Local HTTP server standing in for Jira or GitLab.

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A server on an ephemeral local port, shut down when dropped.
pub struct StubServer {
    /// Base URL ending with `/`.
    pub url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubServer {
    /// Binds a port, then serves the router built from the server's base URL.
    pub async fn start(app: impl FnOnce(&str) -> Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let address = listener.local_addr().expect("stub listener address");
        let url = format!("http://{address}/");
        let router = app(&url);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("run stub server");
        });

        Self {
            url,
            shutdown: Some(shutdown_tx),
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
