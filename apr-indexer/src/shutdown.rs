//! Serve the read API until a stop signal, then shut down in order
//!
//! The scheduler is stopped first so no new cycle starts while HTTP
//! connections drain. Both steps are bounded by the same deadline.

use axum::Router;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::core::IndexerResult;

/// How the scheduler task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerStop {
    Stopped,
    Failed(String),
    /// Still running at the deadline and aborted
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub scheduler: SchedulerStop,
    /// False when open connections outlived the deadline
    pub drained: bool,
}

/// Flip the stop flag and wait up to `deadline` for the scheduler task
pub async fn stop_scheduler(
    stop: &watch::Sender<bool>,
    mut handle: JoinHandle<()>,
    deadline: Duration,
) -> SchedulerStop {
    let _ = stop.send(true);
    match tokio::time::timeout(deadline, &mut handle).await {
        Ok(Ok(())) => {
            info!("Scheduler stopped");
            SchedulerStop::Stopped
        }
        Ok(Err(e)) => {
            error!("Scheduler task error: {}", e);
            SchedulerStop::Failed(e.to_string())
        }
        Err(_) => {
            warn!("Scheduler did not stop in time, aborting");
            handle.abort();
            SchedulerStop::Aborted
        }
    }
}

/// Serve `app` on `listener` until `signal` resolves, then stop the
/// scheduler and drain connections, each within `deadline`
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    stop: watch::Sender<bool>,
    scheduler: JoinHandle<()>,
    signal: F,
    deadline: Duration,
) -> IndexerResult<ShutdownReport>
where
    F: Future<Output = ()> + Send,
{
    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = drain_rx.await;
    });
    let mut server = tokio::spawn(async move { serve.await });

    tokio::select! {
        _ = signal => {}
        result = &mut server => {
            // The server ended before any stop signal
            let _ = stop_scheduler(&stop, scheduler, deadline).await;
            return match result {
                Ok(Ok(())) => Err(anyhow::anyhow!("server stopped unexpectedly").into()),
                Ok(Err(e)) => Err(anyhow::Error::from(e).context("server error").into()),
                Err(e) => Err(anyhow::Error::from(e).context("server task failed").into()),
            };
        }
    }

    info!("Shutting down");
    let scheduler = stop_scheduler(&stop, scheduler, deadline).await;

    info!("Draining HTTP connections");
    let _ = drain_tx.send(());
    let drained = match tokio::time::timeout(deadline, &mut server).await {
        Ok(Ok(Ok(()))) => true,
        Ok(Ok(Err(e))) => {
            error!("Server error during drain: {}", e);
            true
        }
        Ok(Err(e)) => {
            error!("Server task error: {}", e);
            true
        }
        Err(_) => {
            warn!("Connections still open at the deadline, closing");
            server.abort();
            false
        }
    };

    Ok(ShutdownReport { scheduler, drained })
}
