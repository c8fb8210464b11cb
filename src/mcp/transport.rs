//! Newline-delimited JSON-RPC over stdin/stdout

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::server::McpServer;

/// Serve requests from stdin until it closes.
pub async fn serve_stdio(server: Arc<McpServer>) -> Result<()> {
    serve(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Read one request per line, handle each on its own task, and write
/// responses one per line through a single writer.
///
/// Returns once input hits EOF and every in-flight request has answered.
pub async fn serve<R, W>(server: Arc<McpServer>, input: R, output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(64);
    let writer = tokio::spawn(write_responses(rx, output));

    let mut lines = input.lines();
    let mut in_flight = JoinSet::new();

    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let server = server.clone();
        let tx = tx.clone();
        in_flight.spawn(async move {
            if let Some(response) = server.handle_request(&line).await {
                // Receiver only goes away if stdout is gone
                let _ = tx.send(response).await;
            }
        });

        // Reap finished handlers so the set does not grow unbounded
        while in_flight.try_join_next().is_some() {}
    }

    tracing::info!("stdin closed, draining in-flight requests");
    while let Some(res) = in_flight.join_next().await {
        if let Err(e) = res {
            tracing::error!("Request handler panicked: {}", e);
        }
    }

    drop(tx);
    writer.await.context("Response writer task failed")??;
    Ok(())
}

async fn write_responses<W>(mut rx: mpsc::Receiver<String>, mut output: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        output
            .write_all(response.as_bytes())
            .await
            .context("Failed to write response")?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}
