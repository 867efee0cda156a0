mod protocol;
mod server;
mod tools;

use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR, PROTOCOL_VERSION};
use crate::server::McpServer;

#[tokio::main]
async fn main() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!(protocol = PROTOCOL_VERSION, "perfcmp-mcp starting");

    let server = McpServer::from_env();
    if let Err(e) = serve(&server, BufReader::new(io::stdin()), io::stdout()).await {
        tracing::error!(error = %e, "stdio loop failed");
    }
}

/// Read newline-delimited JSON-RPC requests until EOF, answering each on
/// its own line.
async fn serve<R, W>(server: &McpServer, mut reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            tracing::info!("stdin closed, shutting down");
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => server.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                serde_json::Value::Null,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            )),
        };
        let Some(response) = response else {
            continue;
        };

        let out = match serde_json::to_string(&response) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response");
                continue;
            }
        };
        writer.write_all(out.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
}
