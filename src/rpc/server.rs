//! Stdio MCP server — handshake and per-request dispatch loop.
//!
//! Single connection, strictly sequential: read a line, decode, execute,
//! write the response, repeat. The only suspension points are the blocking
//! read and handler completion. Clean EOF is normal termination; a broken
//! frame or a failed handshake tears the connection down.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio_util::sync::CancellationToken;

use crate::rpc::codec::{read_message, write_message};
use crate::rpc::router::route_request;
use crate::rpc::wire::{
    self, decode_incoming, Implementation, Incoming, InitializeParams, InitializeResult,
    RequestId, Response, RpcError, ServerCapabilities,
};
use crate::tools::ToolRegistry;
use crate::types::{Config, Error, Result};

/// Session lifecycle: handshake first, then request traffic until EOF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    AwaitingInitialize,
    AwaitingInitialized,
    Ready,
}

/// MCP server over a byte-stream pair.
#[derive(Debug)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    config: Config,
    cancel: CancellationToken,
}

impl McpServer {
    pub fn new(registry: Arc<ToolRegistry>, config: Config) -> Self {
        Self {
            registry,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token observed by the read loop; cancelling it ends the session
    /// after any in-flight handler completes.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Run the session until EOF, cancellation, or a fatal error.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut state = SessionState::AwaitingInitialize;
        tracing::info!(server = %self.config.server.name, "Starting handshake with client");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Server shutting down");
                    break;
                }
                read = read_message(&mut reader, self.config.rpc.max_line_bytes) => {
                    let Some(line) = read? else {
                        tracing::info!("Client disconnected, run loop finished");
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }

                    let incoming = match decode_incoming(&line) {
                        Ok(incoming) => incoming,
                        Err(violation) => match violation.id {
                            // Recoverable: the request can be answered.
                            Some(id) => {
                                tracing::warn!(error = %violation.message, "Malformed request");
                                let error = RpcError {
                                    code: wire::INVALID_REQUEST,
                                    message: violation.message,
                                };
                                self.write_response(&mut writer, Response::error(id, error))
                                    .await?;
                                continue;
                            }
                            // Framing is broken: drop the connection.
                            None => return Err(Error::protocol(violation.message)),
                        },
                    };

                    match incoming {
                        Incoming::Request { id, method, params } => {
                            if state == SessionState::AwaitingInitialize {
                                self.handle_initialize(&mut writer, id, &method, params).await?;
                                state = SessionState::AwaitingInitialized;
                                continue;
                            }
                            let response =
                                match route_request(&self.registry, &method, params).await {
                                    Ok(result) => Response::result(id, result),
                                    Err(e) => {
                                        tracing::warn!(method = %method, error = %e, "Request failed");
                                        Response::error(id, e.to_rpc_error())
                                    }
                                };
                            self.write_response(&mut writer, response).await?;
                        }
                        Incoming::Notification { method, .. } => {
                            if method == wire::METHOD_INITIALIZED
                                && state == SessionState::AwaitingInitialized
                            {
                                tracing::debug!("Client confirmed initialization");
                                state = SessionState::Ready;
                            } else {
                                tracing::debug!(method = %method, "Ignoring notification");
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Perform the one-time initialize exchange. Any failure here is fatal:
    /// the error is reported to the client when possible, then the
    /// connection closes without fallback negotiation.
    async fn handle_initialize<W>(
        &self,
        writer: &mut W,
        id: RequestId,
        method: &str,
        params: Value,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if method != wire::METHOD_INITIALIZE {
            let err = Error::handshake(format!(
                "Expected initialize request, got '{method}'"
            ));
            return Err(self.fail_handshake(writer, id, err).await);
        }

        let params: InitializeParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                let err = Error::handshake(format!("Invalid initialize request: {e}"));
                return Err(self.fail_handshake(writer, id, err).await);
            }
        };

        if !wire::SUPPORTED_PROTOCOL_VERSIONS.contains(&params.protocol_version.as_str()) {
            let err = Error::handshake(format!(
                "Unsupported protocol version: {}",
                params.protocol_version
            ));
            return Err(self.fail_handshake(writer, id, err).await);
        }

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = %client.version, "Client connected");
        }

        let result = InitializeResult {
            protocol_version: params.protocol_version,
            capabilities: ServerCapabilities::default(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
            },
        };
        self.write_response(writer, Response::result(id, serde_json::to_value(result)?))
            .await
    }

    async fn fail_handshake<W>(&self, writer: &mut W, id: RequestId, err: Error) -> Error
    where
        W: AsyncWrite + Unpin,
    {
        tracing::error!(error = %err, "Handshake failed, closing connection");
        if let Err(write_err) = self
            .write_response(writer, Response::error(id, err.to_rpc_error()))
            .await
        {
            tracing::debug!(error = %write_err, "Could not report handshake failure");
        }
        err
    }

    async fn write_response<W>(&self, writer: &mut W, response: Response) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let value = serde_json::to_value(&response)?;
        write_message(writer, &value).await?;
        Ok(())
    }
}
