use std::sync::Arc;

use serde_json::{json, Value};

use perfcmp_core::{ExportConfig, ReportExporter};

use crate::protocol::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, ServerCapabilities, ServerInfo,
    ToolsCapability, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, PROTOCOL_VERSION,
};
use crate::tools::{self, ToolState};

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct McpServer {
    state: ToolState,
}

impl McpServer {
    /// Server whose publisher is configured from the process environment.
    ///
    /// A missing or invalid configuration only disables `publish_comparison`.
    pub fn from_env() -> Self {
        let exporter = ExportConfig::from_env()
            .and_then(|config| ReportExporter::from_config(&config))
            .map(Arc::new)
            .map_err(|e| {
                tracing::warn!(error = %e, "publishing disabled");
                e.to_string()
            });
        Self {
            state: ToolState { exporter },
        }
    }

    #[cfg(test)]
    pub fn with_exporter(exporter: Arc<ReportExporter>) -> Self {
        Self {
            state: ToolState {
                exporter: Ok(exporter),
            },
        }
    }

    /// Dispatch one request. Notifications (no `id`) get no response.
    pub async fn handle_request(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = match req.id {
            Some(id) => id,
            None => {
                tracing::debug!(method = %req.method, "notification received");
                return None;
            }
        };

        let result = match req.method.as_str() {
            "initialize" => self.handle_initialize(),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(req.params).await,
            other => Err((METHOD_NOT_FOUND, format!("Method not found: {other}"))),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err((code, msg)) => JsonRpcResponse::error(id, code, msg),
        })
    }

    // -----------------------------------------------------------------------
    // Method handlers
    // -----------------------------------------------------------------------

    fn handle_initialize(&self) -> Result<Value, (i32, String)> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {},
            },
            server_info: ServerInfo {
                name: "perfcmp-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, e.to_string()))
    }

    fn handle_tools_list(&self) -> Result<Value, (i32, String)> {
        Ok(json!({ "tools": tools::all_tool_definitions() }))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, (i32, String)> {
        let params =
            params.ok_or_else(|| (INVALID_PARAMS, "Missing params for tools/call".to_string()))?;

        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| (INVALID_PARAMS, "Missing 'name' in tools/call params".to_string()))?;

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        tracing::info!(tool = name, "calling tool");
        let result = tools::dispatch_tool(name, arguments, &self.state).await;
        if result.is_error() {
            tracing::warn!(tool = name, error = result.text(), "tool failed");
        }

        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, e.to_string()))
    }
}
