//! JSON-RPC stdio Server
//!
//! Newline-delimited JSON-RPC 2.0 over any async reader/writer pair; the
//! binary wires it to stdin/stdout. Runs until the reader hits EOF.

use crate::api::handlers::{config, instances, types, values};
use crate::api::types::{RpcError, RpcRequest, RpcResponse};
use crate::services::SpiderBoxes;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, error, info, instrument, warn};

/// Callback type for handling successful responses
///
/// Receives (method_name, result_value) after a successful call; hosts use
/// it to forward change notifications.
pub type ResponseCallback = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Serve requests from stdin, writing responses to stdout
#[instrument(skip(app))]
pub async fn run_rpc_server(app: SpiderBoxes) -> anyhow::Result<()> {
    run_rpc_server_with_callback(app, None).await
}

/// Same as `run_rpc_server`, invoking `callback` after each success
#[instrument(skip(app, callback))]
pub async fn run_rpc_server_with_callback(
    app: SpiderBoxes,
    callback: Option<ResponseCallback>,
) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    serve(&app, reader, writer, callback).await
}

/// Process one request per line until `reader` is exhausted
pub async fn serve<R, W>(
    app: &SpiderBoxes,
    reader: R,
    mut writer: W,
    callback: Option<ResponseCallback>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("🔌 RPC server started");
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("📥 RPC request: {}", line);

        let request = match decode_request(&line) {
            Ok(request) => request,
            Err(response) => {
                write_response(&mut writer, &response).await?;
                continue;
            }
        };

        let request_id = request.id;
        let method = request.method.clone();
        let response = handle_request(app, request).await;

        if let (Some(callback), Some(result)) = (&callback, &response.result) {
            callback(&method, result);
        }

        debug!("📤 RPC response for method '{}' (id={})", method, request_id);
        write_response(&mut writer, &response).await?;
    }

    info!("🔌 RPC server stopped (input closed)");
    Ok(())
}

/// Parse one line; failures become ready-to-send error responses
fn decode_request(line: &str) -> Result<RpcRequest, RpcResponse> {
    let raw: Value = serde_json::from_str(line).map_err(|e| {
        warn!("❌ Failed to parse JSON-RPC request: {}", e);
        // Unknown ID since parsing failed
        RpcResponse::error(0, RpcError::parse_error(format!("Invalid JSON: {}", e)))
    })?;

    let id = raw.get("id").and_then(Value::as_u64).unwrap_or(0);
    let request: RpcRequest = serde_json::from_value(raw).map_err(|e| {
        warn!("❌ Malformed JSON-RPC request: {}", e);
        RpcResponse::error(id, RpcError::invalid_request(format!("Invalid request: {}", e)))
    })?;

    if request.jsonrpc != "2.0" {
        return Err(RpcResponse::error(
            id,
            RpcError::invalid_request(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
        ));
    }
    Ok(request)
}

/// Dispatch a request to its handler and wrap the outcome
#[instrument(skip(app, request), fields(method = %request.method, id = %request.id))]
pub async fn handle_request(app: &SpiderBoxes, request: RpcRequest) -> RpcResponse {
    let params = request.params;
    let result = match request.method.as_str() {
        "list_types" => types::handle_list_types(app, params).await,
        "get_type" => types::handle_get_type(app, params).await,
        "create_type" => types::handle_create_type(app, params).await,
        "update_type" => types::handle_update_type(app, params).await,
        "delete_type" => types::handle_delete_type(app, params).await,
        "get_type_config" => config::handle_get_type_config(app, params).await,
        "list_instances" => instances::handle_list_instances(app, params).await,
        "get_instance" => instances::handle_get_instance(app, params).await,
        "create_instance" => instances::handle_create_instance(app, params).await,
        "update_instance" => instances::handle_update_instance(app, params).await,
        "delete_instance" => instances::handle_delete_instance(app, params).await,
        "add_child" => instances::handle_add_child(app, params).await,
        "remove_child" => instances::handle_remove_child(app, params).await,
        "get_field_value" => values::handle_get_field_value(app, params).await,
        "set_field_value" => values::handle_set_field_value(app, params).await,
        "delete_field_value" => values::handle_delete_field_value(app, params).await,
        _ => {
            warn!("⚠️  Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    match result {
        Ok(result) => {
            debug!("✅ RPC request {} succeeded", request.id);
            RpcResponse::success(request.id, result)
        }
        Err(err) => {
            error!(
                "❌ RPC request {} failed: {} (code: {})",
                request.id, err.message, err.code
            );
            RpcResponse::error(request.id, err)
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &RpcResponse) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
