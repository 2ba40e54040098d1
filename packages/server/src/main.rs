//! Spider Boxes JSON-RPC server
//!
//! Serves the type catalog, config schemas, instances and field values over
//! newline-delimited JSON-RPC 2.0 on stdin/stdout, backed by in-memory
//! stores. Logs go to stderr so stdout carries responses only.
//!
//! # Usage
//!
//! ```bash
//! echo '{"jsonrpc":"2.0","id":1,"method":"list_types","params":{"namespace":"field"}}' \
//!   | RUST_LOG=spider_boxes_core=debug spider-boxes-rpc
//! ```
//!
//! # Environment
//!
//! - `RUST_LOG` - tracing filter, falls back to `SPIDER_BOXES_LOG`
//! - `SPIDER_BOXES_EVENT_CAPACITY` - hook event channel capacity
//! - `SPIDER_BOXES_SEED_DEFAULTS` - seed built-in type catalogs
//! - `SPIDER_BOXES_STRICT_SETTINGS` - reject undeclared instance settings

use spider_boxes_core::api::{run_rpc_server_with_callback, ResponseCallback};
use spider_boxes_core::{CoreConfig, Namespace, SpiderBoxes};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CoreConfig::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = SpiderBoxes::in_memory(config);
    for namespace in Namespace::ALL {
        tracing::info!(
            namespace = %namespace,
            types = app.registries().get(namespace).len(),
            "type catalog ready"
        );
    }

    let callback: ResponseCallback = Arc::new(|method: &str, result: &serde_json::Value| {
        if method.starts_with("create_") || method.starts_with("delete_") {
            tracing::info!(method, id = %result.get("id").unwrap_or(&serde_json::Value::Null), "catalog changed");
        }
    });

    run_rpc_server_with_callback(app, Some(callback)).await
}
