//! JSON-RPC Interface
//!
//! Exposes the type catalog, generated config schemas, instances and field
//! values as JSON-RPC 2.0 methods. The server is transport-agnostic; the
//! `spider-boxes-rpc` binary serves it over stdio.
//!
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": 1,
//!   "method": "get_type_config",
//!   "params": { "namespace": "field", "name": "range" }
//! }
//! ```
//!
//! Type and instance methods take a `namespace` of `field`, `component` or
//! `section` (plural and `-types` spellings work too); `add_child` and
//! `remove_child` default to `component`. Field value methods address a
//! value by `object_id`, `object_type`, `meta_key` and `context`.

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{
    handle_request, run_rpc_server, run_rpc_server_with_callback, serve, ResponseCallback,
};
pub use types::{RpcError, RpcRequest, RpcResponse};
