//! LexDesk Gateway HTTP API Server
//!
//! `POST /api/assistant` streams a dispatch run as Server-Sent Events;
//! `GET /api/tools` and `GET /api/health` describe the running service.

pub mod assistant_api;
pub mod health_api;
pub mod inbound;
pub mod server;
pub mod sse;

pub use server::{GatewayState, build_router, start_server};
