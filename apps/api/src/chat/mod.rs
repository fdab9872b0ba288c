// Chat endpoints: single request/response over HTTP and a persistent WebSocket session.

pub mod handlers;
pub mod session;
