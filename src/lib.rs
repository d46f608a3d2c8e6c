pub mod commands;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod session;
pub mod state;

/// ASCII art logo for the vigil CLI
pub const LOGO: &str = "\
  ╷  ╷╷┌─┐╷╷
  │┌┘││ ┬││
  └┘ ╵└─┘╵└─┘";
