//! Client side of the request contract: a typed RPC client and the board
//! state a UI renders from.

mod board;
pub mod demo;
mod rpc;

pub use board::{Board, BoardSource, BoardStats, TaskFilter, DEFAULT_CATEGORY_COLOR};
pub use rpc::{ClientError, RpcClient};
