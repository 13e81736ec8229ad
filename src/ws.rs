pub mod handler;
pub mod message_handler;
pub mod routes;
pub mod utils;

pub use routes::create_ws_routes;
