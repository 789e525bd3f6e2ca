pub mod http_server;
pub mod server_packet;
