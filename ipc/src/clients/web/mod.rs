pub mod web_client;
