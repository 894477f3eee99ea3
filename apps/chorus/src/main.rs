mod config;
mod server;

use chorus_logger::init_logger;

#[tokio::main]
async fn main() {
    init_logger();
    server::start_server(config::Config::new()).await;
}
