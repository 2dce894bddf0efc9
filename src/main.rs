use clap::Parser;
use tracing::info;

use rollcall::{Config, Error, Server, UserStore, logging, users};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();
    logging::init(&config.log_filter, config.log_json)?;

    let server = Server::bind(&config.bind)?;
    info!(addr = %server.addr(), "starting");

    server.serve(users::routes(UserStore::new())).await
}
