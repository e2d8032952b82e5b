//! fabuverse service binary.
//!
//! ```text
//! FABUVERSE_ADDR=127.0.0.1:3345 cargo run
//! curl -i 'http://127.0.0.1:3345/reverse?word=lobster'
//! curl -i -H 'Trace-Id: abc' -H 'Span-Id: caller' 'http://127.0.0.1:3345/reverse?word=lobster'
//! ```

use fabuverse::Server;
use fabuverse::service::{self, Config};
use tracing::{Instrument, info, info_span};

#[tokio::main]
async fn main() -> Result<(), fabuverse::Error> {
    let config = Config::from_env()?;
    service::init_logging(&config);

    let root = info_span!("service", app = "fabuverse", host = %config.host);
    info!(parent: &root, addr = %config.addr, "starting fabuverse service");

    Server::bind(&config.addr)?
        .serve(service::app())
        .instrument(root)
        .await
}
