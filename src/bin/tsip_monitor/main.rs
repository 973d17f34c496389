use structopt::StructOpt;
use tracing::{error, info};

use tsip::{Result, Scheduler, Session};

mod options;
mod trace;

#[tokio::main]
async fn main() -> Result<()> {
    let opts = options::Options::from_args();
    trace::init(opts.pretty);

    let config = opts.config();
    let session = Session::connect(&config).await?;
    info!(addr = %config.addr, "connected");

    let _schedule = Scheduler::from_config(&config)?.spawn(session.commands())?;

    let result = session
        .run(|packet| {
            let line = packet.to_string();
            if !line.is_empty() {
                println!("{}", line);
            }
        })
        .await;

    if let Err(e) = &result {
        error!(error = %e, "connection failed");
    }
    result
}
