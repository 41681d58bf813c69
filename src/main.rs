//! Demo binary for fanout
//!
//! Loads configuration, attaches two subscribers and walks through a pair of
//! broadcasts, logging what each subscriber receives.

use fanout::Broker;
use fanout::config::load_config;
use fanout::utils::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {e}");
            return;
        }
    };
    logging::init(&config.log.level);

    if let Err(e) = run(&config.broker).await {
        error!("Demo failed: {e}");
    }
}

async fn run(settings: &fanout::config::BrokerSettings) -> fanout::Result<()> {
    let broker: Broker<String> = Broker::with_settings(settings);

    let reader = broker.attach()?;
    let fan = broker.attach()?;
    broker.subscribe(&reader, ["news"]);
    broker.subscribe(&fan, ["news", "sports"]);

    broker.broadcast("hello".to_string(), ["news"]);
    broker.broadcast("kick-off".to_string(), ["sports"]);

    for (name, subscriber, expected) in [("reader", &reader, 1), ("fan", &fan, 2)] {
        for _ in 0..expected {
            if let Some(message) = subscriber.recv().await {
                info!(
                    subscriber = name,
                    topic = message.topic(),
                    payload = %message.payload(),
                    "received"
                );
            }
        }
    }

    info!(topics = ?broker.topics(), stats = ?broker.stats(), "done");

    broker.detach(&reader);
    broker.detach(&fan);
    Ok(())
}
