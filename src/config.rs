use crate::application::routing::TopicRouter;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Relays instant-payment transaction events between banks", long_about = None)]
pub struct Cli {
    /// Kafka bootstrap servers. Required unless events are replayed with --input.
    #[arg(long, env = "KAFKA_BOOTSTRAP_SERVERS")]
    pub bootstrap_servers: Option<String>,

    #[arg(long, env = "KAFKA_CONSUMER_GROUP_ID", default_value = "pixrelay")]
    pub consumer_group_id: String,

    /// Topic carrying requests for new transactions.
    #[arg(long, env = "KAFKA_TRANSACTION_TOPIC", default_value = "transactions")]
    pub transaction_topic: String,

    /// Topic carrying confirmed/completed status updates.
    #[arg(
        long,
        env = "KAFKA_TRANSACTION_CONFIRMATION_TOPIC",
        default_value = "transaction_confirmation"
    )]
    pub confirmation_topic: String,

    /// How long to wait for a delivery acknowledgment before giving up on an event.
    #[arg(long, env = "DELIVERY_TIMEOUT_MS", default_value_t = 5000)]
    pub delivery_timeout_ms: u64,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// CSV directory of banks, accounts and pix keys to load at startup.
    #[arg(long)]
    pub pix_keys: Option<PathBuf>,

    /// Replay recorded events from a JSON-lines file instead of consuming from Kafka.
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn topic_router(&self) -> TopicRouter {
        TopicRouter::new(&self.transaction_topic, &self.confirmation_topic)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::routing::InboundTopic;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pixrelay", "--input", "events.jsonl"]).unwrap();

        assert_eq!(cli.consumer_group_id, "pixrelay");
        assert_eq!(cli.delivery_timeout(), Duration::from_secs(5));
        assert_eq!(cli.input, Some(PathBuf::from("events.jsonl")));
        assert_eq!(cli.log_level, "info");

        let router = cli.topic_router();
        assert_eq!(router.classify("transactions"), InboundTopic::Creation);
        assert_eq!(
            router.classify("transaction_confirmation"),
            InboundTopic::Confirmation
        );
    }

    #[test]
    fn test_topic_overrides() {
        let cli = Cli::try_parse_from([
            "pixrelay",
            "--transaction-topic",
            "tx.new",
            "--confirmation-topic",
            "tx.status",
            "--delivery-timeout-ms",
            "250",
        ])
        .unwrap();

        let router = cli.topic_router();
        assert_eq!(router.classify("tx.new"), InboundTopic::Creation);
        assert_eq!(router.classify("tx.status"), InboundTopic::Confirmation);
        assert_eq!(router.classify("transactions"), InboundTopic::Unknown);
        assert_eq!(cli.delivery_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["pixrelay", "--delivery-timeout-ms", "soon"]).is_err());
    }
}
