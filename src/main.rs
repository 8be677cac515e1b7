use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use pixrelay::application::processor::EventProcessor;
use pixrelay::application::routing::TopicRouter;
use pixrelay::application::workflow::TransactionWorkflow;
use pixrelay::config::Cli;
use pixrelay::domain::ports::{
    EventPublisherBox, EventSource, PixKeyRepositoryBox, TransactionRepositoryBox,
};
use pixrelay::infrastructure::in_memory::{InMemoryPixKeyStore, InMemoryTransactionStore};
#[cfg(feature = "kafka")]
use pixrelay::infrastructure::kafka::{KafkaEventSource, KafkaPublisher};
#[cfg(feature = "storage-rocksdb")]
use pixrelay::infrastructure::rocksdb::RocksDBStore;
use pixrelay::interfaces::csv::pix_key_reader::{PixKeyReader, load_directory};
use pixrelay::interfaces::replay::{ConsolePublisher, ReplaySource};
use std::fs::File;
use std::io::BufReader;
use tracing::info;
#[cfg(not(feature = "storage-rocksdb"))]
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    info!(
        transaction_topic = %cli.transaction_topic,
        confirmation_topic = %cli.confirmation_topic,
        delivery_timeout_ms = cli.delivery_timeout_ms,
        "Starting pix relay"
    );

    let (pix_keys, transactions) = open_stores(&cli)?;

    if let Some(path) = &cli.pix_keys {
        let file = File::open(path).into_diagnostic()?;
        load_directory(PixKeyReader::new(file), pix_keys.as_ref())
            .await
            .into_diagnostic()?;
    }

    let topics = cli.topic_router();
    let (mut source, publisher) = connect(&cli, &topics)?;

    let workflow = TransactionWorkflow::new(pix_keys, transactions);
    let processor = EventProcessor::new(workflow, publisher, topics)
        .with_delivery_timeout(cli.delivery_timeout());

    processor.run(source.as_mut()).await.into_diagnostic()
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout is reserved for replayed output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_stores(cli: &Cli) -> Result<(PixKeyRepositoryBox, TransactionRepositoryBox)> {
    #[cfg(feature = "storage-rocksdb")]
    {
        if let Some(db_path) = &cli.db_path {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            info!(db_path = %db_path.display(), "Using RocksDB storage");
            return Ok((Box::new(store.clone()), Box::new(store)));
        }
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    {
        if let Some(db_path) = &cli.db_path {
            warn!(
                db_path = %db_path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
        }
    }

    Ok((
        Box::new(InMemoryPixKeyStore::new()),
        Box::new(InMemoryTransactionStore::new()),
    ))
}

fn connect(cli: &Cli, topics: &TopicRouter) -> Result<(Box<dyn EventSource>, EventPublisherBox)> {
    if let Some(input) = &cli.input {
        let file = File::open(input).into_diagnostic()?;
        info!(input = %input.display(), "Replaying recorded events");
        return Ok((
            Box::new(ReplaySource::new(BufReader::new(file))),
            Box::new(ConsolePublisher),
        ));
    }

    connect_kafka(cli, topics)
}

#[cfg(feature = "kafka")]
fn connect_kafka(
    cli: &Cli,
    topics: &TopicRouter,
) -> Result<(Box<dyn EventSource>, EventPublisherBox)> {
    let servers = cli
        .bootstrap_servers
        .as_deref()
        .ok_or_else(|| miette!("Kafka bootstrap servers are not configured (set KAFKA_BOOTSTRAP_SERVERS or --bootstrap-servers)"))?;

    let source = KafkaEventSource::new(servers, &cli.consumer_group_id, &topics.subscriptions())
        .into_diagnostic()?;
    let publisher = KafkaPublisher::new(servers, cli.delivery_timeout()).into_diagnostic()?;

    Ok((Box::new(source), Box::new(publisher)))
}

#[cfg(not(feature = "kafka"))]
fn connect_kafka(
    _cli: &Cli,
    _topics: &TopicRouter,
) -> Result<(Box<dyn EventSource>, EventPublisherBox)> {
    Err(miette!(
        "No event source: pass --input to replay recorded events, or build with the 'kafka' feature"
    ))
}
