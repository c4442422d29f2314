use aws_config::{BehaviorVersion, Region};
use std::{net::SocketAddr, sync::Arc};
use tokio::{signal, sync::watch};
use tracing::{error, info};

use blog_search_pipeline::{
    app::{create_router, AppState},
    config::Config,
    consumer::QueueConsumer,
    handlers::IndexingHandler,
    middleware::init_tracing,
    queue::SqsQueue,
    search_index::{OpenSearchClient, RequestSigner},
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Resolve region and the default credential chain once for the process
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.search.region.clone()))
        .load()
        .await;

    let credentials = match aws_config.credentials_provider() {
        Some(provider) => provider,
        None => {
            error!("No AWS credentials provider available");
            std::process::exit(1);
        }
    };

    let queue = Arc::new(SqsQueue::new(
        aws_sdk_sqs::Client::new(&aws_config),
        config.queue.queue_url.clone(),
    ));

    let signer = RequestSigner::new(credentials, config.search.region.clone());
    let search_index = match OpenSearchClient::new(&config.search, signer, config.request_timeout) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create search index client: {}", e);
            std::process::exit(1);
        }
    };

    // Start the queue consumer feeding the indexing handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = if config.consumer.enabled {
        let consumer = QueueConsumer::new(
            queue.clone(),
            IndexingHandler::new(search_index.clone()),
            config.consumer.clone(),
        );
        Some(tokio::spawn(consumer.run(shutdown_rx)))
    } else {
        info!("Queue consumer disabled");
        None
    };

    // Create the Axum router with all endpoints
    let app = create_router(AppState::new(queue, search_index), config.request_timeout);

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server with graceful shutdown handling
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    // Let the consumer finish any batch in flight
    let _ = shutdown_tx.send(true);
    if let Some(handle) = consumer {
        if let Err(e) = handle.await {
            error!("Queue consumer task failed: {}", e);
        }
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
/// Listens for SIGTERM and SIGINT signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
