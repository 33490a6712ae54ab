use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;
use tokio::{main, sync::watch};
use tracing::info;

use sms_service::{
    application::{
        handlers::{
            command_router::CommandRouter,
            queue_listener::{QueueListener, wait_for_shutdown},
        },
        services::{
            clock::{SystemClock, TokioDelay},
            event_bus::EventBus,
        },
        usecases::send_sms::SendSmsUseCase,
    },
    config::Config,
    infrastructure::{
        messaging::{
            http_provider::HttpSmsProvider,
            jetstream::{JetstreamQueue, NatsEventBus},
            log_bus::LogEventBus,
        },
        repositories::in_memory::InMemorySentMessageCache,
    },
    presentation::http::endpoints::{health::HealthEndpoints, root::ApiState},
    shutdown::{forward_shutdown, shutdown_signal},
    telemetry::init_tracing,
};

const HTTP_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[main]
async fn main() -> anyhow::Result<()> {
    let config = Config::try_parse()?;
    init_tracing(&config.logging)?;

    let queue = Arc::new(
        JetstreamQueue::connect(&config.queue)
            .await
            .context("failed to connect to NATS")?,
    );

    let event_bus: Arc<dyn EventBus> = match &config.events_subject {
        Some(subject) => {
            info!(%subject, "publishing SmsSent events to NATS");
            Arc::new(NatsEventBus::new(queue.client(), subject.clone()))
        }
        None => {
            info!("EVENTS_SUBJECT not set, SmsSent events go to the log");
            Arc::new(LogEventBus)
        }
    };

    let provider = Arc::new(HttpSmsProvider::new(
        config.provider.clone(),
        Arc::new(TokioDelay),
    )?);

    let send_sms = Arc::new(SendSmsUseCase::new(
        provider,
        event_bus,
        Arc::new(InMemorySentMessageCache::new()),
        Arc::new(SystemClock),
        config.dedup_mode,
    ));
    let router = Arc::new(CommandRouter::new(send_sms));

    let listener = QueueListener::new(queue, router, config.queue.subject.clone());
    let state = Arc::new(ApiState {
        listener_state: listener.state(),
        queue_name: config.queue.subject.clone(),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener_task = listener.spawn(shutdown_rx.clone());

    tokio::spawn(forward_shutdown(shutdown_signal(), shutdown_tx));

    let server_url = format!(
        "{}://{}:{}",
        config.http.scheme, config.http.host, config.http.port
    );
    info!(%server_url, dedup_mode = ?config.dedup_mode, "starting sms service");

    let api_service = OpenApiService::new(HealthEndpoints::new(state), "SMS Service", "0.1.0")
        .server(format!("{}/api", server_url));
    let ui = api_service.swagger_ui();
    let app = Route::new().nest("/api", api_service).nest("/", ui);

    let mut server_shutdown = shutdown_rx;
    Server::new(TcpListener::bind(format!(
        "{}:{}",
        config.http.host, config.http.port
    )))
    .run_with_graceful_shutdown(
        app,
        async move { wait_for_shutdown(&mut server_shutdown).await },
        Some(HTTP_SHUTDOWN_GRACE),
    )
    .await?;

    listener_task.await?;
    info!("sms service stopped");
    Ok(())
}

