//! Runtime services and shared state for ticket-triage.

use std::{sync::Arc, time::Duration};

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        roster::load_roster,
        types::{Res, Void},
    },
    interaction::http::{self, AppState},
    service::{classify::Classifier, embed::Embedder, store::TicketStore},
    triage::{EmbeddingIndex, PriorityClassifier, Triager},
};

/// Runtime service context that can be shared across the application.
///
/// Everything in here is read-only after [`Runtime::new`] except the ticket
/// store. It is designed to be trivially cloneable, allowing it to be passed
/// around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The triage pipeline over the loaded roster.
    pub triager: Triager,
    /// The ticket store instance.
    pub store: TicketStore,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// Loads the roster and embeds it up front; an empty or invalid roster
    /// fails here, before any request is served.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        let roster = load_roster(config.roster_path.as_deref())?;

        // Initialize the inference backends.
        let embedder = Embedder::from_config(&config)?;
        let classifier = Classifier::from_config(&config, &embedder)?;

        info!("Using `{}` embeddings and `{}` classification.", config.embedding_backend, config.classifier_backend);

        // Embed the roster.
        let index = EmbeddingIndex::build(roster, embedder).await?;

        let triager = Triager::new(Arc::new(index), PriorityClassifier::new(classifier));

        Ok(Self::with_parts(config, triager, TicketStore::memory()))
    }

    /// Assemble a runtime from prebuilt parts.
    pub fn with_parts(config: Config, triager: Triager, store: TicketStore) -> Self {
        Self { config, triager, store }
    }

    /// State handed to the HTTP handlers.
    pub fn app_state(&self) -> AppState {
        AppState {
            triager: self.triager.clone(),
            store: self.store.clone(),
            triage_timeout: Duration::from_secs(self.config.triage_timeout_secs),
        }
    }

    /// Serve HTTP until Ctrl-C.
    pub async fn start(&self) -> Void {
        let listener = tokio::net::TcpListener::bind(&self.config.bind_address).await?;
        info!("Listening on {} ...", listener.local_addr()?);

        axum::serve(listener, http::router(self.app_state()))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutting down ...");
            })
            .await?;

        Ok(())
    }
}
