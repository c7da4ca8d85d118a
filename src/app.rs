use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, QueryResponse};
use crate::config::Config;
use crate::controller::ChatController;
use crate::error::ApiError;

pub struct App {
    pub should_quit: bool,
    pub chat: ChatController,
    pub client: ApiClient,

    /// The one request in flight, if any. Polled on every tick.
    pub query_task: Option<JoinHandle<Result<QueryResponse, ApiError>>>,

    // Animation state
    pub animation_frame: u8, // 0-3 for the spinner

    // Log area for mouse hit-testing (updated during render)
    pub log_area: Option<Rect>,
}

impl App {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = ApiClient::new(config.server_url(), config.request_timeout())?;
        tracing::info!(server = client.base_url(), "chat client ready");

        Ok(Self {
            should_quit: false,
            chat: ChatController::new(),
            client,
            query_task: None,
            animation_frame: 0,
            log_area: None,
        })
    }

    /// Submit the current input. The request runs on its own task so the
    /// event loop keeps drawing while it is in flight.
    pub fn submit(&mut self) {
        if self.query_task.is_some() {
            return;
        }
        let Some(request) = self.chat.begin_submit() else {
            return;
        };

        let client = self.client.clone();
        self.query_task = Some(tokio::spawn(async move { client.send(request).await }));
    }

    /// Settle the controller once the in-flight request has finished.
    pub async fn poll_query(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.query_task.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(ApiError::Aborted(join_err.to_string())),
            };
            self.chat.settle(outcome);
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 4;
        } else {
            self.animation_frame = 0;
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(task) = self.query_task.take() {
            task.abort();
        }
    }
}
