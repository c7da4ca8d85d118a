use crate::api::{QueryBackend, QueryRequest, QueryResponse};
use crate::error::ApiError;
use crate::message::{MessageLog, Role};

/// Shown for any transport or decode failure; details only go to the log file.
pub const FALLBACK_REPLY: &str =
    "Sorry, there was an error processing your request. Please try again.";

pub const SEND_LABEL: &str = "Send";
pub const PROCESSING_LABEL: &str = "Processing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyState {
    #[default]
    Idle,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Log,
}

/// What the input, submit button and spinner should look like. Always
/// derived from [`BusyState`], never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub input_enabled: bool,
    pub submit_enabled: bool,
    pub spinner_visible: bool,
    pub submit_label: &'static str,
}

impl From<BusyState> for Controls {
    fn from(state: BusyState) -> Self {
        match state {
            BusyState::Idle => Controls {
                input_enabled: true,
                submit_enabled: true,
                spinner_visible: false,
                submit_label: SEND_LABEL,
            },
            BusyState::Busy => Controls {
                input_enabled: false,
                submit_enabled: false,
                spinner_visible: true,
                submit_label: PROCESSING_LABEL,
            },
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line-or-more text field with a character cursor.
#[derive(Debug, Default)]
pub struct InputField {
    value: String,
    cursor: usize,
}

impl InputField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }
}

/// Owns the chat form: the input field, the message log and the busy flag.
///
/// A submit cycle is [`begin_submit`](Self::begin_submit) followed by exactly
/// one [`settle`](Self::settle). The TUI runs the request on a spawned task
/// between the two; [`submit`](Self::submit) does the whole cycle inline.
#[derive(Debug)]
pub struct ChatController {
    input: InputField,
    log: MessageLog,
    state: BusyState,
    focus: Focus,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatController {
    pub fn new() -> Self {
        Self {
            input: InputField::default(),
            log: MessageLog::new(),
            state: BusyState::Idle,
            // Focus starts in the input field
            focus: Focus::Input,
        }
    }

    pub fn input(&self) -> &InputField {
        &self.input
    }

    /// Edits are ignored while a request is in flight, like a disabled input.
    pub fn input_mut(&mut self) -> Option<&mut InputField> {
        if self.controls().input_enabled {
            Some(&mut self.input)
        } else {
            None
        }
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    pub fn state(&self) -> BusyState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == BusyState::Busy
    }

    pub fn controls(&self) -> Controls {
        self.state.into()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    /// Start a submit cycle with the current input.
    ///
    /// Returns `None` without touching anything when the trimmed input is
    /// empty or a request is already in flight. Otherwise the controller is
    /// busy, the user message is in the log and the input is cleared.
    pub fn begin_submit(&mut self) -> Option<QueryRequest> {
        if self.is_busy() {
            tracing::debug!("submit ignored, request already in flight");
            return None;
        }

        let query = self.input.value().trim().to_string();
        if query.is_empty() {
            return None;
        }

        self.state = BusyState::Busy;
        self.log.append(query.as_str(), Role::User);
        self.input.clear();

        tracing::info!(query = %query, "submitting query");
        Some(QueryRequest { query })
    }

    /// Finish the cycle: append the bot reply for `outcome`, then return to
    /// idle and put focus back on the input whatever the outcome was.
    pub fn settle(&mut self, outcome: Result<QueryResponse, ApiError>) {
        let reply = match outcome {
            Ok(QueryResponse {
                success: true,
                response: Some(response),
                ..
            }) => response,
            Ok(QueryResponse { success: true, .. }) => {
                tracing::error!("query service reported success without a response");
                FALLBACK_REPLY.to_string()
            }
            Ok(QueryResponse { error, .. }) => {
                let error = error.unwrap_or_default();
                tracing::info!(error = %error, "query service reported failure");
                format!("Error: {}", error)
            }
            Err(err) => {
                tracing::error!(error = %err, "query failed");
                FALLBACK_REPLY.to_string()
            }
        };
        self.log.append(reply, Role::Bot);

        self.state = BusyState::Idle;
        self.focus = Focus::Input;
    }

    /// Run a full submit cycle against `backend`. Returns whether a request
    /// was sent.
    pub async fn submit<B: QueryBackend>(&mut self, backend: &B) -> bool {
        let Some(request) = self.begin_submit() else {
            return false;
        };
        let outcome = backend.query(&request).await;
        self.settle(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Canned {
        Reply(QueryResponse),
        Fail,
    }

    struct FakeBackend {
        canned: Canned,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(canned: Canned) -> Self {
            Self {
                canned,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl QueryBackend for FakeBackend {
        fn query(
            &self,
            _request: &QueryRequest,
        ) -> impl Future<Output = Result<QueryResponse, ApiError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = match &self.canned {
                Canned::Reply(response) => Ok(response.clone()),
                Canned::Fail => Err(ApiError::Aborted("connection refused".to_string())),
            };
            async move { outcome }
        }
    }

    fn typed(text: &str) -> ChatController {
        let mut controller = ChatController::new();
        controller.input_mut().unwrap().set(text);
        controller
    }

    fn assert_idle(controller: &ChatController) {
        assert_eq!(controller.state(), BusyState::Idle);
        assert_eq!(
            controller.controls(),
            Controls {
                input_enabled: true,
                submit_enabled: true,
                spinner_visible: false,
                submit_label: "Send",
            }
        );
        assert_eq!(controller.focus(), Focus::Input);
    }

    #[test]
    fn starts_idle_with_input_focused() {
        assert_idle(&ChatController::new());
    }

    #[test]
    fn begin_submit_adds_user_message_before_reply() {
        let mut controller = typed("  I'm going to go to Bangalore  ");
        let request = controller.begin_submit().unwrap();

        assert_eq!(request.query, "I'm going to go to Bangalore");
        assert_eq!(controller.log().len(), 1);
        let entry = controller.log().last().unwrap();
        assert_eq!(entry.role(), Role::User);
        assert_eq!(entry.message().text, "I'm going to go to Bangalore");
        assert_eq!(controller.input().value(), "");
        assert_eq!(controller.input().cursor(), 0);
    }

    #[test]
    fn busy_state_disables_controls() {
        let mut controller = typed("Paris");
        controller.begin_submit();
        assert!(controller.is_busy());
        assert_eq!(
            controller.controls(),
            Controls {
                input_enabled: false,
                submit_enabled: false,
                spinner_visible: true,
                submit_label: "Processing...",
            }
        );
        assert!(controller.input_mut().is_none());
    }

    #[test]
    fn second_submit_while_busy_is_ignored() {
        let mut controller = typed("Paris");
        controller.begin_submit().unwrap();
        controller.input.set("London");
        assert!(controller.begin_submit().is_none());
        assert_eq!(controller.log().len(), 1);
    }

    #[tokio::test]
    async fn blank_input_sends_nothing() {
        let backend = FakeBackend::new(Canned::Reply(QueryResponse::ok("unused")));
        for blank in ["", "   ", "\n\t "] {
            let mut controller = typed(blank);
            assert!(!controller.submit(&backend).await);
            assert!(controller.log().is_empty());
            assert_idle(&controller);
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn success_appends_formatted_bot_reply() {
        let backend = FakeBackend::new(Canned::Reply(QueryResponse::ok("Paris\nFrance")));
        let mut controller = typed("Paris");
        assert!(controller.submit(&backend).await);

        assert_eq!(backend.calls(), 1);
        assert_eq!(controller.log().count_role(Role::User), 1);
        let reply = controller.log().last().unwrap();
        assert_eq!(reply.role(), Role::Bot);
        assert_eq!(
            reply.markup(),
            "<strong>Paris</strong><br><strong>France</strong>"
        );
        assert_idle(&controller);
    }

    #[tokio::test]
    async fn application_failure_is_prefixed() {
        let backend = FakeBackend::new(Canned::Reply(QueryResponse::failed("not found")));
        let mut controller = typed("Atlantis");
        controller.submit(&backend).await;

        let reply = controller.log().last().unwrap();
        assert_eq!(reply.role(), Role::Bot);
        assert_eq!(reply.message().text, "Error: not found");
        assert_idle(&controller);
    }

    #[tokio::test]
    async fn transport_failure_appends_one_fallback_and_recovers() {
        let backend = FakeBackend::new(Canned::Fail);
        let mut controller = typed("Paris");
        controller.set_focus(Focus::Log);
        controller.submit(&backend).await;

        assert_eq!(controller.log().count_role(Role::Bot), 1);
        assert_eq!(controller.log().last().unwrap().message().text, FALLBACK_REPLY);
        assert_idle(&controller);
        assert!(controller.input_mut().is_some());
    }

    #[tokio::test]
    async fn success_without_response_is_treated_as_failure() {
        let missing = QueryResponse {
            success: true,
            response: None,
            error: None,
        };
        let backend = FakeBackend::new(Canned::Reply(missing));
        let mut controller = typed("Paris");
        controller.submit(&backend).await;

        assert_eq!(controller.log().count_role(Role::Bot), 1);
        assert_eq!(controller.log().last().unwrap().message().text, FALLBACK_REPLY);
        assert_idle(&controller);
    }

    #[test]
    fn input_editing_is_utf8_safe() {
        let mut input = InputField::default();
        for c in "Zürich".chars() {
            input.insert(c);
        }
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.value(), "Zürch");
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "ürch");
        input.move_end();
        input.move_right();
        assert_eq!(input.cursor(), 4);
    }
}
