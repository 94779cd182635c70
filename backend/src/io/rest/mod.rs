//! # REST API
//!
//! axum handlers, one module per resource, plus the HTTP mapping of
//! domain errors.

pub mod ai_apis;
pub mod bill_apis;
pub mod error;
pub mod insight_apis;
pub mod reminder_apis;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::domain::prompts::PromptConfig;
    use crate::domain::test_utils::{RecordingMailer, StubCompletion};
    use crate::storage::test_utils::TestEnvironment;
    use crate::storage::JsonBillRepository;
    use crate::AppState;

    /// App state over a temporary JSON store with stubbed collaborators
    pub struct TestApp {
        pub state: AppState,
        pub storage: Arc<JsonBillRepository>,
        pub stub: StubCompletion,
        pub mailer: RecordingMailer,
        _env: TestEnvironment,
    }

    impl TestApp {
        pub fn new(reply: &str) -> Self {
            let env = TestEnvironment::new().unwrap();
            let storage = Arc::new(env.json_repository());
            let stub = StubCompletion::replying(reply);
            let mailer = RecordingMailer::default();

            let state = AppState::new(
                storage.clone(),
                Arc::new(stub.clone()),
                Arc::new(mailer.clone()),
                PromptConfig::default(),
                false,
            );

            Self {
                state,
                storage,
                stub,
                mailer,
                _env: env,
            }
        }
    }
}
