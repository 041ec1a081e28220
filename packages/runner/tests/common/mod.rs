#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use scriptrun_runner::config::Config;
use scriptrun_runner::credentials::StaticCredentialResolver;
use scriptrun_runner::event::{LifecycleRequest, LifecycleResponse, RequestType, ResourceProperties};
use scriptrun_runner::executor::{
    ExecuteError, ExecutionTarget, StatementExecutor, StatementOutcome, StatementSession,
};
use scriptrun_runner::handler::LifecycleHandler;
use scriptrun_runner::notifier::{NotifyError, ResponseNotifier};
use scriptrun_runner::state::AppState;

pub const SECRET_REF: &str = "arn:secret:admin";
pub const CONNECTION_URL: &str = "fake://admin@cluster/app";

/// Records every statement; fails the first statement containing `fail_on`.
#[derive(Default)]
pub struct RecordingExecutor {
    pub statements: Arc<Mutex<Vec<String>>>,
    pub targets: Arc<Mutex<Vec<(String, Option<String>, Option<String>)>>>,
    pub fail_on: Option<String>,
}

impl RecordingExecutor {
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::default()
        }
    }

    pub async fn executed(&self) -> Vec<String> {
        self.statements.lock().await.clone()
    }
}

struct RecordingSession {
    statements: Arc<Mutex<Vec<String>>>,
    fail_on: Option<String>,
}

#[async_trait]
impl StatementExecutor for RecordingExecutor {
    async fn open(
        &self,
        target: &ExecutionTarget,
    ) -> Result<Box<dyn StatementSession>, ExecuteError> {
        self.targets.lock().await.push((
            target.credential.connection_url.clone(),
            target.database.clone(),
            target.resource.clone(),
        ));
        Ok(Box::new(RecordingSession {
            statements: Arc::clone(&self.statements),
            fail_on: self.fail_on.clone(),
        }))
    }
}

#[async_trait]
impl StatementSession for RecordingSession {
    async fn execute(&mut self, sql: &str) -> Result<StatementOutcome, ExecuteError> {
        if let Some(needle) = &self.fail_on {
            if sql.contains(needle.as_str()) {
                return Err(ExecuteError::Rejected(format!("syntax error near {needle}")));
            }
        }
        self.statements.lock().await.push(sql.to_string());
        Ok(StatementOutcome {
            rows_affected: 1,
            elapsed_ms: 0,
        })
    }

    async fn close(self: Box<Self>) -> Result<(), ExecuteError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<(String, LifecycleResponse)>>>,
    pub reject: bool,
}

impl RecordingNotifier {
    pub async fn responses(&self) -> Vec<(String, LifecycleResponse)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl ResponseNotifier for RecordingNotifier {
    async fn notify(&self, url: &str, response: &LifecycleResponse) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .await
            .push((url.to_string(), response.clone()));
        if self.reject {
            return Err(NotifyError::HttpStatus {
                status: reqwest::StatusCode::FORBIDDEN,
                body: "signature expired".to_string(),
            });
        }
        Ok(())
    }
}

pub fn resolver() -> Arc<StaticCredentialResolver> {
    Arc::new(StaticCredentialResolver::new(None).with_entry(SECRET_REF, CONNECTION_URL))
}

pub fn handler(
    executor: Arc<RecordingExecutor>,
    notifier: Arc<RecordingNotifier>,
) -> LifecycleHandler {
    LifecycleHandler::new(&Config::default(), resolver(), executor, notifier)
}

pub fn create_test_app(
    executor: Arc<RecordingExecutor>,
    notifier: Arc<RecordingNotifier>,
) -> axum::Router {
    scriptrun_runner::create_app(AppState::new(handler(executor, notifier)))
}

pub fn request(request_type: RequestType, props: ResourceProperties) -> LifecycleRequest {
    let request_id = format!("req-{}", request_type.as_str().to_lowercase());
    LifecycleRequest {
        request_type,
        response_url: "https://callback.test/response".to_string(),
        stack_id: "stack-1".to_string(),
        request_id,
        logical_resource_id: "Schema".to_string(),
        physical_resource_id: None,
        resource_type: Some("Custom::SqlScript".to_string()),
        resource_properties: serde_json::to_value(props).unwrap(),
    }
}

/// Raw request document, for envelopes the typed builder cannot express.
pub fn raw_request(request_type: &str, properties: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "RequestType": request_type,
        "ResponseURL": "https://callback.test/response",
        "StackId": "stack-1",
        "RequestId": format!("req-{}", request_type.to_lowercase()),
        "LogicalResourceId": "Schema",
        "PhysicalResourceId": "existing-id",
        "ResourceProperties": properties,
    })
}

pub fn props(script: &str) -> ResourceProperties {
    ResourceProperties {
        create_sql_document: Some(script.to_string()),
        secret_arn: Some(SECRET_REF.to_string()),
        ..ResourceProperties::default()
    }
}
