//! Lifecycle request handling.
//!
//! One request runs as a strictly sequential chain: plan the script, split
//! it, resolve credentials, execute each statement in order stopping at the
//! first failure, then report the outcome to the callback URL exactly once.

use std::sync::Arc;

use scriptrun_splitter::{SplitError, Splitter};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::credentials::{CredentialError, CredentialResolver};
use crate::event::{
    LifecycleRequest, LifecycleResponse, RequestType, ResourceProperties, ResponseStatus,
};
use crate::executor::{ExecuteError, ExecutionTarget, StatementExecutor, StatementOutcome};
use crate::notifier::{NotifyError, ResponseNotifier};
use crate::script::{assemble_create_script, physical_resource_id};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid resource properties: {0}")]
    Properties(#[from] serde_json::Error),
    #[error("invalid delimiter {0:?}: delimiters cannot contain whitespace")]
    InvalidDelimiter(String),
    #[error("script rejected: {0}")]
    Split(#[from] SplitError),
    #[error("credential lookup failed: {0}")]
    Credential(#[from] CredentialError),
    #[error("cannot open execution session: {0}")]
    Session(#[source] ExecuteError),
    #[error("statement {index} failed: {source}")]
    Execute {
        index: usize,
        statement: String,
        #[source]
        source: ExecuteError,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedStatement {
    pub sql: String,
    pub outcome: StatementOutcome,
}

/// Everything a caller may want to know about one handled request.
#[derive(Debug)]
pub struct Handled {
    pub response: LifecycleResponse,
    pub executed: Vec<ExecutedStatement>,
    pub notified: Result<(), NotifyError>,
}

/// A script selected for execution by the lifecycle policy
struct Plan {
    script: String,
    delimiter: String,
    database: Option<String>,
}

#[derive(Clone)]
pub struct LifecycleHandler {
    resolver: Arc<dyn CredentialResolver>,
    executor: Arc<dyn StatementExecutor>,
    notifier: Arc<dyn ResponseNotifier>,
    splitter: Splitter,
    default_delimiter: String,
    log_stream: String,
}

impl LifecycleHandler {
    pub fn new(
        config: &Config,
        resolver: Arc<dyn CredentialResolver>,
        executor: Arc<dyn StatementExecutor>,
        notifier: Arc<dyn ResponseNotifier>,
    ) -> Self {
        Self {
            resolver,
            executor,
            notifier,
            splitter: Splitter::new(config.split_options),
            default_delimiter: config.default_delimiter.clone(),
            log_stream: config.log_stream.clone(),
        }
    }

    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    pub fn default_delimiter(&self) -> &str {
        &self.default_delimiter
    }

    pub async fn handle(&self, request: &LifecycleRequest) -> Handled {
        // Redelivered requests share a RequestId; the invocation id tells them apart.
        let span = info_span!(
            "lifecycle",
            invocation = %Uuid::new_v4(),
            request_id = %request.request_id,
            logical_id = %request.logical_resource_id,
            request_type = request.request_type.as_str(),
        );

        async {
            let (response, executed) = self.process(request).await;
            info!(status = ?response.status, physical_id = %response.physical_resource_id, "request processed");

            let notified = self.notifier.notify(&request.response_url, &response).await;
            if let Err(err) = &notified {
                error!(error = %err, "failed to deliver lifecycle response");
            }

            Handled {
                response,
                executed,
                notified,
            }
        }
        .instrument(span)
        .await
    }

    async fn process(&self, request: &LifecycleRequest) -> (LifecycleResponse, Vec<ExecutedStatement>) {
        let existing_id = || {
            request
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| request.logical_resource_id.clone())
        };

        match &request.request_type {
            // Deletes never execute and always succeed so teardown is never blocked.
            RequestType::Delete => {
                return (self.success(request, existing_id(), None), Vec::new());
            }
            RequestType::Other(other) => {
                warn!(request_type = %other, "ignoring unsupported request type");
                return (self.success(request, existing_id(), None), Vec::new());
            }
            RequestType::Create | RequestType::Update => {}
        }

        let props = match request.properties() {
            Ok(props) => props,
            Err(err) => return (self.failure(request, existing_id(), err.into()), Vec::new()),
        };

        let delimiter = props.delimiter_or(&self.default_delimiter).to_string();
        let create_script = assemble_create_script(
            props.create_sql_document.as_deref().unwrap_or_default(),
            &delimiter,
            props.database(),
        );
        let new_id = physical_resource_id(&create_script);

        let (physical_id, plan) = self.plan(request, &props, delimiter, create_script, new_id);

        let Some(plan) = plan else {
            info!("script unchanged, nothing to execute");
            return (self.success(request, physical_id, None), Vec::new());
        };

        match self.run(&props, plan).await {
            Ok(executed) => {
                let response = self.success(request, physical_id, Some(executed.as_slice()));
                (response, executed)
            }
            Err(err) => (self.failure(request, physical_id, err), Vec::new()),
        }
    }

    fn plan(
        &self,
        request: &LifecycleRequest,
        props: &ResourceProperties,
        delimiter: String,
        create_script: String,
        new_id: String,
    ) -> (String, Option<Plan>) {
        let update_doc = props
            .update_sql_document
            .as_deref()
            .filter(|doc| !doc.trim().is_empty());

        match (&request.request_type, update_doc) {
            (RequestType::Update, Some(doc)) => {
                let physical_id = request.physical_resource_id.clone().unwrap_or(new_id);
                let plan = Plan {
                    script: doc.to_string(),
                    delimiter,
                    database: props.database().map(str::to_string),
                };
                (physical_id, Some(plan))
            }
            (RequestType::Update, None)
                if request.physical_resource_id.as_deref() == Some(new_id.as_str()) =>
            {
                (new_id, None)
            }
            (RequestType::Create | RequestType::Update, _) => {
                let plan = Plan {
                    script: create_script,
                    delimiter,
                    database: None,
                };
                (new_id, Some(plan))
            }
            (RequestType::Delete | RequestType::Other(_), _) => (new_id, None),
        }
    }

    async fn run(
        &self,
        props: &ResourceProperties,
        plan: Plan,
    ) -> Result<Vec<ExecutedStatement>, HandlerError> {
        if plan.delimiter.contains(char::is_whitespace) {
            return Err(HandlerError::InvalidDelimiter(plan.delimiter));
        }

        let split = self.splitter.split(&plan.script, &plan.delimiter)?;
        debug!(count = split.len(), final_delimiter = %split.delimiter, "script split");
        let statements = split.into_statements();

        let credential = self.resolver.resolve(props.secret_arn.as_deref()).await?;
        let target = ExecutionTarget {
            credential,
            database: plan.database,
            resource: props.cluster_arn.clone(),
        };

        let mut session = self
            .executor
            .open(&target)
            .await
            .map_err(HandlerError::Session)?;

        let mut executed = Vec::with_capacity(statements.len());
        for (index, sql) in statements.into_iter().enumerate() {
            match session.execute(&sql).await {
                Ok(outcome) => {
                    info!(index, rows_affected = outcome.rows_affected, elapsed_ms = outcome.elapsed_ms, "statement executed");
                    executed.push(ExecutedStatement { sql, outcome });
                }
                Err(source) => {
                    error!(index, statement = %sql, error = %source, "statement failed, halting");
                    if let Err(err) = session.close().await {
                        warn!(error = %err, "failed to close execution session");
                    }
                    return Err(HandlerError::Execute {
                        index,
                        statement: sql,
                        source,
                    });
                }
            }
        }

        if let Err(err) = session.close().await {
            warn!(error = %err, "failed to close execution session");
        }

        Ok(executed)
    }

    fn success(
        &self,
        request: &LifecycleRequest,
        physical_id: String,
        executed: Option<&[ExecutedStatement]>,
    ) -> LifecycleResponse {
        let mut response = LifecycleResponse::for_request(
            request,
            ResponseStatus::Success,
            self.log_reference(),
            physical_id,
        );
        if let Some(executed) = executed {
            response
                .data
                .insert("results".to_string(), serde_json::Value::String(results_json(executed)));
        }
        response
    }

    fn failure(
        &self,
        request: &LifecycleRequest,
        physical_id: String,
        err: HandlerError,
    ) -> LifecycleResponse {
        error!(error = %err, "lifecycle request failed");
        let reason = format!("{err}. {}", self.log_reference());
        LifecycleResponse::for_request(request, ResponseStatus::Failed, reason, physical_id)
    }

    fn log_reference(&self) -> String {
        format!("See the details in log stream: {}", self.log_stream)
    }
}

/// `[[sql, outcome], ...]` as a JSON string, the shape templates read back.
fn results_json(executed: &[ExecutedStatement]) -> String {
    let pairs: Vec<(&str, &StatementOutcome)> = executed
        .iter()
        .map(|e| (e.sql.as_str(), &e.outcome))
        .collect();
    serde_json::to_string(&pairs).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_json_shape() {
        let executed = vec![ExecutedStatement {
            sql: "SELECT 1".into(),
            outcome: StatementOutcome {
                rows_affected: 0,
                elapsed_ms: 3,
            },
        }];
        assert_eq!(
            results_json(&executed),
            r#"[["SELECT 1",{"rowsAffected":0,"elapsedMs":3}]]"#
        );
        assert_eq!(results_json(&[]), "[]");
    }
}
