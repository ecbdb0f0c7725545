use async_trait::async_trait;
use beacon_model::{InstanceId, RegistrationRecord};
use reqwest::Response;
use tracing::{debug, instrument};

use crate::{errors::DiscoverError, registry::ServiceRegistry};

const REGISTER_PATH: &str = "/v1/agent/service/register";
const DEREGISTER_PATH: &str = "/v1/agent/service/deregister";

/// Client for the local Consul agent HTTP API.
#[derive(Debug, Clone)]
pub struct ConsulAgent {
    endpoint: String,
    client: reqwest::Client,
}

impl ConsulAgent {
    /// Agent reachable at `endpoint` (e.g. `http://10.0.0.1:8500`).
    pub fn new(endpoint: impl Into<String>) -> Result<Self, DiscoverError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(endpoint, client))
    }

    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { endpoint, client }
    }
}

#[async_trait]
impl ServiceRegistry for ConsulAgent {
    #[instrument(level = "debug", skip(self, record), fields(id = %record.id, name = %record.name))]
    async fn register(&self, record: &RegistrationRecord) -> Result<(), DiscoverError> {
        debug!(endpoint = %self.endpoint, "submitting service registration");
        let response = self
            .client
            .put(format!("{}{REGISTER_PATH}", self.endpoint))
            .json(record)
            .send()
            .await?;

        check_status(response).await
    }

    #[instrument(level = "debug", skip(self, id), fields(id = %id))]
    async fn deregister(&self, id: &InstanceId) -> Result<(), DiscoverError> {
        debug!(endpoint = %self.endpoint, "submitting service deregistration");
        let response = self
            .client
            .put(format!("{}{DEREGISTER_PATH}/{id}", self.endpoint))
            .send()
            .await?;

        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<(), DiscoverError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
    Err(DiscoverError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::put,
    };
    use serde_json::Value;
    use tokio::net::TcpListener;

    use super::*;

    #[derive(Default)]
    struct Agent {
        registered: Mutex<Vec<Value>>,
        deregistered: Mutex<Vec<String>>,
    }

    async fn spawn_agent(status: StatusCode) -> (String, Arc<Agent>) {
        let agent = Arc::new(Agent::default());
        let app = Router::new()
            .route(
                "/v1/agent/service/register",
                put(
                    move |State(agent): State<Arc<Agent>>, Json(body): Json<Value>| async move {
                        agent.registered.lock().unwrap().push(body);
                        (status, "agent says no")
                    },
                ),
            )
            .route(
                "/v1/agent/service/deregister/{id}",
                put(
                    move |State(agent): State<Arc<Agent>>, Path(id): Path<String>| async move {
                        agent.deregistered.lock().unwrap().push(id);
                        (status, "agent says no")
                    },
                ),
            )
            .with_state(Arc::clone(&agent));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), agent)
    }

    fn record() -> RegistrationRecord {
        RegistrationRecord::new(InstanceId::from("id-42"), "orders", "10.0.0.5", 8080, &[])
    }

    #[tokio::test]
    async fn register_puts_consul_payload() {
        let (endpoint, agent) = spawn_agent(StatusCode::OK).await;
        let consul = ConsulAgent::new(endpoint).unwrap();

        consul.register(&record()).await.unwrap();

        let registered = agent.registered.lock().unwrap();
        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0]["ID"], "id-42");
        assert_eq!(registered[0]["Name"], "orders");
        assert_eq!(registered[0]["Tags"][0], "urlprefix-/orders");
        assert_eq!(
            registered[0]["Checks"][0]["HTTP"],
            "http://10.0.0.5:8080/api/health"
        );
    }

    #[tokio::test]
    async fn deregister_targets_instance_id() {
        let (endpoint, agent) = spawn_agent(StatusCode::OK).await;
        let consul = ConsulAgent::new(format!("{endpoint}/")).unwrap();

        consul.deregister(&InstanceId::from("id-42")).await.unwrap();

        assert_eq!(*agent.deregistered.lock().unwrap(), vec!["id-42".to_string()]);
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let (endpoint, _agent) = spawn_agent(StatusCode::BAD_REQUEST).await;
        let consul = ConsulAgent::new(endpoint).unwrap();

        let err = consul.register(&record()).await.unwrap_err();
        match err {
            DiscoverError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "agent says no");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_agent_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let consul = ConsulAgent::new(format!("http://{addr}")).unwrap();
        let err = consul.deregister(&InstanceId::from("gone")).await.unwrap_err();
        assert!(matches!(err, DiscoverError::HttpRequest(_)));
    }
}
