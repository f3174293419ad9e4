//! Resource fetchers
//!
//! Builds `<base_url>/<resource>`, fetches it with the default attempt budget
//! and decodes the `{"data": [...]}` envelope.

use gidsync_core::domain::entity::Entity;
use gidsync_core::domain::resource::{ResourceCollection, ResourceKind};
use gidsync_core::dto::envelope::DataEnvelope;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ApiClient;
use crate::error::{ClientError, Result};
use crate::retry::DEFAULT_MAX_ATTEMPTS;

impl ApiClient {
    /// Absolute URL of a collection endpoint
    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    /// Fetch a collection endpoint and decode its `data` array
    ///
    /// A body that is not a valid envelope of `T` yields
    /// [`ClientError::Decode`]; it is never retried.
    pub async fn fetch_collection<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>> {
        let url = self.resource_url(resource);
        let body = self.fetch_with_retry(&url, DEFAULT_MAX_ATTEMPTS).await?;

        let envelope: DataEnvelope<T> =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                resource: resource.to_string(),
                source,
            })?;

        debug!(resource, count = envelope.data.len(), "Decoded collection");
        Ok(envelope.data)
    }

    /// Fetch every entity of one resource kind
    pub async fn fetch_resource(&self, kind: ResourceKind) -> Result<ResourceCollection> {
        let entities = self.fetch_collection::<Entity>(kind.path()).await?;
        Ok(ResourceCollection::new(kind, entities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, Step};
    use std::sync::Arc;

    const PROJECTS: &str = r#"{"data":[
        {"gid":"11","name":"Roadmap","resource_type":"project"},
        {"gid":"12","name":"Launch","resource_type":"project"}
    ]}"#;

    fn client_with(
        base_url: &str,
        steps: impl IntoIterator<Item = Step>,
    ) -> (ApiClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(steps));
        let client = ApiClient::with_transport(base_url, "token", transport.clone());
        (client, transport)
    }

    #[test]
    fn test_resource_url() {
        let (client, _) = client_with("https://api.test/1.0/", [Step::ok("")]);
        assert_eq!(client.resource_url("users"), "https://api.test/1.0/users");
    }

    #[tokio::test]
    async fn test_fetch_projects() {
        let (client, transport) = client_with("http://api.test", [Step::ok(PROJECTS)]);

        let projects = client.fetch_resource(ResourceKind::Projects).await.unwrap();

        assert_eq!(projects.kind(), ResourceKind::Projects);
        assert_eq!(
            projects.entities(),
            [
                Entity::new("11", "Roadmap", "project"),
                Entity::new("12", "Launch", "project"),
            ]
        );
        assert_eq!(transport.paths(), ["/projects"]);
    }

    #[tokio::test]
    async fn test_fetch_users_uses_users_path() {
        let (client, transport) = client_with(
            "http://api.test/api",
            [Step::ok(
                r#"{"data":[{"gid":"7","name":"Ada","resource_type":"user"}]}"#,
            )],
        );

        let users = client.fetch_resource(ResourceKind::Users).await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(transport.paths(), ["/api/users"]);
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let (client, _) = client_with("http://api.test", [Step::ok(r#"{"data":[]}"#)]);
        let users = client.fetch_resource(ResourceKind::Users).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_decode_error_is_not_retried() {
        let (client, transport) = client_with(
            "http://api.test",
            [Step::ok(r#"{"data":"not-a-list"}"#), Step::ok(PROJECTS)],
        );

        let err = client.fetch_resource(ResourceKind::Projects).await.unwrap_err();

        assert!(err.is_decode_error());
        assert!(matches!(&err, ClientError::Decode { resource, .. } if resource == "projects"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_is_distinct_from_decode_error() {
        let (client, _) = client_with("http://api.test", [Step::status(403, "forbidden")]);

        let err = client.fetch_resource(ResourceKind::Users).await.unwrap_err();

        assert!(!err.is_decode_error());
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_attempt_budget() {
        let (client, transport) = client_with("http://api.test", [Step::status(503, "")]);

        let err = client.fetch_resource(ResourceKind::Projects).await.unwrap_err();

        assert_eq!(transport.calls(), DEFAULT_MAX_ATTEMPTS as usize);
        assert!(matches!(
            err,
            ClientError::RetriesExhausted { attempts: 5, .. }
        ));
    }
}
