//! # Server Sink
//!
//! Blocking HTTP client for a Speckle server.
//!
//! ## Protocol
//!
//! ```text
//! connect : POST /graphql            { activeUser { id name } }
//! send    : POST /api/diff/{stream}  → { id: bool }   which ids exist
//!           POST /objects/{stream}   multipart "batch-N" parts, JSON arrays
//! commit  : POST /graphql            commitCreate(commit: CommitCreateInput!)
//! ```

use crate::credentials::{Credentials, SinkConfig};
use crate::error::SinkError;
use crate::serializer::{serialize_container, SpeckleObject};
use crate::sink::MeshSink;
use cube_mesh::Container;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use std::collections::BTreeMap;

type Result<T> = std::result::Result<T, SinkError>;

const ACTIVE_USER_QUERY: &str = "query { activeUser { id name } }";

const COMMIT_CREATE_MUTATION: &str =
    "mutation CommitCreate($commit: CommitCreateInput!) { commitCreate(commit: $commit) }";

/// Characters of an error body kept in [`SinkError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Uploads containers to a Speckle server.
///
/// Constructed once per run with [`ServerSink::connect`], which verifies the
/// token before anything is sent.
#[derive(Debug)]
pub struct ServerSink {
    client: Client,
    config: SinkConfig,
    /// Child counts of roots sent through this sink, for commit metadata.
    children: BTreeMap<String, usize>,
}

impl ServerSink {
    /// Build an authenticated client and check the token.
    ///
    /// # Errors
    ///
    /// [`SinkError::Authentication`] if the server does not recognise the
    /// token, or any transport error.
    pub fn connect(config: SinkConfig, credentials: &Credentials) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credentials.token()))
            .map_err(|_| SinkError::Authentication("token is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let sink = Self {
            client,
            config,
            children: BTreeMap::new(),
        };
        let user = sink.authenticate()?;
        log::info!("authenticated with {} as {user}", sink.config.server_url);
        Ok(sink)
    }

    /// Name of the account owning the token.
    pub fn authenticate(&self) -> Result<String> {
        let data = self.graphql(ACTIVE_USER_QUERY, json!({}))?;
        active_user(&data)
    }

    fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        let url = self.config.graphql_url();
        let request = self
            .client
            .post(&url)
            .json(&json!({ "query": query, "variables": variables }));
        let body: Value = execute(request, &url)?.json()?;
        decode_graphql(body)
    }

    /// Ids among `ids` the server does not have yet.
    fn missing(&self, ids: &[&str]) -> Result<Vec<String>> {
        let url = self.config.diff_url();
        let request = self
            .client
            .post(&url)
            .json(&json!({ "objects": serde_json::to_string(ids)? }));
        let present: Value = execute(request, &url)?.json()?;
        missing_ids(ids, &present)
    }

    fn upload(&self, objects: &[&SpeckleObject]) -> Result<()> {
        let batches = batch_objects(objects, self.config.max_batch_bytes)?;
        if batches.is_empty() {
            return Ok(());
        }

        let mut form = Form::new();
        for (index, batch) in batches.into_iter().enumerate() {
            let name = format!("batch-{index}");
            let part = Part::bytes(batch.into_bytes())
                .file_name(name.clone())
                .mime_str("application/json")?;
            form = form.part(name, part);
        }

        let url = self.config.objects_url();
        execute(self.client.post(&url).multipart(form), &url)?;
        Ok(())
    }
}

impl MeshSink for ServerSink {
    fn send(&mut self, container: &Container) -> Result<String> {
        let serialized = serialize_container(container)?;
        let missing = self.missing(&serialized.ids())?;

        let pending: Vec<&SpeckleObject> = serialized
            .objects()
            .iter()
            .filter(|object| missing.contains(&object.id))
            .collect();
        log::debug!(
            "uploading {} of {} objects",
            pending.len(),
            serialized.objects().len()
        );
        self.upload(&pending)?;

        let root_id = serialized.root_id().to_string();
        self.children
            .insert(root_id.clone(), serialized.children_count());
        Ok(root_id)
    }

    fn commit(&mut self, object_id: &str, message: &str) -> Result<String> {
        let total_children = self.children.get(object_id).copied().unwrap_or(0);
        let variables = json!({
            "commit": {
                "streamId": self.config.stream_id,
                "branchName": self.config.branch_name,
                "objectId": object_id,
                "message": message,
                "sourceApplication": self.config.source_application,
                "totalChildrenCount": total_children,
            }
        });

        let data = self.graphql(COMMIT_CREATE_MUTATION, variables)?;
        data.get("commitCreate")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SinkError::UnexpectedResponse("commitCreate returned no id".into()))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Send a request, turning non-success statuses into [`SinkError::Status`].
fn execute(request: RequestBuilder, url: &str) -> Result<Response> {
    let response = request.send()?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(SinkError::Status {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}

/// Unwrap a GraphQL response envelope into its `data` member.
pub fn decode_graphql(body: Value) -> Result<Value> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages: Vec<&str> = errors
                .iter()
                .map(|e| e.get("message").and_then(Value::as_str).unwrap_or("unknown error"))
                .collect();
            let joined = messages.join("; ");

            let unauthenticated = errors.iter().any(|e| {
                e.pointer("/extensions/code").and_then(Value::as_str) == Some("FORBIDDEN")
                    || e.pointer("/extensions/code").and_then(Value::as_str)
                        == Some("UNAUTHENTICATED")
            });
            return Err(if unauthenticated {
                SinkError::Authentication(joined)
            } else {
                SinkError::GraphQl(joined)
            });
        }
    }

    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(SinkError::UnexpectedResponse("response has no data".into())),
        },
        _ => Err(SinkError::UnexpectedResponse("response is not an object".into())),
    }
}

/// Display name of the `activeUser`, or an authentication error if the
/// server answered `null`.
pub fn active_user(data: &Value) -> Result<String> {
    let user = data
        .get("activeUser")
        .filter(|user| !user.is_null())
        .ok_or_else(|| SinkError::Authentication("token was not accepted".into()))?;

    ["name", "id"]
        .iter()
        .find_map(|key| user.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| SinkError::UnexpectedResponse("activeUser has no name or id".into()))
}

/// Ids the diff response does not mark as present, in input order.
pub fn missing_ids(ids: &[&str], present: &Value) -> Result<Vec<String>> {
    let present = present
        .as_object()
        .ok_or_else(|| SinkError::UnexpectedResponse("diff response is not an object".into()))?;

    Ok(ids
        .iter()
        .filter(|id| present.get(**id).and_then(Value::as_bool) != Some(true))
        .map(|id| id.to_string())
        .collect())
}

/// Group objects into JSON arrays of at most `max_bytes` each.
///
/// An object larger than the limit gets a batch of its own.
pub fn batch_objects(objects: &[&SpeckleObject], max_bytes: usize) -> Result<Vec<String>> {
    let mut batches = Vec::new();
    let mut current = String::from("[");

    for object in objects {
        let encoded = serde_json::to_string(&object.value)?;
        let empty = current.len() == 1;
        // Separator plus closing bracket.
        let extra = encoded.len() + usize::from(!empty) + 1;

        if !empty && current.len() + extra > max_bytes {
            current.push(']');
            batches.push(std::mem::replace(&mut current, String::from("[")));
        }
        if current.len() > 1 {
            current.push(',');
        }
        current.push_str(&encoded);
    }

    if current.len() > 1 {
        current.push(']');
        batches.push(current);
    }
    Ok(batches)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::serialize_container;
    use cube_mesh::{demo_box_mesh, Container};

    fn objects() -> Vec<SpeckleObject> {
        let container = Container::with_meshes(
            "Elements",
            vec![demo_box_mesh(1.0).unwrap(), demo_box_mesh(2.0).unwrap()],
        );
        serialize_container(&container).unwrap().objects().to_vec()
    }

    #[test]
    fn test_decode_graphql_data() {
        let data = decode_graphql(json!({"data": {"commitCreate": "abc"}})).unwrap();
        assert_eq!(data["commitCreate"], "abc");
    }

    #[test]
    fn test_decode_graphql_errors() {
        let err = decode_graphql(json!({
            "errors": [{"message": "stream not found"}, {"message": "try again"}],
            "data": null
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "graphql error: stream not found; try again");
    }

    #[test]
    fn test_decode_graphql_forbidden_is_authentication() {
        let err = decode_graphql(json!({
            "errors": [{"message": "nope", "extensions": {"code": "FORBIDDEN"}}]
        }))
        .unwrap_err();
        assert!(matches!(err, SinkError::Authentication(_)));
    }

    #[test]
    fn test_decode_graphql_missing_data() {
        assert!(matches!(
            decode_graphql(json!({"data": null})),
            Err(SinkError::UnexpectedResponse(_))
        ));
        assert!(matches!(
            decode_graphql(json!([1, 2])),
            Err(SinkError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_active_user() {
        assert_eq!(
            active_user(&json!({"activeUser": {"id": "u1", "name": "Ada"}})).unwrap(),
            "Ada"
        );
        assert_eq!(active_user(&json!({"activeUser": {"id": "u1"}})).unwrap(), "u1");
        assert!(matches!(
            active_user(&json!({"activeUser": null})),
            Err(SinkError::Authentication(_))
        ));
    }

    #[test]
    fn test_missing_ids() {
        let present = json!({"a": true, "b": false});
        assert_eq!(missing_ids(&["a", "b", "c"], &present).unwrap(), ["b", "c"]);
        assert!(missing_ids(&["a"], &json!([])).is_err());
    }

    #[test]
    fn test_single_batch_is_json_array() {
        let objects = objects();
        let refs: Vec<&SpeckleObject> = objects.iter().collect();
        let batches = batch_objects(&refs, usize::MAX).unwrap();

        assert_eq!(batches.len(), 1);
        let parsed: Vec<Value> = serde_json::from_str(&batches[0]).unwrap();
        assert_eq!(parsed.len(), objects.len());
        assert_eq!(parsed[0]["id"], objects[0].id.as_str());
    }

    #[test]
    fn test_batches_respect_limit() {
        let objects = objects();
        let refs: Vec<&SpeckleObject> = objects.iter().collect();
        let largest = objects
            .iter()
            .map(|o| serde_json::to_string(&o.value).unwrap().len())
            .max()
            .unwrap();

        let batches = batch_objects(&refs, largest + 2).unwrap();
        assert_eq!(batches.len(), objects.len());
        for batch in &batches {
            assert!(batch.len() <= largest + 2);
            let parsed: Vec<Value> = serde_json::from_str(batch).unwrap();
            assert_eq!(parsed.len(), 1);
        }
    }

    #[test]
    fn test_oversized_object_gets_own_batch() {
        let objects = objects();
        let refs: Vec<&SpeckleObject> = objects.iter().collect();
        let batches = batch_objects(&refs, 1).unwrap();
        assert_eq!(batches.len(), objects.len());
    }

    #[test]
    fn test_no_objects_no_batches() {
        assert!(batch_objects(&[], 1024).unwrap().is_empty());
    }
}
