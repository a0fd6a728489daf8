//! Unified test utilities for pubsync integration tests

use pubsync_types::{AccessToken, Credentials, Fingerprint};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Site identifier accepted by [`FakePublishApi`]
pub const SITE: &str = "test-site";
/// Token accepted by [`FakePublishApi`]
pub const TOKEN: &str = "test-token";

/// Stateful fake of the publishing API
///
/// Holds the published files in memory and records every mutating call, so
/// tests can assert both on the resulting site and on the traffic.
#[derive(Clone, Default)]
pub struct FakePublishApi {
    state: Arc<Mutex<ApiState>>,
}

#[derive(Default)]
struct ApiState {
    files: BTreeMap<String, Fingerprint>,
    uploads: Vec<String>,
    removals: Vec<String>,
    fail_upload: Option<(String, u16)>,
}

#[derive(Deserialize)]
struct ListBody {
    id: String,
    token: String,
}

#[derive(Deserialize)]
struct RemoveBody {
    id: String,
    path: String,
    token: String,
}

impl FakePublishApi {
    /// Start a mock server serving this API
    pub async fn start() -> (MockServer, Self) {
        let server = MockServer::start().await;
        let api = Self::default();

        for (endpoint, kind) in [
            ("/api/list", Endpoint::List),
            ("/api/upload", Endpoint::Upload),
            ("/api/remove", Endpoint::Remove),
        ] {
            Mock::given(method("POST"))
                .and(path(endpoint))
                .respond_with(Handler {
                    api: api.clone(),
                    kind,
                })
                .mount(&server)
                .await;
        }

        (server, api)
    }

    /// Seed a published file
    pub fn seed(&self, path: &str, content: &[u8]) {
        self.lock().files.insert(path.to_string(), Fingerprint::of(content));
    }

    /// Make uploads of `path` answer with `status`
    pub fn fail_upload(&self, path: &str, status: u16) {
        self.lock().fail_upload = Some((path.to_string(), status));
    }

    /// Published files and their fingerprints
    pub fn files(&self) -> BTreeMap<String, Fingerprint> {
        self.lock().files.clone()
    }

    /// Paths uploaded so far, in request order
    pub fn uploads(&self) -> Vec<String> {
        self.lock().uploads.clone()
    }

    /// Paths removed so far, in request order
    pub fn removals(&self) -> Vec<String> {
        self.lock().removals.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ApiState> {
        self.state.lock().unwrap()
    }
}

#[derive(Clone, Copy)]
enum Endpoint {
    List,
    Upload,
    Remove,
}

struct Handler {
    api: FakePublishApi,
    kind: Endpoint,
}

impl Respond for Handler {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match self.kind {
            Endpoint::List => self.list(request),
            Endpoint::Upload => self.upload(request),
            Endpoint::Remove => self.remove(request),
        }
    }
}

impl Handler {
    fn list(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = request.body_json::<ListBody>() else {
            return ResponseTemplate::new(400);
        };
        if body.id != SITE || body.token != TOKEN {
            return ResponseTemplate::new(401).set_body_string("invalid token");
        }

        let entries: Vec<serde_json::Value> = self
            .api
            .lock()
            .files
            .iter()
            .map(|(path, fingerprint)| {
                serde_json::json!({"path": path, "hash": fingerprint.to_hex()})
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(entries)
    }

    fn upload(&self, request: &Request) -> ResponseTemplate {
        let header = |name: &str| {
            request
                .headers
                .get(name)
                .and_then(|value| String::from_utf8(value.as_bytes().to_vec()).ok())
        };

        if header("obs-id").as_deref() != Some(SITE)
            || header("obs-token").as_deref() != Some(TOKEN)
        {
            return ResponseTemplate::new(401);
        }
        let (Some(path), Some(hash)) = (header("obs-path"), header("obs-hash")) else {
            return ResponseTemplate::new(400);
        };

        let fingerprint = Fingerprint::of(&request.body);
        if fingerprint.to_hex() != hash {
            return ResponseTemplate::new(400).set_body_string("hash mismatch");
        }

        let mut state = self.api.lock();
        if let Some((fail_path, status)) = &state.fail_upload {
            if *fail_path == path {
                return ResponseTemplate::new(*status);
            }
        }
        state.uploads.push(path.clone());
        state.files.insert(path, fingerprint);
        ResponseTemplate::new(200)
    }

    fn remove(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = request.body_json::<RemoveBody>() else {
            return ResponseTemplate::new(400);
        };
        if body.id != SITE || body.token != TOKEN {
            return ResponseTemplate::new(401);
        }

        let mut state = self.api.lock();
        state.removals.push(body.path.clone());
        match state.files.remove(&body.path) {
            Some(_) => ResponseTemplate::new(200),
            None => ResponseTemplate::new(404),
        }
    }
}

/// Credentials accepted by [`FakePublishApi`]
pub fn credentials() -> Credentials {
    Credentials::new(SITE, AccessToken::new(TOKEN)).unwrap()
}

/// Write `files` under `root`, creating parent directories
pub fn create_site_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}
