// src/gist/entity.rs
// =============================================================================
// A single gist.
//
// A Gist knows its id and a few URLs derived from it right away. Everything
// else (owner, description, filenames, ...) comes from the metadata endpoint
// and is only fetched the first time one of those accessors is awaited.
//
// Lifecycle:
// 1. Gist::from_id("abc")          -> no request yet
// 2. gist.owner().await            -> one GET to api/v1/json/abc, cached
// 3. gist.description().await      -> served from the cache
// 4. gist.files().await            -> one GET per filename, every time
//
// Gists built from a user listing already carry their metadata, so step 2
// never happens for them.
//
// Rust concepts:
// - tokio::sync::OnceCell: async "initialize once" cell; a failed init
//   leaves it empty so the next call tries again
// - &self accessors: OnceCell gives us interior mutability, so reading a
//   lazy field doesn't need &mut
// =============================================================================

use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use super::fetch::GistClient;
use super::metadata::{Envelope, GistFiles, GistMetadata};
use crate::error::{DecodeReason, GistError};

/// Upper bound on file downloads in flight for one `files()` call.
const MAX_CONCURRENT_FILE_FETCHES: usize = 8;

/// One remote gist.
#[derive(Debug, Clone)]
pub struct Gist {
    client: GistClient,
    id: String,
    url: String,
    embed_url: String,
    json_url: String,
    metadata: OnceCell<GistMetadata>,
}

impl Gist {
    /// A gist known only by id. Nothing is fetched until a
    /// metadata-backed accessor is awaited.
    pub fn from_id(client: &GistClient, id: impl Into<String>) -> Self {
        Self::build(client, id.into(), OnceCell::new())
    }

    /// A gist whose metadata is already in hand. Its id is taken from
    /// `metadata.repo` and no metadata request will ever be made.
    pub fn from_metadata(client: &GistClient, metadata: GistMetadata) -> Self {
        let id = metadata.repo.clone();
        Self::build(client, id, OnceCell::new_with(Some(metadata)))
    }

    /// General constructor: when `metadata` is present its `repo` replaces
    /// the given id.
    pub fn new(client: &GistClient, id: impl Into<String>, metadata: Option<GistMetadata>) -> Self {
        match metadata {
            Some(metadata) => Self::from_metadata(client, metadata),
            None => Self::from_id(client, id),
        }
    }

    fn build(client: &GistClient, id: String, metadata: OnceCell<GistMetadata>) -> Self {
        Self {
            url: client.page_url(&id),
            embed_url: client.embed_url(&id),
            json_url: client.json_url(&id),
            client: client.clone(),
            id,
            metadata,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Web page of the gist.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `<script>` embed URL.
    pub fn embed_url(&self) -> &str {
        &self.embed_url
    }

    pub fn json_url(&self) -> &str {
        &self.json_url
    }

    /// Whether metadata is already available without a request.
    pub fn is_loaded(&self) -> bool {
        self.metadata.initialized()
    }

    /// The full metadata record, loading it on first use.
    ///
    /// Every other metadata accessor goes through here, so no matter which
    /// one is awaited first there is at most one successful metadata request
    /// per gist. A failed request is not cached.
    pub async fn metadata(&self) -> Result<&GistMetadata, GistError> {
        if let Some(metadata) = self.metadata.get() {
            trace!(id = %self.id, "metadata already loaded");
            return Ok(metadata);
        }
        self.metadata.get_or_try_init(|| self.load_metadata()).await
    }

    pub async fn repo(&self) -> Result<&str, GistError> {
        Ok(&self.metadata().await?.repo)
    }

    pub async fn owner(&self) -> Result<&str, GistError> {
        Ok(&self.metadata().await?.owner)
    }

    pub async fn description(&self) -> Result<Option<&str>, GistError> {
        Ok(self.metadata().await?.description.as_deref())
    }

    pub async fn created_at(&self) -> Result<&str, GistError> {
        Ok(&self.metadata().await?.created_at)
    }

    pub async fn public(&self) -> Result<bool, GistError> {
        Ok(self.metadata().await?.public)
    }

    pub async fn filenames(&self) -> Result<&[String], GistError> {
        Ok(&self.metadata().await?.filenames)
    }

    /// Any other key the API returned for this gist.
    pub async fn attribute(&self, key: &str) -> Result<Option<&Value>, GistError> {
        Ok(self.metadata().await?.extra.get(key))
    }

    /// Downloads the content of every file.
    ///
    /// Not cached: each call fetches every file again, since content can
    /// change between calls. Results are in `filenames` order. If any one
    /// download fails the whole call fails and no partial result is returned.
    pub async fn files(&self) -> Result<GistFiles, GistError> {
        let filenames = self.filenames().await?;
        debug!(id = %self.id, count = filenames.len(), "fetching gist files");

        let entries = stream::iter(filenames)
            .map(|name| async move {
                let url = self.client.raw_file_url(&self.id, name);
                let content = self.client.get_text(url).await?;
                Ok::<_, GistError>((name.clone(), content))
            })
            .buffered(MAX_CONCURRENT_FILE_FETCHES)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(GistFiles::from_entries(entries))
    }

    async fn load_metadata(&self) -> Result<GistMetadata, GistError> {
        let url = self.client.metadata_url(&self.id);
        debug!(id = %self.id, "loading gist metadata");

        // Only gists[0] matters here; later entries are not decoded.
        let envelope: Envelope<Value> = self.client.get_json(url.clone()).await?;
        let first = envelope
            .gists
            .into_iter()
            .next()
            .ok_or_else(|| GistError::decode(url.as_str(), DecodeReason::EmptyEnvelope))?;
        let metadata: GistMetadata =
            serde_json::from_value(first).map_err(|e| GistError::decode(url.as_str(), e))?;

        // The id we asked for must be the id we got back.
        if metadata.repo != self.id {
            return Err(GistError::decode(
                url.as_str(),
                DecodeReason::RepoMismatch {
                    requested: self.id.clone(),
                    returned: metadata.repo,
                },
            ));
        }

        Ok(metadata)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why OnceCell and not a `loaded: bool` plus Option<GistMetadata>?
//    - OnceCell is exactly that pair, but it also hands out &GistMetadata
//      from a &self method, which a plain Option can't do without &mut
//
// 2. What does `buffered(N)` do?
//    - Like buffer_unordered(N) in the link checker, it runs up to N futures
//      at once, but it yields results in the order they went in
//    - try_collect() stops at the first Err, so one failed file fails the
//      whole call
//
// 3. Why `async move` inside map()?
//    - Each future needs its own copy of `name`; `self` is only borrowed
//      because the futures are awaited before files() returns
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EXAMPLE_ID: &str = "d4507e882a07ac6f9f92";

    fn example_json() -> Value {
        json!({
            "repo": EXAMPLE_ID,
            "owner": "kennethreitz",
            "description": "Example Gist for gist.py",
            "created_at": "2010/05/16 10:51:15 -0700",
            "public": false,
            "files": ["exampleEmptyFile", "exampleFile"]
        })
    }

    fn example_metadata() -> GistMetadata {
        serde_json::from_value(example_json()).unwrap()
    }

    fn client_for(server: &MockServer) -> GistClient {
        GistClient::builder().base_url(server.uri()).build().unwrap()
    }

    async fn mount_metadata(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/json/{}", EXAMPLE_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "gists": [example_json()]
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    async fn mount_raw(server: &MockServer, name: &str, body: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/raw/{}/{}", EXAMPLE_ID, name)))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_from_id_is_lazy() {
        let server = MockServer::start().await;
        mount_metadata(&server, 0).await;

        let gist = Gist::from_id(&client_for(&server), EXAMPLE_ID);
        assert_eq!(gist.id(), EXAMPLE_ID);
        assert!(!gist.is_loaded());
        assert_eq!(gist.url(), format!("{}/{}", server.uri(), EXAMPLE_ID));
        assert_eq!(gist.embed_url(), format!("{}/{}.js", server.uri(), EXAMPLE_ID));
        assert_eq!(gist.json_url(), format!("{}/{}.json", server.uri(), EXAMPLE_ID));
    }

    #[tokio::test]
    async fn test_metadata_is_loaded_once() {
        let server = MockServer::start().await;
        mount_metadata(&server, 1).await;

        let gist = Gist::from_id(&client_for(&server), EXAMPLE_ID);
        assert_eq!(gist.owner().await.unwrap(), "kennethreitz");
        assert!(gist.is_loaded());
        assert_eq!(
            gist.description().await.unwrap(),
            Some("Example Gist for gist.py")
        );
        assert_eq!(gist.created_at().await.unwrap(), "2010/05/16 10:51:15 -0700");
        assert!(!gist.public().await.unwrap());
        assert_eq!(gist.repo().await.unwrap(), EXAMPLE_ID);
        assert_eq!(
            gist.filenames().await.unwrap(),
            ["exampleEmptyFile", "exampleFile"]
        );
    }

    #[tokio::test]
    async fn test_from_metadata_never_fetches_metadata() {
        let server = MockServer::start().await;
        mount_metadata(&server, 0).await;

        let gist = Gist::new(&client_for(&server), "some-other-id", Some(example_metadata()));
        assert!(gist.is_loaded());
        assert_eq!(gist.id(), EXAMPLE_ID);
        assert!(gist.url().ends_with(EXAMPLE_ID));
        assert_eq!(gist.owner().await.unwrap(), "kennethreitz");
        assert_eq!(
            gist.filenames().await.unwrap(),
            ["exampleEmptyFile", "exampleFile"]
        );
    }

    #[tokio::test]
    async fn test_files_fetches_each_file_once_per_call() {
        let server = MockServer::start().await;
        mount_metadata(&server, 0).await;
        mount_raw(&server, "exampleEmptyFile", "", 2).await;
        mount_raw(&server, "exampleFile", "Example file content.", 2).await;

        let gist = Gist::from_metadata(&client_for(&server), example_metadata());

        let files = gist.files().await.unwrap();
        assert_eq!(
            files.names().collect::<Vec<_>>(),
            vec!["exampleEmptyFile", "exampleFile"]
        );
        assert_eq!(files.get("exampleFile"), Some("Example file content."));
        assert_eq!(files.get("exampleEmptyFile"), Some(""));

        // Not cached: a second call goes back to the server.
        let again = gist.files().await.unwrap();
        assert_eq!(again, files);
    }

    #[tokio::test]
    async fn test_files_loads_metadata_first() {
        let server = MockServer::start().await;
        mount_metadata(&server, 1).await;
        mount_raw(&server, "exampleEmptyFile", "", 1).await;
        mount_raw(&server, "exampleFile", "Example file content.", 1).await;

        let gist = Gist::from_id(&client_for(&server), EXAMPLE_ID);
        let files = gist.files().await.unwrap();
        assert_eq!(files.len(), 2);
    }

    #[tokio::test]
    async fn test_one_failed_file_fails_the_whole_call() {
        let server = MockServer::start().await;
        mount_raw(&server, "exampleEmptyFile", "", 1).await;
        Mock::given(method("GET"))
            .and(path(format!("/raw/{}/exampleFile", EXAMPLE_ID)))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let gist = Gist::from_metadata(&client_for(&server), example_metadata());
        let err = gist.files().await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_server_error_is_remote_and_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/json/{}", EXAMPLE_ID)))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let gist = Gist::from_id(&client_for(&server), EXAMPLE_ID);
        assert!(gist.owner().await.unwrap_err().is_remote());
        assert!(!gist.is_loaded());
        assert!(gist.description().await.unwrap_err().is_remote());
    }

    #[tokio::test]
    async fn test_empty_envelope_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/json/{}", EXAMPLE_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "gists": [] })))
            .mount(&server)
            .await;

        let gist = Gist::from_id(&client_for(&server), EXAMPLE_ID);
        let err = gist.owner().await.unwrap_err();
        assert!(matches!(
            err,
            GistError::Decode {
                reason: DecodeReason::EmptyEnvelope,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_only_first_envelope_entry_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/json/{}", EXAMPLE_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "gists": [example_json(), { "repo": "zzz" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gist = Gist::from_id(&client_for(&server), EXAMPLE_ID);
        assert_eq!(gist.owner().await.unwrap(), "kennethreitz");
        assert_eq!(gist.repo().await.unwrap(), EXAMPLE_ID);
    }

    #[tokio::test]
    async fn test_files_with_no_filenames() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let mut metadata = example_metadata();
        metadata.filenames.clear();
        let gist = Gist::from_metadata(&client_for(&server), metadata);

        let files = gist.files().await.unwrap();
        assert!(files.is_empty());
        assert_eq!(files, GistFiles::default());
    }

    #[tokio::test]
    async fn test_missing_field_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/json/{}", EXAMPLE_ID)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "gists": [{ "repo": EXAMPLE_ID }] })),
            )
            .mount(&server)
            .await;

        let gist = Gist::from_id(&client_for(&server), EXAMPLE_ID);
        assert!(gist.owner().await.unwrap_err().is_decode());
    }

    #[tokio::test]
    async fn test_repo_mismatch_keeps_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/short-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "gists": [example_json()]
            })))
            .mount(&server)
            .await;

        let gist = Gist::from_id(&client_for(&server), "short-id");
        let err = gist.repo().await.unwrap_err();
        assert!(matches!(
            err,
            GistError::Decode {
                reason: DecodeReason::RepoMismatch { .. },
                ..
            }
        ));
        assert_eq!(gist.id(), "short-id");
    }

    #[tokio::test]
    async fn test_extra_attribute() {
        let server = MockServer::start().await;
        let mut value = example_json();
        value["comments"] = json!(2);
        let metadata: GistMetadata = serde_json::from_value(value).unwrap();

        let gist = Gist::from_metadata(&client_for(&server), metadata);
        assert_eq!(gist.attribute("comments").await.unwrap(), Some(&json!(2)));
        assert_eq!(gist.attribute("forks").await.unwrap(), None);
    }
}
