// src/gist/listing.rs
// =============================================================================
// Looking up all public gists of one user.
//
// One request to api/v1/json/gists/{username} returns the metadata for
// every gist the user owns, so each Gist we hand back is built with that
// metadata already filled in. Reading .owner() or .description() on them
// never goes back to the network.
// =============================================================================

use tracing::debug;

use super::entity::Gist;
use super::fetch::GistClient;
use super::metadata::Envelope;
use crate::error::GistError;

/// Lookups that return several gists at once.
///
/// Holds nothing but a client handle.
#[derive(Debug, Clone)]
pub struct Gists {
    client: GistClient,
}

impl Gists {
    pub fn new(client: &GistClient) -> Self {
        Self {
            client: client.clone(),
        }
    }

    /// See [`fetch_by_user`].
    pub async fn fetch_by_user(&self, username: &str) -> Result<Vec<Gist>, GistError> {
        fetch_by_user(&self.client, username).await
    }
}

/// Returns the public gists owned by `username`, in the order the API
/// lists them. A user with no gists gives an empty Vec.
///
/// If the envelope can't be decoded nothing is returned at all.
pub async fn fetch_by_user(client: &GistClient, username: &str) -> Result<Vec<Gist>, GistError> {
    if username.trim().is_empty() {
        return Err(GistError::InvalidInput("username must not be empty".to_string()));
    }

    let url = client.user_listing_url(username);
    let envelope: Envelope = client.get_json(url).await?;
    debug!(username, count = envelope.gists.len(), "fetched user listing");

    Ok(envelope
        .gists
        .into_iter()
        .map(|metadata| Gist::from_metadata(client, metadata))
        .collect())
}
