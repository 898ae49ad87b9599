// src/lib.rs
// =============================================================================
// gistapi: a small async client for the Gist snippet-hosting JSON API.
//
//     let client = GistClient::new()?;
//     let gist = Gist::from_id(&client, "d4507e882a07ac6f9f92");
//     println!("{}", gist.owner().await?);         // one metadata request
//     println!("{:?}", gist.description().await?); // cached
//
//     for gist in fetch_by_user(&client, "kennethreitz").await? {
//         println!("{}", gist.id());               // no extra requests
//     }
// =============================================================================

pub mod error;
pub mod gist;

pub use error::{DecodeReason, GistError, RemoteReason};
pub use gist::{
    fetch_by_user, ClientBuilder, ClientConfig, Gist, GistClient, GistFiles, GistMetadata, Gists,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
