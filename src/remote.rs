//! Narrow surface of the remote system client
//!
//! The engine never talks to the remote system directly. Handlers and the
//! safe-mutation coordinator go through this trait, and every failure it
//! reports is propagated unchanged (normally as
//! [`Error::RemoteOperationFailed`](crate::Error::RemoteOperationFailed)).
//!
//! Calls follow a request-batching model: `load` and the mutating calls of
//! [`VersionedClient`](crate::mutation::VersionedClient) queue work, and
//! `execute_pending` sends it and blocks until the remote acknowledges.

use crate::error::Result;

pub trait RemoteClient {
    /// Client-side reference to a remote object
    type Object: Clone;

    /// Reference to the object at `path`
    ///
    /// The reference is valid even if nothing exists at `path` yet; load its
    /// `Exists` field to find out.
    fn get_object(&mut self, path: &str) -> Result<Self::Object>;

    /// Queue a refresh of the named fields on `object`
    fn load(&mut self, object: &Self::Object, fields: &[&str]) -> Result<()>;

    /// Send all queued loads and operations
    fn execute_pending(&mut self) -> Result<()>;

    /// Load `fields` and execute immediately
    fn load_now(&mut self, object: &Self::Object, fields: &[&str]) -> Result<()> {
        self.load(object, fields)?;
        self.execute_pending()
    }
}
