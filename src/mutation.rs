//! Safe-mutation coordinator for lock-, version- and moderation-aware writes
//!
//! Remote content systems tie "can this be written" to a checkout state
//! machine. [`SafeMutation`] sequences the state transitions around a
//! caller-supplied mutation:
//!
//! 1. load container settings and the resource's lock state
//! 2. undo an existing checkout
//! 3. unpublish a published resource (minor versions only)
//! 4. check the resource out
//! 5. run the mutation
//! 6. run the creation callback, if the result exists
//! 7. check the result in
//! 8. publish (minor versions only)
//! 9. approve (moderation only)

use crate::config::MutationOptions;
use crate::error::Result;
use crate::remote::RemoteClient;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CheckOutType {
    #[default]
    None,
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PublishLevel {
    Published,
    #[default]
    Draft,
    Checkout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInType {
    Minor,
    #[default]
    Major,
    Overwrite,
}

/// Lock and publishing flags of one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockState {
    pub exists: bool,
    pub check_out: CheckOutType,
    pub level: PublishLevel,
}

impl LockState {
    /// Field that must be loaded before anything else
    pub const EXISTS: &'static str = "Exists";

    /// Fields only loadable on an existing resource
    pub const FIELDS: [&'static str; 3] = ["CheckOutType", "CheckedOutByUser", "Level"];

    pub fn is_checked_out(&self) -> bool {
        self.exists && self.check_out != CheckOutType::None
    }

    pub fn is_published(&self) -> bool {
        self.exists && self.level == PublishLevel::Published
    }
}

/// Versioning flags of the container holding a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerSettings {
    pub minor_versions: bool,
    pub moderation: bool,
}

impl ContainerSettings {
    pub const FIELDS: [&'static str; 2] = ["EnableMinorVersions", "EnableModeration"];
}

/// Remote client that understands checkout, publishing and approval
///
/// The read methods report fields previously fetched with
/// [`RemoteClient::load`]. The write methods queue an operation that runs on
/// the next [`RemoteClient::execute_pending`].
pub trait VersionedClient: RemoteClient {
    fn container_settings(&self, container: &Self::Object) -> Result<ContainerSettings>;
    fn lock_state(&self, resource: &Self::Object) -> Result<LockState>;

    fn undo_check_out(&mut self, resource: &Self::Object) -> Result<()>;
    fn unpublish(&mut self, resource: &Self::Object, comment: &str) -> Result<()>;
    fn check_out(&mut self, resource: &Self::Object) -> Result<()>;
    fn check_in(
        &mut self,
        resource: &Self::Object,
        comment: &str,
        check_in: CheckInType,
    ) -> Result<()>;
    fn publish(&mut self, resource: &Self::Object, comment: &str) -> Result<()>;
    fn approve(&mut self, resource: &Self::Object, comment: &str) -> Result<()>;
}

/// Runs a mutation inside the checkout / publish / approve protocol
#[derive(Debug, Clone, Default)]
pub struct SafeMutation {
    options: MutationOptions,
}

impl SafeMutation {
    pub fn new(options: MutationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MutationOptions {
        &self.options
    }

    /// Mutate `resource` (which may not exist yet) inside `container`
    pub fn run<C, F>(
        &self,
        client: &mut C,
        container: &C::Object,
        resource: Option<&C::Object>,
        mutate: F,
    ) -> Result<C::Object>
    where
        C: VersionedClient,
        F: FnOnce(&mut C, Option<&C::Object>) -> Result<C::Object>,
    {
        self.run_with_created(client, container, resource, mutate, |_, _| Ok(()))
    }

    /// Like [`run`](Self::run), resolving both objects by path first
    pub fn run_at<C, F>(
        &self,
        client: &mut C,
        container_path: &str,
        resource_path: &str,
        mutate: F,
    ) -> Result<C::Object>
    where
        C: VersionedClient,
        F: FnOnce(&mut C, Option<&C::Object>) -> Result<C::Object>,
    {
        let container = client.get_object(container_path)?;
        let resource = client.get_object(resource_path)?;
        self.run(client, &container, Some(&resource), mutate)
    }

    /// Like [`run`](Self::run), calling `on_created` once the result exists
    ///
    /// `on_created` runs before check-in, publish and approve.
    pub fn run_with_created<C, F, G>(
        &self,
        client: &mut C,
        container: &C::Object,
        resource: Option<&C::Object>,
        mutate: F,
        on_created: G,
    ) -> Result<C::Object>
    where
        C: VersionedClient,
        F: FnOnce(&mut C, Option<&C::Object>) -> Result<C::Object>,
        G: FnOnce(&mut C, &C::Object) -> Result<()>,
    {
        let comment = self.options.comment.as_str();

        client.load_now(container, &ContainerSettings::FIELDS)?;
        let settings = client.container_settings(container)?;

        let mut state = match resource {
            Some(resource) => load_lock_state(client, resource)?,
            None => LockState::default(),
        };
        log::debug!("Safe mutation: container {settings:?}, resource {state:?}");

        if let Some(resource) = resource {
            if state.is_checked_out() {
                log::debug!("Undoing existing checkout");
                client.undo_check_out(resource)?;
                state.check_out = CheckOutType::None;
            }

            if settings.minor_versions && state.is_published() {
                log::debug!("Unpublishing before update");
                client.unpublish(resource, comment)?;
                state.level = PublishLevel::Draft;
            }

            if state.exists && !state.is_checked_out() {
                log::debug!("Checking out");
                client.check_out(resource)?;
            }
        }
        client.execute_pending()?;

        let result = mutate(client, resource)?;
        client.execute_pending()?;

        client.load_now(&result, &[LockState::EXISTS])?;
        let mut result_state = client.lock_state(&result)?;

        if result_state.exists {
            on_created(client, &result)?;
            client.load_now(&result, &["CheckOutType", "Level"])?;
            result_state = client.lock_state(&result)?;
        }

        if result_state.is_checked_out() {
            log::debug!("Checking in ({:?})", self.options.check_in);
            client.check_in(&result, comment, self.options.check_in)?;
        }
        if settings.minor_versions {
            log::debug!("Publishing");
            client.publish(&result, comment)?;
        }
        if settings.moderation {
            log::debug!("Approving");
            client.approve(&result, comment)?;
        }
        client.execute_pending()?;

        Ok(result)
    }
}

/// `Exists` first, the remaining flags only for an existing resource
fn load_lock_state<C: VersionedClient>(client: &mut C, resource: &C::Object) -> Result<LockState> {
    client.load_now(resource, &[LockState::EXISTS])?;
    let state = client.lock_state(resource)?;
    if !state.exists {
        return Ok(state);
    }
    client.load_now(resource, &LockState::FIELDS)?;
    client.lock_state(resource)
}
