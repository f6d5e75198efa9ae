//! Lifecycle events emitted around each node's deployment
//!
//! The traversal emits `OnProvisioning` before and `OnProvisioned` after a
//! handler deploys a node. Handlers may emit `OnUpdating`/`OnUpdated` around
//! their own remote updates through [`DeployContext::emit`].
//!
//! Listeners observe events; they cannot block or cancel deployment.
//!
//! [`DeployContext::emit`]: crate::handler::DeployContext::emit

use crate::definition::Definition;
use crate::host::{ModelHost, ModelObject};
use crate::model::{ModelNode, NodePath};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelEventType {
    OnProvisioning,
    OnProvisioned,
    OnUpdating,
    OnUpdated,
}

impl fmt::Display for ModelEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OnProvisioning => "OnProvisioning",
            Self::OnProvisioned => "OnProvisioned",
            Self::OnUpdating => "OnUpdating",
            Self::OnUpdated => "OnUpdated",
        };
        f.write_str(name)
    }
}

/// One lifecycle event
#[derive(Debug, Clone, Copy)]
pub struct ModelEvent<'a> {
    pub event_type: ModelEventType,
    /// Node being deployed
    pub current_node: &'a ModelNode,
    /// Root of the tree being deployed
    pub model: &'a ModelNode,
    pub path: &'a NodePath,
    /// Remote object, when it exists
    pub object: Option<&'a ModelObject>,
    /// Remote object type the handler targets
    pub object_type: &'static str,
    pub definition: &'a dyn Definition,
    pub host: &'a ModelHost,
}

/// Receives lifecycle events
pub trait ModelEventListener {
    fn on_event(&mut self, event: &ModelEvent<'_>);
}

impl<F> ModelEventListener for F
where
    F: FnMut(&ModelEvent<'_>),
{
    fn on_event(&mut self, event: &ModelEvent<'_>) {
        self(event);
    }
}

/// Listener that ignores every event
pub struct NoEvents;

impl ModelEventListener for NoEvents {
    fn on_event(&mut self, _event: &ModelEvent<'_>) {}
}
