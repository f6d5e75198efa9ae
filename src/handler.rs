//! Model handler trait - type-specific deploy, host derivation and validation
//!
//! One handler is registered per concrete definition type. Handlers hold no
//! per-deployment state: everything they need arrives through the host, the
//! definition and the context passed to each call.

use crate::config::ProvisionConfig;
use crate::definition::{Definition, DefinitionType};
use crate::error::Result;
use crate::events::{ModelEvent, ModelEventListener, ModelEventType};
use crate::host::{ModelHost, ModelObject};
use crate::model::{ModelNode, NodePath};
use crate::mutation::SafeMutation;
use assertion::ValidationResult;

/// Deploys and validates instances of one definition type
///
/// # Example
///
/// ```ignore
/// impl ModelHandler for ListHandler {
///     fn target_object_type(&self) -> &'static str { "List" }
///
///     fn deploy_model(
///         &self,
///         ctx: &mut DeployContext<'_>,
///         host: &ModelHost,
///         definition: &dyn Definition,
///     ) -> Result<Option<ModelObject>> {
///         let web = host.downcast_ref::<WebHost>()?;
///         let def = definition.expect::<ListDefinition>()?;
///         let list = web.ensure_list(def)?;
///         Ok(Some(ModelObject::new(list)))
///     }
///
///     fn derive_child_host(&self, host: &ModelHost, _definition: &dyn Definition,
///         object: Option<&ModelObject>, child_type: DefinitionType) -> Result<ModelHost> {
///         // a list exposes both its items and its root folder
///         ...
///     }
///
///     fn validate(&self, host: &ModelHost, definition: &dyn Definition,
///         results: &mut Vec<ValidationResult>) -> Result<Option<ModelObject>> {
///         ...
///     }
/// }
/// ```
pub trait ModelHandler {
    /// Remote object type this handler produces (reported in events)
    fn target_object_type(&self) -> &'static str;

    /// Create or update the remote artifact for `definition` under `host`
    ///
    /// Must be idempotent: re-running against an already deployed definition
    /// updates in place. Returns the resulting remote object, if any.
    fn deploy_model(
        &self,
        ctx: &mut DeployContext<'_>,
        host: &ModelHost,
        definition: &dyn Definition,
    ) -> Result<Option<ModelObject>>;

    /// Produce the host a child of type `child_type` is deployed under
    ///
    /// `object` is the object just deployed (or observed, during validation).
    /// A handler may reuse it, load a different aspect of it, or pick among
    /// several host shapes depending on `child_type`.
    fn derive_child_host(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        object: Option<&ModelObject>,
        child_type: DefinitionType,
    ) -> Result<ModelHost>;

    /// Flush pending changes once a child subtree has been deployed
    ///
    /// Called during deployment only, never during validation.
    fn commit_child_host(&self, _child_host: ModelHost, _child_type: DefinitionType) -> Result<()> {
        Ok(())
    }

    /// Compare `definition` against the live object, appending results
    ///
    /// Returns the observed object so children can derive their hosts.
    fn validate(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<Option<ModelObject>>;

    /// Lint the definition itself before any remote call
    fn check_definition(
        &self,
        _definition: &dyn Definition,
        _results: &mut Vec<ValidationResult>,
    ) -> Result<()> {
        Ok(())
    }
}

/// Context passed to [`ModelHandler::deploy_model`]
pub struct DeployContext<'a> {
    pub(crate) node: &'a ModelNode,
    pub(crate) model: &'a ModelNode,
    pub(crate) path: &'a NodePath,
    pub(crate) host: &'a ModelHost,
    pub(crate) events: &'a mut dyn ModelEventListener,
    pub(crate) config: &'a ProvisionConfig,
}

impl<'a> DeployContext<'a> {
    pub fn new(
        node: &'a ModelNode,
        model: &'a ModelNode,
        path: &'a NodePath,
        host: &'a ModelHost,
        events: &'a mut dyn ModelEventListener,
        config: &'a ProvisionConfig,
    ) -> Self {
        Self {
            node,
            model,
            path,
            host,
            events,
            config,
        }
    }

    /// Path of the node being deployed
    pub fn path(&self) -> &NodePath {
        self.path
    }

    pub fn node(&self) -> &ModelNode {
        self.node
    }

    pub fn config(&self) -> &ProvisionConfig {
        self.config
    }

    /// Coordinator configured with this run's mutation options
    pub fn safe_mutation(&self) -> SafeMutation {
        SafeMutation::new(self.config.mutation.clone())
    }

    /// Emit a lifecycle event for the current node
    pub fn emit(
        &mut self,
        event_type: ModelEventType,
        object: Option<&ModelObject>,
        object_type: &'static str,
    ) {
        let event = ModelEvent {
            event_type,
            current_node: self.node,
            model: self.model,
            path: self.path,
            object,
            object_type,
            definition: self.node.definition(),
            host: self.host,
        };
        if self.config.deploy.trace_events {
            log::debug!("{} {} ({})", event.event_type, event.path, object_type);
        } else {
            log::trace!("{} {} ({})", event.event_type, event.path, object_type);
        }
        self.events.on_event(&event);
    }
}
