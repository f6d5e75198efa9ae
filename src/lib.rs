//! # Provision
//!
//! Declarative provisioning engine.
//!
//! A caller describes the desired state of a remote content system as a tree
//! of typed definitions. The engine walks the tree in declared order and hands
//! each node to the handler registered for its exact definition type. Each
//! handler deploys (or validates) its node and derives the host that the
//! node's children run under.
//!
//! ## Core Concepts
//!
//! - **Definition**: immutable desired state of one remote artifact
//! - **ModelNode**: a definition plus its ordered children
//! - **ModelHost**: opaque context telling a handler where to operate
//! - **ModelHandler**: deploy, host derivation and validation for one type
//! - **HandlerRegistry**: explicit exact-type mapping to handlers
//! - **ProvisionService**: the traversal (deploy / validate / check)
//! - **SafeMutation**: checkout / publish / approve sequencing around writes
//!
//! Property comparison and definition linting come from the `assertion`
//! crate and are re-exported here.
//!
//! ## Example
//!
//! ```ignore
//! let mut registry = HandlerRegistry::new();
//! registry.register_for::<WebDefinition>(WebHandler);
//! registry.register_for::<ListDefinition>(ListHandler);
//!
//! let mut web = ModelNode::new(WebDefinition::new("Intranet", "intranet"));
//! web.add_child(ListDefinition::new("Docs", "Lists/Docs"));
//!
//! let service = ProvisionService::new(&registry, ProvisionConfig::default());
//! service.deploy(ModelHost::new(site), &web, &mut NoEvents)?;
//! let report = service.validate(ModelHost::new(site), &web)?;
//! assert!(report.is_valid());
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod events;
pub mod handler;
pub mod host;
pub mod model;
pub mod mutation;
pub mod registry;
pub mod remote;
pub mod report;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::{DeployOptions, MutationOptions, ProvisionConfig};
pub use definition::{Definition, DefinitionType, describe};
pub use error::{Error, ErrorCategory, Result};
pub use events::{ModelEvent, ModelEventListener, ModelEventType, NoEvents};
pub use handler::{DeployContext, ModelHandler};
pub use host::{ModelHost, ModelObject};
pub use model::{ModelNode, NodePath};
pub use mutation::{SafeMutation, VersionedClient};
pub use registry::{HandlerRegistry, HostConstraints};
pub use remote::RemoteClient;
pub use report::{DeploymentSummary, NodeReport, ValidationReport, display_report};
pub use service::ProvisionService;

pub use assertion::{
    Assert, Checks, Inspect, Prop, PropertyValue, RuleContext, ValidationResult, Value, prop,
};
