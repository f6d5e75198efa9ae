//! Traversal service - deploys, validates and lints a model tree
//!
//! For each node the service resolves the handler for the node's exact
//! definition type, lets it deploy (or validate) the node, then asks it for
//! the host each child runs under and recurses into the children in declared
//! order. Siblings never run concurrently: a later sibling may depend on
//! remote state an earlier one established.
//!
//! The first error aborts the run. It is attributed once to the node where
//! it happened, and never retried here.

use crate::config::ProvisionConfig;
use crate::definition::{DefinitionType, describe};
use crate::error::Result;
use crate::events::{ModelEventListener, ModelEventType};
use crate::handler::{DeployContext, ModelHandler};
use crate::host::ModelHost;
use crate::model::{ModelNode, NodePath};
use crate::registry::HandlerRegistry;
use crate::report::{DeploymentSummary, NodeReport, ValidationReport};
use assertion::ValidationResult;

/// Runs model trees against the handlers of one registry
#[derive(Debug)]
pub struct ProvisionService<'r> {
    registry: &'r HandlerRegistry,
    config: ProvisionConfig,
}

impl<'r> ProvisionService<'r> {
    pub fn new(registry: &'r HandlerRegistry, config: ProvisionConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    /// Deploy `model` under `host`, reporting lifecycle events to `events`
    pub fn deploy(
        &self,
        host: ModelHost,
        model: &ModelNode,
        events: &mut dyn ModelEventListener,
    ) -> Result<DeploymentSummary> {
        let path = root_path(model);
        log::debug!("Deploying {} nodes from {path}", model.len());

        let mut run = Deployment {
            service: self,
            model,
            root_type: model.definition().definition_type(),
            events,
            summary: DeploymentSummary::start(),
        };
        run.deploy_node(model, Placement::under_host(Some(&host)), &host, &path)?;

        let mut summary = run.summary;
        summary.finish();
        log::debug!("Deployed {} nodes in {}", summary.total(), summary.duration());
        Ok(summary)
    }

    /// Compare `model` against the remote state under `host`
    ///
    /// Emits no events and commits nothing.
    pub fn validate(&self, host: ModelHost, model: &ModelNode) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();
        self.validate_node(model, &host, &root_path(model), &mut report)?;
        log::debug!(
            "Validated {} nodes: {} failures",
            report.nodes.len(),
            report.failure_count()
        );
        Ok(report)
    }

    /// Lint `model` without touching the remote system
    ///
    /// Runs each handler's definition checks and records host placement
    /// violations as failing results. Without a host, the root node's own
    /// placement is not known and only its descendants are checked.
    pub fn check_model(&self, model: &ModelNode) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();
        let root_type = model.definition().definition_type();
        let placement = Placement::under_host(None);
        self.check_node(model, placement, root_type, &root_path(model), &mut report)?;
        Ok(report)
    }

    fn handler_for(
        &self,
        definition_type: DefinitionType,
        path: &NodePath,
    ) -> Result<&dyn ModelHandler> {
        self.registry
            .resolve(definition_type)
            .map_err(|e| e.at(path))
    }

    fn check_placement(&self, definition_type: DefinitionType, placement: Placement) -> Result<()> {
        match self.registry.constraints(definition_type) {
            Some(constraints) => {
                constraints.check(definition_type, placement.parent, placement.root)
            }
            None => Ok(()),
        }
    }

    fn validate_node(
        &self,
        node: &ModelNode,
        host: &ModelHost,
        path: &NodePath,
        report: &mut ValidationReport,
    ) -> Result<()> {
        let definition = node.definition();
        let definition_type = definition.definition_type();
        let handler = self.handler_for(definition_type, path)?;

        let mut results = Vec::new();
        let object = handler
            .validate(host, definition, &mut results)
            .map_err(|e| e.at(path))?;
        report.nodes.push(NodeReport {
            path: path.clone(),
            definition_type: definition_type.name(),
            results,
        });

        for (index, child) in node.children().iter().enumerate() {
            let child_type = child.definition().definition_type();
            let child_host = handler
                .derive_child_host(host, definition, object.as_ref(), child_type)
                .map_err(|e| e.at(path))?;
            let child_path = path.child(child_type.name(), index);
            self.validate_node(child, &child_host, &child_path, report)?;
        }
        Ok(())
    }

    fn check_node(
        &self,
        node: &ModelNode,
        placement: Placement,
        root_type: DefinitionType,
        path: &NodePath,
        report: &mut ValidationReport,
    ) -> Result<()> {
        let definition = node.definition();
        let definition_type = definition.definition_type();
        let handler = self.handler_for(definition_type, path)?;

        let mut results = Vec::new();
        if let Err(err) = self.check_placement(definition_type, placement) {
            results.push(ValidationResult::invalid(err.to_string()));
        }
        handler
            .check_definition(definition, &mut results)
            .map_err(|e| e.at(path))?;
        report.nodes.push(NodeReport {
            path: path.clone(),
            definition_type: definition_type.name(),
            results,
        });

        for (index, child) in node.children().iter().enumerate() {
            let child_type = child.definition().definition_type();
            let child_path = path.child(child_type.name(), index);
            let placement = Placement::child(root_type, definition_type);
            self.check_node(child, placement, root_type, &child_path, report)?;
        }
        Ok(())
    }
}

fn root_path(model: &ModelNode) -> NodePath {
    NodePath::root(model.definition().definition_type().name())
}

/// Parent and root a node is placed under
///
/// The tree's root node sits directly under the incoming host, so both come
/// from the definition type that host declares. Every other node sits under
/// its parent node in a tree rooted at the model's root.
#[derive(Debug, Clone, Copy)]
struct Placement {
    parent: Option<DefinitionType>,
    root: Option<DefinitionType>,
}

impl Placement {
    fn under_host(host: Option<&ModelHost>) -> Self {
        let declared = host.and_then(ModelHost::definition_type);
        Self {
            parent: declared,
            root: declared,
        }
    }

    fn child(root: DefinitionType, parent: DefinitionType) -> Self {
        Self {
            parent: Some(parent),
            root: Some(root),
        }
    }
}

/// State of one deployment run
struct Deployment<'s, 'm> {
    service: &'s ProvisionService<'s>,
    model: &'m ModelNode,
    root_type: DefinitionType,
    events: &'m mut dyn ModelEventListener,
    summary: DeploymentSummary,
}

impl Deployment<'_, '_> {
    fn deploy_node(
        &mut self,
        node: &ModelNode,
        placement: Placement,
        host: &ModelHost,
        path: &NodePath,
    ) -> Result<()> {
        let definition = node.definition();
        let definition_type = definition.definition_type();
        let service = self.service;
        let handler = service.handler_for(definition_type, path)?;

        if let Err(err) = service.check_placement(definition_type, placement) {
            if service.config.deploy.enforce_host_constraints {
                return Err(err.at(path));
            }
            log::warn!("{path}: {err}");
        }

        log::debug!("Deploying {path}: {}", describe(definition));
        let object_type = handler.target_object_type();
        let object = {
            let mut ctx = DeployContext::new(
                node,
                self.model,
                path,
                host,
                &mut *self.events,
                &service.config,
            );
            ctx.emit(ModelEventType::OnProvisioning, None, object_type);
            let object = handler
                .deploy_model(&mut ctx, host, definition)
                .map_err(|e| e.at(path))?;
            ctx.emit(ModelEventType::OnProvisioned, object.as_ref(), object_type);
            object
        };
        self.summary.record(path, definition_type);

        for (index, child) in node.children().iter().enumerate() {
            let child_type = child.definition().definition_type();
            let child_path = path.child(child_type.name(), index);
            let child_host = handler
                .derive_child_host(host, definition, object.as_ref(), child_type)
                .map_err(|e| e.at(path))?;

            let placement = Placement::child(self.root_type, definition_type);
            self.deploy_node(child, placement, &child_host, &child_path)?;

            handler
                .commit_child_host(child_host, child_type)
                .map_err(|e| e.at(path))?;
        }
        Ok(())
    }
}
