//! In-memory content store, definitions and handlers shared by the tests

use crate::definition::{Definition, DefinitionType};
use crate::error::{Error, Result};
use crate::events::ModelEventType;
use crate::handler::{DeployContext, ModelHandler};
use crate::host::{ModelHost, ModelObject};
use crate::mutation::{
    CheckInType, CheckOutType, ContainerSettings, LockState, PublishLevel, VersionedClient,
};
use crate::registry::HandlerRegistry;
use crate::remote::RemoteClient;
use assertion::{Assert, Checks, Inspect, Prop, ValidationResult, Value, prop, short_type_name};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

pub const SITE_URL: &str = "/sites/intranet";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Definitions
// ============================================================================

#[derive(Debug, Clone)]
pub struct SiteDefinition {
    pub url: String,
}

impl SiteDefinition {
    pub fn new(url: &str) -> Self {
        Self { url: url.into() }
    }
}

impl Inspect for SiteDefinition {
    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![("Url", self.url.clone().into())]
    }
}

impl Definition for SiteDefinition {}

#[derive(Debug, Clone)]
pub struct WebDefinition {
    pub title: String,
    pub url: String,
}

impl WebDefinition {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

impl Inspect for WebDefinition {
    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Title", self.title.clone().into()),
            ("Url", self.url.clone().into()),
        ]
    }
}

impl Definition for WebDefinition {}

#[derive(Debug, Clone)]
pub struct ListDefinition {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub template_type: i32,
    pub template_name: Option<String>,
    pub enable_minor_versions: bool,
    pub enable_moderation: bool,
}

impl ListDefinition {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: None,
            template_type: 101,
            template_name: None,
            enable_minor_versions: false,
            enable_moderation: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_versioning(mut self, minor_versions: bool, moderation: bool) -> Self {
        self.enable_minor_versions = minor_versions;
        self.enable_moderation = moderation;
        self
    }
}

impl Inspect for ListDefinition {
    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Title", self.title.clone().into()),
            ("Url", self.url.clone().into()),
            ("Description", self.description.clone().into()),
            ("TemplateType", self.template_type.into()),
            ("TemplateName", self.template_name.clone().into()),
        ]
    }
}

impl Definition for ListDefinition {}

#[derive(Debug, Clone)]
pub struct ModuleFileDefinition {
    /// Library url relative to the web
    pub library: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

impl ModuleFileDefinition {
    pub fn new(library: &str, file_name: &str, content: &str) -> Self {
        Self {
            library: library.into(),
            file_name: file_name.into(),
            content: content.as_bytes().to_vec(),
        }
    }
}

impl Inspect for ModuleFileDefinition {
    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Library", self.library.clone().into()),
            ("FileName", self.file_name.clone().into()),
            ("Content", format!("{} bytes", self.content.len()).into()),
        ]
    }
}

impl Definition for ModuleFileDefinition {}

#[derive(Debug, Clone)]
pub struct ListItemFieldValueDefinition {
    pub field_name: String,
    pub value: String,
}

impl ListItemFieldValueDefinition {
    pub fn new(field_name: &str, value: &str) -> Self {
        Self {
            field_name: field_name.into(),
            value: value.into(),
        }
    }
}

impl Inspect for ListItemFieldValueDefinition {
    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("FieldName", self.field_name.clone().into()),
            ("Value", self.value.clone().into()),
        ]
    }
}

impl Definition for ListItemFieldValueDefinition {}

#[derive(Debug, Clone)]
pub struct PropertyDefinition {
    pub key: String,
    pub value: String,
}

impl PropertyDefinition {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Inspect for PropertyDefinition {
    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Key", self.key.clone().into()),
            ("Value", self.value.clone().into()),
        ]
    }
}

impl Definition for PropertyDefinition {}

/// Makes a page of the web's Pages library its welcome page
#[derive(Debug, Clone)]
pub struct WelcomePageDefinition {
    pub page: String,
}

impl WelcomePageDefinition {
    pub fn new(page: &str) -> Self {
        Self { page: page.into() }
    }
}

impl Inspect for WelcomePageDefinition {
    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![("Page", self.page.clone().into())]
    }
}

impl Definition for WelcomePageDefinition {}

#[derive(Debug, Clone, Default)]
pub struct BaseDefinition {
    pub title: String,
}

impl Inspect for BaseDefinition {
    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![("Title", self.title.clone().into())]
    }
}

impl Definition for BaseDefinition {}

/// Extends [`BaseDefinition`] with one more property
#[derive(Debug, Clone, Default)]
pub struct DerivedDefinition {
    pub base: BaseDefinition,
    pub extra: String,
}

impl Inspect for DerivedDefinition {
    fn properties(&self) -> Vec<(&'static str, Value)> {
        let mut props = self.base.properties();
        props.push(("Extra", self.extra.clone().into()));
        props
    }
}

impl Definition for DerivedDefinition {}

// ============================================================================
// Memory store
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct StoredWeb {
    pub title: String,
    pub welcome_page: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StoredList {
    pub title: String,
    pub description: String,
    pub template_type: i32,
    pub root_folder_url: String,
    pub settings: ContainerSettings,
}

#[derive(Debug, Clone, Default)]
pub struct StoredFile {
    pub content: Vec<u8>,
    pub check_out: CheckOutType,
    pub level: PublishLevel,
    pub approved: bool,
    pub last_comment: Option<String>,
    pub last_check_in: Option<CheckInType>,
    pub fields: BTreeMap<String, String>,
    pub properties: BTreeMap<String, String>,
}

/// In-memory remote system; objects are referenced by server-relative url
#[derive(Debug, Default)]
pub struct MemoryStore {
    sites: BTreeSet<String>,
    webs: BTreeMap<String, StoredWeb>,
    lists: BTreeMap<String, StoredList>,
    files: BTreeMap<String, StoredFile>,
    containers: BTreeMap<String, ContainerSettings>,
    loaded: BTreeMap<String, BTreeSet<String>>,
    load_log: Vec<(String, String)>,
    operations: Vec<String>,
    executed: usize,
    commits: usize,
    reject_commits: bool,
}

pub type SharedStore = Rc<RefCell<MemoryStore>>;

/// Store holding an empty site at [`SITE_URL`]
pub fn store() -> SharedStore {
    let mut store = MemoryStore::default();
    store.sites.insert(SITE_URL.to_string());
    Rc::new(RefCell::new(store))
}

pub fn site_host(store: &SharedStore) -> ModelHost {
    ModelHost::new(SiteHost {
        store: Rc::clone(store),
        url: SITE_URL.to_string(),
    })
    .representing::<SiteDefinition>()
}

fn not_found(operation: &str, url: &str) -> Error {
    Error::remote(operation, format!("no object at {url}"))
}

impl MemoryStore {
    pub fn add_container(&mut self, url: &str, settings: ContainerSettings) {
        self.containers.insert(url.to_string(), settings);
    }

    pub fn insert_file(&mut self, url: &str, file: StoredFile) {
        self.files.insert(url.to_string(), file);
    }

    /// Create or overwrite file content, keeping its lock state
    pub fn write_file(&mut self, url: &str, content: &[u8]) {
        self.files.entry(url.to_string()).or_default().content = content.to_vec();
    }

    /// Record an operation in the log returned by [`operations`](Self::operations)
    pub fn record(&mut self, operation: &str) {
        self.operations.push(operation.to_string());
    }

    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    /// Fields loaded on `url`, in request order
    pub fn loads_for(&self, url: &str) -> Vec<String> {
        self.load_log
            .iter()
            .filter(|(object, _)| object == url)
            .map(|(_, field)| field.clone())
            .collect()
    }

    pub fn web(&self, url: &str) -> Option<&StoredWeb> {
        self.webs.get(url)
    }

    pub fn list(&self, url: &str) -> Option<&StoredList> {
        self.lists.get(url)
    }

    pub fn list_mut(&mut self, url: &str) -> Option<&mut StoredList> {
        self.lists.get_mut(url)
    }

    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    pub fn file(&self, url: &str) -> Option<&StoredFile> {
        self.files.get(url)
    }

    fn file_mut(&mut self, url: &str) -> Result<&mut StoredFile> {
        self.files
            .get_mut(url)
            .ok_or_else(|| not_found("GetFileByServerRelativeUrl", url))
    }

    /// Flush an item or property bag update
    pub fn commit(&mut self) -> Result<()> {
        if self.reject_commits {
            return Err(Error::remote("Update", "item update rejected"));
        }
        self.commits += 1;
        Ok(())
    }

    /// Make every following [`commit`](Self::commit) fail
    pub fn reject_commits(&mut self) {
        self.reject_commits = true;
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Number of round trips sent
    pub fn executed(&self) -> usize {
        self.executed
    }

    fn is_loaded(&self, url: &str, field: &str) -> bool {
        self.loaded.get(url).is_some_and(|fields| fields.contains(field))
    }
}

impl RemoteClient for MemoryStore {
    type Object = String;

    fn get_object(&mut self, path: &str) -> Result<String> {
        Ok(path.to_string())
    }

    fn load(&mut self, object: &String, fields: &[&str]) -> Result<()> {
        for field in fields {
            self.loaded
                .entry(object.clone())
                .or_default()
                .insert((*field).to_string());
            self.load_log.push((object.clone(), (*field).to_string()));
        }
        Ok(())
    }

    fn execute_pending(&mut self) -> Result<()> {
        self.executed += 1;
        Ok(())
    }
}

impl VersionedClient for MemoryStore {
    fn container_settings(&self, container: &String) -> Result<ContainerSettings> {
        if !self.is_loaded(container, ContainerSettings::FIELDS[0]) {
            return Err(Error::remote("EnableMinorVersions", "field not loaded"));
        }
        self.containers
            .get(container)
            .or_else(|| self.lists.get(container).map(|l| &l.settings))
            .copied()
            .ok_or_else(|| not_found("GetList", container))
    }

    fn lock_state(&self, resource: &String) -> Result<LockState> {
        if !self.is_loaded(resource, LockState::EXISTS) {
            return Err(Error::remote("Exists", "field not loaded"));
        }
        let Some(file) = self.files.get(resource) else {
            return Ok(LockState::default());
        };
        Ok(LockState {
            exists: true,
            check_out: if self.is_loaded(resource, "CheckOutType") {
                file.check_out
            } else {
                CheckOutType::None
            },
            level: if self.is_loaded(resource, "Level") {
                file.level
            } else {
                PublishLevel::Draft
            },
        })
    }

    fn undo_check_out(&mut self, resource: &String) -> Result<()> {
        self.record("undo_check_out");
        self.file_mut(resource)?.check_out = CheckOutType::None;
        Ok(())
    }

    fn unpublish(&mut self, resource: &String, comment: &str) -> Result<()> {
        self.record("unpublish");
        let file = self.file_mut(resource)?;
        file.level = PublishLevel::Draft;
        file.last_comment = Some(comment.to_string());
        Ok(())
    }

    fn check_out(&mut self, resource: &String) -> Result<()> {
        self.record("check_out");
        self.file_mut(resource)?.check_out = CheckOutType::Online;
        Ok(())
    }

    fn check_in(&mut self, resource: &String, comment: &str, check_in: CheckInType) -> Result<()> {
        self.record("check_in");
        let file = self.file_mut(resource)?;
        file.check_out = CheckOutType::None;
        file.last_comment = Some(comment.to_string());
        file.last_check_in = Some(check_in);
        Ok(())
    }

    fn publish(&mut self, resource: &String, comment: &str) -> Result<()> {
        self.record("publish");
        let file = self.file_mut(resource)?;
        file.level = PublishLevel::Published;
        file.last_comment = Some(comment.to_string());
        Ok(())
    }

    fn approve(&mut self, resource: &String, comment: &str) -> Result<()> {
        self.record("approve");
        let file = self.file_mut(resource)?;
        file.approved = true;
        file.last_comment = Some(comment.to_string());
        Ok(())
    }
}

// ============================================================================
// Hosts and remote objects
// ============================================================================

#[derive(Clone)]
pub struct SiteHost {
    pub store: SharedStore,
    pub url: String,
}

#[derive(Clone)]
pub struct WebHost {
    pub store: SharedStore,
    pub url: String,
}

/// Root folder of a web, where libraries live
#[derive(Clone)]
pub struct FolderHost {
    pub store: SharedStore,
    pub web_url: String,
}

/// Pages library of a web
#[derive(Clone)]
pub struct PagesHost {
    pub store: SharedStore,
    pub web_url: String,
    pub library_url: String,
}

#[derive(Clone)]
pub struct ListItemHost {
    pub store: SharedStore,
    pub file_url: String,
}

#[derive(Clone)]
pub struct PropertyHost {
    pub store: SharedStore,
    pub file_url: String,
}

#[derive(Debug, Clone)]
pub struct RemoteSite {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct RemoteWeb {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct RemoteList {
    pub title: String,
    pub description: String,
    pub template_type: i32,
    pub root_folder_url: String,
}

#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub url: String,
    pub content: Vec<u8>,
}

fn expect_object<T: 'static>(object: Option<&ModelObject>) -> Result<&T> {
    object
        .and_then(ModelObject::downcast_ref::<T>)
        .ok_or_else(|| Error::UnexpectedHost {
            expected: short_type_name::<T>(),
            actual: object.map_or("nothing", ModelObject::type_name),
        })
}

fn missing(kind: &str, url: &str) -> ValidationResult {
    ValidationResult::invalid(format!("{kind} [{url}] does not exist"))
}

/// Store and url of the web a node is deployed under
fn parent_web(host: &ModelHost) -> Result<(SharedStore, String)> {
    if let Ok(site) = host.downcast_ref::<SiteHost>() {
        return Ok((Rc::clone(&site.store), site.url.clone()));
    }
    let web = host.downcast_ref::<WebHost>()?;
    Ok((Rc::clone(&web.store), web.url.clone()))
}

// ============================================================================
// Handlers
// ============================================================================

pub struct SiteHandler;

impl ModelHandler for SiteHandler {
    fn target_object_type(&self) -> &'static str {
        "Site"
    }

    fn deploy_model(
        &self,
        _ctx: &mut DeployContext<'_>,
        host: &ModelHost,
        definition: &dyn Definition,
    ) -> Result<Option<ModelObject>> {
        let site_host = host.downcast_ref::<SiteHost>()?;
        let site = definition.expect::<SiteDefinition>()?;

        site_host.store.borrow_mut().sites.insert(site.url.clone());
        Ok(Some(ModelObject::new(RemoteSite {
            url: site.url.clone(),
        })))
    }

    fn derive_child_host(
        &self,
        host: &ModelHost,
        _definition: &dyn Definition,
        object: Option<&ModelObject>,
        child_type: DefinitionType,
    ) -> Result<ModelHost> {
        let site_host = host.downcast_ref::<SiteHost>()?;
        let site = expect_object::<RemoteSite>(object)?;
        let store = Rc::clone(&site_host.store);

        // sub webs hang off the site; everything else goes into its root web
        if child_type == DefinitionType::of::<WebDefinition>() {
            Ok(ModelHost::new(SiteHost {
                store,
                url: site.url.clone(),
            }))
        } else {
            Ok(ModelHost::new(WebHost {
                store,
                url: site.url.clone(),
            }))
        }
    }

    fn validate(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<Option<ModelObject>> {
        let site_host = host.downcast_ref::<SiteHost>()?;
        let site = definition.expect::<SiteDefinition>()?;

        if !site_host.store.borrow().sites.contains(&site.url) {
            results.push(missing("Site", &site.url));
            return Ok(None);
        }
        let remote = RemoteSite {
            url: site.url.clone(),
        };
        Assert::new(site, &remote, results)
            .should_be_equal(Prop::named("Url"), prop!(RemoteSite, url))?;
        Ok(Some(ModelObject::new(remote)))
    }
}

pub struct WebHandler;

impl WebHandler {
    fn web_url(host: &ModelHost, web: &WebDefinition) -> Result<(SharedStore, String)> {
        let (store, parent) = parent_web(host)?;
        Ok((store, format!("{parent}/{}", web.url)))
    }
}

impl ModelHandler for WebHandler {
    fn target_object_type(&self) -> &'static str {
        "Web"
    }

    fn deploy_model(
        &self,
        _ctx: &mut DeployContext<'_>,
        host: &ModelHost,
        definition: &dyn Definition,
    ) -> Result<Option<ModelObject>> {
        let web = definition.expect::<WebDefinition>()?;
        let (store, url) = Self::web_url(host, web)?;

        store
            .borrow_mut()
            .webs
            .entry(url.clone())
            .or_default()
            .title
            .clone_from(&web.title);
        Ok(Some(ModelObject::new(RemoteWeb {
            url,
            title: web.title.clone(),
        })))
    }

    fn derive_child_host(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        _object: Option<&ModelObject>,
        child_type: DefinitionType,
    ) -> Result<ModelHost> {
        let web = definition.expect::<WebDefinition>()?;
        let (store, url) = Self::web_url(host, web)?;

        if child_type == DefinitionType::of::<ModuleFileDefinition>() {
            Ok(ModelHost::new(FolderHost {
                store,
                web_url: url,
            }))
        } else if child_type == DefinitionType::of::<WelcomePageDefinition>() {
            // the Pages library comes from an earlier sibling
            let library_url = format!("{url}/Pages");
            if store.borrow().list(&library_url).is_none() {
                return Err(not_found("GetList", &library_url));
            }
            Ok(ModelHost::new(PagesHost {
                store,
                web_url: url,
                library_url,
            }))
        } else {
            Ok(ModelHost::new(WebHost { store, url }))
        }
    }

    fn validate(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<Option<ModelObject>> {
        let web = definition.expect::<WebDefinition>()?;
        let (store, url) = Self::web_url(host, web)?;

        let Some(stored) = store.borrow().web(&url).cloned() else {
            results.push(missing("Web", &url));
            return Ok(None);
        };
        let remote = RemoteWeb {
            url,
            title: stored.title,
        };
        Assert::new(web, &remote, results)
            .should_be_equal(prop!(WebDefinition, title), prop!(RemoteWeb, title))?
            .should_be_end_of(
                prop!(WebDefinition, url),
                |d| d.url.clone(),
                prop!(RemoteWeb, url),
                |w| w.url.clone(),
            )?;
        Ok(Some(ModelObject::new(remote)))
    }

    fn check_definition(
        &self,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<()> {
        let web = definition.expect::<WebDefinition>()?;
        Checks::new(web, results)
            .not_empty_string(prop!(WebDefinition, title))?
            .no_spaces_before_or_after(prop!(WebDefinition, title))?
            .no_slashes_before(prop!(WebDefinition, url))?;
        Ok(())
    }
}

pub struct ListHandler;

impl ListHandler {
    fn list_url(host: &ModelHost, list: &ListDefinition) -> Result<(SharedStore, String)> {
        let web = host.downcast_ref::<WebHost>()?;
        Ok((Rc::clone(&web.store), format!("{}/{}", web.url, list.url)))
    }
}

impl ModelHandler for ListHandler {
    fn target_object_type(&self) -> &'static str {
        "List"
    }

    fn deploy_model(
        &self,
        _ctx: &mut DeployContext<'_>,
        host: &ModelHost,
        definition: &dyn Definition,
    ) -> Result<Option<ModelObject>> {
        let list = definition.expect::<ListDefinition>()?;
        let (store, url) = Self::list_url(host, list)?;

        let mut store = store.borrow_mut();
        let stored = store.lists.entry(url.clone()).or_default();
        stored.title.clone_from(&list.title);
        stored.description = list.description.clone().unwrap_or_default();
        stored.template_type = list.template_type;
        stored.root_folder_url = url;
        stored.settings = ContainerSettings {
            minor_versions: list.enable_minor_versions,
            moderation: list.enable_moderation,
        };

        Ok(Some(ModelObject::new(RemoteList {
            title: stored.title.clone(),
            description: stored.description.clone(),
            template_type: stored.template_type,
            root_folder_url: stored.root_folder_url.clone(),
        })))
    }

    fn derive_child_host(
        &self,
        _host: &ModelHost,
        _definition: &dyn Definition,
        object: Option<&ModelObject>,
        _child_type: DefinitionType,
    ) -> Result<ModelHost> {
        match object {
            Some(list) if list.downcast_ref::<RemoteList>().is_some() => {
                Ok(ModelHost::from_object(list))
            }
            _ => Err(Error::UnexpectedHost {
                expected: "RemoteList",
                actual: object.map_or("nothing", ModelObject::type_name),
            }),
        }
    }

    fn validate(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<Option<ModelObject>> {
        let list = definition.expect::<ListDefinition>()?;
        let (store, url) = Self::list_url(host, list)?;

        let Some(stored) = store.borrow().list(&url).cloned() else {
            results.push(missing("List", &url));
            return Ok(None);
        };
        let remote = RemoteList {
            title: stored.title,
            description: stored.description,
            template_type: stored.template_type,
            root_folder_url: stored.root_folder_url,
        };

        let mut assert = Assert::new(list, &remote, results);
        assert
            .should_be_equal(Prop::named("Title"), prop!(RemoteList, title))?
            .should_be_end_of(
                Prop::named("Url"),
                |d| d.url.clone(),
                prop!(RemoteList, root_folder_url),
                |l| l.root_folder_url.clone(),
            )?;

        if list.description.is_some() {
            assert.should_be_equal(Prop::named("Description"), prop!(RemoteList, description))?;
        } else {
            assert.skip_property(Prop::named("Description"), "Description is not set")?;
        }

        if list.template_name.is_some() {
            assert.should_be_valid(|ctx, d, _| {
                let src = Prop::named("TemplateName").resolve(d)?;
                Ok(ValidationResult::valid(format!(
                    "Template of [{}] resolved by name when deployed",
                    ctx.object_type
                ))
                .with_src(src))
            })?;
        } else {
            assert
                .should_be_equal(Prop::named("TemplateType"), prop!(RemoteList, template_type))?
                .skip_property(Prop::named("TemplateName"), "TemplateType is used")?;
        }

        Ok(Some(ModelObject::new(remote)))
    }

    fn check_definition(
        &self,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<()> {
        let list = definition.expect::<ListDefinition>()?;
        Checks::new(list, results)
            .no_more_than(Prop::named("Title"), 255)?
            .no_spaces_before_or_after(Prop::named("Title"))?
            .no_slashes_before(Prop::named("Url"))?;
        Ok(())
    }
}

pub struct ModuleFileHandler;

impl ModuleFileHandler {
    fn urls(folder: &FolderHost, file: &ModuleFileDefinition) -> (String, String) {
        let library = format!("{}/{}", folder.web_url, file.library);
        let url = format!("{library}/{}", file.file_name);
        (library, url)
    }
}

impl ModelHandler for ModuleFileHandler {
    fn target_object_type(&self) -> &'static str {
        "File"
    }

    fn deploy_model(
        &self,
        ctx: &mut DeployContext<'_>,
        host: &ModelHost,
        definition: &dyn Definition,
    ) -> Result<Option<ModelObject>> {
        let folder = host.downcast_ref::<FolderHost>()?;
        let file = definition.expect::<ModuleFileDefinition>()?;
        let (library, url) = Self::urls(folder, file);

        let mut store = folder.store.borrow_mut();
        if store.list(&library).is_none() {
            return Err(not_found("GetFolderByServerRelativeUrl", &library));
        }

        let existing = store.file(&url).map(|f| {
            ModelObject::new(RemoteFile {
                url: url.clone(),
                content: f.content.clone(),
            })
        });
        ctx.emit(ModelEventType::OnUpdating, existing.as_ref(), "File");

        let mutation = ctx.safe_mutation();
        mutation.run_at(&mut *store, &library, &url, |store, resource| {
            let target = resource.cloned().unwrap_or_else(|| url.clone());
            store.write_file(&target, &file.content);
            Ok(target)
        })?;

        let object = ModelObject::new(RemoteFile {
            url,
            content: file.content.clone(),
        });
        ctx.emit(ModelEventType::OnUpdated, Some(&object), "File");
        Ok(Some(object))
    }

    fn derive_child_host(
        &self,
        host: &ModelHost,
        _definition: &dyn Definition,
        object: Option<&ModelObject>,
        child_type: DefinitionType,
    ) -> Result<ModelHost> {
        let folder = host.downcast_ref::<FolderHost>()?;
        let file = expect_object::<RemoteFile>(object)?;
        let store = Rc::clone(&folder.store);
        let file_url = file.url.clone();

        // the file exposes its list item and its property bag separately
        if child_type == DefinitionType::of::<ListItemFieldValueDefinition>() {
            Ok(ModelHost::new(ListItemHost { store, file_url }))
        } else if child_type == DefinitionType::of::<PropertyDefinition>() {
            Ok(ModelHost::new(PropertyHost { store, file_url }))
        } else {
            Ok(ModelHost::new(file.clone()))
        }
    }

    fn commit_child_host(&self, child_host: ModelHost, _child_type: DefinitionType) -> Result<()> {
        let store = if let Ok(item) = child_host.downcast_ref::<ListItemHost>() {
            Rc::clone(&item.store)
        } else if let Ok(bag) = child_host.downcast_ref::<PropertyHost>() {
            Rc::clone(&bag.store)
        } else {
            return Ok(());
        };
        let mut store = store.borrow_mut();
        store.commit()?;
        store.execute_pending()
    }

    fn validate(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<Option<ModelObject>> {
        let folder = host.downcast_ref::<FolderHost>()?;
        let file = definition.expect::<ModuleFileDefinition>()?;
        let (_, url) = Self::urls(folder, file);

        let Some(stored) = folder.store.borrow().file(&url).cloned() else {
            results.push(missing("File", &url));
            return Ok(None);
        };
        let remote = RemoteFile {
            url,
            content: stored.content,
        };
        Assert::new(file, &remote, results)
            .should_be_equal(prop!(ModuleFileDefinition, content), prop!(RemoteFile, content))?
            .should_be_end_of(
                prop!(ModuleFileDefinition, file_name),
                |d| d.file_name.clone(),
                prop!(RemoteFile, url),
                |f| f.url.clone(),
            )?;
        Ok(Some(ModelObject::new(remote)))
    }
}

pub struct ListItemFieldValueHandler;

impl ModelHandler for ListItemFieldValueHandler {
    fn target_object_type(&self) -> &'static str {
        "ListItem"
    }

    fn deploy_model(
        &self,
        _ctx: &mut DeployContext<'_>,
        host: &ModelHost,
        definition: &dyn Definition,
    ) -> Result<Option<ModelObject>> {
        let item = host.downcast_ref::<ListItemHost>()?;
        let field = definition.expect::<ListItemFieldValueDefinition>()?;

        let mut store = item.store.borrow_mut();
        store
            .file_mut(&item.file_url)?
            .fields
            .insert(field.field_name.clone(), field.value.clone());
        Ok(None)
    }

    fn derive_child_host(
        &self,
        host: &ModelHost,
        _definition: &dyn Definition,
        _object: Option<&ModelObject>,
        _child_type: DefinitionType,
    ) -> Result<ModelHost> {
        Ok(ModelHost::new(host.downcast_ref::<ListItemHost>()?.clone()))
    }

    fn validate(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<Option<ModelObject>> {
        let item = host.downcast_ref::<ListItemHost>()?;
        let field = definition.expect::<ListItemFieldValueDefinition>()?;
        let store = item.store.borrow();
        let Some(file) = store.file(&item.file_url) else {
            results.push(missing("File", &item.file_url));
            return Ok(None);
        };

        // the observed side is a lookup keyed by the declared field name
        Assert::new(field, file, results).should_be_valid(|_, d, f| {
            let src = prop!(ListItemFieldValueDefinition, value).resolve(d)?;
            let actual = f.fields.get(&d.field_name);
            Ok(ValidationResult::new(
                actual == Some(&d.value),
                format!(
                    "Field [{}] value [{}] should match [{}]",
                    d.field_name,
                    d.value,
                    actual.map_or("null", String::as_str)
                ),
            )
            .with_src(src))
        })?;
        Ok(None)
    }
}

pub struct PropertyHandler;

impl ModelHandler for PropertyHandler {
    fn target_object_type(&self) -> &'static str {
        "PropertyBag"
    }

    fn deploy_model(
        &self,
        _ctx: &mut DeployContext<'_>,
        host: &ModelHost,
        definition: &dyn Definition,
    ) -> Result<Option<ModelObject>> {
        let bag = host.downcast_ref::<PropertyHost>()?;
        let property = definition.expect::<PropertyDefinition>()?;

        let mut store = bag.store.borrow_mut();
        store
            .file_mut(&bag.file_url)?
            .properties
            .insert(property.key.clone(), property.value.clone());
        Ok(None)
    }

    fn derive_child_host(
        &self,
        host: &ModelHost,
        _definition: &dyn Definition,
        _object: Option<&ModelObject>,
        _child_type: DefinitionType,
    ) -> Result<ModelHost> {
        Ok(ModelHost::new(host.downcast_ref::<PropertyHost>()?.clone()))
    }

    fn validate(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<Option<ModelObject>> {
        let bag = host.downcast_ref::<PropertyHost>()?;
        let property = definition.expect::<PropertyDefinition>()?;
        let store = bag.store.borrow();
        let Some(file) = store.file(&bag.file_url) else {
            results.push(missing("File", &bag.file_url));
            return Ok(None);
        };

        Assert::new(property, file, results).should_be_equal(
            prop!(PropertyDefinition, value),
            Prop::new("properties", {
                let key = property.key.clone();
                move |f: &StoredFile| f.properties.get(&key).cloned()
            }),
        )?;
        Ok(None)
    }
}

pub struct WelcomePageHandler;

impl ModelHandler for WelcomePageHandler {
    fn target_object_type(&self) -> &'static str {
        "Web"
    }

    fn deploy_model(
        &self,
        _ctx: &mut DeployContext<'_>,
        host: &ModelHost,
        definition: &dyn Definition,
    ) -> Result<Option<ModelObject>> {
        let pages = host.downcast_ref::<PagesHost>()?;
        let welcome = definition.expect::<WelcomePageDefinition>()?;

        let mut store = pages.store.borrow_mut();
        let web = store
            .webs
            .get_mut(&pages.web_url)
            .ok_or_else(|| not_found("GetWeb", &pages.web_url))?;
        web.welcome_page = Some(format!("{}/{}", pages.library_url, welcome.page));
        Ok(None)
    }

    fn derive_child_host(
        &self,
        host: &ModelHost,
        _definition: &dyn Definition,
        _object: Option<&ModelObject>,
        _child_type: DefinitionType,
    ) -> Result<ModelHost> {
        Ok(ModelHost::new(host.downcast_ref::<PagesHost>()?.clone()))
    }

    fn validate(
        &self,
        host: &ModelHost,
        definition: &dyn Definition,
        results: &mut Vec<ValidationResult>,
    ) -> Result<Option<ModelObject>> {
        let pages = host.downcast_ref::<PagesHost>()?;
        let welcome = definition.expect::<WelcomePageDefinition>()?;
        let Some(web) = pages.store.borrow().web(&pages.web_url).cloned() else {
            results.push(missing("Web", &pages.web_url));
            return Ok(None);
        };

        Assert::new(welcome, &web, results).should_be_end_of(
            Prop::named("Page"),
            |d| format!("/{}", d.page),
            prop!(StoredWeb, welcome_page),
            |w| w.welcome_page.clone().unwrap_or_default(),
        )?;
        Ok(None)
    }
}

/// Registry with a handler for every test definition
pub fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register_for::<SiteDefinition>(SiteHandler);
    registry.register_for::<WebDefinition>(WebHandler);
    registry.register_for::<ListDefinition>(ListHandler);
    registry.register_for::<ModuleFileDefinition>(ModuleFileHandler);
    registry.register_for::<ListItemFieldValueDefinition>(ListItemFieldValueHandler);
    registry.register_for::<PropertyDefinition>(PropertyHandler);
    registry.register_for::<WelcomePageDefinition>(WelcomePageHandler);
    registry
}
