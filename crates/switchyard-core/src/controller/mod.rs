//! Controller discovery
//!
//! Controllers are found by qualified name: web controllers live under
//! `Controllers.{Name}Controller`, API controllers under
//! `ApiControllers.{Name}Controller`. Names map to a [`ControllerClass`]
//! through an explicit [`ControllerRegistry`], filled either by hand or by a
//! discovery pass over compile-time registrations.
//!
//! ```rust,ignore
//! use switchyard_core::controller::*;
//!
//! #[derive(Default)]
//! struct BlogController;
//!
//! impl Controller for BlogController {
//!     const NAME: &'static str = "BlogController";
//!     const ACTIONS: &'static [&'static str] = &["index", "show"];
//!
//!     fn call(&mut self, action: &str, cx: ActionContext<'_>) -> Result<Reply> {
//!         match action {
//!             "index" => cx.out.push_str("<h1>Blog</h1>").into_reply(),
//!             "show" => write!(cx.out, "<h1>{}</h1>", cx.arg(0).unwrap_or_default()).into_reply(),
//!             other => Err(unknown_action(Self::NAME, other)),
//!         }
//!     }
//! }
//!
//! switchyard_core::inventory::submit! { ControllerRegistration::web::<BlogController>() }
//! ```

mod api;
mod web;

pub use api::ApiControllerHandler;
pub use web::WebControllerHandler;

use crate::error::{ApiError, Result};
use crate::handler::Reply;
use crate::output::Output;
use crate::request::Request;
use std::collections::HashMap;
use std::fmt;

/// Namespace of web controllers
pub const WEB_NAMESPACE: &str = "Controllers";
/// Namespace of API controllers
pub const API_NAMESPACE: &str = "ApiControllers";
/// Suffix every controller name carries
pub const CONTROLLER_SUFFIX: &str = "Controller";

/// Which handler a controller is resolved by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    /// Resolved from the first path segment
    Web,
    /// Resolved from the segment after `api/`
    Api,
}

impl ControllerKind {
    /// Namespace prefix for this kind
    pub fn namespace(self) -> &'static str {
        match self {
            ControllerKind::Web => WEB_NAMESPACE,
            ControllerKind::Api => API_NAMESPACE,
        }
    }

    /// Qualified name for a controller name such as `BlogController`
    pub fn qualify(self, name: &str) -> String {
        format!("{}.{}", self.namespace(), name)
    }
}

/// Everything an action gets to work with
pub struct ActionContext<'a> {
    /// The request being dispatched
    pub request: &'a Request,
    /// Remaining path segments, in order
    pub args: &'a [String],
    /// Output buffer for the response body
    pub out: &'a mut Output,
}

impl ActionContext<'_> {
    /// Positional argument `index`, if present
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// A controller type exposing named actions
///
/// A fresh instance is built with `Default` for every invocation.
pub trait Controller: Default + Send + 'static {
    /// Unqualified name, including the `Controller` suffix
    const NAME: &'static str;
    /// Actions `call` understands
    const ACTIONS: &'static [&'static str];

    /// Invoke `action`
    fn call(&mut self, action: &str, cx: ActionContext<'_>) -> Result<Reply>;
}

/// Object-safe view of a controller instance
pub trait ControllerInstance: Send {
    /// Invoke `action`
    fn call_action(&mut self, action: &str, cx: ActionContext<'_>) -> Result<Reply>;
}

impl<C: Controller> ControllerInstance for C {
    fn call_action(&mut self, action: &str, cx: ActionContext<'_>) -> Result<Reply> {
        self.call(action, cx)
    }
}

/// Factory producing controller instances
pub type ControllerFactory = fn() -> Box<dyn ControllerInstance>;

fn instantiate<C: Controller>() -> Box<dyn ControllerInstance> {
    Box::new(C::default())
}

/// Error for an action name a controller does not know
pub fn unknown_action(controller: &str, action: &str) -> ApiError {
    ApiError::internal(format!("{} has no action `{}`", controller, action))
}

/// A resolved controller type: its qualified name, actions and factory
#[derive(Clone)]
pub struct ControllerClass {
    qualified_name: String,
    actions: &'static [&'static str],
    factory: ControllerFactory,
}

impl ControllerClass {
    /// Describe controller `C` under `kind`
    pub fn of<C: Controller>(kind: ControllerKind) -> Self {
        Self {
            qualified_name: kind.qualify(C::NAME),
            actions: C::ACTIONS,
            factory: instantiate::<C>,
        }
    }

    fn from_registration(registration: &ControllerRegistration) -> Self {
        Self {
            qualified_name: registration.kind.qualify(registration.name),
            actions: registration.actions,
            factory: registration.factory,
        }
    }

    /// Fully qualified name, e.g. `Controllers.BlogController`
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Actions the controller exposes
    pub fn actions(&self) -> &'static [&'static str] {
        self.actions
    }

    /// Check whether the controller exposes `action`
    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains(&action)
    }

    /// Build a fresh instance
    pub fn instantiate(&self) -> Box<dyn ControllerInstance> {
        (self.factory)()
    }
}

impl fmt::Debug for ControllerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerClass")
            .field("qualified_name", &self.qualified_name)
            .field("actions", &self.actions)
            .finish()
    }
}

/// Lookup of controller types by qualified name
pub trait ControllerSource: Send + Sync + 'static {
    /// Resolve `qualified_name`, or `None` if no such controller exists
    fn resolve(&self, qualified_name: &str) -> Option<ControllerClass>;
}

/// Compile-time controller registration, collected with `inventory`
///
/// ```rust,ignore
/// inventory::submit! { ControllerRegistration::api::<SampleController>() }
/// ```
pub struct ControllerRegistration {
    kind: ControllerKind,
    name: &'static str,
    actions: &'static [&'static str],
    factory: ControllerFactory,
}

impl ControllerRegistration {
    /// Register `C` as a web controller
    pub const fn web<C: Controller>() -> Self {
        Self {
            kind: ControllerKind::Web,
            name: C::NAME,
            actions: C::ACTIONS,
            factory: instantiate::<C>,
        }
    }

    /// Register `C` as an API controller
    pub const fn api<C: Controller>() -> Self {
        Self {
            kind: ControllerKind::Api,
            name: C::NAME,
            actions: C::ACTIONS,
            factory: instantiate::<C>,
        }
    }
}

inventory::collect!(ControllerRegistration);

/// Explicit map from qualified name to controller type
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    classes: HashMap<String, ControllerClass>,
}

impl ControllerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every `inventory`-submitted controller
    pub fn discover() -> Self {
        let mut registry = Self::new();
        for registration in inventory::iter::<ControllerRegistration> {
            registry.insert(ControllerClass::from_registration(registration));
        }
        tracing::debug!(controllers = registry.len(), "Discovered controllers");
        registry
    }

    /// Register `C` as a web controller
    pub fn register_web<C: Controller>(&mut self) -> &mut Self {
        self.insert(ControllerClass::of::<C>(ControllerKind::Web));
        self
    }

    /// Register `C` as an API controller
    pub fn register_api<C: Controller>(&mut self) -> &mut Self {
        self.insert(ControllerClass::of::<C>(ControllerKind::Api));
        self
    }

    /// Insert a class, replacing any previous class with the same name
    pub fn insert(&mut self, class: ControllerClass) {
        self.classes.insert(class.qualified_name.clone(), class);
    }

    /// Number of registered controllers
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Qualified names of all registered controllers
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

impl ControllerSource for ControllerRegistry {
    fn resolve(&self, qualified_name: &str) -> Option<ControllerClass> {
        self.classes.get(qualified_name).cloned()
    }
}

/// Split a normalized path into owned segments, dropping empty ones
pub(crate) fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    inventory::submit! { ControllerRegistration::web::<PagesController>() }

    #[test]
    fn test_qualified_names() {
        assert_eq!(ControllerKind::Web.qualify("BlogController"), "Controllers.BlogController");
        assert_eq!(ControllerKind::Api.qualify("SampleController"), "ApiControllers.SampleController");
    }

    #[test]
    fn test_registry_resolves_by_kind() {
        let registry = registry();
        assert!(registry.resolve("ApiControllers.SampleController").is_some());
        assert!(registry.resolve("Controllers.SampleController").is_none());
        assert!(registry.resolve("Controllers.BlogController").is_some());
    }

    #[test]
    fn test_class_actions() {
        let class = ControllerClass::of::<SampleController>(ControllerKind::Api);
        assert!(class.has_action("post_create"));
        assert!(!class.has_action("delete"));
    }

    #[test]
    fn test_instantiate_and_call() {
        let class = ControllerClass::of::<SampleController>(ControllerKind::Api);
        let request = Request::new(http::Method::GET, "/api/sample");
        let args = vec!["1".to_string()];
        let mut out = Output::new();
        let mut instance = class.instantiate();
        instance
            .call_action("get", ActionContext { request: &request, args: &args, out: &mut out })
            .unwrap();
        assert_eq!(out.as_bytes(), b"get(1)");
    }

    #[test]
    fn test_discover_collects_submissions() {
        let registry = ControllerRegistry::discover();
        assert!(registry.resolve("Controllers.PagesController").is_some());
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("api/sample/create"), ["api", "sample", "create"]);
        assert!(path_segments("").is_empty());
    }
}
