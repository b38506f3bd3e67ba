//! Web controller resolution
//!
//! The first path segment names the controller, the second the action
//! (`index` when absent) and the rest are positional arguments. A POST goes to
//! `store` whenever the controller has one, whatever the second segment says.

use super::{path_segments, ActionContext, ControllerClass, ControllerKind, ControllerSource, CONTROLLER_SUFFIX};
use crate::error::Result;
use crate::handler::Reply;
use crate::naming::pascal_case;
use crate::output::Output;
use crate::request::Request;
use dashmap::DashMap;
use http::Method;
use std::sync::Arc;

const DEFAULT_ACTION: &str = "index";
const STORE_ACTION: &str = "store";

/// Resolves and invokes `Controllers.{Name}Controller` actions
///
/// Lookups are memoized per qualified name, misses included, for the life of
/// the handler.
pub struct WebControllerHandler {
    source: Arc<dyn ControllerSource>,
    cache: DashMap<String, Option<ControllerClass>>,
}

impl WebControllerHandler {
    /// Create a handler resolving through `source`
    pub fn new(source: Arc<dyn ControllerSource>) -> Self {
        Self {
            source,
            cache: DashMap::new(),
        }
    }

    /// Qualified controller name for a first path segment
    pub fn controller_name(segment: &str) -> String {
        let mut name = pascal_case(segment);
        if !name.ends_with(CONTROLLER_SUFFIX) {
            name.push_str(CONTROLLER_SUFFIX);
        }
        ControllerKind::Web.qualify(&name)
    }

    /// Try to handle `req`. `Ok(None)` means no controller or action matched.
    ///
    /// # Errors
    ///
    /// Propagates errors raised by the action itself.
    pub fn handle(&self, req: &Request, out: &mut Output) -> Result<Option<Reply>> {
        let segments = path_segments(req.path());
        let Some(first) = segments.first() else {
            return Ok(None);
        };

        let qualified = Self::controller_name(first);
        let Some(class) = self.resolve(&qualified) else {
            tracing::debug!(controller = %qualified, "Web controller not found");
            return Ok(None);
        };

        let (action, args): (&str, &[String]) =
            if req.method() == Method::POST && class.has_action(STORE_ACTION) {
                (STORE_ACTION, segments.get(2..).unwrap_or_default())
            } else {
                let action = segments.get(1).map(String::as_str).unwrap_or(DEFAULT_ACTION);
                (action, segments.get(2..).unwrap_or_default())
            };

        if !class.has_action(action) {
            tracing::debug!(controller = %qualified, action, "Web controller has no such action");
            return Ok(None);
        }

        tracing::debug!(controller = %qualified, action, args = args.len(), "Invoking web controller");
        let mut instance = class.instantiate();
        let reply = instance.call_action(
            action,
            ActionContext {
                request: req,
                args,
                out,
            },
        )?;
        Ok(Some(reply))
    }

    /// Number of memoized lookups
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn resolve(&self, qualified: &str) -> Option<ControllerClass> {
        if let Some(hit) = self.cache.get(qualified) {
            return hit.value().clone();
        }
        let resolved = self.source.resolve(qualified);
        self.cache.insert(qualified.to_string(), resolved.clone());
        resolved
    }
}

impl std::fmt::Debug for WebControllerHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebControllerHandler")
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::registry;
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn handler() -> WebControllerHandler {
        WebControllerHandler::new(Arc::new(registry()))
    }

    fn run(handler: &WebControllerHandler, method: Method, path: &str) -> Option<String> {
        let mut out = Output::new();
        let reply = handler.handle(&Request::new(method, path), &mut out).unwrap();
        reply.map(|_| String::from_utf8_lossy(out.as_bytes()).into_owned())
    }

    #[test]
    fn test_controller_name() {
        assert_eq!(WebControllerHandler::controller_name("blog"), "Controllers.BlogController");
        assert_eq!(
            WebControllerHandler::controller_name("unknown-path"),
            "Controllers.UnknownPathController"
        );
        assert_eq!(
            WebControllerHandler::controller_name("blog-controller"),
            "Controllers.BlogController"
        );
    }

    #[test]
    fn test_default_action_is_index() {
        assert_eq!(run(&handler(), Method::GET, "/blog").as_deref(), Some("index()"));
    }

    #[test]
    fn test_action_and_args_from_segments() {
        assert_eq!(
            run(&handler(), Method::GET, "/blog/show/2024/hello").as_deref(),
            Some("show(2024,hello)")
        );
    }

    #[test]
    fn test_post_prefers_store() {
        assert_eq!(run(&handler(), Method::POST, "/blog/show/7").as_deref(), Some("store(7)"));
    }

    #[test]
    fn test_post_without_store_uses_segment() {
        assert_eq!(run(&handler(), Method::POST, "/pages/about").as_deref(), Some("about"));
    }

    #[test]
    fn test_missing_action_is_not_handled() {
        assert_eq!(run(&handler(), Method::GET, "/blog/delete"), None);
    }

    #[test]
    fn test_missing_controller_is_not_handled() {
        assert_eq!(run(&handler(), Method::GET, "/unknown-path"), None);
    }

    struct CountingSource {
        lookups: AtomicUsize,
    }

    impl ControllerSource for CountingSource {
        fn resolve(&self, _qualified_name: &str) -> Option<ControllerClass> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    #[test]
    fn test_misses_are_memoized() {
        let source = Arc::new(CountingSource {
            lookups: AtomicUsize::new(0),
        });
        let handler = WebControllerHandler::new(source.clone());

        run(&handler, Method::GET, "/missing");
        run(&handler, Method::GET, "/missing/again");
        run(&handler, Method::GET, "/other");

        assert_eq!(source.lookups.load(Ordering::SeqCst), 2);
        assert_eq!(handler.cached(), 2);
    }
}
