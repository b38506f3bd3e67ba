//! API controller resolution
//!
//! For `api/{name}/{sub}/{args..}` the controller is
//! `ApiControllers.{Name}Controller` and the action is the lowercased verb,
//! suffixed with `_{sub}` when a sub-action segment is present.

use super::{ActionContext, ControllerKind, ControllerSource, CONTROLLER_SUFFIX};
use crate::error::Result;
use crate::handler::Reply;
use crate::naming::{pascal_case, snake_case};
use crate::output::Output;
use crate::request::Request;
use http::Method;
use std::sync::Arc;

/// Resolves and invokes `ApiControllers.{Name}Controller` actions
pub struct ApiControllerHandler {
    source: Arc<dyn ControllerSource>,
}

impl ApiControllerHandler {
    /// Create a handler resolving through `source`
    pub fn new(source: Arc<dyn ControllerSource>) -> Self {
        Self { source }
    }

    /// Qualified controller name for the segment after `api/`
    pub fn controller_name(segment: &str) -> String {
        ControllerKind::Api.qualify(&format!("{}{}", pascal_case(segment), CONTROLLER_SUFFIX))
    }

    /// Action name for `method` and an optional sub-action segment
    pub fn action_name(method: &Method, sub_action: Option<&str>) -> String {
        let verb = method.as_str().to_ascii_lowercase();
        match sub_action.filter(|s| !s.is_empty()) {
            Some(sub) => format!("{}_{}", verb, snake_case(sub)),
            None => verb,
        }
    }

    /// Try to handle `req`. `Ok(None)` means no controller or action matched.
    ///
    /// # Errors
    ///
    /// Propagates errors raised by the action itself.
    pub fn handle(&self, req: &Request, out: &mut Output) -> Result<Option<Reply>> {
        // The leading segment is the `api` prefix. Empty segments are kept so
        // `api/name//arg` has no sub-action.
        let segments: Vec<String> = req.path().split('/').map(str::to_string).collect();
        let Some(name) = segments.get(1) else {
            return Ok(None);
        };

        let qualified = Self::controller_name(name);
        let Some(class) = self.source.resolve(&qualified) else {
            tracing::debug!(controller = %qualified, "API controller not found");
            return Ok(None);
        };

        let action = Self::action_name(req.method(), segments.get(2).map(String::as_str));
        if !class.has_action(&action) {
            tracing::debug!(controller = %qualified, action = %action, "API controller has no such action");
            return Ok(None);
        }

        let args = segments.get(3..).unwrap_or_default();
        tracing::debug!(controller = %qualified, action = %action, args = args.len(), "Invoking API controller");
        let mut instance = class.instantiate();
        let reply = instance.call_action(
            &action,
            ActionContext {
                request: req,
                args,
                out,
            },
        )?;
        Ok(Some(reply))
    }
}

impl std::fmt::Debug for ApiControllerHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiControllerHandler").finish_non_exhaustive()
    }
}
