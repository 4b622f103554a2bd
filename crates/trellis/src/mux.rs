//! The multiplexer: per-method routing trees, mount-path resolution,
//! middleware composition, and sub-routing.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use trellis_core::{
    ArcHandler, ContextKey, Handler, Logger, Method, Middleware, PathParams, Request,
    RequestContext, Response, chain, handler_fn,
};
use trellis_radix::{DELIMITER, PLACEHOLDER, Tree};

const LOG_TARGET: &str = "trellis::mux";

/// The per-method routing tables.
///
/// A mux and every sub-router derived from it hold the same table through a
/// shared reference; registration through any of them is visible to all.
/// The lock is the registration/dispatch exclusion the trees themselves do
/// not provide: `handle` writes, `dispatch` reads.
type TreeTable = Arc<RwLock<HashMap<Method, Tree<ArcHandler>>>>;

/// An HTTP request multiplexer.
///
/// Routes are registered under a method and a path; dispatch walks the
/// method's radix tree, attaches captured parameters to the request context
/// under the configured [`ContextKey`], and invokes the matched handler
/// through its composed middleware chain.
///
/// Registration is a configuration-phase activity; dispatch may then run
/// concurrently across worker threads.
///
/// # Example
///
/// ```
/// use trellis::{ContextKey, Method, Mux, Response};
/// use trellis::testing::RequestBuilder;
///
/// let key = ContextKey::new("params");
/// let mux = Mux::new("/api", key);
/// mux.handle_fn(Method::Get, "/users/:id", move |ctx, _req| {
///     let id = ctx.params(key).get("id").unwrap_or("?").to_string();
///     Response::ok().body_text(id)
/// });
///
/// let mut req = RequestBuilder::get("/api/users/42").build();
/// let res = mux.dispatch(&mut req);
/// assert_eq!(res.body().as_bytes(), b"42");
/// ```
pub struct Mux {
    mount_path: String,
    trees: TreeTable,
    inherited: Vec<Middleware>,
    own: Vec<Middleware>,
    ctx_key: ContextKey,
    placeholder: u8,
    debug: bool,
    logger: Logger,
    request_counter: Arc<AtomicU64>,
}

impl Mux {
    /// Creates a multiplexer mounted at `mount_path`.
    ///
    /// Captured parameters will be delivered under `ctx_key`. The mount
    /// path is normalized immediately: an empty path becomes `/`.
    #[must_use]
    pub fn new(mount_path: &str, ctx_key: ContextKey) -> Self {
        Self {
            mount_path: resolve_path("", mount_path),
            trees: Arc::new(RwLock::new(HashMap::with_capacity(Method::ALL.len()))),
            inherited: Vec::new(),
            own: Vec::new(),
            ctx_key,
            placeholder: PLACEHOLDER,
            debug: false,
            logger: Logger::new(),
            request_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The resolved mount path.
    #[must_use]
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// The context key parameters are delivered under.
    #[must_use]
    pub fn context_key(&self) -> ContextKey {
        self.ctx_key
    }

    /// The logger receiving this mux's diagnostic events.
    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Registers `handler` for `method` under the mount-resolved `path`.
    ///
    /// The handler is composed with the inherited and own middleware lists
    /// before registration; later changes to either list do not affect it.
    /// Registering an identical method and path again replaces the previous
    /// handler.
    pub fn handle(&self, method: Method, path: &str, handler: ArcHandler) {
        let full = resolve_path(&self.mount_path, path);
        let mut fns = Vec::with_capacity(self.inherited.len() + self.own.len());
        fns.extend(self.inherited.iter().cloned());
        fns.extend(self.own.iter().cloned());
        let composed = chain(&fns, handler);

        let mut trees = self.trees.write();
        let tree = trees
            .entry(method)
            .or_insert_with(|| Tree::with_boundaries(self.placeholder, DELIMITER));
        tree.add(&full, composed);
        if self.debug {
            self.logger
                .debug(LOG_TARGET, format!("registered {method} {full}"));
        }
    }

    /// Registers a plain function or closure as the handler.
    pub fn handle_fn<F>(&self, method: Method, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle(method, path, handler_fn(f));
    }

    /// Registers a GET handler.
    pub fn get<F>(&self, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle_fn(Method::Get, path, f);
    }

    /// Registers a HEAD handler.
    pub fn head<F>(&self, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle_fn(Method::Head, path, f);
    }

    /// Registers a POST handler.
    pub fn post<F>(&self, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle_fn(Method::Post, path, f);
    }

    /// Registers a PUT handler.
    pub fn put<F>(&self, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle_fn(Method::Put, path, f);
    }

    /// Registers a DELETE handler.
    pub fn delete<F>(&self, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle_fn(Method::Delete, path, f);
    }

    /// Registers a CONNECT handler.
    pub fn connect<F>(&self, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle_fn(Method::Connect, path, f);
    }

    /// Registers an OPTIONS handler.
    pub fn options<F>(&self, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle_fn(Method::Options, path, f);
    }

    /// Registers a TRACE handler.
    pub fn trace<F>(&self, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle_fn(Method::Trace, path, f);
    }

    /// Registers a PATCH handler.
    pub fn patch<F>(&self, path: &str, f: F)
    where
        F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.handle_fn(Method::Patch, path, f);
    }

    /// Replaces this mux's own middleware list.
    ///
    /// Only routes registered after this call are affected; already
    /// composed handlers are immutable. Sub-routers created earlier keep
    /// the snapshot they inherited.
    pub fn use_middleware(&mut self, fns: impl IntoIterator<Item = Middleware>) {
        self.own = fns.into_iter().collect();
    }

    /// Creates a sub-router mounted at `sub_path` below this mux.
    ///
    /// The sub-router registers into the same routing tables, so routes
    /// added through either side are visible to both. It inherits a
    /// snapshot of this mux's effective middleware chain; later `use_middleware`
    /// calls here do not reach it.
    #[must_use]
    pub fn router(&self, sub_path: &str) -> Mux {
        let mut inherited = self.inherited.clone();
        inherited.extend(self.own.iter().cloned());
        Mux {
            mount_path: format!("{}{sub_path}", self.mount_path),
            trees: Arc::clone(&self.trees),
            inherited,
            own: Vec::new(),
            ctx_key: self.ctx_key,
            placeholder: self.placeholder,
            debug: self.debug,
            logger: self.logger.clone(),
            request_counter: Arc::clone(&self.request_counter),
        }
    }

    /// Dispatches one request, producing a response.
    ///
    /// Looks up the tree for the request's method and walks it with the
    /// request's path. On a match, captured parameters (if any) are stored
    /// in a fresh [`RequestContext`] under this mux's context key and the
    /// handler is invoked. Anything else — no tree for the method, no
    /// matching route, or a match ending on a pure branching point — is the
    /// standard not-found outcome, not an error.
    pub fn dispatch(&self, req: &mut Request) -> Response {
        let (handler, params) = {
            let trees = self.trees.read();
            let Some(tree) = trees.get(&req.method()) else {
                return self.miss(req);
            };
            let Some(found) = tree.find(req.path()) else {
                return self.miss(req);
            };
            let mut params = PathParams::new();
            for (name, value) in found.captures.iter() {
                params.insert(name, value);
            }
            (Arc::clone(found.value), params)
        };

        let mut ctx = RequestContext::new(self.request_counter.fetch_add(1, Ordering::Relaxed));
        if !params.is_empty() {
            ctx.set_params(self.ctx_key, params);
        }
        handler.call(&ctx, req)
    }

    /// Changes the placeholder byte for dynamic segments.
    ///
    /// The change reaches every existing tree and every tree created later,
    /// on this mux and on everything sharing its tables. Already-registered
    /// routes are reinterpreted under the new marker, not the old one.
    pub fn set_placeholder(&mut self, placeholder: u8) {
        self.placeholder = placeholder;
        let mut trees = self.trees.write();
        for tree in trees.values_mut() {
            tree.set_boundaries(placeholder, DELIMITER);
        }
    }

    /// Enables or disables diagnostic logging.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Total number of registered routes across all methods.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.trees.read().values().map(Tree::len).sum()
    }

    fn miss(&self, req: &Request) -> Response {
        if self.debug {
            self.logger.debug(
                LOG_TARGET,
                format!("no route for {} {}", req.method(), req.path()),
            );
        }
        Response::not_found()
    }
}

impl fmt::Debug for Mux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mux")
            .field("mount_path", &self.mount_path)
            .field("ctx_key", &self.ctx_key)
            .field("placeholder", &(self.placeholder as char))
            .field("debug", &self.debug)
            .field("routes", &self.route_count())
            .finish_non_exhaustive()
    }
}

/// Renders every method tree, for diagnostics. Not a stability contract.
impl fmt::Display for Mux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trees = self.trees.read();
        for method in Method::ALL {
            if let Some(tree) = trees.get(&method) {
                writeln!(f, "{method}")?;
                write!(f, "{tree}")?;
            }
        }
        Ok(())
    }
}

/// Joins a mount path and a registered path.
///
/// The two are concatenated; an empty result defaults to `/`, and doubled
/// leading delimiters collapse into one.
fn resolve_path(mount: &str, path: &str) -> String {
    let full = format!("{mount}{path}");
    if full.is_empty() {
        return "/".to_string();
    }
    let bytes = full.as_bytes();
    let mut start = 0;
    while bytes.len() - start > 1 && bytes[start] == b'/' && bytes[start + 1] == b'/' {
        start += 1;
    }
    full[start..].to_string()
}
