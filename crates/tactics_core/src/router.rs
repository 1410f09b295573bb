//! Navigation-token router
//!
//! Maps tokens such as `tactic/aggressive-4231` onto registered patterns
//! (`tactic/:slug`) and invokes the matching handler with the captured
//! parameters. Patterns are tried in registration order.

use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::RouteHandlerError;

pub type RouteParams = BTreeMap<String, String>;

/// Route used for empty and unmatched tokens.
pub const DEFAULT_ROUTE: &str = "library";

/// Screens of the catalog application, in registration order.
pub const APP_ROUTES: [&str; 6] =
    ["library", "tactic/:slug", "compare", "glossary", "patches", "recommend"];

type Handler<T> = Box<dyn Fn(&RouteParams, &mut T) -> Result<(), RouteHandlerError>>;
type Fallback<T> = Box<dyn Fn(&RouteHandlerError, &mut T)>;

struct CompiledRoute<T> {
    pattern: String,
    matcher: Regex,
    param_names: Vec<String>,
    handler: Handler<T>,
}

/// A resolved navigation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub pattern: String,
    pub params: RouteParams,
    /// False when the token matched nothing and fell back to the default route
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Rendered,
    /// The handler failed and the fallback ran
    Recovered,
    /// Nothing is registered under the resolved pattern
    NoHandler,
}

pub struct Router<T> {
    routes: Vec<CompiledRoute<T>>,
    fallback: Fallback<T>,
    current: Option<ResolvedRoute>,
}

impl<T> Router<T> {
    /// An empty router; `fallback` renders whenever a handler fails.
    pub fn new(fallback: impl Fn(&RouteHandlerError, &mut T) + 'static) -> Self {
        Self { routes: Vec::new(), fallback: Box::new(fallback), current: None }
    }

    /// Register `handler` under `pattern`.
    ///
    /// `:name` segments capture one path segment; everything else matches
    /// literally. Registering an existing pattern swaps the handler and keeps
    /// its position.
    pub fn register(
        &mut self,
        pattern: &str,
        handler: impl Fn(&RouteParams, &mut T) -> Result<(), RouteHandlerError> + 'static,
    ) -> Result<(), regex::Error> {
        if let Some(existing) = self.routes.iter_mut().find(|r| r.pattern == pattern) {
            existing.handler = Box::new(handler);
            return Ok(());
        }

        let (matcher, param_names) = compile_pattern(pattern)?;
        self.routes.push(CompiledRoute {
            pattern: pattern.to_string(),
            matcher,
            param_names,
            handler: Box::new(handler),
        });
        Ok(())
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.as_str())
    }

    pub fn resolve(&self, token: &str) -> ResolvedRoute {
        let path = normalize_token(token);

        for route in &self.routes {
            let Some(captures) = route.matcher.captures(path) else {
                continue;
            };
            let params = route
                .param_names
                .iter()
                .zip(captures.iter().skip(1))
                .filter_map(|(name, value)| {
                    value.map(|v| (name.clone(), decode_param(v.as_str()).into_owned()))
                })
                .collect();
            return ResolvedRoute { pattern: route.pattern.clone(), params, matched: true };
        }

        ResolvedRoute {
            pattern: DEFAULT_ROUTE.to_string(),
            params: RouteParams::new(),
            matched: false,
        }
    }

    /// Resolve `token` and run its handler against `target`.
    ///
    /// Handler errors never escape: they are logged and the fallback renders.
    pub fn dispatch(&mut self, token: &str, target: &mut T) -> DispatchOutcome {
        let resolved = self.resolve(token);
        if !resolved.matched {
            log::debug!("No route for {:?}, showing {}", token, DEFAULT_ROUTE);
        }

        let outcome = match self.routes.iter().find(|r| r.pattern == resolved.pattern) {
            None => {
                log::debug!("No handler registered for {}", resolved.pattern);
                DispatchOutcome::NoHandler
            }
            Some(route) => match (route.handler)(&resolved.params, target) {
                Ok(()) => DispatchOutcome::Rendered,
                Err(e) => {
                    log::error!("Route error on {}: {}", resolved.pattern, e);
                    (self.fallback)(&e, target);
                    DispatchOutcome::Recovered
                }
            },
        };

        self.current = Some(resolved);
        outcome
    }

    /// Explicit navigation; same as [`Router::dispatch`].
    pub fn navigate(&mut self, token: &str, target: &mut T) -> DispatchOutcome {
        self.dispatch(token, target)
    }

    pub fn current_route(&self) -> Option<&str> {
        self.current.as_ref().map(|r| r.pattern.as_str())
    }

    pub fn current_params(&self) -> Option<&RouteParams> {
        self.current.as_ref().map(|r| &r.params)
    }

    /// First segment of the active pattern, e.g. `tactic` for `tactic/:slug`.
    pub fn nav_section(&self) -> Option<&str> {
        self.current_route().and_then(|p| p.split('/').next())
    }

    /// Pairs of registered patterns that can match the same token.
    ///
    /// The earlier pattern of each pair is the one that wins.
    pub fn overlapping_patterns(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (i, earlier) in self.routes.iter().enumerate() {
            for later in &self.routes[i + 1..] {
                if patterns_overlap(&earlier.pattern, &later.pattern) {
                    pairs.push((earlier.pattern.as_str(), later.pattern.as_str()));
                }
            }
        }
        pairs
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix(':').filter(|name| !name.is_empty())
}

fn compile_pattern(pattern: &str) -> Result<(Regex, Vec<String>), regex::Error> {
    let mut names = Vec::new();
    let body: Vec<Cow<'_, str>> = pattern
        .split('/')
        .map(|segment| match placeholder(segment) {
            Some(name) => {
                names.push(name.to_string());
                Cow::Borrowed("([^/]+)")
            }
            None => Cow::Owned(regex::escape(segment)),
        })
        .collect();

    let matcher = Regex::new(&format!("^{}$", body.join("/")))?;
    Ok((matcher, names))
}

fn normalize_token(token: &str) -> &str {
    let path = match token.strip_prefix('#') {
        Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
        None => token,
    };
    if path.is_empty() {
        DEFAULT_ROUTE
    } else {
        path
    }
}

fn decode_param(raw: &str) -> Cow<'_, str> {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("Keeping undecodable route parameter {:?}: {}", raw, e);
            Cow::Borrowed(raw)
        }
    }
}

fn patterns_overlap(a: &str, b: &str) -> bool {
    let a: Vec<&str> = a.split('/').collect();
    let b: Vec<&str> = b.split('/').collect();
    a.len() == b.len()
        && a.iter().zip(&b).all(|(x, y)| {
            placeholder(x).is_some() || placeholder(y).is_some() || x == y
        })
}
