//! Path registry.
//!
//! Maps a request path to the methods it accepts and the resource each method
//! returns. The registry is assembled before the server starts and moved into
//! it; from then on it is only read, so lookups take no locks.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::error::RegistryError;
use crate::http::HttpMethod;

/// Content returned verbatim as a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// File name relative to the configured resource root, read per request.
    File(PathBuf),
    Inline(String),
}

impl Resource {
    /// File resource used when a route names no content: the default index
    /// for directory-like paths, otherwise the path itself.
    pub fn default_for(path: &str, default_index: &str) -> Resource {
        let name = path.trim_start_matches('/');
        if path.ends_with('/') {
            Resource::File(PathBuf::from(format!("{name}{default_index}")))
        } else {
            Resource::File(PathBuf::from(name))
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub method: HttpMethod,
    pub resource: Resource,
    /// Role recorded by [`Registry::change_permission`].
    pub permission: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    PathNotFound,
    /// The path exists but has no entry for the requested method.
    MethodNotAllowed,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    routes: IndexMap<String, Vec<RouteEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        path: &str,
        method: HttpMethod,
        resource: Resource,
    ) -> Result<(), RegistryError> {
        if !path.starts_with('/') {
            return Err(RegistryError::InvalidPath(path.to_string()));
        }

        let entries = self.routes.entry(path.to_string()).or_default();
        if entries.iter().any(|entry| entry.method == method) {
            return Err(RegistryError::DuplicateRoute {
                path: path.to_string(),
                method: method.to_string(),
            });
        }

        entries.push(RouteEntry {
            method,
            resource,
            permission: None,
        });
        Ok(())
    }

    pub fn lookup(&self, path: &str, method: HttpMethod) -> Result<&RouteEntry, LookupError> {
        let entries = self.routes.get(path).ok_or(LookupError::PathNotFound)?;
        entries
            .iter()
            .find(|entry| entry.method == method)
            .ok_or(LookupError::MethodNotAllowed)
    }

    /// Records a role requirement on every method of `path`.
    ///
    /// Nothing enforces it yet; see [`Authorizer`](crate::handler::permissions::Authorizer).
    pub fn change_permission(&mut self, path: &str, role: &str) -> Result<(), RegistryError> {
        let entries = self
            .routes
            .get_mut(path)
            .ok_or_else(|| RegistryError::UnknownPath(path.to_string()))?;

        for entry in entries {
            entry.permission = Some(role.to_string());
        }
        Ok(())
    }

    /// Number of (path, method) entries.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered paths in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> Resource {
        Resource::File(PathBuf::from(name))
    }

    #[test]
    fn distinguishes_unknown_path_from_wrong_method() {
        let mut registry = Registry::new();
        registry.register("/login", HttpMethod::Post, file("login.html")).unwrap();

        assert_eq!(
            registry.lookup("/missing", HttpMethod::Get).unwrap_err(),
            LookupError::PathNotFound
        );
        assert_eq!(
            registry.lookup("/login", HttpMethod::Get).unwrap_err(),
            LookupError::MethodNotAllowed
        );
        assert_eq!(
            registry.lookup("/login", HttpMethod::Post).unwrap().resource,
            file("login.html")
        );
    }

    #[test]
    fn one_entry_per_method_per_path() {
        let mut registry = Registry::new();
        registry.register("/", HttpMethod::Get, file("index.html")).unwrap();
        registry.register("/", HttpMethod::Post, file("posted.html")).unwrap();

        assert_eq!(
            registry.register("/", HttpMethod::Get, file("other.html")),
            Err(RegistryError::DuplicateRoute {
                path: "/".to_string(),
                method: "GET".to_string(),
            })
        );
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.paths().collect::<Vec<_>>(), vec!["/"]);
        // the rejected registration must not have replaced the original
        assert_eq!(
            registry.lookup("/", HttpMethod::Get).unwrap().resource,
            file("index.html")
        );
    }

    #[test]
    fn rejects_relative_paths() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.register("index.html", HttpMethod::Get, file("index.html")),
            Err(RegistryError::InvalidPath("index.html".to_string()))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn change_permission_needs_a_known_path() {
        let mut registry = Registry::new();
        registry.register("/admin", HttpMethod::Get, file("admin")).unwrap();

        registry.change_permission("/admin", "Role: Admin").unwrap();
        assert_eq!(
            registry.lookup("/admin", HttpMethod::Get).unwrap().permission.as_deref(),
            Some("Role: Admin")
        );
        assert_eq!(
            registry.change_permission("/nope", "Role: Admin"),
            Err(RegistryError::UnknownPath("/nope".to_string()))
        );
    }

    #[test]
    fn default_resources() {
        assert_eq!(Resource::default_for("/", "index.html"), file("index.html"));
        assert_eq!(Resource::default_for("/docs/", "index.html"), file("docs/index.html"));
        assert_eq!(Resource::default_for("/admin", "index.html"), file("admin"));
    }
}
