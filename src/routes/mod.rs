//! Static route table for the console views.
//!
//! Three exact-path routes, fixed at compile time. Navigation uses
//! history-mode paths (`/tasks`, not `#/tasks`), so the location path is
//! matched directly; query strings and fragments never take part.

use std::fmt;

/// The views a route can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Tasks,
    Configs,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Tasks => write!(f, "Tasks"),
            Self::Configs => write!(f, "Configs"),
        }
    }
}

/// How locations map to route paths. Only path-based history is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum History {
    /// Path-based (`/configs`).
    Web,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

/// Navigation mode used by the console.
pub const HISTORY: History = History::Web;

pub static ROUTES: [Route; 3] = [
    Route {
        path: "/",
        name: "Dashboard",
        view: View::Dashboard,
    },
    Route {
        path: "/tasks",
        name: "Tasks",
        view: View::Tasks,
    },
    Route {
        path: "/configs",
        name: "Configs",
        view: View::Configs,
    },
];

/// All routes, in declaration order.
pub fn routes() -> &'static [Route] {
    &ROUTES
}

/// Find the route whose path exactly matches the location's path.
pub fn resolve(location: &str) -> Option<&'static Route> {
    let path = location_path(location);
    ROUTES.iter().find(|route| route.path == path)
}

pub fn by_name(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.name == name)
}

/// Link target for a view. Under web history this is the route path itself.
pub fn href(view: View) -> String {
    ROUTES
        .iter()
        .find(|route| route.view == view)
        .map_or("/", |route| route.path)
        .to_string()
}

fn location_path(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = &location[..end];
    if path.is_empty() { "/" } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_path_strips_query_and_fragment() {
        assert_eq!(location_path("/tasks?page=2"), "/tasks");
        assert_eq!(location_path("/configs#top"), "/configs");
        assert_eq!(location_path(""), "/");
        assert_eq!(location_path("?x=1"), "/");
    }

    #[test]
    fn view_names_match_route_names() {
        for route in routes() {
            assert_eq!(route.view.to_string(), route.name);
        }
    }

    #[test]
    fn href_uses_web_history() {
        assert_eq!(HISTORY, History::Web);
        assert_eq!(href(View::Dashboard), "/");
        assert_eq!(href(View::Configs), "/configs");
    }

    #[test]
    fn href_resolves_back_to_its_view() {
        for route in routes() {
            let link = href(route.view);
            assert!(!link.contains('#'));
            assert_eq!(resolve(&link).map(|r| r.view), Some(route.view));
        }
    }
}
