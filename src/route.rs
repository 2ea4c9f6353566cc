//! Navigation between the directory listing and a company's detail view.

use std::fmt;

use tracing::debug;

const COMPANY_PREFIX: &str = "company/";

/// Where the user currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    List,
    Company(i64),
}

impl Route {
    /// Decode an address such as `#/company/12`. Anything that does not
    /// address a company is the listing.
    pub fn parse(address: &str) -> Self {
        let path = address.trim();
        let path = path.strip_prefix('#').unwrap_or(path);
        let path = path.strip_prefix('/').unwrap_or(path);

        path.strip_prefix(COMPANY_PREFIX)
            .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|id| id.parse::<i64>().ok())
            .map(Route::Company)
            .unwrap_or(Route::List)
    }

    /// Encode the route back into its address. The listing has an empty one.
    pub fn address(&self) -> String {
        match self {
            Route::List => String::new(),
            Route::Company(id) => format!("{COMPANY_PREFIX}{id}"),
        }
    }

    pub fn company_id(&self) -> Option<i64> {
        match self {
            Route::List => None,
            Route::Company(id) => Some(*id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::List => write!(f, "/"),
            Route::Company(id) => write!(f, "/{COMPANY_PREFIX}{id}"),
        }
    }
}

type Listener = Box<dyn FnMut(&Route)>;

/// Holds the current route and tells subscribers when it changes.
#[derive(Default)]
pub struct Navigator {
    current: Route,
    listeners: Vec<Listener>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            current: initial,
            listeners: Vec::new(),
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    /// Register a callback for route changes. It is not called for the route
    /// that is current at subscription time.
    pub fn subscribe(&mut self, listener: impl FnMut(&Route) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Move to `route`. Navigating to the current route is a no-op.
    pub fn navigate(&mut self, route: Route) {
        if route == self.current {
            return;
        }
        debug!(from = %self.current, to = %route, "navigate");
        self.current = route;
        for listener in &mut self.listeners {
            listener(&self.current);
        }
    }

    /// Navigate by address, as a link or deep link would.
    pub fn navigate_to_address(&mut self, address: &str) {
        self.navigate(Route::parse(address));
    }

    /// Return to the listing.
    pub fn back(&mut self) {
        self.navigate(Route::List);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn parses_company_addresses() {
        assert_eq!(Route::parse("#/company/12"), Route::Company(12));
        assert_eq!(Route::parse("/company/3"), Route::Company(3));
        assert_eq!(Route::parse("company/42"), Route::Company(42));
    }

    #[test]
    fn anything_else_is_the_list() {
        for address in ["", "#", "#/", "#/company/", "#/company/abc", "#/company/-1", "#/other/1", "#/company/1/extra"] {
            assert_eq!(Route::parse(address), Route::List, "{address}");
        }
    }

    #[test]
    fn address_round_trips() {
        let route = Route::Company(1700000000000);
        assert_eq!(Route::parse(&route.address()), route);
        assert_eq!(Route::List.address(), "");
    }

    #[test]
    fn listeners_see_changes_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut nav = Navigator::default();
        let sink = Rc::clone(&seen);
        nav.subscribe(move |route| sink.borrow_mut().push(*route));

        nav.navigate(Route::Company(5));
        nav.navigate(Route::Company(5));
        nav.navigate_to_address("#/company/6");
        nav.back();

        assert_eq!(
            *seen.borrow(),
            vec![Route::Company(5), Route::Company(6), Route::List]
        );
        assert_eq!(nav.current(), Route::List);
    }
}
