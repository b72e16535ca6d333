//! Activity names for the audit log.
//!
//! Every routed endpoint is registered up front as `(method, route template)`
//! mapped to a resource and an action. The recorder resolves a request
//! against this table instead of inspecting handlers at runtime.

use std::collections::HashMap;

use axum::http::Method;

const RESOURCE_SUFFIX: &str = "Resource";

/// Action that ends a case.
pub const TERMINAL_ACTION: &str = "logout";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Delete,
    /// A named operation outside the six standard ones, in snake case.
    Custom(&'static str),
}

impl Action {
    pub fn display_name(&self) -> String {
        match self {
            Action::List => "List".to_string(),
            Action::Create => "Create".to_string(),
            Action::Retrieve => "Retrieve".to_string(),
            Action::Update => "Update".to_string(),
            Action::PartialUpdate => "Partial Update".to_string(),
            Action::Delete => "Delete".to_string(),
            Action::Custom(name) => capitalize(name),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Custom(name) if *name == TERMINAL_ACTION)
    }
}

/// Upper-cases the first character and lower-cases the rest. Separators are
/// kept, so `calculate_price` becomes `Calculate_price`.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    type_name: &'static str,
    display: Option<&'static str>,
}

impl Resource {
    pub const fn named(type_name: &'static str) -> Self {
        Resource {
            type_name,
            display: None,
        }
    }

    /// Overrides the name shown in the audit log.
    pub const fn display_as(self, display: &'static str) -> Self {
        Resource {
            type_name: self.type_name,
            display: Some(display),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self.display {
            Some(display) => display,
            None => self
                .type_name
                .strip_suffix(RESOURCE_SUFFIX)
                .filter(|name| !name.is_empty())
                .unwrap_or(self.type_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
    pub resource: Resource,
    pub action: Action,
}

impl Activity {
    pub fn name(&self) -> String {
        format!("{} {}", self.resource.display_name(), self.action.display_name())
    }
}

/// What the recorder writes for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedActivity {
    pub name: String,
    pub terminal: bool,
}

#[derive(Debug, Default)]
pub struct ActivityRegistry {
    entries: HashMap<Method, HashMap<&'static str, Activity>>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        method: Method,
        path: &'static str,
        resource: Resource,
        action: Action,
    ) -> &mut Self {
        self.entries
            .entry(method)
            .or_default()
            .insert(path, Activity { resource, action });
        self
    }

    /// `GET` lists, `POST` creates.
    pub fn collection(&mut self, path: &'static str, resource: Resource) -> &mut Self {
        self.register(Method::GET, path, resource, Action::List)
            .register(Method::POST, path, resource, Action::Create)
    }

    /// `GET` retrieves, `PUT` updates, `PATCH` partially updates, `DELETE` deletes.
    pub fn detail(&mut self, path: &'static str, resource: Resource) -> &mut Self {
        self.register(Method::GET, path, resource, Action::Retrieve)
            .register(Method::PUT, path, resource, Action::Update)
            .register(Method::PATCH, path, resource, Action::PartialUpdate)
            .register(Method::DELETE, path, resource, Action::Delete)
    }

    pub fn get(&self, method: &Method, path: &str) -> Option<&Activity> {
        self.entries.get(method)?.get(path)
    }

    /// Unregistered or unrouted requests are named after their method.
    pub fn resolve(&self, method: &Method, path: Option<&str>) -> ResolvedActivity {
        match path.and_then(|p| self.get(method, p)) {
            Some(activity) => ResolvedActivity {
                name: activity.name(),
                terminal: activity.action.is_terminal(),
            },
            None => ResolvedActivity {
                name: format!("Unknown Activity {}", method),
                terminal: false,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKINGS: Resource = Resource::named("RoomBookingResource").display_as("Room Booking");

    fn registry() -> ActivityRegistry {
        let mut registry = ActivityRegistry::new();
        registry
            .collection("/api/room-bookings", BOOKINGS)
            .detail("/api/room-bookings/{id}", BOOKINGS)
            .register(
                Method::POST,
                "/api/room-bookings/calculate-price",
                BOOKINGS,
                Action::Custom("calculate_price"),
            )
            .register(
                Method::POST,
                "/api/users/logout",
                Resource::named("UserResource"),
                Action::Custom("logout"),
            );
        registry
    }

    #[test]
    fn test_standard_actions() {
        let registry = registry();
        let cases = [
            (Method::GET, "/api/room-bookings", "Room Booking List"),
            (Method::POST, "/api/room-bookings", "Room Booking Create"),
            (Method::GET, "/api/room-bookings/{id}", "Room Booking Retrieve"),
            (Method::PUT, "/api/room-bookings/{id}", "Room Booking Update"),
            (Method::PATCH, "/api/room-bookings/{id}", "Room Booking Partial Update"),
            (Method::DELETE, "/api/room-bookings/{id}", "Room Booking Delete"),
        ];
        for (method, path, expected) in cases {
            assert_eq!(registry.resolve(&method, Some(path)).name, expected);
        }
    }

    #[test]
    fn test_custom_action_is_capitalized() {
        let resolved =
            registry().resolve(&Method::POST, Some("/api/room-bookings/calculate-price"));
        assert_eq!(resolved.name, "Room Booking Calculate_price");
        assert!(!resolved.terminal);
    }

    #[test]
    fn test_resource_falls_back_to_type_name() {
        let resolved = registry().resolve(&Method::POST, Some("/api/users/logout"));
        assert_eq!(resolved.name, "User Logout");
        assert!(resolved.terminal);
    }

    #[test]
    fn test_unknown_activity() {
        let registry = registry();
        assert_eq!(
            registry.resolve(&Method::GET, Some("/api/nowhere")).name,
            "Unknown Activity GET"
        );
        assert_eq!(registry.resolve(&Method::DELETE, None).name, "Unknown Activity DELETE");
    }

    #[test]
    fn test_capitalize_keeps_separators() {
        assert_eq!(capitalize("calculate_price"), "Calculate_price");
        assert_eq!(capitalize("export-CSV"), "Export-csv");
        assert_eq!(capitalize("logout"), "Logout");
        assert_eq!(capitalize(""), "");
    }
}
