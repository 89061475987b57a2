//! Named routes added for every registration-enabled host kind.

use serde::Serialize;

use crate::models::HostKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Broadcast,
    Manage,
    Register,
    Settings,
}

impl RouteKind {
    pub const ALL: [RouteKind; 4] = [
        RouteKind::Broadcast,
        RouteKind::Manage,
        RouteKind::Register,
        RouteKind::Settings,
    ];

    fn name_suffix(&self) -> &'static str {
        match self {
            RouteKind::Broadcast => "broadcast",
            RouteKind::Manage => "manage_registrations",
            RouteKind::Register => "register",
            RouteKind::Settings => "registration_settings",
        }
    }

    fn path_suffix(&self) -> &'static str {
        match self {
            RouteKind::Broadcast => "registrations/broadcast",
            RouteKind::Manage => "registrations",
            RouteKind::Register => "register",
            RouteKind::Settings => "registrations/settings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RouteDefinition {
    pub name: String,
    pub path: String,
    pub admin_route: bool,
}

pub const REGISTRATION_CANONICAL_ROUTE: &str = "entity.registration.canonical";

pub fn route_name(entity_type_id: &str, kind: RouteKind) -> String {
    format!("entity.{}.registration.{}", entity_type_id, kind.name_suffix())
}

/// Path pattern with the host id as a `{<entity_type_id>}` placeholder.
pub fn route_path(entity_type_id: &str, kind: RouteKind) -> String {
    format!(
        "/{0}/{{{0}}}/{1}",
        entity_type_id,
        kind.path_suffix()
    )
}

/// All routes for the given host kinds, plus the registration canonical
/// route flagged to use the administration theme.
pub fn registration_routes(kinds: &[HostKind]) -> Vec<RouteDefinition> {
    let mut routes = vec![RouteDefinition {
        name: REGISTRATION_CANONICAL_ROUTE.to_string(),
        path: "/registration/{registration}".to_string(),
        admin_route: true,
    }];

    for kind in kinds {
        for route in RouteKind::ALL {
            routes.push(RouteDefinition {
                name: route_name(kind.entity_type_id(), route),
                path: route_path(kind.entity_type_id(), route),
                admin_route: false,
            });
        }
    }

    routes
}
