//! Role based access control.
//!
//! Users sign in through the proxy in front of this server, which forwards the
//! role of the signed in user in the [ROLE_HEADER] header. The guards in this
//! module turn that header into a [Role] and stop requests from roles that may
//! not use a route.

use std::fmt::Display;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{Error, endpoints, forbidden::ForbiddenError};

/// The request header that carries the role of the current user.
pub const ROLE_HEADER: &str = "x-stock-role";

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Records stock taken out of the store.
    Installer,
    /// Reviews transactions and has access to everything else.
    Admin,
    /// Reads the reports and downloads exports.
    Manager,
}

impl Role {
    /// Parse a role from its header value, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "installer" => Some(Role::Installer),
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            _ => None,
        }
    }

    /// Get the role from the [ROLE_HEADER] header.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(Role::parse)
    }

    /// The page a user with this role starts on.
    pub fn landing_page(self) -> &'static str {
        match self {
            Role::Installer => endpoints::STOCK_OUT_VIEW,
            Role::Admin => endpoints::REVIEW_VIEW,
            Role::Manager => endpoints::REPORTS_VIEW,
        }
    }

    /// Whether this role may record stock-out transactions.
    pub fn can_record_stock(self) -> bool {
        matches!(self, Role::Installer | Role::Admin)
    }

    /// Whether this role may approve or reject transactions.
    pub fn can_review(self) -> bool {
        self == Role::Admin
    }

    /// Whether this role may see reports and download exports.
    pub fn can_view_reports(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Installer => "installer",
            Role::Admin => "admin",
            Role::Manager => "manager",
        };

        f.write_str(name)
    }
}

/// The roles that may use a group of routes.
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [Role]);

/// Routes any signed in user may use.
pub const ANY_ROLE: AllowedRoles = AllowedRoles(&[Role::Installer, Role::Admin, Role::Manager]);
/// Routes for recording stock.
pub const STOCK_ROLES: AllowedRoles = AllowedRoles(&[Role::Installer, Role::Admin]);
/// Routes for reviewing transactions.
pub const REVIEW_ROLES: AllowedRoles = AllowedRoles(&[Role::Admin]);
/// Routes for reports and exports.
pub const REPORT_ROLES: AllowedRoles = AllowedRoles(&[Role::Admin, Role::Manager]);

#[inline]
async fn role_guard_internal(
    allowed: AllowedRoles,
    mut request: Request,
    next: Next,
    get_forbidden: impl Fn() -> Response,
) -> Response {
    let Some(role) = Role::from_headers(request.headers()) else {
        tracing::warn!(
            "Request to {} has a missing or unknown {ROLE_HEADER} header",
            request.uri()
        );
        return get_forbidden();
    };

    if !allowed.0.contains(&role) {
        tracing::warn!("Role {role} may not access {}", request.uri());
        return get_forbidden();
    }

    request.extensions_mut().insert(role);
    next.run(request).await
}

/// Middleware function that checks the role of the current user.
/// The role is placed into the request and then the request executed normally
/// if the role is allowed, otherwise a 403 page is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(role): Extension<Role>` to receive the role.
pub async fn role_guard(
    State(allowed): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Response {
    role_guard_internal(allowed, request, next, || {
        ForbiddenError.into_response()
    })
    .await
}

/// Middleware function that checks the role of the current user.
/// The role is placed into the request and then the request executed normally
/// if the role is allowed, otherwise an alert for HTMX to display is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(role): Extension<Role>` to receive the role.
pub async fn role_guard_hx(
    State(allowed): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Response {
    role_guard_internal(allowed, request, next, || {
        Error::Forbidden.into_alert_response()
    })
    .await
}
