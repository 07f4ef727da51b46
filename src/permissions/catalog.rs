// permissions/catalog.rs - Capability tokens and per-role default grants

use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::Role;

pub const DASHBOARD_VIEW: &str = "dashboard:view";

pub const CUSTOMERS_VIEW: &str = "customers:view";
pub const CUSTOMERS_CREATE: &str = "customers:create";
pub const CUSTOMERS_EDIT: &str = "customers:edit";
pub const CUSTOMERS_DELETE: &str = "customers:delete";

pub const PPPOE_VIEW: &str = "pppoe:view";
pub const PPPOE_CREATE: &str = "pppoe:create";
pub const PPPOE_EDIT: &str = "pppoe:edit";
pub const PPPOE_DELETE: &str = "pppoe:delete";
pub const PPPOE_DISCONNECT: &str = "pppoe:disconnect";

pub const HOTSPOT_VIEW: &str = "hotspot:view";
pub const HOTSPOT_CREATE: &str = "hotspot:create";
pub const HOTSPOT_EDIT: &str = "hotspot:edit";
pub const HOTSPOT_DELETE: &str = "hotspot:delete";

pub const VOUCHERS_VIEW: &str = "vouchers:view";
pub const VOUCHERS_CREATE: &str = "vouchers:create";
pub const VOUCHERS_DELETE: &str = "vouchers:delete";

pub const PACKAGES_VIEW: &str = "packages:view";
pub const PACKAGES_CREATE: &str = "packages:create";
pub const PACKAGES_EDIT: &str = "packages:edit";
pub const PACKAGES_DELETE: &str = "packages:delete";

pub const ROUTERS_VIEW: &str = "routers:view";
pub const ROUTERS_CREATE: &str = "routers:create";
pub const ROUTERS_EDIT: &str = "routers:edit";
pub const ROUTERS_DELETE: &str = "routers:delete";
pub const ROUTERS_CONFIGURE: &str = "routers:configure";

pub const PAYMENTS_VIEW: &str = "payments:view";
pub const PAYMENTS_CREATE: &str = "payments:create";
pub const INVOICES_VIEW: &str = "invoices:view";
pub const INVOICES_CREATE: &str = "invoices:create";

pub const SMS_VIEW: &str = "sms:view";
pub const SMS_SEND: &str = "sms:send";

pub const REPORTS_VIEW: &str = "reports:view";
pub const REPORTS_EXPORT: &str = "reports:export";

pub const TICKETS_VIEW: &str = "tickets:view";
pub const TICKETS_CREATE: &str = "tickets:create";
pub const TICKETS_EDIT: &str = "tickets:edit";

pub const USERS_VIEW: &str = "users:view";
pub const USERS_CREATE: &str = "users:create";
pub const USERS_EDIT: &str = "users:edit";
pub const USERS_DELETE: &str = "users:delete";

pub const AUDIT_VIEW: &str = "audit:view";

pub const SETTINGS_VIEW: &str = "settings:view";
pub const SETTINGS_GENERAL: &str = "settings:general";
pub const SETTINGS_SMS: &str = "settings:sms";
pub const SETTINGS_LICENCE: &str = "settings:licence";
pub const SETTINGS_PAYMENT_GATEWAY: &str = "settings:payment_gateway";

/// Every capability token the platform knows about
pub const ALL: &[&str] = &[
    DASHBOARD_VIEW,
    CUSTOMERS_VIEW,
    CUSTOMERS_CREATE,
    CUSTOMERS_EDIT,
    CUSTOMERS_DELETE,
    PPPOE_VIEW,
    PPPOE_CREATE,
    PPPOE_EDIT,
    PPPOE_DELETE,
    PPPOE_DISCONNECT,
    HOTSPOT_VIEW,
    HOTSPOT_CREATE,
    HOTSPOT_EDIT,
    HOTSPOT_DELETE,
    VOUCHERS_VIEW,
    VOUCHERS_CREATE,
    VOUCHERS_DELETE,
    PACKAGES_VIEW,
    PACKAGES_CREATE,
    PACKAGES_EDIT,
    PACKAGES_DELETE,
    ROUTERS_VIEW,
    ROUTERS_CREATE,
    ROUTERS_EDIT,
    ROUTERS_DELETE,
    ROUTERS_CONFIGURE,
    PAYMENTS_VIEW,
    PAYMENTS_CREATE,
    INVOICES_VIEW,
    INVOICES_CREATE,
    SMS_VIEW,
    SMS_SEND,
    REPORTS_VIEW,
    REPORTS_EXPORT,
    TICKETS_VIEW,
    TICKETS_CREATE,
    TICKETS_EDIT,
    USERS_VIEW,
    USERS_CREATE,
    USERS_EDIT,
    USERS_DELETE,
    AUDIT_VIEW,
    SETTINGS_VIEW,
    SETTINGS_GENERAL,
    SETTINGS_SMS,
    SETTINGS_LICENCE,
    SETTINGS_PAYMENT_GATEWAY,
];

/// Tokens withheld from ADMIN by default; grantable through an explicit override
pub const ADMIN_RESTRICTED: &[&str] = &[SETTINGS_LICENCE, SETTINGS_PAYMENT_GATEWAY];

const MANAGER: &[&str] = &[
    DASHBOARD_VIEW,
    CUSTOMERS_VIEW,
    CUSTOMERS_CREATE,
    CUSTOMERS_EDIT,
    PPPOE_VIEW,
    PPPOE_CREATE,
    PPPOE_EDIT,
    PPPOE_DISCONNECT,
    HOTSPOT_VIEW,
    HOTSPOT_CREATE,
    HOTSPOT_EDIT,
    VOUCHERS_VIEW,
    VOUCHERS_CREATE,
    PACKAGES_VIEW,
    PACKAGES_CREATE,
    PACKAGES_EDIT,
    ROUTERS_VIEW,
    ROUTERS_EDIT,
    PAYMENTS_VIEW,
    INVOICES_VIEW,
    SMS_VIEW,
    SMS_SEND,
    REPORTS_VIEW,
    REPORTS_EXPORT,
    TICKETS_VIEW,
    TICKETS_CREATE,
    TICKETS_EDIT,
    USERS_VIEW,
    SETTINGS_VIEW,
];

const ACCOUNTANT: &[&str] = &[
    DASHBOARD_VIEW,
    CUSTOMERS_VIEW,
    PACKAGES_VIEW,
    PAYMENTS_VIEW,
    PAYMENTS_CREATE,
    INVOICES_VIEW,
    INVOICES_CREATE,
    REPORTS_VIEW,
    REPORTS_EXPORT,
];

const SUPPORT: &[&str] = &[
    DASHBOARD_VIEW,
    CUSTOMERS_VIEW,
    CUSTOMERS_EDIT,
    PPPOE_VIEW,
    PPPOE_DISCONNECT,
    HOTSPOT_VIEW,
    VOUCHERS_VIEW,
    PACKAGES_VIEW,
    ROUTERS_VIEW,
    SMS_VIEW,
    SMS_SEND,
    TICKETS_VIEW,
    TICKETS_CREATE,
    TICKETS_EDIT,
];

const FIELD_TECH: &[&str] = &[
    DASHBOARD_VIEW,
    CUSTOMERS_VIEW,
    PPPOE_VIEW,
    HOTSPOT_VIEW,
    ROUTERS_VIEW,
    ROUTERS_CONFIGURE,
    TICKETS_VIEW,
    TICKETS_EDIT,
];

const VIEWER: &[&str] = &[
    DASHBOARD_VIEW,
    CUSTOMERS_VIEW,
    PPPOE_VIEW,
    HOTSPOT_VIEW,
    PACKAGES_VIEW,
    ROUTERS_VIEW,
    REPORTS_VIEW,
];

fn to_set(tokens: &[&'static str]) -> HashSet<&'static str> {
    tokens.iter().copied().collect()
}

static SUPER_ADMIN_DEFAULTS: Lazy<HashSet<&'static str>> = Lazy::new(|| to_set(ALL));
static ADMIN_DEFAULTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ALL.iter()
        .copied()
        .filter(|token| !ADMIN_RESTRICTED.contains(token))
        .collect()
});
static MANAGER_DEFAULTS: Lazy<HashSet<&'static str>> = Lazy::new(|| to_set(MANAGER));
static ACCOUNTANT_DEFAULTS: Lazy<HashSet<&'static str>> = Lazy::new(|| to_set(ACCOUNTANT));
static SUPPORT_DEFAULTS: Lazy<HashSet<&'static str>> = Lazy::new(|| to_set(SUPPORT));
static FIELD_TECH_DEFAULTS: Lazy<HashSet<&'static str>> = Lazy::new(|| to_set(FIELD_TECH));
static VIEWER_DEFAULTS: Lazy<HashSet<&'static str>> = Lazy::new(|| to_set(VIEWER));

/// Immutable default grant set for a role
pub fn defaults(role: Role) -> &'static HashSet<&'static str> {
    match role {
        Role::SuperAdmin => &SUPER_ADMIN_DEFAULTS,
        Role::Admin => &ADMIN_DEFAULTS,
        Role::Manager => &MANAGER_DEFAULTS,
        Role::Accountant => &ACCOUNTANT_DEFAULTS,
        Role::Support => &SUPPORT_DEFAULTS,
        Role::FieldTech => &FIELD_TECH_DEFAULTS,
        Role::Viewer => &VIEWER_DEFAULTS,
    }
}
