//! Table of Zabbix API methods and the wrappers generated from it.
//!
//! Each entry names the remote method and whether it needs a session
//! token. The same table produces `METHODS`, the name lookup used by
//! `ZabbixApi::request`, and one `ZabbixApi` method per entry, so the three
//! cannot drift apart. Entries marked `manual` have hand-written wrappers
//! because they change session state.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::Value;

use crate::client::ZabbixApi;
use crate::error::Result;

/// One remote method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiMethod {
    pub name: &'static str,
    pub requires_auth: bool,
}

macro_rules! api_wrapper {
    ($wrapper:ident, $method:literal, $auth:literal, manual) => {};
    ($wrapper:ident, $method:literal, $auth:literal) => {
        #[doc = concat!("Calls `", $method, "` with normalized `params`.")]
        pub fn $wrapper(&mut self, params: impl Into<Value>, key_field: Option<&str>) -> Result<Value> {
            self.invoke($method, params.into(), key_field, $auth)
        }
    };
}

macro_rules! api_methods {
    ($(($wrapper:ident, $method:literal, $auth:literal $(, $manual:ident)?)),* $(,)?) => {
        /// Every known API method.
        pub static METHODS: &[ApiMethod] = &[
            $(ApiMethod { name: $method, requires_auth: $auth },)*
        ];

        impl ZabbixApi {
            $(api_wrapper!($wrapper, $method, $auth $(, $manual)?);)*
        }
    };
}

api_methods! {
    (action_create, "action.create", true),
    (action_delete, "action.delete", true),
    (action_get, "action.get", true),
    (action_update, "action.update", true),
    (alert_get, "alert.get", true),
    (apiinfo_version, "apiinfo.version", false),
    (application_create, "application.create", true),
    (application_delete, "application.delete", true),
    (application_get, "application.get", true),
    (application_massadd, "application.massadd", true),
    (application_update, "application.update", true),
    (auditlog_get, "auditlog.get", true),
    (authentication_get, "authentication.get", true),
    (authentication_update, "authentication.update", true),
    (autoregistration_get, "autoregistration.get", true),
    (autoregistration_update, "autoregistration.update", true),
    (configuration_export, "configuration.export", true),
    (configuration_import, "configuration.import", true),
    (configuration_importcompare, "configuration.importcompare", true),
    (connector_create, "connector.create", true),
    (connector_delete, "connector.delete", true),
    (connector_get, "connector.get", true),
    (connector_update, "connector.update", true),
    (correlation_create, "correlation.create", true),
    (correlation_delete, "correlation.delete", true),
    (correlation_get, "correlation.get", true),
    (correlation_update, "correlation.update", true),
    (dashboard_create, "dashboard.create", true),
    (dashboard_delete, "dashboard.delete", true),
    (dashboard_get, "dashboard.get", true),
    (dashboard_update, "dashboard.update", true),
    (dcheck_get, "dcheck.get", true),
    (dhost_get, "dhost.get", true),
    (discoveryrule_copy, "discoveryrule.copy", true),
    (discoveryrule_create, "discoveryrule.create", true),
    (discoveryrule_delete, "discoveryrule.delete", true),
    (discoveryrule_get, "discoveryrule.get", true),
    (discoveryrule_update, "discoveryrule.update", true),
    (drule_create, "drule.create", true),
    (drule_delete, "drule.delete", true),
    (drule_get, "drule.get", true),
    (drule_update, "drule.update", true),
    (dservice_get, "dservice.get", true),
    (event_acknowledge, "event.acknowledge", true),
    (event_get, "event.get", true),
    (graph_create, "graph.create", true),
    (graph_delete, "graph.delete", true),
    (graph_get, "graph.get", true),
    (graph_update, "graph.update", true),
    (graphitem_get, "graphitem.get", true),
    (graphprototype_create, "graphprototype.create", true),
    (graphprototype_delete, "graphprototype.delete", true),
    (graphprototype_get, "graphprototype.get", true),
    (graphprototype_update, "graphprototype.update", true),
    (hanode_get, "hanode.get", true),
    (history_clear, "history.clear", true),
    (history_get, "history.get", true),
    (host_create, "host.create", true),
    (host_delete, "host.delete", true),
    (host_get, "host.get", true),
    (host_massadd, "host.massadd", true),
    (host_massremove, "host.massremove", true),
    (host_massupdate, "host.massupdate", true),
    (host_update, "host.update", true),
    (hostgroup_create, "hostgroup.create", true),
    (hostgroup_delete, "hostgroup.delete", true),
    (hostgroup_get, "hostgroup.get", true),
    (hostgroup_massadd, "hostgroup.massadd", true),
    (hostgroup_massremove, "hostgroup.massremove", true),
    (hostgroup_massupdate, "hostgroup.massupdate", true),
    (hostgroup_propagate, "hostgroup.propagate", true),
    (hostgroup_update, "hostgroup.update", true),
    (hostinterface_create, "hostinterface.create", true),
    (hostinterface_delete, "hostinterface.delete", true),
    (hostinterface_get, "hostinterface.get", true),
    (hostinterface_massadd, "hostinterface.massadd", true),
    (hostinterface_massremove, "hostinterface.massremove", true),
    (hostinterface_replacehostinterfaces, "hostinterface.replacehostinterfaces", true),
    (hostinterface_update, "hostinterface.update", true),
    (hostprototype_create, "hostprototype.create", true),
    (hostprototype_delete, "hostprototype.delete", true),
    (hostprototype_get, "hostprototype.get", true),
    (hostprototype_update, "hostprototype.update", true),
    (housekeeping_get, "housekeeping.get", true),
    (housekeeping_update, "housekeeping.update", true),
    (httptest_create, "httptest.create", true),
    (httptest_delete, "httptest.delete", true),
    (httptest_get, "httptest.get", true),
    (httptest_update, "httptest.update", true),
    (iconmap_create, "iconmap.create", true),
    (iconmap_delete, "iconmap.delete", true),
    (iconmap_get, "iconmap.get", true),
    (iconmap_update, "iconmap.update", true),
    (image_create, "image.create", true),
    (image_delete, "image.delete", true),
    (image_get, "image.get", true),
    (image_update, "image.update", true),
    (item_create, "item.create", true),
    (item_delete, "item.delete", true),
    (item_get, "item.get", true),
    (item_update, "item.update", true),
    (itemprototype_create, "itemprototype.create", true),
    (itemprototype_delete, "itemprototype.delete", true),
    (itemprototype_get, "itemprototype.get", true),
    (itemprototype_update, "itemprototype.update", true),
    (maintenance_create, "maintenance.create", true),
    (maintenance_delete, "maintenance.delete", true),
    (maintenance_get, "maintenance.get", true),
    (maintenance_update, "maintenance.update", true),
    (map_create, "map.create", true),
    (map_delete, "map.delete", true),
    (map_get, "map.get", true),
    (map_update, "map.update", true),
    (mediatype_create, "mediatype.create", true),
    (mediatype_delete, "mediatype.delete", true),
    (mediatype_get, "mediatype.get", true),
    (mediatype_update, "mediatype.update", true),
    (mfa_create, "mfa.create", true),
    (mfa_delete, "mfa.delete", true),
    (mfa_get, "mfa.get", true),
    (mfa_update, "mfa.update", true),
    (problem_get, "problem.get", true),
    (proxy_create, "proxy.create", true),
    (proxy_delete, "proxy.delete", true),
    (proxy_get, "proxy.get", true),
    (proxy_update, "proxy.update", true),
    (proxygroup_create, "proxygroup.create", true),
    (proxygroup_delete, "proxygroup.delete", true),
    (proxygroup_get, "proxygroup.get", true),
    (proxygroup_update, "proxygroup.update", true),
    (regexp_create, "regexp.create", true),
    (regexp_delete, "regexp.delete", true),
    (regexp_get, "regexp.get", true),
    (regexp_update, "regexp.update", true),
    (report_create, "report.create", true),
    (report_delete, "report.delete", true),
    (report_get, "report.get", true),
    (report_update, "report.update", true),
    (role_create, "role.create", true),
    (role_delete, "role.delete", true),
    (role_get, "role.get", true),
    (role_update, "role.update", true),
    (script_create, "script.create", true),
    (script_delete, "script.delete", true),
    (script_execute, "script.execute", true),
    (script_get, "script.get", true),
    (script_getscriptsbyhosts, "script.getscriptsbyhosts", true),
    (script_update, "script.update", true),
    (service_adddependencies, "service.adddependencies", true),
    (service_addtimes, "service.addtimes", true),
    (service_create, "service.create", true),
    (service_delete, "service.delete", true),
    (service_deletedependencies, "service.deletedependencies", true),
    (service_deletetimes, "service.deletetimes", true),
    (service_get, "service.get", true),
    (service_getsla, "service.getsla", true),
    (service_update, "service.update", true),
    (settings_get, "settings.get", true),
    (settings_update, "settings.update", true),
    (sla_create, "sla.create", true),
    (sla_delete, "sla.delete", true),
    (sla_get, "sla.get", true),
    (sla_getsli, "sla.getsli", true),
    (sla_update, "sla.update", true),
    (task_create, "task.create", true),
    (task_get, "task.get", true),
    (template_create, "template.create", true),
    (template_delete, "template.delete", true),
    (template_get, "template.get", true),
    (template_massadd, "template.massadd", true),
    (template_massremove, "template.massremove", true),
    (template_massupdate, "template.massupdate", true),
    (template_update, "template.update", true),
    (templatedashboard_create, "templatedashboard.create", true),
    (templatedashboard_delete, "templatedashboard.delete", true),
    (templatedashboard_get, "templatedashboard.get", true),
    (templatedashboard_update, "templatedashboard.update", true),
    (templategroup_create, "templategroup.create", true),
    (templategroup_delete, "templategroup.delete", true),
    (templategroup_get, "templategroup.get", true),
    (templategroup_massadd, "templategroup.massadd", true),
    (templategroup_massremove, "templategroup.massremove", true),
    (templategroup_massupdate, "templategroup.massupdate", true),
    (templategroup_propagate, "templategroup.propagate", true),
    (templategroup_update, "templategroup.update", true),
    (token_create, "token.create", true),
    (token_delete, "token.delete", true),
    (token_generate, "token.generate", true),
    (token_get, "token.get", true),
    (token_update, "token.update", true),
    (trend_get, "trend.get", true),
    (trigger_adddependencies, "trigger.adddependencies", true),
    (trigger_create, "trigger.create", true),
    (trigger_delete, "trigger.delete", true),
    (trigger_deletedependencies, "trigger.deletedependencies", true),
    (trigger_get, "trigger.get", true),
    (trigger_update, "trigger.update", true),
    (triggerprototype_create, "triggerprototype.create", true),
    (triggerprototype_delete, "triggerprototype.delete", true),
    (triggerprototype_get, "triggerprototype.get", true),
    (triggerprototype_update, "triggerprototype.update", true),
    (user_check_authentication, "user.checkAuthentication", false),
    (user_create, "user.create", true),
    (user_delete, "user.delete", true),
    (user_get, "user.get", true),
    (user_login, "user.login", false, manual),
    (user_logout, "user.logout", true, manual),
    (user_provision, "user.provision", true),
    (user_resettotp, "user.resettotp", true),
    (user_unblock, "user.unblock", true),
    (user_update, "user.update", true),
    (userdirectory_create, "userdirectory.create", true),
    (userdirectory_delete, "userdirectory.delete", true),
    (userdirectory_get, "userdirectory.get", true),
    (userdirectory_test, "userdirectory.test", true),
    (userdirectory_update, "userdirectory.update", true),
    (usergroup_create, "usergroup.create", true),
    (usergroup_delete, "usergroup.delete", true),
    (usergroup_get, "usergroup.get", true),
    (usergroup_update, "usergroup.update", true),
    (usermacro_create, "usermacro.create", true),
    (usermacro_createglobal, "usermacro.createglobal", true),
    (usermacro_delete, "usermacro.delete", true),
    (usermacro_deleteglobal, "usermacro.deleteglobal", true),
    (usermacro_get, "usermacro.get", true),
    (usermacro_update, "usermacro.update", true),
    (usermacro_updateglobal, "usermacro.updateglobal", true),
    (valuemap_create, "valuemap.create", true),
    (valuemap_delete, "valuemap.delete", true),
    (valuemap_get, "valuemap.get", true),
    (valuemap_update, "valuemap.update", true),
}

// Zabbix matches method names case-insensitively.
static INDEX: LazyLock<HashMap<String, &'static ApiMethod>> =
    LazyLock::new(|| METHODS.iter().map(|m| (m.name.to_ascii_lowercase(), m)).collect());

pub fn lookup(name: &str) -> Option<&'static ApiMethod> {
    INDEX.get(&name.to_ascii_lowercase()).copied()
}

/// Whether `name` must be called with a session token. Unknown methods do.
pub fn requires_auth(name: &str) -> bool {
    lookup(name).is_none_or(|m| m.requires_auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn anonymous_methods() {
        let anonymous: Vec<&str> = METHODS.iter().filter(|m| !m.requires_auth).map(|m| m.name).collect();
        assert_eq!(anonymous, ["apiinfo.version", "user.checkAuthentication", "user.login"]);
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<String> = METHODS.iter().map(|m| m.name.to_ascii_lowercase()).collect();
        assert_eq!(names.len(), METHODS.len());
        assert!(METHODS.len() > 200);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let m = lookup("user.checkauthentication").unwrap();
        assert_eq!(m.name, "user.checkAuthentication");
        assert!(!m.requires_auth);
        assert_eq!(lookup("HOST.GET").unwrap().name, "host.get");
    }

    #[test]
    fn unknown_methods_require_auth() {
        assert!(lookup("widget.frobnicate").is_none());
        assert!(requires_auth("widget.frobnicate"));
        assert!(requires_auth("host.get"));
        assert!(!requires_auth("apiinfo.version"));
    }
}
