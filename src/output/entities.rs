//
//  harbor-client
//  output/entities.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Table rendering for the API entities.

use std::collections::BTreeMap;

use super::{
    format_bool, format_status, or_dash, print_field, print_header, truncate, TableBuilder,
    TableOutput, TableRow,
};
use crate::api::project::{Project, ProjectMember, Role};
use crate::api::registry::Registry;
use crate::api::replication::{ReplicationExecution, ReplicationPolicy};
use crate::api::system::{GcSchedule, Health, Statistics, SystemInfo};
use crate::api::user::{User, UserSearchResult};
use crate::api::webhook::WebhookPolicy;
use crate::util::{format_size, format_time};

impl TableRow for User {
    fn headers() -> &'static [&'static str] {
        &["ID", "USERNAME", "EMAIL", "REAL NAME", "ADMIN"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.username.clone(),
            or_dash(self.email.as_deref()),
            or_dash(self.realname.as_deref()),
            format_bool(self.sysadmin_flag, color),
        ]
    }
}

impl TableOutput for User {
    fn print_table(&self, color: bool) {
        print_header(&self.username);
        print_field("ID", &self.user_id.to_string(), color);
        print_field("Email", &or_dash(self.email.as_deref()), color);
        print_field("Real name", &or_dash(self.realname.as_deref()), color);
        print_field("Comment", &or_dash(self.comment.as_deref()), color);
        print_field("System admin", &format_bool(self.sysadmin_flag, color), color);
        print_field("Created", &format_time(self.creation_time), color);
        print_field("Updated", &format_time(self.update_time), color);
    }
}

impl TableRow for UserSearchResult {
    fn headers() -> &'static [&'static str] {
        &["ID", "USERNAME"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![self.user_id.to_string(), self.username.clone()]
    }
}

impl TableRow for Project {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "PUBLIC", "REPOS", "OWNER", "CREATED"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.project_id.to_string(),
            self.name.clone(),
            format_bool(self.is_public(), color),
            self.repo_count.to_string(),
            or_dash(self.owner_name.as_deref()),
            format_time(self.creation_time),
        ]
    }
}

impl TableOutput for Project {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        print_field("ID", &self.project_id.to_string(), color);
        print_field("Owner", &or_dash(self.owner_name.as_deref()), color);
        print_field("Public", &format_bool(self.is_public(), color), color);
        print_field("Repositories", &self.repo_count.to_string(), color);
        if let Some(registry_id) = self.registry_id {
            print_field("Proxy cache registry", &registry_id.to_string(), color);
        }
        print_field("Created", &format_time(self.creation_time), color);

        let metadata = &self.metadata;
        let entries = [
            ("auto_scan", &metadata.auto_scan),
            ("enable_content_trust", &metadata.enable_content_trust),
            ("prevent_vul", &metadata.prevent_vul),
            ("severity", &metadata.severity),
            ("reuse_sys_cve_allowlist", &metadata.reuse_sys_cve_allowlist),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                print_field(key, value, color);
            }
        }
    }
}

impl TableRow for ProjectMember {
    fn headers() -> &'static [&'static str] {
        &["MID", "NAME", "TYPE", "ROLE"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        let role = self
            .role_name
            .clone()
            .or_else(|| Role::from_id(self.role_id).map(|r| r.to_string()))
            .unwrap_or_else(|| self.role_id.to_string());
        let kind = if self.is_user() { "user" } else { "group" };

        vec![
            self.id.to_string(),
            self.entity_name.clone(),
            kind.to_string(),
            role,
        ]
    }
}

/// Project metadata as a key/value table.
impl TableOutput for BTreeMap<String, String> {
    fn print_table(&self, _color: bool) {
        TableBuilder::new()
            .headers(["KEY", "VALUE"])
            .rows(self.iter().map(|(k, v)| [k.clone(), v.clone()]))
            .print();
    }
}

impl TableRow for Registry {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "TYPE", "URL", "STATUS"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.kind.clone(),
            truncate(&self.url, 48),
            format_status(&or_dash(self.status.as_deref()), color),
        ]
    }
}

impl TableOutput for Registry {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        print_field("ID", &self.id.to_string(), color);
        print_field("Type", &self.kind, color);
        print_field("URL", &self.url, color);
        print_field("Insecure", &format_bool(self.insecure, color), color);
        print_field(
            "Status",
            &format_status(&or_dash(self.status.as_deref()), color),
            color,
        );
        if let Some(credential) = &self.credential {
            print_field("Credential", &credential.kind, color);
            print_field("Access key", &or_dash(credential.access_key.as_deref()), color);
        }
        print_field("Description", &or_dash(self.description.as_deref()), color);
    }
}

fn trigger_label(policy: &ReplicationPolicy) -> String {
    match &policy.trigger {
        Some(trigger) => match &trigger.trigger_settings {
            Some(settings) if !settings.cron.is_empty() => {
                format!("{} ({})", trigger.kind, settings.cron)
            }
            _ => trigger.kind.clone(),
        },
        None => "manual".to_string(),
    }
}

fn registry_label(registry: Option<&Registry>) -> String {
    registry
        .map(|r| r.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

impl TableRow for ReplicationPolicy {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "SOURCE", "DESTINATION", "TRIGGER", "ENABLED"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            registry_label(self.src_registry.as_ref()),
            registry_label(self.dest_registry.as_ref()),
            trigger_label(self),
            format_bool(self.enabled, color),
        ]
    }
}

impl TableOutput for ReplicationPolicy {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        print_field("ID", &self.id.to_string(), color);
        print_field("Source", &registry_label(self.src_registry.as_ref()), color);
        print_field(
            "Destination",
            &registry_label(self.dest_registry.as_ref()),
            color,
        );
        print_field("Namespace", &or_dash(self.dest_namespace.as_deref()), color);
        print_field("Trigger", &trigger_label(self), color);
        print_field("Enabled", &format_bool(self.enabled, color), color);
        print_field("Override", &format_bool(self.override_existing, color), color);
        print_field(
            "Replicate deletion",
            &format_bool(self.replicate_deletion, color),
            color,
        );
        for filter in &self.filters {
            print_field(&format!("Filter ({})", filter.kind), &filter.value.to_string(), color);
        }
    }
}

impl TableRow for ReplicationExecution {
    fn headers() -> &'static [&'static str] {
        &["ID", "STATUS", "TRIGGER", "STARTED", "TOTAL", "SUCCEED", "FAILED"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            format_status(&self.status, color),
            or_dash(self.trigger.as_deref()),
            format_time(self.start_time),
            self.total.to_string(),
            self.succeed.to_string(),
            self.failed.to_string(),
        ]
    }
}

impl TableOutput for ReplicationExecution {
    fn print_table(&self, color: bool) {
        print_header(&format!("Execution {}", self.id));
        print_field("Policy", &self.policy_id.to_string(), color);
        print_field("Status", &format_status(&self.status, color), color);
        if let Some(text) = self.status_text.as_deref().filter(|t| !t.is_empty()) {
            print_field("Detail", text, color);
        }
        print_field("Started", &format_time(self.start_time), color);
        print_field("Finished", &format_time(self.end_time), color);
        print_field(
            "Tasks",
            &format!(
                "{} total, {} succeed, {} failed, {} in progress, {} stopped",
                self.total, self.succeed, self.failed, self.in_progress, self.stopped
            ),
            color,
        );
    }
}

impl TableRow for WebhookPolicy {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "TARGETS", "EVENTS", "ENABLED"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let targets: Vec<_> = self.targets.iter().map(|t| t.address.as_str()).collect();
        vec![
            self.id.to_string(),
            self.name.clone(),
            truncate(&targets.join(", "), 48),
            self.event_types.len().to_string(),
            format_bool(self.enabled, color),
        ]
    }
}

impl TableOutput for WebhookPolicy {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        print_field("ID", &self.id.to_string(), color);
        print_field("Enabled", &format_bool(self.enabled, color), color);
        print_field("Description", &or_dash(self.description.as_deref()), color);
        for target in &self.targets {
            print_field(&format!("Target ({})", target.kind), &target.address, color);
        }
        print_field("Events", &self.event_types.join(", "), color);
        print_field("Creator", &or_dash(self.creator.as_deref()), color);
    }
}

impl TableOutput for SystemInfo {
    fn print_table(&self, color: bool) {
        print_header("Harbor");
        print_field("Version", &or_dash(self.harbor_version.as_deref()), color);
        print_field("Auth mode", &or_dash(self.auth_mode.as_deref()), color);
        print_field("External URL", &or_dash(self.external_url.as_deref()), color);
        print_field(
            "Project creation",
            &or_dash(self.project_creation_restriction.as_deref()),
            color,
        );
        print_field(
            "Read only",
            &format_bool(self.read_only.unwrap_or_default(), color),
            color,
        );
    }
}

impl TableOutput for Health {
    fn print_table(&self, color: bool) {
        print_field("Overall", &format_status(&self.status, color), color);
        TableBuilder::new()
            .color(color)
            .headers(["COMPONENT", "STATUS", "ERROR"])
            .rows(self.components.iter().map(|c| {
                [
                    c.name.clone(),
                    format_status(&c.status, color),
                    or_dash(c.error.as_deref()),
                ]
            }))
            .print();
    }
}

impl TableOutput for Statistics {
    fn print_table(&self, color: bool) {
        print_header("Statistics");
        print_field(
            "Projects",
            &format!(
                "{} ({} public, {} private)",
                self.total_project_count, self.public_project_count, self.private_project_count
            ),
            color,
        );
        print_field(
            "Repositories",
            &format!(
                "{} ({} public, {} private)",
                self.total_repo_count, self.public_repo_count, self.private_repo_count
            ),
            color,
        );
        print_field("Storage", &format_size(self.total_storage_consumption), color);
    }
}

impl TableOutput for GcSchedule {
    fn print_table(&self, color: bool) {
        let kind = if self.is_disabled() {
            "None"
        } else {
            self.schedule.kind.as_str()
        };
        print_field("Schedule", kind, color);
        if let Some(cron) = &self.schedule.cron {
            print_field("Cron", cron, color);
        }
        for (key, value) in &self.parameters {
            print_field(key, &value.to_string(), color);
        }
    }
}
