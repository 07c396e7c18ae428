// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hub role: GitOps controller add-ons
//!
//! Two releases are declared. The applications chart is installed into the
//! namespace the controller release reports and carries an explicit
//! dependency on it, so it is never applied before the controller exists.

use serde_json::json;

use crate::config::ArgoCdConfig;
use crate::context::StackContext;
use crate::errors::DeclarationResult;
use crate::graph::NodeId;
use crate::resource::kubernetes::{HelmRelease, HelmReleaseArgs, KubernetesProvider};
use crate::resource::ResourceOptions;

/// Add-on releases of a hub
#[derive(Debug, Clone)]
pub struct HubAddOns {
    /// Controller release
    pub argocd: HelmRelease,
    /// Initial projects and applications
    pub apps: HelmRelease,
}

/// Release arguments of the controller
pub fn argocd_release(config: &ArgoCdConfig) -> HelmReleaseArgs {
    let mut args = HelmReleaseArgs::new("argo-cd", config.chart.as_str(), config.namespace.clone().into());
    args.create_namespace = true;
    args.version = config.chart_version.clone();
    args.values = json!({
        "dex": { "enabled": false },
        "configs": {
            "secret": { "argocdServerAdminPassword": config.admin_password_hash }
        },
        "notifications": { "enabled": false },
    });
    args
}

/// Release arguments of the applications chart, installed next to `argocd`
pub fn apps_release(config: &ArgoCdConfig, argocd: &HelmRelease) -> HelmReleaseArgs {
    let mut args = HelmReleaseArgs::new(
        "argocd-apps",
        config.apps_chart.as_str(),
        argocd.status_namespace().into(),
    );
    args.version = config.chart_version.clone();
    args.value_yaml_files = vec![config.initial_objects_url.clone()];
    args
}

/// Declare the hub add-ons for cluster `name`
pub fn declare(
    ctx: &mut StackContext,
    name: &str,
    k8s: &KubernetesProvider,
    component: NodeId,
) -> DeclarationResult<HubAddOns> {
    let config = ctx.config().argocd.clone();
    let opts = ResourceOptions::new()
        .parent(component)
        .provider(k8s.id());

    let argocd = ctx.register(
        &format!("{}-argocd", name),
        argocd_release(&config),
        opts.clone().ignore_changes(["checksum", "version", "values"]),
    )?;

    let apps = ctx.register(
        &format!("{}-argocd-apps", name),
        apps_release(&config, &argocd),
        opts.depends_on(argocd.id()).ignore_changes(["checksum"]),
    )?;

    ctx.info(
        format!("Hub cluster {} created with Argo CD installed", name),
        Some(name),
    );
    Ok(HubAddOns { argocd, apps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ResolvedOutputs;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_argocd_values() {
        let args = argocd_release(&ArgoCdConfig::default());
        assert_eq!(args.name, "argo-cd");
        assert!(args.create_namespace);
        assert_eq!(args.values["dex"]["enabled"], json!(false));
        assert_eq!(args.values["notifications"]["enabled"], json!(false));
        assert_eq!(
            args.values["configs"]["secret"]["argocdServerAdminPassword"],
            json!(crate::config::DEFAULT_ARGOCD_ADMIN_PASSWORD_HASH)
        );
        assert_eq!(
            args.namespace.into_output().resolve(&ResolvedOutputs::new()).unwrap(),
            "argocd"
        );
    }
}
