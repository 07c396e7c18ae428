// Copyright (c) 2025 - Cowboy AI, Inc.
//! Spoke role: management identity and hub registration
//!
//! # Declared Resources
//!
//! ```text
//! <name>-argocd-sa            ServiceAccount argocd-manager (kube-system)
//! <name>-argocd-secret        token Secret argocd-secret, bound to the account
//! <name>-argocd-role          ClusterRole argocd-manager-role (all verbs)
//! <name>-argocd-rolebinding   ClusterRoleBinding → role, account
//!
//! with hub kubeconfig only:
//! <name>-hub-k8s-provider     provider for the hub cluster
//! <name>-kubeconfig-secret    registry entry in the hub
//! ```

use super::args::ResolvedClusterArgs;
use crate::context::StackContext;
use crate::errors::{DeclarationError, DeclarationResult};
use crate::graph::NodeId;
use crate::output::Output;
use crate::registry;
use crate::resource::kubernetes::{
    ClusterRole, ClusterRoleArgs, ClusterRoleBinding, ClusterRoleBindingArgs, ClusterSecret,
    KubernetesProvider, KubernetesProviderArgs, ObjectMeta, PolicyRule, ServiceAccount,
    ServiceAccountArgs, ServiceAccountToken, ServiceAccountTokenArgs, Subject,
};
use crate::resource::ResourceOptions;

/// Name of the management service account
pub const MANAGER_ACCOUNT: &str = "argocd-manager";

/// Namespace of the management service account
pub const MANAGER_NAMESPACE: &str = "kube-system";

/// Name of the management token secret
pub const MANAGER_TOKEN_SECRET: &str = "argocd-secret";

/// Name of the management cluster role
pub const MANAGER_ROLE: &str = "argocd-manager-role";

/// Name of the management role binding
pub const MANAGER_ROLE_BINDING: &str = "argocd-manager-role-binding";

/// Identity the hub uses to manage a spoke
#[derive(Debug, Clone)]
pub struct SpokeAccess {
    pub service_account: ServiceAccount,
    pub token: ServiceAccountToken,
    pub role: ClusterRole,
    pub binding: ClusterRoleBinding,
}

/// Declare the management identity of cluster `name`
pub fn declare_access(
    ctx: &mut StackContext,
    name: &str,
    k8s: &KubernetesProvider,
    component: NodeId,
) -> DeclarationResult<SpokeAccess> {
    let opts = ResourceOptions::new()
        .parent(component)
        .provider(k8s.id());

    let service_account = ctx.register(
        &format!("{}-argocd-sa", name),
        ServiceAccountArgs {
            metadata: ObjectMeta::namespaced(MANAGER_ACCOUNT, MANAGER_NAMESPACE),
        },
        opts.clone(),
    )?;

    let token = ctx.register(
        &format!("{}-argocd-secret", name),
        ServiceAccountTokenArgs::for_account(
            ObjectMeta::namespaced(MANAGER_TOKEN_SECRET, MANAGER_NAMESPACE),
            &service_account,
        ),
        opts.clone(),
    )?;

    let role = ctx.register(
        &format!("{}-argocd-role", name),
        ClusterRoleArgs {
            metadata: ObjectMeta::named(MANAGER_ROLE),
            rules: vec![PolicyRule::all()],
        },
        opts.clone(),
    )?;

    let binding = ctx.register(
        &format!("{}-argocd-rolebinding", name),
        ClusterRoleBindingArgs::bind(
            ObjectMeta::named(MANAGER_ROLE_BINDING),
            &role,
            vec![Subject::service_account(MANAGER_ACCOUNT, MANAGER_NAMESPACE)],
        ),
        opts,
    )?;

    Ok(SpokeAccess {
        service_account,
        token,
        role,
        binding,
    })
}

/// Declare the registry entry of cluster `name` in its hub
///
/// Every failure of this step is a registration error attributed to the
/// resource that failed.
pub fn declare_registration(
    ctx: &mut StackContext,
    name: &str,
    args: &ResolvedClusterArgs,
    endpoint: Output<String>,
    access: &SpokeAccess,
    hub_kubeconfig: Output<Option<String>>,
    component: NodeId,
) -> DeclarationResult<ClusterSecret> {
    let cluster_type = args.provider.cluster_type().ok_or_else(|| {
        DeclarationError::registration(
            format!("{}-kubeconfig-secret", name),
            format!("provider {} has no registry cluster type", args.provider),
        )
    })?;

    let hub_provider_name = format!("{}-hub-k8s-provider", name);
    let hub = ctx
        .register(
            &hub_provider_name,
            KubernetesProviderArgs {
                kubeconfig: hub_kubeconfig,
            },
            ResourceOptions::new().parent(component),
        )
        .map_err(|err| match err {
            DeclarationError::PrimitiveCreation { reason, .. } => {
                DeclarationError::registration(&hub_provider_name, reason)
            }
            other => other,
        })?;

    let config = registry::connection_config(access.token.token(), access.token.ca_crt());
    let namespace = ctx.config().argocd.namespace.clone();
    let entry = ctx.register(
        &format!("{}-kubeconfig-secret", name),
        registry::registry_entry_args(
            args.cluster_name.clone(),
            cluster_type,
            &namespace,
            endpoint,
            config,
        ),
        ResourceOptions::new().parent(component).provider(hub.id()),
    )?;

    ctx.info(
        format!("Spoke cluster {} registered with hub", name),
        Some(name),
    );
    Ok(entry)
}
