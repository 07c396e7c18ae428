// Copyright (c) 2025 - Cowboy AI, Inc.
//! AWS primitives: provider, VPC and EKS cluster

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::ResourceArgs;
use crate::errors::DeclarationResult;
use crate::graph::PrimitiveKind;
use crate::output::{all, Input, Inputs, Output};

/// Default VPC address space for cluster networks
pub const DEFAULT_VPC_CIDR: &str = "10.0.0.0/16";

/// Tag key marking a subnet as usable by a named cluster
pub fn cluster_subnet_tag(cluster_name: &str) -> String {
    format!("kubernetes.io/cluster/{}", cluster_name)
}

/// AWS provider arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsProviderArgs {
    /// Region all resources beneath the provider are created in
    pub region: String,
    /// Skip the EC2 metadata API credential check
    pub skip_metadata_api_check: bool,
    /// Tags applied to every taggable resource
    pub default_tags: BTreeMap<String, String>,
}

impl AwsProviderArgs {
    /// Provider for a region with default tags
    pub fn new(region: impl Into<String>, default_tags: BTreeMap<String, String>) -> Self {
        Self {
            region: region.into(),
            skip_metadata_api_check: false,
            default_tags,
        }
    }
}

resource_handle!(
    /// Configured AWS provider
    AwsProvider
);

impl ResourceArgs for AwsProviderArgs {
    type Handle = AwsProvider;
    const TYPE_TOKEN: &'static str = "pulumi:providers:aws";
    const KIND: PrimitiveKind = PrimitiveKind::Provider;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        Ok(Inputs::new()
            .with_value("region", json!(self.region))
            .with_value("skipMetadataApiCheck", json!(self.skip_metadata_api_check))
            .with_value("defaultTags", json!({ "tags": self.default_tags })))
    }
}

/// Subnet tier within a VPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubnetType {
    Public,
    Private,
}

/// One subnet tier of a VPC, allocated per availability zone
#[derive(Debug, Clone)]
pub struct SubnetSpec {
    pub subnet_type: SubnetType,
    pub tags: Input<BTreeMap<String, String>>,
}

impl SubnetSpec {
    /// Subnet tier tagged for Kubernetes load balancer discovery
    ///
    /// Public subnets receive `kubernetes.io/role/elb`, private subnets
    /// `kubernetes.io/role/internal-elb`. Both are marked shared with the
    /// cluster; `extra` tags are merged in first and never override those.
    pub fn for_cluster(
        subnet_type: SubnetType,
        cluster_name: Input<String>,
        extra: BTreeMap<String, String>,
    ) -> Self {
        let role = match subnet_type {
            SubnetType::Public => "kubernetes.io/role/elb",
            SubnetType::Private => "kubernetes.io/role/internal-elb",
        };
        let tags = cluster_name.map(move |name| {
            let mut tags = extra.clone();
            tags.insert(cluster_subnet_tag(&name), "shared".to_string());
            tags.insert(role.to_string(), "1".to_string());
            tags
        });
        Self { subnet_type, tags }
    }

    fn into_output(self) -> Output<Value> {
        let subnet_type = self.subnet_type;
        self.tags
            .into_output()
            .map(move |tags| json!({ "type": subnet_type, "tags": tags }))
    }
}

/// VPC arguments
#[derive(Debug, Clone)]
pub struct VpcArgs {
    pub cidr_block: String,
    pub enable_dns_hostnames: bool,
    pub subnet_specs: Vec<SubnetSpec>,
}

impl VpcArgs {
    /// Public and private subnet tiers tagged for the named cluster
    pub fn for_cluster(cluster_name: Input<String>, extra_tags: BTreeMap<String, String>) -> Self {
        Self {
            cidr_block: DEFAULT_VPC_CIDR.to_string(),
            enable_dns_hostnames: true,
            subnet_specs: vec![
                SubnetSpec::for_cluster(SubnetType::Public, cluster_name.clone(), extra_tags.clone()),
                SubnetSpec::for_cluster(SubnetType::Private, cluster_name, extra_tags),
            ],
        }
    }
}

resource_handle!(
    /// Declared VPC
    Vpc
);

impl Vpc {
    pub fn vpc_id(&self) -> Output<String> {
        self.resource.output("vpcId")
    }

    pub fn public_subnet_ids(&self) -> Output<Vec<String>> {
        self.resource.output("publicSubnetIds")
    }

    pub fn private_subnet_ids(&self) -> Output<Vec<String>> {
        self.resource.output("privateSubnetIds")
    }
}

impl ResourceArgs for VpcArgs {
    type Handle = Vpc;
    const TYPE_TOKEN: &'static str = "awsx:ec2:Vpc";
    const KIND: PrimitiveKind = PrimitiveKind::Network;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        let specs = all(
            self.subnet_specs
                .into_iter()
                .map(SubnetSpec::into_output)
                .collect(),
        )
        .map(Value::Array);

        Ok(Inputs::new()
            .with_value("cidrBlock", json!(self.cidr_block))
            .with_value("enableDnsHostnames", json!(self.enable_dns_hostnames))
            .with_value("subnetStrategy", json!("Auto"))
            .with_output("subnetSpecs", specs))
    }
}

/// EKS cluster arguments
#[derive(Debug, Clone)]
pub struct EksClusterArgs {
    pub name: Input<String>,
    pub version: Input<String>,
    pub vpc_id: Output<String>,
    pub public_subnet_ids: Output<Vec<String>>,
    pub private_subnet_ids: Output<Vec<String>>,
    /// EKS auto mode (managed compute)
    pub auto_mode: bool,
    /// Install the CoreDNS managed add-on (auto mode ships its own)
    pub coredns_addon: bool,
}

impl EksClusterArgs {
    /// Auto-mode cluster with API authentication placed in the VPC
    pub fn in_vpc(name: Input<String>, version: Input<String>, vpc: &Vpc) -> Self {
        Self {
            name,
            version,
            vpc_id: vpc.vpc_id(),
            public_subnet_ids: vpc.public_subnet_ids(),
            private_subnet_ids: vpc.private_subnet_ids(),
            auto_mode: true,
            coredns_addon: false,
        }
    }
}

resource_handle!(
    /// Declared EKS cluster
    EksCluster
);

impl EksCluster {
    /// Kubeconfig document (JSON) for the cluster
    pub fn kubeconfig_json(&self) -> Output<Option<String>> {
        self.resource.output::<Option<String>>("kubeconfigJson").secret()
    }

    /// API server endpoint
    pub fn endpoint(&self) -> Output<String> {
        self.resource.output("eksCluster.endpoint")
    }
}

impl ResourceArgs for EksClusterArgs {
    type Handle = EksCluster;
    const TYPE_TOKEN: &'static str = "eks:index:Cluster";
    const KIND: PrimitiveKind = PrimitiveKind::ManagedCluster;

    fn into_inputs(self) -> DeclarationResult<Inputs> {
        Ok(Inputs::new()
            .with::<String>("name", self.name)?
            .with::<String>("version", self.version)?
            .with::<String>("vpcId", self.vpc_id)?
            .with::<Vec<String>>("publicSubnetIds", self.public_subnet_ids)?
            .with::<Vec<String>>("privateSubnetIds", self.private_subnet_ids)?
            .with_value("authenticationMode", json!("API"))
            .with_value("autoMode", json!({ "enabled": self.auto_mode }))
            .with_value("corednsAddonOptions", json!({ "enabled": self.coredns_addon })))
    }
}
