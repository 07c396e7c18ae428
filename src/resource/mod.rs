// Copyright (c) 2025 - Cowboy AI, Inc.
//! Primitive Resource Declarations
//!
//! Each primitive takes a name and a typed argument struct and returns a
//! typed handle whose outputs are deferred values. Argument structs implement
//! [`ResourceArgs`], which fixes the engine type token, the primitive kind
//! and how the arguments serialize into node inputs.
//!
//! ```text
//! VpcArgs ──into_inputs──► Inputs ──StackContext::register──► ResourceNode
//!                                                                │
//!                       Vpc (handle) ◄──────────────────────────┘
//!                         └── vpc_id(): Output<String>
//! ```
//!
//! Provider families live in their own modules: [`aws`], [`azure`] and
//! [`kubernetes`].

use serde::de::DeserializeOwned;

use crate::errors::DeclarationResult;
use crate::graph::{NodeId, PrimitiveKind};
use crate::output::{Inputs, Output};

/// Declare a typed handle wrapping a [`ResourceHandle`]
macro_rules! resource_handle {
    ($(#[$meta:meta])* $handle:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $handle {
            resource: $crate::resource::ResourceHandle,
        }

        impl From<$crate::resource::ResourceHandle> for $handle {
            fn from(resource: $crate::resource::ResourceHandle) -> Self {
                Self { resource }
            }
        }

        impl $handle {
            /// Underlying declared node
            pub fn resource(&self) -> &$crate::resource::ResourceHandle {
                &self.resource
            }

            /// Arena id of the declared node
            pub fn id(&self) -> $crate::graph::NodeId {
                self.resource.id()
            }
        }
    };
}

pub mod aws;
pub mod azure;
pub mod kubernetes;
pub mod options;

pub use options::ResourceOptions;

/// Typed arguments of a primitive resource
pub trait ResourceArgs {
    /// Handle returned once the resource is declared
    type Handle: From<ResourceHandle>;

    /// Engine type token
    const TYPE_TOKEN: &'static str;

    /// Primitive kind the resource maps onto
    const KIND: PrimitiveKind;

    /// Serialize the arguments into node inputs
    fn into_inputs(self) -> DeclarationResult<Inputs>;
}

/// Reference to a declared node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    id: NodeId,
    name: String,
    type_token: String,
    kind: PrimitiveKind,
}

impl ResourceHandle {
    pub(crate) fn new(
        id: NodeId,
        name: impl Into<String>,
        type_token: impl Into<String>,
        kind: PrimitiveKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            type_token: type_token.into(),
            kind,
        }
    }

    /// Arena id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Logical name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engine type token
    pub fn type_token(&self) -> &str {
        &self.type_token
    }

    /// Primitive kind
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Deferred value of an output path (dotted for nested properties)
    pub fn output<T>(&self, path: &str) -> Output<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        Output::from_resource(self.id, path)
    }
}
