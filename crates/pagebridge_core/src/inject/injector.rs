//! Extension context injector.
//!
//! # Responsibility
//! - Build one isolated context per extension, delegate population to the
//!   resolver, and publish the capability facet into the page registry.
//!
//! # Invariants
//! - Nothing is written into page globals until resolution has succeeded.
//! - One extension's failure never reaches another extension's injection.
//! - Content-mode publication never carries background-only entries.

use crate::inject::capability::{is_valid_extension_id, InjectionMode};
use crate::inject::context::ExtensionContext;
use crate::inject::resolver::{ExtensionResolver, ResolveError};
use crate::page::globals::PageGlobals;
use crate::preferences::activation::ActivationEntry;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Per-extension injection failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    InvalidExtensionId(String),
    Resolution(ResolveError),
}

impl Display for InjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidExtensionId(value) => {
                write!(f, "extension id is invalid: {value}")
            }
            Self::Resolution(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InjectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidExtensionId(_) => None,
            Self::Resolution(err) => Some(err),
        }
    }
}

impl From<ResolveError> for InjectError {
    fn from(value: ResolveError) -> Self {
        Self::Resolution(value)
    }
}

/// Summary of one successful injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionOutcome {
    pub extension_id: String,
    pub mode: InjectionMode,
    /// Entries published on the capability facet.
    pub published_entries: usize,
    /// Background-only entry names withheld from a content context.
    pub withheld: Vec<String>,
}

/// Drives a resolver over freshly allocated extension contexts.
pub struct ContextInjector<R: ExtensionResolver> {
    resolver: R,
}

impl<R: ExtensionResolver> ContextInjector<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// Injects one extension into the page.
    ///
    /// # Contract
    /// - Allocates an isolated context; the resolver sees globals
    ///   read-only.
    /// - Publication into the registry happens only after the resolver
    ///   returned success, and only the mode-restricted facet.
    pub fn inject(
        &self,
        entry: &ActivationEntry,
        globals: &mut PageGlobals,
    ) -> Result<InjectionOutcome, InjectError> {
        let extension_id = entry.extension_id.as_str();
        if !is_valid_extension_id(extension_id) {
            return Err(InjectError::InvalidExtensionId(extension_id.to_string()));
        }
        let mode = if entry.background {
            InjectionMode::Background
        } else {
            InjectionMode::Content
        };

        let mut context = ExtensionContext::new(extension_id, mode);
        if let Err(err) = self
            .resolver
            .inject_to(extension_id, mode, &mut context, globals)
        {
            error!(
                "event=inject module=inject status=error extension={} mode={} error_code=resolution_failed error={}",
                extension_id,
                mode.as_str(),
                err
            );
            return Err(err.into());
        }

        let (capability, withheld) = context.into_capability().restricted();
        let published_entries = capability.len();
        globals.publish_capability(capability);

        info!(
            "event=inject module=inject status=ok extension={} mode={} entries={} withheld={}",
            extension_id,
            mode.as_str(),
            published_entries,
            withheld.len()
        );

        Ok(InjectionOutcome {
            extension_id: extension_id.to_string(),
            mode,
            published_entries,
            withheld,
        })
    }
}
