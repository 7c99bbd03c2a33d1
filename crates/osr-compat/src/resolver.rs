//! ---
//! osr_section: "02-version-compatibility"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Compatibility matrix loading and version resolution."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! OpenStudio -> EnergyPlus resolution for result columns.
//!
//! Development builds are usually ahead of the wiki. Lookups go through the
//! matrix, then the configured overrides, then the [`UnknownVersionPolicy`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use osr_common::is_version_triplet;
use tracing::{info, warn};

use crate::errors::{CompatError, Result};
use crate::matrix::CompatibilityMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownVersionPolicy {
    /// Fail with [`CompatError::UnresolvedVersion`].
    #[default]
    Error,
    /// Map to the EnergyPlus version of the newest known OpenStudio release.
    Latest,
    /// Ask the operator through a [`VersionPrompt`].
    Prompt,
}

/// Source of operator answers for unknown OpenStudio versions.
pub trait VersionPrompt {
    /// Ask for the EnergyPlus version matching `openstudio`. An empty answer
    /// selects `default`.
    fn ask_energyplus(&mut self, openstudio: &str, default: &str) -> std::io::Result<String>;
}

impl<T: VersionPrompt + ?Sized> VersionPrompt for &mut T {
    fn ask_energyplus(&mut self, openstudio: &str, default: &str) -> std::io::Result<String> {
        (**self).ask_energyplus(openstudio, default)
    }
}

pub struct VersionResolver<'a> {
    matrix: &'a CompatibilityMatrix,
    overrides: IndexMap<String, String>,
    policy: UnknownVersionPolicy,
    prompt: Option<Box<dyn VersionPrompt + 'a>>,
}

impl<'a> VersionResolver<'a> {
    pub fn new(
        matrix: &'a CompatibilityMatrix,
        overrides: IndexMap<String, String>,
        policy: UnknownVersionPolicy,
    ) -> Self {
        Self {
            matrix,
            overrides,
            policy,
            prompt: None,
        }
    }

    /// Attach the operator prompt used by [`UnknownVersionPolicy::Prompt`].
    pub fn with_prompt(mut self, prompt: impl VersionPrompt + 'a) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    pub fn policy(&self) -> UnknownVersionPolicy {
        self.policy
    }

    /// EnergyPlus version of the newest known OpenStudio release.
    pub fn latest_energyplus(&self) -> Result<&str> {
        self.matrix
            .latest()
            .map(|row| row.energyplus.as_str())
            .ok_or(CompatError::EmptyMatrix)
    }

    /// Resolve one OpenStudio version.
    pub fn resolve(&mut self, openstudio: &str) -> Result<String> {
        if let Some(energyplus) = self.matrix.energyplus_for(openstudio) {
            return Ok(energyplus.to_owned());
        }
        if let Some(energyplus) = self.overrides.get(openstudio) {
            info!(openstudio, energyplus = %energyplus, "using configured override");
            return Ok(energyplus.clone());
        }
        match self.policy {
            UnknownVersionPolicy::Error => {
                Err(CompatError::UnresolvedVersion(openstudio.to_owned()))
            }
            UnknownVersionPolicy::Latest => {
                let energyplus = self.latest_energyplus()?.to_owned();
                warn!(
                    openstudio,
                    energyplus = %energyplus,
                    "version not in compatibility matrix, mapping to latest EnergyPlus"
                );
                Ok(energyplus)
            }
            UnknownVersionPolicy::Prompt => {
                let default = self.latest_energyplus()?.to_owned();
                let prompt = self
                    .prompt
                    .as_deref_mut()
                    .ok_or_else(|| CompatError::UnresolvedVersion(openstudio.to_owned()))?;
                let energyplus = ask_until_valid(prompt, openstudio, &default)?;
                info!(openstudio, energyplus = %energyplus, "mapping supplied by operator");
                // Later columns with the same version reuse the answer.
                self.overrides
                    .insert(openstudio.to_owned(), energyplus.clone());
                Ok(energyplus)
            }
        }
    }

    /// Resolve every version, asking at most once per unknown version.
    pub fn resolve_all<'v, I>(&mut self, versions: I) -> Result<BTreeMap<String, String>>
    where
        I: IntoIterator<Item = &'v str>,
    {
        let mut resolved = BTreeMap::new();
        for version in versions {
            if resolved.contains_key(version) {
                continue;
            }
            let energyplus = self.resolve(version)?;
            resolved.insert(version.to_owned(), energyplus);
        }
        Ok(resolved)
    }
}

fn ask_until_valid(
    prompt: &mut dyn VersionPrompt,
    openstudio: &str,
    default: &str,
) -> Result<String> {
    loop {
        let answer = prompt
            .ask_energyplus(openstudio, default)
            .map_err(CompatError::Prompt)?;
        let answer = answer.trim();
        let candidate = if answer.is_empty() { default } else { answer };
        if is_version_triplet(candidate) {
            return Ok(candidate.to_owned());
        }
        warn!(answer = candidate, "EnergyPlus version must look like X.Y.Z");
    }
}
