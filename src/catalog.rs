//! Static registry of models runnable on the local backend.
//!
//! The catalog is a closed set fixed at build time. Declaration order is the
//! presentation order everywhere models are listed.

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::{
   device::{DeviceDescriptor, DeviceKind},
   error::{DocGenError, Result},
};

/// Model used when the local backend is selected without an explicit model,
/// and as the fallback target after a recoverable hosted failure.
pub const DEFAULT_LOCAL_MODEL: &str = "qwen2.5-coder:1.5b";

/// Hardware a catalog model needs to run acceptably.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRequirement {
   /// Runs on any machine
   Cpu,
   /// Needs GPU acceleration
   Gpu,
}

impl ResourceRequirement {
   pub const fn is_satisfied_by(self, device: &DeviceDescriptor) -> bool {
      match self {
         Self::Cpu => true,
         Self::Gpu => matches!(device.kind, DeviceKind::Gpu),
      }
   }
}

/// One local model the tool knows how to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalogEntry {
   pub id:          &'static str,
   pub description: &'static str,
   pub requirement: ResourceRequirement,
}

static CATALOG: LazyLock<IndexMap<&'static str, ModelCatalogEntry>> = LazyLock::new(|| {
   IndexMap::from([
      ("qwen2.5-coder:0.5b", ModelCatalogEntry {
         id:          "qwen2.5-coder:0.5b",
         description: "Qwen 2.5 Coder 0.5B - minimal footprint, fast on any CPU",
         requirement: ResourceRequirement::Cpu,
      }),
      ("qwen2.5-coder:1.5b", ModelCatalogEntry {
         id:          "qwen2.5-coder:1.5b",
         description: "Qwen 2.5 Coder 1.5B - balanced default for CPU machines",
         requirement: ResourceRequirement::Cpu,
      }),
      ("qwen2.5-coder:3b", ModelCatalogEntry {
         id:          "qwen2.5-coder:3b",
         description: "Qwen 2.5 Coder 3B - better quality, still CPU-capable",
         requirement: ResourceRequirement::Cpu,
      }),
      ("qwen2.5-coder:7b", ModelCatalogEntry {
         id:          "qwen2.5-coder:7b",
         description: "Qwen 2.5 Coder 7B - strongest Qwen coder, needs a GPU",
         requirement: ResourceRequirement::Gpu,
      }),
      ("deepseek-coder:6.7b", ModelCatalogEntry {
         id:          "deepseek-coder:6.7b",
         description: "DeepSeek Coder 6.7B - code-focused, needs a GPU",
         requirement: ResourceRequirement::Gpu,
      }),
      ("codellama:7b", ModelCatalogEntry {
         id:          "codellama:7b",
         description: "CodeLlama 7B - general code model, needs a GPU",
         requirement: ResourceRequirement::Gpu,
      }),
   ])
});

/// Full catalog in declaration order.
pub fn catalog() -> impl Iterator<Item = &'static ModelCatalogEntry> {
   CATALOG.values()
}

/// Catalog entries usable on the given device, in declaration order.
pub fn available_models(device: &DeviceDescriptor) -> Vec<&'static ModelCatalogEntry> {
   CATALOG
      .values()
      .filter(|entry| entry.requirement.is_satisfied_by(device))
      .collect()
}

/// Look up a catalog entry by identifier.
pub fn describe(identifier: &str) -> Result<&'static ModelCatalogEntry> {
   CATALOG
      .get(identifier)
      .ok_or_else(|| DocGenError::ModelNotFound { model: identifier.to_string() })
}
