//! Local hardware acceleration probe.
//!
//! The probe runs once per process and never fails: any detection problem
//! degrades to a plain CPU descriptor.

use std::{process::Command, sync::OnceLock};

use serde::Serialize;

/// Broad device classification used to filter the local model catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
   Cpu,
   Gpu,
}

/// Structured report of local acceleration capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
   pub kind: DeviceKind,

   /// Acceleration backend name: "cuda", "metal" or "cpu"
   pub backend: String,

   /// Accelerator product name when one is detectable
   pub accelerator: Option<String>,
}

impl DeviceDescriptor {
   fn cpu_only() -> Self {
      Self {
         kind:        DeviceKind::Cpu,
         backend:     "cpu".to_string(),
         accelerator: None,
      }
   }

   pub const fn has_acceleration(&self) -> bool {
      matches!(self.kind, DeviceKind::Gpu)
   }
}

static DEVICE: OnceLock<DeviceDescriptor> = OnceLock::new();

/// Probe the local execution environment. Idempotent; the result is computed
/// on first call and cached for the process lifetime.
pub fn probe() -> &'static DeviceDescriptor {
   DEVICE.get_or_init(detect)
}

// Apple Silicon always carries a Metal-capable GPU
#[cfg(all(target_os = "macos", target_arch = "aarch64"))]
fn detect() -> DeviceDescriptor {
   DeviceDescriptor {
      kind:        DeviceKind::Gpu,
      backend:     "metal".to_string(),
      accelerator: Some("Apple Silicon GPU".to_string()),
   }
}

#[cfg(not(all(target_os = "macos", target_arch = "aarch64")))]
fn detect() -> DeviceDescriptor {
   if let Some(name) = detect_nvidia_gpu() {
      return DeviceDescriptor {
         kind:        DeviceKind::Gpu,
         backend:     "cuda".to_string(),
         accelerator: Some(name),
      };
   }

   DeviceDescriptor::cpu_only()
}

/// Query `nvidia-smi` for the first GPU name. Returns None on any failure
/// (binary missing, driver error, unexpected output).
#[cfg(not(all(target_os = "macos", target_arch = "aarch64")))]
fn detect_nvidia_gpu() -> Option<String> {
   let output = Command::new("nvidia-smi")
      .args(["--query-gpu=name", "--format=csv,noheader"])
      .output()
      .ok()?;

   if !output.status.success() {
      return None;
   }

   let stdout = String::from_utf8_lossy(&output.stdout);
   stdout
      .lines()
      .map(str::trim)
      .find(|line| !line.is_empty())
      .map(String::from)
}
