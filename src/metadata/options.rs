//! Compilation options.
//!
//! This module carries the per-compilation knobs the attribute and layout
//! machinery consults: the output kind (synthesis is forbidden in netmodules),
//! the target runtime (extended layout needs runtime support), and whether
//! per-type checking may run in parallel.

/// The kind of output the compilation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A class library (.dll) with an assembly manifest
    Dll,
    /// An executable (.exe) with an assembly manifest
    Exe,
    /// A module without an assembly manifest, to be linked into an assembly
    NetModule,
}

impl OutputKind {
    /// Returns true for outputs without their own assembly manifest
    #[must_use]
    pub fn is_netmodule(&self) -> bool {
        matches!(self, OutputKind::NetModule)
    }
}

/// The runtime the output targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetRuntime {
    /// .NET Framework 4.8
    NetFramework48,
    /// .NET 6
    Net60,
    /// .NET 8
    Net80,
    /// .NET 10
    Net100,
}

impl TargetRuntime {
    /// Returns true when the runtime understands extended (C-compatible) layout
    #[must_use]
    pub fn supports_extended_layout(&self) -> bool {
        *self >= TargetRuntime::Net100
    }

    /// Display name used in diagnostics
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetRuntime::NetFramework48 => ".NET Framework 4.8",
            TargetRuntime::Net60 => ".NET 6.0",
            TargetRuntime::Net80 => ".NET 8.0",
            TargetRuntime::Net100 => ".NET 10.0",
        }
    }
}

impl std::fmt::Display for TargetRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for a single compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilationOptions {
    /// Kind of output being produced
    pub output_kind: OutputKind,
    /// Runtime the output targets
    pub target_runtime: TargetRuntime,
    /// Run per-type checks on a thread pool; diagnostics order is
    /// deterministic either way
    pub parallel_checks: bool,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            output_kind: OutputKind::Dll,
            target_runtime: TargetRuntime::Net80,
            parallel_checks: true,
        }
    }
}

impl CompilationOptions {
    /// Options for a class library targeting the default runtime
    #[must_use]
    pub fn library() -> Self {
        Self::default()
    }

    /// Options for a netmodule, where attribute synthesis is forbidden
    #[must_use]
    pub fn netmodule() -> Self {
        Self {
            output_kind: OutputKind::NetModule,
            ..Self::default()
        }
    }

    /// Set the output kind
    #[must_use]
    pub fn with_output_kind(mut self, kind: OutputKind) -> Self {
        self.output_kind = kind;
        self
    }

    /// Set the target runtime
    #[must_use]
    pub fn with_target_runtime(mut self, runtime: TargetRuntime) -> Self {
        self.target_runtime = runtime;
        self
    }

    /// Enable or disable parallel per-type checking
    #[must_use]
    pub fn with_parallel_checks(mut self, parallel: bool) -> Self {
        self.parallel_checks = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilationOptions::default();
        assert_eq!(options.output_kind, OutputKind::Dll);
        assert_eq!(options.target_runtime, TargetRuntime::Net80);
        assert!(options.parallel_checks);
    }

    #[test]
    fn test_netmodule_preset() {
        let options = CompilationOptions::netmodule();
        assert!(options.output_kind.is_netmodule());
    }

    #[test]
    fn test_extended_layout_support() {
        assert!(!TargetRuntime::NetFramework48.supports_extended_layout());
        assert!(!TargetRuntime::Net80.supports_extended_layout());
        assert!(TargetRuntime::Net100.supports_extended_layout());
    }

    #[test]
    fn test_builders() {
        let options = CompilationOptions::library()
            .with_target_runtime(TargetRuntime::Net100)
            .with_parallel_checks(false);
        assert_eq!(options.target_runtime, TargetRuntime::Net100);
        assert!(!options.parallel_checks);
    }
}
