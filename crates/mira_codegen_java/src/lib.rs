//! Java source generation for resolved Mira compilation units.
//!
//! The entry point is [`JavaTranspiler`], which walks a batch of resolved
//! units and produces one Java source text per unit, plus the post-processing
//! directives the host is expected to apply (reference shortening,
//! reformatting, splitting sibling top-level types into their own files).
//! Units that fail to lower are reported alongside the successes; a failed
//! unit yields no output text at all.

mod builder;
mod capture;
mod config;
mod context;
mod error;
mod generator;
mod infer;
mod types;

pub use builder::{JavaCompilationUnit, JavaSourceBuilder};
pub use capture::{analyze, CaptureAnalysis, CaptureKind};
pub use config::JavaCodeGenConfig;
pub use context::GenContext;
pub use error::CodeGenError;
pub use generator::{BodyStrategy, JavaCodeGenerator};
pub use types::{MaterializedNaming, NamingPolicy, StubNaming};

use mira_ast::CompilationUnit;
use std::collections::HashSet;

/// Post-processing the host applies to a generated unit, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStep {
    /// Replace fully qualified references with imports where unambiguous.
    ShortenReferences,
    /// Reformat the text with the host's Java formatter.
    Reformat,
    /// Move each additional top-level type into a sibling output file.
    SplitTopLevelTypes,
}

/// One successfully generated unit.
#[derive(Debug, Clone)]
pub struct JavaOutputUnit {
    /// Suggested output name, without extension.
    pub name: String,
    pub source: String,
    pub post_steps: Vec<PostStep>,
}

/// A unit that could not be lowered. No partial text is kept.
#[derive(Debug)]
pub struct UnitFailure {
    pub unit: String,
    pub error: CodeGenError,
}

/// Result of converting a batch of compilation units.
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub outputs: Vec<JavaOutputUnit>,
    pub failures: Vec<UnitFailure>,
}

/// Batch driver over [`JavaCodeGenerator`].
#[derive(Debug, Clone, Default)]
pub struct JavaTranspiler {
    config: JavaCodeGenConfig,
}

impl JavaTranspiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: JavaCodeGenConfig) -> Self {
        Self { config }
    }

    /// Converts each unit to full Java source. A failure in one unit does not
    /// stop the remaining units.
    pub fn convert(&self, units: &[CompilationUnit]) -> BatchOutput {
        let mut generator = JavaCodeGenerator::with_strategy(
            self.config.clone(),
            BodyStrategy::Full,
            Box::new(MaterializedNaming),
        );
        self.run(&mut generator, units)
    }

    /// Converts each unit to declaration-only stubs with default-valued
    /// bodies. Types declared anywhere in the batch are spelled so the stubs
    /// compile against each other before the full conversion lands.
    pub fn convert_stubs(&self, units: &[CompilationUnit]) -> BatchOutput {
        let mut batch_types = HashSet::new();
        for unit in units {
            for decl in &unit.types {
                batch_types.insert(decl.name.clone());
            }
        }
        let mut generator = JavaCodeGenerator::with_strategy(
            self.config.clone(),
            BodyStrategy::Stub,
            Box::new(StubNaming::new(batch_types)),
        );
        self.run(&mut generator, units)
    }

    fn run(&self, generator: &mut JavaCodeGenerator, units: &[CompilationUnit]) -> BatchOutput {
        let mut batch = BatchOutput::default();
        for unit in units {
            tracing::debug!(unit = %unit.name, "converting compilation unit");
            match generator.generate_compilation_unit(unit) {
                Ok(generated) => {
                    let mut post_steps = vec![PostStep::ShortenReferences, PostStep::Reformat];
                    if unit.types.len() > 1 {
                        post_steps.push(PostStep::SplitTopLevelTypes);
                    }
                    batch.outputs.push(JavaOutputUnit {
                        name: unit.output_name().to_string(),
                        source: generated.to_source(),
                        post_steps,
                    });
                }
                Err(error) => {
                    tracing::warn!(unit = %unit.name, %error, "unit conversion failed");
                    batch.failures.push(UnitFailure {
                        unit: unit.name.clone(),
                        error,
                    });
                }
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests;
