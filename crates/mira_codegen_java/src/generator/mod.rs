use crate::builder::{JavaCompilationUnit, JavaSourceBuilder};
use crate::capture::{self, CaptureAnalysis, CaptureKind};
use crate::config::JavaCodeGenConfig;
use crate::context::GenContext;
use crate::error::CodeGenError;
use crate::infer::TypeInference;
use crate::types::{self, MaterializedNaming, NamingPolicy};
use mira_ast::{
    CompilationUnit, Literal, LocalId, Parameter, Span, Statement, TypeRef,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

mod args;
mod closures;
mod declarations;
mod expressions;
mod formatting;
mod statements;
mod switch;

/// How method and constructor bodies are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStrategy {
    /// Full statement-by-statement translation.
    Full,
    /// Declaration skeletons with default-value bodies.
    Stub,
}

const REF_CLASS: &str = "mira.runtime.Ref";
const DYN_CLASS: &str = "mira.runtime.Dyn";
const BINDING_CLASS: &str = "mira.runtime.Binding";
const FUNC_CLASS: &str = "mira.runtime.Func";
const INT_RANGE_CLASS: &str = "mira.runtime.IntRange";
const OBJECT_RANGE_CLASS: &str = "mira.runtime.ObjectRange";
const BASE_CAPABILITY_CLASS: &str = "mira.runtime.MiraObject";

/// Synthetic setter helper rendered once per mutated property accessor pair.
#[derive(Debug, Clone)]
struct SetterTrampoline {
    method_name: String,
    rendered: String,
}

pub struct JavaCodeGenerator {
    config: JavaCodeGenConfig,
    strategy: BodyStrategy,
    naming: Box<dyn NamingPolicy>,
    imports: BTreeSet<String>,
    package: Option<String>,
    unit: Option<Rc<CompilationUnit>>,
    /// Simple names of the enclosing type declarations, outermost first.
    class_stack: Vec<String>,
    current_return_type: Option<TypeRef>,
    current_has_return_value: bool,
    capture_cache: HashMap<Span, Rc<CaptureAnalysis>>,
    captures: Rc<CaptureAnalysis>,
    inference: TypeInference,
    /// Keyed by `owner#setter` so each mutator gets exactly one helper.
    trampolines: BTreeMap<String, SetterTrampoline>,
}

impl JavaCodeGenerator {
    pub fn new() -> Self {
        Self::with_config(JavaCodeGenConfig::default())
    }

    pub fn with_config(config: JavaCodeGenConfig) -> Self {
        Self::with_strategy(config, BodyStrategy::Full, Box::new(MaterializedNaming))
    }

    pub fn with_strategy(
        config: JavaCodeGenConfig,
        strategy: BodyStrategy,
        naming: Box<dyn NamingPolicy>,
    ) -> Self {
        Self {
            config,
            strategy,
            naming,
            imports: BTreeSet::new(),
            package: None,
            unit: None,
            class_stack: Vec::new(),
            current_return_type: None,
            current_has_return_value: false,
            capture_cache: HashMap::new(),
            captures: Rc::new(CaptureAnalysis::default()),
            inference: TypeInference::new(),
            trampolines: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &JavaCodeGenConfig {
        &self.config
    }

    pub fn generate_compilation_unit(
        &mut self,
        unit: &CompilationUnit,
    ) -> Result<JavaCompilationUnit, CodeGenError> {
        self.reset();
        self.package = unit.package.clone();
        self.unit = Some(Rc::new(unit.clone()));

        let mut output = JavaCompilationUnit::new();
        output.package = unit.package.clone();

        for import in &unit.imports {
            self.add_import(import);
        }

        for decl in &unit.types {
            let rendered = self.generate_type_declaration(decl)?;
            output.types.push(rendered);
        }

        output.imports = self.imports.iter().cloned().collect();
        Ok(output)
    }

    pub(super) fn builder(&self) -> JavaSourceBuilder {
        JavaSourceBuilder::new(self.config.indent.clone())
    }

    pub(super) fn add_import(&mut self, import_path: &str) {
        self.imports.insert(import_path.to_string());
    }

    fn reset(&mut self) {
        self.imports.clear();
        self.package = None;
        self.unit = None;
        self.class_stack.clear();
        self.current_return_type = None;
        self.current_has_return_value = false;
        self.capture_cache.clear();
        self.captures = Rc::new(CaptureAnalysis::default());
        self.inference = TypeInference::new();
        self.trampolines.clear();
    }

    pub(super) fn is_stub(&self) -> bool {
        self.strategy == BodyStrategy::Stub
    }

    pub(super) fn current_class(&self) -> Option<&str> {
        self.class_stack.last().map(String::as_str)
    }

    pub(super) fn render_type(&self, ty: &TypeRef) -> String {
        types::render_type(ty, self.naming.as_ref())
    }

    pub(super) fn render_type_argument(&self, ty: &TypeRef) -> String {
        types::render_type_argument(ty, self.naming.as_ref())
    }

    pub(super) fn render_optional_type(&self, ty: Option<&TypeRef>) -> String {
        match ty {
            Some(ty) => self.render_type(ty),
            None => "java.lang.Object".to_string(),
        }
    }

    /// Capture analysis for a declaration body, computed once per body span
    /// and shared with every nested lowering pass over the same body.
    pub(super) fn captures_for(
        &mut self,
        span: Span,
        params: &[Parameter],
        body: &[Statement],
    ) -> Rc<CaptureAnalysis> {
        if let Some(cached) = self.capture_cache.get(&span) {
            return Rc::clone(cached);
        }
        let analysis = Rc::new(capture::analyze(params, body));
        self.capture_cache.insert(span, Rc::clone(&analysis));
        analysis
    }

    pub(super) fn is_boxed(&self, id: LocalId) -> bool {
        self.captures.is_boxed(id)
    }

    pub(super) fn capture_kind(&self, id: LocalId) -> CaptureKind {
        self.captures.kind(id)
    }

    pub(super) fn render_boxed_value_type(&self, ty: &TypeRef) -> String {
        format!("{}<{}>", REF_CLASS, self.render_type_argument(ty))
    }

    /// True when `value` needs an explicit cast to flow into a slot of type
    /// `target`.
    pub(super) fn needs_cast(target: &TypeRef, value: Option<&TypeRef>) -> bool {
        let Some(value) = value else {
            return false;
        };
        if target.is_unknown() || target.is_object() || target.is_void() {
            return false;
        }
        if value.is_unknown() || value.is_void() {
            return true;
        }
        if target == value {
            return false;
        }
        match (target.numeric_rank(), value.numeric_rank()) {
            // Numeric widening needs no cast.
            (Some(to), Some(from)) => from > to,
            _ => !value.is_object() && target != value,
        }
    }

    pub(super) fn cast_if_needed(&self, target: &TypeRef, value: Option<&TypeRef>, code: String) -> String {
        if Self::needs_cast(target, value) {
            format!("({}) {}", self.render_type(target), code)
        } else {
            code
        }
    }

    pub(super) fn literal_to_string(&self, literal: &Literal) -> String {
        match literal {
            Literal::String(value) => format!("\"{}\"", Self::escape_string(value)),
            Literal::Number(value) => value.clone(),
            Literal::Boolean(value) => value.to_string(),
            Literal::Character(value) => match value {
                '\'' => "'\\''".to_string(),
                '\\' => "'\\\\'".to_string(),
                '\n' => "'\\n'".to_string(),
                '\t' => "'\\t'".to_string(),
                other => format!("'{}'", other),
            },
            Literal::Null => "null".to_string(),
        }
    }
}

impl Default for JavaCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
