/// Indentation-aware text sink the generator renders Java fragments into.
///
/// `push_line` writes a full line at the current depth; `push` appends raw
/// text for callers that assemble a line from pieces. Fragments produced in
/// a nested builder re-enter a parent through `push_lines`, which re-indents
/// them, so depth never has to be threaded through the lowering calls.
#[derive(Debug, Default, Clone)]
pub struct JavaSourceBuilder {
    out: String,
    depth: usize,
    unit: String,
}

impl JavaSourceBuilder {
    pub fn new(unit: String) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            unit,
        }
    }

    pub fn push_line(&mut self, line: &str) {
        self.push_indent();
        self.out.push_str(line);
        self.out.push('\n');
    }

    pub fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn push_indent(&mut self) {
        self.out.push_str(&self.unit.repeat(self.depth));
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Drops the last `count` characters, retracting a separator that was
    /// appended speculatively between list elements.
    pub fn trim_trailing(&mut self, count: usize) {
        let keep = self.out.len().saturating_sub(count);
        self.out.truncate(keep);
    }

    pub fn build(self) -> String {
        self.out
    }
}

/// Rendered pieces of one output file, kept apart until the host asks for
/// the final text. The type texts arrive fully indented from the generator;
/// assembly only interleaves the header sections and blank separators.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JavaCompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub types: Vec<String>,
}

impl JavaCompilationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_source(&self) -> String {
        let mut out = String::new();
        if let Some(package) = &self.package {
            out.push_str("package ");
            out.push_str(package);
            out.push_str(";\n\n");
        }
        if !self.imports.is_empty() {
            for import in &self.imports {
                out.push_str("import ");
                out.push_str(import);
                out.push_str(";\n");
            }
            out.push('\n');
        }
        for (index, declaration) in self.types.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(declaration);
        }
        out
    }
}
