use mira_ast::{NamedType, TypeRef, WildcardKind};
use std::collections::HashSet;

/// Policy deciding how a resolved class reference is spelled in output.
pub trait NamingPolicy {
    fn class_reference(&self, ty: &NamedType) -> String;
}

/// Naming for fully materialized output: a type that is not referencable
/// from generated code falls back to its nearest accessible supertype.
#[derive(Debug, Default)]
pub struct MaterializedNaming;

impl NamingPolicy for MaterializedNaming {
    fn class_reference(&self, ty: &NamedType) -> String {
        match &ty.accessible_supertype {
            Some(supertype) => supertype.clone(),
            None => ty.name.clone(),
        }
    }
}

/// Naming for stub output. Nested types whose enclosing class belongs to the
/// batch being converted, but whose own file is not part of it, are spelled
/// with an enclosing-class-delimited synthetic name so the stub compiles
/// against the rest of the batch.
#[derive(Debug, Default)]
pub struct StubNaming {
    batch_types: HashSet<String>,
}

impl StubNaming {
    pub fn new(batch_types: HashSet<String>) -> Self {
        Self { batch_types }
    }

    fn in_batch(&self, name: &str) -> bool {
        self.batch_types.contains(name)
    }
}

impl NamingPolicy for StubNaming {
    fn class_reference(&self, ty: &NamedType) -> String {
        if let Some(outermost) = ty.enclosing.first() {
            if self.in_batch(outermost) && !self.in_batch(ty.simple_name()) {
                let mut path = ty.enclosing.join(".");
                path.push('.');
                path.push_str(ty.simple_name());
                return path;
            }
        }
        MaterializedNaming.class_reference(ty)
    }
}

/// Renders a resolved type reference as Java source text. Absent or unknown
/// types render as the universal top type; rendering never fails.
pub fn render_type(ty: &TypeRef, naming: &dyn NamingPolicy) -> String {
    match ty {
        TypeRef::Primitive(name) => name.clone(),
        TypeRef::Named(named) => {
            let base = naming.class_reference(named);
            if named.args.is_empty() {
                base
            } else {
                let args: Vec<String> = named
                    .args
                    .iter()
                    .map(|arg| render_type_argument(arg, naming))
                    .collect();
                format!("{}<{}>", base, args.join(", "))
            }
        }
        TypeRef::Array { element } => format!("{}[]", render_type(element, naming)),
        TypeRef::Wildcard { kind, bound } => match (kind, bound) {
            (WildcardKind::Extends, Some(bound)) => {
                format!("? extends {}", render_type(bound, naming))
            }
            (WildcardKind::Super, Some(bound)) => {
                format!("? super {}", render_type(bound, naming))
            }
            _ => "?".to_string(),
        },
        // Only the first bound of an intersection is denotable in Java source.
        TypeRef::Intersection(bounds) => bounds
            .first()
            .map(|bound| render_type(bound, naming))
            .unwrap_or_else(|| "java.lang.Object".to_string()),
        TypeRef::Void => "void".to_string(),
        TypeRef::Unknown => "java.lang.Object".to_string(),
    }
}

/// Renders a type in type-argument position, boxing primitives.
pub fn render_type_argument(ty: &TypeRef, naming: &dyn NamingPolicy) -> String {
    match ty {
        TypeRef::Primitive(name) => boxed_name(name).to_string(),
        TypeRef::Void => "java.lang.Void".to_string(),
        _ => render_type(ty, naming),
    }
}

pub fn boxed_name(primitive: &str) -> &str {
    match primitive {
        "boolean" => "java.lang.Boolean",
        "byte" => "java.lang.Byte",
        "short" => "java.lang.Short",
        "char" => "java.lang.Character",
        "int" => "java.lang.Integer",
        "long" => "java.lang.Long",
        "float" => "java.lang.Float",
        "double" => "java.lang.Double",
        other => other,
    }
}

/// Default value for a freshly declared slot of the given type, used by stub
/// bodies and padding of destructuring declarations.
pub fn default_value(ty: &TypeRef) -> &'static str {
    match ty {
        TypeRef::Primitive(name) => match name.as_str() {
            "boolean" => "false",
            "float" => "0.0f",
            "double" => "0.0d",
            "long" => "0L",
            "char" => "'\\0'",
            _ => "0",
        },
        _ => "null",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_generics_with_boxed_arguments() {
        let ty = TypeRef::generic("java.util.List", vec![TypeRef::int()]);
        assert_eq!(
            render_type(&ty, &MaterializedNaming),
            "java.util.List<java.lang.Integer>"
        );
    }

    #[test]
    fn unknown_renders_as_top_type() {
        assert_eq!(
            render_type(&TypeRef::Unknown, &MaterializedNaming),
            "java.lang.Object"
        );
    }

    #[test]
    fn inaccessible_type_falls_back_to_supertype() {
        let mut named = NamedType::new("com.example.Hidden$1");
        named.accessible_supertype = Some("com.example.Visible".to_string());
        assert_eq!(
            render_type(&TypeRef::Named(named), &MaterializedNaming),
            "com.example.Visible"
        );
    }

    #[test]
    fn intersection_renders_first_bound() {
        let ty = TypeRef::Intersection(vec![
            TypeRef::named("com.example.Reader"),
            TypeRef::named("com.example.Closer"),
        ]);
        assert_eq!(render_type(&ty, &MaterializedNaming), "com.example.Reader");
    }

    #[test]
    fn stub_naming_requalifies_batch_nested_types() {
        let mut batch = HashSet::new();
        batch.insert("Outer".to_string());
        let naming = StubNaming::new(batch);

        let mut nested = NamedType::new("Inner");
        nested.enclosing = vec!["Outer".to_string()];
        assert_eq!(naming.class_reference(&nested), "Outer.Inner");

        let plain = NamedType::new("java.lang.String");
        assert_eq!(naming.class_reference(&plain), "java.lang.String");
    }
}
