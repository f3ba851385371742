use mira_ast::{
    CompilationUnit, DeclaredLocal, Expression, LocalId, Member, Parameter, Statement, TypeRef,
};
use std::collections::HashMap;

/// Best-effort static type recovery for untyped declarations.
///
/// Results are memoized per local identity, so repeated lowering passes over
/// the same body (outer walk plus nested closure walks) see one consistent
/// answer per variable.
#[derive(Debug, Default)]
pub struct TypeInference {
    memo: HashMap<LocalId, TypeRef>,
}

impl TypeInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type of a declared local: the declared type when present, otherwise
    /// the initializer's static type, otherwise the universal top type.
    pub fn local_type(
        &mut self,
        local: &DeclaredLocal,
        initializer: Option<&Expression>,
    ) -> TypeRef {
        if let Some(ty) = &local.ty {
            return ty.clone();
        }
        if let Some(memoized) = self.memo.get(&local.id) {
            return memoized.clone();
        }
        let inferred = initializer
            .and_then(|expr| expr.static_type())
            .filter(|ty| !ty.is_unknown() && !ty.is_void())
            .unwrap_or_else(TypeRef::object);
        self.memo.insert(local.id, inferred.clone());
        inferred
    }

    /// Type of a formal parameter: the declared type when present, otherwise
    /// the static type of an argument at a matching call site elsewhere in
    /// the unit, otherwise the universal top type.
    pub fn parameter_type(
        &mut self,
        unit: Option<&CompilationUnit>,
        owner: &str,
        method: &str,
        index: usize,
        param: &Parameter,
    ) -> TypeRef {
        if let Some(ty) = &param.local.ty {
            return ty.clone();
        }
        if let Some(memoized) = self.memo.get(&param.local.id) {
            return memoized.clone();
        }
        let inferred = unit
            .and_then(|unit| scan_call_argument(unit, owner, method, index))
            .filter(|ty| !ty.is_unknown() && !ty.is_void())
            .unwrap_or_else(TypeRef::object);
        self.memo.insert(param.local.id, inferred.clone());
        inferred
    }
}

/// Finds the first call in the unit resolved to `owner.method` and returns
/// the static type of the actual bound to formal `index`.
fn scan_call_argument(
    unit: &CompilationUnit,
    owner: &str,
    method: &str,
    index: usize,
) -> Option<TypeRef> {
    let mut found = None;
    for decl in &unit.types {
        scan_members(&decl.members, owner, method, index, &mut found);
        for nested in &decl.nested {
            scan_members(&nested.members, owner, method, index, &mut found);
        }
        if found.is_some() {
            break;
        }
    }
    found
}

fn scan_members(
    members: &[Member],
    owner: &str,
    method: &str,
    index: usize,
    found: &mut Option<TypeRef>,
) {
    for member in members {
        if found.is_some() {
            return;
        }
        match member {
            Member::Method(decl) => {
                if let Some(body) = &decl.body {
                    scan_statements(body, owner, method, index, found);
                }
            }
            Member::Constructor(decl) => scan_statements(&decl.body, owner, method, index, found),
            Member::Initializer { body, .. } => scan_statements(body, owner, method, index, found),
            Member::Field { initializer, .. } => {
                if let Some(initializer) = initializer {
                    scan_expression(initializer, owner, method, index, found);
                }
            }
        }
    }
}

fn scan_statements(
    statements: &[Statement],
    owner: &str,
    method: &str,
    index: usize,
    found: &mut Option<TypeRef>,
) {
    for statement in statements {
        if found.is_some() {
            return;
        }
        match statement {
            Statement::Expression { expr, .. } | Statement::Throw { expr, .. } => {
                scan_expression(expr, owner, method, index, found)
            }
            Statement::VariableDeclaration { initializer, .. } => {
                if let Some(initializer) = initializer {
                    scan_expression(initializer, owner, method, index, found);
                }
            }
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    scan_expression(value, owner, method, index, found);
                }
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                scan_expression(condition, owner, method, index, found);
                scan_statements(
                    std::slice::from_ref(then_branch),
                    owner,
                    method,
                    index,
                    found,
                );
                if let Some(else_branch) = else_branch {
                    scan_statements(
                        std::slice::from_ref(else_branch),
                        owner,
                        method,
                        index,
                        found,
                    );
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                scan_expression(condition, owner, method, index, found);
                scan_statements(std::slice::from_ref(body), owner, method, index, found);
            }
            Statement::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                scan_statements(init, owner, method, index, found);
                if let Some(condition) = condition {
                    scan_expression(condition, owner, method, index, found);
                }
                for expr in update {
                    scan_expression(expr, owner, method, index, found);
                }
                scan_statements(std::slice::from_ref(body), owner, method, index, found);
            }
            Statement::ForEach { iterable, body, .. } => {
                scan_expression(iterable, owner, method, index, found);
                scan_statements(std::slice::from_ref(body), owner, method, index, found);
            }
            Statement::Switch {
                selector, cases, ..
            } => {
                scan_expression(selector, owner, method, index, found);
                for case in cases {
                    scan_statements(&case.body, owner, method, index, found);
                }
            }
            Statement::Try {
                body,
                catches,
                finally_block,
                ..
            } => {
                scan_statements(body, owner, method, index, found);
                for catch in catches {
                    scan_statements(&catch.body, owner, method, index, found);
                }
                if let Some(finally_block) = finally_block {
                    scan_statements(finally_block, owner, method, index, found);
                }
            }
            Statement::Block { statements, .. } | Statement::Synchronized {
                body: statements, ..
            } => scan_statements(statements, owner, method, index, found),
            Statement::Labeled { statement, .. } => {
                scan_statements(std::slice::from_ref(statement), owner, method, index, found)
            }
            Statement::Break { .. }
            | Statement::Continue { .. }
            | Statement::Unsupported { .. } => {}
        }
    }
}

fn scan_expression(
    expression: &Expression,
    owner: &str,
    method: &str,
    index: usize,
    found: &mut Option<TypeRef>,
) {
    if found.is_some() {
        return;
    }
    if let Expression::Call {
        name,
        args,
        trailing_closures,
        resolved: Some(resolved),
        ..
    } = expression
    {
        let owner_matches = resolved
            .signature
            .owner
            .as_deref()
            .map(|candidate| candidate == owner)
            .unwrap_or(false);
        if owner_matches && name == method {
            if let Some(slots) = resolved.param_args.get(index) {
                if let Some(&slot) = slots.first() {
                    let actual = if slot < args.len() {
                        Some(&args[slot].value)
                    } else {
                        trailing_closures.get(slot - args.len())
                    };
                    *found = actual.and_then(|expr| expr.static_type());
                    if found.is_some() {
                        return;
                    }
                }
            }
        }
    }
    // Recurse into subexpressions.
    match expression {
        Expression::PropertyAccess { receiver, .. } => {
            if let Some(receiver) = receiver {
                scan_expression(receiver, owner, method, index, found);
            }
        }
        Expression::IndexAccess {
            receiver, index: idx, ..
        } => {
            scan_expression(receiver, owner, method, index, found);
            scan_expression(idx, owner, method, index, found);
        }
        Expression::Call {
            receiver,
            args,
            trailing_closures,
            ..
        } => {
            if let Some(receiver) = receiver {
                scan_expression(receiver, owner, method, index, found);
            }
            for arg in args {
                scan_expression(&arg.value, owner, method, index, found);
            }
            for closure in trailing_closures {
                scan_expression(closure, owner, method, index, found);
            }
        }
        Expression::New { args, .. } => {
            for arg in args {
                scan_expression(&arg.value, owner, method, index, found);
            }
        }
        Expression::Binary { left, right, .. } => {
            scan_expression(left, owner, method, index, found);
            scan_expression(right, owner, method, index, found);
        }
        Expression::Unary { operand, .. }
        | Expression::Cast { operand, .. }
        | Expression::TypeTest { operand, .. } => {
            scan_expression(operand, owner, method, index, found)
        }
        Expression::Assignment { target, value, .. } => {
            scan_expression(target, owner, method, index, found);
            scan_expression(value, owner, method, index, found);
        }
        Expression::IncDec { target, .. } => scan_expression(target, owner, method, index, found),
        Expression::NullSafe { receiver, .. } => {
            scan_expression(receiver, owner, method, index, found)
        }
        Expression::Elvis {
            value, fallback, ..
        } => {
            scan_expression(value, owner, method, index, found);
            scan_expression(fallback, owner, method, index, found);
        }
        Expression::Conditional {
            condition,
            then_expr,
            else_expr,
            ..
        } => {
            scan_expression(condition, owner, method, index, found);
            scan_expression(then_expr, owner, method, index, found);
            scan_expression(else_expr, owner, method, index, found);
        }
        Expression::ListLiteral { elements, .. } => {
            for element in elements {
                scan_expression(element, owner, method, index, found);
            }
        }
        Expression::MapLiteral { entries, .. } => {
            for entry in entries {
                scan_expression(&entry.key, owner, method, index, found);
                scan_expression(&entry.value, owner, method, index, found);
            }
        }
        Expression::RangeLiteral { from, to, .. } => {
            scan_expression(from, owner, method, index, found);
            scan_expression(to, owner, method, index, found);
        }
        Expression::Closure { body, .. } => scan_statements(body, owner, method, index, found),
        Expression::InterfaceFromMap { methods, .. } => {
            for m in methods {
                scan_expression(&m.closure, owner, method, index, found);
            }
        }
        Expression::Literal(_, _)
        | Expression::LocalRef { .. }
        | Expression::This { .. }
        | Expression::Super { .. } => {}
    }
}
