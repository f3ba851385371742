use crate::*;
use mira_ast::*;

fn lit_int(text: &str) -> Expression {
    Expression::Literal(Literal::Number(text.to_string()), Span::dummy())
}

fn lit_str(text: &str) -> Expression {
    Expression::Literal(Literal::String(text.to_string()), Span::dummy())
}

fn lit_bool(value: bool) -> Expression {
    Expression::Literal(Literal::Boolean(value), Span::dummy())
}

fn local(id: u32, name: &str, ty: TypeRef) -> Expression {
    Expression::LocalRef {
        id: LocalId(id),
        name: name.to_string(),
        ty,
        span: Span::dummy(),
    }
}

fn expr_stmt(expr: Expression) -> Statement {
    Statement::Expression {
        expr,
        is_method_exit: false,
        span: Span::dummy(),
    }
}

fn assign(target: Expression, value: Expression) -> Expression {
    Expression::Assignment {
        target: Box::new(target),
        op: None,
        value: Box::new(value),
        value_used: false,
        span: Span::dummy(),
    }
}

fn declare(id: u32, name: &str, initializer: Expression) -> Statement {
    Statement::VariableDeclaration {
        locals: vec![DeclaredLocal::new(LocalId(id), name)],
        initializer: Some(initializer),
        iteration_method: None,
        span: Span::dummy(),
    }
}

fn method(
    name: &str,
    return_type: Option<TypeRef>,
    has_return_value: bool,
    body: Vec<Statement>,
) -> MethodDecl {
    MethodDecl {
        name: name.to_string(),
        params: vec![],
        return_type,
        body: Some(body),
        modifiers: Modifiers::default(),
        has_return_value,
        span: Span::dummy(),
    }
}

fn class_of(members: Vec<Member>) -> TypeDecl {
    let mut decl = TypeDecl::new(TypeKind::Class, "Demo");
    decl.members = members;
    decl
}

fn unit_of(types: Vec<TypeDecl>) -> CompilationUnit {
    let mut unit = CompilationUnit::new("Demo");
    unit.types = types;
    unit
}

fn convert_one(unit: &CompilationUnit) -> String {
    let batch = JavaTranspiler::new().convert(std::slice::from_ref(unit));
    assert!(batch.failures.is_empty(), "{:?}", batch.failures);
    batch.outputs[0].source.clone()
}

fn generator() -> (JavaCodeGenerator, GenContext) {
    (JavaCodeGenerator::new(), GenContext::new())
}

#[test]
fn counter_mutated_inside_closure_is_boxed() {
    let closure = Expression::Closure {
        params: vec![],
        body: vec![expr_stmt(Expression::Assignment {
            target: Box::new(local(1, "count", TypeRef::int())),
            op: Some(BinaryOp::Add),
            value: Box::new(lit_int("1")),
            value_used: false,
            span: Span::dummy(),
        })],
        shape: None,
        span: Span::dummy(),
    };
    let unit = unit_of(vec![class_of(vec![Member::Method(method(
        "run",
        Some(TypeRef::Void),
        false,
        vec![declare(1, "count", lit_int("0")), expr_stmt(closure)],
    ))])]);
    let source = convert_one(&unit);
    assert!(source.contains(
        "final mira.runtime.Ref<java.lang.Integer> count = new mira.runtime.Ref<>(0);"
    ));
    assert!(source.contains("count.set(count.get() + 1);"));
    assert!(source.contains("new mira.runtime.Func() {"));
    assert!(source.contains("public java.lang.Object call(java.lang.Object... args)"));
}

#[test]
fn reassigned_local_without_capture_stays_plain() {
    let unit = unit_of(vec![class_of(vec![Member::Method(method(
        "run",
        Some(TypeRef::Void),
        false,
        vec![
            declare(1, "x", lit_int("1")),
            expr_stmt(assign(local(1, "x", TypeRef::int()), lit_int("2"))),
        ],
    ))])]);
    let source = convert_one(&unit);
    assert!(source.contains("int x = 1;"));
    assert!(source.contains("x = 2;"));
    assert!(!source.contains("Ref<"));
}

#[test]
fn user_equality_operator_becomes_negated_equals() {
    let (mut generator, mut ctx) = generator();
    let point = TypeRef::named("com.example.Point");
    let expr = Expression::Binary {
        op: BinaryOp::NotEqual,
        left: Box::new(local(1, "x", point.clone())),
        right: Box::new(local(2, "y", point)),
        resolved_method: Some(OperatorMethod {
            name: "equals".to_string(),
            owner: None,
        }),
        ty: TypeRef::boolean(),
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "!x.equals(y)");
}

#[test]
fn ordering_operator_routes_through_compare_to() {
    let (mut generator, mut ctx) = generator();
    let version = TypeRef::named("com.example.Version");
    let expr = Expression::Binary {
        op: BinaryOp::Less,
        left: Box::new(local(1, "x", version.clone())),
        right: Box::new(local(2, "y", version)),
        resolved_method: Some(OperatorMethod {
            name: "compareTo".to_string(),
            owner: None,
        }),
        ty: TypeRef::boolean(),
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "x.compareTo(y) < 0");
}

#[test]
fn numeric_operands_keep_native_operator_by_default() {
    let plus = OperatorMethod {
        name: "plus".to_string(),
        owner: None,
    };
    let expr = Expression::Binary {
        op: BinaryOp::Add,
        left: Box::new(local(1, "a", TypeRef::int())),
        right: Box::new(local(2, "b", TypeRef::int())),
        resolved_method: Some(plus),
        ty: TypeRef::int(),
        span: Span::dummy(),
    };

    let (mut generator, mut ctx) = generator();
    assert_eq!(generator.generate_expression(&mut ctx, &expr).unwrap(), "a + b");

    let config = JavaCodeGenConfig {
        replace_numeric_operators_with_methods: true,
        ..JavaCodeGenConfig::default()
    };
    let mut strict = JavaCodeGenerator::with_config(config);
    let mut ctx = GenContext::new();
    assert_eq!(strict.generate_expression(&mut ctx, &expr).unwrap(), "a.plus(b)");
}

#[test]
fn string_concatenation_keeps_plus() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::Binary {
        op: BinaryOp::Add,
        left: Box::new(local(1, "s", TypeRef::string())),
        right: Box::new(lit_int("1")),
        resolved_method: Some(OperatorMethod {
            name: "plus".to_string(),
            owner: None,
        }),
        ty: TypeRef::string(),
        span: Span::dummy(),
    };
    assert_eq!(generator.generate_expression(&mut ctx, &expr).unwrap(), "s + 1");
}

#[test]
fn null_safe_access_introduces_one_guarded_temp() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::NullSafe {
        receiver: Box::new(local(1, "user", TypeRef::named("com.example.User"))),
        name: "name".to_string(),
        property: Some(PropertyRef {
            owner: "com.example.User".to_string(),
            name: "name".to_string(),
            getter: Some("getName".to_string()),
            setter: None,
            ty: TypeRef::string(),
        }),
        ty: TypeRef::string(),
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "(safe == null ? null : safe.getName())");
    assert_eq!(
        ctx.take_hoisted(),
        vec!["final com.example.User safe = user;".to_string()]
    );
}

#[test]
fn elvis_evaluates_its_subject_once() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::Elvis {
        value: Box::new(local(1, "name", TypeRef::string())),
        fallback: Box::new(lit_str("anon")),
        ty: TypeRef::string(),
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(
        code,
        "(mira.runtime.Dyn.truthy(candidate) ? candidate : \"anon\")"
    );
    assert_eq!(
        ctx.take_hoisted(),
        vec!["final java.lang.String candidate = name;".to_string()]
    );
}

#[test]
fn variadic_tail_packs_into_one_array() {
    let (mut generator, mut ctx) = generator();
    let mut rest = ParamSig::new("rest", TypeRef::array(TypeRef::object()));
    rest.is_variadic = true;
    let expr = Expression::Call {
        receiver: None,
        receiver_ty: None,
        name: "log".to_string(),
        args: vec![
            Argument::positional(lit_str("a")),
            Argument::positional(lit_int("1")),
            Argument::positional(lit_int("2")),
        ],
        trailing_closures: vec![],
        resolved: Some(ResolvedCall {
            signature: ResolvedSignature::new(
                "log",
                vec![ParamSig::new("msg", TypeRef::string()), rest],
                TypeRef::Void,
            ),
            param_args: vec![vec![0], vec![1, 2]],
        }),
        ty: TypeRef::Void,
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "log(\"a\", new java.lang.Object[]{1, 2})");
}

#[test]
fn omitted_optional_argument_takes_declared_default() {
    let (mut generator, mut ctx) = generator();
    let mut flag = ParamSig::new("flag", TypeRef::boolean());
    flag.default_value = Some(Box::new(lit_bool(true)));
    let expr = Expression::Call {
        receiver: None,
        receiver_ty: None,
        name: "f".to_string(),
        args: vec![Argument::positional(lit_int("1"))],
        trailing_closures: vec![],
        resolved: Some(ResolvedCall {
            signature: ResolvedSignature::new(
                "f",
                vec![ParamSig::new("x", TypeRef::int()), flag],
                TypeRef::Void,
            ),
            param_args: vec![vec![0], vec![]],
        }),
        ty: TypeRef::Void,
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "f(1, true)");
}

#[test]
fn unresolved_call_degrades_to_dynamic_invoke() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::Call {
        receiver: Some(Box::new(local(1, "target", TypeRef::object()))),
        receiver_ty: None,
        name: "greet".to_string(),
        args: vec![
            Argument::positional(lit_int("1")),
            Argument::named("loud", lit_bool(true)),
        ],
        trailing_closures: vec![],
        resolved: None,
        ty: TypeRef::Unknown,
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(
        code,
        "mira.runtime.Dyn.invoke(target, \"greet\", new java.lang.Object[]{mira.runtime.Dyn.map(\"loud\", true), 1})"
    );
}

#[test]
fn intersection_receiver_upcasts_to_declaring_conjunct() {
    let (mut generator, mut ctx) = generator();
    let reader = TypeRef::named("com.example.Reader");
    let closer = TypeRef::named("com.example.Closer");
    let mut signature = ResolvedSignature::new("close", vec![], TypeRef::Void);
    signature.owner = Some("com.example.Closer".to_string());
    let expr = Expression::Call {
        receiver: Some(Box::new(local(
            1,
            "handle",
            TypeRef::Intersection(vec![reader.clone(), closer.clone()]),
        ))),
        receiver_ty: Some(TypeRef::Intersection(vec![reader, closer])),
        name: "close".to_string(),
        args: vec![],
        trailing_closures: vec![],
        resolved: Some(ResolvedCall {
            signature,
            param_args: vec![],
        }),
        ty: TypeRef::Void,
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "((com.example.Closer) handle).close()");
}

#[test]
fn first_bound_receiver_needs_no_upcast() {
    let (mut generator, mut ctx) = generator();
    let reader = TypeRef::named("com.example.Reader");
    let closer = TypeRef::named("com.example.Closer");
    let mut signature = ResolvedSignature::new("read", vec![], TypeRef::Void);
    signature.owner = Some("com.example.Reader".to_string());
    let expr = Expression::Call {
        receiver: Some(Box::new(local(
            1,
            "handle",
            TypeRef::Intersection(vec![reader.clone(), closer.clone()]),
        ))),
        receiver_ty: Some(TypeRef::Intersection(vec![reader, closer])),
        name: "read".to_string(),
        args: vec![],
        trailing_closures: vec![],
        resolved: Some(ResolvedCall {
            signature,
            param_args: vec![],
        }),
        ty: TypeRef::Void,
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "handle.read()");
}

fn case(labels: Vec<CaseLabel>, body: Vec<Statement>) -> SwitchCase {
    SwitchCase {
        labels,
        body,
        span: Span::dummy(),
    }
}

#[test]
fn string_selector_lowers_to_is_case_chain() {
    let (mut generator, mut ctx) = generator();
    let set_r = |value: &str| expr_stmt(assign(local(2, "r", TypeRef::string()), lit_str(value)));
    let statement = Statement::Switch {
        selector: local(1, "s", TypeRef::string()),
        cases: vec![
            case(vec![CaseLabel::Expression(lit_str("a"))], vec![]),
            case(
                vec![CaseLabel::Expression(lit_str("b"))],
                vec![
                    set_r("ab"),
                    Statement::Break {
                        label: None,
                        span: Span::dummy(),
                    },
                ],
            ),
            case(vec![CaseLabel::Default], vec![set_r("other")]),
        ],
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert!(code.contains("if (\"a\".isCase(s) || \"b\".isCase(s)) {"), "{code}");
    assert!(code.contains("r = \"ab\";"));
    assert!(code.contains(" else {"));
    assert!(code.contains("r = \"other\";"));
    assert!(!code.contains("switch"));
}

#[test]
fn int_selector_keeps_native_switch_without_injected_break() {
    let (mut generator, mut ctx) = generator();
    let set_r = |value: &str| expr_stmt(assign(local(2, "r", TypeRef::string()), lit_str(value)));
    let statement = Statement::Switch {
        selector: local(1, "n", TypeRef::int()),
        cases: vec![
            case(vec![CaseLabel::Expression(lit_int("1"))], vec![set_r("one")]),
            case(vec![CaseLabel::Expression(lit_int("2"))], vec![set_r("two")]),
        ],
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert!(code.contains("switch (n) {"), "{code}");
    assert!(code.contains("case 1:"));
    assert!(code.contains("case 2:"));
    assert!(!code.contains("isCase"));
    assert!(!code.contains("break"));
}

#[test]
fn sole_default_section_becomes_unconditional_branch() {
    let (mut generator, mut ctx) = generator();
    let statement = Statement::Switch {
        selector: local(1, "s", TypeRef::string()),
        cases: vec![case(
            vec![CaseLabel::Default],
            vec![expr_stmt(assign(
                local(2, "r", TypeRef::string()),
                lit_str("x"),
            ))],
        )],
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert!(code.starts_with("if (true) {"), "{code}");
}

#[test]
fn multiple_default_sections_are_rejected() {
    let (mut generator, mut ctx) = generator();
    let statement = Statement::Switch {
        selector: local(1, "s", TypeRef::string()),
        cases: vec![
            case(vec![CaseLabel::Default], vec![]),
            case(vec![CaseLabel::Default], vec![]),
        ],
        span: Span::dummy(),
    };
    let result = generator.generate_statement(&mut ctx, &statement);
    assert!(matches!(
        result,
        Err(CodeGenError::InvalidSwitchCases { .. })
    ));
}

#[test]
fn conditional_exit_from_a_lowered_section_targets_a_labeled_block() {
    let (mut generator, mut ctx) = generator();
    let guarded_exit = Statement::If {
        condition: lit_bool(true),
        then_branch: Box::new(Statement::Break {
            label: None,
            span: Span::dummy(),
        }),
        else_branch: None,
        span: Span::dummy(),
    };
    let statement = Statement::Switch {
        selector: local(1, "s", TypeRef::string()),
        cases: vec![
            case(
                vec![CaseLabel::Expression(lit_str("a"))],
                vec![
                    guarded_exit,
                    expr_stmt(assign(local(2, "r", TypeRef::string()), lit_str("a"))),
                ],
            ),
            case(
                vec![CaseLabel::Default],
                vec![expr_stmt(assign(
                    local(2, "r", TypeRef::string()),
                    lit_str("other"),
                ))],
            ),
        ],
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert!(code.starts_with("caseBlock: {"), "{code}");
    assert!(code.contains("break caseBlock;"), "{code}");
    assert!(code.ends_with('}'), "{code}");
}

#[test]
fn loop_exit_inside_a_lowered_section_stays_bare() {
    let (mut generator, mut ctx) = generator();
    let spin = Statement::While {
        condition: lit_bool(true),
        body: Box::new(Statement::Block {
            statements: vec![Statement::Break {
                label: None,
                span: Span::dummy(),
            }],
            span: Span::dummy(),
        }),
        span: Span::dummy(),
    };
    let statement = Statement::Switch {
        selector: local(1, "s", TypeRef::string()),
        cases: vec![
            case(
                vec![CaseLabel::Expression(lit_str("a"))],
                vec![
                    spin,
                    Statement::Break {
                        label: None,
                        span: Span::dummy(),
                    },
                ],
            ),
            case(
                vec![CaseLabel::Default],
                vec![expr_stmt(assign(
                    local(2, "r", TypeRef::string()),
                    lit_str("other"),
                ))],
            ),
        ],
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert!(code.contains("break;"), "{code}");
    assert!(!code.contains("caseBlock"), "{code}");
}

#[test]
fn enum_selector_labels_fold_to_bare_constant_names() {
    let (mut generator, mut ctx) = generator();
    let mut color = NamedType::new("com.example.Color");
    color.is_enum = true;
    let color_ty = TypeRef::Named(color);
    let red = Expression::PropertyAccess {
        receiver: None,
        binding: PropertyBinding::Resolved(PropertyRef {
            owner: "com.example.Color".to_string(),
            name: "RED".to_string(),
            getter: None,
            setter: None,
            ty: color_ty.clone(),
        }),
        span: Span::dummy(),
    };
    let statement = Statement::Switch {
        selector: local(1, "color", color_ty),
        cases: vec![case(
            vec![CaseLabel::Expression(red)],
            vec![expr_stmt(assign(
                local(2, "r", TypeRef::string()),
                lit_str("warm"),
            ))],
        )],
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert!(code.contains("switch (color) {"), "{code}");
    assert!(code.contains("case RED:"), "{code}");
    assert!(!code.contains("case com.example.Color"), "{code}");
}

#[test]
fn single_statement_branch_is_always_braced() {
    let (mut generator, mut ctx) = generator();
    let statement = Statement::If {
        condition: lit_bool(true),
        then_branch: Box::new(expr_stmt(assign(
            local(1, "r", TypeRef::int()),
            lit_int("1"),
        ))),
        else_branch: None,
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert_eq!(code, "if (true) {\n    r = 1;\n}");
}

#[test]
fn map_of_closures_expands_to_anonymous_subtype() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::InterfaceFromMap {
        target: TypeRef::named("com.example.ClickListener"),
        methods: vec![InterfaceMethodImpl {
            signature: ResolvedSignature::new(
                "onClick",
                vec![ParamSig::new("event", TypeRef::object())],
                TypeRef::Void,
            ),
            closure: Expression::Closure {
                params: vec![],
                body: vec![Statement::Return {
                    value: None,
                    span: Span::dummy(),
                }],
                shape: None,
                span: Span::dummy(),
            },
        }],
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "impl");
    let hoisted = ctx.take_hoisted();
    assert_eq!(hoisted.len(), 1);
    assert!(hoisted[0]
        .starts_with("final com.example.ClickListener impl = new com.example.ClickListener() {"));
    assert!(hoisted[0].contains("@Override"));
    assert!(hoisted[0].contains("public void onClick(java.lang.Object it)"));
    assert!(hoisted[0].ends_with("};"));
}

#[test]
fn shaped_closure_implements_functional_interface() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::Closure {
        params: vec![],
        body: vec![Statement::Return {
            value: None,
            span: Span::dummy(),
        }],
        shape: Some(FunctionalShape {
            interface: TypeRef::named("java.lang.Runnable"),
            method: "run".to_string(),
            params: vec![],
            return_type: TypeRef::Void,
        }),
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert!(code.starts_with("new java.lang.Runnable() {"), "{code}");
    assert!(code.contains("public void run()"));
    assert!(!code.contains("Func"));
}

#[test]
fn optional_closure_params_add_forwarding_overloads() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::Closure {
        params: vec![
            ClosureParam {
                id: LocalId(1),
                name: "a".to_string(),
                ty: Some(TypeRef::int()),
                default_value: None,
            },
            ClosureParam {
                id: LocalId(2),
                name: "b".to_string(),
                ty: Some(TypeRef::int()),
                default_value: Some(Box::new(lit_int("5"))),
            },
        ],
        body: vec![Statement::Return {
            value: Some(Expression::Binary {
                op: BinaryOp::Add,
                left: Box::new(local(1, "a", TypeRef::int())),
                right: Box::new(local(2, "b", TypeRef::int())),
                resolved_method: None,
                ty: TypeRef::int(),
                span: Span::dummy(),
            }),
            span: Span::dummy(),
        }],
        shape: Some(FunctionalShape {
            interface: TypeRef::named("com.example.Combiner"),
            method: "apply".to_string(),
            params: vec![
                ParamSig::new("a", TypeRef::int()),
                ParamSig::new("b", TypeRef::int()),
            ],
            return_type: TypeRef::int(),
        }),
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert!(code.contains("public int apply(int a, int b)"), "{code}");
    assert!(code.contains("return a + b;"));
    assert!(code.contains("public int apply(int a)"));
    assert!(code.contains("return apply(a, 5);"));
}

#[test]
fn value_producing_exit_statement_becomes_return() {
    let unit = unit_of(vec![class_of(vec![Member::Method(MethodDecl {
        name: "name".to_string(),
        params: vec![],
        return_type: Some(TypeRef::object()),
        body: Some(vec![Statement::Expression {
            expr: lit_str("x"),
            is_method_exit: true,
            span: Span::dummy(),
        }]),
        modifiers: Modifiers::default(),
        has_return_value: true,
        span: Span::dummy(),
    })])]);
    let source = convert_one(&unit);
    assert!(source.contains("return \"x\";"), "{source}");
}

#[test]
fn untyped_method_gets_top_type_and_falls_off_with_null() {
    let unit = unit_of(vec![class_of(vec![Member::Method(method(
        "name",
        None,
        true,
        vec![declare(1, "x", lit_int("1"))],
    ))])]);
    let source = convert_one(&unit);
    assert!(source.contains("public java.lang.Object name() {"), "{source}");
    assert!(source.contains("return null;"));
}

#[test]
fn constructor_delegation_stays_first_statement() {
    let unit = unit_of(vec![class_of(vec![Member::Constructor(ConstructorDecl {
        params: vec![],
        delegate: Some(DelegateCall {
            kind: DelegateKind::Super,
            args: vec![Argument::positional(lit_int("1"))],
            resolved: Some(ResolvedCall {
                signature: ResolvedSignature::new(
                    "Base",
                    vec![ParamSig::new("x", TypeRef::int())],
                    TypeRef::Void,
                ),
                param_args: vec![vec![0]],
            }),
            span: Span::dummy(),
        }),
        body: vec![],
        modifiers: Modifiers::default(),
        span: Span::dummy(),
    })])]);
    let source = convert_one(&unit);
    assert!(source.contains("public Demo() {"), "{source}");
    assert!(source.contains("super(1);"));
}

#[test]
fn setter_in_value_position_uses_trampoline_helper() {
    let assignment = Expression::Assignment {
        target: Box::new(Expression::PropertyAccess {
            receiver: Some(Box::new(local(1, "box", TypeRef::named("com.example.Box")))),
            binding: PropertyBinding::Resolved(PropertyRef {
                owner: "com.example.Box".to_string(),
                name: "width".to_string(),
                getter: Some("getWidth".to_string()),
                setter: Some("setWidth".to_string()),
                ty: TypeRef::int(),
            }),
            span: Span::dummy(),
        }),
        op: None,
        value: Box::new(lit_int("5")),
        value_used: true,
        span: Span::dummy(),
    };
    let unit = unit_of(vec![class_of(vec![Member::Method(method(
        "run",
        Some(TypeRef::Void),
        false,
        vec![declare(5, "w", assignment)],
    ))])]);
    let source = convert_one(&unit);
    assert!(source.contains("int w = mira$setWidth(box, 5);"), "{source}");
    assert!(source.contains(
        "private static int mira$setWidth(com.example.Box receiver, int value) {"
    ));
    assert!(source.contains("receiver.setWidth(value);"));
    assert!(source.contains("return value;"));
}

#[test]
fn inherited_base_capability_interface_is_elided() {
    let mut decl = TypeDecl::new(TypeKind::Class, "Demo");
    decl.interfaces = vec![TypeRef::named("mira.runtime.MiraObject")];
    decl.inherits_base_capability = true;
    let source = convert_one(&unit_of(vec![decl]));
    assert!(source.contains("public class Demo {"), "{source}");
    assert!(!source.contains("implements"));
}

#[test]
fn config_can_force_base_capability_interface() {
    let config = JavaCodeGenConfig {
        always_implement_base_capability: true,
        ..JavaCodeGenConfig::default()
    };
    let unit = unit_of(vec![TypeDecl::new(TypeKind::Class, "Demo")]);
    let batch = JavaTranspiler::with_config(config).convert(&[unit]);
    assert!(batch.outputs[0]
        .source
        .contains("public class Demo implements mira.runtime.MiraObject {"));
}

#[test]
fn enum_constants_render_arguments_and_terminator() {
    let mut decl = TypeDecl::new(TypeKind::Enum, "Planet");
    decl.enum_constants = vec![
        EnumConstant {
            name: "EARTH".to_string(),
            args: vec![Argument::positional(lit_int("1"))],
            body: vec![],
            span: Span::dummy(),
        },
        EnumConstant {
            name: "MARS".to_string(),
            args: vec![],
            body: vec![],
            span: Span::dummy(),
        },
    ];
    let source = convert_one(&unit_of(vec![decl]));
    assert!(source.contains("public enum Planet {"), "{source}");
    assert!(source.contains("EARTH(1),"));
    assert!(source.contains("MARS;"));
}

#[test]
fn constant_less_enum_keeps_a_well_formed_body() {
    let decl = TypeDecl::new(TypeKind::Enum, "Hollow");
    let source = convert_one(&unit_of(vec![decl]));
    assert!(source.contains("public enum Hollow {\n}"), "{source}");
    assert!(!source.contains(';'), "{source}");
}

#[test]
fn stub_mode_replaces_bodies_with_defaults() {
    let unit = unit_of(vec![class_of(vec![
        Member::Field {
            name: "cached".to_string(),
            ty: Some(TypeRef::int()),
            initializer: Some(lit_int("9")),
            modifiers: Modifiers {
                visibility: Visibility::Private,
                ..Modifiers::default()
            },
            span: Span::dummy(),
        },
        Member::Method(method(
            "size",
            Some(TypeRef::int()),
            true,
            vec![Statement::Return {
                value: Some(lit_int("42")),
                span: Span::dummy(),
            }],
        )),
    ])]);
    let batch = JavaTranspiler::new().convert_stubs(&[unit]);
    assert!(batch.failures.is_empty());
    let source = &batch.outputs[0].source;
    assert!(source.contains("private int cached;"), "{source}");
    assert!(source.contains("return 0;"));
    assert!(!source.contains("42"));
    assert!(!source.contains("9"));
}

#[test]
fn conversion_is_idempotent() {
    let unit = unit_of(vec![class_of(vec![Member::Method(method(
        "run",
        Some(TypeRef::Void),
        false,
        vec![
            declare(1, "x", lit_int("1")),
            expr_stmt(assign(local(1, "x", TypeRef::int()), lit_int("2"))),
        ],
    ))])]);
    assert_eq!(convert_one(&unit), convert_one(&unit));
}

#[test]
fn failed_unit_yields_no_output_and_does_not_stop_batch() {
    let mut bad = unit_of(vec![class_of(vec![Member::Method(method(
        "broken",
        Some(TypeRef::Void),
        false,
        vec![expr_stmt(assign(
            Expression::This { span: Span::dummy() },
            lit_int("1"),
        ))],
    ))])]);
    bad.name = "Bad".to_string();
    bad.types[0].name = "Bad".to_string();
    let mut good = unit_of(vec![TypeDecl::new(TypeKind::Class, "Good")]);
    good.name = "Good".to_string();

    let batch = JavaTranspiler::new().convert(&[bad, good]);
    assert_eq!(batch.outputs.len(), 1);
    assert_eq!(batch.outputs[0].name, "Good");
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].unit, "Bad");
    assert!(matches!(
        batch.failures[0].error,
        CodeGenError::MalformedTree { .. }
    ));
}

#[test]
fn post_steps_include_split_only_for_sibling_types() {
    let single = unit_of(vec![TypeDecl::new(TypeKind::Class, "Demo")]);
    let batch = JavaTranspiler::new().convert(&[single]);
    assert_eq!(
        batch.outputs[0].post_steps,
        vec![PostStep::ShortenReferences, PostStep::Reformat]
    );

    let mut double = unit_of(vec![
        TypeDecl::new(TypeKind::Class, "Demo"),
        TypeDecl::new(TypeKind::Class, "Helper"),
    ]);
    double.name = "Demo".to_string();
    let batch = JavaTranspiler::new().convert(&[double]);
    assert!(batch.outputs[0]
        .post_steps
        .contains(&PostStep::SplitTopLevelTypes));
}

#[test]
fn destructuring_pulls_through_a_single_iterator() {
    let (mut generator, mut ctx) = generator();
    let statement = Statement::VariableDeclaration {
        locals: vec![
            DeclaredLocal::new(LocalId(1), "a"),
            DeclaredLocal::new(LocalId(2), "b"),
        ],
        initializer: Some(local(
            3,
            "src",
            TypeRef::generic("java.util.List", vec![TypeRef::object()]),
        )),
        iteration_method: Some(ResolvedSignature::new(
            "iterator",
            vec![],
            TypeRef::generic("java.util.Iterator", vec![TypeRef::object()]),
        )),
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert!(
        code.contains("final java.util.Iterator<java.lang.Object> iterator = src.iterator();"),
        "{code}"
    );
    assert_eq!(code.matches("iterator.hasNext()").count(), 2);
    assert!(code.contains("final java.lang.Object a = "));
    assert!(code.contains("final java.lang.Object b = "));
}

#[test]
fn literal_destructuring_avoids_runtime_iteration() {
    let (mut generator, mut ctx) = generator();
    let statement = Statement::VariableDeclaration {
        locals: vec![
            DeclaredLocal::new(LocalId(1), "a"),
            DeclaredLocal::new(LocalId(2), "b"),
        ],
        initializer: Some(Expression::ListLiteral {
            elements: vec![lit_int("1"), lit_str("two")],
            expected: None,
            span: Span::dummy(),
        }),
        iteration_method: None,
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert!(code.contains("final int a = 1;"), "{code}");
    assert!(code.contains("final java.lang.String b = \"two\";"));
    assert!(!code.contains("Iterator"));
}

#[test]
fn for_loop_locals_stay_mutable_in_the_header() {
    let body = Statement::For {
        init: vec![declare(1, "i", lit_int("0"))],
        condition: Some(Expression::Binary {
            op: BinaryOp::Less,
            left: Box::new(local(1, "i", TypeRef::int())),
            right: Box::new(lit_int("10")),
            resolved_method: None,
            ty: TypeRef::boolean(),
            span: Span::dummy(),
        }),
        update: vec![Expression::IncDec {
            target: Box::new(local(1, "i", TypeRef::int())),
            op: IncDecOp::Increment,
            prefix: false,
            value_used: false,
            span: Span::dummy(),
        }],
        body: Box::new(Statement::Block {
            statements: vec![],
            span: Span::dummy(),
        }),
        span: Span::dummy(),
    };
    let unit = unit_of(vec![class_of(vec![Member::Method(method(
        "run",
        Some(TypeRef::Void),
        false,
        vec![body],
    ))])]);
    let source = convert_one(&unit);
    assert!(source.contains("for (int i = 0; i < 10; i++) {"), "{source}");
}

#[test]
fn unsupported_construct_becomes_todo_comment() {
    let (mut generator, mut ctx) = generator();
    let statement = Statement::Unsupported {
        description: "spread operator".to_string(),
        span: Span::dummy(),
    };
    let code = generator.generate_statement(&mut ctx, &statement).unwrap();
    assert_eq!(code, "/* TODO: unsupported construct: spread operator */");
}

#[test]
fn dynamic_scope_reference_reads_current_binding() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::PropertyAccess {
        receiver: None,
        binding: PropertyBinding::Unresolved {
            name: "out".to_string(),
            dynamic_scope: true,
        },
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "mira.runtime.Binding.current().getValue(\"out\")");
}

#[test]
fn dynamic_scope_assignment_writes_current_binding() {
    let (mut generator, mut ctx) = generator();
    let expr = assign(
        Expression::PropertyAccess {
            receiver: None,
            binding: PropertyBinding::Unresolved {
                name: "out".to_string(),
                dynamic_scope: true,
            },
            span: Span::dummy(),
        },
        lit_int("1"),
    );
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "mira.runtime.Binding.current().setValue(\"out\", 1)");
}

#[test]
fn inclusive_numeric_range_builds_int_range() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::RangeLiteral {
        from: Box::new(lit_int("1")),
        to: Box::new(lit_int("5")),
        inclusive: true,
        ty: TypeRef::Unknown,
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "new mira.runtime.IntRange(1, 5, true)");
}

#[test]
fn map_literal_hoists_ordered_puts() {
    let (mut generator, mut ctx) = generator();
    let expr = Expression::MapLiteral {
        entries: vec![
            MapEntry {
                key: lit_str("a"),
                value: lit_int("1"),
            },
            MapEntry {
                key: lit_str("b"),
                value: lit_int("2"),
            },
        ],
        span: Span::dummy(),
    };
    let code = generator.generate_expression(&mut ctx, &expr).unwrap();
    assert_eq!(code, "map");
    let hoisted = ctx.take_hoisted();
    assert_eq!(hoisted.len(), 3);
    assert!(hoisted[0]
        .contains("new java.util.LinkedHashMap<>();"));
    assert_eq!(hoisted[1], "map.put(\"a\", 1);");
    assert_eq!(hoisted[2], "map.put(\"b\", 2);");
}
