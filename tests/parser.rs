//! Grammar-level tests: node construction, precedence and associativity.

use llama_lang::ast::*;
use llama_lang::diagnostics::{shared, Logger, SharedLogger};
use llama_lang::parser::Parser;

fn parser() -> Parser {
    Parser::new(shared(Logger::mock()))
}

fn parser_with(logger: SharedLogger) -> Parser {
    Parser::new(logger)
}

fn expr(data: &str) -> Expression {
    parser()
        .parse_expression(data)
        .unwrap_or_else(|| panic!("failed to parse expression: {data}"))
}

fn ty(data: &str) -> Type {
    parser()
        .parse_type(data)
        .unwrap_or_else(|| panic!("failed to parse type: {data}"))
}

fn int(value: i64) -> Expression {
    Expression::Const(ConstExpression::new(Type::int(), ConstValue::Int(value)))
}

fn genid(name: &str) -> Expression {
    Expression::Genid(GenidExpression {
        name: name.into(),
        pos: Pos::default(),
    })
}

fn boolean(value: bool) -> Expression {
    Expression::Const(ConstExpression::new(Type::bool(), ConstValue::Bool(value)))
}

fn bin(left: Expression, operator: &str, right: Expression) -> Expression {
    Expression::Binary(Box::new(BinaryExpression {
        left,
        operator: operator.into(),
        right,
        pos: Pos::default(),
    }))
}

fn un(operator: &str, operand: Expression) -> Expression {
    Expression::Unary(Box::new(UnaryExpression {
        operator: operator.into(),
        operand,
        pos: Pos::default(),
    }))
}

fn fun_def(name: &str, params: Vec<Param>, body: Expression) -> FunctionDef {
    FunctionDef {
        name: name.into(),
        params,
        body,
        return_type: None,
        pos: Pos::default(),
    }
}

fn param(name: &str, ty: Option<Type>) -> Param {
    Param {
        name: name.into(),
        ty,
        pos: Pos::default(),
    }
}

#[test]
fn test_empty_program() {
    let program = parser().parse("");
    assert_eq!(program, Program::default());
}

#[test]
fn test_program_def_list() {
    let program = parser().parse("let x = 1 let y = 2");
    assert_eq!(program.defs.len(), 2);
    assert_eq!(
        program.defs[0],
        Definition::Let(LetDef {
            defs: vec![Def::Function(fun_def("x", vec![], int(1)))],
            rec: false,
            pos: Pos::default(),
        })
    );
}

#[test]
fn test_letdef() {
    let plain = parser().parse_letdef("let x = 1").unwrap();
    assert!(!plain.rec);
    assert_eq!(plain.defs, vec![Def::Function(fun_def("x", vec![], int(1)))]);

    let rec = parser().parse_letdef("let rec x = 1").unwrap();
    assert!(rec.rec);
}

#[test]
fn test_letdef_and_seq() {
    let letdef = parser().parse_letdef("let x = 1 and y = 2").unwrap();
    assert_eq!(letdef.defs.len(), 2);
}

#[test]
fn test_function_def() {
    assert_eq!(
        parser().parse_def("let x = 1"),
        Some(Def::Function(fun_def("x", vec![], int(1))))
    );
    assert_eq!(
        parser().parse_def("let x y (z:int) = 1"),
        Some(Def::Function(fun_def(
            "x",
            vec![param("y", None), param("z", Some(Type::int()))],
            int(1)
        )))
    );
    assert_eq!(
        parser().parse_def("let x y z:int = 1"),
        Some(Def::Function(FunctionDef {
            name: "x".into(),
            params: vec![param("y", None), param("z", None)],
            body: int(1),
            return_type: Some(Type::int()),
            pos: Pos::default(),
        }))
    );
}

#[test]
fn test_trailing_tokens_are_an_error() {
    let logger = shared(Logger::mock());
    assert!(parser_with(logger.clone())
        .parse_expression("1 2 3 oops )")
        .is_none());
    assert!(!logger.borrow().success());
}

#[test]
fn test_builtin_types() {
    assert_eq!(ty("unit"), Type::unit());
    assert_eq!(ty("int"), Type::int());
    assert_eq!(ty("char"), Type::char());
    assert_eq!(ty("bool"), Type::bool());
    assert_eq!(ty("float"), Type::float());
}

#[test]
fn test_user_type() {
    assert_eq!(ty("mytype"), Type::user("mytype"));
}

#[test]
fn test_array_types() {
    assert_eq!(ty("array of int"), Type::array(Type::int(), 1));
    assert_eq!(ty("array [*, *] of int"), Type::array(Type::int(), 2));
    assert_eq!(ty("array [*, *, *] of int"), Type::array(Type::int(), 3));
}

#[test]
fn test_function_and_ref_types() {
    assert_eq!(ty("int -> float"), Type::function(Type::int(), Type::float()));
    assert_eq!(ty("int ref"), Type::reference(Type::int()));
    assert_eq!(ty("(int)"), Type::int());
}

#[test]
fn test_type_precedence() {
    // `array of` binds its element through `ref` but not through `->`.
    assert_eq!(
        ty("array of int ref"),
        Type::array(Type::reference(Type::int()), 1)
    );
    assert_eq!(
        ty("array of int -> int"),
        Type::function(Type::array(Type::int(), 1), Type::int())
    );
    // The arrow is right-associative and binds loosest.
    assert_eq!(
        ty("int -> int ref"),
        Type::function(Type::int(), Type::reference(Type::int()))
    );
    assert_eq!(
        ty("int -> int -> int"),
        Type::function(Type::int(), Type::function(Type::int(), Type::int()))
    );
    // Postfix `ref` chains to the left.
    assert_eq!(
        ty("int ref ref"),
        Type::reference(Type::reference(Type::int()))
    );
    assert_eq!(
        ty("(int -> int) ref"),
        Type::reference(Type::function(Type::int(), Type::int()))
    );
}

#[test]
fn test_constants() {
    assert_eq!(expr("5"), int(5));
    assert_eq!(
        expr("5.7"),
        Expression::Const(ConstExpression::new(Type::float(), ConstValue::Float(5.7)))
    );
    assert_eq!(
        expr("'z'"),
        Expression::Const(ConstExpression::new(Type::char(), ConstValue::Char(b'z')))
    );
    assert_eq!(
        expr("\"z\""),
        Expression::Const(ConstExpression::new(
            Type::string(),
            ConstValue::Str(vec![b'z', 0])
        ))
    );
    assert_eq!(expr("true"), boolean(true));
    assert_eq!(
        expr("()"),
        Expression::Const(ConstExpression::new(Type::unit(), ConstValue::Unit))
    );
}

#[test]
fn test_single_identifier() {
    assert_eq!(expr("koko"), genid("koko"));
}

#[test]
fn test_constructor_declarations() {
    assert_eq!(
        parser().parse_constructor("Node"),
        Some(Constructor::new("Node", vec![]))
    );
    assert_eq!(
        parser().parse_constructor("Node of int"),
        Some(Constructor::new("Node", vec![Type::int()]))
    );
    assert_eq!(
        parser().parse_constructor("Cons of int list"),
        Some(Constructor::new(
            "Cons",
            vec![Type::int(), Type::user("list")]
        ))
    );
}

#[test]
fn test_simple_variable_def() {
    assert_eq!(
        parser().parse_def("mutable foo : int"),
        Some(Def::Variable(VariableDef {
            name: "foo".into(),
            ty: Some(Type::reference(Type::int())),
            pos: Pos::default(),
        }))
    );
    assert_eq!(
        parser().parse_def("mutable foo"),
        Some(Def::Variable(VariableDef {
            name: "foo".into(),
            ty: None,
            pos: Pos::default(),
        }))
    );
}

#[test]
fn test_array_variable_def() {
    assert_eq!(
        parser().parse_def("mutable foo [2]"),
        Some(Def::Array(ArrayVariableDef {
            name: "foo".into(),
            dimensions: vec![int(2)],
            ty: None,
            pos: Pos::default(),
        }))
    );
    // The declared element type is stored as the synthesized array whose
    // dimension count equals the dimension-expression list.
    assert_eq!(
        parser().parse_def("mutable foo [2] : int"),
        Some(Def::Array(ArrayVariableDef {
            name: "foo".into(),
            dimensions: vec![int(2)],
            ty: Some(Type::array(Type::int(), 1)),
            pos: Pos::default(),
        }))
    );
    assert_eq!(
        parser().parse_def("mutable foo [2, 3] : int"),
        Some(Def::Array(ArrayVariableDef {
            name: "foo".into(),
            dimensions: vec![int(2), int(3)],
            ty: Some(Type::array(Type::int(), 2)),
            pos: Pos::default(),
        }))
    );
}

#[test]
fn test_while_expr() {
    assert_eq!(
        expr("while true do true done"),
        Expression::While(Box::new(WhileExpression {
            condition: boolean(true),
            body: boolean(true),
            pos: Pos::default(),
        }))
    );
}

#[test]
fn test_if_expr() {
    assert_eq!(
        expr("if true then true else true"),
        Expression::If(Box::new(IfExpression {
            condition: boolean(true),
            then_expr: boolean(true),
            else_expr: Some(boolean(true)),
            pos: Pos::default(),
        }))
    );
    assert_eq!(
        expr("if true then true"),
        Expression::If(Box::new(IfExpression {
            condition: boolean(true),
            then_expr: boolean(true),
            else_expr: None,
            pos: Pos::default(),
        }))
    );
}

#[test]
fn test_for_expr() {
    assert_eq!(
        expr("for i = 1 to 2 do true done"),
        Expression::For(Box::new(ForExpression {
            counter: "i".into(),
            start: int(1),
            stop: int(2),
            body: boolean(true),
            down: false,
            pos: Pos::default(),
        }))
    );
    let Expression::For(down) = expr("for i = 1 downto 2 do true done") else {
        panic!("expected a for expression");
    };
    assert!(down.down);
}

#[test]
fn test_match_expr() {
    assert_eq!(
        expr("match true with true -> true end"),
        Expression::Match(Box::new(MatchExpression {
            expr: boolean(true),
            clauses: vec![Clause {
                pattern: Pattern::Const(ConstExpression::new(
                    Type::bool(),
                    ConstValue::Bool(true)
                )),
                expr: boolean(true),
                pos: Pos::default(),
            }],
            pos: Pos::default(),
        }))
    );
}

#[test]
fn test_patterns() {
    assert_eq!(
        parser().parse_pattern("true"),
        Some(Pattern::Const(ConstExpression::new(
            Type::bool(),
            ConstValue::Bool(true)
        )))
    );
    assert_eq!(
        parser().parse_pattern("x"),
        Some(Pattern::Genid(GenidPattern {
            name: "x".into(),
            pos: Pos::default(),
        }))
    );
    assert_eq!(
        parser().parse_pattern("-5"),
        Some(Pattern::Const(ConstExpression::new(
            Type::int(),
            ConstValue::Int(-5)
        )))
    );
    assert_eq!(
        parser().parse_pattern("+.5.0"),
        Some(Pattern::Const(ConstExpression::new(
            Type::float(),
            ConstValue::Float(5.0)
        )))
    );
    assert_eq!(
        parser().parse_pattern("Red true x"),
        Some(Pattern::Constructor(ConstructorPattern {
            name: "Red".into(),
            args: vec![
                Pattern::Const(ConstExpression::new(Type::bool(), ConstValue::Bool(true))),
                Pattern::Genid(GenidPattern {
                    name: "x".into(),
                    pos: Pos::default(),
                }),
            ],
            pos: Pos::default(),
        }))
    );
    assert_eq!(
        parser().parse_pattern("Cons x (Cons y Nil)"),
        Some(Pattern::Constructor(ConstructorPattern {
            name: "Cons".into(),
            args: vec![
                Pattern::Genid(GenidPattern {
                    name: "x".into(),
                    pos: Pos::default(),
                }),
                Pattern::Constructor(ConstructorPattern {
                    name: "Cons".into(),
                    args: vec![
                        Pattern::Genid(GenidPattern {
                            name: "y".into(),
                            pos: Pos::default(),
                        }),
                        Pattern::Constructor(ConstructorPattern {
                            name: "Nil".into(),
                            args: vec![],
                            pos: Pos::default(),
                        }),
                    ],
                    pos: Pos::default(),
                }),
            ],
            pos: Pos::default(),
        }))
    );
}

#[test]
fn test_delete_and_dim() {
    assert_eq!(
        expr("delete true"),
        Expression::Delete(Box::new(DeleteExpression {
            expr: boolean(true),
            pos: Pos::default(),
        }))
    );
    assert_eq!(
        expr("dim name"),
        Expression::Dim(DimExpression {
            name: "name".into(),
            dimension: 1,
            pos: Pos::default(),
        })
    );
    assert_eq!(
        expr("dim 2 name"),
        Expression::Dim(DimExpression {
            name: "name".into(),
            dimension: 2,
            pos: Pos::default(),
        })
    );
}

#[test]
fn test_every_binary_operator() {
    let operators = [
        "+", "-", "*", "/", "+.", "-.", "*.", "/.", "**", "mod", "<", ">", "=", "<=", ">=",
        "<>", "==", "!=", "&&", "||", ":=", ";",
    ];
    for operator in operators {
        let parsed = expr(&format!("1 {operator} 2"));
        assert_eq!(parsed, bin(int(1), operator, int(2)), "operator {operator}");
    }
}

#[test]
fn test_every_unary_operator() {
    for operator in ["+", "-", "+.", "-.", "!", "not"] {
        let parsed = expr(&format!("{operator} 1"));
        assert_eq!(parsed, un(operator, int(1)), "operator {operator}");
    }
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(
        expr("1 + 2 * 3"),
        bin(int(1), "+", bin(int(2), "*", int(3)))
    );
    assert_eq!(
        expr("1 - 2 - 3"),
        bin(bin(int(1), "-", int(2)), "-", int(3))
    );
    assert_eq!(
        expr("1 + 2 mod 3"),
        bin(int(1), "+", bin(int(2), "mod", int(3)))
    );
}

#[test]
fn test_pow_is_right_associative() {
    assert_eq!(
        expr("2 ** 3 ** 4"),
        bin(int(2), "**", bin(int(3), "**", int(4)))
    );
}

#[test]
fn test_unary_sign_binds_tighter_than_pow() {
    assert_eq!(expr("+1 ** 2"), bin(un("+", int(1)), "**", int(2)));
    assert_eq!(expr("-1 ** 2"), bin(un("-", int(1)), "**", int(2)));
}

#[test]
fn test_unary_minus_vs_binary_minus() {
    assert_eq!(expr("- 1"), un("-", int(1)));
    assert_eq!(expr("1 - 2"), bin(int(1), "-", int(2)));
}

#[test]
fn test_sign_over_application() {
    assert_eq!(
        expr("- f x"),
        un(
            "-",
            Expression::Call(FunctionCallExpression {
                name: "f".into(),
                args: vec![genid("x")],
                pos: Pos::default(),
            })
        )
    );
}

#[test]
fn test_logic_precedence() {
    assert_eq!(
        expr("a || b && c"),
        bin(genid("a"), "||", bin(genid("b"), "&&", genid("c")))
    );
    assert_eq!(
        expr("a && b = c"),
        bin(genid("a"), "&&", bin(genid("b"), "=", genid("c")))
    );
}

#[test]
fn test_assign_binds_looser_than_logic() {
    assert_eq!(
        expr("a := b || c"),
        bin(genid("a"), ":=", bin(genid("b"), "||", genid("c")))
    );
}

#[test]
fn test_semicolon_is_left_associative() {
    assert_eq!(
        expr("a; b; c"),
        bin(bin(genid("a"), ";", genid("b")), ";", genid("c"))
    );
}

#[test]
fn test_nonassoc_comparison_is_an_error() {
    let logger = shared(Logger::mock());
    assert!(parser_with(logger.clone()).parse_expression("1 < 2 < 3").is_none());
    assert!(!logger.borrow().success());

    assert!(parser().parse_expression("1 = 2 == 3").is_none());
    assert!(parser().parse_expression("a := b := c").is_none());
}

#[test]
fn test_comparison_mixes_with_arithmetic() {
    assert_eq!(
        expr("1 + 2 < 3 * 4"),
        bin(
            bin(int(1), "+", int(2)),
            "<",
            bin(int(3), "*", int(4))
        )
    );
}

#[test]
fn test_if_then_assign_else() {
    // `if p then a := b else c` groups the assignment under `then`.
    assert_eq!(
        expr("if p then a := b else c"),
        Expression::If(Box::new(IfExpression {
            condition: genid("p"),
            then_expr: bin(genid("a"), ":=", genid("b")),
            else_expr: Some(genid("c")),
            pos: Pos::default(),
        }))
    );
}

#[test]
fn test_if_stops_at_semicolon() {
    assert_eq!(
        expr("if a then b; c"),
        bin(
            Expression::If(Box::new(IfExpression {
                condition: genid("a"),
                then_expr: genid("b"),
                else_expr: None,
                pos: Pos::default(),
            })),
            ";",
            genid("c")
        )
    );
}

#[test]
fn test_dangling_else_binds_to_inner_if() {
    assert_eq!(
        expr("if a then if b then c else d"),
        Expression::If(Box::new(IfExpression {
            condition: genid("a"),
            then_expr: Expression::If(Box::new(IfExpression {
                condition: genid("b"),
                then_expr: genid("c"),
                else_expr: Some(genid("d")),
                pos: Pos::default(),
            })),
            else_expr: None,
            pos: Pos::default(),
        }))
    );
}

#[test]
fn test_application() {
    assert_eq!(
        expr("f g x"),
        Expression::Call(FunctionCallExpression {
            name: "f".into(),
            args: vec![genid("g"), genid("x")],
            pos: Pos::default(),
        })
    );
    assert_eq!(
        expr("Cons 1 rest"),
        Expression::ConstructorCall(ConstructorCallExpression {
            name: "Cons".into(),
            args: vec![int(1), genid("rest")],
            pos: Pos::default(),
        })
    );
    assert_eq!(
        expr("f (g x)"),
        Expression::Call(FunctionCallExpression {
            name: "f".into(),
            args: vec![Expression::Call(FunctionCallExpression {
                name: "g".into(),
                args: vec![genid("x")],
                pos: Pos::default(),
            })],
            pos: Pos::default(),
        })
    );
}

#[test]
fn test_application_binds_tighter_than_operators() {
    assert_eq!(
        expr("f x + g y"),
        bin(
            Expression::Call(FunctionCallExpression {
                name: "f".into(),
                args: vec![genid("x")],
                pos: Pos::default(),
            }),
            "+",
            Expression::Call(FunctionCallExpression {
                name: "g".into(),
                args: vec![genid("y")],
                pos: Pos::default(),
            })
        )
    );
}

#[test]
fn test_array_indexing() {
    assert_eq!(
        expr("a[0]"),
        Expression::ArrayIndex(ArrayExpression {
            name: "a".into(),
            indices: vec![int(0)],
            pos: Pos::default(),
        })
    );
    assert_eq!(
        expr("a[i, j]"),
        Expression::ArrayIndex(ArrayExpression {
            name: "a".into(),
            indices: vec![genid("i"), genid("j")],
            pos: Pos::default(),
        })
    );
}

#[test]
fn test_indexing_is_not_chained() {
    assert!(parser().parse_expression("a[0][0]").is_none());
}

#[test]
fn test_bang_over_new() {
    assert_eq!(expr("!new int"), expr("!(new int)"));
    assert_eq!(
        expr("!new int"),
        un(
            "!",
            Expression::New(NewExpression {
                ty: Type::int(),
                pos: Pos::default(),
            })
        )
    );
}

#[test]
fn test_bang_over_indexing() {
    assert_eq!(expr("!a[0]"), expr("!(a[0])"));
    assert_eq!(
        expr("!a[0]"),
        un(
            "!",
            Expression::ArrayIndex(ArrayExpression {
                name: "a".into(),
                indices: vec![int(0)],
                pos: Pos::default(),
            })
        )
    );
}

#[test]
fn test_deref_head_is_not_applicable() {
    // `!` binds to the head identifier, and a dereferenced head cannot be
    // applied; both spellings fail the same way.
    assert!(parser().parse_expression("!f x").is_none());
    assert!(parser().parse_expression("(!f) x").is_none());
}

#[test]
fn test_bang_in_argument_position() {
    assert_eq!(
        expr("f !x y"),
        Expression::Call(FunctionCallExpression {
            name: "f".into(),
            args: vec![un("!", genid("x")), genid("y")],
            pos: Pos::default(),
        })
    );
}

#[test]
fn test_double_bang() {
    assert_eq!(expr("!!p"), un("!", un("!", genid("p"))));
}

#[test]
fn test_begin_end() {
    assert_eq!(expr("begin 1 end"), int(1));
}

#[test]
fn test_let_in() {
    let parsed = expr("let x = 1 in x; y");
    let Expression::LetIn(let_in) = parsed else {
        panic!("expected a let-in expression");
    };
    assert_eq!(let_in.letdef.defs.len(), 1);
    // The body extends through `;`.
    assert_eq!(let_in.expr, bin(genid("x"), ";", genid("y")));
}

#[test]
fn test_parenthesization_law() {
    let cases = [
        "1 + 2 * 3",
        "f x + g y",
        "if a then b else c",
        "let x = 1 in x",
        "match x with y -> y end",
        "- 1 ** 2",
        "a; b; c",
        "while a do b done",
        "!a[0]",
    ];
    for case in cases {
        assert_eq!(
            parser().parse_expression(case),
            parser().parse_expression(&format!("({case})")),
            "case {case}"
        );
    }
}

#[test]
fn test_top_level_let_in_is_an_error() {
    let logger = shared(Logger::mock());
    parser_with(logger.clone()).parse("let x = 1 in 2");
    assert!(!logger.borrow().success());
}

#[test]
fn test_syntax_error_recovers_at_next_definition() {
    let logger = shared(Logger::mock());
    let program = parser_with(logger.clone()).parse("let x = in let y = 2");
    assert!(!logger.borrow().success());
    // The second definition still parses.
    assert_eq!(program.defs.len(), 1);
    let Definition::Let(letdef) = &program.defs[0] else {
        panic!("expected a let definition");
    };
    let Def::Function(func) = &letdef.defs[0] else {
        panic!("expected a function definition");
    };
    assert_eq!(func.name, "y");
}

#[test]
fn test_position_tracking() {
    let parsed = parser().parse_expression("  1 + 2").unwrap();
    let Expression::Binary(binary) = parsed else {
        panic!("expected a binary expression");
    };
    // The reduction takes the position of its first symbol.
    assert_eq!((binary.pos.line, binary.pos.col), (1, 3));
    assert_eq!((binary.left.pos().line, binary.left.pos().col), (1, 3));
    assert_eq!((binary.right.pos().line, binary.right.pos().col), (1, 7));
}

#[test]
fn test_function_type_position_is_the_arrow() {
    let parsed = parser().parse_type("int -> int").unwrap();
    assert_eq!((parsed.pos.line, parsed.pos.col), (1, 5));
}

#[test]
fn test_program_with_everything() {
    let source = r#"
type tree = Leaf | Node of int tree tree

let rec depth t =
    match t with
        Leaf -> 0
      | Node x l r -> if depth l < depth r then 1 + depth r else 1 + depth l
    end

let main =
    let mutable root : tree in
    root := Node 1 Leaf Leaf;
    for i = 1 to 10 do
        print_int (depth !root)
    done
"#;
    let logger = shared(Logger::mock());
    let program = parser_with(logger.clone()).parse(source);
    assert!(logger.borrow().success(), "expected a clean parse");
    assert_eq!(program.defs.len(), 3);
}
