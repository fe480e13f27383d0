use oat_error::Span;
use oat_parser::{
    parse, parse_expression, parse_type, BinOp, ClearSpans, Dialect, Expr, ExprKind, FieldInit, RetTy, Type, UnOp,
};
use proptest::prelude::*;

const KEYWORDS: &[&str] = &[
    "global", "struct", "var", "return", "if", "else", "for", "while", "new", "length", "int",
    "bool", "string", "void", "true", "false", "null",
];

fn arb_ident() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,6}".prop_filter("keyword", |s| !KEYWORDS.contains(&s.as_str()))
}

fn arb_struct_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{0,5}"
}

/// Raw string literal contents, escapes kept verbatim
fn arb_string() -> impl Strategy<Value = String> {
    r#"([a-z ]|\\[nt"\\]){0,6}"#
}

fn arb_type() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        Just(Type::Int),
        Just(Type::Bool),
        Just(Type::Str),
        arb_struct_name().prop_map(Type::Struct),
    ];
    leaf.prop_recursive(4, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(Type::array),
            inner
                .clone()
                .prop_filter("reference types only", Type::is_reference)
                .prop_map(Type::nullable),
            (prop::collection::vec(inner.clone(), 0..3), inner.clone())
                .prop_map(|(params, ret)| Type::function(params, RetTy::Value(ret))),
            prop::collection::vec(inner, 0..3).prop_map(|params| Type::function(params, RetTy::Void)),
        ]
    })
}

fn arb_binop() -> impl Strategy<Value = BinOp> {
    prop::sample::select(vec![
        BinOp::Mul,
        BinOp::Add,
        BinOp::Sub,
        BinOp::Shl,
        BinOp::Shr,
        BinOp::Sar,
        BinOp::Lt,
        BinOp::Le,
        BinOp::Gt,
        BinOp::Ge,
        BinOp::Eq,
        BinOp::Neq,
        BinOp::And,
        BinOp::Or,
        BinOp::IAnd,
        BinOp::IOr,
    ])
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::default())
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        arb_ident().prop_map(|name| expr(ExprKind::Id(name))),
        any::<i64>().prop_map(|value| expr(ExprKind::Int(value))),
        any::<bool>().prop_map(|value| expr(ExprKind::Bool(value))),
        arb_string().prop_map(|raw| expr(ExprKind::Str(raw))),
        arb_type()
            .prop_filter("reference types only", Type::is_reference)
            .prop_map(|ty| expr(ExprKind::Null(ty))),
    ];
    leaf.prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            (arb_binop(), inner.clone(), inner.clone()).prop_map(|(op, lhs, rhs)| {
                expr(ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                })
            }),
            (
                prop::sample::select(vec![UnOp::Neg, UnOp::Not, UnOp::BitNot]),
                inner.clone()
            )
                .prop_map(|(op, operand)| expr(ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                })),
            (inner.clone(), prop::collection::vec(inner.clone(), 0..3)).prop_map(|(callee, args)| {
                expr(ExprKind::Call {
                    callee: Box::new(callee),
                    args,
                })
            }),
            (inner.clone(), inner.clone()).prop_map(|(base, index)| expr(ExprKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            })),
            (inner.clone(), arb_ident()).prop_map(|(base, name)| expr(ExprKind::Field {
                base: Box::new(base),
                name,
            })),
            inner.clone().prop_map(|e| expr(ExprKind::Length(Box::new(e)))),
            (arb_struct_name(), prop::collection::btree_map(arb_ident(), inner.clone(), 0..3)).prop_map(
                |(name, fields)| {
                    let fields = fields
                        .into_iter()
                        .map(|(name, value)| FieldInit {
                            name,
                            value,
                            span: Span::default(),
                        })
                        .collect();
                    expr(ExprKind::StructLit { name, fields })
                }
            ),
            (arb_type(), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(ty, elems)| expr(ExprKind::ArrayLit { ty, elems })),
            (arb_type(), inner.clone()).prop_map(|(ty, size)| expr(ExprKind::ArrayNew {
                ty,
                size: Box::new(size),
            })),
            (arb_type(), inner.clone(), arb_ident(), inner).prop_map(|(ty, size, var, init)| {
                expr(ExprKind::ArrayGen {
                    ty,
                    size: Box::new(size),
                    var,
                    init: Box::new(init),
                })
            }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn printed_type_parses_back(ty in arb_type()) {
        let printed = ty.to_string();
        let parsed = parse_type(&printed, Dialect::V2);
        prop_assert_eq!(parsed, Ok(ty), "printed as {}", printed);
    }

    #[test]
    fn printed_expression_parses_back(e in arb_expr()) {
        let printed = e.to_string();
        let mut parsed = match parse_expression(&printed, Dialect::V2) {
            Ok(parsed) => parsed,
            Err(d) => return Err(TestCaseError::fail(format!("{printed}: {d}"))),
        };
        parsed.clear_spans();
        prop_assert_eq!(parsed, e, "printed as {}", printed);
    }

    #[test]
    fn parser_terminates_on_arbitrary_input(source in "[a-zA-Z0-9 ;,(){}\\[\\]=+*<>&|!~?.-]{0,64}") {
        let (_, first) = parse(&source, Dialect::V2);
        let (_, second) = parse(&source, Dialect::V2);
        prop_assert_eq!(first, second);
    }
}
