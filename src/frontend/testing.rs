//! Syntax tree builders for unit tests

use crate::frontend::ast::*;
use crate::types::Type;
use crate::utils::Location;

pub fn loc(line: usize) -> Location {
    Location::line(line, 1, 10)
}

pub fn ident(name: &str) -> Ident {
    Ident::new(name, loc(1))
}

pub fn ty(name: &str) -> Type {
    Type::unresolved(name)
}

pub fn ty_of(name: &str, args: Vec<Type>) -> Type {
    Type::unresolved_with(name, args, Location::dummy())
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, loc(1))
}

pub fn num(text: &str) -> Expr {
    expr(ExprKind::Number(text.to_string()))
}

pub fn string(text: &str) -> Expr {
    expr(ExprKind::String(text.to_string()))
}

pub fn nil() -> Expr {
    expr(ExprKind::Nil)
}

pub fn var(name: &str) -> Expr {
    expr(ExprKind::Variable(ident(name)))
}

pub fn list(elements: Vec<Expr>) -> Expr {
    expr(ExprKind::List(elements))
}

pub fn tuple(elements: Vec<Expr>) -> Expr {
    expr(ExprKind::Tuple(elements))
}

pub fn object(constructor: Type, members: Vec<(&str, Expr)>) -> Expr {
    expr(ExprKind::Object {
        constructor,
        members: members
            .into_iter()
            .map(|(member, value)| KeyValue { member: ident(member), value })
            .collect(),
    })
}

pub fn access(subject: Expr, key: &str) -> Expr {
    expr(ExprKind::ObjectAccess { subject: Box::new(subject), key: ident(key) })
}

pub fn enum_case(enum_name: Option<&str>, case: &str) -> Expr {
    expr(ExprKind::EnumCase { enum_name: enum_name.map(ident), case: ident(case) })
}

pub fn function_call(affix: Affix, signature: &[&str], args: Vec<Expr>) -> FunctionCall {
    FunctionCall {
        signature: signature.iter().map(|s| ident(s)).collect(),
        affix,
        args,
        resolved: None,
    }
}

pub fn call(affix: Affix, signature: &[&str], args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call(function_call(affix, signature, args)))
}

pub fn infix(left: Expr, op: &str, right: Expr) -> Expr {
    call(Affix::Infix, &[op], vec![left, right])
}

pub fn call_stmt(affix: Affix, signature: &[&str], args: Vec<Expr>) -> Stmt {
    Stmt::Call { call: function_call(affix, signature, args), location: loc(1) }
}

fn assignment(name: &str, declared_type: Option<Type>, mutable: bool, is_declaration: bool, value: Expr) -> Stmt {
    Stmt::Assignment(Assignment {
        variable: VariableDecl { name: ident(name), declared_type, mutable, resolved_type: None },
        is_declaration,
        value,
        location: loc(1),
    })
}

pub fn let_(name: &str, value: Expr) -> Stmt {
    assignment(name, None, false, true, value)
}

pub fn let_mut(name: &str, value: Expr) -> Stmt {
    assignment(name, None, true, true, value)
}

pub fn let_typed(name: &str, declared: Type, value: Expr) -> Stmt {
    assignment(name, Some(declared), false, true, value)
}

pub fn assign(name: &str, value: Expr) -> Stmt {
    assignment(name, None, false, false, value)
}

pub fn ret(value: Option<Expr>) -> Stmt {
    Stmt::Return { value, location: loc(1) }
}

pub fn for_loop(iterator: &str, iterable: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::For(ForLoop {
        iterator: VariableDecl { name: ident(iterator), declared_type: None, mutable: false, resolved_type: None },
        iterable,
        body,
        location: loc(1),
    })
}

pub fn branch(test: Expr, body: Vec<Stmt>, else_body: Option<Vec<Stmt>>) -> Stmt {
    Stmt::Branch(Branch {
        guard: vec![GuardTerm { junction: None, test }],
        body,
        else_branch: else_body.map(|body| Box::new(Branch { guard: vec![], body, else_branch: None, location: loc(1) })),
        location: loc(1),
    })
}

pub fn while_loop(test: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::While(WhileLoop { guard: vec![GuardTerm { junction: None, test }], body, location: loc(1) })
}

pub fn host_code(code: &str) -> Stmt {
    Stmt::HostCode { code: code.to_string(), location: loc(1) }
}

pub fn example(body: Vec<Stmt>) -> Declaration {
    Declaration::Example(ExampleDecl { body, origin: "test.pine".to_string(), location: loc(1) })
}

pub fn function(affix: Affix, signature: &[&str], params: Vec<(&str, Type)>, return_type: Type, body: Vec<Stmt>) -> Declaration {
    Declaration::Function(FunctionDecl {
        signature: signature.iter().map(|s| ident(s)).collect(),
        affix,
        return_type,
        params: params
            .into_iter()
            .map(|(name, ty)| Param { name: ident(name), ty, mutable: false })
            .collect(),
        body,
        generics: vec![],
        origin: "test.pine".to_string(),
        location: loc(1),
    })
}

/// `def .main` with the given body
pub fn main(body: Vec<Stmt>) -> Declaration {
    function(Affix::Nofix, &["main"], vec![], Type::void(), body)
}

pub fn structure(name: &str, generics: &[&str], members: Vec<(&str, Type)>) -> Declaration {
    Declaration::Struct(StructDecl {
        name: ident(name),
        members: members.into_iter().map(|(name, ty)| Member { name: ident(name), ty }).collect(),
        generics: generics.iter().map(|g| ident(g)).collect(),
        origin: "test.pine".to_string(),
        location: loc(1),
    })
}

pub fn enumeration(name: &str, cases: &[&str]) -> Declaration {
    Declaration::Enum(EnumDecl {
        name: ident(name),
        cases: cases.iter().map(|c| ident(c)).collect(),
        origin: "test.pine".to_string(),
        location: loc(1),
    })
}

pub fn group(name: &str) -> Declaration {
    Declaration::Group(GroupDecl { name: ident(name), origin: "test.pine".to_string(), location: loc(1) })
}

pub fn binding(child: &str, parent: &str) -> Declaration {
    Declaration::GroupBinding(GroupBinding {
        child: ty(child),
        parent: ty(parent),
        origin: "test.pine".to_string(),
        location: loc(1),
    })
}

/// Arithmetic and printing every walker test can call
pub fn prelude() -> Vec<Declaration> {
    vec![
        function(Affix::Infix, &["+"], vec![("x", ty("Number")), ("y", ty("Number"))], ty("Number"), vec![]),
        function(Affix::Infix, &["+"], vec![("x", ty("Integer")), ("y", ty("Integer"))], ty("Integer"), vec![]),
        function(Affix::Infix, &[">"], vec![("x", ty("Number")), ("y", ty("Number"))], ty("Boolean"), vec![]),
        function(Affix::Suffix, &["show"], vec![("this", ty("Any"))], Type::void(), vec![]),
    ]
}
