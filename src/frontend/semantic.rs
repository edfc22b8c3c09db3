//! Semantic Analysis for Pineapple
//!
//! Performs:
//! - Declaration registration (structs, enums, groups, function signatures)
//! - Type resolution of every annotation
//! - Type filling of every expression, with overload resolution of calls
//! - Assignment, nullability, member and return checks

use std::collections::{BTreeSet, HashMap};

use log::{debug, trace};

use crate::frontend::ast::*;
use crate::frontend::overload::{extract_bindings, resolve_overload, substitute, Bindings};
use crate::frontend::resolve::{implicit_generics, is_subtype_of, resolve_struct, resolve_type};
use crate::frontend::symbols::SymbolTable;
use crate::types::{type_equals, BuiltinKind, Type, TypeKind};
use crate::utils::suggest::similar_names;
use crate::utils::{Error, Location, Result};

// ==================== Variable Table ====================

/// Unique identifier for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// A variable visible in a function body
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    pub location: Location,
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    variables: HashMap<String, Variable>,
}

/// Variables of one function body, with nested scopes
#[derive(Debug)]
pub struct VariableTable {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl VariableTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope { parent: None, variables: HashMap::new() }],
            current: ScopeId(0),
        }
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope { parent: Some(self.current), variables: HashMap::new() });
        self.current = id;
        id
    }

    /// Exit the current scope
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].parent {
            self.current = parent;
        }
    }

    /// Define a variable in the current scope. Shadowing a visible name is
    /// a redeclaration.
    pub fn define(&mut self, variable: Variable) -> Result<()> {
        if self.lookup(&variable.name).is_some() {
            return Err(Error::VariableRedeclare {
                name: variable.name.clone(),
                location: variable.location,
            });
        }
        self.scopes[self.current.0].variables.insert(variable.name.clone(), variable);
        Ok(())
    }

    /// Look up a variable, searching from current scope upward
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            if let Some(variable) = self.scopes[id.0].variables.get(name) {
                return Some(variable);
            }
            scope_id = self.scopes[id.0].parent;
        }
        None
    }

    /// Names of every visible variable
    pub fn visible_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            names.extend(self.scopes[id.0].variables.keys().map(String::as_str));
            scope_id = self.scopes[id.0].parent;
        }
        names
    }
}

impl Default for VariableTable {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Semantic Analyzer ====================

/// Semantic analyzer for one file. The tables it fills outlive it.
pub struct SemanticAnalyzer<'a> {
    symbols: &'a mut SymbolTable,
    variables: VariableTable,
    /// Generic names of the declaration being walked
    generics: Vec<String>,
    /// Types returned by the body being walked
    returns: Vec<(Type, Location)>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(symbols: &'a mut SymbolTable) -> Self {
        Self {
            symbols,
            variables: VariableTable::new(),
            generics: Vec::new(),
            returns: Vec::new(),
        }
    }

    /// Analyze the declarations of one file, annotating them in place
    pub fn analyze(&mut self, declarations: &mut [Declaration]) -> Result<()> {
        // Pass 1: Register names, then resolve what refers to them
        for decl in declarations.iter() {
            self.register_name(decl)?;
        }
        for decl in declarations.iter_mut() {
            if let Declaration::GroupBinding(binding) = decl {
                self.bind_group(binding)?;
            }
        }
        for decl in declarations.iter_mut() {
            if let Declaration::Struct(s) = decl {
                resolve_struct(self.symbols, s)?;
                self.symbols.update_struct(s);
            }
        }
        for decl in declarations.iter_mut() {
            if let Declaration::Function(func) = decl {
                self.collect_function(func)?;
            }
        }

        // Pass 2: Walk every body
        for decl in declarations.iter_mut() {
            match decl {
                Declaration::Function(func) => self.check_function(func)?,
                Declaration::Example(example) => self.check_example(example)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn register_name(&mut self, decl: &Declaration) -> Result<()> {
        match decl {
            Declaration::Struct(s) => self.symbols.register_struct(s),
            Declaration::Enum(e) => self.symbols.register_enum(e),
            Declaration::Group(g) => self.symbols.register_group(g),
            _ => Ok(()),
        }
    }

    fn bind_group(&mut self, binding: &mut GroupBinding) -> Result<()> {
        binding.child = resolve_type(self.symbols, &binding.child, &[])?;
        binding.parent = resolve_type(self.symbols, &binding.parent, &[])?;
        if !matches!(binding.parent.kind, TypeKind::Group { .. }) {
            return Err(Error::BindingToNonGroup {
                child: binding.child.clone(),
                parent: binding.parent.clone(),
                location: binding.location,
            });
        }
        if !self.symbols.bind_group(&binding.child, &binding.parent) {
            return Err(Error::Internal(format!("group {} is resolved but missing from the lattice", binding.parent)));
        }
        Ok(())
    }

    /// Resolve a function signature and add it to the function table
    fn collect_function(&mut self, func: &mut FunctionDecl) -> Result<()> {
        let mut generics = func.generic_names();
        for param in &func.params {
            let mut implicit = Vec::new();
            implicit_generics(self.symbols, &param.ty, &mut implicit);
            for name in implicit {
                if !generics.contains(&name) {
                    func.generics.push(GenericParam {
                        name: Ident::new(name.clone(), param.name.location),
                        constraint: None,
                    });
                    generics.push(name);
                }
            }
        }

        for generic in &mut func.generics {
            if let Some(constraint) = &generic.constraint {
                generic.constraint = Some(resolve_type(self.symbols, constraint, &[])?);
            }
        }
        for param in &mut func.params {
            param.ty = resolve_type(self.symbols, &param.ty, &generics)?;
        }
        func.return_type = resolve_type(self.symbols, &func.return_type, &generics)?;

        // A placeholder no parameter mentions could never be bound by a call
        for name in func.return_type.generic_names() {
            if !func.params.iter().any(|p| p.ty.generic_names().contains(&name)) {
                let location = if func.return_type.location().is_dummy() { func.location } else { func.return_type.location() };
                return Err(Error::UsingUndefinedGenericName {
                    name: name.to_string(),
                    suggestions: Vec::new(),
                    location,
                });
            }
        }

        debug!("collect function {}", func.key());
        self.symbols.functions.insert(func.clone());
        Ok(())
    }

    /// Type check a function
    fn check_function(&mut self, func: &mut FunctionDecl) -> Result<()> {
        trace!("check function {}", func.key());
        self.variables = VariableTable::new();
        self.generics = func.generic_names();
        self.returns.clear();

        for param in &func.params {
            self.variables.define(Variable {
                name: param.name.name.clone(),
                ty: param.ty.clone(),
                mutable: param.mutable,
                location: param.name.location,
            })?;
        }

        self.check_block(&mut func.body)?;

        for (actual, location) in std::mem::take(&mut self.returns) {
            let nil_into_nullable = actual.is_nil() && func.return_type.nullable;
            if !type_equals(&actual, &func.return_type) && !nil_into_nullable {
                return Err(Error::UnmatchingReturnType {
                    expected: func.return_type.clone(),
                    actual,
                    location,
                });
            }
        }
        Ok(())
    }

    fn check_example(&mut self, example: &mut ExampleDecl) -> Result<()> {
        self.variables = VariableTable::new();
        self.generics.clear();
        self.check_block(&mut example.body)?;
        self.returns.clear();
        Ok(())
    }

    fn check_block(&mut self, stmts: &mut [Stmt]) -> Result<()> {
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    /// Check a body in a nested scope
    fn check_nested(&mut self, stmts: &mut [Stmt]) -> Result<()> {
        self.variables.enter_scope();
        self.check_block(stmts)?;
        self.variables.exit_scope();
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match stmt {
            Stmt::Assignment(assignment) => self.check_assignment(assignment),
            Stmt::Return { value, location } => {
                let ty = match value {
                    Some(expr) => self.check_expr(expr)?,
                    None => Type::void(),
                };
                self.returns.push((ty, *location));
                Ok(())
            }
            Stmt::Call { call, location } => {
                let ty = self.check_call(call, *location)?;
                if !ty.is_void() {
                    return Err(Error::NonVoidExprNotAssignedToVariable { ty, location: *location });
                }
                Ok(())
            }
            Stmt::Branch(branch) => self.check_branch(branch),
            Stmt::For(for_loop) => {
                let iterable = self.check_expr(&mut for_loop.iterable)?;
                let element = match &iterable.kind {
                    TypeKind::Builtin { kind: BuiltinKind::List, args } => {
                        args.first().cloned().unwrap_or_else(Type::any)
                    }
                    _ => {
                        return Err(Error::ForExprNotArray {
                            actual: iterable.clone(),
                            location: for_loop.iterable.location,
                        })
                    }
                };
                for_loop.iterator.resolved_type = Some(element.clone());

                self.variables.enter_scope();
                self.variables.define(Variable {
                    name: for_loop.iterator.name.name.clone(),
                    ty: element,
                    mutable: false,
                    location: for_loop.iterator.name.location,
                })?;
                self.check_block(&mut for_loop.body)?;
                self.variables.exit_scope();
                Ok(())
            }
            Stmt::While(while_loop) => {
                self.check_guard(&mut while_loop.guard)?;
                self.check_nested(&mut while_loop.body)
            }
            Stmt::Pass { .. } | Stmt::HostCode { .. } => Ok(()),
        }
    }

    fn check_assignment(&mut self, assignment: &mut Assignment) -> Result<()> {
        let value = self.check_expr(&mut assignment.value)?;
        let value_location = assignment.value.location;
        let variable = &mut assignment.variable;
        let name = variable.name.name.clone();

        if assignment.is_declaration {
            if value.is_void() {
                return Err(Error::AssigningVoidToVariable { name, location: value_location });
            }
            let ty = match variable.declared_type.clone() {
                Some(declared) => {
                    let declared = self.resolve(&declared)?;
                    self.check_assignable(&name, &declared, &value, value_location)?;
                    variable.declared_type = Some(declared.clone());
                    declared
                }
                None => value,
            };
            variable.resolved_type = Some(ty.clone());
            self.variables.define(Variable {
                name,
                ty,
                mutable: variable.mutable,
                location: variable.name.location,
            })
        } else {
            let existing = self.variables.lookup(&name).cloned().ok_or_else(|| {
                Error::AssigningToUndefinedVariable { name: name.clone(), location: variable.name.location }
            })?;
            if !existing.mutable {
                return Err(Error::AssigningToImmutableVariable { name, location: variable.name.location });
            }
            if value.is_void() {
                return Err(Error::AssigningVoidToVariable { name, location: value_location });
            }
            self.check_assignable(&name, &existing.ty, &value, value_location)?;
            variable.resolved_type = Some(existing.ty);
            Ok(())
        }
    }

    /// Nil goes only into nullable variables; anything else must subtype
    fn check_assignable(&self, name: &str, expected: &Type, actual: &Type, location: Location) -> Result<()> {
        if actual.is_nil() && !expected.is_nil() {
            if !expected.nullable {
                return Err(Error::AssigningNullToUnnullableVariable {
                    name: name.to_string(),
                    expected: expected.clone(),
                    location,
                });
            }
            return Ok(());
        }
        if !is_subtype_of(&self.symbols.lattice, actual, expected) {
            return Err(Error::IncorrectTypeGivenForVariable {
                name: name.to_string(),
                expected: expected.clone(),
                actual: actual.clone(),
                location,
            });
        }
        Ok(())
    }

    fn check_branch(&mut self, branch: &mut Branch) -> Result<()> {
        self.check_guard(&mut branch.guard)?;
        self.check_nested(&mut branch.body)?;
        if let Some(else_branch) = &mut branch.else_branch {
            self.check_branch(else_branch)?;
        }
        Ok(())
    }

    fn check_guard(&mut self, guard: &mut [GuardTerm]) -> Result<()> {
        for term in guard {
            self.check_expr(&mut term.test)?;
        }
        Ok(())
    }

    // ==================== Expressions ====================

    /// Resolve the type of an expression and record it on the node
    pub fn check_expr(&mut self, expr: &mut Expr) -> Result<Type> {
        let location = expr.location;
        let ty = match &mut expr.kind {
            ExprKind::Number(text) => number_type(text),
            ExprKind::String(_) => Type::builtin(BuiltinKind::String),
            ExprKind::Boolean(_) => Type::boolean(),
            ExprKind::Nil => Type::nil(),
            ExprKind::Variable(ident) => match self.variables.lookup(&ident.name) {
                Some(variable) => variable.ty.clone(),
                None => {
                    return Err(Error::UsingUndefinedVariable {
                        name: ident.name.clone(),
                        suggestions: similar_names(&ident.name, self.variables.visible_names()),
                        location: ident.location,
                    })
                }
            },
            ExprKind::Call(call) => self.check_call(call, location)?,
            ExprKind::List(elements) => self.check_list(elements)?,
            ExprKind::Tuple(elements) => {
                let mut types = Vec::with_capacity(elements.len());
                for element in elements.iter_mut() {
                    types.push(self.check_expr(element)?);
                }
                Type::tuple(types)
            }
            ExprKind::Object { constructor, members } => self.check_object(constructor, members, location)?,
            ExprKind::ObjectAccess { subject, key } => self.check_access(subject, key)?,
            ExprKind::EnumCase { enum_name, case } => self.check_enum_case(enum_name.as_ref(), case)?,
        };
        expr.ty = Some(ty.clone());
        Ok(ty)
    }

    /// Arguments first, then overload resolution
    fn check_call(&mut self, call: &mut FunctionCall, location: Location) -> Result<Type> {
        let mut actuals = Vec::with_capacity(call.args.len());
        for arg in call.args.iter_mut() {
            actuals.push(self.check_expr(arg)?);
        }
        let location = if location.is_dummy() { call.location() } else { location };
        let decl = resolve_overload(self.symbols, &call.key(), &call.display_signature(), &actuals, location)?;
        call.resolved = Some(ResolvedCall {
            params: decl.param_types(),
            return_type: decl.return_type.clone(),
        });
        Ok(decl.return_type)
    }

    /// Every element must have the type of the first one
    fn check_list(&mut self, elements: &mut [Expr]) -> Result<Type> {
        let mut first: Option<Type> = None;
        for (index, element) in elements.iter_mut().enumerate() {
            let ty = self.check_expr(element)?;
            match &first {
                None => first = Some(ty),
                Some(expected) if !type_equals(expected, &ty) => {
                    return Err(Error::ListElementsArentHomogeneous {
                        position: index + 1,
                        expected: expected.clone(),
                        actual: ty,
                        location: element.location,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(Type::list(first.unwrap_or_else(Type::any)))
    }

    /// Struct literal
    fn check_object(&mut self, constructor: &mut Type, members: &mut [KeyValue], location: Location) -> Result<Type> {
        let struct_name = constructor.name().unwrap_or_default().to_string();
        let decl = self.symbols.find_struct(&struct_name).cloned().ok_or_else(|| {
            let location = if constructor.location().is_dummy() { location } else { constructor.location() };
            Error::UsingUndefinedStruct { name: struct_name.clone(), location }
        })?;
        let generic_names = decl.generic_names();

        let mut bindings = Bindings::new();
        let explicit_args = !constructor.args().is_empty();
        if explicit_args && constructor.args().len() != generic_names.len() {
            return Err(Error::WrongNumberOfTypeArguments {
                name: struct_name,
                expected: generic_names.len(),
                actual: constructor.args().len(),
                location: if constructor.location().is_dummy() { location } else { constructor.location() },
            });
        }
        for (name, arg) in generic_names.iter().zip(constructor.args()) {
            bindings.insert(name.clone(), self.resolve(arg)?);
        }

        let mut given = BTreeSet::new();
        for key_value in members.iter_mut() {
            let member_name = &key_value.member.name;
            let member = decl.member(member_name).ok_or_else(|| Error::ExtraMember {
                struct_name: struct_name.clone(),
                member: member_name.clone(),
                location: key_value.member.location,
            })?;
            if !given.insert(member_name.clone()) {
                return Err(Error::DuplicatedMember {
                    member: member_name.clone(),
                    location: key_value.member.location,
                });
            }

            let actual = self.check_expr(&mut key_value.value)?;
            if !explicit_args {
                // The first member to mention a placeholder binds it
                let mut found = Bindings::new();
                extract_bindings(&member.ty, &actual, &mut found);
                for (name, ty) in found {
                    bindings.entry(name).or_insert(ty);
                }
            }
            let expected = substitute(&member.ty, &bindings);
            if !is_subtype_of(&self.symbols.lattice, &actual, &expected) {
                return Err(Error::IncorrectTypeGivenForMember {
                    member: member_name.clone(),
                    expected,
                    actual,
                    location: key_value.value.location,
                });
            }
        }

        let missing: Vec<String> = decl
            .members
            .iter()
            .map(|m| m.name.name.clone())
            .filter(|name| !given.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingMember { struct_name, members: missing, location });
        }

        let mut args = Vec::with_capacity(generic_names.len());
        for name in &generic_names {
            let bound = bindings.get(name).cloned().ok_or_else(|| Error::UsingUndefinedGenericName {
                name: name.clone(),
                suggestions: Vec::new(),
                location,
            })?;
            args.push(bound);
        }
        let ty = Type::structure(struct_name, args);
        *constructor = ty.clone();
        Ok(ty)
    }

    /// `subject:key`
    fn check_access(&mut self, subject: &mut Expr, key: &Ident) -> Result<Type> {
        let subject_ty = self.check_expr(subject)?;
        let TypeKind::Struct { name, args } = &subject_ty.kind else {
            return Err(Error::AccessingMemberOfNonStruct { actual: subject_ty.clone(), location: subject.location });
        };
        let decl = self
            .symbols
            .find_struct(name)
            .ok_or_else(|| Error::Internal(format!("struct `{}` has a type but no declaration", name)))?;
        let member = decl.member(&key.name).ok_or_else(|| Error::AccessingInexistentMember {
            struct_name: name.clone(),
            member: key.name.clone(),
            suggestions: similar_names(&key.name, decl.members.iter().map(|m| m.name.name.as_str())),
            location: key.location,
        })?;
        let bindings: Bindings = decl.generic_names().into_iter().zip(args.iter().cloned()).collect();
        Ok(substitute(&member.ty, &bindings))
    }

    /// `Color.red` or a bare `red`
    fn check_enum_case(&self, enum_name: Option<&Ident>, case: &Ident) -> Result<Type> {
        let decl = match enum_name {
            Some(name) => {
                let decl = self.symbols.find_enum(&name.name).ok_or_else(|| Error::UsingUndefinedEnum {
                    name: name.name.clone(),
                    location: name.location,
                })?;
                if !decl.has_case(&case.name) {
                    return Err(Error::UsingUndefinedEnum {
                        name: format!("{}.{}", name.name, case.name),
                        location: case.location,
                    });
                }
                decl
            }
            None => self.symbols.enum_with_case(&case.name).ok_or_else(|| Error::UsingUndefinedEnum {
                name: case.name.clone(),
                location: case.location,
            })?,
        };
        Ok(Type::enumeration(decl.name.name.clone()))
    }

    fn resolve(&self, ty: &Type) -> Result<Type> {
        resolve_type(self.symbols, ty, &self.generics)
    }
}

/// `Integer` unless the literal has a fraction or an exponent
fn number_type(text: &str) -> Type {
    if text.contains(|c| matches!(c, '.' | 'e' | 'E')) {
        Type::builtin(BuiltinKind::Number)
    } else {
        Type::builtin(BuiltinKind::Integer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::testing::*;
    use pretty_assertions::assert_eq;

    fn analyze(mut declarations: Vec<Declaration>) -> Result<Vec<Declaration>> {
        let mut symbols = SymbolTable::new();
        let mut all = prelude();
        all.append(&mut declarations);
        SemanticAnalyzer::new(&mut symbols).analyze(&mut all)?;
        Ok(all)
    }

    fn analyze_main(body: Vec<Stmt>) -> Result<Vec<Declaration>> {
        analyze(vec![main(body)])
    }

    fn main_body(declarations: &[Declaration]) -> &[Stmt] {
        match declarations.last() {
            Some(Declaration::Function(func)) => &func.body,
            other => panic!("expected a function, got {:?}", other),
        }
    }

    fn variable_type(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Assignment(a) => a.variable.resolved_type.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            other => panic!("expected an assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_variable_table_scopes() {
        let mut table = VariableTable::new();
        let variable = |name: &str| Variable { name: name.to_string(), ty: Type::any(), mutable: false, location: Location::dummy() };
        table.define(variable("x")).unwrap();
        table.enter_scope();
        assert!(matches!(table.define(variable("x")), Err(Error::VariableRedeclare { .. })));
        table.define(variable("y")).unwrap();
        assert!(table.lookup("y").is_some());
        table.exit_scope();
        assert!(table.lookup("y").is_none());
        assert!(table.lookup("x").is_some());
    }

    #[test]
    fn test_literal_types() {
        let declarations = analyze_main(vec![
            let_("a", num("1")),
            let_("b", num("2.5")),
            let_("c", string("hi")),
            let_("d", tuple(vec![num("1"), string("x")])),
            let_("e", list(vec![])),
            let_("f", infix(num("1"), "+", num("2"))),
            let_("g", infix(num("1"), "+", num("2.0"))),
        ])
        .unwrap();
        let types: Vec<String> = main_body(&declarations).iter().map(variable_type).collect();
        assert_eq!(
            types,
            vec!["Integer", "Number", "String", "Tuple{Integer, String}", "List{Any}", "Integer", "Number"]
        );
    }

    #[test]
    fn test_expression_types_are_recorded() {
        let declarations = analyze_main(vec![let_("a", infix(num("1"), "+", num("2.0")))]).unwrap();
        let Stmt::Assignment(assignment) = &main_body(&declarations)[0] else { panic!() };
        let ExprKind::Call(call) = &assignment.value.kind else { panic!() };
        assert_eq!(call.args[0].ty.as_ref().map(|t| t.to_string()), Some("Integer".to_string()));
        let resolved = call.resolved.as_ref().unwrap();
        assert_eq!(resolved.return_type.to_string(), "Number");
        assert_eq!(resolved.params.len(), 2);
    }

    #[test]
    fn test_list_must_be_homogeneous() {
        match analyze_main(vec![let_("xs", list(vec![num("1"), string("a")]))]) {
            Err(Error::ListElementsArentHomogeneous { position, expected, actual, .. }) => {
                assert_eq!(position, 2);
                assert_eq!(expected.to_string(), "Integer");
                assert_eq!(actual.to_string(), "String");
            }
            other => panic!("expected ListElementsArentHomogeneous, got {:?}", other),
        }
    }

    #[test]
    fn test_reassigning_immutable_variable() {
        let result = analyze_main(vec![let_("x", num("1")), assign("x", num("2"))]);
        assert!(matches!(result, Err(Error::AssigningToImmutableVariable { name, .. }) if name == "x"));

        analyze_main(vec![let_mut("x", num("1")), assign("x", num("2"))]).unwrap();
    }

    #[test]
    fn test_reassignment_rules() {
        assert!(matches!(
            analyze_main(vec![assign("y", num("2"))]),
            Err(Error::AssigningToUndefinedVariable { .. })
        ));
        assert!(matches!(
            analyze_main(vec![let_mut("x", num("1")), assign("x", string("s"))]),
            Err(Error::IncorrectTypeGivenForVariable { .. })
        ));
        assert!(matches!(
            analyze_main(vec![let_mut("x", num("1")), assign("x", nil())]),
            Err(Error::AssigningNullToUnnullableVariable { .. })
        ));
    }

    #[test]
    fn test_declared_type_rules() {
        let declarations = analyze_main(vec![let_typed("n", ty("Number"), num("1"))]).unwrap();
        assert_eq!(variable_type(&main_body(&declarations)[0]), "Number");

        assert!(matches!(
            analyze_main(vec![let_typed("n", ty("Integer"), num("1.5"))]),
            Err(Error::IncorrectTypeGivenForVariable { .. })
        ));
        assert!(matches!(
            analyze_main(vec![let_typed("s", ty("String"), nil())]),
            Err(Error::AssigningNullToUnnullableVariable { .. })
        ));
        analyze_main(vec![let_typed("s", ty("String").with_nullable(true), nil())]).unwrap();
        analyze_main(vec![let_typed("a", ty("Any"), string("s"))]).unwrap();
    }

    #[test]
    fn test_void_cannot_be_assigned() {
        let show = call(Affix::Suffix, &["show"], vec![num("1")]);
        assert!(matches!(analyze_main(vec![let_("x", show)]), Err(Error::AssigningVoidToVariable { .. })));
    }

    #[test]
    fn test_redeclaring_variable() {
        let result = analyze_main(vec![let_("x", num("1")), let_("x", num("2"))]);
        assert!(matches!(result, Err(Error::VariableRedeclare { .. })));
    }

    #[test]
    fn test_undefined_variable_suggests_names() {
        match analyze_main(vec![let_("count", num("1")), let_("y", var("cuont"))]) {
            Err(Error::UsingUndefinedVariable { name, suggestions, .. }) => {
                assert_eq!(name, "cuont");
                assert_eq!(suggestions, vec!["count".to_string()]);
            }
            other => panic!("expected UsingUndefinedVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_call_statement_must_be_void() {
        analyze_main(vec![call_stmt(Affix::Suffix, &["show"], vec![num("1")])]).unwrap();
        let result = analyze_main(vec![call_stmt(Affix::Infix, &["+"], vec![num("1"), num("2")])]);
        assert!(matches!(result, Err(Error::NonVoidExprNotAssignedToVariable { .. })));
    }

    #[test]
    fn test_unknown_function() {
        let result = analyze_main(vec![call_stmt(Affix::Suffix, &["fly"], vec![num("1")])]);
        assert!(matches!(result, Err(Error::UsingUnknownFunction { signature, .. }) if signature == "_.fly"));
    }

    #[test]
    fn test_return_types() {
        let ok = function(Affix::Suffix, &["double"], vec![("x", ty("Integer"))], ty("Integer"), vec![ret(Some(infix(var("x"), "+", var("x"))))]);
        analyze(vec![ok]).unwrap();

        let bad = function(Affix::Suffix, &["half"], vec![("x", ty("Integer"))], ty("Integer"), vec![ret(Some(string("no")))]);
        match analyze(vec![bad]) {
            Err(Error::UnmatchingReturnType { expected, actual, .. }) => {
                assert_eq!(expected.to_string(), "Integer");
                assert_eq!(actual.to_string(), "String");
            }
            other => panic!("expected UnmatchingReturnType, got {:?}", other),
        }

        let nullable = function(Affix::Suffix, &["find"], vec![("x", ty("Integer"))], ty("String").with_nullable(true), vec![ret(Some(nil()))]);
        analyze(vec![nullable]).unwrap();

        let bare = function(Affix::Suffix, &["stop"], vec![("x", ty("Integer"))], ty("Integer"), vec![ret(None)]);
        assert!(matches!(analyze(vec![bare]), Err(Error::UnmatchingReturnType { .. })));
    }

    #[test]
    fn test_for_loop() {
        let body = vec![call_stmt(Affix::Suffix, &["show"], vec![var("x")])];
        let declarations = analyze_main(vec![for_loop("x", list(vec![num("1"), num("2")]), body)]).unwrap();
        let Stmt::For(looped) = &main_body(&declarations)[0] else { panic!() };
        assert_eq!(looped.iterator.resolved_type.as_ref().map(|t| t.to_string()), Some("Integer".to_string()));

        assert!(matches!(
            analyze_main(vec![for_loop("x", string("abc"), vec![])]),
            Err(Error::ForExprNotArray { .. })
        ));
    }

    #[test]
    fn test_loop_variable_does_not_escape() {
        let result = analyze_main(vec![
            for_loop("x", list(vec![num("1")]), vec![]),
            call_stmt(Affix::Suffix, &["show"], vec![var("x")]),
        ]);
        assert!(matches!(result, Err(Error::UsingUndefinedVariable { .. })));
    }

    #[test]
    fn test_branch_bindings_do_not_escape() {
        let guard = infix(num("1"), ">", num("0"));
        let result = analyze_main(vec![
            branch(guard, vec![let_("inner", num("1"))], Some(vec![let_("inner", num("2"))])),
            call_stmt(Affix::Suffix, &["show"], vec![var("inner")]),
        ]);
        assert!(matches!(result, Err(Error::UsingUndefinedVariable { .. })));
    }

    fn people() -> Declaration {
        structure("People", &[], vec![("name", ty("String")), ("age", ty("Integer"))])
    }

    #[test]
    fn test_struct_literal_completeness() {
        let wong = |members| analyze(vec![people(), main(vec![let_("p", object(ty("People"), members))])]);

        let declarations = wong(vec![("name", string("Wong")), ("age", num("99"))]).unwrap();
        assert_eq!(variable_type(&main_body(&declarations)[0]), "People");

        match wong(vec![("name", string("Wong"))]) {
            Err(Error::MissingMember { members, .. }) => assert_eq!(members, vec!["age".to_string()]),
            other => panic!("expected MissingMember, got {:?}", other),
        }
        match wong(vec![("name", string("Wong")), ("age", num("1")), ("height", num("2"))]) {
            Err(Error::ExtraMember { member, .. }) => assert_eq!(member, "height"),
            other => panic!("expected ExtraMember, got {:?}", other),
        }
        match wong(vec![("name", string("Wong")), ("name", string("Lee")), ("age", num("1"))]) {
            Err(Error::DuplicatedMember { member, .. }) => assert_eq!(member, "name"),
            other => panic!("expected DuplicatedMember, got {:?}", other),
        }
        assert!(matches!(
            wong(vec![("name", num("1")), ("age", num("1"))]),
            Err(Error::IncorrectTypeGivenForMember { .. })
        ));
    }

    #[test]
    fn test_undefined_struct() {
        let result = analyze_main(vec![let_("p", object(ty("Ghost"), vec![]))]);
        assert!(matches!(result, Err(Error::UsingUndefinedStruct { name, .. }) if name == "Ghost"));
    }

    #[test]
    fn test_member_access() {
        let p = object(ty("People"), vec![("name", string("Wong")), ("age", num("99"))]);
        let declarations = analyze(vec![people(), main(vec![let_("p", p.clone()), let_("n", access(var("p"), "name"))])]).unwrap();
        assert_eq!(variable_type(&main_body(&declarations)[1]), "String");

        match analyze(vec![people(), main(vec![let_("p", p), let_("n", access(var("p"), "nmae"))])]) {
            Err(Error::AccessingInexistentMember { member, suggestions, .. }) => {
                assert_eq!(member, "nmae");
                assert_eq!(suggestions, vec!["name".to_string()]);
            }
            other => panic!("expected AccessingInexistentMember, got {:?}", other),
        }

        assert!(matches!(
            analyze_main(vec![let_("n", access(num("1"), "name"))]),
            Err(Error::AccessingMemberOfNonStruct { .. })
        ));
    }

    #[test]
    fn test_generic_struct_binds_from_members() {
        let boxed = structure("Box", &["T"], vec![("item", ty("T"))]);
        let declarations = analyze(vec![
            boxed,
            main(vec![
                let_("b", object(ty("Box"), vec![("item", num("1"))])),
                let_("i", access(var("b"), "item")),
            ]),
        ])
        .unwrap();
        let body = main_body(&declarations);
        assert_eq!(variable_type(&body[0]), "Box{Integer}");
        assert_eq!(variable_type(&body[1]), "Integer");
    }

    #[test]
    fn test_generic_struct_with_explicit_arguments() {
        let boxed = structure("Box", &["T"], vec![("item", ty("T"))]);
        let result = analyze(vec![
            boxed,
            main(vec![let_("b", object(ty_of("Box", vec![ty("String")]), vec![("item", num("1"))]))]),
        ]);
        assert!(matches!(result, Err(Error::IncorrectTypeGivenForMember { .. })));
    }

    #[test]
    fn test_struct_member_with_undeclared_generic() {
        let broken = structure("Box", &[], vec![("item", ty("T"))]);
        assert!(matches!(analyze(vec![broken]), Err(Error::UsingUndefinedGenericName { .. })));
    }

    #[test]
    fn test_forward_references_within_a_file() {
        let declarations = analyze(vec![
            main(vec![let_("p", call(Affix::Nofix, &["make"], vec![]))]),
            function(Affix::Nofix, &["make"], vec![], ty("People"), vec![]),
            people(),
        ]);
        let declarations = declarations.unwrap();
        let Some(Declaration::Function(entry)) = declarations.iter().find(|d| matches!(d, Declaration::Function(f) if f.key().signature == "main")) else {
            panic!("main is missing")
        };
        assert_eq!(variable_type(&entry.body[0]), "People");
    }

    #[test]
    fn test_enum_cases() {
        let color = enumeration("Color", &["red", "green"]);
        let declarations = analyze(vec![
            color.clone(),
            main(vec![let_("c", enum_case(Some("Color"), "red")), let_("d", enum_case(None, "green")), let_("t", enum_case(None, "true"))]),
        ])
        .unwrap();
        let types: Vec<String> = main_body(&declarations).iter().map(variable_type).collect();
        assert_eq!(types, vec!["Color", "Color", "Boolean"]);

        assert!(matches!(
            analyze(vec![color.clone(), main(vec![let_("c", enum_case(Some("Color"), "blue"))])]),
            Err(Error::UsingUndefinedEnum { .. })
        ));
        assert!(matches!(
            analyze(vec![main(vec![let_("c", enum_case(Some("Shade"), "red"))])]),
            Err(Error::UsingUndefinedEnum { .. })
        ));
    }

    #[test]
    fn test_group_dispatch() {
        let mut to_js = function(Affix::Suffix, &["toJS"], vec![("this", ty("T"))], ty("String"), vec![]);
        if let Declaration::Function(f) = &mut to_js {
            f.generics = vec![GenericParam { name: ident("T"), constraint: Some(ty("SyntaxNode")) }];
        }
        let mut symbols = SymbolTable::new();
        let mut declarations = vec![
            group("SyntaxNode"),
            structure("Leaf", &[], vec![("text", ty("String"))]),
            binding("Leaf", "SyntaxNode"),
            to_js,
            main(vec![
                let_("leaf", object(ty("Leaf"), vec![("text", string("x"))])),
                let_("js", call(Affix::Suffix, &["toJS"], vec![var("leaf")])),
            ]),
        ];
        SemanticAnalyzer::new(&mut symbols).analyze(&mut declarations).unwrap();

        assert_eq!(variable_type(&main_body(&declarations)[1]), "String");
        let bound: Vec<String> = symbols
            .functions
            .bound_to("SyntaxNode")
            .iter()
            .map(|f| f.key().signature)
            .collect();
        assert_eq!(bound, vec!["toJS"]);
        // The Leaf specialisation was registered next to the generic overload
        assert_eq!(symbols.functions.bound_to("Leaf").len(), 1);
    }

    #[test]
    fn test_implicit_generics_in_parameters() {
        let first = function(
            Affix::Suffix,
            &["first"],
            vec![("this", ty_of("List", vec![ty("T")]))],
            ty("T"),
            vec![],
        );
        let declarations = analyze(vec![
            first,
            main(vec![let_("x", call(Affix::Suffix, &["first"], vec![list(vec![string("a")])]))]),
        ])
        .unwrap();
        assert_eq!(variable_type(&main_body(&declarations)[0]), "String");
    }

    #[test]
    fn test_while_body_is_scoped_and_guard_typed() {
        let declarations = analyze_main(vec![
            let_mut("n", num("3")),
            while_loop(infix(var("n"), ">", num("0")), vec![let_("step", num("1"))]),
        ])
        .unwrap();
        let Stmt::While(looped) = &main_body(&declarations)[1] else { panic!() };
        assert_eq!(looped.guard[0].test.ty.as_ref().map(|t| t.to_string()), Some("Boolean".to_string()));

        let result = analyze_main(vec![
            while_loop(infix(num("1"), ">", num("0")), vec![let_("step", num("1"))]),
            call_stmt(Affix::Suffix, &["show"], vec![var("step")]),
        ]);
        assert!(matches!(result, Err(Error::UsingUndefinedVariable { name, .. }) if name == "step"));
    }

    #[test]
    fn test_example_blocks_are_checked() {
        let declarations = analyze(vec![example(vec![
            let_("x", infix(num("1"), "+", num("2"))),
            call_stmt(Affix::Suffix, &["show"], vec![var("x")]),
        ])])
        .unwrap();
        let Some(Declaration::Example(block)) = declarations.last() else { panic!() };
        assert_eq!(variable_type(&block.body[0]), "Integer");

        let result = analyze(vec![example(vec![assign("x", num("1"))])]);
        assert!(matches!(result, Err(Error::AssigningToUndefinedVariable { .. })));
    }

    #[test]
    fn test_host_code_is_not_checked() {
        let native = function(
            Affix::Suffix,
            &["twice"],
            vec![("x", ty("Integer"))],
            ty("Integer"),
            vec![host_code("return x * 2"), Stmt::Pass { location: loc(2) }],
        );
        analyze(vec![native]).unwrap();
    }

    #[test]
    fn test_void_cannot_be_reassigned() {
        let result = analyze_main(vec![
            let_mut("x", num("1")),
            assign("x", call(Affix::Suffix, &["show"], vec![num("1")])),
        ]);
        assert!(matches!(result, Err(Error::AssigningVoidToVariable { name, .. }) if name == "x"));
    }

    fn cat_in_animal(parent: &str, body: Vec<Stmt>) -> Result<Vec<Declaration>> {
        analyze(vec![
            group("Animal"),
            structure("Cat", &[], vec![("name", ty("String"))]),
            binding("Cat", parent),
            main(body),
        ])
    }

    #[test]
    fn test_bound_struct_is_a_member_of_its_group() {
        let cat = || object(ty("Cat"), vec![("name", string("Tom"))]);
        let declarations = cat_in_animal("Animal", vec![let_typed("pet", ty("Animal"), cat())]).unwrap();
        assert_eq!(variable_type(&main_body(&declarations)[0]), "Animal");

        assert!(matches!(
            cat_in_animal("Animal", vec![let_typed("n", ty("Integer"), cat())]),
            Err(Error::IncorrectTypeGivenForVariable { .. })
        ));
    }

    #[test]
    fn test_binding_parent_must_be_a_group() {
        match cat_in_animal("Integer", vec![]) {
            Err(Error::BindingToNonGroup { child, parent, .. }) => {
                assert_eq!(child.to_string(), "Cat");
                assert_eq!(parent.to_string(), "Integer");
            }
            other => panic!("expected BindingToNonGroup, got {:?}", other),
        }
    }

    fn pair() -> Declaration {
        structure("Pair", &["T"], vec![("a", ty("T")), ("b", ty("T"))])
    }

    #[test]
    fn test_first_member_binds_struct_placeholder() {
        let declarations = analyze(vec![
            pair(),
            main(vec![
                let_("p", object(ty("Pair"), vec![("a", num("1.5")), ("b", num("2"))])),
                let_("first", access(var("p"), "a")),
            ]),
        ])
        .unwrap();
        let types: Vec<String> = main_body(&declarations).iter().map(variable_type).collect();
        assert_eq!(types, vec!["Pair{Number}", "Number"]);

        let result = analyze(vec![pair(), main(vec![let_("p", object(ty("Pair"), vec![("a", num("2")), ("b", num("1.5"))]))])]);
        match result {
            Err(Error::IncorrectTypeGivenForMember { member, expected, actual, .. }) => {
                assert_eq!(member, "b");
                assert_eq!(expected.to_string(), "Integer");
                assert_eq!(actual.to_string(), "Number");
            }
            other => panic!("expected IncorrectTypeGivenForMember, got {:?}", other),
        }
    }

    #[test]
    fn test_unbound_struct_placeholder_is_rejected() {
        let phantom = structure("Phantom", &["T"], vec![("id", ty("Integer"))]);
        let result = analyze(vec![phantom, main(vec![let_("p", object(ty("Phantom"), vec![("id", num("1"))]))])]);
        assert!(matches!(result, Err(Error::UsingUndefinedGenericName { name, .. }) if name == "T"));
    }

    #[test]
    fn test_constructor_type_argument_count() {
        let boxed = structure("Box", &["T"], vec![("item", ty("T"))]);
        let constructor = ty_of("Box", vec![ty("Integer"), ty("String")]);
        let result = analyze(vec![boxed, main(vec![let_("b", object(constructor, vec![("item", num("1"))]))])]);
        match result {
            Err(Error::WrongNumberOfTypeArguments { name, expected, actual, .. }) => {
                assert_eq!((name.as_str(), expected, actual), ("Box", 1, 2));
            }
            other => panic!("expected WrongNumberOfTypeArguments, got {:?}", other),
        }
    }

    #[test]
    fn test_return_only_generic_is_rejected() {
        let mut make = function(Affix::Nofix, &["make"], vec![], ty("T"), vec![]);
        if let Declaration::Function(f) = &mut make {
            f.generics = vec![GenericParam { name: ident("T"), constraint: None }];
        }
        let result = analyze(vec![make, main(vec![let_("x", call(Affix::Nofix, &["make"], vec![]))])]);
        assert!(matches!(result, Err(Error::UsingUndefinedGenericName { name, .. }) if name == "T"));
    }

    #[test]
    fn test_undeclared_generic_in_return_type() {
        let broken = function(Affix::Suffix, &["first"], vec![("this", ty("Integer"))], ty("U"), vec![]);
        assert!(matches!(analyze(vec![broken]), Err(Error::UsingUndefinedGenericName { .. })));
    }
}
