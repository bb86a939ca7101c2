//! Statically dispatched AST traversal.
//!
//! [`Visitor`] has one method per node kind, each defaulting to a no-op;
//! the `walk_*` functions perform the depth-first recursion and call the
//! visitor at every node. `visit_type` fires once per type annotation slot
//! (declared types, constructor arguments, `new` operands, constants).

use super::{
    Clause, Constructor, Def, Definition, Expression, LetDef, Param, Pattern, Program, TDef, Type,
    TypeDefGroup,
};

#[allow(unused_variables)]
pub trait Visitor {
    fn visit_program(&mut self, program: &Program) {}
    fn visit_letdef(&mut self, letdef: &LetDef) {}
    fn visit_def(&mut self, def: &Def) {}
    fn visit_param(&mut self, param: &Param) {}
    fn visit_typedef_group(&mut self, group: &TypeDefGroup) {}
    fn visit_tdef(&mut self, tdef: &TDef) {}
    fn visit_constructor(&mut self, constructor: &Constructor) {}
    fn visit_expression(&mut self, expr: &Expression) {}
    fn visit_clause(&mut self, clause: &Clause) {}
    fn visit_pattern(&mut self, pattern: &Pattern) {}
    fn visit_type(&mut self, ty: &Type) {}
}

pub fn walk_program<V: Visitor + ?Sized>(v: &mut V, program: &Program) {
    v.visit_program(program);
    for def in &program.defs {
        walk_definition(v, def);
    }
}

pub fn walk_definition<V: Visitor + ?Sized>(v: &mut V, def: &Definition) {
    match def {
        Definition::Let(letdef) => walk_letdef(v, letdef),
        Definition::Type(group) => walk_typedef_group(v, group),
    }
}

pub fn walk_letdef<V: Visitor + ?Sized>(v: &mut V, letdef: &LetDef) {
    v.visit_letdef(letdef);
    for def in &letdef.defs {
        walk_def(v, def);
    }
}

pub fn walk_def<V: Visitor + ?Sized>(v: &mut V, def: &Def) {
    v.visit_def(def);
    match def {
        Def::Function(func) => {
            for param in &func.params {
                walk_param(v, param);
            }
            if let Some(ty) = &func.return_type {
                v.visit_type(ty);
            }
            walk_expression(v, &func.body);
        }
        Def::Variable(var) => {
            if let Some(ty) = &var.ty {
                v.visit_type(ty);
            }
        }
        Def::Array(var) => {
            for dim in &var.dimensions {
                walk_expression(v, dim);
            }
            if let Some(ty) = &var.ty {
                v.visit_type(ty);
            }
        }
    }
}

pub fn walk_param<V: Visitor + ?Sized>(v: &mut V, param: &Param) {
    v.visit_param(param);
    if let Some(ty) = &param.ty {
        v.visit_type(ty);
    }
}

pub fn walk_typedef_group<V: Visitor + ?Sized>(v: &mut V, group: &TypeDefGroup) {
    v.visit_typedef_group(group);
    for tdef in &group.defs {
        walk_tdef(v, tdef);
    }
}

pub fn walk_tdef<V: Visitor + ?Sized>(v: &mut V, tdef: &TDef) {
    v.visit_tdef(tdef);
    v.visit_type(&tdef.ty);
    for constructor in &tdef.constructors {
        v.visit_constructor(constructor);
        for ty in &constructor.arg_types {
            v.visit_type(ty);
        }
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(v: &mut V, expr: &Expression) {
    v.visit_expression(expr);
    match expr {
        Expression::Const(c) => v.visit_type(&c.ty),
        Expression::Genid(_) | Expression::Conid(_) | Expression::Dim(_) => {}
        Expression::ArrayIndex(e) => {
            for index in &e.indices {
                walk_expression(v, index);
            }
        }
        Expression::Unary(e) => walk_expression(v, &e.operand),
        Expression::Binary(e) => {
            walk_expression(v, &e.left);
            walk_expression(v, &e.right);
        }
        Expression::Call(e) => {
            for arg in &e.args {
                walk_expression(v, arg);
            }
        }
        Expression::ConstructorCall(e) => {
            for arg in &e.args {
                walk_expression(v, arg);
            }
        }
        Expression::New(e) => v.visit_type(&e.ty),
        Expression::Delete(e) => walk_expression(v, &e.expr),
        Expression::If(e) => {
            walk_expression(v, &e.condition);
            walk_expression(v, &e.then_expr);
            if let Some(else_expr) = &e.else_expr {
                walk_expression(v, else_expr);
            }
        }
        Expression::While(e) => {
            walk_expression(v, &e.condition);
            walk_expression(v, &e.body);
        }
        Expression::For(e) => {
            walk_expression(v, &e.start);
            walk_expression(v, &e.stop);
            walk_expression(v, &e.body);
        }
        Expression::LetIn(e) => {
            walk_letdef(v, &e.letdef);
            walk_expression(v, &e.expr);
        }
        Expression::Match(e) => {
            walk_expression(v, &e.expr);
            for clause in &e.clauses {
                v.visit_clause(clause);
                walk_pattern(v, &clause.pattern);
                walk_expression(v, &clause.expr);
            }
        }
    }
}

pub fn walk_pattern<V: Visitor + ?Sized>(v: &mut V, pattern: &Pattern) {
    v.visit_pattern(pattern);
    match pattern {
        Pattern::Const(c) => v.visit_type(&c.ty),
        Pattern::Genid(_) => {}
        Pattern::Constructor(c) => {
            for arg in &c.args {
                walk_pattern(v, arg);
            }
        }
    }
}
