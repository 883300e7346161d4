//! Type expressions: built-in names, type names, record/pointer/array/
//! procedure types. Types nest into each other (an array of records, a
//! pointer to an array of pointers, ...) so the whole thing is built as
//! one cyclic grammar behind a `Linker`, the same shape as expressions.

use std::rc::Rc;

use crate::ast::{BuiltInType, FieldList, FormalSection, Identifier, IdentDef, ParamMode, QualIdent, Type};
use crate::parser::{any_of, chain, delim_sequence, map, maybe, no_return, option, Linker, Parser};

use super::context::GrammarContext;
use super::expr::qualident;
use super::lexical::{here, identifier, keyword, op};

fn builtin_name(ident: &Identifier, ctx: &GrammarContext) -> Option<BuiltInType> {
    let text = ctx.interner.borrow().resolve(ident.name).to_string();
    Some(match text.as_str() {
        "BOOLEAN" => BuiltInType::Boolean,
        "CHAR" => BuiltInType::Char,
        "INTEGER" => BuiltInType::Integer,
        "REAL" => BuiltInType::Real,
        "BYTE" => BuiltInType::Byte,
        "SET" => BuiltInType::Set,
        "COMMON" => BuiltInType::Common,
        _ => return None,
    })
}

/// `ident*` or plain `ident`, the shape every declared name takes on the
/// left of a declaration.
pub fn ident_def(ctx: &GrammarContext) -> Parser<IdentDef> {
    let p = chain(identifier(ctx), maybe(op("*")));
    map(p, |(ident, star)| IdentDef::new(ident, star.is_some()))
}

pub(crate) fn ident_def_list(ctx: &GrammarContext) -> Parser<Vec<IdentDef>> {
    delim_sequence(ident_def(ctx), op(","))
}

fn ident_list(ctx: &GrammarContext) -> Parser<Vec<Identifier>> {
    delim_sequence(identifier(ctx), op(","))
}

/// A bare type name: a qualident, reinterpreted as a built-in type when it
/// is a simple identifier spelled like one of the predeclared type names.
fn type_name(ctx: &GrammarContext) -> Parser<Rc<Type>> {
    let grammar = ctx.clone();
    let q = qualident(ctx);
    map(q, move |q: QualIdent| {
        if q.is_simple() {
            if let Some(builtin) = builtin_name(&q.name, &grammar) {
                return Rc::new(Type::BuiltIn(builtin, q.place));
            }
        }
        Rc::new(Type::Name(q))
    })
}

fn field_list(ctx: &GrammarContext, ty: Parser<Rc<Type>>) -> Parser<FieldList> {
    let p = chain(here(), chain(ident_def_list(ctx), chain(op(":"), ty)));
    map(p, |(place, (idents, (_, ty)))| FieldList { idents, ty, place })
}

fn record_type(ctx: &GrammarContext, ty: Parser<Rc<Type>>) -> Parser<Rc<Type>> {
    let base = maybe(chain(op("("), chain(qualident(ctx), op(")"))));
    let fields = option(delim_sequence(field_list(ctx, ty), op(";")), Vec::new());
    let p = chain(here(), chain(no_return(keyword("RECORD")), chain(base, chain(fields, keyword("END")))));
    map(p, |(place, (_, (base, (fields, _))))| {
        let base = base.map(|(_, (q, _))| q);
        Rc::new(Type::Record { base, fields, place })
    })
}

fn pointer_type(ty: Parser<Rc<Type>>) -> Parser<Rc<Type>> {
    let p = chain(here(), chain(no_return(keyword("POINTER")), chain(keyword("TO"), ty)));
    map(p, |(place, (_, (_, referent)))| Rc::new(Type::Pointer { referent, place }))
}

fn array_type(expr: Parser<Rc<crate::ast::Expression>>, ty: Parser<Rc<Type>>) -> Parser<Rc<Type>> {
    let lengths = option(delim_sequence(expr, op(",")), Vec::new());
    let p = chain(here(), chain(no_return(keyword("ARRAY")), chain(lengths, chain(keyword("OF"), ty))));
    map(p, |(place, (_, (lengths, (_, element))))| Rc::new(Type::Array {
        lengths,
        element,
        open: false,
        place,
    }))
}

/// An open array formal parameter type (`ARRAY OF T`, no length list —
/// only legal inside a formal section).
fn open_array_type(ty: Parser<Rc<Type>>) -> Parser<Rc<Type>> {
    let p = chain(here(), chain(keyword("ARRAY"), chain(keyword("OF"), ty)));
    map(p, |(place, (_, (_, element)))| Rc::new(Type::Array {
        lengths: Vec::new(),
        element,
        open: true,
        place,
    }))
}

fn formal_section(ctx: &GrammarContext, ty: Parser<Rc<Type>>) -> Parser<FormalSection> {
    let mode = option(map(keyword("VAR"), |_| ParamMode::Var), ParamMode::Value);
    let p = chain(here(), chain(mode, chain(ident_list(ctx), chain(op(":"), ty))));
    map(p, |(place, (mode, (idents, (_, ty))))| FormalSection {
        mode,
        idents,
        ty,
        place,
    })
}

pub(crate) fn formal_params(ctx: &GrammarContext, ty: Parser<Rc<Type>>) -> Parser<(Vec<FormalSection>, Option<QualIdent>)> {
    let open = open_array_type(Rc::clone(&ty));
    let param_ty = any_of(vec![open, Rc::clone(&ty)]);
    let sections = option(delim_sequence(formal_section(ctx, param_ty), op(";")), Vec::new());
    let ret = maybe(chain(op(":"), qualident(ctx)));
    let p = chain(op("("), chain(sections, chain(op(")"), ret)));
    map(p, |(_, (sections, (_, ret)))| (sections, ret.map(|(_, q)| q)))
}

fn procedure_type(ctx: &GrammarContext, ty: Parser<Rc<Type>>) -> Parser<Rc<Type>> {
    let params = maybe(formal_params(ctx, ty));
    let p = chain(here(), chain(no_return(keyword("PROCEDURE")), params));
    map(p, |(place, (_, params))| {
        let (params, return_type) = params.unwrap_or_default();
        Rc::new(Type::Procedure { params, return_type, place })
    })
}

/// Builds the cyclic type grammar and links it. `expr` is the already-
/// linked expression handle, used for array length expressions.
pub fn build_type(ctx: &GrammarContext, expr: Parser<Rc<crate::ast::Expression>>) -> Linker<Rc<Type>> {
    let ty_linker: Linker<Rc<Type>> = Linker::new();
    let handle = ty_linker.handle();

    let alts = any_of(vec![
        record_type(ctx, handle.clone()),
        pointer_type(handle.clone()),
        array_type(expr, handle.clone()),
        procedure_type(ctx, handle),
        type_name(ctx),
    ]);
    ty_linker.link(alts);
    ty_linker
}

#[cfg(test)]
#[path = "ty_tests.rs"]
mod ty_tests;
