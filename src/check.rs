use std::collections::{HashMap, HashSet};

use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BinaryOp, Class, ClassMember, ClassProp, Constructor, Decl, DefaultDecl, Expr, Function,
    GetterProp, Lit, ModuleDecl, ModuleItem, ParamOrTsParamProp, Pat, PropName, ReturnStmt, SetterProp,
    Stmt, TsEntityName, TsFnOrConstructorType, TsKeywordTypeKind, TsLit, TsModuleDecl, TsParamProp,
    TsParamPropParam, TsType, TsTypeAliasDecl, TsTypeOperatorOp, TsTypeParamDecl,
    TsUnionOrIntersectionType, UnaryOp,
};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::options::CompilerOptions;
use crate::parse::SourceFile;
use crate::types::{ObjectFlags, Symbol, SymbolKind, Type, TypeFlags};

/// Something the checker can be asked the type of.
#[derive(Debug, Clone, Copy)]
pub enum Location<'a> {
    /// A function or method parameter.
    Param(&'a Pat),

    /// A constructor parameter property such as `public x: number`.
    ParamProp(&'a TsParamProp),

    /// A class property declaration.
    Property(&'a ClassProp),

    /// A type written in the source.
    TypeNode(&'a TsType),
}

/// A declaration that has a call signature.
#[derive(Debug, Clone, Copy)]
pub enum SignatureDecl<'a> {
    /// A function declaration, method, or function expression.
    Function(&'a Function),

    /// A class constructor, with the name of its class when the class has one.
    Constructor(&'a Constructor, Option<&'a str>),
}

/// A parameter of a [`Signature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// The bound name, or `None` for destructuring patterns.
    pub name: Option<String>,

    /// The declared or inferred type.
    pub ty: Type,
}

/// A resolved call signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,

    /// The declared or inferred return type.
    pub return_type: Type,
}

/// Type queries over a compiled program.
///
/// The checker only reports types; it never rejects a program.
pub trait TypeChecker {
    /// The type of the node at `location`.
    fn type_at_location(&self, location: Location<'_>) -> Type;

    /// The call signature of a function-like declaration.
    fn signature_from_declaration(&self, decl: SignatureDecl<'_>) -> Signature;

    /// The return type of a signature.
    fn return_type_of_signature(&self, signature: &Signature) -> Type {
        signature.return_type.clone()
    }

    /// A TypeScript-style rendering of `ty`, for diagnostics.
    fn type_to_string(&self, ty: &Type) -> String {
        ty.to_string()
    }
}

const MAX_ALIAS_DEPTH: usize = 16;

const GLOBAL_TYPES: &[&str] = &[
    "Array", "ArrayLike", "Boolean", "Date", "Error", "Function", "Iterable", "Iterator", "JSON",
    "Map", "Math", "Number", "Object", "Omit", "Partial", "Pick", "Promise", "PromiseLike",
    "Readonly", "ReadonlyArray", "Record", "RegExp", "Required", "Set", "String", "Symbol",
    "WeakMap", "WeakSet",
];

#[derive(Debug, Clone)]
enum Declaration {
    Class,
    Interface,
    Enum,
    Alias(Box<TsType>),
}

/// Resolves declared types and infers simple ones for every file of a program.
#[derive(Debug, Default)]
pub struct Checker {
    declarations: HashMap<String, Declaration>,
    type_parameters: HashSet<String>,
}

impl Checker {
    /// Builds the declaration table from the top-level declarations of `files`.
    pub fn new(files: &[SourceFile]) -> Self {
        let mut checker = Checker::default();

        for file in files {
            for item in &file.module().body {
                match item {
                    ModuleItem::Stmt(Stmt::Decl(decl)) => checker.declare(decl),
                    ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => checker.declare(&export.decl),
                    ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                        if let DefaultDecl::Class(class) = &export.decl {
                            if let Some(ident) = &class.ident {
                                checker.declarations.insert(ident.sym.to_string(), Declaration::Class);
                            }
                        }
                    }
                    _ => {}
                }
            }

            let mut collector = TypeParamCollector::default();
            file.module().visit_with(&mut collector);
            checker.type_parameters.extend(collector.names);
        }

        debug!(
            declarations = checker.declarations.len(),
            type_parameters = checker.type_parameters.len(),
            "declaration table built"
        );

        checker
    }

    fn declare(&mut self, decl: &Decl) {
        let (name, declaration) = match decl {
            Decl::Class(class) => (class.ident.sym.to_string(), Declaration::Class),
            Decl::TsInterface(interface) => (interface.id.sym.to_string(), Declaration::Interface),
            Decl::TsEnum(enum_) => (enum_.id.sym.to_string(), Declaration::Enum),
            Decl::TsTypeAlias(alias) => (alias.id.sym.to_string(), Declaration::Alias(alias.type_ann.clone())),
            _ => return,
        };

        self.declarations.insert(name, declaration);
    }

    /// Computes the semantic diagnostics of `file`: unresolved type names and, with
    /// `noImplicitAny`, parameters and properties whose type silently falls back to `any`.
    pub fn check_file(&self, file: &SourceFile, options: &CompilerOptions) -> Vec<Diagnostic> {
        let mut pass = SemanticPass {
            checker: self,
            file,
            no_implicit_any: options.no_implicit_any,
            diagnostics: Vec::new(),
        };

        file.module().visit_with(&mut pass);
        pass.diagnostics
    }

    /// Resolves a written type. `report` receives the span and name of every type reference
    /// that does not resolve.
    fn resolve(&self, ty: &TsType, depth: usize, report: &mut dyn FnMut(Span, &str)) -> Type {
        match ty {
            TsType::TsKeywordType(keyword) => keyword_type(keyword.kind),
            TsType::TsThisType(_) => Type::nominal(Symbol::new("this", SymbolKind::TypeParameter)),
            TsType::TsFnOrConstructorType(f) => Type::anonymous(match f {
                TsFnOrConstructorType::TsFnType(_) => "function",
                TsFnOrConstructorType::TsConstructorType(_) => "constructor",
            }),
            TsType::TsTypeRef(reference) => {
                let args: Vec<Type> = reference
                    .type_params
                    .as_ref()
                    .map(|params| params.params.iter().map(|arg| self.resolve(arg, depth, report)).collect())
                    .unwrap_or_default();

                match &reference.type_name {
                    TsEntityName::Ident(ident) => self.resolve_name(&ident.sym, ident.span, args, depth, report),
                    TsEntityName::TsQualifiedName(qualified) => {
                        // Namespaces are not tracked, so a miss is not reported.
                        self.resolve_name(&qualified.right.sym, qualified.right.span, args, depth, &mut |_, _| {})
                    }
                }
            }
            TsType::TsTypeQuery(_) => Type::anonymous("typeof"),
            TsType::TsTypeLit(_) => Type::anonymous("object literal"),
            TsType::TsArrayType(array) => Type::array(self.resolve(&array.elem_type, depth, report)),
            TsType::TsTupleType(_) => Type {
                object_flags: ObjectFlags::TUPLE,
                ..Type::opaque(TypeFlags::OBJECT, "tuple")
            },
            TsType::TsOptionalType(optional) => self.resolve(&optional.type_ann, depth, report),
            TsType::TsRestType(rest) => self.resolve(&rest.type_ann, depth, report),
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
                Type::union(union.types.iter().map(|member| self.resolve(member, depth, report)).collect::<Vec<_>>())
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(intersection)) => {
                Type::intersection(
                    intersection
                        .types
                        .iter()
                        .map(|member| self.resolve(member, depth, report))
                        .collect(),
                )
            }
            TsType::TsConditionalType(_) => Type::opaque(TypeFlags::CONDITIONAL, "conditional"),
            TsType::TsInferType(infer) => {
                Type::nominal(Symbol::new(infer.type_param.name.sym.to_string(), SymbolKind::TypeParameter))
            }
            TsType::TsParenthesizedType(paren) => self.resolve(&paren.type_ann, depth, report),
            TsType::TsTypeOperator(operator) => match operator.op {
                TsTypeOperatorOp::KeyOf => Type::opaque(TypeFlags::INDEX, "keyof"),
                TsTypeOperatorOp::Unique => Type::opaque(TypeFlags::UNIQUE_ES_SYMBOL, "unique symbol"),
                TsTypeOperatorOp::ReadOnly => self.resolve(&operator.type_ann, depth, report),
            },
            TsType::TsIndexedAccessType(_) => Type::opaque(TypeFlags::INDEXED_ACCESS, "indexed access"),
            TsType::TsMappedType(_) => Type::anonymous("mapped"),
            TsType::TsLitType(lit) => match &lit.lit {
                TsLit::Str(s) => Type::string_literal(s.value.to_string()),
                TsLit::Number(n) => Type::opaque(TypeFlags::NUMBER_LITERAL, n.value.to_string()),
                TsLit::Bool(b) if b.value => Type::intrinsic(TypeFlags::BOOLEAN_LITERAL, "true"),
                TsLit::Bool(_) => Type::intrinsic(TypeFlags::BOOLEAN_LITERAL, "false"),
                TsLit::BigInt(b) => Type::opaque(TypeFlags::BIG_INT_LITERAL, format!("{}n", b.value)),
                TsLit::Tpl(_) => Type::opaque(TypeFlags::TEMPLATE_LITERAL, "template literal"),
            },
            TsType::TsTypePredicate(_) => Type::boolean(),
            TsType::TsImportType(_) => Type::any(),
        }
    }

    fn resolve_name(
        &self,
        name: &str,
        span: Span,
        args: Vec<Type>,
        depth: usize,
        report: &mut dyn FnMut(Span, &str),
    ) -> Type {
        match self.declarations.get(name) {
            Some(Declaration::Class) => return nominal_or_reference(Symbol::new(name, SymbolKind::Class), args),
            Some(Declaration::Interface) => {
                return nominal_or_reference(Symbol::new(name, SymbolKind::Interface), args)
            }
            Some(Declaration::Enum) => return Type::nominal(Symbol::new(name, SymbolKind::Enum)),
            Some(Declaration::Alias(aliased)) => {
                if depth >= MAX_ALIAS_DEPTH {
                    debug!(alias = name, "alias expansion too deep");
                    return Type::any();
                }
                // Problems inside the alias body belong to the alias's own file.
                return self.resolve(aliased, depth + 1, &mut |_, _| {});
            }
            None => {}
        }

        if self.type_parameters.contains(name) {
            return Type::nominal(Symbol::new(name, SymbolKind::TypeParameter));
        }

        if GLOBAL_TYPES.contains(&name) {
            let name = if name == "ReadonlyArray" { "Array" } else { name };
            return nominal_or_reference(Symbol::new(name, SymbolKind::Global), args);
        }

        report(span, name);
        Type::any()
    }

    /// Infers the type of an initializer or returned expression.
    fn infer(&self, expr: &Expr) -> Type {
        match expr {
            Expr::Lit(lit) => match lit {
                Lit::Str(_) | Lit::JSXText(_) => Type::string(),
                Lit::Num(_) => Type::number(),
                Lit::Bool(_) => Type::boolean(),
                Lit::BigInt(_) => Type::intrinsic(TypeFlags::BIG_INT, "bigint"),
                Lit::Regex(_) => Type::nominal(Symbol::new("RegExp", SymbolKind::Global)),
                Lit::Null(_) => Type::any(),
            },
            Expr::Tpl(_) => Type::string(),
            Expr::Array(array) => match array.elems.iter().flatten().find(|elem| elem.spread.is_none()) {
                Some(first) => Type::array(self.infer(&first.expr)),
                None => Type::array(Type::any()),
            },
            Expr::New(new) => match &*new.callee {
                Expr::Ident(ident) => {
                    let args: Vec<Type> = new
                        .type_args
                        .as_ref()
                        .map(|args| args.params.iter().map(|arg| self.resolve(arg, 0, &mut |_, _| {})).collect())
                        .unwrap_or_default();
                    self.resolve_name(&ident.sym, ident.span, args, 0, &mut |_, _| {})
                }
                _ => Type::any(),
            },
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Bang | UnaryOp::Delete => Type::boolean(),
                UnaryOp::Minus | UnaryOp::Plus | UnaryOp::Tilde => Type::number(),
                UnaryOp::TypeOf => Type::string(),
                UnaryOp::Void => Type::intrinsic(TypeFlags::UNDEFINED, "undefined"),
            },
            Expr::Update(_) => Type::number(),
            Expr::Bin(bin) => match bin.op {
                BinaryOp::EqEq
                | BinaryOp::NotEq
                | BinaryOp::EqEqEq
                | BinaryOp::NotEqEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::In
                | BinaryOp::InstanceOf => Type::boolean(),
                BinaryOp::Add => {
                    let (left, right) = (self.infer(&bin.left), self.infer(&bin.right));
                    if left == Type::string() || right == Type::string() {
                        Type::string()
                    } else if left == Type::number() && right == Type::number() {
                        Type::number()
                    } else {
                        Type::any()
                    }
                }
                BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing => {
                    Type::union([self.infer(&bin.left), self.infer(&bin.right)])
                }
                _ => Type::number(),
            },
            Expr::Cond(cond) => Type::union([self.infer(&cond.cons), self.infer(&cond.alt)]),
            Expr::Paren(paren) => self.infer(&paren.expr),
            Expr::TsAs(as_) => self.resolve(&as_.type_ann, 0, &mut |_, _| {}),
            Expr::TsTypeAssertion(assertion) => self.resolve(&assertion.type_ann, 0, &mut |_, _| {}),
            Expr::TsNonNull(non_null) => self.infer(&non_null.expr),
            Expr::TsConstAssertion(assertion) => self.infer(&assertion.expr),
            Expr::TsSatisfies(satisfies) => self.infer(&satisfies.expr),
            Expr::Await(await_) => {
                let awaited = self.infer(&await_.arg);
                match (awaited.symbol_name(), awaited.type_arguments.first()) {
                    (Some("Promise"), Some(inner)) => inner.clone(),
                    _ => awaited,
                }
            }
            Expr::Object(_) => Type::anonymous("object literal"),
            Expr::Fn(_) | Expr::Arrow(_) => Type::anonymous("function"),
            Expr::Class(_) => Type::anonymous("class"),
            _ => Type::any(),
        }
    }

    fn annotated(&self, annotation: Option<&TsType>) -> Option<Type> {
        annotation.map(|ty| self.resolve(ty, 0, &mut |_, _| {}))
    }

    fn pat_type(&self, pat: &Pat) -> Type {
        match pat {
            Pat::Ident(binding) => self.annotated(binding.type_ann.as_ref().map(|ann| &*ann.type_ann)),
            Pat::Assign(assign) => Some(
                self.annotated(pat_annotation(&assign.left))
                    .unwrap_or_else(|| self.infer(&assign.right)),
            ),
            Pat::Rest(rest) => Some(
                self.annotated(rest.type_ann.as_ref().map(|ann| &*ann.type_ann).or_else(|| pat_annotation(&rest.arg)))
                    .unwrap_or_else(|| Type::array(Type::any())),
            ),
            Pat::Array(array) => self.annotated(array.type_ann.as_ref().map(|ann| &*ann.type_ann)),
            Pat::Object(object) => self.annotated(object.type_ann.as_ref().map(|ann| &*ann.type_ann)),
            _ => None,
        }
        .unwrap_or_else(Type::any)
    }

    fn inferred_return_type(&self, function: &Function) -> Type {
        if let Some(annotation) = &function.return_type {
            return self.resolve(&annotation.type_ann, 0, &mut |_, _| {});
        }

        let ty = match &function.body {
            Some(_) if function.is_generator => Type::any(),
            Some(body) => {
                let mut returns = ReturnCollector {
                    checker: self,
                    types: Vec::new(),
                };
                body.visit_with(&mut returns);

                if returns.types.is_empty() {
                    Type::void()
                } else {
                    Type::union(returns.types)
                }
            }
            None => Type::any(),
        };

        if function.is_async {
            Type::reference(Symbol::new("Promise", SymbolKind::Global), vec![ty])
        } else {
            ty
        }
    }
}

impl TypeChecker for Checker {
    fn type_at_location(&self, location: Location<'_>) -> Type {
        match location {
            Location::Param(pat) => self.pat_type(pat),
            Location::ParamProp(prop) => match &prop.param {
                TsParamPropParam::Ident(binding) => self
                    .annotated(binding.type_ann.as_ref().map(|ann| &*ann.type_ann))
                    .unwrap_or_else(Type::any),
                TsParamPropParam::Assign(assign) => self
                    .annotated(pat_annotation(&assign.left))
                    .unwrap_or_else(|| self.infer(&assign.right)),
            },
            Location::Property(prop) => match (&prop.type_ann, &prop.value) {
                (Some(annotation), _) => self.resolve(&annotation.type_ann, 0, &mut |_, _| {}),
                (None, Some(value)) => self.infer(value),
                (None, None) => Type::any(),
            },
            Location::TypeNode(ty) => self.resolve(ty, 0, &mut |_, _| {}),
        }
    }

    fn signature_from_declaration(&self, decl: SignatureDecl<'_>) -> Signature {
        match decl {
            SignatureDecl::Function(function) => Signature {
                parameters: function
                    .params
                    .iter()
                    .map(|param| Parameter {
                        name: binding_name(&param.pat),
                        ty: self.pat_type(&param.pat),
                    })
                    .collect(),
                return_type: self.inferred_return_type(function),
            },
            SignatureDecl::Constructor(constructor, class_name) => Signature {
                parameters: constructor
                    .params
                    .iter()
                    .map(|param| match param {
                        ParamOrTsParamProp::Param(param) => Parameter {
                            name: binding_name(&param.pat),
                            ty: self.pat_type(&param.pat),
                        },
                        ParamOrTsParamProp::TsParamProp(prop) => Parameter {
                            name: param_prop_name(prop),
                            ty: self.type_at_location(Location::ParamProp(prop)),
                        },
                    })
                    .collect(),
                return_type: class_name
                    .map(|name| Type::nominal(Symbol::new(name, SymbolKind::Class)))
                    .unwrap_or_else(Type::any),
            },
        }
    }
}

fn keyword_type(kind: TsKeywordTypeKind) -> Type {
    match kind {
        TsKeywordTypeKind::TsAnyKeyword | TsKeywordTypeKind::TsIntrinsicKeyword => Type::any(),
        TsKeywordTypeKind::TsUnknownKeyword => Type::intrinsic(TypeFlags::UNKNOWN, "unknown"),
        TsKeywordTypeKind::TsNumberKeyword => Type::number(),
        TsKeywordTypeKind::TsObjectKeyword => Type::intrinsic(TypeFlags::NON_PRIMITIVE, "object"),
        TsKeywordTypeKind::TsBooleanKeyword => Type::boolean(),
        TsKeywordTypeKind::TsBigIntKeyword => Type::intrinsic(TypeFlags::BIG_INT, "bigint"),
        TsKeywordTypeKind::TsStringKeyword => Type::string(),
        TsKeywordTypeKind::TsSymbolKeyword => Type::intrinsic(TypeFlags::ES_SYMBOL, "symbol"),
        TsKeywordTypeKind::TsVoidKeyword => Type::void(),
        TsKeywordTypeKind::TsUndefinedKeyword => Type::intrinsic(TypeFlags::UNDEFINED, "undefined"),
        TsKeywordTypeKind::TsNullKeyword => Type::intrinsic(TypeFlags::NULL, "null"),
        TsKeywordTypeKind::TsNeverKeyword => Type::intrinsic(TypeFlags::NEVER, "never"),
    }
}

fn nominal_or_reference(symbol: Symbol, args: Vec<Type>) -> Type {
    if args.is_empty() {
        Type::nominal(symbol)
    } else {
        Type::reference(symbol, args)
    }
}

fn pat_annotation(pat: &Pat) -> Option<&TsType> {
    match pat {
        Pat::Ident(binding) => binding.type_ann.as_ref().map(|ann| &*ann.type_ann),
        Pat::Array(array) => array.type_ann.as_ref().map(|ann| &*ann.type_ann),
        Pat::Object(object) => object.type_ann.as_ref().map(|ann| &*ann.type_ann),
        Pat::Rest(rest) => rest.type_ann.as_ref().map(|ann| &*ann.type_ann),
        _ => None,
    }
}

/// The name a parameter pattern binds, if it binds a single name.
pub fn binding_name(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(binding) => Some(binding.id.sym.to_string()),
        Pat::Assign(assign) => binding_name(&assign.left),
        Pat::Rest(rest) => binding_name(&rest.arg),
        _ => None,
    }
}

/// The name a constructor parameter property binds.
pub fn param_prop_name(prop: &TsParamProp) -> Option<String> {
    match &prop.param {
        TsParamPropParam::Ident(binding) => Some(binding.id.sym.to_string()),
        TsParamPropParam::Assign(assign) => binding_name(&assign.left),
    }
}

/// The plain name of a property key; computed keys have none.
pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}

#[derive(Default)]
struct TypeParamCollector {
    names: HashSet<String>,
}

impl Visit for TypeParamCollector {
    fn visit_ts_type_param_decl(&mut self, params: &TsTypeParamDecl) {
        self.names.extend(params.params.iter().map(|param| param.name.sym.to_string()));
        params.visit_children_with(self);
    }
}

/// Infers the type of each `return` value of one function body, without entering nested
/// functions or classes.
struct ReturnCollector<'a> {
    checker: &'a Checker,
    types: Vec<Type>,
}

impl Visit for ReturnCollector<'_> {
    fn visit_return_stmt(&mut self, ret: &ReturnStmt) {
        if let Some(arg) = &ret.arg {
            self.types.push(self.checker.infer(arg));
        }
    }

    fn visit_function(&mut self, _: &Function) {}

    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}

    fn visit_class(&mut self, _: &Class) {}

    fn visit_getter_prop(&mut self, _: &GetterProp) {}

    fn visit_setter_prop(&mut self, _: &SetterProp) {}
}

struct SemanticPass<'a> {
    checker: &'a Checker,
    file: &'a SourceFile,
    no_implicit_any: bool,
    diagnostics: Vec<Diagnostic>,
}

impl SemanticPass<'_> {
    fn check_type(&mut self, ty: &TsType) {
        let file = self.file;
        let diagnostics = &mut self.diagnostics;
        self.checker.resolve(ty, 0, &mut |span, name| {
            diagnostics.push(file.diagnostic(span, 2304, format!("Cannot find name '{}'.", name)));
        });
    }

    fn check_annotation(&mut self, pat: &Pat) {
        if let Some(ty) = pat_annotation(pat) {
            self.check_type(ty);
        }
    }

    fn check_params<'p>(&mut self, params: impl Iterator<Item = &'p Pat>) {
        for pat in params {
            let implicit = match pat {
                Pat::Ident(binding) => binding.type_ann.is_none(),
                Pat::Array(array) => array.type_ann.is_none(),
                Pat::Object(object) => object.type_ann.is_none(),
                _ => false,
            };

            if self.no_implicit_any && implicit {
                let name = binding_name(pat).unwrap_or_else(|| self.file.snippet(pat.span()).to_string());
                self.diagnostics.push(self.file.diagnostic(
                    pat.span(),
                    7006,
                    format!("Parameter '{}' implicitly has an 'any' type.", name),
                ));
            }
        }
    }
}

impl Visit for SemanticPass<'_> {
    fn visit_ts_type_alias_decl(&mut self, alias: &TsTypeAliasDecl) {
        self.check_type(&alias.type_ann);
    }

    // Namespace scopes are not in the declaration table.
    fn visit_ts_module_decl(&mut self, _: &TsModuleDecl) {}

    fn visit_class(&mut self, class: &Class) {
        for member in &class.body {
            match member {
                ClassMember::ClassProp(prop) => match &prop.type_ann {
                    Some(annotation) => self.check_type(&annotation.type_ann),
                    None if self.no_implicit_any && prop.value.is_none() => {
                        let name = prop_name(&prop.key).unwrap_or_else(|| self.file.snippet(prop.key.span()).to_string());
                        self.diagnostics.push(self.file.diagnostic(
                            prop.span,
                            7008,
                            format!("Member '{}' implicitly has an 'any' type.", name),
                        ));
                    }
                    None => {}
                },
                ClassMember::Constructor(constructor) => {
                    let params = constructor.params.iter().filter_map(|param| match param {
                        ParamOrTsParamProp::Param(param) => Some(&param.pat),
                        ParamOrTsParamProp::TsParamProp(_) => None,
                    });
                    self.check_params(params);

                    for param in &constructor.params {
                        if let ParamOrTsParamProp::TsParamProp(prop) = param {
                            if let TsParamPropParam::Ident(binding) = &prop.param {
                                if let Some(annotation) = &binding.type_ann {
                                    self.check_type(&annotation.type_ann);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        class.visit_children_with(self);
    }

    fn visit_function(&mut self, function: &Function) {
        self.check_params(function.params.iter().map(|param| &param.pat));
        if let Some(annotation) = &function.return_type {
            self.check_type(&annotation.type_ann);
        }
        function.visit_children_with(self);
    }

    fn visit_pat(&mut self, pat: &Pat) {
        self.check_annotation(pat);
        pat.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use swc_ecma_ast::{ClassMember, Decl, ModuleItem, Stmt};

    use super::*;
    use crate::format::format_type;
    use crate::testing::{first_class, first_function, parse_helper};

    fn checker_for(source: &str) -> (Checker, SourceFile) {
        let file = parse_helper(source);
        let checker = Checker::new(std::slice::from_ref(&file));
        (checker, file)
    }

    #[test]
    fn parameter_and_return_types() {
        let (checker, file) = checker_for("function f(a: string, b: number[], c = true): Map<string, number> { return null; }");
        let signature = checker.signature_from_declaration(SignatureDecl::Function(first_function(&file)));

        let types: Vec<String> = signature.parameters.iter().map(|p| format_type(&p.ty)).collect();
        assert_eq!(types, vec!["string", "Array.<number>", "boolean"]);
        assert_eq!(signature.parameters[2].name.as_deref(), Some("c"));
        assert_eq!(checker.type_to_string(&checker.return_type_of_signature(&signature)), "Map<string, number>");
    }

    #[test]
    fn inferred_return_types() {
        let (checker, file) = checker_for("function f(x: boolean) { if (x) { return 1; } return 'a'; }");
        let signature = checker.signature_from_declaration(SignatureDecl::Function(first_function(&file)));
        assert_eq!(format_type(&signature.return_type), "(number|string)");

        let (checker, file) = checker_for("async function g() { const inner = () => 1; }");
        let signature = checker.signature_from_declaration(SignatureDecl::Function(first_function(&file)));
        assert_eq!(checker.type_to_string(&signature.return_type), "Promise<void>");
    }

    #[test]
    fn declared_names_resolve() {
        let (checker, file) = checker_for(
            "enum Color { Red }\ninterface Shape {}\ntype Id = string;\nclass Box<T> { a: Color; b: Shape; c: Id; d: T; e: Box<number>; f: Missing; }",
        );

        let class = first_class(&file);
        let types: Vec<String> = class
            .body
            .iter()
            .filter_map(|member| match member {
                ClassMember::ClassProp(prop) => Some(format_type(&checker.type_at_location(Location::Property(prop)))),
                _ => None,
            })
            .collect();

        assert_eq!(types, vec!["Color", "Shape", "string", "262144?", "number", "*"]);
    }

    #[test]
    fn properties_infer_from_initializers() {
        let (checker, file) = checker_for("class A { a = 1; b = 'x'; c = [1, 2]; d = new A(); e = null; }");

        let class = first_class(&file);
        let types: Vec<String> = class
            .body
            .iter()
            .filter_map(|member| match member {
                ClassMember::ClassProp(prop) => Some(format_type(&checker.type_at_location(Location::Property(prop)))),
                _ => None,
            })
            .collect();

        assert_eq!(types, vec!["number", "string", "Array.<number>", "A", "*"]);
    }

    #[test]
    fn constructor_signatures_include_parameter_properties() {
        let (checker, file) = checker_for("class P { constructor(public x: number, y: string) {} }");
        let class = first_class(&file);
        let ClassMember::Constructor(constructor) = &class.body[0] else {
            panic!("expected a constructor");
        };

        let signature = checker.signature_from_declaration(SignatureDecl::Constructor(constructor, Some("P")));
        let names: Vec<_> = signature.parameters.iter().map(|p| p.name.clone().unwrap_or_default()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(format_type(&signature.return_type), "P");
    }

    #[test]
    fn semantic_diagnostics() {
        let (checker, file) = checker_for("class A { x; y: Nope; }\nfunction f(a, b: number) {}");
        let messages: Vec<String> = checker
            .check_file(&file, &CompilerOptions::default())
            .into_iter()
            .map(|d| d.message)
            .collect();

        assert_eq!(
            messages,
            vec![
                "Member 'x' implicitly has an 'any' type.",
                "Cannot find name 'Nope'.",
                "Parameter 'a' implicitly has an 'any' type.",
            ]
        );

        let lenient = CompilerOptions {
            no_implicit_any: false,
            ..CompilerOptions::default()
        };
        assert_eq!(checker.check_file(&file, &lenient).len(), 1);
    }

    #[test]
    fn nested_returns_do_not_count() {
        let (checker, file) = checker_for(
            "function f() { const g = () => { return 1; }; class C { m() { return 'a'; } } const o = { get v() { return true; } }; }",
        );
        let signature = checker.signature_from_declaration(SignatureDecl::Function(first_function(&file)));
        assert_eq!(format_type(&signature.return_type), "void");
    }

    #[test]
    fn exported_aliases_are_checked_and_namespaces_skipped() {
        let (checker, file) = checker_for("export type Alias = Missing;
namespace N { let v: Local; }");
        let messages: Vec<String> = checker
            .check_file(&file, &CompilerOptions::default())
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["Cannot find name 'Missing'."]);
    }

    #[test]
    fn method_signature_type_parameters_resolve() {
        let (checker, file) = checker_for("interface Mapper { map<U>(f: U): U; }
let u: U;");
        let ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) = &file.module().body[1] else {
            panic!("expected a variable declaration");
        };
        let Pat::Ident(binding) = &var.decls[0].name else {
            panic!("expected an identifier");
        };
        let annotation = binding.type_ann.as_ref().unwrap();
        assert_eq!(format_type(&checker.type_at_location(Location::TypeNode(&annotation.type_ann))), "262144?");
    }

    #[test]
    fn type_nodes_resolve_directly() {
        let (checker, file) = checker_for("let x: 'a' | 'b' | number;");
        let ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) = &file.module().body[0] else {
            panic!("expected a variable declaration");
        };
        let Pat::Ident(binding) = &var.decls[0].name else {
            panic!("expected an identifier");
        };
        let annotation = binding.type_ann.as_ref().unwrap();

        let ty = checker.type_at_location(Location::TypeNode(&annotation.type_ann));
        assert_eq!(format_type(&ty), "(string|string|number)");
    }
}
