use std::collections::HashSet;

use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    Accessibility, BindingIdent, Callee, Class, ClassMember, Constructor, Decl, DefaultDecl, ExportSpecifier, Expr,
    Function, ImportDecl, ImportSpecifier, Lit, MethodKind, ModuleDecl, ModuleExportName, ModuleItem, NamedExport,
    Param, ParamOrTsParamProp, Pat, Prop, PropName, PropOrSpread, Stmt, SuperProp, TsEnumDecl, TsEnumMemberId,
    TsModuleRef, TsParamProp, TsParamPropParam, TsType, TsTypeAnn, UnaryOp, VarDecl, VarDeclKind,
};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

use crate::check::param_prop_name;
use crate::diagnostic::Diagnostic;
use crate::options::{CompilerOptions, ModuleKind};
use crate::parse::SourceFile;

const INDENT: &str = "    ";

const EXTENDS_HELPER: &str = "var __extends = (this && this.__extends) || function (d, b) {
    for (var p in b) if (b.hasOwnProperty(p)) d[p] = b[p];
    function __() { this.constructor = d; }
    d.prototype = b === null ? Object.create(b) : (__.prototype = b.prototype, new __());
};
";

/// Emits the JavaScript for `file`, along with diagnostics for constructs that were dropped.
pub fn emit_file(file: &SourceFile, options: &CompilerOptions, new_line: &str) -> (String, Vec<Diagnostic>) {
    let mut emitter = Emitter {
        file,
        options,
        new_line,
        patches: Vec::new(),
        diagnostics: Vec::new(),
        needs_extends: false,
        super_scope: None,
    };

    let body = emitter.render(0, file.text().len(), |e| file.module().visit_with(e));

    let mut out = String::new();
    if options.module == ModuleKind::CommonJs && has_es_exports(file) {
        out.push_str(&format!(
            "\"use strict\";{nl}Object.defineProperty(exports, \"__esModule\", {{ value: true }});{nl}",
            nl = new_line
        ));
    }
    if emitter.needs_extends {
        out.push_str(&EXTENDS_HELPER.replace('\n', new_line));
    }
    out.push_str(&body);

    debug!(file = file.name(), bytes = out.len(), "emitted");
    (out, emitter.diagnostics)
}

fn has_es_exports(file: &SourceFile) -> bool {
    file.module().body.iter().any(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => has_runtime(&export.decl),
        ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(named)) => !named.type_only,
        ModuleItem::ModuleDecl(
            ModuleDecl::ExportDefaultDecl(_) | ModuleDecl::ExportDefaultExpr(_) | ModuleDecl::ExportAll(_),
        ) => true,
        _ => false,
    })
}

/// Whether `decl` survives type erasure.
fn has_runtime(decl: &Decl) -> bool {
    match decl {
        Decl::Class(class) => !class.declare,
        Decl::Fn(function) => !function.declare && function.function.body.is_some(),
        Decl::Var(var) => !var.declare,
        Decl::TsEnum(enum_) => !enum_.declare && !enum_.is_const,
        Decl::TsInterface(_) | Decl::TsTypeAlias(_) | Decl::TsModule(_) => false,
    }
}

/// The runtime names a declaration binds.
fn declared_names(decl: &Decl) -> Vec<String> {
    match decl {
        Decl::Class(class) => vec![class.ident.sym.to_string()],
        Decl::Fn(function) => vec![function.ident.sym.to_string()],
        Decl::TsEnum(enum_) => vec![enum_.id.sym.to_string()],
        Decl::Var(var) => {
            let mut names = Vec::new();
            for decl in &var.decls {
                pat_names(&decl.name, &mut names);
            }
            names
        }
        _ => Vec::new(),
    }
}

fn pat_names(pat: &Pat, names: &mut Vec<String>) {
    match pat {
        Pat::Ident(binding) => names.push(binding.id.sym.to_string()),
        Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                pat_names(elem, names);
            }
        }
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    swc_ecma_ast::ObjectPatProp::KeyValue(kv) => pat_names(&kv.value, names),
                    swc_ecma_ast::ObjectPatProp::Assign(assign) => names.push(assign.key.sym.to_string()),
                    swc_ecma_ast::ObjectPatProp::Rest(rest) => pat_names(&rest.arg, names),
                }
            }
        }
        Pat::Rest(rest) => pat_names(&rest.arg, names),
        Pat::Assign(assign) => pat_names(&assign.left, names),
        _ => {}
    }
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string(),
    }
}

fn property_access(target: &str, name: &str) -> String {
    let plain = name.chars().next().map_or(false, |c| c.is_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');

    if plain {
        format!("{}.{}", target, name)
    } else {
        format!("{}[\"{}\"]", target, name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn is_super_call(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Expr(expr) => matches!(&*expr.expr, Expr::Call(call) if matches!(call.callee, Callee::Super(_))),
        _ => false,
    }
}

fn numeric_value(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Lit(Lit::Num(n)) => Some(n.value),
        Expr::Unary(unary) if unary.op == UnaryOp::Minus => numeric_value(&unary.arg).map(|v| -v),
        Expr::Paren(paren) => numeric_value(&paren.expr),
        _ => None,
    }
}

/// The TypeScript-only keywords a member's flags say it was written with.
fn member_modifiers(accessibility: Option<Accessibility>, is_abstract: bool, is_override: bool) -> Vec<&'static str> {
    let mut modifiers = Vec::new();
    match accessibility {
        Some(Accessibility::Public) => modifiers.push("public"),
        Some(Accessibility::Protected) => modifiers.push("protected"),
        Some(Accessibility::Private) => modifiers.push("private"),
        None => {}
    }
    if is_abstract {
        modifiers.push("abstract");
    }
    if is_override {
        modifiers.push("override");
    }
    modifiers
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A replacement of `[lo, hi)` in the original text. `lo == hi` is an insertion.
#[derive(Debug)]
struct Patch {
    lo: usize,
    hi: usize,
    text: String,
}

/// `super` rewriting inside the members of a lowered derived class.
#[derive(Debug, Clone, Copy)]
struct SuperScope {
    is_static: bool,
}

struct Emitter<'a> {
    file: &'a SourceFile,
    options: &'a CompilerOptions,
    new_line: &'a str,
    patches: Vec<Patch>,
    diagnostics: Vec<Diagnostic>,
    needs_extends: bool,
    super_scope: Option<SuperScope>,
}

impl<'a> Emitter<'a> {
    fn text(&self) -> &'a str {
        self.file.text()
    }

    fn start(&self, node: &impl Spanned) -> usize {
        self.file.start(node)
    }

    fn end(&self, node: &impl Spanned) -> usize {
        self.file.end(node)
    }

    fn patch(&mut self, lo: usize, hi: usize, text: impl Into<String>) {
        self.patches.push(Patch {
            lo,
            hi,
            text: text.into(),
        });
    }

    fn erase(&mut self, lo: usize, hi: usize) {
        if lo < hi {
            self.patch(lo, hi, "");
        }
    }

    fn insert(&mut self, position: usize, text: impl Into<String>) {
        self.patch(position, position, text);
    }

    /// Renders `[lo, hi)` of the original text with the patches `visit` records.
    fn render(&mut self, lo: usize, hi: usize, visit: impl FnOnce(&mut Self)) -> String {
        let outer = std::mem::take(&mut self.patches);
        visit(self);
        let mut patches = std::mem::replace(&mut self.patches, outer);
        patches.sort_by_key(|patch| (patch.lo, patch.hi));

        let text = self.text();
        let hi = hi.max(lo);
        let mut out = String::with_capacity(hi - lo);
        let mut cursor = lo;

        for patch in patches {
            if patch.lo < cursor || patch.hi > hi {
                debug!(lo = patch.lo, hi = patch.hi, "dropping overlapping patch");
                continue;
            }
            out.push_str(&text[cursor..patch.lo]);
            out.push_str(&patch.text);
            cursor = patch.hi;
        }

        out.push_str(&text[cursor..hi]);
        out
    }

    fn render_expr(&mut self, expr: &Expr) -> String {
        let (lo, hi) = (self.start(expr), self.end(expr));
        self.render(lo, hi, |e| e.visit_expr(expr))
    }

    fn unsupported(&mut self, span: Span, what: &str) {
        debug!(file = self.file.name(), what, "dropping unsupported construct");
        let diagnostic = self
            .file
            .diagnostic(span, 0, format!("{} is not supported by the emitter and was dropped.", what));
        self.diagnostics.push(diagnostic);
    }

    /// The span of a `TsTypeAnn` starts at its colon.
    fn erase_annotation(&mut self, annotation: &TsTypeAnn) {
        let (lo, hi) = (self.start(annotation), self.end(annotation));
        self.erase(lo, hi);
    }

    fn erase_binding(&mut self, binding: &BindingIdent) {
        let name_end = self.start(&binding.id) + binding.id.sym.len();
        let mut end = match &binding.type_ann {
            Some(annotation) => self.end(&**annotation),
            None => self.end(&binding.id),
        };

        if binding.id.optional && binding.type_ann.is_none() {
            let rest = &self.text()[name_end..];
            if let Some(i) = rest.find('?') {
                if rest[..i].trim().is_empty() {
                    end = end.max(name_end + i + 1);
                }
            }
        }

        self.erase(name_end, end);
    }

    /// Erases a type-only declaration. Its span already starts at a leading `declare` or at the
    /// `const` of a `const enum`.
    fn erase_declaration(&mut self, decl: &Decl) {
        let lo = self.start(decl);
        let hi = self.statement_end(self.end(decl));
        self.erase(lo, hi);
    }

    /// Extends `hi` over a statement's terminating `;` when its span stops short of it.
    fn statement_end(&self, hi: usize) -> usize {
        let text = self.text();
        if !text[..hi].ends_with(';') && text[hi..].starts_with(';') {
            hi + 1
        } else {
            hi
        }
    }

    /// Erases `modifiers` from the head of the class member starting at `start`.
    fn erase_modifiers(&mut self, start: usize, modifiers: &[&str]) {
        if modifiers.is_empty() {
            return;
        }

        let text = self.text();
        let mut pos = start;

        loop {
            let rest = &text[pos..];
            let word_len = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
                .unwrap_or(rest.len());
            if word_len == 0 {
                break;
            }

            let after = &rest[word_len..];
            let next = after.trim_start();
            let gap = after.len() - next.len();
            if gap == 0 || next.is_empty() || next.starts_with(['(', ':', '=', ';', '?', '!', '<', '}']) {
                break;
            }

            let word = &rest[..word_len];
            if modifiers.contains(&word) {
                self.erase(pos, pos + word_len + gap);
            } else if !matches!(word, "static" | "async" | "get" | "set") {
                break;
            }
            pos += word_len + gap;
        }
    }

    /// The span of an abstract class starts at `abstract`.
    fn erase_abstract(&mut self, class: &Class) {
        let lo = self.start(class);
        if class.is_abstract && self.text()[lo..].starts_with("abstract") {
            let rest = &self.text()[lo + "abstract".len()..];
            let gap = rest.len() - rest.trim_start().len();
            self.erase(lo, lo + "abstract".len() + gap);
        }
    }

    fn pat_end(&self, pat: &Pat) -> usize {
        let annotation = match pat {
            Pat::Ident(binding) => binding.type_ann.as_deref(),
            Pat::Array(array) => array.type_ann.as_deref(),
            Pat::Object(object) => object.type_ann.as_deref(),
            Pat::Rest(rest) => rest.type_ann.as_deref(),
            Pat::Assign(assign) => return self.end(pat).max(self.end(&*assign.right)),
            _ => None,
        };

        annotation.map_or(self.end(pat), |annotation| self.end(pat).max(self.end(annotation)))
    }

    fn render_param(&mut self, param: &Param) -> String {
        let lo = self.start(&param.pat);
        let hi = self.end(param).max(self.pat_end(&param.pat));
        self.render(lo, hi, |e| e.visit_pat(&param.pat))
    }

    /// A parameter property reduced to its binding.
    fn render_param_prop(&mut self, prop: &TsParamProp) -> String {
        match &prop.param {
            TsParamPropParam::Ident(binding) => binding.id.sym.to_string(),
            TsParamPropParam::Assign(assign) => {
                let lo = self.start(&*assign.left);
                let hi = self.end(&*assign.right);
                self.render(lo, hi, |e| {
                    e.visit_pat(&assign.left);
                    e.visit_expr(&assign.right);
                })
            }
        }
    }

    fn param_prop_end(&self, prop: &TsParamProp) -> usize {
        let inner = match &prop.param {
            TsParamPropParam::Ident(binding) => binding.type_ann.as_deref().map_or(self.end(&binding.id), |a| self.end(a)),
            TsParamPropParam::Assign(assign) => self.end(&*assign.right),
        };
        self.end(prop).max(inner)
    }

    fn constructor_params(&mut self, params: &[ParamOrTsParamProp]) -> String {
        params
            .iter()
            .map(|param| match param {
                ParamOrTsParamProp::Param(param) => self.render_param(param),
                ParamOrTsParamProp::TsParamProp(prop) => self.render_param_prop(prop),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `function (params) { body }`.
    fn lower_function(&mut self, function: &Function) -> String {
        let params = function
            .params
            .iter()
            .map(|param| self.render_param(param))
            .collect::<Vec<_>>()
            .join(", ");

        let body = match &function.body {
            Some(body) => {
                let (lo, hi) = (self.start(body), self.end(body));
                self.render(lo, hi, |e| e.visit_stmts(&body.stmts))
            }
            None => "{ }".to_string(),
        };

        format!(
            "{}function{} ({}) {}",
            if function.is_async { "async " } else { "" },
            if function.is_generator { "*" } else { "" },
            params,
            body
        )
    }

    /// `target.key` or `target[key]`.
    fn member_target(&mut self, target: &str, key: &PropName) -> String {
        match key {
            PropName::Ident(ident) => format!("{}.{}", target, ident.sym),
            PropName::Computed(computed) => format!("{}[{}]", target, self.render_expr(&computed.expr)),
            _ => format!("{}[{}]", target, self.file.snippet(key.span())),
        }
    }

    /// The property name argument of `Object.defineProperty`.
    fn accessor_name(&mut self, key: &PropName) -> String {
        match key {
            PropName::Ident(ident) => format!("\"{}\"", ident.sym),
            PropName::Computed(computed) => self.render_expr(&computed.expr),
            _ => self.file.snippet(key.span()).to_string(),
        }
    }

    /// Position of the `{` that opens the class body.
    fn body_open(&self, class: &Class) -> usize {
        let mut header_end = self.start(class);
        for decorator in &class.decorators {
            header_end = header_end.max(self.end(decorator));
        }
        if let Some(params) = &class.type_params {
            header_end = header_end.max(self.end(&**params));
        }
        if let Some(super_class) = &class.super_class {
            header_end = header_end.max(self.end(&**super_class));
        }
        if let Some(args) = &class.super_type_params {
            header_end = header_end.max(self.end(&**args));
        }
        if let Some(last) = class.implements.last() {
            header_end = header_end.max(self.end(last));
        }

        self.text()[header_end..]
            .find('{')
            .map_or(header_end, |i| header_end + i)
    }

    /// Statements that initialize instance state at the top of the constructor.
    fn constructor_prologue(&mut self, class: &Class) -> Vec<String> {
        let mut prologue = Vec::new();

        for member in &class.body {
            if let ClassMember::Constructor(constructor) = member {
                if constructor.body.is_none() {
                    continue;
                }
                for param in &constructor.params {
                    if let ParamOrTsParamProp::TsParamProp(prop) = param {
                        if let Some(name) = param_prop_name(prop) {
                            prologue.push(format!("{} = {};", property_access("this", &name), name));
                        }
                    }
                }
            }
        }

        for member in &class.body {
            if let ClassMember::ClassProp(prop) = member {
                if let (false, Some(value)) = (prop.is_static, &prop.value) {
                    let target = self.member_target("this", &prop.key);
                    let value = self.render_expr(value);
                    prologue.push(format!("{} = {};", target, value));
                }
            }
        }

        prologue
    }

    fn prologue_text(&self, prologue: &[String], indent: &str) -> String {
        prologue
            .iter()
            .map(|stmt| format!("{}{}{}", self.new_line, indent, stmt))
            .collect()
    }

    /// Renders a constructor body without its braces, placing `prologue` after a leading
    /// `super(..)` call.
    fn constructor_body(&mut self, constructor: &Constructor, prologue: &str) -> String {
        let Some(body) = &constructor.body else {
            return prologue.to_string();
        };

        let (lo, hi) = (self.start(body) + 1, self.end(body).saturating_sub(1));
        let stmts = &body.stmts;

        match stmts.iter().position(is_super_call) {
            Some(i) => {
                let split = self.end(&stmts[i]);
                let head = self.render(lo, split, |e| e.visit_stmts(&stmts[..=i]));
                let tail = self.render(split, hi, |e| e.visit_stmts(&stmts[i + 1..]));
                format!("{}{}{}", head, prologue, tail)
            }
            None => {
                let rest = self.render(lo, hi, |e| e.visit_stmts(stmts));
                format!("{}{}", prologue, rest)
            }
        }
    }

    /// `(function (_super) { ... return Name; })(Base)`.
    fn lower_class(&mut self, class: &Class, name: &str) -> String {
        let nl = self.new_line;
        let text = self.text();
        let super_arg = class.super_class.as_ref().map(|super_class| self.render_expr(super_class));
        let derived = super_arg.is_some();
        if derived {
            self.needs_extends = true;
        }

        let outer = self.super_scope.take();
        let instance_scope = derived.then_some(SuperScope { is_static: false });
        let static_scope = derived.then_some(SuperScope { is_static: true });

        let body_open = self.body_open(class);
        let closing = self.end(class).saturating_sub(1).max(body_open);
        let mut trivia = Vec::with_capacity(class.body.len());
        let mut previous = body_open + 1;
        for member in &class.body {
            let start = self.start(member).max(previous);
            trivia.push(&text[previous..start]);
            previous = self.end(member).max(start);
        }
        let trailing = &text[previous.min(closing)..closing];

        self.super_scope = instance_scope;
        let prologue = self.constructor_prologue(class);
        let prologue = self.prologue_text(&prologue, &INDENT.repeat(2));

        let mut out = format!("(function ({}) {{", if derived { "_super" } else { "" });
        if derived {
            out.push_str(&format!("{}{}__extends({}, _super);", nl, INDENT, name));
        }

        let constructor_index = class
            .body
            .iter()
            .position(|member| matches!(member, ClassMember::Constructor(c) if c.body.is_some()));

        match constructor_index.map(|i| (i, &class.body[i])) {
            Some((i, ClassMember::Constructor(constructor))) => {
                let params = self.constructor_params(&constructor.params);
                let body = self.constructor_body(constructor, &prologue);
                out.push_str(trivia[i]);
                out.push_str(&format!("function {}({}) {{{}}}", name, params, body));
            }
            _ => {
                let super_call = if derived {
                    format!("{}{}_super.apply(this, arguments);", nl, INDENT.repeat(2))
                } else {
                    String::new()
                };
                out.push_str(&format!(
                    "{nl}{indent}function {name}() {{{super_call}{prologue}{nl}{indent}}}",
                    nl = nl,
                    indent = INDENT,
                    name = name,
                    super_call = super_call,
                    prologue = prologue
                ));
            }
        }

        let mut accessors = HashSet::new();
        let mut statics = Vec::new();

        for (i, member) in class.body.iter().enumerate() {
            if Some(i) == constructor_index {
                continue;
            }

            let is_static = match member {
                ClassMember::Method(method) => method.is_static,
                ClassMember::ClassProp(prop) => prop.is_static,
                _ => false,
            };
            self.super_scope = if is_static { static_scope } else { instance_scope };

            let lowered = self.lower_member(class, member, name, &mut accessors, &mut statics);
            out.push_str(trivia[i]);
            out.push_str(&lowered);
        }

        for stmt in statics {
            out.push_str(&format!("{}{}{}", nl, INDENT, stmt));
        }
        if !trailing.trim().is_empty() {
            out.push_str(trailing);
        }

        self.super_scope = outer;

        out.push_str(&format!(
            "{nl}{indent}return {name};{nl}}})({arg})",
            nl = nl,
            indent = INDENT,
            name = name,
            arg = super_arg.unwrap_or_default()
        ));
        out
    }

    fn lower_member(
        &mut self,
        class: &Class,
        member: &ClassMember,
        name: &str,
        accessors: &mut HashSet<(bool, String)>,
        statics: &mut Vec<String>,
    ) -> String {
        match member {
            ClassMember::Method(method) if method.function.body.is_none() => String::new(),
            ClassMember::Method(method) => {
                let target = if method.is_static {
                    name.to_string()
                } else {
                    format!("{}.prototype", name)
                };

                match method.kind {
                    MethodKind::Method => {
                        let access = self.member_target(&target, &method.key);
                        format!("{} = {};", access, self.lower_function(&method.function))
                    }
                    MethodKind::Getter | MethodKind::Setter => {
                        let key = self.file.snippet(method.key.span()).to_string();
                        if !accessors.insert((method.is_static, key.clone())) {
                            return String::new();
                        }
                        self.define_property(class, &target, method.is_static, &key, &method.key)
                    }
                }
            }
            ClassMember::ClassProp(prop) => {
                if let (true, Some(value)) = (prop.is_static, &prop.value) {
                    let access = self.member_target(name, &prop.key);
                    let value = self.render_expr(value);
                    statics.push(format!("{} = {};", access, value));
                }
                String::new()
            }
            ClassMember::Constructor(_) | ClassMember::TsIndexSignature(_) | ClassMember::Empty(_) => String::new(),
            ClassMember::PrivateMethod(method) => {
                self.unsupported(method.span, "A private method");
                String::new()
            }
            ClassMember::PrivateProp(prop) => {
                self.unsupported(prop.span, "A private field");
                String::new()
            }
            other => {
                self.unsupported(other.span(), "This class member");
                String::new()
            }
        }
    }

    fn define_property(&mut self, class: &Class, target: &str, is_static: bool, key: &str, name: &PropName) -> String {
        let nl = self.new_line;
        let mut parts = Vec::new();

        for member in &class.body {
            let ClassMember::Method(method) = member else {
                continue;
            };
            if method.is_static != is_static
                || method.function.body.is_none()
                || self.file.snippet(method.key.span()) != key
            {
                continue;
            }

            match method.kind {
                MethodKind::Getter => parts.push(format!("get: {}", self.lower_function(&method.function))),
                MethodKind::Setter => parts.push(format!("set: {}", self.lower_function(&method.function))),
                MethodKind::Method => {}
            }
        }

        parts.push("enumerable: true".to_string());
        parts.push("configurable: true".to_string());

        let indent = INDENT.repeat(2);
        format!(
            "Object.defineProperty({}, {}, {{{nl}{indent}{}{nl}{indent2}}});",
            target,
            self.accessor_name(name),
            parts.join(&format!(",{}{}", nl, indent)),
            nl = nl,
            indent = indent,
            indent2 = INDENT
        )
    }

    /// Erases types from a class that keeps its `class` syntax. Returns the static initializers,
    /// which have to run after the class is defined.
    fn class_in_place(&mut self, class: &Class, name: Option<&str>) -> Vec<String> {
        let nl = self.new_line;

        self.erase_abstract(class);
        if let Some(params) = &class.type_params {
            let (lo, hi) = (self.start(&**params), self.end(&**params));
            self.erase(lo, hi);
        }
        if let Some(super_class) = &class.super_class {
            self.visit_expr(super_class);
        }
        if let Some(args) = &class.super_type_params {
            let (lo, hi) = (self.start(&**args), self.end(&**args));
            self.erase(lo, hi);
        }
        if let (Some(first), Some(last)) = (class.implements.first(), class.implements.last()) {
            let first = self.start(first);
            if let Some(keyword) = self.text()[..first].rfind("implements") {
                let hi = self.end(last);
                self.erase(keyword, hi);
            }
        }

        let prologue = self.constructor_prologue(class);
        let prologue = self.prologue_text(&prologue, &INDENT.repeat(2));
        let mut constructed = false;
        let mut statics = Vec::new();

        for member in &class.body {
            let (lo, hi) = (self.start(member), self.end(member));

            match member {
                ClassMember::Constructor(constructor) if constructor.body.is_none() => self.erase(lo, hi),
                ClassMember::Constructor(constructor) => {
                    constructed = true;
                    self.erase_modifiers(lo, &member_modifiers(constructor.accessibility, false, false));
                    for param in &constructor.params {
                        match param {
                            ParamOrTsParamProp::Param(param) => self.visit_pat(&param.pat),
                            ParamOrTsParamProp::TsParamProp(prop) => {
                                let (lo, hi) = (self.start(prop), self.param_prop_end(prop));
                                let binding = self.render_param_prop(prop);
                                self.patch(lo, hi, binding);
                            }
                        }
                    }

                    if let Some(body) = &constructor.body {
                        match body.stmts.iter().position(is_super_call) {
                            Some(i) => {
                                self.visit_stmts(&body.stmts[..=i]);
                                let split = self.end(&body.stmts[i]);
                                self.insert(split, prologue.clone());
                                self.visit_stmts(&body.stmts[i + 1..]);
                            }
                            None => {
                                let open = self.start(body) + 1;
                                self.insert(open, prologue.clone());
                                self.visit_stmts(&body.stmts);
                            }
                        }
                    }
                }
                ClassMember::Method(method) if method.function.body.is_none() => self.erase(lo, hi),
                ClassMember::Method(method) => {
                    let modifiers = member_modifiers(method.accessibility, method.is_abstract, method.is_override);
                    self.erase_modifiers(lo, &modifiers);
                    if let PropName::Computed(computed) = &method.key {
                        self.visit_expr(&computed.expr);
                    }
                    self.visit_function(&method.function);
                }
                ClassMember::ClassProp(prop) => {
                    if let (true, Some(value)) = (prop.is_static, &prop.value) {
                        match name {
                            Some(name) => {
                                let access = self.member_target(name, &prop.key);
                                let value = self.render_expr(value);
                                statics.push(format!("{} = {};", access, value));
                            }
                            None => self.unsupported(prop.span, "A static property of an anonymous class"),
                        }
                    }
                    self.erase(lo, hi);
                }
                ClassMember::TsIndexSignature(_) => self.erase(lo, hi),
                ClassMember::Empty(_) => {}
                ClassMember::PrivateMethod(_) => {
                    self.unsupported(member.span(), "A private method");
                    self.erase(lo, hi);
                }
                ClassMember::PrivateProp(_) => {
                    self.unsupported(member.span(), "A private field");
                    self.erase(lo, hi);
                }
                _ => {
                    self.unsupported(member.span(), "This class member");
                    self.erase(lo, hi);
                }
            }
        }

        if !constructed && !prologue.is_empty() {
            let open = self.body_open(class) + 1;
            let super_call = if class.super_class.is_some() {
                format!("{}{}super(...arguments);", nl, INDENT.repeat(2))
            } else {
                String::new()
            };
            self.insert(
                open,
                format!(
                    "{nl}{indent}constructor() {{{super_call}{prologue}{nl}{indent}}}",
                    nl = nl,
                    indent = INDENT,
                    super_call = super_call,
                    prologue = prologue
                ),
            );
        }

        statics
    }

    /// A class declaration statement spanning `[lo, hi)`.
    fn class_declaration(&mut self, class: &Class, name: &str) {
        let (lo, hi) = (self.start(class), self.end(class));

        if self.options.target.lowers_classes() {
            let lowered = self.lower_class(class, name);
            self.patch(lo, hi, format!("var {} = {};", name, lowered));
        } else {
            let statics = self.class_in_place(class, Some(name));
            for stmt in statics {
                self.insert(hi, format!("{}{}", self.new_line, stmt));
            }
        }
    }

    /// A class in expression position.
    fn class_expression(&mut self, class: &Class, name: Option<&str>) {
        if self.options.target.lowers_classes() {
            let (lo, hi) = (self.start(class), self.end(class));
            let lowered = self.lower_class(class, name.unwrap_or("class_1"));
            self.patch(lo, hi, lowered);
        } else {
            self.class_in_place(class, None);
        }
    }

    fn lower_enum(&mut self, decl: &TsEnumDecl) -> String {
        let nl = self.new_line;
        let name = decl.id.sym.to_string();
        let mut out = format!("var {name};{nl}(function ({name}) {{", name = name, nl = nl);
        let mut next = Some(0.0);

        for member in &decl.members {
            let key = match &member.id {
                TsEnumMemberId::Ident(ident) => ident.sym.to_string(),
                TsEnumMemberId::Str(s) => s.value.to_string(),
            };
            let key = format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""));

            let line = match member.init.as_deref() {
                Some(Expr::Lit(Lit::Str(s))) => {
                    next = None;
                    format!("{}[{}] = {};", name, key, self.file.snippet(s.span))
                }
                Some(init) => {
                    let value = match numeric_value(init) {
                        Some(value) => {
                            next = Some(value + 1.0);
                            format_number(value)
                        }
                        None => {
                            next = None;
                            self.render_expr(init)
                        }
                    };
                    format!("{name}[{name}[{key}] = {value}] = {key};", name = name, key = key, value = value)
                }
                None => {
                    let value = match next {
                        Some(value) => {
                            next = Some(value + 1.0);
                            format_number(value)
                        }
                        None => {
                            let diagnostic = self.file.diagnostic(member.span, 1061, "Enum member must have initializer.");
                            self.diagnostics.push(diagnostic);
                            "void 0".to_string()
                        }
                    };
                    format!("{name}[{name}[{key}] = {value}] = {key};", name = name, key = key, value = value)
                }
            };

            out.push_str(&format!("{}{}{}", nl, INDENT, line));
        }

        out.push_str(&format!("{nl}}})({name} || ({name} = {{}}));", nl = nl, name = name));
        out
    }

    /// Emits a declaration in statement position.
    fn declaration(&mut self, decl: &Decl) {
        let (lo, hi) = (self.start(decl), self.end(decl));

        if !has_runtime(decl) {
            if let Decl::TsModule(module) = decl {
                if !module.declare && module.body.is_some() {
                    self.unsupported(module.span, "A namespace");
                }
            }
            self.erase_declaration(decl);
            return;
        }

        match decl {
            Decl::Class(class) => self.class_declaration(&class.class, &class.ident.sym),
            Decl::Fn(function) => self.visit_function(&function.function),
            Decl::Var(var) => self.visit_var_decl(var),
            Decl::TsEnum(enum_) => {
                let lowered = self.lower_enum(enum_);
                self.patch(lo, hi, lowered);
            }
            Decl::TsInterface(_) | Decl::TsTypeAlias(_) | Decl::TsModule(_) => {}
        }
    }

    fn require_import(&self, import: &ImportDecl) -> String {
        let src = self.file.snippet(import.src.span);
        if import.specifiers.is_empty() {
            return format!("require({});", src);
        }

        import
            .specifiers
            .iter()
            .filter_map(|specifier| match specifier {
                ImportSpecifier::Named(named) if named.is_type_only => None,
                ImportSpecifier::Named(named) => {
                    let imported = named
                        .imported
                        .as_ref()
                        .map(export_name)
                        .unwrap_or_else(|| named.local.sym.to_string());
                    Some(format!(
                        "var {} = {};",
                        named.local.sym,
                        property_access(&format!("require({})", src), &imported)
                    ))
                }
                ImportSpecifier::Default(default) => {
                    Some(format!("var {} = require({}).default;", default.local.sym, src))
                }
                ImportSpecifier::Namespace(namespace) => {
                    Some(format!("var {} = require({});", namespace.local.sym, src))
                }
            })
            .collect::<Vec<_>>()
            .join(self.new_line)
    }

    fn named_exports(&self, named: &NamedExport) -> String {
        let source = named
            .src
            .as_ref()
            .map(|src| format!("require({})", self.file.snippet(src.span)));

        named
            .specifiers
            .iter()
            .filter_map(|specifier| match specifier {
                ExportSpecifier::Named(spec) if spec.is_type_only => None,
                ExportSpecifier::Named(spec) => {
                    let orig = export_name(&spec.orig);
                    let exported = spec.exported.as_ref().map(export_name).unwrap_or_else(|| orig.clone());
                    let value = match &source {
                        Some(source) => property_access(source, &orig),
                        None => orig,
                    };
                    Some(format!("{} = {};", property_access("exports", &exported), value))
                }
                ExportSpecifier::Namespace(spec) => source.as_ref().map(|source| {
                    format!("{} = {};", property_access("exports", &export_name(&spec.name)), source)
                }),
                ExportSpecifier::Default(spec) => source.as_ref().map(|source| {
                    format!("{} = {}.default;", property_access("exports", &spec.exported.sym), source)
                }),
            })
            .collect::<Vec<_>>()
            .join(self.new_line)
    }

    fn module_decl(&mut self, decl: &ModuleDecl) {
        let commonjs = self.options.module == ModuleKind::CommonJs;
        let nl = self.new_line;
        let lo = self.start(decl);
        let hi = self.statement_end(self.end(decl));

        match decl {
            ModuleDecl::Import(import) if import.type_only => self.erase(lo, hi),
            ModuleDecl::Import(import) => {
                if commonjs {
                    let requires = self.require_import(import);
                    self.patch(lo, hi, requires);
                }
            }
            ModuleDecl::ExportDecl(export) => {
                if !has_runtime(&export.decl) {
                    if let Decl::TsModule(module) = &export.decl {
                        if !module.declare && module.body.is_some() {
                            self.unsupported(module.span, "A namespace");
                        }
                    }
                    self.erase(lo, hi);
                    return;
                }

                if commonjs {
                    let decl_lo = self.start(&export.decl);
                    self.erase(lo, decl_lo);
                    self.declaration(&export.decl);
                    let exports: String = declared_names(&export.decl)
                        .iter()
                        .map(|name| format!("{}{} = {};", nl, property_access("exports", name), name))
                        .collect();
                    self.insert(hi, exports);
                } else {
                    self.declaration(&export.decl);
                }
            }
            ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                DefaultDecl::Class(class) => {
                    let name = class.ident.as_ref().map(|ident| ident.sym.to_string());
                    let class_lo = self.start(&class.class);

                    if self.options.target.lowers_classes() {
                        let name = name.unwrap_or_else(|| "default_1".to_string());
                        let lowered = self.lower_class(&class.class, &name);
                        let export = if commonjs {
                            format!("exports.default = {};", name)
                        } else {
                            format!("export default {};", name)
                        };
                        self.patch(lo, hi, format!("var {} = {};{}{}", name, lowered, nl, export));
                    } else if commonjs {
                        match name {
                            Some(name) => {
                                self.erase(lo, class_lo);
                                let statics = self.class_in_place(&class.class, Some(name.as_str()));
                                let mut tail: String = statics.iter().map(|stmt| format!("{}{}", nl, stmt)).collect();
                                tail.push_str(&format!("{}exports.default = {};", nl, name));
                                self.insert(hi, tail);
                            }
                            None => {
                                self.patch(lo, class_lo, "exports.default = ");
                                self.class_in_place(&class.class, None);
                                self.insert(hi, ";");
                            }
                        }
                    } else {
                        let statics = self.class_in_place(&class.class, name.as_deref());
                        let tail: String = statics.iter().map(|stmt| format!("{}{}", nl, stmt)).collect();
                        self.insert(hi, tail);
                    }
                }
                DefaultDecl::Fn(function) => {
                    if commonjs {
                        let function_lo = self.start(&function.function);
                        match &function.ident {
                            Some(ident) => {
                                self.erase(lo, function_lo);
                                self.insert(hi, format!("{}exports.default = {};", nl, ident.sym));
                            }
                            None => {
                                self.patch(lo, function_lo, "exports.default = ");
                                self.insert(hi, ";");
                            }
                        }
                    }
                    self.visit_function(&function.function);
                }
                DefaultDecl::TsInterfaceDecl(_) => self.erase(lo, hi),
            },
            ModuleDecl::ExportDefaultExpr(export) => {
                if commonjs {
                    let expr_lo = self.start(&*export.expr);
                    self.patch(lo, expr_lo, "exports.default = ");
                }
                self.visit_expr(&export.expr);
            }
            ModuleDecl::ExportNamed(named) if named.type_only => self.erase(lo, hi),
            ModuleDecl::ExportNamed(named) => {
                if commonjs {
                    let exports = self.named_exports(named);
                    self.patch(lo, hi, exports);
                }
            }
            ModuleDecl::ExportAll(all) => {
                if commonjs {
                    let src = self.file.snippet(all.src.span);
                    self.patch(
                        lo,
                        hi,
                        format!(
                            "(function (m) {{ for (var p in m) if (!exports.hasOwnProperty(p)) exports[p] = m[p]; }})(require({}));",
                            src
                        ),
                    );
                }
            }
            ModuleDecl::TsImportEquals(import) if import.is_type_only => self.erase(lo, hi),
            ModuleDecl::TsImportEquals(import) => {
                let value = match &import.module_ref {
                    TsModuleRef::TsExternalModuleRef(external) => {
                        format!("require({})", self.file.snippet(external.expr.span))
                    }
                    TsModuleRef::TsEntityName(entity) => self.file.snippet(entity.span()).to_string(),
                };
                let mut text = format!("var {} = {};", import.id.sym, value);
                if import.is_export && commonjs {
                    text.push_str(&format!("{}{} = {};", nl, property_access("exports", &import.id.sym), import.id.sym));
                }
                self.patch(lo, hi, text);
            }
            ModuleDecl::TsExportAssignment(export) => {
                let expr_lo = self.start(&*export.expr);
                self.patch(lo, expr_lo, "module.exports = ");
                self.visit_expr(&export.expr);
            }
            ModuleDecl::TsNamespaceExport(_) => self.erase(lo, hi),
        }
    }

    /// Rewrites `super(..)` and `super.m(..)` inside a lowered derived class. Returns false when
    /// `expr` is not such a call.
    fn lower_super(&mut self, expr: &Expr) -> bool {
        let Some(scope) = self.super_scope else {
            return false;
        };
        let target = if scope.is_static { "_super" } else { "_super.prototype" };

        match expr {
            Expr::Call(call) => {
                let Some(open) = self.text()[self.end(&call.callee)..].find('(').map(|i| self.end(&call.callee) + i)
                else {
                    return false;
                };
                let separator = if call.args.is_empty() { "" } else { ", " };

                match &call.callee {
                    Callee::Super(keyword) => {
                        let lo = self.start(keyword);
                        self.patch(lo, open + 1, format!("_super.call(this{}", separator));
                    }
                    Callee::Expr(callee) => {
                        let Expr::SuperProp(prop) = &**callee else {
                            return false;
                        };
                        let (lo, hi) = (self.start(&prop.obj), self.end(&prop.obj));
                        self.patch(lo, hi, target);
                        if let SuperProp::Computed(computed) = &prop.prop {
                            self.visit_expr(&computed.expr);
                        }
                        let callee_hi = self.end(&**callee);
                        self.patch(callee_hi, open + 1, format!(".call(this{}", separator));
                    }
                    Callee::Import(_) => return false,
                }

                for arg in &call.args {
                    self.visit_expr(&arg.expr);
                }
                true
            }
            Expr::SuperProp(prop) => {
                let (lo, hi) = (self.start(&prop.obj), self.end(&prop.obj));
                self.patch(lo, hi, target);
                if let SuperProp::Computed(computed) = &prop.prop {
                    self.visit_expr(&computed.expr);
                }
                true
            }
            _ => false,
        }
    }
}

impl Visit for Emitter<'_> {
    fn visit_module_item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::Stmt(stmt) => self.visit_stmt(stmt),
            ModuleItem::ModuleDecl(decl) => self.module_decl(decl),
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.declaration(decl),
            _ => stmt.visit_children_with(self),
        }
    }

    fn visit_var_decl(&mut self, var: &VarDecl) {
        if var.kind != VarDeclKind::Var && self.options.target.lowers_classes() {
            let lo = self.start(var);
            let keyword = match var.kind {
                VarDeclKind::Let => "let",
                _ => "const",
            };
            if self.text()[lo..].starts_with(keyword) {
                self.patch(lo, lo + keyword.len(), "var");
            }
        }
        var.visit_children_with(self);
    }

    fn visit_class(&mut self, class: &Class) {
        self.class_expression(class, None);
    }

    fn visit_function(&mut self, function: &Function) {
        if let Some(params) = &function.type_params {
            let (lo, hi) = (self.start(&**params), self.end(&**params));
            self.erase(lo, hi);
        }
        if let Some(annotation) = &function.return_type {
            self.erase_annotation(annotation);
        }
        function.visit_children_with(self);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if self.lower_super(expr) {
            return;
        }

        match expr {
            Expr::Class(class) => {
                let name = class.ident.as_ref().map(|ident| ident.sym.to_string());
                self.class_expression(&class.class, name.as_deref());
                return;
            }
            Expr::Arrow(arrow) => {
                if let Some(params) = &arrow.type_params {
                    let (lo, hi) = (self.start(&**params), self.end(&**params));
                    self.erase(lo, hi);
                }
                if let Some(annotation) = &arrow.return_type {
                    self.erase_annotation(annotation);
                }
            }
            Expr::Call(call) => {
                if let Some(args) = &call.type_args {
                    let (lo, hi) = (self.start(&**args), self.end(&**args));
                    self.erase(lo, hi);
                }
            }
            Expr::New(new) => {
                if let Some(args) = &new.type_args {
                    let (lo, hi) = (self.start(&**args), self.end(&**args));
                    self.erase(lo, hi);
                }
            }
            Expr::TaggedTpl(tagged) => {
                if let Some(args) = &tagged.type_params {
                    let (lo, hi) = (self.start(&**args), self.end(&**args));
                    self.erase(lo, hi);
                }
            }
            Expr::Object(object) => {
                for prop in &object.props {
                    if let PropOrSpread::Prop(prop) = prop {
                        if let Prop::Getter(getter) = &**prop {
                            if let Some(annotation) = &getter.type_ann {
                                self.erase_annotation(annotation);
                            }
                        }
                    }
                }
            }
            Expr::TsAs(as_) => {
                let (lo, hi) = (self.end(&*as_.expr), self.end(expr));
                self.erase(lo, hi);
            }
            Expr::TsSatisfies(satisfies) => {
                let (lo, hi) = (self.end(&*satisfies.expr), self.end(expr));
                self.erase(lo, hi);
            }
            Expr::TsNonNull(non_null) => {
                let (lo, hi) = (self.end(&*non_null.expr), self.end(expr));
                self.erase(lo, hi);
            }
            Expr::TsConstAssertion(assertion) => {
                let (lo, hi) = (self.end(&*assertion.expr), self.end(expr));
                self.erase(lo, hi);
            }
            Expr::TsInstantiation(instantiation) => {
                let (lo, hi) = (self.end(&*instantiation.expr), self.end(expr));
                self.erase(lo, hi);
            }
            Expr::TsTypeAssertion(assertion) => {
                let (lo, hi) = (self.start(expr), self.start(&*assertion.expr));
                self.erase(lo, hi);
            }
            _ => {}
        }

        expr.visit_children_with(self);
    }

    fn visit_pat(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(binding) => self.erase_binding(binding),
            Pat::Array(array) => {
                if let Some(annotation) = &array.type_ann {
                    self.erase_annotation(annotation);
                }
            }
            Pat::Object(object) => {
                if let Some(annotation) = &object.type_ann {
                    self.erase_annotation(annotation);
                }
            }
            Pat::Rest(rest) => {
                if let Some(annotation) = &rest.type_ann {
                    self.erase_annotation(annotation);
                }
            }
            _ => {}
        }
        pat.visit_children_with(self);
    }

    // Type nodes produce no output and are erased by their owners.
    fn visit_ts_type(&mut self, _: &TsType) {}
}
