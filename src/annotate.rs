use swc_ecma_ast::{
    Class, ClassMember, Constructor, Decl, DefaultDecl, Function, MethodKind, ModuleDecl, ModuleItem, Stmt,
    TsModuleDecl,
};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

use crate::check::{SignatureDecl, TypeChecker};
use crate::jsdoc;
use crate::parse::SourceFile;
use crate::splice::{splice, Edit};

/// Returns the text of `file` with an annotation block before every constructor, method, and
/// function declaration, typed member declarations in every constructor, and unwrap markers
/// around every named class declaration.
pub fn annotate(file: &SourceFile, checker: &dyn TypeChecker) -> String {
    if file.is_declaration_file() {
        return file.text().to_string();
    }

    let edits = change_list(file, checker);
    debug!(file = file.name(), edits = edits.len(), "splicing annotations");
    splice(file.text(), edits)
}

/// Collects the insertions [`annotate`] makes, in traversal order.
pub fn change_list(file: &SourceFile, checker: &dyn TypeChecker) -> Vec<Edit> {
    let mut builder = ChangeListBuilder {
        file,
        checker,
        edits: Vec::new(),
    };

    file.module().visit_with(&mut builder);
    builder.edits
}

/// What the members of one class need to know about it.
struct ClassContext<'c> {
    name: Option<&'c str>,
    members: String,
    implemented: bool,
}

struct ChangeListBuilder<'a> {
    file: &'a SourceFile,
    checker: &'a dyn TypeChecker,
    edits: Vec<Edit>,
}

impl ChangeListBuilder<'_> {
    fn push(&mut self, position: usize, text: String) {
        debug!(file = self.file.name(), position, "edit");
        self.edits.push(Edit::new(position, text));
    }

    fn annotate_decl(&mut self, decl: &Decl, start: usize, end: usize) {
        match decl {
            Decl::Class(class) if class.declare => debug!(class = %class.ident.sym, "skipping ambient class"),
            Decl::Class(class) => self.annotate_class(&class.class, Some(&*class.ident.sym), Some((start, end))),
            Decl::Fn(function) => {
                self.annotate_function(&function.function, start);
                function.function.visit_with(self);
            }
            _ => decl.visit_children_with(self),
        }
    }

    fn annotate_class(&mut self, class: &Class, name: Option<&str>, bounds: Option<(usize, usize)>) {
        if let (Some(name), Some((start, end))) = (name, bounds) {
            self.push(start, jsdoc::unwrap_start(name));
            self.push(end, jsdoc::unwrap_end(name));
        }

        let context = ClassContext {
            name,
            members: jsdoc::member_declarations(self.checker, class),
            implemented: class
                .body
                .iter()
                .any(|member| matches!(member, ClassMember::Constructor(c) if c.body.is_some())),
        };

        let mut constructor_seen = false;
        let slot = self.edits.len();

        for member in &class.body {
            match member {
                ClassMember::Constructor(constructor) => {
                    constructor_seen = true;
                    self.annotate_constructor(constructor, &context);
                }
                ClassMember::Method(method) if method.kind == MethodKind::Method => {
                    self.annotate_function(&method.function, self.file.start(method));
                }
                _ => {}
            }
        }

        if !constructor_seen {
            if let Some(first) = class.body.first() {
                let position = self.file.start(first);
                debug!(file = self.file.name(), position, "synthesized constructor");
                // Ahead of any annotation already recorded for the first member.
                self.edits
                    .insert(slot, Edit::new(position, jsdoc::synthesized_constructor(&context.members)));
            }
        }

        class.visit_children_with(self);
    }

    fn annotate_constructor(&mut self, constructor: &Constructor, context: &ClassContext<'_>) {
        if constructor.body.is_none() && context.implemented {
            debug!(class = context.name, "skipping constructor overload");
            return;
        }

        let signature = self
            .checker
            .signature_from_declaration(SignatureDecl::Constructor(constructor, context.name));
        self.push(self.file.start(constructor), jsdoc::constructor_annotation(&signature));

        match &constructor.body {
            Some(body) => self.push(self.file.start(body) + 1, format!("\n{}", context.members)),
            None => {
                let end = self.file.end(constructor);
                let position = if self.file.text()[..end].ends_with(';') { end - 1 } else { end };
                self.push(position, format!(" {{\n{}\n}}", context.members));
            }
        }
    }

    fn annotate_function(&mut self, function: &Function, position: usize) {
        if function.body.is_none() {
            debug!(file = self.file.name(), position, "skipping bodiless declaration");
            return;
        }

        let signature = self.checker.signature_from_declaration(SignatureDecl::Function(function));
        self.push(position, jsdoc::function_annotation(self.checker, &signature));
    }
}

impl Visit for ChangeListBuilder<'_> {
    fn visit_module_item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                self.annotate_decl(&export.decl, self.file.start(export), self.file.end(export))
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl {
                DefaultDecl::Class(class) => {
                    let bounds = (self.file.start(export), self.file.end(export));
                    self.annotate_class(&class.class, class.ident.as_ref().map(|ident| &*ident.sym), Some(bounds))
                }
                DefaultDecl::Fn(function) => {
                    self.annotate_function(&function.function, self.file.start(export));
                    function.function.visit_with(self);
                }
                DefaultDecl::TsInterfaceDecl(_) => {}
            },
            _ => item.visit_children_with(self),
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.annotate_decl(decl, self.file.start(decl), self.file.end(decl)),
            _ => stmt.visit_children_with(self),
        }
    }

    fn visit_class(&mut self, class: &Class) {
        self.annotate_class(class, None, None);
    }

    // Namespace members are not annotated.
    fn visit_ts_module_decl(&mut self, _: &TsModuleDecl) {}
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::check::Checker;
    use crate::testing::parse_helper;

    fn annotated(source: &str) -> String {
        let file = parse_helper(source);
        let checker = Checker::new(std::slice::from_ref(&file));
        annotate(&file, &checker)
    }

    #[test]
    fn synthesizes_missing_constructor() {
        assert_eq!(
            annotated("class Counter {\n  count: number;\n}\n"),
            "//__UNWRAPSTART__(Counter)\nclass Counter {\n  /** @constructor */\nconstructor () {\n\
             /** @type {number} */\n__DECLARE__('count');\n}\ncount: number;\n}//__UNWRAPEND__(Counter)\n\n"
        );
    }

    #[test]
    fn synthesized_constructor_precedes_first_method_annotation() {
        assert_eq!(
            annotated("class A {\n  m(): void {}\n}"),
            "//__UNWRAPSTART__(A)\nclass A {\n  /** @constructor */\nconstructor () {\n\n}\n\
             /** @returns {void}\n */\nm(): void {}\n}//__UNWRAPEND__(A)\n"
        );
    }

    #[test]
    fn existing_constructor_receives_members() {
        assert_eq!(
            annotated("class P {\n  x = 1;\n  constructor(a: string) {}\n}"),
            "//__UNWRAPSTART__(P)\nclass P {\n  x = 1;\n  /** @constructor\n  * @param {string} a\n */\n\
             constructor(a: string) {\n/** @type {number} */\n__DECLARE__('x');}\n}//__UNWRAPEND__(P)\n"
        );
    }

    #[test]
    fn methods_list_params_before_returns_in_declaration_order() {
        let out = annotated("class S {\n  constructor() {}\n  put(key: string, values: number[]): boolean { return true; }\n}");
        assert!(out.contains(
            "/** @returns {boolean}\n  * @param {string} key\n  * @param {Array.<number>} values\n */\nput("
        ));
    }

    #[test]
    fn free_functions_and_exports() {
        assert_eq!(
            annotated("export function f(a: number): number { return a; }"),
            "/** @returns {number}\n  * @param {number} a\n */\nexport function f(a: number): number { return a; }"
        );

        let out = annotated("export class E {}\n");
        assert_eq!(out, "//__UNWRAPSTART__(E)\nexport class E {}//__UNWRAPEND__(E)\n\n");
    }

    #[test]
    fn bodiless_constructor_gets_a_body() {
        assert_eq!(
            annotated("class B {\n  y: string;\n  constructor();\n}"),
            "//__UNWRAPSTART__(B)\nclass B {\n  y: string;\n  /** @constructor\n */\nconstructor() {\n\
             /** @type {string} */\n__DECLARE__('y');\n};\n}//__UNWRAPEND__(B)\n"
        );
    }

    #[test]
    fn overloads_are_left_alone() {
        let out = annotated("function f(a: string): void;\nfunction f(a: any) {}");
        assert_eq!(out.matches("@returns").count(), 1);
        assert!(out.ends_with("/** @returns {void}\n  * @param {*} a\n */\nfunction f(a: any) {}"));
    }

    #[test]
    fn nested_classes_have_their_own_members() {
        let out = annotated("class Outer {\n  a = 1;\n  m() {\n    class Inner { b = 'x'; }\n  }\n}");
        assert!(out.contains("//__UNWRAPSTART__(Inner)\nclass Inner { /** @constructor */\nconstructor () {\n/** @type {string} */\n__DECLARE__('b');\n}\nb = 'x'; }//__UNWRAPEND__(Inner)\n"));
        assert_eq!(out.matches("__DECLARE__('a')").count(), 1);
        assert_eq!(out.matches("__DECLARE__('b')").count(), 1);
    }

    #[test]
    fn class_expressions_have_no_markers() {
        let out = annotated("const K = class { n = 2; };");
        assert!(!out.contains("__UNWRAP"));
        assert!(out.contains("__DECLARE__('n')"));
    }

    #[test]
    fn classes_in_optional_calls_and_setters_are_reached() {
        let out = annotated(
            "const made = factory?.(class { n = 1; });\n\
             const o = { set v(x) { class Held { s = 'a'; } } };",
        );
        assert_eq!(out.matches("__DECLARE__('n')").count(), 1);
        assert!(out.contains("//__UNWRAPSTART__(Held)\nclass Held"));
    }

    #[test]
    fn namespace_members_are_not_annotated() {
        let out = annotated("namespace N {\n  export class C { n = 1; }\n}\n");
        assert_eq!(out, "namespace N {\n  export class C { n = 1; }\n}\n");
    }

    #[test]
    fn derived_class_constructor_has_no_super_call() {
        let out = annotated("class Base {}\nclass Derived extends Base {\n  n = 1;\n}\n");
        assert!(out.contains(
            "class Derived extends Base {\n  /** @constructor */\nconstructor () {\n/** @type {number} */\n__DECLARE__('n');\n}\n"
        ));
        assert!(!out.contains("super("));
    }

    #[test]
    fn declaration_files_are_untouched() {
        let file = crate::parse::SourceFile::parse("lib.d.ts", "declare class D { x: number; }".to_string()).unwrap();
        let checker = Checker::new(std::slice::from_ref(&file));
        assert_eq!(annotate(&file, &checker), "declare class D { x: number; }");
    }
}
