use swc_ecma_ast::{Class, ClassMember, PropName};
use tracing::debug;

use crate::check::{Location, Signature, TypeChecker};
use crate::format::format_type;

/// One `@param` line per named parameter, each terminated by a newline.
pub fn param_block(signature: &Signature) -> String {
    let mut block = String::new();

    for param in &signature.parameters {
        match &param.name {
            Some(name) => block.push_str(&format!("  * @param {{{}}} {}\n", format_type(&param.ty), name)),
            None => debug!(ty = %param.ty, "skipping destructured parameter"),
        }
    }

    block
}

/// The block placed before a constructor.
pub fn constructor_annotation(signature: &Signature) -> String {
    format!("/** @constructor\n{} */\n", param_block(signature))
}

/// The block placed before a method or function declaration.
pub fn function_annotation(checker: &dyn TypeChecker, signature: &Signature) -> String {
    let return_type = checker.return_type_of_signature(signature);
    format!(
        "/** @returns {{{}}}\n{} */\n",
        format_type(&return_type),
        param_block(signature)
    )
}

/// A typed placeholder statement for every instance property `class` declares, newline-joined.
///
/// `__DECLARE__('name')` is later rewritten to `this.name`.
pub fn member_declarations(checker: &dyn TypeChecker, class: &Class) -> String {
    class
        .body
        .iter()
        .filter_map(|member| match member {
            ClassMember::ClassProp(prop) if !prop.is_static => match &prop.key {
                PropName::Ident(ident) => Some(format!(
                    "/** @type {{{}}} */\n__DECLARE__('{}');",
                    format_type(&checker.type_at_location(Location::Property(prop))),
                    ident.sym
                )),
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A zero-argument constructor whose body is `members`.
pub fn synthesized_constructor(members: &str) -> String {
    format!("/** @constructor */\nconstructor () {{\n{}\n}}\n", members)
}

/// Marker comment placed before a class declaration.
pub fn unwrap_start(class_name: &str) -> String {
    format!("//__UNWRAPSTART__({})\n", class_name)
}

/// Marker comment placed after a class declaration.
pub fn unwrap_end(class_name: &str) -> String {
    format!("//__UNWRAPEND__({})\n", class_name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::check::{Checker, Parameter};
    use crate::testing::{first_class, parse_helper};
    use crate::types::Type;

    fn signature(parameters: Vec<(Option<&str>, Type)>, return_type: Type) -> Signature {
        Signature {
            parameters: parameters
                .into_iter()
                .map(|(name, ty)| Parameter {
                    name: name.map(str::to_string),
                    ty,
                })
                .collect(),
            return_type,
        }
    }

    #[test]
    fn constructor_blocks() {
        let sig = signature(vec![(Some("a"), Type::string()), (Some("b"), Type::any())], Type::any());
        assert_eq!(
            constructor_annotation(&sig),
            "/** @constructor\n  * @param {string} a\n  * @param {*} b\n */\n"
        );

        let empty = signature(vec![], Type::any());
        assert_eq!(constructor_annotation(&empty), "/** @constructor\n */\n");
    }

    #[test]
    fn function_blocks() {
        let checker = Checker::default();
        let sig = signature(
            vec![(Some("s"), Type::string()), (None, Type::any()), (Some("xs"), Type::array(Type::number()))],
            Type::void(),
        );

        assert_eq!(
            function_annotation(&checker, &sig),
            "/** @returns {void}\n  * @param {string} s\n  * @param {Array.<number>} xs\n */\n"
        );
    }

    #[test]
    fn member_declarations_cover_instance_properties() {
        let file = parse_helper("class A { count: number; static s = 1; label = 'x'; ['k'] = 2; m() {} }");
        let checker = Checker::new(std::slice::from_ref(&file));

        assert_eq!(
            member_declarations(&checker, first_class(&file)),
            "/** @type {number} */\n__DECLARE__('count');\n/** @type {string} */\n__DECLARE__('label');"
        );
    }

    #[test]
    fn synthesized_constructors_wrap_members() {
        assert_eq!(
            synthesized_constructor("/** @type {number} */\n__DECLARE__('n');"),
            "/** @constructor */\nconstructor () {\n/** @type {number} */\n__DECLARE__('n');\n}\n"
        );
        assert_eq!(synthesized_constructor(""), "/** @constructor */\nconstructor () {\n\n}\n");
    }

    #[test]
    fn markers() {
        assert_eq!(unwrap_start("Point"), "//__UNWRAPSTART__(Point)\n");
        assert_eq!(unwrap_end("Point"), "//__UNWRAPEND__(Point)\n");
    }
}
