use tracing::warn;

use crate::types::{ObjectFlags, Type, TypeFlags};

/// Formats a [`Type`] in JSDoc type syntax.
///
/// Never fails: shapes without a JSDoc rendering are logged and replaced with the raw flag
/// value followed by `?`.
pub fn format_type(ty: &Type) -> String {
    if ty.flags.intersects(TypeFlags::INTRINSIC) {
        if ty.flags.contains(TypeFlags::ANY) {
            return "*".to_string();
        }
        if let Some(name) = ty.intrinsic_name {
            return name.to_string();
        }
    }

    // JSDoc has no literal types.
    if ty.flags.contains(TypeFlags::STRING_LITERAL) {
        return "string".to_string();
    }

    // Only the first argument is kept: the consumers only care about element types.
    if ty.object_flags.contains(ObjectFlags::REFERENCE) {
        if let Some(first) = ty.type_arguments.first() {
            return match ty.symbol_name() {
                Some("Array") => format!("Array.<{}>", format_type(first)),
                _ => format_type(first),
            };
        }
    }

    if ty.flags.contains(TypeFlags::ENUM) || ty.object_flags.intersects(ObjectFlags::CLASS | ObjectFlags::INTERFACE) {
        if let Some(name) = ty.symbol_name() {
            return name.to_string();
        }
    }

    if ty.is_union() {
        let members: Vec<String> = ty.types.iter().map(format_type).collect();
        return format!("({})", members.join("|"));
    }

    warn!(flags = ty.flags.bits(), ty = %ty, "unimplemented type");
    format!("{}?", ty.flags.bits())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{Symbol, SymbolKind};

    #[test]
    fn intrinsics() {
        assert_eq!(format_type(&Type::any()), "*");
        assert_eq!(format_type(&Type::string()), "string");
        assert_eq!(format_type(&Type::number()), "number");
        assert_eq!(format_type(&Type::boolean()), "boolean");
        assert_eq!(format_type(&Type::void()), "void");
        assert_eq!(format_type(&Type::intrinsic(TypeFlags::BOOLEAN_LITERAL, "true")), "true");
    }

    #[test]
    fn string_literals_collapse() {
        assert_eq!(format_type(&Type::string_literal("on")), "string");
    }

    #[test]
    fn references() {
        assert_eq!(format_type(&Type::array(Type::number())), "Array.<number>");
        assert_eq!(format_type(&Type::array(Type::array(Type::any()))), "Array.<Array.<*>>");

        let promise = Type::reference(Symbol::new("Promise", SymbolKind::Global), vec![Type::string()]);
        assert_eq!(format_type(&promise), "string");

        let map = Type::reference(
            Symbol::new("Map", SymbolKind::Global),
            vec![Type::string(), Type::number()],
        );
        assert_eq!(format_type(&map), "string");
    }

    #[test]
    fn nominals() {
        assert_eq!(format_type(&Type::nominal(Symbol::new("Point", SymbolKind::Class))), "Point");
        assert_eq!(format_type(&Type::nominal(Symbol::new("Shape", SymbolKind::Interface))), "Shape");
        assert_eq!(format_type(&Type::nominal(Symbol::new("Color", SymbolKind::Enum))), "Color");
    }

    #[test]
    fn unions_keep_member_order() {
        let ty = Type::union([Type::string(), Type::nominal(Symbol::new("Point", SymbolKind::Class)), Type::void()]);
        assert_eq!(format_type(&ty), "(string|Point|void)");
    }

    #[test]
    fn unsupported_shapes_fall_back_to_flags() {
        let tuple = Type::opaque(TypeFlags::OBJECT, "[number, string]");
        assert_eq!(format_type(&tuple), format!("{}?", TypeFlags::OBJECT.bits()));

        let param = Type::nominal(Symbol::new("T", SymbolKind::TypeParameter));
        assert_eq!(format_type(&param), "262144?");
    }

    #[test]
    fn formatting_is_repeatable() {
        let ty = Type::union([Type::array(Type::string()), Type::number()]);
        assert_eq!(format_type(&ty), format_type(&ty));
    }
}
