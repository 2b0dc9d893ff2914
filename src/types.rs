use std::fmt::Display;

bitflags::bitflags! {
    /// Classification bits of a [`Type`]. The bit positions follow the TypeScript checker, so the
    /// raw value printed for an unsupported shape means the same thing it would to `tsc`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        /// `any`.
        const ANY = 1 << 0;
        /// `unknown`.
        const UNKNOWN = 1 << 1;
        /// `string`.
        const STRING = 1 << 2;
        /// `number`.
        const NUMBER = 1 << 3;
        /// `boolean`.
        const BOOLEAN = 1 << 4;
        /// A declared enum.
        const ENUM = 1 << 5;
        /// `bigint`.
        const BIG_INT = 1 << 6;
        /// A string literal type such as `"a"`.
        const STRING_LITERAL = 1 << 7;
        /// A numeric literal type such as `1`.
        const NUMBER_LITERAL = 1 << 8;
        /// `true` or `false`.
        const BOOLEAN_LITERAL = 1 << 9;
        /// A single enum member.
        const ENUM_LITERAL = 1 << 10;
        /// A bigint literal type such as `1n`.
        const BIG_INT_LITERAL = 1 << 11;
        /// `symbol`.
        const ES_SYMBOL = 1 << 12;
        /// `unique symbol`.
        const UNIQUE_ES_SYMBOL = 1 << 13;
        /// `void`.
        const VOID = 1 << 14;
        /// `undefined`.
        const UNDEFINED = 1 << 15;
        /// `null`.
        const NULL = 1 << 16;
        /// `never`.
        const NEVER = 1 << 17;
        /// A generic type parameter (also `this`).
        const TYPE_PARAMETER = 1 << 18;
        /// Any object type; see [`ObjectFlags`] for the kind.
        const OBJECT = 1 << 19;
        /// `A | B`.
        const UNION = 1 << 20;
        /// `A & B`.
        const INTERSECTION = 1 << 21;
        /// `keyof T`.
        const INDEX = 1 << 22;
        /// `T[K]`.
        const INDEXED_ACCESS = 1 << 23;
        /// `A extends B ? C : D`.
        const CONDITIONAL = 1 << 24;
        /// Internal substitution type.
        const SUBSTITUTION = 1 << 25;
        /// `object`.
        const NON_PRIMITIVE = 1 << 26;
        /// A template literal type.
        const TEMPLATE_LITERAL = 1 << 27;

        /// Types that are fully described by their name.
        const INTRINSIC = Self::ANY.bits()
            | Self::UNKNOWN.bits()
            | Self::STRING.bits()
            | Self::NUMBER.bits()
            | Self::BIG_INT.bits()
            | Self::BOOLEAN.bits()
            | Self::BOOLEAN_LITERAL.bits()
            | Self::ES_SYMBOL.bits()
            | Self::VOID.bits()
            | Self::UNDEFINED.bits()
            | Self::NULL.bits()
            | Self::NEVER.bits()
            | Self::NON_PRIMITIVE.bits();
    }
}

bitflags::bitflags! {
    /// Further classification of [`TypeFlags::OBJECT`] types.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ObjectFlags: u32 {
        /// A class instance type.
        const CLASS = 1 << 0;
        /// An interface type.
        const INTERFACE = 1 << 1;
        /// A generic instantiation such as `Array<number>`.
        const REFERENCE = 1 << 2;
        /// A tuple type.
        const TUPLE = 1 << 3;
        /// An object literal, function, or constructor type.
        const ANONYMOUS = 1 << 4;
    }
}

/// What a [`Symbol`] was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// `class C {}`.
    Class,

    /// `interface I {}`.
    Interface,

    /// `enum E {}`.
    Enum,

    /// `type T = ...`.
    TypeAlias,

    /// A generic type parameter.
    TypeParameter,

    /// A type provided by the runtime library (`Array`, `Promise`, ...).
    Global,
}

/// A named declaration a type refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The declared name.
    pub name: String,

    /// The kind of declaration.
    pub kind: SymbolKind,
}

impl Symbol {
    /// Creates a new [`Symbol`].
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A resolved type, as reported by the checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    /// Primary classification.
    pub flags: TypeFlags,

    /// Secondary classification for object types.
    pub object_flags: ObjectFlags,

    /// Canonical name of intrinsic types (`string`, `void`, ...).
    pub intrinsic_name: Option<&'static str>,

    /// The declaration behind nominal and reference types.
    pub symbol: Option<Symbol>,

    /// Type arguments of a generic reference, in order.
    pub type_arguments: Vec<Type>,

    /// Members of a union or intersection, in order.
    pub types: Vec<Type>,

    /// Literal value, or the source text of a shape that has no structured form here.
    pub text: Option<String>,
}

impl Type {
    /// Creates a type that carries nothing but its flags.
    pub fn with_flags(flags: TypeFlags) -> Self {
        Self {
            flags,
            object_flags: ObjectFlags::empty(),
            intrinsic_name: None,
            symbol: None,
            type_arguments: Vec::new(),
            types: Vec::new(),
            text: None,
        }
    }

    /// Creates an intrinsic type such as `number`.
    pub fn intrinsic(flags: TypeFlags, name: &'static str) -> Self {
        Self {
            intrinsic_name: Some(name),
            ..Self::with_flags(flags)
        }
    }

    /// `any`.
    pub fn any() -> Self {
        Self::intrinsic(TypeFlags::ANY, "any")
    }

    /// `string`.
    pub fn string() -> Self {
        Self::intrinsic(TypeFlags::STRING, "string")
    }

    /// `number`.
    pub fn number() -> Self {
        Self::intrinsic(TypeFlags::NUMBER, "number")
    }

    /// `boolean`.
    pub fn boolean() -> Self {
        Self::intrinsic(TypeFlags::BOOLEAN, "boolean")
    }

    /// `void`.
    pub fn void() -> Self {
        Self::intrinsic(TypeFlags::VOID, "void")
    }

    /// A string literal type.
    pub fn string_literal(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            ..Self::with_flags(TypeFlags::STRING_LITERAL)
        }
    }

    /// A generic instantiation of `symbol`.
    pub fn reference(symbol: Symbol, type_arguments: Vec<Type>) -> Self {
        let object_flags = match symbol.kind {
            SymbolKind::Class => ObjectFlags::REFERENCE | ObjectFlags::CLASS,
            SymbolKind::Interface | SymbolKind::Global => ObjectFlags::REFERENCE | ObjectFlags::INTERFACE,
            _ => ObjectFlags::REFERENCE,
        };

        Self {
            object_flags,
            symbol: Some(symbol),
            type_arguments,
            ..Self::with_flags(TypeFlags::OBJECT)
        }
    }

    /// `Array<element>`.
    pub fn array(element: Type) -> Self {
        Self::reference(Symbol::new("Array", SymbolKind::Global), vec![element])
    }

    /// The non-generic type named by a class, interface, enum, or type parameter declaration.
    pub fn nominal(symbol: Symbol) -> Self {
        let (flags, object_flags) = match symbol.kind {
            SymbolKind::Class => (TypeFlags::OBJECT, ObjectFlags::CLASS),
            SymbolKind::Interface | SymbolKind::Global => (TypeFlags::OBJECT, ObjectFlags::INTERFACE),
            SymbolKind::Enum => (TypeFlags::ENUM, ObjectFlags::empty()),
            SymbolKind::TypeParameter => (TypeFlags::TYPE_PARAMETER, ObjectFlags::empty()),
            SymbolKind::TypeAlias => (TypeFlags::OBJECT, ObjectFlags::ANONYMOUS),
        };

        Self {
            object_flags,
            symbol: Some(symbol),
            ..Self::with_flags(flags)
        }
    }

    /// An object type without a name: object literals, functions, and the like.
    pub fn anonymous(text: impl Into<String>) -> Self {
        Self {
            object_flags: ObjectFlags::ANONYMOUS,
            text: Some(text.into()),
            ..Self::with_flags(TypeFlags::OBJECT)
        }
    }

    /// A shape that is only carried by its flags and source text.
    pub fn opaque(flags: TypeFlags, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::with_flags(flags)
        }
    }

    /// `A | B | ...`. Nested unions are flattened and duplicates dropped; a single remaining
    /// member is returned as is.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        let mut types: Vec<Type> = Vec::new();
        for member in members {
            let flattened = if member.is_union() { member.types } else { vec![member] };
            for ty in flattened {
                if !types.contains(&ty) {
                    types.push(ty);
                }
            }
        }

        match types.len() {
            0 => Self::intrinsic(TypeFlags::NEVER, "never"),
            1 => types.remove(0),
            _ => Self {
                types,
                ..Self::with_flags(TypeFlags::UNION)
            },
        }
    }

    /// `A & B & ...`.
    pub fn intersection(types: Vec<Type>) -> Self {
        Self {
            types,
            ..Self::with_flags(TypeFlags::INTERSECTION)
        }
    }

    /// Whether this is a union type.
    pub fn is_union(&self) -> bool {
        self.flags.contains(TypeFlags::UNION)
    }

    /// The name of the declaration behind this type, if any.
    pub fn symbol_name(&self) -> Option<&str> {
        self.symbol.as_ref().map(|symbol| symbol.name.as_str())
    }
}

/// Prints the type roughly the way TypeScript would. Only used for diagnostics.
impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = self.intrinsic_name {
            return write!(f, "{}", name);
        }

        if self.flags.contains(TypeFlags::STRING_LITERAL) {
            return write!(f, "\"{}\"", self.text.as_deref().unwrap_or_default());
        }

        if self.flags.intersects(TypeFlags::UNION | TypeFlags::INTERSECTION) {
            let separator = if self.is_union() { " | " } else { " & " };
            for (i, ty) in self.types.iter().enumerate() {
                if i > 0 {
                    write!(f, "{}", separator)?;
                }
                write!(f, "{}", ty)?;
            }
            return Ok(());
        }

        match (self.symbol_name(), self.type_arguments.as_slice()) {
            (Some("Array"), [element]) => write!(f, "{}[]", element),
            (Some(name), []) => write!(f, "{}", name),
            (Some(name), args) => {
                write!(f, "{}<", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            (None, _) => write!(f, "{}", self.text.as_deref().unwrap_or("{}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn union_flattens_and_dedups() {
        let inner = Type::union([Type::number(), Type::string()]);
        let ty = Type::union([inner, Type::number(), Type::boolean()]);

        assert!(ty.is_union());
        assert_eq!(ty.types, vec![Type::number(), Type::string(), Type::boolean()]);
    }

    #[test]
    fn single_member_union_collapses() {
        assert_eq!(Type::union([Type::number(), Type::number()]), Type::number());
    }

    #[test]
    fn display() {
        let map = Type::reference(
            Symbol::new("Map", SymbolKind::Global),
            vec![Type::string(), Type::array(Type::number())],
        );

        assert_eq!(map.to_string(), "Map<string, number[]>");
        assert_eq!(Type::string_literal("a").to_string(), "\"a\"");
        assert_eq!(Type::union([Type::string(), Type::void()]).to_string(), "string | void");
    }
}
