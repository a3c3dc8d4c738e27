//! Declaration-side nodes: attributes, specifiers, declarators, and the
//! top-level [`Declaration`].
//!
//! Rendering follows fixed normalization rules so that any accepted input has
//! exactly one canonical spelling:
//!
//! - decl-spec qualifiers order as `restrict volatile const`, attributes
//!   first, then storage class, `_Thread_local`/`thread_local` (spelling
//!   preserved), `inline`;
//! - array qualifiers order as `static restrict volatile const`;
//! - pointer attributes come before pointer qualifiers;
//! - list separators are `", "`, bit-fields are spelled `name : width`.

use super::expr::Expr;
use super::{NestedName, Render};

/// One entry inside `__attribute__((...))`.
#[derive(Debug, Clone, PartialEq)]
pub struct GnuAttribute {
    pub name: String,
    pub args: Option<Vec<Expr>>,
}

impl GnuAttribute {
    fn write(&self, out: &mut String, mode: Render) {
        out.push_str(&self.name);
        if let Some(args) = &self.args {
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                arg.write(out, mode);
            }
            out.push(')');
        }
    }
}

/// An attribute in decl-spec or declarator position.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// `[[...]]` with the balanced interior kept verbatim.
    Cpp(String),
    Gnu(Vec<GnuAttribute>),
    /// A bare identifier registered through
    /// [`ParserConfig::id_attributes`](crate::ParserConfig).
    Id(String),
    /// A registered identifier followed by a balanced parenthesized argument,
    /// kept verbatim.
    Paren { name: String, arg: String },
}

impl Attribute {
    fn write(&self, out: &mut String, mode: Render) {
        match self {
            Attribute::Cpp(arg) => {
                out.push_str("[[");
                out.push_str(arg);
                out.push_str("]]");
            }
            Attribute::Gnu(attrs) => {
                out.push_str("__attribute__((");
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    attr.write(out, mode);
                }
                out.push_str("))");
            }
            Attribute::Id(name) => out.push_str(name),
            Attribute::Paren { name, arg } => {
                out.push_str(name);
                out.push('(');
                out.push_str(arg);
                out.push(')');
            }
        }
    }
}

/// Storage class, qualifiers, and attributes on one side of the type
/// specifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleSpecs {
    pub attrs: Vec<Attribute>,
    /// `auto`, `register`, `static`, or `extern`.
    pub storage: Option<&'static str>,
    /// `thread_local` or `_Thread_local`, spelling preserved.
    pub thread_local: Option<String>,
    pub inline: bool,
    pub restrict: bool,
    pub volatile: bool,
    pub const_: bool,
}

impl SimpleSpecs {
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
            && self.storage.is_none()
            && self.thread_local.is_none()
            && !self.inline
            && !self.restrict
            && !self.volatile
            && !self.const_
    }

    fn write(&self, out: &mut String, mode: Render) {
        let start = out.len();
        let sep = |out: &mut String| {
            if out.len() > start {
                out.push(' ');
            }
        };
        if mode != Render::IdText {
            for attr in &self.attrs {
                sep(out);
                attr.write(out, mode);
            }
        }
        if let Some(storage) = self.storage {
            sep(out);
            out.push_str(storage);
        }
        if let Some(tl) = &self.thread_local {
            sep(out);
            out.push_str(tl);
        }
        if self.inline {
            sep(out);
            out.push_str("inline");
        }
        if self.restrict {
            sep(out);
            out.push_str("restrict");
        }
        if self.volatile {
            sep(out);
            out.push_str("volatile");
        }
        if self.const_ {
            sep(out);
            out.push_str("const");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Struct,
    Union,
    Enum,
}

impl Tag {
    pub fn keyword(self) -> &'static str {
        match self {
            Tag::Struct => "struct",
            Tag::Union => "union",
            Tag::Enum => "enum",
        }
    }
}

/// The type-specifier core of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpecifier {
    /// Builtin type words joined by single spaces, e.g. `unsigned long int`.
    Fundamental(String),
    /// A user type, optionally tagged: `struct foo`, `A.B`.
    Named {
        tag: Option<Tag>,
        name: NestedName,
    },
}

impl TypeSpecifier {
    fn write(&self, out: &mut String, mode: Render) {
        match self {
            TypeSpecifier::Fundamental(words) => out.push_str(words),
            TypeSpecifier::Named { tag, name } => {
                if let Some(tag) = tag {
                    out.push_str(tag.keyword());
                    out.push(' ');
                }
                name.write(out, mode);
            }
        }
    }
}

/// Left specs, type specifier, right specs.  The right specs are only
/// meaningful (and only rendered) when a type specifier is present.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclSpecs {
    pub left: SimpleSpecs,
    pub type_spec: Option<TypeSpecifier>,
    pub right: SimpleSpecs,
}

impl DeclSpecs {
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.type_spec.is_none() && self.right.is_empty()
    }

    fn write(&self, out: &mut String, mode: Render) {
        let start = out.len();
        self.left.write(out, mode);
        if let Some(spec) = &self.type_spec {
            if out.len() > start {
                out.push(' ');
            }
            spec.write(out, mode);
            let before_right = out.len();
            out.push(' ');
            self.right.write(out, mode);
            if out.len() == before_right + 1 {
                out.truncate(before_right);
            }
        }
    }
}

/// One `[...]` array suffix on a declarator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySuffix {
    pub static_: bool,
    pub restrict: bool,
    pub volatile: bool,
    pub const_: bool,
    /// `[*]` variable-length form; mutually exclusive with `size`.
    pub vla: bool,
    pub size: Option<Expr>,
}

impl ArraySuffix {
    fn write(&self, out: &mut String, mode: Render) {
        out.push('[');
        let mut first = true;
        let mut sep = |out: &mut String| {
            if !first {
                out.push(' ');
            }
            first = false;
        };
        if self.static_ {
            sep(out);
            out.push_str("static");
        }
        if self.restrict {
            sep(out);
            out.push_str("restrict");
        }
        if self.volatile {
            sep(out);
            out.push_str("volatile");
        }
        if self.const_ {
            sep(out);
            out.push_str("const");
        }
        if self.vla {
            out.push('*');
        } else if let Some(size) = &self.size {
            sep(out);
            size.write(out, mode);
        }
        out.push(']');
    }
}

/// One function parameter: a typed argument or `...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub arg: Option<TypeWithInit>,
    pub ellipsis: bool,
}

impl Parameter {
    fn write(&self, out: &mut String, mode: Render) {
        if self.ellipsis {
            out.push_str("...");
        } else if let Some(arg) = &self.arg {
            arg.write(out, mode);
        }
    }
}

/// A parenthesized parameter list with optional trailing attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub params: Vec<Parameter>,
    pub attrs: Vec<Attribute>,
}

impl Parameters {
    fn write(&self, out: &mut String, mode: Render) {
        out.push('(');
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            param.write(out, mode);
        }
        out.push(')');
        if mode != Render::IdText {
            for attr in &self.attrs {
                out.push(' ');
                attr.write(out, mode);
            }
        }
    }
}

/// The declarator chain: what wraps the declared name.
#[derive(Debug, Clone, PartialEq)]
pub enum Declarator {
    /// `name[arrays](params)`; all parts optional for abstract declarators.
    Name {
        name: Option<NestedName>,
        arrays: Vec<ArraySuffix>,
        params: Option<Parameters>,
    },
    /// `name : width`.
    BitField {
        name: NestedName,
        size: Expr,
    },
    /// `*` with qualifiers and attributes, wrapping the rest of the chain.
    Ptr {
        restrict: bool,
        volatile: bool,
        const_: bool,
        attrs: Vec<Attribute>,
        inner: Box<Declarator>,
    },
    /// `(inner)suffix`, for pointer-to-function and friends.
    Paren {
        inner: Box<Declarator>,
        suffix: Box<Declarator>,
    },
}

impl Declarator {
    /// The declared name, however deeply wrapped.
    pub fn name(&self) -> Option<&NestedName> {
        match self {
            Declarator::Name { name, .. } => name.as_ref(),
            Declarator::BitField { name, .. } => Some(name),
            Declarator::Ptr { inner, .. } => inner.name(),
            Declarator::Paren { inner, .. } => inner.name(),
        }
    }

    /// The parameter list belonging to the declared name, skipping parameter
    /// lists of outer function-pointer wrappers.
    pub fn inner_params(&self) -> Option<&Parameters> {
        match self {
            Declarator::Name { params, .. } => params.as_ref(),
            Declarator::BitField { .. } => None,
            Declarator::Ptr { inner, .. } => inner.inner_params(),
            Declarator::Paren { inner, .. } => inner.inner_params(),
        }
    }

    /// Whether a space must separate the decl-specs from this declarator.
    pub(crate) fn require_leading_space(&self, mode: Render) -> bool {
        match self {
            Declarator::Name { name, .. } => name.is_some() && mode != Render::IdText,
            Declarator::BitField { .. } => true,
            Declarator::Ptr {
                restrict,
                volatile,
                const_,
                attrs,
                inner,
            } => {
                *restrict
                    || *volatile
                    || *const_
                    || (!attrs.is_empty() && mode != Render::IdText)
                    || inner.require_leading_space(mode)
            }
            Declarator::Paren { .. } => true,
        }
    }

    fn write(&self, out: &mut String, mode: Render) {
        match self {
            Declarator::Name { name, arrays, params } => {
                if mode != Render::IdText {
                    if let Some(name) = name {
                        name.write(out, mode);
                    }
                }
                for array in arrays {
                    array.write(out, mode);
                }
                if let Some(params) = params {
                    params.write(out, mode);
                }
            }
            Declarator::BitField { name, size } => {
                if mode != Render::IdText {
                    name.write(out, mode);
                    out.push_str(" : ");
                } else {
                    out.push_str(": ");
                }
                size.write(out, mode);
            }
            Declarator::Ptr {
                restrict,
                volatile,
                const_,
                attrs,
                inner,
            } => {
                out.push('*');
                let has_attrs = !attrs.is_empty() && mode != Render::IdText;
                if has_attrs {
                    for attr in attrs {
                        attr.write(out, mode);
                    }
                }
                let has_quals = *restrict || *volatile || *const_;
                if has_attrs && has_quals {
                    out.push(' ');
                }
                let mut first = true;
                let mut sep = |out: &mut String| {
                    if !first {
                        out.push(' ');
                    }
                    first = false;
                };
                if *restrict {
                    sep(out);
                    out.push_str("restrict");
                }
                if *volatile {
                    sep(out);
                    out.push_str("volatile");
                }
                if *const_ {
                    sep(out);
                    out.push_str("const");
                }
                if (has_quals || has_attrs) && inner.require_leading_space(mode) {
                    out.push(' ');
                }
                inner.write(out, mode);
            }
            Declarator::Paren { inner, suffix } => {
                out.push('(');
                inner.write(out, mode);
                out.push(')');
                suffix.write(out, mode);
            }
        }
    }
}

/// Decl-specs plus a declarator: a complete type, possibly naming something.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub specs: DeclSpecs,
    pub declarator: Declarator,
}

impl Type {
    pub fn name(&self) -> Option<&NestedName> {
        if let Some(name) = self.declarator.name() {
            return Some(name);
        }
        match &self.specs.type_spec {
            Some(TypeSpecifier::Named { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// True for the single-identifier form of a type alias (`T` with no
    /// specifiers, arrays, or parameters).
    pub fn is_bare_name(&self) -> bool {
        self.specs.is_empty()
            && matches!(
                &self.declarator,
                Declarator::Name { name: Some(_), arrays, params: None } if arrays.is_empty()
            )
    }

    pub(crate) fn write(&self, out: &mut String, mode: Render) {
        let start = out.len();
        self.specs.write(out, mode);
        if out.len() > start && self.declarator.require_leading_space(mode) {
            out.push(' ');
        }
        self.declarator.write(out, mode);
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, Render::Canonical);
        out
    }
}

/// ` = value` after a member or parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Initializer {
    pub value: Expr,
}

impl Initializer {
    fn write(&self, out: &mut String, mode: Render) {
        out.push_str(" = ");
        self.value.write(out, mode);
    }
}

/// A type with an optional initializer.  Initializers never contribute to
/// identifier encodings.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeWithInit {
    pub ty: Type,
    pub init: Option<Initializer>,
}

impl TypeWithInit {
    pub fn name(&self) -> Option<&NestedName> {
        self.ty.name()
    }

    fn write(&self, out: &mut String, mode: Render) {
        self.ty.write(out, mode);
        if mode != Render::IdText {
            if let Some(init) = &self.init {
                init.write(out, mode);
            }
        }
    }
}

/// One macro parameter: `name`, `...`, or the GNU variadic `name...`.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroParameter {
    pub name: Option<NestedName>,
    pub ellipsis: bool,
    pub variadic: bool,
}

impl MacroParameter {
    fn write(&self, out: &mut String, mode: Render) {
        if self.ellipsis {
            out.push_str("...");
            return;
        }
        if let Some(name) = &self.name {
            name.write(out, mode);
        }
        if self.variadic {
            out.push_str("...");
        }
    }
}

/// An object-like or function-like macro signature.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroDef {
    pub name: NestedName,
    pub params: Option<Vec<MacroParameter>>,
}

impl MacroDef {
    fn write(&self, out: &mut String, mode: Render) {
        self.name.write(out, mode);
        if let Some(params) = &self.params {
            out.push('(');
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                param.write(out, mode);
            }
            out.push(')');
        }
    }
}

/// The kind-specific payload of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationBody {
    Type(Type),
    Member(TypeWithInit),
    Function(Type),
    Macro(MacroDef),
    Tag { tag: Tag, name: NestedName },
    Enumerator {
        name: NestedName,
        init: Option<Initializer>,
    },
}

impl DeclarationBody {
    fn write(&self, out: &mut String, mode: Render) {
        match self {
            DeclarationBody::Type(ty) | DeclarationBody::Function(ty) => ty.write(out, mode),
            DeclarationBody::Member(twi) => twi.write(out, mode),
            DeclarationBody::Macro(m) => m.write(out, mode),
            DeclarationBody::Tag { name, .. } => name.write(out, mode),
            DeclarationBody::Enumerator { name, init } => {
                name.write(out, mode);
                if mode != Render::IdText {
                    if let Some(init) = init {
                        init.write(out, mode);
                    }
                }
            }
        }
    }
}

/// The declaration kinds the parser has entry points for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Type,
    Member,
    Function,
    Macro,
    Struct,
    Union,
    Enum,
    Enumerator,
}

/// A fully parsed declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub body: DeclarationBody,
    /// A trailing `;` was spelled and is reproduced on rendering.
    pub semicolon: bool,
}

impl Declaration {
    /// The declared name, if the declaration names anything.
    pub fn name(&self) -> Option<&NestedName> {
        match &self.body {
            DeclarationBody::Type(ty) | DeclarationBody::Function(ty) => ty.name(),
            DeclarationBody::Member(twi) => twi.name(),
            DeclarationBody::Macro(m) => Some(&m.name),
            DeclarationBody::Tag { name, .. } => Some(name),
            DeclarationBody::Enumerator { name, .. } => Some(name),
        }
    }

    /// The function parameter list, for function declarations.
    pub fn function_params(&self) -> Option<&Parameters> {
        match &self.body {
            DeclarationBody::Function(ty) => ty.declarator.inner_params(),
            _ => None,
        }
    }

    /// Canonical text: parsing it again yields an equal declaration.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.body.write(&mut out, Render::Canonical);
        if self.semicolon {
            out.push(';');
        }
        out
    }

    /// Human-facing text: object-keyword prefixes and `[anonymous]` names.
    pub fn to_display(&self) -> String {
        let mut out = String::new();
        match (self.kind, &self.body) {
            (DeclarationKind::Type, DeclarationBody::Type(ty)) => {
                if ty.is_bare_name() {
                    out.push_str("type ");
                } else {
                    out.push_str("typedef ");
                }
            }
            (DeclarationKind::Struct, _) => out.push_str("struct "),
            (DeclarationKind::Union, _) => out.push_str("union "),
            (DeclarationKind::Enum, _) => out.push_str("enum "),
            (DeclarationKind::Enumerator, _) => out.push_str("enumerator "),
            _ => {}
        }
        self.body.write(&mut out, Render::Display);
        if self.semicolon {
            out.push(';');
        }
        out
    }
}

impl std::fmt::Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Identifier;

    fn name(s: &str) -> NestedName {
        NestedName::new(false, vec![Identifier::new(s)])
    }

    fn int_specs() -> DeclSpecs {
        DeclSpecs {
            left: SimpleSpecs::default(),
            type_spec: Some(TypeSpecifier::Fundamental("int".into())),
            right: SimpleSpecs::default(),
        }
    }

    #[test]
    fn test_pointer_attr_before_quals() {
        let ty = Type {
            specs: int_specs(),
            declarator: Declarator::Ptr {
                restrict: false,
                volatile: true,
                const_: true,
                attrs: vec![Attribute::Cpp("attr".into())],
                inner: Box::new(Declarator::Name {
                    name: Some(name("i")),
                    arrays: vec![],
                    params: None,
                }),
            },
        };
        assert_eq!(ty.to_text(), "int *[[attr]] volatile const i");
    }

    #[test]
    fn test_vla_suffix_has_no_space_before_star() {
        let mut arr = ArraySuffix::default();
        arr.const_ = true;
        arr.vla = true;
        let mut out = String::new();
        arr.write(&mut out, Render::Canonical);
        assert_eq!(out, "[const*]");
    }

    #[test]
    fn test_bare_name_type_display() {
        let decl = Declaration {
            kind: DeclarationKind::Type,
            body: DeclarationBody::Type(Type {
                specs: DeclSpecs {
                    left: SimpleSpecs::default(),
                    type_spec: None,
                    right: SimpleSpecs::default(),
                },
                declarator: Declarator::Name {
                    name: Some(name("T")),
                    arrays: vec![],
                    params: None,
                },
            }),
            semicolon: false,
        };
        assert_eq!(decl.to_text(), "T");
        assert_eq!(decl.to_display(), "type T");
    }
}
