use pretty_assertions::assert_eq;

use cdomain::ast::{
    DeclSpecs, Declaration, DeclarationBody, DeclarationKind, Declarator, SimpleSpecs, Type,
    TypeSpecifier,
};
use cdomain::{DefinitionParser, MergePolicy, ParserConfig, SymbolError, SymbolTable};

fn parse(kind: DeclarationKind, input: &str) -> Declaration {
    let config = ParserConfig::new();
    let mut parser = DefinitionParser::new(input, &config);
    match parser.parse_declaration(kind) {
        Ok(decl) => decl,
        Err(err) => panic!("{kind:?} declaration {input:?} failed to parse: {err}"),
    }
}

#[test]
fn test_restating_a_prototype_merges() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let first = table
        .add_declaration(parse(DeclarationKind::Function, "void f(int i)"), Some("api"), root)
        .unwrap();
    // same prototype, different parameter name and document
    let second = table
        .add_declaration(parse(DeclarationKind::Function, "void f(int j)"), Some("guide"), root)
        .unwrap();
    assert_eq!(first, second);
    assert!(table.diagnostics().is_empty());
    // the newest definition site is remembered
    assert_eq!(table.docname(first), Some("guide"));
}

#[test]
fn test_conflicting_prototypes_are_reported() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let first = table
        .add_declaration(parse(DeclarationKind::Function, "void f(int)"), Some("a"), root)
        .unwrap();
    let second = table
        .add_declaration(
            parse(DeclarationKind::Function, "void f(int arr[static volatile 42])"),
            Some("b"),
            root,
        )
        .unwrap();
    // the earlier declaration wins
    assert_eq!(first, second);
    assert_eq!(table.diagnostics().len(), 1);
    let diag = &table.diagnostics()[0];
    assert_eq!(diag.path, "f");
    assert_eq!(diag.prev_docname.as_deref(), Some("a"));
    assert_eq!(diag.new_docname.as_deref(), Some("b"));
    assert_eq!(
        table.declaration(first).map(|d| d.to_text()),
        Some("void f(int)".to_string())
    );
}

#[test]
fn test_exact_signature_policy_rejects_spelling_changes() {
    let mut table = SymbolTable::with_policy(MergePolicy::ExactSignature);
    let root = table.root();
    table
        .add_declaration(parse(DeclarationKind::Function, "void f(int i)"), Some("a"), root)
        .unwrap();
    table
        .add_declaration(parse(DeclarationKind::Function, "void f(int j)"), Some("b"), root)
        .unwrap();
    assert_eq!(table.diagnostics().len(), 1);
}

#[test]
fn test_anonymous_entities_never_merge() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let first = table
        .add_declaration(parse(DeclarationKind::Struct, "@a"), None, root)
        .unwrap();
    let second = table
        .add_declaration(parse(DeclarationKind::Struct, "@a"), None, root)
        .unwrap();
    assert_ne!(first, second);
    assert!(table.diagnostics().is_empty());
    // lookup resolves through the first of them
    assert_eq!(table.find("@a"), Some(first));
}

#[test]
fn test_intermediate_scopes_are_created_and_completed() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let member = table
        .add_declaration(parse(DeclarationKind::Member, "int A.x"), Some("doc"), root)
        .unwrap();
    let scope = table.find("A").expect("scope symbol exists");
    assert!(table.declaration(scope).is_none());
    assert_eq!(table.find("A.x"), Some(member));
    assert_eq!(table.qualified_name(member), "A.x");

    // a later declaration of A completes the scope symbol in place
    let tag = table
        .add_declaration(parse(DeclarationKind::Struct, "A"), Some("doc"), root)
        .unwrap();
    assert_eq!(tag, scope);
    assert_eq!(
        table.declaration(tag).map(|d| d.to_display()),
        Some("struct A".to_string())
    );
}

#[test]
fn test_rooted_names_register_at_the_global_scope() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let scope = table
        .add_declaration(parse(DeclarationKind::Struct, "A"), None, root)
        .unwrap();
    let inner = table
        .add_declaration(parse(DeclarationKind::Member, "int x"), None, scope)
        .unwrap();
    assert_eq!(table.qualified_name(inner), "A.x");
    // a rooted name ignores the parent scope
    let global = table
        .add_declaration(parse(DeclarationKind::Member, "int .g"), None, scope)
        .unwrap();
    assert_eq!(table.qualified_name(global), "g");
    assert_eq!(table.find("g"), Some(global));
}

#[test]
fn test_resolve_id_across_scheme_versions() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let f = table
        .add_declaration(parse(DeclarationKind::Function, "void f(int i)"), None, root)
        .unwrap();
    assert_eq!(table.resolve_id("c.f"), Some(f));
    assert_eq!(table.resolve_id("Cv2.f(int)"), Some(f));
    assert_eq!(table.resolve_id("Cv2.f(double)"), None);
    assert_eq!(table.resolve_id("c.g"), None);
}

#[test]
fn test_children_are_recorded_in_order() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let e = table
        .add_declaration(parse(DeclarationKind::Enum, "E"), None, root)
        .unwrap();
    let a = table
        .add_declaration(parse(DeclarationKind::Enumerator, "A"), None, e)
        .unwrap();
    let b = table
        .add_declaration(parse(DeclarationKind::Enumerator, "B = 42"), None, e)
        .unwrap();
    assert_eq!(table.children(e), [a, b].as_slice());
    assert_eq!(table.qualified_name(b), "E.B");
}

#[test]
fn test_unnamed_declarations_are_rejected() {
    let decl = Declaration {
        kind: DeclarationKind::Type,
        body: DeclarationBody::Type(Type {
            specs: DeclSpecs {
                left: SimpleSpecs::default(),
                type_spec: Some(TypeSpecifier::Fundamental("int".to_string())),
                right: SimpleSpecs::default(),
            },
            declarator: Declarator::Name {
                name: None,
                arrays: Vec::new(),
                params: None,
            },
        }),
        semicolon: false,
    };
    let mut table = SymbolTable::new();
    let root = table.root();
    assert_eq!(
        table.add_declaration(decl, None, root),
        Err(SymbolError::Unnamed)
    );
}
