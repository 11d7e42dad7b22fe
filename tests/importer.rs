//! Integration tests for importing references between assemblies.
//!
//! Each scenario builds a small set of images the way a linker would see them: a source
//! assembly whose code is being moved, a destination assembly receiving it, and sometimes a
//! third assembly both of them reference.

use dotlink::prelude::*;
use uguid::{guid, Guid};

const LIB_MVID: Guid = guid!("0d9b3a44-1c2e-4f5a-8b6c-7d8e9fa0b1c2");
const APP_MVID: Guid = guid!("6f1e2d3c-4b5a-4968-8776-a5b4c3d2e1f0");
const PART_MVID: Guid = guid!("9a8b7c6d-5e4f-4a3b-9c2d-1e0f2a3b4c5d");

fn version() -> AssemblyVersion {
    AssemblyVersion::new(1, 0, 0, 0)
}

/// An empty destination assembly "App" with the types `App.Existing` and `App.Existing/Inner`
fn app_assembly() -> Result<(Image, Token, Token)> {
    let mut builder = ImageBuilder::new("App.exe", APP_MVID)?;
    builder.assembly(&AssemblyIdentity::new("App", version()))?;
    let existing = builder.type_def("App", "Existing", 0)?;
    let inner = builder.nested_type_def(existing, "Inner", 0)?;
    Ok((builder.build(), existing, inner))
}

/// Test importing a type and one of its methods from a strong-named library.
/// The destination gains an AssemblyRef carrying the library's public key token.
#[test]
fn test_import_type_and_method_from_strong_named_library() -> Result<()> {
    let mut lib = ImageBuilder::new("Lib.dll", LIB_MVID)?;
    lib.assembly(&AssemblyIdentity::new("Lib", version()).with_public_key(&ECMA_PUBLIC_KEY))?;
    let widget = lib.type_def("Lib", "Widget", 0)?;
    // instance class Lib.Widget Clone()
    let clone = lib.method("Clone", &[0x20, 0x00, 0x12, 0x08], 0)?;
    let lib = lib.build();

    let (app, _, _) = app_assembly()?;
    let context = ImportContext::new(lib.clone(), lib, app.clone(), app.clone())
        .with_source_assembly_hash(&[0xAA, 0xBB]);

    let mut added = Vec::new();
    let type_ref = context.import_reference_to_type_def_or_ref_or_spec(widget, &mut |t| {
        added.push(t)
    })?;
    let member_ref = context.import_member(clone, type_ref, &mut |t| added.push(t))?;

    let assembly_ref = app.get_token(type_ref, Column::TypeRefResolutionScope)?;
    assert!(assembly_ref.is_table(TableId::AssemblyRef));
    assert_eq!(app.get_string(assembly_ref, Column::AssemblyRefName)?, "Lib");
    assert_eq!(
        app.get_blob(assembly_ref, Column::AssemblyRefPublicKeyOrToken)?,
        vec![0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89]
    );
    assert_eq!(
        app.get_blob(assembly_ref, Column::AssemblyRefHashValue)?,
        vec![0xAA, 0xBB]
    );

    assert_eq!(
        app.get_blob(member_ref, Column::MemberRefSignature)?,
        vec![0x20, 0x00, 0x12, 0x05]
    );
    assert_eq!(added, vec![assembly_ref, type_ref, member_ref]);
    Ok(())
}

/// Test that a nested type definition is imported as a chain of TypeRefs, and that importing
/// it again creates nothing new.
#[test]
fn test_import_nested_type_twice() -> Result<()> {
    let mut lib = ImageBuilder::new("Lib.dll", LIB_MVID)?;
    lib.assembly(&AssemblyIdentity::new("Lib", version()))?;
    let outer = lib.type_def("Lib", "Outer", 0)?;
    let inner = lib.nested_type_def(outer, "Inner", 0)?;
    let lib = lib.build();

    let (app, _, _) = app_assembly()?;
    let context = ImportContext::new(lib.clone(), lib, app.clone(), app.clone());

    let mut added = Vec::new();
    let first = context.import_reference_to_type_def(inner, false, &mut |t| added.push(t))?;
    let second = context.import_reference_to_type_def(inner, false, &mut |t| added.push(t))?;
    assert_eq!(first, second);
    assert_eq!(added.len(), 3);

    let outer_ref = app.get_token(first, Column::TypeRefResolutionScope)?;
    assert!(outer_ref.is_table(TableId::TypeRef));
    assert_eq!(app.get_string(outer_ref, Column::TypeRefName)?, "Outer");
    assert_eq!(app.get_string(first, Column::TypeRefNamespace)?, "");
    Ok(())
}

/// Test a library reference that points back at the destination assembly: it resolves to the
/// destination's own type definitions instead of creating a self reference.
#[test]
fn test_reference_back_into_destination_resolves_to_definition() -> Result<()> {
    let (app, existing, inner) = app_assembly()?;

    let mut lib = ImageBuilder::new("Lib.dll", LIB_MVID)?;
    lib.assembly(&AssemblyIdentity::new("Lib", version()))?;
    let to_app = lib.assembly_ref(&AssemblyIdentity::new("App", version()))?;
    let existing_ref = lib.type_ref(to_app, "App", "Existing")?;
    let inner_ref = lib.type_ref(existing_ref, "", "Inner")?;
    let missing_ref = lib.type_ref(to_app, "App", "Missing")?;
    let lib = lib.build();

    let context = ImportContext::new(lib.clone(), lib, app.clone(), app.clone());
    let mut added = Vec::new();

    assert_eq!(
        context.import_reference_to_type_ref(existing_ref, &mut |t| added.push(t))?,
        existing
    );
    assert_eq!(
        context.import_reference_to_type_ref(inner_ref, &mut |t| added.push(t))?,
        inner
    );
    assert!(added.is_empty());
    assert_eq!(app.row_count(TableId::AssemblyRef)?, 0);

    assert!(matches!(
        context.import_reference_to_type_ref(missing_ref, &mut |_| {}),
        Err(Error::RecordNotFound(_))
    ));
    Ok(())
}

/// Test a library reference to a third assembly: the AssemblyRef is copied without its hash.
#[test]
fn test_reference_to_third_assembly_is_copied() -> Result<()> {
    let mut lib = ImageBuilder::new("Lib.dll", LIB_MVID)?;
    lib.assembly(&AssemblyIdentity::new("Lib", version()))?;
    let corlib = lib.assembly_ref(
        &AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0))
            .with_public_key_token(StrongNameToken::from_public_key(&ECMA_PUBLIC_KEY)?),
    )?;
    let object = lib.type_ref(corlib, "System", "Object")?;
    let lib = lib.build();

    let (app, _, _) = app_assembly()?;
    let context = ImportContext::new(lib.clone(), lib, app.clone(), app.clone());

    let type_ref = context.import_reference_to_type_ref(object, &mut |_| {})?;
    let scope = app.get_token(type_ref, Column::TypeRefResolutionScope)?;
    assert_eq!(app.get_string(scope, Column::AssemblyRefName)?, "mscorlib");
    assert_eq!(app.get_constant(scope, Column::AssemblyRefMajorVersion)?, 4);
    assert!(app.get_blob(scope, Column::AssemblyRefHashValue)?.is_empty());

    // a reference that already names the same assembly is found, not duplicated
    let again = context.import_reference_to_type_ref(object, &mut |_| {})?;
    assert_eq!(again, type_ref);
    assert_eq!(app.row_count(TableId::AssemblyRef)?, 1);
    Ok(())
}

/// Test a TypeRef with a Nil scope that the library forwards to another assembly through its
/// ExportedType table.
#[test]
fn test_nil_scope_follows_type_forwarder() -> Result<()> {
    let mut lib = ImageBuilder::new("Lib.dll", LIB_MVID)?;
    lib.assembly(&AssemblyIdentity::new("Lib", version()))?;
    let moved_to = lib.assembly_ref(&AssemblyIdentity::new("Lib.Core", version()))?;
    lib.exported_type("Lib", "Moved", moved_to)?;
    let moved = lib.type_ref(Token::new(0), "Lib", "Moved")?;
    let local = lib.type_def("Lib", "Local", 0)?;
    let local_ref = lib.type_ref(Token::new(0), "Lib", "Local")?;
    let unknown = lib.type_ref(Token::new(0), "Lib", "Unknown")?;
    let lib = lib.build();

    let (app, _, _) = app_assembly()?;
    let context = ImportContext::new(lib.clone(), lib, app.clone(), app.clone());

    let type_ref = context.import_reference_to_type_ref(moved, &mut |_| {})?;
    let scope = app.get_token(type_ref, Column::TypeRefResolutionScope)?;
    assert_eq!(app.get_string(scope, Column::AssemblyRefName)?, "Lib.Core");

    // a Nil scope for a type the library defines itself names the library
    let type_ref = context.import_reference_to_type_ref(local_ref, &mut |_| {})?;
    let scope = app.get_token(type_ref, Column::TypeRefResolutionScope)?;
    assert_eq!(app.get_string(scope, Column::AssemblyRefName)?, "Lib");
    assert_eq!(
        context.import_reference_to_type_def(local, false, &mut |_| {})?,
        type_ref
    );

    assert!(matches!(
        context.import_reference_to_type_ref(unknown, &mut |_| {}),
        Err(Error::RecordNotFound(_))
    ));
    Ok(())
}

/// Test importing a generic instantiation: the TypeSpec is rebuilt with translated tokens.
#[test]
fn test_import_generic_instance_type_spec() -> Result<()> {
    let mut lib = ImageBuilder::new("Lib.dll", LIB_MVID)?;
    lib.assembly(&AssemblyIdentity::new("Lib", version()))?;
    let list = lib.type_def("Lib", "List`1", 0)?;
    let widget = lib.type_def("Lib", "Widget", 0)?;
    assert_eq!(list.row(), 2);
    assert_eq!(widget.row(), 3);
    // Lib.List`1<class Lib.Widget>
    let spec = lib.type_spec(&[0x15, 0x12, 0x08, 0x01, 0x12, 0x0C])?;
    let lib = lib.build();

    let (app, _, _) = app_assembly()?;
    let context = ImportContext::new(lib.clone(), lib, app.clone(), app.clone());

    let mut added = Vec::new();
    let imported = context.import_reference_to_type_def_or_ref_or_spec(spec, &mut |t| {
        added.push(t)
    })?;
    assert!(imported.is_table(TableId::TypeSpec));
    // AssemblyRef 1, TypeRef 1 (List`1), TypeRef 2 (Widget), TypeSpec 1
    assert_eq!(
        app.get_blob(imported, Column::TypeSpecSignature)?,
        vec![0x15, 0x12, 0x05, 0x01, 0x12, 0x09]
    );
    assert_eq!(added.len(), 4);

    // type specifications are never shared
    let again = context.import_reference_to_type_def_or_ref_or_spec(spec, &mut |_| {})?;
    assert_ne!(again, imported);
    Ok(())
}

/// Test moving code between two modules of one assembly: definitions of the source module
/// are reached through a ModuleRef and no AssemblyRef is created.
#[test]
fn test_import_between_modules_of_one_assembly() -> Result<()> {
    let (app, existing, _) = app_assembly()?;

    let mut part = ImageBuilder::new("App.Part.netmodule", PART_MVID)?;
    let helper = part.type_def("App", "Helper", 0)?;
    let back = part.module_ref("App.exe")?;
    let existing_ref = part.type_ref(back, "App", "Existing")?;
    let part = part.build();

    let context = ImportContext::new(app.clone(), part, app.clone(), app.clone());

    let helper_ref = context.import_reference_to_type_def(helper, false, &mut |_| {})?;
    let scope = app.get_token(helper_ref, Column::TypeRefResolutionScope)?;
    assert!(scope.is_table(TableId::ModuleRef));
    assert_eq!(app.get_string(scope, Column::ModuleRefName)?, "App.Part.netmodule");

    assert_eq!(
        context.import_reference_to_type_ref(existing_ref, &mut |_| {})?,
        existing
    );
    assert_eq!(app.row_count(TableId::AssemblyRef)?, 0);
    Ok(())
}

/// Test the signature depth option on a deeply nested pointer type.
#[test]
fn test_signature_depth_option() -> Result<()> {
    let (app, _, _) = app_assembly()?;

    let mut blob = vec![0x06];
    blob.extend(std::iter::repeat(0x0F).take(20));
    blob.push(0x08);

    let strict = ImportContext::new(app.clone(), app.clone(), app.clone(), app.clone())
        .with_options(ImportOptions::new().with_max_signature_depth(8));
    assert!(matches!(
        strict.import_signature(&blob, &mut |_| {}),
        Err(Error::RecursionLimit(8))
    ));

    let relaxed = ImportContext::new(app.clone(), app.clone(), app.clone(), app);
    assert_eq!(relaxed.import_signature(&blob, &mut |_| {})?, blob);
    Ok(())
}
