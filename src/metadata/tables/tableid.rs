use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identifiers for the different metadata tables defined in the ECMA-335 specification.
///
/// Each variant represents a specific type of metadata table that can be present in a .NET
/// module. The numeric values correspond to the table IDs as defined in the CLI specification
/// and form the high byte of every [`crate::Token`].
///
/// ## Tables touched by reference import
///
/// ### Scopes
/// - **`Module`**: The module itself, row 1 carries the MVID
/// - **`ModuleRef`**: References to other modules of the same assembly
/// - **`Assembly`**: The assembly manifest, present in the manifest module only
/// - **`AssemblyRef`**: References to other assemblies
/// - **`File`**: Other files of a multi-module assembly
///
/// ### Types
/// - **`TypeDef`**: Type definitions, row 1 is the `<Module>` global class
/// - **`TypeRef`**: Type references, scoped by a resolution scope
/// - **`TypeSpec`**: Constructed types described by a signature blob
/// - **`NestedClass`**: Nested type to enclosing type mapping, sorted by nested type
/// - **`ExportedType`**: Types exported or forwarded by an assembly
///
/// ### Members
/// - **`Field`** / **`FieldPtr`**: Field definitions and their optional indirection
/// - **`MethodDef`** / **`MethodPtr`**: Method definitions and their optional indirection
/// - **`MemberRef`**: References to fields and methods of other scopes
/// - **`MethodSpec`**: Generic method instantiations
/// - **`StandAloneSig`**: Standalone signatures (locals, call sites)
///
/// ## Reference
/// * [ECMA-335 Partition II, Section 22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Metadata Tables
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash, PartialOrd, Ord)]
pub enum TableId {
    /// `Module` table (0x00) - Contains information about the current module.
    Module = 0x00,
    /// `TypeRef` table (0x01) - References to types defined in other scopes.
    TypeRef = 0x01,
    /// `TypeDef` table (0x02) - Definitions of types within this module.
    TypeDef = 0x02,
    /// `FieldPtr` table (0x03) - Indirection into the `Field` table for unoptimized images.
    FieldPtr = 0x03,
    /// `Field` table (0x04) - Field definitions within types.
    Field = 0x04,
    /// `MethodPtr` table (0x05) - Indirection into the `MethodDef` table for unoptimized images.
    MethodPtr = 0x05,
    /// `MethodDef` table (0x06) - Method definitions within types.
    MethodDef = 0x06,
    /// `ParamPtr` table (0x07) - Indirection into the `Param` table.
    ParamPtr = 0x07,
    /// `Param` table (0x08) - Parameter definitions for methods.
    Param = 0x08,
    /// `InterfaceImpl` table (0x09) - Interface implementations by types.
    InterfaceImpl = 0x09,
    /// `MemberRef` table (0x0A) - References to members of other scopes.
    MemberRef = 0x0A,
    /// `Constant` table (0x0B) - Compile-time constant values.
    Constant = 0x0B,
    /// `CustomAttribute` table (0x0C) - Custom attribute applications.
    CustomAttribute = 0x0C,
    /// `FieldMarshal` table (0x0D) - P/Invoke marshalling information for fields.
    FieldMarshal = 0x0D,
    /// `DeclSecurity` table (0x0E) - Declarative security permissions.
    DeclSecurity = 0x0E,
    /// `ClassLayout` table (0x0F) - Memory layout information for types.
    ClassLayout = 0x0F,
    /// `FieldLayout` table (0x10) - Field offsets within types.
    FieldLayout = 0x10,
    /// `StandAloneSig` table (0x11) - Standalone signatures.
    StandAloneSig = 0x11,
    /// `EventMap` table (0x12) - Type-to-event mappings.
    EventMap = 0x12,
    /// `Event` table (0x14) - Event definitions.
    Event = 0x14,
    /// `PropertyMap` table (0x15) - Type-to-property mappings.
    PropertyMap = 0x15,
    /// `Property` table (0x17) - Property definitions.
    Property = 0x17,
    /// `MethodSemantics` table (0x18) - Property/event accessor mappings.
    MethodSemantics = 0x18,
    /// `MethodImpl` table (0x19) - Method implementation mappings.
    MethodImpl = 0x19,
    /// `ModuleRef` table (0x1A) - References to other modules.
    ModuleRef = 0x1A,
    /// `TypeSpec` table (0x1B) - Constructed type specifications.
    TypeSpec = 0x1B,
    /// `ImplMap` table (0x1C) - P/Invoke implementation mappings.
    ImplMap = 0x1C,
    /// `FieldRVA` table (0x1D) - Field initial data locations.
    FieldRVA = 0x1D,
    /// `Assembly` table (0x20) - The assembly manifest.
    Assembly = 0x20,
    /// `AssemblyProcessor` table (0x21) - Unused processor information.
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` table (0x22) - Unused operating system information.
    AssemblyOS = 0x22,
    /// `AssemblyRef` table (0x23) - References to other assemblies.
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` table (0x24) - Unused processor information.
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` table (0x25) - Unused operating system information.
    AssemblyRefOS = 0x25,
    /// `File` table (0x26) - Files belonging to the assembly.
    File = 0x26,
    /// `ExportedType` table (0x27) - Exported and forwarded types.
    ExportedType = 0x27,
    /// `ManifestResource` table (0x28) - Manifest resources.
    ManifestResource = 0x28,
    /// `NestedClass` table (0x29) - Nested type relationships.
    NestedClass = 0x29,
    /// `GenericParam` table (0x2A) - Generic parameter definitions.
    GenericParam = 0x2A,
    /// `MethodSpec` table (0x2B) - Generic method instantiations.
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` table (0x2C) - Generic parameter constraints.
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Maps the high byte of a token back to its table, `None` for unknown kinds
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TableId> {
        TableId::iter().find(|table| *table as u8 == value)
    }

    /// The indirection table that may sit in front of this table, if any
    #[must_use]
    pub fn pointer_table(&self) -> Option<TableId> {
        match self {
            TableId::Field => Some(TableId::FieldPtr),
            TableId::MethodDef => Some(TableId::MethodPtr),
            TableId::Param => Some(TableId::ParamPtr),
            _ => None,
        }
    }
}
