//! Column addressing for the modeled metadata tables.
//!
//! Every column the importer reads or writes is named by a [`Column`] variant. A column knows
//! the table it belongs to, its position inside the row and the [`ColumnKind`] of the values it
//! stores, which the storage engines use to route values to the right heap and to validate
//! token columns against their coded index.

use crate::metadata::tables::{CodedIndexType, TableId};

/// The kind of value a column stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// A 16- or 32-bit constant (flags, versions, counters)
    Constant,
    /// An index into the `#Strings` heap
    String,
    /// An index into the `#Blob` heap
    Blob,
    /// An index into the `#GUID` heap
    Guid,
    /// A simple index into one table
    Table(TableId),
    /// A coded index into one of several tables
    Coded(CodedIndexType),
    /// The first row of a run of rows owned by the parent row
    List(TableId),
}

#[allow(missing_docs)]
/// Columns of the tables modeled by this crate, named `<Table><Column>` after ECMA-335 II.22
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ModuleGeneration,
    ModuleName,
    ModuleMvid,

    TypeRefResolutionScope,
    TypeRefName,
    TypeRefNamespace,

    TypeDefFlags,
    TypeDefName,
    TypeDefNamespace,
    TypeDefExtends,
    TypeDefFieldList,
    TypeDefMethodList,

    FieldPtrField,

    FieldFlags,
    FieldName,
    FieldSignature,

    MethodPtrMethod,

    MethodDefRva,
    MethodDefImplFlags,
    MethodDefFlags,
    MethodDefName,
    MethodDefSignature,
    MethodDefParamList,

    ParamPtrParam,

    ParamFlags,
    ParamSequence,
    ParamName,

    MemberRefClass,
    MemberRefName,
    MemberRefSignature,

    StandAloneSigSignature,

    ModuleRefName,

    TypeSpecSignature,

    AssemblyHashAlgId,
    AssemblyMajorVersion,
    AssemblyMinorVersion,
    AssemblyBuildNumber,
    AssemblyRevisionNumber,
    AssemblyFlags,
    AssemblyPublicKey,
    AssemblyName,
    AssemblyCulture,

    AssemblyRefMajorVersion,
    AssemblyRefMinorVersion,
    AssemblyRefBuildNumber,
    AssemblyRefRevisionNumber,
    AssemblyRefFlags,
    AssemblyRefPublicKeyOrToken,
    AssemblyRefName,
    AssemblyRefCulture,
    AssemblyRefHashValue,

    FileFlags,
    FileName,
    FileHashValue,

    ExportedTypeFlags,
    ExportedTypeTypeDefId,
    ExportedTypeName,
    ExportedTypeNamespace,
    ExportedTypeImplementation,

    NestedClassNestedClass,
    NestedClassEnclosingClass,

    MethodSpecMethod,
    MethodSpecInstantiation,
}

impl Column {
    /// The columns of `table` in row order, empty for tables this crate does not model
    #[must_use]
    pub fn layout(table: TableId) -> &'static [Column] {
        use Column::*;

        match table {
            TableId::Module => &[ModuleGeneration, ModuleName, ModuleMvid],
            TableId::TypeRef => &[TypeRefResolutionScope, TypeRefName, TypeRefNamespace],
            TableId::TypeDef => &[
                TypeDefFlags,
                TypeDefName,
                TypeDefNamespace,
                TypeDefExtends,
                TypeDefFieldList,
                TypeDefMethodList,
            ],
            TableId::FieldPtr => &[FieldPtrField],
            TableId::Field => &[FieldFlags, FieldName, FieldSignature],
            TableId::MethodPtr => &[MethodPtrMethod],
            TableId::MethodDef => &[
                MethodDefRva,
                MethodDefImplFlags,
                MethodDefFlags,
                MethodDefName,
                MethodDefSignature,
                MethodDefParamList,
            ],
            TableId::ParamPtr => &[ParamPtrParam],
            TableId::Param => &[ParamFlags, ParamSequence, ParamName],
            TableId::MemberRef => &[MemberRefClass, MemberRefName, MemberRefSignature],
            TableId::StandAloneSig => &[StandAloneSigSignature],
            TableId::ModuleRef => &[ModuleRefName],
            TableId::TypeSpec => &[TypeSpecSignature],
            TableId::Assembly => &[
                AssemblyHashAlgId,
                AssemblyMajorVersion,
                AssemblyMinorVersion,
                AssemblyBuildNumber,
                AssemblyRevisionNumber,
                AssemblyFlags,
                AssemblyPublicKey,
                AssemblyName,
                AssemblyCulture,
            ],
            TableId::AssemblyRef => &[
                AssemblyRefMajorVersion,
                AssemblyRefMinorVersion,
                AssemblyRefBuildNumber,
                AssemblyRefRevisionNumber,
                AssemblyRefFlags,
                AssemblyRefPublicKeyOrToken,
                AssemblyRefName,
                AssemblyRefCulture,
                AssemblyRefHashValue,
            ],
            TableId::File => &[FileFlags, FileName, FileHashValue],
            TableId::ExportedType => &[
                ExportedTypeFlags,
                ExportedTypeTypeDefId,
                ExportedTypeName,
                ExportedTypeNamespace,
                ExportedTypeImplementation,
            ],
            TableId::NestedClass => &[NestedClassNestedClass, NestedClassEnclosingClass],
            TableId::MethodSpec => &[MethodSpecMethod, MethodSpecInstantiation],
            _ => &[],
        }
    }

    /// The column a table is sorted by, if ECMA-335 requires one for the modeled tables
    #[must_use]
    pub fn sort_key(table: TableId) -> Option<Column> {
        match table {
            TableId::NestedClass => Some(Column::NestedClassNestedClass),
            _ => None,
        }
    }

    /// The table this column belongs to
    #[must_use]
    pub fn table(&self) -> TableId {
        use Column::*;

        match self {
            ModuleGeneration | ModuleName | ModuleMvid => TableId::Module,
            TypeRefResolutionScope | TypeRefName | TypeRefNamespace => TableId::TypeRef,
            TypeDefFlags | TypeDefName | TypeDefNamespace | TypeDefExtends | TypeDefFieldList
            | TypeDefMethodList => TableId::TypeDef,
            FieldPtrField => TableId::FieldPtr,
            FieldFlags | FieldName | FieldSignature => TableId::Field,
            MethodPtrMethod => TableId::MethodPtr,
            MethodDefRva | MethodDefImplFlags | MethodDefFlags | MethodDefName
            | MethodDefSignature | MethodDefParamList => TableId::MethodDef,
            ParamPtrParam => TableId::ParamPtr,
            ParamFlags | ParamSequence | ParamName => TableId::Param,
            MemberRefClass | MemberRefName | MemberRefSignature => TableId::MemberRef,
            StandAloneSigSignature => TableId::StandAloneSig,
            ModuleRefName => TableId::ModuleRef,
            TypeSpecSignature => TableId::TypeSpec,
            AssemblyHashAlgId | AssemblyMajorVersion | AssemblyMinorVersion
            | AssemblyBuildNumber | AssemblyRevisionNumber | AssemblyFlags
            | AssemblyPublicKey | AssemblyName | AssemblyCulture => TableId::Assembly,
            AssemblyRefMajorVersion
            | AssemblyRefMinorVersion
            | AssemblyRefBuildNumber
            | AssemblyRefRevisionNumber
            | AssemblyRefFlags
            | AssemblyRefPublicKeyOrToken
            | AssemblyRefName
            | AssemblyRefCulture
            | AssemblyRefHashValue => TableId::AssemblyRef,
            FileFlags | FileName | FileHashValue => TableId::File,
            ExportedTypeFlags
            | ExportedTypeTypeDefId
            | ExportedTypeName
            | ExportedTypeNamespace
            | ExportedTypeImplementation => TableId::ExportedType,
            NestedClassNestedClass | NestedClassEnclosingClass => TableId::NestedClass,
            MethodSpecMethod | MethodSpecInstantiation => TableId::MethodSpec,
        }
    }

    /// The kind of value stored in this column
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        use Column::*;

        match self {
            ModuleName | TypeRefName | TypeRefNamespace | TypeDefName | TypeDefNamespace
            | FieldName | MethodDefName | ParamName | MemberRefName | ModuleRefName
            | AssemblyName | AssemblyCulture | AssemblyRefName | AssemblyRefCulture | FileName
            | ExportedTypeName | ExportedTypeNamespace => ColumnKind::String,

            FieldSignature
            | MethodDefSignature
            | MemberRefSignature
            | StandAloneSigSignature
            | TypeSpecSignature
            | AssemblyPublicKey
            | AssemblyRefPublicKeyOrToken
            | AssemblyRefHashValue
            | FileHashValue
            | MethodSpecInstantiation => ColumnKind::Blob,

            ModuleMvid => ColumnKind::Guid,

            TypeRefResolutionScope => ColumnKind::Coded(CodedIndexType::ResolutionScope),
            TypeDefExtends => ColumnKind::Coded(CodedIndexType::TypeDefOrRef),
            MemberRefClass => ColumnKind::Coded(CodedIndexType::MemberRefParent),
            ExportedTypeImplementation => ColumnKind::Coded(CodedIndexType::Implementation),
            MethodSpecMethod => ColumnKind::Coded(CodedIndexType::MethodDefOrRef),

            FieldPtrField => ColumnKind::Table(TableId::Field),
            MethodPtrMethod => ColumnKind::Table(TableId::MethodDef),
            ParamPtrParam => ColumnKind::Table(TableId::Param),
            NestedClassNestedClass | NestedClassEnclosingClass => {
                ColumnKind::Table(TableId::TypeDef)
            }

            TypeDefFieldList => ColumnKind::List(TableId::Field),
            TypeDefMethodList => ColumnKind::List(TableId::MethodDef),
            MethodDefParamList => ColumnKind::List(TableId::Param),

            _ => ColumnKind::Constant,
        }
    }

    /// Position of this column inside its row
    #[must_use]
    pub fn position(&self) -> usize {
        Column::layout(self.table())
            .iter()
            .position(|column| column == self)
            .unwrap_or_default()
    }
}
