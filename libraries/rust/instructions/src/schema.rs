//! Account-layout introspection over the exchange program's IDL.
//!
//! Book-side and event-heap accounts are allocated by raw byte size, and those
//! sizes belong to the deployed program, not to this harness. The schema is
//! parsed once from the program's IDL JSON and handed to whoever allocates
//! accounts, so a layout change in the program is picked up without touching
//! any provisioning code.

use anchor_syn::idl::{EnumFields, Idl, IdlType, IdlTypeDefinition, IdlTypeDefinitionTy};
use thiserror::Error;

/// Length of the account discriminator the program writes ahead of every
/// account's declared layout.
pub const DISCRIMINATOR_LEN: usize = 8;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("malformed idl: {0}")]
    MalformedIdl(#[from] serde_json::Error),

    #[error("idl declares no account named '{0}'")]
    UnknownAccount(String),

    #[error("idl references undefined type '{0}'")]
    UnknownType(String),

    #[error("account '{account}' has a dynamic layout ({field}); raw-size allocation requires a static layout")]
    DynamicLayout { account: String, field: String },
}

/// Immutable view of the program's declared account layouts.
pub struct ProgramSchema {
    idl: Idl,
}

impl ProgramSchema {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let idl = serde_json::from_str(json)?;
        Ok(Self { idl })
    }

    pub fn program_name(&self) -> &str {
        &self.idl.name
    }

    /// On-ledger byte size of the named account record: the discriminator
    /// plus the recursive size of the declared layout.
    pub fn account_size(&self, name: &str) -> Result<usize, SchemaError> {
        let account = self
            .idl
            .accounts
            .iter()
            .find(|def| def.name == name)
            .ok_or_else(|| SchemaError::UnknownAccount(name.to_string()))?;

        Ok(DISCRIMINATOR_LEN + self.definition_size(name, account)?)
    }

    fn definition_size(
        &self,
        account: &str,
        def: &IdlTypeDefinition,
    ) -> Result<usize, SchemaError> {
        match &def.ty {
            IdlTypeDefinitionTy::Struct { fields } => fields
                .iter()
                .map(|field| self.type_size(account, &field.name, &field.ty))
                .sum(),
            IdlTypeDefinitionTy::Enum { variants } => {
                // Only unit-variant enums have a fixed wire size (the one-byte
                // variant tag).
                if variants.iter().all(|v| match &v.fields {
                    None => true,
                    Some(EnumFields::Named(fields)) => fields.is_empty(),
                    Some(EnumFields::Tuple(fields)) => fields.is_empty(),
                }) {
                    Ok(1)
                } else {
                    Err(SchemaError::DynamicLayout {
                        account: account.to_string(),
                        field: def.name.clone(),
                    })
                }
            }
        }
    }

    fn type_size(&self, account: &str, field: &str, ty: &IdlType) -> Result<usize, SchemaError> {
        Ok(match ty {
            IdlType::Bool | IdlType::U8 | IdlType::I8 => 1,
            IdlType::U16 | IdlType::I16 => 2,
            IdlType::U32 | IdlType::I32 | IdlType::F32 => 4,
            IdlType::U64 | IdlType::I64 | IdlType::F64 => 8,
            IdlType::U128 | IdlType::I128 => 16,
            IdlType::PublicKey => 32,
            IdlType::Option(inner) => 1 + self.type_size(account, field, inner)?,
            IdlType::Array(inner, len) => len * self.type_size(account, field, inner)?,
            IdlType::Defined(name) => {
                let def = self
                    .idl
                    .types
                    .iter()
                    .find(|def| &def.name == name)
                    .ok_or_else(|| SchemaError::UnknownType(name.clone()))?;
                self.definition_size(account, def)?
            }
            _ => {
                // vec, string, bytes, and anything the idl grows later
                return Err(SchemaError::DynamicLayout {
                    account: account.to_string(),
                    field: field.to_string(),
                });
            }
        })
    }
}
