//! Well-formedness checking of type expressions.
//!
//! The rules: an array may not contain an array, a reference may not target
//! an array, a function may not return an array. Violations are reported as
//! tagged errors carrying the offending node; callers that prefer the
//! boolean-and-log style simply log the returned error.

use crate::ast::{Type, TypeKind};

use super::error::{ArrayOfArray, ArrayReturn, InvalidTypeError, RefOfArray};

pub fn is_array(ty: &Type) -> bool {
    matches!(ty.kind, TypeKind::Array(_, _))
}

pub fn validate(ty: &Type) -> Result<(), InvalidTypeError> {
    match &ty.kind {
        TypeKind::Unit
        | TypeKind::Int
        | TypeKind::Char
        | TypeKind::Bool
        | TypeKind::Float
        | TypeKind::User(_) => Ok(()),
        TypeKind::Ref(inner) => {
            validate(inner)?;
            if is_array(inner) {
                Err(InvalidTypeError::RefOfArray(RefOfArray {
                    node: ty.clone(),
                }))
            } else {
                Ok(())
            }
        }
        TypeKind::Array(element, _) => {
            validate(element)?;
            if is_array(element) {
                Err(InvalidTypeError::ArrayOfArray(ArrayOfArray {
                    node: ty.clone(),
                }))
            } else {
                Ok(())
            }
        }
        TypeKind::Function(from, to) => {
            validate(from)?;
            validate(to)?;
            if is_array(to) {
                Err(InvalidTypeError::ArrayReturn(ArrayReturn {
                    node: ty.clone(),
                }))
            } else {
                Ok(())
            }
        }
    }
}
