//! Versioned identifier mangling.
//!
//! Every declaration can be asked for its identifier under any scheme
//! version up to [`MAX_ID_VERSION`].  Old versions stay frozen so anchors in
//! already-published documentation keep working; new schemes are appended
//! with a distinct prefix rather than changing existing output.
//!
//! - Version 1 (`c.`): the dotted qualified name.  Unavailable when any
//!   path component is anonymous, since v1 predates anonymous entities.
//! - Version 2 (`Cv2.`): the dotted qualified name, with the parameter type
//!   encoding appended for functions so that overload-like redeclarations
//!   with different prototypes get distinct anchors.

use thiserror::Error;

use crate::ast::{Declaration, Render};

/// Highest supported identifier scheme version.
pub const MAX_ID_VERSION: u32 = 2;

/// Prefix per version; index 0 is unused.
pub(crate) const ID_PREFIX: [&str; (MAX_ID_VERSION + 1) as usize] = ["", "c.", "Cv2."];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The version is 0 or above [`MAX_ID_VERSION`].
    #[error("identifier scheme version {0} is not supported")]
    UnsupportedVersion(u32),
    /// The declaration has no identifier under this version.
    #[error("no identifier available under scheme version {0}")]
    NotAvailable(u32),
}

impl Declaration {
    /// The mangled identifier of this declaration under `version`.
    pub fn get_id(&self, version: u32) -> Result<String, IdError> {
        if version == 0 || version > MAX_ID_VERSION {
            return Err(IdError::UnsupportedVersion(version));
        }
        let name = self
            .name()
            .ok_or(IdError::NotAvailable(version))?;
        if version == 1 && name.has_anonymous() {
            return Err(IdError::NotAvailable(1));
        }
        let mut id = String::from(ID_PREFIX[version as usize]);
        id.push_str(&name.qualified());
        if version >= 2 {
            if let Some(params) = self.function_params() {
                id.push('(');
                for (i, param) in params.params.iter().enumerate() {
                    if i > 0 {
                        id.push(',');
                    }
                    if param.ellipsis {
                        id.push_str("...");
                    } else if let Some(arg) = &param.arg {
                        arg.ty.write(&mut id, Render::IdText);
                    }
                }
                id.push(')');
            }
        }
        Ok(id)
    }

    /// The identifier under the newest scheme.  Every named declaration has
    /// one, so this cannot report [`IdError::NotAvailable`].
    pub fn newest_id(&self) -> Result<String, IdError> {
        self.get_id(MAX_ID_VERSION)
    }
}
