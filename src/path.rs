//! Derivation path templates of the form `m/44'/60'/0'/0/{index}`.

use std::fmt;

use tiny_hderive::bip44::{ChildNumber, DerivationPath};

use crate::error::GenerationError;

/// Placeholder substituted with the wallet index.
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Standard EVM account path.
pub const DEFAULT_PATH_TEMPLATE: &str = "m/44'/60'/0'/0/{index}";

const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A validated path template: a fixed BIP32 prefix followed by one index segment.
///
/// The prefix is kept in canonical form (`'` hardened marker, no leading
/// zeros), which is what every rendered path uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    prefix: String,
    hardened_index: bool,
}

impl PathTemplate {
    /// Largest index a single BIP32 child number can hold.
    pub const MAX_INDEX: u32 = HARDENED_OFFSET - 1;

    pub const fn max_index() -> u32 {
        Self::MAX_INDEX
    }

    /// Parse a template. Segments take a `'` or `h` hardened marker.
    pub fn parse(template: &str) -> Result<Self, GenerationError> {
        let Some((prefix, last)) = template.rsplit_once('/') else {
            return Err(GenerationError::invalid_path(template, "path has no index segment"));
        };

        let hardened_index = match last {
            "{index}" => false,
            "{index}'" | "{index}h" => true,
            _ => {
                return Err(GenerationError::invalid_path(
                    template,
                    "last segment must be {index} or {index}'",
                ))
            }
        };
        if prefix.contains(INDEX_PLACEHOLDER) {
            return Err(GenerationError::invalid_path(
                template,
                "the {index} placeholder must be the last segment and appear once",
            ));
        }

        // tiny-hderive only understands the apostrophe form
        let normalized = prefix
            .split('/')
            .map(|segment| match segment.strip_suffix('h') {
                Some(number) => format!("{number}'"),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/");

        let path: DerivationPath = normalized.parse().map_err(|e| match e {
            tiny_hderive::Error::InvalidDerivationPath => {
                GenerationError::invalid_path(template, "path must start with 'm/'")
            }
            other => GenerationError::invalid_path(template, format!("{other:?}")),
        })?;

        let prefix = std::iter::once("m".to_string())
            .chain(path.iter().map(canonical_segment))
            .collect::<Vec<_>>()
            .join("/");

        Ok(Self {
            raw: template.to_string(),
            prefix,
            hardened_index,
        })
    }

    /// Substitute `index` into the template.
    pub fn render(&self, index: u32) -> String {
        if self.hardened_index {
            format!("{}/{}'", self.prefix, index)
        } else {
            format!("{}/{}", self.prefix, index)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        Self {
            raw: DEFAULT_PATH_TEMPLATE.to_string(),
            prefix: "m/44'/60'/0'/0".to_string(),
            hardened_index: false,
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn canonical_segment(child: &ChildNumber) -> String {
    let index = u32::from_be_bytes(child.to_bytes()) & PathTemplate::MAX_INDEX;
    if child.is_hardened() {
        format!("{index}'")
    } else {
        index.to_string()
    }
}
