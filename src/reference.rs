use serde::{Deserialize, Serialize};
use std::fmt;

pub const ANY_VERSION: &str = "?";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedRef {
    pub id: String,
    #[serde(default = "any_version")]
    pub version: String,
}

impl VersionedRef {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    pub fn any(id: impl Into<String>) -> Self {
        Self::new(id, ANY_VERSION)
    }

    pub fn has_version(&self) -> bool {
        self.version != ANY_VERSION
    }
}

impl fmt::Display for VersionedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_version() {
            write!(f, "{} ({})", self.id, self.version)
        } else {
            f.write_str(&self.id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefToken {
    Token(String),
    Ref(VersionedRef),
}

impl From<&str> for RefToken {
    fn from(value: &str) -> Self {
        RefToken::Token(value.to_string())
    }
}

impl From<VersionedRef> for RefToken {
    fn from(value: VersionedRef) -> Self {
        RefToken::Ref(value)
    }
}

pub fn is_item_id(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_uppercase() {
        return false;
    }
    let rest = chars.as_str();
    !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit())
}

/// Decodes an interleaved `[id, version?, id, version?, ...]` sequence.
///
/// An id token followed by a non-id token takes that token as its version;
/// otherwise the version is [`ANY_VERSION`]. Stray version tokens with no
/// preceding id are skipped.
pub fn parse_refs(tokens: &[RefToken]) -> Vec<VersionedRef> {
    let mut out = Vec::new();
    let mut index = 0;
    while index < tokens.len() {
        match &tokens[index] {
            RefToken::Ref(reference) => {
                out.push(reference.clone());
                index += 1;
            }
            RefToken::Token(token) if is_item_id(token) => {
                let version = match tokens.get(index + 1) {
                    Some(RefToken::Token(next)) if !is_item_id(next) => {
                        index += 1;
                        next.clone()
                    }
                    _ => ANY_VERSION.to_string(),
                };
                out.push(VersionedRef::new(token.clone(), version));
                index += 1;
            }
            RefToken::Token(_) => index += 1,
        }
    }
    out
}

pub fn contains_id(refs: &[VersionedRef], id: &str) -> bool {
    refs.iter().any(|reference| reference.id == id)
}

fn any_version() -> String {
    ANY_VERSION.to_string()
}
