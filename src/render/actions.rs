use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permission verbs in bit order.
pub const VERBS: [&str; 6] = ["create", "view", "update", "delete", "execute", "manage"];

/// Bitmask of permission verbs, `create` at bit 0 through `manage` at bit 5.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actions(u8);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown action '{0}' (expected one of: {verbs})", verbs = VERBS.join(", "))]
pub struct UnknownAction(pub String);

impl Actions {
    pub const NONE: Actions = Actions(0);
    pub const ALL: Actions = Actions(0b11_1111);

    pub fn from_bits(bits: u8) -> Self {
        Actions(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, verb: &str) -> bool {
        match verb_bit(verb) {
            Some(bit) => self.0 & bit != 0,
            None => false,
        }
    }

    pub fn verbs(self) -> impl Iterator<Item = &'static str> {
        VERBS
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, v)| *v)
    }

    /// Parses every entry; an empty list yields `NONE`.
    pub fn from_verbs<S: AsRef<str>>(verbs: &[S]) -> Result<Self, UnknownAction> {
        let mut bits = 0u8;
        for verb in verbs {
            let verb = verb.as_ref().trim();
            if verb.is_empty() || verb.eq_ignore_ascii_case("none") {
                continue;
            }
            bits |= verb_bit(verb).ok_or_else(|| UnknownAction(verb.to_string()))?;
        }
        Ok(Actions(bits))
    }
}

fn verb_bit(verb: &str) -> Option<u8> {
    VERBS
        .iter()
        .position(|v| v.eq_ignore_ascii_case(verb))
        .map(|i| 1 << i)
}

impl fmt::Display for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let verbs: Vec<&str> = self.verbs().collect();
        f.write_str(&verbs.join(", "))
    }
}

impl FromStr for Actions {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        Actions::from_verbs(&parts)
    }
}
