use serde::{Deserialize, Serialize};

/// Screen orientation as requested by, or reported for, the host context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// No orientation requested; the host is free to rotate.
    #[default]
    Unspecified,
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn is_unspecified(self) -> bool {
        self == Orientation::Unspecified
    }
}
