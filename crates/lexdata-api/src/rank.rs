use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::Error;

/// Rank of a claim among the claims for the same property.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Rank {
    Preferred,
    Normal,
    Deprecated,
}

impl Rank {
    /// Parse a wire rank, failing with [`Error::InvalidRank`] on anything else.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        raw.parse().map_err(|_| Error::InvalidRank(raw.to_owned()))
    }

    /// `+1` preferred, `0` normal, `-1` deprecated.
    pub fn numeric(self) -> i8 {
        match self {
            Self::Preferred => 1,
            Self::Normal => 0,
            Self::Deprecated => -1,
        }
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numeric().cmp(&other.numeric())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn numeric_projection() {
        assert_eq!(Rank::parse("preferred").unwrap().numeric(), 1);
        assert_eq!(Rank::parse("normal").unwrap().numeric(), 0);
        assert_eq!(Rank::parse("deprecated").unwrap().numeric(), -1);
    }

    #[test]
    fn unknown_rank_is_invalid_state() {
        for raw in ["", "Normal", "best", "truthy"] {
            let err = Rank::parse(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidRank(ref r) if r == raw));
        }
    }

    #[test]
    fn ordered_by_numeric_value() {
        let mut ranks = vec![Rank::Normal, Rank::Preferred, Rank::Deprecated];
        ranks.sort();
        assert_eq!(ranks, [Rank::Deprecated, Rank::Normal, Rank::Preferred]);
        assert_eq!(Rank::Preferred.to_string(), "preferred");
        assert_eq!(Rank::Deprecated.as_ref(), "deprecated");
    }
}
