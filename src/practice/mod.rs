//! Record kinds behind the practice list views.

/// Declares a closed set of labels: the enum, its serde names, `as_str`,
/// `rank` (declaration order) and `FromStr`.
macro_rules! closed_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            pub fn rank(self) -> u8 {
                Self::LABELS
                    .iter()
                    .position(|label| *label == self.as_str())
                    .unwrap_or(0) as u8
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw {
                    $($label => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }
    };
}

mod client;
mod contract;
mod entity;
pub mod fixtures;
mod knowledge;
mod matter;
mod spend;

pub use client::{Client, ClientStatus, ClientType};
pub use contract::{Contract, ContractStatus, ContractType};
pub use entity::{EntityStatus, EntityType, LegalEntity, Officer};
pub use knowledge::{KnowledgeCategory, KnowledgeItem, KnowledgeStatus};
pub use matter::{Matter, MatterStatus, MatterType};
pub use spend::{SpendCategory, SpendLine, SpendStatus};

use crate::records::FieldValue;

closed_set!(
    /// Shared by matter priority and contract/client risk level.
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

impl Priority {
    pub fn field_value(self) -> FieldValue<'static> {
        FieldValue::Rank {
            label: self.as_str(),
            rank: self.rank(),
        }
    }
}

/// Labels treated as elevated in "high risk" / "high priority" counters.
pub const ELEVATED: &[&str] = &["high", "critical"];

#[cfg(test)]
mod tests {
    use super::Priority;
    use std::str::FromStr;

    #[test]
    fn priority_ranks_follow_declaration_order() {
        assert!(Priority::Critical.rank() > Priority::High.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for label in Priority::LABELS {
            let parsed = Priority::from_str(label).expect("known label");
            assert_eq!(parsed.as_str(), *label);
        }
        assert!(Priority::from_str("urgent").is_err());
    }
}
