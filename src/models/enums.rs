use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + Display pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Attended => "attended",
    Blocked => "blocked",
    Cancelled => "cancelled",
    Missed => "missed",
});

str_enum!(LedgerStatus {
    Settled => "settled",
    Open => "open",
});

str_enum!(BudgetKind {
    Clinical => "clinical",
    Orthodontic => "orthodontic",
    Monthly => "monthly",
});

impl BudgetKind {
    /// Type tag as stored: 0 clinical, 1 orthodontic, anything else monthly.
    pub fn from_tag(tag: i64) -> Self {
        match tag {
            0 => Self::Clinical,
            1 => Self::Orthodontic,
            _ => Self::Monthly,
        }
    }

    /// Stored tag for kinds that have exactly one. Monthly covers every
    /// other value, so it has none.
    pub fn tag(&self) -> Option<i64> {
        match self {
            Self::Clinical => Some(0),
            Self::Orthodontic => Some(1),
            Self::Monthly => None,
        }
    }
}

str_enum!(Section {
    Appointments => "appointments",
    Budgets => "budgets",
    Orthodontics => "orthodontics",
    Financial => "financial",
    ClinicalTeam => "clinical_team",
    Anamnesis => "anamnesis",
    Images => "images",
    BudgetImages => "budget_images",
});
