//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table (`analysis_statuses`,
//! `comment_classifications`). The `name` strings are the canonical labels
//! used in storage seeds, API output, and aggregate statistics.

use serde::{Serialize, Serializer};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant, in seed order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Canonical upper-snake label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Resolve a database status ID back into the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( v if v == $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Resolve a canonical label (exact match) back into the enum.
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Lifecycle of one video analysis run.
    AnalysisStatus {
        Processing = 1 => "PROCESSING",
        Completed = 2 => "COMPLETED",
        Failed = 3 => "FAILED",
        /// Transient: a batch deletion is in flight.
        DeletingClassifiedComments = 4 => "DELETING_CLASSIFIED_COMMENTS",
        CompletedAllDeletionsSuccessfully = 5 => "COMPLETED_ALL_DELETIONS_SUCCESSFULLY",
        FailedAllDeletions = 6 => "FAILED_ALL_DELETIONS",
        CompletedDeletionWithPartialErrors = 7 => "COMPLETED_DELETION_WITH_PARTIAL_ERRORS",
    }
}

define_status_enum! {
    /// Classification label attached to an analyzed comment.
    Classification {
        PendingAnalysis = 1 => "PENDING_ANALYSIS",
        /// Gambling spam.
        Judi = 2 => "JUDI",
        NonJudi = 3 => "NON_JUDI",
        /// The inference endpoint could not produce a label.
        ErrorAnalysis = 4 => "ERROR_ANALYSIS",
    }
}

impl AnalysisStatus {
    /// Statuses from which a batch deletion may not start.
    pub const BLOCKS_BATCH_DELETION: [AnalysisStatus; 3] = [
        AnalysisStatus::Processing,
        AnalysisStatus::Failed,
        AnalysisStatus::DeletingClassifiedComments,
    ];

    /// Whether a batch deletion may be started from this status.
    pub fn allows_batch_deletion(self) -> bool {
        !Self::BLOCKS_BATCH_DELETION.contains(&self)
    }
}
