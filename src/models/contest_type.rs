//! Contest category model backed by a fixed, pre-seeded enumeration

use serde::Serialize;
use sqlx::SqlitePool;

/// Contest category with a stable database id.
///
/// The `contest_types` table is seeded with exactly these rows by the
/// initial migration; the aggregation job resolves category names to these
/// ids and never creates new ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum Category {
    Weekly = 1,
    Biweekly = 2,
    Div1 = 3,
    Div2 = 4,
    Div3 = 5,
    Div4 = 6,
    Other = 7,
}

impl Category {
    pub const ALL: [Self; 7] = [
        Self::Weekly,
        Self::Biweekly,
        Self::Div1,
        Self::Div2,
        Self::Div3,
        Self::Div4,
        Self::Other,
    ];

    #[must_use]
    pub const fn id(self) -> i64 {
        self as i64
    }

    #[must_use]
    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::Weekly),
            2 => Some(Self::Biweekly),
            3 => Some(Self::Div1),
            4 => Some(Self::Div2),
            5 => Some(Self::Div3),
            6 => Some(Self::Div4),
            7 => Some(Self::Other),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Biweekly => "Biweekly",
            Self::Div1 => "Div1",
            Self::Div2 => "Div2",
            Self::Div3 => "Div3",
            Self::Div4 => "Div4",
            Self::Other => "Other",
        }
    }
}

/// Contest type row as served by the API.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ContestType {
    pub id: i64,
    pub name: String,
}

impl ContestType {
    /// Returns all contest types ordered by id.
    pub async fn list_all(db_pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT id, name FROM contest_types ORDER BY id ASC")
            .fetch_all(db_pool)
            .await
    }

    /// Verifies that the fixed category rows are present.
    ///
    /// Missing seed rows are a startup invariant violation; the caller is
    /// expected to abort the process.
    pub async fn verify_seed(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
        for category in Category::ALL {
            let row: Option<(String,)> =
                sqlx::query_as("SELECT name FROM contest_types WHERE id = ?")
                    .bind(category.id())
                    .fetch_optional(db_pool)
                    .await?;

            match row {
                Some((name,)) if name == category.as_str() => {}
                _ => {
                    tracing::error!(
                        "contest_types seed row {} ({}) missing or renamed",
                        category.id(),
                        category.as_str()
                    );
                    return Err(sqlx::Error::RowNotFound);
                }
            }
        }
        Ok(())
    }
}
